//! Persistence Scheduler und Speicherformat
//!
//! Flash-Schreibzugriffe sind langsam und verschleißen den Speicher, daher
//! wird höchstens ein Commit pro [`SAVE_INTERVAL_MS`] ausgeführt. Ein Commit
//! ist frühestens `SAVE_INTERVAL_MS` nach dem letzten Commit UND nach der
//! ersten noch ungespeicherten Änderung fällig. Ein Burst nach längerer Ruhe
//! landet so in genau einem Commit mit dem Endzustand.
//!
//! Schlüssel pro Strip und Feld: `color_<i>` (24-Bit RGB), `bright_<i>`
//! (signed Integer), `mode_<i>` (Modus-Tag).

use core::fmt::Write;

use heapless::String;

use crate::logic::clamp_u8;
use crate::store::StripStore;
use crate::traits::{KeyValueStorage, StorageError};
use crate::types::{
    DEFAULT_BRIGHTNESS, Mode, StripConfig, default_color, pack_rgb, unpack_rgb,
};

/// Mindestabstand zwischen zwei Commits
pub const SAVE_INTERVAL_MS: u64 = 5000;

/// Maximale Schlüssellänge (`bright_31` passt locker)
pub const KEY_CAPACITY: usize = 16;

/// Feld eines Strips im Speicher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Color,
    Brightness,
    Mode,
}

impl Field {
    const fn prefix(self) -> &'static str {
        match self {
            Field::Color => "color_",
            Field::Brightness => "bright_",
            Field::Mode => "mode_",
        }
    }
}

/// Baut den Speicher-Schlüssel für Feld und Strip-Index
pub fn field_key(field: Field, index: usize) -> String<KEY_CAPACITY> {
    let mut key = String::new();
    // Passt immer: längster Präfix 7 Zeichen + Index
    let _ = write!(key, "{}{}", field.prefix(), index);
    key
}

/// Schreibt alle Strips in einer Session und committet
pub fn save<S: KeyValueStorage>(
    storage: &mut S,
    strips: &[StripConfig],
) -> Result<(), StorageError> {
    storage.begin(false)?;
    let result = write_strips(storage, strips).and_then(|()| storage.commit());
    storage.end();
    result
}

fn write_strips<S: KeyValueStorage>(
    storage: &mut S,
    strips: &[StripConfig],
) -> Result<(), StorageError> {
    for (index, config) in strips.iter().enumerate() {
        storage.put_u32(&field_key(Field::Color, index), pack_rgb(config.color))?;
        storage.put_i32(
            &field_key(Field::Brightness, index),
            i32::from(config.brightness),
        )?;
        storage.put_u8(&field_key(Field::Mode, index), config.mode.tag())?;
    }
    Ok(())
}

/// Ergebnis von [`load`]: immer ein vollständiger Store, plus der erste
/// aufgetretene Fehler (falls einer auftrat)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<const N: usize> {
    pub store: StripStore<N>,
    pub error: Option<StorageError>,
}

/// Lädt alle Strips; fehlende oder unlesbare Felder bekommen ihren Default
///
/// Blockiert den Start nie - auch ein kompletter Lesefehler ergibt einen
/// gültigen Store mit der eingebauten Palette.
pub fn load<S: KeyValueStorage, const N: usize>(storage: &mut S) -> Loaded<N> {
    if let Err(e) = storage.begin(true) {
        return Loaded {
            store: StripStore::with_defaults(),
            error: Some(e),
        };
    }

    let mut error = None;
    let strips = core::array::from_fn(|index| {
        let color = first_error(&mut error, storage.get_u32(&field_key(Field::Color, index)))
            .map(unpack_rgb)
            .unwrap_or(default_color(index));
        let brightness =
            first_error(&mut error, storage.get_i32(&field_key(Field::Brightness, index)))
                .map(clamp_u8)
                .unwrap_or(DEFAULT_BRIGHTNESS);
        let mode = first_error(&mut error, storage.get_u8(&field_key(Field::Mode, index)))
            .map(Mode::from_tag)
            .unwrap_or_default();

        StripConfig::new(color, brightness, mode)
    });
    storage.end();

    Loaded {
        store: StripStore::from_configs(strips),
        error,
    }
}

/// Merkt sich den ersten Lesefehler, der Wert fällt dann auf den Default
fn first_error<T>(
    error: &mut Option<StorageError>,
    result: Result<Option<T>, StorageError>,
) -> Option<T> {
    result.unwrap_or_else(|e| {
        error.get_or_insert(e);
        None
    })
}

/// Zustand des Schedulers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaveState {
    /// Keine ungespeicherte Änderung
    Clean,
    /// Änderung ausstehend; `since_ms` = erste ungespeicherte Änderung
    Dirty { since_ms: u64 },
}

/// Berechtigung für genau einen Commit, ausgestellt von
/// [`PersistenceScheduler::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub struct CommitTicket {
    generation: u32,
}

/// Debounce-Zustandsmaschine CLEAN/DIRTY
///
/// Der eigentliche Schreibvorgang darf außerhalb des Render-Pfads laufen:
/// `poll` stellt ein Ticket aus, `finish` meldet das Ergebnis zurück.
/// Änderungen während eines laufenden Commits halten den Zustand DIRTY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceScheduler {
    state: SaveState,
    last_commit_ms: u64,
    interval_ms: u64,
    generation: u32,
    in_flight: bool,
}

impl PersistenceScheduler {
    /// `now_ms` zählt als Zeitpunkt des letzten Commits (Zustand beim Start
    /// entspricht dem Speicher)
    pub const fn new(now_ms: u64) -> Self {
        Self::with_interval(now_ms, SAVE_INTERVAL_MS)
    }

    pub const fn with_interval(now_ms: u64, interval_ms: u64) -> Self {
        Self {
            state: SaveState::Clean,
            last_commit_ms: now_ms,
            interval_ms,
            generation: 0,
            in_flight: false,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.state, SaveState::Dirty { .. })
    }

    pub fn last_commit_ms(&self) -> u64 {
        self.last_commit_ms
    }

    /// Store wurde verändert
    ///
    /// CLEAN → DIRTY merkt sich den Zeitpunkt; weitere Änderungen im
    /// Zustand DIRTY verschieben das Fenster nicht.
    pub fn mark_dirty(&mut self, now_ms: u64) {
        self.generation = self.generation.wrapping_add(1);
        if self.state == SaveState::Clean {
            self.state = SaveState::Dirty { since_ms: now_ms };
        }
    }

    /// Prüft pro Tick ob ein Commit fällig ist
    pub fn poll(&mut self, now_ms: u64) -> Option<CommitTicket> {
        let SaveState::Dirty { since_ms } = self.state else {
            return None;
        };
        if self.in_flight {
            return None;
        }
        let window_start = self.last_commit_ms.max(since_ms);
        if now_ms.saturating_sub(window_start) < self.interval_ms {
            return None;
        }
        self.in_flight = true;
        Some(CommitTicket {
            generation: self.generation,
        })
    }

    /// Meldet das Ergebnis eines Commits
    ///
    /// Erfolg → CLEAN (falls seit dem Ticket nichts geändert wurde) und neuer
    /// Zeitstempel. Fehler → bleibt DIRTY, nächster Versuch beim nächsten
    /// fälligen Tick.
    pub fn finish(&mut self, ticket: CommitTicket, result: Result<(), StorageError>, now_ms: u64) {
        self.in_flight = false;
        if result.is_ok() {
            self.last_commit_ms = now_ms;
            if ticket.generation == self.generation {
                self.state = SaveState::Clean;
            }
        }
    }

    /// Synchroner Tick: Commit direkt ausführen falls fällig
    ///
    /// Gibt `None` zurück wenn kein Commit fällig war.
    pub fn run<S: KeyValueStorage, const N: usize>(
        &mut self,
        now_ms: u64,
        store: &StripStore<N>,
        storage: &mut S,
    ) -> Option<Result<(), StorageError>> {
        let ticket = self.poll(now_ms)?;
        let result = save(storage, &store.snapshot());
        self.finish(ticket, result, now_ms);
        Some(result)
    }
}
