//! Strip Configuration Store
//!
//! Einzige Quelle der Wahrheit für Farbe, Helligkeit und Modus aller Strips.
//! Jeder Setter markiert den Store als "dirty", der Persistence Scheduler
//! holt das Flag mit [`StripStore::take_dirty`] ab.

use core::fmt;

use crate::types::{StripConfig, default_color};

/// Fehler beim Zugriff auf den Store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Strip-Index außerhalb von `0..N`
    InvalidIndex { index: usize },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidIndex { index } => write!(f, "invalid strip index {index}"),
        }
    }
}

/// In-Memory Tabelle aller `N` Strips
///
/// Immer vollständig belegt - es gibt keine fehlenden Einträge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripStore<const N: usize> {
    strips: [StripConfig; N],
    dirty: bool,
}

impl<const N: usize> StripStore<N> {
    /// Store aus einer vollständigen Tabelle (z.B. aus dem Flash geladen)
    pub const fn from_configs(strips: [StripConfig; N]) -> Self {
        Self {
            strips,
            dirty: false,
        }
    }

    /// Store mit der eingebauten Palette
    pub fn with_defaults() -> Self {
        Self::from_configs(core::array::from_fn(|i| {
            StripConfig::with_color(default_color(i))
        }))
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn get(&self, index: usize) -> Result<StripConfig, StoreError> {
        self.strips
            .get(index)
            .copied()
            .ok_or(StoreError::InvalidIndex { index })
    }

    pub fn set(&mut self, index: usize, config: StripConfig) -> Result<(), StoreError> {
        let slot = self
            .strips
            .get_mut(index)
            .ok_or(StoreError::InvalidIndex { index })?;
        *slot = config;
        self.dirty = true;
        Ok(())
    }

    /// Setzt `config` auf jeden Strip dessen Bit in `mask` gesetzt ist.
    ///
    /// Bits ab `N` werden ignoriert. Gibt die tatsächlich angewendete Maske
    /// zurück.
    pub fn set_all(&mut self, mask: u32, config: StripConfig) -> u32 {
        let mut applied = 0;
        for (index, slot) in self.strips.iter_mut().enumerate().take(32) {
            if mask & (1 << index) != 0 {
                *slot = config;
                applied |= 1 << index;
            }
        }
        if applied != 0 {
            self.dirty = true;
        }
        applied
    }

    /// Ändert einen Strip über eine Closure, die übrigen Felder bleiben erhalten
    pub fn update(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut StripConfig),
    ) -> Result<(), StoreError> {
        let mut config = self.get(index)?;
        f(&mut config);
        self.set(index, config)
    }

    /// Wendet `f` auf jeden Strip an
    pub fn update_all(&mut self, mut f: impl FnMut(&mut StripConfig)) {
        self.strips.iter_mut().for_each(&mut f);
        self.dirty = true;
    }

    pub fn iter(&self) -> impl Iterator<Item = &StripConfig> {
        self.strips.iter()
    }

    /// Kopie der Tabelle (für Commits außerhalb des Locks)
    pub fn snapshot(&self) -> [StripConfig; N] {
        self.strips
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Liest das Dirty-Flag und setzt es zurück
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }
}

impl<const N: usize> Default for StripStore<N> {
    fn default() -> Self {
        Self::with_defaults()
    }
}
