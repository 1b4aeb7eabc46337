//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use core::fmt;

use crate::render::Frame;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::WriteFailed => f.write_str("LED write failed"),
        }
    }
}

/// Fehler-Typ für den nichtflüchtigen Speicher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Keine offene Session (`begin` fehlt) oder Session read-only
    Unavailable,
    ReadFailed,
    WriteFailed,
    /// Inhalt des Speichers ist beschädigt
    Corrupt,
    /// Kein Platz für einen weiteren Schlüssel
    Full,
    /// Ein anderer Commit läuft noch
    Busy,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StorageError::Unavailable => "storage session unavailable",
            StorageError::ReadFailed => "storage read failed",
            StorageError::WriteFailed => "storage write failed",
            StorageError::Corrupt => "storage content corrupt",
            StorageError::Full => "storage full",
            StorageError::Busy => "storage busy",
        };
        f.write_str(msg)
    }
}

/// Trait für den Pixel-Ausgang
///
/// Nimmt pro Tick genau einen kompletten Frame entgegen.
///
/// # Implementierungen
/// - **Production:** RmtFrameWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockFrameSink (in-memory Mock)
pub trait FrameSink<const N: usize, const MAX: usize> {
    /// Überträgt alle Strips des Frames
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write_frame(&mut self, frame: &Frame<N, MAX>) -> Result<(), LedError>;
}

/// Namespaced Key/Value Speicher (NVS-artig)
///
/// Eine Session wird mit `begin` geöffnet und mit `end` geschlossen.
/// Fehlende Schlüssel liefern `Ok(None)`.
pub trait KeyValueStorage {
    fn begin(&mut self, read_only: bool) -> Result<(), StorageError>;

    fn end(&mut self);

    fn get_u32(&mut self, key: &str) -> Result<Option<u32>, StorageError>;

    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StorageError>;

    fn get_i32(&mut self, key: &str) -> Result<Option<i32>, StorageError> {
        Ok(self.get_u32(key)?.map(|v| v as i32))
    }

    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        self.put_u32(key, value as u32)
    }

    fn get_u8(&mut self, key: &str) -> Result<Option<u8>, StorageError> {
        Ok(self.get_u32(key)?.map(|v| v as u8))
    }

    fn put_u8(&mut self, key: &str, value: u8) -> Result<(), StorageError> {
        self.put_u32(key, value as u32)
    }

    /// Schreibt alle `put_*` der Session dauerhaft
    fn commit(&mut self) -> Result<(), StorageError>;
}
