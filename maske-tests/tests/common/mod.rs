//! Gemeinsame Mocks für die Integration Tests
//!
//! Laufen auf dem Host (x86_64), ersetzen LED-Ausgang und Flash.

#![allow(dead_code)]

use std::collections::HashMap;

use maske_core::{Frame, FrameSink, KeyValueStorage, LedError, StorageError};
use rgb::RGB8;

// ============================================================================
// Mock Frame Sink
// ============================================================================

#[derive(Default)]
pub struct MockFrameSink {
    /// Zuletzt übertragene Strips (für Assertions in Tests)
    pub last_frame: Option<Vec<Vec<RGB8>>>,
    /// Anzahl der write_frame() Aufrufe
    pub write_count: usize,
    /// Simuliere Fehler beim nächsten write_frame()
    pub fail_next_write: bool,
}

impl MockFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strip(&self, index: usize) -> &[RGB8] {
        &self.last_frame.as_ref().expect("no frame written")[index]
    }
}

impl<const N: usize, const MAX: usize> FrameSink<N, MAX> for MockFrameSink {
    fn write_frame(&mut self, frame: &Frame<N, MAX>) -> Result<(), LedError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LedError::WriteFailed);
        }

        self.last_frame = Some((0..N).map(|i| frame.strip(i).to_vec()).collect());
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// Mock Key/Value Storage
// ============================================================================

/// In-Memory NVS: `put_*` landen erst mit `commit` in `committed`
#[derive(Default)]
pub struct MockStorage {
    pub committed: HashMap<String, u32>,
    pending: HashMap<String, u32>,
    session: Option<bool>,
    /// Anzahl erfolgreicher commit() Aufrufe
    pub commit_count: usize,
    pub fail_next_begin: bool,
    pub fail_next_commit: bool,
    /// Jeder get() auf diesen Schlüssel schlägt fehl
    pub unreadable_key: Option<String>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }
}

impl KeyValueStorage for MockStorage {
    fn begin(&mut self, read_only: bool) -> Result<(), StorageError> {
        if self.fail_next_begin {
            self.fail_next_begin = false;
            return Err(StorageError::ReadFailed);
        }
        self.pending = self.committed.clone();
        self.session = Some(read_only);
        Ok(())
    }

    fn end(&mut self) {
        self.session = None;
        self.pending.clear();
    }

    fn get_u32(&mut self, key: &str) -> Result<Option<u32>, StorageError> {
        if self.session.is_none() {
            return Err(StorageError::Unavailable);
        }
        if self.unreadable_key.as_deref() == Some(key) {
            return Err(StorageError::ReadFailed);
        }
        Ok(self.pending.get(key).copied())
    }

    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StorageError> {
        match self.session {
            Some(false) => {
                self.pending.insert(key.to_string(), value);
                Ok(())
            }
            _ => Err(StorageError::Unavailable),
        }
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if self.session != Some(false) {
            return Err(StorageError::Unavailable);
        }
        if self.fail_next_commit {
            self.fail_next_commit = false;
            return Err(StorageError::WriteFailed);
        }
        self.committed = self.pending.clone();
        self.commit_count += 1;
        Ok(())
    }
}
