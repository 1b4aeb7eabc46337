// Flash Key/Value Storage - KeyValueStorage über einen Flash-Sektor
//
// Sektor-Layout (little endian):
//   [0..2]  Magic Header
//   [2..4]  Anzahl Records
//   [4..]   Records: 16 Bytes Schlüssel (NUL-gepadded) + 4 Bytes Wert
//
// `begin` lädt den Sektor in eine RAM-Tabelle, `put_*` ändern nur die
// Tabelle, `commit` löscht den Sektor und schreibt ihn komplett neu.

use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};
use esp_storage::FlashStorage;
use heapless::{String, Vec};
use maske_core::persistence::KEY_CAPACITY;
use maske_core::{KeyValueStorage, StorageError};

use crate::config::{FLASH_SECTOR_SIZE, SETTINGS_MAX_KEYS};

const MAGIC_HEADER: u16 = 0x4D4B;
const HEADER_SIZE: usize = 4;
const RECORD_SIZE: usize = KEY_CAPACITY + 4;

/// Genutzter Teil des Sektors (4-Byte-aligned für den Flash-Treiber)
const IMAGE_SIZE: usize = HEADER_SIZE + SETTINGS_MAX_KEYS * RECORD_SIZE;

const _: () = assert!(IMAGE_SIZE <= FLASH_SECTOR_SIZE);
const _: () = assert!(IMAGE_SIZE % 4 == 0);

type Key = String<KEY_CAPACITY>;

/// Session-Zustand zwischen `begin` und `end`
#[derive(Clone, Copy, PartialEq, Eq)]
enum Session {
    Closed,
    ReadOnly,
    ReadWrite,
}

pub struct FlashKvStorage<'d> {
    flash: FlashStorage<'d>,
    offset: u32,
    table: Vec<(Key, u32), SETTINGS_MAX_KEYS>,
    session: Session,
}

impl<'d> FlashKvStorage<'d> {
    /// `offset` muss auf einen Sektor-Anfang zeigen
    pub fn new(flash: FlashStorage<'d>, offset: u32) -> Self {
        Self {
            flash,
            offset,
            table: Vec::new(),
            session: Session::Closed,
        }
    }

    fn load_table(&mut self) -> Result<(), StorageError> {
        self.table.clear();

        let mut image = [0u8; IMAGE_SIZE];
        self.flash
            .read(self.offset, &mut image)
            .map_err(|_| StorageError::ReadFailed)?;

        // Leerer oder fremder Sektor: keine Schlüssel, Defaults greifen
        if u16::from_le_bytes([image[0], image[1]]) != MAGIC_HEADER {
            return Ok(());
        }

        let count = usize::from(u16::from_le_bytes([image[2], image[3]]));
        if count > SETTINGS_MAX_KEYS {
            return Err(StorageError::Corrupt);
        }

        for record in image[HEADER_SIZE..].chunks_exact(RECORD_SIZE).take(count) {
            let (raw_key, raw_value) = record.split_at(KEY_CAPACITY);
            let len = raw_key.iter().position(|b| *b == 0).unwrap_or(KEY_CAPACITY);
            let key = core::str::from_utf8(&raw_key[..len])
                .ok()
                .and_then(|k| Key::try_from(k).ok())
                .ok_or(StorageError::Corrupt)?;
            let value = u32::from_le_bytes([raw_value[0], raw_value[1], raw_value[2], raw_value[3]]);
            self.table
                .push((key, value))
                .map_err(|_| StorageError::Corrupt)?;
        }
        Ok(())
    }

    fn encode_table(&self) -> [u8; IMAGE_SIZE] {
        let mut image = [0u8; IMAGE_SIZE];
        image[0..2].copy_from_slice(&MAGIC_HEADER.to_le_bytes());
        image[2..4].copy_from_slice(&(self.table.len() as u16).to_le_bytes());

        for ((key, value), record) in self
            .table
            .iter()
            .zip(image[HEADER_SIZE..].chunks_exact_mut(RECORD_SIZE))
        {
            record[..key.len()].copy_from_slice(key.as_bytes());
            record[KEY_CAPACITY..].copy_from_slice(&value.to_le_bytes());
        }
        image
    }
}

impl KeyValueStorage for FlashKvStorage<'_> {
    fn begin(&mut self, read_only: bool) -> Result<(), StorageError> {
        if let Err(e) = self.load_table() {
            self.session = Session::Closed;
            return Err(e);
        }
        self.session = if read_only {
            Session::ReadOnly
        } else {
            Session::ReadWrite
        };
        Ok(())
    }

    fn end(&mut self) {
        self.session = Session::Closed;
        self.table.clear();
    }

    fn get_u32(&mut self, key: &str) -> Result<Option<u32>, StorageError> {
        if self.session == Session::Closed {
            return Err(StorageError::Unavailable);
        }
        Ok(self
            .table
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| *v))
    }

    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StorageError> {
        if self.session != Session::ReadWrite {
            return Err(StorageError::Unavailable);
        }
        if let Some(entry) = self.table.iter_mut().find(|(k, _)| k.as_str() == key) {
            entry.1 = value;
            return Ok(());
        }
        let key = Key::try_from(key).map_err(|_| StorageError::Full)?;
        self.table
            .push((key, value))
            .map_err(|_| StorageError::Full)
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if self.session != Session::ReadWrite {
            return Err(StorageError::Unavailable);
        }
        let image = self.encode_table();
        self.flash
            .erase(self.offset, self.offset + FLASH_SECTOR_SIZE as u32)
            .map_err(|_| StorageError::WriteFailed)?;
        self.flash
            .write(self.offset, &image)
            .map_err(|_| StorageError::WriteFailed)
    }
}
