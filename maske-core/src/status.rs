//! Status-Dokument für `GET_CONFIG`
//!
//! `{"strips":[{"color":"rrggbb","brightness":N,"mode":"NAME"}, ...]}`
//! mit genau `N` Einträgen in Index-Reihenfolge.

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::store::StripStore;
use crate::types::{Mode, StripConfig};
use rgb::RGB8;

/// Obergrenze für einen Eintrag:
/// `{"color":"rrggbb","brightness":255,"mode":"STATIC"},` = 53 Bytes
pub const STATUS_ENTRY_MAX: usize = 64;

/// Puffergröße die für `n` Strips immer reicht
pub const fn status_capacity(n: usize) -> usize {
    n * STATUS_ENTRY_MAX + 16
}

/// Farbe als 6 Hex-Ziffern (lowercase)
struct HexColor(RGB8);

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 6];
        for (i, byte) in [self.0.r, self.0.g, self.0.b].into_iter().enumerate() {
            buf[i * 2] = DIGITS[(byte >> 4) as usize];
            buf[i * 2 + 1] = DIGITS[(byte & 0x0F) as usize];
        }
        // Nur ASCII-Ziffern im Puffer
        let hex = core::str::from_utf8(&buf).unwrap_or("000000");
        serializer.serialize_str(hex)
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(serde::Serialize)]
struct StripStatus {
    color: HexColor,
    brightness: u8,
    mode: Mode,
}

impl From<&StripConfig> for StripStatus {
    fn from(config: &StripConfig) -> Self {
        Self {
            color: HexColor(config.color),
            brightness: config.brightness,
            mode: config.mode,
        }
    }
}

struct StripList<'a, const N: usize>(&'a StripStore<N>);

impl<const N: usize> Serialize for StripList<'_, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(N))?;
        for config in self.0.iter() {
            seq.serialize_element(&StripStatus::from(config))?;
        }
        seq.end()
    }
}

#[derive(serde::Serialize)]
struct StatusDocument<'a, const N: usize> {
    strips: StripList<'a, N>,
}

/// Schreibt das Status-Dokument nach `buf`, gibt die Länge zurück
pub fn write_status<const N: usize>(
    store: &StripStore<N>,
    buf: &mut [u8],
) -> serde_json_core::ser::Result<usize> {
    serde_json_core::to_slice(
        &StatusDocument {
            strips: StripList(store),
        },
        buf,
    )
}
