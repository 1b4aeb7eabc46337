//! Command Parser für das Text-Protokoll
//!
//! Grammatik (Doppelpunkt-getrennt, Keywords case-sensitive):
//!
//! ```text
//! GET_CONFIG
//! COLOR:RRGGBB
//! SCOLOR:<index>:RRGGBB
//! MODE:<NAME>
//! MASK:<bitmask>:<RRGGBB>:<brightness>:<NAME>
//! ON | OFF | BREATH
//! ```
//!
//! Zahlen werden nachsichtig geparst: ungültige Hex- oder Dezimalfelder
//! ergeben 0 statt eines Fehlers.

use core::fmt;

use rgb::RGB8;

use crate::logic::{clamp_u8, parse_color_lenient, parse_decimal_lenient};
use crate::types::{BLACK, Mode, StripConfig, WHITE};

/// Fehler beim Dekodieren einer Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Nachricht ist kein gültiges UTF-8
    InvalidUtf8,
    /// Unbekanntes Keyword
    Unrecognized,
    /// Zu wenige Doppelpunkt-getrennte Felder
    MissingField,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidUtf8 => f.write_str("message is not valid UTF-8"),
            ParseError::Unrecognized => f.write_str("unrecognized command"),
            ParseError::MissingField => f.write_str("missing command field"),
        }
    }
}

/// Dekodierte Mutation oder Abfrage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Status-Dokument anfordern
    GetConfig,
    /// Farbe aller Strips setzen, Helligkeit und Modus bleiben
    SetColor(RGB8),
    /// Farbe genau eines Strips setzen
    SetStripColor { index: usize, color: RGB8 },
    /// Modus aller Strips setzen
    SetMode(Mode),
    /// Komplette Konfiguration für alle Strips aus `mask`
    SetMasked { mask: u32, config: StripConfig },
}

impl Command {
    /// Dekodiert eine rohe Nachricht vom Transport
    pub fn parse(message: &[u8]) -> Result<Self, ParseError> {
        let text = core::str::from_utf8(message).map_err(|_| ParseError::InvalidUtf8)?;
        Self::parse_str(text)
    }

    pub fn parse_str(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();

        match text {
            "GET_CONFIG" => return Ok(Command::GetConfig),
            "ON" => return Ok(Command::SetColor(WHITE)),
            "OFF" => return Ok(Command::SetColor(BLACK)),
            "BREATH" => return Ok(Command::SetMode(Mode::Breath)),
            _ => {}
        }

        if let Some(hex) = text.strip_prefix("COLOR:") {
            Ok(Command::SetColor(parse_color_lenient(hex)))
        } else if let Some(rest) = text.strip_prefix("SCOLOR:") {
            let (index, hex) = rest.split_once(':').ok_or(ParseError::MissingField)?;
            Ok(Command::SetStripColor {
                index: strip_index(parse_decimal_lenient(index)),
                color: parse_color_lenient(hex),
            })
        } else if let Some(name) = text.strip_prefix("MODE:") {
            Ok(Command::SetMode(Mode::from_name(name)))
        } else if let Some(rest) = text.strip_prefix("MASK:") {
            parse_mask(rest)
        } else {
            Err(ParseError::Unrecognized)
        }
    }

    /// Ist das eine Mutation (alles außer `GET_CONFIG`)?
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::GetConfig)
    }
}

/// `<bitmask>:<RRGGBB>:<brightness>:<NAME>` - alle vier Felder Pflicht
fn parse_mask(rest: &str) -> Result<Command, ParseError> {
    let mut fields = rest.splitn(4, ':');
    let (Some(mask), Some(hex), Some(brightness), Some(mode)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(ParseError::MissingField);
    };

    Ok(Command::SetMasked {
        // Negative Werte setzen wie in C alle Bits
        mask: parse_decimal_lenient(mask) as u32,
        config: StripConfig::new(
            parse_color_lenient(hex),
            clamp_u8(parse_decimal_lenient(brightness)),
            Mode::from_name(mode),
        ),
    })
}

/// Negative Indizes werden auf einen garantiert ungültigen Index abgebildet,
/// der Store lehnt sie dann mit `InvalidIndex` ab.
fn strip_index(value: i32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(feature = "defmt")]
impl defmt::Format for Command {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Command::GetConfig => defmt::write!(fmt, "GetConfig"),
            Command::SetColor(c) => {
                defmt::write!(fmt, "SetColor {{ rgb: ({}, {}, {}) }}", c.r, c.g, c.b)
            }
            Command::SetStripColor { index, color } => defmt::write!(
                fmt,
                "SetStripColor {{ index: {}, rgb: ({}, {}, {}) }}",
                index,
                color.r,
                color.g,
                color.b
            ),
            Command::SetMode(mode) => defmt::write!(fmt, "SetMode({})", mode),
            Command::SetMasked { mask, config } => {
                defmt::write!(fmt, "SetMasked {{ mask: {=u32:#b}, {} }}", mask, config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RED;

    #[test]
    fn test_parse_get_config() {
        assert_eq!(Command::parse(b"GET_CONFIG"), Ok(Command::GetConfig));
        assert!(!Command::GetConfig.is_mutation());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(Command::parse(b"COLOR:ff0000"), Ok(Command::SetColor(RED)));
    }

    #[test]
    fn test_parse_invalid_hex_is_black() {
        assert_eq!(Command::parse(b"COLOR:zzzzzz"), Ok(Command::SetColor(BLACK)));
        assert_eq!(Command::parse(b"COLOR:"), Ok(Command::SetColor(BLACK)));
    }

    #[test]
    fn test_parse_scolor() {
        assert_eq!(
            Command::parse(b"SCOLOR:4:00ff00"),
            Ok(Command::SetStripColor {
                index: 4,
                color: RGB8 { r: 0, g: 255, b: 0 }
            })
        );
    }

    #[test]
    fn test_parse_scolor_negative_index() {
        let Ok(Command::SetStripColor { index, .. }) = Command::parse(b"SCOLOR:-1:00ff00") else {
            panic!("Expected SetStripColor variant");
        };
        assert_eq!(index, usize::MAX);
    }

    #[test]
    fn test_parse_scolor_missing_color() {
        assert_eq!(Command::parse(b"SCOLOR:4"), Err(ParseError::MissingField));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(Command::parse(b"MODE:NOISE"), Ok(Command::SetMode(Mode::Noise)));
        assert_eq!(Command::parse(b"MODE:EYES"), Ok(Command::SetMode(Mode::Static)));
    }

    #[test]
    fn test_parse_mask() {
        assert_eq!(
            Command::parse(b"MASK:9:00ff00:100:NOISE"),
            Ok(Command::SetMasked {
                mask: 9,
                config: StripConfig::new(RGB8 { r: 0, g: 255, b: 0 }, 100, Mode::Noise),
            })
        );
    }

    #[test]
    fn test_parse_mask_clamps_brightness() {
        let Ok(Command::SetMasked { config, .. }) = Command::parse(b"MASK:1:ffffff:999:STATIC")
        else {
            panic!("Expected SetMasked variant");
        };
        assert_eq!(config.brightness, 255);

        let Ok(Command::SetMasked { config, .. }) = Command::parse(b"MASK:1:ffffff:-3:") else {
            panic!("Expected SetMasked variant");
        };
        assert_eq!(config.brightness, 0);
        assert_eq!(config.mode, Mode::Static);
    }

    #[test]
    fn test_parse_mask_missing_fields() {
        assert_eq!(Command::parse(b"MASK:5:00ff00"), Err(ParseError::MissingField));
        assert_eq!(Command::parse(b"MASK:5:00ff00:10"), Err(ParseError::MissingField));
        assert_eq!(Command::parse(b"MASK:"), Err(ParseError::MissingField));
    }

    #[test]
    fn test_parse_legacy_commands() {
        assert_eq!(Command::parse(b"ON"), Ok(Command::SetColor(WHITE)));
        assert_eq!(Command::parse(b"OFF"), Ok(Command::SetColor(BLACK)));
        assert_eq!(Command::parse(b"BREATH"), Ok(Command::SetMode(Mode::Breath)));
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(Command::parse(b"color:ff0000"), Err(ParseError::Unrecognized));
        assert_eq!(Command::parse(b"HELLO"), Err(ParseError::Unrecognized));
        assert_eq!(Command::parse(b""), Err(ParseError::Unrecognized));
    }

    #[test]
    fn test_parse_invalid_utf8() {
        assert_eq!(Command::parse(&[0xFF, 0xFE]), Err(ParseError::InvalidUtf8));
    }
}
