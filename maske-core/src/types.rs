//! Core Types für die Masken-Steuerung
//!
//! Datenstrukturen ohne Hardware-Dependencies

use rgb::RGB8;

/// Anzahl der Strips der Maske (Schläfe oben, Brauen, Stirn, linkes Auge,
/// Kinn, Schnabel, Wange, rechtes Auge, Schläfe)
pub const STRIP_COUNT: usize = 9;

/// Helligkeit wenn nichts gespeichert ist
pub const DEFAULT_BRIGHTNESS: u8 = 20;

/// Indizes der beiden Augen-Strips
pub const EYE_STRIPS: [usize; 2] = [3, 7];

pub const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
pub const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };
pub const WHITE: RGB8 = RGB8 {
    r: 255,
    g: 255,
    b: 255,
};
pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Render-Modus eines Strips
///
/// Neue Modi brauchen einen Namen, einen Speicher-Tag und einen Zweig im
/// Render Engine - sonst nichts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Ganzer Strip in `color * brightness`
    #[default]
    Static,
    /// Schimmerndes Helligkeitsfeld aus 2D Value-Noise
    Noise,
    /// Langsames Ein-/Ausatmen aller Pixel
    Breath,
}

impl Mode {
    /// Kanonischer Protokoll-Name
    pub const fn name(self) -> &'static str {
        match self {
            Mode::Static => "STATIC",
            Mode::Noise => "NOISE",
            Mode::Breath => "BREATH",
        }
    }

    /// Parst einen Modus-Namen aus dem Protokoll.
    ///
    /// Unbekannte Namen (auch die historischen `SIMPLE`, `EYES`, `RANDOM`)
    /// ergeben `Static`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "NOISE" | "NOISE_ANIMATED" => Mode::Noise,
            "BREATH" => Mode::Breath,
            _ => Mode::Static,
        }
    }

    /// Tag für den nichtflüchtigen Speicher
    pub const fn tag(self) -> u8 {
        match self {
            Mode::Static => 0,
            Mode::Noise => 1,
            Mode::Breath => 2,
        }
    }

    pub const fn from_tag(tag: u8) -> Self {
        match tag {
            1 => Mode::Noise,
            2 => Mode::Breath,
            _ => Mode::Static,
        }
    }
}

/// Konfiguration eines einzelnen Strips
///
/// `brightness` ist ein separater Skalierungsfaktor und wird nie in
/// `color` eingerechnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripConfig {
    pub color: RGB8,
    pub brightness: u8,
    pub mode: Mode,
}

impl StripConfig {
    pub const fn new(color: RGB8, brightness: u8, mode: Mode) -> Self {
        Self {
            color,
            brightness,
            mode,
        }
    }

    /// Standard-Konfiguration mit gegebener Palettenfarbe
    pub const fn with_color(color: RGB8) -> Self {
        Self::new(color, DEFAULT_BRIGHTNESS, Mode::Static)
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self::with_color(BLUE)
    }
}

/// Eingebaute Palette: Augen rot, alles andere blau
pub const fn default_color(index: usize) -> RGB8 {
    if index == EYE_STRIPS[0] || index == EYE_STRIPS[1] {
        RED
    } else {
        BLUE
    }
}

/// Packt eine Farbe als 24-Bit Integer `0xRRGGBB`
pub const fn pack_rgb(color: RGB8) -> u32 {
    ((color.r as u32) << 16) | ((color.g as u32) << 8) | color.b as u32
}

/// Gegenstück zu [`pack_rgb`]; Bits oberhalb von 24 werden ignoriert
pub const fn unpack_rgb(value: u32) -> RGB8 {
    RGB8 {
        r: ((value >> 16) & 0xFF) as u8,
        g: ((value >> 8) & 0xFF) as u8,
        b: (value & 0xFF) as u8,
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for Mode {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StripConfig {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "StripConfig {{ rgb: ({}, {}, {}), brightness: {}, mode: {} }}",
            self.color.r,
            self.color.g,
            self.color.b,
            self.brightness,
            self.mode
        )
    }
}
