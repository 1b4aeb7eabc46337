//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use rgb::RGB8;

/// Skaliert eine Farbe mit einem Helligkeitsfaktor (0-255)
///
/// Jeder Kanal wird mit `level / 255` multipliziert, Nachkommastellen
/// werden abgeschnitten.
///
/// # Beispiele
///
/// ```
/// # use rgb::RGB8;
/// # use maske_core::scale_color;
/// let color = RGB8 { r: 255, g: 128, b: 0 };
/// assert_eq!(scale_color(color, 255), color);
/// assert_eq!(scale_color(color, 0), RGB8 { r: 0, g: 0, b: 0 });
/// ```
pub fn scale_color(color: RGB8, level: u8) -> RGB8 {
    let scale = |channel: u8| ((channel as u16 * level as u16) / 255) as u8;
    RGB8 {
        r: scale(color.r),
        g: scale(color.g),
        b: scale(color.b),
    }
}

/// Begrenzt einen beliebigen Integer auf 0..=255
pub fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Nachsichtiges Hex-Parsing wie `strtol(s, NULL, 16)`
///
/// Führende Leerzeichen, ein Vorzeichen und ein `0x` Präfix werden
/// übersprungen, danach zählen alle Hex-Ziffern bis zum ersten ungültigen
/// Zeichen. Ohne gültige Ziffer ist das Ergebnis 0, Überlauf sättigt.
pub fn parse_hex_lenient(input: &str) -> i32 {
    let (negative, digits) = split_sign(input.trim_start());
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    let mut value: i32 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(16) else {
            break;
        };
        value = value.saturating_mul(16).saturating_add(digit as i32);
    }
    if negative { value.saturating_neg() } else { value }
}

/// Nachsichtiges Dezimal-Parsing wie `String::toInt()`
///
/// Liest Ziffern bis zum ersten ungültigen Zeichen, ungültige Eingaben
/// ergeben 0. Überlauf sättigt.
pub fn parse_decimal_lenient(input: &str) -> i32 {
    let (negative, digits) = split_sign(input.trim_start());

    let mut value: i32 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(10) else {
            break;
        };
        value = value.saturating_mul(10).saturating_add(digit as i32);
    }
    if negative { value.saturating_neg() } else { value }
}

/// Dekodiert `RRGGBB` nachsichtig zu einer Farbe
pub fn parse_color_lenient(input: &str) -> RGB8 {
    let value = parse_hex_lenient(input) as u32;
    crate::types::unpack_rgb(value)
}

fn split_sign(input: &str) -> (bool, &str) {
    if let Some(rest) = input.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = input.strip_prefix('+') {
        (false, rest)
    } else {
        (false, input)
    }
}

/// Atemkurve für den BREATH-Modus, Ergebnis in 0..=255
///
/// `(exp(sin(t / 2000 * PI)) - 1/e) * 108`, Periode 4 Sekunden.
pub fn breath_level(clock_ms: u64) -> u8 {
    let phase = (clock_ms % 4000) as f32 / 2000.0 * core::f32::consts::PI;
    let level = (libm::expf(libm::sinf(phase)) - 0.367_879_44) * 108.0;
    level.clamp(0.0, 255.0) as u8
}
