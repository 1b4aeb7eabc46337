//! Integration Tests für GET_CONFIG und das Status-Dokument
//!
//! Das Dokument wird mit serde-json-core zurückgeparst.

use maske_core::{
    CommandError, Controller, Mode, Reply, STRIP_COUNT, StripConfig, StripStore, status_capacity,
};
use rgb::RGB8;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Entry<'a> {
    color: &'a str,
    brightness: u8,
    mode: &'a str,
}

/// Fixes Array: Deserialisierung schlägt fehl wenn nicht genau 9 Einträge
#[derive(Debug, Deserialize)]
struct Document<'a> {
    #[serde(borrow)]
    strips: [Entry<'a>; STRIP_COUNT],
}

fn query(controller: &mut Controller<STRIP_COUNT>, buf: &mut [u8]) -> usize {
    match controller.handle_message(b"GET_CONFIG", 0, buf) {
        Ok(Reply::Status(len)) => len,
        other => panic!("Expected Status reply, got {other:?}"),
    }
}

fn decode_entry(entry: &Entry<'_>) -> StripConfig {
    let value = u32::from_str_radix(entry.color, 16).expect("hex color");
    StripConfig::new(
        maske_core::types::unpack_rgb(value),
        entry.brightness,
        Mode::from_name(entry.mode),
    )
}

#[test]
fn test_color_then_get_config_example() {
    let mut c = Controller::new(StripStore::<STRIP_COUNT>::with_defaults(), 0);
    let mut scratch = [0u8; 8];
    c.handle_message(b"COLOR:ff0000", 0, &mut scratch).unwrap();

    let mut buf = [0u8; status_capacity(STRIP_COUNT)];
    let len = query(&mut c, &mut buf);
    let (doc, _) = serde_json_core::from_slice::<Document>(&buf[..len]).unwrap();

    for entry in &doc.strips {
        assert_eq!(entry.color, "ff0000");
    }
    let json = core::str::from_utf8(&buf[..len]).unwrap();
    assert_eq!(json.matches(r#""color":"ff0000""#).count(), STRIP_COUNT);
}

#[test]
fn test_status_roundtrip_is_lossless() {
    let store = StripStore::<STRIP_COUNT>::from_configs(core::array::from_fn(|i| {
        let mode = match i % 3 {
            0 => Mode::Static,
            1 => Mode::Noise,
            _ => Mode::Breath,
        };
        StripConfig::new(
            RGB8::new(17 * i as u8, 255 - 3 * i as u8, 0x0A),
            (29 * i) as u8,
            mode,
        )
    }));
    let mut c = Controller::new(store.clone(), 0);

    let mut buf = [0u8; status_capacity(STRIP_COUNT)];
    let len = query(&mut c, &mut buf);
    let (doc, _) = serde_json_core::from_slice::<Document>(&buf[..len]).unwrap();

    for (i, entry) in doc.strips.iter().enumerate() {
        assert_eq!(decode_entry(entry), store.get(i).unwrap(), "strip {i}");
        assert_eq!(entry.color.len(), 6);
        assert_eq!(entry.color, entry.color.to_lowercase());
    }
}

#[test]
fn test_get_config_does_not_mark_dirty() {
    let mut c = Controller::new(StripStore::<STRIP_COUNT>::with_defaults(), 0);
    let mut buf = [0u8; status_capacity(STRIP_COUNT)];
    query(&mut c, &mut buf);
    assert!(!c.scheduler.is_dirty());
}

#[test]
fn test_get_config_small_buffer() {
    let mut c = Controller::new(StripStore::<STRIP_COUNT>::with_defaults(), 0);
    let mut buf = [0u8; 40];
    assert_eq!(
        c.handle_message(b"GET_CONFIG", 0, &mut buf),
        Err(CommandError::Response)
    );
}

#[test]
fn test_mode_names_in_document() {
    let mut c = Controller::new(StripStore::<STRIP_COUNT>::with_defaults(), 0);
    let mut scratch = [0u8; 8];
    c.handle_message(b"MASK:3:123456:7:BREATH", 0, &mut scratch)
        .unwrap();

    let mut buf = [0u8; status_capacity(STRIP_COUNT)];
    let len = query(&mut c, &mut buf);
    let (doc, _) = serde_json_core::from_slice::<Document>(&buf[..len]).unwrap();

    assert_eq!(doc.strips[0].mode, "BREATH");
    assert_eq!(doc.strips[1].mode, "BREATH");
    assert_eq!(doc.strips[1].color, "123456");
    assert_eq!(doc.strips[1].brightness, 7);
    assert_eq!(doc.strips[2].mode, "STATIC");
}
