//! Integration Tests für Store und Controller-Mutationen
//!
//! Diese Tests laufen auf dem Host (x86_64)

use maske_core::types::{BLUE, RED};
use maske_core::{
    CommandError, Controller, Mode, ParseError, Reply, STRIP_COUNT, StoreError, StripConfig,
    StripStore,
};
use rgb::RGB8;

const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };

fn controller() -> Controller<STRIP_COUNT> {
    Controller::new(StripStore::with_defaults(), 0)
}

fn send(controller: &mut Controller<STRIP_COUNT>, msg: &str) -> Result<Reply, CommandError> {
    let mut response = [0u8; 16];
    controller.handle_message(msg.as_bytes(), 1_000, &mut response)
}

/// Unterschiedliche Konfiguration pro Strip, damit "unverändert" prüfbar ist
fn varied_store() -> StripStore<STRIP_COUNT> {
    StripStore::from_configs(core::array::from_fn(|i| {
        let mode = if i % 2 == 0 { Mode::Static } else { Mode::Noise };
        StripConfig::new(RGB8::new(i as u8, 10 * i as u8, 255 - i as u8), 5 * i as u8, mode)
    }))
}

// ============================================================================
// Tests: StripStore
// ============================================================================

#[test]
fn test_default_store_is_complete() {
    let store = StripStore::<STRIP_COUNT>::with_defaults();
    assert_eq!(store.iter().count(), STRIP_COUNT);
    for (i, config) in store.iter().enumerate() {
        assert_eq!(config.brightness, 20);
        assert_eq!(config.mode, Mode::Static);
        let expected = if i == 3 || i == 7 { RED } else { BLUE };
        assert_eq!(config.color, expected);
    }
}

#[test]
fn test_set_all_every_mask_touches_exactly_its_bits() {
    let config = StripConfig::new(GREEN, 100, Mode::Noise);
    for mask in 0u32..(1 << STRIP_COUNT) {
        let before = varied_store();
        let mut store = before.clone();
        store.set_all(mask | 0xFFFF_FE00, config);

        for i in 0..STRIP_COUNT {
            let expected = if mask & (1 << i) != 0 {
                config
            } else {
                before.get(i).unwrap()
            };
            assert_eq!(store.get(i).unwrap(), expected, "mask {mask:#b}, strip {i}");
        }
    }
}

// ============================================================================
// Tests: Mutationen über das Protokoll
// ============================================================================

#[test]
fn test_color_sets_every_strip_and_keeps_brightness_and_mode() {
    let mut c = controller();
    c.store = varied_store();
    let before = c.store.clone();

    assert_eq!(send(&mut c, "COLOR:ff0000"), Ok(Reply::Updated));

    for i in 0..STRIP_COUNT {
        let now = c.store.get(i).unwrap();
        let old = before.get(i).unwrap();
        assert_eq!(now.color, RED);
        assert_eq!(now.brightness, old.brightness);
        assert_eq!(now.mode, old.mode);
    }
}

#[test]
fn test_scolor_mutates_only_target_strip() {
    for target in 0..STRIP_COUNT {
        let mut c = controller();
        c.store = varied_store();
        let before = c.store.clone();

        let msg = format!("SCOLOR:{target}:00ff00");
        assert_eq!(send(&mut c, &msg), Ok(Reply::Updated));

        for i in 0..STRIP_COUNT {
            let mut expected = before.get(i).unwrap();
            if i == target {
                expected.color = GREEN;
            }
            assert_eq!(c.store.get(i).unwrap(), expected);
        }
    }
}

#[test]
fn test_scolor_out_of_range_is_dropped() {
    let mut c = controller();
    let before = c.store.clone();

    assert_eq!(
        send(&mut c, "SCOLOR:9:00ff00"),
        Err(CommandError::Store(StoreError::InvalidIndex { index: 9 }))
    );
    assert_eq!(c.store, before);
    assert!(!c.scheduler.is_dirty());
}

#[test]
fn test_mode_sets_every_strip() {
    let mut c = controller();
    send(&mut c, "MODE:NOISE").unwrap();
    assert!(c.store.iter().all(|s| s.mode == Mode::Noise));

    send(&mut c, "MODE:SOMETHING").unwrap();
    assert!(c.store.iter().all(|s| s.mode == Mode::Static));
}

#[test]
fn test_mask_example_strips_0_and_3() {
    let mut c = controller();
    let before = c.store.clone();

    send(&mut c, "MASK:9:00ff00:100:NOISE").unwrap();

    for i in 0..STRIP_COUNT {
        let config = c.store.get(i).unwrap();
        if i == 0 || i == 3 {
            assert_eq!(config, StripConfig::new(GREEN, 100, Mode::Noise));
        } else {
            assert_eq!(config, before.get(i).unwrap());
        }
    }
}

#[test]
fn test_malformed_mask_changes_nothing() {
    let mut c = controller();
    let before = c.store.clone();

    assert_eq!(
        send(&mut c, "MASK:5:00ff00"),
        Err(CommandError::Parse(ParseError::MissingField))
    );
    assert_eq!(c.store, before);
    assert!(!c.scheduler.is_dirty());
}

#[test]
fn test_unrecognized_changes_nothing() {
    let mut c = controller();
    let before = c.store.clone();

    assert_eq!(
        send(&mut c, "FLY:AWAY"),
        Err(CommandError::Parse(ParseError::Unrecognized))
    );
    assert_eq!(c.store, before);
}

#[test]
fn test_mutation_marks_scheduler_dirty() {
    let mut c = controller();
    assert!(!c.scheduler.is_dirty());
    send(&mut c, "OFF").unwrap();
    assert!(c.scheduler.is_dirty());
    assert!(c.store.iter().all(|s| s.color == RGB8::new(0, 0, 0)));
}
