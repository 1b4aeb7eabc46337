//! Integration Tests für die Render Engine
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockFrameSink

mod common;

use common::MockFrameSink;
use maske_core::render::{SPACE_SCALE, TIME_SCALE};
use maske_core::{
    Controller, LedError, Mode, Renderer, Reply, StripConfig, StripStore, noise2d, scale_color,
};
use rgb::RGB8;

const N: usize = 4;
const MAX: usize = 16;
const LENGTHS: [usize; N] = [11, 16, 5, 8];

fn renderer() -> Renderer<MockFrameSink, N, MAX> {
    Renderer::new(MockFrameSink::new(), LENGTHS)
}

#[test]
fn test_frame_has_heterogeneous_lengths() {
    let mut r = renderer();
    let store = StripStore::<N>::with_defaults();
    r.render(&store, 0).unwrap();

    for (i, len) in LENGTHS.iter().enumerate() {
        assert_eq!(r.sink().strip(i).len(), *len);
    }
    assert_eq!(r.frame().pixels().count(), LENGTHS.iter().sum::<usize>());
}

#[test]
fn test_static_strip_is_uniform_and_scaled() {
    let mut r = renderer();
    let mut store = StripStore::<N>::with_defaults();
    store
        .set(1, StripConfig::new(RGB8::new(200, 100, 50), 128, Mode::Static))
        .unwrap();

    r.render(&store, 42).unwrap();

    let expected = RGB8::new(100, 50, 25);
    assert!(r.sink().strip(1).iter().all(|p| *p == expected));
}

#[test]
fn test_static_ignores_clock() {
    let mut r = renderer();
    let store = StripStore::<N>::with_defaults();
    r.render(&store, 0).unwrap();
    let first = r.sink().last_frame.clone();
    r.render(&store, 987_654).unwrap();
    assert_eq!(r.sink().last_frame, first);
}

#[test]
fn test_noise_pixels_follow_noise_field() {
    let mut r = renderer();
    let mut store = StripStore::<N>::with_defaults();
    let config = StripConfig::new(RGB8::new(255, 255, 255), 255, Mode::Noise);
    store.set(0, config).unwrap();

    let clock = 12_345;
    r.render(&store, clock).unwrap();

    for (j, pixel) in r.sink().strip(0).iter().enumerate() {
        let n = noise2d(j as f32 * SPACE_SCALE, clock as f32 * TIME_SCALE);
        let level = (255.0 * n) as u8;
        assert_eq!(*pixel, scale_color(config.color, level), "pixel {j}");
    }
}

#[test]
fn test_noise_is_temporally_smooth() {
    let mut r = renderer();
    let mut store = StripStore::<N>::with_defaults();
    store
        .set(2, StripConfig::new(RGB8::new(255, 0, 0), 255, Mode::Noise))
        .unwrap();

    r.render(&store, 50_000).unwrap();
    let a = r.sink().strip(2).to_vec();
    // Ein Tick später (10 ms) ändert sich jeder Pixel nur wenig
    r.render(&store, 50_010).unwrap();
    let b = r.sink().strip(2).to_vec();

    for (pa, pb) in a.iter().zip(&b) {
        assert!((pa.r as i16 - pb.r as i16).abs() <= 45);
    }
}

#[test]
fn test_one_sink_call_per_frame() {
    let mut r = renderer();
    let store = StripStore::<N>::with_defaults();
    for tick in 0..5 {
        r.render(&store, tick * 10).unwrap();
    }
    assert_eq!(r.sink().write_count, 5);
}

#[test]
fn test_failed_write_keeps_rendering() {
    let mut r = renderer();
    let store = StripStore::<N>::with_defaults();

    r.sink_mut().fail_next_write = true;
    assert_eq!(r.render(&store, 0), Err(LedError::WriteFailed));
    assert!(r.render(&store, 10).is_ok());
    assert_eq!(r.sink().write_count, 1);
}

#[test]
fn test_mutation_is_visible_on_immediate_render() {
    let mut c = Controller::new(StripStore::<N>::with_defaults(), 0);
    let mut r = renderer();
    let mut scratch = [0u8; 4];

    let reply = c.handle_message(b"SCOLOR:2:ffffff", 0, &mut scratch).unwrap();
    assert_eq!(reply, Reply::Updated);
    r.render(&c.store, 0).unwrap();

    // Default-Helligkeit 20 auf Weiß
    assert!(r.sink().strip(2).iter().all(|p| *p == RGB8::new(20, 20, 20)));
}

#[test]
fn test_breath_stays_below_brightness() {
    let mut r = renderer();
    let mut store = StripStore::<N>::with_defaults();
    store
        .set(3, StripConfig::new(RGB8::new(255, 255, 255), 100, Mode::Breath))
        .unwrap();

    for clock in (0..4_000).step_by(250) {
        r.render(&store, clock).unwrap();
        assert!(r.sink().strip(3).iter().all(|p| p.r <= 100));
    }
}
