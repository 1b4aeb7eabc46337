//! Render Engine
//!
//! Wandelt pro Tick die Konfiguration aller Strips in konkrete Pixelwerte
//! und übergibt den kompletten Frame in einem Aufruf an den [`FrameSink`].

use rgb::RGB8;

use crate::logic::{breath_level, scale_color};
use crate::noise::noise2d;
use crate::store::StripStore;
use crate::traits::{FrameSink, LedError};
use crate::types::{Mode, StripConfig};

/// Ortsskalierung des Noise-Felds (pro Pixel)
pub const SPACE_SCALE: f32 = 0.2;

/// Zeitskalierung des Noise-Felds (pro Millisekunde)
pub const TIME_SCALE: f32 = 0.01;

/// Pixelpuffer für alle `N` Strips
///
/// Jeder Strip hat eine eigene, beim Bau festgelegte Länge bis maximal
/// `MAX` Pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<const N: usize, const MAX: usize> {
    pixels: [[RGB8; MAX]; N],
    lengths: [usize; N],
}

impl<const N: usize, const MAX: usize> Frame<N, MAX> {
    /// Leerer (schwarzer) Frame; Längen über `MAX` werden gekappt
    pub fn new(lengths: [usize; N]) -> Self {
        Self {
            pixels: [[RGB8::default(); MAX]; N],
            lengths: lengths.map(|len| len.min(MAX)),
        }
    }

    pub fn lengths(&self) -> &[usize; N] {
        &self.lengths
    }

    /// Gesamtzahl der Pixel über alle Strips
    pub fn pixel_count(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Pixel eines Strips; leer bei ungültigem Index
    pub fn strip(&self, index: usize) -> &[RGB8] {
        match self.pixels.get(index) {
            Some(pixels) => &pixels[..self.lengths[index]],
            None => &[],
        }
    }

    fn strip_mut(&mut self, index: usize) -> &mut [RGB8] {
        let len = self.lengths[index];
        &mut self.pixels[index][..len]
    }

    /// Alle Pixel in Strip-Reihenfolge (für eine Daisy-Chain Datenleitung)
    pub fn pixels(&self) -> impl Iterator<Item = RGB8> + '_ {
        (0..N).flat_map(move |index| self.strip(index).iter().copied())
    }
}

/// Berechnet die Pixel eines Strips
pub fn render_strip(config: &StripConfig, clock_ms: u64, pixels: &mut [RGB8]) {
    match config.mode {
        Mode::Static => {
            pixels.fill(scale_color(config.color, config.brightness));
        }
        Mode::Noise => {
            let t = clock_ms as f32 * TIME_SCALE;
            for (j, pixel) in pixels.iter_mut().enumerate() {
                let n = noise2d(j as f32 * SPACE_SCALE, t);
                let level = (config.brightness as f32 * n) as u8;
                *pixel = scale_color(config.color, level);
            }
        }
        Mode::Breath => {
            let level = (config.brightness as u16 * breath_level(clock_ms) as u16 / 255) as u8;
            pixels.fill(scale_color(config.color, level));
        }
    }
}

/// Berechnet alle Strips in den Frame
pub fn render_frame<const N: usize, const MAX: usize>(
    store: &StripStore<N>,
    clock_ms: u64,
    frame: &mut Frame<N, MAX>,
) {
    for (index, config) in store.iter().enumerate() {
        render_strip(config, clock_ms, frame.strip_mut(index));
    }
}

/// Render Engine mit eigenem Frame-Puffer und Output-Sink
///
/// Der Frame wird erst komplett berechnet und dann in einem Aufruf
/// übergeben - der Sink sieht nie einen halb aktualisierten Frame.
pub struct Renderer<S, const N: usize, const MAX: usize> {
    sink: S,
    frame: Frame<N, MAX>,
}

impl<S: FrameSink<N, MAX>, const N: usize, const MAX: usize> Renderer<S, N, MAX> {
    pub fn new(sink: S, lengths: [usize; N]) -> Self {
        Self {
            sink,
            frame: Frame::new(lengths),
        }
    }

    /// Berechnet den Frame ohne ihn zu senden
    pub fn prepare(&mut self, store: &StripStore<N>, clock_ms: u64) {
        render_frame(store, clock_ms, &mut self.frame);
    }

    /// Sendet den zuletzt berechneten Frame
    pub fn present(&mut self) -> Result<(), LedError> {
        self.sink.write_frame(&self.frame)
    }

    /// Ein kompletter Tick: berechnen und senden
    pub fn render(&mut self, store: &StripStore<N>, clock_ms: u64) -> Result<(), LedError> {
        self.prepare(store, clock_ms);
        self.present()
    }

    pub fn frame(&self) -> &Frame<N, MAX> {
        &self.frame
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RED, WHITE};

    #[test]
    fn test_static_scales_by_brightness() {
        let config = StripConfig::new(WHITE, 51, Mode::Static);
        let mut pixels = [RGB8::default(); 5];
        render_strip(&config, 0, &mut pixels);
        assert!(pixels.iter().all(|p| *p == RGB8 { r: 51, g: 51, b: 51 }));
    }

    #[test]
    fn test_noise_never_exceeds_static_level() {
        let config = StripConfig::new(RED, 200, Mode::Noise);
        let mut pixels = [RGB8::default(); 16];
        for clock in [0, 10, 1_000, 123_456] {
            render_strip(&config, clock, &mut pixels);
            assert!(pixels.iter().all(|p| p.r < 200 && p.g == 0 && p.b == 0));
        }
    }

    #[test]
    fn test_frame_lengths_are_capped() {
        let frame = Frame::<3, 8>::new([4, 8, 20]);
        assert_eq!(frame.lengths(), &[4, 8, 8]);
        assert_eq!(frame.pixel_count(), 20);
        assert_eq!(frame.strip(0).len(), 4);
        assert!(frame.strip(3).is_empty());
    }
}
