// Frame Writer - Pixel-Ausgang über das RMT Peripheral
//
// Alle Strips hängen verkettet an einer WS2812 Datenleitung. Ein Frame wird
// Strip für Strip in Index-Reihenfolge mit einem einzigen write() übertragen.

use esp_hal::Blocking;
use esp_hal::rmt::Rmt;
use esp_hal::time::Rate;
use esp_hal_smartled::SmartLedsAdapter;
use maske_core::{Frame, FrameSink, LedError};
use smart_leds_trait::SmartLedsWrite;

use crate::config::{MAX_STRIP_PIXELS, STRIP_COUNT, TOTAL_PIXELS};

/// RMT-Buffer: 24 Pulse pro Pixel + 1 Reset
pub const RMT_BUFFER_SIZE: usize = TOTAL_PIXELS * 24 + 1;

/// Real Hardware Frame Writer
///
/// Hinweis: Der Buffer muss 'static sein, daher wird er im Task erstellt
/// und als Parameter übergeben statt im Constructor allokiert.
pub struct RmtFrameWriter<'a> {
    led: SmartLedsAdapter<'a, RMT_BUFFER_SIZE>,
}

impl<'a> RmtFrameWriter<'a> {
    /// Erstellt einen neuen RmtFrameWriter
    ///
    /// # Parameter
    /// - `gpio8`: GPIO8 Peripheral für die Datenleitung
    /// - `rmt_peripheral`: RMT Peripheral
    /// - `rmt_clock_mhz`: RMT Clock Frequenz in MHz (z.B. 80)
    /// - `buffer`: Buffer für LED-Daten (erstellt mit smart_led_buffer! Macro)
    pub fn new(
        gpio8: esp_hal::peripherals::GPIO8<'a>,
        rmt_peripheral: esp_hal::peripherals::RMT<'a>,
        rmt_clock_mhz: u32,
        buffer: &'a mut [esp_hal::rmt::PulseCode; RMT_BUFFER_SIZE],
    ) -> Self {
        let rmt: Rmt<'a, Blocking> = Rmt::new(rmt_peripheral, Rate::from_mhz(rmt_clock_mhz))
            .expect("Failed to initialize RMT");

        let led = SmartLedsAdapter::new(rmt.channel0, gpio8, buffer);

        Self { led }
    }
}

impl FrameSink<STRIP_COUNT, MAX_STRIP_PIXELS> for RmtFrameWriter<'_> {
    fn write_frame(&mut self, frame: &Frame<STRIP_COUNT, MAX_STRIP_PIXELS>) -> Result<(), LedError> {
        self.led
            .write(frame.pixels())
            .map_err(|_| LedError::WriteFailed)
    }
}
