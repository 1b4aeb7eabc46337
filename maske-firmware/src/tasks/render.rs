// Render Task - berechnet und überträgt einen Frame pro Tick
use defmt::{error, info, warn};
use embassy_futures::select::select;
use embassy_sync::channel::TrySendError;
use embassy_time::{Duration, Timer};
use esp_hal_smartled::smart_led_buffer;
use maske_core::{FrameSink, LinkAction, Renderer, StorageError};

use crate::config::{
    MAX_STRIP_PIXELS, RMT_CLOCK_MHZ, STRIP_COUNT, STRIP_LENGTHS, TICK_MS, TOTAL_PIXELS,
};
use crate::hal::RmtFrameWriter;
use crate::{AnnounceSignal, CommitJob, CommitSender, RenderSignal, SharedController, now_ms};

/// Render-Schleife - Hardware-unabhängig
///
/// Pro Tick:
/// 1. Frame aus dem Store berechnen (unter dem Lock)
/// 2. Frame an den Sink übertragen (ohne Lock)
/// 3. Persistence Scheduler und Verbindungs-Zustand abfragen
///
/// Ein Render-Signal (nach einer Mutation) beendet das Warten vorzeitig,
/// damit die Änderung ohne einen Tick Verzögerung sichtbar wird.
pub async fn render_loop<S: FrameSink<STRIP_COUNT, MAX_STRIP_PIXELS>>(
    mut renderer: Renderer<S, STRIP_COUNT, MAX_STRIP_PIXELS>,
    controller: &'static SharedController,
    render_signal: &'static RenderSignal,
    announce_signal: &'static AnnounceSignal,
    commit_sender: CommitSender,
) {
    info!("Render: Loop started ({} ms tick)", TICK_MS);
    let mut write_failed = false;

    loop {
        let now = now_ms();

        let (job, action) = controller.lock(|cell| {
            let c = &mut *cell.borrow_mut();
            renderer.prepare(&c.store, now);

            let job = c.scheduler.poll(now).map(|ticket| CommitJob {
                ticket,
                strips: c.store.snapshot(),
            });
            (job, c.connection.poll(now))
        });

        match renderer.present() {
            Ok(()) => write_failed = false,
            // Nur die erste Fehlschlag-Meldung loggen, nicht jeden Tick
            Err(e) if !write_failed => {
                error!("Render: Frame write failed: {}", e);
                write_failed = true;
            }
            Err(_) => {}
        }

        if let Some(job) = job {
            info!("Render: Commit due, handing snapshot to persistence");
            if let Err(TrySendError::Full(job)) = commit_sender.try_send(job) {
                warn!("Render: Persistence queue full, retrying later");
                controller.lock(|cell| {
                    cell.borrow_mut()
                        .scheduler
                        .finish(job.ticket, Err(StorageError::Busy), now)
                });
            }
        }

        if let Some(LinkAction::RestartAdvertising) = action {
            info!("Render: Link idle, restarting advertisement");
            announce_signal.signal(());
        }

        select(
            Timer::after(Duration::from_millis(TICK_MS)),
            render_signal.wait(),
        )
        .await;
    }
}

/// Render Task - Embassy Task für parallele Ausführung
///
/// Übernimmt die Hardware-Initialisierung und ruft dann `render_loop()` auf.
#[embassy_executor::task]
pub async fn render_task(
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    controller: &'static SharedController,
    render_signal: &'static RenderSignal,
    announce_signal: &'static AnnounceSignal,
    commit_sender: CommitSender,
) {
    // Buffer für alle verketteten Pixel
    let mut rmt_buffer = smart_led_buffer!(TOTAL_PIXELS);

    let writer = RmtFrameWriter::new(gpio8, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer);
    let renderer = Renderer::new(writer, STRIP_LENGTHS);

    render_loop(
        renderer,
        controller,
        render_signal,
        announce_signal,
        commit_sender,
    )
    .await;
}
