// Control Task - HTTP Server mit Steuer-WebSocket
//
// - /ws:        Steuerkanal, jede Text-Nachricht ist ein Kommando
//               (GET_CONFIG wird auf demselben Socket beantwortet)
// - GET /config: Status-Dokument als JSON
//
// Es ist immer nur ein Steuer-Client verbunden. Upgrade = Verbindung,
// Schließen des Sockets = Trennung (für die Connection State Machine).
use alloc::string::String;
use core::future::pending;
use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::Duration;
use maske_core::{Reply, write_status};
use picoserve::{io::embedded_io_async, response::IntoResponse, response::ws, routing::get};

use crate::config::*;
use crate::{RenderSignal, SharedController, now_ms};

/// Belegt solange ein Steuer-Client verbunden ist
static CLIENT_CONNECTED: AtomicBool = AtomicBool::new(false);

/// Reservierter Platz für den einen Steuer-Client
///
/// Gibt den Platz beim Drop wieder frei, auch wenn das Upgrade scheitert.
struct ClientSlot;

impl ClientSlot {
    fn acquire() -> Option<Self> {
        CLIENT_CONNECTED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ClientSlot)
    }
}

impl Drop for ClientSlot {
    fn drop(&mut self) {
        CLIENT_CONNECTED.store(false, Ordering::Release);
    }
}

/// Response-Enum für WebSocket-Endpoint
/// Ermöglicht Rückgabe von entweder WebSocket-Upgrade oder HTTP-Fehler
enum WebSocketResponse {
    Upgrade(
        ws::UpgradedWebSocket<ws::UnspecifiedProtocol, ws::CallbackNotUsingState<ControlHandler>>,
    ),
    ServiceUnavailable,
}

impl IntoResponse for WebSocketResponse {
    async fn write_to<
        R: embedded_io_async::Read,
        W: picoserve::response::ResponseWriter<Error = R::Error>,
    >(
        self,
        connection: picoserve::response::Connection<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        match self {
            WebSocketResponse::Upgrade(ws) => ws.write_to(connection, response_writer).await,
            WebSocketResponse::ServiceUnavailable => {
                picoserve::response::Response::new(
                    picoserve::response::StatusCode::new(503),
                    "Service Unavailable: control client already connected",
                )
                .with_header("Retry-After", "5")
                .write_to(connection, response_writer)
                .await
            }
        }
    }
}

/// HTTP Server Task
///
/// **Task Pool:** Wird mehrfach gespawnt, damit ein verbundener Steuer-Client
/// weder GET /config noch die 503-Antwort für weitere Clients blockiert.
///
/// # Parameter
/// - `task_id`: Eindeutige ID für diese Server-Instanz
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `controller`: Geteilter Controller (Store, Scheduler, Verbindung)
/// - `render_signal`: Weckt den Render-Task nach einer Mutation
#[embassy_executor::task(pool_size = HTTP_TASK_COUNT)]
pub async fn control_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    controller: &'static SharedController,
    render_signal: &'static RenderSignal,
) {
    info!("Control: Server task {} starting on port {}...", task_id, HTTP_PORT);

    let app = picoserve::Router::new()
        .route(
            "/config",
            get(move || async move { serve_config(controller) }),
        )
        .route(
            "/ws",
            get(
                move |upgrade: picoserve::response::WebSocketUpgrade| async move {
                    match ClientSlot::acquire() {
                        Some(slot) => {
                            info!("Control: WebSocket upgrade accepted");
                            let handler = ControlHandler {
                                controller,
                                render_signal,
                                _slot: slot,
                            };
                            WebSocketResponse::Upgrade(upgrade.on_upgrade(handler))
                        }
                        None => {
                            warn!("Control: Client already connected, sending HTTP 503");
                            WebSocketResponse::ServiceUnavailable
                        }
                    }
                },
            ),
        );

    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    let _ = server
        .listen_and_serve(task_id, *stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("Control: Server task {} ended", task_id);
}

/// Beantwortet GET /config mit dem Status-Dokument
fn serve_config(controller: &'static SharedController) -> impl IntoResponse {
    let mut buffer = [0u8; STATUS_BUFFER_SIZE];
    let written = controller.lock(|cell| write_status(&cell.borrow().store, &mut buffer));

    let (status, body) = match written
        .ok()
        .and_then(|len| core::str::from_utf8(&buffer[..len]).ok())
    {
        Some(json) => (200, String::from(json)),
        None => {
            warn!("Control: Status document does not fit into buffer");
            (500, String::from(r#"{"error":"status unavailable"}"#))
        }
    };

    picoserve::response::Response::new(picoserve::response::StatusCode::new(status), body)
        .with_header("Content-Type", "application/json")
}

/// Handler für den Steuer-WebSocket
struct ControlHandler {
    controller: &'static SharedController,
    render_signal: &'static RenderSignal,
    _slot: ClientSlot,
}

impl ws::WebSocketCallback for ControlHandler {
    async fn run<R: embedded_io_async::Read, W: embedded_io_async::Write<Error = R::Error>>(
        self,
        mut rx: ws::SocketRx<R>,
        mut tx: ws::SocketTx<W>,
    ) -> Result<(), W::Error> {
        info!("Control: Client connected");
        self.controller
            .lock(|cell| cell.borrow_mut().connection.on_connect());

        let outcome = self.serve(&mut rx, &mut tx).await;

        let now = now_ms();
        self.controller
            .lock(|cell| cell.borrow_mut().connection.on_disconnect(now));
        info!("Control: Client disconnected");

        tx.close(outcome?).await
    }
}

impl ControlHandler {
    /// Empfangsschleife bis der Client schließt
    ///
    /// Liefert den Close-Grund für das abschließende Close-Frame.
    async fn serve<R: embedded_io_async::Read, W: embedded_io_async::Write<Error = R::Error>>(
        &self,
        rx: &mut ws::SocketRx<R>,
        tx: &mut ws::SocketTx<W>,
    ) -> Result<Option<(u16, &'static str)>, W::Error> {
        let mut buffer = [0u8; WEBSOCKET_BUFFER_SIZE];

        loop {
            let message = rx.next_message(&mut buffer, pending()).await?.ignore_never_b();

            match message {
                Ok(ws::Message::Text(data)) => self.dispatch(data.as_bytes(), tx).await?,
                Ok(ws::Message::Binary(data)) => self.dispatch(data, tx).await?,
                Ok(ws::Message::Ping(data)) => tx.send_pong(data).await?,
                Ok(ws::Message::Pong(_)) => {}
                Ok(ws::Message::Close(_reason)) => {
                    info!("Control: WebSocket close received");
                    return Ok(None);
                }
                Err(error) => {
                    warn!("Control: WebSocket error");
                    return Ok(Some((error.code(), "WebSocket Error")));
                }
            }
        }
    }

    /// Wendet ein Kommando an und sendet ggf. das Status-Dokument zurück
    async fn dispatch<W: embedded_io_async::Write>(
        &self,
        message: &[u8],
        tx: &mut ws::SocketTx<W>,
    ) -> Result<(), W::Error> {
        let mut response = [0u8; STATUS_BUFFER_SIZE];
        let now = now_ms();
        let outcome = self.controller.lock(|cell| {
            cell.borrow_mut()
                .handle_message(message, now, &mut response)
        });

        match outcome {
            Ok(Reply::Updated) => self.render_signal.signal(()),
            Ok(Reply::Status(len)) => match core::str::from_utf8(&response[..len]) {
                Ok(json) => tx.send_text(json).await?,
                Err(_) => warn!("Control: Status document is not UTF-8"),
            },
            Err(e) => warn!("Control: Command rejected: {}", e),
        }
        Ok(())
    }
}
