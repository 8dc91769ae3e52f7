//! WebSocket session lifecycle — handles a single connected client from
//! upgrade through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::broadcast::SessionRegistry;
use super::connection::ClientSession;

/// Interval between server-initiated Ping frames.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Run a WebSocket session for a connected client.
///
/// 1. Registers the session with the registry
/// 2. Forwards broadcast messages from the send channel to the socket
/// 3. Sends periodic Ping frames to keep the connection alive
/// 4. Unregisters on close, error, or server shutdown
///
/// The stream is broadcast-only: inbound text frames are ignored.
#[instrument(skip_all, fields(session_id = %session_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    session_id: String,
    registry: Arc<SessionRegistry>,
    queue_capacity: usize,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(queue_capacity);
    let session = Arc::new(ClientSession::new(session_id.clone(), send_tx));
    registry.register(session);

    // Outbound forwarder with periodic Ping frames.
    let outbound = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(PING_INTERVAL);
        // Skip the immediate first tick
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                msg = send_rx.recv() => {
                    match msg {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Drain inbound frames until the client leaves or the server shuts down.
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("server shutting down, closing session");
                break;
            }
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Close(_))) => {
                    info!("client sent close frame");
                    break;
                }
                Some(Ok(Message::Text(text))) => {
                    debug!(len = text.len(), "ignoring inbound text frame");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "socket error");
                    break;
                }
                None => break,
            }
        }
    }

    outbound.abort();
    registry.unregister(&session_id);
}
