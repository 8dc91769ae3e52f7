//! The reconnecting stream client.
//!
//! One driver task owns the connection lifecycle:
//!
//! `Disconnected --connect()--> Connecting --open--> Connected
//! --close--> Disconnected --(delay)--> Connecting --...`
//!
//! Reconnection is loop-driven through a cancellable timer, never
//! recursive, and at most one reconnect is pending at a time. An explicit
//! `disconnect` cancels the driver and no reconnect follows it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vitals_core::{StreamMessage, is_distressed};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::handler::VitalsHandler;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The client's view of its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport and no attempt in flight (a reconnect may be pending).
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The transport is open.
    Connected,
}

struct DriverHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Maintains a persistent connection to the broadcast server and feeds
/// decoded messages to a [`VitalsHandler`].
pub struct VitalsStreamClient {
    config: ClientConfig,
    handler: Arc<dyn VitalsHandler>,
    state: Arc<Mutex<ConnectionState>>,
    connected: Arc<AtomicBool>,
    retry: Arc<Notify>,
    driver: Mutex<Option<DriverHandle>>,
}

impl VitalsStreamClient {
    /// Create a client. Fails only if the URL is not a WebSocket URL.
    pub fn new(
        config: ClientConfig,
        handler: Arc<dyn VitalsHandler>,
    ) -> Result<Self, ClientError> {
        if !config.url.starts_with("ws://") && !config.url.starts_with("wss://") {
            return Err(ClientError::InvalidUrl {
                url: config.url.clone(),
            });
        }
        Ok(Self {
            config,
            handler,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            connected: Arc::new(AtomicBool::new(false)),
            retry: Arc::new(Notify::new()),
            driver: Mutex::new(None),
        })
    }

    /// Open the transport. Idempotent: a no-op while connecting or
    /// connected; while a reconnect is pending it short-circuits the
    /// remaining delay and retries at once. Must be called from within a
    /// tokio runtime.
    pub fn connect(&self) {
        let mut slot = self.driver.lock();
        if let Some(handle) = slot.as_ref() {
            if !handle.task.is_finished() {
                if *self.state.lock() == ConnectionState::Disconnected {
                    debug!("connect during reconnect delay: retrying now");
                    self.retry.notify_one();
                } else {
                    debug!("connect ignored: already connecting or connected");
                }
                return;
            }
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(drive(
            self.config.clone(),
            self.handler.clone(),
            self.state.clone(),
            self.connected.clone(),
            self.retry.clone(),
            cancel.clone(),
        ));
        *slot = Some(DriverHandle { cancel, task });
    }

    /// Close the transport and cancel any pending reconnect. Idempotent;
    /// no reconnect is scheduled as a result of an explicit disconnect.
    pub async fn disconnect(&self) {
        let handle = self.driver.lock().take();
        let Some(handle) = handle else {
            return;
        };
        handle.cancel.cancel();
        if let Err(e) = handle.task.await {
            debug!(error = %e, "driver task ended abnormally");
        }
    }

    /// Whether the transport is live right now (not "has ever connected").
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }
}

fn set_state(state: &Mutex<ConnectionState>, next: ConnectionState) {
    *state.lock() = next;
}

/// Connection lifecycle loop. Runs until cancelled.
async fn drive(
    config: ClientConfig,
    handler: Arc<dyn VitalsHandler>,
    state: Arc<Mutex<ConnectionState>>,
    connected: Arc<AtomicBool>,
    retry: Arc<Notify>,
    cancel: CancellationToken,
) {
    loop {
        set_state(&state, ConnectionState::Connecting);
        debug!(url = %config.url, "connecting to vitals stream");

        tokio::select! {
            () = cancel.cancelled() => break,
            result = connect_async(config.url.as_str()) => match result {
                Ok((ws, _response)) => {
                    set_state(&state, ConnectionState::Connected);
                    connected.store(true, Ordering::SeqCst);
                    info!(url = %config.url, "connected to vitals stream");
                    handler.on_connected();

                    run_connection(ws, handler.as_ref(), &cancel).await;

                    connected.store(false, Ordering::SeqCst);
                    set_state(&state, ConnectionState::Disconnected);
                    info!("disconnected from vitals stream");
                    handler.on_disconnected();
                }
                Err(e) => {
                    warn!(error = %e, "connection attempt failed");
                    set_state(&state, ConnectionState::Disconnected);
                }
            }
        }

        if cancel.is_cancelled() {
            break;
        }

        // Exactly one pending reconnect, through a cancellable timer. An
        // explicit connect() during the wait skips the remaining delay.
        debug!(delay_ms = config.reconnect_delay_ms, "reconnect scheduled");
        tokio::select! {
            () = cancel.cancelled() => break,
            () = retry.notified() => debug!("reconnect requested, skipping delay"),
            () = tokio::time::sleep(config.reconnect_delay()) => {}
        }
    }

    connected.store(false, Ordering::SeqCst);
    set_state(&state, ConnectionState::Disconnected);
}

/// Pump one open connection until it closes or the client is cancelled.
async fn run_connection(ws: WsStream, handler: &dyn VitalsHandler, cancel: &CancellationToken) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatch_message(text.as_str(), handler),
                Some(Ok(Message::Ping(payload))) => {
                    let _ = ws_tx.send(Message::Pong(payload)).await;
                }
                Some(Ok(Message::Close(_))) => {
                    debug!("server sent close frame");
                    break;
                }
                Some(Ok(_)) => {}
                // Logged only; the close path owns the state transition and
                // reconnect scheduling.
                Some(Err(e)) => warn!(error = %e, "transport error"),
                None => break,
            }
        }
    }
}

/// Decode one wire payload and invoke the matching callbacks.
///
/// A malformed payload is dropped without touching the connection and
/// without firing any callback.
fn dispatch_message(text: &str, handler: &dyn VitalsHandler) {
    match StreamMessage::from_json(text) {
        Ok(StreamMessage::Vitals(sample)) => {
            let distressed = is_distressed(sample.pulse_bpm, sample.breathing_bpm);
            handler.on_vitals(&sample);
            handler.on_distress(distressed);
        }
        Ok(StreamMessage::BreathingTrace(trace)) => {
            handler.on_breathing_trace(trace.value);
        }
        Err(e) => debug!(error = %e, "dropping malformed message"),
    }
}
