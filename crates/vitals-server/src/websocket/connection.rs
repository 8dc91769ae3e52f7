//! Server-side state for one connected client session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

/// One live consumer connection.
///
/// The session itself is only "open" or "closed": no per-session history,
/// no sequence numbers, no acknowledgment. A message that cannot be queued
/// at emission time is simply not delivered to this session.
pub struct ClientSession {
    /// Unique session ID.
    pub id: String,
    /// Send channel to the session's socket write task.
    tx: mpsc::Sender<Arc<String>>,
    /// Count of messages dropped due to a full or closed channel.
    dropped_messages: AtomicU64,
}

impl ClientSession {
    /// Create a new session handle.
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            tx,
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Enqueue a text message for this session without blocking.
    ///
    /// Returns `false` if the channel is full or closed, and increments
    /// the dropped message counter.
    pub fn send(&self, message: Arc<String>) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Total messages dropped for this session.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }
}
