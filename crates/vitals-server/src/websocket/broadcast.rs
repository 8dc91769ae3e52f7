//! Sample fan-out to connected sessions.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use vitals_core::StreamMessage;

use super::connection::ClientSession;

/// The set of live sessions, guarded by a single lock.
///
/// Registration, removal, and broadcast iteration all go through this lock.
/// The methods are synchronous so the metrics producer can broadcast from
/// its own (non-async) thread; per-session delivery is a non-blocking
/// enqueue, so the lock is never held across a network send.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<ClientSession>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session.
    pub fn register(&self, session: Arc<ClientSession>) {
        let mut sessions = self.sessions.write();
        let _ = sessions.insert(session.id.clone(), session);
        info!(total = sessions.len(), "client connected");
    }

    /// Remove a session by ID. Explicit removal through the transport's
    /// close handling is the only way a session leaves the set.
    pub fn unregister(&self, session_id: &str) {
        let mut sessions = self.sessions.write();
        if sessions.remove(session_id).is_some() {
            info!(total = sessions.len(), "client disconnected");
        }
    }

    /// Broadcast a message to every registered session, best effort.
    ///
    /// The message is serialized once and shared. A failed enqueue is
    /// logged and skipped; it never removes the session and never stops
    /// delivery to the remaining sessions. Returns the number of sessions
    /// the message was enqueued for.
    pub fn broadcast(&self, message: &StreamMessage) -> usize {
        let json = match message.to_json() {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(error = %e, "failed to serialize broadcast message");
                return 0;
            }
        };

        let sessions = self.sessions.read();
        let mut delivered = 0;
        for session in sessions.values() {
            if session.send(json.clone()) {
                delivered += 1;
            } else {
                warn!(
                    session_id = %session.id,
                    dropped = session.drop_count(),
                    "failed to enqueue message for client"
                );
            }
        }
        debug!(delivered, total = sessions.len(), "broadcast message");
        delivered
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether a session is currently registered.
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use vitals_core::{BreathingTraceSample, VitalsSample};

    fn make_session_with_rx(
        id: &str,
        capacity: usize,
    ) -> (Arc<ClientSession>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Arc::new(ClientSession::new(id.into(), tx)), rx)
    }

    fn vitals_message() -> StreamMessage {
        StreamMessage::Vitals(VitalsSample {
            timestamp_micros: 1,
            pulse_bpm: 70,
            pulse_confidence: 0.9,
            breathing_bpm: 14,
            breathing_confidence: 0.8,
        })
    }

    #[tokio::test]
    async fn register_and_count() {
        let registry = SessionRegistry::new();
        let (s1, _rx1) = make_session_with_rx("s1", 8);
        registry.register(s1);
        assert_eq!(registry.session_count(), 1);
    }

    #[tokio::test]
    async fn unregister_removes_session() {
        let registry = SessionRegistry::new();
        let (s1, _rx1) = make_session_with_rx("s1", 8);
        registry.register(s1);
        registry.unregister("s1");
        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn unregister_nonexistent_is_noop() {
        let registry = SessionRegistry::new();
        registry.unregister("no_such");
        assert_eq!(registry.session_count(), 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_all_sessions() {
        let registry = SessionRegistry::new();
        let (s1, mut rx1) = make_session_with_rx("s1", 8);
        let (s2, mut rx2) = make_session_with_rx("s2", 8);
        registry.register(s1);
        registry.register(s2);

        let delivered = registry.broadcast(&vitals_message());
        assert_eq!(delivered, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_serializes_once() {
        let registry = SessionRegistry::new();
        let (s1, mut rx1) = make_session_with_rx("s1", 8);
        let (s2, mut rx2) = make_session_with_rx("s2", 8);
        registry.register(s1);
        registry.register(s2);

        let _ = registry.broadcast(&vitals_message());
        let m1 = rx1.try_recv().unwrap();
        let m2 = rx2.try_recv().unwrap();
        assert!(Arc::ptr_eq(&m1, &m2));
    }

    #[tokio::test]
    async fn failed_send_skips_session_without_unregistering() {
        let registry = SessionRegistry::new();
        // Dead session: receiver dropped so every send fails.
        let (dead, dead_rx) = make_session_with_rx("dead", 8);
        drop(dead_rx);
        let (s1, mut rx1) = make_session_with_rx("s1", 8);
        let (s2, mut rx2) = make_session_with_rx("s2", 8);
        registry.register(dead);
        registry.register(s1);
        registry.register(s2);

        let delivered = registry.broadcast(&vitals_message());

        // Everyone except the dead session still receives.
        assert_eq!(delivered, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        // The send failure alone never removes the session.
        assert!(registry.contains("dead"));
        assert_eq!(registry.session_count(), 3);
    }

    #[tokio::test]
    async fn full_queue_drops_message_for_that_session_only() {
        let registry = SessionRegistry::new();
        let (slow, _slow_rx) = make_session_with_rx("slow", 1);
        let (fast, mut fast_rx) = make_session_with_rx("fast", 8);
        registry.register(slow);
        registry.register(fast);

        let _ = registry.broadcast(&vitals_message());
        let delivered = registry.broadcast(&vitals_message());

        // Slow session's queue of 1 is full on the second broadcast.
        assert_eq!(delivered, 1);
        assert!(fast_rx.try_recv().is_ok());
        assert!(fast_rx.try_recv().is_ok());
        assert!(registry.contains("slow"));
    }

    #[test]
    fn broadcast_to_empty_registry() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.broadcast(&vitals_message()), 0);
    }

    #[tokio::test]
    async fn broadcast_payload_is_wire_json() {
        let registry = SessionRegistry::new();
        let (s1, mut rx1) = make_session_with_rx("s1", 8);
        registry.register(s1);

        let _ = registry.broadcast(&StreamMessage::BreathingTrace(BreathingTraceSample {
            value: 0.25,
        }));
        let msg = rx1.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["type"], "breathing_trace");
        assert_eq!(parsed["value"], 0.25);
    }

    #[tokio::test]
    async fn register_overwrites_same_id() {
        let registry = SessionRegistry::new();
        let (s1, _rx1) = make_session_with_rx("same", 8);
        let (s2, mut rx2) = make_session_with_rx("same", 8);
        registry.register(s1);
        registry.register(s2);
        assert_eq!(registry.session_count(), 1);

        let _ = registry.broadcast(&vitals_message());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn default_registry_is_empty() {
        let registry = SessionRegistry::default();
        assert_eq!(registry.session_count(), 0);
    }
}
