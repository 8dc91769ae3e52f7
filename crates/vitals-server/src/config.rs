//! Server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the vitals broadcast server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8765`; `0` for auto-assign in tests).
    pub port: u16,
    /// Per-session outbound queue capacity. A session whose queue is full
    /// misses messages rather than stalling the producer.
    pub send_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8765,
            send_queue_capacity: 256,
        }
    }
}
