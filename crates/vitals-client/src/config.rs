//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the stream client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Stream URL (default `"ws://127.0.0.1:8765/ws"`).
    pub url: String,
    /// Delay before a reconnect attempt after a disconnect, in
    /// milliseconds (default `3000`). Fixed interval; no backoff growth.
    pub reconnect_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8765/ws".into(),
            reconnect_delay_ms: 3000,
        }
    }
}

impl ClientConfig {
    /// The reconnect delay as a `Duration`.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.url, "ws://127.0.0.1:8765/ws");
    }

    #[test]
    fn default_reconnect_delay() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.reconnect_delay(), Duration::from_secs(3));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ClientConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.url, cfg.url);
        assert_eq!(back.reconnect_delay_ms, cfg.reconnect_delay_ms);
    }

    #[test]
    fn custom_delay() {
        let cfg = ClientConfig {
            reconnect_delay_ms: 250,
            ..ClientConfig::default()
        };
        assert_eq!(cfg.reconnect_delay(), Duration::from_millis(250));
    }
}
