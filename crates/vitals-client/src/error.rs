//! Client errors.

use thiserror::Error;

/// Errors constructing a stream client.
///
/// Transport failures after construction never surface as errors; they
/// feed the reconnect state machine instead.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured URL is not a WebSocket URL.
    #[error("invalid stream url {url}: expected a ws:// or wss:// scheme")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_display() {
        let err = ClientError::InvalidUrl {
            url: "http://example.com".into(),
        };
        assert!(err.to_string().contains("http://example.com"));
        assert!(err.to_string().contains("ws://"));
    }
}
