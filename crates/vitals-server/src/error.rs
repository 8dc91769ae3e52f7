//! Server errors.

use thiserror::Error;

/// Fatal server startup errors. Anything after startup is per-session and
/// handled locally.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested listen address.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The bound listener's local address could not be read.
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

impl ServerError {
    /// Bind failure for `addr`.
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
