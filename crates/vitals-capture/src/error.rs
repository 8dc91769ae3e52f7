//! Capture errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a metrics source.
///
/// Everything that can fail before `run()` is fatal to the host's startup
/// sequence; the host logs it and exits non-zero.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A callback registration was rejected.
    #[error("{callback} callback rejected: {reason}")]
    CallbackRejected {
        /// Which subscription point rejected the registration.
        callback: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// `initialize` was called without the required access credential.
    #[error("missing access credential")]
    MissingCredential,

    /// `run` was called before `initialize`.
    #[error("source not initialized")]
    NotInitialized,

    /// `run` was called while the source was already running.
    #[error("source already running")]
    AlreadyRunning,

    /// A recording file could not be read.
    #[error("failed to read recording {path}: {source}")]
    Recording {
        /// Path to the recording file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A recording line was not a valid frame.
    #[error("malformed recording frame at line {line}: {source}")]
    MalformedFrame {
        /// 1-based line number.
        line: usize,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

impl CaptureError {
    /// Rejection for a callback registration attempted too late or twice.
    pub fn rejected(callback: &'static str, reason: &'static str) -> Self {
        Self::CallbackRejected { callback, reason }
    }
}
