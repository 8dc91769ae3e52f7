//! Shared error types.

use thiserror::Error;

/// Failure to decode or encode a wire message.
///
/// Decode failures are always recoverable: the offending message is dropped
/// and the connection stays open.
#[derive(Debug, Error)]
pub enum WireError {
    /// The payload was not a valid message of any known kind.
    #[error("malformed wire message: {0}")]
    Malformed(#[from] serde_json::Error),
}
