//! Protocol error types.

use thiserror::Error;

/// Errors from encoding or decoding wire frames.
///
/// Decode failures are expected in normal operation — receivers drop frames
/// with kinds they don't recognize — so these carry the serde message as a
/// string rather than the non-`Clone` source error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// JSON serialization failed.
    #[error("failed to encode frame: {0}")]
    Encode(String),

    /// JSON deserialization failed (malformed frame or unknown kind).
    #[error("failed to decode frame: {0}")]
    Decode(String),
}
