//! Server runtime errors.
//!
//! These cover the transport plumbing only. Relay and registry logic is
//! infallible by design: delivery failures are logged and dropped, never
//! surfaced as errors.

use thiserror::Error;

/// Errors from the production WebSocket runtime.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket bind/accept failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket handshake failed.
    #[error("websocket handshake failed: {0}")]
    Handshake(String),
}
