//! Error types for the sync core.
//!
//! Mutation errors are reported synchronously to the initiating caller and
//! never retried. Real-time delivery failures are not errors at all — they
//! are silently dropped, because the store stays authoritative and a full
//! re-fetch recovers consistency.

use thiserror::Error;

use crate::store::StoreError;

/// Errors from operations on a [`crate::Session`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session has been closed; close is terminal.
    #[error("session is closed")]
    Closed,
}

/// Errors surfaced to the caller of a mutation entry point.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    /// No valid session — checked before any store or relay action.
    #[error("not authenticated")]
    Unauthenticated,

    /// The store rejected the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
}
