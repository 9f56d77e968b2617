//! Core logic for the Tally list synchronization protocol.
//!
//! This crate holds the pieces shared by the relay server and the client:
//! the per-connection [`Session`] state machine, and the contracts for the
//! two external collaborators the sync core consumes — the [`Store`] (the
//! authoritative persistent data holder) and the [`Identity`] resolver (who
//! the current user is).
//!
//! Everything here is pure logic in the action pattern: methods consume
//! inputs and return values or actions for a driver to execute. No I/O, no
//! ambient time, no globals — each test constructs its own instances.

#![forbid(unsafe_code)]

mod error;
mod identity;
mod memory;
mod session;
mod store;

pub use error::{MutationError, SessionError};
pub use identity::{FixedIdentity, Identity};
pub use memory::MemoryStore;
pub use session::{Session, SessionAction, SessionState};
pub use store::{ProductPatch, Store, StoreError};
