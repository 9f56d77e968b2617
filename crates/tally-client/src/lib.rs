//! Client-side synchronization logic for Tally.
//!
//! Two pieces, both pure state machines in the action pattern:
//!
//! - [`ListView`]: the per-client reconciler. Applies a received
//!   [`tally_proto::ListEvent`] to locally cached list state without
//!   touching the backing store, and computes the display ordering at
//!   render time.
//! - [`ListClient`]: per-client orchestration. Wraps a
//!   [`tally_core::Session`] and one view per joined list; performs
//!   mutations through the external [`tally_core::Store`] and returns the
//!   emit actions the transport should send.
//!
//! The client applies its own mutations optimistically and the relay never
//! echoes them back — that exclusion is the only duplicate-prevention
//! mechanism in the system. Views may transiently diverge from the store
//! (duplicate add, stale delete); a full re-fetch via
//! [`ListClient::refresh`] restores consistency.

#![forbid(unsafe_code)]

mod client;
mod view;

pub use client::{ClientAction, ListClient};
pub use view::ListView;
