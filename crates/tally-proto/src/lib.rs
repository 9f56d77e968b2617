//! Wire types for the Tally list synchronization protocol.
//!
//! Clients and the relay server exchange JSON text frames over a WebSocket.
//! The envelope types ([`ClientMessage`], [`ServerMessage`]) carry a
//! [`ListEvent`], a closed tagged union describing one mutation to a shopping
//! list. Events are transient: they carry no sequence numbers, no timestamps,
//! and no delivery guarantees. The backing store stays authoritative, so a
//! lost or duplicated event is recovered by a full re-fetch, never by the
//! protocol itself.

mod error;
mod event;
mod message;

pub use error::ProtocolError;
pub use event::{ListEvent, ListId, Member, Product, UserId};
pub use message::{ClientMessage, ServerMessage};
