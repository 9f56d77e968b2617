//! Event relay.
//!
//! Stateless fan-out: a published event becomes one delivery per broadcast
//! target, excluding the sender. No acknowledgement, no retry, no
//! durability — an event that reaches a dead connection is permanently
//! lost, and the affected client catches up on its next full re-fetch from
//! the store. That is an accepted failure mode, not a defect.

use tally_proto::{ListEvent, ListId, ServerMessage};

use crate::membership::Membership;

/// One pending delivery produced by a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Target session.
    pub session_id: u64,
    /// Message to send.
    pub msg: ServerMessage,
}

/// Stateless relay from one publisher to the other subscribers of a room.
#[derive(Debug, Default)]
pub struct EventRelay;

impl EventRelay {
    /// Create a relay.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve broadcast targets for a room and produce one delivery per
    /// target, excluding the sender (no echo-back).
    ///
    /// Publishing into an empty or nonexistent room returns no deliveries
    /// and raises no error. Per-target failure isolation is the runtime's
    /// job: a failed write to one target must not block the others.
    #[must_use]
    pub fn publish(
        &self,
        membership: &Membership,
        list_id: &ListId,
        event: &ListEvent,
        sender: u64,
    ) -> Vec<Delivery> {
        membership
            .broadcast_targets(list_id, sender)
            .into_iter()
            .map(|session_id| Delivery {
                session_id,
                msg: ServerMessage::Event { list_id: list_id.clone(), event: event.clone() },
            })
            .collect()
    }
}
