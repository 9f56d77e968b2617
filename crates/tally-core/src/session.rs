//! Per-connection session state machine.
//!
//! One [`Session`] exists per client connection, on both ends of the wire:
//! the server driver keeps one per accepted connection (mirrored into its
//! membership registry), and the client keeps one to gate delivery of
//! relayed events to its reconciler.
//!
//! # State machine
//!
//! ```text
//! ┌───────────┐   new()    ┌───────────┐  join/leave*  ┌───────────┐
//! │Disconnected│──────────>│ Connected │──────────────>│ Connected │
//! └───────────┘            └───────────┘               └───────────┘
//!                                │                           │
//!                                │ close()                   │ close()
//!                                ↓                           ↓
//!                           ┌────────┐                  ┌────────┐
//!                           │ Closed │  (terminal)      │ Closed │
//!                           └────────┘                  └────────┘
//! ```
//!
//! Joining is idempotent and a session may hold any number of rooms at once
//! (the application joins one at a time in practice, but the contract does
//! not forbid more). Close is terminal: a closed session rejects emits and
//! drops received events.

use std::collections::HashSet;

use tally_proto::{ListEvent, ListId};

use crate::error::SessionError;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected to the relay; may join rooms and emit events.
    Connected,
    /// Transport gone. Terminal.
    Closed,
}

/// Actions produced by the session for its driver to execute.
///
/// The server driver executes `Publish` by handing the event to the relay;
/// the client executes `Deliver` by handing it to the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Forward a locally-initiated event to the event relay.
    Publish {
        /// Room to publish into.
        list_id: ListId,
        /// The event, unmodified from what the caller emitted.
        event: ListEvent,
    },

    /// Hand a relayed event to this client's reconciler.
    Deliver {
        /// Room the event arrived for.
        list_id: ListId,
        /// The relayed event.
        event: ListEvent,
    },
}

/// Per-connection session: lifecycle plus the set of joined rooms.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    rooms: HashSet<ListId>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Connected
    }
}

impl Session {
    /// Create a session in the connected state. Construction is the
    /// `disconnected → connected` transition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Join a room. Idempotent: joining a room twice is not an error.
    ///
    /// Returns `true` if the room was newly joined.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Closed`] if the session has been closed.
    pub fn join(&mut self, list_id: ListId) -> Result<bool, SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        Ok(self.rooms.insert(list_id))
    }

    /// Leave a room. Idempotent: leaving a room the session never joined is
    /// not an error.
    ///
    /// Returns `true` if the session had been joined.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Closed`] if the session has been closed.
    pub fn leave(&mut self, list_id: &ListId) -> Result<bool, SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        Ok(self.rooms.remove(list_id))
    }

    /// Whether the session is currently joined to a room.
    #[must_use]
    pub fn is_joined(&self, list_id: &ListId) -> bool {
        self.rooms.contains(list_id)
    }

    /// All rooms the session is joined to, unordered.
    pub fn rooms(&self) -> impl Iterator<Item = &ListId> {
        self.rooms.iter()
    }

    /// Emit a locally-initiated event for relay to the room's other
    /// subscribers. The caller has already committed the mutation to the
    /// store; the event passes through unmodified.
    ///
    /// Emitting does not require having joined the room first — the relay
    /// resolves targets from its own registry, and a room with no other
    /// subscribers makes the publish a silent no-op downstream.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Closed`] if the session has been closed.
    pub fn emit(
        &self,
        list_id: ListId,
        event: ListEvent,
    ) -> Result<SessionAction, SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        Ok(SessionAction::Publish { list_id, event })
    }

    /// Process a relayed event arriving from the transport.
    ///
    /// Returns a `Deliver` action iff the session is connected and joined to
    /// the event's room; otherwise the event is dropped silently. Dropping is
    /// not an error — delivery is best-effort and the store stays
    /// authoritative.
    #[must_use]
    pub fn receive(&self, list_id: ListId, event: ListEvent) -> Option<SessionAction> {
        if self.state != SessionState::Connected || !self.rooms.contains(&list_id) {
            return None;
        }
        Some(SessionAction::Deliver { list_id, event })
    }

    /// Close the session. Terminal: the rooms set is cleared and every
    /// subsequent `join`/`leave`/`emit` fails, every `receive` drops.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        self.rooms.clear();
    }
}
