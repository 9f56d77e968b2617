//! WebSocket message envelopes.
//!
//! The transport boundary is three client verbs (`join`, `leave`, `emit`)
//! and one server verb (`event`). Frames are JSON text; a frame that fails
//! to decode is dropped by the receiver rather than answered with an error.

use serde::{Deserialize, Serialize};

use crate::{ListEvent, ListId, ProtocolError};

/// Messages a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Subscribe to a list's room.
    Join {
        /// List to subscribe to.
        list_id: ListId,
    },

    /// Unsubscribe from a list's room.
    Leave {
        /// List to unsubscribe from.
        list_id: ListId,
    },

    /// Relay a mutation event to the other subscribers of a room. The
    /// sender has already committed the mutation to the store.
    Emit {
        /// Room to publish into.
        list_id: ListId,
        /// The mutation event, forwarded unmodified.
        event: ListEvent,
    },
}

/// Messages the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// A mutation event relayed from another subscriber of a joined room.
    Event {
        /// Room the event belongs to.
        list_id: ListId,
        /// The relayed mutation event.
        event: ListEvent,
    },
}

impl ClientMessage {
    /// Encode to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode from a JSON text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}

impl ServerMessage {
    /// Encode to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode from a JSON text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}
