//! Server driver.
//!
//! Ties together the per-connection session machines, the membership
//! registry, and the event relay. Follows the action pattern: the runtime
//! feeds [`ServerEvent`]s in, the driver returns [`ServerAction`]s to
//! execute. Pure logic, no I/O — the same driver runs under the production
//! WebSocket runtime and directly inside tests.
//!
//! All membership mutation and relay dispatch happen here, sequenced on the
//! single task that owns the driver. That sequencing is the only locking
//! discipline the core needs.

use std::collections::HashMap;

use tally_core::{Session, SessionAction};
use tally_proto::{ClientMessage, ServerMessage};

use crate::{membership::Membership, relay::EventRelay};

/// Events the runtime feeds into the driver.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// A WebSocket connection completed its handshake.
    Connected {
        /// Session id assigned by the runtime.
        session_id: u64,
    },

    /// A decoded message arrived from a connection. Frames that fail to
    /// decode never reach the driver; the runtime drops them.
    MessageReceived {
        /// Session that sent the message.
        session_id: u64,
        /// The decoded message.
        msg: ClientMessage,
    },

    /// A connection closed (peer or transport error). Terminal per session.
    Disconnected {
        /// Session that closed.
        session_id: u64,
    },
}

/// Actions the driver produces for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAction {
    /// Send a message to one session. Fire-and-forget: a failed send is
    /// logged and dropped, never retried.
    Send {
        /// Target session.
        session_id: u64,
        /// Message to send.
        msg: ServerMessage,
    },

    /// Log a message.
    Log {
        /// Severity.
        level: LogLevel,
        /// Message text.
        message: String,
    },
}

/// Log levels for driver actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug detail.
    Debug,
    /// Informational.
    Info,
    /// Something unexpected but recoverable.
    Warn,
}

/// Action-based relay driver: session lifecycle, room membership, fan-out.
#[derive(Debug, Default)]
pub struct ServerDriver {
    /// Per-connection session machines.
    sessions: HashMap<u64, Session>,
    /// Room membership registry.
    membership: Membership,
    /// Stateless event relay.
    relay: EventRelay,
}

impl ServerDriver {
    /// Create a driver with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one event and return the actions to execute.
    ///
    /// Infallible by design: there is no fatal error condition internal to
    /// the relay or registry. Anomalies (unknown session, closed session)
    /// are logged and ignored.
    pub fn process_event(&mut self, event: ServerEvent) -> Vec<ServerAction> {
        match event {
            ServerEvent::Connected { session_id } => self.handle_connected(session_id),
            ServerEvent::MessageReceived { session_id, msg } => {
                self.handle_message(session_id, msg)
            },
            ServerEvent::Disconnected { session_id } => self.handle_disconnected(session_id),
        }
    }

    fn handle_connected(&mut self, session_id: u64) -> Vec<ServerAction> {
        if !self.membership.register(session_id) {
            return vec![ServerAction::Log {
                level: LogLevel::Warn,
                message: format!("session {session_id} connected twice"),
            }];
        }
        self.sessions.insert(session_id, Session::new());

        vec![ServerAction::Log {
            level: LogLevel::Debug,
            message: format!("session {session_id} connected"),
        }]
    }

    fn handle_message(&mut self, session_id: u64, msg: ClientMessage) -> Vec<ServerAction> {
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return vec![ServerAction::Log {
                level: LogLevel::Warn,
                message: format!("message from unknown session {session_id}"),
            }];
        };

        match msg {
            ClientMessage::Join { list_id } => {
                if session.join(list_id.clone()).is_err() {
                    return vec![ServerAction::Log {
                        level: LogLevel::Warn,
                        message: format!("join from closed session {session_id}"),
                    }];
                }
                self.membership.join(session_id, list_id.clone());

                vec![ServerAction::Log {
                    level: LogLevel::Debug,
                    message: format!("session {session_id} joined room {list_id}"),
                }]
            },

            ClientMessage::Leave { list_id } => {
                let _ = session.leave(&list_id);
                self.membership.leave(session_id, &list_id);

                vec![ServerAction::Log {
                    level: LogLevel::Debug,
                    message: format!("session {session_id} left room {list_id}"),
                }]
            },

            ClientMessage::Emit { list_id, event } => {
                let Ok(SessionAction::Publish { list_id, event }) =
                    session.emit(list_id, event)
                else {
                    return vec![ServerAction::Log {
                        level: LogLevel::Warn,
                        message: format!("emit from closed session {session_id}"),
                    }];
                };

                let deliveries =
                    self.relay.publish(&self.membership, &list_id, &event, session_id);

                let mut actions = vec![ServerAction::Log {
                    level: LogLevel::Debug,
                    message: format!(
                        "relayed {} for room {} to {} subscribers",
                        event.kind(),
                        list_id,
                        deliveries.len()
                    ),
                }];
                actions.extend(deliveries.into_iter().map(|delivery| ServerAction::Send {
                    session_id: delivery.session_id,
                    msg: delivery.msg,
                }));
                actions
            },
        }
    }

    fn handle_disconnected(&mut self, session_id: u64) -> Vec<ServerAction> {
        if let Some(mut session) = self.sessions.remove(&session_id) {
            session.close();
        }

        match self.membership.unregister(session_id) {
            Some(rooms) => vec![ServerAction::Log {
                level: LogLevel::Info,
                message: format!(
                    "session {session_id} disconnected, was in {} rooms",
                    rooms.len()
                ),
            }],
            None => vec![ServerAction::Log {
                level: LogLevel::Warn,
                message: format!("disconnect for unknown session {session_id}"),
            }],
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.membership.session_count()
    }

    /// Number of subscribers in a room.
    #[must_use]
    pub fn room_size(&self, list_id: &tally_proto::ListId) -> usize {
        self.membership.room_size(list_id)
    }
}
