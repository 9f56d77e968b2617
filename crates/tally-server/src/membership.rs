//! Membership registry for room subscription tracking.
//!
//! The registry maintains bidirectional mappings: room → sessions (for
//! broadcast target lookup) and session → rooms (for cleanup on disconnect).
//! Rooms are ephemeral — created implicitly on first join, removed when the
//! last subscriber leaves. There is no explicit destroy step.
//!
//! The registry is an explicit object owned by the driver, constructed once
//! at process start and mutated only on the driver task. Tests construct
//! independent instances.

use std::collections::{HashMap, HashSet};

use tally_proto::ListId;

/// Tracks which live sessions are subscribed to which list's room.
#[derive(Debug, Default)]
pub struct Membership {
    /// Live session ids. A room never references a session outside this set.
    sessions: HashSet<u64>,
    /// Room (list id) → set of subscribed session ids.
    room_subscriptions: HashMap<ListId, HashSet<u64>>,
    /// Session id → set of joined rooms.
    session_rooms: HashMap<u64, HashSet<ListId>>,
}

impl Membership {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live session. Returns `false` if it was already present.
    pub fn register(&mut self, session_id: u64) -> bool {
        if !self.sessions.insert(session_id) {
            return false;
        }
        self.session_rooms.insert(session_id, HashSet::new());
        true
    }

    /// Remove a session from the registry and from every room it joined.
    ///
    /// Called on disconnect; prevents leaked subscriptions. Returns the rooms
    /// the session was in, or `None` if it was never registered.
    pub fn unregister(&mut self, session_id: u64) -> Option<HashSet<ListId>> {
        if !self.sessions.remove(&session_id) {
            return None;
        }
        let rooms = self.session_rooms.remove(&session_id).unwrap_or_default();

        for list_id in &rooms {
            if let Some(subscribers) = self.room_subscriptions.get_mut(list_id) {
                subscribers.remove(&session_id);
                if subscribers.is_empty() {
                    self.room_subscriptions.remove(list_id);
                }
            }
        }

        Some(rooms)
    }

    /// Whether a session is registered.
    #[must_use]
    pub fn has_session(&self, session_id: u64) -> bool {
        self.sessions.contains(&session_id)
    }

    /// Add a session to a room. Idempotent.
    ///
    /// Returns `false` if the session is not registered — an unregistered
    /// session can never appear in a room.
    pub fn join(&mut self, session_id: u64, list_id: ListId) -> bool {
        if !self.sessions.contains(&session_id) {
            return false;
        }

        self.room_subscriptions.entry(list_id.clone()).or_default().insert(session_id);
        self.session_rooms.entry(session_id).or_default().insert(list_id);
        true
    }

    /// Remove a session from a room. Idempotent; no error if absent.
    ///
    /// Returns `true` if the session had been subscribed. Empty rooms are
    /// garbage-collected.
    pub fn leave(&mut self, session_id: u64, list_id: &ListId) -> bool {
        let removed = self
            .room_subscriptions
            .get_mut(list_id)
            .is_some_and(|subscribers| subscribers.remove(&session_id));

        if let Some(rooms) = self.session_rooms.get_mut(&session_id) {
            rooms.remove(list_id);
        }

        if self.room_subscriptions.get(list_id).is_some_and(HashSet::is_empty) {
            self.room_subscriptions.remove(list_id);
        }

        removed
    }

    /// Whether a session is subscribed to a room.
    #[must_use]
    pub fn is_joined(&self, session_id: u64, list_id: &ListId) -> bool {
        self.room_subscriptions.get(list_id).is_some_and(|s| s.contains(&session_id))
    }

    /// Subscribed sessions for a room other than the sender, unordered.
    ///
    /// This exclusion is the only duplicate-prevention mechanism in the
    /// system: the sender already applied its mutation optimistically, so an
    /// echo would double-apply it.
    #[must_use]
    pub fn broadcast_targets(&self, list_id: &ListId, exclude: u64) -> Vec<u64> {
        self.room_subscriptions
            .get(list_id)
            .into_iter()
            .flat_map(|subscribers| subscribers.iter().copied())
            .filter(|&id| id != exclude)
            .collect()
    }

    /// All rooms a session is subscribed to.
    pub fn rooms_for_session(&self, session_id: u64) -> impl Iterator<Item = &ListId> {
        self.session_rooms.get(&session_id).into_iter().flatten()
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of sessions subscribed to a room.
    #[must_use]
    pub fn room_size(&self, list_id: &ListId) -> usize {
        self.room_subscriptions.get(list_id).map_or(0, HashSet::len)
    }
}
