//! Property-based tests for the membership registry.
//!
//! The registry is checked against a naive model (plain sets, no reverse
//! index) under arbitrary operation sequences: the bidirectional maps must
//! never disagree with the model, and the sender exclusion must hold for
//! every broadcast.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use tally_proto::ListId;
use tally_server::Membership;

/// One registry operation. Session ids and rooms are drawn from small pools
/// so sequences actually collide.
#[derive(Debug, Clone)]
enum Op {
    Register(u64),
    Unregister(u64),
    Join(u64, u8),
    Leave(u64, u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let session = 0u64..8;
    let room = 0u8..4;
    prop_oneof![
        session.clone().prop_map(Op::Register),
        session.clone().prop_map(Op::Unregister),
        (session.clone(), room.clone()).prop_map(|(s, r)| Op::Join(s, r)),
        (session, room).prop_map(|(s, r)| Op::Leave(s, r)),
    ]
}

fn list(room: u8) -> ListId {
    format!("list-{room}").into()
}

/// Reference model: sessions plus room → subscriber sets, maintained with
/// the obvious rules and no reverse index.
#[derive(Debug, Default)]
struct Model {
    sessions: HashSet<u64>,
    rooms: HashMap<ListId, HashSet<u64>>,
}

impl Model {
    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Register(s) => {
                self.sessions.insert(s);
            },
            Op::Unregister(s) => {
                self.sessions.remove(&s);
                for subscribers in self.rooms.values_mut() {
                    subscribers.remove(&s);
                }
            },
            Op::Join(s, r) => {
                if self.sessions.contains(&s) {
                    self.rooms.entry(list(r)).or_default().insert(s);
                }
            },
            Op::Leave(s, r) => {
                if let Some(subscribers) = self.rooms.get_mut(&list(r)) {
                    subscribers.remove(&s);
                }
            },
        }
    }

    fn subscribers(&self, room: u8) -> HashSet<u64> {
        self.rooms.get(&list(room)).cloned().unwrap_or_default()
    }
}

fn run(ops: &[Op]) -> (Membership, Model) {
    let mut membership = Membership::new();
    let mut model = Model::default();

    for op in ops {
        match *op {
            Op::Register(s) => {
                membership.register(s);
            },
            Op::Unregister(s) => {
                let _ = membership.unregister(s);
            },
            Op::Join(s, r) => {
                membership.join(s, list(r));
            },
            Op::Leave(s, r) => {
                membership.leave(s, &list(r));
            },
        }
        model.apply(op);
    }

    (membership, model)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: the registry agrees with the naive model after any
    /// operation sequence.
    #[test]
    fn prop_registry_matches_model(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let (membership, model) = run(&ops);

        prop_assert_eq!(membership.session_count(), model.sessions.len());

        for room in 0..4 {
            let expected = model.subscribers(room);
            prop_assert_eq!(membership.room_size(&list(room)), expected.len());

            for session in 0..8u64 {
                prop_assert_eq!(
                    membership.is_joined(session, &list(room)),
                    expected.contains(&session)
                );
            }
        }
    }

    /// Property: a broadcast never includes the sender, no matter the
    /// history.
    #[test]
    fn prop_broadcast_never_echoes_sender(
        ops in prop::collection::vec(op_strategy(), 0..64),
        sender in 0u64..8,
        room in 0u8..4,
    ) {
        let (membership, model) = run(&ops);

        let targets: HashSet<u64> =
            membership.broadcast_targets(&list(room), sender).into_iter().collect();

        prop_assert!(!targets.contains(&sender));

        let mut expected = model.subscribers(room);
        expected.remove(&sender);
        prop_assert_eq!(targets, expected);
    }

    /// Property: join then leave is a net no-op for that room's targets.
    #[test]
    fn prop_join_leave_round_trip(
        ops in prop::collection::vec(op_strategy(), 0..32),
        session in 0u64..8,
        room in 0u8..4,
    ) {
        let (mut membership, _) = run(&ops);
        let before = membership.is_joined(session, &list(room));

        membership.register(session);
        membership.join(session, list(room));
        membership.leave(session, &list(room));

        prop_assert!(!membership.is_joined(session, &list(room)));
        // Leaving never resurrects a prior subscription
        prop_assert!(!before || !membership.is_joined(session, &list(room)));
    }

    /// Property: unregistering every session empties the registry, including
    /// every room.
    #[test]
    fn prop_unregister_all_leaves_nothing(
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let (mut membership, _) = run(&ops);

        for session in 0..8 {
            let _ = membership.unregister(session);
        }

        prop_assert_eq!(membership.session_count(), 0);
        for room in 0..4 {
            prop_assert_eq!(membership.room_size(&list(room)), 0);
            prop_assert!(membership.broadcast_targets(&list(room), u64::MAX).is_empty());
        }
    }
}
