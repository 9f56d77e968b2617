//! Property-based tests for the session state machine.
//!
//! The room set must always equal the net effect of the join/leave history,
//! and close must be terminal no matter what came before.

use std::collections::HashSet;

use proptest::prelude::*;
use tally_core::{Session, SessionError};
use tally_proto::{ListEvent, ListId};

#[derive(Debug, Clone)]
enum Op {
    Join(u8),
    Leave(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![(0u8..6).prop_map(Op::Join), (0u8..6).prop_map(Op::Leave)]
}

fn list(room: u8) -> ListId {
    format!("list-{room}").into()
}

fn event() -> ListEvent {
    ListEvent::ProductDeleted { product_id: "p1".into() }
}

fn run(ops: &[Op]) -> Result<(Session, HashSet<ListId>), SessionError> {
    let mut session = Session::new();
    let mut model = HashSet::new();

    for op in ops {
        match *op {
            Op::Join(r) => {
                session.join(list(r))?;
                model.insert(list(r));
            },
            Op::Leave(r) => {
                session.leave(&list(r))?;
                model.remove(&list(r));
            },
        }
    }

    Ok((session, model))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: the room set equals the net effect of the history.
    #[test]
    fn prop_rooms_equal_net_effect(ops in prop::collection::vec(op_strategy(), 0..48)) {
        let (session, model) = run(&ops)?;

        let rooms: HashSet<ListId> = session.rooms().cloned().collect();
        prop_assert_eq!(rooms, model);
    }

    /// Property: receive delivers iff the room is currently joined.
    #[test]
    fn prop_receive_gated_on_membership(
        ops in prop::collection::vec(op_strategy(), 0..48),
        room in 0u8..6,
    ) {
        let (session, model) = run(&ops)?;

        let delivered = session.receive(list(room), event()).is_some();
        prop_assert_eq!(delivered, model.contains(&list(room)));
    }

    /// Property: close is terminal regardless of history.
    #[test]
    fn prop_close_is_terminal(
        ops in prop::collection::vec(op_strategy(), 0..48),
        room in 0u8..6,
    ) {
        let (mut session, _) = run(&ops)?;
        session.close();

        prop_assert_eq!(session.rooms().count(), 0);
        prop_assert_eq!(session.join(list(room)), Err(SessionError::Closed));
        prop_assert_eq!(session.leave(&list(room)), Err(SessionError::Closed));
        prop_assert!(session.emit(list(room), event()).is_err());
        prop_assert!(session.receive(list(room), event()).is_none());
    }
}
