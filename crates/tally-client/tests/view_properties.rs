//! Property-based tests for the view reconciler.
//!
//! Display ordering must be a pure reordering of the stored products with
//! the unchecked-first grouping intact, and the tolerant event application
//! rules must hold for arbitrary views.

use proptest::prelude::*;
use tally_client::ListView;
use tally_proto::{ListEvent, Product};

fn product_strategy() -> impl Strategy<Value = Product> {
    ("[a-z]{1,6}", "[A-Za-z ]{1,12}", 1u32..99, any::<bool>(), proptest::option::of(0u64..1000))
        .prop_map(|(id, name, quantity, checked, created_at)| Product {
            id,
            name,
            quantity,
            checked,
            created_at,
        })
}

fn products_strategy() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec(product_strategy(), 0..16)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: display order is a permutation of the stored products.
    #[test]
    fn prop_display_order_is_a_permutation(products in products_strategy()) {
        let mut view = ListView::new();
        view.load(products.clone(), vec![]);

        let mut displayed: Vec<Product> =
            view.display_order().into_iter().cloned().collect();
        let mut stored = products;

        let key = |p: &Product| (p.id.clone(), p.name.clone(), p.created_at);
        displayed.sort_by_key(key);
        stored.sort_by_key(key);
        prop_assert_eq!(displayed, stored);
    }

    /// Property: no checked product renders before an unchecked one, and
    /// within each group dated products ascend by creation time with undated
    /// ones after them.
    #[test]
    fn prop_display_order_groups_and_sorts(products in products_strategy()) {
        let mut view = ListView::new();
        view.load(products, vec![]);

        let ordered = view.display_order();
        for pair in ordered.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(!a.checked || b.checked);
            if a.checked == b.checked {
                let at = a.created_at.unwrap_or(u64::MAX);
                let bt = b.created_at.unwrap_or(u64::MAX);
                prop_assert!(at <= bt);
            }
        }
    }

    /// Property: adding a fresh product then deleting it restores the view.
    #[test]
    fn prop_add_then_delete_round_trips(
        products in products_strategy(),
        added in product_strategy(),
    ) {
        // Delete removes every entry with the id, so the id must be fresh
        prop_assume!(products.iter().all(|p| p.id != added.id));

        let mut view = ListView::new();
        view.load(products.clone(), vec![]);

        view.apply(&ListEvent::ProductAdded { product: added.clone() });
        view.apply(&ListEvent::ProductDeleted { product_id: added.id });

        prop_assert_eq!(view.products(), products.as_slice());
    }

    /// Property: edits and deletes for unknown ids never change the view.
    #[test]
    fn prop_unknown_ids_are_noops(
        products in products_strategy(),
        stranger in product_strategy(),
    ) {
        prop_assume!(products.iter().all(|p| p.id != stranger.id));

        let mut view = ListView::new();
        view.load(products.clone(), vec![]);

        view.apply(&ListEvent::ProductEdited { product: stranger.clone() });
        view.apply(&ListEvent::ProductDeleted { product_id: stranger.id });

        prop_assert_eq!(view.products(), products.as_slice());
    }
}
