//! Per-client list view and event reconciliation.
//!
//! The view is this client's cached copy of one list: an ordered product
//! sequence plus the member set. It is mutated by exactly two things — the
//! initial full fetch from the store, and applying a received event. It is
//! never the source of truth.
//!
//! Reconciliation runs single-threaded per client, one event at a time in
//! arrival order, so no locking is involved here.

use tally_proto::{ListEvent, Member, Product};

/// Locally cached state of one list.
#[derive(Debug, Clone, Default)]
pub struct ListView {
    products: Vec<Product>,
    members: Vec<Member>,
}

impl ListView {
    /// Create an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole view from a full store fetch. This is the recovery
    /// path for lost events.
    pub fn load(&mut self, products: Vec<Product>, members: Vec<Member>) {
        self.products = products;
        self.members = members;
    }

    /// Apply one received event to the view, without consulting the store.
    ///
    /// Tolerant by design: edits and deletes for ids the view no longer has
    /// are no-ops (the product may have been deleted locally already), and a
    /// re-applied add yields a duplicate entry rather than an error — events
    /// are unordered across senders and may be duplicated.
    pub fn apply(&mut self, event: &ListEvent) {
        match event {
            ListEvent::ProductAdded { product } => {
                // No duplicate check: a double-emitted add duplicates the
                // row, which the next full fetch corrects.
                self.products.push(product.clone());
            },

            ListEvent::ProductEdited { product } => {
                if let Some(existing) =
                    self.products.iter_mut().find(|p| p.id == product.id)
                {
                    *existing = product.clone();
                }
            },

            ListEvent::ProductDeleted { product_id } => {
                self.products.retain(|p| &p.id != product_id);
            },

            ListEvent::MemberAdded { member } => {
                // Set-style insert keyed by user id
                self.members.retain(|m| m.user_id != member.user_id);
                self.members.push(member.clone());
            },

            ListEvent::MemberRemoved { user_id } => {
                self.members.retain(|m| &m.user_id != user_id);
            },
        }
    }

    /// Products in storage (arrival) order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Members of the list.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Products in display order: unchecked before checked, each group
    /// ascending by creation timestamp. Products without a timestamp sort
    /// after dated ones within their group and tie with each other; the sort
    /// is stable, so ties keep arrival order.
    ///
    /// Computed at render time — storage order is never rewritten.
    #[must_use]
    pub fn display_order(&self) -> Vec<&Product> {
        let mut ordered: Vec<&Product> = self.products.iter().collect();
        ordered.sort_by_key(|p| (p.checked, p.created_at.unwrap_or(u64::MAX)));
        ordered
    }

    /// Internal mutable access for the client's optimistic local updates.
    pub(crate) fn products_mut(&mut self) -> &mut Vec<Product> {
        &mut self.products
    }

    /// Internal mutable access for the client's optimistic local updates.
    pub(crate) fn members_mut(&mut self) -> &mut Vec<Member> {
        &mut self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, checked: bool, created_at: Option<u64>) -> Product {
        Product {
            id: id.into(),
            name: format!("product {id}"),
            quantity: 1,
            checked,
            created_at,
        }
    }

    fn member(user_id: &str) -> Member {
        Member {
            user_id: user_id.into(),
            name: None,
            email: format!("{user_id}@example.com"),
        }
    }

    #[test]
    fn add_then_delete_restores_prior_view() {
        let mut view = ListView::new();
        view.load(vec![product("p0", false, Some(1))], vec![]);
        let before = view.products().to_vec();

        view.apply(&ListEvent::ProductAdded { product: product("p1", false, Some(2)) });
        view.apply(&ListEvent::ProductDeleted { product_id: "p1".into() });

        assert_eq!(view.products(), before.as_slice());
    }

    #[test]
    fn duplicate_add_yields_duplicate_entry() {
        let mut view = ListView::new();
        let added = ListEvent::ProductAdded { product: product("p1", false, None) };

        view.apply(&added);
        view.apply(&added);

        assert_eq!(view.products().len(), 2);
    }

    #[test]
    fn edit_replaces_matching_product() {
        let mut view = ListView::new();
        view.apply(&ListEvent::ProductAdded { product: product("p1", false, Some(1)) });

        let mut edited = product("p1", true, Some(1));
        edited.name = "renamed".into();
        view.apply(&ListEvent::ProductEdited { product: edited.clone() });

        assert_eq!(view.product("p1"), Some(&edited));
    }

    #[test]
    fn edit_of_unknown_id_is_a_noop() {
        let mut view = ListView::new();
        view.load(vec![product("p1", false, Some(1))], vec![]);
        let before = view.products().to_vec();

        view.apply(&ListEvent::ProductEdited { product: product("p9", true, Some(9)) });

        assert_eq!(view.products(), before.as_slice());
    }

    #[test]
    fn delete_of_unknown_id_is_a_noop() {
        let mut view = ListView::new();
        view.load(vec![product("p1", false, Some(1))], vec![]);

        view.apply(&ListEvent::ProductDeleted { product_id: "p9".into() });

        assert_eq!(view.products().len(), 1);
    }

    #[test]
    fn member_add_is_set_style() {
        let mut view = ListView::new();

        view.apply(&ListEvent::MemberAdded { member: member("u1") });
        view.apply(&ListEvent::MemberAdded { member: member("u1") });
        assert_eq!(view.members().len(), 1);

        view.apply(&ListEvent::MemberRemoved { user_id: "u1".into() });
        assert!(view.members().is_empty());

        // Removing an absent member is tolerated
        view.apply(&ListEvent::MemberRemoved { user_id: "u1".into() });
        assert!(view.members().is_empty());
    }

    #[test]
    fn display_order_groups_unchecked_first() {
        let mut view = ListView::new();
        view.load(
            vec![
                product("a", true, Some(1)),
                product("b", false, Some(2)),
                product("c", false, Some(1)),
            ],
            vec![],
        );

        let ids: Vec<&str> =
            view.display_order().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn display_order_keeps_arrival_order_for_missing_timestamps() {
        let mut view = ListView::new();
        view.load(
            vec![
                product("a", false, None),
                product("b", false, None),
                product("c", true, None),
            ],
            vec![],
        );

        let ids: Vec<&str> =
            view.display_order().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
