//! In-memory store implementation.
//!
//! Deterministic stand-in for the real database, used by tests and demos.
//! Ids and creation timestamps come from a monotonic counter so runs are
//! reproducible without a clock.

use std::collections::HashMap;

use tally_proto::{ListId, Member, Product, UserId};

use crate::store::{ProductPatch, Store, StoreError};

/// In-memory [`Store`] backed by hash maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// List id → products in creation order.
    products: HashMap<ListId, Vec<Product>>,
    /// List id → members in join order.
    members: HashMap<ListId, Vec<Member>>,
    /// Known users, keyed by email (the identity provider's directory).
    users: HashMap<String, Member>,
    /// Monotonic counter for ids and timestamps.
    seq: u64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user in the directory so `add_member` can resolve their
    /// email.
    pub fn register_user(&mut self, user_id: impl Into<UserId>, email: &str, name: Option<&str>) {
        let member = Member {
            user_id: user_id.into(),
            name: name.map(str::to_owned),
            email: email.to_owned(),
        };
        self.users.insert(email.to_owned(), member);
    }

    /// Create an empty list.
    pub fn create_list(&mut self, list_id: impl Into<ListId>) {
        let list_id = list_id.into();
        self.products.entry(list_id.clone()).or_default();
        self.members.entry(list_id).or_default();
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn find_product_mut(&mut self, product_id: &str) -> Option<&mut Product> {
        self.products.values_mut().flatten().find(|p| p.id == product_id)
    }
}

impl Store for MemoryStore {
    fn create_product(
        &mut self,
        list_id: &ListId,
        name: &str,
        quantity: u32,
    ) -> Result<Product, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidInput("product name must not be empty".into()));
        }
        if !self.products.contains_key(list_id) {
            return Err(StoreError::NotFound(format!("list {list_id}")));
        }

        let seq = self.next_seq();
        let product = Product {
            id: format!("p{seq}"),
            name: name.to_owned(),
            quantity,
            checked: false,
            created_at: Some(seq),
        };

        if let Some(products) = self.products.get_mut(list_id) {
            products.push(product.clone());
        }
        Ok(product)
    }

    fn update_product(
        &mut self,
        product_id: &str,
        patch: ProductPatch,
    ) -> Result<Product, StoreError> {
        let product = self
            .find_product_mut(product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(StoreError::InvalidInput("product name must not be empty".into()));
            }
            product.name = name;
        }
        if let Some(quantity) = patch.quantity {
            product.quantity = quantity;
        }
        if let Some(checked) = patch.checked {
            product.checked = checked;
        }

        Ok(product.clone())
    }

    fn delete_product(&mut self, product_id: &str) -> Result<(), StoreError> {
        for products in self.products.values_mut() {
            if let Some(pos) = products.iter().position(|p| p.id == product_id) {
                products.remove(pos);
                return Ok(());
            }
        }
        Err(StoreError::NotFound(format!("product {product_id}")))
    }

    fn add_member(&mut self, list_id: &ListId, email: &str) -> Result<Member, StoreError> {
        let member = self
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("no user with email {email}")))?;

        let members = self
            .members
            .get_mut(list_id)
            .ok_or_else(|| StoreError::NotFound(format!("list {list_id}")))?;

        if members.iter().any(|m| m.user_id == member.user_id) {
            return Err(StoreError::Conflict(format!("{email} is already a member")));
        }

        members.push(member.clone());
        Ok(member)
    }

    fn remove_member(&mut self, list_id: &ListId, user_id: &UserId) -> Result<(), StoreError> {
        let members = self
            .members
            .get_mut(list_id)
            .ok_or_else(|| StoreError::NotFound(format!("list {list_id}")))?;

        let Some(pos) = members.iter().position(|m| &m.user_id == user_id) else {
            return Err(StoreError::NotFound(format!("member {user_id}")));
        };
        members.remove(pos);
        Ok(())
    }

    fn products(&self, list_id: &ListId) -> Result<Vec<Product>, StoreError> {
        self.products
            .get(list_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("list {list_id}")))
    }

    fn members(&self, list_id: &ListId) -> Result<Vec<Member>, StoreError> {
        self.members
            .get(list_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("list {list_id}")))
    }
}
