//! The store collaborator contract.
//!
//! The store is the sole source of truth for lists, products, and
//! memberships. The sync core calls it before emitting any event and never
//! infers state purely from events; a client that missed events recovers by
//! re-fetching `products`/`members` in full.

use tally_proto::{ListId, Member, Product, UserId};
use thiserror::Error;

/// Errors reported synchronously by the store. None are retried by the core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced list, product, or user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The member is already on the list.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A required field is missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Partial update for a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    /// New product name.
    pub name: Option<String>,
    /// New quantity.
    pub quantity: Option<u32>,
    /// New checked flag.
    pub checked: Option<bool>,
}

impl ProductPatch {
    /// Patch that flips only the checked flag.
    #[must_use]
    pub fn checked(checked: bool) -> Self {
        Self { checked: Some(checked), ..Self::default() }
    }

    /// Patch that renames and re-quantifies a product.
    #[must_use]
    pub fn rename(name: impl Into<String>, quantity: u32) -> Self {
        Self { name: Some(name.into()), quantity: Some(quantity), checked: None }
    }
}

/// The authoritative persistent data holder (external collaborator).
///
/// Calls are synchronous to the caller. Implementations own id and timestamp
/// assignment; the returned records are what gets broadcast to other
/// subscribers, so they must be complete.
pub trait Store {
    /// Create a product on a list. The store assigns `id` and `created_at`.
    fn create_product(
        &mut self,
        list_id: &ListId,
        name: &str,
        quantity: u32,
    ) -> Result<Product, StoreError>;

    /// Apply a partial update to a product and return the updated record.
    fn update_product(
        &mut self,
        product_id: &str,
        patch: ProductPatch,
    ) -> Result<Product, StoreError>;

    /// Delete a product.
    fn delete_product(&mut self, product_id: &str) -> Result<(), StoreError>;

    /// Add a member to a list by email. Fails with [`StoreError::NotFound`]
    /// if no user has that email and [`StoreError::Conflict`] if the user is
    /// already a member.
    fn add_member(&mut self, list_id: &ListId, email: &str) -> Result<Member, StoreError>;

    /// Remove a member from a list.
    fn remove_member(&mut self, list_id: &ListId, user_id: &UserId) -> Result<(), StoreError>;

    /// All products on a list, in creation order (initial full fetch).
    fn products(&self, list_id: &ListId) -> Result<Vec<Product>, StoreError>;

    /// All members of a list (initial full fetch).
    fn members(&self, list_id: &ListId) -> Result<Vec<Member>, StoreError>;
}
