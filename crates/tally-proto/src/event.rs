//! List mutation events and the records they carry.
//!
//! A [`ListEvent`] describes exactly one state change to a list. The variant
//! set is closed: every dispatch site matches exhaustively, so adding a kind
//! is a compile error until all receivers handle it. Kinds carry only the
//! fields they need — a full record for add/edit (the receiver has nothing to
//! merge against), a bare id for delete/remove.

use serde::{Deserialize, Serialize};

/// Opaque list identifier. Room identifiers equal list identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub String);

impl std::fmt::Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ListId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque user identifier assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A product line on a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned product id.
    pub id: String,
    /// Product name.
    pub name: String,
    /// Quantity to buy.
    pub quantity: u32,
    /// Whether the product has been checked off.
    pub checked: bool,
    /// Creation time in epoch milliseconds, assigned by the store.
    /// Absent for records from stores that predate the column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}

/// A user with access to a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The member's user id.
    pub user_id: UserId,
    /// Display name, if the identity provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The member's email address.
    pub email: String,
}

/// One mutation to a list, relayed to other subscribers after the initiating
/// client has already committed it to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ListEvent {
    /// A product was created. Carries the full record as the store returned
    /// it so receivers can append without a fetch.
    ProductAdded {
        /// The created product.
        product: Product,
    },

    /// A product was renamed, re-quantified, or (un)checked. Carries the
    /// full updated record; receivers replace by id.
    ProductEdited {
        /// The updated product.
        product: Product,
    },

    /// A product was deleted.
    ProductDeleted {
        /// Id of the deleted product.
        product_id: String,
    },

    /// A collaborator was added to the list.
    MemberAdded {
        /// The added member.
        member: Member,
    },

    /// A collaborator was removed (or left the list themselves).
    MemberRemoved {
        /// User id of the removed member.
        user_id: UserId,
    },
}

impl ListEvent {
    /// Short kind name matching the wire tag, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProductAdded { .. } => "product-added",
            Self::ProductEdited { .. } => "product-edited",
            Self::ProductDeleted { .. } => "product-deleted",
            Self::MemberAdded { .. } => "member-added",
            Self::MemberRemoved { .. } => "member-removed",
        }
    }
}
