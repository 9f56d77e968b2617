//! The session/identity collaborator contract.
//!
//! Authentication itself is out of scope — an external identity provider
//! owns it. The sync core only needs to ask "who is the current user?"
//! before permitting a mutation.

use tally_proto::UserId;

/// Resolves the current user's identity (external collaborator).
pub trait Identity {
    /// The authenticated user, or `None` when unauthenticated.
    fn current_user(&self) -> Option<UserId>;
}

/// Fixed identity for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity {
    user: Option<UserId>,
}

impl FixedIdentity {
    /// An identity resolving to the given user.
    #[must_use]
    pub fn logged_in(user: impl Into<UserId>) -> Self {
        Self { user: Some(user.into()) }
    }

    /// An unauthenticated identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl Identity for FixedIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}
