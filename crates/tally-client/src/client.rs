//! Client sync state machine.
//!
//! [`ListClient`] is the per-client orchestrator: it owns the connection
//! [`Session`], one [`ListView`] per joined list, and the mutation entry
//! points the UI calls. Mutations go through the external [`Store`] first —
//! the sole source of truth — then apply optimistically to the local view,
//! then produce the emit action for the transport. The relay never echoes
//! an event back to its sender, so the optimistic apply is the only time
//! the local view sees the client's own mutation.

use std::collections::HashMap;

use tally_core::{
    Identity, MutationError, ProductPatch, Session, SessionAction, SessionError, Store,
    StoreError,
};
use tally_proto::{ClientMessage, ListEvent, ListId, Member, Product, ServerMessage, UserId};

use crate::view::ListView;

/// Actions produced by the client for its transport to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Send this message to the relay.
    Send(ClientMessage),
}

/// Per-client synchronization state machine.
#[derive(Debug, Default)]
pub struct ListClient {
    session: Session,
    views: HashMap<ListId, ListView>,
}

impl ListClient {
    /// Create a connected client with no joined lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a list's room and start tracking a view for it.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Closed`] after [`Self::disconnect`].
    pub fn join(&mut self, list_id: ListId) -> Result<Vec<ClientAction>, SessionError> {
        self.session.join(list_id.clone())?;
        self.views.entry(list_id.clone()).or_default();
        Ok(vec![ClientAction::Send(ClientMessage::Join { list_id })])
    }

    /// Leave a list's room and drop its view.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Closed`] after [`Self::disconnect`].
    pub fn leave(&mut self, list_id: &ListId) -> Result<Vec<ClientAction>, SessionError> {
        self.session.leave(list_id)?;
        self.views.remove(list_id);
        Ok(vec![ClientAction::Send(ClientMessage::Leave { list_id: list_id.clone() })])
    }

    /// Load a full store fetch into a list's view. This is both the initial
    /// population after [`Self::join`] and the recovery path for lost
    /// events.
    pub fn refresh(&mut self, list_id: &ListId, products: Vec<Product>, members: Vec<Member>) {
        self.views.entry(list_id.clone()).or_default().load(products, members);
    }

    /// Handle a message from the relay.
    ///
    /// Events for rooms this client is joined to go to the matching view's
    /// reconciler; anything else is dropped silently — delivery is
    /// best-effort and the store stays authoritative.
    pub fn handle_message(&mut self, msg: ServerMessage) {
        let ServerMessage::Event { list_id, event } = msg;

        match self.session.receive(list_id, event) {
            Some(SessionAction::Deliver { list_id, event }) => {
                if let Some(view) = self.views.get_mut(&list_id) {
                    view.apply(&event);
                }
            },
            Some(SessionAction::Publish { .. }) | None => {
                tracing::debug!("dropped event for room this client has not joined");
            },
        }
    }

    /// The cached view of a list. `None` if not joined.
    #[must_use]
    pub fn view(&self, list_id: &ListId) -> Option<&ListView> {
        self.views.get(list_id)
    }

    /// Close the session. Terminal: views are dropped and every subsequent
    /// join, leave, or mutation fails or no-ops.
    pub fn disconnect(&mut self) {
        self.session.close();
        self.views.clear();
    }

    /// Create a product: store first, then optimistic local apply, then the
    /// emit for other subscribers. Zero quantity is normalized to 1 (the
    /// form's minimum).
    pub fn add_product(
        &mut self,
        store: &mut impl Store,
        identity: &impl Identity,
        list_id: &ListId,
        name: &str,
        quantity: u32,
    ) -> Result<Vec<ClientAction>, MutationError> {
        require_user(identity)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("product name must not be empty".into()).into());
        }

        let product = store.create_product(list_id, name, quantity.max(1))?;

        if let Some(view) = self.views.get_mut(list_id) {
            view.products_mut().push(product.clone());
        }

        Ok(self.emit(list_id, ListEvent::ProductAdded { product }))
    }

    /// Apply a partial update to a product and broadcast the full updated
    /// record.
    pub fn edit_product(
        &mut self,
        store: &mut impl Store,
        identity: &impl Identity,
        list_id: &ListId,
        product_id: &str,
        patch: ProductPatch,
    ) -> Result<Vec<ClientAction>, MutationError> {
        require_user(identity)?;

        let updated = store.update_product(product_id, patch)?;

        if let Some(view) = self.views.get_mut(list_id) {
            if let Some(existing) =
                view.products_mut().iter_mut().find(|p| p.id == updated.id)
            {
                *existing = updated.clone();
            }
        }

        Ok(self.emit(list_id, ListEvent::ProductEdited { product: updated }))
    }

    /// Flip a product's checked flag.
    pub fn toggle_checked(
        &mut self,
        store: &mut impl Store,
        identity: &impl Identity,
        list_id: &ListId,
        product_id: &str,
    ) -> Result<Vec<ClientAction>, MutationError> {
        let checked = self
            .views
            .get(list_id)
            .and_then(|view| view.product(product_id))
            .map(|p| p.checked)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;

        self.edit_product(store, identity, list_id, product_id, ProductPatch::checked(!checked))
    }

    /// Delete a product.
    pub fn delete_product(
        &mut self,
        store: &mut impl Store,
        identity: &impl Identity,
        list_id: &ListId,
        product_id: &str,
    ) -> Result<Vec<ClientAction>, MutationError> {
        require_user(identity)?;

        store.delete_product(product_id)?;

        if let Some(view) = self.views.get_mut(list_id) {
            view.products_mut().retain(|p| p.id != product_id);
        }

        Ok(self.emit(list_id, ListEvent::ProductDeleted { product_id: product_id.to_owned() }))
    }

    /// Invite a collaborator by email.
    pub fn add_member(
        &mut self,
        store: &mut impl Store,
        identity: &impl Identity,
        list_id: &ListId,
        email: &str,
    ) -> Result<Vec<ClientAction>, MutationError> {
        require_user(identity)?;

        let email = email.trim();
        if email.is_empty() {
            return Err(StoreError::InvalidInput("email must not be empty".into()).into());
        }

        let member = store.add_member(list_id, email)?;

        if let Some(view) = self.views.get_mut(list_id) {
            view.members_mut().retain(|m| m.user_id != member.user_id);
            view.members_mut().push(member.clone());
        }

        Ok(self.emit(list_id, ListEvent::MemberAdded { member }))
    }

    /// Remove a collaborator from the list.
    pub fn remove_member(
        &mut self,
        store: &mut impl Store,
        identity: &impl Identity,
        list_id: &ListId,
        user_id: &UserId,
    ) -> Result<Vec<ClientAction>, MutationError> {
        require_user(identity)?;

        store.remove_member(list_id, user_id)?;

        if let Some(view) = self.views.get_mut(list_id) {
            view.members_mut().retain(|m| &m.user_id != user_id);
        }

        Ok(self.emit(list_id, ListEvent::MemberRemoved { user_id: user_id.clone() }))
    }

    /// Leave a list entirely: remove our own membership from the store,
    /// tell the other subscribers, and unsubscribe from the room.
    pub fn leave_list(
        &mut self,
        store: &mut impl Store,
        identity: &impl Identity,
        list_id: &ListId,
    ) -> Result<Vec<ClientAction>, MutationError> {
        let me = require_user(identity)?;

        store.remove_member(list_id, &me)?;

        let mut actions = self.emit(list_id, ListEvent::MemberRemoved { user_id: me });
        if self.session.leave(list_id).is_ok() {
            self.views.remove(list_id);
            actions.push(ClientAction::Send(ClientMessage::Leave { list_id: list_id.clone() }));
        }
        Ok(actions)
    }

    /// Turn a local mutation into the emit for other subscribers.
    ///
    /// Fire-and-forget: on a closed session the emit is dropped silently —
    /// the store mutation already succeeded, and other clients recover on
    /// their next full fetch.
    fn emit(&self, list_id: &ListId, event: ListEvent) -> Vec<ClientAction> {
        match self.session.emit(list_id.clone(), event) {
            Ok(SessionAction::Publish { list_id, event }) => {
                vec![ClientAction::Send(ClientMessage::Emit { list_id, event })]
            },
            Ok(SessionAction::Deliver { .. }) | Err(_) => Vec::new(),
        }
    }
}

fn require_user(identity: &impl Identity) -> Result<UserId, MutationError> {
    identity.current_user().ok_or(MutationError::Unauthenticated)
}
