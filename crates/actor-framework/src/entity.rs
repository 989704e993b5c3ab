//! # ActorEntity Trait
//!
//! The contract a record type fulfils to be stored by a [`ResourceActor`](crate::ResourceActor).
//! Associated types pin down the id, the create/update DTOs, the custom actions and the
//! error type, so an `OrderCreate` can never reach the drone actor.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A record managed by a [`ResourceActor`](crate::ResourceActor).
///
/// Hooks run inside the actor task with exclusive access to the record. Returning an
/// error from a hook aborts the request and leaves the store untouched, except for
/// `handle_action`, where the entity is responsible for only mutating itself once every
/// check has passed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Identifier, allocated by the actor from a sequential `u32`.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Payload for creating a record.
    type Create: Send + Sync + Debug;

    /// Payload for a plain field update.
    type Update: Send + Sync + Debug;

    /// Domain operations beyond CRUD (e.g. `ConfirmPayment`, `AssignDrone`).
    type Action: Send + Sync + Debug;

    /// What a custom action hands back to the caller.
    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected at [`run`](crate::ResourceActor::run) time. `()` when none.
    type Context: Send + Sync;

    /// One error enum per entity. It travels boxed inside
    /// [`FrameworkError::EntityError`](crate::FrameworkError::EntityError) and is
    /// recovered with [`FrameworkError::entity_error`](crate::FrameworkError::entity_error).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds the record from its freshly allocated id. Synchronous; anything that needs
    /// other actors belongs in [`on_create`](Self::on_create).
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Runs after construction and before the record is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Runs before the record is removed. An error keeps the record.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
