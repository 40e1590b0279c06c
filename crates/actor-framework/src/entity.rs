//! # ActorEntity Trait
//!
//! The `ActorEntity` trait defines the contract every record type must implement to be
//! managed by the generic `ResourceActor`. It specifies associated types for IDs, DTOs,
//! actions, context and errors, and provides lifecycle hooks (`on_create`, `on_update`,
//! `on_delete`, `handle_action`).
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::unique_key`] declares a natural key the actor keeps unique.
//! - [`ActorEntity::on_create`] and [`ActorEntity::on_delete`] default to `Ok(())`.
//!
//! # Staged Mutation
//! `on_update` and `handle_action` always run against a *copy* of the stored entity.
//! The copy replaces the stored value only when the hook returns `Ok`, so a hook that
//! fails halfway never leaves a half-modified record behind.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Uninhabited placeholder for entities that accept no updates or no actions.
#[derive(Debug, Clone)]
pub enum Unsupported {}

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// This trait is `#[async_trait]` to allow asynchronous operations in hooks (e.g., calling other actors).
/// The `Context` type is injected into every hook, so dependencies are bound when the
/// actor starts (`run(context)`) rather than when it is constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must be convertible from u32 for automatic ID generation.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g., applying a stock delta).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    /// Cloned when a keyed batch is replayed.
    type ActionResult: Clone + Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// One error enum per actor; clients recover it with
    /// [`FrameworkError::entity_error`](crate::FrameworkError::entity_error).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Natural key that must be unique across the store, like a unique index on a
    /// table column. `None` means the entity takes no part in the index.
    ///
    /// Actions must not change the key; updates may, and are rejected if the new key
    /// is already taken.
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called after construction and before the entity is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed. Returning an error vetoes the delete.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
