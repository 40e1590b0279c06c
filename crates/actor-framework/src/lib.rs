//! # Actor Framework
//!
//! This crate provides the building blocks for modelling a record store as a set of
//! type-safe, concurrent actors. It implements a **Resource-Oriented Architecture (ROA)**
//! on top of the **Actor Model**: each record set (orders, stock items, ledger rows) is owned
//! by exactly one actor, and every read or write is a message to that actor.
//!
//! ## Why ROA + Actor Model?
//!
//! ### Resource-Oriented Architecture (ROA)
//!
//! - Standard operations (Create, Read, Update, Delete, Action) on well-defined resources
//! - Predictable lifecycle management
//! - Clean, uniform API surface across all resource types
//!
//! ### Actor Model
//!
//! - Isolated state (no shared memory, no locks)
//! - Message-passing concurrency
//! - Sequential processing within each actor eliminates race conditions
//!
//! ### What this buys a store
//!
//! Because an actor handles one message at a time, every request is atomic on its own record
//! set. That is enough to express the primitives a relational store would offer:
//!
//! - **Atomic read-modify-write**: an `Action` mutates one row with no interleaving.
//! - **Unique constraints**: [`ActorEntity::unique_key`] plus `create_if_absent` give an
//!   insert-or-return-existing that never races.
//! - **Multi-row all-or-nothing**: a `batch` stages every action and commits only if all succeed.
//! - **Idempotent writes**: a keyed `batch` is applied at most once.
//!
//! What it does *not* buy is atomicity across actors. Coordinating several record sets is the
//! caller's job (see the orchestration layer of the application crate).
//!
//! **Further Reading**:
//! - [Actor Model (Wikipedia)](https://en.wikipedia.org/wiki/Actor_model) - Foundational concurrency pattern by Carl Hewitt
//! - [Actors in Rust](https://ryhl.io/blog/actors-with-tokio/) - Practical guide to implementing actors with Tokio
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - Your domain records and their rules
//! 2. **Runtime Layer** ([`ResourceActor`]) - Message processing and concurrency
//! 3. **Interface Layer** ([`ResourceClient`]) - Type-safe communication with optional deadlines
//!
//! ## Quick Start
//!
//! ```rust
//! use actor_framework::{entity_id, ActorEntity, ResourceActor, Unsupported};
//! use async_trait::async_trait;
//!
//! entity_id!(pub Material => "material");
//!
//! #[derive(Clone, Debug)]
//! struct Material {
//!     id: MaterialId,
//!     name: String,
//! }
//!
//! #[derive(Debug)] struct NewMaterial { name: String }
//! #[derive(Debug, thiserror::Error)] #[error("material error")] struct MaterialError;
//!
//! #[async_trait]
//! impl ActorEntity for Material {
//!     type Id = MaterialId;
//!     type Create = NewMaterial;
//!     type Update = Unsupported;
//!     type Action = Unsupported;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = MaterialError;
//!
//!     fn from_create_params(id: MaterialId, params: NewMaterial) -> Result<Self, Self::Error> {
//!         Ok(Self { id, name: params.name })
//!     }
//!     fn unique_key(&self) -> Option<String> {
//!         Some(self.name.clone())
//!     }
//!     async fn on_update(&mut self, u: Unsupported, _: &()) -> Result<(), Self::Error> { match u {} }
//!     async fn handle_action(&mut self, a: Unsupported, _: &()) -> Result<(), Self::Error> { match a {} }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Material>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let first = client.create_if_absent(NewMaterial { name: "detergent".into() }).await.unwrap();
//!     let again = client.create_if_absent(NewMaterial { name: "detergent".into() }).await.unwrap();
//!     assert!(first.is_created());
//!     assert!(!again.is_created());
//!     assert_eq!(again.get().id.to_string(), "material_1");
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **runtime** via the `run()` method, not at construction time.
//! Create every actor first, then start each one with the clients it needs as its `Context`.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`mock::MockClient`], which hands out a real `ResourceClient`
//! answered from scripted expectations, including replies that never arrive.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod id;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::{ActorEntity, Unsupported};
pub use error::FrameworkError;
pub use message::{Filter, Insertion, ResourceRequest, Response};
