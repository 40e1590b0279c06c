//! # Laundry Order Fulfillment
//!
//! Consistency engine for a laundry business: creating an order deducts the materials its
//! service consumes, and settling its payment posts income to the ledger exactly once.
//!
//! Each record set (orders, inventory, ledger, ...) lives in its own
//! [`ResourceActor`](actor_framework::ResourceActor). Requests to one actor are processed one
//! at a time, which makes every single request atomic; nothing is atomic *across* actors, so the
//! [`orchestrator`] sequences the steps and undoes them when a later one fails.
//!
//! ## Module Tour
//!
//! ### 1. Record sets (`*_actor`)
//! [`ActorEntity`](actor_framework::ActorEntity) implementations with their invariants:
//! - [`inventory_actor`]: stock never goes below zero; deltas are atomic per item
//! - [`financial_actor`]: at most one record per order
//! - [`order_actor`]: status moves forward only, one order per idempotency token
//! - [`bom_actor`], [`customer_actor`], [`service_actor`], [`guard_actor`]
//!
//! ### 2. Clients ([`clients`])
//! Typed wrappers that classify errors at the call boundary and retry transient failures:
//! [`BomResolver`](clients::BomResolver), [`InventoryLedger`](clients::InventoryLedger),
//! [`FinancialLedger`](clients::FinancialLedger), [`OrderClient`](clients::OrderClient).
//!
//! ### 3. Coordination ([`guard`], [`orchestrator`])
//! [`ConsistencyGuard`](guard::ConsistencyGuard) admits one execution per idempotency token;
//! [`TransactionOrchestrator`](orchestrator::TransactionOrchestrator) runs `create_order` and
//! `update_order`.
//!
//! ### 4. Runtime ([`lifecycle`], [`config`])
//! [`FulfillmentSystem`](lifecycle::FulfillmentSystem) starts and stops the actors from a
//! [`FulfillmentConfig`](config::FulfillmentConfig).
//!
//! ## Errors
//!
//! Every orchestrator call returns [`FulfillmentError`](error::FulfillmentError), whose
//! [`kind`](error::FulfillmentError::kind) is a closed [`ErrorKind`](error::ErrorKind).
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod bom_actor;
pub mod clients;
pub mod config;
pub mod customer_actor;
pub mod error;
pub mod financial_actor;
pub mod guard;
pub mod guard_actor;
pub mod inventory_actor;
pub mod lifecycle;
pub mod model;
pub mod orchestrator;
pub mod order_actor;
pub mod service_actor;
