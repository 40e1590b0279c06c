//! # System Lifecycle
//!
//! Starts the record-set actors, wires the clients the orchestrator needs and shuts everything
//! down again.
//!
//! ## Wiring
//!
//! Actors are created first and receive their dependencies when they start (`run(context)`).
//! Only the order actor has one: it runs with the [`FinancialLedger`](crate::clients::FinancialLedger)
//! so it can refuse to delete orders the ledger references. The graph is acyclic, so dropping
//! every client is enough to stop every actor.
//!
//! ```rust,no_run
//! use laundry_fulfillment::config::FulfillmentConfig;
//! use laundry_fulfillment::lifecycle::{setup_tracing, FulfillmentSystem};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     setup_tracing();
//!     let system = FulfillmentSystem::new(&FulfillmentConfig::default());
//!     // ... system.orchestrator.create_order(..) ...
//!     system.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Observability
//!
//! [`setup_tracing`] installs compact human-readable logs, [`setup_json_tracing`] one JSON
//! object per line; [`init_tracing`] picks one from the `[log]` config section. Both honour
//! `RUST_LOG`.

pub mod fulfillment_system;
pub mod tracing;

pub use fulfillment_system::*;
pub use tracing::*;
