//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient).
//!
//! Every client classifies framework errors into its actor's error type at the call boundary
//! and runs remote calls under the shared [`RetryPolicy`](crate::guard::RetryPolicy).

pub mod bom_resolver;
pub mod customer_client;
pub mod financial_ledger;
pub mod inventory_ledger;
pub mod order_client;
pub mod service_client;

pub use bom_resolver::*;
pub use customer_client::*;
pub use financial_ledger::*;
pub use inventory_ledger::*;
pub use order_client::*;
pub use service_client::*;
