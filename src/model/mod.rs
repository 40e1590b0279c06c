//! Domain types: ids, row payloads, statuses and views.

pub mod bom;
pub mod customer;
pub mod financial;
pub mod idempotency;
pub mod inventory;
pub mod order;
pub mod service;

pub use bom::*;
pub use customer::*;
pub use financial::*;
pub use idempotency::*;
pub use inventory::*;
pub use order::*;
pub use service::*;
