//! Order record set.
//!
//! Orders are unique on the idempotency token that created them. The actor runs with the
//! [`FinancialLedger`](crate::clients::FinancialLedger) as context so it can refuse to delete
//! an order the ledger still references.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Order;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new order actor and its raw client.
///
/// Start it with `actor.run(financial_ledger)`.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size)
}
