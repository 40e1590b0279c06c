//! Financial record set. Rows referencing an order are unique on that order id.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::FinancialRecord;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new financial ledger actor and its raw client.
pub fn new(buffer_size: usize) -> (ResourceActor<FinancialRecord>, ResourceClient<FinancialRecord>) {
    ResourceActor::new(buffer_size)
}
