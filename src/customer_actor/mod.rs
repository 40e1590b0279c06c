//! Customer record set. Consulted for order validation and display names.

pub mod entity;

use crate::model::Customer;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new customer actor and its raw client.
pub fn new(buffer_size: usize) -> (ResourceActor<Customer>, ResourceClient<Customer>) {
    ResourceActor::new(buffer_size)
}
