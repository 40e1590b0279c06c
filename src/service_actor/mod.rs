//! Service catalog record set (name, unit price).

pub mod entity;

use crate::model::Service;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new service catalog actor and its raw client.
pub fn new(buffer_size: usize) -> (ResourceActor<Service>, ResourceClient<Service>) {
    ResourceActor::new(buffer_size)
}
