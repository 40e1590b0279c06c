//! `service_bom` record set: which materials a service consumes, per unit.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::BomEntry;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new BOM actor and its raw client.
pub fn new(buffer_size: usize) -> (ResourceActor<BomEntry>, ResourceClient<BomEntry>) {
    ResourceActor::new(buffer_size)
}
