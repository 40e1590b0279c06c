//! Idempotency claims: one row per (operation, token), unique on both.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Claim;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new claim actor and its raw client.
pub fn new(buffer_size: usize) -> (ResourceActor<Claim>, ResourceClient<Claim>) {
    ResourceActor::new(buffer_size)
}
