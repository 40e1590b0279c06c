//! Inventory record set: one [`InventoryItem`] per material, mutated only through
//! [`StockAction`]s so every change is a single atomic read-modify-write.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::InventoryItem;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new inventory actor and its raw client.
pub fn new(buffer_size: usize) -> (ResourceActor<InventoryItem>, ResourceClient<InventoryItem>) {
    ResourceActor::new(buffer_size)
}
