//! A stocked material (detergent, softener, plastic bags...).
//!
//! `remaining_stock` never drops below zero; it changes only through
//! [`StockAction`](crate::inventory_actor::StockAction)s applied by the inventory actor.
use actor_framework::entity_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

entity_id!(#[derive(Serialize, Deserialize)] pub Material => "material");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: MaterialId,
    pub name: String,
    pub remaining_stock: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone)]
pub struct InventoryItemCreate {
    pub name: String,
    pub initial_stock: Decimal,
    pub unit: String,
}

/// Descriptive fields only; stock is never set through an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
}

/// Signed stock change for one material. Negative consumes, positive restocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub material_id: MaterialId,
    pub delta: Decimal,
}

/// Stock before and after a change was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub material_id: MaterialId,
    pub before: Decimal,
    pub after: Decimal,
}
