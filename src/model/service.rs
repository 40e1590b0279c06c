//! A service offered by the laundry (e.g. "Wash&Fold"), priced per unit.
//!
//! Read-only from the fulfillment core's point of view: orders copy `unit_price` at creation.
use actor_framework::entity_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

entity_id!(#[derive(Serialize, Deserialize)] pub Service => "service");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub unit_price: Decimal,
    /// Unit the quantity is counted in ("kg", "pcs").
    pub unit: String,
}

#[derive(Debug, Clone)]
pub struct ServiceCreate {
    pub name: String,
    pub unit_price: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub unit: Option<String>,
}
