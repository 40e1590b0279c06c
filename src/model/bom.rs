//! Bill-of-materials rows: how much of each material one unit of a service consumes.

use crate::model::{MaterialId, ServiceId};
use actor_framework::entity_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

entity_id!(#[derive(Serialize, Deserialize)] pub BomEntry => "bom");

/// One `service_bom` row. A (service, material) pair appears at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEntry {
    pub id: BomEntryId,
    pub service_id: ServiceId,
    pub material_id: MaterialId,
    pub usage_per_unit: Decimal,
}

impl BomEntry {
    pub fn line(&self) -> BomLine {
        BomLine {
            material_id: self.material_id,
            usage_per_unit: self.usage_per_unit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BomEntryCreate {
    pub service_id: ServiceId,
    pub material_id: MaterialId,
    pub usage_per_unit: Decimal,
}

#[derive(Debug, Clone)]
pub struct BomEntryUpdate {
    pub usage_per_unit: Decimal,
}

/// A resolved recipe line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLine {
    pub material_id: MaterialId,
    pub usage_per_unit: Decimal,
}

impl BomLine {
    /// Stock change for an order of `quantity` units: `-(quantity × usage)`, or `None` when
    /// the product does not fit in a `Decimal`.
    pub fn consumption(&self, quantity: u32) -> Option<Decimal> {
        Decimal::from(quantity)
            .checked_mul(self.usage_per_unit)
            .map(|used| -used)
    }
}
