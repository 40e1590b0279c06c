//! [`ActorEntity`] implementation for [`InventoryItem`].
//!
//! The stock invariant (`remaining_stock >= 0`) is checked inside `handle_action`, which the
//! actor runs against a staged copy. A rejected delta therefore never touches the stored row,
//! and inside a batch it rejects the whole batch.

use super::actions::StockAction;
use super::error::InventoryError;
use crate::model::{InventoryItem, InventoryItemCreate, InventoryItemUpdate, MaterialId, StockLevel};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

#[async_trait]
impl ActorEntity for InventoryItem {
    type Id = MaterialId;
    type Create = InventoryItemCreate;
    type Update = InventoryItemUpdate;
    type Action = StockAction;
    type ActionResult = StockLevel;
    type Context = ();
    type Error = InventoryError;

    fn from_create_params(id: MaterialId, params: InventoryItemCreate) -> Result<Self, InventoryError> {
        if params.initial_stock < Decimal::ZERO {
            return Err(InventoryError::InvalidAmount(params.initial_stock));
        }
        Ok(Self {
            id,
            name: params.name,
            remaining_stock: params.initial_stock,
            unit: params.unit,
        })
    }

    /// Renames or re-labels the item. Stock is not editable here.
    async fn on_update(&mut self, update: InventoryItemUpdate, _ctx: &()) -> Result<(), InventoryError> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: StockAction, _ctx: &()) -> Result<StockLevel, InventoryError> {
        let before = self.remaining_stock;
        let after = match action {
            StockAction::Apply(delta) => {
                let Some(after) = before.checked_add(delta) else {
                    debug!(material_id = %self.id, %before, %delta, "Stock delta out of range");
                    return Err(InventoryError::InvalidAmount(delta));
                };
                if after < Decimal::ZERO {
                    debug!(material_id = %self.id, %before, %delta, "Rejected stock delta");
                    return Err(InventoryError::InsufficientStock {
                        material_id: self.id,
                        requested: -delta,
                        available: before,
                    });
                }
                after
            }
            StockAction::Recount(counted) => {
                if counted < Decimal::ZERO {
                    return Err(InventoryError::InvalidAmount(counted));
                }
                counted
            }
        };
        self.remaining_stock = after;
        Ok(StockLevel {
            material_id: self.id,
            before,
            after,
        })
    }
}
