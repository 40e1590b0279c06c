//! [`ActorEntity`] implementation for [`BomEntry`]. A material appears at most once per service.

use super::error::BomError;
use crate::model::{BomEntry, BomEntryCreate, BomEntryId, BomEntryUpdate};
use actor_framework::{ActorEntity, Unsupported};
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
impl ActorEntity for BomEntry {
    type Id = BomEntryId;
    type Create = BomEntryCreate;
    type Update = BomEntryUpdate;
    type Action = Unsupported;
    type ActionResult = ();
    type Context = ();
    type Error = BomError;

    fn from_create_params(id: BomEntryId, params: BomEntryCreate) -> Result<Self, BomError> {
        if params.usage_per_unit < Decimal::ZERO {
            return Err(BomError::InvalidUsage(params.usage_per_unit));
        }
        Ok(Self {
            id,
            service_id: params.service_id,
            material_id: params.material_id,
            usage_per_unit: params.usage_per_unit,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.service_id, self.material_id))
    }

    async fn on_update(&mut self, update: BomEntryUpdate, _ctx: &()) -> Result<(), BomError> {
        if update.usage_per_unit < Decimal::ZERO {
            return Err(BomError::InvalidUsage(update.usage_per_unit));
        }
        self.usage_per_unit = update.usage_per_unit;
        Ok(())
    }

    async fn handle_action(&mut self, action: Unsupported, _ctx: &()) -> Result<(), BomError> {
        match action {}
    }
}
