//! Error types for the inventory actor.

use crate::error::StoreError;
use crate::model::MaterialId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    /// Applying the delta would leave negative stock. Nothing was changed.
    #[error("insufficient stock of {material_id}: requested {requested}, available {available}")]
    InsufficientStock {
        material_id: MaterialId,
        requested: Decimal,
        available: Decimal,
    },

    /// Negative, zero where a positive amount is needed, or beyond what the stock can hold.
    #[error("invalid stock amount: {0}")]
    InvalidAmount(Decimal),

    #[error(transparent)]
    Store(#[from] StoreError),
}
