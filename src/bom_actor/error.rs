//! Error types for the BOM actor.

use crate::error::StoreError;
use crate::model::ServiceId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BomError {
    #[error("usage per unit must not be negative, got {0}")]
    InvalidUsage(Decimal),

    /// The service itself does not exist. An existing service without entries is not an error.
    #[error("service {0} not found")]
    ServiceNotFound(ServiceId),

    #[error(transparent)]
    Store(#[from] StoreError),
}
