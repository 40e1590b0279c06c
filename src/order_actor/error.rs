//! Error types for the order actor.

use crate::error::StoreError;
use crate::financial_actor::LedgerError;
use crate::model::{OrderId, OrderStatus};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(u32),

    #[error("total of {quantity} x {unit_price} is out of range")]
    TotalOverflow { quantity: u32, unit_price: Decimal },

    #[error("order status cannot move from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Settled payments are final.
    #[error("payment of {0} is settled and cannot be reverted")]
    PaymentReversal(OrderId),

    /// A settled order owes a ledger posting, made or pending, and is never deleted.
    #[error("{0} is settled and cannot be deleted")]
    SettledDelete(OrderId),

    #[error("{0} has a financial record and cannot be deleted")]
    HasLedgerRecord(OrderId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
