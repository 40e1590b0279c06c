//! Error types for the financial ledger actor.

use crate::error::StoreError;
use crate::model::{FinancialRecordId, OrderId, PaymentStatus};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    /// Income is only posted for settled orders.
    #[error("order {0} is {1}, income is only posted once settled")]
    NotSettled(OrderId, PaymentStatus),

    #[error("amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    /// Records tied to an order are immutable.
    #[error("record {record_id} belongs to {order_id} and cannot be deleted")]
    LinkedToOrder {
        record_id: FinancialRecordId,
        order_id: OrderId,
    },

    /// More than one record references the same order. Never corrected automatically.
    ///
    /// Unreachable through the ledger client, which posts under a per-order unique key; it
    /// flags records written around it.
    #[error("{count} financial records reference {order_id}")]
    DuplicatePosting { order_id: OrderId, count: usize },

    /// A summary total does not fit in a `Decimal`.
    #[error("ledger totals are out of range")]
    TotalsOutOfRange,

    #[error(transparent)]
    Store(#[from] StoreError),
}
