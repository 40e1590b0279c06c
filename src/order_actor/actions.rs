//! Custom actions for the order actor.

use crate::model::PaymentMethod;

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Records that the BOM deduction for this order has been applied and, with `settle`,
    /// marks the order paid in the same step. Idempotent.
    CommitInventory { settle: Option<PaymentMethod> },
}
