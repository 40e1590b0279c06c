//! [`ActorEntity`] implementation for [`Order`].
//!
//! - `from_create_params` rejects non-positive quantities and computes the total.
//! - `on_update` only lets the order status move forward and never un-settles a payment.
//! - `on_delete` refuses settled orders outright, then asks the ledger and vetoes the delete
//!   while a record references the order.

use super::actions::OrderAction;
use super::error::OrderError;
use crate::clients::FinancialLedger;
use crate::model::{Order, OrderCreate, OrderId, OrderPatch, PaymentStatus};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderPatch;
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = FinancialLedger;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.quantity == 0 {
            return Err(OrderError::InvalidQuantity(params.quantity));
        }
        let total_price = Decimal::from(params.quantity)
            .checked_mul(params.unit_price)
            .ok_or(OrderError::TotalOverflow {
                quantity: params.quantity,
                unit_price: params.unit_price,
            })?;
        Ok(Self {
            id,
            total_price,
            request_key: params.request_key,
            customer_id: params.customer_id,
            service_id: params.service_id,
            quantity: params.quantity,
            unit_price: params.unit_price,
            entry_date: params.entry_date,
            order_status: params.order_status,
            payment_status: params.payment_status,
            payment_method: params.payment_method,
            receipt_no: params.receipt_no,
            inventory_committed: false,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.request_key.clone())
    }

    async fn on_update(&mut self, patch: OrderPatch, _ledger: &FinancialLedger) -> Result<(), OrderError> {
        if let Some(status) = patch.order_status {
            if !self.order_status.can_move_to(status) {
                return Err(OrderError::IllegalTransition {
                    from: self.order_status,
                    to: status,
                });
            }
            self.order_status = status;
        }
        if let Some(payment) = patch.payment_status {
            if self.payment_status.is_settled() && payment == PaymentStatus::Unpaid {
                return Err(OrderError::PaymentReversal(self.id));
            }
            self.payment_status = payment;
        }
        if let Some(method) = patch.payment_method {
            self.payment_method = method;
        }
        Ok(())
    }

    async fn on_delete(&self, ledger: &FinancialLedger) -> Result<(), OrderError> {
        // checked here, not by the caller, so a concurrent settle cannot slip in between
        if self.payment_status.is_settled() {
            return Err(OrderError::SettledDelete(self.id));
        }
        if let Some(record) = ledger.find_for_order(self.id).await? {
            debug!(order_id = %self.id, record_id = %record.id, "Delete vetoed by ledger record");
            return Err(OrderError::HasLedgerRecord(self.id));
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: OrderAction, _ledger: &FinancialLedger) -> Result<Order, OrderError> {
        match action {
            OrderAction::CommitInventory { settle } => {
                self.inventory_committed = true;
                if let Some(method) = settle {
                    if !self.payment_status.is_settled() {
                        self.payment_status = PaymentStatus::Settled;
                        self.payment_method = method;
                    }
                }
                Ok(self.clone())
            }
        }
    }
}
