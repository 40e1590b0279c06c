//! A laundry order (a "transaction" at the counter).
//!
//! # Actor Framework
//! `Order` implements [`ActorEntity`](actor_framework::ActorEntity) in [`crate::order_actor`]. Its unique key is
//! the request token that created it, so a retried creation finds the row of the first attempt
//! instead of inserting a second one.
//!
//! # Status axes
//! Fulfillment ([`OrderStatus`]) and payment ([`PaymentStatus`]) move independently. Both only
//! move forward; re-applying the current value is allowed so patches stay idempotent.
use crate::model::{CustomerId, ServiceId};
use actor_framework::entity_id;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

entity_id!(#[derive(Serialize, Deserialize)] pub Order => "order");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    Received,
    Processing,
    Done,
    PickedUp,
}

impl OrderStatus {
    /// `true` for the current status and every later one.
    pub fn can_move_to(self, next: OrderStatus) -> bool {
        next >= self
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "Received",
            Self::Processing => "Processing",
            Self::Done => "Done",
            Self::PickedUp => "PickedUp",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Unpaid,
    Settled,
}

impl PaymentStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Settled)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => f.write_str("Unpaid"),
            Self::Settled => f.write_str("Settled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    EWallet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Idempotency token of the request that created the order.
    pub request_key: String,
    pub customer_id: CustomerId,
    pub service_id: ServiceId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub entry_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub receipt_no: String,
    /// Set once the BOM deduction for this order has been applied.
    pub inventory_committed: bool,
}

/// Row payload for the order store. The total is computed on insert.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub request_key: String,
    pub customer_id: CustomerId,
    pub service_id: ServiceId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub entry_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub receipt_no: String,
}

/// Caller input for placing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub service_id: ServiceId,
    pub quantity: u32,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// Generated from the receipt book when absent.
    pub receipt_no: Option<String>,
    /// Defaults to now.
    pub entry_date: Option<DateTime<Utc>>,
}

impl NewOrder {
    pub fn new(customer_id: CustomerId, service_id: ServiceId, quantity: u32) -> Self {
        Self {
            customer_id,
            service_id,
            quantity,
            payment_status: PaymentStatus::Unpaid,
            payment_method: PaymentMethod::Cash,
            receipt_no: None,
            entry_date: None,
        }
    }

    pub fn settled(mut self, method: PaymentMethod) -> Self {
        self.payment_status = PaymentStatus::Settled;
        self.payment_method = method;
        self
    }
}

/// Staff update. Fields left `None` are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            order_status: Some(status),
            ..Self::default()
        }
    }

    pub fn payment(status: PaymentStatus) -> Self {
        Self {
            payment_status: Some(status),
            ..Self::default()
        }
    }

    pub fn settles(&self) -> bool {
        self.payment_status.is_some_and(PaymentStatus::is_settled)
    }
}

/// An order joined with the display fields of its customer and service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub order: Order,
    pub customer_name: Option<String>,
    pub service_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_only_moves_forward() {
        assert!(OrderStatus::Received.can_move_to(OrderStatus::Processing));
        assert!(OrderStatus::Received.can_move_to(OrderStatus::PickedUp));
        assert!(OrderStatus::Done.can_move_to(OrderStatus::Done));
        assert!(!OrderStatus::Done.can_move_to(OrderStatus::Processing));
        assert!(!OrderStatus::PickedUp.can_move_to(OrderStatus::Received));
    }

    #[test]
    fn test_patch_settles() {
        assert!(OrderPatch::payment(PaymentStatus::Settled).settles());
        assert!(!OrderPatch::payment(PaymentStatus::Unpaid).settles());
        assert!(!OrderPatch::status(OrderStatus::Done).settles());
    }
}
