//! [`ActorEntity`] implementation for [`FinancialRecord`].
//!
//! The unique key is the referenced order id, so `CreateIfAbsent` is the atomic
//! "insert unless this order already has a record" the ledger relies on.

use super::error::LedgerError;
use crate::model::{FinancialRecord, FinancialRecordCreate, FinancialRecordId};
use actor_framework::{ActorEntity, Unsupported};
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
impl ActorEntity for FinancialRecord {
    type Id = FinancialRecordId;
    type Create = FinancialRecordCreate;
    type Update = Unsupported;
    type Action = Unsupported;
    type ActionResult = ();
    type Context = ();
    type Error = LedgerError;

    fn from_create_params(id: FinancialRecordId, params: FinancialRecordCreate) -> Result<Self, LedgerError> {
        if params.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount(params.amount));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            date: params.date,
            record_type: params.record_type,
            description: params.description,
            amount: params.amount,
            payment_method: params.payment_method,
        })
    }

    fn unique_key(&self) -> Option<String> {
        self.order_id.map(|order_id| order_id.to_string())
    }

    async fn on_update(&mut self, update: Unsupported, _ctx: &()) -> Result<(), LedgerError> {
        match update {}
    }

    async fn on_delete(&self, _ctx: &()) -> Result<(), LedgerError> {
        match self.order_id {
            Some(order_id) => Err(LedgerError::LinkedToOrder {
                record_id: self.id,
                order_id,
            }),
            None => Ok(()),
        }
    }

    async fn handle_action(&mut self, action: Unsupported, _ctx: &()) -> Result<(), LedgerError> {
        match action {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, PaymentMethod, RecordType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn create(order_id: Option<OrderId>, amount: Decimal) -> FinancialRecordCreate {
        FinancialRecordCreate {
            order_id,
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            record_type: RecordType::Income,
            description: "Payment".into(),
            amount,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_unique_key_is_order_id() {
        let linked = FinancialRecord::from_create_params(
            FinancialRecordId(1),
            create(Some(OrderId(7)), dec!(25000)),
        )
        .unwrap();
        assert_eq!(linked.unique_key().as_deref(), Some("order_7"));

        let manual =
            FinancialRecord::from_create_params(FinancialRecordId(2), create(None, dec!(1))).unwrap();
        assert_eq!(manual.unique_key(), None);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = FinancialRecord::from_create_params(FinancialRecordId(1), create(None, dec!(-5)))
            .unwrap_err();
        assert_eq!(err, LedgerError::NegativeAmount(dec!(-5)));
    }

    #[tokio::test]
    async fn test_order_linked_records_cannot_be_deleted() {
        let linked = FinancialRecord::from_create_params(
            FinancialRecordId(1),
            create(Some(OrderId(7)), dec!(10)),
        )
        .unwrap();
        assert!(matches!(
            linked.on_delete(&()).await,
            Err(LedgerError::LinkedToOrder { .. })
        ));

        let manual =
            FinancialRecord::from_create_params(FinancialRecordId(2), create(None, dec!(10))).unwrap();
        assert!(manual.on_delete(&()).await.is_ok());
    }
}
