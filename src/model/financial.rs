//! Financial ledger rows and the inputs used to create them.
//!
//! A [`FinancialRecord`] with `order_id = Some(..)` is an income posting for that order; at most
//! one such row exists per order. Manually entered rows carry no order reference.

use crate::model::{OrderId, PaymentMethod, PaymentStatus};
use actor_framework::entity_id;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

entity_id!(#[derive(Serialize, Deserialize)] pub FinancialRecord => "record");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    Income,
    Expense,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.write_str("Income"),
            Self::Expense => f.write_str("Expense"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: FinancialRecordId,
    pub order_id: Option<OrderId>,
    pub date: NaiveDate,
    pub record_type: RecordType,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
}

/// Row payload as stored. Built by the ledger client, never by callers directly.
#[derive(Debug, Clone)]
pub struct FinancialRecordCreate {
    pub order_id: Option<OrderId>,
    pub date: NaiveDate,
    pub record_type: RecordType,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
}

/// Request to post income for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomePosting {
    pub order_id: OrderId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    /// Payment status of the order at the time of the request. Only `Settled` posts.
    pub payment_status: PaymentStatus,
}

/// A manually entered income or expense, not tied to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub date: NaiveDate,
    pub record_type: RecordType,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
}

/// Outcome of an insert-if-absent posting. Both variants are success.
#[derive(Debug, Clone, PartialEq)]
pub enum Posting {
    Created(FinancialRecord),
    AlreadyExists(FinancialRecord),
}

impl Posting {
    pub fn record(&self) -> &FinancialRecord {
        match self {
            Self::Created(record) | Self::AlreadyExists(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Inclusive date window. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
}

impl Summary {
    /// Folds `record` into the totals. `None` if a total leaves the `Decimal` range.
    pub fn checked_add(mut self, record: &FinancialRecord) -> Option<Self> {
        match record.record_type {
            RecordType::Income => self.total_income = self.total_income.checked_add(record.amount)?,
            RecordType::Expense => {
                self.total_expense = self.total_expense.checked_add(record.amount)?
            }
        }
        self.net = self.total_income.checked_sub(self.total_expense)?;
        Some(self)
    }
}
