use crate::error::recover;
use crate::financial_actor::LedgerError;
use crate::guard::RetryPolicy;
use crate::model::{
    DateRange, FinancialRecord, FinancialRecordCreate, FinancialRecordId, IncomePosting, ManualEntry,
    OrderId, Posting, RecordType, Summary,
};
use actor_framework::{ActorClient, Filter, FrameworkError, Insertion, ResourceClient};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use tracing::{debug, error, info, instrument};

/// Owner of ledger rows tied to orders.
///
/// Income for an order is posted with a single check-and-insert on the order id, so concurrent
/// or repeated postings for the same order produce one record.
#[derive(Clone)]
pub struct FinancialLedger {
    inner: ResourceClient<FinancialRecord>,
    retry: RetryPolicy,
}

#[async_trait]
impl ActorClient<FinancialRecord> for FinancialLedger {
    type Error = LedgerError;

    fn inner(&self) -> &ResourceClient<FinancialRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover("financial_records")(e)
    }
}

impl FinancialLedger {
    pub fn new(inner: ResourceClient<FinancialRecord>, retry: RetryPolicy) -> Self {
        Self { inner, retry }
    }

    /// Posts income for a settled order unless the order already has a record.
    ///
    /// `Posting::AlreadyExists` is a normal outcome, not a conflict.
    #[instrument(skip(self, posting), fields(order_id = %posting.order_id))]
    pub async fn post_income_if_absent(&self, posting: IncomePosting) -> Result<Posting, LedgerError> {
        if !posting.payment_status.is_settled() {
            return Err(LedgerError::NotSettled(posting.order_id, posting.payment_status));
        }
        if posting.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount(posting.amount));
        }

        let create = FinancialRecordCreate {
            order_id: Some(posting.order_id),
            date: posting.date,
            record_type: RecordType::Income,
            description: posting.description,
            amount: posting.amount,
            payment_method: posting.payment_method,
        };
        let insertion = self
            .retry
            .retry("post_income", || async {
                self.inner
                    .create_if_absent(create.clone())
                    .await
                    .map_err(Self::map_error)
            })
            .await?;

        Ok(match insertion {
            Insertion::Created(record) => {
                info!(record_id = %record.id, amount = %record.amount, "Income posted");
                Posting::Created(record)
            }
            Insertion::Existing(record) => {
                debug!(record_id = %record.id, "Income already posted");
                Posting::AlreadyExists(record)
            }
        })
    }

    /// Records a manual income or expense that is not tied to an order.
    #[instrument(skip(self))]
    pub async fn record_manual(&self, entry: ManualEntry) -> Result<FinancialRecordId, LedgerError> {
        let create = FinancialRecordCreate {
            order_id: None,
            date: entry.date,
            record_type: entry.record_type,
            description: entry.description,
            amount: entry.amount,
            payment_method: entry.payment_method,
        };
        self.retry
            .retry_if_not_applied("record_manual", || async {
                self.inner.create(create.clone()).await.map_err(Self::map_error)
            })
            .await
    }

    /// The record posted for `order_id`, if any.
    ///
    /// Postings made here are unique per order through the store's unique key, so a second
    /// record can only come from a write that bypassed this client, such as a repair import
    /// or a restored backup. This lookup is where such a write surfaces.
    ///
    /// # Errors
    /// [`LedgerError::DuplicatePosting`] if more than one record references the order.
    #[instrument(skip(self))]
    pub async fn find_for_order(&self, order_id: OrderId) -> Result<Option<FinancialRecord>, LedgerError> {
        let mut records = self
            .query("find_for_order", move |record| record.order_id == Some(order_id))
            .await?;
        if records.len() > 1 {
            error!(count = records.len(), "Ledger invariant violated, manual reconciliation needed");
            return Err(LedgerError::DuplicatePosting {
                order_id,
                count: records.len(),
            });
        }
        Ok(records.pop())
    }

    /// Income, expense and net within `range`.
    #[instrument(skip(self))]
    pub async fn summary(&self, range: DateRange) -> Result<Summary, LedgerError> {
        let records = self
            .query("summary", move |record| range.contains(record.date))
            .await?;
        records
            .iter()
            .try_fold(Summary::default(), Summary::checked_add)
            .ok_or(LedgerError::TotalsOutOfRange)
    }

    /// Records of one type within `range`, newest first.
    #[instrument(skip(self))]
    pub async fn by_type(
        &self,
        record_type: RecordType,
        range: DateRange,
    ) -> Result<Vec<FinancialRecord>, LedgerError> {
        let mut records = self
            .query("by_type", move |record| {
                record.record_type == record_type && range.contains(record.date)
            })
            .await?;
        records.sort_by_key(|record| Reverse((record.date, record.id)));
        Ok(records)
    }

    /// Deletes a manual record. Records tied to an order are refused.
    #[instrument(skip(self))]
    pub async fn delete_record(&self, id: FinancialRecordId) -> Result<(), LedgerError> {
        self.retry
            .retry_if_not_applied("delete_record", || self.delete(id))
            .await
    }

    async fn query(
        &self,
        operation: &'static str,
        predicate: impl Fn(&FinancialRecord) -> bool + Clone + Send + Sync + 'static,
    ) -> Result<Vec<FinancialRecord>, LedgerError> {
        self.retry
            .retry(operation, || async {
                self.inner
                    .query(Filter::new(predicate.clone()))
                    .await
                    .map_err(Self::map_error)
            })
            .await
    }
}
