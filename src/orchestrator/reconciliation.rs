//! Ledger postings that failed after their order was saved.
//!
//! A failed posting never fails the order. It is parked here until
//! [`TransactionOrchestrator::retry_pending_postings`](super::TransactionOrchestrator::retry_pending_postings)
//! lands it.

use crate::model::OrderId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationItem {
    pub order_id: OrderId,
    /// Error of the latest failed attempt.
    pub reason: String,
    pub attempts: u32,
    pub first_failed_at: DateTime<Utc>,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub posted: Vec<OrderId>,
    /// Items dropped because the order is gone or no longer settled.
    pub dropped: Vec<OrderId>,
    pub still_pending: Vec<OrderId>,
}

#[derive(Debug, Clone, Default)]
pub struct ReconciliationQueue {
    items: Arc<Mutex<BTreeMap<OrderId, ReconciliationItem>>>,
}

impl ReconciliationQueue {
    pub fn defer(&self, order_id: OrderId, reason: impl Into<String>) {
        let reason = reason.into();
        self.lock()
            .entry(order_id)
            .and_modify(|item| {
                item.attempts += 1;
                item.reason.clone_from(&reason);
            })
            .or_insert_with(|| ReconciliationItem {
                order_id,
                reason,
                attempts: 1,
                first_failed_at: Utc::now(),
            });
    }

    pub fn resolve(&self, order_id: OrderId) -> bool {
        self.lock().remove(&order_id).is_some()
    }

    pub fn get(&self, order_id: OrderId) -> Option<ReconciliationItem> {
        self.lock().get(&order_id).cloned()
    }

    /// Pending items ordered by order id.
    pub fn pending(&self) -> Vec<ReconciliationItem> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<OrderId, ReconciliationItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defer_counts_attempts() {
        let queue = ReconciliationQueue::default();
        queue.defer(OrderId(2), "ledger down");
        queue.defer(OrderId(1), "ledger down");
        queue.defer(OrderId(2), "timed out");

        let pending = queue.pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].order_id, OrderId(1));
        assert_eq!(pending[1].attempts, 2);
        assert_eq!(pending[1].reason, "timed out");

        assert!(queue.resolve(OrderId(2)));
        assert!(!queue.resolve(OrderId(2)));
        assert_eq!(queue.pending().len(), 1);
    }
}
