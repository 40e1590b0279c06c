//! Undo steps collected while an order is being created.

use crate::clients::OrderClient;
use crate::error::StoreError;
use crate::model::OrderId;
use crate::order_actor::OrderError;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Compensation {
    /// Removes an order row whose inventory deduction never happened.
    DeleteOrder(OrderId),
}

#[derive(Debug, Default)]
pub(crate) struct Compensations {
    steps: Vec<Compensation>,
}

impl Compensations {
    pub(crate) fn push(&mut self, step: Compensation) {
        self.steps.push(step);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step, latest first. Returns a description of each step that failed.
    pub(crate) async fn run(self, orders: &OrderClient) -> Vec<String> {
        let mut failures = Vec::new();
        for step in self.steps.into_iter().rev() {
            match &step {
                Compensation::DeleteOrder(order_id) => match orders.delete_order(*order_id).await {
                    Ok(()) | Err(OrderError::Store(StoreError::NotFound(_))) => {
                        info!(%order_id, "Rolled back order");
                    }
                    Err(e) => {
                        error!(%order_id, error = %e, "Rollback of order failed");
                        failures.push(format!("delete {order_id}: {e}"));
                    }
                },
            }
        }
        failures
    }
}
