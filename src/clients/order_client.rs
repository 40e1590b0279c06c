use crate::error::{recover, StoreError};
use crate::guard::RetryPolicy;
use crate::model::{CustomerId, Order, OrderCreate, OrderId, OrderPatch, PaymentMethod};
use crate::order_actor::{OrderAction, OrderError};
use actor_framework::{ActorClient, Filter, FrameworkError, Insertion, ResourceClient};
use async_trait::async_trait;
use std::cmp::Reverse;
use tracing::{debug, info, instrument};

/// Client for interacting with the order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    retry: RetryPolicy,
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover("orders")(e)
    }
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, retry: RetryPolicy) -> Self {
        Self { inner, retry }
    }

    /// Inserts the order unless one was already created under the same request key, in which
    /// case that order is returned.
    #[instrument(skip(self, create), fields(request_key = %create.request_key))]
    pub async fn place(&self, create: OrderCreate) -> Result<Insertion<Order>, OrderError> {
        debug!(?create, "place called");
        let insertion = self
            .retry
            .retry("place_order", || async {
                self.inner
                    .create_if_absent(create.clone())
                    .await
                    .map_err(Self::map_error)
            })
            .await?;
        match &insertion {
            Insertion::Created(order) => info!(order_id = %order.id, total = %order.total_price, "Order persisted"),
            Insertion::Existing(order) => info!(order_id = %order.id, "Order already persisted"),
        }
        Ok(insertion)
    }

    #[instrument(skip(self))]
    pub async fn find(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        self.retry.retry("get_order", || self.get(id)).await
    }

    /// The order, or `NotFound`.
    pub async fn order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    /// Applies a status patch. Reapplying the current values is a no-op, so this is retried.
    #[instrument(skip(self))]
    pub async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order, OrderError> {
        self.retry
            .retry("update_order", || async {
                self.inner
                    .update(id, patch.clone())
                    .await
                    .map_err(Self::map_error)
            })
            .await
    }

    /// Marks the order's BOM deduction as applied, settling it with `settle` if given.
    #[instrument(skip(self))]
    pub async fn commit_inventory(
        &self,
        id: OrderId,
        settle: Option<PaymentMethod>,
    ) -> Result<Order, OrderError> {
        self.retry
            .retry("commit_inventory", || async {
                self.inner
                    .perform_action(id, OrderAction::CommitInventory { settle })
                    .await
                    .map_err(Self::map_error)
            })
            .await
    }

    /// Deletes the order. Refused for a settled order and while a financial record
    /// references it.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), OrderError> {
        self.retry
            .retry_if_not_applied("delete_order", || self.delete(id))
            .await
    }

    /// Orders of one customer, newest first.
    #[instrument(skip(self))]
    pub async fn for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError> {
        let mut orders = self
            .retry
            .retry("orders_for_customer", || async {
                self.inner
                    .query(Filter::new(move |order: &Order| order.customer_id == customer_id))
                    .await
                    .map_err(Self::map_error)
            })
            .await?;
        orders.sort_by_key(|order| Reverse((order.entry_date, order.id)));
        Ok(orders)
    }
}
