use crate::error::{recover, StoreError};
use crate::guard::RetryPolicy;
use crate::inventory_actor::{InventoryError, StockAction};
use crate::model::{InventoryItem, InventoryItemCreate, MaterialId, StockDelta, StockLevel};
use actor_framework::{ActorClient, Filter, FrameworkError, ResourceClient};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

/// The only writer of `remaining_stock`.
///
/// Every mutation is a [`StockAction`] executed inside the inventory actor, so concurrent orders
/// touching the same material serialize on the actor instead of racing on a value read earlier.
#[derive(Clone)]
pub struct InventoryLedger {
    inner: ResourceClient<InventoryItem>,
    retry: RetryPolicy,
}

#[async_trait]
impl ActorClient<InventoryItem> for InventoryLedger {
    type Error = InventoryError;

    fn inner(&self) -> &ResourceClient<InventoryItem> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover("inventory_items")(e)
    }
}

impl InventoryLedger {
    pub fn new(inner: ResourceClient<InventoryItem>, retry: RetryPolicy) -> Self {
        Self { inner, retry }
    }

    #[instrument(skip(self))]
    pub async fn create_item(&self, create: InventoryItemCreate) -> Result<MaterialId, InventoryError> {
        debug!("Sending request");
        self.retry
            .retry_if_not_applied("create_item", || async {
                self.inner.create(create.clone()).await.map_err(Self::map_error)
            })
            .await
    }

    /// The item, or `NotFound`.
    #[instrument(skip(self))]
    pub async fn item(&self, id: MaterialId) -> Result<InventoryItem, InventoryError> {
        self.retry
            .retry("get_item", || self.get(id))
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    pub async fn stock(&self, id: MaterialId) -> Result<Decimal, InventoryError> {
        Ok(self.item(id).await?.remaining_stock)
    }

    /// Applies one signed delta atomically.
    ///
    /// # Errors
    /// [`InventoryError::InsufficientStock`] if the stock would go negative; nothing changes.
    #[instrument(skip(self))]
    pub async fn apply_delta(&self, id: MaterialId, delta: Decimal) -> Result<StockLevel, InventoryError> {
        let level = self
            .retry
            .retry_if_not_applied("apply_delta", || self.act(id, StockAction::Apply(delta)))
            .await?;
        debug!(before = %level.before, after = %level.after, "Stock changed");
        Ok(level)
    }

    /// Applies all deltas or none.
    ///
    /// With a `key` the batch is applied at most once: repeating it, even after an unknown
    /// outcome, returns the levels of the first application.
    #[instrument(skip(self, deltas), fields(lines = deltas.len()))]
    pub async fn batch_apply(
        &self,
        key: Option<&str>,
        deltas: &[StockDelta],
    ) -> Result<Vec<StockLevel>, InventoryError> {
        if deltas.is_empty() {
            debug!("Nothing to apply");
            return Ok(Vec::new());
        }
        let actions: Vec<_> = deltas
            .iter()
            .map(|line| (line.material_id, StockAction::Apply(line.delta)))
            .collect();
        let key = key.map(str::to_owned);
        let call = || async {
            self.inner
                .batch(key.clone(), actions.clone())
                .await
                .map_err(Self::map_error)
        };

        let levels = if key.is_some() {
            self.retry.retry("batch_apply", call).await?
        } else {
            self.retry.retry_if_not_applied("batch_apply", call).await?
        };
        info!(lines = levels.len(), "Stock batch applied");
        Ok(levels)
    }

    /// Drops the replay record of a keyed batch. Call it once the batch's owner is durably
    /// marked as applied, so no retry resends the key.
    #[instrument(skip(self))]
    pub async fn forget_batch(&self, key: &str) -> Result<bool, InventoryError> {
        self.retry
            .retry("forget_batch", || async {
                self.inner.forget_batch(key).await.map_err(Self::map_error)
            })
            .await
    }

    /// Adds received stock.
    #[instrument(skip(self))]
    pub async fn restock(&self, id: MaterialId, amount: Decimal) -> Result<StockLevel, InventoryError> {
        if amount <= Decimal::ZERO {
            return Err(InventoryError::InvalidAmount(amount));
        }
        self.apply_delta(id, amount).await
    }

    /// Replaces the stock with a physically counted level.
    #[instrument(skip(self))]
    pub async fn recount(&self, id: MaterialId, counted: Decimal) -> Result<StockLevel, InventoryError> {
        self.retry
            .retry("recount", || self.act(id, StockAction::Recount(counted)))
            .await
    }

    /// Items at or below `threshold`, lowest stock first.
    #[instrument(skip(self))]
    pub async fn low_stock(&self, threshold: Decimal) -> Result<Vec<InventoryItem>, InventoryError> {
        let mut items = self
            .retry
            .retry("low_stock", || async {
                self.inner
                    .query(Filter::new(move |item: &InventoryItem| item.remaining_stock <= threshold))
                    .await
                    .map_err(Self::map_error)
            })
            .await?;
        items.sort_by(|a, b| a.remaining_stock.cmp(&b.remaining_stock).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn act(&self, id: MaterialId, action: StockAction) -> Result<StockLevel, InventoryError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}
