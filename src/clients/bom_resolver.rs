use crate::bom_actor::BomError;
use crate::clients::ServiceClient;
use crate::error::{recover, CatalogError, StoreError};
use crate::guard::RetryPolicy;
use crate::model::{BomEntry, BomEntryCreate, BomEntryId, BomEntryUpdate, BomLine, MaterialId, ServiceId};
use actor_framework::{ActorClient, Filter, FrameworkError, ResourceClient};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

/// Read side of the bill of materials, plus the maintenance calls that edit it.
#[derive(Clone)]
pub struct BomResolver {
    inner: ResourceClient<BomEntry>,
    services: ServiceClient,
    retry: RetryPolicy,
}

#[async_trait]
impl ActorClient<BomEntry> for BomResolver {
    type Error = BomError;

    fn inner(&self) -> &ResourceClient<BomEntry> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover("service_bom")(e)
    }
}

impl BomResolver {
    pub fn new(inner: ResourceClient<BomEntry>, services: ServiceClient, retry: RetryPolicy) -> Self {
        Self {
            inner,
            services,
            retry,
        }
    }

    /// Materials consumed by one unit of `service_id`, ordered by entry.
    ///
    /// # Errors
    /// [`BomError::ServiceNotFound`] if the service does not exist. A service without entries
    /// resolves to an empty list.
    #[instrument(skip(self))]
    pub async fn resolve(&self, service_id: ServiceId) -> Result<Vec<BomLine>, BomError> {
        self.require_service(service_id).await?;

        let mut entries = self
            .retry
            .retry("resolve_bom", || async {
                self.inner
                    .query(Filter::new(move |entry: &BomEntry| entry.service_id == service_id))
                    .await
                    .map_err(Self::map_error)
            })
            .await?;
        entries.sort_by_key(|entry| entry.id);

        debug!(lines = entries.len(), "BOM resolved");
        Ok(entries.iter().map(BomEntry::line).collect())
    }

    /// Adds a material to a service's recipe. A material may appear once per service.
    #[instrument(skip(self))]
    pub async fn add_entry(
        &self,
        service_id: ServiceId,
        material_id: MaterialId,
        usage_per_unit: Decimal,
    ) -> Result<BomEntryId, BomError> {
        self.require_service(service_id).await?;
        let create = BomEntryCreate {
            service_id,
            material_id,
            usage_per_unit,
        };
        self.retry
            .retry_if_not_applied("add_bom_entry", || async {
                self.inner.create(create.clone()).await.map_err(Self::map_error)
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_usage(&self, id: BomEntryId, usage_per_unit: Decimal) -> Result<BomEntry, BomError> {
        self.retry
            .retry("set_bom_usage", || async {
                self.inner
                    .update(id, BomEntryUpdate { usage_per_unit })
                    .await
                    .map_err(Self::map_error)
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_entry(&self, id: BomEntryId) -> Result<(), BomError> {
        self.retry
            .retry_if_not_applied("remove_bom_entry", || self.delete(id))
            .await
    }

    async fn require_service(&self, service_id: ServiceId) -> Result<(), BomError> {
        match self.services.find(service_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(BomError::ServiceNotFound(service_id)),
            Err(CatalogError::Store(e)) => Err(BomError::Store(e)),
            Err(CatalogError::Invalid { field, reason }) => Err(BomError::Store(StoreError::Rejected {
                resource: "services",
                reason: format!("{field}: {reason}"),
            })),
        }
    }
}
