use crate::error::{recover, CatalogError, StoreError};
use crate::guard::RetryPolicy;
use crate::model::{Service, ServiceCreate, ServiceId, ServiceUpdate};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the service catalog.
#[derive(Clone)]
pub struct ServiceClient {
    inner: ResourceClient<Service>,
    retry: RetryPolicy,
}

#[async_trait]
impl ActorClient<Service> for ServiceClient {
    type Error = CatalogError;

    fn inner(&self) -> &ResourceClient<Service> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover("services")(e)
    }
}

impl ServiceClient {
    pub fn new(inner: ResourceClient<Service>, retry: RetryPolicy) -> Self {
        Self { inner, retry }
    }

    #[instrument(skip(self))]
    pub async fn create_service(&self, create: ServiceCreate) -> Result<ServiceId, CatalogError> {
        debug!("Sending request");
        self.retry
            .retry_if_not_applied("create_service", || async {
                self.inner.create(create.clone()).await.map_err(Self::map_error)
            })
            .await
    }

    /// `None` if the service does not exist.
    #[instrument(skip(self))]
    pub async fn find(&self, id: ServiceId) -> Result<Option<Service>, CatalogError> {
        self.retry.retry("get_service", || self.get(id)).await
    }

    /// The service, or `NotFound`.
    pub async fn service(&self, id: ServiceId) -> Result<Service, CatalogError> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    #[instrument(skip(self))]
    pub async fn update_service(
        &self,
        id: ServiceId,
        update: ServiceUpdate,
    ) -> Result<Service, CatalogError> {
        self.retry
            .retry("update_service", || async {
                self.inner
                    .update(id, update.clone())
                    .await
                    .map_err(Self::map_error)
            })
            .await
    }
}
