use crate::error::{recover, CatalogError, StoreError};
use crate::guard::RetryPolicy;
use crate::model::{Customer, CustomerCreate, CustomerId, CustomerUpdate};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the customer record set.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
    retry: RetryPolicy,
}

#[async_trait]
impl ActorClient<Customer> for CustomerClient {
    type Error = CatalogError;

    fn inner(&self) -> &ResourceClient<Customer> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover("customers")(e)
    }
}

impl CustomerClient {
    pub fn new(inner: ResourceClient<Customer>, retry: RetryPolicy) -> Self {
        Self { inner, retry }
    }

    #[instrument(skip(self))]
    pub async fn create_customer(&self, create: CustomerCreate) -> Result<CustomerId, CatalogError> {
        debug!("Sending request");
        self.retry
            .retry_if_not_applied("create_customer", || async {
                self.inner.create(create.clone()).await.map_err(Self::map_error)
            })
            .await
    }

    /// The customer, or `NotFound`.
    #[instrument(skip(self))]
    pub async fn customer(&self, id: CustomerId) -> Result<Customer, CatalogError> {
        self.retry
            .retry("get_customer", || self.get(id))
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    #[instrument(skip(self))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, CatalogError> {
        self.retry
            .retry("update_customer", || async {
                self.inner
                    .update(id, update.clone())
                    .await
                    .map_err(Self::map_error)
            })
            .await
    }
}
