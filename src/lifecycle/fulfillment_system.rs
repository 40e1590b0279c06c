use crate::clients::{
    BomResolver, CustomerClient, FinancialLedger, InventoryLedger, OrderClient, ServiceClient,
};
use crate::config::FulfillmentConfig;
use crate::guard::{ConsistencyGuard, RetryPolicy};
use crate::orchestrator::{Collaborators, ReceiptBook, TransactionOrchestrator};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("actor task failed: {0}")]
    ActorTask(#[from] JoinError),
}

/// Runtime container for the fulfillment engine.
///
/// Owns one actor per record set (customers, services, BOM, inventory, ledger, orders,
/// idempotency claims) and hands out the clients for them. Every client carries the configured
/// call timeout and retry policy.
pub struct FulfillmentSystem {
    pub customers: CustomerClient,
    pub services: ServiceClient,
    pub bom: BomResolver,
    pub inventory: InventoryLedger,
    pub ledger: FinancialLedger,
    pub orders: OrderClient,
    pub orchestrator: TransactionOrchestrator,

    handles: Vec<JoinHandle<()>>,
}

impl FulfillmentSystem {
    /// Spawns all actors. Must be called inside a Tokio runtime.
    pub fn new(config: &FulfillmentConfig) -> Self {
        let buffer = config.store.buffer_size;
        let timeout = config.call_timeout();
        let retry = RetryPolicy::from(&config.retry);

        // 1. Create actors
        let (customer_actor, customer_client) = crate::customer_actor::new(buffer);
        let (service_actor, service_client) = crate::service_actor::new(buffer);
        let (bom_actor, bom_client) = crate::bom_actor::new(buffer);
        let (inventory_actor, inventory_client) = crate::inventory_actor::new(buffer);
        let (financial_actor, financial_client) = crate::financial_actor::new(buffer);
        let (order_actor, order_client) = crate::order_actor::new(buffer);
        let (claim_actor, claim_client) = crate::guard_actor::new(buffer);

        // 2. Wrap the raw clients
        let customers = CustomerClient::new(customer_client.with_timeout(timeout), retry);
        let services = ServiceClient::new(service_client.with_timeout(timeout), retry);
        let bom = BomResolver::new(bom_client.with_timeout(timeout), services.clone(), retry);
        let inventory = InventoryLedger::new(inventory_client.with_timeout(timeout), retry);
        let ledger = FinancialLedger::new(financial_client.with_timeout(timeout), retry);
        let orders = OrderClient::new(order_client.with_timeout(timeout), retry);
        let guard = ConsistencyGuard::new(
            claim_client.with_timeout(timeout),
            retry,
            config.claim_ttl(),
            config.best_effort_timeout(),
        );

        // 3. Start actors; orders check the ledger before deleting
        let handles = vec![
            tokio::spawn(customer_actor.run(())),
            tokio::spawn(service_actor.run(())),
            tokio::spawn(bom_actor.run(())),
            tokio::spawn(inventory_actor.run(())),
            tokio::spawn(financial_actor.run(())),
            tokio::spawn(order_actor.run(ledger.clone())),
            tokio::spawn(claim_actor.run(())),
        ];

        let orchestrator = TransactionOrchestrator::new(
            Collaborators {
                customers: customers.clone(),
                services: services.clone(),
                bom: bom.clone(),
                inventory: inventory.clone(),
                ledger: ledger.clone(),
                orders: orders.clone(),
                guard,
            },
            ReceiptBook::new(config.receipts.prefix.clone()),
        );

        info!(actors = handles.len(), "Fulfillment system started");
        Self {
            customers,
            services,
            bom,
            inventory,
            ledger,
            orders,
            orchestrator,
            handles,
        }
    }

    /// Drops every client, which closes the actor channels, then waits for the actors to exit.
    ///
    /// Clones of the clients held elsewhere keep their actors alive; drop them first.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        let Self {
            customers,
            services,
            bom,
            inventory,
            ledger,
            orders,
            orchestrator,
            handles,
        } = self;
        drop(orchestrator);
        drop(orders);
        drop(bom);
        drop(customers);
        drop(services);
        drop(inventory);
        drop(ledger);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(e.into());
            }
        }
        info!("System shutdown complete.");
        Ok(())
    }
}
