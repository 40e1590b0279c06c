//! # Transaction Orchestrator
//!
//! Entry point for creating and updating orders. Each call runs one linear chain of remote
//! calls, always in this order:
//!
//! 1. validate the input and the referenced customer and service (no writes yet)
//! 2. persist the order row unpaid, keyed by the request's idempotency token
//! 3. resolve the service's BOM and deduct `quantity × usage` per material as one keyed batch
//! 4. mark the deduction committed, settling a paid-up-front order in the same step
//! 5. if the order is settled, post its income to the ledger
//!
//! Steps 1 to 3 are fatal: a failure rolls the order back through the compensations collected
//! on the way, unless a write may have landed, in which case the row is left for
//! a retry with the same token to resume. A failure in step 4 keeps the row for such a retry
//! too, since the stock is already gone. Step 5 is not fatal: the order stands and the posting
//! is parked in the [`ReconciliationQueue`].

mod compensation;
mod reconciliation;
mod receipt;

pub use reconciliation::*;
pub use receipt::*;

use crate::clients::{
    BomResolver, CustomerClient, FinancialLedger, InventoryLedger, OrderClient, ServiceClient,
};
use crate::error::{CatalogError, ErrorKind, FulfillmentError, StoreError};
use crate::guard::{Admission, ConsistencyGuard, RequestContext};
use crate::model::{
    Customer, CustomerId, FinancialRecord, IncomePosting, NewOrder, Operation, Order, OrderCreate,
    OrderId, OrderPatch, OrderStatus, OrderView, PaymentMethod, PaymentStatus, Posting, Service,
    StockDelta, StockLevel,
};
use actor_framework::Insertion;
use compensation::{Compensation, Compensations};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What happened to the ledger side of an order operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PostingStatus {
    /// The order is not settled.
    NotRequired,
    Posted(FinancialRecord),
    /// A record for this order existed already. Success.
    AlreadyPosted(FinancialRecord),
    /// Posting failed and the order was queued for reconciliation.
    Deferred(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub order: OrderView,
    /// Stock levels changed by this call. Empty for a service without BOM and for replays.
    pub stock: Vec<StockLevel>,
    pub posting: PostingStatus,
    /// `true` when the token had already completed and nothing was applied.
    pub replayed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub order: OrderView,
    pub posting: PostingStatus,
    pub replayed: bool,
}

/// The record-set clients the orchestrator sequences.
#[derive(Clone)]
pub struct Collaborators {
    pub customers: CustomerClient,
    pub services: ServiceClient,
    pub bom: BomResolver,
    pub inventory: InventoryLedger,
    pub ledger: FinancialLedger,
    pub orders: OrderClient,
    pub guard: ConsistencyGuard,
}

#[derive(Clone)]
pub struct TransactionOrchestrator {
    stores: Collaborators,
    receipts: Arc<ReceiptBook>,
    reconciliation: ReconciliationQueue,
}

impl TransactionOrchestrator {
    pub fn new(stores: Collaborators, receipts: ReceiptBook) -> Self {
        Self {
            stores,
            receipts: Arc::new(receipts),
            reconciliation: ReconciliationQueue::default(),
        }
    }

    /// Creates an order, deducts its materials and posts income if it is paid up front.
    ///
    /// Retrying with the same `ctx.key` never deducts or posts twice: a completed request
    /// returns the original order with `replayed = true`, a request that failed part way
    /// resumes from the persisted order row.
    ///
    /// # Errors
    /// - `Validation` for a zero quantity or an unknown customer or service
    /// - `InsufficientStock` if any BOM material runs short; no stock changed and the order was
    ///   rolled back
    /// - `InProgress` while another execution holds the same token
    /// - `RemoteUnavailable` after retries; with an unknown outcome retry with the same token
    #[instrument(skip_all, fields(key = %ctx.key, actor = ctx.actor.as_deref()))]
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        input: NewOrder,
    ) -> Result<CreateOutcome, FulfillmentError> {
        debug!(?input, "create_order called");
        if input.quantity == 0 {
            return Err(FulfillmentError::Validation(
                "quantity must be positive".into(),
            ));
        }
        let customer = self
            .stores
            .customers
            .customer(input.customer_id)
            .await
            .map_err(|e| unknown_reference(e, input.customer_id))?;
        let service = self
            .stores
            .services
            .service(input.service_id)
            .await
            .map_err(|e| unknown_reference(e, input.service_id))?;

        let claim = match self.stores.guard.begin(ctx, Operation::CreateOrder).await? {
            Admission::Replay(order_id) => return self.replay_create(order_id).await,
            Admission::Fresh(claim) => claim,
        };

        let result = self.run_create(ctx, input, &customer, &service).await;
        match &result {
            Ok(outcome) => {
                self.stores.guard.complete(&claim, outcome.order.order.id).await;
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Order creation failed");
                self.stores.guard.release(&claim).await;
            }
        }
        result
    }

    async fn run_create(
        &self,
        ctx: &RequestContext,
        input: NewOrder,
        customer: &Customer,
        service: &Service,
    ) -> Result<CreateOutcome, FulfillmentError> {
        let entry_date = input.entry_date.unwrap_or(ctx.received_at);
        let settle = input
            .payment_status
            .is_settled()
            .then_some(input.payment_method);
        let receipt_no = input
            .receipt_no
            .unwrap_or_else(|| self.receipts.next(entry_date));

        // placed unpaid: a settled order is never deleted, and the row must stay deletable
        // until the deduction has landed
        let insertion = self
            .stores
            .orders
            .place(OrderCreate {
                request_key: ctx.key.to_string(),
                customer_id: customer.id,
                service_id: service.id,
                quantity: input.quantity,
                unit_price: service.unit_price,
                entry_date,
                order_status: OrderStatus::Received,
                payment_status: PaymentStatus::Unpaid,
                payment_method: input.payment_method,
                receipt_no,
            })
            .await?;
        let resumed = matches!(insertion, Insertion::Existing(_));
        if resumed {
            info!(order_id = %insertion.get().id, "Resuming earlier attempt");
        }
        let order = insertion.into_inner();

        let (order, stock) = if order.inventory_committed {
            debug!(order_id = %order.id, "Inventory already deducted");
            (order, Vec::new())
        } else {
            let mut compensations = Compensations::default();
            compensations.push(Compensation::DeleteOrder(order.id));
            let key = format!("deduct:{}", order.id);
            let stock = match self.deduct_inventory(&order, &key).await {
                Ok(stock) => stock,
                Err(err) => return Err(self.unwind(compensations, err, resumed).await),
            };
            (self.commit_inventory(&order, settle, &key).await?, stock)
        };

        let posting = if order.payment_status.is_settled() {
            self.post_income(&order, &customer.name).await
        } else {
            PostingStatus::NotRequired
        };

        info!(
            order_id = %order.id,
            receipt_no = %order.receipt_no,
            total = %order.total_price,
            materials = stock.len(),
            "Order created"
        );
        Ok(CreateOutcome {
            order: OrderView {
                order,
                customer_name: Some(customer.name.clone()),
                service_name: Some(service.name.clone()),
            },
            stock,
            posting,
            replayed: false,
        })
    }

    /// Resolves the BOM and applies the deduction as one batch under `key`, so a resumed
    /// attempt replays instead of deducting again.
    async fn deduct_inventory(&self, order: &Order, key: &str) -> Result<Vec<StockLevel>, FulfillmentError> {
        let lines = self.stores.bom.resolve(order.service_id).await?;
        let deltas = lines
            .iter()
            .map(|line| -> Result<StockDelta, FulfillmentError> {
                let delta = line.consumption(order.quantity).ok_or_else(|| {
                    FulfillmentError::Validation(format!(
                        "consumption of {} for {} units is out of range",
                        line.material_id, order.quantity
                    ))
                })?;
                Ok(StockDelta {
                    material_id: line.material_id,
                    delta,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self
            .stores
            .inventory
            .batch_apply(Some(key), &deltas)
            .await?)
    }

    /// Marks the deduction as applied and settles a paid-up-front order in the same step.
    ///
    /// The stock is gone at this point, so a failure keeps the order for a retry with the same
    /// token, which replays the keyed batch and commits. Once committed, no retry resends the
    /// batch and its replay record is dropped.
    async fn commit_inventory(
        &self,
        order: &Order,
        settle: Option<PaymentMethod>,
        key: &str,
    ) -> Result<Order, FulfillmentError> {
        let committed = match self.stores.orders.commit_inventory(order.id, settle).await {
            Ok(committed) => committed,
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Keeping deducted order for a retry with the same token");
                return Err(e.into());
            }
        };
        if let Err(e) = self.stores.inventory.forget_batch(key).await {
            warn!(order_id = %order.id, %key, error = %e, "Could not drop batch replay record");
        }
        Ok(committed)
    }

    /// Runs the compensations for a failed creation, unless earlier writes may have landed.
    async fn unwind(
        &self,
        compensations: Compensations,
        err: FulfillmentError,
        resumed: bool,
    ) -> FulfillmentError {
        if err.outcome_unknown() || (resumed && err.kind() == ErrorKind::RemoteUnavailable) {
            warn!(error = %err, "Keeping order for a retry with the same token");
            return err;
        }
        if compensations.is_empty() {
            return err;
        }
        let failures = compensations.run(&self.stores.orders).await;
        if failures.is_empty() {
            err
        } else {
            FulfillmentError::Compensation {
                cause: Box::new(err),
                failures,
            }
        }
    }

    async fn replay_create(&self, order_id: OrderId) -> Result<CreateOutcome, FulfillmentError> {
        let order = self.stores.orders.order(order_id).await?;
        let posting = self.current_posting(&order).await?;
        Ok(CreateOutcome {
            order: self.view(order).await,
            stock: Vec::new(),
            posting,
            replayed: true,
        })
    }

    /// Applies a staff update. A patch that settles the payment posts income for the order,
    /// once, however often it is repeated.
    ///
    /// Inventory is never touched: quantity cannot change after creation.
    #[instrument(skip_all, fields(key = %ctx.key, %order_id, actor = ctx.actor.as_deref()))]
    pub async fn update_order(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
        patch: OrderPatch,
    ) -> Result<UpdateOutcome, FulfillmentError> {
        debug!(?patch, "update_order called");
        let claim = match self
            .stores
            .guard
            .begin(ctx, Operation::UpdateOrder(order_id))
            .await?
        {
            Admission::Replay(_) => {
                let order = self.stores.orders.order(order_id).await?;
                let posting = self.current_posting(&order).await?;
                return Ok(UpdateOutcome {
                    order: self.view(order).await,
                    posting,
                    replayed: true,
                });
            }
            Admission::Fresh(claim) => claim,
        };

        let result = self.run_update(order_id, &patch).await;
        match &result {
            Ok(_) => self.stores.guard.complete(&claim, order_id).await,
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Order update failed");
                self.stores.guard.release(&claim).await;
            }
        }
        result
    }

    async fn run_update(&self, order_id: OrderId, patch: &OrderPatch) -> Result<UpdateOutcome, FulfillmentError> {
        let order = self
            .stores
            .orders
            .update_order(order_id, patch.clone())
            .await?;
        info!(
            status = %order.order_status,
            payment = %order.payment_status,
            "Order updated"
        );

        let view = self.view(order).await;
        let posting = if patch.settles() {
            let payer = view
                .customer_name
                .clone()
                .unwrap_or_else(|| view.order.customer_id.to_string());
            self.post_income(&view.order, &payer).await
        } else {
            PostingStatus::NotRequired
        };
        Ok(UpdateOutcome {
            order: view,
            posting,
            replayed: false,
        })
    }

    pub async fn update_order_status(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<UpdateOutcome, FulfillmentError> {
        self.update_order(ctx, order_id, OrderPatch::status(status))
            .await
    }

    pub async fn update_payment_status(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<UpdateOutcome, FulfillmentError> {
        self.update_order(ctx, order_id, OrderPatch::payment(status))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderView, FulfillmentError> {
        let order = self.stores.orders.order(order_id).await?;
        Ok(self.view(order).await)
    }

    /// A customer's orders, newest first.
    #[instrument(skip(self))]
    pub async fn orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderView>, FulfillmentError> {
        let customer = self
            .stores
            .customers
            .customer(customer_id)
            .await
            .map_err(|e| unknown_reference(e, customer_id))?;
        let orders = self.stores.orders.for_customer(customer_id).await?;

        let mut service_names = HashMap::new();
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            if !service_names.contains_key(&order.service_id) {
                let name = self.service_name(&order).await;
                service_names.insert(order.service_id, name);
            }
            views.push(OrderView {
                customer_name: Some(customer.name.clone()),
                service_name: service_names.get(&order.service_id).cloned().flatten(),
                order,
            });
        }
        Ok(views)
    }

    /// Deletes an unpaid order that has no financial record. Stock is not restored.
    ///
    /// # Errors
    /// `Validation` for a settled order, whose income is posted or waiting in the
    /// reconciliation queue, and for an order a ledger record references.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), FulfillmentError> {
        self.stores.orders.delete_order(order_id).await?;
        self.reconciliation.resolve(order_id);
        info!("Order deleted");
        Ok(())
    }

    /// Postings that failed and are waiting for [`Self::retry_pending_postings`].
    pub fn pending_postings(&self) -> Vec<ReconciliationItem> {
        self.reconciliation.pending()
    }

    /// Retries every parked posting once.
    #[instrument(skip(self))]
    pub async fn retry_pending_postings(&self) -> Result<ReconciliationReport, FulfillmentError> {
        let mut report = ReconciliationReport::default();
        for item in self.reconciliation.pending() {
            let order = match self.stores.orders.find(item.order_id).await? {
                Some(order) if order.payment_status.is_settled() => order,
                _ => {
                    self.reconciliation.resolve(item.order_id);
                    report.dropped.push(item.order_id);
                    continue;
                }
            };
            let view = self.view(order).await;
            let payer = view
                .customer_name
                .clone()
                .unwrap_or_else(|| view.order.customer_id.to_string());
            match self.post_income(&view.order, &payer).await {
                PostingStatus::Deferred(_) => report.still_pending.push(item.order_id),
                _ => report.posted.push(item.order_id),
            }
        }
        info!(
            posted = report.posted.len(),
            dropped = report.dropped.len(),
            still_pending = report.still_pending.len(),
            "Reconciliation pass finished"
        );
        Ok(report)
    }

    /// Posts income for a settled order. Never fails: errors park the order for reconciliation.
    async fn post_income(&self, order: &Order, payer: &str) -> PostingStatus {
        let posting = IncomePosting {
            order_id: order.id,
            date: order.entry_date.date_naive(),
            description: format!("Payment {} - {}", order.receipt_no, payer),
            amount: order.total_price,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
        };
        match self.stores.ledger.post_income_if_absent(posting).await {
            Ok(posting) => {
                self.reconciliation.resolve(order.id);
                match posting {
                    Posting::Created(record) => PostingStatus::Posted(record),
                    Posting::AlreadyExists(record) => PostingStatus::AlreadyPosted(record),
                }
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Ledger posting deferred to reconciliation");
                let reason = e.to_string();
                self.reconciliation.defer(order.id, reason.clone());
                PostingStatus::Deferred(reason)
            }
        }
    }

    /// Ledger state of an order that is not being changed by this call.
    async fn current_posting(&self, order: &Order) -> Result<PostingStatus, FulfillmentError> {
        if let Some(record) = self.stores.ledger.find_for_order(order.id).await? {
            return Ok(PostingStatus::AlreadyPosted(record));
        }
        Ok(match self.reconciliation.get(order.id) {
            Some(item) => PostingStatus::Deferred(item.reason),
            None => PostingStatus::NotRequired,
        })
    }

    /// Joins display names. Lookup failures leave the name empty.
    async fn view(&self, order: Order) -> OrderView {
        let customer_name = match self.stores.customers.customer(order.customer_id).await {
            Ok(customer) => Some(customer.name),
            Err(e) => {
                warn!(customer_id = %order.customer_id, error = %e, "Customer lookup failed");
                None
            }
        };
        let service_name = self.service_name(&order).await;
        OrderView {
            order,
            customer_name,
            service_name,
        }
    }

    async fn service_name(&self, order: &Order) -> Option<String> {
        match self.stores.services.find(order.service_id).await {
            Ok(service) => service.map(|service| service.name),
            Err(e) => {
                warn!(service_id = %order.service_id, error = %e, "Service lookup failed");
                None
            }
        }
    }
}

/// An unknown customer or service is bad input, not a missing resource.
fn unknown_reference(err: CatalogError, id: impl std::fmt::Display) -> FulfillmentError {
    match err {
        CatalogError::Store(StoreError::NotFound(_)) => {
            FulfillmentError::Validation(format!("unknown reference {id}"))
        }
        other => other.into(),
    }
}
