//! Orchestrator failure paths.
//!
//! Catalog, BOM, order and claim actors are real; inventory and the ledger are mocks so a test
//! can lose replies, refuse requests or take the store away at a precise step.

use actor_framework::mock::MockClient;
use actor_framework::{FrameworkError, Insertion, ResourceClient};
use laundry_fulfillment::clients::{
    BomResolver, CustomerClient, FinancialLedger, InventoryLedger, OrderClient, ServiceClient,
};
use laundry_fulfillment::error::{ErrorKind, FulfillmentError};
use laundry_fulfillment::guard::{ConsistencyGuard, RequestContext, RetryPolicy};
use laundry_fulfillment::inventory_actor::InventoryError;
use laundry_fulfillment::model::{
    CustomerCreate, CustomerId, FinancialRecord, FinancialRecordId, InventoryItem, MaterialId,
    NewOrder, Operation, OrderId, PaymentMethod, RecordType, ServiceCreate, ServiceId, StockLevel,
};
use laundry_fulfillment::orchestrator::{
    Collaborators, PostingStatus, ReceiptBook, TransactionOrchestrator,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

const DETERGENT: MaterialId = MaterialId(1);

struct Harness {
    orchestrator: TransactionOrchestrator,
    orders: OrderClient,
    guard: ConsistencyGuard,
    customer: CustomerId,
    wash: ServiceId,
}

/// Wires real catalog, BOM, order and claim actors around the given inventory and ledger
/// clients. "Wash&Fold" costs 2500 and uses 0.1 of material 1 per unit.
async fn harness(
    inventory: ResourceClient<InventoryItem>,
    ledger: ResourceClient<FinancialRecord>,
) -> Harness {
    let retry = RetryPolicy::default();
    let timeout = Duration::from_secs(1);

    let (customer_actor, customer_client) = laundry_fulfillment::customer_actor::new(16);
    let (service_actor, service_client) = laundry_fulfillment::service_actor::new(16);
    let (bom_actor, bom_client) = laundry_fulfillment::bom_actor::new(16);
    let (order_actor, order_client) = laundry_fulfillment::order_actor::new(16);
    let (claim_actor, claim_client) = laundry_fulfillment::guard_actor::new(16);

    let customers = CustomerClient::new(customer_client, retry);
    let services = ServiceClient::new(service_client, retry);
    let bom = BomResolver::new(bom_client, services.clone(), retry);
    let inventory = InventoryLedger::new(inventory.with_timeout(timeout), retry);
    let ledger_client = ledger.with_timeout(timeout);
    let ledger = FinancialLedger::new(ledger_client.clone(), retry);
    let orders = OrderClient::new(order_client, retry);
    let guard = ConsistencyGuard::new(claim_client, retry, Duration::from_secs(30), timeout);

    tokio::spawn(customer_actor.run(()));
    tokio::spawn(service_actor.run(()));
    tokio::spawn(bom_actor.run(()));
    // the delete veto check is not retried so each lookup is one scripted expectation
    tokio::spawn(order_actor.run(FinancialLedger::new(ledger_client, RetryPolicy::once())));
    tokio::spawn(claim_actor.run(()));

    let customer = customers
        .create_customer(CustomerCreate::named("Ana"))
        .await
        .unwrap();
    let wash = services
        .create_service(ServiceCreate {
            name: "Wash&Fold".into(),
            unit_price: dec!(2500),
            unit: "kg".into(),
        })
        .await
        .unwrap();
    bom.add_entry(wash, DETERGENT, dec!(0.1)).await.unwrap();

    let orchestrator = TransactionOrchestrator::new(
        Collaborators {
            customers,
            services,
            bom,
            inventory,
            ledger,
            orders: orders.clone(),
            guard: guard.clone(),
        },
        ReceiptBook::new("LND"),
    );
    Harness {
        orchestrator,
        orders,
        guard,
        customer,
        wash,
    }
}

fn deducted(before: Decimal, used: Decimal) -> Vec<StockLevel> {
    vec![StockLevel {
        material_id: DETERGENT,
        before,
        after: before - used,
    }]
}

fn income(id: u32, order_id: OrderId, amount: Decimal) -> FinancialRecord {
    FinancialRecord {
        id: FinancialRecordId(id),
        order_id: Some(order_id),
        date: chrono::Utc::now().date_naive(),
        record_type: RecordType::Income,
        description: "Payment".into(),
        amount,
        payment_method: PaymentMethod::Cash,
    }
}

#[tokio::test(start_paused = true)]
async fn test_ledger_outage_defers_posting() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    let mut ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    inventory_mock
        .expect_batch()
        .return_ok(deducted(dec!(50), dec!(1.0)));
    inventory_mock
        .expect_forget_batch("deduct:order_1")
        .return_ok(true);
    for _ in 0..3 {
        ledger_mock
            .expect_create_if_absent()
            .return_err(FrameworkError::ActorClosed);
    }

    let created = h
        .orchestrator
        .create_order(
            &RequestContext::generated(),
            NewOrder::new(h.customer, h.wash, 10).settled(PaymentMethod::Cash),
        )
        .await
        .unwrap();
    let order_id = created.order.order.id;

    assert!(matches!(created.posting, PostingStatus::Deferred(_)));
    assert!(created.order.order.inventory_committed);
    let pending = h.orchestrator.pending_postings();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].order_id, order_id);

    // the ledger comes back
    ledger_mock
        .expect_create_if_absent()
        .return_ok(Insertion::Created(income(1, order_id, dec!(25000))));
    let report = h.orchestrator.retry_pending_postings().await.unwrap();

    assert_eq!(report.posted, vec![order_id]);
    assert!(report.still_pending.is_empty());
    assert!(h.orchestrator.pending_postings().is_empty());

    inventory_mock.verify();
    ledger_mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_deferred_posting_keeps_order_from_deletion() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    let mut ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    inventory_mock
        .expect_batch()
        .return_ok(deducted(dec!(50), dec!(0.4)));
    inventory_mock
        .expect_forget_batch("deduct:order_1")
        .return_ok(true);
    for _ in 0..3 {
        ledger_mock
            .expect_create_if_absent()
            .return_err(FrameworkError::ActorClosed);
    }

    let created = h
        .orchestrator
        .create_order(
            &RequestContext::generated(),
            NewOrder::new(h.customer, h.wash, 4).settled(PaymentMethod::Transfer),
        )
        .await
        .unwrap();
    let order_id = created.order.order.id;
    assert!(matches!(created.posting, PostingStatus::Deferred(_)));

    // the ledger has no record yet, but the order owes one
    let err = h.orchestrator.delete_order(order_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(h.orders.find(order_id).await.unwrap().is_some());
    let pending = h.orchestrator.pending_postings();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].order_id, order_id);

    inventory_mock.verify();
    ledger_mock.verify();
}

#[tokio::test]
async fn test_shortage_rolls_back_settled_request() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    let mut ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    inventory_mock
        .expect_batch()
        .return_err(FrameworkError::entity(InventoryError::InsufficientStock {
            material_id: DETERGENT,
            requested: dec!(6.0),
            available: dec!(5),
        }));
    // the row is still unpaid, so the rollback goes through the ledger check
    ledger_mock.expect_query().return_ok(vec![]);

    let err = h
        .orchestrator
        .create_order(
            &RequestContext::generated(),
            NewOrder::new(h.customer, h.wash, 60).settled(PaymentMethod::Cash),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(h.orders.find(OrderId(1)).await.unwrap(), None);
    assert!(h.orchestrator.pending_postings().is_empty());
    inventory_mock.verify();
    ledger_mock.verify();
}

#[tokio::test]
async fn test_forget_failure_does_not_fail_the_order() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    let ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    inventory_mock
        .expect_batch()
        .return_ok(deducted(dec!(50), dec!(0.2)));
    inventory_mock
        .expect_forget_batch("deduct:order_1")
        .return_err(FrameworkError::entity(InventoryError::InvalidAmount(dec!(0))));

    let created = h
        .orchestrator
        .create_order(&RequestContext::generated(), NewOrder::new(h.customer, h.wash, 2))
        .await
        .unwrap();

    assert!(created.order.order.inventory_committed);
    assert_eq!(created.stock, deducted(dec!(50), dec!(0.2)));
    inventory_mock.verify();
    ledger_mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_transient_inventory_failure_is_retried() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    let ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    inventory_mock
        .expect_batch()
        .return_err(FrameworkError::ActorClosed);
    inventory_mock
        .expect_batch()
        .return_ok(deducted(dec!(50), dec!(0.3)));
    inventory_mock
        .expect_forget_batch("deduct:order_1")
        .return_ok(true);

    let created = h
        .orchestrator
        .create_order(&RequestContext::generated(), NewOrder::new(h.customer, h.wash, 3))
        .await
        .unwrap();

    assert_eq!(created.stock, deducted(dec!(50), dec!(0.3)));
    assert_eq!(created.posting, PostingStatus::NotRequired);
    inventory_mock.verify();
    ledger_mock.verify();
}

#[tokio::test]
async fn test_shortage_rolls_back_order() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    let mut ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    inventory_mock
        .expect_batch()
        .return_err(FrameworkError::entity(InventoryError::InsufficientStock {
            material_id: DETERGENT,
            requested: dec!(6.0),
            available: dec!(5),
        }));
    // compensation: the order actor checks the ledger before deleting
    ledger_mock.expect_query().return_ok(vec![]);

    let err = h
        .orchestrator
        .create_order(&RequestContext::new("req-a"), NewOrder::new(h.customer, h.wash, 60))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FulfillmentError::InsufficientStock { material_id: DETERGENT, requested, available }
            if requested == dec!(6.0) && available == dec!(5)
    ));
    assert_eq!(h.orders.find(OrderId(1)).await.unwrap(), None);
    assert!(h
        .orchestrator
        .orders_for_customer(h.customer)
        .await
        .unwrap()
        .is_empty());
    inventory_mock.verify();
    ledger_mock.verify();
}

#[tokio::test]
async fn test_failed_rollback_is_reported() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    let mut ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    inventory_mock
        .expect_batch()
        .return_err(FrameworkError::entity(InventoryError::InsufficientStock {
            material_id: DETERGENT,
            requested: dec!(6.0),
            available: dec!(5),
        }));
    // the delete veto check cannot reach the ledger, so the order stays
    ledger_mock
        .expect_query()
        .return_err(FrameworkError::ActorClosed);

    let err = h
        .orchestrator
        .create_order(&RequestContext::generated(), NewOrder::new(h.customer, h.wash, 60))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Compensation);
    let FulfillmentError::Compensation { cause, failures } = err else {
        unreachable!();
    };
    assert_eq!(cause.kind(), ErrorKind::InsufficientStock);
    assert_eq!(failures.len(), 1);
    assert!(h.orders.find(OrderId(1)).await.unwrap().is_some());
    inventory_mock.verify();
    ledger_mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_unknown_deduction_outcome_resumes_with_same_token() {
    let mut inventory_mock = MockClient::<InventoryItem>::new();
    let ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    for _ in 0..3 {
        inventory_mock.expect_batch().never_reply();
    }
    let err = h
        .orchestrator
        .create_order(&RequestContext::new("req-lost"), NewOrder::new(h.customer, h.wash, 10))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
    assert!(err.outcome_unknown());
    // no compensation: the deduction may have landed
    let kept = h.orders.find(OrderId(1)).await.unwrap().unwrap();
    assert!(!kept.inventory_committed);

    // the keyed batch replays its first result, then its record is dropped
    inventory_mock
        .expect_batch()
        .return_ok(deducted(dec!(50), dec!(1.0)));
    inventory_mock
        .expect_forget_batch("deduct:order_1")
        .return_ok(true);
    let resumed = h
        .orchestrator
        .create_order(&RequestContext::new("req-lost"), NewOrder::new(h.customer, h.wash, 10))
        .await
        .unwrap();

    assert!(!resumed.replayed);
    assert_eq!(resumed.order.order.id, OrderId(1));
    assert!(resumed.order.order.inventory_committed);
    assert_eq!(resumed.stock, deducted(dec!(50), dec!(1.0)));
    inventory_mock.verify();
    ledger_mock.verify();
}

#[tokio::test]
async fn test_held_token_reports_in_progress() {
    let inventory_mock = MockClient::<InventoryItem>::new();
    let ledger_mock = MockClient::<FinancialRecord>::new();
    let h = harness(inventory_mock.client(), ledger_mock.client()).await;

    // another execution holds the token
    h.guard
        .begin(&RequestContext::new("req-busy"), Operation::CreateOrder)
        .await
        .unwrap();

    let err = h
        .orchestrator
        .create_order(&RequestContext::new("req-busy"), NewOrder::new(h.customer, h.wash, 1))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InProgress);
    assert_eq!(h.orders.find(OrderId(1)).await.unwrap(), None);
    inventory_mock.verify();
    ledger_mock.verify();
}
