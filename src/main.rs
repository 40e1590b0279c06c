//! Demo run: a counter order that runs short on detergent, a successful order paid later, and a
//! service without materials.
//!
//! Reads `laundry.toml` from the working directory when present; `[log] format = "json"`
//! switches to JSON lines.

use anyhow::{bail, Context, Result};
use laundry_fulfillment::config::FulfillmentConfig;
use laundry_fulfillment::error::ErrorKind;
use laundry_fulfillment::guard::RequestContext;
use laundry_fulfillment::lifecycle::{init_tracing, FulfillmentSystem};
use laundry_fulfillment::model::{
    CustomerCreate, InventoryItemCreate, NewOrder, PaymentStatus, ServiceCreate,
};
use laundry_fulfillment::orchestrator::PostingStatus;
use rust_decimal_macros::dec;
use std::path::Path;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    let config = if Path::new("laundry.toml").exists() {
        FulfillmentConfig::from_file("laundry.toml").context("loading laundry.toml")?
    } else {
        FulfillmentConfig::default()
    };
    init_tracing(config.log.format);
    let system = FulfillmentSystem::new(&config);

    let customer = system
        .customers
        .create_customer(CustomerCreate::named("Ana"))
        .await?;
    let wash = system
        .services
        .create_service(ServiceCreate {
            name: "Wash&Fold".into(),
            unit_price: dec!(2500),
            unit: "kg".into(),
        })
        .await?;
    let pressing = system
        .services
        .create_service(ServiceCreate {
            name: "Pressing".into(),
            unit_price: dec!(4000),
            unit: "pcs".into(),
        })
        .await?;
    let detergent = system
        .inventory
        .create_item(InventoryItemCreate {
            name: "Detergent".into(),
            initial_stock: dec!(5),
            unit: "kg".into(),
        })
        .await?;
    system.bom.add_entry(wash, detergent, dec!(0.1)).await?;

    // A: 60 kg needs 6.0 kg of detergent, only 5 in stock
    let span = tracing::info_span!("scenario_a");
    let result = async {
        system
            .orchestrator
            .create_order(&RequestContext::generated(), NewOrder::new(customer, wash, 60))
            .await
    }
    .instrument(span)
    .await;
    match result {
        Err(e) if e.kind() == ErrorKind::InsufficientStock => info!(error = %e, "Rejected as expected"),
        other => bail!("expected insufficient stock, got {other:?}"),
    }
    info!(stock = %system.inventory.stock(detergent).await?, "Detergent after A");

    // B: restock and take an unpaid order
    system.inventory.restock(detergent, dec!(45)).await?;
    let ctx = RequestContext::generated().with_actor("front-desk");
    let created = system
        .orchestrator
        .create_order(&ctx, NewOrder::new(customer, wash, 10))
        .instrument(tracing::info_span!("scenario_b"))
        .await?;
    let order_id = created.order.order.id;
    info!(
        %order_id,
        receipt_no = %created.order.order.receipt_no,
        stock = %system.inventory.stock(detergent).await?,
        "Order B created"
    );

    // C: settle twice, one ledger record
    for attempt in 1..=2 {
        let updated = system
            .orchestrator
            .update_payment_status(&RequestContext::generated(), order_id, PaymentStatus::Settled)
            .instrument(tracing::info_span!("scenario_c", attempt))
            .await?;
        match updated.posting {
            PostingStatus::Posted(record) => info!(record_id = %record.id, amount = %record.amount, "Income posted"),
            PostingStatus::AlreadyPosted(record) => info!(record_id = %record.id, "Already posted"),
            other => bail!("unexpected posting {other:?}"),
        }
    }

    // D: no materials consumed
    let pressed = system
        .orchestrator
        .create_order(&RequestContext::generated(), NewOrder::new(customer, pressing, 3))
        .instrument(tracing::info_span!("scenario_d"))
        .await?;
    info!(order_id = %pressed.order.order.id, materials = pressed.stock.len(), "Order D created");

    let low = system
        .inventory
        .low_stock(config.inventory.low_stock_threshold)
        .await?;
    info!(items = low.len(), "Low stock report");

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
