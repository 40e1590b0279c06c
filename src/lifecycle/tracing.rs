//! # Tracing Setup
//!
//! Every client call runs in an `#[instrument]` span and logs with structured fields
//! (`order_id`, `material_id`, `attempt`, `delay_ms`), so one order can be followed across
//! actors:
//!
//! ```text
//! INFO create_order: Order persisted key=req-1 order_id=order_1 total=25000
//! INFO create_order:batch_apply: Stock batch applied key=req-1 lines=1
//! WARN create_order:post_income_if_absent: Remote call failed, retrying operation="post_income" attempt=1 delay_ms=100
//! ```
//!
//! ```bash
//! RUST_LOG=info cargo run                          # compact
//! RUST_LOG=laundry_fulfillment=debug cargo run     # full payloads
//! ```

use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Installs the subscriber selected by `[log] format`.
pub fn init_tracing(format: LogFormat) {
    match format {
        LogFormat::Compact => setup_tracing(),
        LogFormat::Json => setup_json_tracing(),
    }
}

/// Compact logs for local runs.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// JSON lines for log shippers. Defaults to `info` when `RUST_LOG` is unset.
pub fn setup_json_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .json()
        .with_current_span(true)
        .init();
}
