//! Claim transitions.

use crate::model::OrderId;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum ClaimAction {
    /// Marks the claim done. Only the current holder may complete it.
    Complete { holder: Uuid, order_id: OrderId },
    /// Hands an in-flight claim to `holder` if its current holder has been silent for `ttl`.
    /// A completed claim is returned unchanged.
    TakeOver {
        holder: Uuid,
        now: DateTime<Utc>,
        ttl: Duration,
    },
}
