//! Idempotency tokens and the claims that guard them.

use crate::model::OrderId;
use actor_framework::entity_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Caller-supplied or generated token identifying one logical request across retries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IdempotencyKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for IdempotencyKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The guarded operation. The same token may be used once per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    CreateOrder,
    UpdateOrder(OrderId),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateOrder => f.write_str("create"),
            Self::UpdateOrder(id) => write!(f, "update:{id}"),
        }
    }
}

entity_id!(#[derive(Serialize, Deserialize)] pub Claim => "claim");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimState {
    InFlight,
    Completed(OrderId),
}

/// Exclusive right of one request execution (`holder`) to run an operation for a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub key: IdempotencyKey,
    pub operation: Operation,
    pub holder: Uuid,
    pub claimed_at: DateTime<Utc>,
    pub state: ClaimState,
}

#[derive(Debug, Clone)]
pub struct ClaimCreate {
    pub key: IdempotencyKey,
    pub operation: Operation,
    pub holder: Uuid,
    pub claimed_at: DateTime<Utc>,
}
