//! # Error Taxonomy
//!
//! Errors are classified once, at the boundary of the store call, and never by matching on
//! message text.
//!
//! - [`StoreError`] is what any record set can fail with: unavailable (with an [`Outcome`]),
//!   not found, unique-key conflict, or a rejection the caller did not expect.
//! - Each actor has its own `thiserror` enum (e.g. [`InventoryError`]) that wraps `StoreError`
//!   next to its domain failures. [`recover`] turns a [`FrameworkError`] back into that enum,
//!   recovering the typed entity error by downcast.
//! - [`FulfillmentError`] is the closed set the orchestrator returns; [`FulfillmentError::kind`]
//!   gives callers a stable [`ErrorKind`] to branch on.

use crate::bom_actor::BomError;
use crate::financial_actor::LedgerError;
use crate::guard_actor::GuardError;
use crate::inventory_actor::InventoryError;
use crate::model::{IdempotencyKey, MaterialId};
use crate::order_actor::OrderError;
use actor_framework::FrameworkError;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Whether a failed write may nevertheless have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request never reached the store.
    NotApplied,
    /// The request reached the store but no answer came back.
    Unknown,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplied => f.write_str("not applied"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Failures common to every record set.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("{resource} store unavailable (outcome {outcome})")]
    Unavailable {
        resource: &'static str,
        outcome: Outcome,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("unique key already taken: {0}")]
    Conflict(String),

    #[error("{resource} store rejected the request: {reason}")]
    Rejected {
        resource: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub fn from_framework(resource: &'static str, err: FrameworkError) -> Self {
        if err.is_transient() {
            let outcome = if err.outcome_unknown() {
                Outcome::Unknown
            } else {
                Outcome::NotApplied
            };
            return Self::Unavailable { resource, outcome };
        }
        match err {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            FrameworkError::UniqueViolation(key) => Self::Conflict(key),
            other => Self::Rejected {
                resource,
                reason: other.to_string(),
            },
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Unavailable { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }

    /// Marks an unavailability as outcome-unknown.
    pub fn into_uncertain(self) -> Self {
        match self {
            Self::Unavailable { resource, .. } => Self::Unavailable {
                resource,
                outcome: Outcome::Unknown,
            },
            other => other,
        }
    }
}

/// Returns a mapper from [`FrameworkError`] to the actor error `E`.
///
/// Entity errors of type `E` come back as themselves; everything else is classified into a
/// [`StoreError`].
pub fn recover<E>(resource: &'static str) -> impl Fn(FrameworkError) -> E
where
    E: std::error::Error + Clone + From<StoreError> + 'static,
{
    move |err| {
        if let Some(entity) = err.entity_error::<E>() {
            return entity.clone();
        }
        E::from(StoreError::from_framework(resource, err))
    }
}

/// Errors the retry policy knows how to inspect.
pub trait Retryable: Sized {
    fn store_error(&self) -> Option<&StoreError>;

    /// Same error with any unavailability marked outcome-unknown.
    fn into_uncertain(self) -> Self;

    fn is_retryable(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_transient)
    }

    fn outcome(&self) -> Option<Outcome> {
        self.store_error().and_then(StoreError::outcome)
    }
}

impl Retryable for StoreError {
    fn store_error(&self) -> Option<&StoreError> {
        Some(self)
    }

    fn into_uncertain(self) -> Self {
        StoreError::into_uncertain(self)
    }
}

/// Implements [`Retryable`] for actor errors that carry a `Store(StoreError)` variant.
macro_rules! store_backed {
    ($($error:ty),+ $(,)?) => {$(
        impl Retryable for $error {
            fn store_error(&self) -> Option<&StoreError> {
                match self {
                    Self::Store(e) => Some(e),
                    _ => None,
                }
            }

            fn into_uncertain(self) -> Self {
                match self {
                    Self::Store(e) => Self::Store(e.into_uncertain()),
                    other => other,
                }
            }
        }
    )+};
}

store_backed!(CatalogError, BomError, InventoryError, LedgerError, OrderError, GuardError);

/// Errors of the customer and service collaborators.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Stable classification of a [`FulfillmentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    InsufficientStock,
    RemoteUnavailable,
    InconsistentState,
    NotFound,
    InProgress,
    Compensation,
}

/// Everything an orchestrator call can fail with.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// Malformed input or an illegal transition. Rejected before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient stock of {material_id}: need {requested}, have {available}")]
    InsufficientStock {
        material_id: MaterialId,
        requested: Decimal,
        available: Decimal,
    },

    /// Retries exhausted. With `Outcome::Unknown` the write may have happened; retry with the
    /// same idempotency key.
    #[error("{resource} store unavailable after retries (outcome {outcome})")]
    RemoteUnavailable {
        resource: &'static str,
        outcome: Outcome,
    },

    #[error("inconsistent state, manual reconciliation needed: {0}")]
    InconsistentState(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Another execution holds the idempotency key.
    #[error("request {0} is already in progress")]
    InProgress(IdempotencyKey),

    /// The forward step failed and at least one undo step failed too.
    #[error("{cause}; {} compensation step(s) failed", failures.len())]
    Compensation {
        cause: Box<FulfillmentError>,
        failures: Vec<String>,
    },
}

impl FulfillmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::RemoteUnavailable { .. } => ErrorKind::RemoteUnavailable,
            Self::InconsistentState(_) => ErrorKind::InconsistentState,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InProgress(_) => ErrorKind::InProgress,
            Self::Compensation { .. } => ErrorKind::Compensation,
        }
    }

    /// `true` when a write may have been applied despite the error.
    pub fn outcome_unknown(&self) -> bool {
        match self {
            Self::RemoteUnavailable { outcome, .. } => *outcome == Outcome::Unknown,
            Self::Compensation { cause, .. } => cause.outcome_unknown(),
            _ => false,
        }
    }
}

impl From<StoreError> for FulfillmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { resource, outcome } => {
                Self::RemoteUnavailable { resource, outcome }
            }
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Conflict(key) => Self::Validation(format!("duplicate key {key}")),
            StoreError::Rejected { resource, reason } => {
                error!(resource, %reason, "Unclassified store rejection");
                Self::InconsistentState(format!("{resource}: {reason}"))
            }
        }
    }
}

impl From<CatalogError> for FulfillmentError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Invalid { .. } => Self::Validation(err.to_string()),
            CatalogError::Store(e) => e.into(),
        }
    }
}

impl From<BomError> for FulfillmentError {
    fn from(err: BomError) -> Self {
        match err {
            BomError::ServiceNotFound(id) => Self::NotFound(id.to_string()),
            BomError::InvalidUsage(_) => Self::Validation(err.to_string()),
            BomError::Store(e) => e.into(),
        }
    }
}

impl From<InventoryError> for FulfillmentError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InsufficientStock {
                material_id,
                requested,
                available,
            } => Self::InsufficientStock {
                material_id,
                requested,
                available,
            },
            InventoryError::InvalidAmount(_) => Self::Validation(err.to_string()),
            InventoryError::Store(e) => e.into(),
        }
    }
}

impl From<LedgerError> for FulfillmentError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicatePosting { .. } => Self::InconsistentState(err.to_string()),
            LedgerError::NotSettled(..)
            | LedgerError::NegativeAmount(_)
            | LedgerError::LinkedToOrder { .. }
            | LedgerError::TotalsOutOfRange => Self::Validation(err.to_string()),
            LedgerError::Store(e) => e.into(),
        }
    }
}

impl From<OrderError> for FulfillmentError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Ledger(e) => e.into(),
            OrderError::Store(e) => e.into(),
            OrderError::InvalidQuantity(_)
            | OrderError::TotalOverflow { .. }
            | OrderError::IllegalTransition { .. }
            | OrderError::PaymentReversal(_)
            | OrderError::SettledDelete(_)
            | OrderError::HasLedgerRecord(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<GuardError> for FulfillmentError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Held(key) => Self::InProgress(key),
            GuardError::WrongHolder(_) => Self::InconsistentState(err.to_string()),
            GuardError::Store(e) => e.into(),
        }
    }
}
