//! Error types for the claim actor.

use crate::error::StoreError;
use crate::model::IdempotencyKey;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GuardError {
    /// Another execution is running the operation for this token.
    #[error("{0} is held by another request")]
    Held(IdempotencyKey),

    #[error("{0} is no longer held by this request")]
    WrongHolder(IdempotencyKey),

    #[error(transparent)]
    Store(#[from] StoreError),
}
