//! # Framework Errors
//!
//! Every call through a [`ResourceClient`](crate::ResourceClient) fails with a
//! [`FrameworkError`]. The variants separate *transport* failures (the request
//! may or may not have reached the actor) from *store* failures (the actor
//! answered and refused).

use std::error::Error;

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    /// The request could not be delivered; the actor never saw it.
    #[error("Actor closed")]
    ActorClosed,

    /// The request was delivered but the reply channel was dropped.
    #[error("Actor dropped response channel")]
    ActorDropped,

    /// The per-call deadline elapsed.
    ///
    /// `delivered` tells whether the request had already been handed to the
    /// actor when the deadline fired. A delivered request may still be applied.
    #[error("Request timed out (delivered: {delivered})")]
    Timeout { delivered: bool },

    #[error("Item not found: {0}")]
    NotFound(String),

    /// Another entity already owns this unique key.
    #[error("Unique key already taken: {0}")]
    UniqueViolation(String),

    #[error("Entity error: {0}")]
    EntityError(Box<dyn Error + Send + Sync>),
}

impl FrameworkError {
    /// Wraps an entity hook error.
    pub fn entity<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::EntityError(Box::new(error))
    }

    /// `true` for failures of the channel rather than refusals by the store.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ActorClosed | Self::ActorDropped | Self::Timeout { .. }
        )
    }

    /// `true` when the request reached the actor but no answer came back,
    /// so a write may have been applied.
    pub fn outcome_unknown(&self) -> bool {
        matches!(self, Self::ActorDropped | Self::Timeout { delivered: true })
    }

    /// Borrows the typed entity error, if this is one of type `E`.
    pub fn entity_error<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::EntityError(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("out of widgets")]
    struct OutOfWidgets;

    #[test]
    fn test_transport_classification() {
        assert!(FrameworkError::ActorClosed.is_transient());
        assert!(!FrameworkError::ActorClosed.outcome_unknown());
        assert!(FrameworkError::ActorDropped.outcome_unknown());
        assert!(!FrameworkError::Timeout { delivered: false }.outcome_unknown());
        assert!(FrameworkError::Timeout { delivered: true }.outcome_unknown());
        assert!(!FrameworkError::NotFound("x".into()).is_transient());
    }

    #[test]
    fn test_entity_error_downcast() {
        let err = FrameworkError::entity(OutOfWidgets);
        assert_eq!(err.entity_error::<OutOfWidgets>(), Some(&OutOfWidgets));
        assert!(err.entity_error::<std::io::Error>().is_none());
        assert!(!err.is_transient());
    }
}
