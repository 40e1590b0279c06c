//! # Generic Messages
//!
//! This module defines the generic message types used for communication between
//! the `ResourceClient` and `ResourceActor`.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use std::fmt;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Predicate evaluated inside the actor for `Query` scans.
pub struct Filter<T>(Box<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Filter<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(predicate))
    }

    /// Matches every entity.
    pub fn all() -> Self {
        Self::new(|_| true)
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.0)(item)
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// Result of an insert-if-absent: either the new entity or the one already
/// holding the unique key.
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion<T> {
    Created(T),
    Existing(T),
}

impl<T> Insertion<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Self::Created(item) | Self::Existing(item) => item,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Created(item) | Self::Existing(item) => item,
        }
    }
}

/// Internal message type sent to the actor to request operations.
///
/// # Resource-Oriented Architecture
/// Each actor manages one record set (the [`ActorEntity`]). Instead of ad-hoc messages
/// for every operation, requests are standardized around the lifecycle of a stored row.
///
/// - **Create**: Insert. Fails with `UniqueViolation` if the entity's unique key is taken.
/// - **CreateIfAbsent**: Atomic check-and-insert on the unique key.
/// - **Get**: Fetch one row by ID.
/// - **Query**: Scan with a predicate; the snapshot is taken in one step.
/// - **Update**: Mutate via [`ActorEntity::Update`].
/// - **Delete**: Remove, subject to the `on_delete` veto.
/// - **Action**: Atomic read-modify-write on one row.
/// - **Batch**: Actions on many rows, applied all-or-nothing. A batch carrying a `key`
///   is applied at most once; a replay returns the recorded results.
/// - **ForgetBatch**: Drop the recorded results of a keyed batch once no replay can follow.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    CreateIfAbsent {
        params: T::Create,
        respond_to: Response<Insertion<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Query {
        filter: Filter<T>,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Batch {
        key: Option<String>,
        actions: Vec<(T::Id, T::Action)>,
        respond_to: Response<Vec<T::ActionResult>>,
    },
    ForgetBatch {
        key: String,
        /// `true` if the key was recorded.
        respond_to: Response<bool>,
    },
}
