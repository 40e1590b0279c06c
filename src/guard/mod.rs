//! # Consistency Guard
//!
//! Makes the multi-step order operations safe to retry and to run concurrently:
//!
//! - [`ConsistencyGuard`] admits at most one execution per (operation, idempotency token)
//!   through a claim row, and remembers which order a finished creation produced.
//! - [`RetryPolicy`] wraps every remote call in bounded, capped exponential backoff.
//! - [`RequestContext`] carries the token through the call.

mod context;
mod retry;

pub use context::*;
pub use retry::*;

use crate::error::recover;
use crate::guard_actor::{ClaimAction, GuardError};
use crate::model::{Claim, ClaimCreate, ClaimId, ClaimState, Operation, OrderId};
use actor_framework::{ActorClient, FrameworkError, Insertion, ResourceClient};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument, warn};

/// What the guard decided for an incoming request.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// Run the operation. The claim is held by this request.
    Fresh(Claim),
    /// The operation already completed for this token and produced this order.
    Replay(OrderId),
}

/// Idempotency claims in front of the orchestrator.
#[derive(Clone)]
pub struct ConsistencyGuard {
    inner: ResourceClient<Claim>,
    best_effort: ResourceClient<Claim>,
    retry: RetryPolicy,
    ttl: Duration,
}

#[async_trait]
impl ActorClient<Claim> for ConsistencyGuard {
    type Error = GuardError;

    fn inner(&self) -> &ResourceClient<Claim> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover("claims")(e)
    }
}

impl ConsistencyGuard {
    /// `best_effort_timeout` bounds the completion and release calls, which never fail the request.
    pub fn new(
        inner: ResourceClient<Claim>,
        retry: RetryPolicy,
        claim_ttl: StdDuration,
        best_effort_timeout: StdDuration,
    ) -> Self {
        Self {
            best_effort: inner.with_timeout(best_effort_timeout),
            inner,
            retry,
            ttl: Duration::from_std(claim_ttl).unwrap_or_else(|_| Duration::days(365)),
        }
    }

    /// Claims `operation` for the request's token.
    ///
    /// # Errors
    /// [`GuardError::Held`] while another execution holds a claim younger than the TTL.
    #[instrument(skip_all, fields(key = %ctx.key, %operation))]
    pub async fn begin(&self, ctx: &RequestContext, operation: Operation) -> Result<Admission, GuardError> {
        let create = ClaimCreate {
            key: ctx.key.clone(),
            operation,
            holder: ctx.holder,
            claimed_at: ctx.received_at,
        };
        let claim = match self.retry.retry("claim", || self.claim(create.clone())).await? {
            Insertion::Created(claim) => {
                debug!(claim_id = %claim.id, "Claim taken");
                return Ok(Admission::Fresh(claim));
            }
            Insertion::Existing(claim) => claim,
        };

        if let ClaimState::Completed(order_id) = claim.state {
            info!(%order_id, "Replaying completed request");
            return Ok(Admission::Replay(order_id));
        }
        if claim.holder == ctx.holder {
            return Ok(Admission::Fresh(claim));
        }

        let take_over = ClaimAction::TakeOver {
            holder: ctx.holder,
            now: Utc::now(),
            ttl: self.ttl,
        };
        let claim = self
            .retry
            .retry("claim", || self.act(claim.id, take_over.clone()))
            .await?;
        match claim.state {
            ClaimState::Completed(order_id) => Ok(Admission::Replay(order_id)),
            ClaimState::InFlight => {
                warn!(claim_id = %claim.id, "Took over stale claim");
                Ok(Admission::Fresh(claim))
            }
        }
    }

    /// Records the order the claimed operation produced. Best effort: a claim left in flight
    /// only delays a replay until it goes stale.
    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    pub async fn complete(&self, claim: &Claim, order_id: OrderId) {
        let action = ClaimAction::Complete {
            holder: claim.holder,
            order_id,
        };
        if let Err(e) = self.best_effort.perform_action(claim.id, action).await {
            warn!(error = %e, "Failed to complete claim");
        }
    }

    /// Drops the claim so the same token can be retried. Best effort.
    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    pub async fn release(&self, claim: &Claim) {
        match self.best_effort.delete(claim.id).await {
            Ok(()) | Err(FrameworkError::NotFound(_)) => debug!("Claim released"),
            Err(e) => warn!(error = %e, "Failed to release claim"),
        }
    }

    async fn claim(&self, create: ClaimCreate) -> Result<Insertion<Claim>, GuardError> {
        self.inner
            .create_if_absent(create)
            .await
            .map_err(Self::map_error)
    }

    async fn act(&self, id: ClaimId, action: ClaimAction) -> Result<Claim, GuardError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_framework::ResourceActor;

    fn guard(ttl: StdDuration) -> ConsistencyGuard {
        let (actor, client) = ResourceActor::<Claim>::new(8);
        tokio::spawn(actor.run(()));
        ConsistencyGuard::new(client, RetryPolicy::once(), ttl, StdDuration::from_secs(5))
    }

    #[tokio::test]
    async fn test_second_holder_is_refused_until_completion() {
        let guard = guard(StdDuration::from_secs(30));
        let first = RequestContext::new("req-1");
        let second = RequestContext::new("req-1");

        let Admission::Fresh(claim) = guard.begin(&first, Operation::CreateOrder).await.unwrap() else {
            panic!("expected a fresh claim");
        };
        assert!(matches!(
            guard.begin(&second, Operation::CreateOrder).await,
            Err(GuardError::Held(_))
        ));

        guard.complete(&claim, OrderId(9)).await;
        assert_eq!(
            guard.begin(&second, Operation::CreateOrder).await.unwrap(),
            Admission::Replay(OrderId(9))
        );
    }

    #[tokio::test]
    async fn test_same_token_different_operation_is_independent() {
        let guard = guard(StdDuration::from_secs(30));
        let ctx = RequestContext::new("req-1");
        guard.begin(&ctx, Operation::CreateOrder).await.unwrap();
        let other = RequestContext::new("req-1");
        assert!(matches!(
            guard.begin(&other, Operation::UpdateOrder(OrderId(1))).await,
            Ok(Admission::Fresh(_))
        ));
    }

    #[tokio::test]
    async fn test_release_frees_the_token() {
        let guard = guard(StdDuration::from_secs(30));
        let first = RequestContext::new("req-1");
        let Admission::Fresh(claim) = guard.begin(&first, Operation::CreateOrder).await.unwrap() else {
            panic!("expected a fresh claim");
        };
        guard.release(&claim).await;
        guard.release(&claim).await;

        let retry = RequestContext::new("req-1");
        assert!(matches!(
            guard.begin(&retry, Operation::CreateOrder).await,
            Ok(Admission::Fresh(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_claim_is_taken_over() {
        let guard = guard(StdDuration::ZERO);
        let crashed = RequestContext::new("req-1");
        guard.begin(&crashed, Operation::CreateOrder).await.unwrap();

        let retry = RequestContext::new("req-1");
        let Admission::Fresh(claim) = guard.begin(&retry, Operation::CreateOrder).await.unwrap() else {
            panic!("expected a fresh claim");
        };
        assert_eq!(claim.holder, retry.holder);
    }
}
