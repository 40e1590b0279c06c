//! [`ActorEntity`] implementation for [`Claim`].

use super::actions::ClaimAction;
use super::error::GuardError;
use crate::model::{Claim, ClaimCreate, ClaimId, ClaimState};
use actor_framework::{ActorEntity, Unsupported};
use async_trait::async_trait;

#[async_trait]
impl ActorEntity for Claim {
    type Id = ClaimId;
    type Create = ClaimCreate;
    type Update = Unsupported;
    type Action = ClaimAction;
    type ActionResult = Claim;
    type Context = ();
    type Error = GuardError;

    fn from_create_params(id: ClaimId, params: ClaimCreate) -> Result<Self, GuardError> {
        Ok(Self {
            id,
            key: params.key,
            operation: params.operation,
            holder: params.holder,
            claimed_at: params.claimed_at,
            state: ClaimState::InFlight,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.operation, self.key))
    }

    async fn on_update(&mut self, update: Unsupported, _ctx: &()) -> Result<(), GuardError> {
        match update {}
    }

    async fn handle_action(&mut self, action: ClaimAction, _ctx: &()) -> Result<Claim, GuardError> {
        match action {
            ClaimAction::Complete { holder, order_id } => match self.state {
                ClaimState::Completed(done) if done == order_id => {}
                ClaimState::InFlight if holder == self.holder => {
                    self.state = ClaimState::Completed(order_id);
                }
                _ => return Err(GuardError::WrongHolder(self.key.clone())),
            },
            ClaimAction::TakeOver { holder, now, ttl } => {
                if self.state == ClaimState::InFlight && holder != self.holder {
                    if now - self.claimed_at < ttl {
                        return Err(GuardError::Held(self.key.clone()));
                    }
                    self.holder = holder;
                    self.claimed_at = now;
                }
            }
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IdempotencyKey, OrderId, Operation};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn claim(holder: Uuid) -> Claim {
        Claim::from_create_params(
            ClaimId(1),
            ClaimCreate {
                key: IdempotencyKey::from("req-1"),
                operation: Operation::CreateOrder,
                holder,
                claimed_at: Utc::now(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_unique_key_includes_operation() {
        let mut claim = claim(Uuid::new_v4());
        assert_eq!(claim.unique_key().as_deref(), Some("create:req-1"));
        claim.operation = Operation::UpdateOrder(OrderId(3));
        assert_eq!(claim.unique_key().as_deref(), Some("update:order_3:req-1"));
    }

    #[tokio::test]
    async fn test_only_holder_completes() {
        let holder = Uuid::new_v4();
        let mut claim = claim(holder);

        let stranger = ClaimAction::Complete {
            holder: Uuid::new_v4(),
            order_id: OrderId(1),
        };
        assert!(matches!(
            claim.handle_action(stranger, &()).await,
            Err(GuardError::WrongHolder(_))
        ));

        let done = claim
            .handle_action(ClaimAction::Complete { holder, order_id: OrderId(1) }, &())
            .await
            .unwrap();
        assert_eq!(done.state, ClaimState::Completed(OrderId(1)));

        // repeat is a no-op
        claim
            .handle_action(ClaimAction::Complete { holder, order_id: OrderId(1) }, &())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_take_over_requires_stale_claim() {
        let mut claim = claim(Uuid::new_v4());
        let newcomer = Uuid::new_v4();

        let fresh = ClaimAction::TakeOver {
            holder: newcomer,
            now: claim.claimed_at + Duration::seconds(1),
            ttl: Duration::seconds(30),
        };
        assert!(matches!(
            claim.handle_action(fresh, &()).await,
            Err(GuardError::Held(_))
        ));

        let stale = ClaimAction::TakeOver {
            holder: newcomer,
            now: claim.claimed_at + Duration::seconds(31),
            ttl: Duration::seconds(30),
        };
        let taken = claim.handle_action(stale, &()).await.unwrap();
        assert_eq!(taken.holder, newcomer);
        assert_eq!(taken.state, ClaimState::InFlight);
    }
}
