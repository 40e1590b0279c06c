//! Request-scoped context passed through one orchestrator call.

use crate::model::IdempotencyKey;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifies one execution of one logical request.
///
/// `key` is shared by every retry of the same request; `holder` is unique to this execution
/// and decides who owns the idempotency claim.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub key: IdempotencyKey,
    pub holder: Uuid,
    /// Staff member or system acting, for logs only.
    pub actor: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(key: impl Into<IdempotencyKey>) -> Self {
        Self {
            key: key.into(),
            holder: Uuid::new_v4(),
            actor: None,
            received_at: Utc::now(),
        }
    }

    /// Context with a freshly generated token, for callers that never retry.
    pub fn generated() -> Self {
        Self::new(IdempotencyKey::generate())
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_share_key_not_holder() {
        let first = RequestContext::new("req-42");
        let retry = RequestContext::new("req-42").with_actor("front-desk");
        assert_eq!(first.key, retry.key);
        assert_ne!(first.holder, retry.holder);
        assert_eq!(retry.actor.as_deref(), Some("front-desk"));
        assert_ne!(RequestContext::generated().key, RequestContext::generated().key);
    }
}
