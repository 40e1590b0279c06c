//! # Generic Client
//!
//! This module defines the generic client for communicating with actors.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Filter, Insertion, ResourceRequest, Response};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout_at, Instant};

/// ## ResourceClient
///
/// The `ResourceClient<T>` provides a type‑safe, async API for interacting with a `ResourceActor<T>`.
/// It forwards requests over a Tokio mpsc channel and returns results via oneshot channels.
/// The client is cheap to clone and can be shared across tasks.
///
/// # Deadlines
/// A client built with [`ResourceClient::with_timeout`] bounds every call. One deadline covers
/// both the send and the reply, and the resulting [`FrameworkError::Timeout`] records whether
/// the request had been delivered, because a delivered write may still take effect.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    timeout: Option<Duration>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            timeout: self.timeout,
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self {
            sender,
            timeout: None,
        }
    }

    /// Returns a copy of this client whose calls fail after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            sender: self.sender.clone(),
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        let request = make(respond_to);

        let Some(limit) = self.timeout else {
            self.sender
                .send(request)
                .await
                .map_err(|_| FrameworkError::ActorClosed)?;
            return response.await.map_err(|_| FrameworkError::ActorDropped)?;
        };

        let deadline = Instant::now() + limit;
        timeout_at(deadline, self.sender.send(request))
            .await
            .map_err(|_| FrameworkError::Timeout { delivered: false })?
            .map_err(|_| FrameworkError::ActorClosed)?;
        timeout_at(deadline, response)
            .await
            .map_err(|_| FrameworkError::Timeout { delivered: true })?
            .map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    /// Inserts unless an entity with the same unique key exists, in which case that
    /// entity is returned untouched.
    pub async fn create_if_absent(&self, params: T::Create) -> Result<Insertion<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::CreateIfAbsent { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn query(&self, filter: Filter<T>) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Query { filter, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }

    /// Applies `actions` all-or-nothing. With a `key`, a repeated call returns the
    /// first call's results instead of applying again.
    pub async fn batch(
        &self,
        key: Option<String>,
        actions: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Batch {
            key,
            actions,
            respond_to,
        })
        .await
    }

    /// Drops the recorded results of the keyed batch `key`. A later batch with the same key
    /// is applied again, so only call this once no retry can resend it.
    ///
    /// Returns `false` if nothing was recorded under `key`.
    pub async fn forget_batch(&self, key: impl Into<String>) -> Result<bool, FrameworkError> {
        let key = key.into();
        self.request(|respond_to| ResourceRequest::ForgetBatch { key, respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Unsupported;
    use async_trait::async_trait;

    #[derive(Clone, Debug)]
    struct Ping {
        id: u32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("ping error")]
    struct PingError;

    #[async_trait]
    impl ActorEntity for Ping {
        type Id = u32;
        type Create = ();
        type Update = Unsupported;
        type Action = Unsupported;
        type ActionResult = ();
        type Context = ();
        type Error = PingError;

        fn from_create_params(id: u32, _: ()) -> Result<Self, Self::Error> {
            Ok(Self { id })
        }
        async fn on_update(&mut self, u: Unsupported, _: &()) -> Result<(), Self::Error> {
            match u {}
        }
        async fn handle_action(&mut self, a: Unsupported, _: &()) -> Result<(), Self::Error> {
            match a {}
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_delivery_is_uncertain() {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<Ping>>(1);
        let client = ResourceClient::new(sender).with_timeout(Duration::from_secs(10));

        // Receive but never answer.
        let hold = tokio::spawn(async move {
            let request = receiver.recv().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(request);
        });

        let err = client.get(1).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Timeout { delivered: true }));
        assert!(err.outcome_unknown());
        hold.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_before_delivery_is_not_applied() {
        let (sender, _receiver) = mpsc::channel::<ResourceRequest<Ping>>(1);
        let client = ResourceClient::new(sender).with_timeout(Duration::from_millis(500));

        // Fill the single slot so the next send blocks.
        let (respond_to, _response) = oneshot::channel();
        client
            .sender
            .send(ResourceRequest::Get { id: 7, respond_to })
            .await
            .unwrap();

        let err = client.create(()).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Timeout { delivered: false }));
        assert!(!err.outcome_unknown());
    }

    #[tokio::test]
    async fn test_closed_actor() {
        let (sender, receiver) = mpsc::channel::<ResourceRequest<Ping>>(1);
        drop(receiver);
        let client = ResourceClient::new(sender);
        let err = client.get(1).await.unwrap_err();
        assert!(matches!(err, FrameworkError::ActorClosed));
    }

    #[tokio::test]
    async fn test_dropped_reply() {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<Ping>>(1);
        tokio::spawn(async move {
            // Drop every request without answering.
            while let Some(request) = receiver.recv().await {
                drop(request);
            }
        });
        let client = ResourceClient::new(sender);
        let err = client.get(1).await.unwrap_err();
        assert!(matches!(err, FrameworkError::ActorDropped));
        assert!(err.outcome_unknown());
    }
}
