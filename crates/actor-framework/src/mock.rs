//! # Mock Framework & Testing Guide
//!
//! The `MockClient<T>` type hands out a real `ResourceClient<T>` whose requests are answered
//! from a queue of expectations instead of a store. It lets you script return values, errors
//! and lost replies for unit tests without spawning any actors.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler |
//! | **State** | No real state (expectations) | Real state management |
//! | **Use Case** | Testing logic *around* the client | Testing the actor itself or full system |
//! | **Error Injection** | Easy (`return_err`, `never_reply`) | Hard (requires specific state) |
//!
//! ## Testing Failure Scenarios
//!
//! `MockClient` makes it easy to simulate the store failing mid-sequence:
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError, Unsupported};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Item { id: u32 }
//! #[derive(Debug, thiserror::Error)] #[error("Err")] struct ItemError;
//!
//! #[async_trait]
//! impl ActorEntity for Item {
//!     type Id = u32; type Create = (); type Update = Unsupported;
//!     type Action = Unsupported; type ActionResult = (); type Context = (); type Error = ItemError;
//!     fn from_create_params(id: u32, _: ()) -> Result<Self, Self::Error> { Ok(Self { id }) }
//!     async fn on_update(&mut self, u: Unsupported, _: &()) -> Result<(), Self::Error> { match u {} }
//!     async fn handle_action(&mut self, a: Unsupported, _: &()) -> Result<(), Self::Error> { match a {} }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Item>::new();
//!     let client = mock.client();
//!
//!     mock.expect_get(1).return_err(FrameworkError::ActorClosed);
//!     mock.expect_get(1).return_ok(Some(Item { id: 1 }));
//!
//!     assert!(matches!(client.get(1).await, Err(FrameworkError::ActorClosed)));
//!     assert!(client.get(1).await.unwrap().is_some());
//!     mock.verify();
//! }
//! ```
//!
//! ## Lost Replies
//!
//! `never_reply()` accepts the request and keeps the reply channel open without answering.
//! Combined with [`ResourceClient::with_timeout`] it produces
//! `FrameworkError::Timeout { delivered: true }`, the "write may have happened" case.
//!
//! ## Mocking Utilities
//!
//! Use [`create_mock_client`] to get a client and a raw receiver when a test wants to
//! inspect payloads, or use the fluent [`MockClient`] API.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Insertion, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// What the mock does with a matched request.
enum Reply<R> {
    Respond(Result<R, FrameworkError>),
    Hang,
}

/// One expected request and its scripted reply.
enum Expectation<T: ActorEntity> {
    Create(Reply<T::Id>),
    CreateIfAbsent(Reply<Insertion<T>>),
    Get(T::Id, Reply<Option<T>>),
    Query(Reply<Vec<T>>),
    Update(T::Id, Reply<T>),
    Delete(T::Id, Reply<()>),
    Action(T::Id, Reply<T::ActionResult>),
    Batch(Reply<Vec<T::ActionResult>>),
    ForgetBatch(String, Reply<bool>),
}

impl<T: ActorEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "Create",
            Self::CreateIfAbsent(_) => "CreateIfAbsent",
            Self::Get(..) => "Get",
            Self::Query(_) => "Query",
            Self::Update(..) => "Update",
            Self::Delete(..) => "Delete",
            Self::Action(..) => "Action",
            Self::Batch(_) => "Batch",
            Self::ForgetBatch(..) => "ForgetBatch",
        }
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// Replies are parked here when an expectation says `Hang`.
type Parked = Vec<Box<dyn std::any::Any + Send>>;

fn answer<R: Send + 'static>(
    respond_to: oneshot::Sender<Result<R, FrameworkError>>,
    reply: Reply<R>,
    parked: &mut Parked,
) {
    match reply {
        Reply::Respond(result) => {
            let _ = respond_to.send(result);
        }
        Reply::Hang => parked.push(Box::new(respond_to)),
    }
}

fn check_id<I: PartialEq + std::fmt::Debug>(kind: &str, expected: &I, actual: &I) {
    assert_eq!(expected, actual, "{kind} request for unexpected id");
}

/// A mock client with expectation tracking for fluent testing.
///
/// Expectations are consumed in order; a request that does not match the next
/// expectation panics the mock task, which the caller observes as `ActorDropped`.
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<Order>::new();
/// mock.expect_create_if_absent().return_ok(Insertion::Created(order));
/// mock.expect_delete(OrderId(1)).return_ok(());
///
/// let client = mock.client();
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        // Spawn background task to handle requests
        let handle = tokio::spawn(async move {
            let mut parked: Parked = Vec::new();
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().unwrap().pop_front();

                match (request, expectation) {
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create(reply))) => {
                        answer(respond_to, reply, &mut parked)
                    }
                    (
                        ResourceRequest::CreateIfAbsent { respond_to, .. },
                        Some(Expectation::CreateIfAbsent(reply)),
                    ) => answer(respond_to, reply, &mut parked),
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get(expected, reply))) => {
                        check_id("Get", &expected, &id);
                        answer(respond_to, reply, &mut parked)
                    }
                    (ResourceRequest::Query { respond_to, .. }, Some(Expectation::Query(reply))) => {
                        answer(respond_to, reply, &mut parked)
                    }
                    (
                        ResourceRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update(expected, reply)),
                    ) => {
                        check_id("Update", &expected, &id);
                        answer(respond_to, reply, &mut parked)
                    }
                    (
                        ResourceRequest::Delete { id, respond_to },
                        Some(Expectation::Delete(expected, reply)),
                    ) => {
                        check_id("Delete", &expected, &id);
                        answer(respond_to, reply, &mut parked)
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action(expected, reply)),
                    ) => {
                        check_id("Action", &expected, &id);
                        answer(respond_to, reply, &mut parked)
                    }
                    (ResourceRequest::Batch { respond_to, .. }, Some(Expectation::Batch(reply))) => {
                        answer(respond_to, reply, &mut parked)
                    }
                    (
                        ResourceRequest::ForgetBatch { key, respond_to },
                        Some(Expectation::ForgetBatch(expected, reply)),
                    ) => {
                        check_id("ForgetBatch", &expected, &key);
                        answer(respond_to, reply, &mut parked)
                    }
                    (request, expectation) => {
                        panic!(
                            "Unexpected request {:?}, expected {}",
                            std::mem::discriminant(&request),
                            expectation.as_ref().map_or("nothing", |e| e.name())
                        );
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn builder<R>(
        &self,
        wrap: impl FnOnce(Reply<R>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            wrap: Box::new(wrap),
        }
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(Expectation::Create)
    }

    pub fn expect_create_if_absent(&mut self) -> ExpectationBuilder<T, Insertion<T>> {
        self.builder(Expectation::CreateIfAbsent)
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |reply| Expectation::Get(id, reply))
    }

    pub fn expect_query(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(Expectation::Query)
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |reply| Expectation::Update(id, reply))
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |reply| Expectation::Delete(id, reply))
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |reply| Expectation::Action(id, reply))
    }

    pub fn expect_batch(&mut self) -> ExpectationBuilder<T, Vec<T::ActionResult>> {
        self.builder(Expectation::Batch)
    }

    pub fn expect_forget_batch(&mut self, key: impl Into<String>) -> ExpectationBuilder<T, bool> {
        let key = key.into();
        self.builder(move |reply| Expectation::ForgetBatch(key, reply))
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder returned by every `expect_*` method.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Queue<T>,
    wrap: Box<dyn FnOnce(Reply<R>) -> Expectation<T> + Send>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn push(self, reply: Reply<R>) {
        let expectation = (self.wrap)(reply);
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Reply::Respond(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.push(Reply::Respond(Err(error)));
    }

    /// Accepts the request but never answers it.
    pub fn never_reply(self) {
        self.push(Reply::Hang);
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a mock client and a receiver for asserting requests.
///
/// The test plays the actor: it pulls requests off `receiver`, inspects the payloads
/// and answers through the embedded `respond_to` channel.
///
/// **Note**: Consider using [`MockClient`] for a more fluent API.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Batch request
pub async fn expect_batch<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    Option<String>,
    Vec<(T::Id, T::Action)>,
    oneshot::Sender<Result<Vec<T::ActionResult>, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Batch {
            key,
            actions,
            respond_to,
        }) => Some((key, actions, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ActorEntity, Unsupported};
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: u32,
        code: String,
    }

    #[derive(Debug)]
    struct TicketCreate {
        code: String,
    }

    #[derive(Debug, PartialEq)]
    enum TicketAction {
        Punch,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("Ticket error")]
    struct TicketError;

    #[async_trait]
    impl ActorEntity for Ticket {
        type Id = u32;
        type Create = TicketCreate;
        type Update = Unsupported;
        type Action = TicketAction;
        type ActionResult = bool;
        type Context = ();
        type Error = TicketError;

        fn from_create_params(id: u32, params: TicketCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                code: params.code,
            })
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.code.clone())
        }

        async fn on_update(&mut self, u: Unsupported, _ctx: &()) -> Result<(), Self::Error> {
            match u {}
        }

        async fn handle_action(&mut self, _a: TicketAction, _ctx: &()) -> Result<bool, Self::Error> {
            Ok(true)
        }
    }

    fn ticket(id: u32, code: &str) -> Ticket {
        Ticket {
            id,
            code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Ticket>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(TicketCreate {
                    code: "T-1".to_string(),
                })
                .await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.code, "T-1");
        responder.send(Ok(1)).unwrap();

        let result = create_task.await.unwrap();
        assert!(matches!(result, Ok(id) if id == 1));
    }

    #[tokio::test]
    async fn test_raw_batch_helper() {
        let (client, mut receiver) = create_mock_client::<Ticket>(10);

        let task = tokio::spawn(async move {
            client
                .batch(Some("k".into()), vec![(1, TicketAction::Punch)])
                .await
        });

        let (key, actions, responder) = expect_batch(&mut receiver).await.unwrap();
        assert_eq!(key.as_deref(), Some("k"));
        assert_eq!(actions, vec![(1, TicketAction::Punch)]);
        responder.send(Ok(vec![true])).unwrap();
        assert_eq!(task.await.unwrap().unwrap(), vec![true]);
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Ticket>::new();

        mock.expect_create_if_absent()
            .return_ok(Insertion::Created(ticket(1, "T-1")));
        mock.expect_get(1).return_ok(Some(ticket(1, "T-1")));
        mock.expect_action(1).return_ok(true);
        mock.expect_delete(1).return_err(FrameworkError::NotFound("1".into()));

        let client = mock.client();

        let created = client
            .create_if_absent(TicketCreate {
                code: "T-1".to_string(),
            })
            .await
            .unwrap();
        assert!(created.is_created());

        let fetched = client.get(1).await.unwrap();
        assert_eq!(fetched.unwrap().code, "T-1");
        assert!(client.perform_action(1, TicketAction::Punch).await.unwrap());
        assert!(matches!(
            client.delete(1).await,
            Err(FrameworkError::NotFound(_))
        ));

        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_reply_times_out_as_delivered() {
        let mut mock = MockClient::<Ticket>::new();
        mock.expect_batch().never_reply();

        let client = mock.client().with_timeout(Duration::from_secs(10));
        let err = client
            .batch(None, vec![(1, TicketAction::Punch)])
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::Timeout { delivered: true }));
        mock.verify();
    }

    #[tokio::test]
    async fn test_mismatch_drops_reply() {
        let mut mock = MockClient::<Ticket>::new();
        mock.expect_get(1).return_ok(None);

        let client = mock.client();
        let err = client.delete(1).await.unwrap_err();
        assert!(matches!(err, FrameworkError::ActorDropped));
    }
}
