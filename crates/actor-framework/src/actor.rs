//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the core component that manages the lifecycle
//! and state of entities. It implements the "Server" side of the Actor Model, processing
//! messages sequentially and ensuring exclusive access to the entity store.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Filter, Insertion, ResourceRequest};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages one record set.
///
/// # Concurrency Model
/// Each `ResourceActor` processes its messages *sequentially* in a loop, so the store needs
/// no `Mutex` or `RwLock`. Every request is therefore atomic with respect to every other
/// request on the same actor: an `Action` is a read-modify-write nobody can interleave with,
/// a `CreateIfAbsent` is a check-and-insert, and a `Batch` is applied as a unit.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `ResourceActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Wire**: Pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: Spawn the actor's run loop in a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor, Unsupported};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Bin { id: u32, level: i64 }
/// #[derive(Debug)] struct BinCreate { level: i64 }
/// #[derive(Debug)] enum BinAction { Add(i64) }
/// #[derive(Debug, thiserror::Error)] #[error("bin would go negative")] struct Negative;
///
/// #[async_trait]
/// impl ActorEntity for Bin {
///     type Id = u32;
///     type Create = BinCreate;
///     type Update = Unsupported;
///     type Action = BinAction;
///     type ActionResult = i64;
///     type Context = ();
///     type Error = Negative;
///
///     fn from_create_params(id: u32, p: BinCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, level: p.level })
///     }
///     async fn on_update(&mut self, u: Unsupported, _: &()) -> Result<(), Self::Error> { match u {} }
///     async fn handle_action(&mut self, a: BinAction, _: &()) -> Result<i64, Self::Error> {
///         let BinAction::Add(n) = a;
///         if self.level + n < 0 { return Err(Negative); }
///         self.level += n;
///         Ok(self.level)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Bin>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let a = client.create(BinCreate { level: 5 }).await.unwrap();
///     let b = client.create(BinCreate { level: 1 }).await.unwrap();
///
///     // The second action fails, so neither is applied.
///     let batch = vec![(a, BinAction::Add(-2)), (b, BinAction::Add(-3))];
///     assert!(client.batch(None, batch).await.is_err());
///     assert_eq!(client.get(a).await.unwrap().unwrap().level, 5);
/// }
/// ```
///
/// # Implementation Details
///
/// * `store` maps IDs to entities; `next_id` feeds ID generation.
/// * `unique_index` maps each [`ActorEntity::unique_key`] to the owning ID.
/// * `applied_batches` remembers the results of keyed batches for replay, until the caller
///   sends `ForgetBatch` for the key.
///
/// Update, Action and Batch run their hooks on clones and write back only on success.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    unique_index: HashMap<String, T::Id>,
    applied_batches: HashMap<String, Vec<T::ActionResult>>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the MPSC channel. If the channel is full,
    /// calls to the client wait until there is space (or their deadline passes).
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            unique_index: HashMap::new(),
            applied_batches: HashMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// The `context` argument is injected into every entity hook.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "Order" instead of "laundry_fulfillment::model::order::Order")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let result = self.create(params, &context).await;
                    match &result {
                        Ok(id) => info!(entity_type, %id, size = self.store.len(), "Created"),
                        Err(e) => warn!(entity_type, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::CreateIfAbsent { params, respond_to } => {
                    debug!(entity_type, ?params, "CreateIfAbsent");
                    let result = self.create_if_absent(params, &context).await;
                    match &result {
                        Ok(Insertion::Created(_)) => {
                            info!(entity_type, size = self.store.len(), "Created")
                        }
                        Ok(Insertion::Existing(_)) => info!(entity_type, "Already present"),
                        Err(e) => warn!(entity_type, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Query { filter, respond_to } => {
                    let items = self.query(&filter);
                    debug!(entity_type, matched = items.len(), "Query");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let result = self.update(&id, update, &context).await;
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Updated"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let result = self.delete(&id, &context).await;
                    match &result {
                        Ok(()) => info!(entity_type, %id, size = self.store.len(), "Deleted"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Delete failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = self.action(&id, action, &context).await;
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Batch {
                    key,
                    actions,
                    respond_to,
                } => {
                    debug!(entity_type, ?key, size = actions.len(), "Batch");
                    let result = self.batch(key.as_deref(), actions, &context).await;
                    match &result {
                        Ok(results) => info!(entity_type, ?key, applied = results.len(), "Batch ok"),
                        Err(e) => warn!(entity_type, ?key, error = %e, "Batch rolled back"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::ForgetBatch { key, respond_to } => {
                    let known = self.applied_batches.remove(&key).is_some();
                    debug!(entity_type, %key, known, remembered = self.applied_batches.len(), "ForgetBatch");
                    let _ = respond_to.send(Ok(known));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn build(&mut self, params: T::Create, context: &T::Context) -> Result<T, FrameworkError> {
        let id = T::Id::from(self.next_id);
        let mut item = T::from_create_params(id, params).map_err(FrameworkError::entity)?;
        item.on_create(context)
            .await
            .map_err(FrameworkError::entity)?;
        Ok(item)
    }

    fn insert(&mut self, item: T) -> T::Id {
        let id = T::Id::from(self.next_id);
        self.next_id += 1;
        if let Some(key) = item.unique_key() {
            self.unique_index.insert(key, id.clone());
        }
        self.store.insert(id.clone(), item);
        id
    }

    async fn create(&mut self, params: T::Create, context: &T::Context) -> Result<T::Id, FrameworkError> {
        let item = self.build(params, context).await?;
        if let Some(key) = item.unique_key() {
            if self.unique_index.contains_key(&key) {
                return Err(FrameworkError::UniqueViolation(key));
            }
        }
        Ok(self.insert(item))
    }

    async fn create_if_absent(
        &mut self,
        params: T::Create,
        context: &T::Context,
    ) -> Result<Insertion<T>, FrameworkError> {
        let item = self.build(params, context).await?;
        if let Some(existing) = item
            .unique_key()
            .and_then(|key| self.unique_index.get(&key))
            .and_then(|id| self.store.get(id))
        {
            return Ok(Insertion::Existing(existing.clone()));
        }
        let stored = item.clone();
        self.insert(item);
        Ok(Insertion::Created(stored))
    }

    fn query(&self, filter: &Filter<T>) -> Vec<T> {
        self.store
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    async fn update(
        &mut self,
        id: &T::Id,
        update: T::Update,
        context: &T::Context,
    ) -> Result<T, FrameworkError> {
        let current = self
            .store
            .get(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let old_key = current.unique_key();
        let mut staged = current.clone();
        staged
            .on_update(update, context)
            .await
            .map_err(FrameworkError::entity)?;

        let new_key = staged.unique_key();
        if new_key != old_key {
            if let Some(key) = &new_key {
                if self.unique_index.get(key).is_some_and(|owner| owner != id) {
                    return Err(FrameworkError::UniqueViolation(key.clone()));
                }
            }
            if let Some(key) = old_key {
                self.unique_index.remove(&key);
            }
            if let Some(key) = new_key {
                self.unique_index.insert(key, id.clone());
            }
        }
        self.store.insert(id.clone(), staged.clone());
        Ok(staged)
    }

    async fn delete(&mut self, id: &T::Id, context: &T::Context) -> Result<(), FrameworkError> {
        let item = self
            .store
            .get(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete(context)
            .await
            .map_err(FrameworkError::entity)?;
        if let Some(removed) = self.store.remove(id) {
            if let Some(key) = removed.unique_key() {
                self.unique_index.remove(&key);
            }
        }
        Ok(())
    }

    async fn action(
        &mut self,
        id: &T::Id,
        action: T::Action,
        context: &T::Context,
    ) -> Result<T::ActionResult, FrameworkError> {
        let mut staged = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let result = staged
            .handle_action(action, context)
            .await
            .map_err(FrameworkError::entity)?;
        self.store.insert(id.clone(), staged);
        Ok(result)
    }

    async fn batch(
        &mut self,
        key: Option<&str>,
        actions: Vec<(T::Id, T::Action)>,
        context: &T::Context,
    ) -> Result<Vec<T::ActionResult>, FrameworkError> {
        if let Some(previous) = key.and_then(|k| self.applied_batches.get(k)) {
            debug!(?key, "Batch replayed");
            return Ok(previous.clone());
        }

        let mut staged: HashMap<T::Id, T> = HashMap::new();
        let mut results = Vec::with_capacity(actions.len());
        for (id, action) in actions {
            if !staged.contains_key(&id) {
                let current = self
                    .store
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
                staged.insert(id.clone(), current);
            }
            let item = staged
                .get_mut(&id)
                .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
            let result = item
                .handle_action(action, context)
                .await
                .map_err(FrameworkError::entity)?;
            results.push(result);
        }

        self.store.extend(staged);
        if let Some(k) = key {
            self.applied_batches.insert(k.to_string(), results.clone());
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Unsupported;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Slot {
        id: u32,
        code: String,
        level: i64,
    }

    #[derive(Debug)]
    struct SlotCreate {
        code: String,
        level: i64,
    }

    #[derive(Debug)]
    struct Rename(String);

    #[derive(Debug)]
    enum SlotAction {
        Add(i64),
    }

    #[derive(Debug, thiserror::Error, PartialEq)]
    enum SlotError {
        #[error("slot {0} would go negative")]
        Negative(u32),
        #[error("slot {0} is pinned")]
        Pinned(u32),
    }

    #[async_trait]
    impl ActorEntity for Slot {
        type Id = u32;
        type Create = SlotCreate;
        type Update = Rename;
        type Action = SlotAction;
        type ActionResult = i64;
        type Context = ();
        type Error = SlotError;

        fn from_create_params(id: u32, params: SlotCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                code: params.code,
                level: params.level,
            })
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.code.clone())
        }

        async fn on_update(&mut self, update: Rename, _ctx: &()) -> Result<(), Self::Error> {
            self.code = update.0;
            Ok(())
        }

        async fn on_delete(&self, _ctx: &()) -> Result<(), Self::Error> {
            if self.code == "pinned" {
                return Err(SlotError::Pinned(self.id));
            }
            Ok(())
        }

        async fn handle_action(&mut self, action: SlotAction, _ctx: &()) -> Result<i64, Self::Error> {
            let SlotAction::Add(n) = action;
            if self.level + n < 0 {
                return Err(SlotError::Negative(self.id));
            }
            self.level += n;
            Ok(self.level)
        }
    }

    fn slot(code: &str, level: i64) -> SlotCreate {
        SlotCreate {
            code: code.to_string(),
            level,
        }
    }

    fn spawn() -> ResourceClient<Slot> {
        let (actor, client) = ResourceActor::<Slot>::new(16);
        tokio::spawn(actor.run(()));
        client
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_unique_key() {
        let client = spawn();
        client.create(slot("a", 1)).await.unwrap();
        let err = client.create(slot("a", 2)).await.unwrap_err();
        assert!(matches!(err, FrameworkError::UniqueViolation(k) if k == "a"));
    }

    #[tokio::test]
    async fn test_create_if_absent_returns_existing() {
        let client = spawn();
        let first = client.create_if_absent(slot("a", 1)).await.unwrap();
        assert!(first.is_created());

        let second = client.create_if_absent(slot("a", 99)).await.unwrap();
        assert!(!second.is_created());
        assert_eq!(second.get().level, 1);
        assert_eq!(second.get().id, first.get().id);
    }

    #[tokio::test]
    async fn test_concurrent_create_if_absent_creates_once() {
        let client = spawn();
        let mut handles = Vec::new();
        for level in 0..10 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client.create_if_absent(slot("same", level)).await.unwrap()
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_created() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(client.query(Filter::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_action_leaves_entity_untouched() {
        let client = spawn();
        let id = client.create(slot("a", 3)).await.unwrap();
        let err = client
            .perform_action(id, SlotAction::Add(-4))
            .await
            .unwrap_err();
        assert_eq!(err.entity_error::<SlotError>(), Some(&SlotError::Negative(id)));
        assert_eq!(client.get(id).await.unwrap().unwrap().level, 3);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let client = spawn();
        let a = client.create(slot("a", 10)).await.unwrap();
        let b = client.create(slot("b", 1)).await.unwrap();

        let err = client
            .batch(None, vec![(a, SlotAction::Add(-5)), (b, SlotAction::Add(-2))])
            .await
            .unwrap_err();
        assert_eq!(err.entity_error::<SlotError>(), Some(&SlotError::Negative(b)));
        assert_eq!(client.get(a).await.unwrap().unwrap().level, 10);
        assert_eq!(client.get(b).await.unwrap().unwrap().level, 1);

        let ok = client
            .batch(None, vec![(a, SlotAction::Add(-5)), (a, SlotAction::Add(-5))])
            .await
            .unwrap();
        assert_eq!(ok, vec![5, 0]);
    }

    #[tokio::test]
    async fn test_keyed_batch_applies_once() {
        let client = spawn();
        let a = client.create(slot("a", 10)).await.unwrap();
        let key = Some("deduct:1".to_string());

        let first = client
            .batch(key.clone(), vec![(a, SlotAction::Add(-4))])
            .await
            .unwrap();
        let replay = client
            .batch(key, vec![(a, SlotAction::Add(-4))])
            .await
            .unwrap();
        assert_eq!(first, replay);
        assert_eq!(client.get(a).await.unwrap().unwrap().level, 6);
    }

    #[tokio::test]
    async fn test_forgotten_batch_key_is_dropped() {
        let client = spawn();
        let a = client.create(slot("a", 10)).await.unwrap();

        client
            .batch(Some("deduct:1".into()), vec![(a, SlotAction::Add(-4))])
            .await
            .unwrap();
        assert!(client.forget_batch("deduct:1").await.unwrap());
        assert!(!client.forget_batch("deduct:1").await.unwrap());
        assert!(!client.forget_batch("deduct:never").await.unwrap());

        // the key no longer replays, so the same batch is applied again
        let again = client
            .batch(Some("deduct:1".into()), vec![(a, SlotAction::Add(-4))])
            .await
            .unwrap();
        assert_eq!(again, vec![2]);
        assert_eq!(client.get(a).await.unwrap().unwrap().level, 2);
    }

    #[tokio::test]
    async fn test_batch_with_unknown_id_fails_whole() {
        let client = spawn();
        let a = client.create(slot("a", 10)).await.unwrap();
        let err = client
            .batch(None, vec![(a, SlotAction::Add(-1)), (42, SlotAction::Add(-1))])
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::NotFound(_)));
        assert_eq!(client.get(a).await.unwrap().unwrap().level, 10);
    }

    #[tokio::test]
    async fn test_update_moves_unique_key() {
        let client = spawn();
        let a = client.create(slot("a", 1)).await.unwrap();
        client.create(slot("b", 1)).await.unwrap();

        let err = client.update(a, Rename("b".into())).await.unwrap_err();
        assert!(matches!(err, FrameworkError::UniqueViolation(_)));
        assert_eq!(client.get(a).await.unwrap().unwrap().code, "a");

        client.update(a, Rename("c".into())).await.unwrap();
        // "a" is free again
        client.create(slot("a", 1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_veto_and_key_release() {
        let client = spawn();
        let pinned = client.create(slot("pinned", 1)).await.unwrap();
        let err = client.delete(pinned).await.unwrap_err();
        assert!(err.entity_error::<SlotError>().is_some());
        assert!(client.get(pinned).await.unwrap().is_some());

        let a = client.create(slot("a", 1)).await.unwrap();
        client.delete(a).await.unwrap();
        assert!(client.get(a).await.unwrap().is_none());
        client.create(slot("a", 1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_query_filters() {
        let client = spawn();
        client.create(slot("a", 1)).await.unwrap();
        client.create(slot("b", 7)).await.unwrap();
        client.create(slot("c", 9)).await.unwrap();

        let mut high = client
            .query(Filter::new(|s: &Slot| s.level > 5))
            .await
            .unwrap();
        high.sort_by_key(|s| s.id);
        let codes: Vec<_> = high.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["b", "c"]);
    }
}
