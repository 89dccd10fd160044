//! In-process document store engine backing the default deployment.
//!
//! Documents are JSON values held in insertion-ordered maps. Every write goes
//! through a single commit section so multi-document batches become visible
//! to readers and subscribers as one unit.

use std::{
    cmp::Ordering,
    sync::{Arc, PoisonError, RwLock},
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::{broadcast, watch};

use crate::dao::{
    doc_store::{BatchOp, CollectionChange, CollectionFeed, DocStore, DocWatcher},
    storage::StorageResult,
};

/// Default capacity of each collection's broadcast change feed.
pub const DEFAULT_FEED_CAPACITY: usize = 16;

/// Document store keeping all collections in process memory.
#[derive(Clone)]
pub struct MemoryDocStore {
    inner: Arc<Inner>,
}

struct Inner {
    collections: DashMap<String, Arc<CollectionState>>,
    /// Commits hold this exclusively; reads and subscription priming hold it
    /// shared. A batch is therefore never interleaved with another write and
    /// never observable half-applied.
    commit_lock: RwLock<()>,
    feed_capacity: usize,
}

struct CollectionState {
    docs: RwLock<IndexMap<String, Value>>,
    watchers: DashMap<String, watch::Sender<Option<Value>>>,
    feed: broadcast::Sender<CollectionChange>,
}

impl CollectionState {
    fn new(feed_capacity: usize) -> Self {
        let (feed, _receiver) = broadcast::channel(feed_capacity);
        Self {
            docs: RwLock::new(IndexMap::new()),
            watchers: DashMap::new(),
            feed,
        }
    }
}

impl MemoryDocStore {
    /// Create an empty store with the given change-feed capacity.
    pub fn new(feed_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                collections: DashMap::new(),
                commit_lock: RwLock::new(()),
                feed_capacity,
            }),
        }
    }
}

impl Default for MemoryDocStore {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl Inner {
    fn collection(&self, name: &str) -> Arc<CollectionState> {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CollectionState::new(self.feed_capacity)))
            .clone()
    }

    /// Apply every operation, then notify. Notifications only start once the
    /// whole batch has landed, so no subscriber observes a partial commit.
    fn commit(&self, ops: Vec<BatchOp>) -> StorageResult<()> {
        let _guard = self
            .commit_lock
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut outcomes: Vec<(Arc<CollectionState>, String, Option<Value>)> =
            Vec::with_capacity(ops.len());

        for op in ops {
            match op {
                BatchOp::Put {
                    collection,
                    key,
                    value,
                    merge,
                } => {
                    let state = self.collection(&collection);
                    let committed = {
                        let mut docs = state.docs.write().unwrap_or_else(PoisonError::into_inner);
                        let next = if merge {
                            merge_fields(docs.get(&key), value)
                        } else {
                            value
                        };
                        docs.insert(key.clone(), next.clone());
                        next
                    };
                    outcomes.push((state, key, Some(committed)));
                }
                BatchOp::Delete { collection, key } => {
                    let state = self.collection(&collection);
                    let removed = {
                        let mut docs = state.docs.write().unwrap_or_else(PoisonError::into_inner);
                        docs.shift_remove(&key).is_some()
                    };
                    if removed {
                        outcomes.push((state, key, None));
                    }
                }
            }
        }

        for (state, key, value) in outcomes {
            if let Some(sender) = state.watchers.get(&key) {
                let _ = sender.send(value.clone());
            }
            let _ = state.feed.send(CollectionChange { key, value });
        }

        Ok(())
    }

    fn read(&self, collection: &str, key: &str) -> Option<Value> {
        let _guard = self
            .commit_lock
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let state = self.collection(collection);
        let docs = state.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.get(key).cloned()
    }

    fn filter(&self, collection: &str, field: &str, value: &Value) -> Vec<(String, Value)> {
        let _guard = self
            .commit_lock
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let state = self.collection(collection);
        let docs = state.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.iter()
            .filter(|(_, doc)| doc.get(field) == Some(value))
            .map(|(key, doc)| (key.clone(), doc.clone()))
            .collect()
    }

    fn ordered(&self, collection: &str, field: &str) -> Vec<(String, Value)> {
        let _guard = self
            .commit_lock
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let state = self.collection(collection);
        let docs = state.docs.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(String, Value)> = docs
            .iter()
            .map(|(key, doc)| (key.clone(), doc.clone()))
            .collect();
        // Stable sort: ties and documents missing the field keep insertion order.
        entries.sort_by(|(_, a), (_, b)| compare_field(a.get(field), b.get(field)));
        entries
    }

    fn watch(&self, collection: &str, key: &str) -> DocWatcher {
        // Prime under the commit lock so the initial snapshot cannot race a
        // half-notified batch.
        let _guard = self
            .commit_lock
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let state = self.collection(collection);
        let sender = state.watchers.entry(key.to_string()).or_insert_with(|| {
            let current = {
                let docs = state.docs.read().unwrap_or_else(PoisonError::into_inner);
                docs.get(key).cloned()
            };
            watch::channel(current).0
        });
        sender.subscribe()
    }

    fn feed(&self, collection: &str) -> CollectionFeed {
        self.collection(collection).feed.subscribe()
    }
}

impl DocStore for MemoryDocStore {
    fn put(
        &self,
        collection: &str,
        key: &str,
        value: Value,
        merge: bool,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        let op = BatchOp::put(collection, key, value, merge);
        Box::pin(async move { inner.commit(vec![op]) })
    }

    fn get(&self, collection: &str, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let inner = Arc::clone(&self.inner);
        let (collection, key) = (collection.to_string(), key.to_string());
        Box::pin(async move { Ok(inner.read(&collection, &key)) })
    }

    fn delete(&self, collection: &str, key: &str) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        let op = BatchOp::delete(collection, key);
        Box::pin(async move { inner.commit(vec![op]) })
    }

    fn batch(&self, ops: Vec<BatchOp>) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.commit(ops) })
    }

    fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> BoxFuture<'static, StorageResult<Vec<(String, Value)>>> {
        let inner = Arc::clone(&self.inner);
        let (collection, field) = (collection.to_string(), field.to_string());
        Box::pin(async move { Ok(inner.filter(&collection, &field, &value)) })
    }

    fn query_ordered(
        &self,
        collection: &str,
        field: &str,
    ) -> BoxFuture<'static, StorageResult<Vec<(String, Value)>>> {
        let inner = Arc::clone(&self.inner);
        let (collection, field) = (collection.to_string(), field.to_string());
        Box::pin(async move { Ok(inner.ordered(&collection, &field)) })
    }

    fn subscribe_doc(
        &self,
        collection: &str,
        key: &str,
    ) -> BoxFuture<'static, StorageResult<DocWatcher>> {
        let inner = Arc::clone(&self.inner);
        let (collection, key) = (collection.to_string(), key.to_string());
        Box::pin(async move { Ok(inner.watch(&collection, &key)) })
    }

    fn subscribe_collection(
        &self,
        collection: &str,
    ) -> BoxFuture<'static, StorageResult<CollectionFeed>> {
        let inner = Arc::clone(&self.inner);
        let collection = collection.to_string();
        Box::pin(async move { Ok(inner.feed(&collection)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}

/// Merge `patch` into `base` field by field when both are objects, otherwise
/// replace the document wholesale.
fn merge_fields(base: Option<&Value>, patch: Value) -> Value {
    match (base, patch) {
        (Some(Value::Object(existing)), Value::Object(incoming)) => {
            let mut merged = existing.clone();
            for (field, value) in incoming {
                merged.insert(field, value);
            }
            Value::Object(merged)
        }
        (_, incoming) => incoming,
    }
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let store = MemoryDocStore::default();
        store
            .put("lobby", "main_lobby", json!({"status": "waiting"}), false)
            .await
            .unwrap();

        let doc = store.get("lobby", "main_lobby").await.unwrap();
        assert_eq!(doc, Some(json!({"status": "waiting"})));

        store.delete("lobby", "main_lobby").await.unwrap();
        assert_eq!(store.get("lobby", "main_lobby").await.unwrap(), None);
    }

    #[tokio::test]
    async fn merge_put_keeps_untouched_fields() {
        let store = MemoryDocStore::default();
        store
            .put("participants", "a@b.c", json!({"name": "Ada", "status": "In Lobby"}), false)
            .await
            .unwrap();
        store
            .put("participants", "a@b.c", json!({"status": "In Progress"}), true)
            .await
            .unwrap();

        let doc = store.get("participants", "a@b.c").await.unwrap().unwrap();
        assert_eq!(doc["name"], "Ada");
        assert_eq!(doc["status"], "In Progress");
    }

    #[tokio::test]
    async fn subscriber_sees_absent_then_present_then_absent() {
        let store = MemoryDocStore::default();
        let mut watcher = store.subscribe_doc("lobby", "main_lobby").await.unwrap();
        assert_eq!(*watcher.borrow_and_update(), None);

        store
            .put("lobby", "main_lobby", json!({"status": "waiting"}), false)
            .await
            .unwrap();
        watcher.changed().await.unwrap();
        assert_eq!(
            watcher.borrow_and_update().clone(),
            Some(json!({"status": "waiting"}))
        );

        store.delete("lobby", "main_lobby").await.unwrap();
        watcher.changed().await.unwrap();
        assert_eq!(*watcher.borrow_and_update(), None);
    }

    #[tokio::test]
    async fn batch_is_visible_as_one_unit() {
        let store = MemoryDocStore::default();
        store
            .put("participants", "a@b.c", json!({"status": "In Lobby"}), false)
            .await
            .unwrap();
        let mut lobby_watch = store.subscribe_doc("lobby", "main_lobby").await.unwrap();

        store
            .batch(vec![
                BatchOp::put(
                    "participants",
                    "a@b.c",
                    json!({"status": "In Progress"}),
                    true,
                ),
                BatchOp::put(
                    "lobby",
                    "main_lobby",
                    json!({"status": "started", "active_quiz_id": "q1"}),
                    false,
                ),
            ])
            .await
            .unwrap();

        lobby_watch.changed().await.unwrap();
        let lobby = lobby_watch.borrow_and_update().clone().unwrap();
        assert_eq!(lobby["status"], "started");
        // The participant write from the same batch is already readable.
        let participant = store.get("participants", "a@b.c").await.unwrap().unwrap();
        assert_eq!(participant["status"], "In Progress");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_readers_never_observe_a_partial_batch() {
        let store = MemoryDocStore::default();
        store
            .put("left", "doc", json!({"v": 0u64}), false)
            .await
            .unwrap();
        store
            .put("right", "doc", json!({"v": 0u64}), false)
            .await
            .unwrap();

        // Each batch writes `left` before `right` with the same value. A
        // reader looking at `left` first must therefore never see `left`
        // ahead of `right`; that would mean it caught a batch mid-apply.
        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for v in 1..=500u64 {
                    store
                        .batch(vec![
                            BatchOp::put("left", "doc", json!({ "v": v }), false),
                            BatchOp::put("right", "doc", json!({ "v": v }), false),
                        ])
                        .await
                        .unwrap();
                }
            })
        };

        for _ in 0..2_000 {
            let left = store.get("left", "doc").await.unwrap().unwrap();
            let right = store.get("right", "doc").await.unwrap().unwrap();
            let left = left["v"].as_u64().unwrap();
            let right = right["v"].as_u64().unwrap();
            assert!(
                left <= right,
                "read left={left} ahead of right={right}: partial batch observed"
            );
        }
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn collection_feed_reports_writes_and_deletes() {
        let store = MemoryDocStore::default();
        let mut feed = store.subscribe_collection("participants").await.unwrap();

        store
            .put("participants", "a@b.c", json!({"name": "Ada"}), false)
            .await
            .unwrap();
        let change = feed.recv().await.unwrap();
        assert_eq!(change.key, "a@b.c");
        assert!(change.value.is_some());

        store.delete("participants", "a@b.c").await.unwrap();
        let change = feed.recv().await.unwrap();
        assert_eq!(change.key, "a@b.c");
        assert!(change.value.is_none());
    }

    #[tokio::test]
    async fn deleting_a_missing_document_emits_nothing() {
        let store = MemoryDocStore::default();
        let mut feed = store.subscribe_collection("participants").await.unwrap();

        store.delete("participants", "ghost@b.c").await.unwrap();
        store
            .put("participants", "a@b.c", json!({"name": "Ada"}), false)
            .await
            .unwrap();

        // Only the put shows up on the feed.
        let change = feed.recv().await.unwrap();
        assert_eq!(change.key, "a@b.c");
    }

    #[tokio::test]
    async fn query_where_matches_exact_field_values() {
        let store = MemoryDocStore::default();
        store
            .put("results", "r1", json!({"email": "a@b.c", "time": 10}), false)
            .await
            .unwrap();
        store
            .put("results", "r2", json!({"email": "d@e.f", "time": 12}), false)
            .await
            .unwrap();

        let matches = store
            .query_where("results", "email", json!("a@b.c"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, "r1");
    }

    #[tokio::test]
    async fn query_ordered_sorts_numbers_with_stable_ties() {
        let store = MemoryDocStore::default();
        store
            .put("results", "slow", json!({"time": 90}), false)
            .await
            .unwrap();
        store
            .put("results", "fast-first", json!({"time": 30}), false)
            .await
            .unwrap();
        store
            .put("results", "fast-second", json!({"time": 30}), false)
            .await
            .unwrap();

        let ordered = store.query_ordered("results", "time").await.unwrap();
        let keys: Vec<&str> = ordered.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["fast-first", "fast-second", "slow"]);
    }
}
