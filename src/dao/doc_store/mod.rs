pub mod memory;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::{broadcast, watch};

use crate::dao::storage::StorageResult;

/// Single operation inside an atomic batch commit.
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Write `value` at `collection/key`. When `merge` is set, top-level
    /// fields are merged into any existing document instead of replacing it.
    Put {
        collection: String,
        key: String,
        value: Value,
        merge: bool,
    },
    /// Remove the document at `collection/key` if it exists.
    Delete { collection: String, key: String },
}

impl BatchOp {
    /// Convenience constructor for a replace/merge write.
    pub fn put(collection: &str, key: &str, value: Value, merge: bool) -> Self {
        BatchOp::Put {
            collection: collection.to_string(),
            key: key.to_string(),
            value,
            merge,
        }
    }

    /// Convenience constructor for a delete.
    pub fn delete(collection: &str, key: &str) -> Self {
        BatchOp::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }
}

/// Change-feed entry emitted for every committed write within a collection.
#[derive(Debug, Clone)]
pub struct CollectionChange {
    /// Key of the document that changed.
    pub key: String,
    /// Committed document state, `None` when the document was deleted.
    pub value: Option<Value>,
}

/// Subscription handle delivering snapshots of a single document.
///
/// The receiver holds the latest committed state (`None` while the document
/// is absent). Watch semantics apply: a slow subscriber may skip
/// intermediate states but always observes them in commit order.
pub type DocWatcher = watch::Receiver<Option<Value>>;

/// Subscription handle delivering per-write change events for a collection.
pub type CollectionFeed = broadcast::Receiver<CollectionChange>;

/// Narrow persistence contract consumed by the repositories.
///
/// Mirrors the shape of a document database: keyed collections of JSON
/// documents, per-document push subscriptions, and atomic multi-document
/// batches. Everything above this trait is backend-agnostic.
pub trait DocStore: Send + Sync {
    fn put(
        &self,
        collection: &str,
        key: &str,
        value: Value,
        merge: bool,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn get(&self, collection: &str, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    fn delete(&self, collection: &str, key: &str) -> BoxFuture<'static, StorageResult<()>>;
    /// Apply every operation as one all-or-nothing commit. No reader or
    /// subscriber may observe a partially applied batch.
    fn batch(&self, ops: Vec<BatchOp>) -> BoxFuture<'static, StorageResult<()>>;
    /// All documents whose `field` equals `value`, keyed.
    fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> BoxFuture<'static, StorageResult<Vec<(String, Value)>>>;
    /// All documents ordered by `field` ascending. Documents missing the
    /// field, and ties, keep their insertion order (stable sort).
    fn query_ordered(
        &self,
        collection: &str,
        field: &str,
    ) -> BoxFuture<'static, StorageResult<Vec<(String, Value)>>>;
    /// Subscribe to one document. The watcher is primed with the current
    /// state and receives every subsequent commit touching the document.
    fn subscribe_doc(
        &self,
        collection: &str,
        key: &str,
    ) -> BoxFuture<'static, StorageResult<DocWatcher>>;
    /// Subscribe to all writes within a collection.
    fn subscribe_collection(
        &self,
        collection: &str,
    ) -> BoxFuture<'static, StorageResult<CollectionFeed>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
