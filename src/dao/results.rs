use std::{
    sync::Arc,
    time::{Duration, UNIX_EPOCH},
};

use serde_json::json;
use uuid::Uuid;

use crate::dao::{
    decode_document, encode_document,
    doc_store::{CollectionFeed, DocStore},
    models::ResultEntity,
    storage::StorageResult,
};

const RESULT_COLLECTION: &str = "results";

/// Repository over the append-only quiz result collection.
#[derive(Clone)]
pub struct ResultRepository {
    store: Arc<dyn DocStore>,
}

impl ResultRepository {
    pub fn new(store: Arc<dyn DocStore>) -> Self {
        Self { store }
    }

    /// Append one result record under a fresh random key. Records are never
    /// mutated or deleted afterwards.
    pub async fn append(&self, result: &ResultEntity) -> StorageResult<()> {
        let key = Uuid::new_v4().simple().to_string();
        let value = encode_document(RESULT_COLLECTION, &key, result)?;
        self.store.put(RESULT_COLLECTION, &key, value, false).await
    }

    /// Whether any result exists for `email`, across every quiz. This is the
    /// one-quiz-per-email-ever registration gate.
    pub async fn has_any_for(&self, email: &str) -> StorageResult<bool> {
        let matches = self
            .store
            .query_where(RESULT_COLLECTION, "email", json!(email))
            .await?;
        Ok(!matches.is_empty())
    }

    /// Results for `quiz_id` ordered by elapsed time ascending. Ties are
    /// broken by completion timestamp, then email, so the leaderboard order
    /// never depends on store internals.
    pub async fn leaderboard(&self, quiz_id: &str) -> StorageResult<Vec<ResultEntity>> {
        let entries = self.store.query_ordered(RESULT_COLLECTION, "time").await?;
        let mut results: Vec<ResultEntity> = entries
            .into_iter()
            .map(|(key, value)| decode_document::<ResultEntity>(RESULT_COLLECTION, &key, value))
            .collect::<StorageResult<Vec<_>>>()?
            .into_iter()
            .filter(|result| result.quiz_id == quiz_id)
            .collect();
        results.sort_by(|a, b| {
            (a.time, completion_instant(a), &a.email).cmp(&(b.time, completion_instant(b), &b.email))
        });
        Ok(results)
    }

    /// Subscribe to the result collection change feed.
    pub async fn feed(&self) -> StorageResult<CollectionFeed> {
        self.store.subscribe_collection(RESULT_COLLECTION).await
    }
}

fn completion_instant(result: &ResultEntity) -> Duration {
    result
        .completed_at
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}
