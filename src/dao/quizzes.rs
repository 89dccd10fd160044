use std::sync::Arc;

use crate::dao::{
    decode_document, encode_document,
    doc_store::DocStore,
    models::QuizEntity,
    storage::StorageResult,
};

const QUIZ_COLLECTION: &str = "quizzes";

/// Repository over admin-authored quiz definitions. Plain keyed CRUD; the
/// content invariants (ten distinct causes containing the correct one) are
/// enforced at the editing boundary, not here.
#[derive(Clone)]
pub struct QuizRepository {
    store: Arc<dyn DocStore>,
}

impl QuizRepository {
    pub fn new(store: Arc<dyn DocStore>) -> Self {
        Self { store }
    }

    /// Fetch one quiz definition by id.
    pub async fn find(&self, id: &str) -> StorageResult<Option<QuizEntity>> {
        match self.store.get(QUIZ_COLLECTION, id).await? {
            Some(value) => Ok(Some(decode_document(QUIZ_COLLECTION, id, value)?)),
            None => Ok(None),
        }
    }

    /// Replace the quiz stored under `id` with the provided definition.
    pub async fn save(&self, id: &str, quiz: &QuizEntity) -> StorageResult<()> {
        let value = encode_document(QUIZ_COLLECTION, id, quiz)?;
        self.store.put(QUIZ_COLLECTION, id, value, false).await
    }

    /// Delete the quiz stored under `id`. Deleting a missing id is a no-op.
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.store.delete(QUIZ_COLLECTION, id).await
    }

    /// All quiz definitions with their ids, in creation order.
    pub async fn list(&self) -> StorageResult<Vec<(String, QuizEntity)>> {
        let entries = self.store.query_ordered(QUIZ_COLLECTION, "id").await?;
        entries
            .into_iter()
            .map(|(key, value)| {
                let quiz = decode_document(QUIZ_COLLECTION, &key, value)?;
                Ok((key, quiz))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::doc_store::memory::MemoryDocStore;

    fn quiz() -> QuizEntity {
        QuizEntity {
            passage: "The deploy failed at midnight.".to_string(),
            root_causes: (0..10).map(|i| format!("cause-{i}")).collect(),
            correct_root_cause: "cause-4".to_string(),
            explanation: "A stale cache".to_string(),
        }
    }

    #[tokio::test]
    async fn save_find_delete_roundtrip() {
        let repo = QuizRepository::new(Arc::new(MemoryDocStore::default()));
        repo.save("q1", &quiz()).await.unwrap();

        assert_eq!(repo.find("q1").await.unwrap(), Some(quiz()));
        assert_eq!(repo.find("q2").await.unwrap(), None);

        repo.delete("q1").await.unwrap();
        assert_eq!(repo.find("q1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_returns_ids_in_creation_order() {
        let repo = QuizRepository::new(Arc::new(MemoryDocStore::default()));
        repo.save("outage", &quiz()).await.unwrap();
        repo.save("latency", &quiz()).await.unwrap();

        let ids: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["outage".to_string(), "latency".to_string()]);
    }
}
