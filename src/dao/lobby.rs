use std::sync::Arc;

use serde_json::json;

use crate::dao::{
    decode_document, encode_document,
    doc_store::{BatchOp, CollectionFeed, DocStore, DocWatcher},
    models::{LobbyEntity, ParticipantEntity, ParticipantStatus},
    storage::StorageResult,
};

/// Collection holding the singleton lobby document.
pub const LOBBY_COLLECTION: &str = "lobby";

/// Repository over the shared lobby document and its participant
/// sub-collection. All writes to either go through this type; Start and
/// Reset are single atomic batches so subscribers never observe the lobby
/// status and participant statuses out of step.
#[derive(Clone)]
pub struct LobbyRepository {
    store: Arc<dyn DocStore>,
    lobby_id: String,
    participants_path: String,
}

impl LobbyRepository {
    /// Build a repository bound to the lobby identified by `lobby_id`.
    pub fn new(store: Arc<dyn DocStore>, lobby_id: &str) -> Self {
        Self {
            participants_path: format!("{LOBBY_COLLECTION}/{lobby_id}/participants"),
            store,
            lobby_id: lobby_id.to_string(),
        }
    }

    /// Fetch the lobby document, if it has been created yet.
    pub async fn lobby(&self) -> StorageResult<Option<LobbyEntity>> {
        match self.store.get(LOBBY_COLLECTION, &self.lobby_id).await? {
            Some(value) => Ok(Some(decode_document(LOBBY_COLLECTION, &self.lobby_id, value)?)),
            None => Ok(None),
        }
    }

    /// Create the lobby document in the waiting state when absent.
    pub async fn ensure_lobby(&self) -> StorageResult<()> {
        if self.lobby().await?.is_none() {
            let value = encode_document(LOBBY_COLLECTION, &self.lobby_id, &LobbyEntity::waiting())?;
            self.store
                .put(LOBBY_COLLECTION, &self.lobby_id, value, false)
                .await?;
        }
        Ok(())
    }

    /// Upsert a participant record keyed by their email.
    pub async fn upsert_participant(&self, participant: &ParticipantEntity) -> StorageResult<()> {
        let value = encode_document(&self.participants_path, &participant.email, participant)?;
        self.store
            .put(&self.participants_path, &participant.email, value, false)
            .await
    }

    /// All current participants, ordered by email for determinism.
    pub async fn participants(&self) -> StorageResult<Vec<ParticipantEntity>> {
        let entries = self
            .store
            .query_ordered(&self.participants_path, "email")
            .await?;
        entries
            .into_iter()
            .map(|(key, value)| decode_document(&self.participants_path, &key, value))
            .collect()
    }

    /// Fetch one participant by email.
    pub async fn find_participant(&self, email: &str) -> StorageResult<Option<ParticipantEntity>> {
        match self.store.get(&self.participants_path, email).await? {
            Some(value) => Ok(Some(decode_document(&self.participants_path, email, value)?)),
            None => Ok(None),
        }
    }

    /// Flip one participant's status, returning whether the record still
    /// existed. A missing participant (e.g. after a reset race) is reported
    /// as `false`, not an error.
    pub async fn set_participant_status(
        &self,
        email: &str,
        status: ParticipantStatus,
    ) -> StorageResult<bool> {
        if self.find_participant(email).await?.is_none() {
            return Ok(false);
        }
        self.store
            .put(
                &self.participants_path,
                email,
                json!({ "status": status }),
                true,
            )
            .await?;
        Ok(true)
    }

    /// Transition the lobby to started for `quiz_id`, marking every current
    /// participant in progress in the same atomic batch.
    ///
    /// Deliberately permits an empty participant set; refusing that is the
    /// caller's policy, not a storage invariant.
    pub async fn start(&self, quiz_id: &str) -> StorageResult<()> {
        let participants = self.participants().await?;
        let mut ops: Vec<BatchOp> = participants
            .iter()
            .map(|participant| {
                BatchOp::put(
                    &self.participants_path,
                    &participant.email,
                    json!({ "status": ParticipantStatus::InProgress }),
                    true,
                )
            })
            .collect();
        ops.push(BatchOp::put(
            LOBBY_COLLECTION,
            &self.lobby_id,
            encode_document(LOBBY_COLLECTION, &self.lobby_id, &LobbyEntity::started(quiz_id))?,
            false,
        ));
        self.store.batch(ops).await
    }

    /// Delete every participant and rewrite the lobby to waiting, atomically.
    /// Each vanished participant document is the eviction signal for the
    /// client subscribed to it.
    pub async fn reset(&self) -> StorageResult<()> {
        let participants = self.participants().await?;
        let mut ops: Vec<BatchOp> = participants
            .iter()
            .map(|participant| BatchOp::delete(&self.participants_path, &participant.email))
            .collect();
        ops.push(BatchOp::put(
            LOBBY_COLLECTION,
            &self.lobby_id,
            encode_document(LOBBY_COLLECTION, &self.lobby_id, &LobbyEntity::waiting())?,
            false,
        ));
        self.store.batch(ops).await
    }

    /// Subscribe to the lobby document.
    pub async fn watch_lobby(&self) -> StorageResult<DocWatcher> {
        self.store
            .subscribe_doc(LOBBY_COLLECTION, &self.lobby_id)
            .await
    }

    /// Subscribe to one participant document.
    pub async fn watch_participant(&self, email: &str) -> StorageResult<DocWatcher> {
        self.store.subscribe_doc(&self.participants_path, email).await
    }

    /// Subscribe to the participant collection change feed.
    pub async fn participant_feed(&self) -> StorageResult<CollectionFeed> {
        self.store.subscribe_collection(&self.participants_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{doc_store::memory::MemoryDocStore, models::LobbyStatus};

    fn repository() -> LobbyRepository {
        LobbyRepository::new(Arc::new(MemoryDocStore::default()), "main_lobby")
    }

    fn participant(name: &str, email: &str) -> ParticipantEntity {
        ParticipantEntity {
            name: name.to_string(),
            email: email.to_string(),
            status: ParticipantStatus::InLobby,
        }
    }

    #[tokio::test]
    async fn ensure_lobby_is_idempotent_and_preserves_state() {
        let repo = repository();
        repo.ensure_lobby().await.unwrap();
        assert_eq!(repo.lobby().await.unwrap(), Some(LobbyEntity::waiting()));

        repo.start("q1").await.unwrap();
        repo.ensure_lobby().await.unwrap();
        assert_eq!(
            repo.lobby().await.unwrap().unwrap().status,
            LobbyStatus::Started
        );
    }

    #[tokio::test]
    async fn start_marks_every_participant_in_progress_with_the_lobby() {
        let repo = repository();
        repo.ensure_lobby().await.unwrap();
        repo.upsert_participant(&participant("Ada", "ada@example.com"))
            .await
            .unwrap();
        repo.upsert_participant(&participant("Brian", "brian@example.com"))
            .await
            .unwrap();

        let mut lobby_watch = repo.watch_lobby().await.unwrap();
        lobby_watch.borrow_and_update();

        repo.start("q1").await.unwrap();

        // By the time the lobby transition is observable, every participant
        // write from the same batch must be readable too.
        lobby_watch.changed().await.unwrap();
        let lobby: LobbyEntity =
            serde_json::from_value(lobby_watch.borrow_and_update().clone().unwrap()).unwrap();
        assert_eq!(lobby, LobbyEntity::started("q1"));
        for p in repo.participants().await.unwrap() {
            assert_eq!(p.status, ParticipantStatus::InProgress);
        }
    }

    #[tokio::test]
    async fn start_with_zero_participants_is_permitted_at_this_level() {
        let repo = repository();
        repo.ensure_lobby().await.unwrap();

        repo.start("q1").await.unwrap();

        assert_eq!(repo.lobby().await.unwrap(), Some(LobbyEntity::started("q1")));
        assert!(repo.participants().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_evicts_participants_and_is_idempotent() {
        let repo = repository();
        repo.ensure_lobby().await.unwrap();
        repo.upsert_participant(&participant("Ada", "ada@example.com"))
            .await
            .unwrap();
        repo.start("q1").await.unwrap();

        let mut ada_watch = repo.watch_participant("ada@example.com").await.unwrap();
        ada_watch.borrow_and_update();

        repo.reset().await.unwrap();
        ada_watch.changed().await.unwrap();
        assert!(ada_watch.borrow_and_update().is_none());
        assert_eq!(repo.lobby().await.unwrap(), Some(LobbyEntity::waiting()));

        repo.reset().await.unwrap();
        assert_eq!(repo.lobby().await.unwrap(), Some(LobbyEntity::waiting()));
        assert!(repo.participants().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_flip_reports_missing_participants() {
        let repo = repository();
        repo.ensure_lobby().await.unwrap();
        repo.upsert_participant(&participant("Ada", "ada@example.com"))
            .await
            .unwrap();

        assert!(
            repo.set_participant_status("ada@example.com", ParticipantStatus::Completed)
                .await
                .unwrap()
        );
        assert_eq!(
            repo.find_participant("ada@example.com")
                .await
                .unwrap()
                .unwrap()
                .status,
            ParticipantStatus::Completed
        );

        assert!(
            !repo
                .set_participant_status("ghost@example.com", ParticipantStatus::Completed)
                .await
                .unwrap()
        );
    }
}
