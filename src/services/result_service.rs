//! Recording of completed quiz runs and leaderboard projections.

use std::time::SystemTime;

use tracing::{debug, info};

use crate::{
    dao::models::{ParticipantStatus, ResultEntity},
    dto::results::{CompletionStatus, RecordCompletionRequest, ResultSummary},
    error::ServiceError,
    state::SharedState,
};

/// Append a result record and flip the participant's lobby status to
/// completed. The status flip is best effort: a participant already removed
/// by a reset race is logged and ignored, the result record stands either
/// way.
pub async fn record_completion(
    state: &SharedState,
    request: RecordCompletionRequest,
) -> Result<ResultSummary, ServiceError> {
    let entity = ResultEntity {
        name: request.name,
        email: request.email,
        time: request.time,
        explanation: request.explanation,
        quiz_id: request.quiz_id,
        completed_at: SystemTime::now(),
    };
    state.result_repository().append(&entity).await?;

    let flipped = state
        .lobby_repository()
        .set_participant_status(&entity.email, ParticipantStatus::Completed)
        .await?;
    if !flipped {
        debug!(email = %entity.email, "participant already gone when recording completion");
    }
    info!(email = %entity.email, time = entity.time, quiz_id = %entity.quiz_id, "result recorded");
    Ok(entity.into())
}

/// Whether any result exists for `email`, across every quiz.
pub async fn completion_status(
    state: &SharedState,
    email: &str,
) -> Result<CompletionStatus, ServiceError> {
    let completed = state.result_repository().has_any_for(email).await?;
    Ok(CompletionStatus {
        email: email.to_string(),
        completed,
    })
}

/// Leaderboard for `quiz_id`, fastest completion first.
pub async fn leaderboard(
    state: &SharedState,
    quiz_id: &str,
) -> Result<Vec<ResultSummary>, ServiceError> {
    let results = state.result_repository().leaderboard(quiz_id).await?;
    Ok(results.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::{
            doc_store::memory::MemoryDocStore,
            models::{ParticipantEntity, ParticipantStatus},
        },
        state::AppState,
    };

    fn completion(name: &str, email: &str, time: u64) -> RecordCompletionRequest {
        RecordCompletionRequest {
            name: name.to_string(),
            email: email.to_string(),
            time,
            explanation: "A misconfigured retry budget.".to_string(),
            quiz_id: "q1".to_string(),
        }
    }

    #[tokio::test]
    async fn recording_flips_the_participant_status() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryDocStore::default()));
        let lobby_repo = state.lobby_repository();
        lobby_repo.ensure_lobby().await.unwrap();
        lobby_repo
            .upsert_participant(&ParticipantEntity {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                status: ParticipantStatus::InProgress,
            })
            .await
            .unwrap();

        record_completion(&state, completion("Ada", "ada@example.com", 42))
            .await
            .unwrap();

        assert_eq!(
            lobby_repo
                .find_participant("ada@example.com")
                .await
                .unwrap()
                .unwrap()
                .status,
            ParticipantStatus::Completed
        );
        assert!(
            completion_status(&state, "ada@example.com")
                .await
                .unwrap()
                .completed
        );
    }

    #[tokio::test]
    async fn recording_survives_a_vanished_participant() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryDocStore::default()));
        state.lobby_repository().ensure_lobby().await.unwrap();

        // No participant record exists; the result must still be stored.
        record_completion(&state, completion("Ada", "ada@example.com", 42))
            .await
            .unwrap();

        let board = leaderboard(&state, "q1").await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].email, "ada@example.com");
    }

    #[tokio::test]
    async fn leaderboard_orders_by_time_ascending() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryDocStore::default()));
        record_completion(&state, completion("Slow", "slow@example.com", 90))
            .await
            .unwrap();
        record_completion(&state, completion("Fast", "fast@example.com", 12))
            .await
            .unwrap();

        let emails: Vec<String> = leaderboard(&state, "q1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.email)
            .collect();
        assert_eq!(emails, vec!["fast@example.com", "slow@example.com"]);
    }
}
