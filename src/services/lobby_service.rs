//! Business logic powering the lobby routes: registration into the waiting
//! lobby, the admin start that moves every participant into the quiz at once,
//! and the reset that evicts everyone back to registration.

use tracing::info;

use crate::{
    dao::models::{LobbyStatus, ParticipantEntity, ParticipantStatus},
    dto::lobby::{ActionResponse, LobbySnapshot, ParticipantSummary, RegisterRequest, StartQuizRequest},
    error::ServiceError,
    state::SharedState,
};

/// Register (or re-register) a player into the waiting lobby.
///
/// The completion gate is checked before touching the lobby: an email that
/// already holds a result for any quiz is turned away for good. A completion
/// recorded concurrently with this check can slip through; that race is
/// accepted.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<ParticipantSummary, ServiceError> {
    if state
        .result_repository()
        .has_any_for(&request.email)
        .await?
    {
        return Err(ServiceError::AlreadyCompleted);
    }

    let lobby_repo = state.lobby_repository();
    if let Some(lobby) = lobby_repo.lobby().await?
        && lobby.status == LobbyStatus::Started
    {
        return Err(ServiceError::QuizInProgress);
    }

    let participant = ParticipantEntity {
        name: request.name,
        email: request.email,
        status: ParticipantStatus::InLobby,
    };
    lobby_repo.upsert_participant(&participant).await?;
    info!(email = %participant.email, "player joined the lobby");
    Ok(participant.into())
}

/// Start `quiz_id` for every participant currently in the lobby.
///
/// Policy guards live here, one layer above the atomic batch: a started lobby
/// rejects a second start, the quiz must exist, and an empty lobby cannot be
/// started.
pub async fn start_quiz(
    state: &SharedState,
    request: StartQuizRequest,
) -> Result<ActionResponse, ServiceError> {
    let lobby_repo = state.lobby_repository();
    if let Some(lobby) = lobby_repo.lobby().await?
        && lobby.status == LobbyStatus::Started
    {
        return Err(ServiceError::InvalidState(
            "a quiz is already started for this lobby".into(),
        ));
    }

    if state.quiz_repository().find(&request.quiz_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "quiz `{}` not found",
            request.quiz_id
        )));
    }

    let participants = lobby_repo.participants().await?;
    if participants.is_empty() {
        return Err(ServiceError::InvalidState(
            "cannot start a quiz for an empty lobby".into(),
        ));
    }

    lobby_repo.start(&request.quiz_id).await?;
    info!(
        quiz_id = %request.quiz_id,
        participants = participants.len(),
        "quiz started for the lobby"
    );
    Ok(ActionResponse {
        message: format!("quiz `{}` started", request.quiz_id),
    })
}

/// Reset the lobby to waiting, deleting every participant record.
///
/// In-memory quiz sessions are aborted as well; subscribed clients observe
/// their participant document vanish and treat that as the eviction signal.
pub async fn reset_lobby(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    state.lobby_repository().reset().await?;
    for mut entry in state.sessions().iter_mut() {
        entry.value_mut().evict();
    }
    info!("lobby reset to waiting");
    Ok(ActionResponse {
        message: "lobby reset".to_string(),
    })
}

/// Point-in-time view of the lobby and its participants.
pub async fn lobby_snapshot(state: &SharedState) -> Result<LobbySnapshot, ServiceError> {
    let lobby_repo = state.lobby_repository();
    let lobby = lobby_repo.lobby().await?;
    let participants = lobby_repo.participants().await?;
    Ok(LobbySnapshot::assemble(lobby, participants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::{doc_store::memory::MemoryDocStore, models::QuizEntity},
        state::{AppState, SessionPhase, session::QuizSession},
    };

    async fn test_state() -> SharedState {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryDocStore::default()));
        state.lobby_repository().ensure_lobby().await.unwrap();
        state
    }

    fn quiz() -> QuizEntity {
        QuizEntity {
            passage: "The cache hit rate collapsed overnight.".to_string(),
            root_causes: (0..10).map(|i| format!("cause-{i}")).collect(),
            correct_root_cause: "cause-3".to_string(),
            explanation: "An eviction policy change.".to_string(),
        }
    }

    fn join(name: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn registration_is_rejected_after_a_recorded_completion() {
        let state = test_state().await;
        let completed = crate::dao::models::ResultEntity {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            time: 42,
            explanation: "x".to_string(),
            quiz_id: "some-old-quiz".to_string(),
            completed_at: std::time::SystemTime::now(),
        };
        state.result_repository().append(&completed).await.unwrap();

        let err = register(&state, join("Ada", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyCompleted));
    }

    #[tokio::test]
    async fn registration_is_rejected_while_a_quiz_runs() {
        let state = test_state().await;
        state.quiz_repository().save("q1", &quiz()).await.unwrap();
        register(&state, join("Ada", "ada@example.com"))
            .await
            .unwrap();
        start_quiz(
            &state,
            StartQuizRequest {
                quiz_id: "q1".to_string(),
            },
        )
        .await
        .unwrap();

        let err = register(&state, join("Brian", "brian@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::QuizInProgress));
    }

    #[tokio::test]
    async fn start_requires_an_existing_quiz_and_a_non_empty_lobby() {
        let state = test_state().await;
        let request = || StartQuizRequest {
            quiz_id: "q1".to_string(),
        };

        let err = start_quiz(&state, request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        state.quiz_repository().save("q1", &quiz()).await.unwrap();
        let err = start_quiz(&state, request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        register(&state, join("Ada", "ada@example.com"))
            .await
            .unwrap();
        start_quiz(&state, request()).await.unwrap();

        // Second start against a started lobby is refused.
        let err = start_quiz(&state, request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn reset_evicts_in_memory_sessions_and_clears_the_lobby() {
        let state = test_state().await;
        state.quiz_repository().save("q1", &quiz()).await.unwrap();
        register(&state, join("Ada", "ada@example.com"))
            .await
            .unwrap();
        start_quiz(
            &state,
            StartQuizRequest {
                quiz_id: "q1".to_string(),
            },
        )
        .await
        .unwrap();

        let mut session = QuizSession::new("q1", &quiz());
        session.begin().unwrap();
        state
            .sessions()
            .insert("ada@example.com".to_string(), session);

        reset_lobby(&state).await.unwrap();

        let snapshot = lobby_snapshot(&state).await.unwrap();
        assert_eq!(snapshot.status, "waiting");
        assert!(snapshot.participants.is_empty());
        assert_eq!(
            *state
                .sessions()
                .get("ada@example.com")
                .unwrap()
                .value()
                .phase(),
            SessionPhase::Evicted
        );
    }
}
