//! Orchestration of per-player quiz runs. Sessions live in the in-memory
//! registry on [`crate::state::AppState`]; the store is only consulted when a
//! run begins, to check lobby membership and resolve the active quiz.

use dashmap::mapref::one::RefMut;
use tracing::info;

use crate::{
    dao::models::LobbyStatus,
    dto::session::{Round1Submission, Round1Verdict, Round2Submission, Round2Verdict, SelectionRequest, SessionView},
    error::ServiceError,
    state::{Round1Outcome, Round2Outcome, SessionPhase, SharedState, session::QuizSession},
};

/// Enter the quiz for `email`, creating a fresh session and starting its
/// timer. Requires a started lobby, a registered participant, and a
/// resolvable active quiz. Re-entering replaces any previous session for the
/// same email.
pub async fn begin(state: &SharedState, email: &str) -> Result<SessionView, ServiceError> {
    let lobby_repo = state.lobby_repository();
    let lobby = lobby_repo.lobby().await?;
    let quiz_id = match lobby {
        Some(lobby) if lobby.status == LobbyStatus::Started => {
            lobby.active_quiz_id.ok_or_else(|| {
                ServiceError::InvalidState("the started lobby has no active quiz".into())
            })?
        }
        _ => {
            return Err(ServiceError::InvalidState(
                "no quiz has been started for the lobby".into(),
            ));
        }
    };

    if lobby_repo.find_participant(email).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "`{email}` is not registered in the lobby"
        )));
    }

    let quiz = state
        .quiz_repository()
        .find(&quiz_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{quiz_id}` not found")))?;

    let mut session = QuizSession::new(&quiz_id, &quiz);
    session.begin()?;
    let view = SessionView::project(email, &session);
    state.sessions().insert(email.to_string(), session);
    info!(email, quiz_id = %quiz_id, "quiz session started");
    Ok(view)
}

/// Current view of the session for `email`.
///
/// An evicted session is reported exactly once: the view still says
/// `evicted`, but the registry entry is dropped so the next call is a clean
/// not-found and the client returns to registration.
pub async fn view(state: &SharedState, email: &str) -> Result<SessionView, ServiceError> {
    let evicted;
    let view;
    {
        let entry = state
            .sessions()
            .get(email)
            .ok_or_else(|| no_session(email))?;
        view = SessionView::project(email, entry.value());
        evicted = *entry.value().phase() == SessionPhase::Evicted;
    }
    if evicted {
        state.sessions().remove(email);
    }
    Ok(view)
}

/// Toggle one cause in the current round and return the updated view.
pub async fn toggle_selection(
    state: &SharedState,
    email: &str,
    request: SelectionRequest,
) -> Result<SessionView, ServiceError> {
    let mut entry = session_mut(state, email)?;
    entry.value_mut().toggle(&request.cause)?;
    Ok(SessionView::project(email, entry.value()))
}

/// Submit the round-1 narrowing of ten causes down to five.
pub async fn submit_round1(
    state: &SharedState,
    email: &str,
    request: Round1Submission,
) -> Result<Round1Verdict, ServiceError> {
    let mut entry = session_mut(state, email)?;
    match entry.value_mut().submit_round1(request.selection)? {
        Round1Outcome::Advanced { candidates } => Ok(Round1Verdict {
            correct: true,
            candidates: Some(candidates),
        }),
        Round1Outcome::Missed => Ok(Round1Verdict {
            correct: false,
            candidates: None,
        }),
    }
}

/// Submit the single round-2 answer.
pub async fn submit_round2(
    state: &SharedState,
    email: &str,
    request: Round2Submission,
) -> Result<Round2Verdict, ServiceError> {
    let mut entry = session_mut(state, email)?;
    match entry.value_mut().submit_round2(&request.choice)? {
        Round2Outcome::Completed { time, explanation } => {
            info!(email, time, "quiz run completed");
            Ok(Round2Verdict {
                correct: true,
                time: Some(time),
                explanation: Some(explanation),
            })
        }
        Round2Outcome::Missed => Ok(Round2Verdict {
            correct: false,
            time: None,
            explanation: None,
        }),
    }
}

fn session_mut<'a>(
    state: &'a SharedState,
    email: &str,
) -> Result<RefMut<'a, String, QuizSession>, ServiceError> {
    state
        .sessions()
        .get_mut(email)
        .ok_or_else(|| no_session(email))
}

fn no_session(email: &str) -> ServiceError {
    ServiceError::NotFound(format!("no active quiz session for `{email}`"))
}
