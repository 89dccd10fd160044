//! Admin CRUD over quiz definitions. Create and update validate the content
//! invariants (ten distinct causes containing the correct one) before any
//! store write; partial updates are merged read-modify-write so the merged
//! definition can be validated as a whole.

use tracing::info;

use crate::{
    dao::models::QuizEntity,
    dto::{
        lobby::ActionResponse,
        quiz::{CreateQuizRequest, QuizSummary, UpdateQuizRequest},
        validation::validate_root_causes,
    },
    error::ServiceError,
    state::SharedState,
};

/// Create a quiz under its admin-chosen id. An already-taken id is refused.
pub async fn create_quiz(
    state: &SharedState,
    request: CreateQuizRequest,
) -> Result<QuizSummary, ServiceError> {
    let repo = state.quiz_repository();
    if repo.find(&request.id).await?.is_some() {
        return Err(ServiceError::DuplicateId);
    }

    let id = request.id.clone();
    let quiz: QuizEntity = request.into();
    repo.save(&id, &quiz).await?;
    info!(quiz_id = %id, "quiz created");
    Ok((id, quiz).into())
}

/// Fetch one quiz definition by id.
pub async fn get_quiz(state: &SharedState, id: &str) -> Result<QuizSummary, ServiceError> {
    let quiz = state
        .quiz_repository()
        .find(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok((id.to_string(), quiz).into())
}

/// All quiz definitions, in creation order.
pub async fn list_quizzes(state: &SharedState) -> Result<Vec<QuizSummary>, ServiceError> {
    let quizzes = state.quiz_repository().list().await?;
    Ok(quizzes.into_iter().map(Into::into).collect())
}

/// Merge a partial payload into an existing quiz. The merged definition is
/// re-validated before it replaces the stored one, so an update can never
/// leave a quiz unplayable.
pub async fn update_quiz(
    state: &SharedState,
    id: &str,
    request: UpdateQuizRequest,
) -> Result<QuizSummary, ServiceError> {
    let repo = state.quiz_repository();
    let existing = repo.find(id).await?.ok_or_else(|| not_found(id))?;

    let merged = request.apply(&existing);
    validate_root_causes(&merged.root_causes, &merged.correct_root_cause)
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
    if merged.passage.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "passage must not be empty".into(),
        ));
    }

    repo.save(id, &merged).await?;
    info!(quiz_id = %id, "quiz updated");
    Ok((id.to_string(), merged).into())
}

/// Delete the quiz stored under `id`. Deleting a missing id is a no-op, as
/// with the underlying store.
pub async fn delete_quiz(state: &SharedState, id: &str) -> Result<ActionResponse, ServiceError> {
    state.quiz_repository().delete(id).await?;
    info!(quiz_id = %id, "quiz deleted");
    Ok(ActionResponse {
        message: format!("quiz `{id}` deleted"),
    })
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("quiz `{id}` not found"))
}
