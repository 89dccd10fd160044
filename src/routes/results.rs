use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::results::{CompletionStatus, RecordCompletionRequest, ResultSummary},
    error::AppError,
    services::result_service,
    state::SharedState,
};

/// Result recording and leaderboard endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/results", post(record_completion))
        .route("/results/leaderboard/{quiz_id}", get(leaderboard))
        .route("/results/completed/{email}", get(completion_status))
}

/// Record one completed quiz run.
#[utoipa::path(
    post,
    path = "/results",
    tag = "results",
    request_body = RecordCompletionRequest,
    responses((status = 201, description = "Result recorded", body = ResultSummary))
)]
pub async fn record_completion(
    State(state): State<SharedState>,
    Json(payload): Json<RecordCompletionRequest>,
) -> Result<(StatusCode, Json<ResultSummary>), AppError> {
    payload.validate()?;
    let recorded = result_service::record_completion(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Leaderboard for one quiz, fastest completion first.
#[utoipa::path(
    get,
    path = "/results/leaderboard/{quiz_id}",
    tag = "results",
    params(("quiz_id" = String, Path, description = "Quiz identifier")),
    responses((status = 200, description = "Ordered results", body = [ResultSummary]))
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<Vec<ResultSummary>>, AppError> {
    Ok(Json(result_service::leaderboard(&state, &quiz_id).await?))
}

/// Whether an email has ever completed a quiz. Drives the registration gate.
#[utoipa::path(
    get,
    path = "/results/completed/{email}",
    tag = "results",
    params(("email" = String, Path, description = "Player email")),
    responses((status = 200, description = "Completion status", body = CompletionStatus))
)]
pub async fn completion_status(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<CompletionStatus>, AppError> {
    Ok(Json(
        result_service::completion_status(&state, &email).await?,
    ))
}
