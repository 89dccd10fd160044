use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use validator::Validate;

use crate::{
    dto::session::{
        Round1Submission, Round1Verdict, Round2Submission, Round2Verdict, SelectionRequest,
        SessionView,
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Per-player quiz run endpoints, keyed by participant email.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route(
            "/sessions/{email}",
            post(begin_session).get(session_view),
        )
        .route("/sessions/{email}/selection", put(toggle_selection))
        .route("/sessions/{email}/round1", post(submit_round1))
        .route("/sessions/{email}/round2", post(submit_round2))
}

/// Enter the started quiz, creating a fresh session with a running timer.
#[utoipa::path(
    post,
    path = "/sessions/{email}",
    tag = "sessions",
    params(("email" = String, Path, description = "Registered participant email")),
    responses(
        (status = 200, description = "Session started", body = SessionView),
        (status = 404, description = "Participant or quiz not found"),
        (status = 409, description = "No quiz has been started"),
    )
)]
pub async fn begin_session(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::begin(&state, &email).await?))
}

/// Current view of the player's run. Reports an evicted run exactly once.
#[utoipa::path(
    get,
    path = "/sessions/{email}",
    tag = "sessions",
    params(("email" = String, Path, description = "Registered participant email")),
    responses(
        (status = 200, description = "Session view", body = SessionView),
        (status = 404, description = "No active session for this email"),
    )
)]
pub async fn session_view(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::view(&state, &email).await?))
}

/// Toggle one cause in the current round.
#[utoipa::path(
    put,
    path = "/sessions/{email}/selection",
    tag = "sessions",
    params(("email" = String, Path, description = "Registered participant email")),
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Updated session view", body = SessionView),
        (status = 400, description = "Cause is not a candidate in this round"),
    )
)]
pub async fn toggle_selection(
    State(state): State<SharedState>,
    Path(email): Path<String>,
    Json(payload): Json<SelectionRequest>,
) -> Result<Json<SessionView>, AppError> {
    payload.validate()?;
    Ok(Json(
        session_service::toggle_selection(&state, &email, payload).await?,
    ))
}

/// Submit the round-1 narrowing of ten causes down to five.
#[utoipa::path(
    post,
    path = "/sessions/{email}/round1",
    tag = "sessions",
    params(("email" = String, Path, description = "Registered participant email")),
    request_body = Round1Submission,
    responses(
        (status = 200, description = "Round 1 verdict", body = Round1Verdict),
        (status = 400, description = "Submission is not five distinct candidates"),
    )
)]
pub async fn submit_round1(
    State(state): State<SharedState>,
    Path(email): Path<String>,
    Json(payload): Json<Round1Submission>,
) -> Result<Json<Round1Verdict>, AppError> {
    payload.validate()?;
    Ok(Json(
        session_service::submit_round1(&state, &email, payload).await?,
    ))
}

/// Submit the single round-2 answer.
#[utoipa::path(
    post,
    path = "/sessions/{email}/round2",
    tag = "sessions",
    params(("email" = String, Path, description = "Registered participant email")),
    request_body = Round2Submission,
    responses(
        (status = 200, description = "Round 2 verdict", body = Round2Verdict),
        (status = 400, description = "Choice is not a round-2 candidate"),
    )
)]
pub async fn submit_round2(
    State(state): State<SharedState>,
    Path(email): Path<String>,
    Json(payload): Json<Round2Submission>,
) -> Result<Json<Round2Verdict>, AppError> {
    payload.validate()?;
    Ok(Json(
        session_service::submit_round2(&state, &email, payload).await?,
    ))
}
