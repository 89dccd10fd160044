use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::lobby::{ActionResponse, LobbySnapshot, ParticipantSummary, RegisterRequest, StartQuizRequest},
    error::AppError,
    services::lobby_service,
    state::SharedState,
};

/// Lobby registration and admin control endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/lobby", get(lobby_snapshot))
        .route("/lobby/register", post(register))
        .route("/lobby/start", post(start_quiz))
        .route("/lobby/reset", post(reset_lobby))
}

/// Join the waiting lobby (or refresh an existing registration).
#[utoipa::path(
    post,
    path = "/lobby/register",
    tag = "lobby",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered into the lobby", body = ParticipantSummary),
        (status = 409, description = "A quiz is running or the email already completed one"),
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ParticipantSummary>, AppError> {
    payload.validate()?;
    Ok(Json(lobby_service::register(&state, payload).await?))
}

/// Start a quiz for every participant currently in the lobby.
#[utoipa::path(
    post,
    path = "/lobby/start",
    tag = "lobby",
    request_body = StartQuizRequest,
    responses(
        (status = 200, description = "Quiz started", body = ActionResponse),
        (status = 404, description = "Quiz definition not found"),
        (status = 409, description = "Lobby already started or empty"),
    )
)]
pub async fn start_quiz(
    State(state): State<SharedState>,
    Json(payload): Json<StartQuizRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(lobby_service::start_quiz(&state, payload).await?))
}

/// Reset the lobby to waiting, evicting every participant.
#[utoipa::path(
    post,
    path = "/lobby/reset",
    tag = "lobby",
    responses((status = 200, description = "Lobby reset", body = ActionResponse))
)]
pub async fn reset_lobby(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(lobby_service::reset_lobby(&state).await?))
}

/// Current lobby state with its participant list.
#[utoipa::path(
    get,
    path = "/lobby",
    tag = "lobby",
    responses((status = 200, description = "Lobby snapshot", body = LobbySnapshot))
)]
pub async fn lobby_snapshot(
    State(state): State<SharedState>,
) -> Result<Json<LobbySnapshot>, AppError> {
    Ok(Json(lobby_service::lobby_snapshot(&state).await?))
}
