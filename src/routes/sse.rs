use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    error::AppError,
    services::{sse_events, sse_service},
    state::SharedState,
};

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/lobby", get(lobby_stream))
        .route("/sse/lobby/participants", get(participants_stream))
        .route("/sse/participants/{email}", get(participant_stream))
        .route("/sse/results", get(results_stream))
}

#[utoipa::path(
    get,
    path = "/sse/lobby",
    tag = "sse",
    responses((status = 200, description = "Lobby document stream", content_type = "text/event-stream", body = String))
)]
/// Stream lobby document snapshots; the current state is sent on connect.
pub async fn lobby_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let watcher = state
        .lobby_repository()
        .watch_lobby()
        .await
        .map_err(crate::error::ServiceError::from)?;
    info!("new lobby SSE connection");
    Ok(sse_service::doc_stream(
        watcher,
        sse_events::lobby_encoder(),
        "lobby",
    ))
}

#[utoipa::path(
    get,
    path = "/sse/lobby/participants",
    tag = "sse",
    responses((status = 200, description = "Participant collection stream", content_type = "text/event-stream", body = String))
)]
/// Stream participant additions, status changes, and removals.
pub async fn participants_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let feed = state
        .lobby_repository()
        .participant_feed()
        .await
        .map_err(crate::error::ServiceError::from)?;
    info!("new participants SSE connection");
    Ok(sse_service::feed_stream(
        feed,
        sse_events::participant_feed_encoder(),
        "participants",
    ))
}

#[utoipa::path(
    get,
    path = "/sse/participants/{email}",
    tag = "sse",
    params(("email" = String, Path, description = "Registered participant email")),
    responses((status = 200, description = "Single participant stream", content_type = "text/event-stream", body = String))
)]
/// Stream one participant's document. A removal event on this stream is the
/// client's eviction signal.
pub async fn participant_stream(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let watcher = state
        .lobby_repository()
        .watch_participant(&email)
        .await
        .map_err(crate::error::ServiceError::from)?;
    info!(email = %email, "new participant SSE connection");
    Ok(sse_service::doc_stream(
        watcher,
        sse_events::participant_encoder(email),
        "participant",
    ))
}

#[utoipa::path(
    get,
    path = "/sse/results",
    tag = "sse",
    responses((status = 200, description = "Result feed stream", content_type = "text/event-stream", body = String))
)]
/// Stream newly recorded results as they land.
pub async fn results_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let feed = state
        .result_repository()
        .feed()
        .await
        .map_err(crate::error::ServiceError::from)?;
    info!("new results SSE connection");
    Ok(sse_service::feed_stream(
        feed,
        sse_events::result_feed_encoder(),
        "results",
    ))
}
