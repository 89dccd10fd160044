use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use validator::Validate;

use crate::{
    dto::{
        lobby::ActionResponse,
        quiz::{CreateQuizRequest, QuizSummary, UpdateQuizRequest},
    },
    error::AppError,
    services::quiz_service,
    state::SharedState,
};

/// Quiz definition management endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/quizzes", get(list_quizzes).post(create_quiz))
        .route(
            "/quizzes/{id}",
            get(get_quiz).put(update_quiz).delete(delete_quiz),
        )
}

/// Author a new quiz definition.
#[utoipa::path(
    post,
    path = "/quizzes",
    tag = "quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizSummary),
        (status = 409, description = "A quiz with this id already exists"),
    )
)]
pub async fn create_quiz(
    State(state): State<SharedState>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<(StatusCode, Json<QuizSummary>), AppError> {
    payload.validate()?;
    let created = quiz_service::create_quiz(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List every quiz definition in creation order.
#[utoipa::path(
    get,
    path = "/quizzes",
    tag = "quizzes",
    responses((status = 200, description = "All quiz definitions", body = [QuizSummary]))
)]
pub async fn list_quizzes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuizSummary>>, AppError> {
    Ok(Json(quiz_service::list_quizzes(&state).await?))
}

/// Fetch one quiz definition by id.
#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    tag = "quizzes",
    params(("id" = String, Path, description = "Quiz identifier")),
    responses(
        (status = 200, description = "Quiz definition", body = QuizSummary),
        (status = 404, description = "Quiz not found"),
    )
)]
pub async fn get_quiz(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<QuizSummary>, AppError> {
    Ok(Json(quiz_service::get_quiz(&state, &id).await?))
}

/// Merge a partial payload into an existing quiz definition.
#[utoipa::path(
    put,
    path = "/quizzes/{id}",
    tag = "quizzes",
    params(("id" = String, Path, description = "Quiz identifier")),
    request_body = UpdateQuizRequest,
    responses(
        (status = 200, description = "Quiz updated", body = QuizSummary),
        (status = 404, description = "Quiz not found"),
    )
)]
pub async fn update_quiz(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<Json<QuizSummary>, AppError> {
    Ok(Json(quiz_service::update_quiz(&state, &id, payload).await?))
}

/// Delete a quiz definition.
#[utoipa::path(
    delete,
    path = "/quizzes/{id}",
    tag = "quizzes",
    params(("id" = String, Path, description = "Quiz identifier")),
    responses((status = 200, description = "Quiz deleted", body = ActionResponse))
)]
pub async fn delete_quiz(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(quiz_service::delete_quiz(&state, &id).await?))
}
