use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for CauseQuest Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::lobby::register,
        crate::routes::lobby::start_quiz,
        crate::routes::lobby::reset_lobby,
        crate::routes::lobby::lobby_snapshot,
        crate::routes::quiz::create_quiz,
        crate::routes::quiz::list_quizzes,
        crate::routes::quiz::get_quiz,
        crate::routes::quiz::update_quiz,
        crate::routes::quiz::delete_quiz,
        crate::routes::session::begin_session,
        crate::routes::session::session_view,
        crate::routes::session::toggle_selection,
        crate::routes::session::submit_round1,
        crate::routes::session::submit_round2,
        crate::routes::results::record_completion,
        crate::routes::results::leaderboard,
        crate::routes::results::completion_status,
        crate::routes::sse::lobby_stream,
        crate::routes::sse::participants_stream,
        crate::routes::sse::participant_stream,
        crate::routes::sse::results_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::lobby::RegisterRequest,
            crate::dto::lobby::StartQuizRequest,
            crate::dto::lobby::ParticipantSummary,
            crate::dto::lobby::LobbySnapshot,
            crate::dto::lobby::ActionResponse,
            crate::dto::quiz::CreateQuizRequest,
            crate::dto::quiz::UpdateQuizRequest,
            crate::dto::quiz::QuizSummary,
            crate::dto::session::SelectionRequest,
            crate::dto::session::Round1Submission,
            crate::dto::session::Round2Submission,
            crate::dto::session::SessionView,
            crate::dto::session::Round1Verdict,
            crate::dto::session::Round2Verdict,
            crate::dto::results::RecordCompletionRequest,
            crate::dto::results::ResultSummary,
            crate::dto::results::CompletionStatus,
            crate::dto::sse::LobbyStateEvent,
            crate::dto::sse::DocumentRemovedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "lobby", description = "Waiting lobby registration and admin control"),
        (name = "quizzes", description = "Quiz definition management"),
        (name = "sessions", description = "Per-player quiz runs"),
        (name = "results", description = "Completion records and leaderboards"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
