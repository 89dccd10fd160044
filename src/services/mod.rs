/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Lobby registration, start, and reset orchestration.
pub mod lobby_service;
/// Admin CRUD over quiz definitions.
pub mod quiz_service;
/// Leaderboard queries and result recording.
pub mod result_service;
/// Per-player quiz run orchestration.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
