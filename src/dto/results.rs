use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::ResultEntity, dto::format_system_time};

/// Payload recording one completed quiz run. The calling surface guarantees
/// at-most-one invocation per client session; the recorder itself does not
/// deduplicate.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RecordCompletionRequest {
    /// Player display name.
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    /// Player email.
    #[validate(email)]
    pub email: String,
    /// Elapsed whole seconds reported by the completed session.
    pub time: u64,
    /// Explanation text shown on the results screen.
    pub explanation: String,
    /// Quiz the run was played against.
    #[validate(length(min = 1, message = "quiz_id must not be empty"))]
    pub quiz_id: String,
}

/// Public projection of one stored result.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultSummary {
    pub name: String,
    pub email: String,
    /// Elapsed whole seconds.
    pub time: u64,
    /// Explanation text carried from the quiz definition.
    pub explanation: String,
    pub quiz_id: String,
    /// RFC 3339 completion timestamp, server-assigned.
    pub completed_at: String,
}

impl From<ResultEntity> for ResultSummary {
    fn from(entity: ResultEntity) -> Self {
        Self {
            name: entity.name,
            email: entity.email,
            time: entity.time,
            explanation: entity.explanation,
            quiz_id: entity.quiz_id,
            completed_at: format_system_time(entity.completed_at),
        }
    }
}

/// Answer to the registration-gate lookup for one email.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompletionStatus {
    pub email: String,
    /// Whether any result exists for the email, across every quiz.
    pub completed: bool,
}
