use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::state::session::{QuizSession, SessionPhase};

/// Payload toggling one cause in the current round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectionRequest {
    /// The cause to toggle (round 1) or choose (round 2).
    #[validate(length(min = 1, message = "cause must not be empty"))]
    pub cause: String,
}

/// Round-1 submission carrying the narrowed-down selection.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct Round1Submission {
    /// Exactly five distinct causes, in selection order.
    #[validate(length(min = 5, max = 5, message = "round 1 requires exactly 5 causes"))]
    pub selection: Vec<String>,
}

/// Round-2 submission carrying the single final answer.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct Round2Submission {
    /// The cause picked as the root cause.
    #[validate(length(min = 1, message = "choice must not be empty"))]
    pub choice: String,
}

/// Snapshot of one player's quiz run served to their client.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    /// Participant email owning the session.
    pub email: String,
    /// Quiz definition being played.
    pub quiz_id: String,
    /// Phase label (`awaiting_start`, `round1`, `round2`, `completed`,
    /// `evicted`).
    pub phase: String,
    /// Narrative passage for round 1.
    pub passage: String,
    /// Candidates offered by the current round.
    pub candidates: Vec<String>,
    /// Causes currently toggled on, in selection order.
    pub selection: Vec<String>,
    /// Running (or final) elapsed whole seconds.
    pub elapsed_seconds: u64,
}

impl SessionView {
    /// Project a session into its client-facing view. The correct cause is
    /// deliberately never part of this projection.
    pub fn project(email: &str, session: &QuizSession) -> Self {
        Self {
            email: email.to_string(),
            quiz_id: session.quiz_id().to_string(),
            phase: phase_label(session.phase()).to_string(),
            passage: session.passage().to_string(),
            candidates: session.candidates().to_vec(),
            selection: session.selection().to_vec(),
            elapsed_seconds: session.elapsed_seconds(),
        }
    }
}

/// Verdict returned for a round-1 submission.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct Round1Verdict {
    /// Whether the correct cause was inside the submitted five.
    pub correct: bool,
    /// The round-2 candidate set, present only on a correct verdict.
    pub candidates: Option<Vec<String>>,
}

/// Verdict returned for a round-2 submission.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct Round2Verdict {
    /// Whether the submitted cause was the correct one.
    pub correct: bool,
    /// Final elapsed whole seconds, present only on completion.
    pub time: Option<u64>,
    /// Quiz explanation, present only on completion.
    pub explanation: Option<String>,
}

pub(crate) fn phase_label(phase: &SessionPhase) -> &'static str {
    match phase {
        SessionPhase::AwaitingStart => "awaiting_start",
        SessionPhase::Round1 => "round1",
        SessionPhase::Round2 => "round2",
        SessionPhase::Completed => "completed",
        SessionPhase::Evicted => "evicted",
    }
}
