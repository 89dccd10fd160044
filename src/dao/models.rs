use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Lifecycle status stored on the singleton lobby document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LobbyStatus {
    /// Players can join; no quiz is running.
    Waiting,
    /// A quiz is in progress for everyone who was in the lobby.
    Started,
}

/// Status of one registered player within the current lobby generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantStatus {
    /// Registered and waiting for the admin to start a quiz.
    #[serde(rename = "In Lobby")]
    InLobby,
    /// Moved into the quiz by a lobby start.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Finished the quiz; a result record exists.
    #[serde(rename = "Completed")]
    Completed,
}

/// The single shared lobby document. Never deleted; a reset rewrites it to
/// waiting with no active quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEntity {
    /// Whether a quiz is currently in progress.
    pub status: LobbyStatus,
    /// Reference to the active quiz definition, present iff started.
    pub active_quiz_id: Option<String>,
}

impl LobbyEntity {
    /// The lobby state between quiz runs.
    pub fn waiting() -> Self {
        Self {
            status: LobbyStatus::Waiting,
            active_quiz_id: None,
        }
    }

    /// The lobby state while `quiz_id` is being played.
    pub fn started(quiz_id: &str) -> Self {
        Self {
            status: LobbyStatus::Started,
            active_quiz_id: Some(quiz_id.to_string()),
        }
    }
}

/// A registered player's membership record, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntity {
    /// Display name shown in the lobby and on the leaderboard.
    pub name: String,
    /// Unique identifier; doubles as the document key.
    pub email: String,
    /// Position in the participant lifecycle.
    pub status: ParticipantStatus,
}

/// An admin-authored quiz definition. The document key is the quiz id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizEntity {
    /// Narrative text shown during round 1.
    pub passage: String,
    /// Exactly ten distinct candidate root causes, in presentation order.
    pub root_causes: Vec<String>,
    /// The correct cause; string-identical to one of `root_causes`.
    pub correct_root_cause: String,
    /// Text revealed after a successful run.
    pub explanation: String,
}

/// Durable record of one completed quiz run. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntity {
    /// Player display name at completion time.
    pub name: String,
    /// Player email.
    pub email: String,
    /// Elapsed whole seconds from round-1 entry to the correct final answer.
    pub time: u64,
    /// Explanation text shown on the results screen.
    pub explanation: String,
    /// Quiz the run was played against.
    pub quiz_id: String,
    /// Server-assigned completion timestamp.
    pub completed_at: SystemTime,
}
