use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::{LobbyEntity, LobbyStatus, ParticipantEntity, ParticipantStatus};

/// Payload used to join the waiting lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Display name shown in the lobby and on the leaderboard.
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    /// Unique player identifier.
    #[validate(email)]
    pub email: String,
}

/// Admin payload selecting the quiz to start for the whole lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartQuizRequest {
    /// Identifier of the quiz definition to play.
    #[validate(length(min = 1, message = "quiz_id must not be empty"))]
    pub quiz_id: String,
}

/// Public projection of one participant record.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ParticipantSummary {
    pub name: String,
    pub email: String,
    /// Lifecycle status label (`In Lobby`, `In Progress`, `Completed`).
    pub status: String,
}

impl From<ParticipantEntity> for ParticipantSummary {
    fn from(entity: ParticipantEntity) -> Self {
        Self {
            name: entity.name,
            email: entity.email,
            status: participant_status_label(entity.status).to_string(),
        }
    }
}

/// Point-in-time view of the lobby and its participants.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbySnapshot {
    /// `waiting` or `started`.
    pub status: String,
    /// Active quiz id, present iff started.
    pub active_quiz_id: Option<String>,
    /// Participants of the current lobby generation.
    pub participants: Vec<ParticipantSummary>,
}

impl LobbySnapshot {
    /// Assemble the snapshot from the stored lobby and participant records.
    pub fn assemble(lobby: Option<LobbyEntity>, participants: Vec<ParticipantEntity>) -> Self {
        let lobby = lobby.unwrap_or_else(LobbyEntity::waiting);
        Self {
            status: lobby_status_label(lobby.status).to_string(),
            active_quiz_id: lobby.active_quiz_id,
            participants: participants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Generic acknowledgement for admin actions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

pub(crate) fn lobby_status_label(status: LobbyStatus) -> &'static str {
    match status {
        LobbyStatus::Waiting => "waiting",
        LobbyStatus::Started => "started",
    }
}

pub(crate) fn participant_status_label(status: ParticipantStatus) -> &'static str {
    match status {
        ParticipantStatus::InLobby => "In Lobby",
        ParticipantStatus::InProgress => "In Progress",
        ParticipantStatus::Completed => "Completed",
    }
}
