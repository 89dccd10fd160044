use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::{
    dao::models::LobbyEntity,
    dto::lobby::lobby_status_label,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE streams.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Broadcast whenever the lobby document changes.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbyStateEvent {
    /// `waiting` or `started`.
    pub status: String,
    /// Active quiz id, present iff started.
    pub active_quiz_id: Option<String>,
}

impl From<LobbyEntity> for LobbyStateEvent {
    fn from(lobby: LobbyEntity) -> Self {
        Self {
            status: lobby_status_label(lobby.status).to_string(),
            active_quiz_id: lobby.active_quiz_id,
        }
    }
}

/// Emitted when a subscribed document vanished. On a participant stream this
/// is the eviction signal: the client must drop its cached session state and
/// navigate back to registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentRemovedEvent {
    /// Key of the document that disappeared.
    pub key: String,
}
