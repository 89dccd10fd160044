//! Encoders turning raw store notifications into typed SSE payloads. Each
//! encoder is a closure handed to the streaming service; malformed documents
//! are logged and skipped so one bad write cannot wedge a stream.

use serde_json::Value;
use tracing::warn;

use crate::{
    dao::{
        doc_store::CollectionChange,
        models::{LobbyEntity, ParticipantEntity, ResultEntity},
    },
    dto::{
        lobby::ParticipantSummary,
        results::ResultSummary,
        sse::{DocumentRemovedEvent, LobbyStateEvent, ServerEvent},
    },
};

/// Event name carried by lobby document updates.
pub const LOBBY_EVENT: &str = "lobby";
/// Event name carried by participant snapshots.
pub const PARTICIPANT_EVENT: &str = "participant";
/// Event name signalling a vanished document. On a participant stream this
/// is the eviction signal.
pub const REMOVED_EVENT: &str = "removed";
/// Event name carried by newly recorded results.
pub const RESULT_EVENT: &str = "result";

/// Encoder for the lobby document stream. The lobby is never deleted, so an
/// absent snapshot (store not yet seeded) emits nothing.
pub fn lobby_encoder() -> impl FnMut(Option<Value>) -> Option<ServerEvent> + Send + 'static {
    |snapshot| {
        let lobby: LobbyEntity = decode(snapshot?, "lobby")?;
        event(LOBBY_EVENT, &LobbyStateEvent::from(lobby))
    }
}

/// Encoder for one participant's document stream. A present snapshot becomes
/// a participant event; an absent one becomes the removal notice the client
/// treats as its eviction.
pub fn participant_encoder(
    email: String,
) -> impl FnMut(Option<Value>) -> Option<ServerEvent> + Send + 'static {
    move |snapshot| match snapshot {
        Some(value) => {
            let participant: ParticipantEntity = decode(value, "participant")?;
            event(PARTICIPANT_EVENT, &ParticipantSummary::from(participant))
        }
        None => event(REMOVED_EVENT, &DocumentRemovedEvent { key: email.clone() }),
    }
}

/// Encoder for the participant collection feed used by the admin lobby view.
pub fn participant_feed_encoder()
-> impl FnMut(CollectionChange) -> Option<ServerEvent> + Send + 'static {
    |change| match change.value {
        Some(value) => {
            let participant: ParticipantEntity = decode(value, "participant")?;
            event(PARTICIPANT_EVENT, &ParticipantSummary::from(participant))
        }
        None => event(REMOVED_EVENT, &DocumentRemovedEvent { key: change.key }),
    }
}

/// Encoder for the result collection feed. Results are append-only, so
/// deletions never occur and are ignored.
pub fn result_feed_encoder() -> impl FnMut(CollectionChange) -> Option<ServerEvent> + Send + 'static
{
    |change| {
        let result: ResultEntity = decode(change.value?, "result")?;
        event(RESULT_EVENT, &ResultSummary::from(result))
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, label: &'static str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            warn!(%error, document = label, "skipping malformed document on SSE stream");
            None
        }
    }
}

fn event<T: serde::Serialize>(name: &str, payload: &T) -> Option<ServerEvent> {
    match ServerEvent::json(name.to_string(), payload) {
        Ok(event) => Some(event),
        Err(error) => {
            warn!(%error, event = name, "failed to serialise SSE payload");
            None
        }
    }
}
