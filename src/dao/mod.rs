/// Narrow document-store contract and the in-process engine.
pub mod doc_store;
/// Lobby document and participant collection access.
pub mod lobby;
/// Database model definitions.
pub mod models;
/// Quiz definition collection access.
pub mod quizzes;
/// Quiz result collection access.
pub mod results;
/// Storage abstraction layer for database operations.
pub mod storage;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::dao::storage::{StorageError, StorageResult};

/// Decode a stored document against its strict schema.
pub(crate) fn decode_document<T: DeserializeOwned>(
    collection: &str,
    key: &str,
    value: Value,
) -> StorageResult<T> {
    serde_json::from_value(value).map_err(|source| StorageError::malformed(collection, key, source))
}

/// Encode an entity into its stored JSON shape.
pub(crate) fn encode_document<T: Serialize>(
    collection: &str,
    key: &str,
    entity: &T,
) -> StorageResult<Value> {
    serde_json::to_value(entity).map_err(|source| StorageError::malformed(collection, key, source))
}
