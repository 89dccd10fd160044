use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying engine.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored document does not match the strict schema expected on read.
    #[error("malformed document `{collection}/{key}`")]
    Malformed {
        collection: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a malformed-document error for a failed schema decode.
    pub fn malformed(collection: &str, key: &str, source: serde_json::Error) -> Self {
        StorageError::Malformed {
            collection: collection.to_string(),
            key: key.to_string(),
            source,
        }
    }
}
