//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
///
/// A subscription without a saved record is not an error; see
/// [`crate::FeatureStore::load`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row could not be interpreted.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Another thread panicked while holding the connection.
    #[error("store lock poisoned")]
    LockPoisoned,
}
