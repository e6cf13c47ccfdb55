//! Error types for the persistence layer.

use taskmate_store::StoreError;
use thiserror::Error;

/// Errors raised by the task, profile and theme repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Owner identifier was blank.
    #[error("owner identifier must not be empty")]
    EmptyOwner,

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A stored document could not be decoded.
    #[error("failed to decode {key}: {source}")]
    Decode {
        /// Key whose value was malformed.
        key: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Key that was being written.
        key: String,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
