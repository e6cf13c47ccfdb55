//! Error types for key-value store operations.

use thiserror::Error;

/// Errors that can occur while reading or writing a store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key was empty or otherwise unusable.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Stored bytes were not valid UTF-8 text.
    #[error("Value for key {0:?} is not valid UTF-8")]
    InvalidValue(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other unclassified error.
    #[error("Other error: {0}")]
    Other(String),
}
