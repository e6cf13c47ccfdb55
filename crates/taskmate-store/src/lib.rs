//! String-keyed asynchronous storage for taskmate.
//!
//! The store is deliberately opaque: values are whole text documents, there
//! is no partial update, and every `set` replaces the previous value.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

/// Asynchronous get/set store keyed by string.
///
/// Implementations provide no cross-call locking; callers that need ordered
/// writes must await one `set` before issuing the next.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` when nothing is stored.
    ///
    /// # Errors
    /// Returns a store error when the backing medium cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// A reader never observes a partially written value.
    ///
    /// # Errors
    /// Returns a store error when the value cannot be persisted.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    /// Returns a store error when the backing medium cannot be updated.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.as_ref().get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.as_ref().set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.as_ref().remove(key).await
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey(key.to_owned()));
    }
    Ok(())
}
