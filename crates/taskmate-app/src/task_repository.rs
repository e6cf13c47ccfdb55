//! Owner-scoped task collections over a key-value store.

use std::fmt;

use taskmate_core::Task;
use taskmate_store::KeyValueStore;
use tracing::{debug, info};

use crate::error::{RepositoryError, RepositoryResult};

const TASKS_KEY_PREFIX: &str = "@tasks";

/// Authenticated user's key, used to namespace persisted task collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    /// Validate and wrap an owner identifier.
    ///
    /// # Errors
    /// Returns [`RepositoryError::EmptyOwner`] for blank identifiers.
    pub fn new(raw: impl Into<String>) -> RepositoryResult<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RepositoryError::EmptyOwner);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key of this owner's task collection.
    #[must_use]
    pub fn tasks_key(&self) -> String {
        format!("{TASKS_KEY_PREFIX}:{}", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Load-all / replace-all access to task collections.
///
/// There is no per-task write: every mutation hands the full collection to
/// [`TaskRepository::replace_all`].
pub struct TaskRepository<S> {
    store: S,
}

impl<S> TaskRepository<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Load every task stored for `owner`. Nothing stored yields an empty vec.
    ///
    /// # Errors
    /// Returns an error if the store fails or the stored document is malformed.
    pub async fn load_all(&self, owner: &OwnerId) -> RepositoryResult<Vec<Task>> {
        let key = owner.tasks_key();
        let Some(raw) = self.store.get(&key).await? else {
            debug!(%owner, "No stored tasks");
            return Ok(Vec::new());
        };
        let tasks = decode_tasks(&raw).map_err(|source| RepositoryError::Decode { key, source })?;
        debug!(%owner, count = tasks.len(), "Loaded tasks");
        Ok(tasks)
    }

    /// Overwrite the stored collection for `owner` with `tasks`.
    ///
    /// # Errors
    /// Returns an error if encoding or the store write fails.
    pub async fn replace_all(&self, tasks: &[Task], owner: &OwnerId) -> RepositoryResult<()> {
        let key = owner.tasks_key();
        let body = serde_json::to_string(tasks).map_err(|source| RepositoryError::Encode {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, &body).await?;
        info!(%owner, count = tasks.len(), "Replaced task collection");
        Ok(())
    }

    /// Drop every task of `owner`.
    ///
    /// # Errors
    /// Returns an error if the store write fails.
    pub async fn clear(&self, owner: &OwnerId) -> RepositoryResult<()> {
        self.replace_all(&[], owner).await
    }

    /// Pretty-printed JSON export of the owner's tasks, as stored.
    ///
    /// # Errors
    /// Returns an error if loading or re-encoding fails.
    pub async fn export_json(&self, owner: &OwnerId) -> RepositoryResult<String> {
        let tasks = self.load_all(owner).await?;
        serde_json::to_string_pretty(&tasks).map_err(|source| RepositoryError::Encode {
            key: owner.tasks_key(),
            source,
        })
    }
}

/// Decode a stored collection; a JSON `null` document is an empty collection.
fn decode_tasks(raw: &str) -> Result<Vec<Task>, serde_json::Error> {
    let tasks: Option<Vec<Task>> = serde_json::from_str(raw)?;
    Ok(tasks.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmate_store::MemoryStore;
    use time::macros::datetime;

    fn owner(raw: &str) -> OwnerId {
        OwnerId::new(raw).unwrap_or_else(|err| panic!("owner: {err}"))
    }

    #[test]
    fn blank_owner_is_rejected() {
        assert!(matches!(OwnerId::new("  "), Err(RepositoryError::EmptyOwner)));
        assert_eq!(owner(" alice ").tasks_key(), "@tasks:alice");
    }

    #[test]
    fn null_document_decodes_as_empty() {
        let tasks = decode_tasks("null").unwrap_or_else(|err| panic!("decode: {err}"));
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn missing_collection_loads_empty() {
        let repo = TaskRepository::new(MemoryStore::new());
        let tasks = repo
            .load_all(&owner("alice"))
            .await
            .unwrap_or_else(|err| panic!("load: {err}"));
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn malformed_document_is_a_decode_error() {
        let repo = TaskRepository::new(MemoryStore::new());
        repo.store()
            .set("@tasks:alice", "{not json")
            .await
            .unwrap_or_else(|err| panic!("seed: {err}"));
        let result = repo.load_all(&owner("alice")).await;
        assert!(matches!(result, Err(RepositoryError::Decode { .. })));
    }

    #[tokio::test]
    async fn stored_form_uses_rfc3339_dates() {
        let repo = TaskRepository::new(MemoryStore::new());
        let mut task = Task::new("Dentist", datetime!(2024-03-01 10:00 UTC));
        task.due_date = Some(datetime!(2024-03-12 15:30 UTC));
        repo.replace_all(&[task], &owner("alice"))
            .await
            .unwrap_or_else(|err| panic!("replace: {err}"));

        let raw = repo
            .store()
            .get("@tasks:alice")
            .await
            .unwrap_or_else(|err| panic!("get: {err}"))
            .unwrap_or_default();
        assert!(raw.contains("\"dueDate\":\"2024-03-12T15:30:00Z\""));
        assert!(raw.contains("\"createdAt\":\"2024-03-01T10:00:00Z\""));
    }
}
