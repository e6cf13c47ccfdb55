use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use lru::LruCache;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{KeyValueStore, StoreError, validate_key};

const VALUE_CACHE_CAPACITY: usize = 64;
const VALUE_EXTENSION: &str = "json";

/// Store keeping one file per key under a data directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// concurrent reader sees either the old or the new document.
pub struct FileStore {
    root: PathBuf,
    cache: Mutex<LruCache<String, Option<String>>>,
    write_seq: AtomicU64,
}

impl FileStore {
    /// Open (creating if needed) the data directory at `root`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        let capacity = NonZeroUsize::new(VALUE_CACHE_CAPACITY)
            .ok_or_else(|| StoreError::Other("cache capacity must be non-zero".into()))?;
        debug!(root = %root.display(), "Opened file store");
        Ok(Self {
            root,
            cache: Mutex::new(LruCache::new(capacity)),
            write_seq: AtomicU64::new(0),
        })
    }

    /// Directory holding the value files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name for a key; keys may contain characters that are not valid in paths.
    fn path_for(&self, key: &str) -> PathBuf {
        let encoded = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.root.join(format!("{encoded}.{VALUE_EXTENSION}"))
    }

    fn cached(&self, key: &str) -> Option<Option<String>> {
        self.cache
            .lock()
            .ok()
            .and_then(|mut cache| cache.get(key).cloned())
    }

    fn remember(&self, key: &str, value: Option<String>) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key.to_owned(), value);
        }
    }

    async fn read_from_disk(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StoreError::InvalidValue(key.to_owned())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::IoError(err)),
        }
    }
}

async fn write_staged(staging: &Path, target: &Path, value: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(staging).await?;
    file.write_all(value.as_bytes()).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(staging, target).await
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        if let Some(hit) = self.cached(key) {
            return Ok(hit);
        }
        let value = self.read_from_disk(key).await?;
        self.remember(key, value.clone());
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let path = self.path_for(key);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let staging =
            path.with_extension(format!("{VALUE_EXTENSION}.tmp-{}-{seq}", std::process::id()));

        if let Err(err) = write_staged(&staging, &path, value).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StoreError::IoError(err));
        }

        self.remember(key, Some(value.to_owned()));
        debug!(key, path = %path.display(), bytes = value.len(), "Wrote value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(StoreError::IoError(err)),
        }
        self.remember(key, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("create temp dir: {err}"));
        let store = FileStore::open(dir.path())
            .await
            .unwrap_or_else(|err| panic!("open store: {err}"));
        (dir, store)
    }

    #[tokio::test]
    async fn keys_map_to_distinct_safe_file_names() {
        let (_dir, store) = open_store().await;
        let a = store.path_for("@tasks:alice/../bob");
        let b = store.path_for("@tasks:alice");
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(store.root()));
    }

    #[tokio::test]
    async fn set_leaves_no_staging_files_behind() {
        let (dir, store) = open_store().await;
        store
            .set("@tasks:alice", "[]")
            .await
            .unwrap_or_else(|err| panic!("set: {err}"));
        let mut entries = std::fs::read_dir(dir.path())
            .unwrap_or_else(|err| panic!("read dir: {err}"))
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        entries.sort();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with(".json"));
    }

    #[tokio::test]
    async fn failed_set_removes_its_staging_file() {
        let (dir, store) = open_store().await;
        let target = store.path_for("@tasks:alice");
        std::fs::create_dir(&target).unwrap_or_else(|err| panic!("mkdir: {err}"));
        std::fs::write(target.join("occupied"), b"x").unwrap_or_else(|err| panic!("write: {err}"));

        assert!(store.set("@tasks:alice", "[]").await.is_err());

        let entries = std::fs::read_dir(dir.path())
            .unwrap_or_else(|err| panic!("read dir: {err}"))
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect::<Vec<_>>();
        assert_eq!(entries, vec![target]);
    }
}
