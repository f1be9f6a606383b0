//! File-backed key-value store.
//!
//! A single JSON object on disk, read once at open and rewritten on
//! every mutation. The [`KeyValueStore`] contract is infallible, so I/O
//! problems degrade to warnings and an in-memory-only session rather
//! than surfacing as errors.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use aegis_application::ports::KeyValueStore;

/// [`KeyValueStore`] persisted as a JSON file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileKeyValueStore {
    /// Opens the store at `path`, loading any existing contents.
    ///
    /// A missing file is a fresh store; an unreadable or corrupt file
    /// is logged and treated as empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path).await;
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Conventional per-user location for the session file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("aegis").join("session.json"))
    }

    async fn load(path: &Path) -> HashMap<String, String> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(%error, path = %path.display(), "corrupt session file, starting empty");
                    HashMap::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => {
                warn!(%error, path = %path.display(), "cannot read session file, starting empty");
                HashMap::new()
            }
        }
    }

    /// Rewrites the file from the current map. Called with the write
    /// lock held so flushes cannot interleave.
    async fn flush(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent()
            && let Err(error) = tokio::fs::create_dir_all(parent).await
        {
            warn!(%error, path = %self.path.display(), "cannot create session directory");
            return;
        }
        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(error) = tokio::fs::write(&self.path, json).await {
                    warn!(%error, path = %self.path.display(), "failed to persist session file");
                }
            }
            Err(error) => {
                warn!(%error, "failed to serialize session entries");
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await;
    }

    async fn remove(&self, key: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_values_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileKeyValueStore::open(&path).await;
        store.set("tokens", r#"{"access":"a"}"#).await;
        drop(store);

        let reopened = FileKeyValueStore::open(&path).await;
        assert_eq!(
            reopened.get("tokens").await.as_deref(),
            Some(r#"{"access":"a"}"#)
        );
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileKeyValueStore::open(&path).await;
        store.set("tokens", "value").await;
        store.remove("tokens").await;
        drop(store);

        let reopened = FileKeyValueStore::open(&path).await;
        assert_eq!(reopened.get("tokens").await, None);
    }

    #[tokio::test]
    async fn test_missing_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("session.json");

        let store = FileKeyValueStore::open(&path).await;
        store.set("k", "v").await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json at all").await.unwrap();

        let store = FileKeyValueStore::open(&path).await;
        assert_eq!(store.get("anything").await, None);

        // The store still works after discarding the corrupt contents.
        store.set("k", "v").await;
        assert_eq!(store.get("k").await.as_deref(), Some("v"));
    }
}
