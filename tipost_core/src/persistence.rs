//! Durable shadow copy of the post store.
//!
//! The whole collection is written under one namespace key after every
//! mutation and read back once at startup. Nothing reads it during normal
//! operation.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Post;
use crate::store::Snapshot;

/// Namespace key holding the serialized state.
pub const ROOT_KEY: &str = "persist:tipost-root";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage i/o failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode persisted state: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("persisted state under {key} is malformed: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Minimal key-value storage. Methods take `&self`; implementations use
/// interior mutability where they need it.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn put(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn delete(&self, key: &str) -> Result<(), PersistenceError>;
}

/// One file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(self.path_for(key), value).map_err(io_err)
    }

    fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Process-local storage, used by tests and `--ephemeral` sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds consistent strings.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[derive(Serialize)]
struct PersistedStateRef<'a> {
    posts: &'a [Post],
}

#[derive(Deserialize)]
struct PersistedState {
    posts: Vec<Post>,
}

#[derive(Clone)]
pub struct Persistor {
    storage: Arc<dyn Storage>,
    key: String,
}

impl Persistor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_key(storage, ROOT_KEY)
    }

    pub fn with_key(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrites the stored state with `posts`.
    pub fn snapshot(&self, posts: &[Post]) -> Result<(), PersistenceError> {
        let encoded =
            serde_json::to_string(&PersistedStateRef { posts }).map_err(PersistenceError::Encode)?;
        self.storage.put(&self.key, &encoded)
    }

    /// Reads the stored state. `Ok(None)` when nothing was ever written.
    pub fn try_restore(&self) -> Result<Option<Vec<Post>>, PersistenceError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        let state: PersistedState =
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Decode {
                key: self.key.clone(),
                source,
            })?;
        Ok(Some(state.posts))
    }

    /// Startup read. Absent or unreadable state is a cold start.
    pub fn restore(&self) -> Vec<Post> {
        match self.try_restore() {
            Ok(Some(posts)) => {
                tracing::debug!(count = posts.len(), key = %self.key, "restored persisted posts");
                posts
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding persisted state");
                Vec::new()
            }
        }
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.storage.delete(&self.key)
    }

    /// Store listener that snapshots every new collection. Write failures
    /// are logged and otherwise dropped.
    pub fn listener(&self) -> impl FnMut(&Snapshot) + Send + 'static {
        let persistor = self.clone();
        move |snapshot: &Snapshot| {
            if let Err(err) = persistor.snapshot(snapshot) {
                tracing::warn!(error = %err, "failed to snapshot posts");
            }
        }
    }
}
