// Persistent key/value store: the durable surface every other module
// writes through. Values are plain strings keyed by plain strings, the
// same shape as a browser's local storage.
//
// Two backends are provided:
// - `MemoryStore`: a process-local map, used in tests and `--in-memory` runs.
// - `FileStore`: a JSON object on disk, rewritten in full on each mutation.
//
// There are no transactions. Callers that update several keys in a row
// must treat the sequence as best-effort.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::warn;

/// Failure of the underlying storage medium.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read store file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write store file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize store contents: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable string-keyed string storage.
///
/// `get` never fails: a missing or unreadable entry is reported as `None`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Starts empty and forgets everything on drop.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// On-disk layout of a `FileStore`.
#[derive(Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// JSON-file backed store.
///
/// The file is loaded once on `open` and the whole map is written back after
/// every `set`/`remove`. The in-memory map only changes once that write has
/// succeeded. A file that cannot be parsed is logged and replaced by an empty
/// map on the next write.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Default location: `~/.neteflix/store.json`, or `./.neteflix/store.json`
    /// when no home directory can be determined.
    pub fn default_path() -> PathBuf {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.join(".neteflix").join("store.json")
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StoreFile>(&raw) {
                Ok(file) => file.entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "store file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let body = serde_json::to_string_pretty(&StoreFileRef { entries })?;
        std::fs::write(&self.path, body).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    entries: &'a BTreeMap<String, String>,
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries();
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries();
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("users"), None);

        store.set("users", "[]").expect("set should succeed");
        assert_eq!(store.get("users").as_deref(), Some("[]"));

        store.set("users", "[1]").expect("overwrite should succeed");
        assert_eq!(store.get("users").as_deref(), Some("[1]"));

        store.remove("users").expect("remove should succeed");
        assert_eq!(store.get("users"), None);
    }

    #[test]
    fn removing_missing_key_is_not_an_error() {
        let store = MemoryStore::new();
        assert!(store.remove("keepLogin").is_ok());
    }

    const KEEP_LOGIN: &str = "keepLogin";

    #[test]
    fn failed_file_writes_leave_entries_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let parent = dir.path().join("data");
        let store = FileStore::open(parent.join("store.json")).expect("open");
        store.set(KEEP_LOGIN, "true").expect("first write");

        // A regular file where the parent directory used to be.
        std::fs::remove_dir_all(&parent).expect("remove parent");
        std::fs::write(&parent, "").expect("block parent");

        let err = store.set("currentUser", "a@x.com").expect_err("set must fail");
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(store.get("currentUser"), None);

        let err = store.remove(KEEP_LOGIN).expect_err("remove must fail");
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(store.get(KEEP_LOGIN).as_deref(), Some("true"));
    }

    #[test]
    fn default_path_ends_in_store_json() {
        let path = FileStore::default_path();
        assert!(path.ends_with(".neteflix/store.json"));
    }
}
