//! Key-value persistence
//!
//! All user-visible state (profile, progress, attempt history) lives in a
//! flat string-keyed store of JSON values, one record per key, overwritten
//! wholesale on every save. There are no partial updates and no
//! migrations; replacing a value is the only write operation. The store
//! behind the trait is a single JSON file in the platform data directory,
//! with an in-memory twin for tests.

pub mod backup;
pub mod profile;
pub mod progress;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Fixed record keys
pub mod keys {
    /// The signed-in user profile
    pub const PROFILE: &str = "pteprep.profile";
    /// Per-task practice progress
    pub const PROGRESS: &str = "pteprep.progress";
    /// Chronological attempt history
    pub const HISTORY: &str = "pteprep.history";
}

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write store file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A flat string-keyed store of JSON values
pub trait KeyValueStore {
    /// The raw JSON string under a key
    fn get(&self, key: &str) -> Option<String>;

    /// Replace the value under a key wholesale
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Drop a key entirely
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// All present keys, sorted
    fn keys(&self) -> Vec<String>;
}

/// Load a typed record from a key; a missing key is `None`, a corrupt
/// value is an error
pub fn load_record<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key) {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize a record and overwrite its key
pub fn save_record<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    record: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(record)?;
    store.set(key, raw)
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// File-backed store: one JSON object file, rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or create) the store at a path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&contents)?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.display().to_string(),
                source,
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents).map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
    }

    #[test]
    fn memory_store_round_trips_records() {
        let mut store = MemoryStore::new();
        let record = Record { name: "a".into(), count: 3 };

        save_record(&mut store, "k", &record).unwrap();
        let back: Option<Record> = load_record(&store, "k").unwrap();
        assert_eq!(back, Some(record));
    }

    #[test]
    fn missing_key_loads_as_none() {
        let store = MemoryStore::new();
        let got: Option<Record> = load_record(&store, "absent").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn corrupt_value_is_an_error_not_a_panic() {
        let mut store = MemoryStore::new();
        store.set("k", "not json".into()).unwrap();
        let got: Result<Option<Record>, _> = load_record(&store, "k");
        assert!(got.is_err());
    }

    #[test]
    fn set_overwrites_wholesale() {
        let mut store = MemoryStore::new();
        save_record(&mut store, "k", &Record { name: "a".into(), count: 1 }).unwrap();
        save_record(&mut store, "k", &Record { name: "b".into(), count: 2 }).unwrap();

        let back: Option<Record> = load_record(&store, "k").unwrap();
        assert_eq!(back, Some(Record { name: "b".into(), count: 2 }));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        {
            let mut store = FileStore::open(&path).unwrap();
            save_record(&mut store, keys::PROFILE, &Record { name: "me".into(), count: 0 })
                .unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        let back: Option<Record> = load_record(&store, keys::PROFILE).unwrap();
        assert_eq!(back, Some(Record { name: "me".into(), count: 0 }));
    }

    #[test]
    fn file_store_remove_deletes_the_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("k", "1".into()).unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").is_none());

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get("k").is_none());
    }

    #[test]
    fn keys_are_sorted() {
        let mut store = MemoryStore::new();
        store.set("b", "1".into()).unwrap();
        store.set("a", "1".into()).unwrap();
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
    }
}
