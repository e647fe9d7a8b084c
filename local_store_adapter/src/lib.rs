use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Poisoned,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Store I/O error: {e}"),
            StoreError::Serde(e) => write!(f, "Store serialization error: {e}"),
            StoreError::Poisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError::Io(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Serde(error)
    }
}

/// A file-persisted key-value store of self-describing JSON records.
///
/// Keys are plain strings, values are arbitrary JSON. The whole store is one
/// JSON object on disk, loaded on open and written through on every mutation.
/// All access is serialized through an internal mutex.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl LocalStore {
    /// Open a store backed by the given file. An absent or unreadable file
    /// yields an empty store; a corrupt file is discarded rather than
    /// propagated, matching browser storage semantics.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<BTreeMap<String, Value>>(&raw).ok())
            .unwrap_or_default();

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Set a key and persist the store.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing file cannot be written.
    pub fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value);
        self.save(&entries)
    }

    /// Remove a key and persist the store. Returns the removed value.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing file cannot be written.
    pub fn remove(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let removed = entries.remove(key);
        if removed.is_some() {
            self.save(&entries)?;
        }
        Ok(removed)
    }

    /// Read a key as an array, treating absent or non-array values as empty.
    pub fn get_array(&self, key: &str) -> Vec<Value> {
        match self.get(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }

    /// Append a record to the array under `key`, creating it if needed.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing file cannot be written.
    pub fn push(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        match entries.get_mut(key) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                entries.insert(key.to_string(), Value::Array(vec![value]));
            }
        }
        self.save(&entries)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save(&self, entries: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
