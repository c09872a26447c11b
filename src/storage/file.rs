//! File-backed JSON key/value store.
//!
//! Persists the whole key space as a single JSON object. Writes go through
//! a temp file + rename so a crash mid-write never leaves a corrupt store.
//! A missing or unreadable file degrades to an empty store.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::storage::kv::KvStore;

/// JSON file store with atomic writes.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Value>>,
}

impl JsonFileStore {
    /// Open (or create) a store at `path`, loading any existing contents.
    ///
    /// A corrupt or missing file yields an empty store rather than an error;
    /// the next write replaces it.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(|| {
                tracing::debug!(path = %path.display(), "starting with empty kv store");
                HashMap::new()
            });
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Open a store at the platform default location.
    #[must_use]
    pub fn open_default() -> Self {
        Self::open(default_store_path())
    }

    fn flush(&self, entries: &HashMap<String, Value>) -> Result<()> {
        let content = serde_json::to_string(entries)?;
        write_atomic(&self.path, content.as_bytes()).map_err(|e| ApiError::Storage {
            message: format!("write {}: {e}", self.path.display()),
        })
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// Platform default path for the persisted store.
#[must_use]
pub fn default_store_path() -> PathBuf {
    ProjectDirs::from("id", "emasgo", "emasgo-client").map_or_else(
        || PathBuf::from(".emasgo-client/store.json"),
        |dirs| dirs.data_dir().join("store.json"),
    )
}

fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Temp file in the same directory (required for atomic rename)
    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("store"),
        std::process::id()
    ));

    {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    std::fs::rename(&temp_path, path)
}
