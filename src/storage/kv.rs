//! Key/value store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::Result;

/// String-keyed JSON value store.
///
/// Used to persist the credential pair and cache entries across process
/// restarts. Implementations must tolerate unknown keys on `get` and
/// `remove` (both are no-ops for missing keys).
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the backing medium rejects the write.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns error if the backing medium rejects the removal.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
