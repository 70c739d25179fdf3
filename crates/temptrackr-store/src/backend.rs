//! Key-value store trait and error types.
//!
//! This module defines the `KvStore` trait that abstracts over the persistence
//! substrate (SQLite file, in-memory map, or nothing at all) and the JSON
//! helpers every collection in the app is read and written through.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Backend(String),

    /// Value could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Synchronous string key-value store.
///
/// Values are whole serialized collections; callers read the value, mutate it
/// and write it back. There is no cross-writer coordination.
pub trait KvStore: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// Returns `None` if nothing is stored.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove the value under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Read a JSON value from the store.
///
/// Absent keys, backend failures and unparsable values all yield
/// `T::default()`; failures are logged.
pub fn load_json<T>(store: &dyn KvStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!("Failed to read '{}' from store: {}", key, e);
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Discarding unparsable value under '{}': {}", key, e);
            T::default()
        }
    }
}

/// Serialize `value` as JSON and write it under `key`.
///
/// # Errors
/// Returns `StoreError::Serialization` if the value cannot be encoded, or the
/// backend's error if the write fails.
pub fn save_json<T>(store: &dyn KvStore, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn test_load_json_missing_key_is_default() {
        let store = MemoryStore::new();
        let values: Vec<String> = load_json(&store, "nothing-here");
        assert!(values.is_empty());
    }

    #[test]
    fn test_load_json_corrupt_value_is_default() {
        let store = MemoryStore::new();
        store.set("list", "{not json").unwrap();

        let values: Vec<String> = load_json(&store, "list");
        assert!(values.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save_json(&store, "list", &vec!["a".to_string(), "b".to_string()]).unwrap();

        let values: Vec<String> = load_json(&store, "list");
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::backend("disk full");
        assert_eq!(err.to_string(), "Storage error: disk full");
    }
}
