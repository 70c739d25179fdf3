//! In-process store backends.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::backend::{KvStore, StoreResult};

/// Volatile store backed by a `HashMap`. Used in tests and in hosts without
/// a persistent substrate that still want state for the process lifetime.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Store for contexts with no persistence at all.
///
/// Reads are always empty and writes are dropped, so every collection built
/// on top of it behaves as permanently empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl KvStore for NullStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
        tracing::trace!("Dropping write to '{}' (no store attached)", key);
        Ok(())
    }

    fn remove(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        store.remove("k").unwrap();
    }

    #[test]
    fn test_null_store_never_holds_anything() {
        let store = NullStore;
        store.set("k", "v").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}
