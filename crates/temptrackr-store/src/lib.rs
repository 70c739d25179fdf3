//! Key-value persistence for TempTrackr.
//!
//! Provides the `KvStore` capability plus SQLite, in-memory and no-op backends.

pub mod backend;
pub mod memory;
pub mod sqlite;

pub use backend::{load_json, save_json, KvStore, StoreError, StoreResult};
pub use memory::{MemoryStore, NullStore};
pub use sqlite::SqliteStore;
