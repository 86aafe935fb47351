//! Storage abstractions for the resolver
//!
//! A [`StorageAdapter`] is the persistent side of the resolver: opaque string
//! keys mapped to serialized (JSON) string values. Adapters report failures
//! as [`StoreError`]; the resolver decides whether they matter.

pub mod json_file_store;
pub mod memory_store;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

use crate::errors::StoreError;

/// Trait abstraction for the persistent key-value store.
/// Implementations can be in-memory, file-backed, or wrap a platform store.
pub trait StorageAdapter: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
    /// Number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Io("store lock poisoned".to_string())
}
