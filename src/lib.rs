//! Namespaced, persistent key/value defaults.
//!
//! Wiring lives in [`bootstrap`]; the resolver itself is in the `defaults`
//! crate and re-exported here.

pub mod bootstrap;

pub use configs::{AppConfig, StorageBackend};
pub use defaults::{
    ChangeEvent, DefaultsDelegate, DefaultsError, JsonFileStore, KeyResolver, MemoryStore, Namespace,
    PropertyBridge, StorageAdapter, StoreError, SubscriptionId,
};
