//! Namespaced key/value defaults with best-effort persistence.
//! - `keys`: pure derivation of domained, qualified and storage keys
//! - `resolver`: `KeyResolver`, the read fallback chain and write/reset paths
//! - `storage`: the `StorageAdapter` trait plus memory and JSON-file stores
//! - `delegate` / `events` / `bridge`: the collaborator seams

pub mod bridge;
pub mod delegate;
pub mod errors;
pub mod events;
pub mod keys;
pub mod resolver;
pub mod storage;

pub use bridge::PropertyBridge;
pub use delegate::DefaultsDelegate;
pub use errors::{DefaultsError, StoreError};
pub use events::{ChangeEvent, SubscriptionId};
pub use keys::Namespace;
pub use resolver::KeyResolver;
pub use storage::{JsonFileStore, MemoryStore, StorageAdapter};
