use thiserror::Error;

/// Failures reported by a [`StorageAdapter`](crate::storage::StorageAdapter).
///
/// The resolver never surfaces these to its callers; they are logged and the
/// write cache stays authoritative for the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("persistent store is unavailable")]
    Unavailable,
    #[error("quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Errors from the typed accessors (`get_as` / `set_as`).
#[derive(Debug, Error)]
pub enum DefaultsError {
    #[error("cannot serialize value for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value stored under {key} has an unexpected shape: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(err: impl std::fmt::Display) -> Self { Self::Io(err.to_string()) }
}
