use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{poisoned, StorageAdapter};
use crate::errors::StoreError;

/// In-memory key-value store.
///
/// Cloning yields another handle to the same entries, so several resolvers
/// can share one store the way pages share one browser store. An optional
/// byte quota (keys plus values) makes oversized writes fail with
/// [`StoreError::QuotaExceeded`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self { inner: Arc::default(), quota: Some(quota) }
    }

    /// List all entries as `(key, value)` pairs.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.inner
            .read()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.inner
            .read()
            .map(|map| map.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }
}

impl StorageAdapter for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if let Some(quota) = self.quota {
            let used: usize = map.iter().map(|(k, v)| k.len() + v.len()).sum();
            let replaced = map.get(key).map_or(0, |old| key.len() + old.len());
            let needed = used - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.inner.write().map_err(poisoned)?.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_basic_crud() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("a", "\"1\"")?;
        store.set("b", "2")?;
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a")?.as_deref(), Some("\"1\""));

        store.remove("a")?;
        assert_eq!(store.get("a")?, None);
        // removing a missing key is not an error
        store.remove("a")?;

        store.clear()?;
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn clones_share_entries() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v")?;
        assert_eq!(other.get("k")?.as_deref(), Some("v"));
        assert_eq!(other.entries(), vec![("k".to_string(), "v".to_string())]);
        Ok(())
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() -> Result<(), anyhow::Error> {
        let store = MemoryStore::with_quota(8);
        store.set("k", "1234")?;
        assert_eq!(store.used_bytes(), 5);

        let err = store.set("k", "123456789").unwrap_err();
        assert_eq!(err, StoreError::QuotaExceeded { needed: 10, quota: 8 });
        assert_eq!(store.get("k")?.as_deref(), Some("1234"));

        // replacing an entry only counts the new size
        store.set("k", "1234567")?;
        assert_eq!(store.used_bytes(), 8);
        Ok(())
    }
}
