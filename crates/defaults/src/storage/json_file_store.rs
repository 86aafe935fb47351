use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use super::{poisoned, StorageAdapter};
use crate::errors::StoreError;

/// JSON file-backed key-value store.
///
/// Persists a flat `HashMap<String, String>` (storage key -> serialized value)
/// to a single JSON file and rewrites it after every mutation. Intended for
/// small per-user settings where a database is overkill.
#[derive(Clone)]
pub struct JsonFileStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`. Creates the file with an empty map if missing;
    /// an unreadable document is treated as empty and overwritten on the next write.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StoreError::io)?;
        }

        let map: HashMap<String, String> = match fs::read(&file_path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "store file is not a JSON object; starting empty");
                HashMap::new()
            }),
            Err(_) => {
                let empty: HashMap<String, String> = HashMap::new();
                write_map(&file_path, &empty)?;
                empty
            }
        };
        debug!(path = %file_path.display(), entries = map.len(), "opened json file store");

        Ok(Self { inner: Arc::new(RwLock::new(map)), file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        write_map(&self.file_path, map)
    }
}

fn write_map(path: &Path, map: &HashMap<String, String>) -> Result<(), StoreError> {
    let data = serde_json::to_vec(map).map_err(|e| StoreError::Serialize(e.to_string()))?;
    fs::write(path, data).map_err(StoreError::io)
}

impl StorageAdapter for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.clear();
        self.save(&map)
    }

    fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_file_store_{}.json", Uuid::new_v4()))
    }

    #[test]
    fn json_file_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = JsonFileStore::open(&tmp)?;

        // initially empty, and the file exists
        assert!(store.is_empty());
        assert!(tmp.exists());

        store.set("a", "\"1\"")?;
        store.set("b", "2")?;
        assert_eq!(store.get("a")?.as_deref(), Some("\"1\""));

        // remove and reload persistence
        store.remove("b")?;
        let reloaded = JsonFileStore::open(&tmp)?;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("a")?.as_deref(), Some("\"1\""));
        assert_eq!(reloaded.get("b")?, None);

        let _ = fs::remove_file(&tmp);
        Ok(())
    }

    #[test]
    fn corrupt_file_opens_empty() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        fs::write(&tmp, b"not json at all")?;

        let store = JsonFileStore::open(&tmp)?;
        assert!(store.is_empty());
        store.set("k", "true")?;
        assert_eq!(JsonFileStore::open(&tmp)?.get("k")?.as_deref(), Some("true"));

        let _ = fs::remove_file(&tmp);
        Ok(())
    }

    #[test]
    fn clear_empties_the_file() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = JsonFileStore::open(&tmp)?;
        store.set("k", "1")?;
        store.clear()?;
        assert!(JsonFileStore::open(&tmp)?.is_empty());

        let _ = fs::remove_file(&tmp);
        Ok(())
    }
}
