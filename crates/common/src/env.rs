//! Environment/runtime helpers
//!
//! Sanity checks to ensure the directory backing a file store exists.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the parent directory of `store_path` exists, creating it if needed.
pub fn ensure_store_dir(store_path: &Path) -> anyhow::Result<()> {
    let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }
    debug!(dir = %parent.display(), "creating store directory");
    std::fs::create_dir_all(parent).map_err(|e| {
        warn!(dir = %parent.display(), error = %e, "cannot create store directory");
        anyhow::anyhow!("cannot create {}: {e}", parent.display())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_parent() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("common_env_{}", std::process::id()));
        let file = dir.join("nested").join("store.json");
        ensure_store_dir(&file)?;
        assert!(file.parent().is_some_and(|p| p.is_dir()));
        let _ = std::fs::remove_dir_all(&dir);
        Ok(())
    }

    #[test]
    fn bare_file_name_needs_nothing() -> anyhow::Result<()> {
        ensure_store_dir(Path::new("store.json"))
    }
}
