use configs::{AppConfig, NamespaceConfig, StorageBackend, StorageConfig};
use local_defaults::bootstrap;
use serde_json::json;

fn config(backend: StorageBackend, path: String) -> AppConfig {
    AppConfig {
        namespace: NamespaceConfig {
            application_domain: Some("LocalStorageTest".into()),
            user_domain: Some("UberDuber".into()),
        },
        storage: StorageConfig { backend, path, ..StorageConfig::default() },
        ..AppConfig::default()
    }
}

#[test]
fn file_backend_round_trips_across_opens() -> Result<(), anyhow::Error> {
    let dir = std::env::temp_dir().join(format!("local_defaults_{}", uuid::Uuid::new_v4()));
    let path = dir.join("nested").join("defaults.json");
    let mut cfg = config(StorageBackend::File, path.display().to_string());
    cfg.storage.store_name = Some("LocalDefaults".into());

    let mut resolver = bootstrap::open(&cfg);
    assert!(resolver.has_store());
    assert_eq!(resolver.storage_key("mar"), "LocalDefaults-at-UberDuber-at-LocalStorageTest:mar");
    resolver.set("mar", "tini");

    let reopened = bootstrap::open(&cfg);
    assert_eq!(reopened.get("mar"), Some(json!("tini")));

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[test]
fn unusable_file_path_degrades_to_no_store() -> Result<(), anyhow::Error> {
    // a regular file where the store directory should be
    let blocker = std::env::temp_dir().join(format!("local_defaults_blocker_{}", uuid::Uuid::new_v4()));
    std::fs::write(&blocker, b"")?;
    let cfg = config(StorageBackend::File, blocker.join("defaults.json").display().to_string());

    let mut resolver = bootstrap::open(&cfg);
    assert!(!resolver.has_store());
    resolver.set("mar", "tini");
    assert_eq!(resolver.get("mar"), Some(json!("tini")));

    let _ = std::fs::remove_file(&blocker);
    Ok(())
}

#[test]
fn memory_and_none_backends() {
    let memory = bootstrap::open(&config(StorageBackend::Memory, String::new()));
    assert!(memory.has_store());

    let none = bootstrap::open(&config(StorageBackend::Disabled, String::new()));
    assert!(!none.has_store());
    assert_eq!(none.qualified_key("mar"), "UberDuber-at-LocalStorageTest:mar");
}
