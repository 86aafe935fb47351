use std::path::Path;

use configs::{AppConfig, StorageBackend};
use defaults::{JsonFileStore, KeyResolver, MemoryStore, Namespace};
use dotenvy::dotenv;
use tracing::{info, warn};

/// Build a resolver from configuration.
///
/// A file store that cannot be opened is logged and replaced by no store at
/// all: reads then fall through to delegate and defaults, writes stay in the
/// session cache. `quota_bytes` only applies to the memory backend.
pub fn open(config: &AppConfig) -> KeyResolver {
    let namespace = Namespace::new(
        config.namespace.application_domain.as_deref(),
        config.namespace.user_domain.as_deref(),
    );
    let mut resolver = KeyResolver::new(namespace);

    match config.storage.backend {
        StorageBackend::File => {
            let path = Path::new(&config.storage.path);
            let opened = common::env::ensure_store_dir(path)
                .and_then(|()| JsonFileStore::open(path).map_err(anyhow::Error::from));
            match opened {
                Ok(store) => {
                    info!(event = "store_opened", backend = "file", path = %path.display(), "persistent store ready");
                    resolver = resolver.with_store(store);
                }
                Err(e) => {
                    warn!(event = "store_unavailable", path = %path.display(), error = %e, "continuing without persistent store");
                }
            }
        }
        StorageBackend::Memory => {
            let store = match config.storage.quota_bytes {
                Some(quota) => MemoryStore::with_quota(quota),
                None => MemoryStore::new(),
            };
            info!(event = "store_opened", backend = "memory", quota = ?config.storage.quota_bytes, "in-memory store ready");
            resolver = resolver.with_store(store);
        }
        StorageBackend::Disabled => {
            info!(event = "store_disabled", "no persistent store configured");
        }
    }

    if let Some(name) = &config.storage.store_name {
        resolver = resolver.with_store_name(name.clone());
    }
    resolver
}

/// Load `.env`, configuration and logging, then open the resolver.
///
/// A missing or unreadable config file falls back to defaults; an invalid one is an error.
pub fn init() -> anyhow::Result<KeyResolver> {
    dotenv().ok();

    let (mut config, load_error) = match configs::load_default() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    common::utils::logging::init_logging(&config.logging.format);
    if let Some(e) = load_error {
        warn!(event = "config_fallback", error = %e, "failed to load config file, using defaults");
    }
    config.normalize_and_validate()?;

    let resolver = open(&config);
    info!(
        event = "ready",
        application_domain = ?config.namespace.application_domain,
        user_domain = ?config.namespace.user_domain,
        has_store = resolver.has_store(),
        "defaults resolver initialized"
    );
    Ok(resolver)
}
