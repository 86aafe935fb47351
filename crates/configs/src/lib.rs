use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

/// Separator between user domain and domained key; no configured name may contain it.
const USER_SEPARATOR: &str = "-at-";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub namespace: NamespaceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NamespaceConfig {
    #[serde(default)]
    pub application_domain: Option<String>,
    #[serde(default)]
    pub user_domain: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::File, path: default_store_path(), store_name: None, quota_bytes: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_store_path() -> String { "data/defaults.json".to_string() }
fn default_log_format() -> String { "compact".to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.namespace.normalize_from_env();
        self.namespace.validate()?;
        self.storage.normalize();
        self.storage.validate()?;
        Ok(())
    }
}

impl NamespaceConfig {
    /// Blank domains count as unset; unset domains are filled from
    /// `DEFAULTS_APP_DOMAIN` / `DEFAULTS_USER_DOMAIN` when present.
    pub fn normalize_from_env(&mut self) {
        self.application_domain = non_blank(self.application_domain.take())
            .or_else(|| non_blank(std::env::var("DEFAULTS_APP_DOMAIN").ok()));
        self.user_domain = non_blank(self.user_domain.take())
            .or_else(|| non_blank(std::env::var("DEFAULTS_USER_DOMAIN").ok()));
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(app) = &self.application_domain {
            if app.contains(':') {
                return Err(anyhow!("namespace.application_domain must not contain ':' (got {app:?})"));
            }
            if app.contains(USER_SEPARATOR) {
                return Err(anyhow!("namespace.application_domain must not contain {USER_SEPARATOR:?}"));
            }
        }
        if let Some(user) = &self.user_domain {
            if user.contains(USER_SEPARATOR) {
                return Err(anyhow!("namespace.user_domain must not contain {USER_SEPARATOR:?}"));
            }
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize(&mut self) {
        self.path = self.path.trim().to_string();
        self.store_name = non_blank(self.store_name.take());
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::File && self.path.is_empty() {
            return Err(anyhow!("storage.path is empty; the file backend needs a path"));
        }
        if let Some(name) = &self.store_name {
            if name.contains(USER_SEPARATOR) {
                return Err(anyhow!("storage.store_name must not contain {USER_SEPARATOR:?}"));
            }
        }
        if self.quota_bytes == Some(0) {
            return Err(anyhow!("storage.quota_bytes must be >= 1 when set"));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() -> Result<()> {
        let cfg = load_from_str("")?;
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.path, "data/defaults.json");
        assert_eq!(cfg.logging.format, "compact");
        assert!(cfg.storage.store_name.is_none());
        Ok(())
    }

    #[test]
    fn parses_full_document() -> Result<()> {
        let mut cfg = load_from_str(
            r#"
            [namespace]
            application_domain = "LocalStorageTest"
            user_domain = "UberDuber"

            [storage]
            backend = "memory"
            store_name = "LocalDefaults"
            quota_bytes = 1024

            [logging]
            format = "json"
            "#,
        )?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.namespace.application_domain.as_deref(), Some("LocalStorageTest"));
        assert_eq!(cfg.namespace.user_domain.as_deref(), Some("UberDuber"));
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.storage.quota_bytes, Some(1024));
        assert_eq!(cfg.logging.format, "json");
        Ok(())
    }

    #[test]
    fn blank_domains_become_unset() {
        let mut ns = NamespaceConfig {
            application_domain: Some("   ".into()),
            user_domain: Some(String::new()),
        };
        ns.application_domain = non_blank(ns.application_domain.take());
        ns.user_domain = non_blank(ns.user_domain.take());
        assert!(ns.application_domain.is_none());
        assert!(ns.user_domain.is_none());
    }

    #[test]
    fn rejects_separator_in_application_domain() {
        let ns = NamespaceConfig { application_domain: Some("a:b".into()), user_domain: None };
        assert!(ns.validate().is_err());
        let ns = NamespaceConfig { application_domain: None, user_domain: Some("x-at-y".into()) };
        assert!(ns.validate().is_err());
    }

    #[test]
    fn rejects_bad_storage_settings() {
        let mut storage = StorageConfig { path: "  ".into(), ..StorageConfig::default() };
        storage.normalize();
        assert!(storage.validate().is_err());

        let storage = StorageConfig { backend: StorageBackend::Disabled, path: String::new(), ..StorageConfig::default() };
        assert!(storage.validate().is_ok());

        let storage = StorageConfig { quota_bytes: Some(0), ..StorageConfig::default() };
        assert!(storage.validate().is_err());
    }

    #[test]
    fn none_backend_disables_storage() -> Result<()> {
        let cfg = load_from_str("[storage]\nbackend = \"none\"\n")?;
        assert_eq!(cfg.storage.backend, StorageBackend::Disabled);
        Ok(())
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(load_from_str("[storage]\nbackend = \"cloud\"\n").is_err());
    }
}
