//! Key derivation: logical key -> domained key -> qualified key -> storage key.
//!
//! All functions here are pure; the same inputs always produce the same key.

/// Separates the application domain from the rest of a key.
pub const DOMAIN_SEPARATOR: char = ':';
/// Joins the user domain (and optional store name) onto a key.
pub const USER_SEPARATOR: &str = "-at-";
/// Application domain used when none is configured.
pub const DEFAULT_APPLICATION_DOMAIN: &str = "app";
/// User domain used when none is configured.
pub const DEFAULT_USER_DOMAIN: &str = "(anonymous)";

/// Prefix `logical_key` with the application domain unless it already names one.
pub fn normalize(logical_key: &str, application_domain: Option<&str>) -> String {
    if logical_key.contains(DOMAIN_SEPARATOR) {
        return logical_key.to_string();
    }
    let domain = application_domain.unwrap_or(DEFAULT_APPLICATION_DOMAIN);
    format!("{domain}{DOMAIN_SEPARATOR}{logical_key}")
}

/// Scope a domained key to a user.
pub fn qualify(domained_key: &str, user_domain: Option<&str>) -> String {
    let user = user_domain.unwrap_or(DEFAULT_USER_DOMAIN);
    format!("{user}{USER_SEPARATOR}{domained_key}")
}

/// Key handed to the store; a store name, when set, is prepended with the same separator.
pub fn storage_key(qualified_key: &str, store_name: Option<&str>) -> String {
    match store_name {
        Some(name) => format!("{name}{USER_SEPARATOR}{qualified_key}"),
        None => qualified_key.to_string(),
    }
}

/// The namespace a resolver derives keys in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    pub application_domain: Option<String>,
    pub user_domain: Option<String>,
}

impl Namespace {
    pub fn new(application_domain: Option<&str>, user_domain: Option<&str>) -> Self {
        Self {
            application_domain: application_domain.map(str::to_string),
            user_domain: user_domain.map(str::to_string),
        }
    }

    pub fn domained_key(&self, logical_key: &str) -> String {
        normalize(logical_key, self.application_domain.as_deref())
    }

    pub fn qualified_key(&self, logical_key: &str) -> String {
        qualify(&self.domained_key(logical_key), self.user_domain.as_deref())
    }
}
