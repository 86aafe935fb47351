use serde_json::Value;

use crate::resolver::KeyResolver;

/// Hook consulted by a [`KeyResolver`] for defaults and told about writes.
///
/// Both methods have empty default bodies; implement only what you need.
/// A value returned from `needs_default` takes precedence over anything
/// found in the write cache or the store.
pub trait DefaultsDelegate: Send + Sync {
    fn needs_default(&self, resolver: &KeyResolver, key: &str, qualified_key: &str) -> Option<Value> {
        let _ = (resolver, key, qualified_key);
        None
    }

    fn did_change(&self, resolver: &KeyResolver, key: &str, value: &Value, qualified_key: &str) {
        let _ = (resolver, key, value, qualified_key);
    }
}
