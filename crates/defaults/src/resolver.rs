use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::delegate::DefaultsDelegate;
use crate::errors::{DefaultsError, StoreError};
use crate::events::{ChangeEvent, ChangeNotifier, SubscriptionId};
use crate::keys::{self, Namespace};
use crate::storage::StorageAdapter;

/// Namespaced key/value defaults over a persistent store.
///
/// Reads resolve, first hit wins, through the session write cache and then
/// the store; a delegate may override whatever was found, and the defaults
/// table is consulted only when nothing else produced a value. Store failures
/// are logged and never returned: the write cache keeps every value written
/// during the session readable even when the store rejects it or is missing.
pub struct KeyResolver {
    namespace: Namespace,
    /// Domains as of the last namespace-change check.
    observed: Namespace,
    store_name: Option<String>,
    store: Option<Box<dyn StorageAdapter>>,
    written: HashMap<String, Value>,
    defaults: HashMap<String, Value>,
    delegate: Option<Box<dyn DefaultsDelegate>>,
    notifier: ChangeNotifier,
}

impl KeyResolver {
    /// A resolver with no persistent store; values live in the write cache only.
    pub fn new(namespace: Namespace) -> Self {
        Self {
            observed: namespace.clone(),
            namespace,
            store_name: None,
            store: None,
            written: HashMap::new(),
            defaults: HashMap::new(),
            delegate: None,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn with_store<S: StorageAdapter + 'static>(mut self, store: S) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Prefix every storage key with `name` (joined by `-at-`).
    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = Some(name.into());
        self
    }

    pub fn with_delegate<D: DefaultsDelegate + 'static>(mut self, delegate: D) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    pub fn set_delegate<D: DefaultsDelegate + 'static>(&mut self, delegate: D) {
        self.delegate = Some(Box::new(delegate));
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn domained_key(&self, key: &str) -> String {
        self.namespace.domained_key(key)
    }

    pub fn qualified_key(&self, key: &str) -> String {
        self.namespace.qualified_key(key)
    }

    /// The key actually handed to the store for `key`.
    pub fn storage_key(&self, key: &str) -> String {
        keys::storage_key(&self.qualified_key(key), self.store_name.as_deref())
    }

    /// Read `key`, or `None` when no cache, store, delegate or default supplies it.
    pub fn get(&self, key: &str) -> Option<Value> {
        let domained = self.namespace.domained_key(key);
        let qualified = keys::qualify(&domained, self.namespace.user_domain.as_deref());

        let mut value = match self.written.get(&qualified) {
            Some(v) => {
                debug!(%key, %qualified, source = "cache", "resolved value");
                Some(v.clone())
            }
            None => self.read_store(&qualified),
        };

        if let Some(delegate) = &self.delegate {
            if let Some(v) = delegate.needs_default(self, key, &qualified) {
                debug!(%key, %qualified, source = "delegate", "resolved value");
                value = Some(v);
            }
        }

        if value.is_none() {
            value = self
                .defaults
                .get(&qualified)
                .or_else(|| self.defaults.get(&domained))
                .or_else(|| self.defaults.get(key))
                .cloned();
            if value.is_some() {
                debug!(%key, %qualified, source = "defaults", "resolved value");
            }
        }
        value
    }

    /// Write `value` under `key`: cache it, persist it best-effort, tell the
    /// delegate and emit a change event.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let domained = self.namespace.domained_key(key);
        let qualified = keys::qualify(&domained, self.namespace.user_domain.as_deref());

        self.written.insert(qualified.clone(), value.clone());

        if let Some(store) = &self.store {
            let storage_key = keys::storage_key(&qualified, self.store_name.as_deref());
            let persisted = serde_json::to_string(&value)
                .map_err(|e| StoreError::Serialize(e.to_string()))
                .and_then(|encoded| store.set(&storage_key, &encoded));
            match persisted {
                Ok(()) => debug!(%key, %storage_key, "persisted value"),
                Err(StoreError::Unavailable) => {
                    debug!(%key, %storage_key, "store unavailable; value kept in session cache")
                }
                Err(e) => error!(%key, %storage_key, error = %e, "failed using persistent store"),
            }
        }

        let this: &KeyResolver = self;
        if let Some(delegate) = &this.delegate {
            delegate.did_change(this, key, &value, &qualified);
        }

        self.notifier.emit(&ChangeEvent::Key { key: key.to_string(), domained_key: domained });
    }

    /// Forget any written or persisted value for `key`; later reads fall back
    /// to the delegate and defaults.
    pub fn reset(&mut self, key: &str) {
        let domained = self.namespace.domained_key(key);
        let qualified = keys::qualify(&domained, self.namespace.user_domain.as_deref());

        self.written.remove(&qualified);

        if let Some(store) = &self.store {
            let storage_key = keys::storage_key(&qualified, self.store_name.as_deref());
            match store.remove(&storage_key) {
                Ok(()) | Err(StoreError::Unavailable) => {}
                Err(e) => warn!(%key, %storage_key, error = %e, "deleting from persistent store encountered a problem"),
            }
        }

        self.notifier.emit(&ChangeEvent::Key { key: key.to_string(), domained_key: domained });
    }

    /// Typed read; a value of the wrong shape is an error, a missing one is `Ok(None)`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DefaultsError> {
        self.get(key)
            .map(|v| {
                serde_json::from_value(v).map_err(|source| DefaultsError::Deserialize { key: key.to_string(), source })
            })
            .transpose()
    }

    pub fn set_as<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), DefaultsError> {
        let value = serde_json::to_value(value)
            .map_err(|source| DefaultsError::Serialize { key: key.to_string(), source })?;
        self.set(key, value);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replace the whole defaults table. Every observer is told to re-read.
    pub fn set_defaults<I, K>(&mut self, table: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.defaults = table.into_iter().map(|(k, v)| (k.into(), v)).collect();
        debug!(entries = self.defaults.len(), "defaults replaced");
        self.notifier.emit(&ChangeEvent::All);
    }

    pub fn clear_defaults(&mut self) {
        self.set_defaults(std::iter::empty::<(String, Value)>());
    }

    pub fn set_user_domain(&mut self, user_domain: Option<&str>) {
        self.namespace.user_domain = user_domain.map(str::to_string);
        self.on_namespace_change();
    }

    pub fn set_application_domain(&mut self, application_domain: Option<&str>) {
        self.namespace.application_domain = application_domain.map(str::to_string);
        self.on_namespace_change();
    }

    pub fn set_namespace(&mut self, namespace: Namespace) {
        self.namespace = namespace;
        self.on_namespace_change();
    }

    /// Compare the domains with the last observed ones and emit
    /// [`ChangeEvent::All`] if either moved. Returns whether anything changed.
    pub fn on_namespace_change(&mut self) -> bool {
        if self.namespace == self.observed {
            return false;
        }
        info!(
            application_domain = ?self.namespace.application_domain,
            user_domain = ?self.namespace.user_domain,
            "namespace changed"
        );
        self.observed = self.namespace.clone();
        self.notifier.emit(&ChangeEvent::All);
        true
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn read_store(&self, qualified: &str) -> Option<Value> {
        let store = self.store.as_ref()?;
        let storage_key = keys::storage_key(qualified, self.store_name.as_deref());
        match store.get(&storage_key) {
            Ok(Some(raw)) => {
                debug!(%storage_key, source = "store", "resolved value");
                Some(decode(raw))
            }
            Ok(None) => None,
            Err(StoreError::Unavailable) => None,
            Err(e) => {
                warn!(%storage_key, error = %e, "reading persistent store failed");
                None
            }
        }
    }
}

/// Stored values are JSON; anything that does not parse is kept as the raw string.
fn decode(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Namespace::default())
    }
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("namespace", &self.namespace)
            .field("store_name", &self.store_name)
            .field("has_store", &self.store.is_some())
            .field("written", &self.written.len())
            .field("defaults", &self.defaults.len())
            .field("has_delegate", &self.delegate.is_some())
            .field("notifier", &self.notifier)
            .finish()
    }
}
