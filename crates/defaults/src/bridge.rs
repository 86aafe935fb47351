//! Named-property view over a [`KeyResolver`].
//!
//! A host framework binds its property names to resolver keys, reads the
//! last synchronised values, and calls [`PropertyBridge::sync`] from its own
//! update loop to pick up changes announced by the resolver.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

use crate::events::{ChangeEvent, SubscriptionId};
use crate::resolver::KeyResolver;

#[derive(Debug)]
struct Binding {
    key: String,
    value: Option<Value>,
}

/// Property name -> (key, domained key), shared with the change listener.
type Watched = Arc<Mutex<HashMap<String, (String, String)>>>;

#[derive(Debug)]
pub struct PropertyBridge {
    bindings: HashMap<String, Binding>,
    watched: Watched,
    stale: Arc<Mutex<HashSet<String>>>,
    subscription: SubscriptionId,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PropertyBridge {
    /// Subscribe to `resolver`'s change events.
    pub fn attach(resolver: &mut KeyResolver) -> Self {
        let watched: Watched = Arc::default();
        let stale: Arc<Mutex<HashSet<String>>> = Arc::default();

        let subscription = {
            let watched = Arc::clone(&watched);
            let stale = Arc::clone(&stale);
            resolver.subscribe(move |event: &ChangeEvent| {
                let watched = lock(&watched);
                let mut stale = lock(&stale);
                for (property, (key, domained)) in watched.iter() {
                    if event.affects(key, domained) {
                        stale.insert(property.clone());
                    }
                }
            })
        };

        Self { bindings: HashMap::new(), watched, stale, subscription }
    }

    /// Drop the subscription; the bridge is unusable afterwards.
    pub fn detach(self, resolver: &mut KeyResolver) {
        resolver.unsubscribe(self.subscription);
    }

    /// Bind `property` to `key` and read its current value. Rebinding replaces the old key.
    pub fn bind(&mut self, resolver: &KeyResolver, property: &str, key: &str) {
        let value = resolver.get(key);
        lock(&self.watched).insert(property.to_string(), (key.to_string(), resolver.domained_key(key)));
        lock(&self.stale).remove(property);
        self.bindings.insert(property.to_string(), Binding { key: key.to_string(), value });
    }

    pub fn unbind(&mut self, property: &str) -> bool {
        lock(&self.watched).remove(property);
        lock(&self.stale).remove(property);
        self.bindings.remove(property).is_some()
    }

    /// Value as of the last bind/set/sync.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.bindings.get(property).and_then(|b| b.value.as_ref())
    }

    pub fn key_for(&self, property: &str) -> Option<&str> {
        self.bindings.get(property).map(|b| b.key.as_str())
    }

    /// Write through to the resolver. Returns `false` if `property` is not bound.
    pub fn set(&mut self, resolver: &mut KeyResolver, property: &str, value: impl Into<Value>) -> bool {
        let Some(binding) = self.bindings.get_mut(property) else {
            return false;
        };
        resolver.set(&binding.key, value);
        binding.value = resolver.get(&binding.key);
        true
    }

    /// Re-read every property a change event touched. Returns the properties
    /// whose value differs from before, sorted by name.
    pub fn sync(&mut self, resolver: &KeyResolver) -> Vec<String> {
        let pending: Vec<String> = lock(&self.stale).drain().collect();
        let mut changed = Vec::new();

        for property in pending {
            let Some(binding) = self.bindings.get_mut(&property) else {
                continue;
            };
            // domains may have moved since bind
            if let Some(entry) = lock(&self.watched).get_mut(&property) {
                entry.1 = resolver.domained_key(&binding.key);
            }
            let fresh = resolver.get(&binding.key);
            if fresh != binding.value {
                debug!(%property, key = %binding.key, "bound property changed");
                binding.value = fresh;
                changed.push(property);
            }
        }

        changed.sort();
        changed
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
