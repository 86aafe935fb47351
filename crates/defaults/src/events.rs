//! Change notifications emitted by the resolver.

use std::fmt;

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// One key changed. Carries the key as the caller spelled it and its
    /// domained form, so observers of either spelling are reached.
    Key { key: String, domained_key: String },
    /// Anything may have changed (defaults replaced, namespace switched).
    All,
}

impl ChangeEvent {
    /// Whether an observer of `key` (domained form `domained_key`) must re-read.
    pub fn affects(&self, key: &str, domained_key: &str) -> bool {
        match self {
            ChangeEvent::All => true,
            ChangeEvent::Key { key: k, domained_key: d } => {
                k == key || k == domained_key || d == key || d == domained_key
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Ordered list of change listeners.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn emit(&self, event: &ChangeEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier").field("listeners", &self.listeners.len()).finish()
    }
}
