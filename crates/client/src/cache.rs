use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::fetch::Lookup;

/// Coalesces identical lookups: at most one network call per distinct fetch
/// key for the lifetime of the cache, even when callers race on the same key.
///
/// Failed lookups are cached exactly like successes; a key is never retried.
/// The cache is constructor-injected into the fetcher and scoped to one
/// pipeline instance, so growth is bounded by the report being processed.
pub struct RequestCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Lookup>>>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The coalescing cell for `key`, created empty on first use. Callers
    /// resolve it through `OnceCell::get_or_init`, which runs the lookup
    /// future at most once and parks every other caller until it lands.
    pub fn entry(&self, key: &str) -> Arc<OnceCell<Lookup>> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.entry(key.to_string()).or_default().clone()
    }

    /// Completed outcome for `key`, if any lookup has finished.
    pub fn peek(&self, key: &str) -> Option<Lookup> {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Whether `key` has been seen, resolved or in flight.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .contains_key(key)
    }

    /// Number of keys seen so far, resolved or in flight.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}
