//! Blueprint settings store.

use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// A hierarchical, read-mostly settings store consulted for component lists,
/// priorities, and options.
///
/// Keys are dot-namespaced strings (`"kernel.middleware.before"`); values are
/// type-erased and recovered through typed accessors. Writes are expected
/// during the boot/registration phase only; steady-state request handling
/// reads concurrently.
///
/// # Example
///
/// ```rust
/// use gantry_core::Blueprint;
///
/// let blueprint = Blueprint::new();
/// blueprint.set("kernel.middleware.default_priority", 25i32);
/// assert_eq!(blueprint.get_or("kernel.middleware.default_priority", 10i32), 25);
/// assert_eq!(blueprint.get_or("kernel.missing", 10i32), 10);
/// ```
#[derive(Default)]
pub struct Blueprint {
    entries: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Blueprint {
    /// Create an empty blueprint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under the key, replacing any previous entry.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.into(), Arc::new(value));
    }

    /// Retrieve a clone of the value under the key, if present and of the
    /// expected type.
    pub fn get<T: Any + Send + Sync + Clone>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).and_then(|v| v.downcast_ref().cloned())
    }

    /// Retrieve the value under the key, falling back to `default`.
    pub fn get_or<T: Any + Send + Sync + Clone>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Whether an entry exists under the key.
    pub fn has(&self, key: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(key)
    }

    /// Keys stored under a dot-namespace prefix.
    pub fn keys_under(&self, prefix: &str) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}
