//! Keyed service container.
//!
//! A straightforward implementation of the [`Container`] contract: bindings
//! are registered under string keys (plus optional aliases) together with a
//! constructor closure, and resolved either as cached singletons or as fresh
//! instances per call.

use gantry_core::{BoxedService, Container, ResolutionError, ServiceConstructor};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

struct Binding {
    constructor: ServiceConstructor,
    singleton: bool,
    // Guards construction as well as the cache, so a singleton constructor
    // runs at most once even under concurrent resolution.
    cached: Mutex<Option<BoxedService>>,
}

/// A keyed binding store with singleton caching and alias support.
///
/// Registration uses interior mutability so the container can be shared as
/// `Arc<dyn Container>` while adapters keep registering bindings during boot.
/// Cyclic bindings are not supported: a constructor that resolves its own key
/// will deadlock on the binding's construction lock.
#[derive(Default)]
pub struct ServiceContainer {
    bindings: RwLock<HashMap<String, Arc<Binding>>>,
    aliases: RwLock<HashMap<String, String>>,
}

impl ServiceContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready value as a singleton under `name`.
    pub fn instance<T: Send + Sync + 'static>(&self, name: impl Into<String>, value: T) {
        let service: BoxedService = Arc::new(value);
        self.auto_binding(
            &name.into(),
            Arc::new(move |_| Ok(Arc::clone(&service))),
            true,
            &[],
        );
    }

    /// Register an additional alias for an existing binding.
    pub fn alias(&self, alias: impl Into<String>, target: impl Into<String>) {
        let mut aliases = self.aliases.write().unwrap_or_else(|e| e.into_inner());
        aliases.insert(alias.into(), target.into());
    }

    /// Number of registered bindings (aliases excluded).
    pub fn binding_count(&self) -> usize {
        let bindings = self.bindings.read().unwrap_or_else(|e| e.into_inner());
        bindings.len()
    }

    fn canonical(&self, key: &str) -> String {
        let aliases = self.aliases.read().unwrap_or_else(|e| e.into_inner());
        aliases.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    fn binding(&self, key: &str) -> Option<Arc<Binding>> {
        let bindings = self.bindings.read().unwrap_or_else(|e| e.into_inner());
        bindings.get(key).cloned()
    }
}

impl Container for ServiceContainer {
    fn resolve(&self, key: &str, fresh: bool) -> Result<BoxedService, ResolutionError> {
        let canonical = self.canonical(key);
        let binding = self
            .binding(&canonical)
            .ok_or_else(|| ResolutionError::MissingBinding(key.to_string()))?;

        let construct = || -> Result<BoxedService, ResolutionError> {
            (binding.constructor)(self)
                .map_err(|e| ResolutionError::Constructor(canonical.clone(), e))
        };

        if binding.singleton && !fresh {
            let mut cached = binding.cached.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(service) = cached.as_ref() {
                return Ok(Arc::clone(service));
            }
            let service = construct()?;
            *cached = Some(Arc::clone(&service));
            return Ok(service);
        }

        construct()
    }

    fn has(&self, key: &str) -> bool {
        let canonical = self.canonical(key);
        let bindings = self.bindings.read().unwrap_or_else(|e| e.into_inner());
        bindings.contains_key(&canonical)
    }

    fn auto_binding(
        &self,
        name: &str,
        constructor: ServiceConstructor,
        singleton: bool,
        aliases: &[&str],
    ) {
        {
            let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
            bindings.insert(
                name.to_string(),
                Arc::new(Binding {
                    constructor,
                    singleton,
                    cached: Mutex::new(None),
                }),
            );
        }
        for alias in aliases {
            self.alias(*alias, name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Clock {
        tick: usize,
    }

    fn counting_constructor(count: Arc<AtomicUsize>) -> ServiceConstructor {
        Arc::new(move |_container| {
            let tick = count.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Clock { tick }))
        })
    }

    #[test]
    fn singleton_constructs_once() {
        let container = ServiceContainer::new();
        let count = Arc::new(AtomicUsize::new(0));
        container.auto_binding("clock", counting_constructor(Arc::clone(&count)), true, &[]);

        let first = container.resolve("clock", false).unwrap();
        let second = container.resolve("clock", false).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn fresh_bypasses_the_cache() {
        let container = ServiceContainer::new();
        let count = Arc::new(AtomicUsize::new(0));
        container.auto_binding("clock", counting_constructor(Arc::clone(&count)), true, &[]);

        container.resolve("clock", false).unwrap();
        let fresh = container.resolve("clock", true).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(fresh.downcast_ref::<Clock>().unwrap().tick, 1);

        // The cached singleton is untouched.
        let cached = container.resolve("clock", false).unwrap();
        assert_eq!(cached.downcast_ref::<Clock>().unwrap().tick, 0);
    }

    #[test]
    fn transient_constructs_every_time() {
        let container = ServiceContainer::new();
        let count = Arc::new(AtomicUsize::new(0));
        container.auto_binding("clock", counting_constructor(Arc::clone(&count)), false, &[]);

        container.resolve("clock", false).unwrap();
        container.resolve("clock", false).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn aliases_reach_the_same_binding() {
        let container = ServiceContainer::new();
        container.instance("config.primary", 42u32);
        container.alias("config", "config.primary");

        assert!(container.has("config"));
        let via_alias = container.resolve("config", false).unwrap();
        assert_eq!(*via_alias.downcast_ref::<u32>().unwrap(), 42);
    }

    #[test]
    fn auto_binding_registers_aliases() {
        let container = ServiceContainer::new();
        let count = Arc::new(AtomicUsize::new(0));
        container.auto_binding(
            "clock",
            counting_constructor(count),
            true,
            &["time", "ticker"],
        );

        assert!(container.has("time"));
        let direct = container.resolve("clock", false).unwrap();
        let aliased = container.resolve("ticker", false).unwrap();
        assert!(Arc::ptr_eq(&direct, &aliased));
    }

    #[test]
    fn missing_binding_is_reported_with_its_key() {
        let container = ServiceContainer::new();
        let error = container.resolve("ghost", false).unwrap_err();
        assert!(matches!(error, ResolutionError::MissingBinding(key) if key == "ghost"));
    }

    #[test]
    fn constructor_failure_is_labeled() {
        let container = ServiceContainer::new();
        container.auto_binding(
            "broken",
            Arc::new(|_| Err("wiring failure".into())),
            true,
            &[],
        );
        let error = container.resolve("broken", false).unwrap_err();
        assert!(matches!(error, ResolutionError::Constructor(key, _) if key == "broken"));
    }
}
