//! Domain event fan-out with per-listener isolation.
//!
//! Listeners of any shape (instance, container service, factory) are
//! normalized through the same [`ComponentRef`] resolver used for middleware,
//! then invoked sequentially in registration order. Each listener runs behind
//! its own error guard: one failing listener is logged and skipped, never
//! allowed to block the others or the main response.

use crate::pipeline::ComponentRef;
use gantry_core::{BoxedService, Container, DomainEvent, DynListener, Listener, ResolutionError};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

impl ComponentRef<dyn DynListener> {
    /// Reference a listener instance directly.
    pub fn listener<L: Listener>(listener: L) -> Self {
        Self::Instance(Arc::new(listener))
    }

    /// Reference a listener registered in the container under `key` as the
    /// concrete type `L`.
    pub fn listener_service<L: Listener>(key: impl Into<String>) -> Self {
        Self::Service {
            key: key.into(),
            cast: Arc::new(|service: BoxedService| -> Option<Arc<dyn DynListener>> {
                let concrete = service.downcast::<L>().ok()?;
                Some(concrete)
            }),
        }
    }
}

/// The event bus the kernel publishes lifecycle events through.
///
/// Registration happens during boot; emission reads a snapshot of the
/// listener list, so emitting never holds a lock across listener execution.
#[derive(Default)]
pub struct EventEmitter {
    listeners: RwLock<HashMap<String, Vec<Arc<dyn DynListener>>>>,
}

impl EventEmitter {
    /// Create an emitter with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a mixed-shape listener reference, resolving it through the
    /// container now (boot time), not at emission time.
    pub fn on(
        &self,
        name: impl Into<String>,
        reference: ComponentRef<dyn DynListener>,
        container: &dyn Container,
    ) -> Result<(), ResolutionError> {
        let listener = reference.resolve(container)?;
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.entry(name.into()).or_default().push(listener);
        Ok(())
    }

    /// Subscribe a ready listener instance.
    pub fn subscribe(&self, name: impl Into<String>, listener: impl Listener) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners
            .entry(name.into())
            .or_default()
            .push(Arc::new(listener));
    }

    /// Number of listeners subscribed to an event name.
    pub fn listener_count(&self, name: &str) -> usize {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        listeners.get(name).map_or(0, Vec::len)
    }

    /// Fan the event out to its listeners in registration order.
    ///
    /// Returns how many listeners completed successfully; failures are
    /// logged and isolated per listener.
    pub async fn emit(&self, event: &DomainEvent) -> usize {
        let snapshot: Vec<Arc<dyn DynListener>> = {
            let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
            listeners.get(event.name()).cloned().unwrap_or_default()
        };

        let mut delivered = 0;
        for listener in &snapshot {
            match listener.call_dyn(event).await {
                Ok(()) => delivered += 1,
                Err(error) => {
                    tracing::error!(event = event.name(), error = %error, "listener failed");
                }
            }
        }
        delivered
    }
}
