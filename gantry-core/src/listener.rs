//! Domain event listener contract.

use crate::error::BoxError;
use serde_json::Value;
use std::{future::Future, pin::Pin};

/// A named domain event with a free-form payload.
#[derive(Clone, Debug)]
pub struct DomainEvent {
    name: String,
    payload: Value,
}

impl DomainEvent {
    /// Create an event.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// The event name listeners subscribe to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// Reacts to a domain event.
///
/// Listeners are side components: the emitter isolates each listener's
/// failure so one broken listener cannot block the others or the main
/// response.
pub trait Listener: Send + Sync + 'static {
    /// Called when a subscribed event is emitted.
    fn call(&self, event: &DomainEvent) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`Listener`].
pub trait DynListener: Send + Sync + 'static {
    /// Called when a subscribed event is emitted (dynamic dispatch version).
    fn call_dyn<'a>(
        &'a self,
        event: &'a DomainEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

impl<L: Listener> DynListener for L {
    fn call_dyn<'a>(
        &'a self,
        event: &'a DomainEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.call(event))
    }
}

// Closures work as listeners as long as their future owns its data.
impl<F, Fut> Listener for F
where
    F: Fn(&DomainEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn call(&self, event: &DomainEvent) -> impl Future<Output = Result<(), BoxError>> + Send {
        (self)(event)
    }
}
