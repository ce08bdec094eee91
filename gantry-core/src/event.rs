//! Canonical incoming event.

use crate::error::ModelError;
use serde_json::Value;
use std::{any::Any, collections::HashMap, fmt, sync::Arc};

/// The canonical, platform-agnostic representation of a raw event.
///
/// Created exactly once per request by the adapter event bridge, then read by
/// every pipeline stage and by the user handler. Stages may attach metadata
/// as the event flows through the chain, but the identity of the event (its
/// `source` tag) is never replaced mid-lifecycle.
///
/// # Example
///
/// ```rust
/// use gantry_core::IncomingEvent;
/// use serde_json::json;
///
/// let event = IncomingEvent::builder()
///     .source("http")
///     .metadata("path", json!("/health"))
///     .build()
///     .unwrap();
/// assert_eq!(event.source(), "http");
/// ```
#[derive(Clone)]
pub struct IncomingEvent {
    source: String,
    metadata: HashMap<String, Value>,
    raw: Option<Arc<dyn Any + Send + Sync>>,
}

impl IncomingEvent {
    /// Start building an event.
    pub fn builder() -> IncomingEventBuilder {
        IncomingEventBuilder::new()
    }

    /// The tag identifying the originating platform (e.g. `"http"`, `"cli"`).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All metadata attached to this event.
    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    /// Look up a single metadata entry.
    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Attach or replace a metadata entry, returning the previous value.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.metadata.insert(key.into(), value)
    }

    /// Borrow the platform-specific raw payload, if one was attached and its
    /// type matches.
    pub fn raw<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.raw.as_deref().and_then(|raw| raw.downcast_ref())
    }
}

impl fmt::Debug for IncomingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingEvent")
            .field("source", &self.source)
            .field("metadata", &self.metadata)
            .field("raw", &self.raw.as_ref().map(|_| "<raw payload>"))
            .finish()
    }
}

/// Builder for [`IncomingEvent`].
#[derive(Default)]
pub struct IncomingEventBuilder {
    source: Option<String>,
    metadata: HashMap<String, Value>,
    raw: Option<Arc<dyn Any + Send + Sync>>,
}

impl IncomingEventBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source identity tag. Required.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Attach the platform-specific raw payload reference.
    pub fn raw<T: Any + Send + Sync>(mut self, raw: T) -> Self {
        self.raw = Some(Arc::new(raw));
        self
    }

    /// Build the event.
    ///
    /// Fails with [`ModelError::MissingSource`] when no source tag was set.
    pub fn build(self) -> Result<IncomingEvent, ModelError> {
        let source = self.source.ok_or(ModelError::MissingSource)?;
        Ok(IncomingEvent {
            source,
            metadata: self.metadata,
            raw: self.raw,
        })
    }
}
