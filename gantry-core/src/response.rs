//! Canonical outgoing response.

use serde_json::Value;
use std::collections::HashMap;

/// The canonical result container produced by the user handler (or an error
/// handler) and progressively decorated by after-handle stages.
///
/// Holds an optional content value (`None` represents "no body"), an optional
/// status-like field, and a headers-like metadata map. Serialization to any
/// wire format is an adapter concern; this type only guarantees a stable,
/// introspectable shape.
#[derive(Clone, Debug, Default)]
pub struct OutgoingResponse {
    content: Option<Value>,
    status: Option<u16>,
    metadata: HashMap<String, Value>,
    modified: bool,
}

impl OutgoingResponse {
    /// Create a response with the given content.
    pub fn new(content: Option<Value>) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Create a response with no body.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the status-like field during construction.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a metadata entry during construction.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The current content value.
    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    /// Replace the content, recording the mutation.
    pub fn set_content(&mut self, content: Option<Value>) {
        self.content = content;
        self.modified = true;
    }

    /// The status-like field, if set.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Replace the status-like field, recording the mutation.
    pub fn set_status(&mut self, status: Option<u16>) {
        self.status = status;
        self.modified = true;
    }

    /// The headers-like metadata map.
    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    /// Attach or replace a metadata entry, recording the mutation.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.modified = true;
        self.metadata.insert(key.into(), value)
    }

    /// Whether any setter has run since construction.
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}
