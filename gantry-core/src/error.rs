//! Error types for Gantry.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`GantryError`] - Top-level error type for all Gantry operations
//! - [`InitializationError`] - A required collaborator was not supplied
//! - [`ResolutionError`] - A component reference could not become a callable
//! - [`HandlerError`] - Failure inside a lifecycle phase
//! - [`BridgeError`] - Failure at the adapter boundary
//! - [`ModelError`] - Invalid canonical model construction

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Gantry operations.
#[derive(Error, Debug)]
pub enum GantryError {
    /// A required collaborator was missing at construction.
    #[error("initialization error: {0}")]
    Initialization(#[from] InitializationError),

    /// A component reference could not be resolved to a callable.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// A lifecycle phase failed.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// The adapter boundary failed.
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The canonical model was constructed incorrectly.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// The configured error handler itself failed.
    #[error("error handler failed: {0}")]
    ErrorHandler(#[source] BoxError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// A required collaborator (container, blueprint, emitter, handler) was not
/// supplied at construction. Fatal and never recovered internally.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// A constructor argument was not provided.
    #[error("missing required collaborator: {0}")]
    Missing(&'static str),

    /// A mandatory blueprint entry was absent.
    #[error("missing blueprint entry: {0}")]
    MissingBlueprintEntry(&'static str),
}

/// A component reference could not be turned into a callable.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The container has no binding registered under the requested key.
    #[error("no binding registered for service: {0}")]
    MissingBinding(String),

    /// The container resolved the key to an instance of an unexpected type.
    #[error("binding for service {0} has an unexpected type")]
    TypeMismatch(String),

    /// The binding's constructor failed while instantiating the service.
    #[error("constructor failed for service {0}: {1}")]
    Constructor(String, #[source] BoxError),

    /// A component factory failed to produce a callable.
    #[error("component factory failed: {0}")]
    Factory(#[source] BoxError),
}

/// Failure raised inside a lifecycle phase, labeled with the phase that
/// produced it. Caught exactly once at the kernel boundary.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// A prepare hook failed.
    #[error("prepare hook failed: {0}")]
    Prepare(#[source] BoxError),

    /// A before-handle middleware failed.
    #[error("before-handle middleware failed: {0}")]
    Before(#[source] BoxError),

    /// The user event handler failed.
    #[error("event handler failed: {0}")]
    Handle(#[source] BoxError),

    /// An after-handle middleware failed.
    #[error("after-handle middleware failed: {0}")]
    After(#[source] BoxError),

    /// The after-handle chain returned a context without a response.
    #[error("after-handle chain dropped the response")]
    MissingResponse,
}

impl HandlerError {
    /// The lifecycle phase this error originated from.
    pub fn phase(&self) -> &'static str {
        match self {
            HandlerError::Prepare(_) => "onPrepare",
            HandlerError::Before(_) => "beforeHandle",
            HandlerError::Handle(_) => "handle",
            HandlerError::After(_) | HandlerError::MissingResponse => "afterHandle",
        }
    }
}

/// Failure while converting between raw and canonical shapes at the adapter
/// boundary. Handled by the adapter's own error handler, never the kernel's.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The raw platform event could not become a canonical event.
    #[error("failed to build canonical event: {0}")]
    EventConversion(#[source] BoxError),

    /// The canonical response could not become a platform response.
    #[error("failed to build platform response: {0}")]
    ResponseConversion(#[source] BoxError),

    /// An adapter-level hook failed.
    #[error("adapter hook failed: {0}")]
    Hook(#[source] BoxError),

    /// The bridge finished without a platform response to return.
    #[error("bridge produced no platform response")]
    MissingRawResponse,
}

/// Invalid construction of a canonical model value.
#[derive(Error, Debug)]
pub enum ModelError {
    /// An incoming event was built without its source identity tag.
    #[error("incoming event requires a source tag")]
    MissingSource,
}

// Convenience conversions
impl From<BoxError> for GantryError {
    fn from(err: BoxError) -> Self {
        GantryError::Custom(err)
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Handle(err)
    }
}
