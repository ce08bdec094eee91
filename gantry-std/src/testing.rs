//! Testing utilities for Gantry.
//!
//! Recording and failing doubles for every component shape the kernel
//! accepts. Recorders share an `Arc<Mutex<_>>` log so a test can keep a
//! handle while the kernel owns the component.
//!
//! # Example
//!
//! ```rust,ignore
//! let log = marker_log();
//! let chain = compose(vec![
//!     PipelineEntry::new(RecordingMiddleware::new("auth", Arc::clone(&log))),
//! ], &PipelineOptions::default());
//!
//! chain.run(event).await?;
//! assert_eq!(*log.lock().unwrap(), vec!["auth"]);
//! ```

use gantry_core::{
    BoxError, ContextHook, DomainEvent, ErrorHandler, EventHandler, HandlerError, Hook,
    HookContext, IncomingEvent, Listener, Middleware, Next, OutgoingResponse, Payload,
    ServiceConstructor,
};
use serde_json::json;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

/// The error every failing double raises.
#[derive(Debug, Error)]
#[error("injected failure: {0}")]
pub struct InjectedFailure(pub String);

/// Shared marker log recorders append to.
pub type MarkerLog = Arc<Mutex<Vec<String>>>;

/// Create an empty marker log.
pub fn marker_log() -> MarkerLog {
    Arc::new(Mutex::new(Vec::new()))
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware that appends its marker to the log, then continues the chain.
///
/// Generic over the payload, so the same double serves before-handle chains
/// (event payload) and after-handle chains (context payload).
pub struct RecordingMiddleware {
    marker: String,
    log: MarkerLog,
}

impl RecordingMiddleware {
    /// Create a recorder with the given marker.
    pub fn new(marker: impl Into<String>, log: MarkerLog) -> Self {
        Self {
            marker: marker.into(),
            log,
        }
    }
}

impl<P: Payload> Middleware<P> for RecordingMiddleware {
    async fn handle(&self, payload: P, next: Next<P>) -> Result<P, BoxError> {
        self.log.lock().unwrap().push(self.marker.clone());
        next.call(payload).await
    }
}

/// Middleware that records its marker and returns without calling `next`.
pub struct ShortCircuitMiddleware {
    marker: String,
    log: MarkerLog,
}

impl ShortCircuitMiddleware {
    /// Create a short-circuiting recorder.
    pub fn new(marker: impl Into<String>, log: MarkerLog) -> Self {
        Self {
            marker: marker.into(),
            log,
        }
    }
}

impl<P: Payload> Middleware<P> for ShortCircuitMiddleware {
    async fn handle(&self, payload: P, _next: Next<P>) -> Result<P, BoxError> {
        self.log.lock().unwrap().push(self.marker.clone());
        Ok(payload)
    }
}

/// Middleware that raises an [`InjectedFailure`].
pub struct FailingMiddleware {
    message: String,
}

impl FailingMiddleware {
    /// Create a failing middleware with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<P: Payload> Middleware<P> for FailingMiddleware {
    async fn handle(&self, _payload: P, _next: Next<P>) -> Result<P, BoxError> {
        Err(InjectedFailure(self.message.clone()).into())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler that returns a clone of a preconfigured response.
pub struct FixedHandler {
    response: OutgoingResponse,
}

impl FixedHandler {
    /// Create a handler that always produces `response`.
    pub fn new(response: OutgoingResponse) -> Self {
        Self { response }
    }

    /// Shorthand for a handler whose content is the JSON string `"ok"`.
    pub fn ok() -> Self {
        Self::new(OutgoingResponse::new(Some(json!("ok"))))
    }
}

impl EventHandler for FixedHandler {
    async fn handle(&self, _event: IncomingEvent) -> Result<OutgoingResponse, BoxError> {
        Ok(self.response.clone())
    }
}

/// Handler whose response content echoes the event's source tag.
#[derive(Clone, Copy, Default)]
pub struct EchoHandler;

impl EventHandler for EchoHandler {
    async fn handle(&self, event: IncomingEvent) -> Result<OutgoingResponse, BoxError> {
        Ok(OutgoingResponse::new(Some(json!(event.source()))))
    }
}

/// Handler that raises an [`InjectedFailure`].
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Create a failing handler with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl EventHandler for FailingHandler {
    async fn handle(&self, _event: IncomingEvent) -> Result<OutgoingResponse, BoxError> {
        Err(InjectedFailure(self.message.clone()).into())
    }
}

// ============================================================================
// Error handlers
// ============================================================================

/// Error handler that records the failed phase of every error it sees and
/// returns a clone of a preconfigured fallback response.
pub struct RecordingErrorHandler {
    response: OutgoingResponse,
    seen: MarkerLog,
}

impl RecordingErrorHandler {
    /// Create a handler producing `response`, recording phases into `seen`.
    pub fn new(response: OutgoingResponse, seen: MarkerLog) -> Self {
        Self { response, seen }
    }

    /// Shorthand for the conventional fallback: content `"error"`, metadata
    /// `code: 500`.
    pub fn fallback(seen: MarkerLog) -> Self {
        Self::new(
            OutgoingResponse::new(Some(json!("error"))).with_metadata("code", json!(500)),
            seen,
        )
    }
}

impl ErrorHandler for RecordingErrorHandler {
    async fn handle(
        &self,
        error: HandlerError,
        _event: IncomingEvent,
    ) -> Result<OutgoingResponse, BoxError> {
        self.seen.lock().unwrap().push(error.phase().to_string());
        Ok(self.response.clone())
    }
}

/// Error handler that itself raises an [`InjectedFailure`].
pub struct FailingErrorHandler {
    message: String,
}

impl FailingErrorHandler {
    /// Create a failing error handler with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ErrorHandler for FailingErrorHandler {
    async fn handle(
        &self,
        _error: HandlerError,
        _event: IncomingEvent,
    ) -> Result<OutgoingResponse, BoxError> {
        Err(InjectedFailure(self.message.clone()).into())
    }
}

// ============================================================================
// Hooks
// ============================================================================

/// No-argument hook that appends its marker to the log.
pub struct RecordingHook {
    marker: String,
    log: MarkerLog,
}

impl RecordingHook {
    /// Create a recording hook.
    pub fn new(marker: impl Into<String>, log: MarkerLog) -> Self {
        Self {
            marker: marker.into(),
            log,
        }
    }
}

impl Hook for RecordingHook {
    async fn call(&self) -> Result<(), BoxError> {
        self.log.lock().unwrap().push(self.marker.clone());
        Ok(())
    }
}

/// No-argument hook that raises an [`InjectedFailure`].
pub struct FailingHook {
    message: String,
}

impl FailingHook {
    /// Create a failing hook with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Hook for FailingHook {
    async fn call(&self) -> Result<(), BoxError> {
        Err(InjectedFailure(self.message.clone()).into())
    }
}

/// Context hook that records a clone of every context it receives.
///
/// Cloning shares the underlying log, so keep one clone to inspect after the
/// kernel has run.
#[derive(Clone, Default)]
pub struct RecordingContextHook {
    contexts: Arc<Mutex<Vec<HookContext>>>,
}

impl RecordingContextHook {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The contexts seen so far.
    pub fn seen(&self) -> Vec<HookContext> {
        self.contexts.lock().unwrap().clone()
    }
}

impl ContextHook for RecordingContextHook {
    async fn call(&self, ctx: &HookContext) -> Result<(), BoxError> {
        self.contexts.lock().unwrap().push(ctx.clone());
        Ok(())
    }
}

/// Context hook that raises an [`InjectedFailure`].
pub struct FailingContextHook {
    message: String,
}

impl FailingContextHook {
    /// Create a failing context hook with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ContextHook for FailingContextHook {
    async fn call(&self, _ctx: &HookContext) -> Result<(), BoxError> {
        Err(InjectedFailure(self.message.clone()).into())
    }
}

// ============================================================================
// Listeners
// ============================================================================

/// Listener that records the name of every event it receives.
pub struct RecordingListener {
    log: MarkerLog,
}

impl RecordingListener {
    /// Create a recording listener.
    pub fn new(log: MarkerLog) -> Self {
        Self { log }
    }
}

impl Listener for RecordingListener {
    async fn call(&self, event: &DomainEvent) -> Result<(), BoxError> {
        self.log.lock().unwrap().push(event.name().to_string());
        Ok(())
    }
}

/// Listener that raises an [`InjectedFailure`].
pub struct FailingListener {
    message: String,
}

impl FailingListener {
    /// Create a failing listener with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Listener for FailingListener {
    async fn call(&self, _event: &DomainEvent) -> Result<(), BoxError> {
        Err(InjectedFailure(self.message.clone()).into())
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Wrap a builder closure into a [`ServiceConstructor`] that counts each
/// invocation. Used to assert that component resolution happens once per
/// composition, not once per request.
pub fn counting_constructor<T, F>(count: Arc<AtomicUsize>, build: F) -> ServiceConstructor
where
    T: Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    Arc::new(move |_container| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(build()))
    })
}
