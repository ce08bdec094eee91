//! Per-invocation adapter state and the raw↔canonical builders.

use gantry_core::{BoxError, IncomingEvent, OutgoingResponse};

/// Builds the canonical event from the platform's raw event.
pub trait EventBuilder<R>: Send + Sync + 'static {
    /// Convert the raw event. Failure becomes a bridge-level error, handled
    /// by the adapter's error handler - never the kernel's.
    fn build(&self, raw: &R) -> Result<IncomingEvent, BoxError>;
}

impl<R, F> EventBuilder<R> for F
where
    F: Fn(&R) -> Result<IncomingEvent, BoxError> + Send + Sync + 'static,
{
    fn build(&self, raw: &R) -> Result<IncomingEvent, BoxError> {
        (self)(raw)
    }
}

/// Builds the platform's raw response from the canonical response.
pub trait ResponseBuilder<S>: Send + Sync + 'static {
    /// Convert the canonical response into the platform shape.
    fn build(&self, response: &OutgoingResponse) -> Result<S, BoxError>;
}

impl<S, F> ResponseBuilder<S> for F
where
    F: Fn(&OutgoingResponse) -> Result<S, BoxError> + Send + Sync + 'static,
{
    fn build(&self, response: &OutgoingResponse) -> Result<S, BoxError> {
        (self)(response)
    }
}

/// Per-invocation state owned by the adapter event bridge.
///
/// Carries the raw platform event, the raw response once produced, and the
/// platform's ambient execution context (e.g. a timeout or cancellation
/// handle, passed through opaquely - the kernel imposes no deadlines of its
/// own). The context is consumed when the invocation completes, on both the
/// success and failure paths.
#[derive(Debug)]
pub struct AdapterContext<R, S, X> {
    raw_event: R,
    raw_response: Option<S>,
    execution: X,
}

impl<R, S, X> AdapterContext<R, S, X> {
    /// Create the context for one invocation.
    pub fn new(raw_event: R, execution: X) -> Self {
        Self {
            raw_event,
            raw_response: None,
            execution,
        }
    }

    /// The platform's raw event.
    pub fn raw_event(&self) -> &R {
        &self.raw_event
    }

    /// The platform's ambient execution context.
    pub fn execution(&self) -> &X {
        &self.execution
    }

    /// The raw response, once one has been produced.
    pub fn raw_response(&self) -> Option<&S> {
        self.raw_response.as_ref()
    }

    /// Record the produced raw response.
    pub fn set_raw_response(&mut self, response: S) {
        self.raw_response = Some(response);
    }

    /// Take ownership of the raw response, finalizing the context.
    pub fn take_raw_response(&mut self) -> Option<S> {
        self.raw_response.take()
    }
}
