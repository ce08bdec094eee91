//! User handler and error handler contracts.

use crate::{
    error::{BoxError, HandlerError},
    event::IncomingEvent,
    response::OutgoingResponse,
};
use std::{future::Future, pin::Pin};

/// The terminal destination of the lifecycle: turns an event into a response.
///
/// Receives a fully owned event and performs async work.
///
/// # Example
///
/// ```rust,ignore
/// struct Health;
///
/// impl EventHandler for Health {
///     async fn handle(&self, _event: IncomingEvent) -> Result<OutgoingResponse, BoxError> {
///         Ok(OutgoingResponse::new(Some(json!("ok"))))
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an EventHandler",
    label = "missing `EventHandler` implementation",
    note = "Event handlers must implement `handle(IncomingEvent) -> Result<OutgoingResponse, _>`."
)]
pub trait EventHandler: Send + Sync + 'static {
    /// Handle the event, producing the outgoing response.
    fn handle(
        &self,
        event: IncomingEvent,
    ) -> impl Future<Output = Result<OutgoingResponse, BoxError>> + Send;
}

/// Dynamic object-safe version of [`EventHandler`].
pub trait DynEventHandler: Send + Sync + 'static {
    /// Handle the event (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        event: IncomingEvent,
    ) -> Pin<Box<dyn Future<Output = Result<OutgoingResponse, BoxError>> + Send + 'a>>;
}

impl<H: EventHandler> DynEventHandler for H {
    fn handle_dyn<'a>(
        &'a self,
        event: IncomingEvent,
    ) -> Pin<Box<dyn Future<Output = Result<OutgoingResponse, BoxError>> + Send + 'a>> {
        Box::pin(self.handle(event))
    }
}

// Plain async functions are event handlers.
impl<F, Fut> EventHandler for F
where
    F: Fn(IncomingEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<OutgoingResponse, BoxError>> + Send,
{
    fn handle(
        &self,
        event: IncomingEvent,
    ) -> impl Future<Output = Result<OutgoingResponse, BoxError>> + Send {
        (self)(event)
    }
}

/// Converts a failed lifecycle phase into a response.
///
/// The kernel delegates here exactly once per failed invocation; whatever
/// response this produces is returned to the caller in place of the error.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Convert the phase error and the current event into a response.
    fn handle(
        &self,
        error: HandlerError,
        event: IncomingEvent,
    ) -> impl Future<Output = Result<OutgoingResponse, BoxError>> + Send;
}

/// Dynamic object-safe version of [`ErrorHandler`].
pub trait DynErrorHandler: Send + Sync + 'static {
    /// Convert the error into a response (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        error: HandlerError,
        event: IncomingEvent,
    ) -> Pin<Box<dyn Future<Output = Result<OutgoingResponse, BoxError>> + Send + 'a>>;
}

impl<H: ErrorHandler> DynErrorHandler for H {
    fn handle_dyn<'a>(
        &'a self,
        error: HandlerError,
        event: IncomingEvent,
    ) -> Pin<Box<dyn Future<Output = Result<OutgoingResponse, BoxError>> + Send + 'a>> {
        Box::pin(self.handle(error, event))
    }
}

// Plain async functions are error handlers.
impl<F, Fut> ErrorHandler for F
where
    F: Fn(HandlerError, IncomingEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<OutgoingResponse, BoxError>> + Send,
{
    fn handle(
        &self,
        error: HandlerError,
        event: IncomingEvent,
    ) -> impl Future<Output = Result<OutgoingResponse, BoxError>> + Send {
        (self)(error, event)
    }
}
