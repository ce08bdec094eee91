//! Standard logging middleware.

use gantry_core::{BoxError, IncomingEvent, Middleware, Next};
use std::future::Future;

/// Pass-through middleware that traces each event entering the chain.
///
/// Emits a `debug` span-less record with the event's source tag, then hands
/// the event on unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    /// Create the middleware.
    pub fn new() -> Self {
        Self
    }
}

impl Middleware<IncomingEvent> for LoggingMiddleware {
    fn handle(
        &self,
        event: IncomingEvent,
        next: Next<IncomingEvent>,
    ) -> impl Future<Output = Result<IncomingEvent, BoxError>> + Send {
        async move {
            tracing::debug!(
                source = event.source(),
                metadata = event.metadata().len(),
                "event entering pipeline"
            );
            next.call(event).await
        }
    }
}
