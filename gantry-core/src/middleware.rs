//! Middleware contract and the continuation that threads a chain.
//!
//! A middleware receives the payload and a [`Next`] continuation. Calling
//! `next.call(payload)` passes control to the remaining entries; returning
//! without calling it short-circuits the rest of the chain. The engine does
//! not catch errors - anything an entry raises propagates to the caller.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Middleware`] uses native `async fn` for zero-cost static dispatch. The
//! composed chain stores entries as [`DynMiddleware`] trait objects; the
//! blanket implementation converts automatically.

use crate::{error::BoxError, payload::Payload};
use std::{future::Future, pin::Pin, sync::Arc};

/// A single processing unit in a pipeline.
///
/// # Example
///
/// ```rust,ignore
/// struct Auth;
///
/// impl Middleware<IncomingEvent> for Auth {
///     async fn handle(
///         &self,
///         mut event: IncomingEvent,
///         next: Next<IncomingEvent>,
///     ) -> Result<IncomingEvent, BoxError> {
///         event.set_metadata("authenticated", json!(true));
///         next.call(event).await
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Middleware<{P}>`",
    label = "missing `Middleware` implementation",
    note = "Middleware must implement `handle` for the payload type `{P}`."
)]
pub trait Middleware<P: Payload>: Send + Sync + 'static {
    /// Process the payload, either continuing the chain via `next` or
    /// short-circuiting by returning directly.
    fn handle(&self, payload: P, next: Next<P>)
    -> impl Future<Output = Result<P, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Middleware`].
///
/// Use this trait when middleware must be stored in a chain or registry.
pub trait DynMiddleware<P: Payload>: Send + Sync + 'static {
    /// Process the payload (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        payload: P,
        next: Next<P>,
    ) -> Pin<Box<dyn Future<Output = Result<P, BoxError>> + Send + 'a>>;
}

// Blanket implementation: any Middleware is a DynMiddleware automatically.
impl<P: Payload, M: Middleware<P>> DynMiddleware<P> for M {
    fn handle_dyn<'a>(
        &'a self,
        payload: P,
        next: Next<P>,
    ) -> Pin<Box<dyn Future<Output = Result<P, BoxError>> + Send + 'a>> {
        Box::pin(self.handle(payload, next))
    }
}

// Plain async functions are middleware.
impl<P, F, Fut> Middleware<P> for F
where
    P: Payload,
    F: Fn(P, Next<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, BoxError>> + Send,
{
    fn handle(
        &self,
        payload: P,
        next: Next<P>,
    ) -> impl Future<Output = Result<P, BoxError>> + Send {
        (self)(payload, next)
    }
}

// Allow a shared trait object to be used where Middleware is expected,
// e.g. nesting one composed chain inside another.
impl<P: Payload> Middleware<P> for Arc<dyn DynMiddleware<P>> {
    async fn handle(&self, payload: P, next: Next<P>) -> Result<P, BoxError> {
        self.as_ref().handle_dyn(payload, next).await
    }
}

/// The continuation handed to each middleware.
///
/// Holds the shared, immutable entry stack plus the position of the next
/// entry. The stack is never mutated after composition, so a `Next` can be
/// created and consumed concurrently across invocations.
pub struct Next<P: Payload> {
    stack: Arc<[Arc<dyn DynMiddleware<P>>]>,
    index: usize,
}

impl<P: Payload> Next<P> {
    /// Create a continuation positioned at the start of a stack.
    pub fn new(stack: Arc<[Arc<dyn DynMiddleware<P>>]>) -> Self {
        Self { stack, index: 0 }
    }

    /// A continuation over no entries: `call` returns the payload unchanged.
    /// Handy for exercising a middleware in isolation.
    pub fn empty() -> Self {
        Self::new(Arc::from(Vec::new()))
    }

    /// How many entries remain, including the one `call` would invoke next.
    pub fn remaining(&self) -> usize {
        self.stack.len() - self.index
    }

    /// Pass the payload to the next entry; when the stack is exhausted the
    /// payload is returned unchanged.
    pub async fn call(self, payload: P) -> Result<P, BoxError> {
        match self.stack.get(self.index).cloned() {
            Some(entry) => {
                let next = Next {
                    stack: self.stack,
                    index: self.index + 1,
                };
                entry.as_ref().handle_dyn(payload, next).await
            }
            None => Ok(payload),
        }
    }
}

impl<P: Payload> Clone for Next<P> {
    fn clone(&self) -> Self {
        Self {
            stack: Arc::clone(&self.stack),
            index: self.index,
        }
    }
}
