//! Lifecycle stage hooks.
//!
//! Two shapes exist:
//!
//! - [`Hook`] - a no-argument stage hook (`onPrepare`, and every adapter
//!   stage). Hooks observe lifecycle progress; platform state reaches them
//!   through captures.
//! - [`ContextHook`] - receives the [`HookContext`] of the invocation
//!   (`onTerminate`). The response may be absent when failure occurred
//!   before one was produced.
//!
//! Termination hooks are invoked unconditionally; the kernel logs and
//! swallows their errors so they can never mask the primary result.

use crate::{context::HookContext, error::BoxError};
use std::{future::Future, pin::Pin};

/// A no-argument lifecycle stage hook.
pub trait Hook: Send + Sync + 'static {
    /// Called when the stage is reached.
    fn call(&self) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`Hook`].
pub trait DynHook: Send + Sync + 'static {
    /// Called when the stage is reached (dynamic dispatch version).
    fn call_dyn<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

impl<H: Hook> DynHook for H {
    fn call_dyn<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.call())
    }
}

// Plain async functions are hooks.
impl<F, Fut> Hook for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn call(&self) -> impl Future<Output = Result<(), BoxError>> + Send {
        (self)()
    }
}

/// A hook that receives the invocation's [`HookContext`].
pub trait ContextHook: Send + Sync + 'static {
    /// Called with the event and, when one was produced, the response.
    fn call(&self, ctx: &HookContext) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`ContextHook`].
pub trait DynContextHook: Send + Sync + 'static {
    /// Called with the invocation context (dynamic dispatch version).
    fn call_dyn<'a>(
        &'a self,
        ctx: &'a HookContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

impl<H: ContextHook> DynContextHook for H {
    fn call_dyn<'a>(
        &'a self,
        ctx: &'a HookContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.call(ctx))
    }
}

// Closures work as context hooks as long as their future owns its data
// (clone out of the borrowed context before going async).
impl<F, Fut> ContextHook for F
where
    F: Fn(&HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn call(&self, ctx: &HookContext) -> impl Future<Output = Result<(), BoxError>> + Send {
        (self)(ctx)
    }
}
