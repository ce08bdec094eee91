//! Adapter event bridge.
//!
//! The contract a platform integration implements to connect its native
//! event/response pair to the lifecycle kernel. The bridge owns its own hook
//! registries - configured and triggered independently of the kernel's, with
//! no ordering relationship between the two - and its own error handler:
//! a failure while converting raw↔canonical shapes is a bridge failure,
//! resolved to a platform-valid response exactly once, never retried, and
//! never confused with a user-handler failure.

mod context;

pub use context::{AdapterContext, EventBuilder, ResponseBuilder};

use crate::{kernel::LifecycleKernel, pipeline::ComponentRef};
use futures::future::BoxFuture;
use gantry_core::{
    BoxError, BoxedService, BridgeError, DynHook, GantryError, Hook, InitializationError,
};
use std::{future::Future, sync::Arc};

/// Resolves a bridge-level failure into a platform-valid raw response.
pub trait AdapterErrorHandler<R, S, X>: Send + Sync + 'static {
    /// Convert the bridge error and the invocation context into a raw
    /// response the platform can deliver.
    fn handle(
        &self,
        error: BridgeError,
        context: &AdapterContext<R, S, X>,
    ) -> impl Future<Output = Result<S, BoxError>> + Send;
}

/// Dynamic object-safe version of [`AdapterErrorHandler`].
pub trait DynAdapterErrorHandler<R, S, X>: Send + Sync + 'static {
    /// Convert the bridge error (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        error: BridgeError,
        context: &'a AdapterContext<R, S, X>,
    ) -> BoxFuture<'a, Result<S, BoxError>>;
}

impl<R, S, X, H> DynAdapterErrorHandler<R, S, X> for H
where
    R: Send + Sync + 'static,
    S: Send + Sync + 'static,
    X: Send + Sync + 'static,
    H: AdapterErrorHandler<R, S, X>,
{
    fn handle_dyn<'a>(
        &'a self,
        error: BridgeError,
        context: &'a AdapterContext<R, S, X>,
    ) -> BoxFuture<'a, Result<S, BoxError>> {
        Box::pin(self.handle(error, context))
    }
}

impl<R, S, X> ComponentRef<dyn DynAdapterErrorHandler<R, S, X>>
where
    R: Send + Sync + 'static,
    S: Send + Sync + 'static,
    X: Send + Sync + 'static,
{
    /// Reference an adapter error handler instance directly.
    pub fn adapter_error_handler<H: AdapterErrorHandler<R, S, X>>(handler: H) -> Self {
        Self::Instance(Arc::new(handler))
    }

    /// Reference an adapter error handler registered in the container under
    /// `key` as the concrete type `H`.
    pub fn adapter_error_handler_service<H: AdapterErrorHandler<R, S, X>>(
        key: impl Into<String>,
    ) -> Self {
        Self::Service {
            key: key.into(),
            cast: Arc::new(
                |service: BoxedService| -> Option<Arc<dyn DynAdapterErrorHandler<R, S, X>>> {
                    let concrete = service.downcast::<H>().ok()?;
                    Some(concrete)
                },
            ),
        }
    }
}

/// The bridge's own hook registries, one list per stage.
///
/// Hooks are no-argument observers; platform state reaches them through
/// captures. These lists are independent of the kernel's registries.
#[derive(Default)]
pub struct AdapterHooks {
    on_init: Vec<Arc<dyn DynHook>>,
    on_prepare: Vec<Arc<dyn DynHook>>,
    before_handle: Vec<Arc<dyn DynHook>>,
    after_handle: Vec<Arc<dyn DynHook>>,
    on_terminate: Vec<Arc<dyn DynHook>>,
}

impl AdapterHooks {
    /// Empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an `onInit` hook.
    pub fn on_init(mut self, hook: impl Hook) -> Self {
        self.on_init.push(Arc::new(hook));
        self
    }

    /// Register an `onPrepare` hook.
    pub fn on_prepare(mut self, hook: impl Hook) -> Self {
        self.on_prepare.push(Arc::new(hook));
        self
    }

    /// Register a `beforeHandle` hook.
    pub fn before_handle(mut self, hook: impl Hook) -> Self {
        self.before_handle.push(Arc::new(hook));
        self
    }

    /// Register an `afterHandle` hook.
    pub fn after_handle(mut self, hook: impl Hook) -> Self {
        self.after_handle.push(Arc::new(hook));
        self
    }

    /// Register an `onTerminate` hook.
    pub fn on_terminate(mut self, hook: impl Hook) -> Self {
        self.on_terminate.push(Arc::new(hook));
        self
    }
}

/// Builder for [`AdapterBridge`].
pub struct AdapterBridgeBuilder<R, S, X> {
    kernel: Option<Arc<LifecycleKernel>>,
    event_builder: Option<Arc<dyn EventBuilder<R>>>,
    response_builder: Option<Arc<dyn ResponseBuilder<S>>>,
    error_handler: Option<Arc<dyn DynAdapterErrorHandler<R, S, X>>>,
    hooks: AdapterHooks,
}

impl<R, S, X> Default for AdapterBridgeBuilder<R, S, X> {
    fn default() -> Self {
        Self {
            kernel: None,
            event_builder: None,
            response_builder: None,
            error_handler: None,
            hooks: AdapterHooks::new(),
        }
    }
}

impl<R, S, X> AdapterBridgeBuilder<R, S, X>
where
    R: Send + Sync + 'static,
    S: Send + Sync + 'static,
    X: Send + Sync + 'static,
{
    /// Supply the lifecycle kernel to drive.
    pub fn kernel(mut self, kernel: Arc<LifecycleKernel>) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Supply the raw→canonical event builder.
    pub fn event_builder(mut self, builder: impl EventBuilder<R>) -> Self {
        self.event_builder = Some(Arc::new(builder));
        self
    }

    /// Supply the canonical→raw response builder.
    pub fn response_builder(mut self, builder: impl ResponseBuilder<S>) -> Self {
        self.response_builder = Some(Arc::new(builder));
        self
    }

    /// Supply the adapter-level error handler.
    pub fn error_handler(mut self, handler: impl AdapterErrorHandler<R, S, X>) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Supply an already-resolved adapter error handler (e.g. from a
    /// [`ComponentRef`] resolved through the container).
    pub fn resolved_error_handler(mut self, handler: Arc<dyn DynAdapterErrorHandler<R, S, X>>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Supply the adapter's hook registries.
    pub fn hooks(mut self, hooks: AdapterHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Verify all collaborators and produce the bridge.
    pub fn build(self) -> Result<AdapterBridge<R, S, X>, GantryError> {
        Ok(AdapterBridge {
            kernel: self.kernel.ok_or(InitializationError::Missing("kernel"))?,
            event_builder: self
                .event_builder
                .ok_or(InitializationError::Missing("event builder"))?,
            response_builder: self
                .response_builder
                .ok_or(InitializationError::Missing("response builder"))?,
            error_handler: self
                .error_handler
                .ok_or(InitializationError::Missing("adapter error handler"))?,
            hooks: self.hooks,
        })
    }
}

/// A platform integration's entry point into the kernel.
///
/// Generic over the platform's raw event `R`, raw response `S`, and ambient
/// execution context `X`. Like the kernel, the bridge holds no per-call
/// state; every invocation owns its [`AdapterContext`].
pub struct AdapterBridge<R, S, X> {
    kernel: Arc<LifecycleKernel>,
    event_builder: Arc<dyn EventBuilder<R>>,
    response_builder: Arc<dyn ResponseBuilder<S>>,
    error_handler: Arc<dyn DynAdapterErrorHandler<R, S, X>>,
    hooks: AdapterHooks,
}

impl<R, S, X> AdapterBridge<R, S, X>
where
    R: Send + Sync + 'static,
    S: Send + Sync + 'static,
    X: Send + Sync + 'static,
{
    /// Start building a bridge.
    pub fn builder() -> AdapterBridgeBuilder<R, S, X> {
        AdapterBridgeBuilder::default()
    }

    /// The platform's entry point: drive one raw event through the kernel
    /// and return the platform-shaped result.
    ///
    /// Bridge-level failures (hooks, conversions) are resolved by the
    /// adapter error handler exactly once; kernel-level failures never reach
    /// it. Adapter terminate hooks run unconditionally before returning.
    pub async fn run(&self, raw_event: R, execution: X) -> Result<S, GantryError> {
        let mut context = AdapterContext::new(raw_event, execution);

        let outcome = match self.execute(&mut context).await {
            Ok(()) => Ok(()),
            Err(GantryError::Bridge(error)) => {
                tracing::error!(error = %error, "adapter bridge failure");
                match self.error_handler.handle_dyn(error, &context).await {
                    Ok(raw) => {
                        context.set_raw_response(raw);
                        Ok(())
                    }
                    Err(failure) => Err(GantryError::ErrorHandler(failure)),
                }
            }
            Err(fatal) => Err(fatal),
        };

        for hook in &self.hooks.on_terminate {
            if let Err(error) = hook.call_dyn().await {
                tracing::error!(error = %error, "adapter terminate hook failed");
            }
        }

        outcome?;
        context
            .take_raw_response()
            .ok_or(GantryError::Bridge(BridgeError::MissingRawResponse))
    }

    async fn execute(&self, context: &mut AdapterContext<R, S, X>) -> Result<(), GantryError> {
        self.run_stage(&self.hooks.on_init).await?;
        self.run_stage(&self.hooks.on_prepare).await?;
        self.run_stage(&self.hooks.before_handle).await?;

        let event = self
            .event_builder
            .build(context.raw_event())
            .map_err(|e| GantryError::Bridge(BridgeError::EventConversion(e)))?;

        // Kernel errors propagate as-is: the kernel's own error handler has
        // already had its one chance, and a kernel failure must not be
        // re-routed through the adapter's.
        let response = self.kernel.handle(event).await?;

        let raw = self
            .response_builder
            .build(&response)
            .map_err(|e| GantryError::Bridge(BridgeError::ResponseConversion(e)))?;
        context.set_raw_response(raw);

        self.run_stage(&self.hooks.after_handle).await?;
        Ok(())
    }

    async fn run_stage(&self, hooks: &[Arc<dyn DynHook>]) -> Result<(), GantryError> {
        for hook in hooks {
            hook.call_dyn()
                .await
                .map_err(|e| GantryError::Bridge(BridgeError::Hook(e)))?;
        }
        Ok(())
    }
}
