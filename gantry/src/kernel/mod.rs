//! Lifecycle kernel.
//!
//! Orchestrates the fixed phase sequence around the user handler:
//!
//! ```text
//! onInit (construction) → onPrepare → beforeHandle(chain)
//!     → handle(user handler) → afterHandle(chain) → onTerminate
//! ```
//!
//! Any error raised in a phase is caught exactly once at the kernel boundary
//! and converted into a response by the configured error handler; terminate
//! hooks then run unconditionally with whatever context is available. The
//! kernel holds no per-call state - a single instance is built once per
//! application boot and serves many invocations, concurrently.

use crate::{
    emitter::EventEmitter,
    pipeline::{
        Chain, ComponentDescriptor, ComponentKind, ComponentRef, PipelineOptions, compose,
        resolve_entries,
    },
};
use gantry_core::{
    Blueprint, Container, DomainEvent, DynContextHook, DynErrorHandler, DynEventHandler, DynHook,
    DynMiddleware, GantryError, HandlerError, HookContext, IncomingEvent, InitializationError,
    OutgoingResponse,
};
use serde_json::json;
use std::sync::Arc;

/// Blueprint keys the kernel consults at construction.
pub mod keys {
    /// `Vec<ComponentDescriptor<dyn DynMiddleware<IncomingEvent>>>` - the
    /// before-handle middleware list.
    pub const MIDDLEWARE_BEFORE: &str = "kernel.middleware.before";
    /// `Vec<ComponentDescriptor<dyn DynMiddleware<HookContext>>>` - the
    /// after-handle middleware list.
    pub const MIDDLEWARE_AFTER: &str = "kernel.middleware.after";
    /// `i32` - effective priority for entries without an explicit one.
    pub const DEFAULT_PRIORITY: &str = "kernel.middleware.default_priority";
    /// `String` - the platform tag this kernel runs under; middleware
    /// restricted to another platform is skipped at composition.
    pub const PLATFORM: &str = "kernel.platform";
    /// `ComponentRef<dyn DynEventHandler>` - the user handler. Required.
    pub const HANDLER: &str = "kernel.handler";
    /// `ComponentRef<dyn DynErrorHandler>` - the error handler. Required.
    pub const ERROR_HANDLER: &str = "kernel.error_handler";
    /// `Vec<ComponentRef<dyn DynHook>>` - prepare hooks.
    pub const ON_PREPARE: &str = "kernel.hooks.on_prepare";
    /// `Vec<ComponentRef<dyn DynContextHook>>` - terminate hooks.
    pub const ON_TERMINATE: &str = "kernel.hooks.on_terminate";
}

/// Domain event names the kernel emits after each invocation.
///
/// The payload carries the event source and a `recovered` flag telling
/// whether the invocation ultimately produced a response.
pub mod events {
    /// Emitted when every phase completed and the handler's response was
    /// returned untouched.
    pub const EVENT_HANDLED: &str = "kernel.event.handled";
    /// Emitted when a phase failed. `recovered` is `true` when the error
    /// handler converted the failure into a response, `false` when the
    /// invocation rejected.
    pub const EVENT_FAILED: &str = "kernel.event.failed";
}

/// Which shape the configured user handler was supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// A plain function (ready instance or factory-produced).
    Function,
    /// A container-resolved lifecycle object.
    Lifecycle,
}

/// Builder for [`LifecycleKernel`]. Collaborators are passed explicitly -
/// never ambient global state - so multiple kernels can coexist in one
/// process.
#[derive(Default)]
pub struct KernelBuilder {
    container: Option<Arc<dyn Container>>,
    blueprint: Option<Arc<Blueprint>>,
    emitter: Option<Arc<EventEmitter>>,
}

impl KernelBuilder {
    /// Supply the dependency container.
    pub fn container(mut self, container: Arc<dyn Container>) -> Self {
        self.container = Some(container);
        self
    }

    /// Supply the blueprint settings store.
    pub fn blueprint(mut self, blueprint: Arc<Blueprint>) -> Self {
        self.blueprint = Some(blueprint);
        self
    }

    /// Supply the domain event emitter.
    pub fn emitter(mut self, emitter: Arc<EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Run `onInit`: verify collaborators, resolve the handler and error
    /// handler, and compose both middleware chains from the blueprint.
    ///
    /// Fails with [`InitializationError`] when a collaborator or mandatory
    /// blueprint entry is missing, and with a resolution error when a
    /// configured component cannot become a callable.
    pub fn build(self) -> Result<LifecycleKernel, GantryError> {
        let container = self
            .container
            .ok_or(InitializationError::Missing("container"))?;
        let blueprint = self
            .blueprint
            .ok_or(InitializationError::Missing("blueprint"))?;
        let emitter = self.emitter.ok_or(InitializationError::Missing("emitter"))?;

        let options = PipelineOptions {
            default_priority: blueprint.get_or(keys::DEFAULT_PRIORITY, 10i32),
        };
        let platform = blueprint.get::<String>(keys::PLATFORM);

        let before_descriptors: Vec<ComponentDescriptor<dyn DynMiddleware<IncomingEvent>>> =
            blueprint.get(keys::MIDDLEWARE_BEFORE).unwrap_or_default();
        let before = compose(
            resolve_entries(&before_descriptors, container.as_ref(), platform.as_deref())?,
            &options,
        );

        let after_descriptors: Vec<ComponentDescriptor<dyn DynMiddleware<HookContext>>> =
            blueprint.get(keys::MIDDLEWARE_AFTER).unwrap_or_default();
        let after = compose(
            resolve_entries(&after_descriptors, container.as_ref(), platform.as_deref())?,
            &options,
        );

        let handler_ref: ComponentRef<dyn DynEventHandler> = blueprint
            .get(keys::HANDLER)
            .ok_or(InitializationError::MissingBlueprintEntry(keys::HANDLER))?;
        let handler_kind = match handler_ref.kind() {
            ComponentKind::Service => HandlerKind::Lifecycle,
            ComponentKind::Instance | ComponentKind::Factory => HandlerKind::Function,
        };
        let handler = handler_ref.resolve(container.as_ref())?;

        // A kernel without an error handler cannot honor the no-rejection
        // guarantee, so its absence is a fatal misconfiguration.
        let error_handler_ref: ComponentRef<dyn DynErrorHandler> =
            blueprint
                .get(keys::ERROR_HANDLER)
                .ok_or(InitializationError::MissingBlueprintEntry(
                    keys::ERROR_HANDLER,
                ))?;
        let error_handler = error_handler_ref.resolve(container.as_ref())?;

        let on_prepare = blueprint
            .get::<Vec<ComponentRef<dyn DynHook>>>(keys::ON_PREPARE)
            .unwrap_or_default()
            .iter()
            .map(|reference| reference.resolve(container.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let on_terminate = blueprint
            .get::<Vec<ComponentRef<dyn DynContextHook>>>(keys::ON_TERMINATE)
            .unwrap_or_default()
            .iter()
            .map(|reference| reference.resolve(container.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LifecycleKernel {
            container,
            blueprint,
            emitter,
            handler,
            handler_kind,
            error_handler,
            before,
            after,
            on_prepare,
            on_terminate,
        })
    }
}

/// The lifecycle orchestrator.
///
/// Built once per application boot, invoked repeatedly and concurrently by
/// one or more adapters. All per-request state lives in the event/response
/// pair passed through each call.
pub struct LifecycleKernel {
    container: Arc<dyn Container>,
    blueprint: Arc<Blueprint>,
    emitter: Arc<EventEmitter>,
    handler: Arc<dyn DynEventHandler>,
    handler_kind: HandlerKind,
    error_handler: Arc<dyn DynErrorHandler>,
    before: Chain<IncomingEvent>,
    after: Chain<HookContext>,
    on_prepare: Vec<Arc<dyn DynHook>>,
    on_terminate: Vec<Arc<dyn DynContextHook>>,
}

impl std::fmt::Debug for LifecycleKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleKernel")
            .field("handler_kind", &self.handler_kind)
            .finish_non_exhaustive()
    }
}

impl LifecycleKernel {
    /// Start building a kernel.
    pub fn builder() -> KernelBuilder {
        KernelBuilder::default()
    }

    /// The container this kernel resolves components through.
    pub fn container(&self) -> &Arc<dyn Container> {
        &self.container
    }

    /// The blueprint this kernel was configured from.
    pub fn blueprint(&self) -> &Arc<Blueprint> {
        &self.blueprint
    }

    /// The emitter this kernel publishes lifecycle events through.
    pub fn emitter(&self) -> &Arc<EventEmitter> {
        &self.emitter
    }

    /// Whether the user handler is function-shaped or a lifecycle object.
    pub fn handler_kind(&self) -> HandlerKind {
        self.handler_kind
    }

    /// The registered prepare hooks.
    pub fn on_prepare_hooks(&self) -> &[Arc<dyn DynHook>] {
        &self.on_prepare
    }

    /// The registered terminate hooks.
    pub fn on_terminate_hooks(&self) -> &[Arc<dyn DynContextHook>] {
        &self.on_terminate
    }

    /// Number of entries in the before-handle chain.
    pub fn before_middleware_count(&self) -> usize {
        self.before.len()
    }

    /// Number of entries in the after-handle chain.
    pub fn after_middleware_count(&self) -> usize {
        self.after.len()
    }

    /// Run the prepare hooks alone, outside a full invocation (adapter
    /// warm-up).
    pub async fn before_handle(&self) -> Result<(), GantryError> {
        for hook in &self.on_prepare {
            hook.call_dyn()
                .await
                .map_err(|e| GantryError::Handler(HandlerError::Prepare(e)))?;
        }
        Ok(())
    }

    /// Drive the full lifecycle for one event.
    ///
    /// Never rejects on phase failure: the configured error handler converts
    /// it to a response. The only `Err` path is the error handler itself
    /// failing, surfaced as [`GantryError::ErrorHandler`]. Terminate hooks
    /// run unconditionally before this returns.
    pub async fn handle(&self, event: IncomingEvent) -> Result<OutgoingResponse, GantryError> {
        let (ctx, phase_failed, outcome) = match self.run_phases(event).await {
            Ok((ctx, response)) => (ctx, false, Ok(response)),
            Err((mut ctx, error)) => {
                tracing::debug!(phase = error.phase(), error = %error, "lifecycle phase failed");
                match self
                    .error_handler
                    .handle_dyn(error, ctx.event().clone())
                    .await
                {
                    Ok(response) => {
                        ctx.set_response(response.clone());
                        (ctx, true, Ok(response))
                    }
                    Err(failure) => (ctx, true, Err(GantryError::ErrorHandler(failure))),
                }
            }
        };

        let name = if phase_failed {
            events::EVENT_FAILED
        } else {
            events::EVENT_HANDLED
        };
        self.emitter
            .emit(&DomainEvent::new(
                name,
                json!({
                    "source": ctx.event().source(),
                    "recovered": outcome.is_ok(),
                }),
            ))
            .await;

        self.run_terminate(&ctx).await;
        outcome
    }

    /// The happy path through the phases. Success always carries the
    /// produced response next to the context, so a response-less context
    /// is only ever a phase error routed through the error handler. On
    /// failure, returns the best available context alongside the
    /// phase-labeled error: the event is always present, the response only
    /// when produced before the failure.
    async fn run_phases(
        &self,
        event: IncomingEvent,
    ) -> Result<(HookContext, OutgoingResponse), (HookContext, HandlerError)> {
        for hook in &self.on_prepare {
            if let Err(error) = hook.call_dyn().await {
                return Err((HookContext::new(event), HandlerError::Prepare(error)));
            }
        }

        let event = match self.before.run(event.clone()).await {
            Ok(prepared) => prepared,
            Err(error) => return Err((HookContext::new(event), HandlerError::Before(error))),
        };

        let response = match self.handler.handle_dyn(event.clone()).await {
            Ok(response) => response,
            Err(error) => return Err((HookContext::new(event), HandlerError::Handle(error))),
        };

        let ctx = HookContext::with_response(event, response);
        let ctx = match self.after.run(ctx.clone()).await {
            Ok(decorated) => decorated,
            Err(error) => return Err((ctx, HandlerError::After(error))),
        };

        match ctx.response().cloned() {
            Some(response) => Ok((ctx, response)),
            None => Err((ctx, HandlerError::MissingResponse)),
        }
    }

    /// Terminate hooks run after both success and failure; their errors are
    /// logged and swallowed so they cannot mask the primary result.
    async fn run_terminate(&self, ctx: &HookContext) {
        for hook in &self.on_terminate {
            if let Err(error) = hook.call_dyn(ctx).await {
                tracing::error!(error = %error, "terminate hook failed");
            }
        }
    }
}
