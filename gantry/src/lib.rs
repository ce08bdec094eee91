//! # gantry - Platform-Agnostic Lifecycle Kernel
//!
//! `gantry` accepts a raw event from an arbitrary execution environment
//! (HTTP request, scheduled trigger, queue message, CLI invocation),
//! normalizes it into a canonical incoming event, routes it through an
//! ordered chain of interchangeable processing units, and produces a
//! canonical outgoing response that the originating platform translates
//! back into its native shape.
//!
//! ## The pieces
//!
//! - [`pipeline`] - mixed-shape component references (instance, container
//!   service, factory) resolved to one invocation interface, composed into
//!   priority-ordered chains with continuation semantics.
//! - [`kernel`] - the [`LifecycleKernel`]: `onPrepare → beforeHandle →
//!   handle → afterHandle → onTerminate`, with single-catch error conversion
//!   and unconditional termination.
//! - [`bridge`] - the [`AdapterBridge`] contract connecting a platform's
//!   raw event/response pair to the kernel, with its own hooks and error
//!   isolation.
//! - [`emitter`] - domain event fan-out with per-listener error guards.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gantry::{ComponentRef, LifecycleKernel, keys};
//!
//! blueprint.set(keys::HANDLER, ComponentRef::handler(|event: IncomingEvent| async move {
//!     Ok(OutgoingResponse::new(Some(json!("ok"))))
//! }));
//! blueprint.set(keys::ERROR_HANDLER, ComponentRef::error_handler(my_error_handler));
//!
//! let kernel = LifecycleKernel::builder()
//!     .container(container)
//!     .blueprint(blueprint)
//!     .emitter(emitter)
//!     .build()?;
//!
//! let response = kernel.handle(event).await?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod bridge;
pub mod emitter;
pub mod kernel;
pub mod pipeline;

// Re-export the core contracts so adapters need only one dependency.
pub use gantry_core::{
    Blueprint, BoxError, BoxedService, BridgeError, Container, ContextHook, DomainEvent,
    DynContextHook, DynErrorHandler, DynEventHandler, DynHook, DynListener, DynMiddleware,
    ErrorHandler, EventHandler, GantryError, HandlerError, Hook, HookContext, IncomingEvent,
    IncomingEventBuilder, InitializationError, Listener, Middleware, ModelError, Next,
    OutgoingResponse, Payload, ResolutionError, ServiceConstructor,
};

pub use bridge::{
    AdapterBridge, AdapterBridgeBuilder, AdapterContext, AdapterErrorHandler, AdapterHooks,
    DynAdapterErrorHandler, EventBuilder, ResponseBuilder,
};
pub use emitter::EventEmitter;
pub use kernel::{HandlerKind, KernelBuilder, LifecycleKernel, events, keys};
pub use pipeline::{
    Chain, ComponentDescriptor, ComponentKind, ComponentRef, PipelineEntry, PipelineOptions,
    compose, resolve_entries,
};
