//! # gantry-core
//!
//! Core contracts for the Gantry lifecycle kernel.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! adapters and extensions that don't need the full `gantry` engine.
//!
//! # Architecture
//!
//! Gantry processes a request in three layers, each with its own contract:
//!
//! ## Canonical Model ([`IncomingEvent`], [`OutgoingResponse`], [`HookContext`])
//!
//! Every platform event is normalized into an [`IncomingEvent`] exactly once,
//! and every result leaves the kernel as an [`OutgoingResponse`]. The
//! [`HookContext`] pairs the two for post-handling and termination hooks.
//!
//! ## Processing Units ([`Middleware`], [`EventHandler`], [`ErrorHandler`])
//!
//! Middleware receives a payload and a [`Next`] continuation: calling the
//! continuation passes the payload on, returning without calling it
//! short-circuits the remainder of the chain. The [`EventHandler`] is the
//! terminal unit; the [`ErrorHandler`] converts a failed phase into a
//! response.
//!
//! ## Collaborators ([`Container`], [`Blueprint`])
//!
//! The dependency container and the blueprint settings store are external
//! collaborators, specified here only through the interfaces the kernel
//! consumes. They are passed explicitly at construction, never held as
//! ambient global state, so several kernels can coexist in one process.
//!
//! # Static vs Dynamic Dispatch
//!
//! Traits use native `async fn` for zero-cost static dispatch. Every trait
//! that must be stored in a registry or chain has an object-safe `Dyn*`
//! mirror with a blanket implementation.
//!
//! # Error Types
//!
//! - [`GantryError`] - Top-level error type
//! - [`InitializationError`] - Missing collaborator at construction
//! - [`ResolutionError`] - Component reference could not become a callable
//! - [`HandlerError`] - Failure inside a lifecycle phase
//! - [`BridgeError`] - Failure at the adapter boundary

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod blueprint;
mod container;
mod context;
mod error;
mod event;
mod handler;
mod hook;
mod listener;
mod middleware;
mod payload;
mod response;

// Re-exports
pub use blueprint::Blueprint;
pub use container::{BoxedService, Container, ServiceConstructor};
pub use context::HookContext;
pub use error::{
    BoxError, BridgeError, GantryError, HandlerError, InitializationError, ModelError,
    ResolutionError,
};
pub use event::{IncomingEvent, IncomingEventBuilder};
pub use handler::{DynErrorHandler, DynEventHandler, ErrorHandler, EventHandler};
pub use hook::{ContextHook, DynContextHook, DynHook, Hook};
pub use listener::{DomainEvent, DynListener, Listener};
pub use middleware::{DynMiddleware, Middleware, Next};
pub use payload::Payload;
pub use response::OutgoingResponse;
