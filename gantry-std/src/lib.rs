//! # gantry-std
//!
//! Standard implementations for the Gantry lifecycle kernel.
//!
//! This crate provides:
//! - **Service container**: [`ServiceContainer`], a keyed binding store with
//!   singleton caching and aliases
//! - **Standard middleware**: [`LoggingMiddleware`]
//! - **Testing utilities**: recording/failing middleware, handlers, hooks and
//!   listeners in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core contracts
pub use gantry_core;

// Modules
pub mod container;
pub mod logging;
pub mod testing;

pub use container::ServiceContainer;
pub use logging::LoggingMiddleware;
