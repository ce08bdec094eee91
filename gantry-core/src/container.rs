//! Dependency container contract.
//!
//! The container binds named services and resolves them on demand. Its
//! internals are an external collaborator; the kernel only consumes this
//! interface. Registration is expected during boot only - steady-state
//! traffic reads concurrently and never writes.

use crate::error::{BoxError, ResolutionError};
use std::{any::Any, sync::Arc};

/// A type-erased, shareable service instance.
pub type BoxedService = Arc<dyn Any + Send + Sync>;

/// Builds a service instance, with access to the container for its own
/// dependency resolution.
pub type ServiceConstructor =
    Arc<dyn Fn(&dyn Container) -> Result<BoxedService, BoxError> + Send + Sync>;

/// The dependency-injection container interface the kernel consumes.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Container",
    label = "missing `Container` implementation",
    note = "Containers must resolve named bindings to type-erased service instances."
)]
pub trait Container: Send + Sync {
    /// Resolve a binding by key.
    ///
    /// `fresh` bypasses any singleton cache and forces a new instance.
    /// Fails with [`ResolutionError::MissingBinding`] when the key (or any
    /// alias for it) is unknown.
    fn resolve(&self, key: &str, fresh: bool) -> Result<BoxedService, ResolutionError>;

    /// Whether a binding (or alias) exists for the key.
    fn has(&self, key: &str) -> bool;

    /// Register a binding under `name`, optionally cached as a singleton,
    /// reachable through the given aliases.
    fn auto_binding(
        &self,
        name: &str,
        constructor: ServiceConstructor,
        singleton: bool,
        aliases: &[&str],
    );
}
