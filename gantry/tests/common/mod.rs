//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use gantry::kernel::keys;
use gantry::{Blueprint, ComponentRef, Container, EventEmitter, IncomingEvent, LifecycleKernel};
use gantry_std::ServiceContainer;
use gantry_std::testing::{FixedHandler, MarkerLog, RecordingErrorHandler, marker_log};
use std::sync::Arc;

/// A canonical event with the given source tag.
pub fn event(source: &str) -> IncomingEvent {
    IncomingEvent::builder().source(source).build().unwrap()
}

/// Collaborators for a kernel under test, pre-wired with a handler that
/// answers `"ok"` and an error handler producing the conventional fallback
/// (`"error"`, code 500) while recording the failed phase.
pub struct Fixture {
    pub container: Arc<ServiceContainer>,
    pub blueprint: Arc<Blueprint>,
    pub emitter: Arc<EventEmitter>,
    pub error_phases: MarkerLog,
}

impl Fixture {
    pub fn new() -> Self {
        let blueprint = Arc::new(Blueprint::new());
        let error_phases = marker_log();
        blueprint.set(keys::HANDLER, ComponentRef::handler(FixedHandler::ok()));
        blueprint.set(
            keys::ERROR_HANDLER,
            ComponentRef::error_handler(RecordingErrorHandler::fallback(Arc::clone(&error_phases))),
        );
        Self {
            container: Arc::new(ServiceContainer::new()),
            blueprint,
            emitter: Arc::new(EventEmitter::new()),
            error_phases,
        }
    }

    /// Build the kernel from the current collaborator state.
    pub fn build(&self) -> LifecycleKernel {
        LifecycleKernel::builder()
            .container(Arc::clone(&self.container) as Arc<dyn Container>)
            .blueprint(Arc::clone(&self.blueprint))
            .emitter(Arc::clone(&self.emitter))
            .build()
            .expect("kernel should build")
    }
}
