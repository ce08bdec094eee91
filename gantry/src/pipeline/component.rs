//! Mixed component references and their resolver.
//!
//! Users supply processing units in whichever shape is simplest: a ready
//! instance (plain function shape), a container-resolvable service (class
//! shape), or a factory invoked once with the container. The tagged union
//! makes exactly one interpretation apply per reference; a dedicated
//! [`resolve`](ComponentRef::resolve) step turns every shape into one common
//! invocation interface before it enters the pipeline engine.

use gantry_core::{
    BoxedService, Container, ContextHook, DynContextHook, DynErrorHandler, DynEventHandler,
    DynHook, DynMiddleware, ErrorHandler, EventHandler, Hook, Middleware, Payload, ResolutionError,
};
use std::sync::Arc;

/// Recovers the concrete service type from a container-resolved instance.
pub type CastFn<T> = Arc<dyn Fn(BoxedService) -> Option<Arc<T>> + Send + Sync>;

/// Produces a callable from the container, invoked once at resolution time.
pub type FactoryFn<T> =
    Arc<dyn Fn(&dyn Container) -> Result<Arc<T>, ResolutionError> + Send + Sync>;

/// The shape a component reference was supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// A directly-callable instance.
    Instance,
    /// A container-resolved service.
    Service,
    /// A factory producing the callable.
    Factory,
}

/// A mixed-shape reference to a processing unit.
///
/// `T` is the object-safe target trait (`dyn DynMiddleware<P>`,
/// `dyn DynEventHandler`, ...). Typed constructors are provided per target so
/// the casting machinery stays out of user code.
pub enum ComponentRef<T: ?Sized + Send + Sync + 'static> {
    /// A ready instance, used directly.
    Instance(Arc<T>),
    /// A service key resolved through the container, enabling the
    /// component's own dependency injection.
    Service {
        /// The container binding key.
        key: String,
        /// Downcast from the container's type-erased instance.
        cast: CastFn<T>,
    },
    /// A factory invoked once with the container to yield the callable.
    Factory(FactoryFn<T>),
}

impl<T: ?Sized + Send + Sync + 'static> ComponentRef<T> {
    /// Reference a ready instance.
    pub fn instance(value: Arc<T>) -> Self {
        Self::Instance(value)
    }

    /// Reference a factory.
    pub fn factory(
        factory: impl Fn(&dyn Container) -> Result<Arc<T>, ResolutionError> + Send + Sync + 'static,
    ) -> Self {
        Self::Factory(Arc::new(factory))
    }

    /// Which interpretation applies to this reference.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Instance(_) => ComponentKind::Instance,
            Self::Service { .. } => ComponentKind::Service,
            Self::Factory(_) => ComponentKind::Factory,
        }
    }

    /// Turn the reference into a callable.
    ///
    /// Container resolution may create singletons per container policy; no
    /// other side effects are permitted. A missing binding or a mismatched
    /// service type is reported to the caller, never swallowed.
    pub fn resolve(&self, container: &dyn Container) -> Result<Arc<T>, ResolutionError> {
        match self {
            Self::Instance(instance) => Ok(Arc::clone(instance)),
            Self::Service { key, cast } => {
                let service = container.resolve(key, false)?;
                cast(service).ok_or_else(|| ResolutionError::TypeMismatch(key.clone()))
            }
            Self::Factory(factory) => factory(container),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Clone for ComponentRef<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Instance(instance) => Self::Instance(Arc::clone(instance)),
            Self::Service { key, cast } => Self::Service {
                key: key.clone(),
                cast: Arc::clone(cast),
            },
            Self::Factory(factory) => Self::Factory(Arc::clone(factory)),
        }
    }
}

impl<P: Payload> ComponentRef<dyn DynMiddleware<P>> {
    /// Reference a middleware instance directly.
    pub fn middleware<M: Middleware<P>>(middleware: M) -> Self {
        Self::Instance(Arc::new(middleware))
    }

    /// Reference a middleware registered in the container under `key` as the
    /// concrete type `M`.
    pub fn middleware_service<M: Middleware<P>>(key: impl Into<String>) -> Self {
        Self::Service {
            key: key.into(),
            cast: Arc::new(|service: BoxedService| -> Option<Arc<dyn DynMiddleware<P>>> {
                let concrete = service.downcast::<M>().ok()?;
                Some(concrete)
            }),
        }
    }
}

impl ComponentRef<dyn DynEventHandler> {
    /// Reference an event handler instance directly.
    pub fn handler<H: EventHandler>(handler: H) -> Self {
        Self::Instance(Arc::new(handler))
    }

    /// Reference an event handler registered in the container under `key` as
    /// the concrete type `H`.
    pub fn handler_service<H: EventHandler>(key: impl Into<String>) -> Self {
        Self::Service {
            key: key.into(),
            cast: Arc::new(|service: BoxedService| -> Option<Arc<dyn DynEventHandler>> {
                let concrete = service.downcast::<H>().ok()?;
                Some(concrete)
            }),
        }
    }
}

impl ComponentRef<dyn DynErrorHandler> {
    /// Reference an error handler instance directly.
    pub fn error_handler<H: ErrorHandler>(handler: H) -> Self {
        Self::Instance(Arc::new(handler))
    }

    /// Reference an error handler registered in the container under `key` as
    /// the concrete type `H`.
    pub fn error_handler_service<H: ErrorHandler>(key: impl Into<String>) -> Self {
        Self::Service {
            key: key.into(),
            cast: Arc::new(|service: BoxedService| -> Option<Arc<dyn DynErrorHandler>> {
                let concrete = service.downcast::<H>().ok()?;
                Some(concrete)
            }),
        }
    }
}

impl ComponentRef<dyn DynHook> {
    /// Reference a stage hook instance directly.
    pub fn hook<H: Hook>(hook: H) -> Self {
        Self::Instance(Arc::new(hook))
    }

    /// Reference a stage hook registered in the container under `key` as the
    /// concrete type `H`.
    pub fn hook_service<H: Hook>(key: impl Into<String>) -> Self {
        Self::Service {
            key: key.into(),
            cast: Arc::new(|service: BoxedService| -> Option<Arc<dyn DynHook>> {
                let concrete = service.downcast::<H>().ok()?;
                Some(concrete)
            }),
        }
    }
}

impl ComponentRef<dyn DynContextHook> {
    /// Reference a context hook instance directly.
    pub fn context_hook<H: ContextHook>(hook: H) -> Self {
        Self::Instance(Arc::new(hook))
    }

    /// Reference a context hook registered in the container under `key` as
    /// the concrete type `H`.
    pub fn context_hook_service<H: ContextHook>(key: impl Into<String>) -> Self {
        Self::Service {
            key: key.into(),
            cast: Arc::new(|service: BoxedService| -> Option<Arc<dyn DynContextHook>> {
                let concrete = service.downcast::<H>().ok()?;
                Some(concrete)
            }),
        }
    }
}

/// A component reference plus its execution options.
pub struct ComponentDescriptor<T: ?Sized + Send + Sync + 'static> {
    reference: ComponentRef<T>,
    priority: Option<i32>,
    platform: Option<String>,
}

impl<T: ?Sized + Send + Sync + 'static> ComponentDescriptor<T> {
    /// Describe a component with default options.
    pub fn new(reference: ComponentRef<T>) -> Self {
        Self {
            reference,
            priority: None,
            platform: None,
        }
    }

    /// Set an explicit execution priority (lower runs first).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Restrict the component to one platform tag.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// The underlying reference.
    pub fn reference(&self) -> &ComponentRef<T> {
        &self.reference
    }

    /// The explicit priority, when one was set.
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// The platform restriction, when one was set.
    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Clone for ComponentDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            reference: self.reference.clone(),
            priority: self.priority,
            platform: self.platform.clone(),
        }
    }
}
