//! Pipeline composition.
//!
//! Composing is a pure transformation from entry list to callable chain: the
//! entries are sorted once (stable, ascending priority) and frozen behind an
//! `Arc`. The resulting [`Chain`] can be invoked many times with different
//! payloads, including concurrently - no per-call state is retained, and the
//! engine never catches entry errors (that is the caller's job).

use crate::pipeline::component::ComponentDescriptor;
use gantry_core::{BoxError, Container, DynMiddleware, Next, Payload, ResolutionError};
use std::sync::Arc;

/// Configuration for composing a pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Effective priority for entries without an explicit one.
    pub default_priority: i32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            default_priority: 10,
        }
    }
}

/// A resolved middleware plus its effective priority.
pub struct PipelineEntry<P: Payload> {
    middleware: Arc<dyn DynMiddleware<P>>,
    priority: Option<i32>,
}

impl<P: Payload> PipelineEntry<P> {
    /// Create an entry. `priority: None` uses the composition default.
    pub fn new(middleware: Arc<dyn DynMiddleware<P>>, priority: Option<i32>) -> Self {
        Self {
            middleware,
            priority,
        }
    }

    /// The explicit priority, when one was set.
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }
}

impl<P: Payload> Clone for PipelineEntry<P> {
    fn clone(&self) -> Self {
        Self {
            middleware: Arc::clone(&self.middleware),
            priority: self.priority,
        }
    }
}

/// Compose entries into a single callable chain.
///
/// Sort order is ascending numeric priority; ties keep insertion order. The
/// stable sort is a correctness requirement - repeated compositions of the
/// same list must execute identically.
pub fn compose<P: Payload>(entries: Vec<PipelineEntry<P>>, options: &PipelineOptions) -> Chain<P> {
    let mut entries = entries;
    entries.sort_by_key(|e| e.priority.unwrap_or(options.default_priority));
    Chain {
        stack: entries.into_iter().map(|e| e.middleware).collect(),
    }
}

/// Resolve a descriptor list into pipeline entries through the container.
///
/// Resolution happens here, once per composition - never per invocation.
/// Descriptors restricted to a platform other than `platform` are skipped
/// without being resolved.
pub fn resolve_entries<P: Payload>(
    descriptors: &[ComponentDescriptor<dyn DynMiddleware<P>>],
    container: &dyn Container,
    platform: Option<&str>,
) -> Result<Vec<PipelineEntry<P>>, ResolutionError> {
    descriptors
        .iter()
        .filter(|descriptor| match descriptor.platform() {
            Some(restriction) => platform == Some(restriction),
            None => true,
        })
        .map(|descriptor| {
            let middleware = descriptor.reference().resolve(container)?;
            Ok(PipelineEntry::new(middleware, descriptor.priority()))
        })
        .collect()
}

/// An immutable, re-runnable middleware chain.
pub struct Chain<P: Payload> {
    stack: Arc<[Arc<dyn DynMiddleware<P>>]>,
}

impl<P: Payload> Chain<P> {
    /// A chain with no entries; running it returns the payload unchanged.
    pub fn empty() -> Self {
        Self {
            stack: Arc::from([]),
        }
    }

    /// Thread the payload through every entry.
    ///
    /// Entries run in composed order; an entry that returns without calling
    /// its continuation short-circuits the remainder. Errors propagate
    /// untouched.
    pub async fn run(&self, payload: P) -> Result<P, BoxError> {
        Next::new(Arc::clone(&self.stack)).call(payload).await
    }

    /// Number of entries in the chain.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether the chain has no entries.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl<P: Payload> Clone for Chain<P> {
    fn clone(&self) -> Self {
        Self {
            stack: Arc::clone(&self.stack),
        }
    }
}
