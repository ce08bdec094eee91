//! Payload marker for values threaded through a pipeline.

/// A marker trait for values that flow through a middleware chain.
///
/// Payloads are moved by value from entry to entry, so they must be
/// `Send + 'static` to be safe for async use. The blanket implementation
/// covers every eligible type; there is nothing to implement manually.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Payload",
    label = "must be `Send + 'static`",
    note = "Pipeline payloads are moved across await points and must be thread-safe."
)]
pub trait Payload: Send + 'static {}

impl<T: Send + 'static> Payload for T {}
