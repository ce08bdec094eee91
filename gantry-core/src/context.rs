//! Event/response pair passed to post-handling and termination hooks.

use crate::{event::IncomingEvent, response::OutgoingResponse};

/// Pairs an [`IncomingEvent`] with its (possibly absent) [`OutgoingResponse`].
///
/// The after-handle pipeline threads this by value; termination hooks receive
/// it by reference. The response is `None` when a failure occurred before one
/// was produced - the event is always present.
#[derive(Clone, Debug)]
pub struct HookContext {
    event: IncomingEvent,
    response: Option<OutgoingResponse>,
}

impl HookContext {
    /// Create a context with no response yet.
    pub fn new(event: IncomingEvent) -> Self {
        Self {
            event,
            response: None,
        }
    }

    /// Create a context with a produced response.
    pub fn with_response(event: IncomingEvent, response: OutgoingResponse) -> Self {
        Self {
            event,
            response: Some(response),
        }
    }

    /// The event driving this invocation.
    pub fn event(&self) -> &IncomingEvent {
        &self.event
    }

    /// Mutable access to the event, for metadata attachment.
    pub fn event_mut(&mut self) -> &mut IncomingEvent {
        &mut self.event
    }

    /// The response, if one has been produced.
    pub fn response(&self) -> Option<&OutgoingResponse> {
        self.response.as_ref()
    }

    /// Mutable access to the response, for after-handle decoration.
    pub fn response_mut(&mut self) -> Option<&mut OutgoingResponse> {
        self.response.as_mut()
    }

    /// Record a produced response.
    pub fn set_response(&mut self, response: OutgoingResponse) {
        self.response = Some(response);
    }

    /// Split the context into its parts.
    pub fn into_parts(self) -> (IncomingEvent, Option<OutgoingResponse>) {
        (self.event, self.response)
    }
}
