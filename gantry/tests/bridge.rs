//! Adapter bridge: raw round trips, bridge-level error isolation, and
//! adapter hook stages.

mod common;

use common::Fixture;
use gantry::bridge::{
    AdapterBridge, AdapterContext, AdapterErrorHandler, AdapterHooks, DynAdapterErrorHandler,
};
use gantry::kernel::keys;
use gantry::{
    BoxError, BridgeError, ComponentDescriptor, ComponentRef, DynMiddleware, GantryError,
    IncomingEvent, LifecycleKernel, OutgoingResponse,
};
use gantry_std::testing::{
    EchoHandler, FailingErrorHandler, FailingHandler, FailingHook, MarkerLog, RecordingHook,
    RecordingMiddleware, marker_log,
};
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug)]
struct RawRequest {
    path: String,
}

#[derive(Debug, PartialEq)]
struct RawResponse {
    body: String,
}

struct FallbackResponder {
    seen: MarkerLog,
}

impl AdapterErrorHandler<RawRequest, RawResponse, ()> for FallbackResponder {
    async fn handle(
        &self,
        error: BridgeError,
        _context: &AdapterContext<RawRequest, RawResponse, ()>,
    ) -> Result<RawResponse, BoxError> {
        self.seen.lock().unwrap().push(error.to_string());
        Ok(RawResponse {
            body: "adapter-error".to_string(),
        })
    }
}

fn convert_event(raw: &RawRequest) -> Result<IncomingEvent, BoxError> {
    let event = IncomingEvent::builder()
        .source("http")
        .metadata("path", json!(raw.path))
        .build()?;
    Ok(event)
}

fn convert_response(response: &OutgoingResponse) -> Result<RawResponse, BoxError> {
    Ok(RawResponse {
        body: response.content().cloned().unwrap_or(Value::Null).to_string(),
    })
}

fn bridge_over(
    kernel: LifecycleKernel,
    hooks: AdapterHooks,
    seen: &MarkerLog,
) -> AdapterBridge<RawRequest, RawResponse, ()> {
    AdapterBridge::builder()
        .kernel(Arc::new(kernel))
        .event_builder(convert_event)
        .response_builder(convert_response)
        .error_handler(FallbackResponder {
            seen: Arc::clone(seen),
        })
        .hooks(hooks)
        .build()
        .expect("bridge should build")
}

fn raw(path: &str) -> RawRequest {
    RawRequest {
        path: path.to_string(),
    }
}

#[tokio::test]
async fn a_raw_event_round_trips_through_the_kernel() {
    let fx = Fixture::new();
    fx.blueprint
        .set(keys::HANDLER, ComponentRef::handler(EchoHandler));
    let adapter_errors = marker_log();
    let bridge = bridge_over(fx.build(), AdapterHooks::new(), &adapter_errors);

    let response = bridge.run(raw("/health"), ()).await.unwrap();
    assert_eq!(response.body, "\"http\"");
    assert!(adapter_errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn an_event_conversion_failure_never_reaches_the_kernel() {
    let fx = Fixture::new();
    let touched = marker_log();
    let before: Vec<ComponentDescriptor<dyn DynMiddleware<IncomingEvent>>> =
        vec![ComponentDescriptor::new(ComponentRef::middleware(
            RecordingMiddleware::new("kernel", Arc::clone(&touched)),
        ))];
    fx.blueprint.set(keys::MIDDLEWARE_BEFORE, before);

    let adapter_errors = marker_log();
    let bridge: AdapterBridge<RawRequest, RawResponse, ()> = AdapterBridge::builder()
        .kernel(Arc::new(fx.build()))
        .event_builder(|_raw: &RawRequest| Err::<IncomingEvent, BoxError>("bad shape".into()))
        .response_builder(convert_response)
        .error_handler(FallbackResponder {
            seen: Arc::clone(&adapter_errors),
        })
        .build()
        .unwrap();

    let response = bridge.run(raw("/health"), ()).await.unwrap();
    assert_eq!(response.body, "adapter-error");
    assert!(touched.lock().unwrap().is_empty());

    let seen = adapter_errors.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("failed to build canonical event"));
}

#[tokio::test]
async fn adapter_hook_stages_run_in_order() {
    let fx = Fixture::new();
    let log = marker_log();
    let hooks = AdapterHooks::new()
        .on_init(RecordingHook::new("init", Arc::clone(&log)))
        .on_prepare(RecordingHook::new("prepare", Arc::clone(&log)))
        .before_handle(RecordingHook::new("before", Arc::clone(&log)))
        .after_handle(RecordingHook::new("after", Arc::clone(&log)))
        .on_terminate(RecordingHook::new("terminate", Arc::clone(&log)));

    let adapter_errors = marker_log();
    let bridge = bridge_over(fx.build(), hooks, &adapter_errors);
    bridge.run(raw("/health"), ()).await.unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["init", "prepare", "before", "after", "terminate"]
    );
}

#[tokio::test]
async fn adapter_terminate_runs_on_the_failure_path() {
    let fx = Fixture::new();
    let log = marker_log();
    let hooks = AdapterHooks::new()
        .before_handle(FailingHook::new("stage broke"))
        .on_terminate(RecordingHook::new("terminate", Arc::clone(&log)));

    let adapter_errors = marker_log();
    let bridge = bridge_over(fx.build(), hooks, &adapter_errors);
    let response = bridge.run(raw("/health"), ()).await.unwrap();

    assert_eq!(response.body, "adapter-error");
    assert_eq!(*log.lock().unwrap(), vec!["terminate"]);
    assert_eq!(adapter_errors.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn a_kernel_recovery_bypasses_the_adapter_error_handler() {
    let fx = Fixture::new();
    fx.blueprint
        .set(keys::HANDLER, ComponentRef::handler(FailingHandler::new("boom")));

    let adapter_errors = marker_log();
    let bridge = bridge_over(fx.build(), AdapterHooks::new(), &adapter_errors);
    let response = bridge.run(raw("/health"), ()).await.unwrap();

    // The kernel's own error handler produced the fallback response.
    assert_eq!(response.body, "\"error\"");
    assert!(adapter_errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn a_kernel_rejection_is_fatal_to_the_bridge() {
    let fx = Fixture::new();
    fx.blueprint
        .set(keys::HANDLER, ComponentRef::handler(FailingHandler::new("boom")));
    fx.blueprint.set(
        keys::ERROR_HANDLER,
        ComponentRef::error_handler(FailingErrorHandler::new("worse")),
    );

    let log = marker_log();
    let hooks = AdapterHooks::new().on_terminate(RecordingHook::new("terminate", Arc::clone(&log)));
    let adapter_errors = marker_log();
    let bridge = bridge_over(fx.build(), hooks, &adapter_errors);

    let error = bridge.run(raw("/health"), ()).await.unwrap_err();
    assert!(matches!(error, GantryError::ErrorHandler(_)));
    // The adapter's handler is for bridge failures only.
    assert!(adapter_errors.lock().unwrap().is_empty());
    assert_eq!(*log.lock().unwrap(), vec!["terminate"]);
}

#[tokio::test]
async fn the_adapter_error_handler_can_be_container_resolved() {
    let fx = Fixture::new();
    let seen = marker_log();
    fx.container.instance(
        "adapter.errors",
        FallbackResponder {
            seen: Arc::clone(&seen),
        },
    );
    let reference: ComponentRef<dyn DynAdapterErrorHandler<RawRequest, RawResponse, ()>> =
        ComponentRef::adapter_error_handler_service::<FallbackResponder>("adapter.errors");
    let handler = reference.resolve(fx.container.as_ref()).unwrap();

    let bridge: AdapterBridge<RawRequest, RawResponse, ()> = AdapterBridge::builder()
        .kernel(Arc::new(fx.build()))
        .event_builder(|_raw: &RawRequest| Err::<IncomingEvent, BoxError>("bad shape".into()))
        .response_builder(convert_response)
        .resolved_error_handler(handler)
        .build()
        .unwrap();

    let response = bridge.run(raw("/health"), ()).await.unwrap();
    assert_eq!(response.body, "adapter-error");
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn the_execution_context_is_available_to_the_error_handler() {
    struct ContextEcho;

    impl AdapterErrorHandler<RawRequest, RawResponse, String> for ContextEcho {
        async fn handle(
            &self,
            _error: BridgeError,
            context: &AdapterContext<RawRequest, RawResponse, String>,
        ) -> Result<RawResponse, BoxError> {
            Ok(RawResponse {
                body: format!("deadline={}", context.execution()),
            })
        }
    }

    let fx = Fixture::new();
    let bridge: AdapterBridge<RawRequest, RawResponse, String> = AdapterBridge::builder()
        .kernel(Arc::new(fx.build()))
        .event_builder(|_raw: &RawRequest| Err::<IncomingEvent, BoxError>("bad shape".into()))
        .response_builder(convert_response)
        .error_handler(ContextEcho)
        .build()
        .unwrap();

    let response = bridge.run(raw("/health"), "30s".to_string()).await.unwrap();
    assert_eq!(response.body, "deadline=30s");
}
