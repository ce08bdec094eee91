//! Full lifecycle behavior: phase order, single-catch error conversion,
//! unconditional termination, and construction-time validation.

mod common;

use common::{Fixture, event};
use gantry::kernel::{events, keys};
use gantry::{
    ComponentDescriptor, ComponentRef, DynContextHook, DynHook, DynMiddleware, GantryError,
    HandlerKind, HookContext, IncomingEvent, InitializationError, LifecycleKernel,
};
use gantry_std::testing::{
    FailingContextHook, FailingErrorHandler, FailingHandler, FailingMiddleware, FixedHandler,
    RecordingContextHook, RecordingHook, RecordingListener, RecordingMiddleware, marker_log,
};
use serde_json::json;
use std::sync::Arc;

type BeforeList = Vec<ComponentDescriptor<dyn DynMiddleware<IncomingEvent>>>;
type AfterList = Vec<ComponentDescriptor<dyn DynMiddleware<HookContext>>>;

#[tokio::test]
async fn a_bare_kernel_returns_the_handler_response() {
    let fx = Fixture::new();
    let kernel = fx.build();
    assert_eq!(kernel.after_middleware_count(), 0);

    let response = kernel.handle(event("http")).await.unwrap();
    assert_eq!(response.content(), Some(&json!("ok")));
}

#[tokio::test]
async fn phases_run_in_order_and_produce_the_response() {
    let fx = Fixture::new();
    let log = marker_log();

    fx.blueprint.set(
        keys::ON_PREPARE,
        vec![ComponentRef::hook(RecordingHook::new(
            "prepare",
            Arc::clone(&log),
        ))],
    );
    let before: BeforeList = vec![ComponentDescriptor::new(ComponentRef::middleware(
        RecordingMiddleware::new("before", Arc::clone(&log)),
    ))];
    fx.blueprint.set(keys::MIDDLEWARE_BEFORE, before);
    let after: AfterList = vec![ComponentDescriptor::new(ComponentRef::middleware(
        RecordingMiddleware::new("after", Arc::clone(&log)),
    ))];
    fx.blueprint.set(keys::MIDDLEWARE_AFTER, after);

    let terminate = RecordingContextHook::new();
    fx.blueprint.set(
        keys::ON_TERMINATE,
        vec![ComponentRef::context_hook(terminate.clone())],
    );

    let kernel = fx.build();
    let response = kernel.handle(event("http")).await.unwrap();

    assert_eq!(response.content(), Some(&json!("ok")));
    assert_eq!(*log.lock().unwrap(), vec!["prepare", "before", "after"]);

    let seen = terminate.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].response().and_then(|r| r.content()),
        Some(&json!("ok"))
    );
    assert!(fx.error_phases.lock().unwrap().is_empty());
}

#[tokio::test]
async fn a_handler_failure_becomes_the_fallback_response() {
    let fx = Fixture::new();
    fx.blueprint
        .set(keys::HANDLER, ComponentRef::handler(FailingHandler::new("boom")));
    let terminate = RecordingContextHook::new();
    fx.blueprint.set(
        keys::ON_TERMINATE,
        vec![ComponentRef::context_hook(terminate.clone())],
    );

    let kernel = fx.build();
    let response = kernel.handle(event("http")).await.unwrap();

    assert_eq!(response.content(), Some(&json!("error")));
    assert_eq!(response.metadata().get("code"), Some(&json!(500)));
    assert_eq!(*fx.error_phases.lock().unwrap(), vec!["handle"]);

    // Termination observed the error handler's response, not the failure.
    let seen = terminate.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].response().and_then(|r| r.content()),
        Some(&json!("error"))
    );
}

#[tokio::test]
async fn a_before_middleware_failure_is_labeled_with_its_phase() {
    let fx = Fixture::new();
    let before: BeforeList = vec![ComponentDescriptor::new(ComponentRef::middleware(
        FailingMiddleware::new("rejected"),
    ))];
    fx.blueprint.set(keys::MIDDLEWARE_BEFORE, before);

    let kernel = fx.build();
    kernel.handle(event("http")).await.unwrap();
    assert_eq!(*fx.error_phases.lock().unwrap(), vec!["beforeHandle"]);
}

#[tokio::test]
async fn an_after_chain_that_drops_the_response_is_an_error() {
    let fx = Fixture::new();
    let dropper = |ctx: HookContext, _next: gantry::Next<HookContext>| async move {
        let (event, _response) = ctx.into_parts();
        Ok::<_, gantry::BoxError>(HookContext::new(event))
    };
    let after: AfterList = vec![ComponentDescriptor::new(ComponentRef::middleware(dropper))];
    fx.blueprint.set(keys::MIDDLEWARE_AFTER, after);

    let kernel = fx.build();
    let response = kernel.handle(event("http")).await.unwrap();
    assert_eq!(response.content(), Some(&json!("error")));
    assert_eq!(*fx.error_phases.lock().unwrap(), vec!["afterHandle"]);
}

#[tokio::test]
async fn terminate_hook_failures_are_swallowed() {
    let fx = Fixture::new();
    fx.blueprint.set(
        keys::ON_TERMINATE,
        vec![ComponentRef::context_hook(FailingContextHook::new("late"))],
    );

    let kernel = fx.build();
    let response = kernel.handle(event("http")).await.unwrap();
    assert_eq!(response.content(), Some(&json!("ok")));
}

#[tokio::test]
async fn an_error_handler_failure_is_the_only_rejection() {
    let fx = Fixture::new();
    fx.blueprint
        .set(keys::HANDLER, ComponentRef::handler(FailingHandler::new("boom")));
    fx.blueprint.set(
        keys::ERROR_HANDLER,
        ComponentRef::error_handler(FailingErrorHandler::new("worse")),
    );
    let terminate = RecordingContextHook::new();
    fx.blueprint.set(
        keys::ON_TERMINATE,
        vec![ComponentRef::context_hook(terminate.clone())],
    );

    let kernel = fx.build();
    let error = kernel.handle(event("http")).await.unwrap_err();
    assert!(matches!(error, GantryError::ErrorHandler(_)));

    // Even the rejection path terminates; no response was ever produced.
    let seen = terminate.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].response().is_none());
}

#[tokio::test]
async fn construction_requires_the_handler_entry() {
    let fx = Fixture::new();
    let blueprint = Arc::new(gantry::Blueprint::new());
    blueprint.set(
        keys::ERROR_HANDLER,
        ComponentRef::error_handler(FailingErrorHandler::new("unused")),
    );

    let error = LifecycleKernel::builder()
        .container(Arc::clone(&fx.container) as Arc<dyn gantry::Container>)
        .blueprint(blueprint)
        .emitter(Arc::clone(&fx.emitter))
        .build()
        .unwrap_err();
    assert!(matches!(
        error,
        GantryError::Initialization(InitializationError::MissingBlueprintEntry(key))
            if key == keys::HANDLER
    ));
}

#[tokio::test]
async fn construction_requires_every_collaborator() {
    let fx = Fixture::new();
    let error = LifecycleKernel::builder()
        .container(Arc::clone(&fx.container) as Arc<dyn gantry::Container>)
        .blueprint(Arc::clone(&fx.blueprint))
        .build()
        .unwrap_err();
    assert!(matches!(
        error,
        GantryError::Initialization(InitializationError::Missing("emitter"))
    ));
}

#[tokio::test]
async fn each_invocation_emits_a_lifecycle_event() {
    let fx = Fixture::new();
    let heard = marker_log();
    fx.emitter.subscribe(
        events::EVENT_HANDLED,
        RecordingListener::new(Arc::clone(&heard)),
    );

    let kernel = fx.build();
    kernel.handle(event("http")).await.unwrap();
    kernel.handle(event("cli")).await.unwrap();
    assert_eq!(
        *heard.lock().unwrap(),
        vec![events::EVENT_HANDLED, events::EVENT_HANDLED]
    );
}

#[tokio::test]
async fn a_recovered_failure_emits_the_failed_event() {
    let fx = Fixture::new();
    let failed = marker_log();
    let handled = marker_log();
    fx.emitter.subscribe(
        events::EVENT_FAILED,
        RecordingListener::new(Arc::clone(&failed)),
    );
    fx.emitter.subscribe(
        events::EVENT_HANDLED,
        RecordingListener::new(Arc::clone(&handled)),
    );
    fx.blueprint
        .set(keys::HANDLER, ComponentRef::handler(FailingHandler::new("boom")));

    let kernel = fx.build();
    // The error handler recovers, but the invocation still failed.
    let response = kernel.handle(event("http")).await.unwrap();
    assert_eq!(response.content(), Some(&json!("error")));
    assert_eq!(*failed.lock().unwrap(), vec![events::EVENT_FAILED]);
    assert!(handled.lock().unwrap().is_empty());
}

#[tokio::test]
async fn a_rejected_invocation_emits_the_failed_event() {
    let fx = Fixture::new();
    let heard = marker_log();
    fx.emitter.subscribe(
        events::EVENT_FAILED,
        RecordingListener::new(Arc::clone(&heard)),
    );
    fx.blueprint
        .set(keys::HANDLER, ComponentRef::handler(FailingHandler::new("boom")));
    fx.blueprint.set(
        keys::ERROR_HANDLER,
        ComponentRef::error_handler(FailingErrorHandler::new("worse")),
    );

    let kernel = fx.build();
    kernel.handle(event("http")).await.unwrap_err();
    assert_eq!(*heard.lock().unwrap(), vec![events::EVENT_FAILED]);
}

#[tokio::test]
async fn one_kernel_serves_concurrent_invocations() {
    let fx = Fixture::new();
    let kernel = Arc::new(fx.build());

    let (a, b) = tokio::join!(kernel.handle(event("http")), kernel.handle(event("queue")));
    assert_eq!(a.unwrap().content(), Some(&json!("ok")));
    assert_eq!(b.unwrap().content(), Some(&json!("ok")));
}

#[tokio::test]
async fn handler_shape_is_classified() {
    let fx = Fixture::new();
    assert_eq!(fx.build().handler_kind(), HandlerKind::Function);

    fx.container.instance("app.handler", FixedHandler::ok());
    fx.blueprint.set(
        keys::HANDLER,
        ComponentRef::handler_service::<FixedHandler>("app.handler"),
    );
    let kernel = fx.build();
    assert_eq!(kernel.handler_kind(), HandlerKind::Lifecycle);
    let response = kernel.handle(event("http")).await.unwrap();
    assert_eq!(response.content(), Some(&json!("ok")));
}

#[tokio::test]
async fn warm_up_runs_prepare_hooks_only() {
    let fx = Fixture::new();
    let log = marker_log();
    fx.blueprint.set(
        keys::ON_PREPARE,
        vec![ComponentRef::hook(RecordingHook::new(
            "prepare",
            Arc::clone(&log),
        ))],
    );
    let before: BeforeList = vec![ComponentDescriptor::new(ComponentRef::middleware(
        RecordingMiddleware::new("before", Arc::clone(&log)),
    ))];
    fx.blueprint.set(keys::MIDDLEWARE_BEFORE, before);

    let kernel = fx.build();
    kernel.before_handle().await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["prepare"]);
}

#[tokio::test]
async fn the_default_priority_is_configurable() {
    let fx = Fixture::new();
    let log = marker_log();
    fx.blueprint.set(keys::DEFAULT_PRIORITY, 1i32);
    let before: BeforeList = vec![
        ComponentDescriptor::new(ComponentRef::middleware(RecordingMiddleware::new(
            "explicit",
            Arc::clone(&log),
        )))
        .with_priority(5),
        ComponentDescriptor::new(ComponentRef::middleware(RecordingMiddleware::new(
            "default",
            Arc::clone(&log),
        ))),
    ];
    fx.blueprint.set(keys::MIDDLEWARE_BEFORE, before);

    let kernel = fx.build();
    kernel.handle(event("http")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["default", "explicit"]);
}

#[tokio::test]
async fn platform_restricted_middleware_is_skipped() {
    let fx = Fixture::new();
    let log = marker_log();
    fx.blueprint.set(keys::PLATFORM, "http".to_string());
    let before: BeforeList = vec![
        ComponentDescriptor::new(ComponentRef::middleware(RecordingMiddleware::new(
            "everywhere",
            Arc::clone(&log),
        ))),
        ComponentDescriptor::new(ComponentRef::middleware(RecordingMiddleware::new(
            "cli-only",
            Arc::clone(&log),
        )))
        .with_platform("cli"),
    ];
    fx.blueprint.set(keys::MIDDLEWARE_BEFORE, before);

    let kernel = fx.build();
    assert_eq!(kernel.before_middleware_count(), 1);
    kernel.handle(event("http")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["everywhere"]);
}

#[tokio::test]
async fn prepare_hooks_resolve_through_component_refs() {
    let fx = Fixture::new();
    let log = marker_log();
    fx.container
        .instance("hooks.audit", RecordingHook::new("audit", Arc::clone(&log)));
    let hooks: Vec<ComponentRef<dyn DynHook>> =
        vec![ComponentRef::hook_service::<RecordingHook>("hooks.audit")];
    fx.blueprint.set(keys::ON_PREPARE, hooks);

    let kernel = fx.build();
    kernel.handle(event("http")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["audit"]);
}

#[tokio::test]
async fn terminate_hooks_resolve_through_component_refs() {
    let fx = Fixture::new();
    let recorder = RecordingContextHook::new();
    fx.container
        .instance("hooks.flush", recorder.clone());
    let hooks: Vec<ComponentRef<dyn DynContextHook>> = vec![
        ComponentRef::context_hook_service::<RecordingContextHook>("hooks.flush"),
    ];
    fx.blueprint.set(keys::ON_TERMINATE, hooks);

    let kernel = fx.build();
    kernel.handle(event("http")).await.unwrap();
    assert_eq!(recorder.seen().len(), 1);
}
