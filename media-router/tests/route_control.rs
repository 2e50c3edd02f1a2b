//! Integration tests for volume requests, control requests and presentation displays

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use helpers::*;
use media_router::{
    ControlRequest, ControlRequestCallback, DisplayHandle, DisplayResolver, EventKind, MediaRouterEngine,
    RouterError,
};
use parking_lot::Mutex;
use route_descriptor::{ControlFilter, Extras, RouteDescriptor};
use rstest::rstest;

#[derive(Default)]
struct ResultProbe {
    outcomes: Mutex<Vec<String>>,
}

impl ControlRequestCallback for ResultProbe {
    fn on_result(&self, data: Extras) {
        self.outcomes
            .lock()
            .push(format!("result:{}", data.get_bool("handled").unwrap_or(false)));
    }

    fn on_error(&self, error: Option<String>, _data: Extras) {
        self.outcomes
            .lock()
            .push(format!("error:{}", error.unwrap_or_default()));
    }
}

// ============================================================================
// Volume
// ============================================================================

#[rstest]
#[case(5, "set_volume:5")]
#[case(50, "set_volume:10")]
#[case(-5, "set_volume:0")]
#[case(10, "set_volume:10")]
fn test_set_volume_is_clamped(#[case] requested: i32, #[case] expected: &str) {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let router = engine.router("app").unwrap();
    system.clear_log();

    router.request_set_volume(&router.selected_route(), requested);

    assert_eq!(system.log(), vec![expected.to_string()]);
}

#[test]
fn test_update_volume_drops_zero_delta() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let router = engine.router("app").unwrap();
    let selected = router.selected_route();
    system.clear_log();

    router.request_update_volume(&selected, 0);
    router.request_update_volume(&selected, 3);
    router.request_update_volume(&selected, -2);

    assert_eq!(system.log(), vec!["update_volume:3", "update_volume:-2"]);
}

#[test]
fn test_volume_requests_for_unselected_route_are_ignored() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true), route("R2", true)]);
    let router = engine.router("app").unwrap();
    let other = router.routes().into_iter().find(|r| r.descriptor_id() == "R2").unwrap();
    system.clear_log();

    router.request_set_volume(&other, 4);
    router.request_update_volume(&other, 1);

    assert!(system.log().is_empty());
}

// ============================================================================
// Control requests
// ============================================================================

#[test]
fn test_control_request_accepted_by_controller() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let router = engine.router("app").unwrap();
    let probe = Arc::new(ResultProbe::default());
    let request = ControlRequest::new("media.action.PLAY").with_category(AUDIO);

    router
        .send_control_request(&router.selected_route(), &request, Some(probe.clone()))
        .unwrap();

    assert!(system.log().contains(&"control:media.action.PLAY".to_string()));
    assert_eq!(*probe.outcomes.lock(), vec!["result:true"]);
}

#[test]
fn test_rejected_control_request_reports_error_on_dispatch() {
    let system = Arc::new(
        TestProvider::new("android")
            .rejecting_control()
            .with_descriptor(descriptor(vec![route(DEFAULT_ID, true)])),
    );
    let engine = MediaRouterEngine::builder()
        .with_system_provider(system.clone())
        .build()
        .unwrap();
    let router = engine.router("app").unwrap();
    engine.process_pending();
    let probe = Arc::new(ResultProbe::default());
    let selected = router.selected_route();

    let result = router.send_control_request(&selected, &ControlRequest::new("media.action.PAUSE"), Some(probe.clone()));

    assert!(matches!(result, Err(RouterError::ControlRequestRejected(id)) if id == selected.id()));
    assert!(probe.outcomes.lock().is_empty());
    assert_eq!(engine.pending_tasks(), 1);
    assert!(engine.pending_events().is_empty());

    engine.process_pending();
    assert_eq!(*probe.outcomes.lock(), vec!["error:"]);
}

#[test]
fn test_control_request_to_unselected_route_fails() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true), route("R2", true)]);
    let router = engine.router("app").unwrap();
    let other = router.routes().into_iter().find(|r| r.descriptor_id() == "R2").unwrap();
    let probe = Arc::new(ResultProbe::default());
    system.clear_log();

    let result = router.send_control_request(&other, &ControlRequest::new("media.action.PLAY"), Some(probe.clone()));

    assert!(result.is_err());
    assert!(system.log().is_empty());
    engine.process_pending();
    assert_eq!(*probe.outcomes.lock(), vec!["error:"]);
}

#[test]
fn test_control_request_without_controller_fails() {
    let system = Arc::new(
        TestProvider::new("android")
            .without_controller()
            .with_descriptor(descriptor(vec![route(DEFAULT_ID, true)])),
    );
    let engine = MediaRouterEngine::builder()
        .with_system_provider(system)
        .build()
        .unwrap();
    let router = engine.router("app").unwrap();

    // Selection works without a controller
    let selected = router.selected_route();
    assert!(router
        .send_control_request(&selected, &ControlRequest::new("media.action.PLAY"), None)
        .is_err());
    assert_eq!(engine.pending_tasks(), 4);
}

// ============================================================================
// Presentation display
// ============================================================================

#[derive(Default)]
struct CountingResolver {
    calls: AtomicUsize,
}

impl DisplayResolver for CountingResolver {
    fn resolve_display(&self, display_id: i32) -> Option<DisplayHandle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(DisplayHandle::new(display_id, format!("HDMI {display_id}")))
    }
}

fn route_on_display(id: &str, display: Option<i32>) -> RouteDescriptor {
    RouteDescriptor::builder(id, format!("Route {id}"))
        .add_control_filter(ControlFilter::with_category(VIDEO))
        .presentation_display_id(display)
        .build()
}

#[test]
fn test_presentation_display_is_resolved_once_and_reset_on_change() {
    let system = Arc::new(TestProvider::new("android").with_descriptor(descriptor(vec![
        route(DEFAULT_ID, true),
        route_on_display("tv", Some(2)),
    ])));
    let resolver = Arc::new(CountingResolver::default());
    let engine = MediaRouterEngine::builder()
        .with_system_provider(system.clone())
        .with_display_resolver(resolver.clone())
        .build()
        .unwrap();
    let (router, observer) = observed_router(&engine, "app");
    engine.process_pending();
    observer.clear();
    let tv = router.routes().into_iter().find(|r| r.descriptor_id() == "tv").unwrap();

    let first = router.presentation_display(&tv).unwrap();
    let second = router.presentation_display(&tv).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.id(), 2);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);

    system.publish(Some(descriptor(vec![
        route(DEFAULT_ID, true),
        route_on_display("tv", Some(3)),
    ])));
    engine.process_pending();

    assert_eq!(
        observer.kinds(),
        vec![
            EventKind::RouteChanged,
            EventKind::RoutePresentationDisplayChanged,
            EventKind::ProviderChanged,
        ]
    );
    assert_eq!(router.presentation_display(&tv).map(|d| d.id()), Some(3));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_route_without_display_has_none() {
    let resolver = Arc::new(CountingResolver::default());
    let engine = MediaRouterEngine::builder()
        .with_system_provider(Arc::new(
            TestProvider::new("android").with_descriptor(descriptor(vec![route(DEFAULT_ID, true)])),
        ))
        .with_display_resolver(resolver.clone())
        .build()
        .unwrap();
    let router = engine.router("app").unwrap();

    assert_eq!(router.presentation_display(&router.selected_route()), None);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_display_without_resolver_is_none() {
    let (engine, _system) = engine_with_system(vec![route(DEFAULT_ID, true), route_on_display("tv", Some(2))]);
    let router = engine.router("app").unwrap();
    let tv = router.routes().into_iter().find(|r| r.descriptor_id() == "tv").unwrap();

    assert_eq!(router.presentation_display(&tv), None);
}
