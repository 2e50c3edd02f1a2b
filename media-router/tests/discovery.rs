//! Integration tests for the aggregate discovery request and route availability

mod helpers;

use std::sync::Arc;

use helpers::*;
use media_router::{AvailabilityFlags, CallbackFlags, RouterCallback};
use route_descriptor::{ControlFilter, ProviderDescriptor, RouteSelector};

#[test]
fn test_request_is_union_of_all_routers() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let music = engine.router("music").unwrap();
    let video = engine.router("video").unwrap();

    music
        .add_callback(&RouteSelector::for_category(AUDIO), RecordingCallback::new())
        .unwrap();
    video
        .add_callback(&RouteSelector::for_category(VIDEO), RecordingCallback::new())
        .unwrap();

    let request = system.last_request().expect("request should be pushed");
    assert!(request.selector().has_control_category(AUDIO));
    assert!(request.selector().has_control_category(VIDEO));
    assert!(!request.is_active_scan());
    assert_eq!(engine.discovery_request(), Some(request));
}

#[test]
fn test_removing_registrations_narrows_then_clears() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let music = engine.router("music").unwrap();
    let video = engine.router("video").unwrap();
    let video_callback = RecordingCallback::new();
    music
        .add_callback(&RouteSelector::for_category(AUDIO), RecordingCallback::new())
        .unwrap();
    video
        .add_callback(&RouteSelector::for_category(VIDEO), video_callback.clone())
        .unwrap();

    let callback: Arc<dyn RouterCallback> = video_callback;
    video.remove_callback(&callback);

    let request = system.last_request().unwrap();
    assert!(request.selector().has_control_category(AUDIO));
    assert!(!request.selector().has_control_category(VIDEO));

    music.dispose();
    assert_eq!(system.requests().last(), Some(&None));
    assert_eq!(engine.discovery_request(), None);
}

#[test]
fn test_unchanged_aggregate_is_not_pushed_again() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let router = engine.router("music").unwrap();
    let callback = RecordingCallback::new();

    router
        .add_callback(&RouteSelector::for_category(AUDIO), callback.clone())
        .unwrap();
    let pushed = system.requests().len();

    router
        .add_callback(&RouteSelector::for_category(AUDIO), callback.clone())
        .unwrap();
    engine
        .router("second")
        .unwrap()
        .add_callback(&RouteSelector::for_category(AUDIO), RecordingCallback::new())
        .unwrap();

    assert_eq!(system.requests().len(), pushed);
}

#[test]
fn test_new_provider_receives_current_request() {
    let (engine, _system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let router = engine.router("music").unwrap();
    router
        .add_callback(&RouteSelector::for_category(AUDIO), RecordingCallback::new())
        .unwrap();

    let cast = Arc::new(TestProvider::new("cast"));
    router.add_provider(cast.clone()).unwrap();

    let requests = cast.requests();
    assert_eq!(requests.len(), 1);
    let request = requests[0].clone().unwrap();
    assert!(request.selector().has_control_category(AUDIO));
}

#[test]
fn test_active_scan_without_categories_still_requests() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let router = engine.router("scanner").unwrap();

    router
        .add_callback_with_flags(&RouteSelector::EMPTY, RecordingCallback::new(), CallbackFlags::ACTIVE_SCAN)
        .unwrap();

    let request = system.last_request().unwrap();
    assert!(request.is_active_scan());
    assert!(request.selector().is_empty());
}

#[test]
fn test_unfiltered_flag_alone_requests_nothing() {
    let (engine, system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let _ = observed_router(&engine, "app");

    assert_eq!(engine.discovery_request(), None);
    assert_eq!(system.requests(), vec![None]);
}

#[test]
fn test_route_availability() {
    let (engine, _system) = engine_with_system(vec![
        route(DEFAULT_ID, true),
        route_with_category("tv", false, VIDEO),
    ]);
    let router = engine.router("app").unwrap();
    let audio = RouteSelector::for_category(AUDIO);
    let video = RouteSelector::for_category(VIDEO);

    assert!(router.is_route_available(&audio, AvailabilityFlags::empty()));
    assert!(!router.is_route_available(&audio, AvailabilityFlags::IGNORE_DEFAULT_ROUTE));
    // Disabled routes still count as available
    assert!(router.is_route_available(&video, AvailabilityFlags::IGNORE_DEFAULT_ROUTE));
    assert!(!router.is_route_available(&RouteSelector::for_category("other"), AvailabilityFlags::empty()));
}

#[test]
fn test_availability_considers_active_scan_providers() {
    let (engine, _system) = engine_with_system(vec![route(DEFAULT_ID, true)]);
    let router = engine.router("app").unwrap();
    let scanner = Arc::new(
        TestProvider::new("cast").with_descriptor(
            ProviderDescriptor::builder()
                .active_scan_required(true)
                .add_discoverable_control_filter(ControlFilter::with_category(VIDEO))
                .build(),
        ),
    );
    router.add_provider(scanner).unwrap();
    let video = RouteSelector::for_category(VIDEO);

    assert!(!router.is_route_available(&video, AvailabilityFlags::empty()));
    assert!(router.is_route_available(&video, AvailabilityFlags::CONSIDER_ACTIVE_SCAN));
}
