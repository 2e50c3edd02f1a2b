//! Test doubles shared by the media router integration tests

#![allow(dead_code)]

use std::sync::Arc;

use media_router::{
    CallbackFlags, EventKind, MediaRouter, MediaRouterEngine, Provider, Route, RouterCallback,
    SyncError, SyncSink,
};
use parking_lot::Mutex;
use route_descriptor::{ControlFilter, ProviderDescriptor, RouteDescriptor, RouteSelector};
use route_provider::{
    ControlRequest, ControlResultCallback, DiscoveryRequest, Extras, MediaRouteProvider,
    ProviderCallback, ProviderCore, ProviderMetadata, RouteController,
};

pub const DEFAULT_ID: &str = "DEFAULT_ROUTE";
pub const AUDIO: &str = "media.category.LIVE_AUDIO";
pub const VIDEO: &str = "media.category.LIVE_VIDEO";

/// Ordered log shared between a provider and the controllers it creates
pub type CallLog = Arc<Mutex<Vec<String>>>;

// ============================================================================
// Descriptor builders
// ============================================================================

/// A route supporting the audio category
pub fn route(id: &str, enabled: bool) -> RouteDescriptor {
    route_with_category(id, enabled, AUDIO)
}

pub fn route_with_category(id: &str, enabled: bool, category: &str) -> RouteDescriptor {
    RouteDescriptor::builder(id, format!("Route {id}"))
        .enabled(enabled)
        .add_control_filter(ControlFilter::with_category(category))
        .volume_max(10)
        .build()
}

pub fn descriptor(routes: Vec<RouteDescriptor>) -> ProviderDescriptor {
    ProviderDescriptor::builder().add_routes(routes).build()
}

// ============================================================================
// Provider and controller
// ============================================================================

pub struct RecordingController {
    route_id: String,
    log: CallLog,
    accept_control: bool,
}

impl RouteController for RecordingController {
    fn select(&mut self) {
        self.log.lock().push(format!("select:{}", self.route_id));
    }

    fn unselect(&mut self) {
        self.log.lock().push(format!("unselect:{}", self.route_id));
    }

    fn release(&mut self) {
        self.log.lock().push(format!("release:{}", self.route_id));
    }

    fn set_volume(&mut self, volume: i32) {
        self.log.lock().push(format!("set_volume:{volume}"));
    }

    fn update_volume(&mut self, delta: i32) {
        self.log.lock().push(format!("update_volume:{delta}"));
    }

    fn handle_control_request(
        &mut self,
        request: &ControlRequest,
        callback: Option<ControlResultCallback>,
    ) -> bool {
        self.log.lock().push(format!("control:{}", request.action()));
        if !self.accept_control {
            return false;
        }
        if let Some(callback) = callback {
            callback.on_result(Extras::new().with("handled", true));
        }
        true
    }
}

/// Provider backed by a [`ProviderCore`] that logs controller calls
pub struct TestProvider {
    core: ProviderCore,
    log: CallLog,
    requests: Mutex<Vec<Option<DiscoveryRequest>>>,
    accept_control: bool,
    with_controller: bool,
}

impl TestProvider {
    pub fn new(package: &str) -> Self {
        Self {
            core: ProviderCore::new(ProviderMetadata::new(package)),
            log: Arc::new(Mutex::new(Vec::new())),
            requests: Mutex::new(Vec::new()),
            accept_control: true,
            with_controller: true,
        }
    }

    pub fn rejecting_control(mut self) -> Self {
        self.accept_control = false;
        self
    }

    pub fn without_controller(mut self) -> Self {
        self.with_controller = false;
        self
    }

    pub fn with_descriptor(self, descriptor: ProviderDescriptor) -> Self {
        self.core.set_descriptor(Some(descriptor));
        self
    }

    /// Publish a descriptor through the registered callback
    pub fn publish(&self, descriptor: Option<ProviderDescriptor>) {
        self.core.set_descriptor(descriptor);
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    /// Every discovery request received, oldest first
    pub fn requests(&self) -> Vec<Option<DiscoveryRequest>> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<DiscoveryRequest> {
        self.requests.lock().last().cloned().flatten()
    }

    pub fn has_callback(&self) -> bool {
        self.core.has_callback()
    }
}

impl MediaRouteProvider for TestProvider {
    fn metadata(&self) -> ProviderMetadata {
        self.core.metadata().clone()
    }

    fn descriptor(&self) -> Option<ProviderDescriptor> {
        self.core.descriptor()
    }

    fn set_callback(&self, callback: Option<Arc<dyn ProviderCallback>>) {
        self.core.set_callback(callback);
    }

    fn set_discovery_request(&self, request: Option<&DiscoveryRequest>) {
        self.requests.lock().push(request.cloned());
        self.core.set_discovery_request(request.cloned());
    }

    fn create_route_controller(&self, route_id: &str) -> Option<Box<dyn RouteController>> {
        if !self.with_controller {
            return None;
        }
        Some(Box::new(RecordingController {
            route_id: route_id.to_string(),
            log: self.log.clone(),
            accept_control: self.accept_control,
        }))
    }
}

// ============================================================================
// Observers
// ============================================================================

/// One delivered callback: the event kind and the route or provider name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub kind: EventKind,
    pub subject: String,
}

#[derive(Default)]
pub struct RecordingCallback {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingCallback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.deliveries.lock().iter().map(|d| d.kind).collect()
    }

    /// Descriptor ids of routes delivered with `kind`
    pub fn routes_with(&self, kind: EventKind) -> Vec<String> {
        self.deliveries
            .lock()
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.subject.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.deliveries.lock().clear();
    }

    fn route(&self, kind: EventKind, route: &Route) {
        self.deliveries.lock().push(Delivery {
            kind,
            subject: route.descriptor_id().to_string(),
        });
    }

    fn provider(&self, kind: EventKind, provider: &Provider) {
        self.deliveries.lock().push(Delivery {
            kind,
            subject: provider.package_name().to_string(),
        });
    }
}

impl RouterCallback for RecordingCallback {
    fn on_route_selected(&self, _router: &MediaRouter, route: &Route) {
        self.route(EventKind::RouteSelected, route);
    }

    fn on_route_unselected(&self, _router: &MediaRouter, route: &Route) {
        self.route(EventKind::RouteUnselected, route);
    }

    fn on_route_added(&self, _router: &MediaRouter, route: &Route) {
        self.route(EventKind::RouteAdded, route);
    }

    fn on_route_removed(&self, _router: &MediaRouter, route: &Route) {
        self.route(EventKind::RouteRemoved, route);
    }

    fn on_route_changed(&self, _router: &MediaRouter, route: &Route) {
        self.route(EventKind::RouteChanged, route);
    }

    fn on_route_volume_changed(&self, _router: &MediaRouter, route: &Route) {
        self.route(EventKind::RouteVolumeChanged, route);
    }

    fn on_route_presentation_display_changed(&self, _router: &MediaRouter, route: &Route) {
        self.route(EventKind::RoutePresentationDisplayChanged, route);
    }

    fn on_provider_added(&self, _router: &MediaRouter, provider: &Provider) {
        self.provider(EventKind::ProviderAdded, provider);
    }

    fn on_provider_removed(&self, _router: &MediaRouter, provider: &Provider) {
        self.provider(EventKind::ProviderRemoved, provider);
    }

    fn on_provider_changed(&self, _router: &MediaRouter, provider: &Provider) {
        self.provider(EventKind::ProviderChanged, provider);
    }
}

/// Sink that records what it sees and optionally fails every call
#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    fn record(&self, what: &str, route: &Route) -> Result<(), SyncError> {
        self.seen.lock().push(format!("{what}:{}", route.descriptor_id()));
        if self.fail {
            return Err(SyncError::Unavailable("offline".into()));
        }
        Ok(())
    }
}

impl SyncSink for RecordingSink {
    fn on_sync_route_added(&self, route: &Route) -> Result<(), SyncError> {
        self.record("added", route)
    }

    fn on_sync_route_removed(&self, route: &Route) -> Result<(), SyncError> {
        self.record("removed", route)
    }

    fn on_sync_route_changed(&self, route: &Route) -> Result<(), SyncError> {
        self.record("changed", route)
    }

    fn on_sync_route_selected(&self, route: &Route) -> Result<(), SyncError> {
        self.record("selected", route)
    }
}

// ============================================================================
// Engine setup
// ============================================================================

/// Engine whose system provider publishes `routes`
pub fn engine_with_system(routes: Vec<RouteDescriptor>) -> (MediaRouterEngine, Arc<TestProvider>) {
    let system = Arc::new(TestProvider::new("android").with_descriptor(descriptor(routes)));
    let engine = MediaRouterEngine::builder()
        .with_system_provider(system.clone())
        .build()
        .expect("engine should build");
    (engine, system)
}

/// Router with an unfiltered recording callback
pub fn observed_router(engine: &MediaRouterEngine, caller: &str) -> (MediaRouter, Arc<RecordingCallback>) {
    let router = engine.router(caller).expect("router should be created");
    let callback = RecordingCallback::new();
    router
        .add_callback_with_flags(&RouteSelector::EMPTY, callback.clone(), CallbackFlags::UNFILTERED_EVENTS)
        .expect("callback should register");
    (router, callback)
}

/// Provider that forwards every descriptor to the router, even repeats
pub struct RawProvider {
    metadata: ProviderMetadata,
    current: Mutex<Option<ProviderDescriptor>>,
    callback: Mutex<Option<Arc<dyn ProviderCallback>>>,
}

impl RawProvider {
    pub fn new(package: &str) -> Self {
        Self {
            metadata: ProviderMetadata::new(package),
            current: Mutex::new(None),
            callback: Mutex::new(None),
        }
    }

    pub fn push(&self, descriptor: Option<ProviderDescriptor>) {
        *self.current.lock() = descriptor.clone();
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback.on_descriptor_changed(descriptor);
        }
    }
}

impl MediaRouteProvider for RawProvider {
    fn metadata(&self) -> ProviderMetadata {
        self.metadata.clone()
    }

    fn descriptor(&self) -> Option<ProviderDescriptor> {
        self.current.lock().clone()
    }

    fn set_callback(&self, callback: Option<Arc<dyn ProviderCallback>>) {
        *self.callback.lock() = callback;
    }

    fn set_discovery_request(&self, _request: Option<&DiscoveryRequest>) {}

    fn create_route_controller(&self, _route_id: &str) -> Option<Box<dyn RouteController>> {
        None
    }
}
