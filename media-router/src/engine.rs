//! The media router engine
//!
//! One explicitly constructed [`MediaRouterEngine`] owns the route and
//! provider registries, the selection, the aggregate discovery request and
//! the pending event queue. Router facades, provider callbacks and the host's
//! driver loop all hold clones of the same engine handle.
//!
//! The engine is confined to the thread that built it. Mutations happen under
//! one internal lock; events they produce are queued and only delivered when
//! the driver calls [`MediaRouterEngine::process_pending`], with the lock
//! released, so observers can freely call back into the router.
//!
//! Provider and controller methods run while the lock is held. A provider
//! that publishes a descriptor from inside one of those calls has it applied
//! as soon as the current operation finishes; any other call into the engine
//! from that context is a programming error and panics.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use route_descriptor::{ControlRequest, DiscoveryRequest, ProviderDescriptor, RouteSelector};
use route_provider::{ControlResultCallback, MediaRouteProvider, ProviderCallback};
use tracing::{debug, info, trace, warn};

use crate::callback::RouterCallback;
use crate::config::RouterConfig;
use crate::discovery::DiscoveryCoordinator;
use crate::display::{DisplayHandle, DisplayResolver};
use crate::dispatcher::{run_task, DeliveryTarget, RouterEvent, Task, TaskQueue};
use crate::error::{Result, RouterError};
use crate::model::{AvailabilityFlags, CallbackFlags, CallerId, Provider, ProviderId, Route, RouteId, RouterId};
use crate::reconciler::reconcile;
use crate::registry::RouteRegistry;
use crate::router::{MediaRouter, RouterRecord, RouterTable};
use crate::selection::Selection;
use crate::sync::SyncSink;

// ============================================================================
// Engine state
// ============================================================================

/// Everything guarded by the engine lock
pub(crate) struct EngineState {
    default_route_id: String,
    registry: RouteRegistry,
    selection: Selection,
    discovery: DiscoveryCoordinator,
    queue: TaskQueue,
    routers: RouterTable,
    shut_down: bool,
    /// Facades outlive a shutdown until the drain that started it runs dry
    dispose_routers_when_idle: bool,
}

impl EngineState {
    fn new(config: &RouterConfig) -> Self {
        Self {
            default_route_id: config.default_route_id.clone(),
            registry: RouteRegistry::new(),
            selection: Selection::new(),
            discovery: DiscoveryCoordinator::new(),
            queue: TaskQueue::new(config.queue_warning_threshold),
            routers: RouterTable::new(),
            shut_down: false,
            dispose_routers_when_idle: false,
        }
    }

    fn attach_provider(
        &mut self,
        engine: &Weak<EngineShared>,
        instance: Arc<dyn MediaRouteProvider>,
        system: bool,
    ) -> ProviderId {
        if let Some(index) = self.registry.provider_index_of(&instance) {
            let provider = self.registry.provider_at(index);
            warn!(provider = provider.package_name(), "Provider is already attached");
            return provider.id();
        }

        let index = self.registry.add_provider(instance.clone());
        let id = self.registry.provider_at(index).id();
        if system {
            self.registry.set_system_provider(id);
        }

        let snapshot = self.registry.provider_at(index).snapshot();
        debug!(provider = %snapshot, "Provider added");
        self.queue.push(Task::Event(RouterEvent::ProviderAdded(snapshot)));

        let descriptor = instance.descriptor();
        self.apply_descriptor(index, descriptor.as_ref());

        instance.set_callback(Some(Arc::new(EngineProviderCallback {
            engine: engine.clone(),
            provider: id,
        })));
        instance.set_discovery_request(self.discovery.current());
        id
    }

    fn detach_provider(&mut self, instance: &Arc<dyn MediaRouteProvider>) {
        let Some(index) = self.registry.provider_index_of(instance) else {
            debug!("Ignoring removal of a provider that is not attached");
            return;
        };

        instance.set_callback(None);
        instance.set_discovery_request(None);
        self.apply_descriptor(index, None);

        let snapshot = self.registry.provider_at(index).snapshot();
        debug!(provider = %snapshot, "Provider removed");
        self.queue.push(Task::Event(RouterEvent::ProviderRemoved(snapshot)));
        self.registry.remove_provider_at(index);
    }

    fn apply_descriptor(&mut self, index: usize, descriptor: Option<&ProviderDescriptor>) {
        let events = reconcile(
            &mut self.registry,
            &mut self.selection,
            index,
            descriptor,
            &self.default_route_id,
        );
        self.queue.push_events(events);
    }

    fn update_provider_descriptor(&mut self, provider: ProviderId, descriptor: Option<&ProviderDescriptor>) {
        match self.registry.provider_index(provider) {
            Some(index) => self.apply_descriptor(index, descriptor),
            None => debug!(%provider, "Ignoring descriptor from a detached provider"),
        }
    }

    fn dispose_router(&mut self, record: Option<RouterRecord>) -> bool {
        let Some(record) = record else {
            return false;
        };
        debug!(caller = %record.caller(), callbacks = record.callbacks().len(), "Router disposed");
        if !record.callbacks().is_empty() {
            self.update_discovery_request();
        }
        true
    }

    fn dispose_all_routers(&mut self) {
        debug!(routers = self.routers.len(), "Disposing router facades");
        self.dispose_routers_when_idle = false;
        self.routers.clear();
        self.update_discovery_request();
    }

    fn update_discovery_request(&mut self) {
        let Some(request) = self.discovery.recompute(self.routers.registrations()) else {
            return;
        };
        match &request {
            Some(request) => debug!(%request, "Discovery request changed"),
            None => debug!("Discovery request cleared"),
        }
        for provider in self.registry.providers() {
            provider.instance().set_discovery_request(request.as_ref());
        }
    }

    fn select_route(&mut self, route: RouteId) -> bool {
        let mut events = Vec::new();
        let selected = self.selection.select_route(&self.registry, route, &mut events);
        self.queue.push_events(events);
        selected
    }

    fn snapshot_of(&self, route: Option<RouteId>, which: &'static str) -> Result<Route> {
        route
            .and_then(|id| self.registry.snapshot(id))
            .ok_or(RouterError::NotInitialized(which))
    }

    fn next_task(&mut self, engine: &MediaRouterEngine) -> Option<(Task, Vec<DeliveryTarget>)> {
        let Some(task) = self.queue.pop() else {
            if self.dispose_routers_when_idle {
                self.dispose_all_routers();
            }
            return None;
        };
        let targets = match task {
            Task::Event(_) => self.routers.delivery_targets(engine),
            Task::ControlRequestFailed(_) => Vec::new(),
        };
        Some((task, targets))
    }
}

// ============================================================================
// Shared engine internals
// ============================================================================

pub(crate) struct EngineShared {
    owner: ThreadId,
    config: RouterConfig,
    state: Mutex<EngineState>,
    /// Thread currently inside a state mutation, used to detect reentrancy
    holder: Mutex<Option<ThreadId>>,
    /// Descriptors published while the state was locked
    inbox: Mutex<VecDeque<(ProviderId, Option<ProviderDescriptor>)>>,
    dispatching: AtomicBool,
    sync_sink: Option<Arc<dyn SyncSink>>,
    display_resolver: Option<Arc<dyn DisplayResolver>>,
}

/// Clears the holder slot even if the mutation panicked
struct HolderGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for HolderGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

struct DispatchGuard<'a>(&'a AtomicBool);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The callback installed into every attached provider
struct EngineProviderCallback {
    engine: Weak<EngineShared>,
    provider: ProviderId,
}

impl ProviderCallback for EngineProviderCallback {
    fn on_descriptor_changed(&self, descriptor: Option<ProviderDescriptor>) {
        if let Some(shared) = self.engine.upgrade() {
            MediaRouterEngine { shared }.deliver_descriptor(self.provider, descriptor);
        }
    }
}

// ============================================================================
// MediaRouterEngine
// ============================================================================

/// Handle to the route coordination engine
///
/// Cloning is cheap; every clone refers to the same engine.
#[derive(Clone)]
pub struct MediaRouterEngine {
    shared: Arc<EngineShared>,
}

impl MediaRouterEngine {
    /// Create a builder for configuring the engine
    pub fn builder() -> MediaRouterEngineBuilder {
        MediaRouterEngineBuilder::default()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.shared.config
    }

    fn check_calling_thread(&self) {
        if self.shared.config.enforce_thread_affinity && thread::current().id() != self.shared.owner {
            panic!("The media router must only be accessed on the thread that created it");
        }
    }

    fn is_mutating_on_this_thread(&self) -> bool {
        *self.shared.holder.lock() == Some(thread::current().id())
    }

    /// Run `f` under the engine lock, then apply descriptors it deferred
    fn with_state<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        self.check_calling_thread();
        if self.is_mutating_on_this_thread() {
            panic!(
                "The media router was called from inside a provider or controller method; \
                 defer the call until that method has returned"
            );
        }

        let mut state = self.shared.state.lock();
        *self.shared.holder.lock() = Some(thread::current().id());
        let _holder = HolderGuard(&self.shared.holder);

        let result = f(&mut state);
        self.apply_deferred_descriptors(&mut state);
        result
    }

    fn apply_deferred_descriptors(&self, state: &mut EngineState) {
        loop {
            let next = self.shared.inbox.lock().pop_front();
            let Some((provider, descriptor)) = next else {
                break;
            };
            state.update_provider_descriptor(provider, descriptor.as_ref());
        }
    }

    fn deliver_descriptor(&self, provider: ProviderId, descriptor: Option<ProviderDescriptor>) {
        self.check_calling_thread();
        if self.is_mutating_on_this_thread() {
            trace!(%provider, "Deferring descriptor published during an engine call");
            self.shared.inbox.lock().push_back((provider, descriptor));
            return;
        }
        self.with_state(|state| state.update_provider_descriptor(provider, descriptor.as_ref()));
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// The facade for `caller`, created on first use
    pub fn router(&self, caller: impl Into<CallerId>) -> Result<MediaRouter> {
        let caller = caller.into();
        let id = self.with_state(|state| {
            if state.shut_down {
                return Err(RouterError::ShutDown);
            }
            Ok(state.routers.get_or_create(&caller))
        })?;
        Ok(MediaRouter::new(self.clone(), id, caller))
    }

    /// Remove a caller's facade and its registrations
    ///
    /// Returns false if the caller had no facade.
    pub fn dispose_router(&self, caller: &CallerId) -> bool {
        self.with_state(|state| {
            let record = state.routers.remove(caller);
            state.dispose_router(record)
        })
    }

    /// Remove one specific facade; a newer facade for the same caller is kept
    pub(crate) fn dispose_router_id(&self, id: RouterId) -> bool {
        self.with_state(|state| {
            let record = state.routers.remove_id(id);
            state.dispose_router(record)
        })
    }

    pub(crate) fn is_router_active(&self, id: RouterId) -> bool {
        self.with_state(|state| state.routers.contains(id))
    }

    /// Detach every provider, deliver the resulting events and dispose every facade
    ///
    /// The selected route's controller is unselected and released as its
    /// provider goes away. Afterwards no facade can be created and no
    /// provider attached.
    pub fn shutdown(&self) {
        let already = self.with_state(|state| {
            if state.shut_down {
                return true;
            }
            let instances: Vec<Arc<dyn MediaRouteProvider>> = state
                .registry
                .providers()
                .iter()
                .rev()
                .map(|p| p.instance().clone())
                .collect();
            for instance in &instances {
                state.detach_provider(instance);
            }
            state.shut_down = true;
            false
        });
        if already {
            return;
        }

        self.process_pending();

        // A nested drain delivered nothing; the outer one disposes when dry
        self.with_state(|state| {
            if state.queue.is_empty() {
                state.dispose_all_routers();
            } else {
                state.dispose_routers_when_idle = true;
            }
        });
        info!("Media router shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.with_state(|state| state.shut_down)
    }

    // ========================================================================
    // Providers
    // ========================================================================

    /// Attach a provider
    ///
    /// Attaching an instance that is already attached returns its existing id.
    pub fn add_provider(&self, provider: Arc<dyn MediaRouteProvider>) -> Result<ProviderId> {
        self.attach(provider, false)
    }

    fn attach(&self, provider: Arc<dyn MediaRouteProvider>, system: bool) -> Result<ProviderId> {
        let weak = Arc::downgrade(&self.shared);
        self.with_state(|state| {
            if state.shut_down {
                return Err(RouterError::ShutDown);
            }
            Ok(state.attach_provider(&weak, provider, system))
        })
    }

    /// Detach a provider, removing all of its routes
    pub fn remove_provider(&self, provider: &Arc<dyn MediaRouteProvider>) {
        self.with_state(|state| state.detach_provider(provider));
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.with_state(|state| {
            state
                .registry
                .providers()
                .iter()
                .map(|p| p.snapshot())
                .collect()
        })
    }

    /// Look up a route of the system provider by its descriptor id
    pub fn system_route_by_descriptor_id(&self, descriptor_id: &str) -> Option<Route> {
        self.with_state(|state| {
            let system = state.registry.system_provider()?;
            state
                .registry
                .routes()
                .find(|r| r.provider_id() == system && r.descriptor_id() == descriptor_id)
                .map(|r| r.snapshot())
        })
    }

    // ========================================================================
    // Routes and selection
    // ========================================================================

    /// All registered routes in registration order
    pub fn routes(&self) -> Vec<Route> {
        self.with_state(|state| state.registry.routes().map(|r| r.snapshot()).collect())
    }

    pub fn route(&self, id: RouteId) -> Option<Route> {
        self.with_state(|state| {
            if state.registry.is_registered(id) {
                state.registry.snapshot(id)
            } else {
                None
            }
        })
    }

    pub(crate) fn default_route(&self) -> Result<Route> {
        self.with_state(|state| state.snapshot_of(state.selection.default_route(), "default"))
    }

    pub(crate) fn selected_route(&self) -> Result<Route> {
        self.with_state(|state| {
            state.snapshot_of(state.selection.selected_route(), "currently selected")
        })
    }

    pub(crate) fn is_default(&self, route: RouteId) -> bool {
        self.with_state(|state| state.selection.default_route() == Some(route))
    }

    pub(crate) fn is_selected(&self, route: RouteId) -> bool {
        self.with_state(|state| state.selection.selected_route() == Some(route))
    }

    pub(crate) fn select_route(&self, route: RouteId) {
        self.with_state(|state| {
            state.select_route(route);
        });
    }

    pub(crate) fn update_selected_route(&self, selector: &RouteSelector) -> Result<Route> {
        self.with_state(|state| {
            let selected = state.snapshot_of(state.selection.selected_route(), "currently selected")?;
            let default = state.snapshot_of(state.selection.default_route(), "default")?;
            if selected.id() != default.id() && !selected.matches_selector(selector) {
                info!(route = %default, "Selected route no longer matches; falling back to default");
                state.select_route(default.id());
                return Ok(default);
            }
            Ok(selected)
        })
    }

    pub(crate) fn is_route_available(&self, selector: &RouteSelector, flags: AvailabilityFlags) -> bool {
        self.with_state(|state| {
            let default = state.selection.default_route();
            let ignore_default = flags.contains(AvailabilityFlags::IGNORE_DEFAULT_ROUTE);
            let matching_route = state
                .registry
                .routes()
                .filter(|r| !(ignore_default && Some(r.id()) == default))
                .any(|r| selector.matches_control_filters(r.attributes().control_filters()));
            if matching_route {
                return true;
            }

            flags.contains(AvailabilityFlags::CONSIDER_ACTIVE_SCAN)
                && state.registry.providers().iter().any(|p| {
                    p.is_active_scan_required()
                        && selector.matches_control_filters(p.discoverable_control_filters())
                })
        })
    }

    // ========================================================================
    // Callbacks and discovery
    // ========================================================================

    pub(crate) fn add_callback(
        &self,
        router: RouterId,
        caller: &CallerId,
        selector: &RouteSelector,
        callback: Arc<dyn RouterCallback>,
        flags: CallbackFlags,
    ) -> Result<()> {
        self.with_state(|state| {
            let record = state
                .routers
                .get_mut(router)
                .ok_or_else(|| RouterError::RouterDisposed(caller.clone()))?;
            if record.add_callback(selector, callback, flags) {
                state.update_discovery_request();
            }
            Ok(())
        })
    }

    pub(crate) fn remove_callback(&self, router: RouterId, callback: &Arc<dyn RouterCallback>) {
        self.with_state(|state| {
            let removed = state
                .routers
                .get_mut(router)
                .map(|record| record.remove_callback(callback))
                .unwrap_or(false);
            if removed {
                state.update_discovery_request();
            }
        });
    }

    /// The discovery request currently pushed to providers
    pub fn discovery_request(&self) -> Option<DiscoveryRequest> {
        self.with_state(|state| state.discovery.current().cloned())
    }

    // ========================================================================
    // Route control
    // ========================================================================

    pub(crate) fn send_control_request(
        &self,
        route: RouteId,
        request: &ControlRequest,
        callback: Option<ControlResultCallback>,
    ) -> Result<()> {
        self.with_state(|state| {
            let handled = state
                .selection
                .controller_for(route)
                .map(|controller| controller.handle_control_request(request, callback.clone()))
                .unwrap_or(false);
            if handled {
                return Ok(());
            }

            debug!(%route, action = request.action(), "Control request was not handled");
            if let Some(callback) = callback {
                state.queue.push(Task::ControlRequestFailed(callback));
            }
            Err(RouterError::ControlRequestRejected(route))
        })
    }

    pub(crate) fn request_set_volume(&self, route: RouteId, volume: i32) {
        self.with_state(|state| {
            let Some(volume_max) = state.registry.route(route).map(|r| r.attributes().volume_max()) else {
                return;
            };
            let volume = volume.max(0).min(volume_max);
            if let Some(controller) = state.selection.controller_for(route) {
                controller.set_volume(volume);
            }
        });
    }

    pub(crate) fn request_update_volume(&self, route: RouteId, delta: i32) {
        self.with_state(|state| {
            if let Some(controller) = state.selection.controller_for(route) {
                controller.update_volume(delta);
            }
        });
    }

    pub(crate) fn presentation_display(&self, route: RouteId) -> Option<DisplayHandle> {
        let resolver = self.shared.display_resolver.clone();
        self.with_state(|state| {
            let info = state.registry.route_mut(route)?;
            let display_id = info.attributes().presentation_display_id()?;
            if info.presentation_display().is_none() {
                let resolved = resolver.as_ref()?.resolve_display(display_id)?;
                info.cache_presentation_display(resolved);
            }
            info.presentation_display().cloned()
        })
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Number of tasks waiting to be delivered
    pub fn pending_tasks(&self) -> usize {
        self.with_state(|state| state.queue.len())
    }

    /// Events waiting to be delivered, oldest first
    pub fn pending_events(&self) -> Vec<RouterEvent> {
        self.with_state(|state| state.queue.events().cloned().collect())
    }

    /// Deliver at most `max` queued tasks
    ///
    /// Returns the number delivered. Called from inside an observer callback
    /// this returns 0 immediately; the outer drain picks up anything the
    /// observer queued.
    pub fn process_batch(&self, max: usize) -> usize {
        self.check_calling_thread();
        if self.shared.dispatching.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let _dispatching = DispatchGuard(&self.shared.dispatching);

        let sink = self.shared.sync_sink.as_deref();
        let mut delivered = 0;
        while delivered < max {
            let Some((task, targets)) = self.with_state(|state| state.next_task(self)) else {
                break;
            };
            run_task(task, sink, &targets);
            delivered += 1;
        }
        if delivered > 0 {
            trace!(delivered, "Dispatched router tasks");
        }
        delivered
    }

    /// Deliver queued tasks until the queue is empty
    ///
    /// Tasks queued by observers during delivery are delivered too.
    pub fn process_pending(&self) -> usize {
        let batch = self.shared.config.max_dispatch_batch;
        let mut total = 0;
        loop {
            let delivered = self.process_batch(batch);
            total += delivered;
            if delivered < batch {
                return total;
            }
        }
    }
}

impl std::fmt::Debug for MediaRouterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaRouterEngine")
            .field("config", &self.shared.config)
            .field("has_sync_sink", &self.shared.sync_sink.is_some())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`MediaRouterEngine`]
#[derive(Default)]
pub struct MediaRouterEngineBuilder {
    config: Option<RouterConfig>,
    system_provider: Option<Arc<dyn MediaRouteProvider>>,
    sync_sink: Option<Arc<dyn SyncSink>>,
    display_resolver: Option<Arc<dyn DisplayResolver>>,
}

impl MediaRouterEngineBuilder {
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// The privileged provider whose `default_route_id` route becomes the default
    ///
    /// Without one no default route is ever elected and nothing is selected
    /// automatically.
    pub fn with_system_provider(mut self, provider: Arc<dyn MediaRouteProvider>) -> Self {
        self.system_provider = Some(provider);
        self
    }

    pub fn with_sync_sink(mut self, sink: Arc<dyn SyncSink>) -> Self {
        self.sync_sink = Some(sink);
        self
    }

    pub fn with_display_resolver(mut self, resolver: Arc<dyn DisplayResolver>) -> Self {
        self.display_resolver = Some(resolver);
        self
    }

    /// Build the engine on the current thread, attaching the system provider first
    pub fn build(self) -> Result<MediaRouterEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let engine = MediaRouterEngine {
            shared: Arc::new(EngineShared {
                owner: thread::current().id(),
                state: Mutex::new(EngineState::new(&config)),
                config,
                holder: Mutex::new(None),
                inbox: Mutex::new(VecDeque::new()),
                dispatching: AtomicBool::new(false),
                sync_sink: self.sync_sink,
                display_resolver: self.display_resolver,
            }),
        };

        if let Some(system) = self.system_provider {
            engine.attach(system, true)?;
        }

        debug!(config = ?engine.shared.config, "Media router engine created");
        Ok(engine)
    }
}
