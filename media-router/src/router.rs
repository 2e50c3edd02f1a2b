//! Per-caller router facades
//!
//! A [`MediaRouter`] is a cheap handle bound to one [`CallerId`]. All state
//! lives in the [`MediaRouterEngine`]; the facade only scopes callback
//! registrations to its caller so they can be dropped together on
//! [`MediaRouter::dispose`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use route_descriptor::{ControlRequest, RouteSelector};
use route_provider::{ControlResultCallback, MediaRouteProvider};

use crate::callback::{CallbackRecord, RouterCallback};
use crate::display::DisplayHandle;
use crate::dispatcher::DeliveryTarget;
use crate::engine::MediaRouterEngine;
use crate::error::Result;
use crate::model::{
    AvailabilityFlags, CallbackFlags, CallerId, IdSequence, Provider, ProviderId, Route, RouteId,
    RouterId,
};

// ============================================================================
// MediaRouter - the caller-facing facade
// ============================================================================

/// A caller's view of the media router
///
/// Obtained from [`MediaRouterEngine::router`]. Every method must be called on
/// the engine's owning thread.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use media_router::{CallbackFlags, MediaRouterEngine, Route, RouterCallback, MediaRouter};
/// use route_descriptor::{categories, RouteSelector};
///
/// struct Picker;
///
/// impl RouterCallback for Picker {
///     fn on_route_added(&self, _router: &MediaRouter, route: &Route) {
///         println!("found {}", route.name());
///     }
/// }
///
/// let engine = MediaRouterEngine::builder().build()?;
/// let router = engine.router("picker")?;
/// router.add_callback_with_flags(
///     &RouteSelector::for_category(categories::LIVE_AUDIO),
///     Arc::new(Picker),
///     CallbackFlags::ACTIVE_SCAN,
/// )?;
/// engine.process_pending();
/// # Ok::<(), media_router::RouterError>(())
/// ```
#[derive(Clone)]
pub struct MediaRouter {
    engine: MediaRouterEngine,
    id: RouterId,
    caller: CallerId,
}

impl MediaRouter {
    pub(crate) fn new(engine: MediaRouterEngine, id: RouterId, caller: CallerId) -> Self {
        Self { engine, id, caller }
    }

    pub fn id(&self) -> RouterId {
        self.id
    }

    pub fn caller(&self) -> &CallerId {
        &self.caller
    }

    pub fn engine(&self) -> &MediaRouterEngine {
        &self.engine
    }

    /// False once the facade was disposed or the engine shut down
    pub fn is_active(&self) -> bool {
        self.engine.is_router_active(self.id)
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// All known routes in registration order
    pub fn routes(&self) -> Vec<Route> {
        self.engine.routes()
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.engine.providers()
    }

    pub fn route(&self, id: RouteId) -> Option<Route> {
        self.engine.route(id)
    }

    pub fn add_provider(&self, provider: Arc<dyn MediaRouteProvider>) -> Result<ProviderId> {
        self.engine.add_provider(provider)
    }

    pub fn remove_provider(&self, provider: &Arc<dyn MediaRouteProvider>) {
        self.engine.remove_provider(provider)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// The system default route
    ///
    /// # Panics
    ///
    /// Panics if no default route has been elected yet. Use
    /// [`MediaRouter::try_default_route`] when that can happen.
    pub fn default_route(&self) -> Route {
        match self.try_default_route() {
            Ok(route) => route,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_default_route(&self) -> Result<Route> {
        self.engine.default_route()
    }

    /// The currently selected route
    ///
    /// # Panics
    ///
    /// Panics if nothing is selected yet. Use
    /// [`MediaRouter::try_selected_route`] when that can happen.
    pub fn selected_route(&self) -> Route {
        match self.try_selected_route() {
            Ok(route) => route,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_selected_route(&self) -> Result<Route> {
        self.engine.selected_route()
    }

    pub fn is_default(&self, route: &Route) -> bool {
        self.engine.is_default(route.id())
    }

    pub fn is_selected(&self, route: &Route) -> bool {
        self.engine.is_selected(route.id())
    }

    /// Select a route; removed or disabled routes are ignored
    pub fn select_route(&self, route: &Route) {
        self.engine.select_route(route.id());
    }

    /// Fall back to the default route if the selection no longer matches
    ///
    /// Returns the route that is selected afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the router has not been initialized.
    pub fn update_selected_route(&self, selector: &RouteSelector) -> Route {
        match self.try_update_selected_route(selector) {
            Ok(route) => route,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_update_selected_route(&self, selector: &RouteSelector) -> Result<Route> {
        self.engine.update_selected_route(selector)
    }

    /// True if a route matching `selector` exists or could be discovered
    pub fn is_route_available(&self, selector: &RouteSelector, flags: AvailabilityFlags) -> bool {
        self.engine.is_route_available(selector, flags)
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Register a callback without flags
    pub fn add_callback(&self, selector: &RouteSelector, callback: Arc<dyn RouterCallback>) -> Result<()> {
        self.add_callback_with_flags(selector, callback, CallbackFlags::empty())
    }

    /// Register a callback, or widen an existing registration
    ///
    /// Registering the same callback again adds `selector` to the selector it
    /// already has and ORs in `flags`. Registrations are never narrowed;
    /// remove and re-add the callback for that.
    pub fn add_callback_with_flags(
        &self,
        selector: &RouteSelector,
        callback: Arc<dyn RouterCallback>,
        flags: CallbackFlags,
    ) -> Result<()> {
        self.engine
            .add_callback(self.id, &self.caller, selector, callback, flags)
    }

    pub fn remove_callback(&self, callback: &Arc<dyn RouterCallback>) {
        self.engine.remove_callback(self.id, callback);
    }

    // ========================================================================
    // Route control
    // ========================================================================

    /// Send a control request to the selected route's controller
    ///
    /// If `route` is not selected, has no controller, or the controller
    /// declines, `callback` receives an error during the next dispatch and
    /// the call returns [`RouterError::ControlRequestRejected`](crate::RouterError::ControlRequestRejected).
    pub fn send_control_request(
        &self,
        route: &Route,
        request: &ControlRequest,
        callback: Option<ControlResultCallback>,
    ) -> Result<()> {
        self.engine.send_control_request(route.id(), request, callback)
    }

    /// Ask the selected route to set its volume, clamped to `[0, volume_max]`
    pub fn request_set_volume(&self, route: &Route, volume: i32) {
        self.engine.request_set_volume(route.id(), volume);
    }

    /// Ask the selected route to adjust its volume; zero deltas are dropped
    pub fn request_update_volume(&self, route: &Route, delta: i32) {
        if delta != 0 {
            self.engine.request_update_volume(route.id(), delta);
        }
    }

    /// The display to present on when `route` is selected, if any
    pub fn presentation_display(&self, route: &Route) -> Option<DisplayHandle> {
        self.engine.presentation_display(route.id())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Drop this facade and all of its callback registrations
    ///
    /// Disposing a handle whose facade is already gone does nothing, even if
    /// the caller has since been given a new facade.
    pub fn dispose(self) {
        self.engine.dispose_router_id(self.id);
    }
}

impl fmt::Debug for MediaRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaRouter")
            .field("id", &self.id)
            .field("caller", &self.caller)
            .finish()
    }
}

// ============================================================================
// RouterTable - engine-side facade bookkeeping
// ============================================================================

pub(crate) struct RouterRecord {
    caller: CallerId,
    callbacks: Vec<CallbackRecord>,
}

impl RouterRecord {
    pub(crate) fn caller(&self) -> &CallerId {
        &self.caller
    }

    pub(crate) fn callbacks(&self) -> &[CallbackRecord] {
        &self.callbacks
    }

    /// Add or widen; returns true if the aggregate interest may have changed
    pub(crate) fn add_callback(
        &mut self,
        selector: &RouteSelector,
        callback: Arc<dyn RouterCallback>,
        flags: CallbackFlags,
    ) -> bool {
        let index = match self.callbacks.iter().position(|r| r.is_for(&callback)) {
            Some(index) => index,
            None => {
                self.callbacks.push(CallbackRecord::new(callback));
                self.callbacks.len() - 1
            }
        };
        self.callbacks[index].widen(selector, flags)
    }

    pub(crate) fn remove_callback(&mut self, callback: &Arc<dyn RouterCallback>) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|r| !r.is_for(callback));
        self.callbacks.len() != before
    }
}

/// Facades keyed by id, in creation order
pub(crate) struct RouterTable {
    routers: BTreeMap<RouterId, RouterRecord>,
    callers: HashMap<CallerId, RouterId>,
    ids: IdSequence,
}

impl RouterTable {
    pub(crate) fn new() -> Self {
        Self {
            routers: BTreeMap::new(),
            callers: HashMap::new(),
            ids: IdSequence::new(),
        }
    }

    /// Id of the caller's facade, creating one on first use
    pub(crate) fn get_or_create(&mut self, caller: &CallerId) -> RouterId {
        if let Some(id) = self.callers.get(caller) {
            return *id;
        }
        let id = RouterId::new(self.ids.next());
        self.callers.insert(caller.clone(), id);
        self.routers.insert(
            id,
            RouterRecord {
                caller: caller.clone(),
                callbacks: Vec::new(),
            },
        );
        id
    }

    pub(crate) fn contains(&self, id: RouterId) -> bool {
        self.routers.contains_key(&id)
    }

    pub(crate) fn get_mut(&mut self, id: RouterId) -> Option<&mut RouterRecord> {
        self.routers.get_mut(&id)
    }

    /// Remove the caller's current facade
    pub(crate) fn remove(&mut self, caller: &CallerId) -> Option<RouterRecord> {
        let id = *self.callers.get(caller)?;
        self.remove_id(id)
    }

    pub(crate) fn remove_id(&mut self, id: RouterId) -> Option<RouterRecord> {
        let record = self.routers.remove(&id)?;
        if self.callers.get(&record.caller) == Some(&id) {
            self.callers.remove(&record.caller);
        }
        Some(record)
    }

    pub(crate) fn clear(&mut self) {
        self.routers.clear();
        self.callers.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.routers.len()
    }

    /// Every registration's selector and flags, facade by facade
    pub(crate) fn registrations(&self) -> impl Iterator<Item = (&RouteSelector, CallbackFlags)> {
        self.routers
            .values()
            .flat_map(|router| router.callbacks.iter())
            .map(|record| (record.selector(), record.flags()))
    }

    /// Facades and registrations as they are right now, for one delivery
    pub(crate) fn delivery_targets(&self, engine: &MediaRouterEngine) -> Vec<DeliveryTarget> {
        self.routers
            .iter()
            .filter(|(_, record)| !record.callbacks.is_empty())
            .map(|(id, record)| DeliveryTarget {
                router: MediaRouter::new(engine.clone(), *id, record.caller.clone()),
                registrations: record.callbacks.iter().map(CallbackRecord::snapshot).collect(),
            })
            .collect()
    }
}
