//! Default and selected route state machine
//!
//! The selection owns the controller session of the selected route. Every
//! transition away from a route emits `RouteUnselected` and then calls
//! `unselect` and `release` on its controller, in that order, before the
//! controller is dropped.

use route_provider::RouteController;
use tracing::{debug, info, warn};

use crate::dispatcher::RouterEvent;
use crate::model::RouteId;
use crate::registry::RouteRegistry;

/// Default route, selected route and the selected route's controller
pub(crate) struct Selection {
    default_route: Option<RouteId>,
    selected_route: Option<RouteId>,
    controller: Option<Box<dyn RouteController>>,
}

impl Selection {
    pub(crate) fn new() -> Self {
        Self {
            default_route: None,
            selected_route: None,
            controller: None,
        }
    }

    pub(crate) fn default_route(&self) -> Option<RouteId> {
        self.default_route
    }

    pub(crate) fn selected_route(&self) -> Option<RouteId> {
        self.selected_route
    }

    /// Controller of `route` if it is the selected route and has one
    pub(crate) fn controller_for(&mut self, route: RouteId) -> Option<&mut (dyn RouteController + 'static)> {
        if self.selected_route != Some(route) {
            return None;
        }
        self.controller.as_deref_mut()
    }

    /// Select a route on behalf of a caller
    ///
    /// Routes that are no longer registered or are disabled are ignored.
    pub(crate) fn select_route(
        &mut self,
        registry: &RouteRegistry,
        route: RouteId,
        events: &mut Vec<RouterEvent>,
    ) -> bool {
        let Some(info) = registry.route(route).filter(|_| registry.is_registered(route)) else {
            warn!(%route, "Ignoring attempt to select removed route");
            return false;
        };
        if !info.attributes().is_enabled() {
            warn!(%route, name = info.attributes().name(), "Ignoring attempt to select disabled route");
            return false;
        }

        self.set_selected(registry, Some(route), events);
        true
    }

    /// Move the selection, tearing down the previous controller first
    pub(crate) fn set_selected(
        &mut self,
        registry: &RouteRegistry,
        route: Option<RouteId>,
        events: &mut Vec<RouterEvent>,
    ) {
        if self.selected_route == route {
            return;
        }

        if let Some(previous) = self.selected_route.take() {
            if let Some(snapshot) = registry.snapshot(previous) {
                debug!(route = %snapshot, "Route unselected");
                events.push(RouterEvent::RouteUnselected(snapshot));
            }
            if let Some(mut controller) = self.controller.take() {
                controller.unselect();
                controller.release();
            }
        }

        self.selected_route = route;

        let Some(route) = route else {
            return;
        };
        let Some(info) = registry.route(route) else {
            return;
        };

        self.controller = registry
            .provider(info.provider_id())
            .and_then(|provider| provider.instance().create_route_controller(info.descriptor_id()));
        if let Some(controller) = self.controller.as_mut() {
            controller.select();
        }

        let snapshot = info.snapshot();
        debug!(route = %snapshot, "Route selected");
        events.push(RouterEvent::RouteSelected(snapshot));
    }

    /// Drop default or selection references to a route that became unselectable
    pub(crate) fn unselect_route_if_needed(
        &mut self,
        registry: &RouteRegistry,
        route: RouteId,
        events: &mut Vec<RouterEvent>,
    ) {
        let selectable = registry
            .route(route)
            .map(|info| info.is_selectable())
            .unwrap_or(false);
        if selectable {
            return;
        }

        if self.default_route == Some(route) {
            info!(%route, "Choosing a new default route because the current one is no longer selectable");
            self.default_route = None;
        }
        if self.selected_route == Some(route) {
            info!(%route, "Choosing a new selected route because the current one is no longer selectable");
            self.set_selected(registry, None, events);
        }
    }

    /// Elect a default route if there is none and fall back to it
    pub(crate) fn select_route_if_needed(
        &mut self,
        registry: &RouteRegistry,
        default_route_id: &str,
        events: &mut Vec<RouterEvent>,
    ) {
        if self.default_route.is_none() && registry.route_count() > 0 {
            self.default_route = registry
                .routes()
                .find(|route| {
                    registry.is_system_default_route(route, default_route_id) && route.is_selectable()
                })
                .map(|route| route.id());
            if let Some(route) = self.default_route {
                debug!(%route, "Default route elected");
            }
        }

        if self.selected_route.is_none() {
            self.set_selected(registry, self.default_route, events);
        }
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("default_route", &self.default_route)
            .field("selected_route", &self.selected_route)
            .field("has_controller", &self.controller.is_some())
            .finish()
    }
}
