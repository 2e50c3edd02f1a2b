//! Observer callbacks and their registrations

use std::sync::Arc;

use route_descriptor::RouteSelector;

use crate::dispatcher::RegistrationSnapshot;
use crate::model::{CallbackFlags, Provider, Route};
use crate::registry::same_instance;
use crate::router::MediaRouter;

/// Receives router events
///
/// All methods default to doing nothing; implement the ones you need. Route
/// events are filtered by the selector the callback was registered with
/// unless [`CallbackFlags::UNFILTERED_EVENTS`] was given. Provider events are
/// never filtered.
///
/// Callbacks run while the engine is idle, so they may call back into the
/// router, e.g. to select a route or register another callback.
pub trait RouterCallback: Send + Sync {
    fn on_route_selected(&self, _router: &MediaRouter, _route: &Route) {}

    fn on_route_unselected(&self, _router: &MediaRouter, _route: &Route) {}

    fn on_route_added(&self, _router: &MediaRouter, _route: &Route) {}

    fn on_route_removed(&self, _router: &MediaRouter, _route: &Route) {}

    /// Any attribute of the route changed
    fn on_route_changed(&self, _router: &MediaRouter, _route: &Route) {}

    fn on_route_volume_changed(&self, _router: &MediaRouter, _route: &Route) {}

    fn on_route_presentation_display_changed(&self, _router: &MediaRouter, _route: &Route) {}

    fn on_provider_added(&self, _router: &MediaRouter, _provider: &Provider) {}

    fn on_provider_removed(&self, _router: &MediaRouter, _provider: &Provider) {}

    fn on_provider_changed(&self, _router: &MediaRouter, _provider: &Provider) {}
}

/// A callback registered on one router facade
pub(crate) struct CallbackRecord {
    callback: Arc<dyn RouterCallback>,
    selector: RouteSelector,
    flags: CallbackFlags,
}

impl CallbackRecord {
    /// Fresh registrations start matching nothing and get widened by the caller
    pub(crate) fn new(callback: Arc<dyn RouterCallback>) -> Self {
        Self {
            callback,
            selector: RouteSelector::EMPTY,
            flags: CallbackFlags::empty(),
        }
    }

    pub(crate) fn is_for(&self, callback: &Arc<dyn RouterCallback>) -> bool {
        same_instance(&self.callback, callback)
    }

    pub(crate) fn selector(&self) -> &RouteSelector {
        &self.selector
    }

    pub(crate) fn flags(&self) -> CallbackFlags {
        self.flags
    }

    /// Widen the registration; returns true if anything changed
    pub(crate) fn widen(&mut self, selector: &RouteSelector, flags: CallbackFlags) -> bool {
        let mut changed = false;
        if !flags.difference(self.flags).is_empty() {
            self.flags |= flags;
            changed = true;
        }
        if !self.selector.contains(selector) {
            self.selector = self.selector.union(selector);
            changed = true;
        }
        changed
    }

    pub(crate) fn snapshot(&self) -> RegistrationSnapshot {
        RegistrationSnapshot {
            callback: self.callback.clone(),
            selector: self.selector.clone(),
            flags: self.flags,
        }
    }
}
