//! Merge a provider descriptor into the registry
//!
//! Routes keep their identity across updates: a descriptor id that the
//! provider keeps publishing maps to the same [`RouteId`] no matter how the
//! provider reorders or edits its routes. Routes are moved into the
//! provider's declared order with a single cursor pass, and routes left
//! behind the cursor are removed.

use route_descriptor::ProviderDescriptor;
use tracing::{debug, warn};

use crate::dispatcher::RouterEvent;
use crate::model::RouteChanges;
use crate::registry::RouteRegistry;
use crate::selection::Selection;

/// Apply `descriptor` to the provider at `provider_index`
///
/// Returns the events in the order they must be delivered. An unchanged
/// descriptor produces no events.
pub(crate) fn reconcile(
    registry: &mut RouteRegistry,
    selection: &mut Selection,
    provider_index: usize,
    descriptor: Option<&ProviderDescriptor>,
    default_route_id: &str,
) -> Vec<RouterEvent> {
    let mut events = Vec::new();

    if !registry.provider_at_mut(provider_index).update_descriptor(descriptor) {
        return events;
    }

    let mut target = 0;
    if let Some(descriptor) = descriptor {
        if descriptor.is_valid() {
            for route_descriptor in descriptor.routes() {
                match registry.find_provider_route(provider_index, route_descriptor.id()) {
                    None => {
                        let id = registry.insert_route(provider_index, target, route_descriptor.clone());
                        target += 1;
                        if let Some(route) = registry.snapshot(id) {
                            debug!(%route, "Route added");
                            events.push(RouterEvent::RouteAdded(route));
                        }
                    }
                    Some(source) if source < target => {
                        warn!(
                            id = route_descriptor.id(),
                            provider = registry.provider_at(provider_index).package_name(),
                            "Ignoring route descriptor with duplicate id"
                        );
                    }
                    Some(source) => {
                        registry.swap_provider_routes(provider_index, source, target);
                        let id = registry.provider_route_at(provider_index, target);
                        target += 1;

                        let changes = registry
                            .route_mut(id)
                            .map(|route| route.update_descriptor(Some(route_descriptor.clone())))
                            .unwrap_or(RouteChanges::empty());
                        selection.unselect_route_if_needed(registry, id, &mut events);

                        let Some(route) = registry.snapshot(id) else {
                            continue;
                        };
                        if changes.contains(RouteChanges::GENERAL) {
                            debug!(%route, "Route changed");
                            events.push(RouterEvent::RouteChanged(route.clone()));
                        }
                        if changes.contains(RouteChanges::VOLUME) {
                            debug!(%route, "Route volume changed");
                            events.push(RouterEvent::RouteVolumeChanged(route.clone()));
                        }
                        if changes.contains(RouteChanges::PRESENTATION_DISPLAY) {
                            debug!(%route, "Route presentation display changed");
                            events.push(RouterEvent::RoutePresentationDisplayChanged(route));
                        }
                    }
                }
            }
        } else {
            warn!(
                provider = registry.provider_at(provider_index).package_name(),
                "Ignoring invalid provider descriptor"
            );
        }
    }

    // Whatever is left behind the cursor is no longer published
    let remaining = registry.provider_at(provider_index).routes().len();
    for position in (target..remaining).rev() {
        let id = registry.provider_route_at(provider_index, position);
        if let Some(route) = registry.route_mut(id) {
            route.update_descriptor(None);
        }
        registry.unlink_route(provider_index, position);
        selection.unselect_route_if_needed(registry, id, &mut events);
        if let Some(route) = registry.drop_route(id) {
            let route = route.snapshot();
            debug!(%route, "Route removed");
            events.push(RouterEvent::RouteRemoved(route));
        }
    }

    let provider = registry.provider_at(provider_index).snapshot();
    debug!(%provider, "Provider changed");
    events.push(RouterEvent::ProviderChanged(provider));

    selection.select_route_if_needed(registry, default_route_id, &mut events);
    events
}
