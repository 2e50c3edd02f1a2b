//! Route and provider registry
//!
//! The registry owns every [`RouteInfo`] and [`ProviderInfo`] the engine knows
//! about. Route objects are keyed by `(provider, descriptor id)` and keep their
//! [`RouteId`] for as long as the provider keeps publishing that descriptor id.

use std::collections::HashMap;
use std::sync::Arc;

use route_descriptor::{ControlFilter, ProviderDescriptor, RouteDescriptor};
use route_provider::{MediaRouteProvider, ProviderMetadata};

use crate::display::DisplayHandle;
use crate::model::{IdSequence, Provider, ProviderId, Route, RouteChanges, RouteId};

/// Compare two shared handles by the address of the value they point to
pub(crate) fn same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<u8>(), Arc::as_ptr(b).cast::<u8>())
}

/// Engine-side state of one route
pub(crate) struct RouteInfo {
    id: RouteId,
    provider_id: ProviderId,
    provider_package: String,
    descriptor_id: String,
    /// Current descriptor; `None` once the provider stopped publishing it
    descriptor: Option<Arc<RouteDescriptor>>,
    /// Attributes as of the last applied descriptor
    attributes: Arc<RouteDescriptor>,
    presentation_display: Option<DisplayHandle>,
}

impl RouteInfo {
    fn new(
        id: RouteId,
        provider_id: ProviderId,
        provider_package: String,
        descriptor: Arc<RouteDescriptor>,
    ) -> Self {
        Self {
            id,
            provider_id,
            provider_package,
            descriptor_id: descriptor.id().to_string(),
            descriptor: Some(descriptor.clone()),
            attributes: descriptor,
            presentation_display: None,
        }
    }

    pub(crate) fn id(&self) -> RouteId {
        self.id
    }

    pub(crate) fn provider_id(&self) -> ProviderId {
        self.provider_id
    }

    pub(crate) fn descriptor_id(&self) -> &str {
        &self.descriptor_id
    }

    pub(crate) fn attributes(&self) -> &RouteDescriptor {
        &self.attributes
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.descriptor.is_some()
    }

    /// A dead or disabled route must never be default or selected
    pub(crate) fn is_selectable(&self) -> bool {
        self.is_alive() && self.attributes.is_enabled()
    }

    pub(crate) fn presentation_display(&self) -> Option<&DisplayHandle> {
        self.presentation_display.as_ref()
    }

    pub(crate) fn cache_presentation_display(&mut self, display: DisplayHandle) {
        self.presentation_display = Some(display);
    }

    /// Apply a new descriptor and report which attribute groups changed
    ///
    /// Applying `None` marks the route dead and keeps the last attributes so
    /// removal events still carry them.
    pub(crate) fn update_descriptor(
        &mut self,
        descriptor: Option<Arc<RouteDescriptor>>,
    ) -> RouteChanges {
        let unchanged = match (&self.descriptor, &descriptor) {
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return RouteChanges::empty();
        }

        let Some(next) = descriptor else {
            self.descriptor = None;
            return RouteChanges::empty();
        };

        let changes = diff_attributes(&self.attributes, &next);
        if changes.contains(RouteChanges::PRESENTATION_DISPLAY) {
            self.presentation_display = None;
        }
        self.attributes = next.clone();
        self.descriptor = Some(next);
        changes
    }

    pub(crate) fn snapshot(&self) -> Route {
        Route::new(
            self.id,
            self.provider_id,
            self.provider_package.clone(),
            self.attributes.clone(),
            self.is_alive(),
        )
    }
}

/// Per-attribute comparison of two descriptors
pub(crate) fn diff_attributes(old: &RouteDescriptor, new: &RouteDescriptor) -> RouteChanges {
    let mut changes = RouteChanges::empty();

    if old.name() != new.name()
        || old.description() != new.description()
        || old.is_enabled() != new.is_enabled()
        || old.is_connecting() != new.is_connecting()
        || old.control_filters() != new.control_filters()
        || old.playback_type() != new.playback_type()
        || old.playback_stream() != new.playback_stream()
        || old.extras() != new.extras()
    {
        changes |= RouteChanges::GENERAL;
    }

    if old.volume_handling() != new.volume_handling()
        || old.volume() != new.volume()
        || old.volume_max() != new.volume_max()
    {
        changes |= RouteChanges::GENERAL | RouteChanges::VOLUME;
    }

    if old.presentation_display_id() != new.presentation_display_id() {
        changes |= RouteChanges::GENERAL | RouteChanges::PRESENTATION_DISPLAY;
    }

    changes
}

/// Engine-side state of one attached provider
pub(crate) struct ProviderInfo {
    id: ProviderId,
    instance: Arc<dyn MediaRouteProvider>,
    metadata: ProviderMetadata,
    routes: Vec<RouteId>,
    descriptor: Option<ProviderDescriptor>,
    discoverable_control_filters: Vec<ControlFilter>,
}

impl ProviderInfo {
    pub(crate) fn id(&self) -> ProviderId {
        self.id
    }

    pub(crate) fn instance(&self) -> &Arc<dyn MediaRouteProvider> {
        &self.instance
    }

    pub(crate) fn package_name(&self) -> &str {
        self.metadata.package_name()
    }

    pub(crate) fn routes(&self) -> &[RouteId] {
        &self.routes
    }

    pub(crate) fn descriptor(&self) -> Option<&ProviderDescriptor> {
        self.descriptor.as_ref()
    }

    pub(crate) fn discoverable_control_filters(&self) -> &[ControlFilter] {
        &self.discoverable_control_filters
    }

    pub(crate) fn is_active_scan_required(&self) -> bool {
        self.descriptor
            .as_ref()
            .map(|d| d.is_active_scan_required())
            .unwrap_or(false)
    }

    /// Store a new descriptor; returns false if it is the one already stored
    ///
    /// Discoverable filters survive a `None` descriptor.
    pub(crate) fn update_descriptor(&mut self, descriptor: Option<&ProviderDescriptor>) -> bool {
        let unchanged = match (&self.descriptor, descriptor) {
            (Some(current), Some(next)) => current.is_same(next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return false;
        }

        if let Some(next) = descriptor {
            if self.discoverable_control_filters.as_slice() != next.discoverable_control_filters() {
                self.discoverable_control_filters = next.discoverable_control_filters().to_vec();
            }
        }
        self.descriptor = descriptor.cloned();
        true
    }

    pub(crate) fn snapshot(&self) -> Provider {
        Provider::new(
            self.id,
            self.package_name().to_string(),
            self.routes.clone(),
            self.descriptor.clone(),
            self.discoverable_control_filters.clone(),
        )
    }
}

/// Owner of every route and provider record
pub(crate) struct RouteRegistry {
    routes: HashMap<RouteId, RouteInfo>,
    /// Global route list in insertion order
    order: Vec<RouteId>,
    providers: Vec<ProviderInfo>,
    system_provider: Option<ProviderId>,
    route_ids: IdSequence,
    provider_ids: IdSequence,
}

impl RouteRegistry {
    pub(crate) fn new() -> Self {
        Self {
            routes: HashMap::new(),
            order: Vec::new(),
            providers: Vec::new(),
            system_provider: None,
            route_ids: IdSequence::new(),
            provider_ids: IdSequence::new(),
        }
    }

    // ========================================================================
    // Routes
    // ========================================================================

    pub(crate) fn route(&self, id: RouteId) -> Option<&RouteInfo> {
        self.routes.get(&id)
    }

    pub(crate) fn route_mut(&mut self, id: RouteId) -> Option<&mut RouteInfo> {
        self.routes.get_mut(&id)
    }

    /// True if the route is in the global route list
    pub(crate) fn is_registered(&self, id: RouteId) -> bool {
        self.order.contains(&id)
    }

    /// Registered routes in global order
    pub(crate) fn routes(&self) -> impl Iterator<Item = &RouteInfo> {
        self.order.iter().filter_map(|id| self.routes.get(id))
    }

    pub(crate) fn route_count(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn snapshot(&self, id: RouteId) -> Option<Route> {
        self.routes.get(&id).map(RouteInfo::snapshot)
    }

    /// Position of a descriptor id in a provider's route list
    pub(crate) fn find_provider_route(&self, provider_index: usize, descriptor_id: &str) -> Option<usize> {
        self.providers[provider_index]
            .routes
            .iter()
            .position(|id| {
                self.routes
                    .get(id)
                    .map(|route| route.descriptor_id == descriptor_id)
                    .unwrap_or(false)
            })
    }

    pub(crate) fn provider_route_at(&self, provider_index: usize, position: usize) -> RouteId {
        self.providers[provider_index].routes[position]
    }

    /// Create a route under a provider at `position` and append it globally
    pub(crate) fn insert_route(
        &mut self,
        provider_index: usize,
        position: usize,
        descriptor: Arc<RouteDescriptor>,
    ) -> RouteId {
        let id = RouteId::new(self.route_ids.next());
        let provider = &mut self.providers[provider_index];
        let info = RouteInfo::new(id, provider.id, provider.package_name().to_string(), descriptor);
        provider.routes.insert(position, id);
        self.order.push(id);
        self.routes.insert(id, info);
        id
    }

    pub(crate) fn swap_provider_routes(&mut self, provider_index: usize, a: usize, b: usize) {
        self.providers[provider_index].routes.swap(a, b);
    }

    /// Remove a route from the provider's list and the global list
    ///
    /// The record stays addressable by id until [`RouteRegistry::drop_route`].
    pub(crate) fn unlink_route(&mut self, provider_index: usize, position: usize) -> RouteId {
        let id = self.providers[provider_index].routes.remove(position);
        self.order.retain(|existing| *existing != id);
        id
    }

    pub(crate) fn drop_route(&mut self, id: RouteId) -> Option<RouteInfo> {
        self.routes.remove(&id)
    }

    // ========================================================================
    // Providers
    // ========================================================================

    pub(crate) fn providers(&self) -> &[ProviderInfo] {
        &self.providers
    }

    pub(crate) fn provider_at(&self, index: usize) -> &ProviderInfo {
        &self.providers[index]
    }

    pub(crate) fn provider_at_mut(&mut self, index: usize) -> &mut ProviderInfo {
        &mut self.providers[index]
    }

    pub(crate) fn provider(&self, id: ProviderId) -> Option<&ProviderInfo> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub(crate) fn provider_index(&self, id: ProviderId) -> Option<usize> {
        self.providers.iter().position(|p| p.id == id)
    }

    pub(crate) fn provider_index_of(&self, instance: &Arc<dyn MediaRouteProvider>) -> Option<usize> {
        self.providers
            .iter()
            .position(|p| same_instance(&p.instance, instance))
    }

    pub(crate) fn add_provider(&mut self, instance: Arc<dyn MediaRouteProvider>) -> usize {
        let id = ProviderId::new(self.provider_ids.next());
        let metadata = instance.metadata();
        self.providers.push(ProviderInfo {
            id,
            instance,
            metadata,
            routes: Vec::new(),
            descriptor: None,
            discoverable_control_filters: Vec::new(),
        });
        self.providers.len() - 1
    }

    pub(crate) fn remove_provider_at(&mut self, index: usize) -> ProviderInfo {
        let removed = self.providers.remove(index);
        if self.system_provider == Some(removed.id) {
            self.system_provider = None;
        }
        removed
    }

    pub(crate) fn set_system_provider(&mut self, id: ProviderId) {
        self.system_provider = Some(id);
    }

    pub(crate) fn system_provider(&self) -> Option<ProviderId> {
        self.system_provider
    }

    /// True if the route is the reserved default route of the system provider
    pub(crate) fn is_system_default_route(&self, route: &RouteInfo, default_route_id: &str) -> bool {
        self.system_provider == Some(route.provider_id) && route.descriptor_id == default_route_id
    }
}
