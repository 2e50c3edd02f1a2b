//! Caller-facing route and provider snapshots

use std::fmt;
use std::sync::Arc;

use route_descriptor::{
    ControlFilter, ControlRequest, Extras, PlaybackType, ProviderDescriptor, RouteDescriptor,
    RouteSelector, VolumeHandling,
};

use super::id_types::{ProviderId, RouteId};

/// Snapshot of one route as known to the engine
///
/// Snapshots are taken when an event is queued or a query runs; they do not
/// follow later updates. Compare [`Route::id`] to decide whether two snapshots
/// describe the same route object.
#[derive(Debug, Clone)]
pub struct Route {
    id: RouteId,
    provider_id: ProviderId,
    provider_package: String,
    attributes: Arc<RouteDescriptor>,
    alive: bool,
}

impl Route {
    pub(crate) fn new(
        id: RouteId,
        provider_id: ProviderId,
        provider_package: String,
        attributes: Arc<RouteDescriptor>,
        alive: bool,
    ) -> Self {
        Self {
            id,
            provider_id,
            provider_package,
            attributes,
            alive,
        }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider_id
    }

    pub fn provider_package(&self) -> &str {
        &self.provider_package
    }

    /// The provider-assigned id, unique within the provider
    pub fn descriptor_id(&self) -> &str {
        self.attributes.id()
    }

    pub fn name(&self) -> &str {
        self.attributes.name()
    }

    pub fn description(&self) -> Option<&str> {
        self.attributes.description()
    }

    pub fn is_enabled(&self) -> bool {
        self.attributes.is_enabled()
    }

    pub fn is_connecting(&self) -> bool {
        self.attributes.is_connecting()
    }

    pub fn control_filters(&self) -> &[ControlFilter] {
        self.attributes.control_filters()
    }

    pub fn playback_type(&self) -> PlaybackType {
        self.attributes.playback_type()
    }

    pub fn playback_stream(&self) -> i32 {
        self.attributes.playback_stream()
    }

    pub fn volume_handling(&self) -> VolumeHandling {
        self.attributes.volume_handling()
    }

    pub fn volume(&self) -> i32 {
        self.attributes.volume()
    }

    pub fn volume_max(&self) -> i32 {
        self.attributes.volume_max()
    }

    pub fn extras(&self) -> &Extras {
        self.attributes.extras()
    }

    pub fn presentation_display_id(&self) -> Option<i32> {
        self.attributes.presentation_display_id()
    }

    /// The descriptor the attributes were last copied from
    pub fn descriptor(&self) -> &RouteDescriptor {
        &self.attributes
    }

    /// False once the provider stopped publishing the route
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// A route can be selected while it is published and enabled
    pub fn is_selectable(&self) -> bool {
        self.alive && self.is_enabled()
    }

    pub fn matches_selector(&self, selector: &RouteSelector) -> bool {
        selector.matches_control_filters(self.control_filters())
    }

    pub fn supports_control_category(&self, category: &str) -> bool {
        self.control_filters().iter().any(|f| f.has_category(category))
    }

    pub fn supports_control_request(&self, request: &ControlRequest) -> bool {
        self.attributes.supports_control_request(request)
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.alive == other.alive
            && *self.attributes == *other.attributes
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Route{{ id={}, descriptorId={}, name={}, provider={}, enabled={}, volume={}/{} }}",
            self.id,
            self.descriptor_id(),
            self.name(),
            self.provider_package,
            self.is_enabled(),
            self.volume(),
            self.volume_max()
        )
    }
}

/// Snapshot of one attached provider
#[derive(Debug, Clone)]
pub struct Provider {
    id: ProviderId,
    package_name: String,
    routes: Vec<RouteId>,
    descriptor: Option<ProviderDescriptor>,
    discoverable_control_filters: Vec<ControlFilter>,
}

impl Provider {
    pub(crate) fn new(
        id: ProviderId,
        package_name: String,
        routes: Vec<RouteId>,
        descriptor: Option<ProviderDescriptor>,
        discoverable_control_filters: Vec<ControlFilter>,
    ) -> Self {
        Self {
            id,
            package_name,
            routes,
            descriptor,
            discoverable_control_filters,
        }
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Routes in the order the provider published them
    pub fn routes(&self) -> &[RouteId] {
        &self.routes
    }

    /// The descriptor most recently applied, if any
    pub fn descriptor(&self) -> Option<&ProviderDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn is_active_scan_required(&self) -> bool {
        self.descriptor
            .as_ref()
            .map(|d| d.is_active_scan_required())
            .unwrap_or(false)
    }

    /// Filters describing routes the provider could find with an active scan
    pub fn discoverable_control_filters(&self) -> &[ControlFilter] {
        &self.discoverable_control_filters
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Provider{{ id={}, package={}, routes={} }}",
            self.id,
            self.package_name,
            self.routes.len()
        )
    }
}
