//! The provider contract

use std::fmt;
use std::sync::Arc;

use route_descriptor::{DiscoveryRequest, ProviderDescriptor};

use crate::controller::RouteController;

/// Static information about a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderMetadata {
    package_name: String,
}

impl ProviderMetadata {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }

    /// Name of the package that publishes the provider
    pub fn package_name(&self) -> &str {
        &self.package_name
    }
}

impl fmt::Display for ProviderMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.package_name)
    }
}

/// Receives descriptor updates from a provider
///
/// The router registers exactly one callback per attached provider. A provider
/// may invoke it at any point after registration, including from inside one
/// of its own trait methods; the router defers such reentrant deliveries.
pub trait ProviderCallback: Send + Sync {
    /// The provider's descriptor changed; `None` means it publishes nothing
    fn on_descriptor_changed(&self, descriptor: Option<ProviderDescriptor>);
}

/// A component that publishes routes
///
/// Every method is called by the router on its owning thread.
pub trait MediaRouteProvider: Send + Sync {
    fn metadata(&self) -> ProviderMetadata;

    /// The descriptor the provider currently publishes, read when it is attached
    fn descriptor(&self) -> Option<ProviderDescriptor>;

    /// Install or clear the descriptor callback slot
    fn set_callback(&self, callback: Option<Arc<dyn ProviderCallback>>);

    /// What the router's callers are currently interested in
    ///
    /// Called on attach, on every change of the aggregate request, and with
    /// `None` on detach. Providers decide for themselves how to react.
    fn set_discovery_request(&self, request: Option<&DiscoveryRequest>);

    /// Create a control session for one of this provider's routes
    ///
    /// Returning `None` means the route needs no session state.
    fn create_route_controller(&self, route_id: &str) -> Option<Box<dyn RouteController>>;
}
