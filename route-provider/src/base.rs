//! Reusable provider state
//!
//! [`ProviderCore`] holds the three pieces of state every provider needs:
//! the descriptor it publishes, the discovery request it was last given, and
//! the router's callback. Publishing a descriptor that differs from the
//! current one pushes it to the callback.

use std::sync::Arc;

use parking_lot::Mutex;
use route_descriptor::{DiscoveryRequest, ProviderDescriptor};
use tracing::debug;

use crate::provider::{ProviderCallback, ProviderMetadata};

/// Descriptor, discovery request and callback slot of one provider
pub struct ProviderCore {
    metadata: ProviderMetadata,
    descriptor: Mutex<Option<ProviderDescriptor>>,
    discovery_request: Mutex<Option<DiscoveryRequest>>,
    callback: Mutex<Option<Arc<dyn ProviderCallback>>>,
}

impl ProviderCore {
    pub fn new(metadata: ProviderMetadata) -> Self {
        Self {
            metadata,
            descriptor: Mutex::new(None),
            discovery_request: Mutex::new(None),
            callback: Mutex::new(None),
        }
    }

    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    pub fn descriptor(&self) -> Option<ProviderDescriptor> {
        self.descriptor.lock().clone()
    }

    pub fn discovery_request(&self) -> Option<DiscoveryRequest> {
        self.discovery_request.lock().clone()
    }

    /// Store the request; returns true if it differs from the previous one
    pub fn set_discovery_request(&self, request: Option<DiscoveryRequest>) -> bool {
        let mut current = self.discovery_request.lock();
        if *current == request {
            return false;
        }
        debug!(provider = %self.metadata, ?request, "discovery request changed");
        *current = request;
        true
    }

    pub fn set_callback(&self, callback: Option<Arc<dyn ProviderCallback>>) {
        *self.callback.lock() = callback;
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().is_some()
    }

    /// Publish a new descriptor
    ///
    /// Does nothing when `descriptor` is the descriptor already published.
    /// Otherwise the descriptor is stored and delivered to the callback, if
    /// one is registered. No lock is held while the callback runs.
    pub fn set_descriptor(&self, descriptor: Option<ProviderDescriptor>) {
        {
            let mut current = self.descriptor.lock();
            let unchanged = match (current.as_ref(), descriptor.as_ref()) {
                (Some(old), Some(new)) => old.is_same(new),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
            *current = descriptor.clone();
        }

        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback.on_descriptor_changed(descriptor);
        }
    }
}

impl std::fmt::Debug for ProviderCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCore")
            .field("metadata", &self.metadata)
            .field("has_descriptor", &self.descriptor.lock().is_some())
            .field("discovery_request", &*self.discovery_request.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_descriptor::{RouteDescriptor, RouteSelector};

    #[derive(Default)]
    struct RecordingCallback {
        received: Mutex<Vec<Option<ProviderDescriptor>>>,
    }

    impl ProviderCallback for RecordingCallback {
        fn on_descriptor_changed(&self, descriptor: Option<ProviderDescriptor>) {
            self.received.lock().push(descriptor);
        }
    }

    fn descriptor_with(route_id: &str) -> ProviderDescriptor {
        ProviderDescriptor::builder()
            .add_route(RouteDescriptor::builder(route_id, route_id.to_uppercase()).build())
            .build()
    }

    #[test]
    fn test_set_descriptor_notifies_callback() {
        let core = ProviderCore::new(ProviderMetadata::new("com.example"));
        let callback = Arc::new(RecordingCallback::default());
        core.set_callback(Some(callback.clone()));

        core.set_descriptor(Some(descriptor_with("a")));

        assert_eq!(callback.received.lock().len(), 1);
        assert!(core.descriptor().is_some());
    }

    #[test]
    fn test_same_descriptor_is_not_redelivered() {
        let core = ProviderCore::new(ProviderMetadata::new("com.example"));
        let callback = Arc::new(RecordingCallback::default());
        core.set_callback(Some(callback.clone()));

        let descriptor = descriptor_with("a");
        core.set_descriptor(Some(descriptor.clone()));
        core.set_descriptor(Some(descriptor));
        core.set_descriptor(None);
        core.set_descriptor(None);

        assert_eq!(callback.received.lock().len(), 2);
    }

    #[test]
    fn test_descriptor_stored_without_callback() {
        let core = ProviderCore::new(ProviderMetadata::new("com.example"));
        core.set_descriptor(Some(descriptor_with("a")));
        assert!(!core.has_callback());
        assert_eq!(core.descriptor().map(|d| d.routes().len()), Some(1));
    }

    #[test]
    fn test_discovery_request_change_detection() {
        let core = ProviderCore::new(ProviderMetadata::new("com.example"));
        let request = DiscoveryRequest::new(RouteSelector::for_category("audio"), false);

        assert!(core.set_discovery_request(Some(request.clone())));
        assert!(!core.set_discovery_request(Some(request)));
        assert!(core.set_discovery_request(None));
        assert_eq!(core.discovery_request(), None);
    }
}
