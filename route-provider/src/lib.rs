//! # Route Provider Contracts
//!
//! Everything the media router needs from the components that publish routes.
//!
//! A provider is a black box to the router. It:
//!
//! - accepts a [`DiscoveryRequest`] (or none) at any time, any number of times
//! - reports its routes through a single [`ProviderCallback`] slot, zero or more
//!   times, each report replacing the previous one wholesale
//! - manufactures a [`RouteController`] session when one of its routes is selected
//!
//! Provider authors usually embed a [`ProviderCore`], which keeps the current
//! descriptor, discovery request and callback, and forward the trait methods
//! to it:
//!
//! ```rust
//! use std::sync::Arc;
//! use route_descriptor::{DiscoveryRequest, ProviderDescriptor, RouteDescriptor};
//! use route_provider::{
//!     MediaRouteProvider, ProviderCallback, ProviderCore, ProviderMetadata, RouteController,
//! };
//!
//! struct SpeakerProvider {
//!     core: ProviderCore,
//! }
//!
//! impl MediaRouteProvider for SpeakerProvider {
//!     fn metadata(&self) -> ProviderMetadata {
//!         self.core.metadata().clone()
//!     }
//!     fn descriptor(&self) -> Option<ProviderDescriptor> {
//!         self.core.descriptor()
//!     }
//!     fn set_callback(&self, callback: Option<Arc<dyn ProviderCallback>>) {
//!         self.core.set_callback(callback);
//!     }
//!     fn set_discovery_request(&self, request: Option<&DiscoveryRequest>) {
//!         self.core.set_discovery_request(request.cloned());
//!     }
//!     fn create_route_controller(&self, _route_id: &str) -> Option<Box<dyn RouteController>> {
//!         None
//!     }
//! }
//!
//! let provider = SpeakerProvider { core: ProviderCore::new(ProviderMetadata::new("com.example.speakers")) };
//! provider.core.set_descriptor(Some(
//!     ProviderDescriptor::builder()
//!         .add_route(RouteDescriptor::builder("kitchen", "Kitchen").build())
//!         .build(),
//! ));
//! assert_eq!(provider.descriptor().map(|d| d.routes().len()), Some(1));
//! ```

pub mod base;
pub mod controller;
pub mod provider;

pub use base::ProviderCore;
pub use controller::{ControlRequestCallback, ControlResultCallback, RouteController};
pub use provider::{MediaRouteProvider, ProviderCallback, ProviderMetadata};

// Re-export the descriptor types that appear in the trait signatures
pub use route_descriptor::{ControlRequest, DiscoveryRequest, Extras, ProviderDescriptor};
