//! # Media Router
//!
//! Coordinates discovery, selection and change notification for media
//! routes published by independently implemented providers.
//!
//! - **Identity-preserving registry**: a route keeps its [`RouteId`] for as long
//!   as its provider keeps publishing the same descriptor id, however often
//!   the provider re-reports or reorders its routes
//! - **Aggregate discovery**: every caller's selector and active-scan wish is
//!   merged into one [`DiscoveryRequest`] pushed to all providers
//! - **Selection state machine**: default and selected route, with the selected
//!   route's controller session torn down strictly `unselect` → `release`
//! - **Deferred, filtered events**: observers are notified in order, later,
//!   from the driver's [`MediaRouterEngine::process_pending`] call
//!
//! # Architecture
//!
//! ```text
//! Provider ──descriptor──▶ Reconciler ──▶ Registry ──▶ Selection
//!    ▲                          │                          │
//!    │                          └────── events ◀───────────┘
//! DiscoveryRequest                        │
//!    ▲                              TaskQueue ──▶ SyncSink
//!    │                                    │
//! Callback registrations ◀── MediaRouter facades ◀── RouterCallback
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use media_router::{MediaRouterEngine, RouterConfig};
//! use route_descriptor::{ProviderDescriptor, RouteDescriptor};
//! use route_provider::{
//!     DiscoveryRequest, MediaRouteProvider, ProviderCallback, ProviderCore, ProviderMetadata,
//!     RouteController,
//! };
//!
//! struct SystemRoutes(ProviderCore);
//!
//! impl MediaRouteProvider for SystemRoutes {
//!     fn metadata(&self) -> ProviderMetadata { self.0.metadata().clone() }
//!     fn descriptor(&self) -> Option<ProviderDescriptor> { self.0.descriptor() }
//!     fn set_callback(&self, callback: Option<Arc<dyn ProviderCallback>>) { self.0.set_callback(callback) }
//!     fn set_discovery_request(&self, request: Option<&DiscoveryRequest>) {
//!         self.0.set_discovery_request(request.cloned());
//!     }
//!     fn create_route_controller(&self, _id: &str) -> Option<Box<dyn RouteController>> { None }
//! }
//!
//! let system = SystemRoutes(ProviderCore::new(ProviderMetadata::new("android")));
//! system.0.set_descriptor(Some(
//!     ProviderDescriptor::builder()
//!         .add_route(RouteDescriptor::builder("DEFAULT_ROUTE", "Phone").build())
//!         .build(),
//! ));
//!
//! let engine = MediaRouterEngine::builder()
//!     .with_config(RouterConfig::new())
//!     .with_system_provider(Arc::new(system))
//!     .build()?;
//!
//! let router = engine.router("player")?;
//! assert_eq!(router.selected_route().name(), "Phone");
//! engine.process_pending();
//! # Ok::<(), media_router::RouterError>(())
//! ```

pub mod callback;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod router;
pub mod sync;

mod discovery;
mod reconciler;
mod registry;
mod selection;

pub use callback::RouterCallback;
pub use config::{RouterConfig, DEFAULT_ROUTE_ID};
pub use dispatcher::{EventKind, RouterEvent};
pub use display::{DisplayHandle, DisplayResolver};
pub use engine::{MediaRouterEngine, MediaRouterEngineBuilder};
pub use error::{Result, RouterError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use model::{
    AvailabilityFlags, CallbackFlags, CallerId, Provider, ProviderId, Route, RouteChanges, RouteId,
    RouterId,
};
pub use router::MediaRouter;
pub use sync::{SyncError, SyncSink};

// Re-export the descriptor and provider types that appear in the public API
pub use route_descriptor::{ControlRequest, DiscoveryRequest, RouteSelector};
pub use route_provider::{ControlRequestCallback, ControlResultCallback, MediaRouteProvider};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AvailabilityFlags, CallbackFlags, MediaRouter, MediaRouterEngine, Route, RouteSelector,
        RouterCallback, RouterConfig, RouterError,
    };
}
