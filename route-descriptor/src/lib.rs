//! # Route Descriptors
//!
//! Immutable value types that media route providers use to describe what they
//! publish, and that the router uses to describe what it is looking for.
//!
//! Nothing in this crate is mutated after it is built. A provider that wants
//! to report a change builds a fresh [`ProviderDescriptor`] and hands it to the
//! router, which replaces the previous one wholesale.
//!
//! ## Quick Start
//!
//! ```rust
//! use route_descriptor::{
//!     ControlFilter, ProviderDescriptor, RouteDescriptor, RouteSelector, VolumeHandling,
//! };
//!
//! let filter = ControlFilter::builder()
//!     .add_category("media.category.LIVE_AUDIO")
//!     .add_action("media.action.PLAY")
//!     .build();
//!
//! let route = RouteDescriptor::builder("kitchen", "Kitchen Speaker")
//!     .description("Ceiling speakers")
//!     .add_control_filter(filter)
//!     .volume_handling(VolumeHandling::Variable)
//!     .volume(12)
//!     .volume_max(100)
//!     .build();
//!
//! let descriptor = ProviderDescriptor::builder().add_route(route).build();
//! assert!(descriptor.is_valid());
//!
//! let selector = RouteSelector::builder()
//!     .add_control_category("media.category.LIVE_AUDIO")
//!     .build();
//! assert!(selector.matches_control_filters(descriptor.routes()[0].control_filters()));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ProviderDescriptor (version-stamped)
//!     ├── routes: [RouteDescriptor]
//!     │       └── control_filters: [ControlFilter]
//!     ├── active_scan_required
//!     └── discoverable_control_filters: [ControlFilter]
//!
//! DiscoveryRequest
//!     ├── selector: RouteSelector (set of control categories)
//!     └── active_scan
//! ```

pub mod control;
pub mod discovery;
pub mod error;
pub mod extras;
pub mod provider;
pub mod route;
pub mod selector;

pub use control::{ControlFilter, ControlFilterBuilder, ControlRequest};
pub use discovery::DiscoveryRequest;
pub use error::{DescriptorError, Result};
pub use extras::Extras;
pub use provider::{ProviderDescriptor, ProviderDescriptorBuilder};
pub use route::{PlaybackType, RouteDescriptor, RouteDescriptorBuilder, VolumeHandling};
pub use selector::{RouteSelector, RouteSelectorBuilder};

/// Well-known control categories
///
/// Providers are free to define their own; these are the ones the router's
/// callers most commonly ask for.
pub mod categories {
    /// Routes that can play live audio from the local device
    pub const LIVE_AUDIO: &str = "media.category.LIVE_AUDIO";
    /// Routes that can present live video from the local device
    pub const LIVE_VIDEO: &str = "media.category.LIVE_VIDEO";
    /// Routes that accept remote playback control requests
    pub const REMOTE_PLAYBACK: &str = "media.category.REMOTE_PLAYBACK";
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ControlFilter, ControlRequest, DiscoveryRequest, Extras, PlaybackType,
        ProviderDescriptor, RouteDescriptor, RouteSelector, VolumeHandling,
    };
}
