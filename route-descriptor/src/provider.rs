//! Provider descriptors
//!
//! A [`ProviderDescriptor`] is everything a provider currently publishes. Each
//! built descriptor is stamped with a process-unique version; clones share the
//! version, so the router can tell "the same descriptor delivered twice" apart
//! from "a new descriptor that happens to look the same".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::control::ControlFilter;
use crate::error::Result;
use crate::route::RouteDescriptor;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// Immutable description of everything a provider publishes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    #[serde(default)]
    routes: Vec<Arc<RouteDescriptor>>,
    #[serde(default)]
    active_scan_required: bool,
    #[serde(default)]
    discoverable_control_filters: Vec<ControlFilter>,
    #[serde(skip, default = "next_version")]
    version: u64,
}

impl ProviderDescriptor {
    pub fn builder() -> ProviderDescriptorBuilder {
        ProviderDescriptorBuilder::default()
    }

    /// Descriptor publishing no routes
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Routes in the order the provider wants them listed
    pub fn routes(&self) -> &[Arc<RouteDescriptor>] {
        &self.routes
    }

    pub fn is_active_scan_required(&self) -> bool {
        self.active_scan_required
    }

    /// Control filters of every route this provider could ever discover
    pub fn discoverable_control_filters(&self) -> &[ControlFilter] {
        &self.discoverable_control_filters
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// True if `other` is this very descriptor (or a clone of it)
    pub fn is_same(&self, other: &ProviderDescriptor) -> bool {
        self.version == other.version
    }

    /// A provider descriptor is valid when all of its routes are
    pub fn is_valid(&self) -> bool {
        self.routes.iter().all(|route| route.is_valid())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a descriptor; the result gets a fresh version
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Content equality; the version stamp is not compared
impl PartialEq for ProviderDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.active_scan_required == other.active_scan_required
            && self.discoverable_control_filters == other.discoverable_control_filters
            && self.routes == other.routes
    }
}

/// Builder for [`ProviderDescriptor`]
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
    routes: Vec<Arc<RouteDescriptor>>,
    active_scan_required: bool,
    discoverable_control_filters: Vec<ControlFilter>,
}

impl ProviderDescriptorBuilder {
    /// Start from an existing descriptor's contents
    pub fn from_descriptor(descriptor: &ProviderDescriptor) -> Self {
        Self {
            routes: descriptor.routes.clone(),
            active_scan_required: descriptor.active_scan_required,
            discoverable_control_filters: descriptor.discoverable_control_filters.clone(),
        }
    }

    pub fn add_route(mut self, route: RouteDescriptor) -> Self {
        self.routes.push(Arc::new(route));
        self
    }

    pub fn add_routes<I>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = RouteDescriptor>,
    {
        self.routes.extend(routes.into_iter().map(Arc::new));
        self
    }

    pub fn routes(mut self, routes: Vec<Arc<RouteDescriptor>>) -> Self {
        self.routes = routes;
        self
    }

    pub fn active_scan_required(mut self, required: bool) -> Self {
        self.active_scan_required = required;
        self
    }

    pub fn add_discoverable_control_filter(mut self, filter: ControlFilter) -> Self {
        self.discoverable_control_filters.push(filter);
        self
    }

    pub fn build(self) -> ProviderDescriptor {
        ProviderDescriptor {
            routes: self.routes,
            active_scan_required: self.active_scan_required,
            discoverable_control_filters: self.discoverable_control_filters,
            version: next_version(),
        }
    }
}
