//! Identity types for routes, providers, routers and callers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate common numeric ID type implementations
macro_rules! impl_numeric_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            pub(crate) fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw ID value
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

/// Engine-allocated identity of a route object
///
/// Allocated when a descriptor id first appears under a provider and never
/// reused, so two snapshots with the same `RouteId` describe the same route
/// object even if the provider reordered or updated it in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(u64);

impl_numeric_id!(RouteId, "route");

/// Identity of one attachment of a provider instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(u64);

impl_numeric_id!(ProviderId, "provider");

/// Identity of a router facade; ordering follows creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouterId(u64);

impl_numeric_id!(RouterId, "router");

/// Opaque handle naming the caller that owns a router facade
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CallerId {
    fn from(s: &str) -> Self {
        CallerId::new(s)
    }
}

impl From<String> for CallerId {
    fn from(s: String) -> Self {
        CallerId::new(s)
    }
}

/// Monotonic allocator for numeric ids
#[derive(Debug)]
pub(crate) struct IdSequence(u64);

impl IdSequence {
    pub(crate) fn new() -> Self {
        Self(1)
    }

    pub(crate) fn next(&mut self) -> u64 {
        let id = self.0;
        self.0 += 1;
        id
    }
}
