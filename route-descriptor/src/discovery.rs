//! Discovery requests

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::selector::RouteSelector;

/// What providers should look for and how aggressively
///
/// The router recomputes this value from all registered callbacks and pushes
/// it to every provider; an absent request means no discovery is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    selector: RouteSelector,
    active_scan: bool,
}

impl DiscoveryRequest {
    pub fn new(selector: RouteSelector, active_scan: bool) -> Self {
        Self {
            selector,
            active_scan,
        }
    }

    pub fn selector(&self) -> &RouteSelector {
        &self.selector
    }

    pub fn is_active_scan(&self) -> bool {
        self.active_scan
    }

    /// A request asks for something: a category or an active scan
    pub fn is_valid(&self) -> bool {
        !self.selector.is_empty() || self.active_scan
    }
}

impl fmt::Display for DiscoveryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DiscoveryRequest{{ selector={}, active_scan={} }}",
            self.selector, self.active_scan
        )
    }
}
