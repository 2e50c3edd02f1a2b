//! Aggregate discovery request
//!
//! Every callback registration contributes its selector and its
//! [`CallbackFlags::ACTIVE_SCAN`] flag. The union of all of them is what
//! providers are asked to look for.

use route_descriptor::{DiscoveryRequest, RouteSelector, RouteSelectorBuilder};

use crate::model::CallbackFlags;

/// Holds the request most recently pushed to providers
#[derive(Debug, Default)]
pub(crate) struct DiscoveryCoordinator {
    current: Option<DiscoveryRequest>,
}

impl DiscoveryCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn current(&self) -> Option<&DiscoveryRequest> {
        self.current.as_ref()
    }

    /// Recompute from `(selector, flags)` pairs
    ///
    /// Returns `Some(request)` when the aggregate changed and must be pushed
    /// to providers, `None` when nothing changed. The pushed request is itself
    /// `None` when nobody is interested in anything.
    pub(crate) fn recompute<'a, I>(&mut self, registrations: I) -> Option<Option<DiscoveryRequest>>
    where
        I: IntoIterator<Item = (&'a RouteSelector, CallbackFlags)>,
    {
        let mut builder = RouteSelectorBuilder::default();
        let mut active_scan = false;
        for (selector, flags) in registrations {
            builder = builder.add_selector(selector);
            active_scan |= flags.contains(CallbackFlags::ACTIVE_SCAN);
        }
        let selector = builder.build();

        let next = if selector.is_empty() && !active_scan {
            None
        } else {
            Some(DiscoveryRequest::new(selector, active_scan))
        };

        if next == self.current {
            return None;
        }
        self.current = next.clone();
        Some(next)
    }
}
