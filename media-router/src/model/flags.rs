//! Bit flag sets used by callbacks, availability queries and route diffs

use bitflags::bitflags;

bitflags! {
    /// Flags passed when registering a router callback
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct CallbackFlags: u32 {
        /// Ask providers to actively scan while this callback is registered.
        /// Active scans cost power; only request them while a route picker
        /// is visible to the user.
        const ACTIVE_SCAN       = 0b0000_0001;
        /// Deliver route events even for routes that do not match the
        /// callback's selector
        const UNFILTERED_EVENTS = 0b0000_0010;
    }
}

bitflags! {
    /// Flags for [`crate::MediaRouter::is_route_available`]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct AvailabilityFlags: u32 {
        /// Ignore the default route when looking for a match
        const IGNORE_DEFAULT_ROUTE = 0b0000_0001;
        /// Also consider routes a provider could discover with an active scan
        const CONSIDER_ACTIVE_SCAN = 0b0000_0010;
    }
}

bitflags! {
    /// What changed when a route descriptor was re-applied
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct RouteChanges: u32 {
        /// Any attribute changed
        const GENERAL              = 0b0000_0001;
        /// Volume handling, volume or volume max changed
        const VOLUME               = 0b0000_0010;
        /// The presentation display changed
        const PRESENTATION_DISPLAY = 0b0000_0100;
    }
}
