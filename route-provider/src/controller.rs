//! Per-selection route controller sessions

use std::sync::Arc;

use route_descriptor::{ControlRequest, Extras};

/// Receives the outcome of a control request
pub trait ControlRequestCallback: Send + Sync {
    /// The request succeeded
    fn on_result(&self, _data: Extras) {}

    /// The request failed or was not handled
    fn on_error(&self, _error: Option<String>, _data: Extras) {}
}

/// Shared handle to a control request callback
pub type ControlResultCallback = Arc<dyn ControlRequestCallback>;

/// Control session for a selected route
///
/// The router owns the controller from selection until the route is
/// unselected. It always calls `unselect` and then `release`, in that order,
/// before dropping it. All methods default to doing nothing.
pub trait RouteController: Send {
    fn select(&mut self) {}

    fn unselect(&mut self) {}

    fn release(&mut self) {}

    /// Set an absolute volume, already clamped to `[0, volume_max]`
    fn set_volume(&mut self, _volume: i32) {}

    /// Adjust the volume by a non-zero delta
    fn update_volume(&mut self, _delta: i32) {}

    /// Handle a control request
    ///
    /// Return `true` if the request was accepted; the callback must then be
    /// completed eventually. Returning `false` makes the router report an
    /// error to the callback on the controller's behalf.
    fn handle_control_request(
        &mut self,
        _request: &ControlRequest,
        _callback: Option<ControlResultCallback>,
    ) -> bool {
        false
    }
}
