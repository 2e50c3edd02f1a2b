//! One-way mirror of route state into an external routing service

use thiserror::Error;

use crate::model::Route;

/// Failure reported by a sync sink; logged and otherwise ignored
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync sink unavailable: {0}")]
    Unavailable(String),

    #[error("Sync sink rejected route {route}: {reason}")]
    Rejected { route: String, reason: String },
}

/// Receives added, removed, changed and selected routes
///
/// The sink runs during event delivery, before any router callback sees the
/// same event. Errors never reach the engine's callers. A sink that needs to
/// know whether a route it sees externally already exists in the engine can
/// ask [`MediaRouterEngine::system_route_by_descriptor_id`](crate::MediaRouterEngine::system_route_by_descriptor_id).
pub trait SyncSink: Send + Sync {
    fn on_sync_route_added(&self, route: &Route) -> Result<(), SyncError>;

    fn on_sync_route_removed(&self, route: &Route) -> Result<(), SyncError>;

    fn on_sync_route_changed(&self, route: &Route) -> Result<(), SyncError>;

    fn on_sync_route_selected(&self, route: &Route) -> Result<(), SyncError>;
}
