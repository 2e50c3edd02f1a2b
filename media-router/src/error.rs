//! Error types for the media router engine

use thiserror::Error;

use crate::logging::LoggingError;
use crate::model::{CallerId, RouteId};

/// Errors surfaced to router callers
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("There is no {0} route. The media router has not yet been fully initialized.")]
    NotInitialized(&'static str),

    #[error("Control request for {0} was not handled")]
    ControlRequestRejected(RouteId),

    #[error("Router for caller {0} has been disposed")]
    RouterDisposed(CallerId),

    #[error("The media router has been shut down")]
    ShutDown,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

pub type Result<T> = std::result::Result<T, RouterError>;
