//! Data types shared by the engine and its callers

pub mod flags;
pub mod id_types;
pub mod route;

pub use flags::{AvailabilityFlags, CallbackFlags, RouteChanges};
pub use id_types::{CallerId, ProviderId, RouteId, RouterId};
pub use route::{Provider, Route};

pub(crate) use id_types::IdSequence;
