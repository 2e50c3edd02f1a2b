use thiserror::Error;

/// Errors produced while validating or decoding descriptors
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// A route descriptor has an empty id
    #[error("Route descriptor is missing an id")]
    MissingRouteId,

    /// A route descriptor has an empty name
    #[error("Route descriptor {0} is missing a name")]
    MissingRouteName(String),

    /// Serialized descriptor could not be decoded
    #[error("Failed to decode descriptor: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for descriptor operations
pub type Result<T> = std::result::Result<T, DescriptorError>;
