//! Configuration types for the media router engine

/// Descriptor id the system provider uses for its default route
pub const DEFAULT_ROUTE_ID: &str = "DEFAULT_ROUTE";

/// Configuration for the [`MediaRouterEngine`](crate::MediaRouterEngine)
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Descriptor id identifying the system provider's default route
    /// Default: "DEFAULT_ROUTE"
    pub default_route_id: String,

    /// Panic when the engine is used from a thread other than the one that
    /// built it
    /// Default: true
    pub enforce_thread_affinity: bool,

    /// Maximum number of tasks delivered by one `process_batch` call
    /// Default: 256
    pub max_dispatch_batch: usize,

    /// Queue length above which a warning is logged once
    /// Default: 1024
    pub queue_warning_threshold: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_route_id: DEFAULT_ROUTE_ID.to_string(),
            enforce_thread_affinity: true,
            max_dispatch_batch: 256,
            queue_warning_threshold: 1024,
        }
    }
}

impl RouterConfig {
    /// Create a new RouterConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a RouterConfig for hosts that serialize access themselves
    ///
    /// The engine no longer checks the calling thread. Calls from different
    /// threads are serialized on the engine lock, so event order is only
    /// meaningful if the host itself runs one caller at a time.
    pub fn relaxed_threading() -> Self {
        Self {
            enforce_thread_affinity: false,
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), crate::RouterError> {
        if self.default_route_id.is_empty() {
            return Err(crate::RouterError::Configuration(
                "Default route id must not be empty".to_string(),
            ));
        }

        if self.max_dispatch_batch == 0 {
            return Err(crate::RouterError::Configuration(
                "Max dispatch batch must be greater than 0".to_string(),
            ));
        }

        if self.queue_warning_threshold == 0 {
            return Err(crate::RouterError::Configuration(
                "Queue warning threshold must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.default_route_id, "DEFAULT_ROUTE");
        assert!(config.enforce_thread_affinity);
        assert_eq!(config.max_dispatch_batch, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relaxed_threading_preset() {
        let config = RouterConfig::relaxed_threading();
        assert!(!config.enforce_thread_affinity);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RouterConfig::default();

        config.default_route_id = String::new();
        assert!(config.validate().is_err());

        config = RouterConfig::default();
        config.max_dispatch_batch = 0;
        assert!(config.validate().is_err());

        config = RouterConfig::default();
        config.queue_warning_threshold = 0;
        assert!(config.validate().is_err());
    }
}
