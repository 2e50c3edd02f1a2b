//! Presentation display lookup

use std::fmt;

/// A resolved external display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayHandle {
    id: i32,
    name: String,
}

impl DisplayHandle {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (display {})", self.name, self.id)
    }
}

/// Maps a route's presentation display id to a display
///
/// Resolved handles are cached per route until the route reports a different
/// display id.
pub trait DisplayResolver: Send + Sync {
    fn resolve_display(&self, display_id: i32) -> Option<DisplayHandle>;
}
