//! Control filters and control requests
//!
//! A [`ControlFilter`] advertises which control categories and actions a
//! route understands. A [`ControlRequest`] is what a caller sends to the
//! selected route. Matching is set membership on categories and actions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::extras::Extras;

/// Capability matcher published by a route
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlFilter {
    categories: BTreeSet<String>,
    actions: BTreeSet<String>,
}

impl ControlFilter {
    pub fn builder() -> ControlFilterBuilder {
        ControlFilterBuilder::default()
    }

    /// Filter that only declares a single category
    pub fn with_category(category: impl Into<String>) -> Self {
        Self::builder().add_category(category).build()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    /// Check whether this filter accepts the request
    ///
    /// The request action must be declared by the filter. When the request
    /// names a category, the filter must declare it as well.
    pub fn matches(&self, request: &ControlRequest) -> bool {
        if !self.has_action(request.action()) {
            return false;
        }
        match request.category() {
            Some(category) => self.has_category(category),
            None => true,
        }
    }
}

/// Builder for [`ControlFilter`]
#[derive(Debug, Default)]
pub struct ControlFilterBuilder {
    categories: BTreeSet<String>,
    actions: BTreeSet<String>,
}

impl ControlFilterBuilder {
    pub fn add_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn add_action(mut self, action: impl Into<String>) -> Self {
        self.actions.insert(action.into());
        self
    }

    pub fn build(self) -> ControlFilter {
        ControlFilter {
            categories: self.categories,
            actions: self.actions,
        }
    }
}

/// A control request addressed to the selected route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRequest {
    action: String,
    category: Option<String>,
    #[serde(default)]
    extras: Extras,
}

impl ControlRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            category: None,
            extras: Extras::default(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn extras(&self) -> &Extras {
        &self.extras
    }
}
