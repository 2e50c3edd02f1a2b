//! Route selectors
//!
//! A selector is the predicate a caller uses to say which routes it cares
//! about. It is a set of control categories; a route matches when any of its
//! control filters declares any of the selector's categories. Because matching
//! is "any operand matches", `union` is associative and commutative.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::control::ControlFilter;

/// Set of control categories describing the routes a caller is interested in
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteSelector {
    categories: BTreeSet<String>,
}

impl RouteSelector {
    /// Selector that matches nothing
    pub const EMPTY: RouteSelector = RouteSelector {
        categories: BTreeSet::new(),
    };

    pub fn builder() -> RouteSelectorBuilder {
        RouteSelectorBuilder::default()
    }

    /// Selector for a single control category
    pub fn for_category(category: impl Into<String>) -> Self {
        Self::builder().add_control_category(category).build()
    }

    pub fn has_control_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn control_categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Returns true if any filter declares any of this selector's categories
    pub fn matches_control_filters(&self, filters: &[ControlFilter]) -> bool {
        filters
            .iter()
            .any(|filter| self.categories.iter().any(|c| filter.has_category(c)))
    }

    /// Returns true if every category of `other` is also in this selector
    pub fn contains(&self, other: &RouteSelector) -> bool {
        other.categories.is_subset(&self.categories)
    }

    /// Selector matching anything either operand matches
    pub fn union(&self, other: &RouteSelector) -> RouteSelector {
        RouteSelector {
            categories: self.categories.union(&other.categories).cloned().collect(),
        }
    }
}

impl fmt::Display for RouteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteSelector{{ categories=[")?;
        for (i, category) in self.categories.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", category)?;
        }
        write!(f, "] }}")
    }
}

/// Builder for [`RouteSelector`]
#[derive(Debug, Default)]
pub struct RouteSelectorBuilder {
    categories: BTreeSet<String>,
}

impl RouteSelectorBuilder {
    /// Start from an existing selector
    pub fn from_selector(selector: &RouteSelector) -> Self {
        Self {
            categories: selector.categories.clone(),
        }
    }

    pub fn add_control_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn add_control_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn add_selector(mut self, selector: &RouteSelector) -> Self {
        self.categories.extend(selector.categories.iter().cloned());
        self
    }

    pub fn build(self) -> RouteSelector {
        RouteSelector {
            categories: self.categories,
        }
    }
}
