//! Filter - Equality Criteria for Listing Calls
//!
//! A filter is an opaque set of `field = value` constraints handed to the
//! listing service. Criteria are kept ordered by field name so the serialized
//! form is canonical and two filters compare equal iff they serialize equally.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field name of the region criterion
pub const REGION_FIELD: &str = "state";

/// Equality criteria applied server-side by the listing service
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    criteria: BTreeMap<String, String>,
}

/// Items that can be matched against a [`Filter`] by field lookup
pub trait Filterable {
    /// Value of a filterable field, `None` if the item has no such field
    fn field(&self, name: &str) -> Option<&str>;
}

impl Filter {
    /// Filter with no constraint
    pub fn none() -> Self {
        Self::default()
    }

    /// Filter on a region code; `None` or a blank code means no constraint
    pub fn region(region: Option<&str>) -> Self {
        match region {
            Some(code) => Self::none().with(REGION_FIELD, code),
            None => Self::none(),
        }
    }

    /// Add an equality criterion. Blank values are ignored.
    pub fn with(mut self, field: impl Into<String>, value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() {
            self.criteria.insert(field.into(), value.to_string());
        }
        self
    }

    /// Check if the filter places no constraint
    pub fn is_unconstrained(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Value required for a field, if constrained
    pub fn get(&self, field: &str) -> Option<&str> {
        self.criteria.get(field).map(String::as_str)
    }

    /// Iterate criteria in field order
    pub fn criteria(&self) -> impl Iterator<Item = (&str, &str)> {
        self.criteria.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical serialized form of the criteria
    pub fn serialized(&self) -> String {
        serde_json::to_string(&self.criteria).unwrap_or_default()
    }

    /// Check whether an item satisfies every criterion
    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        self.criteria
            .iter()
            .all(|(field, value)| item.field(field) == Some(value.as_str()))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.criteria.is_empty() {
            return f.write_str("(none)");
        }
        let parts: Vec<String> = self
            .criteria
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str);

    impl Filterable for Row {
        fn field(&self, name: &str) -> Option<&str> {
            (name == REGION_FIELD).then_some(self.0)
        }
    }

    #[test]
    fn blank_region_is_unconstrained() {
        assert!(Filter::region(None).is_unconstrained());
        assert!(Filter::region(Some("")).is_unconstrained());
        assert!(Filter::region(Some("  ")).is_unconstrained());
        assert_eq!(Filter::region(Some("")), Filter::none());
    }

    #[test]
    fn equality_follows_serialized_criteria() {
        let a = Filter::none().with("state", "CA").with("owner", "u1");
        let b = Filter::none().with("owner", "u1").with("state", " CA ");
        assert_eq!(a, b);
        assert_eq!(a.serialized(), b.serialized());
        assert_eq!(a.serialized(), r#"{"owner":"u1","state":"CA"}"#);

        assert_ne!(Filter::region(Some("CA")), Filter::region(Some("NY")));
    }

    #[test]
    fn matches_by_field() {
        let filter = Filter::region(Some("CA"));
        assert!(filter.matches(&Row("CA")));
        assert!(!filter.matches(&Row("NY")));
        assert!(Filter::none().matches(&Row("NY")));
    }

    #[test]
    fn display_lists_criteria() {
        assert_eq!(Filter::none().to_string(), "(none)");
        assert_eq!(Filter::region(Some("CA")).to_string(), "state=CA");
    }
}
