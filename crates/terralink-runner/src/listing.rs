//! Property catalogue for `terralink properties`.

use serde::Serialize;
use terralink_model::properties::{PropertyDef, PropertyScope, PropertyValue, ValueKind, ALL};

/// One configurable property as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyListing {
    pub name: &'static str,
    pub scope: PropertyScope,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub default: PropertyValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    pub description: &'static str,
}

impl From<&PropertyDef> for PropertyListing {
    fn from(def: &PropertyDef) -> Self {
        Self {
            name: def.name,
            scope: def.scope,
            kind: def.kind,
            default: def.default_value(),
            unit: def.unit,
            minimum: def.minimum,
            description: def.description,
        }
    }
}

/// Every known property, planner scope first, sorted by name within a scope.
pub fn property_listing() -> Vec<PropertyListing> {
    let mut listing: Vec<PropertyListing> = ALL.iter().map(PropertyListing::from).collect();
    listing.sort_by_key(|p| (p.scope == PropertyScope::Endpoint, p.name));
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_property_once() {
        let listing = property_listing();
        assert_eq!(listing.len(), ALL.len());

        let mut names: Vec<_> = listing.iter().map(|p| p.name).collect();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn planner_scope_comes_first() {
        let listing = property_listing();
        let first_endpoint = listing
            .iter()
            .position(|p| p.scope == PropertyScope::Endpoint)
            .unwrap();
        assert!(listing[first_endpoint..]
            .iter()
            .all(|p| p.scope == PropertyScope::Endpoint));
    }

    #[test]
    fn serializes_defaults_and_units() {
        let listing = property_listing();
        let power = listing
            .iter()
            .find(|p| p.name == "radio/tx_power_w")
            .unwrap();
        let json = serde_json::to_value(power).unwrap();
        assert_eq!(json["scope"], "endpoint");
        assert_eq!(json["default"], 1.0);
        assert_eq!(json["unit"], "W");
        assert_eq!(json["type"], "float");
        assert_eq!(json["minimum"], 0.0);
    }
}
