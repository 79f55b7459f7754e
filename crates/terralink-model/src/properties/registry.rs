//! Resolved property sets.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use tracing::warn;

use super::definitions::ALL;
use super::types::{Property, PropertyDef, ScopeMarker};
use super::value::{FromPropertyValue, PropertyValue, ToPropertyValue};
use crate::{PropertyError, Result};

/// Look up a property definition by name or alias within a scope.
pub fn find_property<S: ScopeMarker>(name: &str) -> Option<&'static PropertyDef> {
    ALL.iter().find(|def| def.scope == S::SCOPE && def.matches(name))
}

/// All property definitions belonging to a scope, in declaration order.
pub fn properties_in_scope<S: ScopeMarker>() -> impl Iterator<Item = &'static PropertyDef> {
    ALL.iter().filter(|def| def.scope == S::SCOPE)
}

/// A set of property overrides for one scope.
///
/// Reads fall back to the property default for anything not explicitly set.
#[derive(Debug, Clone)]
pub struct ResolvedProperties<S: ScopeMarker> {
    values: BTreeMap<&'static str, PropertyValue>,
    _scope: PhantomData<S>,
}

impl<S: ScopeMarker> Default for ResolvedProperties<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ScopeMarker> ResolvedProperties<S> {
    /// Create an empty set; every read returns the default.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            _scope: PhantomData,
        }
    }

    /// Read a property, falling back to its default.
    ///
    /// A stored value always type-checks on the way in, so the final
    /// `T::default()` branch is only reachable for a default that does not
    /// convert to `T`, which is a definition bug.
    pub fn get<T>(&self, prop: &Property<T, S>) -> T
    where
        T: FromPropertyValue + Default,
    {
        if let Some(value) = self.values.get(prop.name()) {
            if let Some(v) = T::from_property_value(value) {
                return v;
            }
        }
        match T::from_property_value(&prop.def().default_value()) {
            Some(v) => v,
            None => {
                warn!(property = prop.name(), "default does not convert to the requested type");
                T::default()
            }
        }
    }

    /// Set a property value.
    pub fn set<T: ToPropertyValue>(&mut self, prop: &Property<T, S>, value: T) -> Result<()> {
        self.insert_checked(prop.def(), value.to_property_value())
    }

    /// Set a property by its name or one of its aliases.
    pub fn set_by_name(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        let def = find_property::<S>(name).ok_or_else(|| PropertyError::UnknownProperty {
            name: name.to_string(),
            scope: S::SCOPE.to_string(),
        })?;
        self.insert_checked(def, value)
    }

    /// Whether a property has an explicit override.
    pub fn is_set<T>(&self, prop: &Property<T, S>) -> bool {
        self.values.contains_key(prop.name())
    }

    /// The effective value of a property by name, default included.
    pub fn value_by_name(&self, name: &str) -> Option<PropertyValue> {
        let def = find_property::<S>(name)?;
        Some(
            self.values
                .get(def.name)
                .cloned()
                .unwrap_or_else(|| def.default_value()),
        )
    }

    /// Iterate the explicit overrides, sorted by property name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Number of explicit overrides.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no property has been overridden.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply overrides from a YAML mapping.
    ///
    /// Nested mappings flatten into `namespace/key` names, so
    /// `link: { fade_margin_db: 8 }` and `link/fade_margin_db: 8` are
    /// equivalent.
    pub fn apply_yaml(&mut self, value: &serde_yaml::Value) -> Result<()> {
        let mut flat = Vec::new();
        flatten_yaml("", value, &mut flat)?;
        for (name, raw) in flat {
            let value = PropertyValue::try_from(raw).map_err(|reason| {
                PropertyError::InvalidStructure(format!("{}: {}", name, reason))
            })?;
            self.set_by_name(&name, value)?;
        }
        Ok(())
    }

    /// Build a set from a YAML mapping.
    pub fn from_yaml_value(value: &serde_yaml::Value) -> Result<Self> {
        let mut props = Self::new();
        props.apply_yaml(value)?;
        Ok(props)
    }

    fn insert_checked(&mut self, def: &PropertyDef, value: PropertyValue) -> Result<()> {
        def.validate(&value)?;
        self.values.insert(def.name, value);
        Ok(())
    }
}

fn flatten_yaml<'a>(
    prefix: &str,
    value: &'a serde_yaml::Value,
    out: &mut Vec<(String, &'a serde_yaml::Value)>,
) -> Result<()> {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, child) in map {
                let key = key.as_str().ok_or_else(|| {
                    PropertyError::InvalidStructure(format!(
                        "non-string key under '{}'",
                        if prefix.is_empty() { "<root>" } else { prefix }
                    ))
                })?;
                let name = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{}/{}", prefix, key)
                };
                flatten_yaml(&name, child, out)?;
            }
            Ok(())
        }
        serde_yaml::Value::Null if prefix.is_empty() => Ok(()),
        _ if prefix.is_empty() => Err(PropertyError::InvalidStructure(
            "expected a mapping of properties".to_string(),
        )),
        leaf => {
            out.push((prefix.to_string(), leaf));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{
        EndpointScope, PlannerScope, COVERAGE_MAX_RANGE_KM, LINK_ENVIRONMENT, LINK_FADE_MARGIN_DB,
        LINK_TERRAIN_SAMPLES, RADIO_ANTENNA_HEIGHT_M, RADIO_FREQUENCY_HZ, RADIO_TX_POWER_W,
    };

    #[test]
    fn test_defaults_when_unset() {
        let props: ResolvedProperties<PlannerScope> = ResolvedProperties::new();
        assert_eq!(props.get(&LINK_FADE_MARGIN_DB), 10.0);
        assert_eq!(props.get(&LINK_ENVIRONMENT), "suburban");
        assert_eq!(props.get(&LINK_TERRAIN_SAMPLES), 64);
        assert!(props.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut props: ResolvedProperties<EndpointScope> = ResolvedProperties::new();
        props.set(&RADIO_TX_POWER_W, 0.25).unwrap();
        assert_eq!(props.get(&RADIO_TX_POWER_W), 0.25);
        assert!(props.is_set(&RADIO_TX_POWER_W));
        assert!(!props.is_set(&RADIO_ANTENNA_HEIGHT_M));

        let err = props.set(&RADIO_FREQUENCY_HZ, 0).unwrap_err();
        assert!(matches!(err, PropertyError::OutOfRange { .. }));
        props.set(&RADIO_FREQUENCY_HZ, 868_000_000).unwrap();
    }

    #[test]
    fn test_set_by_name_rejects_wrong_type() {
        let mut props: ResolvedProperties<PlannerScope> = ResolvedProperties::new();
        let err = props
            .set_by_name("link/fade_margin_db", PropertyValue::String("lots".into()))
            .unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { .. }));

        let err = props
            .set_by_name("link/terrain_samples", PropertyValue::Float(12.5))
            .unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { .. }));
    }

    #[test]
    fn test_set_rejects_below_minimum() {
        let mut props: ResolvedProperties<EndpointScope> = ResolvedProperties::new();
        let err = props.set(&RADIO_ANTENNA_HEIGHT_M, -2.0).unwrap_err();
        assert!(matches!(err, PropertyError::OutOfRange { .. }));
        assert!(!props.is_set(&RADIO_ANTENNA_HEIGHT_M));
    }

    #[test]
    fn test_set_by_name_unknown_or_wrong_scope() {
        let mut props: ResolvedProperties<PlannerScope> = ResolvedProperties::new();
        let err = props
            .set_by_name("radio/tx_power_w", PropertyValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(err, PropertyError::UnknownProperty { .. }));
    }

    #[test]
    fn test_yaml_flattening() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            r#"
link:
  fade_margin_db: 8
  environment: urban
coverage/max_range_km: 30
"#,
        )
        .unwrap();
        let props: ResolvedProperties<PlannerScope> =
            ResolvedProperties::from_yaml_value(&yaml).unwrap();
        assert_eq!(props.get(&LINK_FADE_MARGIN_DB), 8.0);
        assert_eq!(props.get(&LINK_ENVIRONMENT), "urban");
        assert_eq!(props.get(&COVERAGE_MAX_RANGE_KM), 30.0);
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn test_yaml_unknown_key() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("link:\n  fade_margn_db: 8\n").unwrap();
        let result = ResolvedProperties::<PlannerScope>::from_yaml_value(&yaml);
        assert!(matches!(result, Err(PropertyError::UnknownProperty { .. })));
    }

    #[test]
    fn test_yaml_bool_and_empty_values() {
        for text in ["link:\n  fade_margin_db: true\n", "link:\n  fade_margin_db:\n"] {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
            let result = ResolvedProperties::<PlannerScope>::from_yaml_value(&yaml);
            assert!(matches!(result, Err(PropertyError::InvalidStructure(_))));
        }
    }

    #[test]
    fn test_value_by_name_includes_defaults() {
        let props: ResolvedProperties<PlannerScope> = ResolvedProperties::new();
        assert_eq!(
            props.value_by_name("coverage/step_km"),
            Some(PropertyValue::Float(0.5))
        );
        assert_eq!(props.value_by_name("coverage/nope"), None);
    }
}
