//! Property metadata and the typed [`Property`] handle.
//!
//! A [`Property<T, S>`] pairs a name with the Rust type `T` it reads as and
//! the scope `S` it belongs to, so a planner setting cannot be read from an
//! endpoint set by mistake. The untyped [`PropertyDef`] behind it is what the
//! YAML loader and `terralink properties` work with.

use super::value::PropertyValue;
use crate::{PropertyError, Result};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

// ============================================================================
// Scopes
// ============================================================================

/// Where a property is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyScope {
    /// Link budget, coverage and elevation settings.
    Planner,
    /// One radio; resolved separately for transmitter and receiver.
    Endpoint,
}

impl std::fmt::Display for PropertyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyScope::Planner => write!(f, "planner"),
            PropertyScope::Endpoint => write!(f, "endpoint"),
        }
    }
}

/// Compile-time scope tag for [`Property`] and
/// [`ResolvedProperties`](super::ResolvedProperties).
pub trait ScopeMarker: 'static {
    const SCOPE: PropertyScope;
}

/// Tag for planner-wide properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlannerScope;

impl ScopeMarker for PlannerScope {
    const SCOPE: PropertyScope = PropertyScope::Planner;
}

/// Tag for per-radio properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointScope;

impl ScopeMarker for EndpointScope {
    const SCOPE: PropertyScope = PropertyScope::Endpoint;
}

// ============================================================================
// Value kinds and defaults
// ============================================================================

/// Kind of value a property stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Whole numbers: counts, sizes, frequencies.
    Integer,
    /// Physical quantities.
    Float,
    /// Names and URLs.
    Text,
}

impl ValueKind {
    /// Whether `value` can be stored under this kind.
    ///
    /// YAML writes `8` and `8.0` interchangeably, so integers are accepted
    /// for floats and whole floats for integers.
    pub fn accepts(self, value: &PropertyValue) -> bool {
        match (self, value) {
            (ValueKind::Integer, PropertyValue::Integer(_)) => true,
            (ValueKind::Integer, PropertyValue::Float(f)) => f.fract() == 0.0,
            (ValueKind::Float, PropertyValue::Float(_) | PropertyValue::Integer(_)) => true,
            (ValueKind::Text, PropertyValue::String(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Text => write!(f, "string"),
        }
    }
}

/// A default value that can live in a `const`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyDefault {
    Integer(i64),
    Float(f64),
    Text(&'static str),
}

impl PropertyDefault {
    /// The kind this default implies.
    pub const fn kind(self) -> ValueKind {
        match self {
            PropertyDefault::Integer(_) => ValueKind::Integer,
            PropertyDefault::Float(_) => ValueKind::Float,
            PropertyDefault::Text(_) => ValueKind::Text,
        }
    }

    pub fn to_value(self) -> PropertyValue {
        match self {
            PropertyDefault::Integer(v) => PropertyValue::Integer(v),
            PropertyDefault::Float(v) => PropertyValue::Float(v),
            PropertyDefault::Text(v) => PropertyValue::String(v.to_string()),
        }
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// Untyped property metadata.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDef {
    /// `namespace/key`, e.g. "radio/tx_power_w".
    pub name: &'static str,
    /// Shown by `terralink properties`.
    pub description: &'static str,
    pub scope: PropertyScope,
    pub kind: ValueKind,
    pub default: PropertyDefault,
    /// Unit suffix such as "dB" or "km".
    pub unit: Option<&'static str>,
    /// Smallest accepted value for numeric properties, inclusive.
    pub minimum: Option<f64>,
    /// Older or shorter names accepted when loading configuration.
    pub aliases: &'static [&'static str],
}

impl PropertyDef {
    /// Whether `name` is this property's name or one of its aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| *alias == name)
    }

    pub fn default_value(&self) -> PropertyValue {
        self.default.to_value()
    }

    /// Check a value against the kind and minimum.
    pub fn validate(&self, value: &PropertyValue) -> Result<()> {
        if !self.kind.accepts(value) {
            return Err(PropertyError::TypeMismatch {
                name: self.name.to_string(),
                expected: self.kind.to_string(),
                found: format!("{} ({})", value.kind(), value),
            });
        }
        if let (Some(minimum), Some(found)) = (self.minimum, value.as_f64()) {
            if found < minimum {
                return Err(PropertyError::OutOfRange {
                    name: self.name.to_string(),
                    minimum,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// A property read as `T` from scope `S`.
///
/// ```
/// use terralink_model::properties::{ResolvedProperties, EndpointScope, RADIO_TX_POWER_W};
///
/// let props: ResolvedProperties<EndpointScope> = ResolvedProperties::new();
/// let power: f64 = props.get(&RADIO_TX_POWER_W);
/// assert_eq!(power, 1.0);
/// ```
#[derive(Debug)]
pub struct Property<T, S: ScopeMarker> {
    pub(crate) def: PropertyDef,
    _marker: PhantomData<(T, S)>,
}

impl<T, S: ScopeMarker> Property<T, S> {
    /// A property whose kind follows from its default.
    pub const fn new(
        name: &'static str,
        description: &'static str,
        default: PropertyDefault,
    ) -> Self {
        Self {
            def: PropertyDef {
                name,
                description,
                scope: S::SCOPE,
                kind: default.kind(),
                default,
                unit: None,
                minimum: None,
                aliases: &[],
            },
            _marker: PhantomData,
        }
    }

    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.def.unit = Some(unit);
        self
    }

    /// Reject values below `minimum` when loading.
    pub const fn with_minimum(mut self, minimum: f64) -> Self {
        self.def.minimum = Some(minimum);
        self
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.def.aliases = aliases;
        self
    }

    pub const fn name(&self) -> &'static str {
        self.def.name
    }

    pub const fn def(&self) -> &PropertyDef {
        &self.def
    }
}

impl<T, S: ScopeMarker> Clone for Property<T, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, S: ScopeMarker> Copy for Property<T, S> {}
