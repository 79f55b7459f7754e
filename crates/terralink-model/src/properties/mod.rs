//! Typed property definitions and resolved property sets.
//!
//! - [`types`] - property metadata, scopes and the type-safe [`Property`] handle
//! - [`value`] - the dynamic [`PropertyValue`] and conversion traits
//! - [`registry`] - [`ResolvedProperties`], a scoped set of overrides
//! - [`definitions`] - every property constant, grouped by namespace

pub mod definitions;
pub mod registry;
pub mod types;
pub mod value;

pub use definitions::*;
pub use registry::ResolvedProperties;
pub use types::{
    EndpointScope, PlannerScope, Property, PropertyDef, PropertyDefault, PropertyScope,
    ScopeMarker, ValueKind,
};
pub use value::{FromPropertyValue, PropertyValue, ToPropertyValue};
