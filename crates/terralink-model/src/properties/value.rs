//! Dynamic property values and typed conversions.
//!
//! [`PropertyValue`] is what the YAML loader produces; [`FromPropertyValue`]
//! and [`ToPropertyValue`] bridge it to the Rust types named by each
//! [`Property`](super::Property) handle.

use serde::{Deserialize, Serialize};

// ============================================================================
// Property Value Enum
// ============================================================================

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
}

impl PropertyValue {
    /// Convert to i64 if the value is integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(v) => Some(*v),
            PropertyValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Convert to u64 if the value is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|v| u64::try_from(v).ok())
    }

    /// Convert to f64 if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Borrow as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the value's kind, used in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Integer(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::String(v) => write!(f, "{}", v),
        }
    }
}

impl TryFrom<&serde_yaml::Value> for PropertyValue {
    type Error = String;

    fn try_from(value: &serde_yaml::Value) -> Result<Self, Self::Error> {
        use serde_yaml::Value;
        match value {
            Value::Null => Err("empty values are not valid property values".to_string()),
            Value::Bool(b) => Err(format!("boolean {} is not a valid property value", b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(PropertyValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(PropertyValue::Float(f))
                } else {
                    Err(format!("unrepresentable number {}", n))
                }
            }
            Value::String(s) => Ok(PropertyValue::String(s.clone())),
            Value::Sequence(_) => Err("sequences are not valid property values".to_string()),
            Value::Mapping(_) => Err("mappings are not valid property values".to_string()),
            Value::Tagged(tagged) => PropertyValue::try_from(&tagged.value),
        }
    }
}

// ============================================================================
// Typed Conversions
// ============================================================================

/// Types that can be extracted from a [`PropertyValue`].
pub trait FromPropertyValue: Sized {
    /// Extract a typed value, or `None` when the value has the wrong shape.
    fn from_property_value(value: &PropertyValue) -> Option<Self>;
}

/// Types that can be stored as a [`PropertyValue`].
pub trait ToPropertyValue {
    /// Convert into the dynamic representation.
    fn to_property_value(&self) -> PropertyValue;
}

macro_rules! impl_property_conversions {
    ($ty:ty, $variant:ident, |$v:ident| $extract:expr, |$s:ident| $store:expr) => {
        impl FromPropertyValue for $ty {
            fn from_property_value($v: &PropertyValue) -> Option<Self> {
                $extract
            }
        }

        impl ToPropertyValue for $ty {
            fn to_property_value(&self) -> PropertyValue {
                let $s = self;
                PropertyValue::$variant($store)
            }
        }

        impl From<$ty> for PropertyValue {
            fn from(v: $ty) -> Self {
                v.to_property_value()
            }
        }
    };
}

impl_property_conversions!(i64, Integer, |v| v.as_i64(), |s| *s);
impl_property_conversions!(u64, Integer, |v| v.as_u64(), |s| *s as i64);
impl_property_conversions!(
    u32,
    Integer,
    |v| v.as_u64().and_then(|n| u32::try_from(n).ok()),
    |s| i64::from(*s)
);
impl_property_conversions!(
    usize,
    Integer,
    |v| v.as_u64().and_then(|n| usize::try_from(n).ok()),
    |s| *s as i64
);
impl_property_conversions!(f64, Float, |v| v.as_f64(), |s| *s);
impl_property_conversions!(String, String, |v| v.as_str().map(str::to_string), |s| s.clone());

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercions() {
        assert_eq!(f64::from_property_value(&PropertyValue::Integer(3)), Some(3.0));
        assert_eq!(u32::from_property_value(&PropertyValue::Float(64.0)), Some(64));
        assert_eq!(u32::from_property_value(&PropertyValue::Float(64.5)), None);
        assert_eq!(usize::from_property_value(&PropertyValue::Integer(-1)), None);
        assert_eq!(
            String::from_property_value(&PropertyValue::String("urban".into())),
            Some("urban".to_string())
        );
        assert_eq!(String::from_property_value(&PropertyValue::Integer(1)), None);
        assert_eq!(PropertyValue::from(7u32), PropertyValue::Integer(7));
    }

    #[test]
    fn test_from_yaml_value() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1.5").unwrap();
        assert_eq!(PropertyValue::try_from(&yaml).unwrap(), PropertyValue::Float(1.5));

        let yaml: serde_yaml::Value = serde_yaml::from_str("[1, 2]").unwrap();
        assert!(PropertyValue::try_from(&yaml).is_err());
    }

    #[test]
    fn test_yaml_bool_and_null_rejected() {
        for text in ["true", "~", "null"] {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
            assert!(PropertyValue::try_from(&yaml).is_err(), "{} was accepted", text);
        }
    }
}
