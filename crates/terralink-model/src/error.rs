//! Error types for configuration loading.

use thiserror::Error;

/// Errors that can occur when resolving or loading properties.
#[derive(Debug, Error)]
pub enum PropertyError {
    /// No property with this name (or alias) exists in the scope.
    #[error("Unknown {scope} property '{name}'")]
    UnknownProperty {
        /// Name as written in the configuration.
        name: String,
        /// Scope the lookup was made in.
        scope: String,
    },

    /// The value does not match the property's declared type.
    #[error("Property '{name}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Property name.
        name: String,
        /// Declared type.
        expected: String,
        /// Value that was supplied.
        found: String,
    },

    /// A numeric value is below the property's minimum.
    #[error("Property '{name}' must be at least {minimum}, got {found}")]
    OutOfRange {
        /// Property name.
        name: String,
        /// Smallest accepted value.
        minimum: f64,
        /// Value that was supplied.
        found: f64,
    },

    /// The YAML document has an unexpected shape.
    #[error("Invalid configuration: {0}")]
    InvalidStructure(String),

    /// YAML parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
