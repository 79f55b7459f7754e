//! # terralink-model
//!
//! Configuration model for terralink.
//!
//! Every tunable is a typed [`Property`](properties::Property) constant with a
//! name, description, unit and default. A [`ResolvedProperties`](properties::ResolvedProperties)
//! set holds overrides for one scope and falls back to defaults for anything
//! unset. A [`PlannerConfig`] bundles the planner-wide set with one set per
//! radio endpoint and can be loaded from YAML:
//!
//! ```yaml
//! planner:
//!   link:
//!     fade_margin_db: 8
//!   coverage:
//!     max_range_km: 30
//! tx:
//!   radio:
//!     tx_power_w: 0.5
//! rx:
//!   radio:
//!     antenna_height_m: 2
//! ```

mod config;
mod error;
pub mod properties;

pub use config::PlannerConfig;
pub use error::PropertyError;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, PropertyError>;
