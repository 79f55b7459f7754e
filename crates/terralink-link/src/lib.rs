//! # terralink-link
//!
//! Terrain-aware point-to-point link budgets for 915 MHz LoRa.
//!
//! - [`propagation`] - free-space loss, Fresnel zones, earth bulge, knife-edge
//!   diffraction and clearance analysis of a terrain profile
//! - [`budget`] - path loss composition, spreading factor selection, margin,
//!   reliability and quality rating
//! - [`calculate_link_budget`] - the whole pipeline against a
//!   [`TerrainProfileProvider`](terralink_dem::TerrainProfileProvider), with
//!   flat-terrain fallback when the provider fails
//!
//! ## Example
//!
//! ```
//! use terralink_dem::FlatTerrainProvider;
//! use terralink_geo::GeoPoint;
//! use terralink_link::{calculate_link_budget, LinkBudgetParams, RadioParams};
//!
//! let from = GeoPoint::new(45.00, -122.00)?;
//! let to = GeoPoint::new(45.01, -122.00)?;
//! let radio = RadioParams::default();
//! let report = calculate_link_budget(
//!     &FlatTerrainProvider::new(100.0),
//!     from,
//!     to,
//!     &radio,
//!     &radio,
//!     &LinkBudgetParams::default(),
//! )?;
//! assert!(report.is_viable());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod budget;
mod error;
mod predict;
pub mod propagation;

pub use budget::{
    assess_quality, compute_link_budget, compute_path_loss, dbm_to_watts,
    optimal_spreading_factor, reliability_percent, watts_to_dbm, Environment, LinkBudgetParams,
    LinkBudgetResult, LinkQuality, PathLossBreakdown, RadioParams, SensitivityTable,
    SpreadingFactor,
};
pub use error::{LinkBudgetError, PropagationError};
pub use predict::{
    assess_profile, calculate_link_budget, LinkReport, PathAssessment, PathInfo, TerrainInfo,
    TerrainSource,
};
pub use propagation::{analyze_clearance, line_of_sight_clear, ClearanceAnalysis, Obstruction};
