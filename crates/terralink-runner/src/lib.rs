//! # terralink-runner
//!
//! Glue behind the `terralink` binary: loads a [`PlannerConfig`](terralink_model::PlannerConfig),
//! builds the terrain provider and runs link or coverage requests.
//!
//! ```no_run
//! use terralink_geo::GeoPoint;
//! use terralink_runner::Planner;
//!
//! # fn main() -> Result<(), terralink_runner::RunnerError> {
//! let planner = Planner::load(None)?.with_flat_terrain();
//! let provider = planner.build_provider()?;
//! let from: GeoPoint = "45.0,-122.0".parse()?;
//! let to: GeoPoint = "45.0,-121.9".parse()?;
//! let report = planner.link(provider.as_ref(), from, to, Some(0.5))?;
//! println!("{} dB margin", report.link_margin_db());
//! # Ok(())
//! # }
//! ```

mod error;
mod listing;
mod planner;

pub use error::RunnerError;
pub use listing::{property_listing, PropertyListing};
pub use planner::Planner;
