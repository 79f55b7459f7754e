use terralink_coverage::CoverageError;
use terralink_dem::DemError;
use terralink_geo::GeoError;
use terralink_link::LinkBudgetError;
use terralink_model::PropertyError;
use thiserror::Error;

/// Errors surfaced by the `terralink` commands.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid coordinate: {0}")]
    Geo(#[from] GeoError),

    #[error("configuration error: {0}")]
    Config(#[from] PropertyError),

    #[error("terrain error: {0}")]
    Terrain(#[from] DemError),

    #[error("link budget error: {0}")]
    Link(#[from] LinkBudgetError),

    #[error("coverage error: {0}")]
    Coverage(#[from] CoverageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
