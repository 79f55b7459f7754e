//! Request handling shared by the `link` and `coverage` commands.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use terralink_coverage::{CoverageConfig, CoverageResult, CoverageSampler};
use terralink_dem::{ElevationBackend, ElevationConfig, TerrainProfileProvider};
use terralink_geo::GeoPoint;
use terralink_link::{calculate_link_budget, LinkBudgetParams, LinkReport, RadioParams};
use terralink_model::PlannerConfig;
use tracing::{debug, info};

use crate::RunnerError;

/// How long runtime shutdown waits for abandoned terrain lookups.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Planner {
    elevation: ElevationConfig,
    link: LinkBudgetParams,
    coverage: CoverageConfig,
    tx: RadioParams,
    rx: RadioParams,
}

impl Default for Planner {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

impl Planner {
    /// Resolve every consumer's settings from a loaded configuration.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            elevation: ElevationConfig::from_properties(&config.planner),
            link: LinkBudgetParams::from_properties(&config.planner),
            coverage: CoverageConfig::from_properties(&config.planner),
            tx: RadioParams::from_properties(&config.tx),
            rx: RadioParams::from_properties(&config.rx),
        }
    }

    /// Load a YAML configuration file, or use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, RunnerError> {
        let config = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                PlannerConfig::from_file(path)?
            }
            None => PlannerConfig::default(),
        };
        Ok(Self::from_config(&config))
    }

    /// Replace the configured elevation backend with flat terrain.
    pub fn with_flat_terrain(mut self) -> Self {
        self.elevation.backend = ElevationBackend::Flat;
        self
    }

    pub fn elevation(&self) -> &ElevationConfig {
        &self.elevation
    }

    pub fn coverage_config(&self) -> &CoverageConfig {
        &self.coverage
    }

    pub fn transmitter(&self) -> &RadioParams {
        &self.tx
    }

    /// Build the terrain provider.
    ///
    /// Must run outside the async runtime, since the HTTP backend owns a
    /// blocking client.
    pub fn build_provider(&self) -> Result<Arc<dyn TerrainProfileProvider>, RunnerError> {
        Ok(Arc::from(self.elevation.build_provider()?))
    }

    /// Link budget between two points. `power_w` overrides the
    /// transmitter's configured power.
    pub fn link(
        &self,
        provider: &dyn TerrainProfileProvider,
        from: GeoPoint,
        to: GeoPoint,
        power_w: Option<f64>,
    ) -> Result<LinkReport, RunnerError> {
        let tx = self.tx_with_power(power_w);
        debug!(%from, %to, tx_power_w = tx.tx_power_w, "Link request");
        Ok(calculate_link_budget(provider, from, to, &tx, &self.rx, &self.link)?)
    }

    /// Coverage boundary around `origin`.
    ///
    /// Runs the sampler on its own multi-threaded runtime. Terrain lookups
    /// still running when the deadline passes are abandoned at shutdown.
    pub fn coverage(
        &self,
        provider: Arc<dyn TerrainProfileProvider>,
        origin: GeoPoint,
        power_w: Option<f64>,
        resolution_deg: Option<f64>,
        max_range_km: Option<f64>,
    ) -> Result<CoverageResult, RunnerError> {
        let power_w = power_w.unwrap_or(self.tx.tx_power_w);
        let resolution_deg = resolution_deg.unwrap_or(self.coverage.resolution_deg);
        let max_range_km = max_range_km.unwrap_or(self.coverage.max_range_km);

        let sampler = CoverageSampler::new(provider, self.coverage.clone())
            .with_link_params(self.link.clone())
            .with_radios(self.tx.clone(), self.rx.clone());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let result = runtime.block_on(sampler.generate_coverage_polygon(
            origin,
            power_w,
            resolution_deg,
            max_range_km,
        ));
        runtime.shutdown_timeout(SHUTDOWN_GRACE);
        Ok(result?)
    }

    fn tx_with_power(&self, power_w: Option<f64>) -> RadioParams {
        match power_w {
            Some(watts) => self.tx.clone().with_tx_power_w(watts),
            None => self.tx.clone(),
        }
    }
}
