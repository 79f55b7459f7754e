//! Point-to-point link prediction over terrain.

use metrics::{counter, histogram};
use terralink_dem::{FallbackProvider, TerrainProfile, TerrainProfileProvider, TerrainStats};
use terralink_geo::{distance_km, initial_bearing, GeoPoint};
use terralink_metrics::metric_defs;
use tracing::{debug, info};

use crate::budget::{
    compute_link_budget, compute_path_loss, LinkBudgetParams, LinkBudgetResult, LinkQuality,
    RadioParams,
};
use crate::propagation::{analyze_clearance, line_of_sight_clear, wavelength_m, ClearanceAnalysis};
use crate::{LinkBudgetError, PropagationError};

/// Where the terrain under a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TerrainSource {
    /// A real elevation profile.
    Modeled,
    /// The provider failed and flat ground was assumed.
    FlatFallback,
}

impl std::fmt::Display for TerrainSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerrainSource::Modeled => write!(f, "modeled"),
            TerrainSource::FlatFallback => write!(f, "flat fallback"),
        }
    }
}

/// Geometry of the predicted path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PathInfo {
    pub from: GeoPoint,
    pub to: GeoPoint,
    /// Transmitter antenna height above ground (meters).
    pub tx_height_m: f64,
    /// Receiver antenna height above ground (meters).
    pub rx_height_m: f64,
    /// Great-circle distance in kilometers.
    pub distance_km: f64,
    /// Initial bearing from transmitter to receiver, degrees from north.
    pub bearing_deg: f64,
}

/// What the terrain did to the path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TerrainInfo {
    pub source: TerrainSource,
    /// Elevation statistics of the profile that was analyzed.
    pub stats: Option<TerrainStats>,
    pub clearance: ClearanceAnalysis,
    /// Whether the geometric sight line clears the ground.
    pub line_of_sight_clear: bool,
}

/// Full result of [`calculate_link_budget`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkReport {
    pub path: PathInfo,
    pub terrain: TerrainInfo,
    pub budget: LinkBudgetResult,
    pub quality: LinkQuality,
    /// Plain-language suggestions for improving the link.
    pub recommendations: Vec<String>,
}

impl LinkReport {
    /// Shorthand for `budget.is_viable`.
    pub fn is_viable(&self) -> bool {
        self.budget.is_viable
    }

    /// Shorthand for `budget.link_margin_db`.
    pub fn link_margin_db(&self) -> f64 {
        self.budget.link_margin_db
    }
}

/// Clearance and budget for one already-fetched profile.
#[derive(Debug, Clone, PartialEq)]
pub struct PathAssessment {
    pub clearance: ClearanceAnalysis,
    pub budget: LinkBudgetResult,
}

/// Run the propagation model and budget over `profile`.
///
/// This is the terrain-independent core shared by point-to-point prediction
/// and coverage ray marching.
pub fn assess_profile(
    profile: &TerrainProfile,
    distance_km: f64,
    tx: &RadioParams,
    rx: &RadioParams,
    params: &LinkBudgetParams,
) -> Result<PathAssessment, PropagationError> {
    let clearance = analyze_clearance(
        profile,
        tx.antenna_height_m,
        rx.antenna_height_m,
        distance_km,
        wavelength_m(tx.frequency_hz),
    )?;
    let path_loss = compute_path_loss(distance_km, &clearance, tx.frequency_hz)?;
    let budget = compute_link_budget(
        tx,
        rx,
        distance_km,
        &path_loss,
        params.fade_margin_db,
        params.environment,
    );
    Ok(PathAssessment { clearance, budget })
}

/// Predict the link from `from` (transmitter) to `to` (receiver).
///
/// A failing terrain provider does not fail the prediction: flat ground at
/// `params.fallback_elevation_m` is assumed instead and the report says so.
pub fn calculate_link_budget<P>(
    provider: &P,
    from: GeoPoint,
    to: GeoPoint,
    tx: &RadioParams,
    rx: &RadioParams,
    params: &LinkBudgetParams,
) -> Result<LinkReport, LinkBudgetError>
where
    P: TerrainProfileProvider + ?Sized,
{
    from.validate()?;
    to.validate()?;
    tx.validate("transmitter")?;
    rx.validate("receiver")?;
    if params.terrain_samples < 2 {
        return Err(LinkBudgetError::InvalidInput(format!(
            "terrain sample count must be at least 2, got {}",
            params.terrain_samples
        )));
    }

    let distance = distance_km(from, to);
    if distance <= 0.0 {
        return Err(LinkBudgetError::InvalidInput(
            "transmitter and receiver are at the same location".to_string(),
        ));
    }

    let provider = FallbackProvider::new(provider, params.fallback_elevation_m);
    let profile = provider.profile(from, to, params.terrain_samples)?;
    let source = if profile.is_degraded() {
        TerrainSource::FlatFallback
    } else {
        TerrainSource::Modeled
    };

    let PathAssessment { clearance, budget } = assess_profile(&profile, distance, tx, rx, params)?;
    let quality = params.assess_quality(budget.link_margin_db, !clearance.obstructions.is_empty());
    let los_clear = line_of_sight_clear(&profile, tx.antenna_height_m, rx.antenna_height_m);

    counter!(metric_defs::LINK_COMPUTATIONS.name, "quality" => quality.as_str()).increment(1);
    histogram!(metric_defs::LINK_MARGIN.name).record(budget.link_margin_db);
    debug!(
        distance_km = distance,
        path_loss_db = budget.path_loss.total_db,
        margin_db = budget.link_margin_db,
        sf = %budget.spreading_factor,
        obstructions = clearance.obstructions.len(),
        terrain = %source,
        "Link budget computed"
    );

    let terrain = TerrainInfo {
        source,
        stats: profile.stats(),
        clearance,
        line_of_sight_clear: los_clear,
    };
    let recommendations = recommendations(&terrain, &budget, params);

    let report = LinkReport {
        path: PathInfo {
            from,
            to,
            tx_height_m: tx.antenna_height_m,
            rx_height_m: rx.antenna_height_m,
            distance_km: distance,
            bearing_deg: initial_bearing(from, to),
        },
        terrain,
        budget,
        quality,
        recommendations,
    };
    info!(
        distance_km = report.path.distance_km,
        margin_db = report.budget.link_margin_db,
        quality = report.quality.as_str(),
        "Link prediction complete"
    );
    Ok(report)
}

/// Suggestions derived from the terrain and the budget.
fn recommendations(
    terrain: &TerrainInfo,
    budget: &LinkBudgetResult,
    params: &LinkBudgetParams,
) -> Vec<String> {
    let mut out = Vec::new();

    if terrain.source == TerrainSource::FlatFallback {
        out.push(format!(
            "Terrain data was unavailable; results assume flat ground at {:.0} m",
            params.fallback_elevation_m
        ));
    }

    if let Some(worst) = terrain.clearance.worst_obstruction() {
        out.push(format!(
            "Terrain intrudes into the Fresnel zone at {} point(s); the worst is {:.1} m at {:.2} km. \
             Raise an antenna by at least {:.0} m",
            terrain.clearance.obstructions.len(),
            worst.obstruction_m,
            worst.distance_km,
            worst.obstruction_m.ceil()
        ));
    }
    if !terrain.line_of_sight_clear {
        out.push("No direct line of sight; expect the link to rely on diffraction".to_string());
    }

    let margin = budget.link_margin_db;
    if margin <= 0.0 {
        out.push(format!(
            "Link is {:.1} dB short; increase transmit power or antenna gain, or reduce feedline loss",
            -margin
        ));
    } else if margin < params.margin_good_db {
        out.push(format!(
            "Margin of {:.1} dB is thin; expect dropouts during fading",
            margin
        ));
    }

    out.push(format!(
        "Use {} on this path ({:.1} dBm sensitivity)",
        budget.spreading_factor, budget.rx_sensitivity_dbm
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::SpreadingFactor;
    use approx::assert_abs_diff_eq;
    use terralink_dem::{DemError, FlatTerrainProvider};
    use terralink_geo::destination_point;

    struct Offline;

    impl TerrainProfileProvider for Offline {
        fn profile(
            &self,
            _: GeoPoint,
            _: GeoPoint,
            _: usize,
        ) -> terralink_dem::Result<TerrainProfile> {
            Err(DemError::ProviderUnavailable("offline".into()))
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    fn endpoints(distance: f64) -> (GeoPoint, GeoPoint) {
        let from = GeoPoint { lat: 45.0, lng: -122.0 };
        (from, destination_point(from, 90.0, distance))
    }

    #[test]
    fn test_flat_10km() {
        let (from, to) = endpoints(10.0);
        let radio = RadioParams::default();
        let params = LinkBudgetParams::default();
        let report = calculate_link_budget(
            &FlatTerrainProvider::new(100.0),
            from,
            to,
            &radio,
            &radio,
            &params,
        )
        .unwrap();

        assert_abs_diff_eq!(report.path.distance_km, 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(report.path.bearing_deg, 90.0, epsilon = 0.1);
        assert_eq!(report.terrain.source, TerrainSource::Modeled);
        assert_eq!(report.terrain.stats.unwrap().sample_count, 64);
        assert!(report.terrain.line_of_sight_clear);

        // 10 m masts over 10 km intrude into 70% of the first Fresnel zone,
        // which costs the 10 dB terrain penalty but no diffraction loss.
        assert!(!report.terrain.clearance.obstructions.is_empty());
        assert_eq!(report.budget.path_loss.terrain_db, 10.0);
        assert_eq!(report.budget.path_loss.diffraction_db, 0.0);
        assert_abs_diff_eq!(report.budget.path_loss.total_db, 127.67, epsilon = 0.01);
        assert_abs_diff_eq!(report.budget.rx_signal_dbm, -95.67, epsilon = 0.01);
        assert_eq!(report.budget.spreading_factor, SpreadingFactor::Sf8);
        assert_abs_diff_eq!(report.link_margin_db(), 20.33, epsilon = 0.01);
        assert!(report.is_viable());
        assert_eq!(report.quality, LinkQuality::Marginal);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("Fresnel zone")));
    }

    #[test]
    fn test_provider_failure_uses_flat_fallback() {
        let (from, to) = endpoints(10.0);
        let radio = RadioParams::default();
        let report = calculate_link_budget(
            &Offline,
            from,
            to,
            &radio,
            &radio,
            &LinkBudgetParams::default(),
        )
        .unwrap();

        assert_eq!(report.terrain.source, TerrainSource::FlatFallback);
        assert!(report.terrain.clearance.has_adequate_clearance);
        assert_eq!(report.budget.path_loss.diffraction_db, 0.0);
        assert_eq!(report.budget.path_loss.terrain_db, 0.0);
        assert_eq!(report.terrain.stats.unwrap().sample_count, 2);
        assert!(report.recommendations[0].contains("flat ground at 100 m"));
    }

    #[test]
    fn test_invalid_inputs() {
        let radio = RadioParams::default();
        let params = LinkBudgetParams::default();
        let flat = FlatTerrainProvider::new(0.0);
        let (from, to) = endpoints(5.0);

        let bad = GeoPoint { lat: 91.0, lng: 0.0 };
        assert!(matches!(
            calculate_link_budget(&flat, bad, to, &radio, &radio, &params),
            Err(LinkBudgetError::Geo(_))
        ));
        assert!(matches!(
            calculate_link_budget(&flat, from, from, &radio, &radio, &params),
            Err(LinkBudgetError::InvalidInput(_))
        ));

        let silent = radio.clone().with_tx_power_w(0.0);
        assert!(matches!(
            calculate_link_budget(&flat, from, to, &silent, &radio, &params),
            Err(LinkBudgetError::InvalidInput(_))
        ));

        let sparse = LinkBudgetParams {
            terrain_samples: 1,
            ..params
        };
        assert!(matches!(
            calculate_link_budget(&flat, from, to, &radio, &radio, &sparse),
            Err(LinkBudgetError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_short_clear_link_is_excellent() {
        let (from, to) = endpoints(2.0);
        let radio = RadioParams::default();
        let report = calculate_link_budget(
            &FlatTerrainProvider::new(50.0),
            from,
            to,
            &radio,
            &radio,
            &LinkBudgetParams::default(),
        )
        .unwrap();
        assert!(report.terrain.clearance.has_adequate_clearance);
        assert_eq!(report.quality, LinkQuality::Excellent);
        assert!(report.budget.spreading_factor <= SpreadingFactor::Sf8);
    }

    #[test]
    fn test_assess_profile_matches_report() {
        let (from, to) = endpoints(6.0);
        let radio = RadioParams::default();
        let params = LinkBudgetParams::default();
        let flat = FlatTerrainProvider::new(20.0);
        let profile = flat.profile(from, to, params.terrain_samples).unwrap();
        let assessment =
            assess_profile(&profile, distance_km(from, to), &radio, &radio, &params).unwrap();
        let report = calculate_link_budget(&flat, from, to, &radio, &radio, &params).unwrap();
        assert_eq!(assessment.budget, report.budget);
        assert_eq!(assessment.clearance, report.terrain.clearance);
    }
}
