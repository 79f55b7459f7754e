//! LoRa link budget: path loss composition, spreading factor selection,
//! margin, reliability and quality classification.

use std::fmt;

use terralink_model::properties::{
    EndpointScope, PlannerScope, ResolvedProperties,
    // Radio properties
    RADIO_ANTENNA_GAIN_DBI, RADIO_ANTENNA_HEIGHT_M, RADIO_CABLE_LOSS_DB, RADIO_CONNECTOR_LOSS_DB,
    RADIO_FREQUENCY_HZ, RADIO_SENSITIVITY_SF10_DBM, RADIO_SENSITIVITY_SF11_DBM,
    RADIO_SENSITIVITY_SF12_DBM, RADIO_SENSITIVITY_SF7_DBM, RADIO_SENSITIVITY_SF8_DBM,
    RADIO_SENSITIVITY_SF9_DBM, RADIO_TX_POWER_W,
    // Link budget properties
    LINK_ENVIRONMENT, LINK_FADE_MARGIN_DB, LINK_MARGIN_EXCELLENT_DB, LINK_MARGIN_GOOD_DB,
    LINK_MARGIN_POOR_DB, LINK_TERRAIN_SAMPLES,
    // Used for the flat fallback profile
    ELEVATION_FALLBACK_M,
};
use tracing::warn;

use crate::propagation::{
    free_space_path_loss_db, knife_edge_diffraction_loss_db, wavelength_m, ClearanceAnalysis,
};
use crate::{LinkBudgetError, PropagationError};

// ============================================================================
// Power conversions
// ============================================================================

/// Convert watts to dBm.
pub fn watts_to_dbm(watts: f64) -> f64 {
    10.0 * (watts * 1000.0).log10()
}

/// Convert dBm to watts.
pub fn dbm_to_watts(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0) / 1000.0
}

// ============================================================================
// Spreading factor and environment
// ============================================================================

/// LoRa spreading factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum SpreadingFactor {
    Sf7,
    Sf8,
    Sf9,
    Sf10,
    Sf11,
    Sf12,
}

impl SpreadingFactor {
    /// All factors, fastest first.
    pub const ALL: [SpreadingFactor; 6] = [
        SpreadingFactor::Sf7,
        SpreadingFactor::Sf8,
        SpreadingFactor::Sf9,
        SpreadingFactor::Sf10,
        SpreadingFactor::Sf11,
        SpreadingFactor::Sf12,
    ];

    /// The numeric factor, 7 through 12.
    pub fn value(self) -> u8 {
        match self {
            SpreadingFactor::Sf7 => 7,
            SpreadingFactor::Sf8 => 8,
            SpreadingFactor::Sf9 => 9,
            SpreadingFactor::Sf10 => 10,
            SpreadingFactor::Sf11 => 11,
            SpreadingFactor::Sf12 => 12,
        }
    }

    /// Look up a factor by number.
    pub fn from_value(sf: u8) -> Option<Self> {
        Self::ALL.get(usize::from(sf.checked_sub(7)?)).copied()
    }

    fn index(self) -> usize {
        usize::from(self.value() - 7)
    }
}

impl fmt::Display for SpreadingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}", self.value())
    }
}

/// Deployment environment, scaling how far each spreading factor reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Environment {
    Rural,
    #[default]
    Suburban,
    Urban,
}

impl Environment {
    /// Parse an environment name. Unrecognized names are suburban.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "rural" => Environment::Rural,
            "suburban" => Environment::Suburban,
            "urban" => Environment::Urban,
            other => {
                warn!(environment = other, "Unknown environment, using suburban");
                Environment::Suburban
            }
        }
    }

    /// Range multiplier: effective distance is the real distance divided by this.
    pub fn range_multiplier(self) -> f64 {
        match self {
            Environment::Rural => 1.0,
            Environment::Suburban => 0.8,
            Environment::Urban => 0.6,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Rural => "rural",
            Environment::Suburban => "suburban",
            Environment::Urban => "urban",
        };
        f.write_str(name)
    }
}

/// Spreading factor suited to a path length in a given environment.
pub fn optimal_spreading_factor(distance_km: f64, environment: Environment) -> SpreadingFactor {
    let effective_km = distance_km / environment.range_multiplier();
    if effective_km < 2.0 {
        SpreadingFactor::Sf7
    } else if effective_km < 5.0 {
        SpreadingFactor::Sf8
    } else if effective_km < 10.0 {
        SpreadingFactor::Sf9
    } else if effective_km < 15.0 {
        SpreadingFactor::Sf10
    } else if effective_km < 25.0 {
        SpreadingFactor::Sf11
    } else {
        SpreadingFactor::Sf12
    }
}

/// Override the distance-based factor given a provisional margin.
///
/// Thin or negative margins push to slower factors; a very comfortable
/// margin allows a faster one.
pub fn adjust_spreading_factor(
    provisional_margin_db: f64,
    distance_factor: SpreadingFactor,
    distance_km: f64,
) -> SpreadingFactor {
    if provisional_margin_db < -10.0 {
        SpreadingFactor::Sf12
    } else if provisional_margin_db < -5.0 {
        SpreadingFactor::Sf11
    } else if provisional_margin_db < 0.0 {
        SpreadingFactor::Sf10
    } else if provisional_margin_db > 20.0 {
        if distance_km < 5.0 {
            SpreadingFactor::Sf7
        } else {
            SpreadingFactor::Sf8
        }
    } else {
        distance_factor
    }
}

// ============================================================================
// Radio and planner parameters
// ============================================================================

/// Receiver sensitivity per spreading factor, in dBm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensitivityTable {
    /// SF7 through SF12.
    pub dbm: [f64; 6],
}

impl Default for SensitivityTable {
    fn default() -> Self {
        Self {
            dbm: [-123.0, -126.0, -129.0, -132.0, -134.5, -137.0],
        }
    }
}

impl SensitivityTable {
    /// Sensitivity at `sf`.
    pub fn at(&self, sf: SpreadingFactor) -> f64 {
        self.dbm[sf.index()]
    }
}

/// One endpoint's radio.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RadioParams {
    /// Transmit power in watts.
    pub tx_power_w: f64,
    /// Antenna gain in dBi.
    pub antenna_gain_dbi: f64,
    /// Antenna height above local ground in meters.
    pub antenna_height_m: f64,
    /// Feedline loss in dB.
    pub cable_loss_db: f64,
    /// Connector loss in dB.
    pub connector_loss_db: f64,
    /// Carrier frequency in Hz.
    pub frequency_hz: f64,
    /// Receiver sensitivity per spreading factor.
    pub sensitivity: SensitivityTable,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self::from_properties(&ResolvedProperties::new())
    }
}

impl RadioParams {
    /// Read the `radio/*` properties of one endpoint.
    pub fn from_properties(props: &ResolvedProperties<EndpointScope>) -> Self {
        let frequency_hz: u64 = props.get(&RADIO_FREQUENCY_HZ);
        Self {
            tx_power_w: props.get(&RADIO_TX_POWER_W),
            antenna_gain_dbi: props.get(&RADIO_ANTENNA_GAIN_DBI),
            antenna_height_m: props.get(&RADIO_ANTENNA_HEIGHT_M),
            cable_loss_db: props.get(&RADIO_CABLE_LOSS_DB),
            connector_loss_db: props.get(&RADIO_CONNECTOR_LOSS_DB),
            frequency_hz: frequency_hz as f64,
            sensitivity: SensitivityTable {
                dbm: [
                    props.get(&RADIO_SENSITIVITY_SF7_DBM),
                    props.get(&RADIO_SENSITIVITY_SF8_DBM),
                    props.get(&RADIO_SENSITIVITY_SF9_DBM),
                    props.get(&RADIO_SENSITIVITY_SF10_DBM),
                    props.get(&RADIO_SENSITIVITY_SF11_DBM),
                    props.get(&RADIO_SENSITIVITY_SF12_DBM),
                ],
            },
        }
    }

    /// Reject radios the loss model cannot evaluate. `role` names the
    /// endpoint in the error message.
    pub fn validate(&self, role: &str) -> Result<(), LinkBudgetError> {
        if !self.tx_power_w.is_finite() || self.tx_power_w <= 0.0 {
            return Err(LinkBudgetError::InvalidInput(format!(
                "{} power must be positive, got {} W",
                role, self.tx_power_w
            )));
        }
        if !self.antenna_height_m.is_finite() || self.antenna_height_m < 0.0 {
            return Err(LinkBudgetError::InvalidInput(format!(
                "{} antenna height must be non-negative, got {} m",
                role, self.antenna_height_m
            )));
        }
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(LinkBudgetError::InvalidInput(format!(
                "{} frequency must be positive, got {} Hz",
                role, self.frequency_hz
            )));
        }
        Ok(())
    }

    /// Same radio at a different transmit power.
    pub fn with_tx_power_w(mut self, watts: f64) -> Self {
        self.tx_power_w = watts;
        self
    }

    /// Effective isotropic radiated power in dBm.
    pub fn eirp_dbm(&self) -> f64 {
        watts_to_dbm(self.tx_power_w) + self.antenna_gain_dbi
            - self.cable_loss_db
            - self.connector_loss_db
    }

    /// Gain of the receive chain in dB (antenna gain minus feed losses).
    pub fn receive_gain_db(&self) -> f64 {
        self.antenna_gain_dbi - self.cable_loss_db - self.connector_loss_db
    }
}

/// Planner-wide link budget settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkBudgetParams {
    /// Margin reserved for fading, subtracted from every link margin.
    pub fade_margin_db: f64,
    /// Environment used for spreading factor selection.
    pub environment: Environment,
    /// Terrain samples per point-to-point profile.
    pub terrain_samples: usize,
    /// Elevation assumed when terrain is unavailable.
    pub fallback_elevation_m: f64,
    /// Minimum margin rated excellent.
    pub margin_excellent_db: f64,
    /// Minimum margin rated good.
    pub margin_good_db: f64,
    /// Margins below this are rated poor.
    pub margin_poor_db: f64,
}

impl Default for LinkBudgetParams {
    fn default() -> Self {
        Self::from_properties(&ResolvedProperties::new())
    }
}

impl LinkBudgetParams {
    /// Read the `link/*` properties and the fallback elevation.
    pub fn from_properties(props: &ResolvedProperties<PlannerScope>) -> Self {
        let environment: String = props.get(&LINK_ENVIRONMENT);
        Self {
            fade_margin_db: props.get(&LINK_FADE_MARGIN_DB),
            environment: Environment::parse(&environment),
            terrain_samples: props.get(&LINK_TERRAIN_SAMPLES),
            fallback_elevation_m: props.get(&ELEVATION_FALLBACK_M),
            margin_excellent_db: props.get(&LINK_MARGIN_EXCELLENT_DB),
            margin_good_db: props.get(&LINK_MARGIN_GOOD_DB),
            margin_poor_db: props.get(&LINK_MARGIN_POOR_DB),
        }
    }

    /// Classify a margin with the configured thresholds.
    pub fn assess_quality(&self, margin_db: f64, has_obstructions: bool) -> LinkQuality {
        if margin_db < self.margin_poor_db {
            LinkQuality::Poor
        } else if margin_db < self.margin_good_db || has_obstructions {
            LinkQuality::Marginal
        } else if margin_db < self.margin_excellent_db {
            LinkQuality::Good
        } else {
            LinkQuality::Excellent
        }
    }
}

// ============================================================================
// Path loss
// ============================================================================

/// Components of the total path loss, all in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathLossBreakdown {
    pub free_space_db: f64,
    pub diffraction_db: f64,
    /// Penalty for paths crossing more than one obstruction.
    pub terrain_db: f64,
    /// Distance-based allowance for vegetation.
    pub foliage_db: f64,
    pub total_db: f64,
}

/// Extra loss for rough paths: 2 dB per obstruction, capped at 10 dB,
/// applied only when there is more than one.
pub fn terrain_penalty_db(obstruction_count: usize) -> f64 {
    if obstruction_count > 1 {
        (2.0 * obstruction_count as f64).min(10.0)
    } else {
        0.0
    }
}

/// Vegetation allowance by path length.
pub fn foliage_loss_db(distance_km: f64) -> f64 {
    if distance_km < 1.0 {
        0.0
    } else if distance_km < 5.0 {
        3.0
    } else {
        6.0
    }
}

/// Combine free-space, diffraction, terrain and foliage losses for a path.
///
/// Diffraction is computed for the worst obstruction only.
pub fn compute_path_loss(
    distance_km: f64,
    clearance: &ClearanceAnalysis,
    frequency_hz: f64,
) -> Result<PathLossBreakdown, PropagationError> {
    let free_space_db = free_space_path_loss_db(distance_km, frequency_hz)?;
    let diffraction_db = clearance
        .worst_obstruction()
        .map(|o| {
            knife_edge_diffraction_loss_db(
                o.obstruction_m,
                o.distance_km,
                (distance_km - o.distance_km).max(0.0),
                wavelength_m(frequency_hz),
            )
        })
        .unwrap_or(0.0);
    let terrain_db = terrain_penalty_db(clearance.obstructions.len());
    let foliage_db = foliage_loss_db(distance_km);

    Ok(PathLossBreakdown {
        free_space_db,
        diffraction_db,
        terrain_db,
        foliage_db,
        total_db: free_space_db + diffraction_db + terrain_db + foliage_db,
    })
}

// ============================================================================
// Budget
// ============================================================================

/// Outcome of [`compute_link_budget`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkBudgetResult {
    pub tx_power_dbm: f64,
    pub eirp_dbm: f64,
    pub path_loss: PathLossBreakdown,
    pub rx_signal_dbm: f64,
    /// Spreading factor the link should use.
    pub spreading_factor: SpreadingFactor,
    /// Sensitivity at the chosen spreading factor.
    pub rx_sensitivity_dbm: f64,
    pub fade_margin_db: f64,
    /// Received signal minus sensitivity minus fade margin.
    pub link_margin_db: f64,
    pub reliability_percent: f64,
    pub is_viable: bool,
}

/// Compute the budget for a path whose loss is already known.
///
/// The spreading factor is chosen in two passes. A provisional margin is
/// computed at the distance-based factor, then [`adjust_spreading_factor`]
/// picks the final factor and the margin is recomputed at its sensitivity.
pub fn compute_link_budget(
    tx: &RadioParams,
    rx: &RadioParams,
    distance_km: f64,
    path_loss: &PathLossBreakdown,
    fade_margin_db: f64,
    environment: Environment,
) -> LinkBudgetResult {
    let tx_power_dbm = watts_to_dbm(tx.tx_power_w);
    let eirp_dbm = tx.eirp_dbm();
    let rx_signal_dbm = eirp_dbm - path_loss.total_db + rx.receive_gain_db();

    let distance_factor = optimal_spreading_factor(distance_km, environment);
    let provisional_margin =
        rx_signal_dbm - rx.sensitivity.at(distance_factor) - fade_margin_db;
    let spreading_factor = adjust_spreading_factor(provisional_margin, distance_factor, distance_km);

    let rx_sensitivity_dbm = rx.sensitivity.at(spreading_factor);
    let link_margin_db = rx_signal_dbm - rx_sensitivity_dbm - fade_margin_db;

    LinkBudgetResult {
        tx_power_dbm,
        eirp_dbm,
        path_loss: *path_loss,
        rx_signal_dbm,
        spreading_factor,
        rx_sensitivity_dbm,
        fade_margin_db,
        link_margin_db,
        reliability_percent: reliability_percent(link_margin_db),
        is_viable: link_margin_db > 0.0,
    }
}

/// Rough delivery probability for a margin, in percent.
///
/// Piecewise linear. The curve is not continuous: it climbs toward 100 just
/// below a margin of 0, restarts at 90, and is capped at 99.9 from 20 dB.
pub fn reliability_percent(margin_db: f64) -> f64 {
    if margin_db < -10.0 {
        0.0
    } else if margin_db < 0.0 {
        50.0 + (margin_db + 10.0) * 5.0
    } else if margin_db < 20.0 {
        90.0 + margin_db * 0.5
    } else {
        99.9
    }
}

// ============================================================================
// Quality
// ============================================================================

/// Qualitative link rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinkQuality {
    Poor,
    Marginal,
    Good,
    Excellent,
}

impl LinkQuality {
    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            LinkQuality::Excellent => "Excellent (>= 15 dB margin, clear path)",
            LinkQuality::Good => "Good (5-15 dB margin, clear path)",
            LinkQuality::Marginal => "Marginal (thin margin or obstructed path)",
            LinkQuality::Poor => "Poor (< -5 dB margin)",
        }
    }

    /// Label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkQuality::Excellent => "excellent",
            LinkQuality::Good => "good",
            LinkQuality::Marginal => "marginal",
            LinkQuality::Poor => "poor",
        }
    }
}

impl fmt::Display for LinkQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Classify a margin with the default thresholds (-5, 5 and 15 dB).
///
/// Any obstruction caps the rating at marginal, unless the margin is
/// already poor.
pub fn assess_quality(margin_db: f64, has_obstructions: bool) -> LinkQuality {
    LinkBudgetParams::default().assess_quality(margin_db, has_obstructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::{Obstruction, LORA_FREQUENCY_HZ};
    use approx::assert_abs_diff_eq;
    use terralink_model::properties::PropertyValue;

    fn clear() -> ClearanceAnalysis {
        ClearanceAnalysis {
            has_adequate_clearance: true,
            min_clearance: Some(1.0),
            obstructions: Vec::new(),
            required_clearance_fraction: 0.7,
        }
    }

    fn obstructed(count: usize) -> ClearanceAnalysis {
        ClearanceAnalysis {
            has_adequate_clearance: count == 0,
            min_clearance: Some(0.1),
            obstructions: (0..count)
                .map(|i| Obstruction {
                    distance_km: 1.0 + i as f64,
                    terrain_elevation_m: 120.0,
                    required_height_m: 115.0 - i as f64,
                    obstruction_m: 5.0 + i as f64,
                    fresnel_radius_m: 20.0,
                })
                .collect(),
            required_clearance_fraction: 0.7,
        }
    }

    #[test]
    fn test_power_conversions() {
        assert_abs_diff_eq!(watts_to_dbm(1.0), 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(watts_to_dbm(0.1), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dbm_to_watts(30.0), 1.0, epsilon = 1e-12);
        for w in [0.001, 0.025, 0.15, 0.5, 1.0, 4.0] {
            assert_abs_diff_eq!(dbm_to_watts(watts_to_dbm(w)), w, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spreading_factor_values() {
        assert_eq!(SpreadingFactor::Sf7.value(), 7);
        assert_eq!(SpreadingFactor::from_value(11), Some(SpreadingFactor::Sf11));
        assert_eq!(SpreadingFactor::from_value(6), None);
        assert_eq!(SpreadingFactor::from_value(13), None);
        assert_eq!(SpreadingFactor::Sf12.to_string(), "SF12");
    }

    #[test]
    fn test_optimal_spreading_factor() {
        use SpreadingFactor::*;
        let rural = [(1.9, Sf7), (2.0, Sf8), (6.0, Sf9), (12.0, Sf10), (20.0, Sf11), (30.0, Sf12)];
        for (d, sf) in rural {
            assert_eq!(optimal_spreading_factor(d, Environment::Rural), sf, "d={}", d);
        }
        // Suburban: 10 km acts like 12.5 km
        assert_eq!(optimal_spreading_factor(10.0, Environment::Suburban), Sf10);
        // Urban: 3 km acts like 5 km
        assert_eq!(optimal_spreading_factor(3.0, Environment::Urban), Sf9);
    }

    #[test]
    fn test_optimal_spreading_factor_monotonic() {
        for env in [Environment::Rural, Environment::Suburban, Environment::Urban] {
            let mut last = SpreadingFactor::Sf7;
            for i in 0..400 {
                let sf = optimal_spreading_factor(i as f64 * 0.1, env);
                assert!(sf >= last);
                last = sf;
            }
        }
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("Rural"), Environment::Rural);
        assert_eq!(Environment::parse("urban"), Environment::Urban);
        assert_eq!(Environment::parse("desert"), Environment::Suburban);
    }

    #[test]
    fn test_adjust_spreading_factor() {
        use SpreadingFactor::*;
        assert_eq!(adjust_spreading_factor(-11.0, Sf7, 1.0), Sf12);
        assert_eq!(adjust_spreading_factor(-6.0, Sf7, 1.0), Sf11);
        assert_eq!(adjust_spreading_factor(-0.5, Sf7, 1.0), Sf10);
        assert_eq!(adjust_spreading_factor(10.0, Sf9, 8.0), Sf9);
        assert_eq!(adjust_spreading_factor(25.0, Sf9, 4.0), Sf7);
        assert_eq!(adjust_spreading_factor(25.0, Sf11, 18.0), Sf8);
        // Negative margin overrides even a slower distance factor
        assert_eq!(adjust_spreading_factor(-1.0, Sf12, 30.0), Sf10);
    }

    #[test]
    fn test_terrain_penalty() {
        assert_eq!(terrain_penalty_db(0), 0.0);
        assert_eq!(terrain_penalty_db(1), 0.0);
        assert_eq!(terrain_penalty_db(2), 4.0);
        assert_eq!(terrain_penalty_db(4), 8.0);
        assert_eq!(terrain_penalty_db(9), 10.0);
    }

    #[test]
    fn test_foliage() {
        assert_eq!(foliage_loss_db(0.5), 0.0);
        assert_eq!(foliage_loss_db(1.0), 3.0);
        assert_eq!(foliage_loss_db(4.9), 3.0);
        assert_eq!(foliage_loss_db(5.0), 6.0);
    }

    #[test]
    fn test_path_loss_clear_path() {
        let loss = compute_path_loss(10.0, &clear(), LORA_FREQUENCY_HZ).unwrap();
        assert_abs_diff_eq!(loss.free_space_db, 111.67, epsilon = 0.01);
        assert_eq!(loss.diffraction_db, 0.0);
        assert_eq!(loss.terrain_db, 0.0);
        assert_eq!(loss.foliage_db, 6.0);
        assert_abs_diff_eq!(loss.total_db, loss.free_space_db + 6.0);
    }

    #[test]
    fn test_path_loss_obstructed() {
        let loss = compute_path_loss(10.0, &obstructed(3), LORA_FREQUENCY_HZ).unwrap();
        assert_eq!(loss.terrain_db, 6.0);
        assert!(loss.diffraction_db >= 0.0);
        assert_abs_diff_eq!(
            loss.total_db,
            loss.free_space_db + loss.diffraction_db + 6.0 + 6.0,
            epsilon = 1e-9
        );
        // Never less than a clear path of the same length
        let clear_loss = compute_path_loss(10.0, &clear(), LORA_FREQUENCY_HZ).unwrap();
        assert!(loss.total_db >= clear_loss.total_db);
    }

    #[test]
    fn test_path_loss_zero_distance() {
        assert!(compute_path_loss(0.0, &clear(), LORA_FREQUENCY_HZ).is_err());
    }

    #[test]
    fn test_default_radio() {
        let radio = RadioParams::default();
        assert_eq!(radio.tx_power_w, 1.0);
        assert_eq!(radio.frequency_hz, 915e6);
        assert_eq!(radio.sensitivity, SensitivityTable::default());
        // 30 dBm + 3 dBi - 1.5 dB - 0.5 dB
        assert_abs_diff_eq!(radio.eirp_dbm(), 31.0, epsilon = 1e-9);
        assert_abs_diff_eq!(radio.receive_gain_db(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_radio_validate() {
        assert!(RadioParams::default().validate("transmitter").is_ok());

        let silent = RadioParams::default().with_tx_power_w(0.0);
        assert!(matches!(
            silent.validate("transmitter"),
            Err(LinkBudgetError::InvalidInput(_))
        ));

        let buried = RadioParams {
            antenna_height_m: -1.0,
            ..RadioParams::default()
        };
        assert!(buried.validate("receiver").is_err());

        let dc = RadioParams {
            frequency_hz: 0.0,
            ..RadioParams::default()
        };
        let err = dc.validate("receiver").unwrap_err();
        assert!(err.to_string().contains("receiver frequency"));
    }

    #[test]
    fn test_radio_from_properties() {
        let mut props: ResolvedProperties<EndpointScope> = ResolvedProperties::new();
        props.set(&RADIO_TX_POWER_W, 0.25).unwrap();
        props
            .set_by_name("radio/sensitivity_sf12_dbm", PropertyValue::Float(-140.0))
            .unwrap();
        let radio = RadioParams::from_properties(&props);
        assert_eq!(radio.tx_power_w, 0.25);
        assert_eq!(radio.sensitivity.at(SpreadingFactor::Sf12), -140.0);
        assert_eq!(radio.sensitivity.at(SpreadingFactor::Sf7), -123.0);
    }

    #[test]
    fn test_budget_clear_10km() {
        let radio = RadioParams::default();
        let loss = compute_path_loss(10.0, &clear(), LORA_FREQUENCY_HZ).unwrap();
        let budget = compute_link_budget(&radio, &radio, 10.0, &loss, 10.0, Environment::Suburban);

        // 31 - 117.67 + 1 = -85.67 dBm
        assert_abs_diff_eq!(budget.rx_signal_dbm, -85.67, epsilon = 0.01);
        assert_abs_diff_eq!(budget.eirp_dbm, 31.0, epsilon = 1e-9);
        assert_abs_diff_eq!(budget.tx_power_dbm, 30.0, epsilon = 1e-9);
        // Provisional margin at SF10 is ~36 dB, so the faster SF8 is chosen
        assert_eq!(budget.spreading_factor, SpreadingFactor::Sf8);
        assert_eq!(budget.rx_sensitivity_dbm, -126.0);
        assert_abs_diff_eq!(budget.link_margin_db, 30.33, epsilon = 0.01);
        assert!(budget.is_viable);
        assert_eq!(budget.reliability_percent, 99.9);
    }

    #[test]
    fn test_budget_weak_link_moves_to_slow_factor() {
        let radio = RadioParams::default().with_tx_power_w(0.001);
        let loss = PathLossBreakdown {
            free_space_db: 140.0,
            diffraction_db: 0.0,
            terrain_db: 0.0,
            foliage_db: 6.0,
            total_db: 146.0,
        };
        let budget = compute_link_budget(&radio, &radio, 30.0, &loss, 10.0, Environment::Rural);
        // 0 + 1 - 146 + 1 = -144 dBm; provisional at SF12: -144 + 137 - 10 = -17
        assert_eq!(budget.spreading_factor, SpreadingFactor::Sf12);
        assert_abs_diff_eq!(budget.link_margin_db, -17.0, epsilon = 1e-9);
        assert!(!budget.is_viable);
        assert_eq!(budget.reliability_percent, 0.0);
    }

    #[test]
    fn test_viability_matches_margin_sign() {
        let radio = RadioParams::default();
        for total in [120.0, 140.0, 150.0, 155.0, 160.0, 170.0] {
            let loss = PathLossBreakdown {
                free_space_db: total,
                diffraction_db: 0.0,
                terrain_db: 0.0,
                foliage_db: 0.0,
                total_db: total,
            };
            let budget = compute_link_budget(&radio, &radio, 12.0, &loss, 10.0, Environment::Rural);
            assert_eq!(budget.is_viable, budget.link_margin_db > 0.0);
        }
    }

    #[test]
    fn test_reliability() {
        assert_eq!(reliability_percent(-20.0), 0.0);
        assert_eq!(reliability_percent(-10.001), 0.0);
        assert_eq!(reliability_percent(-10.0), 50.0);
        assert_eq!(reliability_percent(-5.0), 75.0);
        assert_eq!(reliability_percent(5.0), 92.5);
        assert_eq!(reliability_percent(10.0), 95.0);
        assert_eq!(reliability_percent(20.0), 99.9);
        assert_eq!(reliability_percent(100.0), 99.9);
    }

    #[test]
    fn test_reliability_steps_down_at_zero() {
        assert_abs_diff_eq!(reliability_percent(-0.001), 99.995, epsilon = 1e-9);
        assert_eq!(reliability_percent(0.0), 90.0);
        for i in -300..600 {
            let r = reliability_percent(i as f64 * 0.1);
            assert!((0.0..=100.0).contains(&r));
        }
    }

    #[test]
    fn test_quality() {
        assert_eq!(assess_quality(-6.0, false), LinkQuality::Poor);
        assert_eq!(assess_quality(-6.0, true), LinkQuality::Poor);
        assert_eq!(assess_quality(-5.0, false), LinkQuality::Marginal);
        assert_eq!(assess_quality(4.9, false), LinkQuality::Marginal);
        assert_eq!(assess_quality(5.0, false), LinkQuality::Good);
        assert_eq!(assess_quality(14.9, false), LinkQuality::Good);
        assert_eq!(assess_quality(15.0, false), LinkQuality::Excellent);
        // Obstructions cap the rating
        assert_eq!(assess_quality(30.0, true), LinkQuality::Marginal);
    }

    #[test]
    fn test_quality_thresholds_from_properties() {
        let mut props: ResolvedProperties<PlannerScope> = ResolvedProperties::new();
        props.set(&LINK_MARGIN_EXCELLENT_DB, 25.0).unwrap();
        props.set(&LINK_ENVIRONMENT, "rural".to_string()).unwrap();
        let params = LinkBudgetParams::from_properties(&props);
        assert_eq!(params.environment, Environment::Rural);
        assert_eq!(params.assess_quality(20.0, false), LinkQuality::Good);
        assert_eq!(params.assess_quality(25.0, false), LinkQuality::Excellent);
    }

    #[test]
    fn test_quality_display() {
        assert_eq!(LinkQuality::Good.as_str(), "good");
        assert!(LinkQuality::Poor.to_string().starts_with("Poor"));
        assert!(LinkQuality::Excellent > LinkQuality::Good);
    }
}
