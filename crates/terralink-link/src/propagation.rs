//! Propagation primitives: free-space loss, Fresnel zones, earth bulge and
//! knife-edge diffraction, plus clearance analysis of a terrain profile.
//!
//! Distances are kilometers at the API boundary; heights and radii are meters.

use terralink_dem::TerrainProfile;
use terralink_geo::EARTH_RADIUS_M;

use crate::PropagationError;

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// The LoRa ISM carrier this model is tuned for.
pub const LORA_FREQUENCY_HZ: f64 = 915e6;

/// Wavelength at [`LORA_FREQUENCY_HZ`], about 0.3276 m.
pub const LORA_WAVELENGTH_M: f64 = SPEED_OF_LIGHT_M_S / LORA_FREQUENCY_HZ;

/// Wavelength in meters for a carrier frequency in Hz.
pub fn wavelength_m(frequency_hz: f64) -> f64 {
    SPEED_OF_LIGHT_M_S / frequency_hz
}

// ============================================================================
// Point formulas
// ============================================================================

/// Free-space path loss in dB (ITU form, distance in km, frequency in MHz).
///
/// `20·log10(d_km) + 20·log10(f_MHz) + 32.44`
pub fn free_space_path_loss_db(
    distance_km: f64,
    frequency_hz: f64,
) -> Result<f64, PropagationError> {
    if distance_km.is_nan() || distance_km <= 0.0 {
        return Err(PropagationError::NonPositiveDistance(distance_km));
    }
    let frequency_mhz = frequency_hz / 1e6;
    Ok(20.0 * distance_km.log10() + 20.0 * frequency_mhz.log10() + 32.44)
}

/// Radius in meters of Fresnel zone `zone` at a point `d1_km` from one end
/// and `d2_km` from the other. Zero at either endpoint.
pub fn fresnel_radius_m(d1_km: f64, d2_km: f64, wavelength_m: f64, zone: u32) -> f64 {
    let d1 = d1_km * 1000.0;
    let d2 = d2_km * 1000.0;
    let total = d1 + d2;
    if total <= 0.0 || d1 <= 0.0 || d2 <= 0.0 {
        return 0.0;
    }
    (zone as f64 * wavelength_m * d1 * d2 / total).sqrt()
}

/// Earth bulge in meters at `fraction` of a path of `total_km`, on a sphere
/// of radius [`EARTH_RADIUS_M`]. Zero at both ends, largest at mid-path.
pub fn earth_curvature_m(total_km: f64, fraction: f64) -> f64 {
    let d1 = total_km * fraction * 1000.0;
    let d2 = total_km * (1.0 - fraction) * 1000.0;
    (d1 * d2) / (2.0 * EARTH_RADIUS_M)
}

/// Fraction of the first Fresnel zone that must be clear.
///
/// Short hops get away with less clearance than long ones.
pub fn required_fresnel_clearance_fraction(distance_km: f64) -> f64 {
    if distance_km < 5.0 {
        0.6
    } else if distance_km < 15.0 {
        0.7
    } else {
        0.8
    }
}

/// Single knife-edge diffraction loss in dB, never negative.
///
/// `obstacle_height_m` is the obstacle's height relative to the reference
/// line, `d1_km` and `d2_km` its distances to the path ends. The loss is a
/// piecewise function of the Fresnel-Kirchhoff parameter `v`; with the
/// clamp, only obstacles well below the line (`-2.4 < v < -0.806`) cost
/// anything.
pub fn knife_edge_diffraction_loss_db(
    obstacle_height_m: f64,
    d1_km: f64,
    d2_km: f64,
    wavelength_m: f64,
) -> f64 {
    let d1 = d1_km * 1000.0;
    let d2 = d2_km * 1000.0;
    if d1 <= 0.0 || d2 <= 0.0 || wavelength_m <= 0.0 {
        return 0.0;
    }
    let v = obstacle_height_m * (2.0 * (d1 + d2) / (wavelength_m * d1 * d2)).sqrt();

    let loss = if v <= -2.4 {
        0.0
    } else if v <= 0.0 {
        20.0 * (0.5 - 0.62 * v).log10()
    } else if v <= 2.4 {
        20.0 * (0.5 * (-0.95 * v).exp()).log10()
    } else {
        let radicand = (0.1184 - (0.38 - 0.1 * v).powi(2)).max(0.0);
        20.0 * (0.4 - radicand.sqrt()).log10()
    };

    if loss.is_finite() {
        loss.max(0.0)
    } else {
        0.0
    }
}

// ============================================================================
// Clearance analysis
// ============================================================================

/// A profile sample that intrudes into the required Fresnel clearance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstruction {
    /// Distance from the transmitter.
    pub distance_km: f64,
    /// Ground elevation of the sample.
    pub terrain_elevation_m: f64,
    /// Clearance floor: sight line minus earth bulge minus the required
    /// share of the Fresnel radius.
    pub required_height_m: f64,
    /// How far the ground rises above the clearance floor, always positive.
    pub obstruction_m: f64,
    /// First Fresnel zone radius at the sample.
    pub fresnel_radius_m: f64,
}

/// Result of [`analyze_clearance`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClearanceAnalysis {
    /// No interior sample intrudes into the required clearance.
    pub has_adequate_clearance: bool,
    /// Smallest clearance ratio over interior samples.
    ///
    /// `None` when the profile has no interior samples.
    pub min_clearance: Option<f64>,
    /// Intruding samples in path order.
    pub obstructions: Vec<Obstruction>,
    /// Fraction of the first Fresnel zone that was required.
    pub required_clearance_fraction: f64,
}

impl ClearanceAnalysis {
    /// The obstruction rising highest into the clearance zone.
    pub fn worst_obstruction(&self) -> Option<&Obstruction> {
        self.obstructions
            .iter()
            .max_by(|a, b| a.obstruction_m.total_cmp(&b.obstruction_m))
    }
}

/// Check every interior sample of `profile` against the first Fresnel zone.
///
/// The sight line runs from the transmitter ground plus `tx_height_m` to the
/// receiver ground plus `rx_height_m`. At each interior sample the clearance
/// floor is the sight line minus earth bulge minus the required fraction of
/// the Fresnel radius. Ground above that floor is an obstruction. The
/// endpoints are never tested.
pub fn analyze_clearance(
    profile: &TerrainProfile,
    tx_height_m: f64,
    rx_height_m: f64,
    total_distance_km: f64,
    wavelength_m: f64,
) -> Result<ClearanceAnalysis, PropagationError> {
    let samples = profile.samples();
    if samples.len() < 2 {
        return Err(PropagationError::DegenerateProfile(samples.len()));
    }
    if total_distance_km.is_nan() || total_distance_km <= 0.0 {
        return Err(PropagationError::ZeroPathLength);
    }

    let required = required_fresnel_clearance_fraction(total_distance_km);
    let tx_top = samples[0].elevation_m + tx_height_m;
    let rx_top = samples[samples.len() - 1].elevation_m + rx_height_m;

    let mut obstructions = Vec::new();
    let mut min_clearance: Option<f64> = None;

    for sample in &samples[1..samples.len() - 1] {
        let fraction = (sample.distance_km / total_distance_km).clamp(0.0, 1.0);
        let los_m = tx_top + (rx_top - tx_top) * fraction;
        let bulge_m = earth_curvature_m(total_distance_km, fraction);
        let d1 = sample.distance_km;
        let d2 = (total_distance_km - d1).max(0.0);
        let fresnel_m = fresnel_radius_m(d1, d2, wavelength_m, 1);

        let clearance_m = los_m - bulge_m - sample.elevation_m;
        let ratio = if fresnel_m > 0.0 {
            clearance_m / fresnel_m
        } else {
            // Degenerate zone: any clearance counts as full.
            clearance_m.signum() * f64::INFINITY
        };
        if ratio.is_finite() {
            min_clearance = Some(min_clearance.map_or(ratio, |m| m.min(ratio)));
        }

        let required_height_m = los_m - bulge_m - fresnel_m * required;
        let obstruction_m = sample.elevation_m - required_height_m;
        if obstruction_m > 0.0 {
            obstructions.push(Obstruction {
                distance_km: sample.distance_km,
                terrain_elevation_m: sample.elevation_m,
                required_height_m,
                obstruction_m,
                fresnel_radius_m: fresnel_m,
            });
        }
    }

    Ok(ClearanceAnalysis {
        has_adequate_clearance: obstructions.is_empty(),
        min_clearance,
        obstructions,
        required_clearance_fraction: required,
    })
}

/// Whether the geometric sight line clears the bulged ground everywhere.
///
/// Ignores the Fresnel zone. Profiles with fewer than three samples have no
/// interior and are always clear.
pub fn line_of_sight_clear(profile: &TerrainProfile, tx_height_m: f64, rx_height_m: f64) -> bool {
    let samples = profile.samples();
    if samples.len() < 3 {
        return true;
    }
    let total = profile.total_distance_km();
    if total <= 0.0 {
        return true;
    }
    let tx_top = samples[0].elevation_m + tx_height_m;
    let rx_top = samples[samples.len() - 1].elevation_m + rx_height_m;

    samples[1..samples.len() - 1].iter().all(|s| {
        let fraction = (s.distance_km / total).clamp(0.0, 1.0);
        let los_m = tx_top + (rx_top - tx_top) * fraction;
        s.elevation_m + earth_curvature_m(total, fraction) <= los_m
    })
}
