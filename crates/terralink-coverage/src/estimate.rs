//! Closed-form coverage estimates used when ray marching is not possible.

use terralink_geo::{destination_point, GeoPoint};

use crate::{CoveragePoint, PointSource};

/// Estimated radius of a 1 W transmitter over average terrain, km.
pub const REFERENCE_RADIUS_KM: f64 = 5.0;

/// Reference power for [`REFERENCE_RADIUS_KM`], W.
pub const REFERENCE_POWER_W: f64 = 1.0;

/// Number of vertices of the synthesized fallback polygon.
pub const FALLBACK_POLYGON_POINTS: usize = 12;

/// Closed-form coverage radius in km, clamped to `max_range_km`.
///
/// Free-space range scales with the square root of power, so the radius is
/// `5 km · sqrt(P / 1 W) · terrain_factor`.
pub fn estimate_coverage_radius(power_w: f64, terrain_factor: f64, max_range_km: f64) -> f64 {
    let radius = REFERENCE_RADIUS_KM * (power_w / REFERENCE_POWER_W).sqrt() * terrain_factor;
    if radius.is_finite() {
        radius.clamp(0.0, max_range_km)
    } else {
        0.0
    }
}

/// A regular polygon of [`FALLBACK_POLYGON_POINTS`] vertices around `origin`.
pub fn fallback_polygon(origin: GeoPoint, radius_km: f64) -> Vec<CoveragePoint> {
    let step = 360.0 / FALLBACK_POLYGON_POINTS as f64;
    (0..FALLBACK_POLYGON_POINTS)
        .map(|i| {
            let bearing = i as f64 * step;
            CoveragePoint::new(
                origin,
                bearing,
                radius_km,
                None,
                PointSource::Fallback,
            )
        })
        .collect()
}

/// A point on `bearing_deg` at `distance_km` from `origin`.
pub(crate) fn point_at(origin: GeoPoint, bearing_deg: f64, distance_km: f64) -> GeoPoint {
    destination_point(origin, bearing_deg, distance_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use terralink_geo::distance_km;

    #[test]
    fn test_radius_scales_with_power() {
        assert_abs_diff_eq!(estimate_coverage_radius(1.0, 1.0, 50.0), 5.0);
        assert_abs_diff_eq!(estimate_coverage_radius(4.0, 1.0, 50.0), 10.0);
        assert_abs_diff_eq!(estimate_coverage_radius(1.0, 0.5, 50.0), 2.5);
        assert_abs_diff_eq!(estimate_coverage_radius(16.0, 1.0, 12.0), 12.0);
        assert_eq!(estimate_coverage_radius(-1.0, 1.0, 12.0), 0.0);
    }

    #[test]
    fn test_fallback_polygon() {
        let origin = GeoPoint { lat: 40.0, lng: -105.0 };
        let polygon = fallback_polygon(origin, 2.0);
        assert_eq!(polygon.len(), FALLBACK_POLYGON_POINTS);
        for (i, p) in polygon.iter().enumerate() {
            assert_abs_diff_eq!(p.bearing_deg, i as f64 * 30.0);
            assert_eq!(p.source, PointSource::Fallback);
            assert_abs_diff_eq!(
                distance_km(origin, GeoPoint { lat: p.lat, lng: p.lng }),
                2.0,
                epsilon = 1e-6
            );
        }
    }
}
