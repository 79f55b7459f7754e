//! Great-circle distance, direct geodesic, and path interpolation.

use crate::{GeoPoint, EARTH_RADIUS_KM};

/// Below this central angle (radians) two points are treated as coincident.
const COINCIDENT_ANGLE_RAD: f64 = 1e-12;

/// Within this many radians of pi two points are treated as antipodal.
const ANTIPODAL_MARGIN_RAD: f64 = 1e-9;

/// Central angle between two points in radians (haversine form).
pub fn central_angle(a: GeoPoint, b: GeoPoint) -> f64 {
    let delta_lat = b.lat_rad() - a.lat_rad();
    let delta_lng = b.lng_rad() - a.lng_rad();

    let h = (delta_lat / 2.0).sin().powi(2)
        + a.lat_rad().cos() * b.lat_rad().cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h slightly outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance between two points in kilometers.
///
/// Symmetric in its arguments and zero for identical points.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    EARTH_RADIUS_KM * central_angle(a, b)
}

/// Project a point `distance_km` along `bearing_deg` from `origin`.
///
/// Uses the spherical direct geodesic formula. The bearing is measured
/// clockwise from true north; values outside `[0, 360)` are accepted and
/// wrap naturally. The returned longitude is normalized to `[-180, 180)`.
pub fn destination_point(origin: GeoPoint, bearing_deg: f64, distance_km: f64) -> GeoPoint {
    let delta = distance_km / EARTH_RADIUS_KM;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.lat_rad();
    let lng1 = origin.lng_rad();

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lng2 = lng1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoPoint {
        lat: lat2.to_degrees(),
        lng: normalize_longitude(lng2.to_degrees()),
    }
}

/// Initial bearing from `from` towards `to`, in degrees `[0, 360)`.
///
/// Returns 0 for coincident points.
pub fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    if central_angle(from, to) < COINCIDENT_ANGLE_RAD {
        return 0.0;
    }
    let lat1 = from.lat_rad();
    let lat2 = to.lat_rad();
    let delta_lng = to.lng_rad() - from.lng_rad();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Sample `sample_count` points along the great-circle arc from `start` to `end`.
///
/// Points are produced by spherical linear interpolation at evenly spaced
/// fractions. The first point is exactly `start` and the last exactly `end`.
/// When the endpoints coincide the interior points repeat `start`, since the
/// slerp weights would divide by `sin(c) = 0`. Antipodal endpoints lie on
/// infinitely many great circles; the one through `start` heading north is
/// used (or along the prime meridian plane when `start` is near a pole).
pub fn interpolate_path(start: GeoPoint, end: GeoPoint, sample_count: usize) -> Vec<GeoPoint> {
    match sample_count {
        0 => return Vec::new(),
        1 => return vec![start],
        _ => {}
    }

    let p = unit_vector(start);
    let q = unit_vector(end);
    // Vector form stays accurate near 0 and pi, where haversine loses digits
    let c = cross_norm(p, q).atan2(dot(p, q));
    let last = sample_count - 1;

    (0..sample_count)
        .map(|i| {
            if i == 0 {
                start
            } else if i == last {
                end
            } else if c < COINCIDENT_ANGLE_RAD {
                start
            } else if std::f64::consts::PI - c < ANTIPODAL_MARGIN_RAD {
                antipodal_arc(p, c, i as f64 / last as f64)
            } else {
                slerp(p, q, c, i as f64 / last as f64)
            }
        })
        .collect()
}

/// Interpolate at `fraction` along an arc of central angle `c`.
///
/// `c` must be clear of both 0 and pi.
fn slerp(p: [f64; 3], q: [f64; 3], c: f64, fraction: f64) -> GeoPoint {
    let sin_c = c.sin();
    let a = ((1.0 - fraction) * c).sin() / sin_c;
    let b = (fraction * c).sin() / sin_c;

    from_unit_vector([
        a * p[0] + b * q[0],
        a * p[1] + b * q[1],
        a * p[2] + b * q[2],
    ])
}

/// Walk `fraction` of an arc of central angle `c` from `start` along a
/// fixed great circle, for endpoints too close to antipodal to define one.
fn antipodal_arc(p: [f64; 3], c: f64, fraction: f64) -> GeoPoint {
    // Reference axis: north, or the prime meridian's equator point near a pole
    let k = if p[2].abs() < 0.9 {
        [0.0, 0.0, 1.0]
    } else {
        [1.0, 0.0, 0.0]
    };
    // Tangent at `start`: k minus its component along p
    let along = dot(k, p);
    let t = [k[0] - along * p[0], k[1] - along * p[1], k[2] - along * p[2]];
    let norm = dot(t, t).sqrt();

    let angle = fraction * c;
    let (sin_a, cos_a) = angle.sin_cos();
    from_unit_vector([
        cos_a * p[0] + sin_a * t[0] / norm,
        cos_a * p[1] + sin_a * t[1] / norm,
        cos_a * p[2] + sin_a * t[2] / norm,
    ])
}

fn unit_vector(point: GeoPoint) -> [f64; 3] {
    let (lat, lng) = (point.lat_rad(), point.lng_rad());
    [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross_norm(a: [f64; 3], b: [f64; 3]) -> f64 {
    let x = a[1] * b[2] - a[2] * b[1];
    let y = a[2] * b[0] - a[0] * b[2];
    let z = a[0] * b[1] - a[1] * b[0];
    (x * x + y * y + z * z).sqrt()
}

fn from_unit_vector([x, y, z]: [f64; 3]) -> GeoPoint {
    GeoPoint {
        lat: z.atan2((x * x + y * y).sqrt()).to_degrees(),
        lng: y.atan2(x).to_degrees(),
    }
}

fn normalize_longitude(lng: f64) -> f64 {
    (lng + 540.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn seattle() -> GeoPoint {
        GeoPoint { lat: 47.6062, lng: -122.3321 }
    }

    fn portland() -> GeoPoint {
        GeoPoint { lat: 45.5152, lng: -122.6784 }
    }

    #[test]
    fn test_distance_seattle_portland() {
        // Seattle to Portland is approximately 233 km
        let d = distance_km(seattle(), portland());
        assert!((d - 233.0).abs() < 5.0, "distance was {}", d);
    }

    #[test]
    fn test_distance_zero_and_symmetric() {
        for p in [seattle(), portland(), GeoPoint { lat: -33.9, lng: 151.2 }] {
            assert_eq!(distance_km(p, p), 0.0);
        }
        let ab = distance_km(seattle(), portland());
        let ba = distance_km(portland(), seattle());
        assert_abs_diff_eq!(ab, ba, epsilon = 1e-9);
    }

    #[test]
    fn test_destination_round_trip() {
        let origin = seattle();
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0, 359.0] {
            let dest = destination_point(origin, bearing, 12.5);
            assert_abs_diff_eq!(distance_km(origin, dest), 12.5, epsilon = 1e-6);
            let back = initial_bearing(origin, dest);
            let diff = (back - bearing + 540.0).rem_euclid(360.0) - 180.0;
            assert!(diff.abs() < 1e-6, "bearing {} came back as {}", bearing, back);
        }
    }

    #[test]
    fn test_destination_due_north() {
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        let dest = destination_point(origin, 0.0, 111.195);
        assert_abs_diff_eq!(dest.lat, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(dest.lng, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_destination_wraps_antimeridian() {
        let origin = GeoPoint { lat: 0.0, lng: 179.95 };
        let dest = destination_point(origin, 90.0, 20.0);
        assert!(dest.lng < -179.0, "longitude was {}", dest.lng);
    }

    #[test]
    fn test_interpolate_endpoints_exact() {
        let (a, b) = (seattle(), portland());
        for n in 2..12 {
            let path = interpolate_path(a, b, n);
            assert_eq!(path.len(), n);
            assert_eq!(path[0], a);
            assert_eq!(path[n - 1], b);
        }
    }

    #[test]
    fn test_interpolate_evenly_spaced() {
        let (a, b) = (seattle(), portland());
        let path = interpolate_path(a, b, 5);
        let total = distance_km(a, b);
        for (i, p) in path.iter().enumerate() {
            assert_abs_diff_eq!(distance_km(a, *p), total * i as f64 / 4.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_interpolate_coincident() {
        let a = seattle();
        let path = interpolate_path(a, a, 4);
        assert_eq!(path, vec![a; 4]);
        assert!(path.iter().all(|p| p.lat.is_finite() && p.lng.is_finite()));
    }

    #[test]
    fn test_interpolate_antipodal() {
        let a = GeoPoint { lat: 10.0, lng: 20.0 };
        let b = GeoPoint { lat: -10.0, lng: -160.0 };
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        let path = interpolate_path(a, b, 9);
        assert_eq!(path[0], a);
        assert_eq!(path[8], b);
        for (i, p) in path.iter().enumerate() {
            let fraction = i as f64 / 8.0;
            assert!(p.lat.is_finite() && p.lng.is_finite());
            // Haversine itself is only good to about a meter near pi
            assert_abs_diff_eq!(distance_km(a, *p), fraction * half_circumference, epsilon = 1e-3);
            assert_abs_diff_eq!(
                distance_km(*p, b),
                (1.0 - fraction) * half_circumference,
                epsilon = 1e-3
            );
        }
        // Leaves heading north
        assert!(path[1].lat > a.lat);
    }

    #[test]
    fn test_interpolate_pole_to_pole() {
        let north = GeoPoint { lat: 90.0, lng: 0.0 };
        let south = GeoPoint { lat: -90.0, lng: 0.0 };
        let path = interpolate_path(north, south, 5);
        for (i, p) in path.iter().enumerate() {
            assert_abs_diff_eq!(p.lat, 90.0 - 45.0 * i as f64, epsilon = 1e-9);
        }
        // Interior points share one meridian
        assert_abs_diff_eq!(path[1].lng, path[3].lng, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolate_small_counts() {
        assert!(interpolate_path(seattle(), portland(), 0).is_empty());
        assert_eq!(interpolate_path(seattle(), portland(), 1), vec![seattle()]);
    }

    #[test]
    fn test_initial_bearing() {
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        assert_abs_diff_eq!(initial_bearing(origin, GeoPoint { lat: 1.0, lng: 0.0 }), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(initial_bearing(origin, GeoPoint { lat: 0.0, lng: 1.0 }), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(initial_bearing(origin, GeoPoint { lat: -1.0, lng: 0.0 }), 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(initial_bearing(origin, GeoPoint { lat: 0.0, lng: -1.0 }), 270.0, epsilon = 1e-9);
        assert_eq!(initial_bearing(origin, origin), 0.0);
    }
}
