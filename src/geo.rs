//! Geospatial helpers: great-circle distance, initial bearing and wind cones.
//!
//! All functions are pure; identical inputs give bit-identical outputs.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Half-angle of the downwind exposure cone, in degrees.
pub const WIND_CONE_HALF_ANGLE: f64 = 60.0;

/// Haversine distance in kilometres.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial compass bearing from point 1 to point 2, in `[0, 360)`.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlon = (lon2 - lon1).to_radians();
    let lat1r = lat1.to_radians();
    let lat2r = lat2.to_radians();
    let x = dlon.sin() * lat2r.cos();
    let y = lat1r.cos() * lat2r.sin() - lat1r.sin() * lat2r.cos() * dlon.cos();
    let deg = (x.atan2(y).to_degrees() + 360.0) % 360.0;
    // -0.0 and values that round up to exactly 360.0
    if deg >= 360.0 || deg == 0.0 {
        0.0
    } else {
        deg
    }
}

/// Bearing of an 8-point compass code. Unknown codes yield `None`.
pub fn wind_bearing(direction: &str) -> Option<f64> {
    let bearing = match direction.trim().to_ascii_uppercase().as_str() {
        "N" => 0.0,
        "NE" => 45.0,
        "E" => 90.0,
        "SE" => 135.0,
        "S" => 180.0,
        "SW" => 225.0,
        "W" => 270.0,
        "NW" => 315.0,
        _ => return None,
    };
    Some(bearing)
}

/// 8-point compass code nearest to a bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = (degrees / 45.0).round().rem_euclid(8.0) as usize;
    POINTS[index % 8]
}

/// Shortest-arc difference between two bearings, in `[0, 180]`.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// True when `bearing_to_target` lies strictly inside the cone of `half_angle`
/// degrees either side of `wind_bearing`.
pub fn is_within_cone(bearing_to_target: f64, wind_bearing: f64, half_angle: f64) -> bool {
    angular_difference(bearing_to_target, wind_bearing) < half_angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_same_point() {
        assert_eq!(distance_km(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_cardinal_bearings() {
        assert!((bearing_deg(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((bearing_deg(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(0.0, 0.0, -1.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(0.0, 0.0, 0.0, -1.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_wind_bearing_codes() {
        assert_eq!(wind_bearing("N"), Some(0.0));
        assert_eq!(wind_bearing("se"), Some(135.0));
        assert_eq!(wind_bearing("NW"), Some(315.0));
        assert_eq!(wind_bearing("NNE"), None);
        assert_eq!(wind_bearing(""), None);
    }

    #[test]
    fn test_compass_point_rounding() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(22.0), "N");
        assert_eq!(compass_point(23.0), "NE");
        assert_eq!(compass_point(350.0), "N");
        assert_eq!(compass_point(200.0), "S");
        assert_eq!(compass_point(250.0), "W");
    }

    #[test]
    fn test_cone_wraps_around_north() {
        assert!(is_within_cone(350.0, 0.0, WIND_CONE_HALF_ANGLE));
        assert!(is_within_cone(10.0, 315.0, WIND_CONE_HALF_ANGLE));
        assert!(!is_within_cone(60.0, 0.0, WIND_CONE_HALF_ANGLE));
        assert!(!is_within_cone(180.0, 0.0, WIND_CONE_HALF_ANGLE));
    }
}
