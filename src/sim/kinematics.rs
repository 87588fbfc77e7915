// Great-circle motion and angle normalization

use crate::vessel::Position;

/// Mean Earth radius in nautical miles
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Seconds per hour, for knots × seconds → nautical miles
const SECS_PER_HOUR: f64 = 3600.0;

/// Distance covered at `speed_knots` over `secs` seconds.
pub fn distance_nm(speed_knots: f64, secs: f64) -> f64 {
    speed_knots * secs / SECS_PER_HOUR
}

/// Destination reached from `start` travelling `distance_nm` along the great
/// circle with initial bearing `bearing_deg`.
///
/// Longitude of the result is wrapped into [-180, 180).
pub fn destination(start: Position, bearing_deg: f64, distance_nm: f64) -> Position {
    let lat1 = start.latitude.to_radians();
    let lon1 = start.longitude.to_radians();
    let bearing = bearing_deg.to_radians();
    let delta = distance_nm / EARTH_RADIUS_NM;

    let sin_lat2 = lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos();
    // Rounding can push |sin| a hair past 1 near the poles
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lon2 = lon1
        + (bearing.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * sin_lat2);

    Position::new(lat2.to_degrees(), wrap_longitude(lon2.to_degrees()))
}

/// Great-circle distance between two positions (haversine).
pub fn haversine_nm(a: Position, b: Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * h.sqrt().min(1.0).asin()
}

/// Wrap any finite angle into [0, 360).
pub fn normalize_heading(deg: f64) -> f64 {
    let h = deg.rem_euclid(360.0);
    // rem_euclid of a tiny negative number rounds to exactly 360
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Wrap any finite longitude into [-180, 180).
pub fn wrap_longitude(deg: f64) -> f64 {
    let lon = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if lon >= 180.0 {
        -180.0
    } else {
        lon
    }
}
