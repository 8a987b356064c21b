use crate::projection::LonLat;

/// Mean Earth radius (kilometers).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in the unit of `radius`.
pub fn haversine_distance(a: LonLat, b: LonLat, radius: f64) -> f64 {
    let d_lat = b.lat - a.lat;
    let d_lon = b.lon - a.lon;
    let sin_half_lat = (d_lat / 2.0).sin();
    let sin_half_lon = (d_lon / 2.0).sin();
    let h = (sin_half_lat * sin_half_lat
        + a.lat.cos() * b.lat.cos() * sin_half_lon * sin_half_lon)
        .clamp(0.0, 1.0);
    2.0 * radius * h.sqrt().atan2((1.0 - h).sqrt())
}

/// The line reported whenever a new path is laid down.
pub fn distance_report(distance_km: f64) -> String {
    format!("Distance between stations: {distance_km:.2} km")
}
