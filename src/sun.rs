use std::f64::consts::{FRAC_PI_2, PI};

use crate::projection::{lon_lat_to_cartesian, LonLat, Vec3};

pub const HOURS_PER_DAY: u32 = 24;
/// Sub-solar latitude. The sun is pinned at roughly the axial tilt.
pub const SUN_LATITUDE_DEG: f64 = 23.0;

// Warm tint on the day side, cool tint on the night side.
const DAY_LIGHT: [f64; 3] = [1.0, 1.0, 0.8];
const NIGHT_LIGHT: [f64; 3] = [0.2, 0.2, 0.5];

const NIGHT_SHADE: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Daylight {
    Day,
    Night,
}

/// Direction towards the sun at the given hour; the sun moves 15° of longitude per hour.
pub fn sun_direction(hour: u32) -> Vec3 {
    let hour = hour % HOURS_PER_DAY;
    let lon_deg = hour as f64 * (360.0 / HOURS_PER_DAY as f64);
    lon_lat_to_cartesian(LonLat::from_degrees(lon_deg, SUN_LATITUDE_DEG), 1.0).normalize()
}

pub fn surface_normal(lat: f64, lon: f64) -> Vec3 {
    lon_lat_to_cartesian(LonLat::new(lon, lat), 1.0).normalize()
}

pub fn is_daytime(normal: Vec3, sun: Vec3) -> bool {
    normal.dot(sun) > 0.0
}

pub fn daylight(normal: Vec3, sun: Vec3) -> Daylight {
    if is_daytime(normal, sun) {
        Daylight::Day
    } else {
        Daylight::Night
    }
}

/// Multiplier applied to texture RGB: full brightness by day, half at night.
pub fn shade_factor(normal: Vec3, sun: Vec3) -> f64 {
    match daylight(normal, sun) {
        Daylight::Day => 1.0,
        Daylight::Night => NIGHT_SHADE,
    }
}

pub fn light_color(normal: Vec3, sun: Vec3) -> [f64; 3] {
    match daylight(normal, sun) {
        Daylight::Day => DAY_LIGHT,
        Daylight::Night => NIGHT_LIGHT,
    }
}

/// Reconstructs the surface normal of a map texel from its texture coordinates.
///
/// `u` runs west to east and `v` runs north to south, both in `[0, 1]`.
pub fn texel_normal(u: f64, v: f64) -> Vec3 {
    let lon = u * 2.0 * PI - PI;
    let lat = FRAC_PI_2 - v * PI;
    surface_normal(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sun_direction_is_unit_for_every_hour() {
        for hour in 0..HOURS_PER_DAY {
            assert_abs_diff_eq!(sun_direction(hour).length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn sun_direction_wraps_daily() {
        assert_eq!(sun_direction(0), sun_direction(24 % HOURS_PER_DAY));
        assert_eq!(sun_direction(5), sun_direction(29));
    }

    #[test]
    fn sub_solar_point_is_in_daylight() {
        for hour in 0..HOURS_PER_DAY {
            let sun = sun_direction(hour);
            let normal = surface_normal(
                SUN_LATITUDE_DEG.to_radians(),
                (hour as f64 * 15.0).to_radians(),
            );
            assert!(is_daytime(normal, sun), "hour {hour}");
            assert_eq!(shade_factor(normal, sun), 1.0);
            assert_eq!(light_color(normal, sun), DAY_LIGHT);
        }
    }

    #[test]
    fn anti_solar_point_is_dark() {
        let sun = sun_direction(6);
        let normal = sun * -1.0;
        assert_eq!(daylight(normal, sun), Daylight::Night);
        assert_eq!(shade_factor(normal, sun), NIGHT_SHADE);
        assert_eq!(light_color(normal, sun), NIGHT_LIGHT);
    }

    #[test]
    fn texel_normal_covers_the_globe() {
        let center = texel_normal(0.5, 0.5);
        assert_abs_diff_eq!(center.x, 1.0, epsilon = 1e-12);

        let north = texel_normal(0.5, 0.0);
        assert_abs_diff_eq!(north.z, 1.0, epsilon = 1e-12);

        let west_edge = texel_normal(0.0, 0.5);
        assert_abs_diff_eq!(west_edge.x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn noon_at_greenwich_lights_the_map_center() {
        let sun = sun_direction(0);
        assert!(is_daytime(texel_normal(0.5, 0.5), sun));
        assert!(!is_daytime(texel_normal(0.0, 0.5), sun));
    }
}
