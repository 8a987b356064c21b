//! Great-circle routes between two map points, cut into drawable pieces.
//!
//! A route is sampled along the sphere with slerp and each sample is projected
//! back into clip space. The Mercator plane has a seam at ±180°, so wherever two
//! consecutive samples land on opposite sides of it the polyline is split;
//! drawing each piece as its own line strip keeps a stray line from crossing
//! the whole map.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::debug;

use crate::projection::{
    cartesian_to_lon_lat, lon_lat_to_cartesian, lon_lat_to_mercator, mercator_to_clip,
    mercator_to_lon_lat, wrap_longitude, ClipPoint, LonLat, MercatorPoint, Vec3,
};

pub const DEFAULT_PATH_SAMPLES: usize = 100;

/// Clip-space x jump between two samples that counts as crossing the seam.
pub const SEAM_THRESHOLD: f64 = 0.5;

const ANGLE_EPSILON: f64 = 1e-6;
const POLE_GUARD: f64 = 1e-9;

/// Polyline pieces of one route, in clip space. Every piece is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Vec<ClipPoint>>,
}

impl Path {
    /// Routes from `start` to `end` with `num_points + 1` samples.
    pub fn between(start: MercatorPoint, end: MercatorPoint, num_points: usize) -> Self {
        let mut path = Self::default();
        path.set_path(start, end, num_points);
        path
    }

    /// Replaces the whole route.
    pub fn set_path(&mut self, start: MercatorPoint, end: MercatorPoint, num_points: usize) {
        self.segments = build_path(start, end, num_points);
    }

    pub fn segments(&self) -> &[Vec<ClipPoint>] {
        &self.segments
    }
}

pub fn build_path(
    start: MercatorPoint,
    end: MercatorPoint,
    num_points: usize,
) -> Vec<Vec<ClipPoint>> {
    let num_points = num_points.max(1);

    let start_ll = mercator_to_lon_lat(start);
    let mut end_ll = mercator_to_lon_lat(end);

    // Take the shorter way around in longitude.
    let delta = end_ll.lon - start_ll.lon;
    if delta > PI {
        end_ll.lon -= 2.0 * PI;
    } else if delta < -PI {
        end_ll.lon += 2.0 * PI;
    }

    let start_cart = lon_lat_to_cartesian(start_ll, 1.0);
    let end_cart = lon_lat_to_cartesian(end_ll, 1.0);
    let arc = Arc::new(start_cart, end_cart);

    let mut segments = Vec::new();
    let mut current: Vec<ClipPoint> = Vec::with_capacity(num_points + 1);
    let mut prev: Option<ClipPoint> = None;

    for i in 0..=num_points {
        let t = i as f64 / num_points as f64;
        let clip = project_sample(arc.at(t));

        if let Some(prev) = prev {
            if (clip.x - prev.x).abs() > SEAM_THRESHOLD && !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }

        current.push(clip);
        prev = Some(clip);
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn project_sample(p: Vec3) -> ClipPoint {
    let ll = cartesian_to_lon_lat(p);
    let ll = LonLat::new(
        wrap_longitude(ll.lon),
        ll.lat.clamp(-FRAC_PI_2 + POLE_GUARD, FRAC_PI_2 - POLE_GUARD),
    );
    mercator_to_clip(lon_lat_to_mercator(ll))
}

/// Interpolation between two unit vectors along the sphere.
enum Arc {
    /// Endpoints coincide; every sample sits on the start.
    Point(Vec3),
    /// Ordinary slerp.
    Slerp { start: Vec3, end: Vec3, angle: f64 },
    /// Half a great circle from `start` through the direction `tangent`.
    HalfTurn { start: Vec3, tangent: Vec3 },
}

impl Arc {
    fn new(start: Vec3, end: Vec3) -> Self {
        let start = start.normalize();
        let end = end.normalize();
        let angle = start.dot(end).clamp(-1.0, 1.0).acos();

        if angle < ANGLE_EPSILON {
            debug!("route endpoints coincide; holding position");
            Arc::Point(start)
        } else if PI - angle < ANGLE_EPSILON {
            debug!("route endpoints are antipodal; routing over the north pole");
            Arc::HalfTurn {
                start,
                tangent: northward_tangent(start),
            }
        } else {
            Arc::Slerp { start, end, angle }
        }
    }

    fn at(&self, t: f64) -> Vec3 {
        match *self {
            Arc::Point(p) => p,
            Arc::Slerp { start, end, angle } => {
                let sin_angle = angle.sin();
                let a = ((1.0 - t) * angle).sin() / sin_angle;
                let b = (t * angle).sin() / sin_angle;
                (start * a + end * b).normalize()
            }
            Arc::HalfTurn { start, tangent } => {
                let (sin, cos) = (t * PI).sin_cos();
                (start * cos + tangent * sin).normalize()
            }
        }
    }
}

/// Unit tangent at `p` heading towards the north pole, or along the prime meridian
/// when `p` is itself a pole.
fn northward_tangent(p: Vec3) -> Vec3 {
    let towards = if p.z.abs() > 1.0 - ANGLE_EPSILON {
        Vec3::X
    } else {
        Vec3::Z
    };
    (towards - p * towards.dot(p)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mercator(lon_deg: f64, lat_deg: f64) -> MercatorPoint {
        lon_lat_to_mercator(LonLat::from_degrees(lon_deg, lat_deg))
    }

    fn assert_no_seam_jumps(segments: &[Vec<ClipPoint>]) {
        for segment in segments {
            assert!(!segment.is_empty());
            for pair in segment.windows(2) {
                assert!(
                    (pair[1].x - pair[0].x).abs() <= SEAM_THRESHOLD,
                    "segment jumps from {:?} to {:?}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    fn assert_finite(segments: &[Vec<ClipPoint>]) {
        for p in segments.iter().flatten() {
            assert!(p.x.is_finite() && p.y.is_finite(), "non-finite sample {p:?}");
        }
    }

    #[test]
    fn short_route_is_one_segment() {
        let start = mercator(-30.0, 10.0);
        let end = mercator(40.0, -20.0);
        let segments = build_path(start, end, DEFAULT_PATH_SAMPLES);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), DEFAULT_PATH_SAMPLES + 1);
        assert_no_seam_jumps(&segments);
    }

    #[test]
    fn route_endpoints_match_stations() {
        let start = mercator(-30.0, 10.0);
        let end = mercator(40.0, -20.0);
        let segments = build_path(start, end, 50);
        let first = segments[0][0];
        let last = *segments[0].last().unwrap();

        let expected_first = mercator_to_clip(start);
        let expected_last = mercator_to_clip(end);
        assert_abs_diff_eq!(first.x, expected_first.x, epsilon = 1e-9);
        assert_abs_diff_eq!(first.y, expected_first.y, epsilon = 1e-9);
        assert_abs_diff_eq!(last.x, expected_last.x, epsilon = 1e-9);
        assert_abs_diff_eq!(last.y, expected_last.y, epsilon = 1e-9);
    }

    #[test]
    fn great_circle_bows_towards_the_pole() {
        // Two points on the same northern parallel: the great circle between
        // them runs north of that parallel.
        let start = mercator(-60.0, 40.0);
        let end = mercator(60.0, 40.0);
        let segments = build_path(start, end, 20);
        let mid = segments[0][10];
        assert!(mid.y > mercator_to_clip(start).y);
    }

    #[test]
    fn antimeridian_crossing_splits_route() {
        let start = mercator(170.0, 20.0);
        let end = mercator(-170.0, 30.0);
        let segments = build_path(start, end, DEFAULT_PATH_SAMPLES);

        assert!(segments.len() >= 2, "got {} segments", segments.len());
        assert_no_seam_jumps(&segments);
        assert_eq!(
            segments.iter().map(Vec::len).sum::<usize>(),
            DEFAULT_PATH_SAMPLES + 1
        );
        // The first piece stays east of the seam, the second starts west of it.
        assert!(segments[0].iter().all(|p| p.x > 0.0));
        assert!(segments[1][0].x < 0.0);
    }

    #[test]
    fn crossing_eastwards_from_the_west() {
        let segments = build_path(mercator(-175.0, -10.0), mercator(175.0, 5.0), 40);
        assert_eq!(segments.len(), 2);
        assert_no_seam_jumps(&segments);
    }

    #[test]
    fn identical_endpoints_hold_position() {
        let p = mercator(12.0, 34.0);
        let segments = build_path(p, p, 10);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 11);
        assert_finite(&segments);

        let clip = mercator_to_clip(p);
        for sample in &segments[0] {
            assert_abs_diff_eq!(sample.x, clip.x, epsilon = 1e-9);
            assert_abs_diff_eq!(sample.y, clip.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn antipodal_endpoints_route_over_the_pole() {
        let start = mercator(0.0, 0.0);
        let end = mercator(180.0, 0.0);
        let segments = build_path(start, end, 100);

        assert_finite(&segments);
        assert_no_seam_jumps(&segments);
        // Passing over the pole flips the longitude from 0 to 180.
        assert_eq!(segments.len(), 2);
        let highest = segments
            .iter()
            .flatten()
            .map(|p| p.y)
            .fold(f64::MIN, f64::max);
        assert!(highest > 1.0, "route should leave the map through the north edge");
    }

    #[test]
    fn antipodal_poles_stay_finite() {
        let north = LonLat::new(0.0, FRAC_PI_2 - 1e-12);
        let south = LonLat::new(0.0, -FRAC_PI_2 + 1e-12);
        let segments = build_path(lon_lat_to_mercator(north), lon_lat_to_mercator(south), 30);
        assert_finite(&segments);
        assert_no_seam_jumps(&segments);
    }

    #[test]
    fn zero_samples_are_promoted_to_one() {
        let segments = build_path(mercator(0.0, 0.0), mercator(10.0, 0.0), 0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 2);
    }

    #[test]
    fn set_path_replaces_segments() {
        let mut path = Path::between(mercator(170.0, 0.0), mercator(-170.0, 0.0), 20);
        assert_eq!(path.segments().len(), 2);

        path.set_path(mercator(0.0, 0.0), mercator(10.0, 0.0), 20);
        assert_eq!(path.segments().len(), 1);
        assert_eq!(path.segments()[0].len(), 21);
    }
}
