use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Latitude at which the map is cut off, in degrees.
pub const MAX_MAP_LATITUDE_DEG: f64 = 85.0;

/// Normalized window coordinates, `[-1, 1]` on both axes with Y pointing up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Rendering coordinates, `[-1, 1]` on both axes for everything inside the map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipPoint {
    pub x: f64,
    pub y: f64,
}

/// Mercator plane coordinates: x is longitude in radians, y is `ln(tan(π/4 + lat/2))`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MercatorPoint {
    pub x: f64,
    pub y: f64,
}

/// Geographic coordinates in radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

macro_rules! impl_point2 {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub fn new(x: f64, y: f64) -> Self {
                    Self { x, y }
                }
            }
        )*
    };
}

impl_point2!(ScreenPoint, ClipPoint, MercatorPoint);

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self::new(lon_deg.to_radians(), lat_deg.to_radians())
    }
}

/// Cartesian position on, or direction from, the unit sphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            self
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, k: f64) -> Self::Output {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

/// Mercator ordinate of a latitude (radians).
pub fn mercator_y(lat: f64) -> f64 {
    (FRAC_PI_4 + lat / 2.0).tan().ln()
}

/// Mercator ordinate of the ±85° cutoff; maps to the top and bottom edge of the map.
pub fn mercator_y_limit() -> f64 {
    mercator_y(MAX_MAP_LATITUDE_DEG.to_radians())
}

pub fn screen_to_mercator(screen: ScreenPoint) -> MercatorPoint {
    MercatorPoint::new(screen.x * PI, screen.y * mercator_y_limit())
}

pub fn mercator_to_clip(m: MercatorPoint) -> ClipPoint {
    ClipPoint::new(m.x / PI, m.y / mercator_y_limit())
}

pub fn mercator_to_lon_lat(m: MercatorPoint) -> LonLat {
    LonLat::new(m.x, 2.0 * m.y.exp().atan() - FRAC_PI_2)
}

pub fn lon_lat_to_mercator(ll: LonLat) -> MercatorPoint {
    MercatorPoint::new(ll.lon, mercator_y(ll.lat))
}

/// Longitude is the azimuth around +Z, latitude the elevation above the XY plane.
pub fn lon_lat_to_cartesian(ll: LonLat, radius: f64) -> Vec3 {
    let (sin_lat, cos_lat) = ll.lat.sin_cos();
    let (sin_lon, cos_lon) = ll.lon.sin_cos();
    Vec3::new(
        radius * cos_lat * cos_lon,
        radius * cos_lat * sin_lon,
        radius * sin_lat,
    )
}

/// Inverse of [`lon_lat_to_cartesian`]; the radius is discarded.
pub fn cartesian_to_lon_lat(p: Vec3) -> LonLat {
    let r = p.length();
    if r == 0.0 {
        return LonLat::new(0.0, 0.0);
    }
    let lat = (p.z / r).clamp(-1.0, 1.0).asin();
    let lon = p.y.atan2(p.x);
    LonLat::new(lon, lat)
}

/// Wraps a longitude into `[-π, π]` by at most one turn.
pub fn wrap_longitude(lon: f64) -> f64 {
    if lon > PI {
        lon - 2.0 * PI
    } else if lon < -PI {
        lon + 2.0 * PI
    } else {
        lon
    }
}
