use ratatui::style::Color;

use crate::projection::Vec3;
use crate::raster::{DecodeError, Raster};
use crate::sun::shade_factor;

pub const WORLD_MAP_WIDTH: usize = 64;
pub const WORLD_MAP_HEIGHT: usize = 64;

/// Run-length encoded world raster, bottom row first.
pub const WORLD_MAP_RLE: [u8; 373] = [
    252, 252, 252, 252, 252, 252, 252, 252, 252, 0, 9, 80, 1, 148, 13, 72,
    13, 140, 25, 60, 21, 132, 41, 12, 1, 28, 25, 128, 61, 0, 17, 4,
    29, 124, 81, 8, 37, 116, 89, 0, 69, 16, 5, 48, 97, 0, 77, 0,
    25, 8, 1, 8, 253, 253, 253, 253, 101, 10, 237, 14, 237, 14, 241, 10,
    141, 2, 93, 14, 121, 2, 5, 6, 93, 14, 49, 6, 57, 26, 89, 18,
    41, 10, 57, 26, 89, 18, 41, 14, 1, 2, 45, 26, 89, 26, 33, 18,
    57, 14, 93, 26, 33, 18, 57, 10, 93, 18, 5, 2, 33, 18, 41, 2,
    5, 2, 5, 6, 89, 22, 29, 2, 1, 22, 37, 2, 1, 6, 1, 2,
    97, 22, 29, 38, 45, 2, 97, 10, 1, 2, 37, 42, 17, 2, 13, 2,
    5, 2, 89, 10, 49, 46, 25, 10, 101, 2, 5, 6, 37, 50, 9, 30,
    89, 10, 9, 2, 37, 50, 5, 38, 81, 26, 45, 22, 17, 54, 77, 30,
    41, 22, 17, 58, 1, 2, 61, 38, 65, 2, 9, 58, 69, 46, 37, 6,
    1, 10, 9, 62, 65, 38, 5, 2, 33, 102, 57, 54, 33, 102, 57, 30,
    1, 14, 33, 2, 9, 86, 9, 2, 21, 6, 13, 26, 5, 6, 53, 94,
    29, 26, 1, 22, 29, 0, 29, 98, 5, 14, 9, 46, 1, 2, 5, 6,
    5, 2, 0, 13, 0, 13, 118, 1, 2, 1, 42, 1, 4, 5, 6, 5,
    2, 4, 33, 78, 1, 6, 1, 6, 1, 10, 5, 34, 1, 20, 2, 9,
    2, 12, 25, 14, 5, 30, 1, 54, 13, 6, 9, 2, 1, 32, 13, 8,
    37, 2, 13, 2, 1, 70, 49, 28, 13, 16, 53, 2, 1, 46, 1, 2,
    1, 2, 53, 28, 17, 16, 57, 14, 1, 18, 1, 14, 1, 2, 57, 24,
    13, 20, 57, 0, 2, 1, 2, 17, 0, 17, 2, 61, 0, 5, 16, 1,
    28, 25, 0, 41, 2, 117, 56, 25, 0, 33, 2, 1, 2, 117, 52, 201,
    48, 77, 0, 121, 40, 1, 0, 205, 8, 1, 0, 1, 12, 213, 4, 13,
    12, 253, 253, 253, 141,
];

/// The textured world map that fills the viewport.
pub struct MapLayer {
    raster: Raster,
}

impl MapLayer {
    pub fn new(raster: Raster) -> Self {
        Self { raster }
    }

    /// Decodes the built-in world raster.
    pub fn world() -> Result<Self, DecodeError> {
        Raster::decode(&WORLD_MAP_RLE, WORLD_MAP_WIDTH, WORLD_MAP_HEIGHT).map(Self::new)
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

// Map a texel and its surface normal to the color shown on screen.
pub fn texel_color(rgba: [u8; 4], normal: Vec3, sun: Vec3) -> Color {
    let shade = shade_factor(normal, sun);
    Color::Rgb(
        (rgba[0] as f64 * shade) as u8,
        (rgba[1] as f64 * shade) as u8,
        (rgba[2] as f64 * shade) as u8,
    )
}
