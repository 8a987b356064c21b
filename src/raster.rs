use thiserror::Error;

pub const BYTES_PER_TEXEL: usize = 4;

/// RGBA for each 2-bit color index: white, blue, green, black.
pub const PALETTE: [[u8; 4]; 4] = [
    [255, 255, 255, 255],
    [0, 0, 255, 255],
    [0, 255, 0, 255],
    [0, 0, 0, 255],
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("compressed raster is empty")]
    EmptyInput,

    #[error("raster declared as {width}x{height} needs {expected} bytes, decoded {actual}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// Expands run-length encoded texels into RGBA bytes.
///
/// Each input byte packs a run length in its upper six bits (stored minus one)
/// and a palette index in its lower two bits.
pub fn decode_rle(compressed: &[u8]) -> Vec<u8> {
    let total: usize = compressed.iter().map(|&b| run_length(b)).sum();
    let mut decoded = Vec::with_capacity(total * BYTES_PER_TEXEL);
    for &byte in compressed {
        let color = PALETTE[(byte & 0x03) as usize];
        for _ in 0..run_length(byte) {
            decoded.extend_from_slice(&color);
        }
    }
    decoded
}

fn run_length(byte: u8) -> usize {
    (byte >> 2) as usize + 1
}

/// Decoded RGBA texture, stored row by row starting with the bottom row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn decode(compressed: &[u8], width: usize, height: usize) -> Result<Self, DecodeError> {
        if compressed.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        let pixels = decode_rle(compressed);
        let expected = width * height * BYTES_PER_TEXEL;
        if pixels.len() != expected {
            return Err(DecodeError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn texel(&self, x: usize, row: usize) -> [u8; 4] {
        let i = (row * self.width + x) * BYTES_PER_TEXEL;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Nearest-texel lookup. `u` runs left to right and `v` top to bottom, both in `[0, 1]`.
    pub fn sample(&self, u: f64, v: f64) -> [u8; 4] {
        let x = ((u * self.width as f64) as usize).min(self.width - 1);
        let from_top = ((v * self.height as f64) as usize).min(self.height - 1);
        self.texel(x, self.height - 1 - from_top)
    }
}
