//! Drawing primitives over a ratatui buffer.
//!
//! The map area is treated as a tiny framebuffer: clip space `[-1, 1]²` spans
//! the rectangle, and every terminal cell holds two vertical texels drawn with
//! an upper half block.

use ratatui::{buffer::Buffer, layout::Rect, style::Color};

use crate::projection::{ClipPoint, Vec3};
use crate::raster::Raster;

const UPPER_HALF_BLOCK: char = '▀';

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Primitive {
    LineStrip,
    Points,
}

/// Per-frame values shared by everything that draws.
#[derive(Debug, Copy, Clone)]
pub struct Uniforms {
    pub sun_direction: Vec3,
}

pub trait Renderable {
    fn draw(&self, canvas: &mut Canvas<'_>, uniforms: &Uniforms);
}

pub struct Canvas<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect) -> Self {
        Self { buf, area }
    }

    /// Cell under a clip-space point, or `None` when it falls outside the map.
    pub fn clip_to_cell(&self, p: ClipPoint) -> Option<(u16, u16)> {
        let (x, y) = self.clip_to_grid(p);
        if !(0.0..self.area.width as f64).contains(&x) || !(0.0..self.area.height as f64).contains(&y)
        {
            return None;
        }
        Some((self.area.x + x as u16, self.area.y + y as u16))
    }

    // Continuous cell coordinates relative to the top-left of the map.
    fn clip_to_grid(&self, p: ClipPoint) -> (f64, f64) {
        (
            (p.x + 1.0) / 2.0 * self.area.width as f64,
            (1.0 - p.y) / 2.0 * self.area.height as f64,
        )
    }

    fn plot(&mut self, p: ClipPoint, glyph: char, color: Color) {
        if let Some(pos) = self.clip_to_cell(p) {
            if let Some(cell) = self.buf.cell_mut(pos) {
                cell.set_char(glyph).set_fg(color);
            }
        }
    }

    pub fn draw_primitive(
        &mut self,
        kind: Primitive,
        vertices: &[ClipPoint],
        glyph: char,
        color: Color,
    ) {
        match kind {
            Primitive::Points => {
                for &p in vertices {
                    self.plot(p, glyph, color);
                }
            }
            Primitive::LineStrip => {
                for pair in vertices.windows(2) {
                    self.line(pair[0], pair[1], glyph, color);
                }
                if let [only] = vertices {
                    self.plot(*only, glyph, color);
                }
            }
        }
    }

    // Steps through every cell the segment touches.
    fn line(&mut self, a: ClipPoint, b: ClipPoint, glyph: char, color: Color) {
        let (ax, ay) = self.clip_to_grid(a);
        let (bx, by) = self.clip_to_grid(b);
        let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0);
        if !steps.is_finite() {
            return;
        }
        let steps = steps as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let p = ClipPoint::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            self.plot(p, glyph, color);
        }
    }

    /// Covers the whole map quad with `raster`, letting `shader` pick each
    /// texel's color from its texture coordinates and RGBA value.
    pub fn fill_texture<F>(&mut self, raster: &Raster, shader: F)
    where
        F: Fn(f64, f64, [u8; 4]) -> Color,
    {
        let width = self.area.width as f64;
        let texel_rows = self.area.height as f64 * 2.0;

        for row in 0..self.area.height {
            for col in 0..self.area.width {
                let u = (col as f64 + 0.5) / width;
                let v_top = (row as f64 * 2.0 + 0.5) / texel_rows;
                let v_bottom = (row as f64 * 2.0 + 1.5) / texel_rows;

                let top = shader(u, v_top, raster.sample(u, v_top));
                let bottom = shader(u, v_bottom, raster.sample(u, v_bottom));

                if let Some(cell) = self.buf.cell_mut((self.area.x + col, self.area.y + row)) {
                    cell.set_char(UPPER_HALF_BLOCK).set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u16, height: u16) -> Buffer {
        Buffer::empty(Rect::new(0, 0, width, height))
    }

    #[test]
    fn clip_corners_land_in_the_map() {
        let mut buf = buffer(20, 10);
        let canvas = Canvas::new(&mut buf, Rect::new(2, 1, 16, 8));
        assert_eq!(canvas.clip_to_cell(ClipPoint::new(-1.0, 1.0)), Some((2, 1)));
        assert_eq!(canvas.clip_to_cell(ClipPoint::new(0.0, 0.0)), Some((10, 5)));
        assert_eq!(canvas.clip_to_cell(ClipPoint::new(0.999, -0.999)), Some((17, 8)));
        assert_eq!(canvas.clip_to_cell(ClipPoint::new(1.0, 0.0)), None);
        assert_eq!(canvas.clip_to_cell(ClipPoint::new(0.0, 1.5)), None);
    }

    #[test]
    fn line_strip_marks_every_cell_between_vertices() {
        let mut buf = buffer(10, 1);
        let mut canvas = Canvas::new(&mut buf, Rect::new(0, 0, 10, 1));
        canvas.draw_primitive(
            Primitive::LineStrip,
            &[ClipPoint::new(-0.95, 0.0), ClipPoint::new(0.95, 0.0)],
            '*',
            Color::Yellow,
        );
        for x in 0..10 {
            assert_eq!(buf[(x, 0)].symbol(), "*", "cell {x}");
        }
    }

    #[test]
    fn points_skip_offscreen_vertices() {
        let mut buf = buffer(4, 4);
        let mut canvas = Canvas::new(&mut buf, Rect::new(0, 0, 4, 4));
        canvas.draw_primitive(
            Primitive::Points,
            &[ClipPoint::new(0.1, 0.1), ClipPoint::new(3.0, 0.0)],
            'o',
            Color::Red,
        );
        assert_eq!(buf[(2, 1)].symbol(), "o");
        assert_eq!(buf[(2, 1)].fg, Color::Red);
    }

    #[test]
    fn fill_texture_paints_two_texels_per_cell() {
        // 1x2 raster: bottom white, top blue.
        let raster = Raster::decode(&[0x00, 0x01], 1, 2).unwrap();
        let mut buf = buffer(3, 1);
        let mut canvas = Canvas::new(&mut buf, Rect::new(0, 0, 3, 1));
        canvas.fill_texture(&raster, |_, _, rgba| Color::Rgb(rgba[0], rgba[1], rgba[2]));

        let cell = &buf[(1, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(0, 0, 255));
        assert_eq!(cell.bg, Color::Rgb(255, 255, 255));
    }
}
