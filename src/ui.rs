use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use crate::app::{App, Station};
use crate::great_circle::Path;
use crate::map::{texel_color, MapLayer};
use crate::projection::{mercator_to_clip, mercator_to_lon_lat, MercatorPoint};
use crate::render::{Canvas, Primitive, Renderable, Uniforms};
use crate::sun::{daylight, light_color, surface_normal, texel_normal, Daylight};

const NEON_CYAN: Color = Color::Rgb(0, 255, 255);
const NEON_PINK: Color = Color::Rgb(255, 45, 149);
const NEON_YELLOW: Color = Color::Rgb(255, 215, 0);
const HUD_DIM: Color = Color::Rgb(80, 80, 100);
const HUD_TEXT: Color = Color::Rgb(180, 200, 220);
const HUD_BG: Color = Color::Rgb(8, 8, 18);

const PATH_COLOR: Color = Color::Rgb(255, 255, 0);
const STATION_COLOR: Color = Color::Rgb(255, 0, 0);
const PATH_GLYPH: char = '•';
const STATION_GLYPH: char = '◉';

const LOG_HEIGHT: u16 = 6;

impl Renderable for MapLayer {
    fn draw(&self, canvas: &mut Canvas<'_>, uniforms: &Uniforms) {
        let sun = uniforms.sun_direction;
        canvas.fill_texture(self.raster(), |u, v, rgba| {
            texel_color(rgba, texel_normal(u, v), sun)
        });
    }
}

impl Renderable for Path {
    fn draw(&self, canvas: &mut Canvas<'_>, _uniforms: &Uniforms) {
        // Each piece is its own strip so nothing is drawn across the seam.
        for segment in self.segments() {
            canvas.draw_primitive(Primitive::LineStrip, segment, PATH_GLYPH, PATH_COLOR);
        }
    }
}

impl Renderable for Station {
    fn draw(&self, canvas: &mut Canvas<'_>, _uniforms: &Uniforms) {
        let clip = mercator_to_clip(self.mercator());
        canvas.draw_primitive(Primitive::Points, &[clip], STATION_GLYPH, STATION_COLOR);
    }
}

pub struct MapWidget<'a> {
    pub app: &'a mut App,
}

impl<'a> Widget for MapWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.app.set_map_area(area);

        let uniforms = Uniforms {
            sun_direction: self.app.sun_direction,
        };
        let mut canvas = Canvas::new(buf, area);

        self.app.map.draw(&mut canvas, &uniforms);
        for path in &self.app.paths {
            path.draw(&mut canvas, &uniforms);
        }
        for station in &self.app.stations {
            station.draw(&mut canvas, &uniforms);
        }
    }
}

// Tint of the light falling on a point, as a terminal color.
fn tint_at(app: &App, point: MercatorPoint) -> (Color, Daylight) {
    let ll = mercator_to_lon_lat(point);
    let normal = surface_normal(ll.lat, ll.lon);
    let [r, g, b] = light_color(normal, app.sun_direction);
    (
        Color::Rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8),
        daylight(normal, app.sun_direction),
    )
}

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    let focus = app
        .stations
        .last()
        .map(Station::mercator)
        .unwrap_or(MercatorPoint::new(0.0, 0.0));
    let (tint, phase) = tint_at(app, focus);
    let phase = match phase {
        Daylight::Day => "DAY",
        Daylight::Night => "NIGHT",
    };

    let title = Line::from(vec![
        Span::styled("╡ ", Style::default().fg(HUD_DIM)),
        Span::styled(
            "TERRA-ROUTE",
            Style::default().fg(NEON_PINK).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" mercator ", Style::default().fg(HUD_DIM)),
        Span::styled("╞", Style::default().fg(HUD_DIM)),
    ]);

    let status_bar = Line::from(vec![
        Span::styled("╡ ", Style::default().fg(HUD_DIM)),
        Span::styled("☀", Style::default().fg(NEON_YELLOW)),
        Span::styled(
            format!(" {:02}:00 ", app.current_hour),
            Style::default().fg(HUD_TEXT),
        ),
        Span::styled("│ ", Style::default().fg(HUD_DIM)),
        Span::styled(
            format!("STATIONS: {} PATHS: {} ", app.stations.len(), app.paths.len()),
            Style::default().fg(HUD_TEXT),
        ),
        Span::styled("│ ", Style::default().fg(HUD_DIM)),
        Span::styled("●", Style::default().fg(tint)),
        Span::styled(format!(" {phase} "), Style::default().fg(HUD_TEXT)),
        Span::styled("╞", Style::default().fg(HUD_DIM)),
    ]);

    let block = Block::default()
        .title_top(title)
        .title_bottom(status_bar)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON_CYAN))
        .style(Style::default().bg(HUD_BG));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [map_area, log_area, footer_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(LOG_HEIGHT),
        Constraint::Length(1),
    ])
    .areas(inner);

    f.render_widget(MapWidget { app: &mut *app }, map_area);

    render_distance_log(f, app, log_area);

    render_keybind_footer(f, footer_area);
}

fn render_distance_log(f: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .distance_log
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|line| {
            Line::from(vec![
                Span::styled("» ", Style::default().fg(NEON_YELLOW)),
                Span::styled(line.as_str(), Style::default().fg(HUD_TEXT)),
            ])
        })
        .collect();

    let log = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(vec![
                    Span::styled("┤ ", Style::default().fg(HUD_DIM)),
                    Span::styled("DISTANCE LOG", Style::default().fg(NEON_CYAN)),
                    Span::styled(" ├", Style::default().fg(HUD_DIM)),
                ]))
                .border_style(Style::default().fg(NEON_CYAN)),
        )
        .style(Style::default().fg(HUD_TEXT).bg(HUD_BG));

    f.render_widget(log, area);
}

fn render_keybind_footer(f: &mut Frame, area: Rect) {
    let legend = Line::from(vec![
        Span::styled(" [", Style::default().fg(HUD_DIM)),
        Span::styled("Click", Style::default().fg(NEON_YELLOW)),
        Span::styled("]Station  [", Style::default().fg(HUD_DIM)),
        Span::styled("N", Style::default().fg(NEON_YELLOW)),
        Span::styled("]ext hour  [", Style::default().fg(HUD_DIM)),
        Span::styled("Q", Style::default().fg(NEON_YELLOW)),
        Span::styled("]uit", Style::default().fg(HUD_DIM)),
    ]);

    let footer = Paragraph::new(legend).style(Style::default().bg(HUD_BG));
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EventSink;
    use crate::config::Config;
    use ratatui::crossterm::event::MouseButton;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        App::new(MapLayer::world().unwrap(), &Config::default())
    }

    fn draw(app: &mut App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn render_records_map_area_for_clicks() {
        let mut app = app();
        draw(&mut app, 80, 30);
        // Border on every side, log panel and footer below the map.
        assert_eq!(app.map_area, Rect::new(1, 1, 78, 30 - 2 - LOG_HEIGHT - 1));
        assert_eq!(app.viewport.width, 78.0);
    }

    #[test]
    fn stations_and_paths_show_on_the_map() {
        let mut app = app();
        draw(&mut app, 80, 30);
        let area = app.map_area;

        app.on_mouse_press(MouseButton::Left, area.width as f64 * 0.25, area.height as f64 * 0.5);
        app.on_mouse_press(MouseButton::Left, area.width as f64 * 0.75, area.height as f64 * 0.5);

        let buf = draw(&mut app, 80, 30);
        let symbols: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert_eq!(symbols.matches(STATION_GLYPH).count(), 2);
        assert!(symbols.contains(PATH_GLYPH));
        assert!(symbols.contains("Distance between stations:"));
    }

    #[test]
    fn map_is_textured_with_half_blocks() {
        let mut app = app();
        let buf = draw(&mut app, 40, 20);
        let area = app.map_area;
        let cell = &buf[(area.x + area.width / 2, area.y + area.height / 2)];
        assert_eq!(cell.symbol(), "▀");
        assert!(matches!(cell.fg, Color::Rgb(..)));
    }
}
