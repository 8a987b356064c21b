use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use std::io;
use tracing::{debug, info};

use crate::config::Config;
use crate::geodesy::{distance_report, haversine_distance};
use crate::great_circle::Path;
use crate::map::MapLayer;
use crate::projection::{mercator_to_lon_lat, screen_to_mercator, MercatorPoint, ScreenPoint, Vec3};
use crate::sun::{sun_direction, HOURS_PER_DAY};

// Keep the distance log bounded, like a scrollback.
const DISTANCE_LOG_LIMIT: usize = 100;

/// A placed point on the map. Never moves once created.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Station {
    mercator: MercatorPoint,
}

impl Station {
    pub fn new(mercator: MercatorPoint) -> Self {
        Self { mercator }
    }

    pub fn mercator(&self) -> MercatorPoint {
        self.mercator
    }
}

/// Size of the drawable area in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Pixel position (origin top-left, Y down) to normalized screen coordinates.
    pub fn to_screen(&self, pixel_x: f64, pixel_y: f64) -> ScreenPoint {
        ScreenPoint::new(
            2.0 * pixel_x / self.width - 1.0,
            1.0 - 2.0 * pixel_y / self.height,
        )
    }
}

/// Receives input from the host window.
pub trait EventSink {
    fn on_mouse_press(&mut self, button: MouseButton, pixel_x: f64, pixel_y: f64);
    fn on_key_press(&mut self, key: KeyCode);
}

pub struct App {
    pub should_quit: bool,
    pub viewport: Viewport,
    /// Terminal rectangle the map was last drawn into.
    pub map_area: Rect,

    pub map: MapLayer,
    pub stations: Vec<Station>,
    pub paths: Vec<Path>,
    pub distance_log: Vec<String>,

    pub current_hour: u32,
    pub sun_direction: Vec3,

    path_samples: usize,
    earth_radius_km: f64,
    redraw: bool,
}

impl App {
    pub fn new(map: MapLayer, config: &Config) -> Self {
        let current_hour = config.start_hour % HOURS_PER_DAY;
        Self {
            should_quit: false,
            viewport: Viewport::new(1.0, 1.0),
            map_area: Rect::default(),
            map,
            stations: Vec::new(),
            paths: Vec::new(),
            distance_log: Vec::new(),
            current_hour,
            sun_direction: sun_direction(current_hour),
            path_samples: config.path_samples,
            earth_radius_km: config.earth_radius_km,
            redraw: true,
        }
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Returns whether a redraw was requested and clears the request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Remembers where the map was drawn so clicks can be mapped back onto it.
    pub fn set_map_area(&mut self, area: Rect) {
        if self.map_area != area {
            self.map_area = area;
            self.viewport = Viewport::new(area.width as f64, area.height as f64);
        }
    }

    pub fn handle_events(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(_, _) => self.request_redraw(),
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.on_key_press(key.code);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let MouseEventKind::Down(button) = mouse.kind else {
            return;
        };
        let area = self.map_area;
        if !area.contains((mouse.column, mouse.row).into()) {
            return;
        }
        // Aim at the middle of the clicked cell.
        let pixel_x = (mouse.column - area.x) as f64 + 0.5;
        let pixel_y = (mouse.row - area.y) as f64 + 0.5;
        self.on_mouse_press(button, pixel_x, pixel_y);
    }

    pub fn place_station(&mut self, mercator: MercatorPoint) {
        self.stations.push(Station::new(mercator));
        info!(
            x = mercator.x,
            y = mercator.y,
            count = self.stations.len(),
            "station placed"
        );

        if let [.., start, end] = self.stations.as_slice() {
            let (start, end) = (start.mercator(), end.mercator());
            let path = Path::between(start, end, self.path_samples);
            info!(segments = path.segments().len(), "path built");
            self.paths.push(path);

            let distance = haversine_distance(
                mercator_to_lon_lat(start),
                mercator_to_lon_lat(end),
                self.earth_radius_km,
            );
            let line = distance_report(distance);
            info!(distance_km = distance, "{line}");
            self.distance_log.push(line);
            if self.distance_log.len() > DISTANCE_LOG_LIMIT {
                self.distance_log.remove(0);
            }
        }
    }

    pub fn advance_hour(&mut self) {
        self.current_hour = (self.current_hour + 1) % HOURS_PER_DAY;
        self.sun_direction = sun_direction(self.current_hour);
        debug!(hour = self.current_hour, "sun moved");
    }
}

impl EventSink for App {
    fn on_mouse_press(&mut self, button: MouseButton, pixel_x: f64, pixel_y: f64) {
        if button != MouseButton::Left {
            return;
        }
        let screen = self.viewport.to_screen(pixel_x, pixel_y);
        self.place_station(screen_to_mercator(screen));
        self.request_redraw();
    }

    fn on_key_press(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.advance_hour();
                self.request_redraw();
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }
}
