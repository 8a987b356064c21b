mod app;
mod config;
mod geodesy;
mod great_circle;
mod map;
mod projection;
mod raster;
mod render;
mod sun;
mod tui;
mod ui;

use app::App;
use config::{Command, Config};
use map::MapLayer;
use std::error::Error;
use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match Config::load()? {
        Command::Run(config) => config,
        Command::Help => {
            println!("{}", config::USAGE);
            return Ok(());
        }
    };

    // The TUI owns stdout, so logs go to a file.
    let log_file = File::create(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    info!(?config, "starting terra-route");

    let map = MapLayer::world().map_err(|e| {
        error!(error = %e, "world raster failed to decode");
        e
    })?;
    info!(
        width = map.raster().width(),
        height = map.raster().height(),
        "world raster decoded"
    );

    let mut app = App::new(map, &config);
    let mut terminal = tui::init()?;

    let res = run_app(&mut terminal, &mut app);

    tui::restore()?;

    for line in &app.distance_log {
        println!("{line}");
    }
    res?;
    Ok(())
}

fn run_app(terminal: &mut tui::Tui, app: &mut App) -> io::Result<()> {
    let poll_interval = Duration::from_millis(100);

    while !app.should_quit {
        if app.take_redraw() {
            terminal.draw(|f| ui::render(f, app))?;
        }

        if ratatui::crossterm::event::poll(poll_interval)? {
            app.handle_events()?;
        }
    }
    Ok(())
}
