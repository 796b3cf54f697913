//! GPGS cockpit display simulator.
//!
//! Runs the display engine in an SDL window with simulated collaborators:
//! a GPS receiver producing GGA sentences, a magnetometer, a radar
//! altimeter, an aircraft that flies the course and a demo course planner
//! that builds a survey block for whichever course file is chosen.
//!
//! # Usage
//!
//! ```text
//! gpgs-sim [MAP_DIRECTORY]
//! ```
//!
//! `MAP_DIRECTORY` overrides the configured map directory. Logging follows
//! `RUST_LOG` (default `info`).
//!
//! # Loop
//!
//! 1. Wait for a key or the event timeout
//! 2. Handle keys
//! 3. Sensors, flight, course: each reports its change flags
//! 4. One update pass with the combined mask, then metrics
//!
//! The loop ends on `Q`, a failed course load or closing the window.

use std::path::PathBuf;
use std::time::Instant;

use embedded_graphics::prelude::*;
use gpgs_display::config::{EVENT_TIMEOUT, SCREEN_HEIGHT, SCREEN_WIDTH};
use gpgs_display::display::SimulatorScreen;
use gpgs_display::profiling::LoopMetrics;
use gpgs_display::simulation::{DemoCourse, FlightSimulant, SensorSimulator};
use gpgs_display::{ChangeMask, DisplayResult, EventSource, GuidanceConfig, GuidanceDisplay};

/// Window pixel scale.
const WINDOW_SCALE: u32 = 2;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> DisplayResult<()> {
    let mut config = GuidanceConfig::default();
    if let Some(dir) = std::env::args_os().nth(1) {
        config.map_directory = PathBuf::from(dir);
    }
    log::info!("map directory {}", config.map_directory.display());

    let mut course = DemoCourse::new(config.catch_radius);
    let mut flight = FlightSimulant::new(&config);
    let mut sensors = SensorSimulator::new();
    let mut metrics = LoopMetrics::new();

    let screen = SimulatorScreen::new("GPGS", WINDOW_SCALE);
    let size = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    let mut display = GuidanceDisplay::init_display(screen, size, &config, sensors.sources(&course, flight.data()))?;

    let started = Instant::now();
    let mut last_step = started;
    loop {
        let events = display.display_mut().wait_for_event(EVENT_TIMEOUT);

        let mut mask = ChangeMask::NONE;
        if events.key_pressed {
            while let Some(key) = display.display_mut().take_key() {
                mask |= display.handle_input(key, &mut course);
                if mask.contains(ChangeMask::QUIT) {
                    break;
                }
            }
        }
        if mask.contains(ChangeMask::QUIT) {
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last_step).as_secs_f64();
        last_step = now;
        mask |= sensors.tick(now.duration_since(started).as_secs_f64(), flight.data());
        mask |= flight.step(dt, &course);
        mask |= course.update(flight.data());

        let update_start = Instant::now();
        let stats = display.run_update(mask, sensors.sources(&course, flight.data()));
        metrics.record_update(stats, update_start.elapsed());
        metrics.report_periodically();
    }

    log::info!("{} update passes in {}", metrics.iterations, metrics.uptime_string());
    let _screen = display.teardown_display();
    Ok(())
}
