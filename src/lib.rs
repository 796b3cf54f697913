// Crate-level lints: Allow common graphics patterns that pedantic lints flag
#![allow(clippy::cast_possible_truncation)] // Intentional f64->i32, u32->i32 casts for pixel math
#![allow(clippy::cast_precision_loss)] // u32/i32->f32 in graphics calculations
#![allow(clippy::cast_possible_wrap)] // u32->i32 wrapping is acceptable for our value ranges
#![allow(clippy::cast_sign_loss)] // i32->u32 where we know sign is positive
#![allow(clippy::too_many_lines)] // instrument setup is long but flat
#![allow(clippy::similar_names)] // lat/lon, agl/msl pairs are clear

//! Cockpit display engine for the GPS-aided Pilot Guidance System (GPGS).
//!
//! The display is a fixed set of instruments around a main panel:
//!
//! - Altitude and tracking scale bars, compass, clock and datum label
//! - A column of numeric readouts (heading, ground speed, distance to go,
//!   GPS fix, altitude, position or magnetometer/radar values)
//! - Current and next target readouts along the footer
//! - The main panel: GPS log, course file chooser, navigation map or
//!   magnetometer profile
//!
//! # Update Model
//!
//! Collaborators (GPS, flight computation, course planner, magnetometer,
//! radar altimeter, keypad) report what changed as a [`ChangeMask`]. Once
//! per loop iteration [`GuidanceDisplay::run_update`] redraws exactly the
//! instruments the mask touches into one in-memory surface and flips it to
//! the physical display. Instruments read data only through [`Sources`]
//! while they draw; nothing is cached between passes except presentation
//! state (label text, colors, samples).
//!
//! # Frames
//!
//! Every instrument is a [`Frame`]: geometry, an optional refresh callback
//! bound to one data source, and a draw step. See [`frame`] for the
//! protocol and [`composition`] for the routing table.
//!
//! # Running
//!
//! The `gpgs-sim` binary (feature `window`) drives the engine with
//! simulated collaborators in an SDL window:
//!
//! ```text
//! cargo run --features window --bin gpgs-sim -- <map directory>
//! ```
//!
//! Keys: `Enter`/`Esc`/arrows in the chooser and map, `Z`/`S`/`A` zoom,
//! `R` magnetometer display, `V` sensor profile, `Q` quit.

pub mod changes;
pub mod colors;
pub mod composition;
pub mod config;
pub mod display;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod instruments;
pub mod map;
pub mod profiling;
pub mod screens;
pub mod simulation;
pub mod sources;
pub mod styles;
pub mod views;
pub mod widgets;

pub use changes::{ChangeMask, EventMask};
pub use composition::{GuidanceDisplay, UpdateStats, redraw_plan};
pub use config::GuidanceConfig;
pub use display::{EventSource, HeadlessDisplay, Key, KeyQueue, PhysicalDisplay, Surface};
pub use error::{CourseError, CourseResult, DisplayError, DisplayResult};
pub use frame::{Frame, FrameGeometry};
pub use sources::{Course, Sources};
pub use views::View;
