//! Navigation map: course geometry and own-ship state in the main panel.
//!
//! The map redraws completely every time it is drawn; there is no dirty
//! tracking inside it. One draw pass:
//!
//! 1. Rotate the world by the aircraft heading and center it on the
//!    aircraft position (which lands on the reference point, three quarters
//!    down the panel).
//! 2. Auto-zoom, if enabled (see [`zoom_basis`] and [`blend_scale`]).
//! 3. Draw, later items on top: corner polyline, flight lines, tie lines,
//!    waypoints, destination, then (unless panning) the trail, the aircraft
//!    icon and, while on a line, the cross-track readout.
//!
//! # Line Colors
//!
//! | Line | Color |
//! |------|-------|
//! | current target | white, plus grey entry/exit extensions |
//! | next target | blue |
//! | blocked | dark red |
//! | other | green |
//!
//! Targets are matched by identity against the course's current/next
//! pointers, so two legs with identical coordinates never share a color.
//!
//! # Clipping
//!
//! Lines and point markers are clipped to the panel inset by
//! [`MAP_MARGIN`]; waypoint icons use a larger inset so the icon and its
//! caption stay inside the panel.

mod trail;

pub use trail::Trail;

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;

use crate::colors::{LINE_BLOCKED, LINE_NEUTRAL, MUTED_GREY, TARGET_CURRENT, TARGET_NEXT, TRAIL, WHITE};
use crate::config::{
    ICON_MARGIN_X, ICON_MARGIN_Y, LINE_EXTENSION, MAP_MARGIN, XTE_MAX, XTE_MIN, ZOOM_GAIN, ZOOM_RETAIN, ZOOM_STEP,
};
use crate::display::Surface;
use crate::frame::{Command, DrawContext, FrameGeometry, Reply, Widget};
use crate::geometry::{Boundary, Coord, Line, Transform, clip_line, point_in_boundary};
use crate::sources::{Course, FlightData, Leg, Side, Waypoint};
use crate::styles::{CLOCK_FONT, SMALL_FONT, VALUE_FONT, text_style};
use crate::widgets::Icon;
use crate::widgets::primitives::{draw_text_centered, draw_thick_line, stroke_circle};

/// Longest waypoint caption drawn on the map.
const CAPTION_MAX: usize = 9;

// =============================================================================
// Zoom
// =============================================================================

/// Distance the auto-zoom keeps in view.
///
/// `diag` is the viewport's height/width ratio times twice the turn radius.
/// It is used instead of the distance to go when it is larger, or when the
/// aircraft is already on its line.
pub fn zoom_basis(width: u32, height: u32, turn_radius: f64, distance_to_go: f64, on_line: bool) -> f64 {
    let diag = f64::from(height) / f64::from(width.max(1)) * (turn_radius * 2.0);
    if diag > distance_to_go || on_line { diag } else { distance_to_go }
}

/// One auto-zoom step: first-order low-pass toward the basis.
#[inline]
pub fn blend_scale(scale: f64, basis: f64) -> f64 { scale * ZOOM_RETAIN + ZOOM_GAIN / basis }

/// Scale that [`blend_scale`] leaves unchanged for `basis`.
#[inline]
pub fn equilibrium_scale(basis: f64) -> f64 { ZOOM_GAIN / ((1.0 - ZOOM_RETAIN) * basis) }

// =============================================================================
// Map Widget
// =============================================================================

/// Map renderer state: transform, trail and zoom mode.
pub struct NavigationMap {
    transform: Transform,
    trail: Trail,
    auto_zoom: bool,
    turn_radius: f64,
}

impl NavigationMap {
    /// Map for `frame` with auto-zoom on.
    pub fn new(frame: &FrameGeometry, turn_radius: f64) -> Self {
        let mut transform = Transform::new();
        transform.set_reference_point(reference_point(frame));
        Self { transform, trail: Trail::new(), auto_zoom: true, turn_radius }
    }

    #[inline]
    pub const fn scale(&self) -> f64 { self.transform.scale() }

    #[inline]
    pub const fn auto_zoom(&self) -> bool { self.auto_zoom }

    #[inline]
    pub const fn trail(&self) -> &Trail { &self.trail }

    /// Zoom in one step and hand control to the operator.
    pub fn zoom_in(&mut self) {
        self.transform.set_scale(self.transform.scale() * ZOOM_STEP);
        self.auto_zoom = false;
    }

    /// Zoom out one step and hand control to the operator.
    pub fn zoom_out(&mut self) {
        self.transform.set_scale(self.transform.scale() / ZOOM_STEP);
        self.auto_zoom = false;
    }

    pub fn enable_auto_zoom(&mut self) { self.auto_zoom = true; }

    fn update_auto_zoom(&mut self, frame: &FrameGeometry, course: &dyn Course) {
        let basis = zoom_basis(frame.width, frame.height, self.turn_radius, course.distance_to_go(), course.on_line());
        if basis > 0.0 && basis.is_finite() {
            self.transform.set_scale(blend_scale(self.transform.scale(), basis));
        }
    }

    // -------------------------------------------------------------------------
    // Plotting
    // -------------------------------------------------------------------------

    /// Transform, clip and draw one world line.
    fn plot_line(&self, surface: &mut Surface, clip: &Boundary, line: &Line, color: Rgb565) {
        let screen = self.transform.transform_line(line);
        if let Some(visible) = clip_line(clip, &screen)
            && visible.length() > 0.0
        {
            draw_thick_line(surface, visible.begin.to_point(), visible.end.to_point(), color);
        }
    }

    fn plot_corner_points(&self, surface: &mut Surface, clip: &Boundary, corners: &[Coord]) {
        for pair in corners.windows(2) {
            self.plot_line(surface, clip, &Line::new(pair[0], pair[1]), MUTED_GREY);
        }
    }

    fn plot_leg(&self, surface: &mut Surface, clip: &Boundary, course: &dyn Course, leg: &Leg) {
        if course.current_target().is_leg(leg) {
            self.plot_line(surface, clip, &leg.line, TARGET_CURRENT);
            let v = (leg.line.end - leg.line.begin).unit() * LINE_EXTENSION;
            self.plot_line(surface, clip, &Line::new(leg.line.begin, leg.line.begin - v), MUTED_GREY);
            self.plot_line(surface, clip, &Line::new(leg.line.end, leg.line.end + v), MUTED_GREY);
            return;
        }
        let color = if course.next_target().is_leg(leg) {
            TARGET_NEXT
        } else if leg.blocked {
            LINE_BLOCKED
        } else {
            LINE_NEUTRAL
        };
        self.plot_line(surface, clip, &leg.line, color);
    }

    fn plot_waypoint(&self, surface: &mut Surface, f: &FrameGeometry, clip: &Boundary, course: &dyn Course, wp: &Waypoint) {
        let highlight = if course.next_target().is_waypoint(wp) {
            Some(TARGET_NEXT)
        } else if course.current_target().is_waypoint(wp) {
            Some(TARGET_CURRENT)
        } else {
            None
        };

        let icon_clip = clip.inset(f64::from(ICON_MARGIN_X), f64::from(ICON_MARGIN_Y));
        let pos = self.transform.transform(wp.position);
        Icon::from(wp.kind).plot(surface, pos - Coord::new(0.0, 10.0), &icon_clip);

        if !point_in_boundary(&icon_clip, pos) {
            return;
        }
        let caption: String<16> = wp.caption.chars().take(CAPTION_MAX).collect();
        let below = pos.to_point() + Point::new(0, 8);
        match highlight {
            Some(color) => {
                stroke_circle(surface, pos.to_point(), 12, color);
                draw_text_centered(surface, &caption, below, text_style(CLOCK_FONT, color, Some(f.color)));
            }
            None => {
                draw_text_centered(surface, &caption, below, text_style(SMALL_FONT, LINE_NEUTRAL, Some(f.color)));
            }
        }
    }

    fn plot_dest_point(&self, surface: &mut Surface, clip: &Boundary, dest: Coord) {
        let pos = self.transform.transform(dest);
        if point_in_boundary(clip, pos) {
            stroke_circle(surface, pos.to_point(), 3, WHITE);
            stroke_circle(surface, pos.to_point(), 2, WHITE);
        }
    }

    fn plot_trail(&self, surface: &mut Surface, clip: &Boundary) {
        for sample in self.trail.iter_recent() {
            let pos = self.transform.transform(sample);
            if point_in_boundary(clip, pos) {
                let p = pos.to_point();
                let cross = [p, p + Point::new(1, 0), p - Point::new(1, 0), p + Point::new(0, 1), p - Point::new(0, 1)];
                surface.draw_iter(cross.map(|q| Pixel(q, TRAIL))).ok();
            }
        }
    }

    fn show_cross_track_error(&self, surface: &mut Surface, f: &FrameGeometry, course: &dyn Course) {
        let xte = course.cross_track();
        if !(xte.error > XTE_MIN && xte.error <= XTE_MAX) {
            return;
        }
        let reference = self.transform.reference_point().to_point();
        let mut text: String<16> = String::new();
        let (written, at) = match xte.side {
            Side::Right => (write!(text, "<< {:4.0}", xte.error), reference - Point::new(50, 0)),
            Side::Left => (write!(text, "{:<4.0} >>", xte.error), reference + Point::new(50, 0)),
        };
        if written.is_ok() {
            draw_text_centered(surface, &text, at, text_style(VALUE_FONT, WHITE, Some(f.color)));
        }
    }

    fn plot_aircraft_motion(&mut self, surface: &mut Surface, clip: &Boundary, flight: &FlightData) {
        self.trail.push(flight.position);
        self.plot_trail(surface, clip);
        Icon::Aircraft.plot(surface, self.transform.reference_point(), clip);
    }
}

/// Screen point the aircraft is drawn at: horizontally centered, three
/// quarters of the way down.
fn reference_point(f: &FrameGeometry) -> Coord {
    Coord::new(f64::from(f.x) + f64::from(f.width / 2), f64::from(f.y) + f64::from((f.height / 4) * 3))
}

impl Widget for NavigationMap {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, ctx: &DrawContext<'_>) {
        let course = ctx.sources.course;
        let flight = ctx.sources.flight;

        self.transform.set_rotation(flight.heading_sin, flight.heading_cos);
        self.transform.set_current_position(flight.position);
        if self.auto_zoom {
            self.update_auto_zoom(f, course);
        }

        let margin = f64::from(MAP_MARGIN);
        let clip = f.boundary().inset(margin, margin);

        self.plot_corner_points(surface, &clip, course.corner_points());
        for leg in course.flight_lines().iter().chain(course.tie_lines()) {
            self.plot_leg(surface, &clip, course, leg);
        }
        for wp in course.waypoints() {
            self.plot_waypoint(surface, f, &clip, course, wp);
        }
        self.plot_dest_point(surface, &clip, course.dest_point());

        if !flight.panning {
            self.plot_aircraft_motion(surface, &clip, flight);
            if course.on_line() {
                self.show_cross_track_error(surface, f, course);
            }
        }
    }

    fn control(&mut self, command: Command) -> Reply {
        match command {
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::ZoomAuto => self.enable_auto_zoom(),
            _ => return Reply::Ignored,
        }
        Reply::Changed
    }
}
