//! Frames: independently redrawable screen regions.
//!
//! Every instrument on screen is a [`Frame`]. The composition only ever holds
//! `Box<dyn Frame>` handles and drives them through the same three steps:
//!
//! 1. **Refresh**: if the instrument registered a refresh callback and the
//!    iteration's change mask overlaps its interest, the callback runs with
//!    the one data source it was bound to and updates presentation state
//!    (label text, colors, samples).
//! 2. **Border**: unless suppressed, the frame region is filled with the
//!    frame color and bevelled. Readouts that repaint their own content are
//!    drawn with the border suppressed to save the fill.
//! 3. **Content**: the instrument draws itself.
//!
//! Concrete instruments implement the small [`Widget`] trait and are wrapped
//! in [`Instrument`], which supplies geometry, the refresh binding and the
//! protocol above.
//!
//! # Lifetime
//!
//! `destroy` releases private state and is guarded so it runs once. Dropping
//! an [`Instrument`] destroys it, which is what rolls back a partially built
//! composition when construction fails halfway.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use std::path::PathBuf;

use crate::changes::ChangeMask;
use crate::display::Surface;
use crate::error::{DisplayError, DisplayResult};
use crate::geometry::{Boundary, Coord};
use crate::sources::{Bound, Source, Sources};
use crate::widgets::primitives::draw_bevel_box;

// =============================================================================
// Geometry
// =============================================================================

/// Position, size and color of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Fill color of the border.
    pub color: Rgb565,
}

impl FrameGeometry {
    pub const fn new(x: i32, y: i32, width: u32, height: u32, color: Rgb565) -> Self {
        Self { x, y, width, height, color }
    }

    #[inline]
    pub const fn top_left(&self) -> Point { Point::new(self.x, self.y) }

    #[inline]
    pub const fn rectangle(&self) -> Rectangle { Rectangle::new(self.top_left(), Size::new(self.width, self.height)) }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(&self) -> i32 { self.x + self.width as i32 }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> i32 { self.y + self.height as i32 }

    #[inline]
    pub const fn center(&self) -> Point {
        Point::new(self.x + (self.width / 2) as i32, self.y + (self.height / 2) as i32)
    }

    /// The frame rectangle as a clipping boundary.
    #[inline]
    pub fn boundary(&self) -> Boundary { Boundary::from_rect(self.x, self.y, self.width, self.height) }

    /// Center as a screen coordinate.
    #[inline]
    pub fn center_coord(&self) -> Coord { Coord::new(f64::from(self.center().x), f64::from(self.center().y)) }
}

/// Paint a frame's border.
#[inline]
pub fn draw_border(surface: &mut Surface, geometry: &FrameGeometry) {
    draw_bevel_box(surface, geometry.x, geometry.y, geometry.width, geometry.height, geometry.color);
}

// =============================================================================
// Draw Context
// =============================================================================

/// What one update pass is about, plus read access to the data.
#[derive(Clone, Copy)]
pub struct DrawContext<'a> {
    pub changes: ChangeMask,
    pub sources: Sources<'a>,
}

// =============================================================================
// Panel Control
// =============================================================================

/// Operator commands routed to the main panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    ZoomAuto,
    SelectPrevious,
    SelectNext,
    ChosenFile,
}

/// Outcome of a [`Command`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// The frame does not understand the command.
    Ignored,
    /// Applied; the frame changed.
    Changed,
    /// Understood but nothing changed (e.g. already at the end of a list).
    Unchanged,
    /// The selected file.
    File(PathBuf),
    /// No file is selected (the exit entry).
    NoFile,
}

// =============================================================================
// Frame Interface
// =============================================================================

/// Drawable unit as seen by the composition.
pub trait Frame {
    /// Instrument role, for logs and errors.
    fn name(&self) -> &'static str;

    fn geometry(&self) -> &FrameGeometry;

    /// Refresh, border (unless suppressed), then content.
    fn draw(&mut self, surface: &mut Surface, ctx: &DrawContext<'_>, suppress_border: bool);

    /// Release private state. Only the first call has an effect.
    fn destroy(&mut self);

    /// Panel-specific operator command.
    fn control(&mut self, _command: Command) -> Reply { Reply::Ignored }
}

/// Content half of an instrument.
pub trait Widget {
    fn draw(&mut self, frame: &FrameGeometry, surface: &mut Surface, ctx: &DrawContext<'_>);

    fn destroy(&mut self) {}

    fn control(&mut self, _command: Command) -> Reply { Reply::Ignored }
}

/// Refresh callback: gets the widget, its frame (so it may recolor the
/// border) and the single source it was registered with.
pub type RefreshFn<W> = Box<dyn FnMut(&mut W, &mut FrameGeometry, Bound<'_>)>;

struct Refresh<W> {
    interest: ChangeMask,
    source: Source,
    callback: RefreshFn<W>,
}

/// A widget placed on screen.
pub struct Instrument<W: Widget> {
    name: &'static str,
    geometry: FrameGeometry,
    widget: W,
    refresh: Option<Refresh<W>>,
    destroyed: bool,
}

impl<W: Widget> Instrument<W> {
    /// Place `widget` in `geometry`. Empty frames are rejected.
    pub fn new(name: &'static str, geometry: FrameGeometry, widget: W) -> DisplayResult<Self> {
        if geometry.width == 0 || geometry.height == 0 {
            return Err(DisplayError::EmptyFrame { role: name });
        }
        Ok(Self { name, geometry, widget, refresh: None, destroyed: false })
    }

    /// Register a refresh callback run before drawing whenever the change
    /// mask overlaps `interest`.
    pub fn with_refresh<F>(mut self, interest: ChangeMask, source: Source, callback: F) -> Self
    where
        F: FnMut(&mut W, &mut FrameGeometry, Bound<'_>) + 'static,
    {
        self.refresh = Some(Refresh { interest, source, callback: Box::new(callback) });
        self
    }

    #[inline]
    pub const fn widget(&self) -> &W { &self.widget }

    #[inline]
    pub fn widget_mut(&mut self) -> &mut W { &mut self.widget }

    #[inline]
    pub fn set_color(&mut self, color: Rgb565) { self.geometry.color = color; }

    fn refresh(&mut self, ctx: &DrawContext<'_>) {
        if let Some(refresh) = self.refresh.as_mut()
            && refresh.interest.intersects(ctx.changes)
        {
            (refresh.callback)(&mut self.widget, &mut self.geometry, ctx.sources.bind(refresh.source));
        }
    }
}

impl<W: Widget> Frame for Instrument<W> {
    fn name(&self) -> &'static str { self.name }

    fn geometry(&self) -> &FrameGeometry { &self.geometry }

    fn draw(&mut self, surface: &mut Surface, ctx: &DrawContext<'_>, suppress_border: bool) {
        if self.destroyed {
            return;
        }
        self.refresh(ctx);
        if !suppress_border {
            draw_border(surface, &self.geometry);
        }
        self.widget.draw(&self.geometry, surface, ctx);
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.refresh = None;
        self.widget.destroy();
        log::trace!("destroyed {}", self.name);
    }

    fn control(&mut self, command: Command) -> Reply {
        if self.destroyed {
            return Reply::Ignored;
        }
        self.widget.control(command)
    }
}

impl<W: Widget> Drop for Instrument<W> {
    fn drop(&mut self) { self.destroy(); }
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::test_support::{EmptyCourse, Snapshots};
    use super::*;
    use crate::colors::{BEVEL_LIGHT, BLACK, GREEN, RED};

    /// Records what the surface looked like when its content was drawn.
    #[derive(Default)]
    struct Probe {
        saw_border: Option<bool>,
        refreshed: u32,
        destroyed: Rc<Cell<u32>>,
    }

    impl Widget for Probe {
        fn draw(&mut self, frame: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
            self.saw_border = Some(surface.get_pixel(frame.top_left()) == BEVEL_LIGHT);
        }

        fn destroy(&mut self) { self.destroyed.set(self.destroyed.get() + 1); }
    }

    fn geometry() -> FrameGeometry { FrameGeometry::new(4, 4, 30, 20, GREEN) }

    fn surface() -> Surface { Surface::new(Size::new(64, 48)) }

    #[test]
    fn test_suppressed_border_is_never_painted() {
        let course = EmptyCourse;
        let snapshots = Snapshots::default();
        let ctx = DrawContext { changes: ChangeMask::ALL, sources: snapshots.sources(&course) };
        let mut display = surface();
        let mut frame = Instrument::new("probe", geometry(), Probe::default()).unwrap();

        frame.draw(&mut display, &ctx, true);

        assert_eq!(frame.widget().saw_border, Some(false), "content ran without a border");
        assert_eq!(display.get_pixel(Point::new(4, 4)), BLACK, "border pixel untouched");
        assert_eq!(display.get_pixel(Point::new(15, 15)), BLACK, "fill untouched");
    }

    #[test]
    fn test_border_is_painted_before_content() {
        let course = EmptyCourse;
        let snapshots = Snapshots::default();
        let ctx = DrawContext { changes: ChangeMask::NONE, sources: snapshots.sources(&course) };
        let mut display = surface();
        let mut frame = Instrument::new("probe", geometry(), Probe::default()).unwrap();

        frame.draw(&mut display, &ctx, false);

        assert_eq!(frame.widget().saw_border, Some(true), "border existed when content drew");
        assert_eq!(display.get_pixel(Point::new(15, 15)), GREEN, "border fill uses the frame color");
    }

    #[test]
    fn test_refresh_runs_only_on_interest() {
        let course = EmptyCourse;
        let snapshots = Snapshots::default();
        let mut display = surface();
        let mut frame = Instrument::new("probe", geometry(), Probe::default()).unwrap().with_refresh(
            ChangeMask::GPS_UPDATE,
            Source::Gps,
            |probe: &mut Probe, _frame, bound| {
                assert!(matches!(bound, Bound::Gps(_)), "callback gets the source it registered");
                probe.refreshed += 1;
            },
        );

        let flight = DrawContext { changes: ChangeMask::FLIGHT_UPDATE, sources: snapshots.sources(&course) };
        frame.draw(&mut display, &flight, true);
        assert_eq!(frame.widget().refreshed, 0, "unrelated change does not refresh");

        let gps = DrawContext {
            changes: ChangeMask::GPS_UPDATE | ChangeMask::MAG_UPDATE,
            sources: snapshots.sources(&course),
        };
        frame.draw(&mut display, &gps, true);
        assert_eq!(frame.widget().refreshed, 1, "overlapping change refreshes once");
    }

    #[test]
    fn test_refresh_may_recolor_border() {
        let course = EmptyCourse;
        let snapshots = Snapshots::default();
        let mut display = surface();
        let mut frame = Instrument::new("probe", geometry(), Probe::default()).unwrap().with_refresh(
            ChangeMask::FLIGHT_UPDATE,
            Source::Flight,
            |_: &mut Probe, frame: &mut FrameGeometry, _| frame.color = RED,
        );
        let ctx = DrawContext { changes: ChangeMask::FLIGHT_UPDATE, sources: snapshots.sources(&course) };
        frame.draw(&mut display, &ctx, false);
        assert_eq!(display.get_pixel(Point::new(15, 15)), RED, "border drawn with refreshed color");
    }

    #[test]
    fn test_destroy_runs_once() {
        let counter = Rc::new(Cell::new(0));
        let probe = Probe { destroyed: Rc::clone(&counter), ..Probe::default() };
        let mut frame = Instrument::new("probe", geometry(), probe).unwrap();
        frame.destroy();
        frame.destroy();
        drop(frame);
        assert_eq!(counter.get(), 1, "explicit destroy plus drop releases once");
    }

    #[test]
    fn test_drop_destroys() {
        let counter = Rc::new(Cell::new(0));
        let frames: Vec<Box<dyn Frame>> = (0..3)
            .map(|_| {
                let probe = Probe { destroyed: Rc::clone(&counter), ..Probe::default() };
                Box::new(Instrument::new("probe", geometry(), probe).unwrap()) as Box<dyn Frame>
            })
            .collect();
        drop(frames);
        assert_eq!(counter.get(), 3, "dropping the collection releases every frame");
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let result = Instrument::new("empty", FrameGeometry::new(0, 0, 0, 10, GREEN), Probe::default());
        assert!(matches!(result, Err(DisplayError::EmptyFrame { role: "empty" })));
    }
}
