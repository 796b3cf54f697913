//! Moving-tape scale bar with a converging pointer.
//!
//! The bar scans its long axis one pixel row (or column) at a time. Each
//! position asks the owner's [`ColorRule`] for a color, so the bar itself
//! knows nothing about altitude or tracking; the owner encodes its
//! thresholds in the rule and hands over the numbers it needs through a
//! [`RuleContext`].
//!
//! Near the midpoint (within half the bar thickness) the row first gets a
//! full-width guide line in the pointer color, then the rule color for a
//! width equal to the distance from the midpoint. Further away the rule
//! color is drawn at the fixed tick width. The result is a tape whose
//! colored edge narrows into a pointer tip at the midpoint:
//!
//! ```text
//!  ###########
//!  ###########
//!  #####......    '#' rule color, '.' pointer color
//!  ###........
//!  #..........    <- midpoint
//!  ###........
//!  #####......
//!  ###########
//! ```
//!
//! The label sits on the pointer, drawn on the pointer color.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;

use crate::colors::{BLACK, TAPE_DIM, TAPE_TICK, WHITE};
use crate::display::Surface;
use crate::frame::{DrawContext, FrameGeometry, Widget};
use crate::styles::{CLOCK_FONT, text_style};
use crate::widgets::primitives::{draw_hspan, draw_text, draw_vspan};

/// Longest label shown; anything longer is replaced by [`PLACEHOLDER`].
pub const LABEL_MAX: usize = 4;

/// Shown instead of a label that does not fit.
pub const PLACEHOLDER: &str = "----";

/// Edge the tape is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl PointerEdge {
    /// True if the bar scans vertically.
    #[inline]
    const fn is_vertical(self) -> bool { matches!(self, Self::Left | Self::Right) }
}

/// Numbers a [`ColorRule`] works from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RuleContext {
    /// Current instrument value (altitude, tracking, ...).
    pub value: f64,
    /// Value the operator should hold.
    pub reference: f64,
    /// Value below which the tape warns.
    pub warning: f64,
}

/// Color for scan position `pos` given the bar midpoint `mid`.
pub type ColorRule = fn(pos: i32, mid: i32, ctx: &RuleContext) -> Rgb565;

/// Plain tape: a brighter tick every 50 pixels.
pub fn default_rule(pos: i32, mid: i32, _ctx: &RuleContext) -> Rgb565 {
    let scaled = (mid - pos) / 5;
    if scaled % 10 == 0 { TAPE_TICK } else { TAPE_DIM }
}

/// Scale bar state.
pub struct ScaleBar {
    edge: PointerEdge,
    text: String<8>,
    text_color: Rgb565,
    pointer_color: Rgb565,
    rule: ColorRule,
    context: RuleContext,
}

impl ScaleBar {
    pub fn new(edge: PointerEdge) -> Self {
        let mut bar = Self {
            edge,
            text: String::new(),
            text_color: WHITE,
            pointer_color: BLACK,
            rule: default_rule,
            context: RuleContext::default(),
        };
        bar.set_text(PLACEHOLDER);
        bar
    }

    /// Replace the label. Text longer than [`LABEL_MAX`] shows the placeholder.
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        let shown = if text.len() > LABEL_MAX { PLACEHOLDER } else { text };
        // Both candidates fit the buffer.
        self.text.push_str(shown).ok();
    }

    /// Replace the label with formatted text.
    pub fn set_text_fmt(&mut self, args: core::fmt::Arguments<'_>) {
        let mut buf: String<16> = String::new();
        if buf.write_fmt(args).is_err() {
            self.set_text(PLACEHOLDER);
        } else {
            self.set_text(&buf);
        }
    }

    #[inline]
    pub fn text(&self) -> &str { &self.text }

    pub fn set_color_rule(&mut self, rule: ColorRule, context: RuleContext) {
        self.rule = rule;
        self.context = context;
    }

    #[inline]
    pub fn set_pointer_color(&mut self, color: Rgb565) { self.pointer_color = color; }

    #[inline]
    pub const fn pointer_color(&self) -> Rgb565 { self.pointer_color }

    #[inline]
    pub fn set_text_color(&mut self, color: Rgb565) { self.text_color = color; }

    #[inline]
    pub const fn edge(&self) -> PointerEdge { self.edge }

    /// Top-left of the label for this edge.
    fn label_position(&self, f: &FrameGeometry) -> Point {
        let (w, h) = (f.width as i32, f.height as i32);
        match self.edge {
            PointerEdge::Left => Point::new(f.x + w / 4, f.y + h / 2 - w / 8),
            PointerEdge::Right => Point::new(f.x + w / 8, f.y + h / 2 - w / 16),
            PointerEdge::Top => Point::new(f.x + w / 2 - h / 4, f.y + h / 2),
            PointerEdge::Bottom => Point::new(f.x + w / 2 - h / 4, f.y + h / 2 - h / 4),
        }
    }
}

impl Widget for ScaleBar {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
        let (start, len, thickness) =
            if self.edge.is_vertical() { (f.y, f.height, f.width) } else { (f.x, f.width, f.height) };
        let mid = start + (len / 2) as i32;
        let pointer_width = (thickness / 2) as i32;
        let span = thickness as i32 - 1;

        for pos in start..start + len as i32 {
            let distance = (mid - pos).abs();
            let in_pointer = distance <= pointer_width;
            let width = if in_pointer { distance } else { pointer_width };
            let color = (self.rule)(pos, mid, &self.context);

            match self.edge {
                PointerEdge::Left => {
                    if in_pointer {
                        draw_hspan(surface, f.x, pos, span, self.pointer_color);
                    }
                    draw_hspan(surface, f.x, pos, width, color);
                }
                PointerEdge::Right => {
                    if in_pointer {
                        draw_hspan(surface, f.x, pos, span, self.pointer_color);
                    }
                    draw_hspan(surface, f.x + span - width, pos, width, color);
                }
                PointerEdge::Top => {
                    if in_pointer {
                        draw_vspan(surface, pos, f.y, span, self.pointer_color);
                    }
                    draw_vspan(surface, pos, f.y, width, color);
                }
                PointerEdge::Bottom => {
                    if in_pointer {
                        draw_vspan(surface, pos, f.y, span, self.pointer_color);
                    }
                    draw_vspan(surface, pos, f.y + span - width, width, color);
                }
            }
        }

        let style = text_style(CLOCK_FONT, self.text_color, Some(self.pointer_color));
        draw_text(surface, &self.text, self.label_position(f), style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeMask;
    use crate::colors::{GREEN, RED, shade};
    use crate::frame::test_support::{EmptyCourse, Snapshots};
    use crate::frame::{Frame, Instrument};

    const NEUTRAL: Rgb565 = shade(5, 5, 5);
    const TICK: Rgb565 = RED;
    const POINTER: Rgb565 = GREEN;

    fn tick_every_ten(pos: i32, mid: i32, _ctx: &RuleContext) -> Rgb565 {
        if (mid - pos) % 10 == 0 { TICK } else { NEUTRAL }
    }

    fn draw_left_bar(bar: ScaleBar) -> Surface {
        let mut display = Surface::new(Size::new(64, 200));
        let course = EmptyCourse;
        let snapshots = Snapshots::default();
        let ctx = DrawContext { changes: ChangeMask::NONE, sources: snapshots.sources(&course) };
        let mut frame = Instrument::new("bar", FrameGeometry::new(0, 0, 40, 200, BLACK), bar).unwrap();
        frame.draw(&mut display, &ctx, true);
        display
    }

    fn left_bar() -> ScaleBar {
        let mut bar = ScaleBar::new(PointerEdge::Left);
        bar.set_pointer_color(POINTER);
        bar.set_color_rule(tick_every_ten, RuleContext::default());
        bar
    }

    // -------------------------------------------------------------------------
    // Labels
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_label_is_placeholder() {
        assert_eq!(ScaleBar::new(PointerEdge::Top).text(), PLACEHOLDER);
    }

    #[test]
    fn test_long_label_is_replaced() {
        let mut bar = ScaleBar::new(PointerEdge::Left);
        bar.set_text("263");
        assert_eq!(bar.text(), "263");
        bar.set_text("12345");
        assert_eq!(bar.text(), PLACEHOLDER, "five characters do not fit");
        bar.set_text_fmt(format_args!("{:+.0}", 7.4));
        assert_eq!(bar.text(), "+7");
    }

    #[test]
    fn test_label_position_per_edge() {
        let f = FrameGeometry::new(0, 60, 60, 390, BLACK);
        assert_eq!(ScaleBar::new(PointerEdge::Left).label_position(&f), Point::new(15, 60 + 195 - 7));
        let top = FrameGeometry::new(60, 0, 460, 60, BLACK);
        assert_eq!(ScaleBar::new(PointerEdge::Top).label_position(&top), Point::new(60 + 230 - 15, 30));
    }

    // -------------------------------------------------------------------------
    // Tape
    // -------------------------------------------------------------------------

    #[test]
    fn test_rule_selects_tick_at_distance_ten() {
        assert_eq!(tick_every_ten(90, 100, &RuleContext::default()), TICK, "90 is on the tick boundary");
        assert_eq!(tick_every_ten(95, 100, &RuleContext::default()), NEUTRAL);
    }

    #[test]
    fn test_pointer_region_draws_wedge() {
        let display = draw_left_bar(left_bar());
        // Row 90 is 10 px from the midpoint: guide line, then 10 px of tick color.
        assert_eq!(display.get_pixel(Point::new(0, 90)), TICK);
        assert_eq!(display.get_pixel(Point::new(10, 90)), TICK, "wedge is as wide as the distance");
        assert_eq!(display.get_pixel(Point::new(15, 90)), POINTER, "rest of the row is the guide line");
        assert_eq!(display.get_pixel(Point::new(39, 90)), POINTER, "guide line spans the bar");
        // Row 85 is neutral and 15 px wide.
        assert_eq!(display.get_pixel(Point::new(3, 85)), NEUTRAL);
        assert_eq!(display.get_pixel(Point::new(17, 85)), POINTER);
    }

    #[test]
    fn test_outside_pointer_uses_tick_width() {
        let display = draw_left_bar(left_bar());
        // Row 40 is 60 px away; pointer width is 20.
        assert_eq!(display.get_pixel(Point::new(20, 40)), TICK, "fixed width reaches half the bar");
        assert_eq!(display.get_pixel(Point::new(21, 40)), BLACK, "no guide line outside the pointer");
        assert_eq!(display.get_pixel(Point::new(5, 41)), NEUTRAL);
    }

    #[test]
    fn test_right_edge_mirrors_left() {
        let mut bar = ScaleBar::new(PointerEdge::Right);
        bar.set_pointer_color(POINTER);
        bar.set_color_rule(tick_every_ten, RuleContext::default());
        let display = draw_left_bar(bar);
        assert_eq!(display.get_pixel(Point::new(39, 90)), TICK, "wedge grows from the right edge");
        assert_eq!(display.get_pixel(Point::new(29, 90)), TICK);
        assert_eq!(display.get_pixel(Point::new(5, 90)), POINTER);
    }

    #[test]
    fn test_default_rule_ticks() {
        let ctx = RuleContext::default();
        assert_eq!(default_rule(100, 100, &ctx), TAPE_TICK, "midpoint is a tick");
        assert_eq!(default_rule(50, 100, &ctx), TAPE_TICK, "50 px away is a tick");
        assert_eq!(default_rule(90, 100, &ctx), TAPE_DIM);
    }
}
