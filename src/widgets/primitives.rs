//! Low-level drawing primitives shared across instruments.
//!
//! These are intentionally simple and focused on a single responsibility.
//! All of them draw straight into the composed [`Surface`]; pixels outside
//! the surface are silently dropped by the framebuffer.
//!
//! # Bevel Box
//!
//! [`draw_bevel_box`] is the frame "border": the region is filled with the
//! frame color and edged with a 2px light bevel on the top/left and a 2px
//! dark bevel on the bottom/right. Because it fills, painting the border also
//! erases whatever the instrument drew last time.
//!
//! # Thick Line
//!
//! Course lines are three pixels wide: the line itself plus one parallel copy
//! on each side, offset horizontally for steep lines and vertically for flat
//! ones so the stroke keeps its width at any angle.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;

use crate::colors::{BEVEL_DARK, BEVEL_LIGHT, BLACK};
use crate::display::Surface;
use crate::styles::{CENTERED, TOP_LEFT};

/// Bevel thickness in pixels.
pub const BEVEL: u32 = 2;

/// Fill a rectangle and edge it with a light/dark bevel.
pub fn draw_bevel_box(display: &mut Surface, x: i32, y: i32, w: u32, h: u32, color: Rgb565) {
    if w == 0 || h == 0 {
        return;
    }
    fill_rect(display, x, y, w, h, color);

    let bevel_w = BEVEL.min(w);
    let bevel_h = BEVEL.min(h);
    let light = PrimitiveStyle::with_fill(BEVEL_LIGHT);
    let dark = PrimitiveStyle::with_fill(BEVEL_DARK);

    // Light edges first so the dark ones win in the shared corners.
    Rectangle::new(Point::new(x, y), Size::new(w, bevel_h)).into_styled(light).draw(display).ok();
    Rectangle::new(Point::new(x, y), Size::new(bevel_w, h)).into_styled(light).draw(display).ok();
    Rectangle::new(Point::new(x, y + (h - bevel_h) as i32), Size::new(w, bevel_h))
        .into_styled(dark)
        .draw(display)
        .ok();
    Rectangle::new(Point::new(x + (w - bevel_w) as i32, y), Size::new(bevel_w, h))
        .into_styled(dark)
        .draw(display)
        .ok();
}

/// Solid rectangle.
#[inline]
pub fn fill_rect(display: &mut Surface, x: i32, y: i32, w: u32, h: u32, color: Rgb565) {
    Rectangle::new(Point::new(x, y), Size::new(w, h))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)
        .ok();
}

/// One-pixel line between two points (inclusive).
#[inline]
pub fn draw_line(display: &mut Surface, from: Point, to: Point, color: Rgb565) {
    Line::new(from, to).into_styled(PrimitiveStyle::with_stroke(color, 1)).draw(display).ok();
}

/// Horizontal run of `len + 1` pixels starting at (`x`, `y`).
#[inline]
pub fn draw_hspan(display: &mut Surface, x: i32, y: i32, len: i32, color: Rgb565) {
    draw_line(display, Point::new(x, y), Point::new(x + len, y), color);
}

/// Vertical run of `len + 1` pixels starting at (`x`, `y`).
#[inline]
pub fn draw_vspan(display: &mut Surface, x: i32, y: i32, len: i32, color: Rgb565) {
    draw_line(display, Point::new(x, y), Point::new(x, y + len), color);
}

/// Three-pixel wide line.
pub fn draw_thick_line(display: &mut Surface, from: Point, to: Point, color: Rgb565) {
    draw_line(display, from, to, color);
    let offset = if (to.x - from.x).abs() <= (to.y - from.y).abs() { Point::new(1, 0) } else { Point::new(0, 1) };
    draw_line(display, from - offset, to - offset, color);
    draw_line(display, from + offset, to + offset, color);
}

/// Black box with grid lines every `step` pixels.
pub fn draw_grid(display: &mut Surface, x: i32, y: i32, w: u32, h: u32, step: u32, color: Rgb565) {
    if step == 0 {
        return;
    }
    draw_bevel_box(display, x, y, w, h, BLACK);
    for dx in (0..w).step_by(step as usize) {
        draw_vspan(display, x + dx as i32, y, h as i32 - 1, color);
    }
    for dy in (0..h).step_by(step as usize) {
        draw_hspan(display, x, y + dy as i32, w as i32 - 1, color);
    }
}

/// Filled circle centered on `center`.
pub fn fill_circle(display: &mut Surface, center: Point, radius: u32, color: Rgb565) {
    Circle::with_center(center, radius * 2 + 1)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)
        .ok();
}

/// One-pixel circle outline centered on `center`.
pub fn stroke_circle(display: &mut Surface, center: Point, radius: u32, color: Rgb565) {
    Circle::with_center(center, radius * 2 + 1)
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(display)
        .ok();
}

/// Text anchored at its top-left corner.
#[inline]
pub fn draw_text(display: &mut Surface, text: &str, at: Point, style: MonoTextStyle<'_, Rgb565>) {
    Text::with_text_style(text, at, style, TOP_LEFT).draw(display).ok();
}

/// Text centered on `at`.
#[inline]
pub fn draw_text_centered(display: &mut Surface, text: &str, at: Point, style: MonoTextStyle<'_, Rgb565>) {
    Text::with_text_style(text, at, style, CENTERED).draw(display).ok();
}
