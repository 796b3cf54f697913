//! Heading compass: a disc with a two-tone needle.
//!
//! The needle is two triangles sharing a short base across the center. The
//! base is a quarter of the radius to each side; the tips reach to two
//! pixels inside the disc. The north half points along the heading.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Triangle};

use crate::colors::{BLACK, NEEDLE_NORTH, NEEDLE_SOUTH};
use crate::display::Surface;
use crate::frame::{DrawContext, FrameGeometry, Widget};
use crate::widgets::primitives::fill_circle;

pub struct Compass {
    sin: f64,
    cos: f64,
    background: Rgb565,
}

impl Compass {
    pub const fn new() -> Self { Self { sin: 0.0, cos: 1.0, background: BLACK } }

    /// Needle direction as sine/cosine of the heading.
    pub fn set_orientation(&mut self, sin: f64, cos: f64) {
        self.sin = sin;
        self.cos = cos;
    }

    #[inline]
    pub fn set_background(&mut self, color: Rgb565) { self.background = color; }

    /// Vertices of the north and south needle halves.
    fn needle(&self, center: Point, radius: i32) -> (Triangle, Triangle) {
        let r = f64::from(radius);
        let base = Point::new((self.cos * r / 4.0) as i32, (self.sin * r / 4.0) as i32);
        let tip = Point::new((self.sin * (r - 2.0)) as i32, -((self.cos * (r - 2.0)) as i32));
        let north = Triangle::new(center + base, center + tip, center - base);
        let south = Triangle::new(center + base, center - tip, center - base);
        (north, south)
    }
}

impl Default for Compass {
    fn default() -> Self { Self::new() }
}

impl Widget for Compass {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
        let radius = (f.width.min(f.height) / 2).saturating_sub(5);
        fill_circle(surface, f.center(), radius, self.background);
        let (north, south) = self.needle(f.center(), radius as i32);
        north.into_styled(PrimitiveStyle::with_fill(NEEDLE_NORTH)).draw(surface).ok();
        south.into_styled(PrimitiveStyle::with_fill(NEEDLE_SOUTH)).draw(surface).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeMask;
    use crate::frame::test_support::{EmptyCourse, Snapshots};
    use crate::frame::{Frame, Instrument};

    fn draw(compass: Compass) -> Surface {
        let mut display = Surface::new(Size::new(120, 120));
        let course = EmptyCourse;
        let snapshots = Snapshots::default();
        let ctx = DrawContext { changes: ChangeMask::NONE, sources: snapshots.sources(&course) };
        let mut frame = Instrument::new("compass", FrameGeometry::new(0, 0, 120, 120, BLACK), compass).unwrap();
        frame.draw(&mut display, &ctx, true);
        display
    }

    #[test]
    fn test_north_needle_points_up() {
        let display = draw(Compass::new());
        assert_eq!(display.get_pixel(Point::new(60, 20)), NEEDLE_NORTH, "north half above center");
        assert_eq!(display.get_pixel(Point::new(60, 100)), NEEDLE_SOUTH, "south half below center");
    }

    #[test]
    fn test_east_needle_points_right() {
        let mut compass = Compass::new();
        compass.set_orientation(1.0, 0.0);
        let display = draw(compass);
        assert_eq!(display.get_pixel(Point::new(100, 60)), NEEDLE_NORTH, "heading 90 points right");
        assert_eq!(display.get_pixel(Point::new(20, 60)), NEEDLE_SOUTH);
    }
}
