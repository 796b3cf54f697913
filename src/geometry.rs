//! World-to-screen geometry: transform, clipping and visibility tests.
//!
//! World coordinates are meters in a local east/north plane; screen
//! coordinates are pixels with y growing downward. Both use [`Coord`], the
//! transform is the only place that converts between them.

use core::ops::{Add, Mul, Sub};

use embedded_graphics::prelude::Point;

/// A point in world (meters) or screen (pixels) space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    #[inline]
    pub fn length(self) -> f64 { self.x.hypot(self.y) }

    /// Same direction, length 1. The zero vector stays zero.
    pub fn unit(self) -> Self {
        let len = self.length();
        if len > 0.0 { Self::new(self.x / len, self.y / len) } else { Self::ORIGIN }
    }

    /// Nearest pixel.
    #[inline]
    pub fn to_point(self) -> Point { Point::new(self.x.round() as i32, self.y.round() as i32) }
}

impl Add for Coord {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self { Self::new(self.x + rhs.x, self.y + rhs.y) }
}

impl Sub for Coord {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self { Self::new(self.x - rhs.x, self.y - rhs.y) }
}

impl Mul<f64> for Coord {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self { Self::new(self.x * rhs, self.y * rhs) }
}

/// A segment between two points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Line {
    pub begin: Coord,
    pub end: Coord,
}

impl Line {
    #[inline]
    pub const fn new(begin: Coord, end: Coord) -> Self { Self { begin, end } }

    #[inline]
    pub fn length(&self) -> f64 { (self.end - self.begin).length() }
}

/// Axis-aligned screen rectangle. `north` is the top edge (smallest y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    pub north: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
}

impl Boundary {
    /// Boundary of a pixel rectangle at (`x`, `y`) with the given size.
    pub fn from_rect(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            north: f64::from(y),
            west: f64::from(x),
            south: f64::from(y) + f64::from(height),
            east: f64::from(x) + f64::from(width),
        }
    }

    /// Shrink each edge toward the center. `dy` applies to north/south and
    /// `dx` to west/east.
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        Self { north: self.north + dy, west: self.west + dx, south: self.south - dy, east: self.east - dx }
    }
}

/// True if `p` lies strictly inside `b`. Points on an edge are outside.
#[inline]
pub fn point_in_boundary(b: &Boundary, p: Coord) -> bool {
    p.x > b.west && p.x < b.east && p.y > b.north && p.y < b.south
}

/// Clip `line` to `b` (Liang-Barsky).
///
/// Returns `None` when nothing of the line is inside. A line entirely inside
/// comes back bit-for-bit unchanged. The result may have zero length when
/// the line only touches the boundary; callers skip those.
pub fn clip_line(b: &Boundary, line: &Line) -> Option<Line> {
    let Line { begin, end } = *line;
    let dx = end.x - begin.x;
    let dy = end.y - begin.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [(-dx, begin.x - b.west), (dx, b.east - begin.x), (-dy, begin.y - b.north), (dy, b.south - begin.y)] {
        if p == 0.0 {
            // Parallel to this edge: either wholly outside or irrelevant.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let clipped_begin = if t0 > 0.0 { Coord::new(begin.x + t0 * dx, begin.y + t0 * dy) } else { begin };
    let clipped_end = if t1 < 1.0 { Coord::new(begin.x + t1 * dx, begin.y + t1 * dy) } else { end };
    Some(Line::new(clipped_begin, clipped_end))
}

/// Rotating, scaling world-to-screen transform centered on the aircraft.
///
/// The current position maps to the reference point; the world is rotated
/// so the aircraft heading points up the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    scale: f64,
    sin: f64,
    cos: f64,
    reference: Coord,
    current: Coord,
}

impl Default for Transform {
    fn default() -> Self { Self::new() }
}

impl Transform {
    /// Unit scale, no rotation, everything at the origin.
    pub const fn new() -> Self {
        Self { scale: 1.0, sin: 0.0, cos: 1.0, reference: Coord::ORIGIN, current: Coord::ORIGIN }
    }

    #[inline]
    pub fn set_scale(&mut self, scale: f64) { self.scale = scale; }

    /// Pixels per world unit.
    #[inline]
    pub const fn scale(&self) -> f64 { self.scale }

    /// Set the rotation from the heading's sine/cosine pair.
    #[inline]
    pub fn set_rotation(&mut self, sin: f64, cos: f64) {
        self.sin = sin;
        self.cos = cos;
    }

    /// Screen point the current position is drawn at.
    #[inline]
    pub fn set_reference_point(&mut self, reference: Coord) { self.reference = reference; }

    #[inline]
    pub const fn reference_point(&self) -> Coord { self.reference }

    /// World position mapped onto the reference point.
    #[inline]
    pub fn set_current_position(&mut self, current: Coord) { self.current = current; }

    /// Map a world point to screen coordinates.
    pub fn transform(&self, p: Coord) -> Coord {
        let dx = p.x - self.current.x;
        let dy = p.y - self.current.y;
        let rx = dx * self.cos - dy * self.sin;
        let ry = dx * self.sin + dy * self.cos;
        Coord::new(self.reference.x + rx * self.scale, self.reference.y - ry * self.scale)
    }

    /// Map both ends of a world line.
    #[inline]
    pub fn transform_line(&self, line: &Line) -> Line { Line::new(self.transform(line.begin), self.transform(line.end)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Boundary { Boundary { north: 0.0, west: 0.0, south: 100.0, east: 200.0 } }

    fn close(a: Coord, b: Coord) -> bool { (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9 }

    // -------------------------------------------------------------------------
    // Clipping
    // -------------------------------------------------------------------------

    #[test]
    fn test_clip_inside_line_is_unchanged() {
        let line = Line::new(Coord::new(10.5, 20.25), Coord::new(190.0, 80.0));
        assert_eq!(clip_line(&viewport(), &line), Some(line), "inside line must round-trip exactly");
    }

    #[test]
    fn test_clip_outside_line_is_rejected() {
        let line = Line::new(Coord::new(-50.0, -10.0), Coord::new(-5.0, 120.0));
        assert_eq!(clip_line(&viewport(), &line), None, "line left of viewport is fully clipped");

        let above = Line::new(Coord::new(10.0, -30.0), Coord::new(150.0, -1.0));
        assert_eq!(clip_line(&viewport(), &above), None, "line above viewport is fully clipped");
    }

    #[test]
    fn test_clip_crossing_line_is_cut_at_edges() {
        let line = Line::new(Coord::new(-100.0, 50.0), Coord::new(300.0, 50.0));
        let clipped = clip_line(&viewport(), &line).expect("crossing line should survive");
        assert!(close(clipped.begin, Coord::new(0.0, 50.0)), "begin {:?}", clipped.begin);
        assert!(close(clipped.end, Coord::new(200.0, 50.0)), "end {:?}", clipped.end);
    }

    #[test]
    fn test_clip_diagonal_through_corner_region() {
        let line = Line::new(Coord::new(-10.0, -10.0), Coord::new(110.0, 110.0));
        let clipped = clip_line(&viewport(), &line).expect("diagonal enters viewport");
        assert!(close(clipped.begin, Coord::new(0.0, 0.0)));
        assert!(close(clipped.end, Coord::new(100.0, 100.0)));
    }

    #[test]
    fn test_clip_corner_touch_has_zero_length() {
        let line = Line::new(Coord::new(-10.0, 10.0), Coord::new(10.0, -10.0));
        let clipped = clip_line(&viewport(), &line).expect("touching line is not rejected outright");
        assert!(clipped.length() < 1e-9, "only the corner is shared");
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    #[test]
    fn test_point_in_boundary_is_strict() {
        let b = viewport();
        assert!(point_in_boundary(&b, Coord::new(1.0, 1.0)));
        assert!(!point_in_boundary(&b, Coord::new(0.0, 50.0)), "west edge is outside");
        assert!(!point_in_boundary(&b, Coord::new(200.0, 50.0)), "east edge is outside");
        assert!(!point_in_boundary(&b, Coord::new(50.0, 100.0)), "south edge is outside");
    }

    #[test]
    fn test_inset_shrinks_both_axes() {
        let b = viewport().inset(45.0, 14.0);
        assert_eq!(b, Boundary { north: 14.0, west: 45.0, south: 86.0, east: 155.0 });
    }

    // -------------------------------------------------------------------------
    // Transform
    // -------------------------------------------------------------------------

    #[test]
    fn test_transform_current_position_maps_to_reference() {
        let mut t = Transform::new();
        t.set_reference_point(Coord::new(230.0, 352.0));
        t.set_current_position(Coord::new(5000.0, -1200.0));
        t.set_rotation(0.6, 0.8);
        t.set_scale(3.0);
        assert!(close(t.transform(Coord::new(5000.0, -1200.0)), Coord::new(230.0, 352.0)));
    }

    #[test]
    fn test_transform_north_is_up_without_rotation() {
        let mut t = Transform::new();
        t.set_reference_point(Coord::new(100.0, 100.0));
        t.set_scale(2.0);
        let p = t.transform(Coord::new(0.0, 10.0));
        assert!(close(p, Coord::new(100.0, 80.0)), "10 m north at scale 2 is 20 px up, got {p:?}");
    }

    #[test]
    fn test_transform_quarter_turn() {
        // sin = 1, cos = 0: a point east of the aircraft ends up straight ahead.
        let mut t = Transform::new();
        t.set_rotation(1.0, 0.0);
        let p = t.transform(Coord::new(10.0, 0.0));
        assert!(close(p, Coord::new(0.0, -10.0)), "got {p:?}");
    }

    #[test]
    fn test_unit_vector() {
        let u = Coord::new(3.0, 4.0).unit();
        assert!(close(u, Coord::new(0.6, 0.8)));
        assert_eq!(Coord::ORIGIN.unit(), Coord::ORIGIN, "zero vector has no direction");
    }
}
