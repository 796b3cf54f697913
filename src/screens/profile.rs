//! Sensor profile: magnetic field trace over a grid.
//!
//! Samples (in pT) go into a ring one slot per screen column. The trace is
//! drawn left to right in slot order, so new samples overwrite the trace in
//! place and a vertical marker shows where the latest one landed. Values
//! larger than the panel wrap around vertically.
//!
//! The vertical scale is one of [`SCALES`] (pT per pixel); the label shows
//! it per grid division.

use embedded_graphics::prelude::*;
use heapless::String;

use crate::colors::{GREEN, GRID, YELLOW};
use crate::display::Surface;
use crate::frame::{Command, DrawContext, FrameGeometry, Reply, Widget};
use crate::styles::{CAPTION_FONT, text_style};
use crate::widgets::primitives::{draw_grid, draw_line, draw_text, draw_thick_line};

/// Grid pitch in pixels.
pub const GRID_SIZE: u32 = 20;

/// Selectable scales in pT per pixel, coarse to fine.
pub const SCALES: [f64; 18] = [
    2.0e4, 1.0e4, 5.0e3, 2.0e3, 1.0e3, 5.0e2, 2.0e2, 1.0e2, 5.0e1, 2.0e1, 1.0e1, 5.0e0, 2.0e0, 1.0e0, 5.0e-1, 2.0e-1,
    1.0e-1, 5.0e-2,
];

pub const DEFAULT_SCALE: usize = 8;

pub struct SensorProfile {
    samples: Box<[f64]>,
    /// Slot of the latest sample; `None` until the first one.
    latest: Option<usize>,
    scale_index: usize,
}

impl SensorProfile {
    /// Profile with one sample slot per column of `frame`.
    pub fn new(frame: &FrameGeometry) -> Self {
        let slots = (frame.width as usize).max(2);
        Self { samples: vec![0.0; slots].into_boxed_slice(), latest: None, scale_index: DEFAULT_SCALE }
    }

    /// Record a sample in pT, overwriting the oldest.
    pub fn add_sample(&mut self, sample: f64) {
        let next = self.latest.map_or(0, |i| (i + 1) % self.samples.len());
        self.samples[next] = sample;
        self.latest = Some(next);
    }

    #[inline]
    pub const fn latest(&self) -> Option<usize> { self.latest }

    #[inline]
    pub fn sample(&self, slot: usize) -> Option<f64> { self.samples.get(slot).copied() }

    /// Current scale in pT per pixel.
    #[inline]
    pub const fn scale(&self) -> f64 { SCALES[self.scale_index] }

    /// Step to the next finer scale. False at the finest.
    pub fn finer(&mut self) -> bool {
        if self.scale_index + 1 < SCALES.len() {
            self.scale_index += 1;
            true
        } else {
            false
        }
    }

    /// Step to the next coarser scale. False at the coarsest.
    pub fn coarser(&mut self) -> bool {
        if self.scale_index > 0 {
            self.scale_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset_scale(&mut self) { self.scale_index = DEFAULT_SCALE; }

    /// Screen row of `sample` in a panel spanning `top..bottom`.
    fn row(&self, sample: f64, bottom: i32, height: i32) -> i32 {
        let offset = (sample / self.scale()).round() as i64;
        bottom - offset.rem_euclid(i64::from(height.max(1))) as i32
    }
}

impl Widget for SensorProfile {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
        draw_grid(surface, f.x, f.y, f.width, f.height, GRID_SIZE, GRID);

        let bottom = f.bottom() - 1;
        let height = f.height as i32 - 1;
        for slot in 1..self.samples.len() {
            let x = f.x + 1 + slot as i32;
            if x >= f.right() - 1 {
                break;
            }
            let from = Point::new(x - 1, self.row(self.samples[slot - 1], bottom, height));
            let to = Point::new(x, self.row(self.samples[slot], bottom, height));
            draw_line(surface, from, to, YELLOW);
            if self.latest == Some(slot) {
                draw_thick_line(surface, Point::new(x, f.y), Point::new(x, bottom), YELLOW);
            }
        }

        let mut label: String<24> = String::new();
        if core::fmt::write(&mut label, format_args!("{:.1} pT/div", self.scale() * f64::from(GRID_SIZE))).is_ok() {
            draw_text(surface, &label, Point::new(f.x + 5, f.y + 5), text_style(CAPTION_FONT, GREEN, Some(f.color)));
        }
    }

    fn control(&mut self, command: Command) -> Reply {
        let changed = match command {
            Command::ZoomIn => self.finer(),
            Command::ZoomOut => self.coarser(),
            Command::ZoomAuto => {
                self.reset_scale();
                true
            }
            _ => return Reply::Ignored,
        };
        if changed { Reply::Changed } else { Reply::Unchanged }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeMask;
    use crate::colors::BLACK;
    use crate::frame::test_support::{EmptyCourse, Snapshots};
    use crate::frame::{Frame, Instrument};

    fn profile(width: u32) -> SensorProfile { SensorProfile::new(&FrameGeometry::new(0, 0, width, 100, BLACK)) }

    #[test]
    fn test_default_scale() {
        let p = profile(100);
        assert!((p.scale() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scale_steps_are_bounded() {
        let mut p = profile(100);
        while p.finer() {}
        assert!((p.scale() - 0.05).abs() < 1e-12, "finest scale");
        assert_eq!(p.control(Command::ZoomIn), Reply::Unchanged);
        while p.coarser() {}
        assert!((p.scale() - 20_000.0).abs() < 1e-9, "coarsest scale");
        assert_eq!(p.control(Command::ZoomAuto), Reply::Changed);
        assert!((p.scale() - SCALES[DEFAULT_SCALE]).abs() < f64::EPSILON, "reset");
    }

    #[test]
    fn test_samples_wrap() {
        let mut p = profile(3);
        assert_eq!(p.latest(), None);
        for v in [1.0, 2.0, 3.0, 4.0] {
            p.add_sample(v);
        }
        assert_eq!(p.latest(), Some(0), "fourth sample wrapped to slot 0");
        assert_eq!(p.sample(0), Some(4.0));
        assert_eq!(p.sample(1), Some(2.0));
    }

    #[test]
    fn test_values_wrap_vertically() {
        let p = profile(100);
        // 50 pT/px: 1000 pT is 20 px up, 99 px + 20 px wraps to 20 px up.
        assert_eq!(p.row(1000.0, 99, 99), 79);
        assert_eq!(p.row(50.0 * 119.0, 99, 99), 79);
        assert_eq!(p.row(-1000.0, 99, 99), 99 - 79, "negative values wrap from the bottom");
    }

    #[test]
    fn test_marker_at_latest_sample() {
        let mut p = profile(100);
        for _ in 0..10 {
            p.add_sample(1000.0);
        }
        let course = EmptyCourse;
        let snapshots = Snapshots::default();
        let ctx = DrawContext { changes: ChangeMask::MAG_UPDATE, sources: snapshots.sources(&course) };
        let mut display = Surface::new(Size::new(100, 100));
        let mut frame = Instrument::new("profile", FrameGeometry::new(0, 0, 100, 100, BLACK), p).unwrap();
        frame.draw(&mut display, &ctx, false);
        // Latest slot 9 is drawn at x = 10.
        assert_eq!(display.get_pixel(Point::new(10, 50)), YELLOW, "marker line");
        assert_eq!(display.get_pixel(Point::new(5, 79)), YELLOW, "trace at 20 px above the bottom");
    }
}
