//! UTC clock disc.

use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;

use crate::colors::{BLACK, WHITE};
use crate::display::Surface;
use crate::frame::{DrawContext, FrameGeometry, Widget};
use crate::styles::{CLOCK_FONT, text_style};
use crate::widgets::primitives::{draw_text_centered, fill_circle};

/// Longest text shown; longer text shows [`PLACEHOLDER`].
pub const TEXT_MAX: usize = 6;

pub const PLACEHOLDER: &str = "---";

pub struct Clock {
    text: String<8>,
    background: Rgb565,
}

impl Clock {
    pub fn new() -> Self {
        let mut clock = Self { text: String::new(), background: BLACK };
        clock.set_text(PLACEHOLDER);
        clock
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        let shown = if text.len() > TEXT_MAX { PLACEHOLDER } else { text };
        self.text.push_str(shown).ok();
    }

    /// Show `hhmmss` (UTC, as reported by the GPS) as `HH:MM`.
    pub fn set_utc(&mut self, hhmmss: f64) {
        let t = hhmmss.max(0.0) as u32;
        let mut text: String<8> = String::new();
        if core::fmt::write(&mut text, format_args!("{:02}:{:02}", (t / 10_000) % 100, (t / 100) % 100)).is_err() {
            self.set_text(PLACEHOLDER);
        } else {
            self.set_text(&text);
        }
    }

    #[inline]
    pub fn text(&self) -> &str { &self.text }

    #[inline]
    pub fn set_background(&mut self, color: Rgb565) { self.background = color; }
}

impl Default for Clock {
    fn default() -> Self { Self::new() }
}

impl Widget for Clock {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
        let radius = (f.width.min(f.height) / 2).saturating_sub(2);
        fill_circle(surface, f.center(), radius, self.background);
        draw_text_centered(surface, &self.text, f.center(), text_style(CLOCK_FONT, WHITE, Some(self.background)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_formatting() {
        let mut clock = Clock::new();
        clock.set_utc(134_512.25);
        assert_eq!(clock.text(), "13:45");
        clock.set_utc(5.0);
        assert_eq!(clock.text(), "00:00");
    }

    #[test]
    fn test_overlong_text() {
        let mut clock = Clock::new();
        clock.set_text("12:34:56");
        assert_eq!(clock.text(), PLACEHOLDER);
    }
}
