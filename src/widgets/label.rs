//! Static text on the frame color.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;

use crate::colors::WHITE;
use crate::display::Surface;
use crate::frame::{DrawContext, FrameGeometry, Widget};
use crate::styles::text_style;
use crate::widgets::primitives::draw_text;

pub struct Label {
    text: String<16>,
    font: &'static MonoFont<'static>,
    color: Rgb565,
    /// Text inset from the frame's top-left corner.
    inset: i32,
}

impl Label {
    pub fn new(font: &'static MonoFont<'static>, inset: i32) -> Self {
        Self { text: String::new(), font, color: WHITE, inset }
    }

    /// Replace the text; overlong text is cut at the buffer size.
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        for c in text.chars() {
            if self.text.push(c).is_err() {
                break;
            }
        }
    }

    #[inline]
    pub fn text(&self) -> &str { &self.text }

    #[inline]
    pub fn set_color(&mut self, color: Rgb565) { self.color = color; }
}

impl Widget for Label {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
        let at = Point::new(f.x + self.inset, f.y + self.inset);
        draw_text(surface, &self.text, at, text_style(self.font, self.color, Some(f.color)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::VALUE_FONT;

    #[test]
    fn test_set_text() {
        let mut label = Label::new(VALUE_FONT, 5);
        label.set_text("AGL");
        assert_eq!(label.text(), "AGL");
        label.set_text("MSL");
        assert_eq!(label.text(), "MSL", "text is replaced, not appended");
    }
}
