//! Captioned numeric readout.
//!
//! A data box shows a short caption and a value. Vertically split boxes put
//! the caption above a bevelled value field (right-hand column); horizontally
//! split boxes put both on one bevelled strip (footer target readouts).
//! Either way the box repaints its own background, caption band included,
//! so it is drawn with the frame border suppressed.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;

use crate::colors::{CAPTION_GREY, GREEN, WHITE};
use crate::display::Surface;
use crate::error::{DisplayError, DisplayResult};
use crate::frame::{DrawContext, FrameGeometry, Widget};
use crate::styles::{CAPTION_FONT, VALUE_FONT, text_style};
use crate::widgets::primitives::{BEVEL, draw_bevel_box, draw_text, fill_rect};

/// Longest value shown; longer values show [`PLACEHOLDER`].
pub const VALUE_MAX: usize = 9;

/// Longest caption accepted at construction.
pub const CAPTION_MAX: usize = 15;

/// Shown instead of a value that does not fit.
pub const PLACEHOLDER: &str = "----";

/// How caption and value share the box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Split {
    /// Caption on top; the value field starts at `ratio` of the height.
    Vertical(f32),
    /// Caption on the left; the value starts at `ratio` of the width.
    Horizontal(f32),
}

/// Captioned readout.
pub struct DataBox {
    caption: String<16>,
    text: String<16>,
    text_color: Rgb565,
    split: Split,
}

impl DataBox {
    /// New readout. Fails if the caption is longer than [`CAPTION_MAX`].
    pub fn new(caption: &str, split: Split) -> DisplayResult<Self> {
        let too_long = || DisplayError::CaptionTooLong { caption: caption.into() };
        if caption.len() > CAPTION_MAX {
            return Err(too_long());
        }
        let caption = String::try_from(caption).map_err(|_| too_long())?;
        let mut text = String::new();
        text.push_str(PLACEHOLDER).ok();
        Ok(Self { caption, text, text_color: WHITE, split })
    }

    /// Replace the value. Text longer than [`VALUE_MAX`] shows the placeholder.
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        let shown = if text.len() > VALUE_MAX { PLACEHOLDER } else { text };
        self.text.push_str(shown).ok();
    }

    /// Replace the value with formatted text.
    pub fn set_text_fmt(&mut self, args: core::fmt::Arguments<'_>) {
        let mut buf: String<32> = String::new();
        if buf.write_fmt(args).is_err() {
            self.set_text(PLACEHOLDER);
        } else {
            self.set_text(buf.trim_end());
        }
    }

    #[inline]
    pub fn text(&self) -> &str { &self.text }

    #[inline]
    pub fn caption(&self) -> &str { &self.caption }

    #[inline]
    pub fn set_text_color(&mut self, color: Rgb565) { self.text_color = color; }
}

impl Widget for DataBox {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
        let value_style = text_style(VALUE_FONT, self.text_color, Some(f.color));
        match self.split {
            Split::Vertical(ratio) => {
                let top = (f.height as f32 * ratio) as u32;
                // Caption band inside the border; another caption may have been drawn here.
                fill_rect(
                    surface,
                    f.x + BEVEL as i32,
                    f.y + BEVEL as i32,
                    f.width.saturating_sub(2 * BEVEL),
                    top.saturating_sub(BEVEL),
                    f.color,
                );
                draw_text(surface, &self.caption, Point::new(f.x + 5, f.y + 10), text_style(CAPTION_FONT, CAPTION_GREY, None));
                draw_bevel_box(surface, f.x, f.y + top as i32, f.width, f.height.saturating_sub(top), f.color);
                draw_text(surface, &self.text, Point::new(f.x + 10, f.y + top as i32 + 3), value_style);
            }
            Split::Horizontal(ratio) => {
                let left = (f.width as f32 * ratio) as i32;
                draw_bevel_box(surface, f.x, f.y, f.width, f.height, f.color);
                draw_text(surface, &self.caption, Point::new(f.x + 5, f.y + 5), text_style(CAPTION_FONT, GREEN, Some(f.color)));
                draw_text(surface, &self.text, Point::new(f.x + left + 10, f.y + 5), value_style);
            }
        }
        log::trace!("{}={}", self.caption, self.text);
    }
}
