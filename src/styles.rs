//! Fonts and text styles shared by the instruments.
//!
//! Fixed-color styles are `const` so they live in read-only data. Most
//! instrument text carries a background color that follows the frame color,
//! which only becomes known at draw time; [`text_style`] builds those.
//!
//! # Font Roles
//!
//! | Role | Font | Used by |
//! |------|------|---------|
//! | Value | `ProFont` 18pt | data box values, datum label, gauge labels |
//! | Caption | 7x14 | data box captions, profile scale, cross-track text |
//! | Clock | 10x20 | clock, highlighted waypoint captions, panel titles |
//! | List | 8x13 | file chooser rows, GPS panel rows |
//! | Small | 6x10 | neutral waypoint captions |

use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle, MonoTextStyleBuilder,
        ascii::{FONT_6X10, FONT_7X14, FONT_8X13, FONT_10X20},
    },
    pixelcolor::Rgb565,
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::PROFONT_18_POINT;

use crate::colors::{GREEN, WHITE};

// =============================================================================
// Text Placement Styles
// =============================================================================

/// Text anchored at its top-left corner.
pub const TOP_LEFT: TextStyle = TextStyleBuilder::new().alignment(Alignment::Left).baseline(Baseline::Top).build();

/// Text centered horizontally and vertically on its anchor point.
pub const CENTERED: TextStyle =
    TextStyleBuilder::new().alignment(Alignment::Center).baseline(Baseline::Middle).build();

// =============================================================================
// Fonts
// =============================================================================

/// Large readout font (`ProFont` 18pt, ~12x22 px).
pub const VALUE_FONT: &MonoFont = &PROFONT_18_POINT;

/// Caption font (7x14).
pub const CAPTION_FONT: &MonoFont = &FONT_7X14;

/// Clock and title font (10x20).
pub const CLOCK_FONT: &MonoFont = &FONT_10X20;

/// List rows (8x13).
pub const LIST_FONT: &MonoFont = &FONT_8X13;

/// Small annotation font (6x10).
pub const SMALL_FONT: &MonoFont = &FONT_6X10;

// =============================================================================
// Fixed Styles
// =============================================================================

/// Neutral waypoint caption: small green text on whatever is underneath.
pub const WAYPOINT_CAPTION: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, GREEN);

/// White caption text without background.
pub const CAPTION_WHITE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_7X14, WHITE);

/// Build a text style with an optional background fill.
///
/// Text drawn with a background erases whatever the previous value left in
/// its character cells, which is how readouts update without clearing.
#[inline]
pub fn text_style(font: &'static MonoFont<'static>, color: Rgb565, background: Option<Rgb565>) -> MonoTextStyle<'static, Rgb565> {
    let builder = MonoTextStyleBuilder::new().font(font).text_color(color);
    match background {
        Some(bg) => builder.background_color(bg).build(),
        None => builder.build(),
    }
}
