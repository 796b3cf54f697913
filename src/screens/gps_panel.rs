//! GPS configuration panel: scrolling log of receiver output.
//!
//! Shown at start-up while the receiver is brought up. Every GPS update
//! appends the latest raw sentence followed by the next receiver setup
//! command; once the panel is full the oldest row scrolls off the top.
//! After the last command the title turns green and reads
//! `GPS Configured :-)`.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            Configuring GPS...            │  title, y + 10
//! │                                          │
//! │ $GPGGA,123519,4807.038,N,01131.000,E,1,~ │  rows from y + 40, 16 px apart
//! │ UNLOGALL THISPORT                        │  setup command echo
//! │ $GPGGA,123520,4807.039,N,01131.002,E,1,~ │
//! │                                          │
//! │        Press <Enter> to Proceed...       │  footer, bottom - 20
//! └──────────────────────────────────────────┘
//! ```
//!
//! Rows wider than the panel are cut and end in `~`.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::{Deque, String};

use crate::colors::{CAPTION_GREY, GREEN, PANEL_TEXT, PANEL_TITLE};
use crate::display::Surface;
use crate::frame::{DrawContext, FrameGeometry, Widget};
use crate::styles::{CAPTION_FONT, CLOCK_FONT, LIST_FONT, text_style};
use crate::widgets::primitives::{draw_text, draw_text_centered};

// =============================================================================
// Layout Constants
// =============================================================================

const TITLE: &str = "Configuring GPS...";

/// Same width as [`TITLE`] so it covers it when redrawn.
const CONFIGURED_TITLE: &str = "GPS Configured :-)";

/// Commands sent to the receiver during start-up, one per GPS update.
pub const RECEIVER_SETUP: [&str; 6] = [
    "UNLOGALL THISPORT",
    "SBASCONTROL DISABLE",
    "ASSIGNOMNI USER 1539932500 1200",
    "RTKSOURCE OMNISTAR",
    "PSRDIFFSOURCE OMNISTAR",
    "LOG GPGGA ONTIME 0.2",
];

const FOOTER: &str = "Press <Enter> to Proceed...";

/// Color of receiver output rows.
pub const SENTENCE_COLOR: Rgb565 = PANEL_TEXT;

/// First row, below the title.
const ROWS_TOP: i32 = 40;

/// Row pitch.
const ROW_HEIGHT: i32 = 16;

/// Left text inset.
const ROW_INSET: i32 = 8;

/// Space taken by title and footer.
const CHROME_HEIGHT: u32 = 80;

/// Width of one list glyph.
const GLYPH_WIDTH: u32 = 8;

/// Upper bound on rows kept, whatever the panel height.
const MAX_ROWS: usize = 32;

/// Longest row kept (one NMEA sentence).
const ROW_MAX: usize = 96;

// =============================================================================
// Panel
// =============================================================================

struct Row {
    text: String<ROW_MAX>,
    color: Rgb565,
}

pub struct GpsPanel {
    rows: Deque<Row, MAX_ROWS>,
    title: &'static str,
    title_color: Rgb565,
    /// Setup commands echoed so far.
    setup_step: usize,
    /// Rows that fit the panel.
    capacity: usize,
    /// Characters that fit one row.
    columns: usize,
}

impl GpsPanel {
    /// Panel sized for `frame`.
    pub fn new(frame: &FrameGeometry) -> Self {
        let capacity = (frame.height.saturating_sub(CHROME_HEIGHT) / ROW_HEIGHT as u32) as usize;
        let columns = (frame.width.saturating_sub(ROW_INSET as u32) / GLYPH_WIDTH) as usize;
        Self {
            rows: Deque::new(),
            title: TITLE,
            title_color: PANEL_TITLE,
            setup_step: 0,
            capacity: capacity.clamp(1, MAX_ROWS),
            columns: columns.clamp(2, ROW_MAX),
        }
    }

    /// Append a row, scrolling the oldest off once the panel is full.
    pub fn add_entry(&mut self, text: &str, color: Rgb565) {
        if self.rows.len() >= self.capacity {
            self.rows.pop_front();
        }
        let mut row = Row { text: String::new(), color };
        if text.chars().count() > self.columns {
            for c in text.chars().take(self.columns - 1) {
                row.text.push(c).ok();
            }
            row.text.push('~').ok();
        } else {
            for c in text.chars().take(ROW_MAX) {
                row.text.push(c).ok();
            }
        }
        // Never full: a row was just released above.
        self.rows.push_back(row).ok();
    }

    /// Echo the next setup command; after the last one the title reports
    /// the receiver configured. Returns the command, if any was left.
    pub fn advance_setup(&mut self) -> Option<&'static str> {
        let command = *RECEIVER_SETUP.get(self.setup_step)?;
        self.setup_step += 1;
        self.add_entry(command, PANEL_TITLE);
        if self.configured() {
            self.title = CONFIGURED_TITLE;
            self.title_color = GREEN;
            log::info!("gps receiver configured");
        }
        Some(command)
    }

    /// Every setup command has been sent.
    #[inline]
    pub const fn configured(&self) -> bool { self.setup_step >= RECEIVER_SETUP.len() }

    #[inline]
    pub const fn title(&self) -> (&'static str, Rgb565) { (self.title, self.title_color) }

    /// Rows oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> { self.rows.iter().map(|row| row.text.as_str()) }

    #[inline]
    pub const fn capacity(&self) -> usize { self.capacity }
}

impl Widget for GpsPanel {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
        let center_x = f.x + (f.width / 2) as i32;
        draw_text_centered(
            surface,
            self.title,
            Point::new(center_x, f.y + 10),
            text_style(CLOCK_FONT, self.title_color, Some(f.color)),
        );
        draw_text_centered(
            surface,
            FOOTER,
            Point::new(center_x, f.bottom() - 20),
            text_style(CAPTION_FONT, CAPTION_GREY, Some(f.color)),
        );

        for (i, row) in self.rows.iter().enumerate() {
            let at = Point::new(f.x + ROW_INSET, f.y + ROWS_TOP + i as i32 * ROW_HEIGHT);
            draw_text(surface, &row.text, at, text_style(LIST_FONT, row.color, Some(f.color)));
        }
    }

    fn destroy(&mut self) { self.rows.clear(); }
}
