//! Color palette for the guidance display.
//!
//! # Channel Depth
//!
//! Instrument colors are specified with three 5-bit channels (0-31 each), the
//! way the cockpit palette has always been described. [`shade`] widens the
//! green channel to the 6 bits that Rgb565 stores, so `shade(31, 31, 31)` is
//! full white and `shade(10, 10, 10)` is an even dark grey.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

/// Build an Rgb565 color from three 5-bit channels.
#[inline]
pub const fn shade(r: u8, g: u8, b: u8) -> Rgb565 {
    let g = g & 0x1f;
    Rgb565::new(r & 0x1f, (g << 1) | (g >> 4), b & 0x1f)
}

// =============================================================================
// Standard Colors
// =============================================================================

/// Pure black. Frame background for gauges and the main panels.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Full white (31, 31, 31). Instrument text, current target highlight.
pub const WHITE: Rgb565 = shade(31, 31, 31);

/// Full red (31, 0, 0). Trail crosses and the warning altitude band.
pub const RED: Rgb565 = shade(31, 0, 0);

/// Full green (0, 31, 0). Neutral course lines and captions.
pub const GREEN: Rgb565 = shade(0, 31, 0);

/// Full blue (0, 0, 31). Next target highlight.
pub const BLUE: Rgb565 = shade(0, 0, 31);

/// Yellow (31, 31, 0). Sensor profile trace and marker.
pub const YELLOW: Rgb565 = shade(31, 31, 0);

// =============================================================================
// Frame Borders
// =============================================================================

/// Upper/left bevel of a framed region.
pub const BEVEL_LIGHT: Rgb565 = shade(20, 20, 20);

/// Lower/right bevel of a framed region.
pub const BEVEL_DARK: Rgb565 = shade(10, 10, 10);

/// Default instrument frame color (dark green).
pub const FRAME_GREEN: Rgb565 = shade(0, 10, 0);

/// Data box caption text.
pub const CAPTION_GREY: Rgb565 = shade(20, 20, 20);

// =============================================================================
// Navigation Map
// =============================================================================

/// Line that is neither current, next nor blocked.
pub const LINE_NEUTRAL: Rgb565 = GREEN;

/// Line flagged by the course as blocked.
pub const LINE_BLOCKED: Rgb565 = shade(20, 0, 0);

/// Current target (line or waypoint).
pub const TARGET_CURRENT: Rgb565 = WHITE;

/// Next target (line or waypoint).
pub const TARGET_NEXT: Rgb565 = BLUE;

/// Entry/exit extensions of the current line and the corner polyline.
pub const MUTED_GREY: Rgb565 = shade(10, 10, 10);

/// Aircraft trail crosses.
pub const TRAIL: Rgb565 = RED;

// =============================================================================
// Scale Bars
// =============================================================================

/// Tape background between ticks.
pub const TAPE_DIM: Rgb565 = shade(5, 5, 5);

/// Tape tick every 10 units.
pub const TAPE_TICK: Rgb565 = shade(10, 10, 10);

/// Tape band on the "correct side" of the reference value.
pub const TAPE_BAND: Rgb565 = shade(0, 20, 0);

/// Tape band within 10 units of the reference value.
pub const TAPE_ON_TARGET: Rgb565 = GREEN;

/// Tape band between the ground and the warning height.
pub const TAPE_WARNING: Rgb565 = RED;

// =============================================================================
// Datum / Targets
// =============================================================================

/// Altitude datum AGL (label frame, altitude pointer).
pub const DATUM_AGL: Rgb565 = FRAME_GREEN;

/// Altitude datum MSL; also "no target" readouts.
pub const DATUM_MSL: Rgb565 = shade(5, 15, 15);

/// Target readout frame while the target leg is blocked.
pub const TARGET_BLOCKED: Rgb565 = shade(10, 0, 0);

// =============================================================================
// Compass / Panels
// =============================================================================

/// North half of the compass needle.
pub const NEEDLE_NORTH: Rgb565 = shade(15, 8, 0);

/// South half of the compass needle.
pub const NEEDLE_SOUTH: Rgb565 = shade(0, 0, 15);

/// Panel headers while work is in progress.
pub const PANEL_TITLE: Rgb565 = shade(15, 15, 0);

/// Panel footers and informational rows.
pub const PANEL_TEXT: Rgb565 = shade(0, 20, 0);

/// Highlighted row in lists.
pub const SELECTION: Rgb565 = shade(0, 10, 10);

/// Sensor profile grid.
pub const GRID: Rgb565 = TAPE_DIM;
