//! Configuration: compile-time constants plus the runtime [`GuidanceConfig`].
//!
//! Layout values that depend on the surface size are derived once in
//! [`Layout::for_surface`]; everything else is a plain `const`.

use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Display Configuration
// =============================================================================

/// Composed surface width in pixels.
pub const SCREEN_WIDTH: u32 = 640;

/// Composed surface height in pixels.
pub const SCREEN_HEIGHT: u32 = 480;

/// Smallest surface the instrument layout still fits on.
pub const MIN_SCREEN_WIDTH: u32 = 480;

/// Smallest surface height the instrument layout still fits on.
pub const MIN_SCREEN_HEIGHT: u32 = 360;

// =============================================================================
// Timing Configuration
// =============================================================================

/// Upper bound on how long the loop blocks waiting for input or sensor data.
pub const EVENT_TIMEOUT: Duration = Duration::from_millis(200);

/// Loop metrics are logged every this many iterations.
pub const METRICS_INTERVAL: u32 = 100;

// =============================================================================
// Navigation Map Configuration
// =============================================================================

/// Number of aircraft positions kept for the trail.
pub const TRAIL_CAPACITY: usize = 10_000;

/// Share of the previous scale kept by one auto-zoom update.
pub const ZOOM_RETAIN: f64 = 0.95;

/// Numerator of the auto-zoom target term (`gain / basis`).
pub const ZOOM_GAIN: f64 = 10.0;

/// Factor applied by one manual zoom step.
pub const ZOOM_STEP: f64 = 1.2;

/// Length in meters of the entry/exit extension drawn on the current line.
pub const LINE_EXTENSION: f64 = 500.0;

/// Inset of the line/point clipping boundary from the map viewport.
pub const MAP_MARGIN: i32 = 2;

/// Extra vertical inset for waypoint icons.
pub const ICON_MARGIN_Y: i32 = 14;

/// Extra horizontal inset for waypoint icons (keeps captions on screen).
pub const ICON_MARGIN_X: i32 = 45;

/// Cross-track errors at or below this value are not shown.
pub const XTE_MIN: f64 = 0.9;

/// Cross-track errors above this value are not shown.
pub const XTE_MAX: f64 = 9999.9;

// =============================================================================
// Layout
// =============================================================================

/// Rows in the right-hand readout column below the compass.
pub const READOUT_ROWS: u32 = 7;

/// Instrument placement derived from the surface size.
///
/// ```text
/// +-------+--------------------------+--------+
/// | clock |     tracking gauge       |compass |
/// +-------+--------------------------+        |
/// |       |                          +--------+
/// | alt.  |                          |readouts|
/// | gauge |       main panel         |  x 7   |
/// |       |                          |        |
/// +-------+-------------+------------+        |
/// | datum | curr target | next target|        |
/// +-------+-------------+------------+--------+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    /// Thickness of both scale bars (and clock size).
    pub bar: u32,
    /// Footer row height.
    pub footer: u32,
    /// Width of the right-hand column (and compass size).
    pub column: u32,
    /// Height of one readout row.
    pub row: u32,
    /// Width of one footer target readout.
    pub target_width: u32,
}

impl Layout {
    /// Derive the layout for a `width` x `height` surface.
    ///
    /// `None` when the proportions leave no room for the main panel, as on
    /// a surface much taller than it is wide.
    pub const fn for_surface(width: u32, height: u32) -> Option<Self> {
        let bar = height / 8;
        let footer = bar / 2;
        let column = height / 4;
        let Some(panel_width) = width.checked_sub(column + bar) else {
            return None;
        };
        if panel_width == 0 || height <= bar + footer {
            return None;
        }
        Some(Self {
            width,
            height,
            bar,
            footer,
            column,
            row: (height - column) / READOUT_ROWS,
            target_width: panel_width / 2,
        })
    }

    /// Width of the main panel area.
    #[inline]
    pub const fn panel_width(&self) -> u32 { self.width - self.bar - self.column }

    /// Height of the main panel area.
    #[inline]
    pub const fn panel_height(&self) -> u32 { self.height - self.bar - self.footer }

    /// Top edge of the footer row.
    #[inline]
    pub const fn footer_top(&self) -> u32 { self.height - self.footer }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Operator/mission settings consumed by the display.
///
/// Loading these from a file is the job of the surrounding program; the
/// defaults match the standard survey setup.
#[derive(Clone, Debug, PartialEq)]
pub struct GuidanceConfig {
    /// Survey altitude above ground, meters.
    pub survey_height_agl: f64,
    /// Height above the aerodrome (MSL datum) target, meters.
    pub hac_height_msl: f64,
    /// Altitude below which the AGL tape turns red, meters.
    pub warning_height_agl: f64,
    /// Distance at which a target counts as reached, meters.
    pub catch_radius: f64,
    /// Aircraft turn radius, meters. Drives auto-zoom.
    pub turn_radius: f64,
    /// Directory scanned by the file chooser.
    pub map_directory: PathBuf,
    /// File extension of course files (matched case-insensitively).
    pub map_extension: String,
    /// Show magnetometer readouts instead of GPS latitude/longitude.
    pub mag_display: bool,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            survey_height_agl: 263.0,
            hac_height_msl: 4000.0,
            warning_height_agl: 150.0,
            catch_radius: 100.0,
            turn_radius: 150.0,
            map_directory: PathBuf::from("/mnt/dataflash/map/"),
            map_extension: String::from("pgn"),
            mag_display: true,
        }
    }
}
