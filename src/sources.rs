//! Data handed to the display by its collaborators.
//!
//! Everything here is owned elsewhere: acquisition code refreshes the sensor
//! snapshots once per iteration, the course planner owns legs and waypoints.
//! The display only reads them, through [`Sources`], while it draws.

use std::path::Path;

use heapless::String;

use crate::error::CourseResult;
use crate::geometry::{Coord, Line};

// =============================================================================
// Course
// =============================================================================

/// Kind of a flight line or tie line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegKind {
    /// Survey line flown while recording.
    Flight,
    /// Connecting line between survey lines.
    Tie,
}

/// One course segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    pub id: u32,
    pub kind: LegKind,
    pub line: Line,
    /// Flagged by the planner (already flown or not to be flown).
    pub blocked: bool,
}

/// Waypoint symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaypointKind {
    Flag,
    Home,
    Camp,
    Barrel,
    PowerLine,
}

/// Named course point with an icon.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub kind: WaypointKind,
    pub position: Coord,
    pub caption: String<16>,
}

/// What the course currently steers to.
///
/// Targets refer into the course's own storage; two targets are the same
/// only if they point at the same element.
#[derive(Clone, Copy, Debug, Default)]
pub enum Target<'a> {
    #[default]
    None,
    Leg(&'a Leg),
    Waypoint(&'a Waypoint),
}

impl Target<'_> {
    /// True if this target is exactly `leg` (identity, not equality).
    #[inline]
    pub fn is_leg(&self, leg: &Leg) -> bool { matches!(self, Target::Leg(t) if core::ptr::eq(*t, leg)) }

    /// True if this target is exactly `waypoint` (identity, not equality).
    #[inline]
    pub fn is_waypoint(&self, waypoint: &Waypoint) -> bool {
        matches!(self, Target::Waypoint(t) if core::ptr::eq(*t, waypoint))
    }
}

/// Side of the active line the aircraft is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// Lateral deviation from the active line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CrossTrack {
    /// Distance in meters (always positive).
    pub error: f64,
    pub side: Side,
}

/// Read access to the course planner plus the two mutators the input
/// handler needs.
///
/// All slices are empty while no map is loaded.
pub trait Course {
    fn current_target(&self) -> Target<'_>;
    fn next_target(&self) -> Target<'_>;

    /// Tracking correction in degrees (positive: steer right).
    fn tracking(&self) -> f64;

    /// Distance to the end of the current target, meters.
    fn distance_to_go(&self) -> f64;

    fn cross_track(&self) -> CrossTrack;

    /// Aircraft is established on the current line.
    fn on_line(&self) -> bool;

    fn map_loaded(&self) -> bool;

    /// Turn points of the course outline, in order.
    fn corner_points(&self) -> &[Coord];
    fn flight_lines(&self) -> &[Leg];
    fn tie_lines(&self) -> &[Leg];
    fn waypoints(&self) -> &[Waypoint];

    /// Final destination.
    fn dest_point(&self) -> Coord;

    fn load(&mut self, path: &Path) -> CourseResult<()>;
    fn unload(&mut self);
}

// =============================================================================
// Sensor Snapshots
// =============================================================================

/// Flight state derived from GPS by the flight collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightData {
    /// World position, meters.
    pub position: Coord,
    /// Heading in degrees, 0 = north, clockwise.
    pub heading: f64,
    pub heading_sin: f64,
    pub heading_cos: f64,
    /// Altitude in meters in the active datum.
    pub altitude: f64,
    /// Altitude is above ground (radar) rather than above sea level.
    pub agl: bool,
    /// Ground speed, m/s.
    pub speed: f64,
    /// Operator is panning the map; own-ship overlays are hidden.
    pub panning: bool,
}

impl Default for FlightData {
    /// At the origin heading north.
    fn default() -> Self {
        Self {
            position: Coord::ORIGIN,
            heading: 0.0,
            heading_sin: 0.0,
            heading_cos: 1.0,
            altitude: 0.0,
            agl: false,
            speed: 0.0,
            panning: false,
        }
    }
}

impl FlightData {
    /// Set heading together with its sine/cosine pair.
    pub fn set_heading(&mut self, degrees: f64) {
        self.heading = degrees;
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.heading_sin = sin;
        self.heading_cos = cos;
    }
}

/// Decoded GPS fix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GpsData {
    /// UTC time of fix as hhmmss.sss.
    pub utc_time: f64,
    pub latitude: f64,
    pub lat_hemisphere: char,
    pub longitude: f64,
    pub lon_hemisphere: char,
    pub altitude: f64,
    pub altitude_unit: char,
    pub fix_quality: u8,
    pub satellites: u8,
    /// Most recent raw sentence, shown while configuring the receiver.
    pub sentence: String<96>,
}

/// Magnetometer reading.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MagData {
    /// Total field, nT.
    pub field: f64,
}

/// Radar altimeter reading.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RalData {
    /// Height above ground, meters.
    pub height: f64,
}

// =============================================================================
// Binding
// =============================================================================

/// Everything an instrument may read during one update pass.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub course: &'a dyn Course,
    pub flight: &'a FlightData,
    pub gps: &'a GpsData,
    pub mag: &'a MagData,
    pub ral: &'a RalData,
}

/// Which collaborator a refresh callback was registered against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Course,
    Flight,
    Gps,
    Mag,
    Ral,
}

/// The single data source a refresh callback receives.
#[derive(Clone, Copy)]
pub enum Bound<'a> {
    Course(&'a dyn Course),
    Flight(&'a FlightData),
    Gps(&'a GpsData),
    Mag(&'a MagData),
    Ral(&'a RalData),
}

impl<'a> Sources<'a> {
    /// Narrow the full source set down to the one a callback asked for.
    pub fn bind(&self, source: Source) -> Bound<'a> {
        match source {
            Source::Course => Bound::Course(self.course),
            Source::Flight => Bound::Flight(self.flight),
            Source::Gps => Bound::Gps(self.gps),
            Source::Mag => Bound::Mag(self.mag),
            Source::Ral => Bound::Ral(self.ral),
        }
    }
}
