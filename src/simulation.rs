//! Simulated collaborators for running the display without an aircraft.
//!
//! - [`DemoCourse`]: survey block generated around the origin once a course
//!   file has been chosen, with target sequencing and steering values
//! - [`FlightSimulant`]: aircraft that flies whatever the course asks for
//! - [`SensorSimulator`]: GPS fixes with NMEA sentences, magnetometer and
//!   radar altimeter readings
//!
//! Each `step`/`update`/`tick` returns the change flags it caused, which the
//! loop ORs into the iteration's mask.

use std::path::Path;

use heapless::String;

use crate::changes::ChangeMask;
use crate::config::GuidanceConfig;
use crate::error::{CourseError, CourseResult};
use crate::geometry::{Coord, Line};
use crate::sources::{
    Course, CrossTrack, FlightData, GpsData, Leg, LegKind, MagData, RalData, Side, Sources, Target, Waypoint,
    WaypointKind,
};

// =============================================================================
// Demo Course
// =============================================================================

/// Survey lines in the generated block.
const LINE_COUNT: u32 = 6;

/// Spacing between survey lines, meters.
const LINE_SPACING: f64 = 250.0;

/// Length of one survey line, meters.
const LINE_LENGTH: f64 = 2400.0;

/// How far ahead on the line the steering point sits, in catch radii.
const LOOKAHEAD: f64 = 3.0;

/// Reference into the course's own storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TargetRef {
    Flight(usize),
    Tie(usize),
    Waypoint(usize),
}

/// Generated survey block with target sequencing.
#[derive(Default)]
pub struct DemoCourse {
    catch_radius: f64,
    loaded: bool,
    corners: Vec<Coord>,
    flight_lines: Vec<Leg>,
    tie_lines: Vec<Leg>,
    waypoints: Vec<Waypoint>,
    dest: Coord,
    /// Targets in flying order.
    plan: Vec<TargetRef>,
    /// Index into `plan` of the current target.
    position: usize,
    tracking: f64,
    distance_to_go: f64,
    cross_track: CrossTrack,
    on_line: bool,
}

fn caption(text: &str) -> String<16> { String::try_from(text).unwrap_or_default() }

/// Compass bearing from `from` to `to` in degrees, 0 = north, clockwise.
pub fn bearing(from: Coord, to: Coord) -> f64 {
    let d = to - from;
    d.x.atan2(d.y).to_degrees().rem_euclid(360.0)
}

/// Signed difference `to - from` folded into (-180, 180].
pub fn heading_difference(from: f64, to: f64) -> f64 {
    let diff = (to - from).rem_euclid(360.0);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

impl DemoCourse {
    pub fn new(catch_radius: f64) -> Self { Self { catch_radius, ..Self::default() } }

    /// Build the survey block: north-south lines flown alternately up and
    /// down, two tie lines across their ends and a few waypoints.
    fn generate(&mut self) {
        let half = LINE_LENGTH / 2.0;
        let west = -LINE_SPACING * f64::from(LINE_COUNT - 1) / 2.0;
        let east = -west;

        self.flight_lines = (0..LINE_COUNT)
            .map(|i| {
                let x = west + LINE_SPACING * f64::from(i);
                let (south, north) = (Coord::new(x, -half), Coord::new(x, half));
                let line = if i % 2 == 0 { Line::new(south, north) } else { Line::new(north, south) };
                // First line already flown.
                Leg { id: i + 1, kind: LegKind::Flight, line, blocked: i == 0 }
            })
            .collect();
        self.tie_lines = [-half, half]
            .iter()
            .zip(1..)
            .map(|(&y, id)| Leg {
                id: 100 + id,
                kind: LegKind::Tie,
                line: Line::new(Coord::new(west, y), Coord::new(east, y)),
                blocked: false,
            })
            .collect();

        let margin = LINE_SPACING / 2.0;
        self.corners = vec![
            Coord::new(west - margin, -half - margin),
            Coord::new(west - margin, half + margin),
            Coord::new(east + margin, half + margin),
            Coord::new(east + margin, -half - margin),
        ];

        let home = Coord::new(0.0, -half - 1500.0);
        self.waypoints = vec![
            Waypoint { kind: WaypointKind::Home, position: home, caption: caption("HOME") },
            Waypoint { kind: WaypointKind::Camp, position: Coord::new(east + 800.0, -half), caption: caption("CAMP") },
            Waypoint {
                kind: WaypointKind::Barrel,
                position: Coord::new(west - 600.0, -half - 700.0),
                caption: caption("FUEL"),
            },
            Waypoint {
                kind: WaypointKind::PowerLine,
                position: Coord::new(east + 300.0, half + 400.0),
                caption: caption("PWR"),
            },
            Waypoint { kind: WaypointKind::Flag, position: Coord::new(west, half + 600.0), caption: caption("START") },
        ];
        self.dest = home;

        self.plan = self
            .flight_lines
            .iter()
            .enumerate()
            .filter(|(_, leg)| !leg.blocked)
            .map(|(i, _)| TargetRef::Flight(i))
            .collect();
        self.plan.push(TargetRef::Tie(0));
        self.plan.push(TargetRef::Waypoint(0));
        self.position = 0;
    }

    fn resolve(&self, target: Option<TargetRef>) -> Target<'_> {
        match target {
            Some(TargetRef::Flight(i)) => self.flight_lines.get(i).map_or(Target::None, Target::Leg),
            Some(TargetRef::Tie(i)) => self.tie_lines.get(i).map_or(Target::None, Target::Leg),
            Some(TargetRef::Waypoint(i)) => self.waypoints.get(i).map_or(Target::None, Target::Waypoint),
            None => Target::None,
        }
    }

    fn current(&self) -> Option<TargetRef> { self.plan.get(self.position).copied() }

    /// Recompute steering values for the aircraft at `flight` and move on
    /// to the next target once the current one is reached.
    pub fn update(&mut self, flight: &FlightData) -> ChangeMask {
        if !self.loaded {
            return ChangeMask::NONE;
        }
        let mut mask = ChangeMask::COURSE_UPDATE;
        if self.steer(flight) && self.position < self.plan.len() {
            self.position += 1;
            log::info!("target reached, {} left", self.plan.len() - self.position);
            self.steer(flight);
            mask |= ChangeMask::TARGET_UPDATE;
        }
        mask
    }

    /// Returns true if the current target is reached.
    fn steer(&mut self, flight: &FlightData) -> bool {
        let position = flight.position;
        let aim = match self.resolve(self.current()) {
            Target::Leg(leg) => {
                let line = leg.line;
                let dir = (line.end - line.begin).unit();
                let r = position - line.begin;
                let along = r.x * dir.x + r.y * dir.y;
                let right = r.x * dir.y - r.y * dir.x;
                self.distance_to_go = (line.length() - along).max(0.0);
                self.cross_track =
                    CrossTrack { error: right.abs(), side: if right > 0.0 { Side::Right } else { Side::Left } };
                self.on_line = along >= 0.0 && right.abs() < self.catch_radius;
                let ahead = along.max(0.0) + LOOKAHEAD * self.catch_radius;
                line.begin + dir * ahead.min(line.length())
            }
            Target::Waypoint(wp) => {
                let aim = wp.position;
                self.distance_to_go = (aim - position).length();
                self.cross_track = CrossTrack::default();
                self.on_line = false;
                aim
            }
            Target::None => {
                self.distance_to_go = 0.0;
                self.cross_track = CrossTrack::default();
                self.on_line = false;
                self.tracking = 0.0;
                return false;
            }
        };
        self.tracking = heading_difference(flight.heading, bearing(position, aim));
        self.distance_to_go < self.catch_radius
    }
}

impl Course for DemoCourse {
    fn current_target(&self) -> Target<'_> { self.resolve(self.current()) }

    fn next_target(&self) -> Target<'_> { self.resolve(self.plan.get(self.position + 1).copied()) }

    fn tracking(&self) -> f64 { self.tracking }

    fn distance_to_go(&self) -> f64 { self.distance_to_go }

    fn cross_track(&self) -> CrossTrack { self.cross_track }

    fn on_line(&self) -> bool { self.on_line }

    fn map_loaded(&self) -> bool { self.loaded }

    fn corner_points(&self) -> &[Coord] { &self.corners }

    fn flight_lines(&self) -> &[Leg] { &self.flight_lines }

    fn tie_lines(&self) -> &[Leg] { &self.tie_lines }

    fn waypoints(&self) -> &[Waypoint] { &self.waypoints }

    fn dest_point(&self) -> Coord { self.dest }

    /// The file only has to exist; its content is not parsed.
    fn load(&mut self, path: &Path) -> CourseResult<()> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(CourseError::NoFlightLines(path.to_path_buf()));
        }
        self.generate();
        self.loaded = true;
        log::debug!("demo block for {}: {} lines", path.display(), self.flight_lines.len());
        Ok(())
    }

    fn unload(&mut self) { *self = Self::new(self.catch_radius); }
}

// =============================================================================
// Flight Simulant
// =============================================================================

/// Cruise ground speed, m/s.
const CRUISE_SPEED: f64 = 60.0;

/// Standard rate turn, degrees per second.
const TURN_RATE: f64 = 3.0;

/// Aircraft that follows the course's tracking correction.
pub struct FlightSimulant {
    flight: FlightData,
    survey_height: f64,
    elapsed: f64,
}

impl FlightSimulant {
    /// Start south of the block heading north at survey height.
    pub fn new(config: &GuidanceConfig) -> Self {
        let mut flight = FlightData {
            position: Coord::new(-LINE_SPACING * 2.5, -LINE_LENGTH),
            altitude: config.survey_height_agl,
            agl: true,
            speed: CRUISE_SPEED,
            ..FlightData::default()
        };
        flight.set_heading(0.0);
        Self { flight, survey_height: config.survey_height_agl, elapsed: 0.0 }
    }

    #[inline]
    pub const fn data(&self) -> &FlightData { &self.flight }

    /// Advance `dt` seconds. Without a course the aircraft circles.
    pub fn step(&mut self, dt: f64, course: &dyn Course) -> ChangeMask {
        if dt <= 0.0 {
            return ChangeMask::NONE;
        }
        self.elapsed += dt;
        let max_turn = TURN_RATE * dt;
        let turn = if course.map_loaded() { course.tracking().clamp(-max_turn, max_turn) } else { max_turn / 3.0 };
        self.flight.set_heading((self.flight.heading + turn).rem_euclid(360.0));

        let travel = self.flight.speed * dt;
        self.flight.position =
            self.flight.position + Coord::new(self.flight.heading_sin, self.flight.heading_cos) * travel;
        self.flight.altitude = self.survey_height + 15.0 * (self.elapsed * 0.2).sin();
        ChangeMask::FLIGHT_UPDATE
    }
}

// =============================================================================
// Sensor Simulator
// =============================================================================

/// Seconds between GPS fixes.
const GPS_INTERVAL: f64 = 1.0;

/// Seconds between radar altimeter readings.
const RAL_INTERVAL: f64 = 0.4;

/// Latitude/longitude of the world origin, degrees.
const ORIGIN_LAT: f64 = 48.2;
const ORIGIN_LON: f64 = 16.4;

/// Ground elevation under the block, meters MSL.
const GROUND_ELEVATION: f64 = 180.0;

/// Meters per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Generate a sinusoidal signal oscillating between min and max values.
fn fake_signal(t: f64, min: f64, max: f64, freq: f64) -> f64 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

/// XOR of every byte between `$` and `*`.
pub fn nmea_checksum(body: &str) -> u8 { body.bytes().fold(0, |acc, b| acc ^ b) }

/// Whole degrees and minutes of `degrees`.
fn nmea_angle(degrees: f64) -> (u32, f64) {
    let abs = degrees.abs();
    let whole = abs.trunc();
    (whole as u32, (abs - whole) * 60.0)
}

/// GGA sentence for `gps`.
pub fn gga_sentence(gps: &GpsData) -> String<96> {
    let (lat_deg, lat_min) = nmea_angle(gps.latitude);
    let (lon_deg, lon_min) = nmea_angle(gps.longitude);
    let mut body: String<96> = String::new();
    core::fmt::write(
        &mut body,
        format_args!(
            "GPGGA,{:09.2},{lat_deg:02}{lat_min:07.4},{},{lon_deg:03}{lon_min:07.4},{},{},{:02},0.9,{:.1},{},0.0,M,,",
            gps.utc_time,
            gps.lat_hemisphere,
            gps.lon_hemisphere,
            gps.fix_quality,
            gps.satellites,
            gps.altitude,
            gps.altitude_unit,
        ),
    )
    .ok();
    let mut sentence: String<96> = String::new();
    core::fmt::write(&mut sentence, format_args!("${body}*{:02X}", nmea_checksum(&body))).ok();
    sentence
}

/// Produces sensor snapshots on their own schedules.
pub struct SensorSimulator {
    gps: GpsData,
    mag: MagData,
    ral: RalData,
    last_gps: Option<f64>,
    last_ral: Option<f64>,
    /// UTC seconds of day at `t = 0`.
    utc_start: f64,
}

impl Default for SensorSimulator {
    fn default() -> Self { Self::new() }
}

impl SensorSimulator {
    pub fn new() -> Self {
        Self {
            gps: GpsData { altitude_unit: 'M', lat_hemisphere: 'N', lon_hemisphere: 'E', ..GpsData::default() },
            mag: MagData::default(),
            ral: RalData::default(),
            last_gps: None,
            last_ral: None,
            utc_start: 12.0 * 3600.0,
        }
    }

    #[inline]
    pub const fn gps(&self) -> &GpsData { &self.gps }

    #[inline]
    pub const fn mag(&self) -> &MagData { &self.mag }

    #[inline]
    pub const fn ral(&self) -> &RalData { &self.ral }

    /// Everything the display reads, with `course` and `flight` from their
    /// own simulants.
    pub fn sources<'a>(&'a self, course: &'a dyn Course, flight: &'a FlightData) -> Sources<'a> {
        Sources { course, flight, gps: &self.gps, mag: &self.mag, ral: &self.ral }
    }

    /// Produce whatever is due at `t` seconds. The magnetometer reads every
    /// tick.
    pub fn tick(&mut self, t: f64, flight: &FlightData) -> ChangeMask {
        let mut mask = ChangeMask::MAG_UPDATE;
        self.mag.field = 48_500.0 + 25.0 * (flight.position.x / 150.0).sin() + fake_signal(t, -2.0, 2.0, 3.1);

        if self.last_gps.is_none_or(|last| t - last >= GPS_INTERVAL) {
            self.last_gps = Some(t);
            self.update_gps(t, flight);
            mask |= ChangeMask::GPS_UPDATE;
        }
        if self.last_ral.is_none_or(|last| t - last >= RAL_INTERVAL) {
            self.last_ral = Some(t);
            self.ral.height = (flight.altitude + fake_signal(t, -3.0, 3.0, 1.7)).max(0.0);
            mask |= ChangeMask::RAL_UPDATE;
        }
        mask
    }

    fn update_gps(&mut self, t: f64, flight: &FlightData) {
        let secs = (self.utc_start + t).rem_euclid(86_400.0);
        let (h, m, s) = ((secs / 3600.0).trunc(), ((secs % 3600.0) / 60.0).trunc(), secs % 60.0);
        self.gps.utc_time = h * 10_000.0 + m * 100.0 + s;

        let latitude = ORIGIN_LAT + flight.position.y / METERS_PER_DEGREE;
        let longitude = ORIGIN_LON + flight.position.x / (METERS_PER_DEGREE * latitude.to_radians().cos());
        self.gps.latitude = latitude.abs();
        self.gps.lat_hemisphere = if latitude >= 0.0 { 'N' } else { 'S' };
        self.gps.longitude = longitude.abs();
        self.gps.lon_hemisphere = if longitude >= 0.0 { 'E' } else { 'W' };
        self.gps.altitude = GROUND_ELEVATION + flight.altitude;
        self.gps.fix_quality = if t < 5.0 { 1 } else { 2 };
        self.gps.satellites = 9;
        self.gps.sentence = gga_sentence(&self.gps);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn course_file(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gpgs-simulation-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("block.pgn");
        std::fs::write(&path, b"").unwrap();
        path
    }

    fn loaded_course(tag: &str) -> DemoCourse {
        let mut course = DemoCourse::new(100.0);
        course.load(&course_file(tag)).unwrap();
        course
    }

    #[test]
    fn test_bearing_and_difference() {
        assert!((bearing(Coord::ORIGIN, Coord::new(0.0, 10.0))).abs() < 1e-9, "north");
        assert!((bearing(Coord::ORIGIN, Coord::new(10.0, 0.0)) - 90.0).abs() < 1e-9, "east");
        assert!((bearing(Coord::ORIGIN, Coord::new(-10.0, 0.0)) - 270.0).abs() < 1e-9, "west");
        assert!((heading_difference(350.0, 10.0) - 20.0).abs() < 1e-9, "wraps through north");
        assert!((heading_difference(10.0, 350.0) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_requires_existing_file() {
        let mut course = DemoCourse::new(100.0);
        let missing = std::env::temp_dir().join("gpgs-simulation-missing/none.pgn");
        assert!(matches!(course.load(&missing), Err(CourseError::Io(_))));
        assert!(!course.map_loaded());
        assert!(course.flight_lines().is_empty(), "nothing generated on failure");
    }

    #[test]
    fn test_generated_block() {
        let course = loaded_course("block");
        assert!(course.map_loaded());
        assert_eq!(course.flight_lines().len(), LINE_COUNT as usize);
        assert_eq!(course.tie_lines().len(), 2);
        assert_eq!(course.corner_points().len(), 4);
        assert!(course.flight_lines()[0].blocked, "first line already flown");
        assert!(
            course.current_target().is_leg(&course.flight_lines()[1]),
            "first open line is the current target"
        );
        assert!(course.next_target().is_leg(&course.flight_lines()[2]));
    }

    #[test]
    fn test_unload_clears_everything() {
        let mut course = loaded_course("unload");
        course.unload();
        assert!(!course.map_loaded());
        assert!(course.flight_lines().is_empty() && course.waypoints().is_empty());
        assert!(matches!(course.current_target(), Target::None));
        assert_eq!(course.update(&FlightData::default()), ChangeMask::NONE, "no course, no changes");
    }

    #[test]
    fn test_steering_on_line() {
        let mut course = loaded_course("steer");
        // Line 2 runs north to south at x = -375.
        let mut flight = FlightData { position: Coord::new(-375.0 + 20.0, 0.0), ..FlightData::default() };
        flight.set_heading(180.0);
        let mask = course.update(&flight);
        assert!(mask.contains(ChangeMask::COURSE_UPDATE));
        assert!(!mask.intersects(ChangeMask::TARGET_UPDATE));
        assert!(course.on_line());
        assert!((course.distance_to_go() - LINE_LENGTH / 2.0).abs() < 1e-6);
        let xte = course.cross_track();
        assert!((xte.error - 20.0).abs() < 1e-6);
        // Heading south, east of the line is the left side.
        assert_eq!(xte.side, Side::Left);
        assert!(course.tracking() > 0.0, "steer right (west) back onto the line");
    }

    #[test]
    fn test_reaching_end_advances_target() {
        let mut course = loaded_course("advance");
        let end = course.flight_lines()[1].line.end;
        let flight = FlightData { position: end, ..FlightData::default() };
        let mask = course.update(&flight);
        assert!(mask.contains(ChangeMask::TARGET_UPDATE), "target change reported");
        assert!(course.current_target().is_leg(&course.flight_lines()[2]));
    }

    #[test]
    fn test_flight_follows_tracking() {
        let course = loaded_course("follow");
        let mut sim = FlightSimulant::new(&GuidanceConfig::default());
        let before = sim.data().position;
        assert_eq!(sim.step(1.0, &course), ChangeMask::FLIGHT_UPDATE);
        let moved = (sim.data().position - before).length();
        assert!((moved - CRUISE_SPEED).abs() < 1e-6, "one second at cruise speed");
        assert_eq!(sim.step(0.0, &course), ChangeMask::NONE);
    }

    #[test]
    fn test_nmea_checksum() {
        // Reference sentence from the NMEA 0183 GGA documentation.
        let body = "GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        assert_eq!(nmea_checksum(body), 0x47);
    }

    #[test]
    fn test_gga_sentence_layout() {
        let gps = GpsData {
            utc_time: 123_519.0,
            latitude: 48.1173,
            lat_hemisphere: 'N',
            longitude: 11.516_666_7,
            lon_hemisphere: 'E',
            altitude: 545.4,
            altitude_unit: 'M',
            fix_quality: 1,
            satellites: 8,
            ..GpsData::default()
        };
        let sentence = gga_sentence(&gps);
        assert!(sentence.starts_with("$GPGGA,123519.00,4807.0380,N,01131.0000,E,1,08,"), "{sentence}");
        let (body, checksum) = sentence[1..].split_once('*').unwrap();
        assert_eq!(u8::from_str_radix(checksum, 16).unwrap(), nmea_checksum(body));
    }

    #[test]
    fn test_sensor_schedules() {
        let mut sensors = SensorSimulator::new();
        let flight = FlightData::default();
        let first = sensors.tick(0.0, &flight);
        assert!(first.contains(ChangeMask::GPS_UPDATE | ChangeMask::MAG_UPDATE | ChangeMask::RAL_UPDATE));
        assert!(sensors.gps().sentence.starts_with("$GPGGA,120000.00,"));
        assert!(sensors.mag().field > 48_000.0);

        let soon = sensors.tick(0.2, &flight);
        assert_eq!(soon, ChangeMask::MAG_UPDATE, "GPS and radar not due yet");
        let later = sensors.tick(1.0, &flight);
        assert!(later.contains(ChangeMask::GPS_UPDATE | ChangeMask::RAL_UPDATE));
    }
}
