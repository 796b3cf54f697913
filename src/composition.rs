//! Display composition: owns every frame and decides what redraws when.
//!
//! # Update Pass
//!
//! Each loop iteration produces one [`ChangeMask`]. [`redraw_plan`] turns it
//! into the list of frames to draw, in order, and whether each keeps its
//! border. [`GuidanceDisplay::run_update`] draws that list into the surface
//! and flips the surface to the physical display exactly once.
//!
//! # Routing
//!
//! | Change | Frames | Border |
//! |--------|--------|--------|
//! | `GPS_UPDATE` | lat/lon (magnetometer display off), fix, GPS altitude, clock | suppressed |
//! | `MAG_UPDATE` | magnetic field (magnetometer display on) | suppressed |
//! | `MAG_UPDATE`, `RAL_UPDATE` | radar altitude (magnetometer display on) | suppressed |
//! | `FLIGHT_UPDATE` | datum | painted |
//! | `FLIGHT_UPDATE` | altitude gauge, compass, heading, ground speed | suppressed |
//! | `TARGET_UPDATE` | current/next target | suppressed |
//! | `COURSE_UPDATE` | tracking gauge, distance to go | suppressed |
//!
//! The main panel is appended last with its border: the GPS panel on
//! `GPS_UPDATE`, the file chooser on `MAP_UPDATE`, the profile and the map
//! on every pass.
//!
//! # Keys
//!
//! | Key | View | Effect | Raises |
//! |-----|------|--------|--------|
//! | Enter | GPS panel | open chooser | `MAP_UPDATE` |
//! | Enter | chooser | load course, open map | `MAP`, `COURSE`, `TARGET` |
//! | Enter | chooser (exit or failed load) | quit | `QUIT` |
//! | Esc | map | unload course, open chooser | `MAP`, `COURSE`, `TARGET` |
//! | Up/Down | chooser | move selection | `MAP_UPDATE` if moved |
//! | Z/S/A | map | zoom in/out/auto | `MAP_UPDATE` |
//! | Z/S/A | profile | finer/reset/coarser scale | |
//! | R | any | toggle magnetometer display | `MAG`, `GPS` |
//! | V | any | toggle profile | `MAP_UPDATE` or `MAG_UPDATE` |
//! | Q | any | quit | `QUIT` |

use std::time::Instant;

use embedded_graphics::prelude::*;

use crate::changes::ChangeMask;
use crate::config::{GuidanceConfig, Layout, MIN_SCREEN_HEIGHT, MIN_SCREEN_WIDTH};
use crate::display::{Key, PhysicalDisplay, Surface};
use crate::error::{DisplayError, DisplayResult};
use crate::frame::{Command, DrawContext, Frame, Reply};
use crate::instruments::{Role, Setup};
use crate::sources::{Course, Sources};
use crate::views::View;

/// Upper bound on frames drawn in one pass.
pub const PLAN_CAPACITY: usize = 24;

/// Frames to draw for one pass, each with its `suppress_border` flag.
pub type RedrawPlan = heapless::Vec<(Role, bool), PLAN_CAPACITY>;

/// Counters for one update pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub frames: u32,
    pub borders: u32,
}

/// Frames that redraw for `mask` while `view` is in the main panel.
pub fn redraw_plan(mask: ChangeMask, view: View, mag_display: bool) -> RedrawPlan {
    let mut plan = RedrawPlan::new();
    let mut add = |role: Role, suppress: bool| {
        // Capacity exceeds the number of roles.
        plan.push((role, suppress)).ok();
    };

    if mask.intersects(ChangeMask::GPS_UPDATE) {
        if !mag_display {
            add(Role::GpsLatitude, true);
            add(Role::GpsLongitude, true);
        }
        add(Role::GpsFix, true);
        add(Role::GpsAltitude, true);
        add(Role::Clock, true);
    }
    if mag_display {
        if mask.intersects(ChangeMask::MAG_UPDATE) {
            add(Role::MagField, true);
        }
        if mask.intersects(ChangeMask::MAG_UPDATE | ChangeMask::RAL_UPDATE) {
            add(Role::RadarAltitude, true);
        }
    }
    if mask.intersects(ChangeMask::FLIGHT_UPDATE) {
        add(Role::Datum, false);
        add(Role::AltitudeBar, true);
        add(Role::Compass, true);
        add(Role::Heading, true);
        add(Role::GroundSpeed, true);
    }
    if mask.intersects(ChangeMask::TARGET_UPDATE) {
        add(Role::CurrTarget, true);
        add(Role::NextTarget, true);
    }
    if mask.intersects(ChangeMask::COURSE_UPDATE) {
        add(Role::TrackingBar, true);
        add(Role::DistanceToGo, true);
    }

    match view {
        View::GpsPanel if mask.intersects(ChangeMask::GPS_UPDATE) => add(Role::GpsPanel, false),
        View::FileChooser if mask.intersects(ChangeMask::MAP_UPDATE) => add(Role::FileChooser, false),
        View::SensorProfile => add(Role::Profile, false),
        View::Map => add(Role::Map, false),
        _ => {}
    }
    plan
}

/// The composition root of the display.
pub struct GuidanceDisplay<D: PhysicalDisplay> {
    surface: Surface,
    /// Indexed by [`Role::index`].
    frames: Vec<Box<dyn Frame>>,
    view: View,
    mag_display: bool,
    display: D,
}

impl<D: PhysicalDisplay> GuidanceDisplay<D> {
    /// Build every instrument for a `size` surface, draw them all once and
    /// show the result.
    ///
    /// Fails if the surface is below the minimum size, too narrow for its
    /// height, or any instrument cannot be built; instruments already built
    /// are released.
    pub fn init_display(display: D, size: Size, config: &GuidanceConfig, sources: Sources<'_>) -> DisplayResult<Self> {
        let too_small = DisplayError::SurfaceTooSmall { width: size.width, height: size.height };
        if size.width < MIN_SCREEN_WIDTH || size.height < MIN_SCREEN_HEIGHT {
            return Err(too_small);
        }
        let layout = Layout::for_surface(size.width, size.height).ok_or(too_small)?;
        let setup = Setup { layout, config };
        let frames = setup.build()?;

        let mut gd = Self { surface: Surface::new(size), frames, view: View::default(), mag_display: config.mag_display, display };
        let ctx = DrawContext { changes: ChangeMask::ALL, sources };
        for (role, _) in redraw_plan(ChangeMask::ALL, gd.view, gd.mag_display) {
            gd.frames[role.index()].draw(&mut gd.surface, &ctx, false);
        }
        gd.display.flip(&gd.surface);
        log::info!("display initialized: {}x{}, {} frames", size.width, size.height, gd.frames.len());
        Ok(gd)
    }

    /// Redraw whatever `mask` touches and flip once.
    pub fn run_update(&mut self, mask: ChangeMask, sources: Sources<'_>) -> UpdateStats {
        let started = Instant::now();
        let ctx = DrawContext { changes: mask, sources };
        let mut stats = UpdateStats::default();
        for (role, suppress) in redraw_plan(mask, self.view, self.mag_display) {
            self.frames[role.index()].draw(&mut self.surface, &ctx, suppress);
            stats.frames += 1;
            if !suppress {
                stats.borders += 1;
            }
        }
        self.display.flip(&self.surface);
        log::debug!("update {mask:?}: {} frames in {:?}", stats.frames, started.elapsed());
        stats
    }

    fn panel(&mut self, role: Role) -> &mut dyn Frame { &mut *self.frames[role.index()] }

    fn set_view(&mut self, view: View) {
        if self.view != view {
            log::info!("view {:?} -> {view:?}", self.view);
            self.view = view;
        }
    }

    /// React to an operator key. Returns the changes it causes.
    pub fn handle_input(&mut self, key: Key, course: &mut dyn Course) -> ChangeMask {
        let course_changed = ChangeMask::MAP_UPDATE | ChangeMask::COURSE_UPDATE | ChangeMask::TARGET_UPDATE;
        match (key, self.view) {
            (Key::Char('Q'), _) => ChangeMask::QUIT,
            (Key::Enter, View::GpsPanel) => {
                self.set_view(View::FileChooser);
                ChangeMask::MAP_UPDATE
            }
            (Key::Enter, View::FileChooser) => match self.panel(Role::FileChooser).control(Command::ChosenFile) {
                Reply::File(path) => match course.load(&path) {
                    Ok(()) => {
                        log::info!("course {} loaded", path.display());
                        self.set_view(View::Map);
                        course_changed
                    }
                    Err(err) => {
                        log::error!("cannot load course {}: {err}", path.display());
                        ChangeMask::QUIT
                    }
                },
                _ => ChangeMask::QUIT,
            },
            (Key::Escape, View::Map) => {
                course.unload();
                log::info!("course unloaded");
                self.set_view(View::FileChooser);
                course_changed
            }
            (Key::Up | Key::Down, View::FileChooser) => {
                let command = if key == Key::Up { Command::SelectPrevious } else { Command::SelectNext };
                match self.panel(Role::FileChooser).control(command) {
                    Reply::Changed => ChangeMask::MAP_UPDATE,
                    _ => ChangeMask::NONE,
                }
            }
            (Key::Char(c @ ('Z' | 'S' | 'A')), View::Map) => {
                let command = match c {
                    'Z' => Command::ZoomIn,
                    'S' => Command::ZoomOut,
                    _ => Command::ZoomAuto,
                };
                self.panel(Role::Map).control(command);
                ChangeMask::MAP_UPDATE
            }
            (Key::Char(c @ ('Z' | 'S' | 'A')), View::SensorProfile) => {
                let command = match c {
                    'Z' => Command::ZoomIn,
                    'S' => Command::ZoomAuto,
                    _ => Command::ZoomOut,
                };
                self.panel(Role::Profile).control(command);
                ChangeMask::NONE
            }
            (Key::Char('R'), _) => {
                self.mag_display = !self.mag_display;
                log::info!("magnetometer display {}", if self.mag_display { "on" } else { "off" });
                ChangeMask::MAG_UPDATE | ChangeMask::GPS_UPDATE
            }
            (Key::Char('V'), view) => {
                let next = view.toggle_profile();
                self.set_view(next);
                if next == View::SensorProfile { ChangeMask::MAG_UPDATE } else { ChangeMask::MAP_UPDATE }
            }
            _ => ChangeMask::NONE,
        }
    }

    /// Release every instrument and hand back the physical display.
    pub fn teardown_display(mut self) -> D {
        for frame in &mut self.frames {
            frame.destroy();
        }
        log::info!("display torn down");
        self.display
    }

    #[inline]
    pub const fn view(&self) -> View { self.view }

    #[inline]
    pub const fn mag_display(&self) -> bool { self.mag_display }

    #[inline]
    pub const fn surface(&self) -> &Surface { &self.surface }

    #[inline]
    pub const fn display(&self) -> &D { &self.display }

    #[inline]
    pub fn display_mut(&mut self) -> &mut D { &mut self.display }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::colors::{LINE_NEUTRAL, TARGET_CURRENT};
    use crate::display::HeadlessDisplay;
    use crate::error::{CourseError, CourseResult};
    use crate::frame::test_support::Snapshots;
    use crate::geometry::{Coord, Line};
    use crate::sources::{CrossTrack, Leg, LegKind, Target, Waypoint};

    /// Course that records what the input handler asks of it.
    #[derive(Default)]
    struct ScriptedCourse {
        lines: Vec<Leg>,
        current: Option<usize>,
        fail_load: bool,
        loaded: Vec<PathBuf>,
        unloads: u32,
    }

    impl Course for ScriptedCourse {
        fn current_target(&self) -> Target<'_> { self.current.map_or(Target::None, |i| Target::Leg(&self.lines[i])) }
        fn next_target(&self) -> Target<'_> { Target::None }
        fn tracking(&self) -> f64 { 0.0 }
        fn distance_to_go(&self) -> f64 { 1000.0 }
        fn cross_track(&self) -> CrossTrack { CrossTrack::default() }
        fn on_line(&self) -> bool { false }
        fn map_loaded(&self) -> bool { !self.loaded.is_empty() }
        fn corner_points(&self) -> &[Coord] { &[] }
        fn flight_lines(&self) -> &[Leg] { &self.lines }
        fn tie_lines(&self) -> &[Leg] { &[] }
        fn waypoints(&self) -> &[Waypoint] { &[] }
        fn dest_point(&self) -> Coord { Coord::new(1.0e6, 1.0e6) }
        fn load(&mut self, path: &Path) -> CourseResult<()> {
            if self.fail_load {
                return Err(CourseError::NoFlightLines(path.to_path_buf()));
            }
            self.loaded.push(path.to_path_buf());
            Ok(())
        }
        fn unload(&mut self) { self.unloads += 1; }
    }

    /// Three east-west lines 50, 100 and 150 m north of the origin.
    fn three_lines() -> Vec<Leg> {
        (1..=3)
            .map(|i| Leg {
                id: i,
                kind: LegKind::Flight,
                line: Line::new(Coord::new(-100.0, 50.0 * f64::from(i)), Coord::new(100.0, 50.0 * f64::from(i))),
                blocked: false,
            })
            .collect()
    }

    /// Config whose map directory holds `files`.
    fn config_with_maps(tag: &str, files: &[&str]) -> GuidanceConfig {
        let dir = std::env::temp_dir().join(format!("gpgs-composition-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in files {
            std::fs::write(dir.join(name), b"").unwrap();
        }
        GuidanceConfig { map_directory: dir, ..GuidanceConfig::default() }
    }

    fn init(config: &GuidanceConfig, course: &dyn Course, snapshots: &Snapshots) -> GuidanceDisplay<HeadlessDisplay> {
        GuidanceDisplay::init_display(HeadlessDisplay::new(), Size::new(640, 480), config, snapshots.sources(course))
            .unwrap()
    }

    fn roles(plan: &RedrawPlan) -> Vec<Role> { plan.iter().map(|(role, _)| *role).collect() }

    const VIEWS: [View; 4] = [View::GpsPanel, View::FileChooser, View::Map, View::SensorProfile];

    // -------------------------------------------------------------------------
    // Routing
    // -------------------------------------------------------------------------

    #[test]
    fn test_plan_is_monotone() {
        for view in VIEWS {
            for mag in [false, true] {
                for small in 0..=0x7f_u16 {
                    for large in 0..=0x7f_u16 {
                        if small & large != small {
                            continue;
                        }
                        let a = roles(&redraw_plan(ChangeMask::from_bits(small), view, mag));
                        let b = roles(&redraw_plan(ChangeMask::from_bits(large), view, mag));
                        assert!(a.iter().all(|r| b.contains(r)), "{small:#x} -> {large:#x} in {view:?} lost frames");
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_mask_redraws_only_live_panels() {
        assert!(redraw_plan(ChangeMask::NONE, View::GpsPanel, true).is_empty());
        assert!(redraw_plan(ChangeMask::NONE, View::FileChooser, true).is_empty());
        assert_eq!(roles(&redraw_plan(ChangeMask::NONE, View::Map, true)), vec![Role::Map], "map redraws every pass");
        assert_eq!(roles(&redraw_plan(ChangeMask::NONE, View::SensorProfile, true)), vec![Role::Profile]);
    }

    #[test]
    fn test_gps_routing_follows_mag_display() {
        let with_mag = roles(&redraw_plan(ChangeMask::GPS_UPDATE, View::FileChooser, true));
        assert!(!with_mag.contains(&Role::GpsLatitude));
        let without_mag = roles(&redraw_plan(ChangeMask::GPS_UPDATE, View::FileChooser, false));
        assert!(without_mag.contains(&Role::GpsLatitude) && without_mag.contains(&Role::GpsLongitude));
        let mag = roles(&redraw_plan(ChangeMask::MAG_UPDATE, View::FileChooser, false));
        assert!(mag.is_empty(), "magnetic readouts hidden");
    }

    #[test]
    fn test_border_policy() {
        let plan = redraw_plan(ChangeMask::FLIGHT_UPDATE | ChangeMask::GPS_UPDATE, View::GpsPanel, true);
        for (role, suppress) in plan {
            let painted = matches!(role, Role::Datum | Role::GpsPanel);
            assert_eq!(suppress, !painted, "{role:?}");
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    #[test]
    fn test_small_surface_is_rejected() {
        let config = GuidanceConfig::default();
        let course = ScriptedCourse::default();
        let snapshots = Snapshots::default();
        let result =
            GuidanceDisplay::init_display(HeadlessDisplay::new(), Size::new(320, 240), &config, snapshots.sources(&course));
        assert!(matches!(result, Err(DisplayError::SurfaceTooSmall { width: 320, height: 240 })));
    }

    #[test]
    fn test_tall_surface_is_rejected() {
        let config = GuidanceConfig::default();
        let course = ScriptedCourse::default();
        let snapshots = Snapshots::default();
        let result =
            GuidanceDisplay::init_display(HeadlessDisplay::new(), Size::new(480, 2000), &config, snapshots.sources(&course));
        assert!(matches!(result, Err(DisplayError::SurfaceTooSmall { width: 480, height: 2000 })));
    }

    #[test]
    fn test_one_flip_per_update() {
        let config = config_with_maps("flip", &[]);
        let course = ScriptedCourse::default();
        let snapshots = Snapshots::default();
        let mut gd = init(&config, &course, &snapshots);
        assert_eq!(gd.display().flips(), 1, "initial draw is shown");
        let stats = gd.run_update(ChangeMask::ALL, snapshots.sources(&course));
        assert!(stats.frames > 1);
        assert_eq!(gd.display().flips(), 2, "many frames, one flip");
        gd.run_update(ChangeMask::NONE, snapshots.sources(&course));
        assert_eq!(gd.display().flips(), 3, "flip even when nothing changed");
        let display = gd.teardown_display();
        assert_eq!(display.flips(), 3);
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    #[test]
    fn test_enter_then_exit_quits() {
        let config = config_with_maps("exit", &[]);
        let mut course = ScriptedCourse::default();
        let snapshots = Snapshots::default();
        let mut gd = init(&config, &course, &snapshots);
        assert_eq!(gd.view(), View::GpsPanel);

        assert_eq!(gd.handle_input(Key::Enter, &mut course), ChangeMask::MAP_UPDATE);
        assert_eq!(gd.view(), View::FileChooser);

        // Only the exit entry is listed.
        let mask = gd.handle_input(Key::Enter, &mut course);
        assert!(mask.contains(ChangeMask::QUIT), "choosing exit quits");
        assert!(course.loaded.is_empty());
    }

    #[test]
    fn test_failed_load_quits() {
        let config = config_with_maps("fail", &["north.pgn"]);
        let mut course = ScriptedCourse { fail_load: true, ..ScriptedCourse::default() };
        let snapshots = Snapshots::default();
        let mut gd = init(&config, &course, &snapshots);
        gd.handle_input(Key::Enter, &mut course);
        assert_eq!(gd.handle_input(Key::Enter, &mut course), ChangeMask::QUIT);
        assert_eq!(gd.view(), View::FileChooser, "map never opened");
    }

    #[test]
    fn test_load_and_unload() {
        let config = config_with_maps("load", &["north.pgn", "south.pgn"]);
        let mut course = ScriptedCourse::default();
        let snapshots = Snapshots::default();
        let mut gd = init(&config, &course, &snapshots);
        let course_changed = ChangeMask::MAP_UPDATE | ChangeMask::COURSE_UPDATE | ChangeMask::TARGET_UPDATE;

        gd.handle_input(Key::Enter, &mut course);
        assert_eq!(gd.handle_input(Key::Down, &mut course), ChangeMask::MAP_UPDATE);
        assert_eq!(gd.handle_input(Key::Enter, &mut course), course_changed);
        assert_eq!(gd.view(), View::Map);
        assert_eq!(course.loaded, vec![config.map_directory.join("south.pgn")]);

        assert_eq!(gd.handle_input(Key::Escape, &mut course), course_changed);
        assert_eq!(gd.view(), View::FileChooser);
        assert_eq!(course.unloads, 1);
    }

    #[test]
    fn test_selection_at_top_raises_nothing() {
        let config = config_with_maps("top", &["north.pgn"]);
        let mut course = ScriptedCourse::default();
        let snapshots = Snapshots::default();
        let mut gd = init(&config, &course, &snapshots);
        gd.handle_input(Key::Enter, &mut course);
        assert_eq!(gd.handle_input(Key::Up, &mut course), ChangeMask::NONE);
    }

    #[test]
    fn test_profile_toggle_and_mag_display() {
        let config = config_with_maps("toggle", &[]);
        let mut course = ScriptedCourse::default();
        let snapshots = Snapshots::default();
        let mut gd = init(&config, &course, &snapshots);

        assert_eq!(gd.handle_input(Key::char('v'), &mut course), ChangeMask::MAG_UPDATE);
        assert_eq!(gd.view(), View::SensorProfile);
        assert_eq!(gd.handle_input(Key::char('z'), &mut course), ChangeMask::NONE, "profile zoom raises nothing");
        assert_eq!(gd.handle_input(Key::char('v'), &mut course), ChangeMask::MAP_UPDATE);
        assert_eq!(gd.view(), View::FileChooser);

        assert!(gd.mag_display());
        assert_eq!(gd.handle_input(Key::char('r'), &mut course), ChangeMask::MAG_UPDATE | ChangeMask::GPS_UPDATE);
        assert!(!gd.mag_display());
        assert_eq!(gd.handle_input(Key::char('q'), &mut course), ChangeMask::QUIT);
    }

    #[test]
    fn test_mag_display_toggle_matches_fresh_display() {
        let course = ScriptedCourse::default();
        let mut snapshots = Snapshots::default();
        snapshots.gps.latitude = 4807.03812;
        snapshots.gps.lat_hemisphere = 'N';
        snapshots.gps.longitude = 1131.00047;
        snapshots.gps.lon_hemisphere = 'E';
        snapshots.mag.field = 48123.456;
        snapshots.ral.height = 231.5;

        for start in [true, false] {
            let toggled_config = GuidanceConfig { mag_display: start, ..config_with_maps("mag-toggle", &[]) };
            let mut toggled = init(&toggled_config, &course, &snapshots);
            let mut input = ScriptedCourse::default();
            let mask = toggled.handle_input(Key::char('r'), &mut input);
            toggled.run_update(mask, snapshots.sources(&course));
            assert_eq!(toggled.mag_display(), !start);

            let fresh_config = GuidanceConfig { mag_display: !start, ..toggled_config.clone() };
            let fresh = init(&fresh_config, &course, &snapshots);

            // Rows 5 and 6 of the readout column.
            let differing = (520..640)
                .flat_map(|x| (375..477).map(move |y| Point::new(x, y)))
                .filter(|&p| toggled.surface().get_pixel(p) != fresh.surface().get_pixel(p))
                .count();
            assert_eq!(differing, 0, "readouts after toggling from mag_display={start} differ from a fresh display");
        }
    }

    #[test]
    fn test_target_update_rehighlights_by_identity() {
        let config = config_with_maps("highlight", &["north.pgn"]);
        let mut course = ScriptedCourse { lines: three_lines(), ..ScriptedCourse::default() };
        let snapshots = Snapshots::default();
        let mut gd = init(&config, &course, &snapshots);
        gd.handle_input(Key::Enter, &mut course);
        gd.handle_input(Key::Enter, &mut course);
        assert_eq!(gd.view(), View::Map);
        // Fixed 1.2 px/m: lines 60, 120 and 180 px above the aircraft at y = 351.
        gd.handle_input(Key::char('z'), &mut course);

        gd.run_update(ChangeMask::MAP_UPDATE, snapshots.sources(&course));
        for y in [291, 231, 171] {
            assert_eq!(gd.surface().get_pixel(Point::new(300, y)), LINE_NEUTRAL, "row {y} neutral without a target");
        }

        course.current = Some(1);
        gd.run_update(ChangeMask::TARGET_UPDATE, snapshots.sources(&course));
        assert_eq!(gd.surface().get_pixel(Point::new(300, 231)), TARGET_CURRENT, "current line highlighted");
        assert_eq!(gd.surface().get_pixel(Point::new(300, 291)), LINE_NEUTRAL, "others unchanged");
        assert_eq!(gd.surface().get_pixel(Point::new(300, 171)), LINE_NEUTRAL, "others unchanged");
    }
}
