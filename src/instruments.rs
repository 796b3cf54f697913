//! Instrument set: construction, refresh bindings and gauge color rules.
//!
//! # Layout
//!
//! ```text
//! ┌─────┬──────────────── tracking gauge ────────────────┬──────────┐
//! │clock│                                                 │ compass  │
//! ├─────┼─────────────────────────────────────────────────┼──────────┤
//! │  a  │                                                 │ heading  │
//! │  l  │                                                 │ GS       │
//! │  t  │                main panel                       │ DTG      │
//! │  i  │   (GPS panel / chooser / map / profile)         │ fix/sat  │
//! │  t  │                                                 │ GPS alt  │
//! │  u  │                                                 │ lat│mag  │
//! │  d  │                                                 │ lon│ral  │
//! ├─────┼────────────────────────┬────────────────────────┤          │
//! │datum│  Curr Course:          │  Next Course:          │          │
//! └─────┴────────────────────────┴────────────────────────┴──────────┘
//! ```
//!
//! Frames are built in [`Role`] order and stored in a `Vec` indexed by role.
//! If any frame fails to build, the frames built so far are dropped with the
//! vector, which destroys them.
//!
//! # Refresh Sources
//!
//! | Role | Interest | Source |
//! |------|----------|--------|
//! | clock, GPS readouts, GPS panel | `GPS_UPDATE` | GPS |
//! | altitude, compass, heading, GS, datum | `FLIGHT_UPDATE` | flight |
//! | tracking, DTG | `COURSE_UPDATE` | course |
//! | current/next target | `TARGET_UPDATE` | course |
//! | magnetic field, profile | `MAG_UPDATE` | magnetometer |
//! | radar altitude | `RAL_UPDATE` | radar altimeter |

use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;

use crate::changes::ChangeMask;
use crate::colors::{
    BLACK, DATUM_AGL, DATUM_MSL, FRAME_GREEN, TAPE_BAND, TAPE_DIM, TAPE_ON_TARGET, TAPE_TICK, TAPE_WARNING,
    TARGET_BLOCKED, WHITE,
};
use crate::config::{GuidanceConfig, Layout};
use crate::error::{DisplayError, DisplayResult};
use crate::frame::{Frame, FrameGeometry, Instrument, Widget};
use crate::map::NavigationMap;
use crate::screens::gps_panel::SENTENCE_COLOR;
use crate::screens::{FileChooser, GpsPanel, SensorProfile};
use crate::sources::{Bound, LegKind, Source, Target};
use crate::styles::VALUE_FONT;
use crate::widgets::data_box::PLACEHOLDER;
use crate::widgets::{Clock, Compass, DataBox, Label, PointerEdge, RuleContext, ScaleBar, Split};

// =============================================================================
// Roles
// =============================================================================

/// Every frame on screen, in construction order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Clock,
    AltitudeBar,
    TrackingBar,
    Compass,
    GpsPanel,
    FileChooser,
    Map,
    Profile,
    CurrTarget,
    NextTarget,
    Heading,
    GroundSpeed,
    DistanceToGo,
    GpsFix,
    GpsAltitude,
    GpsLatitude,
    MagField,
    GpsLongitude,
    RadarAltitude,
    Datum,
}

impl Role {
    pub const COUNT: usize = 20;

    pub const ALL: [Role; Self::COUNT] = [
        Self::Clock,
        Self::AltitudeBar,
        Self::TrackingBar,
        Self::Compass,
        Self::GpsPanel,
        Self::FileChooser,
        Self::Map,
        Self::Profile,
        Self::CurrTarget,
        Self::NextTarget,
        Self::Heading,
        Self::GroundSpeed,
        Self::DistanceToGo,
        Self::GpsFix,
        Self::GpsAltitude,
        Self::GpsLatitude,
        Self::MagField,
        Self::GpsLongitude,
        Self::RadarAltitude,
        Self::Datum,
    ];

    #[inline]
    pub const fn index(self) -> usize { self as usize }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::AltitudeBar => "altitude bar",
            Self::TrackingBar => "tracking bar",
            Self::Compass => "compass",
            Self::GpsPanel => "gps panel",
            Self::FileChooser => "file chooser",
            Self::Map => "map",
            Self::Profile => "profile",
            Self::CurrTarget => "current target",
            Self::NextTarget => "next target",
            Self::Heading => "heading",
            Self::GroundSpeed => "ground speed",
            Self::DistanceToGo => "distance to go",
            Self::GpsFix => "gps fix",
            Self::GpsAltitude => "gps altitude",
            Self::GpsLatitude => "gps latitude",
            Self::MagField => "mag field",
            Self::GpsLongitude => "gps longitude",
            Self::RadarAltitude => "radar altitude",
            Self::Datum => "datum",
        }
    }
}

// =============================================================================
// Gauge Color Rules
// =============================================================================

/// Tape value at scan position `pos`: one unit per 5 px from the midpoint.
#[inline]
fn tape_value(offset: i32, value: f64) -> i32 { (f64::from(offset / 5) + value) as i32 }

/// Altitude above ground: band above/below the survey height, bright near
/// it, red at or below the warning height, ticks every 10 m.
pub fn agl_rule(pos: i32, mid: i32, ctx: &RuleContext) -> Rgb565 {
    let scaled = tape_value(mid - pos, ctx.value);
    let s = f64::from(scaled);
    let mut color = TAPE_DIM;
    if (s > ctx.reference && pos > mid) || (s <= ctx.reference && pos < mid) {
        color = TAPE_BAND;
    }
    if (s - ctx.reference).abs() <= 10.0 {
        color = TAPE_ON_TARGET;
    }
    if scaled >= 0 && s <= ctx.warning {
        color = TAPE_WARNING;
    }
    if scaled % 10 == 0 {
        color = TAPE_TICK;
    }
    color
}

/// Altitude above sea level: band around the HAC height, no warning band.
pub fn msl_rule(pos: i32, mid: i32, ctx: &RuleContext) -> Rgb565 {
    let scaled = tape_value(mid - pos, ctx.value);
    let s = f64::from(scaled);
    let mut color = TAPE_DIM;
    if (s > ctx.reference && pos > mid) || (s <= ctx.reference && pos < mid) {
        color = TAPE_BAND;
    }
    if (s - ctx.reference).abs() <= 10.0 {
        color = TAPE_ON_TARGET;
    }
    if scaled % 10 == 0 {
        color = TAPE_TICK;
    }
    color
}

/// Tracking: tape centred on 360, scrolled by the tracking correction.
pub fn tracking_rule(pos: i32, mid: i32, ctx: &RuleContext) -> Rgb565 {
    let scaled = tape_value(pos - mid, -ctx.value + 360.0);
    let mut color = TAPE_DIM;
    if (scaled > 360 && pos < mid) || (scaled <= 360 && pos > mid) {
        color = TAPE_BAND;
    }
    if (scaled - 360).abs() <= 10 {
        color = TAPE_ON_TARGET;
    }
    if scaled % 10 == 0 {
        color = TAPE_TICK;
    }
    color
}

// =============================================================================
// Formatting
// =============================================================================

/// Readout text and frame color for a course target.
pub fn describe_target(target: Target<'_>) -> (String<16>, Rgb565) {
    let mut text = String::new();
    let mut color = FRAME_GREEN;
    let written = match target {
        Target::Leg(leg) => {
            if leg.blocked {
                color = TARGET_BLOCKED;
            }
            let prefix = match leg.kind {
                LegKind::Flight => "FL",
                LegKind::Tie => "TL",
            };
            core::fmt::write(&mut text, format_args!("{prefix} {}", leg.id))
        }
        Target::Waypoint(wp) => text.push_str(&wp.caption).map_err(|_| core::fmt::Error),
        Target::None => {
            color = DATUM_MSL;
            text.push_str("N/A").map_err(|_| core::fmt::Error)
        }
    };
    if written.is_err() {
        text.clear();
    }
    (text, color)
}

/// Tracking value shown on the gauge: low-passed while a map is loaded.
#[inline]
pub fn filter_tracking(previous: f64, tracking: f64, map_loaded: bool) -> f64 {
    if map_loaded { 0.8 * previous + 0.2 * tracking } else { 0.0 }
}

// =============================================================================
// Construction
// =============================================================================

/// Build-time inputs.
pub struct Setup<'a> {
    pub layout: Layout,
    pub config: &'a GuidanceConfig,
}

impl Setup<'_> {
    /// Wrap `widget`, rejecting frames that leave the surface.
    fn place<W: Widget>(&self, role: Role, geometry: FrameGeometry, widget: W) -> DisplayResult<Instrument<W>> {
        let inside = geometry.x >= 0
            && geometry.y >= 0
            && geometry.right() <= self.layout.width as i32
            && geometry.bottom() <= self.layout.height as i32;
        if !inside {
            return Err(DisplayError::FrameOutOfBounds { role: role.name() });
        }
        Instrument::new(role.name(), geometry, widget)
    }

    fn main_panel(&self) -> FrameGeometry {
        let l = &self.layout;
        FrameGeometry::new(l.bar as i32, l.bar as i32, l.panel_width(), l.panel_height(), BLACK)
    }

    /// One of the seven right-column readouts.
    fn readout(&self, row: u32, caption: &str) -> DisplayResult<(FrameGeometry, DataBox)> {
        let l = &self.layout;
        let geometry = FrameGeometry::new(
            (l.width - l.column) as i32,
            (l.column + row * l.row) as i32,
            l.column,
            l.row,
            FRAME_GREEN,
        );
        let mut dbox = DataBox::new(caption, Split::Vertical(0.5))?;
        dbox.set_text_color(WHITE);
        Ok((geometry, dbox))
    }

    fn target(&self, slot: u32, caption: &str) -> DisplayResult<(FrameGeometry, DataBox)> {
        let l = &self.layout;
        let geometry = FrameGeometry::new(
            (l.bar + slot * l.target_width) as i32,
            l.footer_top() as i32,
            l.target_width,
            l.footer,
            BLACK,
        );
        let mut dbox = DataBox::new(caption, Split::Horizontal(0.4))?;
        dbox.set_text_color(WHITE);
        Ok((geometry, dbox))
    }

    fn scale_bar(edge: PointerEdge) -> ScaleBar {
        let mut bar = ScaleBar::new(edge);
        bar.set_pointer_color(FRAME_GREEN);
        bar.set_text_color(WHITE);
        bar
    }

    fn build_role(&self, role: Role) -> DisplayResult<Box<dyn Frame>> {
        let l = &self.layout;
        let cfg = self.config;
        let frame: Box<dyn Frame> = match role {
            Role::Clock => {
                let geometry = FrameGeometry::new(0, 0, l.bar, l.bar, FRAME_GREEN);
                let mut clock = Clock::new();
                clock.set_background(BLACK);
                Box::new(self.place(role, geometry, clock)?.with_refresh(
                    ChangeMask::GPS_UPDATE,
                    Source::Gps,
                    |clock: &mut Clock, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Gps(gps) = bound {
                            clock.set_utc(gps.utc_time);
                        }
                    },
                ))
            }
            Role::AltitudeBar => {
                let geometry = FrameGeometry::new(0, l.bar as i32, l.bar, l.height - l.footer - l.bar, BLACK);
                let survey = cfg.survey_height_agl;
                let warning = cfg.warning_height_agl;
                let hac = cfg.hac_height_msl;
                Box::new(self.place(role, geometry, Self::scale_bar(PointerEdge::Left))?.with_refresh(
                    ChangeMask::FLIGHT_UPDATE,
                    Source::Flight,
                    move |bar: &mut ScaleBar, _: &mut FrameGeometry, bound: Bound<'_>| {
                        let Bound::Flight(flt) = bound else { return };
                        bar.set_text_fmt(format_args!("{:.0}", flt.altitude));
                        if flt.agl {
                            bar.set_pointer_color(DATUM_AGL);
                            let ctx = RuleContext { value: flt.altitude, reference: survey, warning };
                            bar.set_color_rule(agl_rule, ctx);
                        } else {
                            bar.set_pointer_color(DATUM_MSL);
                            let ctx = RuleContext { value: flt.altitude, reference: hac, warning: 0.0 };
                            bar.set_color_rule(msl_rule, ctx);
                        }
                    },
                ))
            }
            Role::TrackingBar => {
                let geometry = FrameGeometry::new(l.bar as i32, 0, l.width - l.column - l.bar, l.bar, BLACK);
                let mut bar = Self::scale_bar(PointerEdge::Top);
                bar.set_color_rule(tracking_rule, RuleContext { reference: 360.0, ..RuleContext::default() });
                let mut tracking = 0.0;
                Box::new(self.place(role, geometry, bar)?.with_refresh(
                    ChangeMask::COURSE_UPDATE,
                    Source::Course,
                    move |bar: &mut ScaleBar, _: &mut FrameGeometry, bound: Bound<'_>| {
                        let Bound::Course(course) = bound else { return };
                        tracking = filter_tracking(tracking, course.tracking(), course.map_loaded());
                        bar.set_text_fmt(format_args!("{:+.0}", tracking));
                        bar.set_color_rule(tracking_rule, RuleContext { value: tracking, reference: 360.0, warning: 0.0 });
                    },
                ))
            }
            Role::Compass => {
                let geometry = FrameGeometry::new((l.width - l.column) as i32, 0, l.column, l.column, FRAME_GREEN);
                let mut compass = Compass::new();
                compass.set_background(BLACK);
                Box::new(self.place(role, geometry, compass)?.with_refresh(
                    ChangeMask::FLIGHT_UPDATE,
                    Source::Flight,
                    |compass: &mut Compass, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Flight(flt) = bound {
                            compass.set_orientation(flt.heading_sin, flt.heading_cos);
                        }
                    },
                ))
            }
            Role::GpsPanel => {
                let geometry = self.main_panel();
                Box::new(self.place(role, geometry, GpsPanel::new(&geometry))?.with_refresh(
                    ChangeMask::GPS_UPDATE,
                    Source::Gps,
                    |panel: &mut GpsPanel, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Gps(gps) = bound
                            && !gps.sentence.is_empty()
                        {
                            panel.add_entry(&gps.sentence, SENTENCE_COLOR);
                            if let Some(command) = panel.advance_setup() {
                                log::debug!("receiver setup: {command}");
                            }
                        }
                    },
                ))
            }
            Role::FileChooser => {
                let chooser = FileChooser::new(&cfg.map_directory, &cfg.map_extension);
                Box::new(self.place(role, self.main_panel(), chooser)?)
            }
            Role::Map => {
                let geometry = self.main_panel();
                Box::new(self.place(role, geometry, NavigationMap::new(&geometry, cfg.turn_radius))?)
            }
            Role::Profile => {
                let geometry = self.main_panel();
                Box::new(self.place(role, geometry, SensorProfile::new(&geometry))?.with_refresh(
                    ChangeMask::MAG_UPDATE,
                    Source::Mag,
                    |profile: &mut SensorProfile, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Mag(mag) = bound {
                            // nT to pT
                            profile.add_sample(mag.field * 1000.0);
                        }
                    },
                ))
            }
            Role::CurrTarget | Role::NextTarget => {
                let current = role == Role::CurrTarget;
                let (slot, caption) = if current { (0, "Curr Course:") } else { (1, "Next Course:") };
                let (geometry, dbox) = self.target(slot, caption)?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::TARGET_UPDATE,
                    Source::Course,
                    move |dbox: &mut DataBox, frame: &mut FrameGeometry, bound: Bound<'_>| {
                        let Bound::Course(course) = bound else { return };
                        let target = if current { course.current_target() } else { course.next_target() };
                        let (text, color) = describe_target(target);
                        frame.color = color;
                        dbox.set_text(&text);
                    },
                ))
            }
            Role::Heading => {
                let (geometry, dbox) = self.readout(0, "Heading:")?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::FLIGHT_UPDATE,
                    Source::Flight,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Flight(flt) = bound {
                            dbox.set_text_fmt(format_args!("{:<4.0}", flt.heading));
                        }
                    },
                ))
            }
            Role::GroundSpeed => {
                let (geometry, dbox) = self.readout(1, "GS[km/h]:")?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::FLIGHT_UPDATE,
                    Source::Flight,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        let Bound::Flight(flt) = bound else { return };
                        let kmh = flt.speed * 3.6;
                        if kmh > 9999.0 {
                            dbox.set_text(PLACEHOLDER);
                        } else {
                            dbox.set_text_fmt(format_args!("{kmh:.2}"));
                        }
                    },
                ))
            }
            Role::DistanceToGo => {
                let (geometry, dbox) = self.readout(2, "DTG[km]:")?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::COURSE_UPDATE,
                    Source::Course,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        let Bound::Course(course) = bound else { return };
                        let km = course.distance_to_go() / 1000.0;
                        if km > 9999.0 {
                            dbox.set_text(PLACEHOLDER);
                        } else {
                            dbox.set_text_fmt(format_args!("{km:.3}"));
                        }
                    },
                ))
            }
            Role::GpsFix => {
                let (geometry, dbox) = self.readout(3, "GPS Fix/Sat:")?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::GPS_UPDATE,
                    Source::Gps,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Gps(gps) = bound {
                            dbox.set_text_fmt(format_args!("{:02}/{:02}", gps.fix_quality, gps.satellites));
                        }
                    },
                ))
            }
            Role::GpsAltitude => {
                let (geometry, dbox) = self.readout(4, "GPS Altitude:")?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::GPS_UPDATE,
                    Source::Gps,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Gps(gps) = bound {
                            let unit = gps.altitude_unit.to_ascii_lowercase();
                            dbox.set_text_fmt(format_args!("{:.2}{unit}", gps.altitude));
                        }
                    },
                ))
            }
            Role::GpsLatitude => {
                let (geometry, dbox) = self.readout(5, "GPS Latitude:")?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::GPS_UPDATE,
                    Source::Gps,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Gps(gps) = bound {
                            dbox.set_text_fmt(format_args!("{:.5}{}", gps.latitude, gps.lat_hemisphere));
                        }
                    },
                ))
            }
            Role::MagField => {
                let (geometry, dbox) = self.readout(5, "MAG Field:")?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::MAG_UPDATE,
                    Source::Mag,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Mag(mag) = bound {
                            dbox.set_text_fmt(format_args!("{:.3}", mag.field));
                        }
                    },
                ))
            }
            Role::GpsLongitude => {
                let (geometry, dbox) = self.readout(6, "GPS Longitude:")?;
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::GPS_UPDATE,
                    Source::Gps,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Gps(gps) = bound {
                            dbox.set_text_fmt(format_args!("{:.5}{}", gps.longitude, gps.lon_hemisphere));
                        }
                    },
                ))
            }
            Role::RadarAltitude => {
                let (geometry, dbox) = self.readout(6, "Radar Alt[m]:")?;
                // Drawn on MAG too when it takes over the GPS longitude slot.
                Box::new(self.place(role, geometry, dbox)?.with_refresh(
                    ChangeMask::RAL_UPDATE | ChangeMask::MAG_UPDATE,
                    Source::Ral,
                    |dbox: &mut DataBox, _: &mut FrameGeometry, bound: Bound<'_>| {
                        if let Bound::Ral(ral) = bound {
                            dbox.set_text_fmt(format_args!("{:.1}", ral.height));
                        }
                    },
                ))
            }
            Role::Datum => {
                let geometry = FrameGeometry::new(0, l.footer_top() as i32, l.bar, l.footer, FRAME_GREEN);
                let mut label = Label::new(VALUE_FONT, 5);
                label.set_color(WHITE);
                Box::new(self.place(role, geometry, label)?.with_refresh(
                    ChangeMask::FLIGHT_UPDATE,
                    Source::Flight,
                    |label: &mut Label, frame: &mut FrameGeometry, bound: Bound<'_>| {
                        let Bound::Flight(flt) = bound else { return };
                        if flt.agl {
                            frame.color = DATUM_AGL;
                            label.set_text("AGL");
                        } else {
                            frame.color = DATUM_MSL;
                            label.set_text("MSL");
                        }
                    },
                ))
            }
        };
        Ok(frame)
    }

    /// Build every frame, indexed by [`Role::index`].
    pub fn build(&self) -> DisplayResult<Vec<Box<dyn Frame>>> { build_frames(&Role::ALL, |role| self.build_role(role)) }
}

/// Build one frame per role in order.
///
/// Stops at the first failure; frames built before it are dropped, which
/// destroys them.
fn build_frames<F>(roles: &[Role], mut make: F) -> DisplayResult<Vec<Box<dyn Frame>>>
where
    F: FnMut(Role) -> DisplayResult<Box<dyn Frame>>,
{
    let mut frames = Vec::with_capacity(roles.len());
    for &role in roles {
        match make(role) {
            Ok(frame) => frames.push(frame),
            Err(err) => {
                log::warn!("building {} failed, releasing {} frames: {err}", role.name(), frames.len());
                return Err(err);
            }
        }
    }
    log::debug!("built {} frames", frames.len());
    Ok(frames)
}
