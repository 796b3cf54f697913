//! 20x20 palette icons for waypoints and the aircraft.
//!
//! Icons are stored as rows of palette characters so they can be edited by
//! eye. `.` is transparent; every other character is an opaque palette entry
//! (see [`palette`]). Plotting clips pixel by pixel against a boundary, so an
//! icon near the viewport edge is cut off instead of spilling over other
//! instruments.

use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::colors::shade;
use crate::display::Surface;
use crate::geometry::{Boundary, Coord, point_in_boundary};
use crate::sources::WaypointKind;

/// Icon edge length in pixels.
pub const ICON_SIZE: usize = 20;

type Bitmap = [&'static str; ICON_SIZE];

/// Map a palette character to its color. `None` is transparent.
pub const fn palette(c: u8) -> Option<Rgb565> {
    match c {
        b'n' => Some(shade(15, 8, 0)),   // brown
        b'r' => Some(shade(15, 0, 0)),   // red
        b'y' => Some(shade(31, 31, 0)),  // yellow
        b'b' => Some(shade(0, 0, 31)),   // blue
        b'k' => Some(shade(0, 0, 0)),    // black
        b'g' => Some(shade(0, 31, 0)),   // light green
        b'p' => Some(shade(31, 0, 0)),   // light red
        b'w' => Some(shade(31, 31, 31)), // white
        b'c' => Some(shade(10, 21, 21)), // cyan
        _ => None,
    }
}

/// Available icons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Aircraft,
    Flag,
    Home,
    Camp,
    Barrel,
    PowerLine,
}

impl From<WaypointKind> for Icon {
    fn from(kind: WaypointKind) -> Self {
        match kind {
            WaypointKind::Flag => Self::Flag,
            WaypointKind::Home => Self::Home,
            WaypointKind::Camp => Self::Camp,
            WaypointKind::Barrel => Self::Barrel,
            WaypointKind::PowerLine => Self::PowerLine,
        }
    }
}

impl Icon {
    const fn bitmap(self) -> &'static Bitmap {
        match self {
            Self::Aircraft => &AIRCRAFT,
            Self::Flag => &FLAG,
            Self::Home => &HOME,
            Self::Camp => &CAMP,
            Self::Barrel => &BARREL,
            Self::PowerLine => &POWER_LINE,
        }
    }

    /// Opaque pixels as (column, row, color).
    pub fn pixels(self) -> impl Iterator<Item = (i32, i32, Rgb565)> {
        self.bitmap().iter().enumerate().flat_map(|(row, line)| {
            line.bytes()
                .enumerate()
                .filter_map(move |(col, c)| palette(c).map(|color| (col as i32, row as i32, color)))
        })
    }

    /// Draw the icon centered on `center`, skipping pixels outside `clip`.
    pub fn plot(self, surface: &mut Surface, center: Coord, clip: &Boundary) {
        let origin = center.to_point() - Point::new(ICON_SIZE as i32 / 2, ICON_SIZE as i32 / 2);
        let visible = self.pixels().filter_map(|(col, row, color)| {
            let p = origin + Point::new(col, row);
            point_in_boundary(clip, Coord::new(f64::from(p.x), f64::from(p.y))).then_some(Pixel(p, color))
        });
        surface.draw_iter(visible).ok();
    }
}

#[rustfmt::skip]
const AIRCRAFT: Bitmap = [
    ".........ww.........",
    "........wwww........",
    "........wwww........",
    "........wwww........",
    "........wwww........",
    "........wwww........",
    ".......wwwwww.......",
    "......wwwwwwww......",
    "....wwwwwwwwwwww....",
    "..wwwwwwwwwwwwwwww..",
    "wwwwwwwwwwwwwwwwwwww",
    "wwwwwwwwwwwwwwwwwwww",
    "........wwww........",
    "........wwww........",
    "........wwww........",
    "........wwww........",
    "......wwwwwwww......",
    ".....wwwwwwwwww.....",
    ".....wwwwwwwwww.....",
    "........wwww........",
];

#[rustfmt::skip]
const FLAG: Bitmap = [
    "....n...............",
    "....nrrrrrrr........",
    "....nrrrrrrrrrrr....",
    "....nrrrrrrrrrrrrrr.",
    "....nrrrrrrrrrrrrr..",
    "....nrrrrrrrrrrrr...",
    "....nrrrrrrrrrrrrr..",
    "....nrrrrrrrrrrrrrr.",
    "....nrrrrrrrrrrr....",
    "....nrrrrrrr........",
    "....n...............",
    "....n...............",
    "....n...............",
    "....n...............",
    "....n...............",
    "....n...............",
    "....n...............",
    "...nnn..............",
    "..nnnnn.............",
    ".nnnnnnn............",
];

#[rustfmt::skip]
const HOME: Bitmap = [
    ".........pp.........",
    "........pppp........",
    ".......pppppp.......",
    "......pppppppp......",
    ".....pppppppppp.....",
    "....pppppppppppp....",
    "...pppppppppppppp...",
    "..pppppppppppppppp..",
    ".pppppppppppppppppp.",
    "pppppppppppppppppppp",
    "..wwwwwwwwwwwwwwww..",
    "..wwcccwwwwwwwwwww..",
    "..wwcccwwwwwnnnnww..",
    "..wwcccwwwwwnnnnww..",
    "..wwwwwwwwwwnnnnww..",
    "..wwwwwwwwwwnnnnww..",
    "..wwwwwwwwwwnnnnww..",
    "..wwwwwwwwwwnnnnww..",
    "..wwwwwwwwwwnnnnww..",
    "..wwwwwwwwwwnnnnww..",
];

#[rustfmt::skip]
const CAMP: Bitmap = [
    "....................",
    ".........g..........",
    "........ggg.........",
    ".......ggggg........",
    "......ggggggg.......",
    ".....ggggkgggg......",
    ".....gggkkkggg......",
    "....gggkkkkkggg.....",
    "....ggkkkkkkkgg.....",
    "...gggkkkkkkkggg....",
    "...ggkkkkkkkkkgg....",
    "..gggkkkkkkkkkggg...",
    "..ggkkkkkkkkkkkgg...",
    ".gggkkkkkkkkkkkggg..",
    ".ggkkkkkkkkkkkkkgg..",
    "gggggggggggggggggggg",
    "....................",
    "....yyy...yyy.......",
    "...ypppy.ypppy......",
    "....yyy...yyy.......",
];

#[rustfmt::skip]
const BARREL: Bitmap = [
    ".....nnnnnnnnn......",
    "...nnyyyyyyyyynn....",
    "..nyyyyyyyyyyyyyn...",
    "..nnnyyyyyyyyynnn...",
    "..nyynnnnnnnnnyyn...",
    "..nyyyyyyyyyyyyyn...",
    "..nyyyyyyyyyyyyyn...",
    "..nyyyyyyyyyyyyyn...",
    "..nrryyyyyyyyyrrn...",
    "..nrrrrrrrrrrrrrn...",
    "..nrrrrrrrrrrrrrn...",
    "..nrrrrrrrrrrrrrn...",
    "..nrrrrrrrrrrrrrn...",
    "..nrrrrrrrrrrrrrn...",
    "..nyyrrrrrrrrryyn...",
    "..nyyyyyyyyyyyyyn...",
    "..nyyyyyyyyyyyyyn...",
    "..nyyyyyyyyyyyyyn...",
    "...nnyyyyyyyyynn....",
    ".....nnnnnnnnn......",
];

#[rustfmt::skip]
const POWER_LINE: Bitmap = [
    ".........cc.........",
    "bbbbbbbbbccbbbbbbbbb",
    "b.......cccc.......b",
    "........cccc........",
    ".......cc..cc.......",
    "bbbbbbbccbbccbbbbbbb",
    "b.....cc....cc.....b",
    "......cc....cc......",
    ".....cc.cccc.cc.....",
    ".....cc..cc..cc.....",
    "....cc..cccc..cc....",
    "....cc.cc..cc.cc....",
    "...cc.cc....cc.cc...",
    "...cccc......cccc...",
    "..ccc..........ccc..",
    "..cc............cc..",
    ".cc..............cc.",
    ".cc..............cc.",
    "cc................cc",
    "cc................cc",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::BLACK;

    const ALL: [Icon; 6] = [Icon::Aircraft, Icon::Flag, Icon::Home, Icon::Camp, Icon::Barrel, Icon::PowerLine];

    #[test]
    fn test_bitmaps_are_square() {
        for icon in ALL {
            for (row, line) in icon.bitmap().iter().enumerate() {
                assert_eq!(line.len(), ICON_SIZE, "{icon:?} row {row} has wrong width");
                assert!(line.bytes().all(|c| c == b'.' || palette(c).is_some()), "{icon:?} row {row} has unknown color");
            }
        }
    }

    #[test]
    fn test_plot_centers_icon() {
        let mut display = Surface::new(Size::new(40, 40));
        let clip = Boundary::from_rect(0, 0, 40, 40);
        Icon::Barrel.plot(&mut display, Coord::new(20.0, 20.0), &clip);
        // Barrel row 10 column 5 is red; origin is (10, 10).
        assert_eq!(display.get_pixel(Point::new(15, 20)), shade(15, 0, 0));
        assert_eq!(display.get_pixel(Point::new(10, 10)), BLACK, "transparent corner stays untouched");
    }

    #[test]
    fn test_plot_clips_to_boundary() {
        let mut display = Surface::new(Size::new(40, 40));
        let clip = Boundary::from_rect(0, 0, 40, 20);
        Icon::Aircraft.plot(&mut display, Coord::new(20.0, 20.0), &clip);
        assert_eq!(display.get_pixel(Point::new(20, 10)), shade(31, 31, 31), "top half is visible");
        assert_eq!(display.get_pixel(Point::new(20, 25)), BLACK, "bottom half is clipped");
    }
}
