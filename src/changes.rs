//! Change-reason and event flag sets.
//!
//! A [`ChangeMask`] is built fresh every loop iteration by OR-ing together
//! what input handling and each collaborator report. It carries no history:
//! the composition only asks whether a flag is present this time round.
//!
//! [`EventMask`] is what the event source hands back from a wait.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Set of reasons to redraw.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChangeMask(u16);

impl ChangeMask {
    pub const NONE: Self = Self(0);
    pub const GPS_UPDATE: Self = Self(1 << 0);
    pub const FLIGHT_UPDATE: Self = Self(1 << 1);
    pub const MAG_UPDATE: Self = Self(1 << 2);
    pub const RAL_UPDATE: Self = Self(1 << 3);
    pub const COURSE_UPDATE: Self = Self(1 << 4);
    pub const TARGET_UPDATE: Self = Self(1 << 5);
    pub const MAP_UPDATE: Self = Self(1 << 6);
    pub const QUIT: Self = Self(1 << 7);

    /// Every redraw reason. Used for the initial full draw.
    pub const ALL: Self = Self(0x7f);

    const NAMES: [(Self, &'static str); 8] = [
        (Self::GPS_UPDATE, "GPS"),
        (Self::FLIGHT_UPDATE, "FLIGHT"),
        (Self::MAG_UPDATE, "MAG"),
        (Self::RAL_UPDATE, "RAL"),
        (Self::COURSE_UPDATE, "COURSE"),
        (Self::TARGET_UPDATE, "TARGET"),
        (Self::MAP_UPDATE, "MAP"),
        (Self::QUIT, "QUIT"),
    ];

    #[inline]
    pub const fn bits(self) -> u16 { self.0 }

    /// Mask from raw bits. Unknown bits are dropped.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self { Self(bits & (Self::ALL.0 | Self::QUIT.0)) }

    #[inline]
    pub const fn is_empty(self) -> bool { self.0 == 0 }

    /// True if any flag of `other` is present.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool { self.0 & other.0 != 0 }

    /// True if every flag of `other` is present.
    #[inline]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    #[inline]
    pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }
}

impl BitOr for ChangeMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self { self.union(rhs) }
}

impl BitOrAssign for ChangeMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) { self.0 |= rhs.0; }
}

impl fmt::Debug for ChangeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// What woke the loop up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventMask {
    pub key_pressed: bool,
    pub gps_ready: bool,
    pub mag_ready: bool,
    pub timeout: bool,
}

impl EventMask {
    /// Nothing arrived before the timeout.
    pub const TIMEOUT: Self = Self { key_pressed: false, gps_ready: false, mag_ready: false, timeout: true };
}
