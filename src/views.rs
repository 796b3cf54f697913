//! Main panel selection.
//!
//! # Views
//!
//! - [`View::GpsPanel`]: receiver log shown at start-up
//! - [`View::FileChooser`]: course file selection
//! - [`View::Map`]: navigation map
//! - [`View::SensorProfile`]: magnetometer trace
//!
//! Transitions are driven by keys in
//! [`GuidanceDisplay::handle_input`](crate::composition::GuidanceDisplay::handle_input).

/// Which screen occupies the main panel.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum View {
    #[default]
    GpsPanel,
    FileChooser,
    Map,
    SensorProfile,
}

impl View {
    /// `V` key: profile goes back to the chooser, anything else opens the profile.
    #[inline]
    pub const fn toggle_profile(self) -> Self {
        match self {
            Self::SensorProfile => Self::FileChooser,
            _ => Self::SensorProfile,
        }
    }
}
