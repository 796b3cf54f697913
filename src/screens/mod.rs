//! Main-panel screens.
//!
//! Exactly one of these (or the navigation map) occupies the main panel at a
//! time, selected by [`View`](crate::views::View):
//!
//! 1. **GPS Panel** ([`gps_panel`]): receiver output while the GPS comes up
//! 2. **File Chooser** ([`file_chooser`]): pick the course file to fly
//! 3. **Navigation Map** ([`crate::map`]): the flight itself
//! 4. **Sensor Profile** ([`profile`]): magnetometer trace, toggled with `V`
//!
//! All of them exist for the whole run; switching views only changes which
//! one is drawn.

pub mod file_chooser;
pub mod gps_panel;
pub mod profile;

pub use file_chooser::FileChooser;
pub use gps_panel::GpsPanel;
pub use profile::SensorProfile;
