//! Instrument widgets.
//!
//! - [`scale_bar`]: moving-tape gauge with a converging pointer
//! - [`data_box`]: captioned numeric readout
//! - [`clock`]: UTC clock disc
//! - [`compass`]: heading disc with needle
//! - [`label`]: static text on the frame color
//! - [`icons`]: palette bitmaps for waypoints and the aircraft
//! - [`primitives`]: bevel boxes, thick lines, grids and text helpers
//!
//! Each widget implements [`Widget`](crate::frame::Widget) and is placed on
//! screen by wrapping it in an [`Instrument`](crate::frame::Instrument).
//! Widgets keep their own presentation state (text, colors) in fixed
//! `heapless` buffers; the owner updates that state from refresh callbacks.

pub mod clock;
pub mod compass;
pub mod data_box;
pub mod icons;
pub mod label;
pub mod primitives;
pub mod scale_bar;

pub use clock::Clock;
pub use compass::Compass;
pub use data_box::{DataBox, Split};
pub use icons::Icon;
pub use label::Label;
pub use scale_bar::{ColorRule, PointerEdge, RuleContext, ScaleBar};
