//! Error types.
//!
//! Construction of the display is the only fallible part of the engine;
//! drawing never fails. Course loading belongs to the course collaborator but
//! its error type lives here so the input handler can report it.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons the display composition cannot be built.
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("surface {width}x{height} is smaller than the instrument layout")]
    SurfaceTooSmall { width: u32, height: u32 },

    #[error("{role} has an empty frame")]
    EmptyFrame { role: &'static str },

    #[error("{role} does not fit on the surface")]
    FrameOutOfBounds { role: &'static str },

    #[error("caption {caption:?} does not fit the readout")]
    CaptionTooLong { caption: String },
}

pub type DisplayResult<T> = Result<T, DisplayError>;

/// Reasons a course cannot be loaded.
#[derive(Error, Debug)]
pub enum CourseError {
    #[error("cannot read course file: {0}")]
    Io(#[from] std::io::Error),

    #[error("course {0} has no flight lines")]
    NoFlightLines(PathBuf),
}

pub type CourseResult<T> = Result<T, CourseError>;
