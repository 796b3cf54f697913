//! Map file chooser.
//!
//! Lists the course files found in the map directory, followed by an exit
//! entry. The operator moves the selection with the arrow keys and confirms
//! with Enter; confirming the exit entry yields no file.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ GPS-aided Pilot Guidance System [GPGS 0.1.0]     │  header strip, 30 px
//! │          ┌────────────────────────────┐          │
//! │          │        field-north.pgn     │          │  selected: green strip
//! │          ├────────────────────────────┤          │
//! │          │        field-south.pgn     │          │  32 px rows from y + 40
//! │          ├────────────────────────────┤          │
//! │          │          - EXIT -          │          │
//! │          └────────────────────────────┘          │
//! │ Navigate using <Arrow> key and press <Enter> ... │  footer, bottom - 30
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! When there are more entries than rows, the selection is always shown in
//! the last row so the operator sees it move.

use std::io;
use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::colors::{CAPTION_GREY, SELECTION, WHITE, shade};
use crate::display::Surface;
use crate::frame::{Command, DrawContext, FrameGeometry, Reply, Widget};
use crate::styles::{LIST_FONT, SMALL_FONT, text_style};
use crate::widgets::primitives::{draw_bevel_box, draw_text_centered};

// =============================================================================
// Layout Constants
// =============================================================================

/// Last entry; choosing it leaves the program.
pub const EXIT_ENTRY: &str = "- EXIT -";

const TITLE: &str = concat!("GPS-aided Pilot Guidance System [GPGS ", env!("CARGO_PKG_VERSION"), "]");

const FOOTER: &str = "Navigate using <Arrow> key and press <Enter> to choose.";

const HEADER_HEIGHT: u32 = 30;

const ROWS_TOP: i32 = 40;

const ROW_HEIGHT: i32 = 32;

/// Horizontal inset of the rows on each side.
const ROW_INSET: i32 = 100;

/// Space taken by header and footer.
const CHROME_HEIGHT: u32 = 80;

const ROW_TEXT: Rgb565 = shade(1, 1, 10);

// =============================================================================
// Directory Scan
// =============================================================================

/// True if everything after the first `.` of `name` equals `extension`,
/// ignoring ASCII case.
pub fn matches_extension(name: &str, extension: &str) -> bool {
    name.split_once('.').is_some_and(|(_, rest)| rest.eq_ignore_ascii_case(extension))
}

/// Sorted names of the files in `directory` with `extension`.
pub fn scan_directory(directory: &Path, extension: &str) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && matches_extension(name, extension)
        {
            names.push(name.to_owned());
        }
    }
    names.sort();
    Ok(names)
}

// =============================================================================
// Chooser
// =============================================================================

pub struct FileChooser {
    directory: PathBuf,
    /// Course files; the exit entry is implied after them.
    files: Vec<String>,
    selected: usize,
}

impl FileChooser {
    /// Chooser over the course files in `directory`.
    ///
    /// An unreadable directory is not an error: the chooser then offers
    /// only the exit entry.
    pub fn new(directory: &Path, extension: &str) -> Self {
        let files = match scan_directory(directory, extension) {
            Ok(files) => {
                log::info!("{} course file(s) in {}", files.len(), directory.display());
                files
            }
            Err(err) => {
                log::warn!("cannot read map directory {}: {err}", directory.display());
                Vec::new()
            }
        };
        Self::with_files(directory, files)
    }

    /// Chooser over an explicit file list.
    pub fn with_files(directory: &Path, files: Vec<String>) -> Self {
        Self { directory: directory.to_path_buf(), files, selected: 0 }
    }

    /// All entries in display order, exit entry last.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str).chain(core::iter::once(EXIT_ENTRY))
    }

    fn len(&self) -> usize { self.files.len() + 1 }

    #[inline]
    pub const fn selected(&self) -> usize { self.selected }

    /// Move down one entry. False at the last entry.
    pub fn select_next(&mut self) -> bool {
        if self.selected + 1 < self.len() {
            self.selected += 1;
            true
        } else {
            false
        }
    }

    /// Move up one entry. False at the first entry.
    pub fn select_previous(&mut self) -> bool {
        if self.selected > 0 {
            self.selected -= 1;
            true
        } else {
            false
        }
    }

    /// Full path of the selected file, `None` on the exit entry.
    pub fn selected_file(&self) -> Option<PathBuf> {
        self.files.get(self.selected).map(|name| self.directory.join(name))
    }

    fn draw_row(surface: &mut Surface, f: &FrameGeometry, slot: i32, name: &str, selected: bool) {
        let top = f.y + ROWS_TOP + slot * ROW_HEIGHT;
        let left = f.x + ROW_INSET;
        let width = (f.width as i32 - 2 * ROW_INSET).max(1) as u32;
        let center = Point::new(left + width as i32 / 2, top + ROW_HEIGHT / 2);
        let (background, style) = if selected {
            (SELECTION, text_style(LIST_FONT, WHITE, Some(SELECTION)))
        } else {
            (CAPTION_GREY, text_style(SMALL_FONT, ROW_TEXT, Some(CAPTION_GREY)))
        };
        draw_bevel_box(surface, left, top, width, ROW_HEIGHT as u32, background);
        draw_text_centered(surface, name, center, style);
    }
}

impl Widget for FileChooser {
    fn draw(&mut self, f: &FrameGeometry, surface: &mut Surface, _ctx: &DrawContext<'_>) {
        let center_x = f.x + (f.width / 2) as i32;

        draw_bevel_box(surface, f.x, f.y, f.width, HEADER_HEIGHT, CAPTION_GREY);
        draw_text_centered(
            surface,
            TITLE,
            Point::new(center_x, f.y + HEADER_HEIGHT as i32 / 2),
            text_style(LIST_FONT, ROW_TEXT, Some(CAPTION_GREY)),
        );
        draw_text_centered(
            surface,
            FOOTER,
            Point::new(center_x, f.bottom() - 30),
            text_style(SMALL_FONT, CAPTION_GREY, Some(f.color)),
        );

        let visible = (f.height.saturating_sub(CHROME_HEIGHT) / ROW_HEIGHT as u32) as usize;
        if visible == 0 {
            return;
        }
        for (slot, name) in self.entries().take(visible).enumerate() {
            Self::draw_row(surface, f, slot as i32, name, slot == self.selected);
        }
        if self.selected >= visible
            && let Some(name) = self.entries().nth(self.selected)
        {
            Self::draw_row(surface, f, visible as i32 - 1, name, true);
        }
        log::debug!("file chooser: {} of {}", self.selected + 1, self.len());
    }

    fn destroy(&mut self) { self.files.clear(); }

    fn control(&mut self, command: Command) -> Reply {
        let moved = match command {
            Command::SelectNext => self.select_next(),
            Command::SelectPrevious => self.select_previous(),
            Command::ChosenFile => {
                return match self.selected_file() {
                    Some(path) => {
                        log::info!("chosen file {}", path.display());
                        Reply::File(path)
                    }
                    None => Reply::NoFile,
                };
            }
            _ => return Reply::Ignored,
        };
        if moved { Reply::Changed } else { Reply::Unchanged }
    }
}
