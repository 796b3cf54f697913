//! Surface, physical display and event source.
//!
//! All instruments draw into one in-memory [`Surface`]. Once per loop
//! iteration the composition hands the finished surface to the
//! [`PhysicalDisplay`], which is the only moment anything becomes visible.
//! There is no double buffering beyond that: the surface itself is the back
//! buffer and instruments repaint only what changed.

use std::collections::VecDeque;
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics_simulator::SimulatorDisplay;

use crate::changes::EventMask;

/// The composed drawing surface.
pub type Surface = SimulatorDisplay<Rgb565>;

/// Where the composed surface ends up.
pub trait PhysicalDisplay {
    /// Show the surface.
    fn flip(&mut self, surface: &Surface);
}

/// Operator keys the display reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Up,
    Down,
    /// Printable key, upper-cased.
    Char(char),
}

impl Key {
    /// Printable key, normalized to upper case.
    pub fn char(c: char) -> Self { Self::Char(c.to_ascii_uppercase()) }
}

/// Blocking source of input and sensor-ready signals.
pub trait EventSource {
    /// Wait at most `timeout` for something to happen.
    fn wait_for_event(&mut self, timeout: Duration) -> EventMask;

    /// Key that caused the last `key_pressed` event, if any is pending.
    fn take_key(&mut self) -> Option<Key>;
}

/// Display that only counts flips.
///
/// Used when running without a screen and by the tests.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    flips: usize,
}

impl HeadlessDisplay {
    pub fn new() -> Self { Self::default() }

    /// Number of frames shown so far.
    #[inline]
    pub const fn flips(&self) -> usize { self.flips }
}

impl PhysicalDisplay for HeadlessDisplay {
    fn flip(&mut self, _surface: &Surface) { self.flips += 1; }
}

/// Keys waiting to be handled, plus the window-closed state.
///
/// Closing drops whatever is still queued and yields a single `Q`, so the
/// caller sees exactly one quit request.
#[derive(Debug, Default)]
pub struct KeyQueue {
    keys: VecDeque<Key>,
    closed: bool,
    quit_sent: bool,
}

impl KeyQueue {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, key: Key) {
        if !self.closed {
            self.keys.push_back(key);
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.keys.clear();
    }

    #[inline]
    pub const fn closed(&self) -> bool { self.closed }

    /// Something for [`KeyQueue::take`] to return.
    pub fn pending(&self) -> bool { !self.keys.is_empty() || (self.closed && !self.quit_sent) }

    pub fn take(&mut self) -> Option<Key> {
        if self.closed {
            if self.quit_sent {
                return None;
            }
            self.quit_sent = true;
            return Some(Key::Char('Q'));
        }
        self.keys.pop_front()
    }
}

#[cfg(feature = "window")]
pub use window::SimulatorScreen;

#[cfg(feature = "window")]
mod window {
    use std::time::{Duration, Instant};

    use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorEvent, Window};

    use super::{EventMask, EventSource, Key, KeyQueue, PhysicalDisplay, Surface};

    /// Granularity of the event poll while waiting.
    const POLL_STEP: Duration = Duration::from_millis(10);

    /// SDL window standing in for the cockpit screen and keypad.
    pub struct SimulatorScreen {
        window: Window,
        keys: KeyQueue,
        shown: bool,
    }

    impl SimulatorScreen {
        pub fn new(title: &str, scale: u32) -> Self {
            let output_settings = OutputSettingsBuilder::new().scale(scale).build();
            Self { window: Window::new(title, &output_settings), keys: KeyQueue::new(), shown: false }
        }

        /// The operator closed the window.
        #[inline]
        pub const fn closed(&self) -> bool { self.keys.closed() }

        fn poll(&mut self) {
            for event in self.window.events() {
                match event {
                    SimulatorEvent::Quit => self.keys.close(),
                    SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                        // Ignore OS key repeat so a held key does not spam transitions
                        if repeat {
                            continue;
                        }
                        if let Some(key) = map_key(&keycode.name()) {
                            self.keys.push(key);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn map_key(name: &str) -> Option<Key> {
        match name {
            "Return" | "Keypad Enter" => Some(Key::Enter),
            "Escape" => Some(Key::Escape),
            "Up" => Some(Key::Up),
            "Down" => Some(Key::Down),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => Some(Key::char(c)),
                    _ => None,
                }
            }
        }
    }

    impl PhysicalDisplay for SimulatorScreen {
        fn flip(&mut self, surface: &Surface) {
            self.window.update(surface);
            self.shown = true;
        }
    }

    impl EventSource for SimulatorScreen {
        fn wait_for_event(&mut self, timeout: Duration) -> EventMask {
            // SDL events are only available once the window has been shown.
            if !self.shown {
                std::thread::sleep(timeout);
                return EventMask::TIMEOUT;
            }
            let deadline = Instant::now() + timeout;
            loop {
                self.poll();
                if self.keys.pending() {
                    return EventMask { key_pressed: true, ..EventMask::default() };
                }
                let now = Instant::now();
                if now >= deadline {
                    return EventMask::TIMEOUT;
                }
                std::thread::sleep(POLL_STEP.min(deadline - now));
            }
        }

        fn take_key(&mut self) -> Option<Key> { self.keys.take() }
    }
}
