//! Aircraft trail: a fixed ring of recent world positions.
//!
//! # Sentinel
//!
//! Slots start at the origin and a sample at exactly (0, 0) means "never
//! written". Walking backward from the newest sample stops at the first
//! sentinel, so a fresh run shows a trail that grows from nothing instead of
//! stale positions. Positions are meters in the course frame, where the
//! origin itself is never flown over in practice.
//!
//! # Memory Usage
//!
//! `TRAIL_CAPACITY` samples of two `f64`, allocated once on the heap
//! (about 160 KB) and never resized.

use crate::config::TRAIL_CAPACITY;
use crate::geometry::Coord;

/// Ring buffer of aircraft positions, newest overwriting oldest.
pub struct Trail {
    /// Circular sample storage.
    samples: Box<[Coord]>,

    /// Slot the next sample goes into.
    next: usize,
}

impl Trail {
    pub fn new() -> Self { Self::with_capacity(TRAIL_CAPACITY) }

    /// Trail holding at most `capacity` positions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: vec![Coord::ORIGIN; capacity.max(1)].into_boxed_slice(), next: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize { self.samples.len() }

    /// Record a position, overwriting the oldest once full.
    pub fn push(&mut self, position: Coord) {
        self.samples[self.next] = position;
        self.next = (self.next + 1) % self.samples.len();
    }

    /// Positions from newest to oldest, ending at the first unwritten slot.
    pub fn iter_recent(&self) -> impl Iterator<Item = Coord> + '_ {
        let capacity = self.samples.len();
        (1..=capacity)
            .map(move |back| self.samples[(self.next + capacity - back) % capacity])
            .take_while(|p| *p != Coord::ORIGIN)
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        self.samples.fill(Coord::ORIGIN);
        self.next = 0;
    }
}

impl Default for Trail {
    fn default() -> Self { Self::new() }
}
