//! Loop metrics for performance monitoring.
//!
//! Counts what the update passes actually did so the cost of a change mask
//! is visible in the log without a profiler attached.
//!
//! # Usage
//!
//! ```ignore
//! let mut metrics = LoopMetrics::new();
//!
//! // In main loop:
//! let started = Instant::now();
//! let stats = display.run_update(mask, sources);
//! metrics.record_update(stats, started.elapsed());
//! metrics.report_periodically();
//! ```

use std::time::{Duration, Instant};

use heapless::String;

use crate::composition::UpdateStats;
use crate::config::METRICS_INTERVAL;

// =============================================================================
// Loop Metrics
// =============================================================================

/// Per-iteration counters and update timing.
pub struct LoopMetrics {
    /// Update passes run since startup
    pub iterations: u64,
    /// Frames drawn, all passes
    pub frame_draws: u64,
    /// Frames drawn with their border
    pub border_draws: u64,
    /// Surfaces handed to the physical display
    pub flips: u64,

    /// Duration of the last update pass
    pub update_time_us: u32,
    /// Slowest update pass observed
    pub update_time_max_us: u32,
    /// Rolling average update time (simple exponential moving average)
    update_time_avg_us: f32,

    start_time: Instant,
}

impl LoopMetrics {
    /// Create new loop metrics, starting the uptime timer.
    pub fn new() -> Self {
        Self {
            iterations: 0,
            frame_draws: 0,
            border_draws: 0,
            flips: 0,
            update_time_us: 0,
            update_time_max_us: 0,
            update_time_avg_us: 0.0,
            start_time: Instant::now(),
        }
    }

    /// Exponential moving average alpha (0.1 for smooth updates).
    const EMA_ALPHA: f32 = 0.1;

    /// Record one update pass. Every pass flips exactly once.
    pub fn record_update(&mut self, stats: UpdateStats, update_time: Duration) {
        let update_us = u32::try_from(update_time.as_micros()).unwrap_or(u32::MAX);

        self.frame_draws += u64::from(stats.frames);
        self.border_draws += u64::from(stats.borders);
        self.flips += 1;

        self.update_time_us = update_us;
        self.update_time_max_us = self.update_time_max_us.max(update_us);
        if self.iterations == 0 {
            self.update_time_avg_us = update_us as f32;
        } else {
            self.update_time_avg_us =
                Self::EMA_ALPHA.mul_add(update_us as f32, (1.0 - Self::EMA_ALPHA) * self.update_time_avg_us);
        }

        self.iterations += 1;
    }

    /// Get average update time in microseconds.
    #[inline]
    pub const fn update_time_avg_us(&self) -> u32 { self.update_time_avg_us as u32 }

    /// Get uptime since metrics were created.
    #[inline]
    pub fn uptime(&self) -> Duration { self.start_time.elapsed() }

    /// Format uptime as HH:MM:SS string.
    pub fn uptime_string(&self) -> String<12> { format_hms(self.uptime().as_secs()) }

    /// Whether the current iteration count is due for a report.
    #[inline]
    pub const fn report_due(&self) -> bool {
        self.iterations > 0 && self.iterations % METRICS_INTERVAL as u64 == 0
    }

    /// Log the counters at debug level every [`METRICS_INTERVAL`] iterations.
    pub fn report_periodically(&self) {
        if self.report_due() {
            log::debug!(
                "up {}: {} passes, {} frames ({} bordered), {} flips, update avg {} us max {} us",
                self.uptime_string(),
                self.iterations,
                self.frame_draws,
                self.border_draws,
                self.flips,
                self.update_time_avg_us(),
                self.update_time_max_us,
            );
        }
    }
}

impl Default for LoopMetrics {
    fn default() -> Self { Self::new() }
}

fn format_hms(secs: u64) -> String<12> {
    let mut s = String::new();
    core::fmt::write(&mut s, format_args!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)).ok();
    s
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(frames: u32, borders: u32) -> UpdateStats { UpdateStats { frames, borders } }

    #[test]
    fn test_loop_metrics_new() {
        let metrics = LoopMetrics::new();
        assert_eq!(metrics.iterations, 0);
        assert_eq!(metrics.flips, 0);
        assert_eq!(metrics.update_time_max_us, 0);
        assert!(!metrics.report_due(), "nothing to report before the first pass");
    }

    #[test]
    fn test_record_update_counts() {
        let mut metrics = LoopMetrics::new();
        metrics.record_update(stats(5, 1), Duration::from_micros(800));
        metrics.record_update(stats(2, 1), Duration::from_micros(300));

        assert_eq!(metrics.iterations, 2);
        assert_eq!(metrics.frame_draws, 7);
        assert_eq!(metrics.border_draws, 2);
        assert_eq!(metrics.flips, 2, "one flip per pass");
        assert_eq!(metrics.update_time_us, 300);
        assert_eq!(metrics.update_time_max_us, 800, "slowest pass kept");
    }

    #[test]
    fn test_average_starts_at_first_sample() {
        let mut metrics = LoopMetrics::new();
        metrics.record_update(stats(1, 0), Duration::from_micros(1000));
        assert_eq!(metrics.update_time_avg_us(), 1000);
        metrics.record_update(stats(1, 0), Duration::from_micros(2000));
        assert_eq!(metrics.update_time_avg_us(), 1100);
    }

    #[test]
    fn test_report_interval() {
        let mut metrics = LoopMetrics::new();
        for _ in 0..METRICS_INTERVAL - 1 {
            metrics.record_update(stats(1, 0), Duration::ZERO);
            assert!(!metrics.report_due());
        }
        metrics.record_update(stats(1, 0), Duration::ZERO);
        assert!(metrics.report_due(), "due every {METRICS_INTERVAL} passes");
    }

    #[test]
    fn test_uptime_string_format() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3 * 3600 + 7 * 60 + 9), "03:07:09");
        assert_eq!(LoopMetrics::new().uptime_string().len(), 8);
    }
}
