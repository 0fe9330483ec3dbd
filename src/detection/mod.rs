//! Detection statistics for the test run.
//!
//! Each detection of the reference object reports the delay between the
//! start of the detection attempt and the hit. The tracker keeps the last
//! delay and a running mean, and derives how long a detection result should
//! stay on screen.

use std::time::Instant;

use log::warn;
use serde::{Deserialize, Serialize};

/// Identity of a reference object.
///
/// Detection events are matched against the object under test by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceId(pub u64);

impl std::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ref-{}", self.0)
    }
}

/// Detection reported by the recognition pipeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionEvent {
    /// When the object was detected
    pub timestamp: Instant,
    /// Which reference object was detected
    pub reference: ReferenceId,
}

/// Running detection statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionStats {
    detections: u32,
    last_delay: f64,
    average_delay: f64,
    /// Added to the average delay for the recommended display duration
    display_buffer: f64,
}

impl Default for DetectionStats {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl DetectionStats {
    /// Create empty statistics with the given display buffer (seconds)
    pub fn new(display_buffer: f64) -> Self {
        Self {
            detections: 0,
            last_delay: 0.0,
            average_delay: 0.0,
            display_buffer,
        }
    }

    /// Record one detection after `delay` seconds.
    pub fn record_detection(&mut self, delay: f64) {
        let delay = if delay < 0.0 || !delay.is_finite() {
            warn!("[Detection] Invalid delay {:.3}s clamped to 0", delay);
            0.0
        } else {
            delay
        };

        self.detections += 1;
        let n = self.detections as f64;
        self.average_delay = (self.average_delay * (n - 1.0) + delay) / n;
        self.last_delay = delay;
    }

    /// Number of detections recorded
    pub fn detections(&self) -> u32 {
        self.detections
    }

    /// Delay of the most recent detection (seconds)
    pub fn last_delay(&self) -> f64 {
        self.last_delay
    }

    /// Mean delay over all detections (seconds)
    pub fn average_delay(&self) -> f64 {
        self.average_delay
    }

    /// How long a detection result should stay visible (seconds)
    pub fn recommended_display_duration(&self) -> f64 {
        self.average_delay + self.display_buffer
    }

    /// Human-readable summary, delays rounded to whole milliseconds.
    pub fn summary(&self) -> String {
        format!(
            "Detected after: {:.0} ms. Avg: {:.0} ms",
            self.last_delay * 1000.0,
            self.average_delay * 1000.0
        )
    }

    /// Clear all counters, keeping the display buffer
    pub fn reset(&mut self) {
        *self = Self::new(self.display_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_at_zero() {
        let stats = DetectionStats::default();
        assert_eq!(stats.detections(), 0);
        assert_eq!(stats.average_delay(), 0.0);
        assert_relative_eq!(stats.recommended_display_duration(), 0.2);
    }

    #[test]
    fn test_running_mean() {
        let mut stats = DetectionStats::default();
        for delay in [0.1, 0.2, 0.3] {
            stats.record_detection(delay);
        }
        assert_eq!(stats.detections(), 3);
        assert_relative_eq!(stats.average_delay(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(stats.last_delay(), 0.3);
        assert_relative_eq!(stats.recommended_display_duration(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_summary_rounds_to_ms() {
        let mut stats = DetectionStats::default();
        stats.record_detection(0.1234);
        stats.record_detection(0.5);
        assert_eq!(stats.summary(), "Detected after: 500 ms. Avg: 312 ms");
    }

    #[test]
    fn test_negative_delay_clamped() {
        let mut stats = DetectionStats::default();
        stats.record_detection(-1.0);
        assert_eq!(stats.detections(), 1);
        assert_eq!(stats.last_delay(), 0.0);
        assert_eq!(stats.average_delay(), 0.0);
    }

    #[test]
    fn test_reset_keeps_buffer() {
        let mut stats = DetectionStats::new(0.5);
        stats.record_detection(1.0);
        stats.reset();
        assert_eq!(stats.detections(), 0);
        assert_relative_eq!(stats.recommended_display_duration(), 0.5);
    }
}
