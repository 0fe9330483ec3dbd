//! Liveness watchdogs.
//!
//! Watchdogs are plain deadlines. Nothing runs in the background: the owner
//! polls them with the current time and reacts when one fires. Time comes
//! from a [`Clock`] so tests can drive it by hand.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests and replays.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the lifecycle.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Start at the current wall-clock instant
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// One-shot, restartable deadline.
#[derive(Clone, Debug)]
pub struct Watchdog {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Watchdog {
    /// Create a disarmed watchdog
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Arm the watchdog, replacing any pending deadline.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    /// Disarm. Does nothing if not armed.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True if a deadline is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before firing, if armed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Returns true exactly once when the deadline has passed, then disarms.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Timeouts for the three lifecycle watchdogs.
#[derive(Clone, Debug, PartialEq)]
pub struct WatchdogConfig {
    /// No detection during a test run
    pub no_detection: Duration,
    /// Capture running too long
    pub max_scan: Duration,
    /// Limited tracking while capturing
    pub limited_tracking: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            no_detection: Duration::from_secs(5),
            max_scan: Duration::from_secs(300),
            limited_tracking: Duration::from_secs(2),
        }
    }
}

/// The lifecycle's watchdogs
#[derive(Clone, Debug)]
pub struct Watchdogs {
    /// Fires when nothing was detected for a while during testing
    pub no_detection: Watchdog,
    /// Fires when capture has been running too long
    pub max_scan: Watchdog,
    /// Fires when tracking stayed limited while capturing
    pub limited_tracking: Watchdog,
}

impl Watchdogs {
    /// Create disarmed watchdogs
    pub fn new(config: &WatchdogConfig) -> Self {
        Self {
            no_detection: Watchdog::new(config.no_detection),
            max_scan: Watchdog::new(config.max_scan),
            limited_tracking: Watchdog::new(config.limited_tracking),
        }
    }

    /// Disarm all
    pub fn cancel_all(&mut self) {
        self.no_detection.cancel();
        self.max_scan.cancel();
        self.limited_tracking.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let clock = ManualClock::new();
        let mut dog = Watchdog::new(Duration::from_secs(5));
        dog.arm(clock.now());

        clock.advance(Duration::from_millis(4999));
        assert!(!dog.poll(clock.now()));

        clock.advance(Duration::from_millis(1));
        assert!(dog.poll(clock.now()));
        assert!(!dog.is_armed());

        clock.advance(Duration::from_secs(10));
        assert!(!dog.poll(clock.now()));
    }

    #[test]
    fn test_rearm_restarts_deadline() {
        let clock = ManualClock::new();
        let mut dog = Watchdog::new(Duration::from_secs(5));
        dog.arm(clock.now());
        clock.advance(Duration::from_secs(4));
        dog.arm(clock.now());

        clock.advance(Duration::from_secs(4));
        assert!(!dog.poll(clock.now()));
        assert_eq!(dog.remaining(clock.now()), Some(Duration::from_secs(1)));

        clock.advance(Duration::from_secs(1));
        assert!(dog.poll(clock.now()));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let clock = ManualClock::new();
        let mut dog = Watchdog::new(Duration::from_secs(2));
        dog.cancel();
        dog.arm(clock.now());
        dog.cancel();
        dog.cancel();
        clock.advance(Duration::from_secs(3));
        assert!(!dog.poll(clock.now()));
    }

    #[test]
    fn test_default_timeouts() {
        let dogs = Watchdogs::new(&WatchdogConfig::default());
        assert_eq!(dogs.no_detection.timeout(), Duration::from_secs(5));
        assert_eq!(dogs.max_scan.timeout(), Duration::from_secs(300));
        assert_eq!(dogs.limited_tracking.timeout(), Duration::from_secs(2));
    }
}
