//! Timer configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::timers::WatchdogConfig;

/// Watchdog and message timing section (seconds)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerSection {
    /// No detection during testing
    #[serde(default = "defaults::no_detection_secs")]
    pub no_detection_secs: f64,

    /// Capture running too long
    #[serde(default = "defaults::max_scan_secs")]
    pub max_scan_secs: f64,

    /// Limited tracking while capturing
    #[serde(default = "defaults::limited_tracking_secs")]
    pub limited_tracking_secs: f64,

    /// How long advisories stay visible
    #[serde(default = "defaults::advisory_display_secs")]
    pub advisory_display_secs: f64,
}

impl Default for TimerSection {
    fn default() -> Self {
        Self {
            no_detection_secs: 5.0,
            max_scan_secs: 300.0,
            limited_tracking_secs: 2.0,
            advisory_display_secs: 3.0,
        }
    }
}

impl TimerSection {
    /// Convert to watchdog timeouts
    pub fn to_watchdog_config(&self) -> WatchdogConfig {
        WatchdogConfig {
            no_detection: Duration::from_secs_f64(self.no_detection_secs),
            max_scan: Duration::from_secs_f64(self.max_scan_secs),
            limited_tracking: Duration::from_secs_f64(self.limited_tracking_secs),
        }
    }

    /// Advisory display time
    pub fn advisory_display(&self) -> Duration {
        Duration::from_secs_f64(self.advisory_display_secs)
    }
}
