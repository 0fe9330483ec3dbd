//! Scan lifecycle configuration.

use std::time::Duration;

use crate::grid::VoxelSizing;
use crate::timers::WatchdogConfig;

/// Scan lifecycle configuration
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleConfig {
    /// Voxel sizing for the test-run grid
    pub sizing: VoxelSizing,

    /// Watchdog timeouts
    pub watchdogs: WatchdogConfig,

    /// How long advisories stay visible
    pub advisory_display: Duration,

    /// Added to the average detection delay for the display duration (seconds)
    pub display_buffer_secs: f64,

    /// Maximum number of points kept per capture
    pub max_reference_points: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            sizing: VoxelSizing::default(),
            watchdogs: WatchdogConfig::default(),
            advisory_display: Duration::from_secs(3),
            display_buffer_secs: 0.2,
            max_reference_points: 4096,
        }
    }
}
