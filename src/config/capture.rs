//! Detection and capture configuration sections.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Detection statistics section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectionSection {
    /// Added to the average delay for the display duration (seconds)
    #[serde(default = "defaults::display_buffer_secs")]
    pub display_buffer_secs: f64,
}

impl Default for DetectionSection {
    fn default() -> Self {
        Self {
            display_buffer_secs: 0.2,
        }
    }
}

/// Capture section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureSection {
    /// Maximum points kept per capture
    #[serde(default = "defaults::max_reference_points")]
    pub max_reference_points: usize,
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            max_reference_points: 4096,
        }
    }
}
