//! Default value functions for serde deserialization.

use crate::grid::AxisCountStrategy;

pub fn small_object_threshold() -> f32 {
    0.381
}

pub fn default_voxel_edge() -> f32 {
    0.127
}

pub fn small_object_divisions() -> u32 {
    4
}

pub fn axis_count() -> AxisCountStrategy {
    AxisCountStrategy::Diagonal
}

pub fn no_detection_secs() -> f64 {
    5.0
}

pub fn max_scan_secs() -> f64 {
    300.0
}

pub fn limited_tracking_secs() -> f64 {
    2.0
}

pub fn advisory_display_secs() -> f64 {
    3.0
}

pub fn display_buffer_secs() -> f64 {
    0.2
}

pub fn max_reference_points() -> usize {
    4096
}
