//! Grid configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::grid::{AxisCountStrategy, VoxelSizing};

/// Voxel grid settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSection {
    /// Diagonal below which an object counts as small (meters)
    #[serde(default = "defaults::small_object_threshold")]
    pub small_object_threshold: f32,

    /// Voxel edge for objects that are not small (meters)
    #[serde(default = "defaults::default_voxel_edge")]
    pub default_voxel_edge: f32,

    /// Voxels per axis for small objects
    #[serde(default = "defaults::small_object_divisions")]
    pub small_object_divisions: u32,

    /// Per-axis voxel count rule: `diagonal` or `extent`
    #[serde(default = "defaults::axis_count")]
    pub axis_count: AxisCountStrategy,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            small_object_threshold: 0.381,
            default_voxel_edge: 0.127,
            small_object_divisions: 4,
            axis_count: AxisCountStrategy::Diagonal,
        }
    }
}

impl GridSection {
    /// Convert to the grid builder's sizing rule
    pub fn to_voxel_sizing(&self) -> VoxelSizing {
        VoxelSizing {
            small_object_threshold: self.small_object_threshold,
            default_edge: self.default_voxel_edge,
            small_object_divisions: self.small_object_divisions,
            axis_count: self.axis_count,
        }
    }
}
