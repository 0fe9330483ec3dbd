//! Sizing rules for the voxel grid.

use serde::{Deserialize, Serialize};

use crate::core::{BoundingVolume, Point3};

/// How the per-axis voxel count is derived from the voxel edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisCountStrategy {
    /// `n_axis = floor(diagonal / edge_axis)`.
    ///
    /// Uses the 3D diagonal for every axis, so grids extend past the volume
    /// on the shorter axes. This matches the captured-model behavior.
    #[default]
    Diagonal,

    /// `n_axis = ceil(extent_axis / edge_axis)`: tight per-axis coverage.
    Extent,
}

/// Voxel sizing configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoxelSizing {
    /// Diagonal length below which an object is "small" (meters)
    pub small_object_threshold: f32,

    /// Fixed voxel edge for objects at or above the threshold (meters)
    pub default_edge: f32,

    /// Voxels spanning each axis of a small object
    pub small_object_divisions: u32,

    /// Per-axis voxel count rule
    pub axis_count: AxisCountStrategy,
}

impl Default for VoxelSizing {
    fn default() -> Self {
        Self {
            small_object_threshold: 0.381, // 15in
            default_edge: 0.127,           // 5in
            small_object_divisions: 4,
            axis_count: AxisCountStrategy::Diagonal,
        }
    }
}

impl VoxelSizing {
    /// Voxel edge per axis for a volume.
    ///
    /// Small objects (`diagonal < threshold`) are split into
    /// `small_object_divisions` voxels per axis; everything else uses the
    /// fixed default edge. `diagonal == threshold` is not small.
    pub fn edge_for(&self, volume: &BoundingVolume) -> Point3 {
        let span = volume.max() - volume.min();
        if span.length() < self.small_object_threshold {
            span / self.small_object_divisions as f32
        } else {
            Point3::splat(self.default_edge)
        }
    }

    /// Voxel counts per axis for a volume and edge.
    pub fn counts_for(&self, volume: &BoundingVolume, edge: Point3) -> [u32; 3] {
        let span = volume.max() - volume.min();
        match self.axis_count {
            AxisCountStrategy::Diagonal => {
                let diag = span.length();
                [
                    (diag / edge.x).floor() as u32,
                    (diag / edge.y).floor() as u32,
                    (diag / edge.z).floor() as u32,
                ]
            }
            AxisCountStrategy::Extent => [
                (span.x / edge.x).ceil() as u32,
                (span.y / edge.y).ceil() as u32,
                (span.z / edge.z).ceil() as u32,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(side: f32) -> BoundingVolume {
        BoundingVolume::new(Point3::ZERO, Point3::splat(side)).unwrap()
    }

    #[test]
    fn test_small_object_edge() {
        let sizing = VoxelSizing::default();
        let volume = BoundingVolume::new(Point3::ZERO, Point3::new(0.1, 0.2, 0.04)).unwrap();
        let edge = sizing.edge_for(&volume);
        assert_relative_eq!(edge.x, 0.025, epsilon = 1e-6);
        assert_relative_eq!(edge.y, 0.05, epsilon = 1e-6);
        assert_relative_eq!(edge.z, 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_large_object_edge() {
        let sizing = VoxelSizing::default();
        let edge = sizing.edge_for(&cube(1.0));
        assert_eq!(edge, Point3::splat(0.127));
    }

    #[test]
    fn test_diagonal_counts_exceed_extent() {
        let sizing = VoxelSizing::default();
        let volume = cube(0.1);
        let edge = sizing.edge_for(&volume);
        // diag = 0.1 * sqrt(3) ≈ 0.1732, edge = 0.025 → floor(6.93) = 6
        assert_eq!(sizing.counts_for(&volume, edge), [6, 6, 6]);
    }

    #[test]
    fn test_extent_counts() {
        let sizing = VoxelSizing {
            axis_count: AxisCountStrategy::Extent,
            ..Default::default()
        };
        let volume = BoundingVolume::new(Point3::ZERO, Point3::new(1.0, 0.5, 0.127)).unwrap();
        let edge = sizing.edge_for(&volume);
        assert_eq!(sizing.counts_for(&volume, edge), [8, 4, 1]);
    }

    #[test]
    fn test_strategy_yaml_names() {
        let s: AxisCountStrategy = serde_yaml::from_str("extent").unwrap();
        assert_eq!(s, AxisCountStrategy::Extent);
        let s: AxisCountStrategy = serde_yaml::from_str("diagonal").unwrap();
        assert_eq!(s, AxisCountStrategy::Diagonal);
    }
}
