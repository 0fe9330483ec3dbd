//! Closed-interval containment.
//!
//! This predicate includes both faces of the box and is used for filtering
//! frame points into the capture volume. Voxel occupancy uses the half-open
//! [`VoxelGrid::contains_half_open`](crate::grid::VoxelGrid::contains_half_open)
//! instead, so shared faces belong to exactly one voxel. The two must not be
//! merged.

use crate::core::Point3;

/// True if `min <= point <= max` on all three axes.
#[inline]
pub fn point_in_voxel(point: Point3, min: Point3, max: Point3) -> bool {
    point.x >= min.x
        && point.x <= max.x
        && point.y >= min.y
        && point.y <= max.y
        && point.z >= min.z
        && point.z <= max.z
}
