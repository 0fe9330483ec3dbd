//! Sparse occupancy grid over a bounding volume.
//!
//! The grid is a derived index: it never owns the points it was built from
//! and is rebuilt from scratch whenever the reference object or bounding
//! volume changes.
//!
//! ```text
//!   min + idx*s            min + (idx+1)*s
//!        [──────── voxel idx ────────)
//! ```
//!
//! A voxel is occupied iff at least one source point lies in its half-open
//! range on all three axes.

use std::collections::BTreeSet;

use log::debug;

use super::config::VoxelSizing;
use crate::core::{Aabb, BoundingVolume, Point3, VoxelIndex};
use crate::error::{Result, ScanError};

/// Voxel counts per axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GridDims {
    /// Voxels along X
    pub nx: u32,
    /// Voxels along Y
    pub ny: u32,
    /// Voxels along Z
    pub nz: u32,
}

impl GridDims {
    /// Create dimensions
    #[inline]
    pub const fn new(nx: u32, ny: u32, nz: u32) -> Self {
        Self { nx, ny, nz }
    }

    /// Total voxel count `nx * ny * nz`
    #[inline]
    pub fn total(&self) -> u64 {
        self.nx as u64 * self.ny as u64 * self.nz as u64
    }

    /// True if `index` lies inside the dimensions
    #[inline]
    pub fn contains(&self, index: VoxelIndex) -> bool {
        index.i < self.nx && index.j < self.ny && index.k < self.nz
    }
}

/// Occupancy grid of fixed-size voxels over a bounding volume.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelGrid {
    volume: BoundingVolume,
    edge: Point3,
    dims: GridDims,
    occupied: BTreeSet<VoxelIndex>,
}

impl VoxelGrid {
    /// Build a grid with the default sizing rule.
    pub fn build(points: &[Point3], volume: &BoundingVolume) -> Result<Self> {
        Self::build_with(points, volume, &VoxelSizing::default())
    }

    /// Build a grid from a point set.
    ///
    /// Fails with [`ScanError::DegenerateVolume`] if any extent component
    /// is zero.
    pub fn build_with(
        points: &[Point3],
        volume: &BoundingVolume,
        sizing: &VoxelSizing,
    ) -> Result<Self> {
        if volume.is_degenerate() {
            return Err(ScanError::DegenerateVolume {
                extent: volume.extent(),
            });
        }

        let edge = sizing.edge_for(volume);
        let [nx, ny, nz] = sizing.counts_for(volume, edge);
        let dims = GridDims::new(nx, ny, nz);
        let min = volume.min();

        // Per-point lookup gives the same set as testing every voxel
        // against every point: half-open ranges on an axis are disjoint.
        let mut occupied = BTreeSet::new();
        for &p in points {
            let i = axis_slot(p.x, min.x, edge.x, nx);
            let j = axis_slot(p.y, min.y, edge.y, ny);
            let k = axis_slot(p.z, min.z, edge.z, nz);
            if let (Some(i), Some(j), Some(k)) = (i, j, k) {
                occupied.insert(VoxelIndex::new(i, j, k));
            }
        }

        debug!(
            "[VoxelGrid] Built {}x{}x{} grid (edge {:.4}, {:.4}, {:.4}): {} occupied from {} points",
            nx,
            ny,
            nz,
            edge.x,
            edge.y,
            edge.z,
            occupied.len(),
            points.len()
        );

        Ok(Self {
            volume: *volume,
            edge,
            dims,
            occupied,
        })
    }

    /// Restore a grid from stored parts.
    ///
    /// Every occupied index must lie inside `dims` and the edge must be
    /// positive on every axis.
    pub fn from_parts(
        volume: BoundingVolume,
        edge: Point3,
        dims: GridDims,
        occupied: impl IntoIterator<Item = VoxelIndex>,
    ) -> Result<Self> {
        if volume.is_degenerate() || !(edge.x > 0.0 && edge.y > 0.0 && edge.z > 0.0) {
            return Err(ScanError::DegenerateVolume {
                extent: volume.extent(),
            });
        }
        let occupied: BTreeSet<_> = occupied.into_iter().collect();
        if let Some(bad) = occupied.iter().find(|idx| !dims.contains(**idx)) {
            debug!("[VoxelGrid] Rejected out-of-range voxel {:?}", bad);
            return Err(ScanError::DegenerateVolume {
                extent: volume.extent(),
            });
        }
        Ok(Self {
            volume,
            edge,
            dims,
            occupied,
        })
    }

    /// Source bounding volume
    #[inline]
    pub fn volume(&self) -> &BoundingVolume {
        &self.volume
    }

    /// Voxel edge length per axis
    #[inline]
    pub fn edge(&self) -> Point3 {
        self.edge
    }

    /// Voxel counts per axis
    #[inline]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Total voxels in the grid (occupied or not)
    #[inline]
    pub fn total_voxels(&self) -> u64 {
        self.dims.total()
    }

    /// Number of occupied voxels
    #[inline]
    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Occupied voxels in (i, j, k) order
    pub fn occupied(&self) -> impl Iterator<Item = VoxelIndex> + '_ {
        self.occupied.iter().copied()
    }

    /// Check if a voxel is occupied
    #[inline]
    pub fn is_occupied(&self, index: VoxelIndex) -> bool {
        self.occupied.contains(&index)
    }

    /// Lower corner of a voxel: `min + idx * edge`
    #[inline]
    pub fn voxel_min(&self, index: VoxelIndex) -> Point3 {
        let min = self.volume.min();
        Point3::new(
            corner(min.x, index.i, self.edge.x),
            corner(min.y, index.j, self.edge.y),
            corner(min.z, index.k, self.edge.z),
        )
    }

    /// Corner bounds of a voxel: `[min + idx*edge, min + (idx+1)*edge]`
    pub fn voxel_bounds(&self, index: VoxelIndex) -> Aabb {
        let upper = VoxelIndex::new(index.i + 1, index.j + 1, index.k + 1);
        Aabb::new(self.voxel_min(index), self.voxel_min(upper))
    }

    /// Half-open occupancy test: `min + idx*s <= p < min + (idx+1)*s` on
    /// every axis.
    pub fn contains_half_open(&self, index: VoxelIndex, point: Point3) -> bool {
        let b = self.voxel_bounds(index);
        point.x >= b.min.x
            && point.x < b.max.x
            && point.y >= b.min.y
            && point.y < b.max.y
            && point.z >= b.min.z
            && point.z < b.max.z
    }

    /// Voxel whose half-open range contains `point`, if inside the grid.
    pub fn locate(&self, point: Point3) -> Option<VoxelIndex> {
        let min = self.volume.min();
        Some(VoxelIndex::new(
            axis_slot(point.x, min.x, self.edge.x, self.dims.nx)?,
            axis_slot(point.y, min.y, self.edge.y, self.dims.ny)?,
            axis_slot(point.z, min.z, self.edge.z, self.dims.nz)?,
        ))
    }
}

#[inline]
fn corner(min: f32, idx: u32, edge: f32) -> f32 {
    min + idx as f32 * edge
}

/// Slot `k < n` with `corner(k) <= p < corner(k + 1)`, if any.
///
/// Starts from the divided guess and walks to the slot whose computed
/// corners bracket `p`, so rounding never disagrees with the corners used
/// by [`VoxelGrid::contains_half_open`].
fn axis_slot(p: f32, min: f32, edge: f32, n: u32) -> Option<u32> {
    if n == 0 || !(p >= min) {
        return None;
    }
    let guess = ((p - min) / edge).floor();
    if !guess.is_finite() || guess >= n as f32 + 1.0 {
        return None;
    }
    let mut k = guess.max(0.0) as u32;
    while k > 0 && p < corner(min, k, edge) {
        k -= 1;
    }
    while k < n && p >= corner(min, k + 1, edge) {
        k += 1;
    }
    (k < n).then_some(k)
}
