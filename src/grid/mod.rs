//! Voxel occupancy grid over the reference object's bounding volume.
//!
//! ## Sizing Rule
//!
//! ```text
//! diag = |max - min|
//!
//! diag <  0.381  → edge = (max - min) / 4     (small object: 4 voxels per axis)
//! diag >= 0.381  → edge = (0.127, 0.127, 0.127)
//!
//! n_axis = floor(diag / edge_axis)            (diagonal, not per-axis extent)
//! ```
//!
//! The diagonal-based count is kept for compatibility with previously
//! captured models; [`AxisCountStrategy::Extent`] gives tight per-axis counts.
//!
//! ## Example
//!
//! ```rust
//! use pratibimba::core::{BoundingVolume, Point3};
//! use pratibimba::grid::VoxelGrid;
//!
//! let volume = BoundingVolume::new(Point3::ZERO, Point3::new(0.2, 0.1, 0.1)).unwrap();
//! let points = [Point3::new(0.05, 0.0, 0.0), Point3::new(-0.05, 0.01, 0.02)];
//! let grid = VoxelGrid::build(&points, &volume).unwrap();
//!
//! assert_eq!(grid.occupied_count(), 2);
//! ```

mod config;
mod voxel_grid;

pub use config::{AxisCountStrategy, VoxelSizing};
pub use voxel_grid::{GridDims, VoxelGrid};
