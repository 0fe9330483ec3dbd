//! Core geometry types for Pratibimba.
//!
//! - [`Point3`]: 3D point / vector (f32)
//! - [`VoxelIndex`]: integer (i, j, k) voxel address
//! - [`BoundingVolume`] and [`Aabb`]: capture volume and plain boxes
//! - [`Ray3`]: validated ray for tap queries

mod bounds;
mod point;
mod ray;

pub use bounds::{Aabb, BoundingVolume};
pub use point::{Point3, VoxelIndex};
pub use ray::Ray3;
