//! Ray and point queries over unordered point sets and voxel boxes.
//!
//! - [`closest_point`]: nearest sample to a tap ray
//! - [`point_in_voxel`]: closed box containment
//! - [`ray_box_intersection`]: slab test used by voxel hit testing

mod closest;
mod containment;
mod raycast;

pub use closest::{ClosestPoint, closest_point, distance_from_ray};
pub use containment::point_in_voxel;
pub use raycast::ray_box_intersection;
