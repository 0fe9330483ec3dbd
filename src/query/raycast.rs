//! Ray casting against axis-aligned boxes.
//!
//! Standard slab test: intersect the ray with the three pairs of parallel
//! planes and keep the overlap of the entry/exit intervals.

use crate::core::{Aabb, Ray3};

/// Ray–box intersection.
///
/// Returns the ray parameter `t >= 0` at which the ray enters the box, or
/// `0.0` if the origin is inside. `None` if the box is missed or lies
/// entirely behind the origin. Faces count as hits.
pub fn ray_box_intersection(ray: &Ray3, aabb: &Aabb) -> Option<f32> {
    let origin = ray.origin().to_array();
    let direction = ray.direction().to_array();
    let min = aabb.min.to_array();
    let max = aabb.max.to_array();

    let mut t_enter = 0.0f32;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];

        if d == 0.0 {
            // Parallel to this slab: must already be between the planes
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point3;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::ZERO, Point3::splat(1.0))
    }

    #[test]
    fn test_hit_from_outside() {
        let ray = Ray3::new(Point3::new(-2.0, 0.5, 0.5), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let t = ray_box_intersection(&ray, &unit_box()).unwrap();
        assert_relative_eq!(t, 2.0);
    }

    #[test]
    fn test_origin_inside() {
        let ray = Ray3::new(Point3::splat(0.5), Point3::new(0.0, -1.0, 0.0)).unwrap();
        assert_eq!(ray_box_intersection(&ray, &unit_box()), Some(0.0));
    }

    #[test]
    fn test_miss_and_behind() {
        let miss = Ray3::new(Point3::new(-2.0, 1.5, 0.5), Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(ray_box_intersection(&miss, &unit_box()).is_none());

        let behind = Ray3::new(Point3::new(3.0, 0.5, 0.5), Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(ray_box_intersection(&behind, &unit_box()).is_none());
    }

    #[test]
    fn test_diagonal_non_unit_direction() {
        let ray = Ray3::new(Point3::splat(-1.0), Point3::splat(4.0)).unwrap();
        let t = ray_box_intersection(&ray, &unit_box()).unwrap();
        assert_relative_eq!(t, 0.25);
        assert!(ray.at(t).approx_eq(Point3::ZERO, 1e-6));
    }
}
