//! Nearest point to a ray.
//!
//! Used when the user taps on the reference object: the tap becomes a ray
//! and the point-cloud sample closest to that ray is picked.
//!
//! ```text
//!                 p
//!                 │  distance
//!   origin ●──────┴──────────────▶ direction
//!                 pb = origin + b·direction
//! ```

use crate::core::{Point3, Ray3};
use crate::error::{Result, ScanError};

/// Result of a closest-point query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosestPoint {
    /// The selected point
    pub point: Point3,
    /// Index of the point in the input sequence
    pub index: usize,
    /// Perpendicular distance from the point to the ray line
    pub distance: f32,
}

/// Perpendicular distance from `point` to the line through `ray`.
///
/// `b = dot(p - o, d) / dot(d, d)`, `pb = o + b·d`, distance `|p - pb|`.
/// `b` is not clamped, so points behind the origin measure against the
/// backward extension of the line.
#[inline]
pub fn distance_from_ray(ray: &Ray3, point: Point3) -> f32 {
    let foot = ray.at(ray.project(point));
    (point - foot).length()
}

/// Find the point closest to a ray.
///
/// Ties are resolved in favor of the first point encountered.
///
/// # Errors
/// [`ScanError::EmptyPointSet`] if `points` is empty.
pub fn closest_point(points: &[Point3], ray: &Ray3) -> Result<ClosestPoint> {
    let mut best: Option<ClosestPoint> = None;

    for (index, &point) in points.iter().enumerate() {
        let distance = distance_from_ray(ray, point);
        let better = match &best {
            Some(current) => distance < current.distance,
            None => true,
        };
        if better {
            best = Some(ClosestPoint {
                point,
                index,
                distance,
            });
        }
    }

    best.ok_or(ScanError::EmptyPointSet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn x_axis() -> Ray3 {
        Ray3::new(Point3::ZERO, Point3::new(1.0, 0.0, 0.0)).unwrap()
    }

    #[test]
    fn test_empty_point_set() {
        assert!(matches!(
            closest_point(&[], &x_axis()),
            Err(ScanError::EmptyPointSet)
        ));
    }

    #[test]
    fn test_origin_has_zero_distance() {
        let ray = Ray3::new(Point3::new(0.3, -0.2, 1.0), Point3::new(0.0, 0.5, -2.0)).unwrap();
        let points = [
            Point3::new(1.0, 1.0, 1.0),
            ray.origin(),
            Point3::new(-1.0, 0.0, 0.0),
        ];
        let hit = closest_point(&points, &ray).unwrap();
        assert_eq!(hit.index, 1);
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_picks_nearest_to_line() {
        let points = [
            Point3::new(1.0, 0.5, 0.0),
            Point3::new(5.0, 0.1, 0.0),
            Point3::new(2.0, 0.0, 0.3),
        ];
        let hit = closest_point(&points, &x_axis()).unwrap();
        assert_eq!(hit.point, Point3::new(5.0, 0.1, 0.0));
        assert_relative_eq!(hit.distance, 0.1);
    }

    #[test]
    fn test_non_unit_direction_same_result() {
        let points = [Point3::new(1.0, 0.2, 0.0), Point3::new(3.0, 0.0, 0.4)];
        let unit = closest_point(&points, &x_axis()).unwrap();
        let scaled = Ray3::new(Point3::ZERO, Point3::new(7.5, 0.0, 0.0)).unwrap();
        let scaled = closest_point(&points, &scaled).unwrap();
        assert_eq!(unit.index, scaled.index);
        assert_relative_eq!(unit.distance, scaled.distance);
    }

    #[test]
    fn test_ties_resolve_to_first() {
        let points = [
            Point3::new(1.0, 0.2, 0.0),
            Point3::new(4.0, -0.2, 0.0),
            Point3::new(2.0, 0.0, 0.2),
        ];
        let hit = closest_point(&points, &x_axis()).unwrap();
        assert_eq!(hit.index, 0);
    }
}
