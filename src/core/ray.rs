//! Rays in capture space.
//!
//! A tap on screen is converted by the caller into a ray (origin +
//! direction) in the same coordinate space as the point cloud.

use super::point::Point3;
use crate::error::{Result, ScanError};

/// Ray with a non-zero direction.
///
/// The direction is stored as given (not normalized); projections divide
/// by `dot(direction, direction)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray3 {
    origin: Point3,
    direction: Point3,
}

impl Ray3 {
    /// Create a ray, rejecting zero or non-finite directions.
    pub fn new(origin: Point3, direction: Point3) -> Result<Self> {
        if !direction.is_finite() || direction.length_squared() == 0.0 {
            return Err(ScanError::DegenerateRay);
        }
        Ok(Self { origin, direction })
    }

    /// Ray through two points (e.g. unprojected near/far screen points).
    pub fn through(near: Point3, far: Point3) -> Result<Self> {
        Self::new(near, far - near)
    }

    /// Ray origin
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Ray direction (as given)
    #[inline]
    pub fn direction(&self) -> Point3 {
        self.direction
    }

    /// Point at parameter `t` along the ray: `origin + t * direction`
    #[inline]
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }

    /// Parameter of the orthogonal projection of `point` onto the ray line.
    #[inline]
    pub fn project(&self, point: Point3) -> f32 {
        (point - self.origin).dot(&self.direction) / self.direction.dot(&self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_direction_rejected() {
        assert!(matches!(
            Ray3::new(Point3::ZERO, Point3::ZERO),
            Err(ScanError::DegenerateRay)
        ));
        assert!(Ray3::through(Point3::splat(1.0), Point3::splat(1.0)).is_err());
    }

    #[test]
    fn test_project_non_unit_direction() {
        let ray = Ray3::new(Point3::ZERO, Point3::new(2.0, 0.0, 0.0)).unwrap();
        let t = ray.project(Point3::new(3.0, 1.0, 0.0));
        assert_relative_eq!(t, 1.5);
        assert_eq!(ray.at(t), Point3::new(3.0, 0.0, 0.0));
    }
}
