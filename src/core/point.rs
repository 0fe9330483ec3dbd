//! Point and index types for the voxel grid.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// 3D point or vector in capture-space coordinates (meters, f32)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Z coordinate
    pub z: f32,
}

impl Point3 {
    /// Create a new point
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero point (origin)
    pub const ZERO: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Point with the same value on every axis
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Dot product with another point (as vectors)
    #[inline]
    pub fn dot(&self, other: &Point3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Length (magnitude) of this point as a vector from origin
    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared length (avoids sqrt)
    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point3) -> f32 {
        (*self - *other).length()
    }

    /// Component-wise product
    #[inline]
    pub fn mul_elem(&self, other: &Point3) -> Point3 {
        Point3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// Component-wise minimum
    #[inline]
    pub fn min_elem(&self, other: &Point3) -> Point3 {
        Point3::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum
    #[inline]
    pub fn max_elem(&self, other: &Point3) -> Point3 {
        Point3::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Components as an array (x, y, z)
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Build from an array (x, y, z)
    #[inline]
    pub fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    /// True if every component is finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Approximate equality within epsilon on every axis
    #[inline]
    pub fn approx_eq(&self, other: Point3, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Point3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Div<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn div(self, scalar: f32) -> Self {
        Point3::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

/// Voxel index (i, j, k) within a [`VoxelGrid`](crate::grid::VoxelGrid).
///
/// Ordered by i, then j, then k so occupied sets enumerate deterministically.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct VoxelIndex {
    /// Index along X
    pub i: u32,
    /// Index along Y
    pub j: u32,
    /// Index along Z
    pub k: u32,
}

impl VoxelIndex {
    /// Create a new voxel index
    #[inline]
    pub const fn new(i: u32, j: u32, k: u32) -> Self {
        Self { i, j, k }
    }

    /// Indices as an array (i, j, k)
    #[inline]
    pub fn to_array(self) -> [u32; 3] {
        [self.i, self.j, self.k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_arithmetic() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(0.5, 0.5, 0.5);

        assert_eq!(a + b, Point3::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Point3::new(0.5, 1.5, 2.5));
        assert_eq!(a * 2.0, Point3::new(2.0, 4.0, 6.0));
        assert_eq!(a / 2.0, Point3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn test_length_and_dot() {
        let p = Point3::new(2.0, 3.0, 6.0);
        assert_relative_eq!(p.length(), 7.0);
        assert_relative_eq!(p.dot(&Point3::new(1.0, 0.0, 0.0)), 2.0);
        assert_relative_eq!(Point3::ZERO.distance(&p), 7.0);
    }

    #[test]
    fn test_elementwise_bounds() {
        let a = Point3::new(1.0, -2.0, 3.0);
        let b = Point3::new(-1.0, 2.0, 0.0);
        assert_eq!(a.min_elem(&b), Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(a.max_elem(&b), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_voxel_index_ordering() {
        let mut indices = vec![
            VoxelIndex::new(1, 0, 0),
            VoxelIndex::new(0, 2, 0),
            VoxelIndex::new(0, 0, 5),
        ];
        indices.sort();
        assert_eq!(indices[0], VoxelIndex::new(0, 0, 5));
        assert_eq!(indices[2], VoxelIndex::new(1, 0, 0));
    }
}
