//! Bounding volumes and axis-aligned boxes.
//!
//! [`BoundingVolume`] is the user-defined capture box (center + full extent).
//! [`Aabb`] is a plain min/max box used for voxel cells and ray tests.
//!
//! ```rust
//! use pratibimba::core::{BoundingVolume, Point3};
//!
//! let volume = BoundingVolume::new(Point3::ZERO, Point3::new(0.2, 0.1, 0.4)).unwrap();
//! assert_eq!(volume.min(), Point3::new(-0.1, -0.05, -0.2));
//! assert!(volume.contains(Point3::new(0.1, 0.0, 0.0)));
//! ```

use serde::{Deserialize, Serialize};

use super::point::Point3;
use crate::error::{Result, ScanError};

/// Capture volume around the object being scanned.
///
/// Extent is the full width/height/depth; every component is finite and
/// non-negative. Zero components are allowed here and rejected later by
/// the grid builder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    center: Point3,
    extent: Point3,
}

impl BoundingVolume {
    /// Create a bounding volume, rejecting negative or non-finite extents.
    pub fn new(center: Point3, extent: Point3) -> Result<Self> {
        let valid = center.is_finite()
            && extent.is_finite()
            && extent.x >= 0.0
            && extent.y >= 0.0
            && extent.z >= 0.0;
        if !valid {
            return Err(ScanError::DegenerateVolume { extent });
        }
        Ok(Self { center, extent })
    }

    /// Create from min/max corners (corners are ordered per axis).
    pub fn from_corners(a: Point3, b: Point3) -> Result<Self> {
        let min = a.min_elem(&b);
        let max = a.max_elem(&b);
        Self::new((min + max) * 0.5, max - min)
    }

    /// Center of the volume
    #[inline]
    pub fn center(&self) -> Point3 {
        self.center
    }

    /// Full extent (width, height, depth)
    #[inline]
    pub fn extent(&self) -> Point3 {
        self.extent
    }

    /// Minimum corner: `center - extent / 2`
    #[inline]
    pub fn min(&self) -> Point3 {
        self.center - self.extent / 2.0
    }

    /// Maximum corner: `center + extent / 2`
    #[inline]
    pub fn max(&self) -> Point3 {
        self.center + self.extent / 2.0
    }

    /// Euclidean length of the min→max diagonal
    #[inline]
    pub fn diagonal(&self) -> f32 {
        (self.max() - self.min()).length()
    }

    /// True if any extent component is zero
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.extent.x == 0.0 || self.extent.y == 0.0 || self.extent.z == 0.0
    }

    /// Closed containment test against the volume's corners.
    #[inline]
    pub fn contains(&self, point: Point3) -> bool {
        crate::query::point_in_voxel(point, self.min(), self.max())
    }

    /// Smallest volume enclosing both volumes.
    pub fn union(&self, other: &BoundingVolume) -> BoundingVolume {
        let min = self.min().min_elem(&other.min());
        let max = self.max().max_elem(&other.max());
        BoundingVolume {
            center: (min + max) * 0.5,
            extent: max - min,
        }
    }

    /// Volume as a min/max box
    #[inline]
    pub fn to_aabb(&self) -> Aabb {
        Aabb::new(self.min(), self.max())
    }
}

/// Axis-aligned box given by its min and max corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Point3,
    /// Maximum corner
    pub max: Point3,
}

impl Aabb {
    /// Create a box from min and max corners
    #[inline]
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Center of the box
    #[inline]
    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    /// Size of the box per axis
    #[inline]
    pub fn size(&self) -> Point3 {
        self.max - self.min
    }
}
