//! User-placed annotations anchored to occupied voxels.
//!
//! Annotations get sequential labels (1, 2, 3, ...) in creation order.
//! The counter belongs to the index, and the index belongs to one scan
//! session, so a new session starts again at 1.
//!
//! ```rust
//! use pratibimba::annotation::AnnotationIndex;
//! use pratibimba::core::VoxelIndex;
//!
//! let mut index = AnnotationIndex::new();
//! let first = index.add_annotation(VoxelIndex::new(1, 0, 2));
//! let second = index.add_annotation(VoxelIndex::new(0, 0, 0));
//! assert_eq!((first.sequence_number, second.sequence_number), (1, 2));
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{Ray3, VoxelIndex};
use crate::grid::VoxelGrid;
use crate::query::ray_box_intersection;

/// Annotation placed on an occupied voxel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Sequential label, starting at 1
    pub sequence_number: u32,
    /// Voxel the annotation is anchored to
    pub anchor_voxel: VoxelIndex,
}

/// Ordered collection of annotations with a monotonic label counter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationIndex {
    annotations: Vec<Annotation>,
    /// Highest sequence number issued so far
    issued: u32,
}

impl AnnotationIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore an index from stored annotations.
    ///
    /// Annotations are kept in sequence order and the counter continues
    /// after the highest stored number.
    pub fn from_annotations(mut annotations: Vec<Annotation>) -> Self {
        annotations.sort_by_key(|a| a.sequence_number);
        let issued = annotations
            .last()
            .map(|a| a.sequence_number)
            .unwrap_or(0);
        Self {
            annotations,
            issued,
        }
    }

    /// Add an annotation for `voxel` and return it.
    pub fn add_annotation(&mut self, voxel: VoxelIndex) -> Annotation {
        self.issued += 1;
        let annotation = Annotation {
            sequence_number: self.issued,
            anchor_voxel: voxel,
        };
        self.annotations.push(annotation);
        annotation
    }

    /// All annotations in creation order
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// True if no annotations have been placed
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Look up an annotation by its label
    pub fn get(&self, sequence_number: u32) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.sequence_number == sequence_number)
    }

    /// Annotations anchored to a voxel
    pub fn at_voxel(&self, voxel: VoxelIndex) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations
            .iter()
            .filter(move |a| a.anchor_voxel == voxel)
    }

    /// Drop annotations whose voxel is not occupied in `grid`.
    ///
    /// The label counter is left alone, so labels are never reused.
    /// Returns the removed annotations.
    pub fn retain_occupied(&mut self, grid: &VoxelGrid) -> Vec<Annotation> {
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.annotations)
            .into_iter()
            .partition(|a| grid.is_occupied(a.anchor_voxel));
        self.annotations = kept;
        dropped
    }
}

/// Occupied voxel hit by a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelHit {
    /// Voxel that was hit
    pub voxel: VoxelIndex,
    /// Ray parameter at the entry point (0 if the origin is inside)
    pub t: f32,
}

/// Nearest occupied voxel along a ray.
///
/// Only occupied voxels are tested. Equal entry distances go to the first
/// voxel in (i, j, k) order.
pub fn hit_test(grid: &VoxelGrid, ray: &Ray3) -> Option<VoxelHit> {
    let mut best: Option<VoxelHit> = None;
    for voxel in grid.occupied() {
        let Some(t) = ray_box_intersection(ray, &grid.voxel_bounds(voxel)) else {
            continue;
        };
        if best.is_none_or(|b| t < b.t) {
            best = Some(VoxelHit { voxel, t });
        }
    }
    best
}
