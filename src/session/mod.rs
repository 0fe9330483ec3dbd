//! Scan session aggregate.
//!
//! A [`ScanSession`] holds everything belonging to one capture attempt: the
//! captured points, the bounding volume and origin, and, once testing has
//! started, the reference under test, its voxel grid, the annotations and
//! the detection statistics. Dropping the session drops all of it, which is
//! how the sequence counters restart.

use std::time::Instant;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationIndex;
use crate::core::{BoundingVolume, Point3};
use crate::detection::{DetectionStats, ReferenceId};
use crate::grid::VoxelGrid;
use crate::query::point_in_voxel;

/// Captured ground truth for one physical object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObject {
    /// Identity used to match detection events
    pub id: ReferenceId,
    /// Sampled surface points
    pub points: Vec<Point3>,
    /// Volume the points were captured in
    pub volume: BoundingVolume,
    /// Object origin
    pub origin: Point3,
}

impl ReferenceObject {
    /// Combine with a second scan of the same object.
    ///
    /// Keeps this object's id and origin; points are concatenated and the
    /// volume grows to enclose both.
    pub fn merged_with(&self, other: &ReferenceObject) -> ReferenceObject {
        let mut points = Vec::with_capacity(self.points.len() + other.points.len());
        points.extend_from_slice(&self.points);
        points.extend_from_slice(&other.points);

        ReferenceObject {
            id: self.id,
            points,
            volume: self.volume.union(&other.volume),
            origin: self.origin,
        }
    }
}

/// Reference and grid of the active test run
#[derive(Clone, Debug)]
struct TestRun {
    reference: ReferenceObject,
    grid: VoxelGrid,
    detection_started: Instant,
}

/// One capture attempt.
#[derive(Clone, Debug)]
pub struct ScanSession {
    captured: Vec<Point3>,
    bounding_volume: Option<BoundingVolume>,
    origin: Option<Point3>,
    test_run: Option<TestRun>,
    annotations: AnnotationIndex,
    statistics: DetectionStats,
}

impl ScanSession {
    /// Create an empty session
    pub fn new(display_buffer: f64) -> Self {
        Self {
            captured: Vec::new(),
            bounding_volume: None,
            origin: None,
            test_run: None,
            annotations: AnnotationIndex::new(),
            statistics: DetectionStats::new(display_buffer),
        }
    }

    /// Start a session from an existing reference object.
    ///
    /// The reference's points and volume become the captured state, so a
    /// later return to capture continues from them.
    pub fn from_reference(reference: &ReferenceObject, display_buffer: f64) -> Self {
        let mut session = Self::new(display_buffer);
        session.captured = reference.points.clone();
        session.bounding_volume = Some(reference.volume);
        session.origin = Some(reference.origin);
        session
    }

    /// Points captured so far
    pub fn captured_points(&self) -> &[Point3] {
        &self.captured
    }

    /// Current bounding volume, if defined
    pub fn bounding_volume(&self) -> Option<&BoundingVolume> {
        self.bounding_volume.as_ref()
    }

    /// Set the bounding volume.
    ///
    /// Captured points that fall outside the new volume are dropped.
    pub fn set_bounding_volume(&mut self, volume: BoundingVolume) {
        let before = self.captured.len();
        let (min, max) = (volume.min(), volume.max());
        self.captured.retain(|&p| point_in_voxel(p, min, max));
        if self.captured.len() != before {
            debug!(
                "[Session] Bounding volume changed, dropped {} points",
                before - self.captured.len()
            );
        }
        self.bounding_volume = Some(volume);
    }

    /// Object origin; the volume center until set explicitly
    pub fn origin(&self) -> Option<Point3> {
        self.origin.or_else(|| self.bounding_volume.map(|v| v.center()))
    }

    /// Set the object origin
    pub fn set_origin(&mut self, origin: Point3) {
        self.origin = Some(origin);
    }

    /// Add frame points that lie inside the bounding volume (faces included).
    ///
    /// Stops once `max_points` are held. Returns the number of points added.
    pub fn add_points(&mut self, points: &[Point3], max_points: usize) -> usize {
        let Some(volume) = self.bounding_volume else {
            return 0;
        };
        let (min, max) = (volume.min(), volume.max());
        let room = max_points.saturating_sub(self.captured.len());

        let before = self.captured.len();
        self.captured.extend(
            points
                .iter()
                .copied()
                .filter(|&p| point_in_voxel(p, min, max))
                .take(room),
        );
        self.captured.len() - before
    }

    /// Reference object built from the captured state, if a volume exists
    pub fn capture_reference(&self, id: ReferenceId) -> Option<ReferenceObject> {
        let volume = self.bounding_volume?;
        Some(ReferenceObject {
            id,
            points: self.captured.clone(),
            volume,
            origin: self.origin().unwrap_or(volume.center()),
        })
    }

    /// Start a test run. Resets detection statistics.
    ///
    /// Annotations anchored to voxels that are not occupied in `grid` are
    /// dropped.
    pub fn begin_test(&mut self, reference: ReferenceObject, grid: VoxelGrid, now: Instant) {
        self.statistics.reset();
        let dropped = self.annotations.retain_occupied(&grid);
        if !dropped.is_empty() {
            let labels: Vec<u32> = dropped.iter().map(|a| a.sequence_number).collect();
            warn!(
                "[Session] Dropped annotations {:?}: voxels not occupied in the rebuilt grid",
                labels
            );
        }
        self.test_run = Some(TestRun {
            reference,
            grid,
            detection_started: now,
        });
    }

    /// End the test run. Annotations are kept.
    pub fn end_test(&mut self) {
        self.test_run = None;
    }

    /// True while a test run is active
    pub fn is_testing(&self) -> bool {
        self.test_run.is_some()
    }

    /// Reference object under test
    pub fn reference(&self) -> Option<&ReferenceObject> {
        self.test_run.as_ref().map(|run| &run.reference)
    }

    /// Voxel grid of the reference under test
    pub fn grid(&self) -> Option<&VoxelGrid> {
        self.test_run.as_ref().map(|run| &run.grid)
    }

    /// Start of the current detection attempt
    pub fn detection_started(&self) -> Option<Instant> {
        self.test_run.as_ref().map(|run| run.detection_started)
    }

    /// Restart the detection attempt clock
    pub fn restart_detection(&mut self, now: Instant) {
        if let Some(run) = self.test_run.as_mut() {
            run.detection_started = now;
        }
    }

    /// Annotation index
    pub fn annotations(&self) -> &AnnotationIndex {
        &self.annotations
    }

    /// Mutable annotation index
    pub fn annotations_mut(&mut self) -> &mut AnnotationIndex {
        &mut self.annotations
    }

    /// Replace the annotation index
    pub fn set_annotations(&mut self, annotations: AnnotationIndex) {
        self.annotations = annotations;
    }

    /// Detection statistics
    pub fn statistics(&self) -> &DetectionStats {
        &self.statistics
    }

    /// Mutable detection statistics
    pub fn statistics_mut(&mut self) -> &mut DetectionStats {
        &mut self.statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_volume() -> BoundingVolume {
        BoundingVolume::new(Point3::ZERO, Point3::splat(1.0)).unwrap()
    }

    #[test]
    fn test_add_points_filters_and_caps() {
        let mut session = ScanSession::new(0.2);
        assert_eq!(session.add_points(&[Point3::ZERO], 10), 0);

        session.set_bounding_volume(unit_volume());
        let frame = [
            Point3::new(0.5, 0.5, 0.5), // on the upper face, kept
            Point3::new(0.6, 0.0, 0.0), // outside
            Point3::new(-0.2, 0.1, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        assert_eq!(session.add_points(&frame, 10), 3);
        assert_eq!(session.add_points(&frame, 4), 1);
        assert_eq!(session.captured_points().len(), 4);
        assert_eq!(session.add_points(&frame, 4), 0);
    }

    #[test]
    fn test_shrinking_volume_drops_points() {
        let mut session = ScanSession::new(0.2);
        session.set_bounding_volume(unit_volume());
        session.add_points(&[Point3::new(0.4, 0.0, 0.0), Point3::ZERO], 10);

        let small = BoundingVolume::new(Point3::ZERO, Point3::splat(0.5)).unwrap();
        session.set_bounding_volume(small);
        assert_eq!(session.captured_points(), &[Point3::ZERO]);
    }

    #[test]
    fn test_origin_defaults_to_center() {
        let mut session = ScanSession::new(0.2);
        assert!(session.origin().is_none());

        let volume = BoundingVolume::new(Point3::new(1.0, 2.0, 3.0), Point3::splat(1.0)).unwrap();
        session.set_bounding_volume(volume);
        assert_eq!(session.origin(), Some(Point3::new(1.0, 2.0, 3.0)));

        session.set_origin(Point3::ZERO);
        let reference = session.capture_reference(ReferenceId(7)).unwrap();
        assert_eq!(reference.origin, Point3::ZERO);
        assert_eq!(reference.id, ReferenceId(7));
    }

    #[test]
    fn test_merge_unions_points_and_volume() {
        let a = ReferenceObject {
            id: ReferenceId(1),
            points: vec![Point3::ZERO],
            volume: unit_volume(),
            origin: Point3::ZERO,
        };
        let b = ReferenceObject {
            id: ReferenceId(2),
            points: vec![Point3::splat(1.0), Point3::splat(1.2)],
            volume: BoundingVolume::new(Point3::splat(1.0), Point3::splat(1.0)).unwrap(),
            origin: Point3::splat(1.0),
        };
        let merged = b.merged_with(&a);
        assert_eq!(merged.id, ReferenceId(2));
        assert_eq!(merged.points.len(), 3);
        assert_eq!(merged.volume.min(), Point3::splat(-0.5));
        assert_eq!(merged.volume.max(), Point3::splat(1.5));
    }

    #[test]
    fn test_begin_and_end_test() {
        let mut session = ScanSession::new(0.2);
        session.set_bounding_volume(unit_volume());
        session.add_points(&[Point3::ZERO], 10);
        session.statistics_mut().record_detection(1.0);

        let reference = session.capture_reference(ReferenceId(1)).unwrap();
        let grid = VoxelGrid::build(&reference.points, &reference.volume).unwrap();
        session.begin_test(reference, grid, Instant::now());
        assert!(session.is_testing());
        assert_eq!(session.statistics().detections(), 0);
        assert_eq!(session.grid().unwrap().occupied_count(), 1);

        session.annotations_mut().add_annotation(crate::core::VoxelIndex::new(0, 0, 0));
        session.end_test();
        assert!(!session.is_testing());
        assert!(session.grid().is_none());
        assert_eq!(session.annotations().len(), 1);
    }
}
