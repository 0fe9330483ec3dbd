//! # Pratibimba: Reference Object Capture and Re-Detection
//!
//! Core logic for capturing a physical object as a reference model and
//! checking that it can be detected again.
//!
//! ## Features
//!
//! - **Voxel Annotation Grid**: partitions the captured point cloud's
//!   bounding volume into voxels and records which ones hold samples
//! - **Ray Queries**: nearest sample to a tap ray, voxel hit testing
//! - **Scan Lifecycle**: idle → scanning → testing state machine driven by
//!   tracking quality, detections and liveness watchdogs
//! - **Persistence**: compact binary model format behind a `ModelStore` trait
//!
//! ## Quick Start
//!
//! ```rust
//! use pratibimba::core::{BoundingVolume, Point3};
//! use pratibimba::lifecycle::{
//!     LifecycleConfig, LifecycleEvent, LifecyclePhase, ScanLifecycle, TrackingState,
//! };
//!
//! let events: Vec<LifecycleEvent> = Vec::new();
//! let mut lifecycle = ScanLifecycle::new(LifecycleConfig::default(), events);
//!
//! // Tracking becomes normal: Idle -> Scanning.Ready
//! lifecycle.on_tracking(TrackingState::Normal);
//!
//! // Ready -> DefineBounds, place the volume, DefineBounds -> Capture
//! lifecycle.next().unwrap();
//! let volume = BoundingVolume::new(Point3::ZERO, Point3::splat(0.3)).unwrap();
//! lifecycle.set_bounding_volume(volume).unwrap();
//! lifecycle.next().unwrap();
//!
//! lifecycle.on_point_cloud(&[Point3::new(0.05, 0.0, 0.1), Point3::new(-0.1, 0.1, 0.0)]);
//!
//! // Capture -> Testing builds the voxel grid
//! lifecycle.next().unwrap();
//! assert_eq!(lifecycle.phase(), LifecyclePhase::Testing);
//! let grid = lifecycle.session().unwrap().grid().unwrap();
//! assert_eq!(grid.occupied_count(), 2);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: geometry types (Point3, BoundingVolume, Ray3, VoxelIndex)
//! - [`grid`]: voxel grid builder and sizing rules
//! - [`query`]: closest point to ray, containment, ray/box intersection
//! - [`annotation`]: sequentially numbered annotations on occupied voxels
//! - [`detection`]: detection delay statistics
//! - [`timers`]: deadline watchdogs and clocks
//! - [`session`]: one capture attempt and its reference object
//! - [`lifecycle`]: the scan/test state machine and its events
//! - [`io`]: model format and stores
//! - [`config`]: YAML configuration
//!
//! ## Data Flow
//!
//! ```text
//!   tracking / point clouds / detections / taps
//!                      │
//!                      ▼
//!              ┌────────────────┐   PhaseChanged, PromptRaised,
//!              │ ScanLifecycle  │──► Advisory, DetectionRecorded ...
//!              └───────┬────────┘         (EventSink)
//!                      │ enter Testing
//!                      ▼
//!              ┌────────────────┐      ┌────────────────┐
//!              │   VoxelGrid    │◄─────│ AnnotationIndex│ hit_test
//!              └───────┬────────┘      └────────────────┘
//!                      │ export
//!                      ▼
//!              ┌────────────────┐
//!              │   ModelStore   │
//!              └────────────────┘
//! ```

pub mod annotation;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod grid;
pub mod io;
pub mod lifecycle;
pub mod query;
pub mod session;
pub mod timers;

// Re-export main types at crate root
pub use config::{ConfigLoadError, PratibimbaConfig};
pub use error::{Precondition, Result, ScanError};
pub use grid::{VoxelGrid, VoxelSizing};
pub use lifecycle::{EventSink, LifecycleConfig, LifecycleEvent, LifecyclePhase, ScanLifecycle};
pub use session::{ReferenceObject, ScanSession};
