//! Scan lifecycle controller.

use log::{debug, info, warn};

use super::config::LifecycleConfig;
use super::events::{EventSink, LifecycleEvent};
use super::state::{
    Advisory, LifecyclePhase, LimitedReason, Prompt, ScanningSubPhase, TrackingState,
};
use crate::annotation::{Annotation, AnnotationIndex, hit_test};
use crate::core::{BoundingVolume, Point3, Ray3};
use crate::detection::{DetectionEvent, DetectionStats, ReferenceId};
use crate::error::{Precondition, Result, ScanError};
use crate::grid::VoxelGrid;
use crate::io::{ModelStore, ReferenceModel};
use crate::query::{ClosestPoint, closest_point};
use crate::session::{ReferenceObject, ScanSession};
use crate::timers::{Clock, SystemClock, Watchdogs};

use LifecyclePhase::{Idle, NotReady, Scanning, Testing};
use ScanningSubPhase::{AdjustOrigin, Capture, DefineBounds, Ready};

/// Everything needed to enter Testing, prepared before the phase changes.
struct TestSetup {
    reference: ReferenceObject,
    grid: VoxelGrid,
    external: bool,
}

/// Scan lifecycle state machine.
///
/// Drives one object from idle through scanning to testing. All inputs
/// (user commands, tracking signals, point clouds, detections and timer
/// ticks) come in through `&mut self` methods; outputs go to the injected
/// [`EventSink`].
///
/// Phase rules:
///
/// ```text
///  Idle ──next──▶ NotReady ──next/Normal──▶ Scanning.Ready
///                                               │ next
///                                               ▼
///  Testing ◀──next── Scanning.Capture ◀──next── Scanning.DefineBounds
///     ▲                  │ adjust_origin
///     └──────next─── Scanning.AdjustOrigin
/// ```
///
/// A phase set is always completed (guards, exit and entry side effects)
/// before `PhaseChanged` is emitted. A refused set leaves every field as
/// it was.
pub struct ScanLifecycle<S: EventSink, C: Clock = SystemClock> {
    /// Current phase
    phase: LifecyclePhase,
    /// Last tracking signal
    tracking: TrackingState,
    /// Configuration
    config: LifecycleConfig,
    /// Event output
    sink: S,
    /// Time source for watchdogs and detection delays
    clock: C,
    /// Liveness watchdogs
    watchdogs: Watchdogs,
    /// Current capture attempt
    session: Option<ScanSession>,
    /// Externally supplied reference waiting to enter Testing
    reference_to_test: Option<ReferenceObject>,
    /// Annotations restored together with `reference_to_test`
    annotations_to_restore: Option<AnnotationIndex>,
    /// Previous scan to merge into the next captured reference
    reference_to_merge: Option<ReferenceObject>,
    /// Question waiting for the user
    pending_prompt: Option<Prompt>,
    /// Id for the next captured reference
    next_reference_id: u64,
}

impl<S: EventSink> ScanLifecycle<S, SystemClock> {
    /// Create a lifecycle on the wall clock
    pub fn new(config: LifecycleConfig, sink: S) -> Self {
        Self::with_clock(config, sink, SystemClock)
    }
}

impl<S: EventSink, C: Clock> ScanLifecycle<S, C> {
    /// Create a lifecycle with an explicit clock
    pub fn with_clock(config: LifecycleConfig, sink: S, clock: C) -> Self {
        let watchdogs = Watchdogs::new(&config.watchdogs);
        Self {
            phase: Idle,
            tracking: TrackingState::NotAvailable,
            config,
            sink,
            clock,
            watchdogs,
            session: None,
            reference_to_test: None,
            annotations_to_restore: None,
            reference_to_merge: None,
            pending_prompt: None,
            next_reference_id: 1,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current phase
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Last tracking signal
    pub fn tracking(&self) -> TrackingState {
        self.tracking
    }

    /// Current scan session
    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    /// Prompt waiting for confirmation
    pub fn pending_prompt(&self) -> Option<Prompt> {
        self.pending_prompt
    }

    /// True if the next captured reference will be merged with a previous one
    pub fn is_merging(&self) -> bool {
        self.reference_to_merge.is_some()
    }

    /// Configuration
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Watchdogs
    pub fn watchdogs(&self) -> &Watchdogs {
        &self.watchdogs
    }

    /// Event sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable event sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Advance to the next phase.
    ///
    /// In Testing this requests an export instead of changing phase.
    pub fn next(&mut self) -> Result<()> {
        match self.phase {
            Idle => self.apply_phase(NotReady),
            NotReady => {
                if !self.tracking.is_normal() {
                    debug!(
                        "[Lifecycle] next: waiting for normal tracking ({:?})",
                        self.tracking
                    );
                    return Err(ScanError::TrackingUnavailable);
                }
                self.apply_phase(Scanning(Ready))
            }
            Scanning(Ready) => self.apply_phase(Scanning(DefineBounds)),
            Scanning(DefineBounds) => self.apply_phase(Scanning(Capture)),
            Scanning(Capture) | Scanning(AdjustOrigin) => self.apply_phase(Testing),
            Testing => {
                info!("[Lifecycle] Export requested");
                self.sink.emit(LifecycleEvent::ExportRequested);
                Ok(())
            }
        }
    }

    /// Go back one phase.
    ///
    /// From Scanning.Ready this is a restart request.
    pub fn previous(&mut self) -> Result<()> {
        match self.phase {
            Idle => Ok(()),
            NotReady => self.apply_phase(Idle),
            Scanning(Ready) => self.restart(),
            Scanning(DefineBounds) => self.apply_phase(Scanning(Ready)),
            Scanning(Capture) => self.apply_phase(Scanning(DefineBounds)),
            Scanning(AdjustOrigin) => self.apply_phase(Scanning(Capture)),
            Testing => self.apply_phase(Scanning(Capture)),
        }
    }

    /// Start over.
    ///
    /// Asks for confirmation when there is work to lose (a bounding volume
    /// or a test run), otherwise goes straight to Idle.
    pub fn restart(&mut self) -> Result<()> {
        let has_work = self
            .session
            .as_ref()
            .is_some_and(|s| s.bounding_volume().is_some() || s.is_testing());
        if has_work {
            self.raise_prompt(Prompt::RestartScan);
            Ok(())
        } else {
            self.apply_phase(Idle)
        }
    }

    /// The app returned from the background.
    pub fn back_from_background(&mut self) {
        if self.phase.is_scanning() {
            self.raise_prompt(Prompt::ScanInterrupted);
        }
    }

    /// Confirm the pending prompt.
    pub fn confirm_prompt(&mut self) -> Result<()> {
        let Some(prompt) = self.pending_prompt.take() else {
            return self.refuse(Precondition::NoPendingPrompt);
        };
        info!("[Lifecycle] Prompt confirmed: {:?}", prompt);
        match prompt {
            Prompt::RestartScan | Prompt::LimitedTracking => self.apply_phase(Idle),
            Prompt::TrackingGap | Prompt::ScanInterrupted => self.apply_phase(NotReady),
        }
    }

    /// Decline the pending prompt.
    pub fn decline_prompt(&mut self) -> Result<()> {
        let Some(prompt) = self.pending_prompt.take() else {
            return self.refuse(Precondition::NoPendingPrompt);
        };
        info!("[Lifecycle] Prompt declined: {:?}", prompt);
        if prompt == Prompt::TrackingGap && self.phase.is_capturing() {
            self.watchdogs.limited_tracking.arm(self.clock.now());
        }
        Ok(())
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Handle a tracking quality signal.
    ///
    /// Repeats of the current signal are ignored.
    pub fn on_tracking(&mut self, state: TrackingState) {
        if state == self.tracking {
            return;
        }
        debug!(
            "[Lifecycle] Tracking {:?} -> {:?} in {}",
            self.tracking, state, self.phase
        );
        self.tracking = state;

        match state {
            TrackingState::NotAvailable => {
                if !matches!(self.phase, Idle | Testing) {
                    self.set_phase(Idle);
                }
            }
            TrackingState::Limited(reason) => match self.phase {
                Idle | Scanning(Ready) => self.set_phase(NotReady),
                phase if phase.is_capturing() => {
                    if reason == LimitedReason::Relocalizing {
                        if self.pending_prompt != Some(Prompt::TrackingGap) {
                            self.raise_prompt(Prompt::TrackingGap);
                        }
                    } else if !self.watchdogs.limited_tracking.is_armed() {
                        self.watchdogs.limited_tracking.arm(self.clock.now());
                    }
                }
                _ => {}
            },
            TrackingState::Normal => {
                self.watchdogs.limited_tracking.cancel();
                if matches!(self.phase, Idle | NotReady) {
                    self.set_phase(Scanning(Ready));
                }
            }
        }
    }

    /// Feed one frame of feature points.
    ///
    /// Only used in Scanning.Capture: points inside the bounding volume are
    /// added to the session. Returns how many were added.
    pub fn on_point_cloud(&mut self, points: &[Point3]) -> usize {
        if self.phase != Scanning(Capture) {
            return 0;
        }
        let max_points = self.config.max_reference_points;
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        let added = session.add_points(points, max_points);
        if added > 0 {
            debug!(
                "[Lifecycle] Captured {} points ({} total)",
                added,
                session.captured_points().len()
            );
        }
        added
    }

    /// Handle a detection of a reference object.
    ///
    /// Ignored outside Testing and for objects other than the one under
    /// test. Returns the recorded delay in seconds.
    pub fn on_detection(&mut self, event: DetectionEvent) -> Option<f64> {
        if self.phase != Testing {
            return None;
        }
        let session = self.session.as_mut()?;
        let expected = session.reference()?.id;
        if event.reference != expected {
            debug!(
                "[Lifecycle] Ignoring detection of {} (testing {})",
                event.reference, expected
            );
            return None;
        }

        let started = session.detection_started()?;
        let delay = match event.timestamp.checked_duration_since(started) {
            Some(d) => d.as_secs_f64(),
            None => -started.duration_since(event.timestamp).as_secs_f64(),
        };

        let stats = session.statistics_mut();
        stats.record_detection(delay);
        let recorded = stats.last_delay();
        let display_secs = stats.recommended_display_duration();
        let summary = stats.summary();
        session.restart_detection(event.timestamp);

        self.watchdogs.no_detection.arm(self.clock.now());
        info!("[Lifecycle] {}", summary);
        self.sink.emit(LifecycleEvent::DetectionRecorded {
            delay_secs: recorded,
            display_secs,
            summary,
        });
        Some(recorded)
    }

    /// Poll the watchdogs. Call regularly (e.g. once per frame).
    pub fn tick(&mut self) {
        let now = self.clock.now();

        if self.watchdogs.no_detection.poll(now) && self.phase == Testing {
            self.advise(Advisory::NoDetection);
        }

        if self.watchdogs.max_scan.poll(now) && self.phase == Scanning(Capture) {
            let elapsed_secs = self.watchdogs.max_scan.timeout().as_secs_f64();
            self.advise(Advisory::ScanTooLong { elapsed_secs });
        }

        if self.watchdogs.limited_tracking.poll(now) && self.phase.is_capturing() {
            self.raise_prompt(Prompt::LimitedTracking);
        }
    }

    // ========================================================================
    // Capture
    // ========================================================================

    /// Set the bounding volume of the object being scanned.
    pub fn set_bounding_volume(&mut self, volume: BoundingVolume) -> Result<()> {
        if !self.phase.is_capturing() {
            return self.refuse(Precondition::WrongPhase { phase: self.phase });
        }
        let Some(session) = self.session.as_mut() else {
            return self.refuse(Precondition::NoSession);
        };
        debug!(
            "[Lifecycle] Bounding volume center {:?} extent {:?}",
            volume.center(),
            volume.extent()
        );
        session.set_bounding_volume(volume);
        Ok(())
    }

    /// Switch from capturing points to adjusting the object origin.
    pub fn adjust_origin(&mut self) -> Result<()> {
        if self.phase != Scanning(Capture) {
            return self.refuse(Precondition::WrongPhase { phase: self.phase });
        }
        self.apply_phase(Scanning(AdjustOrigin))
    }

    /// Set the object origin.
    pub fn set_origin(&mut self, origin: Point3) -> Result<()> {
        if !self.phase.is_capturing() {
            return self.refuse(Precondition::WrongPhase { phase: self.phase });
        }
        let Some(session) = self.session.as_mut() else {
            return self.refuse(Precondition::NoSession);
        };
        session.set_origin(origin);
        Ok(())
    }

    // ========================================================================
    // Testing
    // ========================================================================

    /// Test an externally supplied reference object, from any phase.
    ///
    /// Starts a fresh session built from the reference.
    pub fn test_reference(&mut self, reference: ReferenceObject) -> Result<()> {
        self.start_external_test(reference, None)
    }

    /// Test a stored model, restoring its annotations.
    pub fn test_model(&mut self, model: ReferenceModel) -> Result<()> {
        let annotations = AnnotationIndex::from_annotations(model.annotations);
        self.start_external_test(model.reference, Some(annotations))
    }

    /// Keep the tested reference and start a new scan to merge with it.
    pub fn merge_new_scan(&mut self) -> Result<()> {
        if self.phase != Testing {
            return self.refuse(Precondition::WrongPhase { phase: self.phase });
        }
        let Some(reference) = self.session.as_ref().and_then(|s| s.reference()).cloned() else {
            return self.refuse(Precondition::NoTestRun);
        };
        info!(
            "[Lifecycle] Merging: keeping {} ({} points) for the next scan",
            reference.id,
            reference.points.len()
        );
        self.reference_to_merge = Some(reference);
        self.apply_phase(Idle)
    }

    /// Annotate the occupied voxel hit by a tap ray.
    ///
    /// Returns `None` if the ray hits no occupied voxel.
    pub fn annotate(&mut self, ray: &Ray3) -> Result<Option<Annotation>> {
        if self.phase != Testing {
            return self.refuse(Precondition::WrongPhase { phase: self.phase });
        }
        let Some(session) = self.session.as_mut() else {
            return self.refuse(Precondition::NoTestRun);
        };
        let Some(grid) = session.grid() else {
            return self.refuse(Precondition::NoTestRun);
        };

        let Some(hit) = hit_test(grid, ray) else {
            debug!("[Lifecycle] Tap missed all occupied voxels");
            return Ok(None);
        };
        let annotation = session.annotations_mut().add_annotation(hit.voxel);
        info!(
            "[Lifecycle] Annotation {} at voxel {:?}",
            annotation.sequence_number, annotation.anchor_voxel
        );
        Ok(Some(annotation))
    }

    /// Reference point nearest a tap ray.
    pub fn closest_reference_point(&mut self, ray: &Ray3) -> Result<ClosestPoint> {
        if self.phase != Testing {
            return self.refuse(Precondition::WrongPhase { phase: self.phase });
        }
        let Some(reference) = self.session.as_ref().and_then(|s| s.reference()) else {
            return self.refuse(Precondition::NoTestRun);
        };
        closest_point(&reference.points, ray)
    }

    /// How long a detection result should stay visible (seconds)
    pub fn recommended_display_duration(&self) -> f64 {
        match &self.session {
            Some(session) => session.statistics().recommended_display_duration(),
            None => self.config.display_buffer_secs,
        }
    }

    /// Detection statistics summary line
    pub fn statistics_summary(&self) -> String {
        match &self.session {
            Some(session) => session.statistics().summary(),
            None => DetectionStats::new(self.config.display_buffer_secs).summary(),
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save the reference under test.
    pub fn export<M: ModelStore>(&mut self, store: &mut M, name: &str) -> Result<()> {
        if self.phase != Testing {
            return self.refuse(Precondition::WrongPhase { phase: self.phase });
        }
        let Some(session) = self.session.as_ref() else {
            return self.refuse(Precondition::NoTestRun);
        };
        let Some(reference) = session.reference() else {
            return self.refuse(Precondition::NoTestRun);
        };
        let model = ReferenceModel {
            reference: reference.clone(),
            grid: session.grid().cloned(),
            annotations: session.annotations().annotations().to_vec(),
        };
        store.save(name, &model)?;
        info!(
            "[Lifecycle] Exported {} as '{}' ({} points, {} annotations)",
            model.reference.id,
            name,
            model.reference.points.len(),
            model.annotations.len()
        );
        Ok(())
    }

    /// Load a stored model and start testing it.
    pub fn load_reference<M: ModelStore>(&mut self, store: &mut M, name: &str) -> Result<()> {
        let model = store.load(name)?;
        info!("[Lifecycle] Loaded '{}' ({})", name, model.reference.id);
        self.test_model(model)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn start_external_test(
        &mut self,
        reference: ReferenceObject,
        annotations: Option<AnnotationIndex>,
    ) -> Result<()> {
        let previous_reference = self.reference_to_test.replace(reference);
        let previous_annotations = std::mem::replace(&mut self.annotations_to_restore, annotations);

        let result = self.apply_phase(Testing);
        if result.is_err() {
            self.reference_to_test = previous_reference;
            self.annotations_to_restore = previous_annotations;
        }
        result
    }

    /// Set a phase that cannot be refused (Idle, NotReady, Scanning.Ready).
    fn set_phase(&mut self, phase: LifecyclePhase) {
        if let Err(e) = self.apply_phase(phase) {
            warn!("[Lifecycle] Could not enter {}: {}", phase, e);
        }
    }

    fn apply_phase(&mut self, requested: LifecyclePhase) -> Result<()> {
        let target = self.guard(requested);
        let setup = if target == Testing {
            Some(self.prepare_test()?)
        } else {
            None
        };

        let from = self.phase;
        self.exit_phase(from, target);
        // A requested NotReady drops the scan even when the guard upgrades it
        if requested == NotReady {
            self.session = None;
        }
        self.phase = target;
        self.pending_prompt = None;
        self.enter_phase(target, setup);

        info!("[Lifecycle] {} -> {}", from, target);
        self.sink.emit(LifecycleEvent::PhaseChanged { from, to: target });
        Ok(())
    }

    /// Re-evaluate tracking guards on the requested phase.
    fn guard(&self, requested: LifecyclePhase) -> LifecyclePhase {
        match requested {
            NotReady if self.tracking.is_normal() => Scanning(Ready),
            Scanning(Ready) if !self.tracking.is_normal() => NotReady,
            other => other,
        }
    }

    fn prepare_test(&mut self) -> Result<TestSetup> {
        let (reference, external) = match self.reference_to_test.clone() {
            Some(reference) => (reference, true),
            None => {
                let id = ReferenceId(self.next_reference_id);
                let captured = self
                    .session
                    .as_ref()
                    .and_then(|s| s.capture_reference(id));
                let Some(reference) = captured else {
                    return self.refuse(Precondition::MissingBoundingVolume);
                };
                let reference = match &self.reference_to_merge {
                    Some(base) => reference.merged_with(base),
                    None => reference,
                };
                (reference, false)
            }
        };

        let grid = VoxelGrid::build_with(&reference.points, &reference.volume, &self.config.sizing)
            .inspect_err(|e| warn!("[Lifecycle] Cannot build grid for {}: {}", reference.id, e))?;

        Ok(TestSetup {
            reference,
            grid,
            external,
        })
    }

    fn exit_phase(&mut self, from: LifecyclePhase, to: LifecyclePhase) {
        if from == Scanning(Capture) && to != from {
            self.watchdogs.max_scan.cancel();
        }
        if from.is_capturing() && !to.is_capturing() {
            self.watchdogs.limited_tracking.cancel();
        }
        if from == Testing {
            self.watchdogs.no_detection.cancel();
            if let Some(session) = self.session.as_mut() {
                session.end_test();
            }
        }
    }

    fn enter_phase(&mut self, phase: LifecyclePhase, setup: Option<TestSetup>) {
        match phase {
            Idle => {
                // Tracking restarts with the session, so the next Normal counts
                self.tracking = TrackingState::NotAvailable;
                self.watchdogs.cancel_all();
                self.session = None;
                self.reference_to_test = None;
                self.annotations_to_restore = None;
            }
            NotReady => {}
            Scanning(sub) => {
                if self.session.is_none() {
                    self.session = Some(ScanSession::new(self.config.display_buffer_secs));
                }
                if sub == Capture {
                    self.watchdogs.max_scan.arm(self.clock.now());
                }
            }
            Testing => {
                if let Some(setup) = setup {
                    self.begin_test(setup);
                }
            }
        }
    }

    fn begin_test(&mut self, setup: TestSetup) {
        let TestSetup {
            reference,
            grid,
            external,
        } = setup;

        if external {
            let mut session = ScanSession::from_reference(&reference, self.config.display_buffer_secs);
            if let Some(annotations) = self.annotations_to_restore.take() {
                session.set_annotations(annotations);
            }
            self.session = Some(session);
            self.next_reference_id = self.next_reference_id.max(reference.id.0 + 1);
        } else {
            self.next_reference_id += 1;
            self.reference_to_merge = None;
        }
        self.reference_to_test = None;

        info!(
            "[Lifecycle] Testing {}: {} points, {}/{} voxels occupied",
            reference.id,
            reference.points.len(),
            grid.occupied_count(),
            grid.total_voxels()
        );

        let now = self.clock.now();
        if let Some(session) = self.session.as_mut() {
            session.begin_test(reference, grid, now);
        }
        self.watchdogs.no_detection.arm(now);
    }

    fn raise_prompt(&mut self, prompt: Prompt) {
        info!("[Lifecycle] Prompt: {:?}", prompt);
        self.pending_prompt = Some(prompt);
        self.sink.emit(LifecycleEvent::PromptRaised(prompt));
    }

    fn advise(&mut self, advisory: Advisory) {
        info!("[Lifecycle] Advisory: {}", advisory.message());
        self.sink.emit(LifecycleEvent::Advisory {
            advisory,
            display_secs: self.config.advisory_display.as_secs_f64(),
        });
    }

    fn refuse<T>(&mut self, precondition: Precondition) -> Result<T> {
        warn!("[Lifecycle] Refused in {}: {}", self.phase, precondition);
        self.sink.emit(LifecycleEvent::PreconditionFailed(precondition.clone()));
        Err(ScanError::PreconditionFailed(precondition))
    }
}
