//! Lifecycle phases and the signals that drive them.

/// Sub-phase while scanning
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanningSubPhase {
    /// Tracking is good, waiting for the user to start
    Ready,
    /// User is placing the bounding volume
    DefineBounds,
    /// Collecting points inside the bounding volume
    Capture,
    /// User is moving the object origin
    AdjustOrigin,
}

impl ScanningSubPhase {
    /// Sub-phase name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ScanningSubPhase::Ready => "Ready",
            ScanningSubPhase::DefineBounds => "DefineBounds",
            ScanningSubPhase::Capture => "Capture",
            ScanningSubPhase::AdjustOrigin => "AdjustOrigin",
        }
    }
}

/// Global lifecycle phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LifecyclePhase {
    /// Nothing in progress
    #[default]
    Idle,

    /// Waiting for tracking to become normal
    NotReady,

    /// Building a reference object
    Scanning(ScanningSubPhase),

    /// Checking that the reference object can be re-detected
    Testing,
}

impl LifecyclePhase {
    /// Phase name for logging, e.g. `Scanning.Capture`
    pub fn name(&self) -> &'static str {
        match self {
            LifecyclePhase::Idle => "Idle",
            LifecyclePhase::NotReady => "NotReady",
            LifecyclePhase::Scanning(ScanningSubPhase::Ready) => "Scanning.Ready",
            LifecyclePhase::Scanning(ScanningSubPhase::DefineBounds) => "Scanning.DefineBounds",
            LifecyclePhase::Scanning(ScanningSubPhase::Capture) => "Scanning.Capture",
            LifecyclePhase::Scanning(ScanningSubPhase::AdjustOrigin) => "Scanning.AdjustOrigin",
            LifecyclePhase::Testing => "Testing",
        }
    }

    /// True in any scanning sub-phase
    pub fn is_scanning(&self) -> bool {
        matches!(self, LifecyclePhase::Scanning(_))
    }

    /// True in the sub-phases that work on a bounding volume
    /// (DefineBounds, Capture, AdjustOrigin)
    pub fn is_capturing(&self) -> bool {
        matches!(
            self,
            LifecyclePhase::Scanning(
                ScanningSubPhase::DefineBounds
                    | ScanningSubPhase::Capture
                    | ScanningSubPhase::AdjustOrigin
            )
        )
    }
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why tracking is limited
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LimitedReason {
    /// Tracker still starting up
    Initializing,
    /// Device moving too fast
    ExcessiveMotion,
    /// Not enough visual features
    InsufficientFeatures,
    /// Tracker lost its map and is recovering
    Relocalizing,
}

/// Tracking quality reported by the pose tracker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TrackingState {
    /// Tracking is good
    Normal,
    /// Tracking works with reduced quality
    Limited(LimitedReason),
    /// No tracking
    #[default]
    NotAvailable,
}

impl TrackingState {
    /// True for [`TrackingState::Normal`]
    pub fn is_normal(&self) -> bool {
        matches!(self, TrackingState::Normal)
    }
}

/// Question put to the user. At most one is pending at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    /// Discard the current scan? Confirm goes to Idle.
    RestartScan,
    /// Tracking was interrupted while capturing. Confirm goes to NotReady.
    TrackingGap,
    /// Tracking stayed limited while capturing. Confirm goes to Idle.
    LimitedTracking,
    /// App came back from the background mid-scan. Confirm goes to NotReady.
    ScanInterrupted,
}

impl Prompt {
    /// Text shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            Prompt::RestartScan => "The current scan will be lost. Restart?",
            Prompt::TrackingGap => {
                "Tracking was interrupted. Restart the scan, or keep going if the object did not move."
            }
            Prompt::LimitedTracking => {
                "Tracking is poor. Move the device more slowly or restart the scan."
            }
            Prompt::ScanInterrupted => "The scan was interrupted. Restart?",
        }
    }
}

/// Transient message shown for a while; never changes the phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advisory {
    /// Nothing was detected within the no-detection timeout
    NoDetection,
    /// Capture has run past the maximum scan time
    ScanTooLong {
        /// Seconds spent in capture
        elapsed_secs: f64,
    },
}

impl Advisory {
    /// Text shown to the user
    pub fn message(&self) -> String {
        match self {
            Advisory::NoDetection => "Shift the device's position, please".to_string(),
            Advisory::ScanTooLong { elapsed_secs } => format!(
                "Scanning for {:.0} s. Consider finishing the scan.",
                elapsed_secs
            ),
        }
    }
}
