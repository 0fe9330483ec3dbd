//! Error types for Pratibimba

use crate::core::Point3;
use crate::io::ModelIoError;
use crate::lifecycle::LifecyclePhase;

/// Result type alias
pub type Result<T> = std::result::Result<T, ScanError>;

/// Pratibimba error types
///
/// Geometry and query errors are local to the call that raised them and
/// leave no state behind. Lifecycle errors leave the phase unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Bounding volume with a zero, negative or non-finite extent component
    #[error(
        "Degenerate volume: extent ({:.3}, {:.3}, {:.3}) has a zero or invalid axis",
        .extent.x,
        .extent.y,
        .extent.z
    )]
    DegenerateVolume {
        /// Offending extent
        extent: Point3,
    },

    /// Ray with a zero or non-finite direction
    #[error("Degenerate ray: direction must be non-zero")]
    DegenerateRay,

    /// Query against an empty point set
    #[error("Point set is empty")]
    EmptyPointSet,

    /// Lifecycle transition or command refused
    #[error("Precondition failed: {0}")]
    PreconditionFailed(Precondition),

    /// Tracking quality does not allow the requested transition
    #[error("Tracking unavailable: waiting for normal tracking")]
    TrackingUnavailable,

    /// Model store failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] ModelIoError),
}

/// Reason a lifecycle precondition was not met.
#[derive(Clone, Debug, PartialEq)]
pub enum Precondition {
    /// Testing needs a bounding volume or an externally supplied reference
    MissingBoundingVolume,

    /// Command needs an active test run (a built grid and reference)
    NoTestRun,

    /// Command needs an active scan session
    NoSession,

    /// Command not valid in the current phase
    WrongPhase {
        /// Phase the command was attempted in
        phase: LifecyclePhase,
    },

    /// Confirmation requested but no prompt is pending
    NoPendingPrompt,
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precondition::MissingBoundingVolume => write!(
                f,
                "scan is not ready to be tested: define a bounding volume or load a reference object"
            ),
            Precondition::NoTestRun => write!(f, "no test run is active"),
            Precondition::NoSession => write!(f, "no scan session is active"),
            Precondition::WrongPhase { phase } => {
                write!(f, "not allowed while {}", phase.name())
            }
            Precondition::NoPendingPrompt => write!(f, "no prompt is pending"),
        }
    }
}

impl ScanError {
    /// Short error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Self::DegenerateVolume { .. } => "DEGENERATE_VOLUME",
            Self::DegenerateRay => "DEGENERATE_RAY",
            Self::EmptyPointSet => "EMPTY_POINT_SET",
            Self::PreconditionFailed(_) => "PRECONDITION_FAILED",
            Self::TrackingUnavailable => "TRACKING_UNAVAILABLE",
            Self::Persistence(_) => "PERSISTENCE",
        }
    }
}
