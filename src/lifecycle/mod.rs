//! Scan/test lifecycle.
//!
//! Phases: `Idle → NotReady → Scanning(Ready → DefineBounds → Capture →
//! AdjustOrigin) → Testing`, driven by user commands, tracking quality,
//! detections and watchdog ticks. See [`ScanLifecycle`].

mod config;
mod events;
mod machine;
mod state;

pub use config::LifecycleConfig;
pub use events::{EventSink, LifecycleEvent, NullSink};
pub use machine::ScanLifecycle;
pub use state::{
    Advisory, LifecyclePhase, LimitedReason, Prompt, ScanningSubPhase, TrackingState,
};
