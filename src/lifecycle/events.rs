//! Outbound lifecycle events and the sinks that receive them.

use crossbeam_channel::Sender;
use log::warn;

use super::state::{Advisory, LifecyclePhase, Prompt};
use crate::error::Precondition;

/// Event emitted by the lifecycle.
///
/// Events are emitted after the state they describe is fully applied, so a
/// sink that reads back from the lifecycle sees the new state.
#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleEvent {
    /// Phase changed (also emitted when a phase is re-entered)
    PhaseChanged {
        /// Previous phase
        from: LifecyclePhase,
        /// New phase
        to: LifecyclePhase,
    },

    /// Transient message to show
    Advisory {
        /// What to show
        advisory: Advisory,
        /// How long to show it (seconds)
        display_secs: f64,
    },

    /// User confirmation needed
    PromptRaised(Prompt),

    /// A command was refused
    PreconditionFailed(Precondition),

    /// User asked to export the tested reference object
    ExportRequested,

    /// Reference object detected during testing
    DetectionRecorded {
        /// Delay of this detection (seconds)
        delay_secs: f64,
        /// How long to show the detection (seconds)
        display_secs: f64,
        /// Statistics summary line
        summary: String,
    },
}

/// Receiver of lifecycle events
pub trait EventSink {
    /// Handle one event
    fn emit(&mut self, event: LifecycleEvent);
}

/// Collects events in order. Handy for tests and replays.
impl EventSink for Vec<LifecycleEvent> {
    fn emit(&mut self, event: LifecycleEvent) {
        self.push(event);
    }
}

/// Forwards events to another thread.
impl EventSink for Sender<LifecycleEvent> {
    fn emit(&mut self, event: LifecycleEvent) {
        if let Err(e) = self.send(event) {
            warn!("[Lifecycle] Event receiver dropped: {:?}", e.into_inner());
        }
    }
}

/// Discards all events
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: LifecycleEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards() {
        let (mut tx, rx) = crossbeam_channel::unbounded();
        tx.emit(LifecycleEvent::ExportRequested);
        assert_eq!(rx.try_recv(), Ok(LifecycleEvent::ExportRequested));
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (mut tx, rx) = crossbeam_channel::unbounded::<LifecycleEvent>();
        drop(rx);
        tx.emit(LifecycleEvent::ExportRequested);
    }
}
