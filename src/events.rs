//! Structured scan-session events.
//!
//! State transitions are emitted as values to an injected sink rather
//! than being interleaved with control flow as log lines. The core does
//! not depend on any particular sink; [`TracingSink`] forwards to
//! `tracing` and [`RecordingSink`] captures an ordered log for tests.

use crate::platform::Platform;

/// A state transition or notable moment in a scan session's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A session began its start sequence.
    SessionStarting {
        /// Classified platform.
        platform: Platform,
    },
    /// Device enumeration completed.
    DevicesEnumerated {
        /// Number of video-input devices found.
        video_devices: usize,
    },
    /// Device enumeration failed; selection falls through to
    /// constraint-based heuristics.
    EnumerationFailed {
        /// Capability-level failure text.
        reason: String,
    },
    /// A constraint set was selected for acquisition.
    ConstraintSelected {
        /// Display form of the selected constraints.
        constraints: String,
    },
    /// One acquisition attempt is about to run.
    AcquisitionAttempt {
        /// 1-based attempt number within the session.
        attempt: u32,
        /// Display form of the constraints in effect.
        constraints: String,
    },
    /// An acquisition attempt failed.
    AcquisitionFailed {
        /// 1-based attempt number within the session.
        attempt: u32,
        /// Capability-level failure text.
        reason: String,
    },
    /// The video surface reached its playing state.
    SurfaceReady,
    /// The decode engine began sampling frames.
    ScanningStarted,
    /// A payload was decoded.
    Decoded {
        /// The decoded payload.
        payload: String,
    },
    /// Capture and decoding were torn down.
    SessionTornDown,
    /// The caller's result callback was invoked.
    ResultDelivered,
    /// The session start sequence failed terminally.
    SessionFailed {
        /// Failure taxonomy name.
        reason: String,
    },
    /// The session was stopped explicitly.
    SessionStopped,
}

/// Receiver for [`ScanEvent`]s.
pub trait EventSink: Send + Sync {
    /// Consumes one event. Must not block.
    fn emit(&self, event: &ScanEvent);
}

/// Sink that forwards events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ScanEvent) {
        match event {
            ScanEvent::AcquisitionFailed { attempt, reason } => {
                tracing::warn!(attempt, %reason, "camera acquisition attempt failed");
            }
            ScanEvent::EnumerationFailed { reason } => {
                tracing::warn!(%reason, "device enumeration failed");
            }
            ScanEvent::SessionFailed { reason } => {
                tracing::warn!(%reason, "scan session failed");
            }
            other => {
                tracing::debug!(event = ?other, "scan event");
            }
        }
    }
}

/// Sink that records events in order, for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: std::sync::Mutex<Vec<ScanEvent>>,
}

impl RecordingSink {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything recorded so far, in emission order.
    pub fn snapshot(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Position of the first event matching `predicate`, if any.
    pub fn position(&self, predicate: impl Fn(&ScanEvent) -> bool) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| predicate(e))
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &ScanEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
