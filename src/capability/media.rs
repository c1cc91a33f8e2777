//! Media capture capability.

use crate::constraints::{infer_facing, Facing, StreamConstraints};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by capture capabilities.
///
/// These stay below the strategy boundary: a [`crate::session::ScanSession`]
/// translates them into its own failure taxonomy before they reach
/// application code.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The user or the platform refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,
    /// The requested constraints cannot be satisfied by any device.
    #[error("constraints not satisfiable: {0}")]
    ConstraintUnsatisfiable(String),
    /// The hardware is held by another consumer.
    #[error("capture hardware busy")]
    HardwareBusy,
    /// No device matches the request.
    #[error("capture device not found: {0}")]
    DeviceNotFound(String),
    /// The capture capability does not exist in this environment.
    #[error("capture capability unavailable")]
    Unsupported,
    /// The video surface failed to start playing.
    #[error("surface playback failed: {0}")]
    Playback(String),
    /// Device enumeration failed.
    #[error("device enumeration failed: {0}")]
    Enumeration(String),
}

/// Kind of capture device reported by enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// A camera.
    VideoInput,
    /// Anything else (microphones, speakers); ignored by this core.
    Other,
}

/// One enumerated capture device.
///
/// Discovered per scan session and never persisted. Labels may be blank
/// before the user grants camera permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Opaque device identifier, usable in an exact-device constraint.
    pub id: String,
    /// Human-readable label, possibly empty.
    pub label: String,
    /// Device kind.
    pub kind: DeviceKind,
}

impl DeviceInfo {
    /// A video-input device with the given id and label.
    pub fn video(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: DeviceKind::VideoInput,
        }
    }

    /// Facing inferred from this device's label.
    pub fn facing(&self) -> Facing {
        infer_facing(&self.label)
    }
}

/// A live capture stream handed out by a [`MediaProvider`].
///
/// Shared between the owning stream session and the video surface it
/// feeds; stopping tracks is idempotent.
pub trait MediaStream: Send + Sync {
    /// Opaque stream identifier.
    fn id(&self) -> &str;

    /// Whether any track is still live.
    fn is_live(&self) -> bool;

    /// Stops every track. No-op if already stopped.
    fn stop_tracks(&self);
}

/// The platform's media capture capability.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Whether stream acquisition exists at all in this environment.
    fn capture_supported(&self) -> bool;

    /// Requests a capture stream satisfying `constraints`.
    ///
    /// The provider may honor numeric constraints approximately but
    /// must reject unsatisfiable facing or device-id requests with
    /// [`CaptureError::ConstraintUnsatisfiable`] or
    /// [`CaptureError::DeviceNotFound`].
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError>;

    /// Lists capture devices.
    ///
    /// Callers treat this as best-effort: enumeration failures fall
    /// back to constraint-based selection.
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, CaptureError>;
}
