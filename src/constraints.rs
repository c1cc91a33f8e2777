//! Capture stream constraints.
//!
//! A constraint set is a request, not a guarantee: the capture
//! capability may honor it partially or reject it outright with
//! `ConstraintUnsatisfiable`, which triggers relaxation rather than a
//! user-visible failure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested camera facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front (selfie) camera.
    User,
    /// Back (world-facing) camera.
    Environment,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::User => f.write_str("user"),
            FacingMode::Environment => f.write_str("environment"),
        }
    }
}

/// Facing inferred from a device's human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Label suggests a front camera.
    Front,
    /// Label suggests a back camera.
    Back,
    /// Label gave no usable hint (common before permission is granted,
    /// when labels are blank).
    Unknown,
}

/// Back-camera label tokens, matched case-insensitively.
///
/// "trasera" shows up on Spanish-locale devices.
const BACK_TOKENS: [&str; 4] = ["back", "rear", "trasera", "environment"];
const FRONT_TOKENS: [&str; 3] = ["front", "frontal", "user"];

/// Infers camera facing from a device label.
pub fn infer_facing(label: &str) -> Facing {
    let label = label.to_lowercase();
    if BACK_TOKENS.iter().any(|t| label.contains(t)) {
        Facing::Back
    } else if FRONT_TOKENS.iter().any(|t| label.contains(t)) {
        Facing::Front
    } else {
        Facing::Unknown
    }
}

/// An ideal/max pair for a numeric constraint dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Preferred value; the capability gets as close as it can.
    pub ideal: u32,
    /// Hard upper bound, if any.
    pub max: Option<u32>,
}

impl ValueRange {
    /// A range with only an ideal value.
    pub fn ideal(ideal: u32) -> Self {
        Self { ideal, max: None }
    }

    /// A range with an ideal value and a hard maximum.
    pub fn ideal_max(ideal: u32, max: u32) -> Self {
        Self { ideal, max: Some(max) }
    }
}

/// A capture stream request.
///
/// The empty set is meaningful: it asks the capture engine to pick
/// everything itself (the "engine default" path used on desktop).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamConstraints {
    /// Requested facing mode, if any.
    pub facing: Option<FacingMode>,
    /// Exact device to open, overriding facing heuristics.
    pub device_id: Option<String>,
    /// Requested frame width in pixels.
    pub width: Option<ValueRange>,
    /// Requested frame height in pixels.
    pub height: Option<ValueRange>,
    /// Requested frame rate in frames per second.
    pub frame_rate: Option<ValueRange>,
    /// Requested width/height ratio of the capture frames.
    pub aspect_ratio: Option<f64>,
}

impl StreamConstraints {
    /// The engine-default request: no constraints at all.
    pub fn engine_default() -> Self {
        Self::default()
    }

    /// A facing-only request, the minimal set used for fallback.
    pub fn facing(mode: FacingMode) -> Self {
        Self {
            facing: Some(mode),
            ..Self::default()
        }
    }

    /// An exact-device request.
    pub fn device(id: impl Into<String>) -> Self {
        Self {
            device_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Whether this is the empty, engine-default request.
    pub fn is_engine_default(&self) -> bool {
        *self == Self::default()
    }

    /// Strips everything except the facing mode.
    ///
    /// This is the fallback applied after a tuned request fails: facing
    /// is the one constraint worth keeping; resolution, frame rate, and
    /// aspect ratio are the ones that get rejected.
    pub fn relaxed(&self) -> Self {
        match self.facing {
            Some(mode) => Self::facing(mode),
            None => Self::engine_default(),
        }
    }
}

impl fmt::Display for StreamConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_engine_default() {
            return f.write_str("engine-default");
        }
        let mut parts = Vec::new();
        if let Some(ref id) = self.device_id {
            parts.push(format!("device={id}"));
        }
        if let Some(mode) = self.facing {
            parts.push(format!("facing={mode}"));
        }
        if let Some(w) = self.width {
            parts.push(format!("width~{}", w.ideal));
        }
        if let Some(h) = self.height {
            parts.push(format!("height~{}", h.ideal));
        }
        if let Some(r) = self.frame_rate {
            parts.push(format!("fps~{}", r.ideal));
        }
        if let Some(ratio) = self.aspect_ratio {
            parts.push(format!("aspect~{ratio}"));
        }
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_inference_matches_common_labels() {
        assert_eq!(infer_facing("Back Camera"), Facing::Back);
        assert_eq!(infer_facing("camera2 0, facing back"), Facing::Back);
        assert_eq!(infer_facing("Cámara trasera"), Facing::Back);
        assert_eq!(infer_facing("Front Camera"), Facing::Front);
        assert_eq!(infer_facing(""), Facing::Unknown);
        assert_eq!(infer_facing("Integrated Webcam"), Facing::Unknown);
    }

    #[test]
    fn relaxed_keeps_only_facing() {
        let tuned = StreamConstraints {
            facing: Some(FacingMode::Environment),
            device_id: None,
            width: Some(ValueRange::ideal_max(1280, 1920)),
            height: Some(ValueRange::ideal_max(720, 1080)),
            frame_rate: Some(ValueRange::ideal(30)),
            aspect_ratio: Some(1.0),
        };
        assert_eq!(tuned.relaxed(), StreamConstraints::facing(FacingMode::Environment));
    }

    #[test]
    fn relaxed_without_facing_is_engine_default() {
        let tuned = StreamConstraints {
            width: Some(ValueRange::ideal(1280)),
            ..StreamConstraints::default()
        };
        assert!(tuned.relaxed().is_engine_default());
    }

    #[test]
    fn engine_default_is_empty() {
        assert!(StreamConstraints::engine_default().is_engine_default());
        assert!(!StreamConstraints::facing(FacingMode::Environment).is_engine_default());
    }
}
