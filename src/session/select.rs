//! Constraint selection heuristics.

use crate::capability::{DeviceInfo, DeviceKind};
use crate::constraints::{Facing, FacingMode, StreamConstraints};
use crate::platform::Platform;

/// Selects the constraint set for a scan attempt.
///
/// Priority on mobile platforms: a device whose label reads as a back
/// camera, then the first enumerated video device, then a facing-only
/// request. Desktop classifications always get the engine default —
/// built-in webcams have no meaningful facing and desktop engines pick
/// a sensible device themselves.
///
/// `devices` may be empty (enumeration failed or found nothing); that
/// falls through to the constraint-only branches rather than erroring.
pub fn select_constraints(
    platform: Platform,
    preferred_facing: FacingMode,
    devices: &[DeviceInfo],
) -> StreamConstraints {
    if !platform.is_mobile() {
        return StreamConstraints::engine_default();
    }

    let videos: Vec<&DeviceInfo> = devices
        .iter()
        .filter(|d| d.kind == DeviceKind::VideoInput)
        .collect();

    if let Some(back) = videos.iter().find(|d| d.facing() == Facing::Back) {
        tracing::debug!(id = %back.id, label = %back.label, "selected back-labeled device");
        return StreamConstraints::device(back.id.clone());
    }

    if let Some(first) = videos.first() {
        tracing::debug!(id = %first.id, label = %first.label, "selected first enumerated device");
        return StreamConstraints::device(first.id.clone());
    }

    StreamConstraints::facing(preferred_facing)
}
