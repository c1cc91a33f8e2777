//! Per-platform strategy variants.
//!
//! Mobile engines need inline-playback attributes and an explicit
//! facing request; iOS-class shells additionally want the legacy
//! vendor hints, while desktop engines are happiest with a bare
//! resolution preference and no facing at all.

use super::strategy::CameraStrategy;
use crate::capability::SurfaceAttributes;
use crate::constraints::{FacingMode, StreamConstraints, ValueRange};
use crate::platform::Platform;

fn merge_mobile(
    preferred: &StreamConstraints,
    frame_rate: ValueRange,
) -> StreamConstraints {
    StreamConstraints {
        // An exact-device preference overrides facing heuristics.
        facing: if preferred.device_id.is_some() {
            None
        } else {
            preferred.facing.or(Some(FacingMode::Environment))
        },
        device_id: preferred.device_id.clone(),
        width: Some(ValueRange::ideal_max(1280, 1920)),
        height: Some(ValueRange::ideal_max(720, 1080)),
        frame_rate: Some(frame_rate),
        aspect_ratio: preferred.aspect_ratio,
    }
}

fn minimal_mobile(preferred: &StreamConstraints) -> StreamConstraints {
    StreamConstraints {
        facing: preferred.facing.or(Some(FacingMode::Environment)),
        ..preferred.clone()
    }
    .relaxed()
}

/// iOS-class acquisition.
///
/// Relies on facing mode rather than device ids: iOS engines are more
/// reliable resolving "environment" themselves than honoring exact
/// device selection.
#[derive(Debug, Default)]
pub struct IosStrategy;

impl CameraStrategy for IosStrategy {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn tuned_constraints(&self, preferred: &StreamConstraints) -> StreamConstraints {
        merge_mobile(preferred, ValueRange::ideal_max(30, 60))
    }

    fn minimal_constraints(&self, preferred: &StreamConstraints) -> StreamConstraints {
        minimal_mobile(preferred)
    }

    fn surface_attributes(&self) -> SurfaceAttributes {
        SurfaceAttributes {
            autoplay: true,
            inline_playback: true,
            muted: true,
            // Without these, iOS-class shells take over the screen on play.
            legacy_inline_hints: true,
        }
    }
}

/// Android-class acquisition.
///
/// Benefits from exact back-camera device ids when label heuristics
/// succeed; facing mode is the fallback.
#[derive(Debug, Default)]
pub struct AndroidStrategy;

impl CameraStrategy for AndroidStrategy {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    fn tuned_constraints(&self, preferred: &StreamConstraints) -> StreamConstraints {
        merge_mobile(preferred, ValueRange::ideal(30))
    }

    fn minimal_constraints(&self, preferred: &StreamConstraints) -> StreamConstraints {
        minimal_mobile(preferred)
    }

    fn surface_attributes(&self) -> SurfaceAttributes {
        SurfaceAttributes::default()
    }
}

/// Desktop acquisition: resolution preference only.
#[derive(Debug, Default)]
pub struct DesktopStrategy;

impl CameraStrategy for DesktopStrategy {
    fn platform(&self) -> Platform {
        Platform::Desktop
    }

    fn tuned_constraints(&self, preferred: &StreamConstraints) -> StreamConstraints {
        StreamConstraints {
            facing: preferred.facing,
            device_id: preferred.device_id.clone(),
            width: Some(ValueRange::ideal(1280)),
            height: Some(ValueRange::ideal(720)),
            frame_rate: None,
            aspect_ratio: preferred.aspect_ratio,
        }
    }

    fn minimal_constraints(&self, preferred: &StreamConstraints) -> StreamConstraints {
        preferred.relaxed()
    }

    fn surface_attributes(&self) -> SurfaceAttributes {
        SurfaceAttributes::default()
    }
}

/// The strategy matching a platform classification.
pub fn strategy_for(platform: Platform) -> Box<dyn CameraStrategy> {
    match platform {
        Platform::Ios => Box::new(IosStrategy),
        Platform::Android => Box::new(AndroidStrategy),
        Platform::Desktop => Box::new(DesktopStrategy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ios_tuning_defaults_to_environment_facing() {
        let tuned = IosStrategy.tuned_constraints(&StreamConstraints::engine_default());
        assert_eq!(tuned.facing, Some(FacingMode::Environment));
        assert_eq!(tuned.width, Some(ValueRange::ideal_max(1280, 1920)));
        assert_eq!(tuned.frame_rate, Some(ValueRange::ideal_max(30, 60)));
        assert!(IosStrategy.surface_attributes().legacy_inline_hints);
    }

    #[test]
    fn android_device_preference_suppresses_facing() {
        let preferred = StreamConstraints::device("cam-2");
        let tuned = AndroidStrategy.tuned_constraints(&preferred);
        assert_eq!(tuned.device_id.as_deref(), Some("cam-2"));
        assert_eq!(tuned.facing, None);
        // Fallback drops the device id and asks for facing only.
        let minimal = AndroidStrategy.minimal_constraints(&preferred);
        assert_eq!(minimal, StreamConstraints::facing(FacingMode::Environment));
    }

    #[test]
    fn tuning_carries_the_requested_aspect_ratio() {
        let preferred = StreamConstraints {
            aspect_ratio: Some(1.0),
            ..StreamConstraints::facing(FacingMode::Environment)
        };
        for strategy in [strategy_for(Platform::Ios), strategy_for(Platform::Android)] {
            assert_eq!(strategy.tuned_constraints(&preferred).aspect_ratio, Some(1.0));
            assert!(strategy.minimal_constraints(&preferred).aspect_ratio.is_none());
        }
        let tuned = DesktopStrategy.tuned_constraints(&preferred);
        assert_eq!(tuned.aspect_ratio, Some(1.0));
    }

    #[test]
    fn desktop_tuning_has_no_facing_and_relaxes_to_default() {
        let tuned = DesktopStrategy.tuned_constraints(&StreamConstraints::engine_default());
        assert_eq!(tuned.facing, None);
        assert_eq!(tuned.width, Some(ValueRange::ideal(1280)));
        assert!(DesktopStrategy
            .minimal_constraints(&StreamConstraints::engine_default())
            .is_engine_default());
    }

    #[test]
    fn strategy_for_covers_every_platform() {
        for platform in [Platform::Ios, Platform::Android, Platform::Desktop] {
            assert_eq!(strategy_for(platform).platform(), platform);
        }
    }
}
