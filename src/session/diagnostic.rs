//! Point-in-time capability diagnostics.

use crate::capability::{DeviceKind, FrameDecoder, MediaProvider};
use crate::platform::{Environment, Platform};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of the environment and capability state.
///
/// Best-effort: device enumeration failure is recorded as text rather
/// than failing the report. No lifecycle beyond the call that produced
/// it.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// Environment identification string.
    pub identification: String,
    /// Platform classification.
    pub platform: Platform,
    /// URI scheme of the embedding context.
    pub scheme: String,
    /// Hostname of the embedding context.
    pub hostname: String,
    /// Whether camera acquisition is permitted in this context.
    pub secure_context: bool,
    /// Whether the capture capability exists.
    pub capture_supported: bool,
    /// Whether the frame-decoding capability exists.
    pub decoder_available: bool,
    /// Number of video-input devices, when enumeration succeeded.
    pub video_devices: Option<usize>,
    /// Enumeration failure text, when it did not.
    pub enumeration_error: Option<String>,
}

impl DiagnosticReport {
    /// Collects a snapshot from the given environment and capabilities.
    pub async fn collect(
        env: &Environment,
        media: &dyn MediaProvider,
        decoder: &dyn FrameDecoder,
    ) -> Self {
        let (video_devices, enumeration_error) = match media.enumerate_devices().await {
            Ok(devices) => (
                Some(
                    devices
                        .iter()
                        .filter(|d| d.kind == DeviceKind::VideoInput)
                        .count(),
                ),
                None,
            ),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            captured_at: Utc::now(),
            identification: env.identification.clone(),
            platform: env.platform(),
            scheme: env.scheme.clone(),
            hostname: env.hostname.clone(),
            secure_context: env.is_secure_context(),
            capture_supported: media.capture_supported(),
            decoder_available: decoder.available(),
            video_devices,
            enumeration_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::mock::{DecodeSchedule, ScriptedDecoder, ScriptedMedia};
    use crate::capability::{CaptureError, DeviceInfo};

    #[tokio::test]
    async fn reports_capabilities_and_device_count() {
        let media = ScriptedMedia::granting().with_devices(vec![
            DeviceInfo::video("1", "Front Camera"),
            DeviceInfo::video("2", "Back Camera"),
        ]);
        let decoder = ScriptedDecoder::new(DecodeSchedule::Never, "");
        let env = Environment::new("Linux; Android 14", "https", "tickets.example.com");

        let report = DiagnosticReport::collect(&env, &media, &decoder).await;
        assert_eq!(report.platform, Platform::Android);
        assert!(report.secure_context);
        assert!(report.capture_supported);
        assert!(report.decoder_available);
        assert_eq!(report.video_devices, Some(2));
        assert!(report.enumeration_error.is_none());
    }

    #[tokio::test]
    async fn enumeration_failure_is_recorded_not_raised() {
        let media = ScriptedMedia::granting()
            .with_enumeration_error(CaptureError::Enumeration("not allowed".into()));
        let decoder = ScriptedDecoder::unavailable();
        let env = Environment::new("", "http", "tickets.example.com");

        let report = DiagnosticReport::collect(&env, &media, &decoder).await;
        assert!(!report.secure_context);
        assert!(!report.decoder_available);
        assert_eq!(report.video_devices, None);
        assert!(report.enumeration_error.unwrap().contains("not allowed"));
    }
}
