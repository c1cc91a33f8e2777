//! Platform camera strategy.
//!
//! A strategy knows the constraint set worth asking its platform for
//! and the surface attributes that platform needs for inline playback.
//! The acquisition driver is shared: tuned constraints first, then
//! exactly one retry with the minimal set.

use super::stream::StreamSession;
use crate::capability::{
    CaptureError, MediaProvider, SurfaceAttributes, SurfaceHost, VideoSurface,
};
use crate::constraints::StreamConstraints;
use crate::platform::Platform;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors crossing the strategy boundary.
#[derive(Debug, Error)]
pub enum CameraError {
    /// A stream session is already active on this facade.
    #[error("camera already active")]
    AlreadyActive,
    /// Acquisition failed after the tuned attempt and the minimal
    /// fallback. Carries the platform and the last underlying failure.
    #[error("camera unavailable on {platform} after {attempts} attempt(s): {source}")]
    Unavailable {
        /// Platform the strategy was acquiring for.
        platform: Platform,
        /// Underlying acquisition attempts made.
        attempts: u32,
        /// Last capability-level failure.
        #[source]
        source: CaptureError,
    },
}

impl CameraError {
    /// Whether the underlying failure was a permission refusal.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            CameraError::Unavailable {
                source: CaptureError::PermissionDenied,
                ..
            }
        )
    }

    /// Whether the underlying failure was an absent capture capability.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            CameraError::Unavailable {
                source: CaptureError::Unsupported,
                ..
            }
        )
    }
}

/// Per-platform camera acquisition.
#[async_trait]
pub trait CameraStrategy: Send + Sync {
    /// The platform this strategy is tuned for.
    fn platform(&self) -> Platform;

    /// Platform-tuned constraints, merged with the caller's preference.
    ///
    /// An exact-device preference is honored as-is (plus the platform's
    /// resolution and frame-rate tuning); otherwise the platform's
    /// default facing applies when the caller expressed none.
    fn tuned_constraints(&self, preferred: &StreamConstraints) -> StreamConstraints;

    /// Minimal constraints for the single fallback retry.
    fn minimal_constraints(&self, preferred: &StreamConstraints) -> StreamConstraints;

    /// Attributes the mounted surface needs on this platform.
    fn surface_attributes(&self) -> SurfaceAttributes;

    /// Acquires a stream session: mount surface, request stream with
    /// tuned constraints, retry exactly once with the minimal set.
    async fn acquire(
        &self,
        media: &dyn MediaProvider,
        host: &dyn SurfaceHost,
        preferred: &StreamConstraints,
    ) -> Result<StreamSession, CameraError> {
        let platform = self.platform();
        let surface = host
            .mount(&self.surface_attributes())
            .map_err(|source| CameraError::Unavailable {
                platform,
                attempts: 0,
                source,
            })?;

        let tuned = self.tuned_constraints(preferred);
        let first = acquire_once(media, &surface, &tuned).await;
        let last_error = match first {
            Ok(stream) => return Ok(StreamSession::new(stream, surface)),
            Err(e) => e,
        };

        // Relaxing constraints cannot cure a refusal; fail straight away.
        if matches!(last_error, CaptureError::PermissionDenied) {
            return Err(CameraError::Unavailable {
                platform,
                attempts: 1,
                source: last_error,
            });
        }

        let minimal = self.minimal_constraints(preferred);
        tracing::debug!(
            %platform,
            tuned = %tuned,
            minimal = %minimal,
            error = %last_error,
            "tuned acquisition failed, retrying with minimal constraints"
        );

        match acquire_once(media, &surface, &minimal).await {
            Ok(stream) => Ok(StreamSession::new(stream, surface)),
            Err(source) => Err(CameraError::Unavailable {
                platform,
                attempts: 2,
                source,
            }),
        }
    }
}

/// One acquisition attempt: request the stream, attach it to the
/// surface, and await playback. A playback failure releases the stream
/// before returning.
async fn acquire_once(
    media: &dyn MediaProvider,
    surface: &Arc<dyn VideoSurface>,
    constraints: &StreamConstraints,
) -> Result<Arc<dyn crate::capability::MediaStream>, CaptureError> {
    let stream = media.acquire(constraints).await?;
    surface.set_source(Arc::clone(&stream));
    if let Err(e) = surface.play().await {
        stream.stop_tracks();
        surface.clear_source();
        return Err(e);
    }
    Ok(stream)
}
