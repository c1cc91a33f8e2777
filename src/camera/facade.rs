//! Unified camera start/stop facade.

use super::strategy::{CameraError, CameraStrategy};
use super::stream::StreamSession;
use crate::capability::{MediaProvider, SurfaceHost, VideoSurface};
use crate::constraints::StreamConstraints;
use crate::platform::Platform;
use std::sync::Arc;

/// Callback fired once per successful start with the ready surface.
pub type SurfaceReadyFn = Box<dyn Fn(&Arc<dyn VideoSurface>) + Send + Sync>;

/// Unifies the platform strategies behind one start/stop contract.
///
/// Swallows no errors: any strategy failure propagates unchanged to
/// the caller of [`CameraFacade::start`].
pub struct CameraFacade {
    media: Arc<dyn MediaProvider>,
    strategy: Box<dyn CameraStrategy>,
    active: Option<StreamSession>,
    on_surface_ready: Option<SurfaceReadyFn>,
}

impl CameraFacade {
    /// A facade for the given platform classification.
    pub fn new(platform: Platform, media: Arc<dyn MediaProvider>) -> Self {
        Self {
            media,
            strategy: super::platforms::strategy_for(platform),
            active: None,
            on_surface_ready: None,
        }
    }

    /// A facade with an explicit strategy, for tests.
    pub fn with_strategy(strategy: Box<dyn CameraStrategy>, media: Arc<dyn MediaProvider>) -> Self {
        Self {
            media,
            strategy,
            active: None,
            on_surface_ready: None,
        }
    }

    /// Registers the surface-ready notification.
    pub fn on_surface_ready(&mut self, callback: SurfaceReadyFn) {
        self.on_surface_ready = Some(callback);
    }

    /// The platform this facade acquires for.
    pub fn platform(&self) -> Platform {
        self.strategy.platform()
    }

    /// Whether a stream session is currently active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts the camera, returning the playing video surface.
    ///
    /// Starting while a session is active is rejected, not queued.
    pub async fn start(
        &mut self,
        host: &dyn SurfaceHost,
        preferred: &StreamConstraints,
    ) -> Result<Arc<dyn VideoSurface>, CameraError> {
        if self.active.is_some() {
            return Err(CameraError::AlreadyActive);
        }

        let session = self
            .strategy
            .acquire(self.media.as_ref(), host, preferred)
            .await?;
        let surface = session.surface();
        self.active = Some(session);

        if let Some(ref callback) = self.on_surface_ready {
            callback(&surface);
        }
        Ok(surface)
    }

    /// Releases the active stream session, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.release();
        }
    }
}
