//! Active stream ownership.

use crate::capability::{MediaStream, VideoSurface};
use std::sync::Arc;

/// Exclusive owner of one active capture stream and the surface it feeds.
///
/// Exactly one exists at a time per facade. Release stops every track
/// and detaches the surface source; it runs on every exit path, via
/// [`Drop`] if not called explicitly.
pub struct StreamSession {
    stream: Arc<dyn MediaStream>,
    surface: Arc<dyn VideoSurface>,
    released: bool,
}

impl StreamSession {
    /// Takes ownership of a freshly acquired stream and its surface.
    pub fn new(stream: Arc<dyn MediaStream>, surface: Arc<dyn VideoSurface>) -> Self {
        Self {
            stream,
            surface,
            released: false,
        }
    }

    /// The video surface this session feeds.
    ///
    /// Callers hold this as a non-owning reference: the decode engine
    /// samples it only while the session is live.
    pub fn surface(&self) -> Arc<dyn VideoSurface> {
        Arc::clone(&self.surface)
    }

    /// Whether the stream still has live tracks.
    pub fn is_live(&self) -> bool {
        !self.released && self.stream.is_live()
    }

    /// Stops all tracks and detaches the surface source. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.stream.stop_tracks();
        self.surface.clear_source();
        self.released = true;
        tracing::debug!(stream = self.stream.id(), "stream session released");
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.release();
    }
}
