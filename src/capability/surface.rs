//! Video surface and surface host capabilities.

use super::media::{CaptureError, MediaStream};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Attributes a strategy wants applied to a freshly mounted surface.
///
/// Mobile engines refuse to render inline without these; iOS-class
/// shells additionally need the legacy vendor hints or they take over
/// the whole screen on play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceAttributes {
    /// Start playback as soon as a source is attached.
    pub autoplay: bool,
    /// Render inline instead of full-screen.
    pub inline_playback: bool,
    /// Mute the surface (required for autoplay on mobile engines).
    pub muted: bool,
    /// Apply legacy webkit/x5 inline-playback vendor hints.
    pub legacy_inline_hints: bool,
}

impl Default for SurfaceAttributes {
    fn default() -> Self {
        Self {
            autoplay: true,
            inline_playback: true,
            muted: true,
            legacy_inline_hints: false,
        }
    }
}

/// A mounted video rendering surface.
///
/// The stream session owns the underlying stream; the decode engine
/// holds a non-owning reference to the surface only while scanning.
#[async_trait]
pub trait VideoSurface: Send + Sync {
    /// Attaches a capture stream as this surface's source.
    fn set_source(&self, stream: Arc<dyn MediaStream>);

    /// Detaches the current source, if any. Stops playback.
    fn clear_source(&self);

    /// Whether a source is currently attached.
    fn has_source(&self) -> bool;

    /// Starts playback, resolving once the surface is actually playing.
    ///
    /// Mobile engines require this explicit call even with autoplay set.
    async fn play(&self) -> Result<(), CaptureError>;

    /// Whether the surface is currently playing.
    fn is_playing(&self) -> bool;
}

/// A mounting point for video surfaces (the "container handle").
pub trait SurfaceHost: Send + Sync {
    /// Clears the host and mounts a fresh surface with the given
    /// attributes.
    fn mount(&self, attributes: &SurfaceAttributes) -> Result<Arc<dyn VideoSurface>, CaptureError>;

    /// Removes any mounted surface.
    fn clear(&self);
}
