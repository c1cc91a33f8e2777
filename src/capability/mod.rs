//! Injected platform capabilities.
//!
//! The core never touches hardware or ambient globals directly. Every
//! platform-provided function it needs — acquiring a capture stream,
//! enumerating devices, mounting a video surface, decoding a frame — is
//! a trait implemented by the embedder and injected at construction.
//! Tests and the demo binary use the scripted implementations in
//! [`mock`] instead of monkey-patching anything.

mod decode;
mod media;
pub mod mock;
mod surface;

pub use decode::FrameDecoder;
pub use media::{CaptureError, DeviceInfo, DeviceKind, MediaProvider, MediaStream};
pub use surface::{SurfaceAttributes, SurfaceHost, VideoSurface};

use std::sync::Arc;

/// The full capability bundle a scan session is constructed with.
#[derive(Clone)]
pub struct CapabilitySet {
    /// Media capture capability.
    pub media: Arc<dyn MediaProvider>,
    /// Frame decoding capability.
    pub decoder: Arc<dyn FrameDecoder>,
    /// Surface mounting point (the container handle).
    pub host: Arc<dyn SurfaceHost>,
}

impl CapabilitySet {
    /// Bundles the three capabilities.
    pub fn new(
        media: Arc<dyn MediaProvider>,
        decoder: Arc<dyn FrameDecoder>,
        host: Arc<dyn SurfaceHost>,
    ) -> Self {
        Self {
            media,
            decoder,
            host,
        }
    }
}
