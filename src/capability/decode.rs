//! Frame decoding capability.

use super::surface::VideoSurface;
use crate::config::ScanBox;
use async_trait::async_trait;

/// A QR frame decoder.
///
/// Given a live video surface, a decoder samples one frame and either
/// produces the decoded payload or nothing. A `None` is the normal case
/// for most frames and is never an error; the decode engine's sampling
/// loop simply tries again on the next tick.
#[async_trait]
pub trait FrameDecoder: Send + Sync {
    /// Whether the decoding capability is present at runtime.
    fn available(&self) -> bool;

    /// Samples one frame from `surface`, restricted to the interior
    /// `scan_box` region.
    ///
    /// Returns the decoded payload text, opaque to this core, or `None`
    /// when no code was found in the frame.
    async fn decode_frame(&self, surface: &dyn VideoSurface, scan_box: ScanBox) -> Option<String>;
}
