//! Frame-sampling decode loop.
//!
//! State machine: Idle → Scanning → Idle, where the transition back to
//! Idle happens on stop or on a successful decode. Failed frame decodes
//! are the Scanning → Scanning self-loop: expected, silent, never
//! surfaced as errors.

use crate::capability::{FrameDecoder, VideoSurface};
use crate::config::{ScanBox, ScanConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors raised at the engine boundary.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame-decoding capability is missing at runtime.
    #[error("decode capability unavailable")]
    EngineUnavailable,
    /// A sampling loop is already running.
    #[error("decode engine already scanning")]
    AlreadyScanning,
    /// `restart` called before any `attach`.
    #[error("nothing to restart: no previous attachment")]
    NothingToRestart,
}

/// Callback fired with the decoded payload.
///
/// `Fn` rather than `FnOnce` so [`QrDecodeEngine::restart`] can reuse
/// it; the at-most-once-per-attach guarantee is enforced by the
/// sampling loop, which exits on the first decode.
pub type DecodedFn = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Clone)]
struct Attachment {
    surface: Arc<dyn VideoSurface>,
    on_decoded: DecodedFn,
}

/// One-shot QR decode engine.
///
/// `on_decoded` fires at most once per attach; the loop transitions
/// itself back to Idle before the callback runs, so calling
/// [`QrDecodeEngine::stop`] from code triggered by the callback never
/// waits on a live sampler.
pub struct QrDecodeEngine {
    decoder: Arc<dyn FrameDecoder>,
    interval: Duration,
    scan_box: ScanBox,
    active: Arc<AtomicBool>,
    sampler: Option<JoinHandle<()>>,
    attachment: Option<Attachment>,
}

impl QrDecodeEngine {
    /// An engine sampling at the configured rate and region.
    pub fn new(decoder: Arc<dyn FrameDecoder>, config: &ScanConfig) -> Self {
        Self {
            decoder,
            interval: config.sample_interval(),
            scan_box: config.scan_box,
            active: Arc::new(AtomicBool::new(false)),
            sampler: None,
            attachment: None,
        }
    }

    /// Whether a sampling loop is currently running.
    pub fn is_scanning(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Begins periodic frame sampling on `surface`.
    ///
    /// Rejects with [`DecodeError::EngineUnavailable`] when the decode
    /// capability is absent and [`DecodeError::AlreadyScanning`] when a
    /// sampler is still running.
    pub async fn attach(
        &mut self,
        surface: Arc<dyn VideoSurface>,
        on_decoded: DecodedFn,
    ) -> Result<(), DecodeError> {
        if !self.decoder.available() {
            return Err(DecodeError::EngineUnavailable);
        }
        if self.is_scanning() {
            return Err(DecodeError::AlreadyScanning);
        }
        // Join a sampler that already finished (post-decode) before
        // starting the next one.
        if let Some(finished) = self.sampler.take() {
            let _ = finished.await;
        }

        let attachment = Attachment {
            surface,
            on_decoded,
        };
        self.attachment = Some(attachment.clone());
        self.spawn_sampler(attachment);
        Ok(())
    }

    /// Cancels frame sampling and awaits the loop's teardown. Idempotent.
    pub async fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(sampler) = self.sampler.take() {
            let _ = sampler.await;
        }
    }

    /// Stops, then re-attaches with the parameters of the previous attach.
    ///
    /// The previous sampling loop is fully torn down before the new one
    /// starts; two samplers never overlap.
    pub async fn restart(&mut self) -> Result<(), DecodeError> {
        self.stop().await;
        let attachment = self.attachment.clone().ok_or(DecodeError::NothingToRestart)?;
        if !self.decoder.available() {
            return Err(DecodeError::EngineUnavailable);
        }
        self.spawn_sampler(attachment);
        Ok(())
    }

    fn spawn_sampler(&mut self, attachment: Attachment) {
        let active = Arc::new(AtomicBool::new(true));
        self.active = Arc::clone(&active);

        let decoder = Arc::clone(&self.decoder);
        let interval = self.interval;
        let scan_box = self.scan_box;

        self.sampler = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if !active.load(Ordering::SeqCst) {
                    break;
                }
                match decoder
                    .decode_frame(attachment.surface.as_ref(), scan_box)
                    .await
                {
                    Some(payload) => {
                        // One-shot: back to Idle before the callback
                        // observes the result.
                        active.store(false, Ordering::SeqCst);
                        tracing::debug!(len = payload.len(), "payload decoded");
                        (attachment.on_decoded)(payload);
                        break;
                    }
                    // Missed frame: expected, try again next tick.
                    None => continue,
                }
            }
        }));
    }
}
