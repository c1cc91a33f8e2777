//! Scripted capability implementations for tests and demos.
//!
//! These substitute for a real platform: outcomes are scripted up
//! front, and every call is recorded so tests can assert on attempt
//! counts and resource lifetimes.

use super::decode::FrameDecoder;
use super::media::{CaptureError, DeviceInfo, MediaProvider, MediaStream};
use super::surface::{SurfaceAttributes, SurfaceHost, VideoSurface};
use crate::config::ScanBox;
use crate::constraints::StreamConstraints;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A capture stream whose liveness is tracked by its provider.
pub struct MockStream {
    id: String,
    live: AtomicBool,
    live_counter: Arc<AtomicUsize>,
}

impl MediaStream for MockStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop_tracks(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            self.live_counter.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Scripted media provider.
///
/// Each `acquire` call consumes the next scripted outcome; an empty
/// script grants every request. Enumeration returns either the
/// configured device list or the configured error.
pub struct ScriptedMedia {
    supported: bool,
    script: Mutex<VecDeque<Result<(), CaptureError>>>,
    enumeration: Mutex<Result<Vec<DeviceInfo>, CaptureError>>,
    acquired: Mutex<Vec<StreamConstraints>>,
    live_streams: Arc<AtomicUsize>,
    next_stream_id: AtomicUsize,
}

impl ScriptedMedia {
    /// A provider that grants every request and enumerates no devices.
    pub fn granting() -> Self {
        Self {
            supported: true,
            script: Mutex::new(VecDeque::new()),
            enumeration: Mutex::new(Ok(Vec::new())),
            acquired: Mutex::new(Vec::new()),
            live_streams: Arc::new(AtomicUsize::new(0)),
            next_stream_id: AtomicUsize::new(0),
        }
    }

    /// A provider whose capture capability is absent.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::granting()
        }
    }

    /// Sets the enumerated device list.
    pub fn with_devices(self, devices: Vec<DeviceInfo>) -> Self {
        *self.enumeration.lock().unwrap() = Ok(devices);
        self
    }

    /// Makes enumeration fail with the given error.
    pub fn with_enumeration_error(self, error: CaptureError) -> Self {
        *self.enumeration.lock().unwrap() = Err(error);
        self
    }

    /// Scripts the outcomes of the next `acquire` calls, in order.
    /// Calls past the end of the script are granted.
    pub fn with_script(self, outcomes: Vec<Result<(), CaptureError>>) -> Self {
        *self.script.lock().unwrap() = outcomes.into();
        self
    }

    /// Constraints observed by `acquire`, in call order.
    pub fn acquire_log(&self) -> Vec<StreamConstraints> {
        self.acquired.lock().unwrap().clone()
    }

    /// Number of `acquire` calls made so far.
    pub fn acquire_count(&self) -> usize {
        self.acquired.lock().unwrap().len()
    }

    /// Number of granted streams whose tracks are still live.
    pub fn live_stream_count(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProvider for ScriptedMedia {
    fn capture_supported(&self) -> bool {
        self.supported
    }

    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError> {
        if !self.supported {
            return Err(CaptureError::Unsupported);
        }
        self.acquired.lock().unwrap().push(constraints.clone());

        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
        outcome?;

        let id = self.next_stream_id.fetch_add(1, Ordering::SeqCst);
        self.live_streams.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockStream {
            id: format!("stream-{id}"),
            live: AtomicBool::new(true),
            live_counter: Arc::clone(&self.live_streams),
        }))
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, CaptureError> {
        self.enumeration.lock().unwrap().clone()
    }
}

/// In-memory video surface.
pub struct MockSurface {
    source: Mutex<Option<Arc<dyn MediaStream>>>,
    playing: AtomicBool,
    attributes: SurfaceAttributes,
}

impl MockSurface {
    fn new(attributes: SurfaceAttributes) -> Self {
        Self {
            source: Mutex::new(None),
            playing: AtomicBool::new(false),
            attributes,
        }
    }

    /// Attributes this surface was mounted with.
    pub fn attributes(&self) -> SurfaceAttributes {
        self.attributes
    }
}

#[async_trait]
impl VideoSurface for MockSurface {
    fn set_source(&self, stream: Arc<dyn MediaStream>) {
        *self.source.lock().unwrap() = Some(stream);
    }

    fn clear_source(&self) {
        *self.source.lock().unwrap() = None;
        self.playing.store(false, Ordering::SeqCst);
    }

    fn has_source(&self) -> bool {
        self.source.lock().unwrap().is_some()
    }

    async fn play(&self) -> Result<(), CaptureError> {
        if !self.has_source() {
            return Err(CaptureError::Playback("no source attached".into()));
        }
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Surface host that mounts [`MockSurface`]s and remembers them.
#[derive(Default)]
pub struct MockHost {
    mounted: Mutex<Vec<Arc<MockSurface>>>,
}

impl MockHost {
    /// An empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total surfaces mounted over this host's lifetime.
    pub fn mount_count(&self) -> usize {
        self.mounted.lock().unwrap().len()
    }

    /// The most recently mounted surface, if any.
    pub fn last_surface(&self) -> Option<Arc<MockSurface>> {
        self.mounted.lock().unwrap().last().cloned()
    }
}

impl SurfaceHost for MockHost {
    fn mount(&self, attributes: &SurfaceAttributes) -> Result<Arc<dyn VideoSurface>, CaptureError> {
        let surface = Arc::new(MockSurface::new(*attributes));
        self.mounted.lock().unwrap().push(Arc::clone(&surface));
        Ok(surface)
    }

    fn clear(&self) {
        self.mounted.lock().unwrap().clear();
    }
}

/// When a [`ScriptedDecoder`] yields its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSchedule {
    /// Never decodes; every frame misses.
    Never,
    /// Decodes exactly once, on the given 1-based sampled frame.
    OnFrame(usize),
    /// Decodes on every multiple of the given frame number.
    EveryNth(usize),
}

/// Scripted frame decoder.
pub struct ScriptedDecoder {
    available: bool,
    schedule: DecodeSchedule,
    payload: String,
    frames: AtomicUsize,
}

impl ScriptedDecoder {
    /// A decoder following `schedule`, yielding `payload` on decode.
    pub fn new(schedule: DecodeSchedule, payload: impl Into<String>) -> Self {
        Self {
            available: true,
            schedule,
            payload: payload.into(),
            frames: AtomicUsize::new(0),
        }
    }

    /// A decoder whose capability is absent at runtime.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            schedule: DecodeSchedule::Never,
            payload: String::new(),
            frames: AtomicUsize::new(0),
        }
    }

    /// Number of frames sampled so far.
    pub fn frames_sampled(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameDecoder for ScriptedDecoder {
    fn available(&self) -> bool {
        self.available
    }

    async fn decode_frame(
        &self,
        _surface: &dyn VideoSurface,
        _scan_box: ScanBox,
    ) -> Option<String> {
        let frame = self.frames.fetch_add(1, Ordering::SeqCst) + 1;
        let hit = match self.schedule {
            DecodeSchedule::Never => false,
            DecodeSchedule::OnFrame(n) => frame == n,
            DecodeSchedule::EveryNth(n) => n != 0 && frame % n == 0,
        };
        hit.then(|| self.payload.clone())
    }
}
