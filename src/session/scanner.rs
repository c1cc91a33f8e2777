//! Scan session lifecycle.

use super::retry::RetryPolicy;
use super::select::select_constraints;
use crate::camera::{CameraError, CameraFacade};
use crate::capability::{CapabilitySet, VideoSurface};
use crate::config::{ConfigError, ScanConfig};
use crate::constraints::StreamConstraints;
use crate::decode::{DecodeError, DecodedFn, QrDecodeEngine};
use crate::events::{EventSink, ScanEvent, TracingSink};
use crate::platform::{Environment, Platform};
use crate::session::DiagnosticReport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Terminal failure of a scan session start.
///
/// The closed taxonomy crossing the session boundary: raw capability
/// errors are translated before they get here, so callers can drive UI
/// off [`ScanFailure::reason`] without unpacking platform internals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanFailure {
    /// A session is already active; the existing one is untouched.
    #[error("a scan session is already active")]
    AlreadyScanning,
    /// Camera access requires TLS or a loopback host.
    #[error("camera requires a secure context (TLS or loopback)")]
    InsecureContext,
    /// The capture capability is absent.
    #[error("camera capture not supported in this environment")]
    CameraUnsupported,
    /// The user or platform refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,
    /// The frame-decoding capability is absent.
    #[error("decode engine unavailable")]
    DecodeEngineUnavailable,
    /// Every acquisition attempt failed.
    #[error("camera unavailable on {platform} after {attempts} attempt(s): {detail}")]
    CameraUnavailable {
        /// Classified platform.
        platform: Platform,
        /// Session-level acquisition attempts made.
        attempts: u32,
        /// Text of the last underlying failure.
        detail: String,
    },
    /// The session was stopped while the start sequence was in flight.
    #[error("scan session stopped before start completed")]
    Cancelled,
}

impl ScanFailure {
    /// Stable taxonomy tag for UI and event payloads.
    pub fn reason(&self) -> &'static str {
        match self {
            ScanFailure::AlreadyScanning => "AlreadyScanning",
            ScanFailure::InsecureContext => "InsecureContext",
            ScanFailure::CameraUnsupported => "CameraUnsupported",
            ScanFailure::PermissionDenied => "PermissionDenied",
            ScanFailure::DecodeEngineUnavailable => "DecodeEngineUnavailable",
            ScanFailure::CameraUnavailable { .. } => "CameraUnavailable",
            ScanFailure::Cancelled => "Cancelled",
        }
    }
}

/// Caller's result callback, invoked with the decoded payload after
/// the session has been torn down.
pub type ResultFn = Arc<dyn Fn(String) + Send + Sync>;

struct SessionState {
    facade: Option<CameraFacade>,
    engine: Option<QrDecodeEngine>,
    supervisor: Option<JoinHandle<()>>,
}

struct Inner {
    env: Environment,
    config: ScanConfig,
    capabilities: CapabilitySet,
    events: Arc<dyn EventSink>,
    on_result: ResultFn,
    /// Reentrancy guard: one start sequence in flight at a time.
    active: AtomicBool,
    /// Cooperative cancellation, checked by backoff waits and the
    /// decode supervisor.
    cancelled: AtomicBool,
    state: tokio::sync::Mutex<SessionState>,
}

impl Inner {
    /// Releases decoder then capture. Idempotent; never touches the
    /// supervisor task (the supervisor itself calls this).
    async fn teardown(&self) {
        let mut state = self.state.lock().await;
        if let Some(mut engine) = state.engine.take() {
            engine.stop().await;
        }
        if let Some(mut facade) = state.facade.take() {
            facade.stop();
        }
        drop(state);
        if self.active.swap(false, Ordering::SeqCst) {
            self.events.emit(&ScanEvent::SessionTornDown);
        }
    }
}

/// One logical start-to-result (or start-to-stop) scanning lifecycle.
///
/// Owns its camera facade, decode engine, and stream exclusively;
/// nothing is shared across session instances, and release runs on
/// every exit path. The result callback is injected at construction.
pub struct ScanSession {
    inner: Arc<Inner>,
}

impl ScanSession {
    /// Builds a session over the given environment and capabilities.
    ///
    /// The configuration is validated here and fixed for the session's
    /// lifetime. Events go to a [`TracingSink`] unless
    /// [`ScanSession::with_events`] replaces it before the first start.
    pub fn new(
        env: Environment,
        config: ScanConfig,
        capabilities: CapabilitySet,
        on_result: impl Fn(String) + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                env,
                config,
                capabilities,
                events: Arc::new(TracingSink),
                on_result: Arc::new(on_result),
                active: AtomicBool::new(false),
                cancelled: AtomicBool::new(false),
                state: tokio::sync::Mutex::new(SessionState {
                    facade: None,
                    engine: None,
                    supervisor: None,
                }),
            }),
        })
    }

    /// Replaces the event sink. Only effective before the session is
    /// shared or started.
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.events = sink;
        }
        self
    }

    /// Whether a session is currently active.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Whether scanning could work at all with these capabilities.
    pub fn available(capabilities: &CapabilitySet) -> bool {
        capabilities.media.capture_supported() && capabilities.decoder.available()
    }

    /// Collects a capability diagnostic for this session's environment.
    pub async fn diagnostic(&self) -> DiagnosticReport {
        DiagnosticReport::collect(
            &self.inner.env,
            self.inner.capabilities.media.as_ref(),
            self.inner.capabilities.decoder.as_ref(),
        )
        .await
    }

    /// Starts scanning.
    ///
    /// On success the camera is live and frames are being sampled; the
    /// injected result callback will fire at most once, strictly after
    /// the session has released the camera. All terminal failures are
    /// the [`ScanFailure`] taxonomy; no raw capability error escapes.
    pub async fn start(&self) -> Result<(), ScanFailure> {
        let inner = &self.inner;
        if inner.active.swap(true, Ordering::SeqCst) {
            inner.events.emit(&ScanEvent::SessionFailed {
                reason: ScanFailure::AlreadyScanning.reason().to_string(),
            });
            return Err(ScanFailure::AlreadyScanning);
        }
        inner.cancelled.store(false, Ordering::SeqCst);

        match self.start_pipeline().await {
            Ok(()) => Ok(()),
            Err(failure) => {
                inner.teardown().await;
                inner.events.emit(&ScanEvent::SessionFailed {
                    reason: failure.reason().to_string(),
                });
                Err(failure)
            }
        }
    }

    /// Stops the session: decoder first, then capture. Idempotent and
    /// safe from any state, including mid-start (backoff waits observe
    /// the cancellation flag).
    pub async fn stop(&self) {
        let inner = &self.inner;
        inner.cancelled.store(true, Ordering::SeqCst);

        let supervisor = inner.state.lock().await.supervisor.take();
        inner.teardown().await;
        if let Some(handle) = supervisor {
            let _ = handle.await;
        }
        inner.events.emit(&ScanEvent::SessionStopped);
    }

    async fn start_pipeline(&self) -> Result<(), ScanFailure> {
        let inner = &self.inner;
        let platform = inner.env.platform();
        inner.events.emit(&ScanEvent::SessionStarting { platform });

        if !inner.env.is_secure_context() {
            return Err(ScanFailure::InsecureContext);
        }
        if !inner.capabilities.media.capture_supported() {
            return Err(ScanFailure::CameraUnsupported);
        }
        if !inner.capabilities.decoder.available() {
            return Err(ScanFailure::DecodeEngineUnavailable);
        }

        // Best-effort: enumeration failure falls through to
        // constraint-based selection.
        let devices = match inner.capabilities.media.enumerate_devices().await {
            Ok(devices) => {
                inner.events.emit(&ScanEvent::DevicesEnumerated {
                    video_devices: devices.len(),
                });
                devices
            }
            Err(e) => {
                inner.events.emit(&ScanEvent::EnumerationFailed {
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };

        let mut selected = select_constraints(platform, inner.config.preferred_facing, &devices);
        if !selected.is_engine_default() {
            selected.aspect_ratio = Some(inner.config.aspect_ratio);
        }
        inner.events.emit(&ScanEvent::ConstraintSelected {
            constraints: selected.to_string(),
        });

        let mut facade = CameraFacade::new(platform, Arc::clone(&inner.capabilities.media));
        let policy = RetryPolicy::from_config(&inner.config);
        let surface = self.acquire_with_retry(&mut facade, &policy, &selected).await?;
        // A stop may have landed while the acquisition was in flight;
        // the freshly acquired stream must not outlive it.
        if inner.cancelled.load(Ordering::SeqCst) {
            facade.stop();
            return Err(ScanFailure::Cancelled);
        }
        inner.state.lock().await.facade = Some(facade);
        inner.events.emit(&ScanEvent::SurfaceReady);

        // Decodes flow through a channel to the supervisor, which
        // tears the session down before the caller sees the result.
        let (tx, rx) = mpsc::channel::<String>(1);
        let on_decoded: DecodedFn = Arc::new(move |payload| {
            let _ = tx.try_send(payload);
        });
        let mut engine = QrDecodeEngine::new(Arc::clone(&inner.capabilities.decoder), &inner.config);
        engine
            .attach(surface, on_decoded)
            .await
            .map_err(|e| match e {
                DecodeError::EngineUnavailable
                | DecodeError::AlreadyScanning
                | DecodeError::NothingToRestart => ScanFailure::DecodeEngineUnavailable,
            })?;
        inner.events.emit(&ScanEvent::ScanningStarted);

        let supervisor = self.spawn_supervisor(rx);
        let mut state = inner.state.lock().await;
        state.engine = Some(engine);
        state.supervisor = Some(supervisor);
        drop(state);

        // Same race on the attach path: a stop that ran between the
        // acquisition and this commit found nothing to release.
        if inner.cancelled.load(Ordering::SeqCst) {
            inner.teardown().await;
            return Err(ScanFailure::Cancelled);
        }
        Ok(())
    }

    /// Runs the bounded retry around the facade: the selected
    /// constraints up to the policy's bound with backoff between
    /// attempts, then one engine-default last resort if the selection
    /// wasn't already the default.
    async fn acquire_with_retry(
        &self,
        facade: &mut CameraFacade,
        policy: &RetryPolicy,
        selected: &StreamConstraints,
    ) -> Result<Arc<dyn VideoSurface>, ScanFailure> {
        let inner = &self.inner;
        let mut attempts = 0u32;
        let mut last_detail = String::new();

        for n in 1..=policy.max_attempts {
            attempts += 1;
            match self.try_acquire(facade, selected, attempts).await {
                Ok(surface) => return Ok(surface),
                Err(AttemptError::Terminal(failure)) => return Err(failure),
                Err(AttemptError::Transient(detail)) => last_detail = detail,
            }
            if policy.has_next(n) {
                tokio::time::sleep(policy.backoff_after(n)).await;
                if inner.cancelled.load(Ordering::SeqCst) {
                    return Err(ScanFailure::Cancelled);
                }
            }
        }

        if !selected.is_engine_default() && !inner.cancelled.load(Ordering::SeqCst) {
            attempts += 1;
            match self
                .try_acquire(facade, &StreamConstraints::engine_default(), attempts)
                .await
            {
                Ok(surface) => return Ok(surface),
                Err(AttemptError::Terminal(failure)) => return Err(failure),
                Err(AttemptError::Transient(detail)) => last_detail = detail,
            }
        }

        Err(ScanFailure::CameraUnavailable {
            platform: facade.platform(),
            attempts,
            detail: last_detail,
        })
    }

    async fn try_acquire(
        &self,
        facade: &mut CameraFacade,
        constraints: &StreamConstraints,
        attempt: u32,
    ) -> Result<Arc<dyn VideoSurface>, AttemptError> {
        let inner = &self.inner;
        inner.events.emit(&ScanEvent::AcquisitionAttempt {
            attempt,
            constraints: constraints.to_string(),
        });
        match facade
            .start(inner.capabilities.host.as_ref(), constraints)
            .await
        {
            Ok(surface) => Ok(surface),
            Err(e) => {
                inner.events.emit(&ScanEvent::AcquisitionFailed {
                    attempt,
                    reason: e.to_string(),
                });
                if e.is_permission_denied() {
                    return Err(AttemptError::Terminal(ScanFailure::PermissionDenied));
                }
                if e.is_unsupported() {
                    return Err(AttemptError::Terminal(ScanFailure::CameraUnsupported));
                }
                if matches!(e, CameraError::AlreadyActive) {
                    return Err(AttemptError::Terminal(ScanFailure::AlreadyScanning));
                }
                Err(AttemptError::Transient(e.to_string()))
            }
        }
    }

    fn spawn_supervisor(&self, mut rx: mpsc::Receiver<String>) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            // The sender lives in the engine's attachment; teardown
            // drops it, which ends this task via the closed channel.
            if let Some(payload) = rx.recv().await {
                if inner.cancelled.load(Ordering::SeqCst) {
                    inner.teardown().await;
                    return;
                }
                inner.events.emit(&ScanEvent::Decoded {
                    payload: payload.clone(),
                });
                // Camera release strictly precedes the caller's
                // result notification.
                inner.teardown().await;
                (inner.on_result)(payload);
                inner.events.emit(&ScanEvent::ResultDelivered);
            }
        })
    }
}

/// Outcome of one facade start within the retry loop.
enum AttemptError {
    /// Retrying cannot help; fail the session with this.
    Terminal(ScanFailure),
    /// Worth another attempt; carries the failure text.
    Transient(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::mock::{
        DecodeSchedule, MockHost, ScriptedDecoder, ScriptedMedia,
    };
    use crate::capability::{
        CaptureError, DeviceInfo, MediaProvider, MediaStream, SurfaceHost,
    };
    use crate::constraints::FacingMode;
    use crate::events::RecordingSink;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Fixture {
        media: Arc<ScriptedMedia>,
        host: Arc<MockHost>,
        sink: Arc<RecordingSink>,
        results: Arc<Mutex<Vec<String>>>,
        /// Live stream count observed at each result delivery.
        live_at_result: Arc<Mutex<Vec<usize>>>,
        session: Arc<ScanSession>,
    }

    fn fixture(
        env: Environment,
        media: ScriptedMedia,
        decoder: ScriptedDecoder,
    ) -> Fixture {
        let media = Arc::new(media);
        let host = Arc::new(MockHost::new());
        let sink = Arc::new(RecordingSink::new());
        let results = Arc::new(Mutex::new(Vec::new()));
        let live_at_result = Arc::new(Mutex::new(Vec::new()));

        let media_cap: Arc<dyn MediaProvider> = media.clone();
        let host_cap: Arc<dyn SurfaceHost> = host.clone();
        let capabilities = CapabilitySet::new(media_cap, Arc::new(decoder), host_cap);
        let results_cb = Arc::clone(&results);
        let live_cb = Arc::clone(&live_at_result);
        let media_cb = Arc::clone(&media);
        let session = ScanSession::new(env, ScanConfig::default(), capabilities, move |payload| {
            live_cb.lock().unwrap().push(media_cb.live_stream_count());
            results_cb.lock().unwrap().push(payload);
        })
        .unwrap();
        let sink_cap: Arc<dyn EventSink> = sink.clone();
        let session = session.with_events(sink_cap);

        Fixture {
            media,
            host,
            sink,
            results,
            live_at_result,
            session: Arc::new(session),
        }
    }

    fn secure_android() -> Environment {
        Environment::new("Linux; Android 14; Pixel 8", "https", "tickets.example.com")
    }

    fn secure_desktop() -> Environment {
        Environment::new("X11; Linux x86_64", "https", "tickets.example.com")
    }

    #[tokio::test(start_paused = true)]
    async fn decode_tears_down_before_result_delivery() {
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::granting(),
            ScriptedDecoder::new(DecodeSchedule::OnFrame(3), "TICKET-42"),
        );

        f.session.start().await.unwrap();
        assert!(f.session.is_active());
        assert_eq!(f.media.live_stream_count(), 1);

        // Let the sampler reach its third frame and the supervisor run.
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(f.results.lock().unwrap().as_slice(), ["TICKET-42"]);
        // The camera was already released when the callback ran.
        assert_eq!(f.live_at_result.lock().unwrap().as_slice(), [0]);
        assert!(!f.session.is_active());

        let torn_down = f
            .sink
            .position(|e| matches!(e, ScanEvent::SessionTornDown))
            .unwrap();
        let delivered = f
            .sink
            .position(|e| matches!(e, ScanEvent::ResultDelivered))
            .unwrap();
        assert!(torn_down < delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn result_callback_fires_exactly_once() {
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::granting(),
            ScriptedDecoder::new(DecodeSchedule::EveryNth(2), "ONCE"),
        );

        f.session.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // The schedule would decode again, but the one-shot engine and
        // the teardown stopped sampling after the first hit.
        assert_eq!(f.results.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn never_more_than_one_live_stream() {
        let f = fixture(
            secure_android(),
            ScriptedMedia::granting().with_devices(vec![
                DeviceInfo::video("1", "Front Camera"),
                DeviceInfo::video("2", "Back Camera"),
            ]),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        f.session.start().await.unwrap();
        assert_eq!(f.media.live_stream_count(), 1);
        assert_eq!(f.media.acquire_count(), 1);

        f.session.stop().await;
        assert_eq!(f.media.live_stream_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reentrant_start_fails_without_touching_the_session() {
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::granting(),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        f.session.start().await.unwrap();
        let acquires = f.media.acquire_count();

        let err = f.session.start().await.unwrap_err();
        assert_eq!(err, ScanFailure::AlreadyScanning);
        assert_eq!(err.reason(), "AlreadyScanning");
        assert!(f.session.is_active());
        assert_eq!(f.media.acquire_count(), acquires);
        assert_eq!(f.media.live_stream_count(), 1);

        f.session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_from_any_state() {
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::granting(),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        // Stop without start: no error, no state change.
        f.session.stop().await;
        assert!(!f.session.is_active());

        f.session.start().await.unwrap();
        f.session.stop().await;
        f.session.stop().await;
        assert!(!f.session.is_active());
        assert_eq!(f.media.live_stream_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn session_is_restartable_after_a_result() {
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::granting(),
            ScriptedDecoder::new(DecodeSchedule::EveryNth(2), "NEXT"),
        );

        f.session.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!f.session.is_active());

        f.session.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(f.results.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn constraint_fallback_succeeds_within_two_acquisitions() {
        let f = fixture(
            secure_android(),
            ScriptedMedia::granting().with_script(vec![
                Err(CaptureError::ConstraintUnsatisfiable("1080p".into())),
                Ok(()),
            ]),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        f.session.start().await.unwrap();
        let log = f.media.acquire_log();
        assert_eq!(log.len(), 2);
        // The fallback dropped the tuned resolution.
        assert!(log[1].width.is_none());
        assert_eq!(log[1].facing, Some(FacingMode::Environment));

        f.session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn configured_aspect_ratio_reaches_the_tuned_acquisition() {
        let f = fixture(
            secure_android(),
            ScriptedMedia::granting().with_script(vec![
                Err(CaptureError::ConstraintUnsatisfiable("ratio".into())),
                Ok(()),
            ]),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        f.session.start().await.unwrap();
        let log = f.media.acquire_log();
        assert_eq!(log[0].aspect_ratio, Some(1.0));
        // The relaxed retry keeps facing only.
        assert!(log[1].aspect_ratio.is_none());

        f.session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn android_back_camera_is_selected_by_label() {
        let f = fixture(
            secure_android(),
            ScriptedMedia::granting().with_devices(vec![
                DeviceInfo::video("1", "Front Camera"),
                DeviceInfo::video("2", "Back Camera"),
            ]),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        f.session.start().await.unwrap();
        let log = f.media.acquire_log();
        assert_eq!(log[0].device_id.as_deref(), Some("2"));
        assert_eq!(log[0].facing, None);

        f.session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ios_enumeration_failure_falls_back_to_facing() {
        let env = Environment::new("iPhone; CPU iPhone OS 17_0", "https", "tickets.example.com");
        let f = fixture(
            env,
            ScriptedMedia::granting()
                .with_enumeration_error(CaptureError::Enumeration("denied".into())),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        f.session.start().await.unwrap();
        let log = f.media.acquire_log();
        assert_eq!(log[0].facing, Some(FacingMode::Environment));
        assert_eq!(log[0].device_id, None);
        assert!(f
            .sink
            .position(|e| matches!(e, ScanEvent::EnumerationFailed { .. }))
            .is_some());

        f.session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn insecure_context_fails_before_any_capability_call() {
        let env = Environment::new("X11; Linux x86_64", "http", "tickets.example.com");
        let f = fixture(
            env,
            ScriptedMedia::granting(),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        let err = f.session.start().await.unwrap_err();
        assert_eq!(err, ScanFailure::InsecureContext);
        assert_eq!(err.reason(), "InsecureContext");
        assert_eq!(f.media.acquire_count(), 0);
        assert_eq!(f.host.mount_count(), 0);
        assert!(!f.session.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_capture_capability_is_camera_unsupported() {
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::unsupported(),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        let err = f.session.start().await.unwrap_err();
        assert_eq!(err, ScanFailure::CameraUnsupported);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_decoder_is_rejected_before_acquisition() {
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::granting(),
            ScriptedDecoder::unavailable(),
        );

        let err = f.session.start().await.unwrap_err();
        assert_eq!(err, ScanFailure::DecodeEngineUnavailable);
        assert_eq!(f.media.acquire_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn permission_denial_is_terminal_after_one_acquisition() {
        let f = fixture(
            secure_android(),
            ScriptedMedia::granting().with_script(vec![Err(CaptureError::PermissionDenied)]),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        let err = f.session.start().await.unwrap_err();
        assert_eq!(err, ScanFailure::PermissionDenied);
        // No relaxation, no session retry, no engine-default resort.
        assert_eq!(f.media.acquire_count(), 1);
        assert_eq!(f.media.live_stream_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_include_the_engine_default_resort() {
        // Two session attempts with the facing selection (each a tuned
        // acquire plus a minimal fallback) and one engine-default
        // resort: six capability acquisitions in total.
        let busy = || Err(CaptureError::HardwareBusy);
        let f = fixture(
            secure_android(),
            ScriptedMedia::granting()
                .with_script(vec![busy(), busy(), busy(), busy(), busy(), busy()]),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        let started = tokio::time::Instant::now();
        let err = f.session.start().await.unwrap_err();
        match err {
            ScanFailure::CameraUnavailable {
                platform, attempts, ..
            } => {
                assert_eq!(platform, Platform::Android);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected failure: {other}"),
        }
        assert_eq!(f.media.acquire_count(), 6);
        // One backoff between the two selected-constraint attempts.
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(f.media.live_stream_count(), 0);
        assert!(!f.session.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn engine_default_resort_can_rescue_the_session() {
        let busy = || Err(CaptureError::HardwareBusy);
        let f = fixture(
            secure_android(),
            ScriptedMedia::granting()
                .with_script(vec![busy(), busy(), busy(), busy(), Ok(())]),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        f.session.start().await.unwrap();
        assert!(f.session.is_active());
        let log = f.media.acquire_log();
        assert_eq!(log.len(), 5);
        // The rescue ran with the platform tuning of an engine-default
        // preference: facing environment, no device pin.
        assert_eq!(log[4].device_id, None);

        f.session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_backoff_cancels_the_start() {
        let busy = || Err(CaptureError::HardwareBusy);
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::granting().with_script(vec![
                busy(),
                busy(),
                busy(),
                busy(),
            ]),
            ScriptedDecoder::new(DecodeSchedule::Never, ""),
        );

        let session = Arc::clone(&f.session);
        let starter = tokio::spawn(async move { session.start().await });

        // Land inside the one-second backoff after the first attempt.
        tokio::time::sleep(Duration::from_millis(500)).await;
        f.session.stop().await;

        let outcome = starter.await.unwrap();
        assert_eq!(outcome.unwrap_err(), ScanFailure::Cancelled);
        // Only the first attempt's acquisitions ran.
        assert_eq!(f.media.acquire_count(), 2);
        assert_eq!(f.media.live_stream_count(), 0);
        assert!(!f.session.is_active());
    }

    /// Provider whose `acquire` suspends before delegating, so a stop
    /// can land while the capability call is still in flight.
    struct SlowMedia {
        inner: ScriptedMedia,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl MediaProvider for SlowMedia {
        fn capture_supported(&self) -> bool {
            self.inner.capture_supported()
        }

        async fn acquire(
            &self,
            constraints: &StreamConstraints,
        ) -> Result<Arc<dyn MediaStream>, CaptureError> {
            tokio::time::sleep(self.delay).await;
            self.inner.acquire(constraints).await
        }

        async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, CaptureError> {
            self.inner.enumerate_devices().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_acquisition_releases_the_acquired_stream() {
        let media = Arc::new(SlowMedia {
            inner: ScriptedMedia::granting(),
            delay: Duration::from_secs(2),
        });
        let media_cap: Arc<dyn MediaProvider> = media.clone();
        let capabilities = CapabilitySet::new(
            media_cap,
            Arc::new(ScriptedDecoder::new(DecodeSchedule::Never, "")),
            Arc::new(MockHost::new()),
        );
        let session = Arc::new(
            ScanSession::new(secure_desktop(), ScanConfig::default(), capabilities, |_| {})
                .unwrap(),
        );

        let starter = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.start().await }
        });

        // Land inside the slow capability call, then stop. The stop
        // finds nothing to release yet; the start sequence must clean
        // up the stream its in-flight acquisition still produces.
        tokio::time::sleep(Duration::from_millis(500)).await;
        session.stop().await;

        let outcome = starter.await.unwrap();
        assert_eq!(outcome.unwrap_err(), ScanFailure::Cancelled);
        assert_eq!(media.inner.live_stream_count(), 0);
        assert!(!session.is_active());

        // The session is reusable afterwards.
        session.start().await.unwrap();
        assert!(session.is_active());
        assert_eq!(media.inner.live_stream_count(), 1);
        session.stop().await;
        assert_eq!(media.inner.live_stream_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn event_log_covers_the_happy_path_in_order() {
        let f = fixture(
            secure_desktop(),
            ScriptedMedia::granting(),
            ScriptedDecoder::new(DecodeSchedule::OnFrame(1), "E2E"),
        );

        f.session.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let order = [
            f.sink.position(|e| matches!(e, ScanEvent::SessionStarting { .. })),
            f.sink.position(|e| matches!(e, ScanEvent::DevicesEnumerated { .. })),
            f.sink.position(|e| matches!(e, ScanEvent::ConstraintSelected { .. })),
            f.sink.position(|e| matches!(e, ScanEvent::AcquisitionAttempt { .. })),
            f.sink.position(|e| matches!(e, ScanEvent::SurfaceReady)),
            f.sink.position(|e| matches!(e, ScanEvent::ScanningStarted)),
            f.sink.position(|e| matches!(e, ScanEvent::Decoded { .. })),
            f.sink.position(|e| matches!(e, ScanEvent::SessionTornDown)),
            f.sink.position(|e| matches!(e, ScanEvent::ResultDelivered)),
        ];
        for pair in order.windows(2) {
            assert!(pair[0].unwrap() < pair[1].unwrap(), "event order violated");
        }
    }

    #[test]
    fn availability_check_requires_both_capabilities() {
        let ok = CapabilitySet::new(
            Arc::new(ScriptedMedia::granting()),
            Arc::new(ScriptedDecoder::new(DecodeSchedule::Never, "")),
            Arc::new(MockHost::new()),
        );
        assert!(ScanSession::available(&ok));

        let no_media = CapabilitySet::new(
            Arc::new(ScriptedMedia::unsupported()),
            Arc::new(ScriptedDecoder::new(DecodeSchedule::Never, "")),
            Arc::new(MockHost::new()),
        );
        assert!(!ScanSession::available(&no_media));

        let no_decoder = CapabilitySet::new(
            Arc::new(ScriptedMedia::granting()),
            Arc::new(ScriptedDecoder::unavailable()),
            Arc::new(MockHost::new()),
        );
        assert!(!ScanSession::available(&no_decoder));
    }
}
