//! The scan pipeline: camera lifecycle, frame sampling, payload
//! classification, and exactly-once result delivery.
//!
//! # State machine
//!
//! ```text
//! Idle --start(ok)--> Capturing --tick: decode+classify ok--> deliver --> Idle
//!  ^                      |
//!  |<--start(err)/notice--+--stop()/flip()/capture error-->--+
//! ```
//!
//! The pipeline never runs its own loop. The host calls [`ScanPipeline::tick`]
//! once per display frame; each tick samples at most one frame and returns.
//! That makes cancellation trivial: after [`ScanPipeline::stop`] the next
//! scheduled tick observes Idle and does nothing, so no late frame callback
//! can fire after teardown.

mod notice;
mod session;
mod stats;

pub use notice::{Notice, NoticeBoard, NoticeKind, DEFAULT_NOTICE_TTL};
pub use session::CaptureSession;
pub use stats::PipelineStats;

use crate::capture::{Camera, CameraError, CaptureConfig, FacingMode};
use crate::classify::{Classify, LocalClassifier, ScanResult};
use crate::decode::Decoder;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to the caller of the pipeline.
///
/// A decode miss is not an error (expected steady state) and a missing
/// torch is not an error (the control is simply unavailable); neither
/// appears here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("classification failed: {0}")]
    ClassificationFailed(String),
}

impl ScanError {
    /// Notice category for this error.
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            ScanError::PermissionDenied(_) => NoticeKind::PermissionDenied,
            ScanError::DeviceUnavailable(_) => NoticeKind::DeviceUnavailable,
            ScanError::ClassificationFailed(_) => NoticeKind::ClassificationFailed,
        }
    }

    fn from_camera(err: CameraError) -> Self {
        match err {
            CameraError::PermissionDenied(msg) => ScanError::PermissionDenied(msg),
            other => ScanError::DeviceUnavailable(other.to_string()),
        }
    }
}

/// Observable pipeline state.
///
/// Delivery is a transition, not a resting state: a successful scan
/// releases the stream and lands back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    /// No stream held.
    Idle,
    /// Stream held, sampling frames.
    Capturing,
}

/// Result of toggling the torch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchStatus {
    /// Torch is now on.
    On,
    /// Torch is now off.
    Off,
    /// Device has no torch, or no session is active; the control is inert.
    Unavailable,
}

/// Outcome of one sampling tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session is active; nothing was sampled.
    Idle,
    /// A frame was sampled but yielded no result; sample again next tick.
    NoCode,
    /// A payload was decoded, classified, and delivered. The session is
    /// already stopped; this value is handed out exactly once.
    Delivered(ScanResult),
}

/// Camera QR scan-and-classify pipeline.
///
/// All capabilities are injected: the camera, the frame decoder, and
/// the classifier. The pipeline owns at most one [`CaptureSession`] at
/// a time; starting a new session always releases the previous stream
/// first.
pub struct ScanPipeline<C, D, K = LocalClassifier> {
    camera: C,
    decoder: D,
    classifier: K,
    config: CaptureConfig,
    facing: FacingMode,
    session: Option<CaptureSession>,
    notices: NoticeBoard,
    stats: PipelineStats,
    on_scan: Option<Box<dyn FnMut(ScanResult)>>,
}

impl<C: Camera, D: Decoder> ScanPipeline<C, D, LocalClassifier> {
    /// Creates a pipeline with the in-process classifier.
    pub fn new(camera: C, decoder: D, config: CaptureConfig) -> Self {
        Self::with_classifier(camera, decoder, LocalClassifier::new(), config)
    }
}

impl<C: Camera, D: Decoder, K: Classify> ScanPipeline<C, D, K> {
    /// Creates a pipeline with an explicit classifier backend.
    pub fn with_classifier(camera: C, decoder: D, classifier: K, config: CaptureConfig) -> Self {
        Self {
            camera,
            decoder,
            classifier,
            config,
            facing: FacingMode::default(),
            session: None,
            notices: NoticeBoard::default(),
            stats: PipelineStats::default(),
            on_scan: None,
        }
    }

    /// Overrides the notice display duration.
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notices = NoticeBoard::new(ttl);
        self
    }

    /// Registers a result callback, invoked at most once per session.
    pub fn on_scan(mut self, callback: impl FnMut(ScanResult) + 'static) -> Self {
        self.on_scan = Some(Box::new(callback));
        self
    }

    /// Starts a capture session for the given facing mode.
    ///
    /// Any existing session is fully stopped first; two streams are
    /// never held at once. On camera failure a notice is raised and
    /// the pipeline stays Idle.
    pub fn start(&mut self, facing: FacingMode) -> Result<(), ScanError> {
        if self.session.is_some() {
            tracing::debug!("start() while capturing; releasing previous stream");
            self.stop();
        }

        self.facing = facing;
        if let Err(e) = self.camera.open(&self.config, facing) {
            let err = ScanError::from_camera(e);
            self.stats.camera_errors += 1;
            self.notices.raise(err.notice_kind(), err.to_string());
            return Err(err);
        }

        let torch_available = self.camera.supports_torch();
        self.session = Some(CaptureSession::new(facing, torch_available));
        self.stats.sessions_started += 1;
        tracing::info!(%facing, torch_available, "Capture session started");
        Ok(())
    }

    /// Stops the active session and releases the stream. Idempotent.
    pub fn stop(&mut self) {
        self.camera.close();
        if let Some(session) = self.session.take() {
            tracing::info!(
                frames_sampled = session.frames_sampled(),
                session_ms = session.started().elapsed().as_millis() as u64,
                "Capture session stopped"
            );
        }
    }

    /// Switches to the opposite camera: stop, then start the other side.
    pub fn flip(&mut self) -> Result<(), ScanError> {
        let next = self.facing.opposite();
        self.stop();
        self.start(next)
    }

    /// Toggles the torch, if the session's device has one.
    ///
    /// Inert when no session is active or the hardware lacks a torch.
    pub fn toggle_torch(&mut self) -> TorchStatus {
        let Some(session) = self.session.as_mut() else {
            return TorchStatus::Unavailable;
        };
        if !session.torch_available() {
            return TorchStatus::Unavailable;
        }

        let target = !session.torch_on();
        match self.camera.set_torch(target) {
            Ok(()) => {
                session.set_torch_on(target);
                tracing::debug!(on = target, "Torch toggled");
                if target {
                    TorchStatus::On
                } else {
                    TorchStatus::Off
                }
            }
            Err(e) => {
                self.notices
                    .raise(NoticeKind::DeviceUnavailable, format!("torch failed: {e}"));
                if session.torch_on() {
                    TorchStatus::On
                } else {
                    TorchStatus::Off
                }
            }
        }
    }

    /// Runs one sampling step: capture a frame, try to decode, classify
    /// on a hit, and deliver.
    ///
    /// The host calls this once per display frame. A decode miss is
    /// silent. A classification failure raises a notice but keeps the
    /// session alive so the user can rescan. A capture failure raises
    /// a notice and stops the session. After a delivery the session is
    /// stopped, so further ticks are no-ops.
    pub fn tick(&mut self) -> TickOutcome {
        if self.session.is_none() {
            return TickOutcome::Idle;
        }

        let frame = match self.camera.capture() {
            Ok(frame) => frame,
            Err(e) => {
                let err = ScanError::from_camera(e);
                self.stats.camera_errors += 1;
                self.notices.raise(err.notice_kind(), err.to_string());
                self.stop();
                return TickOutcome::Idle;
            }
        };

        self.stats.frames_sampled += 1;
        if let Some(session) = self.session.as_mut() {
            session.record_frame();
        }

        let Some(payload) = self.decoder.decode(&frame) else {
            return TickOutcome::NoCode;
        };
        self.stats.decode_hits += 1;

        match self.classifier.classify(&payload) {
            Ok(result) => {
                // Release the stream before handing control to the host
                self.stop();
                self.stats.results_delivered += 1;
                tracing::info!(kind = %result.kind, "Scan delivered");
                if let Some(callback) = self.on_scan.as_mut() {
                    callback(result.clone());
                }
                TickOutcome::Delivered(result)
            }
            Err(e) => {
                let err = ScanError::ClassificationFailed(e.to_string());
                self.stats.classification_failures += 1;
                self.notices.raise(err.notice_kind(), err.to_string());
                TickOutcome::NoCode
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> ScannerState {
        if self.session.is_some() {
            ScannerState::Capturing
        } else {
            ScannerState::Idle
        }
    }

    /// Facing mode of the current or most recent session.
    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// The active session, if capturing.
    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Active transient notice, if any (expired notices clear on read).
    pub fn active_notice(&mut self) -> Option<&Notice> {
        self.notices.active()
    }

    /// Running counters.
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Total notices raised so far.
    pub fn notices_raised(&self) -> u64 {
        self.notices.raised_total()
    }

    /// Stops the session as part of host-initiated dismissal.
    ///
    /// Equivalent to `stop()`; named for the host's close path to make
    /// the teardown contract explicit at call sites.
    pub fn close(&mut self) {
        self.stop();
    }
}

impl<C, D, K> std::fmt::Debug for ScanPipeline<C, D, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanPipeline")
            .field("facing", &self.facing)
            .field("capturing", &self.session.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConfig, MockCamera, MockOpenFailure};
    use crate::classify::{ClassifyError, PayloadKind};
    use crate::decode::MockDecoder;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::Ordering;

    const ETH: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    fn small_config() -> CaptureConfig {
        CaptureConfig::with_dimensions(8, 8)
    }

    struct FailingClassifier {
        failures_left: u32,
        inner: LocalClassifier,
    }

    impl Classify for FailingClassifier {
        fn classify(&mut self, payload: &str) -> Result<ScanResult, ClassifyError> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(ClassifyError::MalformedResponse("garbage".into()));
            }
            self.inner.classify(payload)
        }
    }

    #[test]
    fn test_scan_delivers_classified_result() {
        let mut pipeline = ScanPipeline::new(
            MockCamera::new(),
            MockDecoder::after_misses(3, ETH),
            small_config(),
        );
        pipeline.start(FacingMode::Environment).unwrap();
        assert_eq!(pipeline.state(), ScannerState::Capturing);

        for _ in 0..3 {
            assert_eq!(pipeline.tick(), TickOutcome::NoCode);
        }
        match pipeline.tick() {
            TickOutcome::Delivered(result) => {
                assert_eq!(result.address, ETH);
                assert_eq!(result.kind, PayloadKind::Ethereum);
            }
            other => panic!("expected delivery, got {other:?}"),
        }
        assert_eq!(pipeline.state(), ScannerState::Idle);
        assert_eq!(pipeline.stats().results_delivered, 1);
    }

    #[test]
    fn test_delivery_is_exactly_once() {
        let deliveries = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&deliveries);

        // Decoder keeps finding the same code on every frame
        let mut pipeline = ScanPipeline::new(
            MockCamera::new(),
            MockDecoder::repeating(ETH),
            small_config(),
        )
        .on_scan(move |result| sink.borrow_mut().push(result));

        pipeline.start(FacingMode::Environment).unwrap();
        assert!(matches!(pipeline.tick(), TickOutcome::Delivered(_)));

        // Session stopped on delivery; later ticks are no-ops
        for _ in 0..5 {
            assert_eq!(pipeline.tick(), TickOutcome::Idle);
        }
        assert_eq!(deliveries.borrow().len(), 1);
        assert_eq!(pipeline.stats().results_delivered, 1);
    }

    #[test]
    fn test_start_while_capturing_holds_single_stream() {
        let camera = MockCamera::new();
        let streams = camera.stream_counter();
        let mut pipeline = ScanPipeline::new(camera, MockDecoder::never(), small_config());

        pipeline.start(FacingMode::Environment).unwrap();
        assert_eq!(streams.load(Ordering::SeqCst), 1);

        pipeline.start(FacingMode::Environment).unwrap();
        assert_eq!(streams.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let camera = MockCamera::new();
        let streams = camera.stream_counter();
        let mut pipeline = ScanPipeline::new(camera, MockDecoder::never(), small_config());

        pipeline.start(FacingMode::Environment).unwrap();
        pipeline.stop();
        assert_eq!(pipeline.state(), ScannerState::Idle);
        pipeline.stop();
        assert_eq!(pipeline.state(), ScannerState::Idle);
        assert_eq!(streams.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flip_switches_facing_without_overlap() {
        let camera = MockCamera::new();
        let streams = camera.stream_counter();
        let mut pipeline = ScanPipeline::new(camera, MockDecoder::never(), small_config());

        pipeline.start(FacingMode::Environment).unwrap();
        pipeline.flip().unwrap();
        assert_eq!(pipeline.facing(), FacingMode::User);
        assert_eq!(pipeline.state(), ScannerState::Capturing);
        assert_eq!(streams.load(Ordering::SeqCst), 1);

        pipeline.flip().unwrap();
        assert_eq!(pipeline.facing(), FacingMode::Environment);
    }

    #[test]
    fn test_permission_denied_raises_notice_and_stays_idle() {
        let mut camera = MockCamera::new();
        camera.fail_next_open(MockOpenFailure::PermissionDenied);
        let mut pipeline = ScanPipeline::new(camera, MockDecoder::never(), small_config())
            .with_notice_ttl(Duration::from_millis(20));

        let err = pipeline.start(FacingMode::Environment).unwrap_err();
        assert!(matches!(err, ScanError::PermissionDenied(_)));
        assert_eq!(pipeline.state(), ScannerState::Idle);

        let notice = pipeline.active_notice().expect("notice visible");
        assert_eq!(notice.kind(), NoticeKind::PermissionDenied);

        // Auto-clears after the display duration
        std::thread::sleep(Duration::from_millis(30));
        assert!(pipeline.active_notice().is_none());
    }

    #[test]
    fn test_device_unavailable_on_open() {
        let mut camera = MockCamera::new();
        camera.fail_next_open(MockOpenFailure::DeviceUnavailable);
        let mut pipeline = ScanPipeline::new(camera, MockDecoder::never(), small_config());

        let err = pipeline.start(FacingMode::User).unwrap_err();
        assert!(matches!(err, ScanError::DeviceUnavailable(_)));
        assert_eq!(
            pipeline.active_notice().unwrap().kind(),
            NoticeKind::DeviceUnavailable
        );
    }

    #[test]
    fn test_capture_failure_stops_session() {
        let mut camera = MockCamera::new();
        let streams = camera.stream_counter();
        // Device goes away on the first sampled frame
        camera.fail_next_capture();
        let mut pipeline =
            ScanPipeline::new(camera, MockDecoder::repeating(ETH), small_config());
        pipeline.start(FacingMode::Environment).unwrap();

        assert_eq!(pipeline.tick(), TickOutcome::Idle);
        assert_eq!(pipeline.state(), ScannerState::Idle);
        assert_eq!(streams.load(Ordering::SeqCst), 0);
        assert_eq!(
            pipeline.active_notice().unwrap().kind(),
            NoticeKind::DeviceUnavailable
        );
    }

    #[test]
    fn test_classification_failure_keeps_scanning() {
        let classifier = FailingClassifier {
            failures_left: 1,
            inner: LocalClassifier::new(),
        };
        let mut pipeline = ScanPipeline::with_classifier(
            MockCamera::new(),
            MockDecoder::repeating(ETH),
            classifier,
            small_config(),
        );

        pipeline.start(FacingMode::Environment).unwrap();

        // First hit fails to classify: notice raised, session survives
        assert_eq!(pipeline.tick(), TickOutcome::NoCode);
        assert_eq!(pipeline.state(), ScannerState::Capturing);
        assert_eq!(
            pipeline.active_notice().unwrap().kind(),
            NoticeKind::ClassificationFailed
        );

        // Rescan succeeds
        assert!(matches!(pipeline.tick(), TickOutcome::Delivered(_)));
        assert_eq!(pipeline.stats().classification_failures, 1);
    }

    #[test]
    fn test_tick_while_idle_is_noop() {
        let mut pipeline =
            ScanPipeline::new(MockCamera::new(), MockDecoder::repeating(ETH), small_config());
        assert_eq!(pipeline.tick(), TickOutcome::Idle);
        assert_eq!(pipeline.stats().frames_sampled, 0);
    }

    #[test]
    fn test_torch_unavailable_without_hardware() {
        let mut pipeline =
            ScanPipeline::new(MockCamera::new(), MockDecoder::never(), small_config());
        // No session yet
        assert_eq!(pipeline.toggle_torch(), TorchStatus::Unavailable);

        pipeline.start(FacingMode::Environment).unwrap();
        assert_eq!(pipeline.toggle_torch(), TorchStatus::Unavailable);
        // Inert, not an error: no notice raised
        assert!(pipeline.active_notice().is_none());
    }

    #[test]
    fn test_torch_toggles_and_clears_on_stop() {
        let mut pipeline = ScanPipeline::new(
            MockCamera::new().with_torch(),
            MockDecoder::never(),
            small_config(),
        );
        pipeline.start(FacingMode::Environment).unwrap();

        assert_eq!(pipeline.toggle_torch(), TorchStatus::On);
        assert!(pipeline.session().unwrap().torch_on());
        assert_eq!(pipeline.toggle_torch(), TorchStatus::Off);
        assert_eq!(pipeline.toggle_torch(), TorchStatus::On);

        pipeline.stop();
        assert!(pipeline.session().is_none());
    }

    #[test]
    fn test_close_releases_stream() {
        let camera = MockCamera::new();
        let streams = camera.stream_counter();
        let mut pipeline = ScanPipeline::new(camera, MockDecoder::never(), small_config());
        pipeline.start(FacingMode::Environment).unwrap();

        pipeline.close();
        assert_eq!(pipeline.state(), ScannerState::Idle);
        assert_eq!(streams.load(Ordering::SeqCst), 0);
    }
}
