//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

use crate::pipeline::{PipelineStats, ScannerState};

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of pipeline state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether a capture session is currently active.
    pub capturing: bool,
    /// Whether the torch is currently on.
    pub torch_on: bool,
    /// Sessions started.
    pub sessions_started: u64,
    /// Frames sampled across all sessions.
    pub frames_sampled: u64,
    /// Frames that decoded to a payload.
    pub decode_hits: u64,
    /// Results delivered.
    pub results_delivered: u64,
    /// Classification failures.
    pub classification_failures: u64,
    /// Camera open/capture errors.
    pub camera_errors: u64,
    /// Transient notices raised.
    pub notices_raised: u64,
}

impl MetricsSnapshot {
    /// Builds a snapshot from pipeline observables.
    pub fn from_pipeline(
        state: ScannerState,
        torch_on: bool,
        stats: &PipelineStats,
        notices_raised: u64,
    ) -> Self {
        Self {
            capturing: state == ScannerState::Capturing,
            torch_on,
            sessions_started: stats.sessions_started,
            frames_sampled: stats.frames_sampled,
            decode_hits: stats.decode_hits,
            results_delivered: stats.results_delivered,
            classification_failures: stats.classification_failures,
            camera_errors: stats.camera_errors,
            notices_raised,
        }
    }
}

/// Prometheus metrics registry for the scan pipeline.
pub struct MetricsRegistry {
    registry: Registry,

    // Session state
    capturing: IntGauge,
    torch_on: IntGauge,
    sessions_started: IntCounter,

    // Sampling loop
    frames_sampled: IntCounter,
    decode_hits: IntCounter,
    results_delivered: IntCounter,

    // Failures
    classification_failures: IntCounter,
    camera_errors: IntCounter,
    notices_raised: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all scanner metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let capturing = IntGauge::new(
            "payscan_capturing",
            "Whether a capture session is active (1=capturing, 0=idle)",
        )?;
        let torch_on = IntGauge::new(
            "payscan_torch_on",
            "Whether the torch is on (1=on, 0=off)",
        )?;
        let sessions_started = IntCounter::new(
            "payscan_sessions_started_total",
            "Total capture sessions started",
        )?;
        let frames_sampled = IntCounter::new(
            "payscan_frames_sampled_total",
            "Total frames sampled by the scan loop",
        )?;
        let decode_hits = IntCounter::new(
            "payscan_decode_hits_total",
            "Total frames in which a QR payload was decoded",
        )?;
        let results_delivered = IntCounter::new(
            "payscan_results_delivered_total",
            "Total classified results delivered to the caller",
        )?;
        let classification_failures = IntCounter::new(
            "payscan_classification_failures_total",
            "Total classification attempts that failed",
        )?;
        let camera_errors = IntCounter::new(
            "payscan_camera_errors_total",
            "Total camera open and capture errors",
        )?;
        let notices_raised = IntCounter::new(
            "payscan_notices_raised_total",
            "Total transient error notices raised",
        )?;

        registry.register(Box::new(capturing.clone()))?;
        registry.register(Box::new(torch_on.clone()))?;
        registry.register(Box::new(sessions_started.clone()))?;
        registry.register(Box::new(frames_sampled.clone()))?;
        registry.register(Box::new(decode_hits.clone()))?;
        registry.register(Box::new(results_delivered.clone()))?;
        registry.register(Box::new(classification_failures.clone()))?;
        registry.register(Box::new(camera_errors.clone()))?;
        registry.register(Box::new(notices_raised.clone()))?;

        Ok(Self {
            registry,
            capturing,
            torch_on,
            sessions_started,
            frames_sampled,
            decode_hits,
            results_delivered,
            classification_failures,
            camera_errors,
            notices_raised,
        })
    }

    /// Updates all metrics from a snapshot of pipeline state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.capturing.set(if snapshot.capturing { 1 } else { 0 });
        self.torch_on.set(if snapshot.torch_on { 1 } else { 0 });

        // Counters advance by the delta against the snapshot totals
        advance(&self.sessions_started, snapshot.sessions_started);
        advance(&self.frames_sampled, snapshot.frames_sampled);
        advance(&self.decode_hits, snapshot.decode_hits);
        advance(&self.results_delivered, snapshot.results_delivered);
        advance(&self.classification_failures, snapshot.classification_failures);
        advance(&self.camera_errors, snapshot.camera_errors);
        advance(&self.notices_raised, snapshot.notices_raised);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}
