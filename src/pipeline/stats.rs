//! Pipeline counters, the raw feed for the metrics registry.

/// Running totals for one pipeline instance.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Sessions successfully started.
    pub sessions_started: u64,
    /// Frames sampled across all sessions.
    pub frames_sampled: u64,
    /// Frames in which a QR payload was decoded.
    pub decode_hits: u64,
    /// Results delivered to the caller.
    pub results_delivered: u64,
    /// Classification attempts that failed.
    pub classification_failures: u64,
    /// Camera errors (open or capture).
    pub camera_errors: u64,
}
