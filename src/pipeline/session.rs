//! Capture session state.

use crate::capture::FacingMode;
use std::time::Instant;

/// One active camera acquisition.
///
/// Exists only while the pipeline is capturing; dropped when the
/// stream is released. At most one session exists per pipeline.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    facing: FacingMode,
    torch_available: bool,
    torch_on: bool,
    frames_sampled: u64,
    started: Instant,
}

impl CaptureSession {
    /// Creates a session for a freshly opened stream.
    ///
    /// Torch capability is queried once here and held for the life of
    /// the session.
    pub fn new(facing: FacingMode, torch_available: bool) -> Self {
        Self {
            facing,
            torch_available,
            torch_on: false,
            frames_sampled: 0,
            started: Instant::now(),
        }
    }

    /// Facing mode this session was opened with.
    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Whether the device exposes a torch.
    pub fn torch_available(&self) -> bool {
        self.torch_available
    }

    /// Whether the torch is currently on.
    pub fn torch_on(&self) -> bool {
        self.torch_on
    }

    pub(crate) fn set_torch_on(&mut self, on: bool) {
        self.torch_on = on;
    }

    /// Frames sampled so far in this session.
    pub fn frames_sampled(&self) -> u64 {
        self.frames_sampled
    }

    pub(crate) fn record_frame(&mut self) {
        self.frames_sampled += 1;
    }

    /// When the stream was acquired.
    pub fn started(&self) -> Instant {
        self.started
    }
}
