//! Camera abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.

use super::{CaptureConfig, FacingMode, Frame};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("torch not supported by this device")]
    TorchUnsupported,
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
///
/// This abstraction allows swapping between real camera hardware
/// and mock implementations for testing. Implementations own at most
/// one device stream; `open` on an already-open camera must not
/// acquire a second one.
pub trait Camera {
    /// Opens and initializes the camera for the given facing mode.
    fn open(&mut self, config: &CaptureConfig, facing: FacingMode) -> Result<(), CameraError>;

    /// Captures a single frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Reports whether the device exposes a torch (flashlight).
    ///
    /// Queried once per session; the answer must be stable while open.
    fn supports_torch(&self) -> bool;

    /// Turns the torch on or off.
    fn set_torch(&mut self, on: bool) -> Result<(), CameraError>;

    /// Closes the camera and releases the device stream.
    fn close(&mut self);
}

/// Scripted failure for [`MockCamera::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOpenFailure {
    /// The user denied the permission prompt.
    PermissionDenied,
    /// No usable device for the requested facing mode.
    DeviceUnavailable,
}

/// Mock camera for testing that generates synthetic frames.
///
/// Tracks concurrently open streams through a shared counter so tests
/// can assert that no second stream is ever acquired.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    facing: FacingMode,
    sequence: u64,
    torch_supported: bool,
    torch_on: bool,
    fail_open: Option<MockOpenFailure>,
    fail_capture: bool,
    open_streams: Arc<AtomicU32>,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `supports_torch` report true.
    pub fn with_torch(mut self) -> Self {
        self.torch_supported = true;
        self
    }

    /// Makes the next `open` call fail with the given reason.
    pub fn fail_next_open(&mut self, failure: MockOpenFailure) {
        self.fail_open = Some(failure);
    }

    /// Makes the next `capture` call fail, simulating device loss.
    pub fn fail_next_capture(&mut self) {
        self.fail_capture = true;
    }

    /// Returns the shared open-stream counter.
    pub fn stream_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.open_streams)
    }

    /// Returns the facing mode of the current stream.
    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Returns whether the torch is currently on.
    pub fn torch_on(&self) -> bool {
        self.torch_on
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig, facing: FacingMode) -> Result<(), CameraError> {
        if let Some(failure) = self.fail_open.take() {
            return Err(match failure {
                MockOpenFailure::PermissionDenied => {
                    CameraError::PermissionDenied("user dismissed the prompt".into())
                }
                MockOpenFailure::DeviceUnavailable => {
                    CameraError::DeviceNotFound(format!("no {facing} device"))
                }
            });
        }
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        if self.config.is_none() {
            self.open_streams.fetch_add(1, Ordering::SeqCst);
        }
        self.config = Some(config.clone());
        self.facing = facing;
        self.sequence = 0;
        tracing::info!(%facing, "MockCamera opened");
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        if self.fail_capture {
            self.fail_capture = false;
            return Err(CameraError::CaptureFailed("device went away".into()));
        }

        // Synthetic gradient pattern, enough to exercise frame handling
        let pixel_count = (config.width as usize) * (config.height as usize);
        let pixels: Vec<u8> = (0..pixel_count)
            .map(|i| ((i as u64 ^ self.sequence) % 256) as u8)
            .collect();

        self.sequence += 1;
        Ok(Frame::new(pixels, config.width, config.height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn supports_torch(&self) -> bool {
        self.torch_supported
    }

    fn set_torch(&mut self, on: bool) -> Result<(), CameraError> {
        if self.config.is_none() {
            return Err(CameraError::NotInitialized);
        }
        if !self.torch_supported {
            return Err(CameraError::TorchUnsupported);
        }
        self.torch_on = on;
        Ok(())
    }

    fn close(&mut self) {
        if self.config.take().is_some() {
            self.open_streams.fetch_sub(1, Ordering::SeqCst);
            tracing::info!("MockCamera closed");
        }
        self.torch_on = false;
    }
}
