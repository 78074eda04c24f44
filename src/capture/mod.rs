//! Camera input and frame handling.
//!
//! This module provides abstractions for acquiring a camera stream and
//! sampling frames from it. The camera is treated as a source of raw
//! luminance data; QR detection happens downstream.

mod camera;
mod config;
mod frame;

pub use camera::{Camera, CameraError, MockCamera, MockOpenFailure};
pub use config::{CaptureConfig, ConfigError, FacingMode, FileConfig, NoticeConfig, ServiceConfig};
pub use frame::Frame;
