//! Camera acquisition configuration.
//!
//! Resolution targets are "ideal" in the browser-constraint sense:
//! the camera may deliver the closest mode it supports.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which physical camera to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, the default for scanning.
    Environment,
    /// Front camera.
    User,
}

impl FacingMode {
    /// Returns the other facing mode, used by camera flip.
    pub fn opposite(self) -> Self {
        match self {
            FacingMode::Environment => FacingMode::User,
            FacingMode::User => FacingMode::Environment,
        }
    }
}

impl Default for FacingMode {
    fn default() -> Self {
        FacingMode::Environment
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "environment" => Ok(FacingMode::Environment),
            "user" => Ok(FacingMode::User),
            other => Err(format!("unknown facing mode: {other}")),
        }
    }
}

/// Configuration for camera acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Ideal frame width in pixels.
    pub width: u32,
    /// Ideal frame height in pixels.
    pub height: u32,
    /// Target sampling rate in frames per second.
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    #[error("invalid notice duration (must be nonzero)")]
    InvalidNoticeDuration,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub notice: NoticeConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Transient error-notice configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// How long a notice stays visible before auto-clearing, in milliseconds.
    pub display_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self { display_ms: 3000 }
    }
}

/// HTTP service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service port (0 to disable).
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { port: 9090 }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        if self.notice.display_ms == 0 {
            return Err(ConfigError::InvalidNoticeDuration);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_facing_mode_opposite() {
        assert_eq!(FacingMode::Environment.opposite(), FacingMode::User);
        assert_eq!(FacingMode::User.opposite(), FacingMode::Environment);
    }

    #[test]
    fn test_facing_mode_parse() {
        assert_eq!(
            "environment".parse::<FacingMode>().unwrap(),
            FacingMode::Environment
        );
        assert!("sideways".parse::<FacingMode>().is_err());
    }

    #[test]
    fn test_zero_notice_duration_invalid() {
        let mut config = FileConfig::default();
        config.notice.display_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNoticeDuration)
        ));
    }
}
