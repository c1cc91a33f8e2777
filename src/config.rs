//! Scan session configuration.
//!
//! A [`ScanConfig`] is fixed for the lifetime of a scan attempt: it is
//! validated up front and never mutated after the session starts.

use crate::constraints::FacingMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Interior decode region of the video surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanBox {
    /// Region width in pixels.
    pub width: u32,
    /// Region height in pixels.
    pub height: u32,
}

/// Immutable configuration for one scan attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Target frame-sampling rate for the decode engine.
    pub fps: u32,
    /// Interior scan-box size.
    pub scan_box: ScanBox,
    /// Aspect ratio requested for the video surface.
    pub aspect_ratio: f64,
    /// Facing the session prefers when selecting constraints.
    pub preferred_facing: FacingMode,
    /// Total acquisition attempts per constraint choice.
    pub max_attempts: u32,
    /// Backoff between acquisition attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fps: 15,
            scan_box: ScanBox {
                width: 250,
                height: 250,
            },
            aspect_ratio: 1.0,
            preferred_facing: FacingMode::Environment,
            max_attempts: 2,
            backoff_ms: 1000,
        }
    }
}

impl ScanConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 || self.fps > 60 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if self.scan_box.width == 0 || self.scan_box.height == 0 {
            return Err(ConfigError::InvalidScanBox);
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(ConfigError::InvalidAspectRatio);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidAttempts);
        }
        Ok(())
    }

    /// Interval between sampled frames at the configured rate.
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }

    /// Backoff between acquisition attempts.
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Sampling rate outside 1-60 fps.
    #[error("invalid frame-sampling rate (must be 1-60 fps)")]
    InvalidFrameRate,
    /// Zero-sized scan box.
    #[error("invalid scan-box dimensions")]
    InvalidScanBox,
    /// Non-positive or non-finite aspect ratio.
    #[error("invalid aspect ratio")]
    InvalidAspectRatio,
    /// Zero acquisition attempts.
    #[error("invalid attempt count (must be at least 1)")]
    InvalidAttempts,
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Config file could not be parsed.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Scan session settings.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.scan.validate()?;
        Ok(config)
    }
}
