//! Engine configuration, loaded from JSON and overridden from the command line.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use wraith_ecs::ManagerConfig;

/// Configuration for the engine frame loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target frames per second.
    pub frame_rate: f64,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_frames: u64,
    /// Settings passed through to the entity manager.
    pub manager: ManagerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 0,
            manager: ManagerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read a config from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid JSON, or describes an
    /// invalid config.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("loading config file {}", path.display()))
    }

    /// Parse a config from a JSON string.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or an invalid config.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails if the frame rate is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.frame_rate.is_finite() && self.frame_rate > 0.0,
            "frame_rate must be positive, got {}",
            self.frame_rate
        );
        Ok(())
    }

    /// Wall-clock budget of one frame. Zero for a frame rate that fails
    /// [`validate`](Self::validate).
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        if self.validate().is_err() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(1.0 / self.frame_rate).unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.frame_rate, 60.0);
        assert_eq!(config.max_frames, 0);
        assert_eq!(config.manager.cleanup_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{ "max_frames": 120 }"#).unwrap();
        assert_eq!(config.max_frames, 120);
        assert_eq!(config.frame_rate, 60.0);
    }

    #[test]
    fn test_nested_manager_config() {
        let config = EngineConfig::from_json(
            r#"{ "frame_rate": 30.0, "manager": { "cleanup_interval_ms": 500 } }"#,
        )
        .unwrap();
        assert_eq!(config.frame_rate, 30.0);
        assert_eq!(config.manager.cleanup_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_rejects_zero_frame_rate() {
        assert!(EngineConfig::from_json(r#"{ "frame_rate": 0.0 }"#).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(EngineConfig::from_json("{ frame_rate: ").is_err());
    }

    #[test]
    fn test_frame_duration() {
        let config = EngineConfig {
            frame_rate: 50.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.frame_duration(), Duration::from_millis(20));
    }

    #[test]
    fn test_frame_duration_of_invalid_rate_is_zero() {
        let config = EngineConfig {
            frame_rate: 0.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.frame_duration(), Duration::ZERO);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/wraith.json")).unwrap_err();
        assert!(err.to_string().contains("reading config file"));
    }
}
