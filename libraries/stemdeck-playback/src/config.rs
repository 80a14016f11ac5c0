//! Playback configuration
//!
//! Defaults are tuned so drift correction is inaudible as a restart but runs
//! often enough that stems never drift further apart than one threshold.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Drift correction tick interval in milliseconds (default: 250)
    pub drift_interval_ms: u64,

    /// Follower offset that triggers a snap to the leader, in milliseconds (default: 50)
    pub drift_threshold_ms: u64,

    /// Step used by seek forward/backward, in seconds (default: 10)
    pub seek_step_secs: f64,

    /// Start playing as soon as a loaded track is ready (default: true)
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            drift_interval_ms: 250,
            drift_threshold_ms: 50,
            seek_step_secs: 10.0,
            autoplay: true,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// The file may be in any format the `config` crate recognizes by
    /// extension. Environment variables prefixed with `STEMDECK_` override it,
    /// e.g. `STEMDECK_DRIFT_THRESHOLD_MS=40`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                debug!("Loading playback config from {:?}", path);
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
        }

        settings = settings.add_source(config::Environment::with_prefix("STEMDECK").try_parsing(true));

        let config: Self = settings
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.drift_interval_ms == 0 {
            return Err(PlaybackError::Config(
                "drift_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.drift_threshold_ms >= self.drift_interval_ms {
            return Err(PlaybackError::Config(format!(
                "drift_threshold_ms ({}) must be below drift_interval_ms ({})",
                self.drift_threshold_ms, self.drift_interval_ms
            )));
        }

        if !self.seek_step_secs.is_finite() || self.seek_step_secs <= 0.0 {
            return Err(PlaybackError::Config(format!(
                "seek_step_secs must be positive, got {}",
                self.seek_step_secs
            )));
        }

        Ok(())
    }

    /// Drift correction tick interval
    pub fn drift_interval(&self) -> Duration {
        Duration::from_millis(self.drift_interval_ms)
    }

    /// Drift correction threshold
    pub fn drift_threshold(&self) -> Duration {
        Duration::from_millis(self.drift_threshold_ms)
    }
}
