//! Session configuration
//!
//! Every field has a default, so a partial (or empty) JSON document is a
//! valid configuration.

use std::time::Duration;

use park_core::{Locator, ParkError, ParkResult};
use park_motion::SmootherConfig;
use serde::{Deserialize, Serialize};

/// Tunables of a presence session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkConfig {
    /// Samples further apart than this are jumps, not glides (ms)
    pub smoothing_max_interval_ms: u32,

    /// Samples closer together than this are placed directly (ms)
    pub smoothing_min_frame_ms: u32,

    /// Moves shorter than this from rest are placed directly (px)
    pub smoothing_snap_distance: f64,

    /// Spline points kept per remote avatar once at rest
    pub smoothing_history: usize,

    /// Track nudge per arrow key press (px)
    pub nudge_step: f64,

    /// Sprite width at scale 1 (px)
    pub avatar_base_width: f64,

    /// Duration of the slide descent (ms)
    pub slide_duration_ms: u64,

    /// Locator of the root presence space
    pub root_locator: String,
}

impl Default for ParkConfig {
    fn default() -> Self {
        ParkConfig {
            smoothing_max_interval_ms: 100,
            smoothing_min_frame_ms: 16,
            smoothing_snap_distance: 4.0,
            smoothing_history: 16,
            nudge_step: 2.0,
            avatar_base_width: 12.0,
            slide_duration_ms: 600,
            root_locator: String::from("cursor-park"),
        }
    }
}

impl ParkConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> ParkResult<Self> {
        let config: ParkConfig =
            serde_json::from_str(json).map_err(|e| ParkError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ParkResult<()> {
        if !self.avatar_base_width.is_finite() || self.avatar_base_width <= 0.0 {
            return Err(ParkError::InvalidConfig(format!(
                "avatar_base_width must be positive, got {}",
                self.avatar_base_width
            )));
        }
        if !self.nudge_step.is_finite() || self.nudge_step <= 0.0 {
            return Err(ParkError::InvalidConfig(format!(
                "nudge_step must be positive, got {}",
                self.nudge_step
            )));
        }
        if self.smoothing_snap_distance < 0.0 {
            return Err(ParkError::InvalidConfig(
                "smoothing_snap_distance must not be negative".into(),
            ));
        }
        if self.smoothing_min_frame_ms > self.smoothing_max_interval_ms {
            return Err(ParkError::InvalidConfig(
                "smoothing_min_frame_ms exceeds smoothing_max_interval_ms".into(),
            ));
        }
        if self.root_locator.trim().is_empty() {
            return Err(ParkError::InvalidConfig("root_locator is empty".into()));
        }
        Ok(())
    }

    pub fn smoother(&self) -> SmootherConfig {
        SmootherConfig {
            max_interval_ms: self.smoothing_max_interval_ms,
            min_frame_ms: self.smoothing_min_frame_ms,
            snap_distance: self.smoothing_snap_distance,
            history: self.smoothing_history,
        }
    }

    pub fn root(&self) -> Locator {
        Locator::new(self.root_locator.as_str())
    }

    pub fn slide_duration(&self) -> Duration {
        Duration::from_millis(self.slide_duration_ms)
    }

    /// Rendered width of an avatar at `scale`
    pub fn avatar_width(&self, scale: f64) -> f64 {
        self.avatar_base_width * scale
    }
}
