//! Configuration types

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slowest supported playback multiplier.
pub const MIN_PLAYBACK_SPEED: f64 = 0.25;
/// Fastest supported playback multiplier.
pub const MAX_PLAYBACK_SPEED: f64 = 4.0;
/// Tick interval at 1x playback.
pub const BASE_TICK_INTERVAL_MS: u64 = 1_000;
/// Characters of memory content shown in a step description.
pub const SUMMARY_CHARS: usize = 100;

/// Replay engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub min_speed: f64,
    pub max_speed: f64,
    /// Speed a fresh controller starts at.
    pub default_speed: f64,
    /// Interval between autoplay ticks at 1x speed
    pub base_tick_interval: Duration,
    /// Truncation length for memory content summaries
    pub summary_chars: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            min_speed: MIN_PLAYBACK_SPEED,
            max_speed: MAX_PLAYBACK_SPEED,
            default_speed: 1.0,
            base_tick_interval: Duration::from_millis(BASE_TICK_INTERVAL_MS),
            summary_chars: SUMMARY_CHARS,
        }
    }
}

impl ReplayConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_speed.is_finite() && self.min_speed > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "min_speed".to_string(),
                value: self.min_speed.to_string(),
                reason: "min_speed must be a positive finite number".to_string(),
            });
        }

        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "max_speed".to_string(),
                value: self.max_speed.to_string(),
                reason: "max_speed must be a positive finite number".to_string(),
            });
        }

        if self.min_speed > self.max_speed {
            return Err(ConfigError::IncompatibleOptions {
                option_a: format!("min_speed={}", self.min_speed),
                option_b: format!("max_speed={}", self.max_speed),
            });
        }

        if !(self.min_speed..=self.max_speed).contains(&self.default_speed) {
            return Err(ConfigError::InvalidValue {
                field: "default_speed".to_string(),
                value: self.default_speed.to_string(),
                reason: "default_speed must lie within [min_speed, max_speed]".to_string(),
            });
        }

        if self.base_tick_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "base_tick_interval".to_string(),
                value: format!("{:?}", self.base_tick_interval),
                reason: "base_tick_interval must be greater than zero".to_string(),
            });
        }

        if self.summary_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "summary_chars".to_string(),
                value: "0".to_string(),
                reason: "summary_chars must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Clamp a requested speed into the configured range.
    ///
    /// `NaN` has no meaningful clamp and yields `None`.
    pub fn clamp_speed(&self, speed: f64) -> Option<f64> {
        if speed.is_nan() {
            return None;
        }
        Some(speed.clamp(self.min_speed, self.max_speed))
    }

    /// Interval between autoplay ticks at the given speed.
    pub fn tick_interval(&self, speed: f64) -> Duration {
        let speed = self.clamp_speed(speed).unwrap_or(self.default_speed);
        self.base_tick_interval.div_f64(speed)
    }
}
