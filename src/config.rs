//! Climate-control tunables
//!
//! All timing and comfort parameters used by the coordinator.
//! Values can be overridden by a JSON document supplied at start-up.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core coordinator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    // --- Timing ---
    /// Multi-zone gesture window (milliseconds since the previous touch)
    pub debounce_window_ms: u64,
    /// Fan boost duration (milliseconds)
    pub fan_boost_ms: u64,
    /// Per-zone highlight auto-revert (milliseconds)
    pub highlight_timeout_ms: u64,
    /// Transient status message lifetime (milliseconds)
    pub status_timeout_ms: u64,

    // --- Comfort ---
    /// Baseline cabin temperature (Celsius), also the reset value
    pub baseline_temperature_c: i32,
    /// Offset from the baseline applied by a zone touch (Celsius)
    pub comfort_delta_c: i32,

    // --- Fan ---
    /// Cruising fan level used after a boost and on reset
    pub cruise_fan_speed: u8,
    /// Highest fan level the UI may request
    pub max_fan_speed: u8,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            // Timing
            debounce_window_ms: 10_000,
            fan_boost_ms: 10_000,
            highlight_timeout_ms: 5_000,
            status_timeout_ms: 2_000,

            // Comfort
            baseline_temperature_c: 21,
            comfort_delta_c: 3,

            // Fan
            cruise_fan_speed: 2,
            max_fan_speed: 5,
        }
    }
}

impl ClimateConfig {
    /// Parse a JSON document and validate it. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Target temperature requested when an occupant reports feeling warm.
    pub fn cooling_target_c(&self) -> i32 {
        self.baseline_temperature_c - self.comfort_delta_c
    }

    /// Target temperature requested when an occupant reports feeling cold.
    pub fn heating_target_c(&self) -> i32 {
        self.baseline_temperature_c + self.comfort_delta_c
    }

    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1_000..=60_000).contains(&self.debounce_window_ms) {
            return Err(ConfigError::ValidationFailed(
                "debounce_window_ms must be 1000–60000",
            ));
        }
        if !(1_000..=600_000).contains(&self.fan_boost_ms) {
            return Err(ConfigError::ValidationFailed(
                "fan_boost_ms must be 1000–600000",
            ));
        }
        if !(500..=60_000).contains(&self.highlight_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "highlight_timeout_ms must be 500–60000",
            ));
        }
        if !(500..=30_000).contains(&self.status_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "status_timeout_ms must be 500–30000",
            ));
        }
        if !(10..=35).contains(&self.baseline_temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "baseline_temperature_c must be 10–35",
            ));
        }
        if !(1..=10).contains(&self.comfort_delta_c) {
            return Err(ConfigError::ValidationFailed(
                "comfort_delta_c must be 1–10",
            ));
        }
        if !(1..=10).contains(&self.max_fan_speed) {
            return Err(ConfigError::ValidationFailed(
                "max_fan_speed must be 1–10",
            ));
        }
        if self.cruise_fan_speed > self.max_fan_speed {
            return Err(ConfigError::ValidationFailed(
                "cruise_fan_speed must not exceed max_fan_speed",
            ));
        }
        Ok(())
    }
}
