//! Pure software climate store.
//!
//! Used when no vehicle bus is available (development, demos, tests).
//! Fixed bounds, whole-degree arithmetic, no connection lifecycle.

use crate::app::ports::{ClimateStore, TemperatureRange};
use crate::model::{BodyZone, ZoneMap};

use super::INITIAL_TEMPERATURE_C;

pub const MIN_TEMPERATURE_C: i32 = 16;
pub const MAX_TEMPERATURE_C: i32 = 28;
pub const MAX_FAN_SPEED: u8 = 5;

/// Climate state held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryClimateStore {
    zones: ZoneMap<i32>,
    global: i32,
    fan_speed: u8,
}

impl Default for InMemoryClimateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClimateStore {
    pub fn new() -> Self {
        Self {
            zones: ZoneMap::splat(INITIAL_TEMPERATURE_C),
            global: INITIAL_TEMPERATURE_C,
            fan_speed: 0,
        }
    }

    fn clamp(celsius: i32) -> i32 {
        celsius.clamp(MIN_TEMPERATURE_C, MAX_TEMPERATURE_C)
    }
}

impl ClimateStore for InMemoryClimateStore {
    fn temperature_range(&self) -> TemperatureRange {
        TemperatureRange {
            min: MIN_TEMPERATURE_C,
            max: MAX_TEMPERATURE_C,
        }
    }

    fn zone_temperature(&self, zone: BodyZone) -> i32 {
        self.zones[zone]
    }

    fn set_zone_temperature(&mut self, zone: BodyZone, celsius: i32) {
        self.zones[zone] = Self::clamp(celsius);
    }

    fn adjust_zone_temperature(&mut self, zone: BodyZone, delta: i32) {
        self.zones[zone] = Self::clamp(self.zones[zone].saturating_add(delta));
    }

    fn global_temperature(&self) -> i32 {
        self.global
    }

    fn set_global_temperature(&mut self, celsius: i32) {
        self.global = Self::clamp(celsius);
        self.zones.fill(self.global);
    }

    fn warm(&mut self) {
        self.set_global_temperature(self.global.saturating_add(1));
    }

    fn cool(&mut self) {
        self.set_global_temperature(self.global.saturating_sub(1));
    }

    fn fan_speed(&self) -> u8 {
        self.fan_speed
    }

    fn set_fan_speed(&mut self, level: u8) {
        self.fan_speed = level.min(MAX_FAN_SPEED);
    }
}
