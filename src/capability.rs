//! Capability resolution for the temperature and fan properties.
//!
//! The vehicle advertises temperature bounds in one of several ways, any of
//! which may be missing or fail on access.  Resolution walks the tiers in
//! order and never fails:
//!
//! ```text
//!  property_config(Temperature) ── absent/err ──▶ defaults {16, 28, 0.5, Fractional}
//!        │
//!        ├─ area      = first advertised id (0 if none)
//!        ├─ encoding  = type of min_value sample (Fractional if unknown)
//!        └─ bounds    = config_array [min*10, max*10, step*10] if consistent
//!                       else min_value / max_value (16 / 28 on failure),
//!                            step 0.5 (Fractional) or 1.0 (Integral)
//!
//!  property_config(FanSpeed) ──▶ fan area = first advertised id (0 if none)
//! ```

use log::{debug, info, warn};

use crate::app::ports::{PropertyKind, RawValue, TemperatureRange, VehicleBus};

/// Bounds applied whenever the descriptor cannot be trusted.
pub const DEFAULT_MIN_TEMPERATURE_C: i32 = 16;
pub const DEFAULT_MAX_TEMPERATURE_C: i32 = 28;
pub const DEFAULT_STEP_C: f32 = 0.5;

/// Side-channel values are scaled by this factor.
const CONFIG_ARRAY_SCALE: f32 = 10.0;

/// Slack absorbed when truncating a snapped grid value to whole degrees.
const SNAP_EPSILON: f32 = 1e-3;

/// Native numeric encoding of the temperature property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureEncoding {
    Fractional,
    Integral,
}

impl TemperatureEncoding {
    /// Step used when the vehicle does not advertise one.
    pub const fn default_step(self) -> f32 {
        match self {
            Self::Fractional => 0.5,
            Self::Integral => 1.0,
        }
    }

    /// Encode a whole-degree value for the bus.
    pub fn encode(self, celsius: i32) -> RawValue {
        match self {
            Self::Fractional => RawValue::Float(celsius as f32),
            Self::Integral => RawValue::Int(celsius),
        }
    }
}

/// Resolved description of what the vehicle accepts.
///
/// Invariant: `min_temperature < max_temperature` and `step > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateCapability {
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub step: f32,
    pub encoding: TemperatureEncoding,
    pub temperature_area: i32,
    pub fan_area: i32,
}

impl Default for ClimateCapability {
    fn default() -> Self {
        Self {
            min_temperature: DEFAULT_MIN_TEMPERATURE_C,
            max_temperature: DEFAULT_MAX_TEMPERATURE_C,
            step: DEFAULT_STEP_C,
            encoding: TemperatureEncoding::Fractional,
            temperature_area: 0,
            fan_area: 0,
        }
    }
}

impl ClimateCapability {
    pub fn range(&self) -> TemperatureRange {
        TemperatureRange {
            min: self.min_temperature,
            max: self.max_temperature,
        }
    }

    /// Clamp `requested` into the bounds, round to the nearest step counted
    /// from the minimum, and truncate to whole degrees.
    ///
    /// A step whose grid skips whole degrees (0.3, 1.5) is widened to the
    /// next whole degree first, so every result is its own snap.
    pub fn snap(&self, requested: f32) -> i32 {
        let min = self.min_temperature as f32;
        let max = self.max_temperature as f32;
        let requested = if requested.is_finite() { requested } else { min };
        let clamped = requested.clamp(min, max);
        let step = self.snap_step();
        let steps = ((clamped - min) / step).round();
        let on_grid = min + steps * step;
        let whole = (on_grid + SNAP_EPSILON).floor() as i32;
        whole.clamp(self.min_temperature, self.max_temperature)
    }

    fn snap_step(&self) -> f32 {
        let step = self.step;
        let per_degree = if step >= 1.0 { step } else { 1.0 / step };
        if (per_degree - per_degree.round()).abs() < SNAP_EPSILON {
            step
        } else {
            step.ceil()
        }
    }

    /// Normalize a raw bus value into a stored temperature.
    /// Returns `None` for non-finite readings.
    pub fn normalize(&self, raw: RawValue) -> Option<i32> {
        let celsius = match raw {
            RawValue::Float(v) if v.is_finite() => v,
            RawValue::Float(_) => return None,
            RawValue::Int(v) => v as f32,
        };
        Some(self.snap(celsius))
    }
}

// ───────────────────────────────────────────────────────────────
// Resolution
// ───────────────────────────────────────────────────────────────

/// Derive the capability from the bus.  Never fails.
pub fn resolve(bus: &impl VehicleBus) -> ClimateCapability {
    let mut cap = resolve_temperature(bus);
    cap.fan_area = resolve_fan_area(bus);
    info!(
        "Capability: {}..{}\u{00b0}C step {} {:?} (temp area {}, fan area {})",
        cap.min_temperature,
        cap.max_temperature,
        cap.step,
        cap.encoding,
        cap.temperature_area,
        cap.fan_area
    );
    cap
}

fn resolve_temperature(bus: &impl VehicleBus) -> ClimateCapability {
    let config = match bus.property_config(PropertyKind::Temperature) {
        Ok(Some(cfg)) => cfg,
        Ok(None) => {
            warn!("Capability: temperature descriptor absent, using defaults");
            return ClimateCapability::default();
        }
        Err(e) => {
            warn!("Capability: temperature descriptor query failed ({}), using defaults", e);
            return ClimateCapability::default();
        }
    };

    let area = config.area_ids.first().copied().unwrap_or(0);
    let min_sample = bus.min_value(PropertyKind::Temperature, area).ok();
    let encoding = match min_sample {
        Some(RawValue::Int(_)) => TemperatureEncoding::Integral,
        Some(RawValue::Float(_)) | None => TemperatureEncoding::Fractional,
    };

    let (min, max, step) = match bounds_from_config_array(&config.config_array) {
        Some(triple) => {
            debug!("Capability: bounds from config array {:?}", config.config_array);
            triple
        }
        None => {
            let min = min_sample
                .and_then(whole_degrees)
                .unwrap_or(DEFAULT_MIN_TEMPERATURE_C);
            let max = bus
                .max_value(PropertyKind::Temperature, area)
                .ok()
                .and_then(whole_degrees)
                .unwrap_or(DEFAULT_MAX_TEMPERATURE_C);
            (min, max, encoding.default_step())
        }
    };

    if min >= max || step <= 0.0 || !step.is_finite() {
        warn!(
            "Capability: inconsistent bounds {}..{} step {}, using defaults",
            min, max, step
        );
        return ClimateCapability {
            temperature_area: area,
            ..ClimateCapability::default()
        };
    }

    ClimateCapability {
        min_temperature: min,
        max_temperature: max,
        step,
        encoding,
        temperature_area: area,
        fan_area: 0,
    }
}

/// `[min*10, max*10, step*10]`, accepted only when internally consistent.
fn bounds_from_config_array(array: &[i32]) -> Option<(i32, i32, f32)> {
    let [min, max, step, ..] = *array else {
        return None;
    };
    let min_c = (min as f32 / CONFIG_ARRAY_SCALE) as i32;
    let max_c = (max as f32 / CONFIG_ARRAY_SCALE) as i32;
    let step_c = step as f32 / CONFIG_ARRAY_SCALE;
    (min_c < max_c && step_c > 0.0).then_some((min_c, max_c, step_c))
}

fn whole_degrees(raw: RawValue) -> Option<i32> {
    match raw {
        RawValue::Int(v) => Some(v),
        RawValue::Float(v) if v.is_finite() => Some(v as i32),
        RawValue::Float(_) => None,
    }
}

fn resolve_fan_area(bus: &impl VehicleBus) -> i32 {
    match bus.property_config(PropertyKind::FanSpeed) {
        Ok(Some(cfg)) => cfg.area_ids.first().copied().unwrap_or(0),
        Ok(None) => 0,
        Err(e) => {
            warn!("Capability: fan descriptor query failed ({})", e);
            0
        }
    }
}
