//! Hardware-backed climate store.
//!
//! Bridges a [`VehicleBus`] to the [`ClimateStore`] contract.  The vehicle
//! exposes one physical temperature channel; the three UI zones are a
//! fiction layered on top, so every temperature write and every incoming
//! temperature notification lands on all zones and the global value at once.
//!
//! ```text
//!  connect():  open ─▶ resolve capability ─▶ subscribe ─▶ initial read ─▶ ready
//!
//!  bus thread ──push──▶ PropertyEventQueue ──poll_events()──▶ state
//!  write ──snap──▶ state ──(ready?)──▶ bus.write_value
//! ```
//!
//! Every bus failure is logged and swallowed.  A store that never became
//! ready still applies writes locally; the hardware write is skipped.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, error, info, warn};

use crate::app::ports::{
    ClimateStore, PropertyEvent, PropertyEventQueue, PropertyKind, RawValue, TemperatureRange,
    VehicleBus,
};
use crate::capability::{self, ClimateCapability};
use crate::model::{BodyZone, FanDirection, ZoneMap};

use super::INITIAL_TEMPERATURE_C;

// ── Fan direction bit vocabulary ──────────────────────────────

pub const FAN_DIR_FACE: i32 = 0x1;
pub const FAN_DIR_FLOOR: i32 = 0x2;
pub const FAN_DIR_DEFROST: i32 = 0x4;

/// Bus encoding of a logical air-distribution mode.
pub const fn fan_direction_mask(direction: FanDirection) -> i32 {
    match direction {
        FanDirection::Frontal => FAN_DIR_FACE,
        FanDirection::FrontalFeet => FAN_DIR_FACE | FAN_DIR_FLOOR,
        FanDirection::Feet => FAN_DIR_FLOOR,
        FanDirection::FeetWindshield => FAN_DIR_FLOOR | FAN_DIR_DEFROST,
    }
}

/// Raised with `true` once [`HardwareClimateStore::connect`] completes and
/// with `false` on disconnect.
pub type ReadySignal = Signal<CriticalSectionRawMutex, bool>;

/// Properties the store listens to.
const SUBSCRIBED: [PropertyKind; 2] = [PropertyKind::Temperature, PropertyKind::FanSpeed];

/// Climate store backed by the vehicle property bus.
pub struct HardwareClimateStore<B: VehicleBus> {
    bus: B,
    capability: ClimateCapability,
    zones: ZoneMap<i32>,
    global: i32,
    fan_speed: u8,
    ready: bool,
    subscribed: bool,
    events: Arc<PropertyEventQueue>,
    ready_signal: Arc<ReadySignal>,
}

impl<B: VehicleBus> HardwareClimateStore<B> {
    /// Wrap `bus`.  Nothing touches the bus until [`connect`](ClimateStore::connect).
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            capability: ClimateCapability::default(),
            zones: ZoneMap::splat(INITIAL_TEMPERATURE_C),
            global: INITIAL_TEMPERATURE_C,
            fan_speed: 0,
            ready: false,
            subscribed: false,
            events: Arc::new(PropertyEventQueue::new()),
            ready_signal: Arc::new(ReadySignal::new()),
        }
    }

    /// Capability in effect (defaults until connected).
    pub fn capability(&self) -> &ClimateCapability {
        &self.capability
    }

    /// Shared handle to the readiness signal.  Single consumer.
    pub fn ready_signal(&self) -> Arc<ReadySignal> {
        Arc::clone(&self.ready_signal)
    }

    /// Borrow the underlying bus (diagnostics and tests).
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Unsubscribe, then release the connection.  Never fails.
    pub fn disconnect(&mut self) {
        if self.subscribed {
            for kind in SUBSCRIBED {
                if let Err(e) = self.bus.unsubscribe(kind) {
                    warn!("HVAC: unsubscribe {:?} failed: {}", kind, e);
                }
            }
            self.subscribed = false;
        }
        self.bus.close();
        // Anything still queued belongs to the torn-down session.
        self.events.clear();
        if self.ready {
            info!("HVAC disconnected");
        }
        self.ready = false;
        self.ready_signal.signal(false);
    }

    // ── Internal ──────────────────────────────────────────────

    fn subscribe_all(&mut self) {
        let mut all_ok = true;
        for kind in SUBSCRIBED {
            if let Err(e) = self.bus.subscribe(kind, Arc::clone(&self.events)) {
                error!("HVAC: subscribe {:?} failed: {}", kind, e);
                all_ok = false;
            }
        }
        // Partial subscriptions are still torn down on disconnect.
        self.subscribed = true;
        if !all_ok {
            warn!("HVAC: running with partial change notifications");
        }
    }

    fn read_initial_values(&mut self) {
        match self
            .bus
            .read_value(PropertyKind::Temperature, self.capability.temperature_area)
        {
            Ok(raw) => self.apply_temperature(raw),
            Err(e) => warn!("HVAC: initial temperature read failed: {}", e),
        }
        match self
            .bus
            .read_value(PropertyKind::FanSpeed, self.capability.fan_area)
        {
            Ok(raw) => self.apply_fan_speed(raw),
            Err(e) => warn!("HVAC: initial fan read failed: {}", e),
        }
    }

    fn apply_event(&mut self, event: PropertyEvent) {
        match event.kind {
            PropertyKind::Temperature => self.apply_temperature(event.value),
            PropertyKind::FanSpeed => self.apply_fan_speed(event.value),
            PropertyKind::FanDirection => {}
        }
    }

    fn apply_temperature(&mut self, raw: RawValue) {
        match self.capability.normalize(raw) {
            Some(celsius) => self.mirror_all_zones(celsius),
            None => warn!("HVAC: ignoring non-finite temperature {:?}", raw),
        }
    }

    fn apply_fan_speed(&mut self, raw: RawValue) {
        let level = match raw {
            RawValue::Int(v) => v,
            RawValue::Float(v) if v.is_finite() => v as i32,
            RawValue::Float(_) => {
                warn!("HVAC: ignoring non-finite fan speed {:?}", raw);
                return;
            }
        };
        self.fan_speed = level.clamp(0, i32::from(u8::MAX)) as u8;
    }

    fn mirror_all_zones(&mut self, celsius: i32) {
        self.global = celsius;
        self.zones.fill(celsius);
    }

    fn write_temperature(&mut self, celsius: i32) {
        if !self.ready {
            debug!("HVAC: not ready, temperature {} kept local", celsius);
            return;
        }
        let raw = self.capability.encoding.encode(celsius);
        match self.bus.write_value(
            PropertyKind::Temperature,
            self.capability.temperature_area,
            raw,
        ) {
            Ok(()) => debug!("HVAC: temperature -> {:?}", raw),
            Err(e) => warn!("HVAC: failed to set temperature {}: {}", celsius, e),
        }
    }

    /// Snap, store on every zone, then push to the vehicle.
    fn commit_temperature(&mut self, requested: f32) {
        let snapped = self.capability.snap(requested);
        self.mirror_all_zones(snapped);
        self.write_temperature(snapped);
    }
}

impl<B: VehicleBus> ClimateStore for HardwareClimateStore<B> {
    fn temperature_range(&self) -> TemperatureRange {
        self.capability.range()
    }

    fn zone_temperature(&self, zone: BodyZone) -> i32 {
        self.zones[zone]
    }

    fn set_zone_temperature(&mut self, _zone: BodyZone, celsius: i32) {
        self.commit_temperature(celsius as f32);
    }

    fn adjust_zone_temperature(&mut self, zone: BodyZone, delta: i32) {
        let requested = self.zones[zone] as f32 + delta as f32;
        self.commit_temperature(requested);
    }

    fn global_temperature(&self) -> i32 {
        self.global
    }

    fn set_global_temperature(&mut self, celsius: i32) {
        self.commit_temperature(celsius as f32);
    }

    fn warm(&mut self) {
        self.commit_temperature(self.global as f32 + 1.0);
    }

    fn cool(&mut self) {
        self.commit_temperature(self.global as f32 - 1.0);
    }

    fn fan_speed(&self) -> u8 {
        self.fan_speed
    }

    fn set_fan_speed(&mut self, level: u8) {
        self.fan_speed = level;
        if !self.ready {
            debug!("HVAC: not ready, fan speed {} kept local", level);
            return;
        }
        match self.bus.write_value(
            PropertyKind::FanSpeed,
            self.capability.fan_area,
            RawValue::Int(i32::from(level)),
        ) {
            Ok(()) => debug!("HVAC: fan speed -> {}", level),
            Err(e) => warn!("HVAC: failed to set fan speed {}: {}", level, e),
        }
    }

    fn set_fan_direction(&mut self, direction: FanDirection) {
        if !self.ready {
            debug!("HVAC: not ready, fan direction {:?} dropped", direction);
            return;
        }
        let mask = fan_direction_mask(direction);
        match self.bus.write_value(
            PropertyKind::FanDirection,
            self.capability.fan_area,
            RawValue::Int(mask),
        ) {
            Ok(()) => debug!(
                "HVAC: fan direction -> {:#x} (area {})",
                mask, self.capability.fan_area
            ),
            Err(e) => warn!("HVAC: failed to set fan direction {:#x}: {}", mask, e),
        }
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn connect(&mut self) {
        if self.ready {
            return;
        }
        if let Err(e) = self.bus.open().await {
            error!("HVAC: failed to connect: {}", e);
            return;
        }
        self.capability = capability::resolve(&self.bus);
        self.subscribe_all();
        self.read_initial_values();
        self.ready = true;
        self.ready_signal.signal(true);
        info!("HVAC connected");
    }

    fn poll_events(&mut self) {
        while let Some(event) = self.events.pop() {
            self.apply_event(event);
        }
    }
}

impl<B: VehicleBus> Drop for HardwareClimateStore<B> {
    fn drop(&mut self) {
        if self.subscribed || self.ready {
            self.disconnect();
        }
    }
}
