//! Simulated vehicle property bus.
//!
//! An in-process stand-in for the vehicle transport, used by the demo
//! binary and during development without a car.  It advertises a
//! fractional temperature property (16..28 °C, 0.5 step via the config
//! array) and echoes every accepted write back as a change notification,
//! the way the real vehicle confirms a new target.
//!
//! Clones share one simulated vehicle, so a clone kept outside the store
//! can play the role of a physical knob via [`SimulatedBus::inject`].

use core::cell::RefCell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, warn};

use crate::app::ports::{
    PropertyConfig, PropertyEvent, PropertyEventQueue, PropertyKind, RawValue, VehicleBus,
};
use crate::error::TransportError;

/// Area id the simulated vehicle advertises for every property.
pub const SIM_AREA: i32 = 0x31;

struct SimVehicle {
    open: bool,
    temperature: f32,
    fan_speed: i32,
    fan_direction: i32,
    sinks: Vec<(PropertyKind, Arc<PropertyEventQueue>)>,
}

impl SimVehicle {
    fn value(&self, kind: PropertyKind) -> RawValue {
        match kind {
            PropertyKind::Temperature => RawValue::Float(self.temperature),
            PropertyKind::FanSpeed => RawValue::Int(self.fan_speed),
            PropertyKind::FanDirection => RawValue::Int(self.fan_direction),
        }
    }

    fn store(&mut self, kind: PropertyKind, value: RawValue) {
        match (kind, value) {
            (PropertyKind::Temperature, RawValue::Float(v)) => self.temperature = v,
            (PropertyKind::Temperature, RawValue::Int(v)) => self.temperature = v as f32,
            (PropertyKind::FanSpeed, RawValue::Int(v)) => self.fan_speed = v,
            (PropertyKind::FanSpeed, RawValue::Float(v)) => self.fan_speed = v as i32,
            (PropertyKind::FanDirection, RawValue::Int(v)) => self.fan_direction = v,
            (PropertyKind::FanDirection, RawValue::Float(v)) => self.fan_direction = v as i32,
        }
    }

    fn notify(&self, kind: PropertyKind, value: RawValue) {
        let event = PropertyEvent {
            kind,
            area_id: SIM_AREA,
            value,
        };
        for (_, sink) in self.sinks.iter().filter(|(k, _)| *k == kind) {
            if sink.push(event) {
                warn!("SIM | event queue full, evicted oldest before {:?}", event);
            }
        }
    }
}

/// Cloneable handle onto one simulated vehicle.
#[derive(Clone)]
pub struct SimulatedBus {
    vehicle: Arc<Mutex<CriticalSectionRawMutex, RefCell<SimVehicle>>>,
}

impl Default for SimulatedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBus {
    /// A parked car: 22 °C target, fan off, face vents.
    pub fn new() -> Self {
        Self {
            vehicle: Arc::new(Mutex::new(RefCell::new(SimVehicle {
                open: false,
                temperature: 22.0,
                fan_speed: 0,
                fan_direction: 0x1,
                sinks: Vec::new(),
            }))),
        }
    }

    /// Change a property from outside the head unit (physical knob,
    /// another occupant) and notify subscribers.
    pub fn inject(&self, kind: PropertyKind, value: RawValue) {
        self.with(|v| {
            v.store(kind, value);
            v.notify(kind, value);
        });
        debug!("SIM | external {:?} -> {:?}", kind, value);
    }

    /// Current simulated value of `kind`.
    pub fn current(&self, kind: PropertyKind) -> RawValue {
        self.with(|v| v.value(kind))
    }

    pub fn is_open(&self) -> bool {
        self.with(|v| v.open)
    }

    fn with<R>(&self, f: impl FnOnce(&mut SimVehicle) -> R) -> R {
        self.vehicle.lock(|cell| f(&mut cell.borrow_mut()))
    }

    fn require_open(&self) -> Result<(), TransportError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

impl VehicleBus for SimulatedBus {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.with(|v| v.open = true);
        debug!("SIM | connection open");
        Ok(())
    }

    fn close(&mut self) {
        self.with(|v| {
            v.open = false;
            v.sinks.clear();
        });
        debug!("SIM | connection closed");
    }

    fn property_config(&self, kind: PropertyKind) -> Result<Option<PropertyConfig>, TransportError> {
        self.require_open()?;
        let config_array = match kind {
            PropertyKind::Temperature => vec![160, 280, 5],
            PropertyKind::FanSpeed | PropertyKind::FanDirection => Vec::new(),
        };
        Ok(Some(PropertyConfig {
            area_ids: vec![SIM_AREA],
            config_array,
        }))
    }

    fn min_value(&self, kind: PropertyKind, _area_id: i32) -> Result<RawValue, TransportError> {
        self.require_open()?;
        match kind {
            PropertyKind::Temperature => Ok(RawValue::Float(16.0)),
            PropertyKind::FanSpeed => Ok(RawValue::Int(0)),
            PropertyKind::FanDirection => Err(TransportError::PropertyUnavailable),
        }
    }

    fn max_value(&self, kind: PropertyKind, _area_id: i32) -> Result<RawValue, TransportError> {
        self.require_open()?;
        match kind {
            PropertyKind::Temperature => Ok(RawValue::Float(28.0)),
            PropertyKind::FanSpeed => Ok(RawValue::Int(5)),
            PropertyKind::FanDirection => Err(TransportError::PropertyUnavailable),
        }
    }

    fn read_value(&self, kind: PropertyKind, _area_id: i32) -> Result<RawValue, TransportError> {
        self.require_open()?;
        Ok(self.current(kind))
    }

    fn write_value(
        &mut self,
        kind: PropertyKind,
        area_id: i32,
        value: RawValue,
    ) -> Result<(), TransportError> {
        self.require_open()?;
        if area_id != SIM_AREA {
            return Err(TransportError::PropertyUnavailable);
        }
        self.with(|v| {
            v.store(kind, value);
            v.notify(kind, value);
        });
        Ok(())
    }

    fn subscribe(
        &mut self,
        kind: PropertyKind,
        sink: Arc<PropertyEventQueue>,
    ) -> Result<(), TransportError> {
        self.require_open()?;
        self.with(|v| {
            v.sinks.retain(|(k, _)| *k != kind);
            v.sinks.push((kind, sink));
        });
        Ok(())
    }

    fn unsubscribe(&mut self, kind: PropertyKind) -> Result<(), TransportError> {
        self.with(|v| v.sinks.retain(|(k, _)| *k != kind));
        Ok(())
    }
}
