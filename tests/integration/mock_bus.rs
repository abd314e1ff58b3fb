//! Mock adapters for integration tests.
//!
//! [`MockBus`] records every mutating bus call so tests can assert on the
//! full command history, and lets each accessor be scripted to succeed,
//! fail or report the property as absent.  [`ManualClock`] and
//! [`CountingFeedback`] are shared handles the test keeps a clone of.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use efferest_hvac::app::ports::{
    Clock, FeedbackPort, PropertyConfig, PropertyEvent, PropertyEventQueue, PropertyKind,
    RawValue, VehicleBus,
};
use efferest_hvac::error::TransportError;

pub const TEMP_AREA: i32 = 0x31;
pub const FAN_AREA: i32 = 0x75;

// ── Bus call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BusCall {
    Open,
    Close,
    Write {
        kind: PropertyKind,
        area: i32,
        value: RawValue,
    },
    Subscribe(PropertyKind),
    Unsubscribe(PropertyKind),
}

// ── MockBus ───────────────────────────────────────────────────

pub struct MockBus {
    pub calls: Vec<BusCall>,
    /// `Err` makes the descriptor query fail; `Ok(None)` means absent.
    pub temp_config: Result<Option<PropertyConfig>, TransportError>,
    pub fan_config: Result<Option<PropertyConfig>, TransportError>,
    pub min: Result<RawValue, TransportError>,
    pub max: Result<RawValue, TransportError>,
    pub temperature: Result<RawValue, TransportError>,
    pub fan_speed: Result<RawValue, TransportError>,
    pub fail_open: bool,
    pub fail_writes: Option<TransportError>,
    pub fail_subscribe: bool,
    sinks: Vec<(PropertyKind, Arc<PropertyEventQueue>)>,
}

#[allow(dead_code)]
impl MockBus {
    /// Fractional vehicle advertising `[16.0, 28.0, 0.5]` in the config array.
    pub fn fractional() -> Self {
        Self {
            calls: Vec::new(),
            temp_config: Ok(Some(PropertyConfig {
                area_ids: vec![TEMP_AREA, 0x44],
                config_array: vec![160, 280, 5],
            })),
            fan_config: Ok(Some(PropertyConfig {
                area_ids: vec![FAN_AREA],
                config_array: Vec::new(),
            })),
            min: Ok(RawValue::Float(16.0)),
            max: Ok(RawValue::Float(28.0)),
            temperature: Ok(RawValue::Float(21.0)),
            fan_speed: Ok(RawValue::Int(1)),
            fail_open: false,
            fail_writes: None,
            fail_subscribe: false,
            sinks: Vec::new(),
        }
    }

    /// Integral vehicle without a config array, bounds 17..30.
    pub fn integral() -> Self {
        Self {
            temp_config: Ok(Some(PropertyConfig {
                area_ids: vec![TEMP_AREA],
                config_array: Vec::new(),
            })),
            min: Ok(RawValue::Int(17)),
            max: Ok(RawValue::Int(30)),
            temperature: Ok(RawValue::Int(20)),
            ..Self::fractional()
        }
    }

    /// Vehicle that advertises no temperature property at all.
    pub fn absent() -> Self {
        Self {
            temp_config: Ok(None),
            fan_config: Ok(None),
            ..Self::fractional()
        }
    }

    /// Deliver a change notification as the transport thread would.
    pub fn notify(&self, kind: PropertyKind, value: RawValue) {
        let event = PropertyEvent {
            kind,
            area_id: TEMP_AREA,
            value,
        };
        for (_, sink) in self.sinks.iter().filter(|(k, _)| *k == kind) {
            sink.push(event);
        }
    }

    pub fn writes(&self) -> Vec<(PropertyKind, i32, RawValue)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                BusCall::Write { kind, area, value } => Some((kind, area, value)),
                _ => None,
            })
            .collect()
    }

    pub fn last_write(&self, kind: PropertyKind) -> Option<RawValue> {
        self.writes()
            .into_iter()
            .rev()
            .find_map(|(k, _, v)| (k == kind).then_some(v))
    }

    pub fn count(&self, call: BusCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn is_subscribed(&self, kind: PropertyKind) -> bool {
        self.sinks.iter().any(|(k, _)| *k == kind)
    }
}

impl VehicleBus for MockBus {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.calls.push(BusCall::Open);
        if self.fail_open {
            Err(TransportError::Transport)
        } else {
            Ok(())
        }
    }

    fn close(&mut self) {
        self.calls.push(BusCall::Close);
        self.sinks.clear();
    }

    fn property_config(&self, kind: PropertyKind) -> Result<Option<PropertyConfig>, TransportError> {
        match kind {
            PropertyKind::Temperature => self.temp_config.clone(),
            PropertyKind::FanSpeed => self.fan_config.clone(),
            PropertyKind::FanDirection => Ok(None),
        }
    }

    fn min_value(&self, kind: PropertyKind, _area_id: i32) -> Result<RawValue, TransportError> {
        match kind {
            PropertyKind::Temperature => self.min,
            _ => Err(TransportError::PropertyUnavailable),
        }
    }

    fn max_value(&self, kind: PropertyKind, _area_id: i32) -> Result<RawValue, TransportError> {
        match kind {
            PropertyKind::Temperature => self.max,
            _ => Err(TransportError::PropertyUnavailable),
        }
    }

    fn read_value(&self, kind: PropertyKind, _area_id: i32) -> Result<RawValue, TransportError> {
        match kind {
            PropertyKind::Temperature => self.temperature,
            PropertyKind::FanSpeed => self.fan_speed,
            PropertyKind::FanDirection => Err(TransportError::PermissionDenied),
        }
    }

    fn write_value(
        &mut self,
        kind: PropertyKind,
        area_id: i32,
        value: RawValue,
    ) -> Result<(), TransportError> {
        self.calls.push(BusCall::Write {
            kind,
            area: area_id,
            value,
        });
        match self.fail_writes {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn subscribe(
        &mut self,
        kind: PropertyKind,
        sink: Arc<PropertyEventQueue>,
    ) -> Result<(), TransportError> {
        self.calls.push(BusCall::Subscribe(kind));
        if self.fail_subscribe {
            return Err(TransportError::PermissionDenied);
        }
        self.sinks.push((kind, sink));
        Ok(())
    }

    fn unsubscribe(&mut self, kind: PropertyKind) -> Result<(), TransportError> {
        self.calls.push(BusCall::Unsubscribe(kind));
        self.sinks.retain(|(k, _)| *k != kind);
        Ok(())
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Clock that only moves when the test says so.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

// ── CountingFeedback ──────────────────────────────────────────

#[derive(Clone, Default)]
pub struct CountingFeedback(Rc<Cell<u32>>);

impl CountingFeedback {
    pub fn count(&self) -> u32 {
        self.0.get()
    }
}

impl FeedbackPort for CountingFeedback {
    fn play_feedback(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}
