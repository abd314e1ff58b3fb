//! Port traits: the hexagonal boundary between the climate core and the outside world.
//!
//! ```text
//!   VehicleBus ──▶ ClimateStore ──▶ ClimateCoordinator ──▶ StateHandle ──▶ UI
//!                                        ▲         │
//!                                      Clock   FeedbackPort
//! ```
//!
//! Driven adapters (the vehicle property transport, the clock, audio
//! feedback) implement these traits.  The
//! [`ClimateCoordinator`](super::coordinator::ClimateCoordinator) and the
//! stores consume them via generics, so the domain core never touches a
//! transport directly and runs unchanged against mocks.
//!
//! ## Failure notes
//!
//! - Every fallible bus call returns a typed [`TransportError`].  The
//!   store absorbs them; nothing here is surfaced to the UI.
//! - [`ClimateStore`] itself is infallible by contract.

use std::cell::RefCell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Deque;

use crate::error::TransportError;
use crate::model::{BodyZone, FanDirection};

// ───────────────────────────────────────────────────────────────
// Vehicle property vocabulary
// ───────────────────────────────────────────────────────────────

/// The vehicle properties the climate core reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Target cabin temperature (Celsius).
    Temperature,
    /// Fan level (small unitless integer).
    FanSpeed,
    /// Air-distribution bitmask.
    FanDirection,
}

/// A property value as carried by the bus.
///
/// The bus stores temperature either natively fractional or integral
/// depending on the vehicle; the variant records which.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    Int(i32),
    Float(f32),
}

/// Static configuration advertised for one property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyConfig {
    /// Area ids this property can be addressed at, in advertised order.
    pub area_ids: Vec<i32>,
    /// Vendor side-channel values.  For temperature: `[min, max, step]`,
    /// each scaled by 10.
    pub config_array: Vec<i32>,
}

/// One change notification delivered by the bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyEvent {
    pub kind: PropertyKind,
    pub area_id: i32,
    pub value: RawValue,
}

/// Depth of the change-notification queue.
pub const EVENT_DEPTH: usize = 16;

/// Bounded queue the bus pushes change notifications into.
///
/// When full, the oldest notification is evicted so the newest hardware
/// value always survives a burst.
pub struct PropertyEventQueue {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Deque<PropertyEvent, EVENT_DEPTH>>>,
}

impl PropertyEventQueue {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Enqueue `event`.  Returns `true` if an older event was evicted.
    pub fn push(&self, event: PropertyEvent) -> bool {
        self.inner.lock(|q| {
            let mut q = q.borrow_mut();
            let evicted = q.is_full() && q.pop_front().is_some();
            // Cannot fail: a slot was freed above if the queue was full.
            let _ = q.push_back(event);
            evicted
        })
    }

    /// Oldest pending event, if any.
    pub fn pop(&self) -> Option<PropertyEvent> {
        self.inner.lock(|q| q.borrow_mut().pop_front())
    }

    /// Drop every pending event.
    pub fn clear(&self) {
        self.inner.lock(|q| q.borrow_mut().clear());
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|q| q.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PropertyEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Vehicle bus port (driven adapter: domain ↔ vehicle)
// ───────────────────────────────────────────────────────────────

/// The vehicle property transport.
///
/// Implementations may deliver events from any thread through
/// [`PropertyEventQueue::push`] on the queue handed to
/// [`subscribe`](Self::subscribe).
#[allow(async_fn_in_trait)]
pub trait VehicleBus {
    /// Establish the connection.  The only suspending operation.
    async fn open(&mut self) -> Result<(), TransportError>;

    /// Release the connection.  Must be safe to call in any state.
    fn close(&mut self);

    /// Advertised configuration, or `Ok(None)` if the vehicle lacks the property.
    fn property_config(&self, kind: PropertyKind) -> Result<Option<PropertyConfig>, TransportError>;

    /// Lower bound sample for `kind` at `area_id`.
    fn min_value(&self, kind: PropertyKind, area_id: i32) -> Result<RawValue, TransportError>;

    /// Upper bound sample for `kind` at `area_id`.
    fn max_value(&self, kind: PropertyKind, area_id: i32) -> Result<RawValue, TransportError>;

    /// Current value of `kind` at `area_id`.
    fn read_value(&self, kind: PropertyKind, area_id: i32) -> Result<RawValue, TransportError>;

    /// Request a new target value.
    fn write_value(
        &mut self,
        kind: PropertyKind,
        area_id: i32,
        value: RawValue,
    ) -> Result<(), TransportError>;

    /// Start delivering change notifications for `kind` into `sink`.
    fn subscribe(
        &mut self,
        kind: PropertyKind,
        sink: Arc<PropertyEventQueue>,
    ) -> Result<(), TransportError>;

    /// Stop delivering change notifications for `kind`.
    fn unsubscribe(&mut self, kind: PropertyKind) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Climate store port (domain ↔ authoritative climate state)
// ───────────────────────────────────────────────────────────────

/// Inclusive temperature bounds in whole degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureRange {
    pub min: i32,
    pub max: i32,
}

/// Read/write contract over the climate state, shared by every store.
///
/// All operations are synchronous and infallible; a store that talks to
/// hardware applies writes locally first and absorbs transport failures.
#[allow(async_fn_in_trait)]
pub trait ClimateStore {
    /// Bounds the UI should offer.
    fn temperature_range(&self) -> TemperatureRange;

    fn zone_temperature(&self, zone: BodyZone) -> i32;
    fn set_zone_temperature(&mut self, zone: BodyZone, celsius: i32);
    fn adjust_zone_temperature(&mut self, zone: BodyZone, delta: i32);

    fn global_temperature(&self) -> i32;
    fn set_global_temperature(&mut self, celsius: i32);

    /// One degree warmer, applied globally.
    fn warm(&mut self);
    /// One degree cooler, applied globally.
    fn cool(&mut self);

    fn fan_speed(&self) -> u8;
    fn set_fan_speed(&mut self, level: u8);

    /// Apply an air-distribution mode.  Stores without a direction
    /// concept ignore it.
    fn set_fan_direction(&mut self, _direction: FanDirection) {}

    /// Whether writes currently reach the backing system.
    fn is_ready(&self) -> bool {
        true
    }

    /// Establish any backing connection.  Stores without one return at once.
    async fn connect(&mut self) {}

    /// Apply queued change notifications from the backing system.
    fn poll_events(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: monotonic time → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock used for every timer and the debounce window.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Feedback port (driven adapter: domain → audio)
// ───────────────────────────────────────────────────────────────

/// Audible acknowledgement of a user action.
///
/// Owned and lifecycle-managed by the composition root; the core only
/// calls it.
pub trait FeedbackPort {
    fn play_feedback(&mut self);
}
