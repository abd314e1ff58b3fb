//! Climate stores, the concrete implementations of the
//! [`ClimateStore`](crate::app::ports::ClimateStore) port.
//!
//! | Store                   | Backing            | Snapping          |
//! |-------------------------|--------------------|-------------------|
//! | `HardwareClimateStore`  | any `VehicleBus`   | resolved step     |
//! | `InMemoryClimateStore`  | none (always ready)| whole degrees only|

pub mod hardware;
pub mod memory;

pub use hardware::HardwareClimateStore;
pub use memory::InMemoryClimateStore;

/// Temperature every zone starts at before the first hardware read.
pub const INITIAL_TEMPERATURE_C: i32 = 22;
