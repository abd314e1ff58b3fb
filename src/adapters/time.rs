//! Monotonic clock adapter.
//!
//! Backs the [`Clock`] port with `std::time::Instant`, measured from the
//! moment the adapter is created.

use std::time::Instant;

use crate::app::ports::Clock;

/// Milliseconds since construction (monotonic).
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
