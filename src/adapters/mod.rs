//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                       |
//! |------------|----------------|-----------------------------------|
//! | `feedback` | FeedbackPort   | Log output (stand-in for audio)   |
//! | `sim_bus`  | VehicleBus     | In-process simulated vehicle      |
//! | `time`     | Clock          | `std::time::Instant`              |

pub mod feedback;
pub mod sim_bus;
pub mod time;
