//! Application core: climate behaviour, zero I/O.
//!
//! The coordinator, its intents and the published snapshot live here.  All
//! interaction with the vehicle, the clock and audio happens through the
//! **port traits** in [`ports`], so this layer runs unchanged against mocks.

pub mod commands;
pub mod coordinator;
pub mod ports;
pub mod publish;
