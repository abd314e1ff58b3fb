//! Efferest HVAC climate-control core.
//!
//! Bridges a vehicle property bus to a consistent UI model shared by the
//! three head-unit presentations.  The library is transport-agnostic: the
//! bus, the clock and audio feedback are injected through the port traits
//! in [`app::ports`], and the in-process adapters in [`adapters`] make the
//! whole core runnable on a host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod capability;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod timers;
