//! Unified error types for the climate-control core.
//!
//! Nothing in the core propagates these to a UI caller: transport errors
//! are absorbed where the store touches the bus, and configuration errors
//! are resolved by the composition root before the coordinator is built.
//! All variants are `Copy` so they can be logged and matched without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failure reported by the vehicle property transport.
///
/// The store treats every variant identically (log, then no-op); the
/// distinction only exists for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The head unit lacks the permission to read or write the property.
    PermissionDenied,
    /// The property (or the requested area) is not available on this vehicle.
    PropertyUnavailable,
    /// The bus connection failed or was lost.
    Transport,
    /// An operation was attempted before the connection was opened.
    NotConnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::PropertyUnavailable => write!(f, "property unavailable"),
            Self::Transport => write!(f, "transport error"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

impl core::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating [`ClimateConfig`](crate::config::ClimateConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The serialized config could not be parsed.
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl core::error::Error for ConfigError {}
