//! Inbound intents to the climate coordinator.
//!
//! Every control a UI variant offers maps to one variant here, so an
//! adapter (touch layer, scripted demo, remote console) can forward intents
//! through [`ClimateCoordinator::handle_command`](super::coordinator::ClimateCoordinator::handle_command).

use serde::{Deserialize, Serialize};

use crate::model::{BodyZone, FanDirection, TemperatureDirection};

/// Intents that UI variants can send into the climate core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ClimateCommand {
    /// Switch to the next presentation (A → B → C → A).
    CycleUiVariant,

    /// One degree warmer or cooler, applied globally.
    AdjustGlobalTemperature { direction: TemperatureDirection },

    /// Absolute target temperature (Celsius).
    SetTargetTemperature { celsius: i32 },

    /// Manual fan level.  Out-of-range values are clamped.
    SetFanSpeed { level: i32 },

    /// Air-distribution mode.
    SetFanDirection { direction: FanDirection },

    /// Temporary maximum fan.
    TriggerFanBoost,

    /// Baseline temperature and cruising fan, all transient state cleared.
    ResetToDefaults,

    /// Mannequin gesture: the occupant reports a zone feeling warm or cold.
    ZoneTouch { zone: BodyZone, felt_warm: bool },

    /// Per-zone warm button.
    ToggleWarm { zone: BodyZone },

    /// Per-zone cold button.
    ToggleCold { zone: BodyZone },
}
