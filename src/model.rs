//! Shared domain vocabulary and the published UI snapshot.
//!
//! Everything here is plain data: zones, highlight tags, fan directions,
//! and [`ClimateUiState`], the immutable snapshot that UI variants read.
//! Zone-keyed data lives in [`ZoneMap`], a fixed three-slot table indexed
//! by [`BodyZone`], so no lookup can miss.

use core::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Conceptual comfort regions shown in the UI.
///
/// Ordered top to bottom. Zones do not map to independent hardware
/// channels; the vehicle exposes a single temperature channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BodyZone {
    /// Head and windshield.
    Upper = 0,
    /// Torso and front vents.
    Middle = 1,
    /// Feet.
    Lower = 2,
}

impl BodyZone {
    /// Total number of zones, used to size zone tables.
    pub const COUNT: usize = 3;

    /// Every zone, top to bottom.
    pub const ALL: [BodyZone; Self::COUNT] = [Self::Upper, Self::Middle, Self::Lower];

    /// Table index for this zone.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short label used in status messages and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upper => "head",
            Self::Middle => "body",
            Self::Lower => "feet",
        }
    }

    /// Fan direction that serves this zone on its own.
    pub const fn fan_direction(self) -> FanDirection {
        match self {
            Self::Upper => FanDirection::Frontal,
            Self::Middle => FanDirection::FrontalFeet,
            Self::Lower => FanDirection::Feet,
        }
    }
}

/// Fixed-size table keyed by [`BodyZone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMap<T>([T; BodyZone::COUNT]);

impl<T: Copy> ZoneMap<T> {
    /// Every zone carries `value`.
    pub fn splat(value: T) -> Self {
        Self([value; BodyZone::COUNT])
    }

    /// Build a table by evaluating `f` for each zone.
    pub fn from_fn(mut f: impl FnMut(BodyZone) -> T) -> Self {
        Self(BodyZone::ALL.map(&mut f))
    }

    /// Overwrite every zone with `value`.
    pub fn fill(&mut self, value: T) {
        self.0 = [value; BodyZone::COUNT];
    }

    /// `(zone, value)` pairs, top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = (BodyZone, T)> + '_ {
        BodyZone::ALL.into_iter().map(|z| (z, self.0[z.index()]))
    }
}

impl<T> Index<BodyZone> for ZoneMap<T> {
    type Output = T;

    fn index(&self, zone: BodyZone) -> &T {
        &self.0[zone.index()]
    }
}

impl<T> IndexMut<BodyZone> for ZoneMap<T> {
    fn index_mut(&mut self, zone: BodyZone) -> &mut T {
        &mut self.0[zone.index()]
    }
}

/// Set of zones, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneSet(u8);

impl ZoneSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, zone: BodyZone) {
        self.0 |= 1 << zone.index();
    }

    pub fn contains(self, zone: BodyZone) -> bool {
        self.0 & (1 << zone.index()) != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = BodyZone> {
        BodyZone::ALL.into_iter().filter(move |z| self.contains(*z))
    }
}

// ---------------------------------------------------------------------------
// Per-zone highlight
// ---------------------------------------------------------------------------

/// Transient highlight tag for one zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneAction {
    #[default]
    None,
    /// Heating is being applied to this zone.
    WarmActive,
    /// Cooling is being applied to this zone.
    ColdActive,
}

// ---------------------------------------------------------------------------
// Fan direction
// ---------------------------------------------------------------------------

/// Logical air-distribution modes offered by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FanDirection {
    #[default]
    Frontal,
    FrontalFeet,
    Feet,
    FeetWindshield,
}

/// Direction of a one-degree global adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureDirection {
    Warmer,
    Cooler,
}

// ---------------------------------------------------------------------------
// UI variant
// ---------------------------------------------------------------------------

/// The three interchangeable presentations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiVariant {
    /// Mannequin with multi-zone touch gestures.
    #[default]
    A,
    /// Per-zone warm/cold buttons.
    B,
    /// Global plus/minus temperature.
    C,
}

impl UiVariant {
    /// Next variant in the fixed cycle A → B → C → A.
    pub const fn next(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::C,
            Self::C => Self::A,
        }
    }
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Colour family of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTone {
    Cooling,
    Heating,
    Neutral,
}

/// Short-lived feedback line shown under the controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub tone: StatusTone,
}

// ---------------------------------------------------------------------------
// Published snapshot
// ---------------------------------------------------------------------------

/// Immutable point-in-time view of the climate controls.
///
/// The coordinator replaces this wholesale on every state-affecting
/// operation; readers never observe a partially applied update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateUiState {
    pub variant: UiVariant,
    pub zone_temperature: ZoneMap<i32>,
    pub global_temperature: i32,
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub zone_actions: ZoneMap<ZoneAction>,
    pub fan_speed: u8,
    pub fan_direction: FanDirection,
    pub status: Option<StatusMessage>,
}
