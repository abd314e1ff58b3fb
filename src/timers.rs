//! Single-shot timer table.
//!
//! Every deferred behaviour of the coordinator owns exactly one slot in a
//! fixed-size table.  Scheduling a slot replaces whatever was pending in
//! it, so a superseded timer can never fire late and clobber newer state.
//! Nothing runs on its own: the owner calls [`TimerTable::take_due`] from
//! its cooperative tick and handles each expiry itself.
//!
//! ```text
//! ┌───────────────────┬────────────┐
//! │ slot              │ deadline   │
//! ├───────────────────┼────────────┤
//! │ DebounceSession   │ Some(t+10s)│  shared by the whole gesture session
//! │ FanBoost          │ None       │
//! │ Status            │ Some(t+2s) │
//! │ Highlight(Upper)  │ None       │  one slot per zone
//! │ Highlight(Middle) │ Some(t+5s) │
//! │ Highlight(Lower)  │ None       │
//! └───────────────────┴────────────┘
//! ```

use heapless::Vec;
use log::debug;

use crate::model::BodyZone;

/// Identity of a timer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    /// Multi-zone gesture session expiry.
    DebounceSession,
    /// Fan boost reversion.
    FanBoost,
    /// Transient status message expiry.
    Status,
    /// Per-zone highlight auto-revert.
    Highlight(BodyZone),
}

impl TimerId {
    /// Total number of slots, used to size the table.
    pub const COUNT: usize = 3 + BodyZone::COUNT;

    const fn slot(self) -> usize {
        match self {
            Self::DebounceSession => 0,
            Self::FanBoost => 1,
            Self::Status => 2,
            Self::Highlight(zone) => 3 + zone.index(),
        }
    }

    const fn from_slot(slot: usize) -> Self {
        match slot {
            0 => Self::DebounceSession,
            1 => Self::FanBoost,
            2 => Self::Status,
            3 => Self::Highlight(BodyZone::Upper),
            4 => Self::Highlight(BodyZone::Middle),
            _ => Self::Highlight(BodyZone::Lower),
        }
    }
}

/// Fixed table of pending deadlines (milliseconds on the injected clock).
#[derive(Debug, Default)]
pub struct TimerTable {
    deadlines: [Option<u64>; TimerId::COUNT],
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `id` to fire at `deadline_ms`, replacing any pending deadline.
    pub fn schedule(&mut self, id: TimerId, deadline_ms: u64) {
        let slot = &mut self.deadlines[id.slot()];
        if slot.is_some() {
            debug!("Timers: {:?} rescheduled to {}ms", id, deadline_ms);
        }
        *slot = Some(deadline_ms);
    }

    /// Disarm `id`.  Returns `true` if it was pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.deadlines[id.slot()].take().is_some()
    }

    /// Disarm every slot.
    pub fn cancel_all(&mut self) {
        self.deadlines = [None; TimerId::COUNT];
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines[id.slot()].is_some()
    }

    /// Deadline of `id`, if armed.
    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.deadlines[id.slot()]
    }

    /// Earliest armed deadline, for callers that sleep until the next expiry.
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.iter().flatten().copied().min()
    }

    /// Disarm and return every slot whose deadline is `<= now_ms`,
    /// earliest first.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<TimerId, { TimerId::COUNT }> {
        let mut due: Vec<(u64, usize), { TimerId::COUNT }> = Vec::new();
        for (slot, deadline) in self.deadlines.iter_mut().enumerate() {
            if let Some(at) = *deadline {
                if at <= now_ms {
                    *deadline = None;
                    // Capacity equals the slot count.
                    let _ = due.push((at, slot));
                }
            }
        }
        due.sort_unstable();
        due.into_iter().map(|(_, slot)| TimerId::from_slot(slot)).collect()
    }
}
