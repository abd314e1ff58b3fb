//! Published UI snapshot.
//!
//! The coordinator is the only writer; any number of readers hold a cloned
//! [`StateHandle`] and either poll the latest snapshot or wait for the next
//! version.  A publish swaps the whole [`ClimateUiState`] under a critical
//! section, so readers never observe a half-applied update.

use core::cell::RefCell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::model::ClimateUiState;

struct Published {
    version: u64,
    state: ClimateUiState,
}

struct Shared {
    cell: Mutex<CriticalSectionRawMutex, RefCell<Published>>,
    /// Raised with the new version on every publish.
    changed: Signal<CriticalSectionRawMutex, u64>,
}

/// Cloneable read handle onto the latest snapshot.
#[derive(Clone)]
pub struct StateHandle {
    shared: Arc<Shared>,
}

impl StateHandle {
    /// Create a handle seeded with `initial` at version 0.
    pub(crate) fn new(initial: ClimateUiState) -> Self {
        Self {
            shared: Arc::new(Shared {
                cell: Mutex::new(RefCell::new(Published {
                    version: 0,
                    state: initial,
                })),
                changed: Signal::new(),
            }),
        }
    }

    /// Replace the snapshot and wake a waiter.  Returns the new version.
    pub(crate) fn publish(&self, state: ClimateUiState) -> u64 {
        let version = self.shared.cell.lock(|cell| {
            let mut published = cell.borrow_mut();
            published.version += 1;
            published.state = state;
            published.version
        });
        self.shared.changed.signal(version);
        version
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> ClimateUiState {
        self.shared.cell.lock(|cell| cell.borrow().state.clone())
    }

    /// Number of publishes so far.
    pub fn version(&self) -> u64 {
        self.shared.cell.lock(|cell| cell.borrow().version)
    }

    /// Wait until a version newer than `seen` exists, then return it with
    /// its snapshot.
    ///
    /// The wake-up signal has a single slot, so only one task should wait
    /// at a time.  Intermediate versions may be skipped; the latest always
    /// wins.
    pub async fn changed_since(&self, seen: u64) -> (u64, ClimateUiState) {
        loop {
            let current = self.shared.cell.lock(|cell| {
                let published = cell.borrow();
                (published.version > seen).then(|| (published.version, published.state.clone()))
            });
            if let Some(latest) = current {
                return latest;
            }
            self.shared.changed.wait().await;
        }
    }
}
