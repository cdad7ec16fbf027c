//! Snapshot board polled by external consumers.
//!
//! The board is refreshed once per tick boundary by [`SnapshotBoard`]'s
//! [`TickCallback`] impl. Readers clone out of a read lock and never see a
//! half-published tick.

use std::sync::{Arc, PoisonError, RwLock};

use starlane_types::{GalaxySnapshot, SystemId, SystemSnapshot};

use crate::runner::TickCallback;
use crate::tick::{SimulationState, TickSummary};

/// Shared, cloneable handle to the latest [`GalaxySnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotBoard {
    latest: Arc<RwLock<GalaxySnapshot>>,
}

impl SnapshotBoard {
    /// A board holding `initial`.
    pub fn new(initial: GalaxySnapshot) -> Self {
        Self {
            latest: Arc::new(RwLock::new(initial)),
        }
    }

    /// Replace the published snapshot.
    pub fn publish(&self, snapshot: GalaxySnapshot) {
        let mut guard = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot;
    }

    /// A copy of the published snapshot.
    pub fn read(&self) -> GalaxySnapshot {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tick of the published snapshot.
    pub fn tick(&self) -> u64 {
        self.latest.read().unwrap_or_else(PoisonError::into_inner).tick
    }

    /// A copy of one system's published view.
    pub fn system(&self, id: SystemId) -> Option<SystemSnapshot> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .system(id)
            .cloned()
    }
}

impl TickCallback for SnapshotBoard {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        self.publish(state.snapshot());
        tracing::debug!(tick = summary.tick, "Snapshot published");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_board() {
        let board = SnapshotBoard::default();
        let reader = board.clone();
        assert_eq!(reader.tick(), 0);
        board.publish(GalaxySnapshot {
            tick: 3,
            systems: Vec::new(),
        });
        assert_eq!(reader.tick(), 3);
        assert_eq!(reader.read().tick, 3);
        assert!(reader.system(SystemId::new(0, 0)).is_none());
    }
}
