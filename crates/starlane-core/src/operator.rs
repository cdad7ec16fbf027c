//! Operator controls shared between the tick loop and whoever drives it.
//!
//! A stop request or an intervention may arrive from any thread at any
//! time, but both only take effect at a tick boundary: the runner checks
//! the stop flag between ticks and the pipeline drains interventions at the
//! start of a tick. Mid-tick cancellation does not exist.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use starlane_types::{Faction, SystemId};

use crate::config::ClockConfig;

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// An operator issued a stop command.
    OperatorStop,
    /// Every system has collapsed; nothing can trade.
    AllSystemsCollapsed,
}

/// An operator action applied at the start of the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intervention {
    /// Reopen a collapsed system.
    RestoreSystem(SystemId),
    /// Shift one faction's reputation in one system.
    AdjustReputation {
        /// The system.
        system: SystemId,
        /// The faction.
        faction: Faction,
        /// Amount to add; the result is clamped.
        delta: i32,
    },
}

/// Shared operator control state, usually wrapped in an `Arc`.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wall-clock time when the simulation started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Interventions awaiting the next tick.
    interventions: Mutex<Vec<Intervention>>,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create operator state with the configured tick bound.
    pub fn new(clock: &ClockConfig) -> Self {
        Self::with_max_ticks(clock.max_ticks)
    }

    /// Create operator state with an explicit tick bound (0 = unlimited).
    pub fn with_max_ticks(max_ticks: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            started_at: Utc::now(),
            max_ticks,
            interventions: Mutex::new(Vec::new()),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop after the current tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the simulation ended.
    pub fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(reason);
    }

    /// Get the reason the simulation ended, if it has.
    pub fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed wall-clock milliseconds since start.
    pub fn elapsed_millis(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    // -----------------------------------------------------------------------
    // Interventions
    // -----------------------------------------------------------------------

    /// Queue an intervention for the next tick.
    pub fn intervene(&self, intervention: Intervention) {
        self.interventions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(intervention);
    }

    /// Put `interventions` back ahead of anything queued since they were
    /// drained, keeping their order.
    pub fn requeue_interventions(&self, interventions: Vec<Intervention>) {
        let mut queue = self.interventions.lock().unwrap_or_else(PoisonError::into_inner);
        queue.splice(0..0, interventions);
    }

    /// Drain all queued interventions in arrival order.
    pub fn drain_interventions(&self) -> Vec<Intervention> {
        let mut queue = self.interventions.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *queue)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn stop_request() {
        let state = OperatorState::with_max_ticks(0);
        assert!(!state.is_stop_requested());
        state.request_stop();
        assert!(state.is_stop_requested());
    }

    #[test]
    fn tick_limit_zero_means_unlimited() {
        let state = OperatorState::with_max_ticks(0);
        assert!(!state.tick_limit_reached(999_999));
    }

    #[test]
    fn tick_limit_reached() {
        let state = OperatorState::new(&ClockConfig {
            tick_duration_secs: 60,
            max_ticks: 100,
        });
        assert!(!state.tick_limit_reached(99));
        assert!(state.tick_limit_reached(100));
        assert!(state.tick_limit_reached(101));
    }

    #[test]
    fn end_reason_is_recorded() {
        let state = OperatorState::with_max_ticks(0);
        assert_eq!(state.end_reason(), None);
        state.set_end_reason(SimulationEndReason::OperatorStop);
        assert_eq!(state.end_reason(), Some(SimulationEndReason::OperatorStop));
    }

    #[test]
    fn requeued_interventions_go_first() {
        let state = OperatorState::with_max_ticks(0);
        state.intervene(Intervention::RestoreSystem(SystemId::new(0, 1)));
        let drained = state.drain_interventions();
        state.intervene(Intervention::RestoreSystem(SystemId::new(0, 2)));
        state.requeue_interventions(drained);
        assert_eq!(
            state.drain_interventions(),
            vec![
                Intervention::RestoreSystem(SystemId::new(0, 1)),
                Intervention::RestoreSystem(SystemId::new(0, 2)),
            ]
        );
    }

    #[test]
    fn wall_clock_runs_from_creation() {
        let state = OperatorState::with_max_ticks(0);
        assert!(state.started_at() <= Utc::now());
        let first = state.elapsed_millis();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(state.elapsed_millis() >= first);
    }

    #[test]
    fn interventions_drain_in_order_across_threads() {
        let state = Arc::new(OperatorState::with_max_ticks(0));
        let remote = Arc::clone(&state);
        std::thread::spawn(move || {
            remote.intervene(Intervention::RestoreSystem(SystemId::new(0, 1)));
            remote.intervene(Intervention::AdjustReputation {
                system: SystemId::new(0, 1),
                faction: Faction::Empire,
                delta: 50,
            });
        })
        .join()
        .ok();
        let drained = state.drain_interventions();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], Intervention::RestoreSystem(SystemId::new(0, 1)));
        assert!(state.drain_interventions().is_empty());
    }
}
