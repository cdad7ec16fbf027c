//! End-of-run report built from the final snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use starlane_core::{OperatorState, SimulationResult};
use starlane_types::{Commodity, GalaxySnapshot, SystemState};
use tracing::info;

/// Aggregates of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Ticks executed.
    pub ticks: u64,
    /// Why the run ended.
    pub end_reason: String,
    /// Wall-clock time the operator state was created.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub wall_clock_ms: u64,
    /// Systems in the galaxy.
    pub systems: usize,
    /// Systems per state at the end.
    pub states: BTreeMap<SystemState, usize>,
    /// Agents still trading.
    pub agents: u64,
    /// Units traded in the last tick.
    pub last_volume: u64,
    /// Mean published price per commodity.
    pub price_index: BTreeMap<Commodity, Decimal>,
}

impl RunReport {
    /// Summarize `snapshot` as left by `result`, timed by `operator`.
    pub fn new(
        result: &SimulationResult,
        snapshot: &GalaxySnapshot,
        operator: &OperatorState,
    ) -> Self {
        let mut states = BTreeMap::new();
        let mut agents: u64 = 0;
        let mut last_volume: u64 = 0;
        for system in &snapshot.systems {
            let count: &mut usize = states.entry(system.state).or_default();
            *count = count.saturating_add(1);
            agents = agents.saturating_add(u64::from(system.agent_count));
            last_volume = last_volume.saturating_add(system.trade_volume);
        }
        let price_index = Commodity::ALL
            .iter()
            .filter_map(|commodity| {
                snapshot
                    .mean_price(*commodity)
                    .map(|price| (*commodity, price.round_dp(2)))
            })
            .collect();
        Self {
            ticks: result.total_ticks,
            end_reason: format!("{:?}", result.end_reason),
            started_at: operator.started_at(),
            wall_clock_ms: operator.elapsed_millis(),
            systems: snapshot.systems.len(),
            states,
            agents,
            last_volume,
            price_index,
        }
    }

    /// Emit the report through the log.
    pub fn log(&self, snapshot: &GalaxySnapshot) {
        info!(
            ticks = self.ticks,
            end_reason = %self.end_reason,
            started_at = %self.started_at,
            wall_clock_ms = self.wall_clock_ms,
            systems = self.systems,
            agents = self.agents,
            states = ?self.states,
            "Run report"
        );
        for system in &snapshot.systems {
            info!(
                system_id = %system.system,
                name = %system.name,
                faction = ?system.faction,
                state = ?system.state,
                security = ?system.security,
                agents = system.agent_count,
                volume = system.trade_volume,
                "System"
            );
        }
        for (commodity, price) in &self.price_index {
            info!(?commodity, price = %price, "Mean price");
        }
    }
}
