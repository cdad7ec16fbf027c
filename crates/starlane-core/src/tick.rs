//! Tick cycle: the 7-phase pipeline that drives the market simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Wake** -- advance the clock, apply queued operator interventions.
//!
//! 2. **Orders** -- agent upkeep and production, house quotes, agent order
//!    submission against a fresh book per open system.
//!
//! 3. **Clearing** -- match and settle every book. Systems clear in
//!    parallel; commodities within one system clear sequentially.
//!
//! 4. **Audit** -- compare goods and money totals before and after clearing.
//!    A mismatch is recorded and logged, never fatal.
//!
//! 5. **Politics** -- reputation deltas and drift, security score and
//!    state machine, in structural order.
//!
//! 6. **Lifecycle** -- remove insolvent agents; dissolve collapsed systems.
//!
//! 7. **Publish** -- the caller reads [`SimulationState::snapshot`].
//!
//! Phases 2 to 4 touch only one system's market and roster, so they run as
//! one parallel unit per system. Every other phase is sequential. The tick
//! is deterministic given the same initial state, and a failed tick is
//! rolled back to the previous boundary.

use starlane_agents::{AgentError, AgentRoster, LifecycleEvent, PopulationConfig};
use starlane_market::{
    Census, ConservationAnomaly, ConservationResult, MarketConfig, MarketEngine, MarketError,
    OrderBook, Participants, SystemMarket, post_house_orders, verify_conservation,
};
use starlane_types::{Faction, Galaxy, GalaxySnapshot, SystemId, SystemSnapshot};
use starlane_world::{SeededRandomStream, parallel};
use tracing::{debug, info, warn};

use crate::clock::{ClockError, SimulationClock};
use crate::config::SimulationConfig;
use crate::operator::{Intervention, OperatorState};
use crate::reputation::{ReputationBook, TradeTally};
use crate::security::{StateTransition, SystemStatus};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// Settlement or an audit census failed.
    #[error("market error in {system}: {source}")]
    Market {
        /// The system being cleared.
        system: SystemId,
        /// The underlying market error.
        source: MarketError,
    },

    /// An agent operation failed.
    #[error("agent error in {system}: {source}")]
    Agent {
        /// The system whose roster failed.
        system: SystemId,
        /// The underlying agent error.
        source: AgentError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulated seconds since tick 0.
    pub elapsed_secs: u64,
    /// Trades executed across all systems.
    pub trades: u64,
    /// Units traded across all systems.
    pub volume: u64,
    /// Orders rejected at submission.
    pub rejected_orders: u32,
    /// Trades in commodities the local owner outlaws.
    pub illegal_trades: u32,
    /// Agents trading at end of tick.
    pub agents_alive: u32,
    /// Systems whose markets are open at end of tick.
    pub open_systems: u32,
    /// Agents removed during the tick.
    pub removals: Vec<LifecycleEvent>,
    /// State machine changes during the tick.
    pub transitions: Vec<StateTransition>,
    /// Conservation mismatches found by the audit.
    pub anomalies: Vec<ConservationAnomaly>,
}

/// Market, agents and political status of one system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRuntime {
    /// The system.
    pub system: SystemId,
    /// Display name.
    pub name: String,
    /// Controlling faction.
    pub faction: Faction,
    /// Local market.
    pub market: SystemMarket,
    /// Resident agents.
    pub roster: AgentRoster,
    /// State machine and security.
    pub status: SystemStatus,
    /// Units traded last tick.
    pub last_volume: u64,
    /// Orders rejected last tick.
    pub last_rejected: u32,
}

impl SystemRuntime {
    /// Read-only view for external consumers.
    pub fn snapshot(&self, reputation: &ReputationBook) -> SystemSnapshot {
        SystemSnapshot {
            system: self.system,
            name: self.name.clone(),
            faction: self.faction,
            state: self.status.state(),
            security: self.status.security(),
            reputation: reputation.for_system(self.system),
            quotes: self.market.quotes(),
            agent_count: u32::try_from(self.roster.len()).unwrap_or(u32::MAX),
            trade_volume: self.last_volume,
            rejected_orders: self.last_rejected,
        }
    }
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// Validated configuration of the run.
    pub config: SimulationConfig,
    /// The simulation clock.
    pub clock: SimulationClock,
    /// The generated galaxy. Immutable after bootstrap.
    pub galaxy: Galaxy,
    /// Stream factory for the run's seed.
    pub streams: SeededRandomStream,
    /// Per-system runtime, sorted by system id.
    pub systems: Vec<SystemRuntime>,
    /// Reputation of every faction in every system.
    pub reputation: ReputationBook,
    /// Clearing engine.
    pub engine: MarketEngine,
}

impl SimulationState {
    /// Look up one system's runtime.
    pub fn system(&self, id: SystemId) -> Option<&SystemRuntime> {
        self.systems
            .binary_search_by_key(&id, |runtime| runtime.system)
            .ok()
            .and_then(|index| self.systems.get(index))
    }

    fn system_mut(&mut self, id: SystemId) -> Option<&mut SystemRuntime> {
        self.systems
            .binary_search_by_key(&id, |runtime| runtime.system)
            .ok()
            .and_then(|index| self.systems.get_mut(index))
    }

    /// Agents trading across all systems.
    pub fn agents_alive(&self) -> u32 {
        let total = self
            .systems
            .iter()
            .fold(0_usize, |acc, runtime| acc.saturating_add(runtime.roster.len()));
        u32::try_from(total).unwrap_or(u32::MAX)
    }

    /// Systems whose markets accept orders.
    pub fn open_systems(&self) -> u32 {
        let open = self
            .systems
            .iter()
            .filter(|runtime| runtime.status.state().is_open())
            .count();
        u32::try_from(open).unwrap_or(u32::MAX)
    }

    /// Read-only view of every system at the current tick boundary.
    pub fn snapshot(&self) -> GalaxySnapshot {
        GalaxySnapshot {
            tick: self.clock.tick(),
            systems: self
                .systems
                .iter()
                .map(|runtime| runtime.snapshot(&self.reputation))
                .collect(),
        }
    }
}

/// Shared read-only inputs of the per-system trading phases.
struct TradeContext<'a> {
    streams: &'a SeededRandomStream,
    engine: &'a MarketEngine,
    population: &'a PopulationConfig,
    market: &'a MarketConfig,
    tick: u64,
}

/// What one system's trading phases produced.
#[derive(Debug, Default)]
struct SystemOutcome {
    tally: TradeTally,
    trades: u64,
    volume: u64,
    anomaly: Option<ConservationAnomaly>,
}

/// Execute a single tick of the simulation.
///
/// A tick either completes or leaves no trace: on error the clock, every
/// system and the reputation book are restored to the previous tick
/// boundary and the drained interventions go back to the front of the
/// operator queue.
///
/// # Errors
///
/// Returns [`TickError`] if the clock overflows or settlement of a validated
/// fill fails. Rejected orders and conservation mismatches are outcomes
/// recorded in the summary, not errors.
pub fn run_tick(
    state: &mut SimulationState,
    operator: &OperatorState,
) -> Result<TickSummary, TickError> {
    let checkpoint = Checkpoint::take(state);
    let interventions = operator.drain_interventions();
    match execute_tick(state, interventions.clone()) {
        Ok(summary) => Ok(summary),
        Err(err) => {
            checkpoint.restore(state);
            warn!(
                tick = state.clock.tick(),
                error = %err,
                requeued = interventions.len(),
                "Tick failed, state rolled back"
            );
            operator.requeue_interventions(interventions);
            Err(err)
        }
    }
}

/// Everything a tick may change, kept to undo a failed tick.
struct Checkpoint {
    clock: SimulationClock,
    systems: Vec<SystemRuntime>,
    reputation: ReputationBook,
}

impl Checkpoint {
    fn take(state: &SimulationState) -> Self {
        Self {
            clock: state.clock,
            systems: state.systems.clone(),
            reputation: state.reputation.clone(),
        }
    }

    fn restore(self, state: &mut SimulationState) {
        state.clock = self.clock;
        state.systems = self.systems;
        state.reputation = self.reputation;
    }
}

fn execute_tick(
    state: &mut SimulationState,
    interventions: Vec<Intervention>,
) -> Result<TickSummary, TickError> {
    // --- Phase 1: Wake ---
    let tick = state.clock.advance()?;
    let mut transitions = phase_wake(state, interventions, tick);

    // --- Phases 2-4: Orders, Clearing, Audit ---
    let outcomes = phase_trade(state, tick)?;

    // --- Phase 5: Politics ---
    transitions.extend(phase_politics(state, &outcomes, tick));

    // --- Phase 6: Lifecycle ---
    let removals = phase_lifecycle(state, tick)?;

    // --- Phase 7: Publish (caller reads the snapshot) ---
    let mut summary = TickSummary {
        tick,
        elapsed_secs: state.clock.elapsed_secs()?,
        trades: 0,
        volume: 0,
        rejected_orders: 0,
        illegal_trades: 0,
        agents_alive: state.agents_alive(),
        open_systems: state.open_systems(),
        removals,
        transitions,
        anomalies: Vec::new(),
    };
    for outcome in outcomes {
        summary.trades = summary.trades.saturating_add(outcome.trades);
        summary.volume = summary.volume.saturating_add(outcome.volume);
        summary.rejected_orders = summary
            .rejected_orders
            .saturating_add(outcome.tally.rejected_orders);
        summary.illegal_trades = summary
            .illegal_trades
            .saturating_add(outcome.tally.illegal_trades);
        summary.anomalies.extend(outcome.anomaly);
    }

    info!(
        tick,
        trades = summary.trades,
        volume = summary.volume,
        rejected = summary.rejected_orders,
        illegal = summary.illegal_trades,
        agents_alive = summary.agents_alive,
        open_systems = summary.open_systems,
        removals = summary.removals.len(),
        "Tick complete"
    );

    Ok(summary)
}

/// Phase 1: apply operator interventions queued since the last tick.
fn phase_wake(
    state: &mut SimulationState,
    interventions: Vec<Intervention>,
    tick: u64,
) -> Vec<StateTransition> {
    let mut transitions = Vec::new();
    for intervention in interventions {
        match intervention {
            Intervention::RestoreSystem(id) => {
                let Some(runtime) = state.system_mut(id) else {
                    warn!(tick, system_id = %id, "Restore requested for unknown system");
                    continue;
                };
                if let Some(change) = runtime.status.restore(id, tick) {
                    info!(tick, system_id = %id, "System restored by operator");
                    transitions.push(change);
                }
            }
            Intervention::AdjustReputation {
                system,
                faction,
                delta,
            } => {
                if state.system(system).is_none() {
                    warn!(tick, system_id = %system, "Reputation change for unknown system");
                    continue;
                }
                let score = state.reputation.adjust(system, faction, delta);
                info!(tick, system_id = %system, ?faction, delta, score, "Reputation adjusted by operator");
            }
        }
    }
    transitions
}

/// Phases 2-4 for every system, one parallel unit per system.
fn phase_trade(state: &mut SimulationState, tick: u64) -> Result<Vec<SystemOutcome>, TickError> {
    let ctx = TradeContext {
        streams: &state.streams,
        engine: &state.engine,
        population: &state.config.population,
        market: &state.config.market,
        tick,
    };
    parallel::map_slice_mut(
        &mut state.systems,
        |runtime| trade_system(runtime, &ctx),
        state.config.galaxy.force_sequential,
    )
    .into_iter()
    .collect()
}

fn trade_system(runtime: &mut SystemRuntime, ctx: &TradeContext<'_>) -> Result<SystemOutcome, TickError> {
    let system = runtime.system;
    let market_err = |source| TickError::Market { system, source };
    let agent_err = |source| TickError::Agent { system, source };

    if !runtime.status.state().is_open() {
        runtime.last_volume = 0;
        runtime.last_rejected = 0;
        return Ok(SystemOutcome::default());
    }

    // --- Phase 2: Orders ---
    let upkeep = runtime
        .roster
        .run_upkeep(&mut runtime.market, ctx.population)
        .map_err(agent_err)?;
    let mut book = OrderBook::new(system, true);
    let house = post_house_orders(&runtime.market, &mut book, ctx.market);
    let submitted = runtime
        .roster
        .submit_orders(&runtime.market, &mut book, ctx.streams, ctx.population, ctx.tick)
        .map_err(agent_err)?;
    debug!(
        tick = ctx.tick,
        system_id = %system,
        produced = upkeep.produced,
        consumed = upkeep.consumed,
        fees = %upkeep.fees,
        house_asks = house.asks,
        house_bids = house.bids,
        accepted = submitted.accepted,
        rejected = submitted.rejected,
        "Orders collected"
    );

    // --- Phase 3: Clearing ---
    let before = census(&runtime.market, &runtime.roster).map_err(market_err)?;
    let report = ctx
        .engine
        .clear(book, &mut Participants::new(&mut runtime.market, &mut runtime.roster))
        .map_err(market_err)?;
    runtime.roster.learn(&report, &runtime.market, ctx.population);

    // --- Phase 4: Audit ---
    let after = census(&runtime.market, &runtime.roster).map_err(market_err)?;
    let anomaly = match verify_conservation(system, ctx.tick, &before, &after) {
        ConservationResult::Balanced => None,
        ConservationResult::Anomaly(anomaly) => {
            warn!(tick = ctx.tick, system_id = %system, "{}", anomaly.message);
            Some(anomaly)
        }
    };

    let tally = TradeTally {
        legal_volume: report.legal_volume(),
        illegal_trades: report.illegal_trades(),
        rejected_orders: report.rejected_count(),
    };
    runtime.last_volume = report.volume();
    runtime.last_rejected = tally.rejected_orders;

    Ok(SystemOutcome {
        tally,
        trades: u64::try_from(report.trade_count()).unwrap_or(u64::MAX),
        volume: report.volume(),
        anomaly,
    })
}

fn census(market: &SystemMarket, roster: &AgentRoster) -> Result<Census, MarketError> {
    let mut census = Census::of_market(market)?;
    roster.add_to_census(&mut census)?;
    Ok(census)
}

/// Phase 5: reputation and security, sequentially in structural order.
fn phase_politics(state: &mut SimulationState, outcomes: &[SystemOutcome], tick: u64) -> Vec<StateTransition> {
    let mut transitions = Vec::new();
    for (runtime, outcome) in state.systems.iter_mut().zip(outcomes) {
        let system = runtime.system;
        let trend = if runtime.status.state().is_open() {
            state
                .reputation
                .apply_trades(system, runtime.faction, outcome.tally)
        } else {
            0
        };
        state.reputation.drift(system);
        let owner = state.reputation.score(system, runtime.faction);
        transitions.extend(runtime.status.update(
            system,
            tick,
            outcome.tally,
            owner,
            trend,
            &state.config.security,
        ));
    }
    transitions
}

/// Phase 6: insolvency removal and collapse handling.
fn phase_lifecycle(state: &mut SimulationState, tick: u64) -> Result<Vec<LifecycleEvent>, TickError> {
    let floor = state.config.population.solvency_floor;
    let mut removals = Vec::new();
    for runtime in &mut state.systems {
        let system = runtime.system;
        let events = if runtime.status.state().is_open() {
            runtime.roster.remove_insolvent(&mut runtime.market, floor, tick)
        } else {
            runtime.roster.dissolve(&mut runtime.market, tick)
        };
        removals.extend(events.map_err(|source| TickError::Agent { system, source })?);
    }
    Ok(removals)
}
