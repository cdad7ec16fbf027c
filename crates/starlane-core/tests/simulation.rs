//! End-to-end runs of the tick loop against generated galaxies.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use starlane_core::{
    Intervention, NoOpCallback, OperatorState, SimulationClock, SimulationConfig,
    SimulationEndReason, SimulationState, SnapshotBoard, TickCallback, TickError, TickSummary,
    build_simulation, run_simulation, run_tick,
};
use starlane_types::{Commodity, GalaxySnapshot, SystemState};
use starlane_world::EmbeddedResources;

fn build(config: SimulationConfig) -> SimulationState {
    let resources = EmbeddedResources::load().unwrap();
    build_simulation(config, &resources).unwrap()
}

fn small_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig {
        seed,
        ..SimulationConfig::default()
    };
    config.galaxy.columns = 2;
    config.galaxy.rows = 1;
    config.galaxy.density = 3;
    config.galaxy.min_density = 2;
    config
}

/// Records the mean price of every commodity after each tick.
#[derive(Default)]
struct PriceRecorder {
    trajectory: Vec<Vec<Option<Decimal>>>,
    volumes: Vec<u64>,
}

impl TickCallback for PriceRecorder {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        let snapshot = state.snapshot();
        self.trajectory.push(
            Commodity::ALL
                .iter()
                .map(|commodity| snapshot.mean_price(*commodity))
                .collect(),
        );
        self.volumes.push(summary.volume);
    }
}

fn run_recorded(config: SimulationConfig, ticks: u64) -> (usize, PriceRecorder, GalaxySnapshot) {
    let mut state = build(config);
    let operator = Arc::new(OperatorState::with_max_ticks(ticks));
    let mut recorder = PriceRecorder::default();
    run_simulation(&mut state, &operator, &mut recorder).unwrap();
    (state.galaxy.system_count(), recorder, state.snapshot())
}

#[test]
fn seed_42_run_is_reproducible() {
    let config = SimulationConfig::default();
    assert_eq!(config.galaxy.sector_count(), 3);
    assert_eq!(config.galaxy.density, 5);

    let (systems_a, prices_a, final_a) = run_recorded(config.clone(), 100);
    let (systems_b, prices_b, final_b) = run_recorded(config, 100);

    assert_eq!(systems_a, systems_b);
    assert_eq!(prices_a.trajectory, prices_b.trajectory);
    assert_eq!(prices_a.volumes, prices_b.volumes);
    assert_eq!(final_a, final_b);
    assert!(prices_a.volumes.iter().sum::<u64>() > 0, "nothing traded");
}

#[test]
fn parallel_clearing_matches_sequential() {
    let mut sequential = small_config(11);
    sequential.galaxy.force_sequential = true;
    let (_, prices_seq, final_seq) = run_recorded(sequential, 30);
    let (_, prices_par, final_par) = run_recorded(small_config(11), 30);
    assert_eq!(prices_seq.trajectory, prices_par.trajectory);
    assert_eq!(final_seq, final_par);
}

#[test]
fn ticks_conserve_goods_and_keep_agents_solvent() {
    let mut state = build(small_config(5));
    let operator = OperatorState::with_max_ticks(0);
    for expected in 1..=40 {
        let summary = run_tick(&mut state, &operator).unwrap();
        assert_eq!(summary.tick, expected);
        assert!(summary.anomalies.is_empty(), "{:?}", summary.anomalies);
        for runtime in &state.systems {
            assert!(runtime.market.treasury() >= Decimal::ZERO);
            for agent in runtime.roster.iter() {
                assert!(agent.capital >= Decimal::ZERO, "{} went negative", agent.id);
            }
        }
        for event in &summary.removals {
            assert_eq!(event.tick, expected);
        }
    }
    assert_eq!(state.clock.elapsed_secs().unwrap(), 40 * 3600);
}

#[test]
fn stop_before_first_tick_runs_nothing() {
    let mut state = build(small_config(1));
    let operator = Arc::new(OperatorState::with_max_ticks(10));
    operator.request_stop();
    let result = run_simulation(&mut state, &operator, &mut NoOpCallback).unwrap();
    assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
    assert_eq!(result.total_ticks, 0);
    assert!(result.final_summary.is_none());
    assert_eq!(state.clock.tick(), 0);
    assert_eq!(operator.end_reason(), Some(SimulationEndReason::OperatorStop));
}

/// Requests a stop from inside the loop after a fixed tick.
struct StopAfter {
    operator: Arc<OperatorState>,
    tick: u64,
}

impl TickCallback for StopAfter {
    fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
        if summary.tick == self.tick {
            self.operator.request_stop();
        }
    }
}

#[test]
fn stop_takes_effect_between_ticks() {
    let mut state = build(small_config(2));
    let operator = Arc::new(OperatorState::with_max_ticks(0));
    let mut callback = StopAfter {
        operator: Arc::clone(&operator),
        tick: 4,
    };
    let result = run_simulation(&mut state, &operator, &mut callback).unwrap();
    assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
    assert_eq!(result.total_ticks, 4);
    assert_eq!(result.final_summary.unwrap().tick, 4);
}

#[test]
fn max_ticks_bounds_the_run_and_publishes_snapshots() {
    let mut state = build(small_config(3));
    let operator = Arc::new(OperatorState::with_max_ticks(5));
    let mut board = SnapshotBoard::new(state.snapshot());
    let reader = board.clone();
    let result = run_simulation(&mut state, &operator, &mut board).unwrap();
    assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
    assert_eq!(result.total_ticks, 5);
    assert_eq!(reader.tick(), 5);
    assert_eq!(reader.read(), state.snapshot());
    let first = state.systems.first().unwrap().system;
    assert_eq!(reader.system(first).unwrap().system, first);
}

#[test]
fn hostile_owner_collapses_system_until_restored() {
    let mut config = small_config(8);
    config.security.collapse_after_ticks = 3;
    let mut state = build(config);
    let operator = OperatorState::with_max_ticks(0);
    let target = state.systems.first().unwrap().system;
    let owner = state.systems.first().unwrap().faction;

    operator.intervene(Intervention::AdjustReputation {
        system: target,
        faction: owner,
        delta: -1_000,
    });
    let mut collapsed_at = None;
    for _ in 0..3 {
        let summary = run_tick(&mut state, &operator).unwrap();
        assert!(summary.anomalies.is_empty());
        if let Some(change) = summary
            .transitions
            .iter()
            .find(|change| change.system == target && change.to == SystemState::Collapsed)
        {
            collapsed_at = Some(change.tick);
        }
    }
    assert_eq!(collapsed_at, Some(3));
    let runtime = state.system(target).unwrap();
    assert_eq!(runtime.status.state(), SystemState::Collapsed);
    assert!(runtime.roster.is_empty());

    // Closed markets stay closed and idle.
    let summary = run_tick(&mut state, &operator).unwrap();
    assert_eq!(state.system(target).unwrap().last_volume, 0);
    assert!(summary.open_systems < u32::try_from(state.systems.len()).unwrap());

    operator.intervene(Intervention::RestoreSystem(target));
    operator.intervene(Intervention::AdjustReputation {
        system: target,
        faction: owner,
        delta: 1_000,
    });
    let summary = run_tick(&mut state, &operator).unwrap();
    assert!(summary.transitions.iter().any(|change| change.system == target
        && change.from == SystemState::Collapsed
        && change.to == SystemState::Stable));
    assert!(state.system(target).unwrap().status.state().is_open());
}

#[test]
fn failed_tick_is_rolled_back() {
    let mut state = build(small_config(5));
    let operator = OperatorState::with_max_ticks(0);
    run_tick(&mut state, &operator).unwrap();

    // Simulated time overflows only after every phase has mutated the state.
    state.clock = SimulationClock::from_parts(state.clock.tick(), u64::MAX).unwrap();
    let clock = state.clock;
    let systems = state.systems.clone();
    let reputation = state.reputation.clone();
    let target = systems.first().unwrap();
    operator.intervene(Intervention::AdjustReputation {
        system: target.system,
        faction: target.faction,
        delta: -50,
    });

    let err = run_tick(&mut state, &operator).unwrap_err();
    assert!(matches!(err, TickError::Clock { .. }));
    assert_eq!(state.clock, clock);
    assert_eq!(state.systems, systems);
    assert_eq!(state.reputation, reputation);
    assert_eq!(operator.drain_interventions().len(), 1);
}

#[test]
fn all_systems_collapsing_ends_the_run() {
    let mut config = small_config(4);
    config.security.collapse_after_ticks = 2;
    let mut state = build(config);
    let operator = Arc::new(OperatorState::with_max_ticks(50));
    for runtime in &state.systems {
        operator.intervene(Intervention::AdjustReputation {
            system: runtime.system,
            faction: runtime.faction,
            delta: -1_000,
        });
    }
    let result = run_simulation(&mut state, &operator, &mut NoOpCallback).unwrap();
    assert_eq!(result.end_reason, SimulationEndReason::AllSystemsCollapsed);
    assert_eq!(result.total_ticks, 2);
    assert_eq!(state.agents_alive(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn any_seed_conserves_and_stays_solvent(seed in any::<u64>()) {
        let mut state = build(small_config(seed));
        let operator = OperatorState::with_max_ticks(0);
        for _ in 0..8 {
            let summary = run_tick(&mut state, &operator).unwrap();
            prop_assert!(summary.anomalies.is_empty());
            for runtime in &state.systems {
                for agent in runtime.roster.iter() {
                    prop_assert!(agent.capital >= Decimal::ZERO);
                }
            }
        }
    }
}
