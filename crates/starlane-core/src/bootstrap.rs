//! Build the initial simulation state from a configuration.
//!
//! Validation runs first; then the galaxy is generated, planets get their
//! economies, and every system receives its market, agents and status.

use starlane_agents::{AgentError, AgentPopulation, AgentRoster};
use starlane_market::economy::assign_galaxy;
use starlane_market::{MarketEngine, MarketError, initial_market};
use starlane_types::SystemId;
use starlane_world::{ResourceProvider, UniverseGenerator, WorldError};

use crate::clock::{ClockError, SimulationClock};
use crate::config::{ConfigError, SimulationConfig};
use crate::reputation::ReputationBook;
use crate::security::SystemStatus;
use crate::tick::{SimulationState, SystemRuntime};

/// Errors that can occur while preparing a simulation.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Universe generation failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The clock could not be created.
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// A system market could not be built.
    #[error("market setup failed for {system}: {source}")]
    Market {
        /// The system.
        system: SystemId,
        /// The underlying market error.
        source: MarketError,
    },

    /// A system could not be populated.
    #[error("population failed for {system}: {source}")]
    Agent {
        /// The system.
        system: SystemId,
        /// The underlying agent error.
        source: AgentError,
    },
}

/// Validate `config`, generate the galaxy and populate every system.
///
/// The result is a tick-0 state: no trading has happened yet.
///
/// # Errors
///
/// Returns [`BootstrapError::Config`] before any generation work if the
/// configuration is invalid, and the first generation, market or population
/// failure otherwise.
pub fn build_simulation<R: ResourceProvider + ?Sized>(
    config: SimulationConfig,
    resources: &R,
) -> Result<SimulationState, BootstrapError> {
    config.validate()?;
    let clock = SimulationClock::new(&config.clock)?;

    let (mut galaxy, streams) = {
        let generator = UniverseGenerator::new(&config.galaxy, config.seed, resources)?;
        (generator.generate_galaxy()?, *generator.streams())
    };
    assign_galaxy(&mut galaxy);

    let population = AgentPopulation::new(&config.population, &streams, resources);
    let mut systems = Vec::with_capacity(galaxy.system_count());
    for system in galaxy.systems() {
        let market = initial_market(system, &streams, &config.market)
            .map_err(|source| BootstrapError::Market {
                system: system.id,
                source,
            })?;
        let agents = population
            .populate(system, &market)
            .map_err(|source| BootstrapError::Agent {
                system: system.id,
                source,
            })?;
        systems.push(SystemRuntime {
            system: system.id,
            name: system.name.clone(),
            faction: system.faction,
            market,
            roster: AgentRoster::new(system.id, agents),
            status: SystemStatus::new(system.security),
            last_volume: 0,
            last_rejected: 0,
        });
    }
    systems.sort_by_key(|runtime| runtime.system);

    let state = SimulationState {
        engine: MarketEngine::new(config.market.clone()),
        clock,
        galaxy,
        streams,
        systems,
        reputation: ReputationBook::new(),
        config,
    };
    tracing::info!(
        seed = state.config.seed,
        systems = state.systems.len(),
        agents = state.agents_alive(),
        "Simulation bootstrapped"
    );
    Ok(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use starlane_types::SystemState;
    use starlane_world::EmbeddedResources;

    use super::*;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.galaxy.columns = 2;
        config.galaxy.rows = 1;
        config.galaxy.density = 3;
        config.galaxy.min_density = 2;
        config
    }

    #[test]
    fn every_system_gets_a_runtime() {
        let resources = EmbeddedResources::load().unwrap();
        let state = build_simulation(small_config(), &resources).unwrap();
        assert_eq!(state.systems.len(), state.galaxy.system_count());
        assert_eq!(state.clock.tick(), 0);
        assert!(state.agents_alive() > 0);
        for runtime in &state.systems {
            assert_eq!(runtime.status.state(), SystemState::Stable);
            assert!(!runtime.roster.is_empty());
            assert_eq!(runtime.market.system(), runtime.system);
        }
        let snapshot = state.snapshot();
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.systems.len(), state.systems.len());
    }

    #[test]
    fn invalid_config_fails_before_generation() {
        let resources = EmbeddedResources::load().unwrap();
        let mut config = small_config();
        config.galaxy.columns = 0;
        let err = build_simulation(config, &resources).unwrap_err();
        assert!(matches!(err, BootstrapError::Config(ConfigError::Invalid { section: "galaxy", .. })));
    }
}
