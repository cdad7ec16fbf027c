//! Engine binary for the Starlane simulation.
//!
//! Loads configuration, generates the galaxy, populates every system and
//! runs the tick loop until a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `starlane-config.yaml`, apply env overrides
//! 3. Load embedded name, ship and agent tables
//! 4. Generate the galaxy and populate its markets
//! 5. Create operator state from the clock bounds
//! 6. Run the simulation loop, publishing a snapshot per tick
//! 7. Log the report and write it with the final snapshot as JSON to stdout

mod error;
mod report;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use starlane_core::{OperatorState, SimulationConfig, SnapshotBoard, runner};
use starlane_types::GalaxySnapshot;
use starlane_world::EmbeddedResources;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::report::RunReport;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "starlane-config.yaml";

/// Document written to stdout at the end of a run.
#[derive(Serialize)]
struct RunOutput<'a> {
    report: &'a RunReport,
    snapshot: &'a GalaxySnapshot,
}

fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("starlane-engine starting");

    // 2. Load configuration.
    let config = load_config().context("loading configuration")?;
    info!(
        seed = config.seed,
        sectors = config.galaxy.sector_count(),
        density = config.galaxy.density,
        max_ticks = config.clock.max_ticks,
        "Configuration loaded"
    );

    // 3. Resource tables.
    let resources = EmbeddedResources::load().map_err(EngineError::from)?;

    // 4. Generate and populate.
    let operator = Arc::new(OperatorState::new(&config.clock));
    let mut state = starlane_core::build_simulation(config, &resources).map_err(EngineError::from)?;
    info!(
        systems = state.systems.len(),
        agents = state.agents_alive(),
        "Simulation state assembled, entering tick loop"
    );

    // 5-6. Run.
    let mut board = SnapshotBoard::new(state.snapshot());
    let result = runner::run_simulation(&mut state, &operator, &mut board).map_err(EngineError::from)?;

    // 7. Report.
    runner::log_simulation_end(&result);
    let snapshot = board.read();
    let report = RunReport::new(&result, &snapshot, &operator);
    report.log(&snapshot);

    let mut stdout = std::io::stdout().lock();
    let output = RunOutput {
        report: &report,
        snapshot: &snapshot,
    };
    serde_json::to_writer_pretty(&mut stdout, &output).context("writing final snapshot")?;
    writeln!(stdout).context("writing final snapshot")?;

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "starlane-engine shutdown complete"
    );
    Ok(())
}

/// Load the simulation configuration from `starlane-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
/// Environment overrides apply in both cases.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}
