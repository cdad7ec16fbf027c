//! Orchestration layer of the Starlane simulation.
//!
//! This crate ties the generated universe, the system markets and the agent
//! populations into a deterministic tick loop, and exposes the read-only
//! snapshot external consumers poll.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration tree, env overrides, validation
//! - [`clock`] -- tick counter and simulated time
//! - [`reputation`] -- faction reputation per system
//! - [`security`] -- system state machine and security level
//! - [`operator`] -- stop requests and interventions between ticks
//! - [`bootstrap`] -- tick-0 state from a configuration
//! - [`tick`] -- the per-tick pipeline
//! - [`runner`] -- the bounded tick loop
//! - [`snapshot`] -- the board external consumers poll

pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod operator;
pub mod reputation;
pub mod runner;
pub mod security;
pub mod snapshot;
pub mod tick;

pub use bootstrap::{BootstrapError, build_simulation};
pub use clock::{ClockError, SimulationClock};
pub use config::{ClockConfig, ConfigError, SecurityConfig, SimulationConfig};
pub use operator::{Intervention, OperatorState, SimulationEndReason};
pub use reputation::{ReputationBook, TradeTally};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, log_simulation_end, run_simulation};
pub use security::{StateTransition, SystemStatus};
pub use snapshot::SnapshotBoard;
pub use tick::{SimulationState, SystemRuntime, TickError, TickSummary, run_tick};
