//! Trading agents for the Starlane simulation.
//!
//! This crate is the logic layer for agents: it populates systems, runs
//! per-tick upkeep, turns needs into orders and learns from clearing. It sits
//! between `starlane-market` (order books and settlement) and `starlane-core`
//! (the tick pipeline).
//!
//! # Modules
//!
//! - [`agent`] -- [`Agent`], price beliefs and preferences.
//! - [`config`] -- Population parameters ([`PopulationConfig`]).
//! - [`error`] -- Error types for agent operations ([`AgentError`]).
//! - [`inventory`] -- Cargo hold operations with capacity checks.
//! - [`population`] -- [`AgentPopulation`]: template-weighted agent draws.
//! - [`roster`] -- [`AgentRoster`]: per-system agents, upkeep, insolvency.
//! - [`strategy`] -- Order planning and belief learning.

pub mod agent;
pub mod config;
pub mod error;
pub mod inventory;
pub mod population;
pub mod roster;
pub mod strategy;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, Preference, PriceBelief};
pub use config::PopulationConfig;
pub use error::AgentError;
pub use population::AgentPopulation;
pub use roster::{AgentRoster, LifecycleEvent, RemovalCause, SubmissionReport, UpkeepReport};
pub use strategy::{OrderIntent, PlacedOrder, learn, plan_orders};
