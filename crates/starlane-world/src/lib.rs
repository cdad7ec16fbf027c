//! Deterministic procedural universe generation for the Starlane simulation.
//!
//! Given a seed and a validated [`GalaxyConfig`], this crate builds the
//! Galaxy -> Sector -> System -> {Star, Planet} hierarchy. Any node can be
//! regenerated from its path alone, and sectors are generated in parallel.
//!
//! # Modules
//!
//! - [`config`] -- Generation parameters and validation.
//! - [`error`] -- [`WorldError`] and generation paths.
//! - [`generator`] -- [`UniverseGenerator`]: sectors, placement, stars, planets.
//! - [`names`] -- Per-scope name pools drawn without replacement.
//! - [`parallel`] -- Order-preserving parallel map helpers.
//! - [`resources`] -- The [`ResourceProvider`] trait and embedded tables.
//! - [`rng`] -- [`SeededRandomStream`]: path-keyed deterministic streams.

pub mod config;
pub mod error;
pub mod generator;
pub mod names;
pub mod parallel;
pub mod resources;
pub mod rng;

pub use config::{GalaxyConfig, OrbitConfig};
pub use error::{GenerationFailure, GenerationPath, WorldError};
pub use generator::{UniverseGenerator, generate_galaxy};
pub use names::NamePool;
pub use resources::{AgentProfile, EmbeddedResources, ResourceProvider, ShipCharacteristics};
pub use rng::{PathLimits, Purpose, RandomStream, SeededRandomStream};
