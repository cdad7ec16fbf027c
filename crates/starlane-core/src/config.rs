//! Configuration loading and typed config structures for the Starlane
//! simulation.
//!
//! The canonical configuration lives in `starlane-config.yaml` at the project
//! root. Each section maps onto the parameter struct of the crate that owns
//! the concern; this module stitches them together, loads the YAML, applies
//! environment overrides and validates everything once, before any
//! generation work begins.

use std::path::Path;

use serde::{Deserialize, Serialize};
use starlane_agents::PopulationConfig;
use starlane_market::MarketConfig;
use starlane_world::GalaxyConfig;

/// Environment variable overriding [`SimulationConfig::seed`].
pub const SEED_ENV: &str = "STARLANE_SEED";

/// Environment variable overriding [`ClockConfig::max_ticks`].
pub const MAX_TICKS_ENV: &str = "STARLANE_MAX_TICKS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override is not a valid value.
    #[error("environment variable {var} has invalid value {value:?}")]
    Env {
        /// The variable.
        var: &'static str,
        /// Its raw value.
        value: String,
    },

    /// A parameter is out of range.
    #[error("invalid configuration in {section}: {reason}")]
    Invalid {
        /// The YAML section holding the bad value.
        section: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `starlane-config.yaml`. Every field has a
/// default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Root seed for every random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Universe generation parameters.
    #[serde(default)]
    pub galaxy: GalaxyConfig,

    /// Agent population parameters.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Market parameters.
    #[serde(default)]
    pub market: MarketConfig,

    /// Reputation and security thresholds.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Tick timing and run bounds.
    #[serde(default)]
    pub clock: ClockConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            galaxy: GalaxyConfig::default(),
            population: PopulationConfig::default(),
            market: MarketConfig::default(),
            security: SecurityConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// Overrides:
    /// - `STARLANE_SEED` overrides `seed`
    /// - `STARLANE_MAX_TICKS` overrides `clock.max_ticks`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Env`] for a malformed override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if a variable is set but not a number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if a variable is set but not a number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = parse_override(&lookup, SEED_ENV)? {
            self.seed = seed;
        }
        if let Some(max_ticks) = parse_override(&lookup, MAX_TICKS_ENV)? {
            self.clock.max_ticks = max_ticks;
        }
        Ok(())
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.galaxy.validate().map_err(|err| ConfigError::Invalid {
            section: "galaxy",
            reason: err.to_string(),
        })?;
        self.population.validate().map_err(|err| ConfigError::Invalid {
            section: "population",
            reason: err.to_string(),
        })?;
        self.market.validate().map_err(|err| ConfigError::Invalid {
            section: "market",
            reason: err.to_string(),
        })?;
        self.security.validate()?;
        self.clock.validate()?;
        Ok(())
    }
}

fn parse_override<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_parse| ConfigError::Env { var, value })
        })
        .transpose()
}

/// Reputation and security thresholds, the `security` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Owner reputation below which a system becomes Contested (default: -100).
    #[serde(default = "default_contested_threshold")]
    pub contested_threshold: i32,

    /// Consecutive bad ticks that make a system Contested (default: 5).
    #[serde(default = "default_bad_tick_limit")]
    pub bad_tick_limit: u32,

    /// Consecutive Contested ticks below threshold before collapse (default: 10).
    #[serde(default = "default_collapse_after_ticks")]
    pub collapse_after_ticks: u32,

    /// Legal volume in one tick that marks a Boom (default: 150).
    #[serde(default = "default_boom_volume")]
    pub boom_volume: u64,

    /// Security score lost per illegal trade (default: 2).
    #[serde(default = "default_illegal_trade_penalty")]
    pub illegal_trade_penalty: u32,

    /// Security score lost per rejected order (default: 1).
    #[serde(default = "default_rejected_order_penalty")]
    pub rejected_order_penalty: u32,

    /// Security score lost when trading lowered owner reputation (default: 1).
    #[serde(default = "default_reputation_trend_penalty")]
    pub reputation_trend_penalty: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            contested_threshold: default_contested_threshold(),
            bad_tick_limit: default_bad_tick_limit(),
            collapse_after_ticks: default_collapse_after_ticks(),
            boom_volume: default_boom_volume(),
            illegal_trade_penalty: default_illegal_trade_penalty(),
            rejected_order_penalty: default_rejected_order_penalty(),
            reputation_trend_penalty: default_reputation_trend_penalty(),
        }
    }
}

impl SecurityConfig {
    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first invalid parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                section: "security",
                reason: reason.to_owned(),
            })
        };
        if !(crate::reputation::MIN_REPUTATION..=crate::reputation::MAX_REPUTATION)
            .contains(&self.contested_threshold)
        {
            return invalid("contested_threshold must lie within the reputation range");
        }
        if self.bad_tick_limit == 0 {
            return invalid("bad_tick_limit must be at least 1");
        }
        if self.collapse_after_ticks == 0 {
            return invalid("collapse_after_ticks must be at least 1");
        }
        Ok(())
    }
}

/// Tick timing and run bounds, the `clock` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Simulated seconds per tick (default: 3600).
    #[serde(default = "default_tick_duration_secs")]
    pub tick_duration_secs: u64,

    /// Ticks to run before stopping; 0 runs until stopped (default: 100).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_duration_secs: default_tick_duration_secs(),
            max_ticks: default_max_ticks(),
        }
    }
}

impl ClockConfig {
    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the tick duration is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_duration_secs == 0 {
            return Err(ConfigError::Invalid {
                section: "clock",
                reason: "tick_duration_secs must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_contested_threshold() -> i32 {
    -100
}

const fn default_bad_tick_limit() -> u32 {
    5
}

const fn default_collapse_after_ticks() -> u32 {
    10
}

const fn default_boom_volume() -> u64 {
    150
}

const fn default_illegal_trade_penalty() -> u32 {
    2
}

const fn default_rejected_order_penalty() -> u32 {
    1
}

const fn default_reputation_trend_penalty() -> u32 {
    1
}

const fn default_tick_duration_secs() -> u64 {
    3600
}

const fn default_max_ticks() -> u64 {
    100
}
