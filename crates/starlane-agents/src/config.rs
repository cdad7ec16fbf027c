//! Population parameters, the `population` section of `starlane-config.yaml`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Configuration for agent population and per-tick agent behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Fewest agents placed in a system (default: 4).
    #[serde(default = "default_min_agents")]
    pub min_agents: u32,

    /// Most agents placed in a system (default: 10).
    #[serde(default = "default_max_agents")]
    pub max_agents: u32,

    /// Multiplier on a template's weight when its affinity matches the
    /// system's dominant economy (default: 4).
    #[serde(default = "default_affinity_boost")]
    pub affinity_boost: u32,

    /// Capital below which an agent is removed (default: 100).
    #[serde(default = "default_solvency_floor")]
    pub solvency_floor: Decimal,

    /// Docking fee paid to the system treasury every tick (default: 15).
    #[serde(default = "default_upkeep")]
    pub upkeep: Decimal,

    /// Initial half-width of a price belief as a fraction of the published
    /// price (default: 0.15).
    #[serde(default = "default_belief_spread")]
    pub belief_spread: Decimal,

    /// How far a belief moves per trading outcome (default: 0.2).
    #[serde(default = "default_belief_learning_rate")]
    pub belief_learning_rate: Decimal,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            min_agents: default_min_agents(),
            max_agents: default_max_agents(),
            affinity_boost: default_affinity_boost(),
            solvency_floor: default_solvency_floor(),
            upkeep: default_upkeep(),
            belief_spread: default_belief_spread(),
            belief_learning_rate: default_belief_learning_rate(),
        }
    }
}

impl PopulationConfig {
    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] for the first invalid parameter.
    pub fn validate(&self) -> Result<(), AgentError> {
        let invalid = |reason: &str| {
            Err(AgentError::InvalidConfig {
                reason: reason.to_owned(),
            })
        };
        if self.min_agents > self.max_agents {
            return invalid("min_agents must not exceed max_agents");
        }
        if self.affinity_boost == 0 {
            return invalid("affinity_boost must be at least 1");
        }
        if self.solvency_floor.is_sign_negative() {
            return invalid("solvency_floor must not be negative");
        }
        if self.upkeep.is_sign_negative() {
            return invalid("upkeep must not be negative");
        }
        if self.belief_spread <= Decimal::ZERO || self.belief_spread >= Decimal::ONE {
            return invalid("belief_spread must be in (0, 1)");
        }
        if self.belief_learning_rate <= Decimal::ZERO || self.belief_learning_rate > Decimal::ONE {
            return invalid("belief_learning_rate must be in (0, 1]");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_min_agents() -> u32 {
    4
}

const fn default_max_agents() -> u32 {
    10
}

const fn default_affinity_boost() -> u32 {
    4
}

const fn default_solvency_floor() -> Decimal {
    Decimal::from_parts(100, 0, 0, false, 0)
}

const fn default_upkeep() -> Decimal {
    Decimal::from_parts(15, 0, 0, false, 0)
}

const fn default_belief_spread() -> Decimal {
    Decimal::from_parts(15, 0, 0, false, 2)
}

const fn default_belief_learning_rate() -> Decimal {
    Decimal::from_parts(2, 0, 0, false, 1)
}
