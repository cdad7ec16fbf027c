//! Error types for the `starlane-agents` crate.
//!
//! Inventory and population failures are typed rather than panicking.
//! Settlement through the market seam reports
//! [`MarketError`](starlane_market::MarketError) instead, because that is
//! the error the clearing engine understands.

use starlane_market::MarketError;
use starlane_types::{AgentId, Commodity, SystemId};
use starlane_world::WorldError;

/// Errors that can occur during agent state operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Adding goods would exceed the ship's cargo hold.
    #[error("cargo overflow: adding {attempted} of {commodity:?} would exceed capacity (current load: {current_load}, capacity: {capacity})")]
    CargoOverflow {
        /// The good being added.
        commodity: Commodity,
        /// The quantity the caller attempted to add.
        attempted: u32,
        /// Units already aboard.
        current_load: u32,
        /// Cargo capacity of the ship.
        capacity: u32,
    },

    /// Attempted to remove more of a commodity than the agent holds.
    #[error("insufficient {commodity:?}: wanted {requested} but only have {available}")]
    InsufficientCommodity {
        /// The good being removed.
        commodity: Commodity,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity the agent actually holds.
        available: u32,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// Agent with the given id is not in the roster.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// A template names a ship class the resources do not define.
    #[error("template {template} flies unknown ship {ship}")]
    UnknownShip {
        /// The agent template.
        template: String,
        /// The missing ship class.
        ship: String,
    },

    /// Every template weight is zero, so no agent can be drawn.
    #[error("no agent template can be drawn for system {0}")]
    NoTemplates(SystemId),

    /// Population parameters are invalid.
    #[error("invalid population configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// Deriving a random stream failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// A market operation failed.
    #[error(transparent)]
    Market(#[from] MarketError),
}

impl AgentError {
    pub(crate) fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: context.to_owned(),
        }
    }
}
