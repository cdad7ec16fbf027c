//! Error types for the `starlane-market` crate.
//!
//! Order-level problems are not errors: they become
//! [`OrderRejection`](starlane_types::OrderRejection) values and the tick
//! continues. [`MarketError`] covers failures that indicate a broken
//! invariant (settlement of an order that passed validation) or bad input.

use starlane_types::{AgentId, Commodity, SystemId};
use starlane_world::WorldError;

/// Errors that can occur during market setup or settlement.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Arithmetic overflow in a price or quantity calculation.
    #[error("arithmetic overflow in market calculation")]
    ArithmeticOverflow,

    /// The agent is not registered in this market.
    #[error("agent {0} is not registered in this market")]
    UnknownAgent(AgentId),

    /// The house identifier belongs to a different system.
    #[error("house account of {found} used in market {expected}")]
    ForeignHouse {
        /// Market being settled.
        expected: SystemId,
        /// System the identifier belongs to.
        found: SystemId,
    },

    /// A buyer lacked the capital to pay for a fill.
    #[error("agent {agent} cannot pay {cost} for {commodity:?}")]
    InsufficientCapital {
        /// The buyer.
        agent: AgentId,
        /// The good being bought.
        commodity: Commodity,
        /// Cost of the fill.
        cost: rust_decimal::Decimal,
    },

    /// A seller lacked the units to deliver a fill.
    #[error("agent {agent} holds {available} {commodity:?}, needs {requested}")]
    InsufficientInventory {
        /// The seller.
        agent: AgentId,
        /// The good being sold.
        commodity: Commodity,
        /// Units required.
        requested: u32,
        /// Units held.
        available: u64,
    },

    /// Deriving a random stream failed.
    #[error("stream derivation failed: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Market parameters are invalid.
    #[error("invalid market configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}
