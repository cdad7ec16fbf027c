//! Single-tick trading intents and the trades they produce.
//!
//! Bids and asks are never persisted past the tick they were submitted in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Commodity, OrderRejection, OrderSide};
use crate::ids::{AgentId, OrderId, SystemId, TradeId};

/// Willingness to buy `quantity` units at or below `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Bid {
    /// Submission sequence within the tick.
    pub id: OrderId,
    /// Submitting agent.
    pub agent: AgentId,
    /// Market the order targets.
    pub system: SystemId,
    /// Good being bought.
    pub commodity: Commodity,
    /// Maximum price per unit.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Units wanted.
    pub quantity: u32,
}

/// Willingness to sell `quantity` units at or above `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Ask {
    /// Submission sequence within the tick.
    pub id: OrderId,
    /// Submitting agent.
    pub agent: AgentId,
    /// Market the order targets.
    pub system: SystemId,
    /// Good being sold.
    pub commodity: Commodity,
    /// Minimum price per unit.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Units offered.
    pub quantity: u32,
}

/// Either side of the book, as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// A buy intent.
    Bid(Bid),
    /// A sell intent.
    Ask(Ask),
}

impl Order {
    /// Side of the order.
    pub const fn side(&self) -> OrderSide {
        match self {
            Self::Bid(_) => OrderSide::Bid,
            Self::Ask(_) => OrderSide::Ask,
        }
    }

    /// Submitting agent.
    pub const fn agent(&self) -> AgentId {
        match self {
            Self::Bid(bid) => bid.agent,
            Self::Ask(ask) => ask.agent,
        }
    }

    /// Commodity of the order.
    pub const fn commodity(&self) -> Commodity {
        match self {
            Self::Bid(bid) => bid.commodity,
            Self::Ask(ask) => ask.commodity,
        }
    }

    /// Submission sequence.
    pub const fn id(&self) -> OrderId {
        match self {
            Self::Bid(bid) => bid.id,
            Self::Ask(ask) => ask.id,
        }
    }
}

/// An executed match between one bid and one ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Trade {
    /// Sequence within the tick.
    pub id: TradeId,
    /// Market the trade cleared in.
    pub system: SystemId,
    /// Good exchanged.
    pub commodity: Commodity,
    /// Buying agent.
    pub buyer: AgentId,
    /// Selling agent.
    pub seller: AgentId,
    /// Bid that was matched.
    pub bid: OrderId,
    /// Ask that was matched.
    pub ask: OrderId,
    /// Limit price of the bid.
    #[ts(as = "String")]
    pub bid_price: Decimal,
    /// Limit price of the ask.
    #[ts(as = "String")]
    pub ask_price: Decimal,
    /// Execution price per unit.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Units exchanged.
    pub quantity: u32,
    /// Whether the commodity is legal under the system's faction.
    pub legal: bool,
}

/// An order dropped at submission, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RejectedOrder {
    /// Submission sequence of the dropped order.
    pub order: OrderId,
    /// Submitting agent.
    pub agent: AgentId,
    /// Side of the dropped order.
    pub side: OrderSide,
    /// Commodity of the dropped order.
    pub commodity: Commodity,
    /// Why it was dropped.
    pub reason: OrderRejection,
}
