//! The seam between the market engine and whoever holds capital and goods.
//!
//! The engine validates orders and settles fills through [`Accounts`]. Agent
//! rosters implement it for their agents; [`SystemMarket`] implements it for
//! the house participant. [`Participants`] routes each identifier to the
//! right side.

use rust_decimal::Decimal;
use starlane_types::{AgentId, Commodity};

use crate::error::MarketError;
use crate::market::SystemMarket;

/// Read and settle participant balances.
pub trait Accounts {
    /// Current capital, or `None` if the agent is unknown.
    fn capital(&self, agent: AgentId) -> Option<Decimal>;

    /// Units of `commodity` held, or `None` if the agent is unknown.
    fn holding(&self, agent: AgentId, commodity: Commodity) -> Option<u32>;

    /// Pay `cost` and receive `quantity` units.
    ///
    /// Must apply both effects or neither.
    fn settle_purchase(
        &mut self,
        agent: AgentId,
        commodity: Commodity,
        quantity: u32,
        cost: Decimal,
    ) -> Result<(), MarketError>;

    /// Deliver `quantity` units and receive `proceeds`.
    ///
    /// Must apply both effects or neither.
    fn settle_sale(
        &mut self,
        agent: AgentId,
        commodity: Commodity,
        quantity: u32,
        proceeds: Decimal,
    ) -> Result<(), MarketError>;
}

/// Agents of one system plus that system's house.
#[derive(Debug)]
pub struct Participants<'a, A: Accounts + ?Sized> {
    /// The market, acting as the house.
    pub market: &'a mut SystemMarket,
    /// Everyone else.
    pub agents: &'a mut A,
}

impl<'a, A: Accounts + ?Sized> Participants<'a, A> {
    /// Combine a market and an agent roster.
    pub const fn new(market: &'a mut SystemMarket, agents: &'a mut A) -> Self {
        Self { market, agents }
    }
}

impl<A: Accounts + ?Sized> Accounts for Participants<'_, A> {
    fn capital(&self, agent: AgentId) -> Option<Decimal> {
        if agent.is_house() {
            self.market.capital(agent)
        } else {
            self.agents.capital(agent)
        }
    }

    fn holding(&self, agent: AgentId, commodity: Commodity) -> Option<u32> {
        if agent.is_house() {
            self.market.holding(agent, commodity)
        } else {
            self.agents.holding(agent, commodity)
        }
    }

    fn settle_purchase(
        &mut self,
        agent: AgentId,
        commodity: Commodity,
        quantity: u32,
        cost: Decimal,
    ) -> Result<(), MarketError> {
        if agent.is_house() {
            self.market.settle_purchase(agent, commodity, quantity, cost)
        } else {
            self.agents.settle_purchase(agent, commodity, quantity, cost)
        }
    }

    fn settle_sale(
        &mut self,
        agent: AgentId,
        commodity: Commodity,
        quantity: u32,
        proceeds: Decimal,
    ) -> Result<(), MarketError> {
        if agent.is_house() {
            self.market.settle_sale(agent, commodity, quantity, proceeds)
        } else {
            self.agents.settle_sale(agent, commodity, quantity, proceeds)
        }
    }
}
