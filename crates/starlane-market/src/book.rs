//! Single-tick order intake with submission-time validation.
//!
//! An [`OrderBook`] collects the bids and asks of one system for one tick.
//! Each order is checked against the submitter's capital or holdings *minus
//! what earlier orders this tick already committed*, so the accepted set can
//! always be settled in full. Invalid orders are dropped and recorded; they
//! never abort the tick.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use starlane_types::{
    AgentId, Ask, Bid, Commodity, OrderId, OrderRejection, OrderSide, RejectedOrder, SystemId,
};

use crate::accounts::Accounts;

/// Bids and asks of one system for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBook {
    system: SystemId,
    open: bool,
    next_order: u64,
    bids: Vec<Bid>,
    asks: Vec<Ask>,
    rejected: Vec<RejectedOrder>,
    committed_capital: BTreeMap<AgentId, Decimal>,
    committed_units: BTreeMap<(AgentId, Commodity), u32>,
}

impl OrderBook {
    /// An empty book. A closed book rejects every order with
    /// [`OrderRejection::MarketClosed`].
    pub const fn new(system: SystemId, open: bool) -> Self {
        Self {
            system,
            open,
            next_order: 0,
            bids: Vec::new(),
            asks: Vec::new(),
            rejected: Vec::new(),
            committed_capital: BTreeMap::new(),
            committed_units: BTreeMap::new(),
        }
    }

    /// The system the book belongs to.
    pub const fn system(&self) -> SystemId {
        self.system
    }

    /// Whether the book accepts orders.
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Accepted bids in submission order.
    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Accepted asks in submission order.
    pub fn asks(&self) -> &[Ask] {
        &self.asks
    }

    /// Dropped orders in submission order.
    pub fn rejected(&self) -> &[RejectedOrder] {
        &self.rejected
    }

    /// Consume the book into its accepted bids, asks and rejections.
    pub fn into_parts(self) -> (Vec<Bid>, Vec<Ask>, Vec<RejectedOrder>) {
        (self.bids, self.asks, self.rejected)
    }

    /// Capital an agent has committed to bids this tick.
    pub fn committed_capital(&self, agent: AgentId) -> Decimal {
        self.committed_capital
            .get(&agent)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Units an agent has committed to asks this tick.
    pub fn committed_units(&self, agent: AgentId, commodity: Commodity) -> u32 {
        self.committed_units
            .get(&(agent, commodity))
            .copied()
            .unwrap_or(0)
    }

    fn next_id(&mut self) -> OrderId {
        let id = OrderId(self.next_order);
        self.next_order = self.next_order.saturating_add(1);
        id
    }

    fn reject(
        &mut self,
        order: OrderId,
        agent: AgentId,
        side: OrderSide,
        commodity: Commodity,
        reason: OrderRejection,
    ) -> OrderRejection {
        tracing::debug!(
            system = %self.system,
            agent = %agent,
            order = order.into_inner(),
            ?side,
            ?commodity,
            ?reason,
            "Order rejected"
        );
        self.rejected.push(RejectedOrder {
            order,
            agent,
            side,
            commodity,
            reason,
        });
        reason
    }

    fn precheck(&self, agent: AgentId, price: Decimal, quantity: u32) -> Option<OrderRejection> {
        if !self.open {
            Some(OrderRejection::MarketClosed)
        } else if agent.system != self.system {
            Some(OrderRejection::UnknownAgent)
        } else if quantity == 0 {
            Some(OrderRejection::ZeroQuantity)
        } else if price <= Decimal::ZERO {
            Some(OrderRejection::NonPositivePrice)
        } else {
            None
        }
    }

    /// Submit a bid to buy `quantity` units at up to `price`.
    ///
    /// # Errors
    ///
    /// Returns the [`OrderRejection`] if the order is dropped. The rejection
    /// is also recorded in [`rejected`](Self::rejected).
    pub fn submit_bid<A: Accounts + ?Sized>(
        &mut self,
        accounts: &A,
        agent: AgentId,
        commodity: Commodity,
        price: Decimal,
        quantity: u32,
    ) -> Result<OrderId, OrderRejection> {
        let id = self.next_id();
        let side = OrderSide::Bid;
        if let Some(reason) = self.precheck(agent, price, quantity) {
            return Err(self.reject(id, agent, side, commodity, reason));
        }
        let Some(capital) = accounts.capital(agent) else {
            return Err(self.reject(id, agent, side, commodity, OrderRejection::UnknownAgent));
        };
        let committed = self
            .committed_capital(agent)
            .checked_add(price.checked_mul(Decimal::from(quantity)).unwrap_or(Decimal::MAX));
        let Some(committed) = committed.filter(|total| *total <= capital) else {
            return Err(self.reject(
                id,
                agent,
                side,
                commodity,
                OrderRejection::InsufficientCapital,
            ));
        };
        self.committed_capital.insert(agent, committed);
        self.bids.push(Bid {
            id,
            agent,
            system: self.system,
            commodity,
            price,
            quantity,
        });
        Ok(id)
    }

    /// Submit an ask to sell `quantity` units at no less than `price`.
    ///
    /// # Errors
    ///
    /// Returns the [`OrderRejection`] if the order is dropped. The rejection
    /// is also recorded in [`rejected`](Self::rejected).
    pub fn submit_ask<A: Accounts + ?Sized>(
        &mut self,
        accounts: &A,
        agent: AgentId,
        commodity: Commodity,
        price: Decimal,
        quantity: u32,
    ) -> Result<OrderId, OrderRejection> {
        let id = self.next_id();
        let side = OrderSide::Ask;
        if let Some(reason) = self.precheck(agent, price, quantity) {
            return Err(self.reject(id, agent, side, commodity, reason));
        }
        let Some(held) = accounts.holding(agent, commodity) else {
            return Err(self.reject(id, agent, side, commodity, OrderRejection::UnknownAgent));
        };
        let committed = self
            .committed_units(agent, commodity)
            .checked_add(quantity)
            .filter(|total| *total <= held);
        let Some(committed) = committed else {
            return Err(self.reject(
                id,
                agent,
                side,
                commodity,
                OrderRejection::InsufficientInventory,
            ));
        };
        self.committed_units.insert((agent, commodity), committed);
        self.asks.push(Ask {
            id,
            agent,
            system: self.system,
            commodity,
            price,
            quantity,
        });
        Ok(id)
    }
}
