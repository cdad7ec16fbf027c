//! The agents of one system and their per-tick lifecycle.
//!
//! [`AgentRoster`] owns a system's agents and is their account book for the
//! market engine. Each tick the roster runs upkeep, submits planned orders,
//! learns from the clearing report and finally removes agents that fell below
//! the solvency floor. A removed agent's cargo returns to system stock and
//! its remaining capital to the treasury, so removal conserves goods and
//! money.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use starlane_market::{Accounts, Census, ClearingReport, MarketError, OrderBook, SystemMarket};
use starlane_types::{AgentId, Commodity, OrderSide, SystemId};
use starlane_world::{Purpose, SeededRandomStream};

use crate::agent::Agent;
use crate::config::PopulationConfig;
use crate::error::AgentError;
use crate::inventory;
use crate::strategy::{self, PlacedOrder};

/// Why an agent left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Capital fell below the solvency floor.
    Insolvent,
    /// The agent's system collapsed.
    SystemCollapsed,
}

/// A recorded agent lifecycle event. Removal is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// The removed agent.
    pub agent: AgentId,
    /// Tick of removal.
    pub tick: u64,
    /// Why it was removed.
    pub cause: RemovalCause,
    /// Capital returned to the treasury.
    pub capital: Decimal,
    /// Units returned to system stock.
    pub goods: u64,
}

/// Totals from one upkeep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpkeepReport {
    /// Units produced.
    pub produced: u64,
    /// Units consumed.
    pub consumed: u64,
    /// Fees paid to the treasury.
    pub fees: Decimal,
}

/// Orders submitted in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Orders the book accepted.
    pub accepted: u32,
    /// Orders the book rejected.
    pub rejected: u32,
}

/// All agents of one system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRoster {
    system: SystemId,
    agents: BTreeMap<AgentId, Agent>,
    placed: Vec<PlacedOrder>,
}

impl AgentRoster {
    /// Create a roster. Agents belonging to other systems are ignored.
    pub fn new(system: SystemId, agents: Vec<Agent>) -> Self {
        let agents = agents
            .into_iter()
            .filter(|agent| agent.id.system == system && !agent.id.is_house())
            .map(|agent| (agent.id, agent))
            .collect();
        Self {
            system,
            agents,
            placed: Vec::new(),
        }
    }

    /// The system the roster belongs to.
    pub const fn system(&self) -> SystemId {
        self.system
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the system has no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Look up an agent.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Orders placed this tick and not yet learned from.
    pub fn placed(&self) -> &[PlacedOrder] {
        &self.placed
    }

    /// Add every agent's capital and cargo to `census`.
    pub fn add_to_census(&self, census: &mut Census) -> Result<(), MarketError> {
        for agent in self.agents.values() {
            census.add_money(agent.capital)?;
            for (commodity, quantity) in &agent.inventory {
                census.add_goods(*commodity, u64::from(*quantity))?;
            }
        }
        Ok(())
    }

    /// Production, consumption and docking fees for every agent.
    ///
    /// Production fills free cargo and stops when the hold is full;
    /// consumption and fees saturate at zero. Fees go to the treasury.
    pub fn run_upkeep(
        &mut self,
        market: &mut SystemMarket,
        config: &PopulationConfig,
    ) -> Result<UpkeepReport, AgentError> {
        let mut report = UpkeepReport::default();
        for agent in self.agents.values_mut() {
            for (commodity, preference) in &agent.preferences {
                if preference.produce > 0 {
                    let room = inventory::free_capacity(&agent.inventory, agent.cargo_capacity);
                    let made = preference.produce.min(room);
                    inventory::load(&mut agent.inventory, agent.cargo_capacity, *commodity, made)?;
                    report.produced = report.produced.saturating_add(u64::from(made));
                }
                if preference.consume > 0 {
                    let used =
                        inventory::unload_saturating(&mut agent.inventory, *commodity, preference.consume);
                    report.consumed = report.consumed.saturating_add(u64::from(used));
                }
            }
            let fee = config.upkeep.min(agent.capital).max(Decimal::ZERO);
            agent.capital = agent.capital.saturating_sub(fee);
            market.deposit(fee)?;
            report.fees = report.fees.saturating_add(fee);
        }
        Ok(report)
    }

    /// Plan and submit every agent's orders for `tick`.
    ///
    /// Each agent draws from its own `Orders` stream keyed by the system
    /// path and a counter combining tick and agent sequence.
    pub fn submit_orders(
        &mut self,
        market: &SystemMarket,
        book: &mut OrderBook,
        streams: &SeededRandomStream,
        config: &PopulationConfig,
        tick: u64,
    ) -> Result<SubmissionReport, AgentError> {
        let path = [self.system.sector.into_inner(), self.system.index];
        let mut planned = Vec::new();
        for agent in self.agents.values() {
            let mut stream = streams.derive_at(&path, Purpose::Orders, order_counter(tick, agent.id))?;
            for intent in strategy::plan_orders(agent, market, config, &mut stream) {
                planned.push((agent.id, intent));
            }
        }

        let mut report = SubmissionReport::default();
        let mut placed = Vec::with_capacity(planned.len());
        for (agent, intent) in planned {
            let submitted = match intent.side {
                OrderSide::Bid => book.submit_bid(
                    &*self,
                    agent,
                    intent.commodity,
                    intent.price,
                    intent.quantity,
                ),
                OrderSide::Ask => book.submit_ask(
                    &*self,
                    agent,
                    intent.commodity,
                    intent.price,
                    intent.quantity,
                ),
            };
            match submitted {
                Ok(id) => {
                    report.accepted = report.accepted.saturating_add(1);
                    placed.push(PlacedOrder { id, agent, intent });
                }
                Err(_) => report.rejected = report.rejected.saturating_add(1),
            }
        }
        self.placed = placed;
        Ok(report)
    }

    /// Update beliefs from this tick's clearing and forget placed orders.
    pub fn learn(&mut self, report: &ClearingReport, market: &SystemMarket, config: &PopulationConfig) {
        let placed = core::mem::take(&mut self.placed);
        for agent in self.agents.values_mut() {
            strategy::learn(agent, &placed, report, market, config);
        }
    }

    /// Remove agents whose capital is below `floor`.
    pub fn remove_insolvent(
        &mut self,
        market: &mut SystemMarket,
        floor: Decimal,
        tick: u64,
    ) -> Result<Vec<LifecycleEvent>, AgentError> {
        let insolvent: Vec<AgentId> = self
            .agents
            .values()
            .filter(|agent| !agent.is_solvent(floor))
            .map(|agent| agent.id)
            .collect();
        let mut events = Vec::with_capacity(insolvent.len());
        for id in insolvent {
            let event = self.remove(id, market, tick, RemovalCause::Insolvent)?;
            tracing::info!(
                agent_id = %event.agent,
                tick,
                capital = %event.capital,
                goods = event.goods,
                "Agent removed for insolvency"
            );
            events.push(event);
        }
        Ok(events)
    }

    /// Remove every agent because the system collapsed.
    pub fn dissolve(
        &mut self,
        market: &mut SystemMarket,
        tick: u64,
    ) -> Result<Vec<LifecycleEvent>, AgentError> {
        let ids: Vec<AgentId> = self.agents.keys().copied().collect();
        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            events.push(self.remove(id, market, tick, RemovalCause::SystemCollapsed)?);
        }
        Ok(events)
    }

    fn remove(
        &mut self,
        id: AgentId,
        market: &mut SystemMarket,
        tick: u64,
        cause: RemovalCause,
    ) -> Result<LifecycleEvent, AgentError> {
        let mut agent = self.agents.remove(&id).ok_or(AgentError::AgentNotFound(id))?;
        let mut goods: u64 = 0;
        for (commodity, quantity) in inventory::drain_all(&mut agent.inventory) {
            market.add_stock(commodity, u64::from(quantity))?;
            goods = goods.saturating_add(u64::from(quantity));
        }
        market.deposit(agent.capital)?;
        Ok(LifecycleEvent {
            agent: id,
            tick,
            cause,
            capital: agent.capital,
            goods,
        })
    }
}

/// Stream counter for one agent in one tick.
fn order_counter(tick: u64, agent: AgentId) -> u64 {
    tick.wrapping_shl(32) | u64::from(agent.seq)
}

impl Accounts for AgentRoster {
    fn capital(&self, agent: AgentId) -> Option<Decimal> {
        self.agents.get(&agent).map(|a| a.capital)
    }

    fn holding(&self, agent: AgentId, commodity: Commodity) -> Option<u32> {
        self.agents.get(&agent).map(|a| a.holding(commodity))
    }

    fn settle_purchase(
        &mut self,
        agent: AgentId,
        commodity: Commodity,
        quantity: u32,
        cost: Decimal,
    ) -> Result<(), MarketError> {
        let buyer = self.agents.get_mut(&agent).ok_or(MarketError::UnknownAgent(agent))?;
        if cost > buyer.capital {
            return Err(MarketError::InsufficientCapital {
                agent,
                commodity,
                cost,
            });
        }
        inventory::stow(&mut buyer.inventory, commodity, quantity)
            .map_err(|_overflow| MarketError::ArithmeticOverflow)?;
        buyer.capital = buyer
            .capital
            .checked_sub(cost)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    fn settle_sale(
        &mut self,
        agent: AgentId,
        commodity: Commodity,
        quantity: u32,
        proceeds: Decimal,
    ) -> Result<(), MarketError> {
        let seller = self.agents.get_mut(&agent).ok_or(MarketError::UnknownAgent(agent))?;
        let available = seller.holding(commodity);
        inventory::unload(&mut seller.inventory, commodity, quantity).map_err(|_short| {
            MarketError::InsufficientInventory {
                agent,
                commodity,
                requested: quantity,
                available: u64::from(available),
            }
        })?;
        seller.capital = seller
            .capital
            .checked_add(proceeds)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use starlane_types::Faction;

    use super::*;
    use crate::agent::Preference;

    const SYSTEM: SystemId = SystemId::new(0, 0);

    fn agent(seq: u32, capital: Decimal) -> Agent {
        Agent {
            id: AgentId::new(SYSTEM, seq),
            template: "farmer".to_owned(),
            ship: "hauler".to_owned(),
            cargo_capacity: 20,
            capital,
            inventory: BTreeMap::from([(Commodity::Food, 18), (Commodity::Machinery, 1)]),
            preferences: BTreeMap::from([
                (
                    Commodity::Food,
                    Preference {
                        produce: 6,
                        consume: 0,
                    },
                ),
                (
                    Commodity::Machinery,
                    Preference {
                        produce: 0,
                        consume: 2,
                    },
                ),
            ]),
            beliefs: BTreeMap::new(),
            target_stock: 10,
        }
    }

    fn market() -> SystemMarket {
        SystemMarket::new(SYSTEM, Faction::Federation, BTreeMap::new(), dec!(0))
    }

    #[test]
    fn foreign_and_house_agents_are_ignored() {
        let foreign = Agent {
            id: AgentId::new(SystemId::new(1, 0), 1),
            ..agent(1, dec!(10))
        };
        let house = Agent {
            id: AgentId::house(SYSTEM),
            ..agent(1, dec!(10))
        };
        let roster = AgentRoster::new(SYSTEM, vec![agent(1, dec!(10)), foreign, house]);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn upkeep_produces_consumes_and_charges() {
        let mut roster = AgentRoster::new(SYSTEM, vec![agent(1, dec!(100)), agent(2, dec!(5))]);
        let mut market = market();
        let report = roster
            .run_upkeep(&mut market, &PopulationConfig::default())
            .unwrap();
        // Hold of 20 with 19 aboard: one unit of food fits, then one machinery is used.
        assert_eq!(report.produced, 2);
        assert_eq!(report.consumed, 2);
        assert_eq!(report.fees, dec!(20));
        assert_eq!(market.treasury(), dec!(20));
        let first = roster.get(AgentId::new(SYSTEM, 1)).unwrap();
        assert_eq!(first.holding(Commodity::Food), 19);
        assert_eq!(first.holding(Commodity::Machinery), 0);
        assert_eq!(first.capital, dec!(85));
        assert_eq!(roster.get(AgentId::new(SYSTEM, 2)).unwrap().capital, dec!(0));
    }

    #[test]
    fn insolvent_agents_return_goods_and_money() {
        let mut roster = AgentRoster::new(SYSTEM, vec![agent(1, dec!(500)), agent(2, dec!(40))]);
        let mut market = market();
        let events = roster.remove_insolvent(&mut market, dec!(100), 7).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].agent, AgentId::new(SYSTEM, 2));
        assert_eq!(events[0].cause, RemovalCause::Insolvent);
        assert_eq!(events[0].goods, 19);
        assert_eq!(market.stock(Commodity::Food), 18);
        assert_eq!(market.treasury(), dec!(40));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn dissolve_empties_roster() {
        let mut roster = AgentRoster::new(SYSTEM, vec![agent(1, dec!(500)), agent(2, dec!(40))]);
        let mut market = market();
        let events = roster.dissolve(&mut market, 3).unwrap();
        assert_eq!(events.len(), 2);
        assert!(roster.is_empty());
        assert_eq!(market.treasury(), dec!(540));
        assert_eq!(market.stock(Commodity::Food), 36);
    }

    #[test]
    fn settlement_is_all_or_nothing() {
        let mut roster = AgentRoster::new(SYSTEM, vec![agent(1, dec!(50))]);
        let id = AgentId::new(SYSTEM, 1);
        assert!(roster.settle_purchase(id, Commodity::Food, 1, dec!(60)).is_err());
        assert!(roster.settle_sale(id, Commodity::Food, 30, dec!(1)).is_err());
        let agent = roster.get(id).unwrap();
        assert_eq!(agent.capital, dec!(50));
        assert_eq!(agent.holding(Commodity::Food), 18);
    }

    #[test]
    fn order_counters_are_distinct() {
        let a = order_counter(1, AgentId::new(SYSTEM, 2));
        let b = order_counter(2, AgentId::new(SYSTEM, 1));
        assert_ne!(a, b);
    }
}
