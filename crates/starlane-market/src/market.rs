//! Per-system market state: published prices, house stock and treasury.
//!
//! The market itself trades as the house participant
//! ([`AgentId::house`]). Its stock is the system's commodity stock, so goods
//! the house sells leave stock and goods it buys enter it; every trade moves
//! quantity between holders and never creates or destroys it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use starlane_types::{AgentId, Commodity, CommodityQuote, Faction, SystemId};

use crate::accounts::Accounts;
use crate::error::MarketError;

/// Price, stock and last-tick volume of one commodity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEntry {
    /// Published price per unit.
    pub price: Decimal,
    /// Units held by the market.
    pub stock: u64,
    /// Units traded during the last clearing.
    pub last_volume: u64,
}

/// The market of one star system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMarket {
    system: SystemId,
    faction: Faction,
    entries: BTreeMap<Commodity, MarketEntry>,
    treasury: Decimal,
}

impl SystemMarket {
    /// Create a market. Commodities missing from `entries` start at their
    /// base price with zero stock, so every commodity is always tracked.
    pub fn new(
        system: SystemId,
        faction: Faction,
        mut entries: BTreeMap<Commodity, MarketEntry>,
        treasury: Decimal,
    ) -> Self {
        for commodity in Commodity::ALL {
            entries.entry(commodity).or_insert_with(|| MarketEntry {
                price: commodity.base_price(),
                stock: 0,
                last_volume: 0,
            });
        }
        Self {
            system,
            faction,
            entries,
            treasury,
        }
    }

    /// The system this market belongs to.
    pub const fn system(&self) -> SystemId {
        self.system
    }

    /// Faction whose law governs the market.
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Whether `commodity` is legal here.
    pub const fn is_legal(&self, commodity: Commodity) -> bool {
        self.faction.permits(commodity)
    }

    /// The house participant's identifier.
    pub const fn house(&self) -> AgentId {
        AgentId::house(self.system)
    }

    /// Published price.
    pub fn price(&self, commodity: Commodity) -> Decimal {
        self.entries
            .get(&commodity)
            .map_or_else(|| commodity.base_price(), |entry| entry.price)
    }

    /// Units in stock.
    pub fn stock(&self, commodity: Commodity) -> u64 {
        self.entries.get(&commodity).map_or(0, |entry| entry.stock)
    }

    /// Units traded during the last clearing.
    pub fn last_volume(&self, commodity: Commodity) -> u64 {
        self.entries.get(&commodity).map_or(0, |entry| entry.last_volume)
    }

    /// House money.
    pub const fn treasury(&self) -> Decimal {
        self.treasury
    }

    /// Replace the published price.
    pub fn set_price(&mut self, commodity: Commodity, price: Decimal) {
        self.entry_mut(commodity).price = price;
    }

    /// Record the units traded during a clearing.
    pub fn set_last_volume(&mut self, commodity: Commodity, volume: u64) {
        self.entry_mut(commodity).last_volume = volume;
    }

    /// Add units to stock (returned inventory, house purchases).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ArithmeticOverflow`] if stock would overflow.
    pub fn add_stock(&mut self, commodity: Commodity, quantity: u64) -> Result<(), MarketError> {
        let entry = self.entry_mut(commodity);
        entry.stock = entry
            .stock
            .checked_add(quantity)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Credit the treasury (docking fees, liquidated agents).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ArithmeticOverflow`] if the treasury would overflow.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), MarketError> {
        self.treasury = self
            .treasury
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Remove units from stock.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InsufficientInventory`] if stock is short.
    pub fn remove_stock(&mut self, commodity: Commodity, quantity: u32) -> Result<(), MarketError> {
        let house = self.house();
        let entry = self.entry_mut(commodity);
        entry.stock = entry
            .stock
            .checked_sub(u64::from(quantity))
            .ok_or(MarketError::InsufficientInventory {
                agent: house,
                commodity,
                requested: quantity,
                available: entry.stock,
            })?;
        Ok(())
    }

    /// Snapshot rows for every commodity, in commodity order.
    pub fn quotes(&self) -> Vec<CommodityQuote> {
        self.entries
            .iter()
            .map(|(commodity, entry)| CommodityQuote {
                commodity: *commodity,
                price: entry.price,
                stock: entry.stock,
                last_volume: entry.last_volume,
            })
            .collect()
    }

    fn entry_mut(&mut self, commodity: Commodity) -> &mut MarketEntry {
        self.entries.entry(commodity).or_insert_with(|| MarketEntry {
            price: commodity.base_price(),
            stock: 0,
            last_volume: 0,
        })
    }

    fn check_house(&self, agent: AgentId) -> Result<(), MarketError> {
        if agent.system != self.system {
            return Err(MarketError::ForeignHouse {
                expected: self.system,
                found: agent.system,
            });
        }
        if !agent.is_house() {
            return Err(MarketError::UnknownAgent(agent));
        }
        Ok(())
    }
}

/// The market is the house participant's account.
impl Accounts for SystemMarket {
    fn capital(&self, agent: AgentId) -> Option<Decimal> {
        (agent == self.house()).then_some(self.treasury)
    }

    fn holding(&self, agent: AgentId, commodity: Commodity) -> Option<u32> {
        (agent == self.house()).then(|| u32::try_from(self.stock(commodity)).unwrap_or(u32::MAX))
    }

    fn settle_purchase(
        &mut self,
        agent: AgentId,
        commodity: Commodity,
        quantity: u32,
        cost: Decimal,
    ) -> Result<(), MarketError> {
        self.check_house(agent)?;
        if cost > self.treasury {
            return Err(MarketError::InsufficientCapital {
                agent,
                commodity,
                cost,
            });
        }
        self.add_stock(commodity, u64::from(quantity))?;
        self.treasury = self
            .treasury
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
        self.check_house(agent)?;
        self.remove_stock(commodity, quantity)?;
        self.treasury = self
            .treasury
            .checked_add(proceeds)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }
}
