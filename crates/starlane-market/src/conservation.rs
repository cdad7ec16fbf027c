//! Conservation check around clearing.
//!
//! Clearing only moves goods and money between participants, so for every
//! commodity the total held by agents plus the market's stock is the same
//! before and after, and so is the total money held by agents plus the house
//! treasury. Holds by construction; the check guards against settlement
//! bugs and is run every tick.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use starlane_types::{Commodity, SystemId};

use crate::error::MarketError;
use crate::market::SystemMarket;

/// Totals of goods and money across all participants of one market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Census {
    /// Units of each commodity.
    pub goods: BTreeMap<Commodity, u64>,
    /// Money.
    pub money: Decimal,
}

impl Census {
    /// Start a census with the market's stock and treasury.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ArithmeticOverflow`] on overflow.
    pub fn of_market(market: &SystemMarket) -> Result<Self, MarketError> {
        let mut census = Self::default();
        for commodity in Commodity::ALL {
            census.add_goods(commodity, market.stock(commodity))?;
        }
        census.add_money(market.treasury())?;
        Ok(census)
    }

    /// Count `quantity` units of `commodity`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ArithmeticOverflow`] on overflow.
    pub fn add_goods(&mut self, commodity: Commodity, quantity: u64) -> Result<(), MarketError> {
        let total = self.goods.entry(commodity).or_insert(0);
        *total = total
            .checked_add(quantity)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Count money.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ArithmeticOverflow`] on overflow.
    pub fn add_money(&mut self, amount: Decimal) -> Result<(), MarketError> {
        self.money = self
            .money
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }
}

/// A conservation violation in one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConservationAnomaly {
    /// Market where the violation occurred.
    pub system: SystemId,
    /// Tick of the clearing.
    pub tick: u64,
    /// Commodities whose totals changed: `(before, after)`.
    pub goods: BTreeMap<Commodity, (u64, u64)>,
    /// Money totals if they changed: `(before, after)`.
    pub money: Option<(Decimal, Decimal)>,
    /// Human-readable summary.
    pub message: String,
}

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Totals unchanged.
    Balanced,
    /// One or more totals changed.
    Anomaly(ConservationAnomaly),
}

/// Compare the census taken before clearing with the one taken after.
pub fn verify_conservation(
    system: SystemId,
    tick: u64,
    before: &Census,
    after: &Census,
) -> ConservationResult {
    let mut goods = BTreeMap::new();
    for commodity in Commodity::ALL {
        let old = before.goods.get(&commodity).copied().unwrap_or(0);
        let new = after.goods.get(&commodity).copied().unwrap_or(0);
        if old != new {
            goods.insert(commodity, (old, new));
        }
    }
    let money = (before.money != after.money).then_some((before.money, after.money));

    if goods.is_empty() && money.is_none() {
        return ConservationResult::Balanced;
    }
    let count = goods.len();
    ConservationResult::Anomaly(ConservationAnomaly {
        system,
        tick,
        goods,
        money,
        message: format!(
            "CONSERVATION_ANOMALY in {system} at tick {tick}: {count} commodity total(s) changed, money {}",
            if money.is_some() { "changed" } else { "balanced" }
        ),
    })
}
