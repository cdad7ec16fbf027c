//! Trading agents and their price beliefs.
//!
//! An [`Agent`] is one economic actor bound to one system. It holds capital,
//! a cargo hold, a production/consumption [`Preference`] per commodity and a
//! [`PriceBelief`] per commodity it trades. Beliefs are ranges: a filled
//! order pulls the range toward the price actually paid, an unfilled one
//! widens it and shifts it toward the published price.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use starlane_types::{AgentId, Commodity};
use starlane_world::RandomStream;

use crate::inventory;

/// Basis points in one whole, the resolution of belief draws.
const DRAW_RESOLUTION: u32 = 10_000;

/// Lowest price an agent will ever quote.
const MIN_QUOTE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Range of prices an agent considers fair for one commodity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBelief {
    /// Lowest fair price.
    pub low: Decimal,
    /// Highest fair price.
    pub high: Decimal,
}

impl PriceBelief {
    /// A range of `price * (1 +/- spread)`.
    pub fn around(price: Decimal, spread: Decimal) -> Self {
        let half = price.saturating_mul(spread);
        Self {
            low: price.saturating_sub(half).max(MIN_QUOTE).round_dp(4),
            high: price.saturating_add(half).max(MIN_QUOTE).round_dp(4),
        }
    }

    /// Centre of the range.
    pub fn mean(&self) -> Decimal {
        self.low
            .saturating_add(self.high)
            .checked_div(Decimal::TWO)
            .unwrap_or(self.low)
    }

    /// Width of the range.
    pub fn width(&self) -> Decimal {
        self.high.saturating_sub(self.low)
    }

    /// Uniform quote from the range, rounded to cents.
    pub fn draw(&self, stream: &mut RandomStream) -> Decimal {
        let step = Decimal::new(i64::from(stream.range_u32(0, DRAW_RESOLUTION)), 4);
        self.low
            .saturating_add(self.width().saturating_mul(step))
            .round_dp(2)
            .max(MIN_QUOTE)
    }

    /// Move both bounds a fraction `rate` toward `observed`.
    pub fn narrow(&mut self, observed: Decimal, rate: Decimal) {
        let toward = |bound: Decimal| {
            bound
                .saturating_add(observed.saturating_sub(bound).saturating_mul(rate))
                .round_dp(4)
        };
        self.low = toward(self.low).max(MIN_QUOTE);
        self.high = toward(self.high).max(self.low);
    }

    /// Widen by `rate * published` and shift the centre a fraction `rate`
    /// toward `published`.
    pub fn widen(&mut self, published: Decimal, rate: Decimal) {
        let shift = published.saturating_sub(self.mean()).saturating_mul(rate);
        let half = published
            .saturating_mul(rate)
            .checked_div(Decimal::TWO)
            .unwrap_or(Decimal::ZERO);
        self.low = self
            .low
            .saturating_add(shift)
            .saturating_sub(half)
            .max(MIN_QUOTE)
            .round_dp(4);
        self.high = self
            .high
            .saturating_add(shift)
            .saturating_add(half)
            .round_dp(4)
            .max(self.low);
    }
}

/// What an agent does with a commodity each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// Units made per tick. Producers sell surplus above target.
    pub produce: u32,
    /// Units used per tick. Consumers buy up to target.
    pub consume: u32,
}

/// One economic actor in one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identifier, scoped to the agent's system.
    pub id: AgentId,
    /// Template the agent was drawn from.
    pub template: String,
    /// Ship class flown.
    pub ship: String,
    /// Cargo hold size in units.
    pub cargo_capacity: u32,
    /// Money on hand.
    pub capital: Decimal,
    /// Goods aboard.
    pub inventory: BTreeMap<Commodity, u32>,
    /// Per-commodity production and consumption.
    pub preferences: BTreeMap<Commodity, Preference>,
    /// Per-commodity fair price ranges.
    pub beliefs: BTreeMap<Commodity, PriceBelief>,
    /// Holding the agent steers toward for every commodity it trades.
    pub target_stock: u32,
}

impl Agent {
    /// Units of `commodity` aboard.
    pub fn holding(&self, commodity: Commodity) -> u32 {
        inventory::holding(&self.inventory, commodity)
    }

    /// Unused cargo space.
    pub fn free_cargo(&self) -> u32 {
        inventory::free_capacity(&self.inventory, self.cargo_capacity)
    }

    /// Whether the agent's capital is at or above `floor`.
    pub fn is_solvent(&self, floor: Decimal) -> bool {
        self.capital >= floor
    }

    /// Units short of target for a consumed commodity.
    pub fn deficit(&self, commodity: Commodity) -> u32 {
        match self.preferences.get(&commodity) {
            Some(preference) if preference.consume > 0 => {
                self.target_stock.saturating_sub(self.holding(commodity))
            }
            _ => 0,
        }
    }

    /// Units above target for a produced commodity.
    pub fn surplus(&self, commodity: Commodity) -> u32 {
        match self.preferences.get(&commodity) {
            Some(preference) if preference.produce > 0 => {
                self.holding(commodity).saturating_sub(self.target_stock)
            }
            _ => 0,
        }
    }

    /// Belief for `commodity`, seeded around `published` if the agent has
    /// none yet.
    pub fn belief_mut(
        &mut self,
        commodity: Commodity,
        published: Decimal,
        spread: Decimal,
    ) -> &mut PriceBelief {
        self.beliefs
            .entry(commodity)
            .or_insert_with(|| PriceBelief::around(published, spread))
    }
}
