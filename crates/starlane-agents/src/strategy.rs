//! Order planning and belief learning.
//!
//! Before clearing, each agent turns its deficits into bids and its
//! surpluses into asks, quoting prices drawn from its beliefs. Bids are sized
//! to fit both free cargo and capital, asks to fit holdings, so the book
//! accepts them. After clearing, [`learn`] moves each belief according to how
//! much of the order filled.

use rust_decimal::Decimal;
use starlane_market::{ClearingReport, SystemMarket};
use starlane_types::{AgentId, Commodity, OrderId, OrderSide};
use starlane_world::RandomStream;

use crate::agent::{Agent, PriceBelief};
use crate::config::PopulationConfig;

/// An order an agent wants to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderIntent {
    /// The good.
    pub commodity: Commodity,
    /// Buy or sell.
    pub side: OrderSide,
    /// Limit price.
    pub price: Decimal,
    /// Units.
    pub quantity: u32,
}

/// An order the book accepted, remembered until clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    /// Book-assigned id.
    pub id: OrderId,
    /// The submitter.
    pub agent: AgentId,
    /// What was asked for.
    pub intent: OrderIntent,
}

/// Plan this tick's orders for `agent`, in commodity order.
pub fn plan_orders(
    agent: &Agent,
    market: &SystemMarket,
    config: &PopulationConfig,
    stream: &mut RandomStream,
) -> Vec<OrderIntent> {
    let mut intents = Vec::new();
    let mut capital = agent.capital;
    let mut cargo = agent.free_cargo();

    for commodity in agent.preferences.keys().copied() {
        let belief = agent.beliefs.get(&commodity).copied().unwrap_or_else(|| {
            PriceBelief::around(market.price(commodity), config.belief_spread)
        });

        let deficit = agent.deficit(commodity).min(cargo);
        if deficit > 0 {
            let price = belief.draw(stream);
            let affordable = capital
                .checked_div(price)
                .map(|units| units.floor())
                .and_then(|units| u32::try_from(units).ok())
                .unwrap_or(0);
            let quantity = deficit.min(affordable);
            if quantity > 0 {
                capital = capital.saturating_sub(price.saturating_mul(Decimal::from(quantity)));
                cargo = cargo.saturating_sub(quantity);
                intents.push(OrderIntent {
                    commodity,
                    side: OrderSide::Bid,
                    price,
                    quantity,
                });
            }
        }

        let surplus = agent.surplus(commodity);
        if surplus > 0 {
            intents.push(OrderIntent {
                commodity,
                side: OrderSide::Ask,
                price: belief.draw(stream),
                quantity: surplus,
            });
        }
    }
    intents
}

/// Units of `order` filled in `report` and the volume-weighted fill price.
pub fn fill_of(order: &PlacedOrder, report: &ClearingReport) -> (u32, Option<Decimal>) {
    let mut filled: u32 = 0;
    let mut turnover = Decimal::ZERO;
    let trades = report
        .outcome(order.intent.commodity)
        .map(|outcome| outcome.trades.as_slice())
        .unwrap_or_default();
    for trade in trades {
        let ours = match order.intent.side {
            OrderSide::Bid => trade.bid == order.id,
            OrderSide::Ask => trade.ask == order.id,
        };
        if ours {
            filled = filled.saturating_add(trade.quantity);
            turnover = turnover
                .saturating_add(trade.price.saturating_mul(Decimal::from(trade.quantity)));
        }
    }
    let average = (filled > 0)
        .then(|| turnover.checked_div(Decimal::from(filled)))
        .flatten();
    (filled, average)
}

/// Update `agent`'s beliefs from the fills of its placed orders.
///
/// Any fill narrows the belief toward the average fill price. An order that
/// did not fill at all widens the belief toward the new published price.
pub fn learn(
    agent: &mut Agent,
    orders: &[PlacedOrder],
    report: &ClearingReport,
    market: &SystemMarket,
    config: &PopulationConfig,
) {
    let id = agent.id;
    for order in orders.iter().filter(|order| order.agent == id) {
        let commodity = order.intent.commodity;
        let published = market.price(commodity);
        let (_, average) = fill_of(order, report);
        let belief = agent.belief_mut(commodity, published, config.belief_spread);
        match average {
            Some(price) => belief.narrow(price, config.belief_learning_rate),
            None => belief.widen(published, config.belief_learning_rate),
        }
    }
}
