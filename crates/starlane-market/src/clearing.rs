//! Double-auction clearing.
//!
//! For each commodity the accepted bids are sorted by price descending and
//! the asks by price ascending; equal prices are ordered by agent id and then
//! by submission sequence. Two cursors walk the sorted sides: while the best
//! remaining bid is at or above the best remaining ask, a fill of
//! `min(remaining bid, remaining ask)` executes at the midpoint of the two
//! limit prices (rounded to cents, never outside `[ask, bid]`). The side
//! that runs out advances. Whatever is left when the prices no longer cross
//! expires with the tick. An agent never trades with itself: when the best
//! bid and ask share an owner, the later-submitted of the two is dropped.
//!
//! Clearing within one market is strictly sequential. Different systems
//! share nothing and may clear concurrently.

use rust_decimal::Decimal;
use starlane_types::{AgentId, Ask, Bid, Commodity, OrderId, RejectedOrder, SystemId, Trade, TradeId};

use crate::accounts::{Accounts, Participants};
use crate::book::OrderBook;
use crate::config::MarketConfig;
use crate::error::MarketError;
use crate::pricing;

/// One fill produced by the matching walk, before settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Matched bid.
    pub bid: OrderId,
    /// Matched ask.
    pub ask: OrderId,
    /// Bidding agent.
    pub buyer: AgentId,
    /// Asking agent.
    pub seller: AgentId,
    /// Limit price of the bid.
    pub bid_price: Decimal,
    /// Limit price of the ask.
    pub ask_price: Decimal,
    /// Execution price.
    pub price: Decimal,
    /// Units exchanged.
    pub quantity: u32,
}

/// Midpoint of the two limit prices, rounded to cents and kept in `[ask, bid]`.
pub fn clearing_price(bid: Decimal, ask: Decimal) -> Decimal {
    let midpoint = bid
        .checked_add(ask)
        .and_then(|sum| sum.checked_div(Decimal::TWO))
        .unwrap_or(ask);
    midpoint.round_dp(2).clamp(ask, bid.max(ask))
}

/// Match the bids and asks of a single commodity.
///
/// The inputs may be in any order; the result depends only on the set of
/// orders, not on how they were listed.
pub fn match_orders(bids: &[Bid], asks: &[Ask]) -> Vec<Match> {
    let mut bids: Vec<&Bid> = bids.iter().collect();
    let mut asks: Vec<&Ask> = asks.iter().collect();
    bids.sort_by(|a, b| {
        b.price
            .cmp(&a.price)
            .then_with(|| a.agent.cmp(&b.agent))
            .then_with(|| a.id.cmp(&b.id))
    });
    asks.sort_by(|a, b| {
        a.price
            .cmp(&b.price)
            .then_with(|| a.agent.cmp(&b.agent))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut matches = Vec::new();
    let mut bid_cursor = 0_usize;
    let mut ask_cursor = 0_usize;
    let mut bid_left = bids.first().map_or(0, |bid| bid.quantity);
    let mut ask_left = asks.first().map_or(0, |ask| ask.quantity);

    while let (Some(bid), Some(ask)) = (bids.get(bid_cursor), asks.get(ask_cursor)) {
        if bid.price < ask.price {
            break;
        }
        if bid.agent == ask.agent {
            // Self-trade: drop the later-submitted side and keep walking.
            if bid.id > ask.id {
                bid_cursor = bid_cursor.saturating_add(1);
                bid_left = bids.get(bid_cursor).map_or(0, |next| next.quantity);
            } else {
                ask_cursor = ask_cursor.saturating_add(1);
                ask_left = asks.get(ask_cursor).map_or(0, |next| next.quantity);
            }
            continue;
        }
        let quantity = bid_left.min(ask_left);
        if quantity > 0 {
            matches.push(Match {
                bid: bid.id,
                ask: ask.id,
                buyer: bid.agent,
                seller: ask.agent,
                bid_price: bid.price,
                ask_price: ask.price,
                price: clearing_price(bid.price, ask.price),
                quantity,
            });
        }
        bid_left = bid_left.saturating_sub(quantity);
        ask_left = ask_left.saturating_sub(quantity);
        if bid_left == 0 {
            bid_cursor = bid_cursor.saturating_add(1);
            bid_left = bids.get(bid_cursor).map_or(0, |next| next.quantity);
        }
        if ask_left == 0 {
            ask_cursor = ask_cursor.saturating_add(1);
            ask_left = asks.get(ask_cursor).map_or(0, |next| next.quantity);
        }
    }
    matches
}

/// Result of clearing one commodity in one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityOutcome {
    /// The good.
    pub commodity: Commodity,
    /// Executed trades in execution order.
    pub trades: Vec<Trade>,
    /// Units bid by accepted orders.
    pub bid_volume: u64,
    /// Units offered by accepted orders.
    pub ask_volume: u64,
    /// Units exchanged.
    pub traded: u64,
    /// Money exchanged.
    pub turnover: Decimal,
    /// Published price before clearing.
    pub previous_price: Decimal,
    /// Published price after clearing.
    pub price: Decimal,
}

impl CommodityOutcome {
    /// Bid units that expired unmatched.
    pub const fn unmatched_bid(&self) -> u64 {
        self.bid_volume.saturating_sub(self.traded)
    }

    /// Ask units that expired unmatched.
    pub const fn unmatched_ask(&self) -> u64 {
        self.ask_volume.saturating_sub(self.traded)
    }
}

/// Result of clearing one market for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearingReport {
    /// The market.
    pub system: SystemId,
    /// One outcome per commodity, in commodity order.
    pub outcomes: Vec<CommodityOutcome>,
    /// Orders dropped at submission.
    pub rejected: Vec<RejectedOrder>,
}

impl ClearingReport {
    /// Every trade, grouped by commodity.
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.outcomes.iter().flat_map(|outcome| outcome.trades.iter())
    }

    /// Number of executed trades.
    pub fn trade_count(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.trades.len()).sum()
    }

    /// Units exchanged across all commodities.
    pub fn volume(&self) -> u64 {
        self.outcomes
            .iter()
            .fold(0_u64, |acc, outcome| acc.saturating_add(outcome.traded))
    }

    /// Units exchanged in commodities legal in this market.
    pub fn legal_volume(&self) -> u64 {
        self.trades()
            .filter(|trade| trade.legal)
            .fold(0_u64, |acc, trade| acc.saturating_add(u64::from(trade.quantity)))
    }

    /// Number of trades in contraband.
    pub fn illegal_trades(&self) -> u32 {
        let count = self.trades().filter(|trade| !trade.legal).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Number of dropped orders.
    pub fn rejected_count(&self) -> u32 {
        u32::try_from(self.rejected.len()).unwrap_or(u32::MAX)
    }

    /// Outcome for one commodity.
    pub fn outcome(&self, commodity: Commodity) -> Option<&CommodityOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.commodity == commodity)
    }
}

/// Clears order books against participant accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketEngine {
    config: MarketConfig,
}

impl MarketEngine {
    /// Create an engine with the given parameters.
    pub const fn new(config: MarketConfig) -> Self {
        Self { config }
    }

    /// The engine's parameters.
    pub const fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Clear one market's book, settle every fill and update published
    /// prices and stock.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError`] only if settlement of a validated fill fails,
    /// which means an account changed between submission and clearing.
    pub fn clear<A: Accounts + ?Sized>(
        &self,
        book: OrderBook,
        participants: &mut Participants<'_, A>,
    ) -> Result<ClearingReport, MarketError> {
        let system = book.system();
        let (bids, asks, rejected) = book.into_parts();
        let mut next_trade: u64 = 0;
        let mut outcomes = Vec::with_capacity(Commodity::ALL.len());

        for commodity in Commodity::ALL {
            let side_bids: Vec<Bid> = bids
                .iter()
                .filter(|bid| bid.commodity == commodity)
                .cloned()
                .collect();
            let side_asks: Vec<Ask> = asks
                .iter()
                .filter(|ask| ask.commodity == commodity)
                .cloned()
                .collect();
            let bid_volume = side_bids
                .iter()
                .fold(0_u64, |acc, bid| acc.saturating_add(u64::from(bid.quantity)));
            let ask_volume = side_asks
                .iter()
                .fold(0_u64, |acc, ask| acc.saturating_add(u64::from(ask.quantity)));

            let legal = participants.market.is_legal(commodity);
            let mut trades = Vec::new();
            let mut traded: u64 = 0;
            let mut turnover = Decimal::ZERO;
            for fill in match_orders(&side_bids, &side_asks) {
                let cost = settle(participants, commodity, &fill)?;
                traded = traded
                    .checked_add(u64::from(fill.quantity))
                    .ok_or(MarketError::ArithmeticOverflow)?;
                turnover = turnover
                    .checked_add(cost)
                    .ok_or(MarketError::ArithmeticOverflow)?;
                trades.push(Trade {
                    id: TradeId(next_trade),
                    system,
                    commodity,
                    buyer: fill.buyer,
                    seller: fill.seller,
                    bid: fill.bid,
                    ask: fill.ask,
                    bid_price: fill.bid_price,
                    ask_price: fill.ask_price,
                    price: fill.price,
                    quantity: fill.quantity,
                    legal,
                });
                next_trade = next_trade.saturating_add(1);
            }

            let previous_price = participants.market.price(commodity);
            let reference = if traded == 0 {
                None
            } else {
                turnover.checked_div(Decimal::from(traded))
            };
            let price = pricing::next_price(
                commodity,
                previous_price,
                reference,
                bid_volume,
                ask_volume,
                &self.config,
            );
            participants.market.set_price(commodity, price);
            participants.market.set_last_volume(commodity, traded);

            if traded > 0 {
                tracing::debug!(
                    system = %system,
                    ?commodity,
                    trades = trades.len(),
                    traded,
                    %previous_price,
                    %price,
                    "Commodity cleared"
                );
            }
            outcomes.push(CommodityOutcome {
                commodity,
                trades,
                bid_volume,
                ask_volume,
                traded,
                turnover,
                previous_price,
                price,
            });
        }

        Ok(ClearingReport {
            system,
            outcomes,
            rejected,
        })
    }
}

/// Settle one fill: goods seller -> buyer, money buyer -> seller.
///
/// Both balances are checked before either side is touched.
fn settle<A: Accounts + ?Sized>(
    participants: &mut Participants<'_, A>,
    commodity: Commodity,
    fill: &Match,
) -> Result<Decimal, MarketError> {
    let cost = fill
        .price
        .checked_mul(Decimal::from(fill.quantity))
        .ok_or(MarketError::ArithmeticOverflow)?;
    let capital = participants
        .capital(fill.buyer)
        .ok_or(MarketError::UnknownAgent(fill.buyer))?;
    if capital < cost {
        return Err(MarketError::InsufficientCapital {
            agent: fill.buyer,
            commodity,
            cost,
        });
    }
    let held = participants
        .holding(fill.seller, commodity)
        .ok_or(MarketError::UnknownAgent(fill.seller))?;
    if held < fill.quantity {
        return Err(MarketError::InsufficientInventory {
            agent: fill.seller,
            commodity,
            requested: fill.quantity,
            available: u64::from(held),
        });
    }
    participants.settle_sale(fill.seller, commodity, fill.quantity, cost)?;
    participants.settle_purchase(fill.buyer, commodity, fill.quantity, cost)?;
    Ok(cost)
}
