//! Quotes posted by the house participant.
//!
//! Every tick the market offers a lot of each legal commodity from stock just
//! above the published price and bids for a lot just below it, funded by the
//! treasury. Agents therefore always have a counterparty, and the traded
//! quantity flows in and out of system stock.

use rust_decimal::Decimal;
use starlane_types::Commodity;

use crate::book::OrderBook;
use crate::config::MarketConfig;
use crate::market::SystemMarket;

/// Orders the house placed this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HouseQuotes {
    /// Asks posted.
    pub asks: u32,
    /// Bids posted.
    pub bids: u32,
}

/// The house's ask and bid prices around the published price.
pub fn house_prices(price: Decimal, config: &MarketConfig) -> (Decimal, Decimal) {
    let up = Decimal::ONE.saturating_add(config.house_spread);
    let down = Decimal::ONE.saturating_sub(config.house_spread);
    let ask = price.saturating_mul(up).round_dp(2).max(config.min_price);
    let bid = price.saturating_mul(down).round_dp(2).max(config.min_price);
    (ask, bid.min(ask))
}

/// Post the house quotes for every commodity legal in `market`.
///
/// Lots are sized so that the book never rejects a house order: asks are
/// capped by stock and bids by the uncommitted treasury. Nothing is posted
/// into a closed book.
pub fn post_house_orders(
    market: &SystemMarket,
    book: &mut OrderBook,
    config: &MarketConfig,
) -> HouseQuotes {
    let mut quotes = HouseQuotes::default();
    if !book.is_open() || config.house_lot == 0 {
        return quotes;
    }
    let house = market.house();
    for commodity in Commodity::ALL {
        if !market.is_legal(commodity) {
            continue;
        }
        let (ask_price, bid_price) = house_prices(market.price(commodity), config);

        let ask_lot = u32::try_from(market.stock(commodity))
            .unwrap_or(u32::MAX)
            .min(config.house_lot);
        if ask_lot > 0
            && book
                .submit_ask(market, house, commodity, ask_price, ask_lot)
                .is_ok()
        {
            quotes.asks = quotes.asks.saturating_add(1);
        }

        let free = market
            .treasury()
            .checked_sub(book.committed_capital(house))
            .unwrap_or(Decimal::ZERO);
        let affordable = free
            .checked_div(bid_price)
            .map(|units| units.floor())
            .and_then(|units| u32::try_from(units).ok())
            .unwrap_or(0);
        let bid_lot = affordable.min(config.house_lot);
        if bid_lot > 0
            && book
                .submit_bid(market, house, commodity, bid_price, bid_lot)
                .is_ok()
        {
            quotes.bids = quotes.bids.saturating_add(1);
        }
    }
    tracing::debug!(
        system = %market.system(),
        asks = quotes.asks,
        bids = quotes.bids,
        "House quotes posted"
    );
    quotes
}
