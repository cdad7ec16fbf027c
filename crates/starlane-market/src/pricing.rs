//! Published price update after clearing.
//!
//! The new price starts from the volume-weighted clearing price (or the old
//! published price when nothing traded) and moves by
//! `rate * imbalance`, where
//! `imbalance = (bid_volume - ask_volume) / max(bid_volume, ask_volume)`
//! lies in `[-1, 1]`. Unmet demand raises the price; unsold supply lowers it.

use rust_decimal::Decimal;
use starlane_types::Commodity;

use crate::config::MarketConfig;

/// Signed demand/supply imbalance in `[-1, 1]`; zero when nothing was offered.
pub fn imbalance(bid_volume: u64, ask_volume: u64) -> Decimal {
    let larger = bid_volume.max(ask_volume);
    if larger == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(bid_volume)
        .checked_sub(Decimal::from(ask_volume))
        .and_then(|difference| difference.checked_div(Decimal::from(larger)))
        .unwrap_or(Decimal::ZERO)
}

/// Compute the next published price.
pub fn next_price(
    commodity: Commodity,
    current: Decimal,
    reference: Option<Decimal>,
    bid_volume: u64,
    ask_volume: u64,
    config: &MarketConfig,
) -> Decimal {
    let anchor = reference.unwrap_or(current);
    let factor = config
        .price_adjustment_rate
        .checked_mul(imbalance(bid_volume, ask_volume))
        .and_then(|step| Decimal::ONE.checked_add(step))
        .unwrap_or(Decimal::ONE);
    let ceiling = commodity
        .base_price()
        .checked_mul(config.max_price_factor)
        .unwrap_or(Decimal::MAX);
    anchor
        .checked_mul(factor)
        .unwrap_or(anchor)
        .round_dp(2)
        .clamp(config.min_price, ceiling.max(config.min_price))
}
