//! Market parameters: starting conditions, price dynamics and the house
//! participant.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Market configuration, the `market` section of `starlane-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Fractional price move at full demand/supply imbalance.
    #[serde(default = "default_price_adjustment_rate")]
    pub price_adjustment_rate: Decimal,

    /// Floor on any published price.
    #[serde(default = "default_min_price")]
    pub min_price: Decimal,

    /// Ceiling on a published price as a multiple of the commodity's base price.
    #[serde(default = "default_max_price_factor")]
    pub max_price_factor: Decimal,

    /// Maximum starting price perturbation, in basis points.
    #[serde(default = "default_price_jitter_bp")]
    pub price_jitter_bp: u32,

    /// Starting stock of a commodity nobody in the system produces or needs.
    #[serde(default = "default_starting_stock")]
    pub starting_stock: u32,

    /// Starting house treasury per system.
    #[serde(default = "default_house_treasury")]
    pub house_treasury: Decimal,

    /// Half-width of the house quote around the published price.
    #[serde(default = "default_house_spread")]
    pub house_spread: Decimal,

    /// Units the house offers or bids per commodity per tick.
    #[serde(default = "default_house_lot")]
    pub house_lot: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            price_adjustment_rate: default_price_adjustment_rate(),
            min_price: default_min_price(),
            max_price_factor: default_max_price_factor(),
            price_jitter_bp: default_price_jitter_bp(),
            starting_stock: default_starting_stock(),
            house_treasury: default_house_treasury(),
            house_spread: default_house_spread(),
            house_lot: default_house_lot(),
        }
    }
}

impl MarketConfig {
    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidConfig`] for the first invalid parameter.
    pub fn validate(&self) -> Result<(), MarketError> {
        let invalid = |reason: &str| {
            Err(MarketError::InvalidConfig {
                reason: reason.to_owned(),
            })
        };
        if self.price_adjustment_rate.is_sign_negative() || self.price_adjustment_rate >= Decimal::ONE
        {
            return invalid("price_adjustment_rate must be in [0, 1)");
        }
        if self.min_price <= Decimal::ZERO {
            return invalid("min_price must be positive");
        }
        if self.max_price_factor < Decimal::ONE {
            return invalid("max_price_factor must be at least 1");
        }
        if self.price_jitter_bp >= 10_000 {
            return invalid("price_jitter_bp must be below 10000");
        }
        if self.house_treasury.is_sign_negative() {
            return invalid("house_treasury must be non-negative");
        }
        if self.house_spread <= Decimal::ZERO || self.house_spread >= Decimal::ONE {
            return invalid("house_spread must be in (0, 1)");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_price_adjustment_rate() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 2)
}

const fn default_min_price() -> Decimal {
    Decimal::ONE
}

const fn default_max_price_factor() -> Decimal {
    Decimal::from_parts(20, 0, 0, false, 0)
}

const fn default_price_jitter_bp() -> u32 {
    1_000
}

const fn default_starting_stock() -> u32 {
    200
}

const fn default_house_treasury() -> Decimal {
    Decimal::from_parts(50_000, 0, 0, false, 0)
}

const fn default_house_spread() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 2)
}

const fn default_house_lot() -> u32 {
    10
}
