//! Planet economies, system markets and double-auction clearing for the
//! Starlane simulation.
//!
//! # Modules
//!
//! - [`accounts`] -- The [`Accounts`] seam through which orders are validated
//!   and fills settled.
//! - [`book`] -- [`OrderBook`]: per-tick order intake with submission-time
//!   validation.
//! - [`clearing`] -- [`MarketEngine`]: sorted two-cursor matching, midpoint
//!   pricing, settlement.
//! - [`config`] -- Market parameters.
//! - [`conservation`] -- Goods and money conservation check around clearing.
//! - [`economy`] -- Planet economy classification and starting markets.
//! - [`error`] -- [`MarketError`].
//! - [`house`] -- Quotes posted by the house participant.
//! - [`market`] -- [`SystemMarket`]: prices, stock and the house account.
//! - [`pricing`] -- Published price update from clearing and imbalance.

pub mod accounts;
pub mod book;
pub mod clearing;
pub mod config;
pub mod conservation;
pub mod economy;
pub mod error;
pub mod house;
pub mod market;
pub mod pricing;

pub use accounts::{Accounts, Participants};
pub use book::OrderBook;
pub use clearing::{ClearingReport, CommodityOutcome, MarketEngine, Match, clearing_price, match_orders};
pub use config::MarketConfig;
pub use conservation::{Census, ConservationAnomaly, ConservationResult, verify_conservation};
pub use economy::{EconomyProfile, dominant_economy, initial_market};
pub use error::MarketError;
pub use house::{HouseQuotes, house_prices, post_house_orders};
pub use market::{MarketEntry, SystemMarket};
