//! Shared type definitions for the Starlane simulation.
//!
//! This crate is the single source of truth for the value types used across
//! the workspace: identifiers, classifications, the generated universe
//! hierarchy, single-tick orders and the per-tick snapshots exposed to
//! external consumers. Types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Deterministic, path-derived identifiers
//! - [`enums`] -- Classifications (stars, planets, economies, factions, commodities)
//! - [`geometry`] -- Points, totally ordered points, rectangles
//! - [`astronomical`] -- Galaxy, sector, system, star and planet
//! - [`orders`] -- Bids, asks, trades and rejections
//! - [`snapshot`] -- Read-only per-tick views

pub mod astronomical;
pub mod enums;
pub mod geometry;
pub mod ids;
pub mod orders;
pub mod snapshot;

pub use astronomical::{Galaxy, Planet, Sector, SectorCoord, Star, System};
pub use enums::{
    Commodity, Faction, OrderRejection, OrderSide, PlanetEconomy, PlanetType, Standing,
    StarType, SystemSecurity, SystemState,
};
pub use geometry::{OrdPoint, Point, Rect};
pub use ids::{AgentId, OrderId, PlanetId, SectorId, SystemId, TradeId};
pub use orders::{Ask, Bid, Order, RejectedOrder, Trade};
pub use snapshot::{CommodityQuote, GalaxySnapshot, SystemSnapshot};
