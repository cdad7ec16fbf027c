//! Enumeration types for the Starlane simulation.
//!
//! Classifications are closed sets dispatched through lookup functions and
//! policy tables instead of trait objects. Every enum derives `Ord` so it can
//! key a `BTreeMap` and iterate in a stable order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Astronomical classifications
// ---------------------------------------------------------------------------

/// Spectral classification of a star, hottest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum StarType {
    /// Blue giant.
    O,
    /// Blue-white.
    B,
    /// White.
    A,
    /// Yellow-white.
    F,
    /// Yellow dwarf.
    G,
    /// Orange dwarf.
    K,
    /// Red dwarf.
    M,
}

impl StarType {
    /// All spectral classes in weight-table order.
    pub const ALL: [Self; 7] = [Self::O, Self::B, Self::A, Self::F, Self::G, Self::K, Self::M];

    /// Typical luminosity in solar units.
    pub const fn luminosity(self) -> f64 {
        match self {
            Self::O => 10_000.0,
            Self::B => 250.0,
            Self::A => 10.0,
            Self::F => 2.5,
            Self::G => 1.0,
            Self::K => 0.4,
            Self::M => 0.04,
        }
    }

    /// Typical mass in solar units.
    pub const fn mass(self) -> f64 {
        match self {
            Self::O => 20.0,
            Self::B => 6.0,
            Self::A => 2.0,
            Self::F => 1.3,
            Self::G => 1.0,
            Self::K => 0.7,
            Self::M => 0.3,
        }
    }

    /// Whether the star is hot enough to favour energy-intensive industry.
    pub const fn is_hot(self) -> bool {
        matches!(self, Self::O | Self::B | Self::A)
    }
}

/// Physical classification of a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PlanetType {
    /// Scorched, metal-rich body close to its star.
    Metal,
    /// Airless rock.
    Rocky,
    /// Temperate world inside the habitable band.
    Earth,
    /// Frozen world beyond the habitable band.
    Icy,
    /// Gas giant in the outer system.
    GasGiant,
}

/// Economic role of a planet, assigned after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PlanetEconomy {
    /// Food and textile production.
    Agriculture,
    /// Mining of metals and minerals.
    Extraction,
    /// Technology and medicine.
    HighTech,
    /// Machinery, consumer goods and industrial materials.
    Industrial,
    /// Weapons and military supply.
    Military,
    /// Fuel and chemical refining.
    Refinery,
    /// No meaningful economy.
    None,
}

// ---------------------------------------------------------------------------
// Politics
// ---------------------------------------------------------------------------

/// Political allegiance controlling a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Faction {
    /// Criminal syndicate.
    Cartel,
    /// Militarist empire.
    Empire,
    /// Trade federation.
    Federation,
    /// Unaligned worlds.
    Independent,
}

impl Faction {
    /// All factions in stable order.
    pub const ALL: [Self; 4] = [Self::Cartel, Self::Empire, Self::Federation, Self::Independent];

    /// Whether trading `commodity` is legal under this faction's law.
    pub const fn permits(self, commodity: Commodity) -> bool {
        match self {
            Self::Cartel => true,
            Self::Empire => !matches!(commodity, Commodity::IllegalDrug | Commodity::Slavery),
            Self::Federation => !matches!(
                commodity,
                Commodity::IllegalDrug | Commodity::Slavery | Commodity::Weapon
            ),
            Self::Independent => !matches!(commodity, Commodity::Slavery),
        }
    }
}

/// Coarse label for a reputation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Standing {
    /// Score at or below -300.
    Hostile,
    /// Score in -299..=-100.
    Unfriendly,
    /// Score in -99..=100.
    Neutral,
    /// Score in 101..=300.
    Friendly,
    /// Score above 300.
    Allied,
}

impl Standing {
    /// Classify a reputation score.
    pub const fn from_score(score: i32) -> Self {
        if score <= -300 {
            Self::Hostile
        } else if score <= -100 {
            Self::Unfriendly
        } else if score <= 100 {
            Self::Neutral
        } else if score <= 300 {
            Self::Friendly
        } else {
            Self::Allied
        }
    }
}

// ---------------------------------------------------------------------------
// System condition
// ---------------------------------------------------------------------------

/// Political and economic condition of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SystemState {
    /// Normal operation.
    Stable,
    /// Stable with trade volume above the boom threshold.
    Boom,
    /// Owner reputation or trade legality has degraded.
    Contested,
    /// Markets closed; agents removed. Recovery requires intervention.
    Collapsed,
}

impl SystemState {
    /// Whether the system's market still accepts orders.
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Collapsed)
    }
}

/// Enforcement level in a system, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SystemSecurity {
    /// No enforcement.
    Anarchy,
    /// Sporadic patrols.
    Low,
    /// Regular patrols.
    Medium,
    /// Full enforcement.
    High,
}

impl SystemSecurity {
    /// Width of each level's band on the security score scale.
    pub const BAND: u32 = 25;

    /// Highest representable security score.
    pub const MAX_SCORE: u32 = 99;

    /// Map a clamped score (0..=99) to a level.
    pub const fn from_score(score: u32) -> Self {
        match score / Self::BAND {
            0 => Self::Anarchy,
            1 => Self::Low,
            2 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Score at the middle of this level's band.
    pub const fn midpoint_score(self) -> u32 {
        match self {
            Self::Anarchy => 12,
            Self::Low => 37,
            Self::Medium => 62,
            Self::High => 87,
        }
    }
}

// ---------------------------------------------------------------------------
// Commodities
// ---------------------------------------------------------------------------

/// A tradable good. Every system market tracks a price and stock for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Commodity {
    /// Industrial and fuel chemicals.
    Chemical,
    /// Finished consumer goods.
    ConsumerItem,
    /// Foodstuffs.
    Food,
    /// Narcotics.
    IllegalDrug,
    /// Alloys, plastics and construction stock.
    IndustrialMaterial,
    /// Licensed pharmaceuticals and stimulants.
    LegalDrug,
    /// Heavy equipment.
    Machinery,
    /// Medical supplies.
    Medicine,
    /// Refined metals.
    Metal,
    /// Raw ore and minerals.
    Mineral,
    /// Recovered wreckage.
    Salvage,
    /// Trafficked people.
    Slavery,
    /// Electronics and computing.
    Technology,
    /// Cloth and fibre.
    Textile,
    /// Refuse for reprocessing.
    Waste,
    /// Arms and munitions.
    Weapon,
}

impl Commodity {
    /// Every commodity in stable order.
    pub const ALL: [Self; 16] = [
        Self::Chemical,
        Self::ConsumerItem,
        Self::Food,
        Self::IllegalDrug,
        Self::IndustrialMaterial,
        Self::LegalDrug,
        Self::Machinery,
        Self::Medicine,
        Self::Metal,
        Self::Mineral,
        Self::Salvage,
        Self::Slavery,
        Self::Technology,
        Self::Textile,
        Self::Waste,
        Self::Weapon,
    ];

    /// Galaxy-wide reference price in credits.
    pub const fn base_price(self) -> Decimal {
        let credits: u32 = match self {
            Self::Waste => 5,
            Self::Food => 20,
            Self::Salvage => 25,
            Self::Textile => 30,
            Self::Mineral => 35,
            Self::Metal => 50,
            Self::Chemical => 60,
            Self::IndustrialMaterial => 70,
            Self::LegalDrug => 80,
            Self::ConsumerItem => 90,
            Self::Medicine => 120,
            Self::Machinery => 150,
            Self::Weapon => 200,
            Self::Technology => 250,
            Self::IllegalDrug => 300,
            Self::Slavery => 500,
        };
        Decimal::from_parts(credits, 0, 0, false, 0)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum OrderSide {
    /// Willingness to buy.
    Bid,
    /// Willingness to sell.
    Ask,
}

/// Why an order was dropped at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum OrderRejection {
    /// Quantity was zero.
    ZeroQuantity,
    /// Price was zero or negative.
    NonPositivePrice,
    /// Bid notional exceeds the agent's uncommitted capital.
    InsufficientCapital,
    /// Ask quantity exceeds the agent's uncommitted holdings.
    InsufficientInventory,
    /// The submitting agent is not registered in the system.
    UnknownAgent,
    /// The system's market is closed.
    MarketClosed,
}
