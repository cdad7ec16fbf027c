//! Typed generation parameters.
//!
//! [`GalaxyConfig`] mirrors the `galaxy` section of `starlane-config.yaml`.
//! Every field has a default so partial YAML documents deserialize.
//! [`GalaxyConfig::validate`] runs once before any generation work; the
//! generator itself never re-checks business rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starlane_types::{Faction, Point, Rect, StarType};

use crate::error::WorldError;
use crate::rng::PathLimits;

/// Largest number of systems a sector may hold.
pub const MAX_SYSTEMS_PER_SECTOR: u32 = 4_096;

/// Largest number of planets a system may hold.
pub const MAX_PLANETS: u32 = 16;

/// Largest number of sectors in the grid.
pub const MAX_SECTORS: u32 = 65_536;

/// Universe generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxyConfig {
    /// Galaxy width in light years.
    #[serde(default = "default_width")]
    pub width: f64,

    /// Galaxy height in light years.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Sector grid columns.
    #[serde(default = "default_columns")]
    pub columns: u32,

    /// Sector grid rows.
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Maximum systems per sector.
    #[serde(default = "default_density")]
    pub density: u32,

    /// Minimum systems per sector.
    #[serde(default = "default_min_density")]
    pub min_density: u32,

    /// Minimum distance between two systems of the same sector.
    #[serde(default = "default_min_system_spacing")]
    pub min_system_spacing: f64,

    /// Candidate positions tried per system before giving up.
    #[serde(default = "default_placement_retries")]
    pub placement_retries: u32,

    /// Minimum planets per system.
    #[serde(default)]
    pub min_planets: u32,

    /// Maximum planets per system.
    #[serde(default = "default_max_planets")]
    pub max_planets: u32,

    /// Relative frequency of each spectral class.
    #[serde(default = "default_star_weights")]
    pub star_weights: BTreeMap<StarType, u32>,

    /// Relative frequency of each sector faction.
    #[serde(default = "default_faction_weights")]
    pub faction_weights: BTreeMap<Faction, u32>,

    /// Orbital band policy.
    #[serde(default)]
    pub orbits: OrbitConfig,

    /// Disable parallel sector generation.
    #[serde(default)]
    pub force_sequential: bool,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            columns: default_columns(),
            rows: default_rows(),
            density: default_density(),
            min_density: default_min_density(),
            min_system_spacing: default_min_system_spacing(),
            placement_retries: default_placement_retries(),
            min_planets: 0,
            max_planets: default_max_planets(),
            star_weights: default_star_weights(),
            faction_weights: default_faction_weights(),
            orbits: OrbitConfig::default(),
            force_sequential: false,
        }
    }
}

/// Orbital spacing and temperature bands that decide planet types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    /// Radius of the innermost slot around a Sun-like star, in AU.
    #[serde(default = "default_first_orbit")]
    pub first_orbit: f64,

    /// Ratio between consecutive slot radii.
    #[serde(default = "default_orbit_spacing")]
    pub orbit_spacing: f64,

    /// Above this temperature (K) planets are stripped to Metal.
    #[serde(default = "default_scorched_k")]
    pub scorched_k: f64,

    /// Upper bound (K) of the habitable band.
    #[serde(default = "default_habitable_max_k")]
    pub habitable_max_k: f64,

    /// Lower bound (K) of the habitable band.
    #[serde(default = "default_habitable_min_k")]
    pub habitable_min_k: f64,

    /// Below this temperature (K) volatiles freeze and giants can form.
    #[serde(default = "default_frost_line_k")]
    pub frost_line_k: f64,

    /// Probability that a slot beyond the frost line holds a gas giant.
    #[serde(default = "default_gas_giant_chance")]
    pub gas_giant_chance: f64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            first_orbit: default_first_orbit(),
            orbit_spacing: default_orbit_spacing(),
            scorched_k: default_scorched_k(),
            habitable_max_k: default_habitable_max_k(),
            habitable_min_k: default_habitable_min_k(),
            frost_line_k: default_frost_line_k(),
            gas_giant_chance: default_gas_giant_chance(),
        }
    }
}

impl GalaxyConfig {
    /// Number of sectors in the grid.
    pub const fn sector_count(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    /// Galaxy bounds, anchored at the origin.
    pub const fn bounds(&self) -> Rect {
        Rect::new(Point::new(0.0, 0.0), self.width, self.height)
    }

    /// Path limits derived from the grid and density bounds.
    pub const fn path_limits(&self) -> PathLimits {
        PathLimits {
            sectors: self.sector_count(),
            systems_per_sector: self.density,
            bodies_per_system: self.max_planets,
        }
    }

    /// Star weight table in spectral order.
    pub fn star_table(&self) -> Vec<(StarType, u32)> {
        StarType::ALL
            .iter()
            .map(|star| (*star, self.star_weights.get(star).copied().unwrap_or(0)))
            .collect()
    }

    /// Faction weight table in stable order.
    pub fn faction_table(&self) -> Vec<(Faction, u32)> {
        Faction::ALL
            .iter()
            .map(|faction| {
                (
                    *faction,
                    self.faction_weights.get(faction).copied().unwrap_or(0),
                )
            })
            .collect()
    }

    /// Check every parameter. Called once before generation.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Configuration`] describing the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<(), WorldError> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(WorldError::config(
                "galaxy width and height must be positive and finite",
            ));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(WorldError::config("sector grid must have at least one row and column"));
        }
        if self.columns.checked_mul(self.rows).is_none_or(|n| n > MAX_SECTORS) {
            return Err(WorldError::config(format!(
                "sector grid {}x{} exceeds {MAX_SECTORS} sectors",
                self.columns, self.rows
            )));
        }
        if self.density == 0 || self.density > MAX_SYSTEMS_PER_SECTOR {
            return Err(WorldError::config(format!(
                "density must be in 1..={MAX_SYSTEMS_PER_SECTOR}, got {}",
                self.density
            )));
        }
        if self.min_density > self.density {
            return Err(WorldError::config(format!(
                "min_density {} exceeds density {}",
                self.min_density, self.density
            )));
        }
        if !(self.min_system_spacing.is_finite() && self.min_system_spacing >= 0.0) {
            return Err(WorldError::config("min_system_spacing must be finite and non-negative"));
        }
        if self.placement_retries == 0 {
            return Err(WorldError::config("placement_retries must be at least 1"));
        }
        if self.max_planets > MAX_PLANETS || self.min_planets > self.max_planets {
            return Err(WorldError::config(format!(
                "planet range {}..={} invalid (maximum {MAX_PLANETS})",
                self.min_planets, self.max_planets
            )));
        }
        if self.star_table().iter().all(|(_, weight)| *weight == 0) {
            return Err(WorldError::config("star_weights must contain a positive weight"));
        }
        if self.faction_table().iter().all(|(_, weight)| *weight == 0) {
            return Err(WorldError::config("faction_weights must contain a positive weight"));
        }
        self.orbits.validate()
    }
}

impl OrbitConfig {
    fn validate(&self) -> Result<(), WorldError> {
        if !(self.first_orbit.is_finite() && self.first_orbit > 0.0) {
            return Err(WorldError::config("first_orbit must be positive"));
        }
        if !(self.orbit_spacing.is_finite() && self.orbit_spacing > 1.0) {
            return Err(WorldError::config("orbit_spacing must be greater than 1"));
        }
        let ordered = self.frost_line_k < self.habitable_min_k
            && self.habitable_min_k < self.habitable_max_k
            && self.habitable_max_k < self.scorched_k;
        if !ordered {
            return Err(WorldError::config(
                "temperature bands must satisfy frost_line < habitable_min < habitable_max < scorched",
            ));
        }
        if !(0.0..=1.0).contains(&self.gas_giant_chance) {
            return Err(WorldError::config("gas_giant_chance must be in [0, 1]"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_width() -> f64 {
    3_000.0
}

const fn default_height() -> f64 {
    1_000.0
}

const fn default_columns() -> u32 {
    3
}

const fn default_rows() -> u32 {
    1
}

const fn default_density() -> u32 {
    5
}

const fn default_min_density() -> u32 {
    1
}

const fn default_min_system_spacing() -> f64 {
    50.0
}

const fn default_placement_retries() -> u32 {
    64
}

const fn default_max_planets() -> u32 {
    8
}

fn default_star_weights() -> BTreeMap<StarType, u32> {
    BTreeMap::from([
        (StarType::O, 1),
        (StarType::B, 2),
        (StarType::A, 6),
        (StarType::F, 12),
        (StarType::G, 16),
        (StarType::K, 25),
        (StarType::M, 38),
    ])
}

fn default_faction_weights() -> BTreeMap<Faction, u32> {
    BTreeMap::from([
        (Faction::Cartel, 15),
        (Faction::Empire, 45),
        (Faction::Federation, 30),
        (Faction::Independent, 10),
    ])
}

const fn default_first_orbit() -> f64 {
    0.3
}

const fn default_orbit_spacing() -> f64 {
    1.7
}

const fn default_scorched_k() -> f64 {
    500.0
}

const fn default_habitable_max_k() -> f64 {
    320.0
}

const fn default_habitable_min_k() -> f64 {
    240.0
}

const fn default_frost_line_k() -> f64 {
    170.0
}

const fn default_gas_giant_chance() -> f64 {
    0.6
}
