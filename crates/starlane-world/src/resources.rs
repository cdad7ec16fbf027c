//! Read-only lookup resources: astronomical names, ship and agent templates.
//!
//! The core only reads these tables. [`EmbeddedResources`] parses the JSON
//! bundles compiled into the crate; tests and tools can supply their own
//! [`ResourceProvider`] implementation.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use starlane_types::{Commodity, PlanetEconomy};

use crate::error::WorldError;

const NAMES_JSON: &str = include_str!("../resources/names.json");
const AGENTS_JSON: &str = include_str!("../resources/agents.json");
const SHIPS_JSON: &str = include_str!("../resources/ships.json");

/// Display characteristics of a ship class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipCharacteristics {
    /// Template identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Cargo hold size in units.
    pub cargo_capacity: u32,
    /// Relative speed rating.
    pub speed: u32,
    /// Hull points.
    pub hull: u32,
}

/// Template for a trading agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Template identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ship class flown, a key into the ship table.
    pub ship: String,
    /// Base selection weight.
    pub weight: u32,
    /// Planet economies where this template is more common.
    #[serde(default)]
    pub affinity: Vec<PlanetEconomy>,
    /// Lower bound of starting capital.
    pub capital_min: Decimal,
    /// Upper bound of starting capital.
    pub capital_max: Decimal,
    /// Commodities this agent produces and prefers to sell.
    #[serde(default)]
    pub produces: Vec<Commodity>,
    /// Commodities this agent consumes and prefers to buy.
    #[serde(default)]
    pub consumes: Vec<Commodity>,
    /// Units of each produced commodity made per tick.
    pub production_rate: u32,
    /// Units of each consumed commodity used per tick.
    pub consumption_rate: u32,
    /// Holding the agent tries to keep of each consumed commodity.
    pub target_stock: u32,
}

/// Read-only lookup tables consumed by generation and population.
pub trait ResourceProvider: Send + Sync {
    /// Every astronomical name, without duplicates. Generation shuffles the
    /// list once per galaxy and deals it out to sectors; see
    /// [`NamePool`](crate::names::NamePool) for the per-scope draws.
    fn system_names(&self) -> &[String];

    /// Look up a ship class by identifier.
    fn ship_template(&self, id: &str) -> Option<&ShipCharacteristics>;

    /// Look up an agent template by identifier.
    fn agent_template(&self, id: &str) -> Option<&AgentProfile>;

    /// Every agent template, in stable order.
    fn agent_templates(&self) -> &[AgentProfile];
}

#[derive(Deserialize)]
struct NamesBundle {
    names: Vec<String>,
}

#[derive(Deserialize)]
struct AgentsBundle {
    agents: Vec<AgentProfile>,
}

#[derive(Deserialize)]
struct ShipsBundle {
    ships: Vec<ShipCharacteristics>,
}

/// Resource tables parsed from the JSON bundles embedded in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedResources {
    names: Vec<String>,
    ships: Vec<ShipCharacteristics>,
    agents: Vec<AgentProfile>,
}

impl EmbeddedResources {
    /// Parse the embedded bundles.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Resource`] if a bundle fails to parse or the
    /// agent table is empty.
    pub fn load() -> Result<Self, WorldError> {
        let names: NamesBundle = parse("names", NAMES_JSON)?;
        let agents: AgentsBundle = parse("agents", AGENTS_JSON)?;
        let ships: ShipsBundle = parse("ships", SHIPS_JSON)?;
        Self::from_parts(names.names, ships.ships, agents.agents)
    }

    /// Build a provider from explicit tables.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Resource`] if the agent table is empty, a
    /// template's capital range is inverted, a template names an unknown
    /// ship class, or a system name is listed twice.
    pub fn from_parts(
        names: Vec<String>,
        ships: Vec<ShipCharacteristics>,
        agents: Vec<AgentProfile>,
    ) -> Result<Self, WorldError> {
        if agents.is_empty() {
            return Err(WorldError::Resource {
                bundle: "agents",
                message: "at least one agent template is required".to_owned(),
            });
        }
        if let Some(bad) = agents
            .iter()
            .find(|profile| profile.capital_min > profile.capital_max)
        {
            return Err(WorldError::Resource {
                bundle: "agents",
                message: format!("template {} has capital_min > capital_max", bad.id),
            });
        }
        if let Some(bad) = agents
            .iter()
            .find(|profile| !ships.iter().any(|ship| ship.id == profile.ship))
        {
            return Err(WorldError::Resource {
                bundle: "agents",
                message: format!("template {} flies unknown ship {}", bad.id, bad.ship),
            });
        }
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(WorldError::Resource {
                bundle: "names",
                message: format!("name {duplicate} is listed twice"),
            });
        }
        Ok(Self {
            names,
            ships,
            agents,
        })
    }

    /// Every ship template.
    pub fn ships(&self) -> &[ShipCharacteristics] {
        &self.ships
    }
}

fn parse<T: for<'de> Deserialize<'de>>(bundle: &'static str, json: &str) -> Result<T, WorldError> {
    serde_json::from_str(json).map_err(|source| WorldError::Resource {
        bundle,
        message: source.to_string(),
    })
}

impl ResourceProvider for EmbeddedResources {
    fn system_names(&self) -> &[String] {
        &self.names
    }

    fn ship_template(&self, id: &str) -> Option<&ShipCharacteristics> {
        self.ships.iter().find(|ship| ship.id == id)
    }

    fn agent_template(&self, id: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|profile| profile.id == id)
    }

    fn agent_templates(&self) -> &[AgentProfile] {
        &self.agents
    }
}
