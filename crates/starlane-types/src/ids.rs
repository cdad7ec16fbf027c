//! Deterministic identifiers for every entity in the simulation.
//!
//! Identifiers are derived from an entity's structural position (its
//! generation path) rather than drawn at random, so regenerating the same
//! seed always yields the same identifiers. Systems, planets and agents
//! embed the identifier of the scope that owns them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around an unsigned integer with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub $inner);

        impl $name {
            /// Return the inner integer value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Index of a sector within the galaxy grid (row-major).
    SectorId(u32)
}

define_id! {
    /// Per-tick submission sequence number of a bid or ask.
    OrderId(u64)
}

define_id! {
    /// Per-tick sequence number of an executed trade.
    TradeId(u64)
}

/// Identifier of a star system: its sector plus its index inside the sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SystemId {
    /// Owning sector.
    pub sector: SectorId,
    /// Position of the system in its sector's generation order.
    pub index: u32,
}

impl SystemId {
    /// Build a system identifier from its path components.
    pub const fn new(sector: u32, index: u32) -> Self {
        Self {
            sector: SectorId(sector),
            index,
        }
    }
}

impl core::fmt::Display for SystemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.sector, self.index)
    }
}

/// Identifier of a planet: its system plus its orbital slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlanetId {
    /// System the planet orbits in.
    pub system: SystemId,
    /// Orbital slot, counted outward from the star.
    pub slot: u32,
}

impl core::fmt::Display for PlanetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.system, self.slot)
    }
}

/// Identifier of a trading agent.
///
/// Agents are scoped to a system. The identifier packs the system path and
/// a per-system sequence so that ordering by `AgentId` groups agents by
/// system and then by creation order. Sequence `0` is reserved for the
/// system market itself (the house participant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentId {
    /// System the agent trades in.
    pub system: SystemId,
    /// Creation order within the system (0 is the house).
    pub seq: u32,
}

impl AgentId {
    /// Sequence number reserved for the system market's house account.
    pub const HOUSE_SEQ: u32 = 0;

    /// Build an agent identifier.
    pub const fn new(system: SystemId, seq: u32) -> Self {
        Self { system, seq }
    }

    /// The house participant of the given system's market.
    pub const fn house(system: SystemId) -> Self {
        Self::new(system, Self::HOUSE_SEQ)
    }

    /// Whether this identifier is the house participant.
    pub const fn is_house(&self) -> bool {
        self.seq == Self::HOUSE_SEQ
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.system, self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_ids_order_by_sector_then_index() {
        let a = SystemId::new(0, 9);
        let b = SystemId::new(1, 0);
        let c = SystemId::new(1, 2);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn house_sorts_before_agents_of_same_system() {
        let system = SystemId::new(2, 3);
        let house = AgentId::house(system);
        let trader = AgentId::new(system, 1);
        assert!(house.is_house());
        assert!(!trader.is_house());
        assert!(house < trader);
    }

    #[test]
    fn display_formats_path() {
        let system = SystemId::new(4, 7);
        assert_eq!(system.to_string(), "4-7");
        assert_eq!(PlanetId { system, slot: 2 }.to_string(), "4-7/2");
        assert_eq!(AgentId::new(system, 12).to_string(), "4-7#12");
        assert_eq!(OrderId(5).to_string(), "5");
    }
}
