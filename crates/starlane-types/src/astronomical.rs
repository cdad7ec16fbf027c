//! The generated universe hierarchy.
//!
//! A [`Galaxy`] owns its [`Sector`]s, which own their [`System`]s, which own
//! a [`Star`] and a list of [`Planet`]s. The topology is immutable after
//! generation. Mutable per-system state (markets, agents, reputation,
//! security) lives in side tables keyed by [`SystemId`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Faction, PlanetEconomy, PlanetType, StarType, SystemSecurity};
use crate::geometry::{OrdPoint, Point, Rect};
use crate::ids::{PlanetId, SectorId, SystemId};

/// A star at the centre of a system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Star {
    /// Display name (shared with the system).
    pub name: String,
    /// Spectral class.
    pub star_type: StarType,
    /// Luminosity in solar units.
    pub luminosity: f64,
    /// Mass in solar units.
    pub mass: f64,
}

/// A planet in orbit around a system's star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Planet {
    /// Stable identifier.
    pub id: PlanetId,
    /// Display name, e.g. `"Vega B"`.
    pub name: String,
    /// Physical classification.
    pub planet_type: PlanetType,
    /// Orbit radius in astronomical units.
    pub orbit_radius: f64,
    /// Equilibrium surface temperature in kelvin.
    pub temperature: f64,
    /// Position in galaxy space.
    pub position: Point,
    /// Mass in Earth masses.
    pub mass: f64,
    /// Economic role. [`PlanetEconomy::None`] until classified.
    pub economy: PlanetEconomy,
}

/// A star system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct System {
    /// Stable identifier.
    pub id: SystemId,
    /// Display name.
    pub name: String,
    /// Position in galaxy space.
    pub position: Point,
    /// Controlling faction (inherited from the sector).
    pub faction: Faction,
    /// Security level at generation time.
    pub security: SystemSecurity,
    /// Central star.
    pub star: Star,
    /// Planets ordered by orbital slot.
    pub planets: Vec<Planet>,
}

impl System {
    /// Look up a planet by identifier.
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|planet| planet.id == id)
    }
}

/// Position of a sector on the galaxy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SectorCoord {
    /// Grid column.
    pub column: u32,
    /// Grid row.
    pub row: u32,
}

/// A rectangular region of the galaxy holding a set of systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Sector {
    /// Stable identifier.
    pub id: SectorId,
    /// Grid coordinate, unique within the galaxy.
    pub coord: SectorCoord,
    /// Spatial extent.
    pub bounds: Rect,
    /// Controlling faction.
    pub faction: Faction,
    /// Systems in generation order.
    pub systems: Vec<System>,
}

/// The full generated universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Galaxy {
    /// Seed the galaxy was generated from.
    pub seed: u64,
    /// Spatial extent.
    pub bounds: Rect,
    /// Sectors in row-major grid order.
    pub sectors: Vec<Sector>,
}

impl Galaxy {
    /// Iterate every system in structural order.
    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.sectors.iter().flat_map(|sector| sector.systems.iter())
    }

    /// Mutable iteration over every system in structural order.
    pub fn systems_mut(&mut self) -> impl Iterator<Item = &mut System> {
        self.sectors
            .iter_mut()
            .flat_map(|sector| sector.systems.iter_mut())
    }

    /// Total number of systems.
    pub fn system_count(&self) -> usize {
        self.sectors.iter().map(|sector| sector.systems.len()).sum()
    }

    /// Look up a sector by identifier.
    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.iter().find(|sector| sector.id == id)
    }

    /// Look up a system by identifier.
    pub fn system(&self, id: SystemId) -> Option<&System> {
        self.sector(id.sector)?
            .systems
            .iter()
            .find(|system| system.id == id)
    }

    /// Look up a system by display name.
    pub fn system_by_name(&self, name: &str) -> Option<&System> {
        self.systems().find(|system| system.name == name)
    }

    /// Look up the system at an exact position.
    pub fn system_at(&self, point: OrdPoint) -> Option<&System> {
        self.systems()
            .find(|system| OrdPoint::new(system.position) == point)
    }

    /// The system closest to `point`. Ties resolve to the lower [`SystemId`].
    pub fn nearest_system(&self, point: Point) -> Option<&System> {
        self.systems().min_by(|a, b| {
            a.position
                .distance_squared(point)
                .total_cmp(&b.position.distance_squared(point))
                .then_with(|| a.id.cmp(&b.id))
        })
    }

    /// Every system within `radius` of `point`, nearest first.
    pub fn systems_within(&self, point: Point, radius: f64) -> Vec<&System> {
        let limit = radius * radius;
        let mut found: Vec<&System> = self
            .systems()
            .filter(|system| system.position.distance_squared(point) <= limit)
            .collect();
        found.sort_by(|a, b| {
            a.position
                .distance_squared(point)
                .total_cmp(&b.position.distance_squared(point))
                .then_with(|| a.id.cmp(&b.id))
        });
        found
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn system(sector: u32, index: u32, name: &str, x: f64, y: f64) -> System {
        System {
            id: SystemId::new(sector, index),
            name: name.to_owned(),
            position: Point::new(x, y),
            faction: Faction::Federation,
            security: SystemSecurity::Medium,
            star: Star {
                name: name.to_owned(),
                star_type: StarType::G,
                luminosity: 1.0,
                mass: 1.0,
            },
            planets: Vec::new(),
        }
    }

    fn galaxy() -> Galaxy {
        let bounds = Rect::new(Point::new(0.0, 0.0), 100.0, 50.0);
        Galaxy {
            seed: 7,
            bounds,
            sectors: vec![
                Sector {
                    id: SectorId(0),
                    coord: SectorCoord { column: 0, row: 0 },
                    bounds: Rect::new(Point::new(0.0, 0.0), 50.0, 50.0),
                    faction: Faction::Federation,
                    systems: vec![
                        system(0, 0, "Sol", 10.0, 10.0),
                        system(0, 1, "Vega", 30.0, 40.0),
                    ],
                },
                Sector {
                    id: SectorId(1),
                    coord: SectorCoord { column: 1, row: 0 },
                    bounds: Rect::new(Point::new(50.0, 0.0), 50.0, 50.0),
                    faction: Faction::Empire,
                    systems: vec![system(1, 0, "Rigel", 60.0, 10.0)],
                },
            ],
        }
    }

    #[test]
    fn lookups_by_id_name_and_position() {
        let g = galaxy();
        assert_eq!(g.system_count(), 3);
        assert_eq!(g.system(SystemId::new(1, 0)).unwrap().name, "Rigel");
        assert_eq!(g.system_by_name("Vega").unwrap().id, SystemId::new(0, 1));
        let at = g.system_at(OrdPoint::new(Point::new(10.0, 10.0))).unwrap();
        assert_eq!(at.name, "Sol");
        assert!(g.system(SystemId::new(3, 0)).is_none());
    }

    #[test]
    fn nearest_and_radius_queries() {
        let g = galaxy();
        assert_eq!(g.nearest_system(Point::new(55.0, 12.0)).unwrap().name, "Rigel");
        let near: Vec<&str> = g
            .systems_within(Point::new(12.0, 12.0), 35.0)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(near, vec!["Sol", "Vega"]);
    }

    #[test]
    fn systems_iterate_in_structural_order() {
        let g = galaxy();
        let ids: Vec<SystemId> = g.systems().map(|s| s.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
