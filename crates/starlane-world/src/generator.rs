//! Procedural universe generation.
//!
//! The galaxy is a grid of sectors. Each sector draws a faction, a system
//! count and a sequence of spaced positions; each system draws a star and a
//! set of planets whose types follow orbital temperature bands. Every draw
//! comes from a stream keyed by the node's path (see [`crate::rng`]), so:
//!
//! - sectors are generated in parallel and merged by grid index,
//! - [`UniverseGenerator::generate_system`] rebuilds one system without
//!   building its siblings' stars or planets (it replays only their
//!   positions, which the spacing constraint depends on),
//! - the same seed and configuration always produce identical output.

use starlane_types::{
    Faction, Galaxy, Planet, PlanetEconomy, PlanetId, PlanetType, Point, Rect, Sector,
    SectorCoord, SectorId, Star, System, SystemId, SystemSecurity,
};

use crate::config::{GalaxyConfig, OrbitConfig};
use crate::error::{GenerationFailure, GenerationPath, WorldError};
use crate::names::{NamePool, planet_name};
use crate::parallel;
use crate::resources::ResourceProvider;
use crate::rng::{Purpose, RandomStream, SeededRandomStream};

/// Equilibrium temperature (K) of a zero-albedo body 1 AU from a 1 L☉ star.
const EQUILIBRIUM_K_AT_1AU: f64 = 278.6;

/// Fourth root of `1 - 0.29`, the Bond albedo applied to every planet.
const ALBEDO_FACTOR: f64 = 0.917_9;

/// Light years of display offset per AU of orbit radius.
const ORBIT_DISPLAY_SCALE: f64 = 0.05;

/// Probability that a planet hotter than the habitable band is Metal.
const HOT_METAL_CHANCE: f64 = 0.2;

/// Builds galaxies, sectors and systems from a seed and a validated config.
#[derive(Debug)]
pub struct UniverseGenerator<'a> {
    config: &'a GalaxyConfig,
    streams: SeededRandomStream,
    /// System names shuffled once for the whole galaxy, dealt to sectors.
    names: Vec<String>,
}

/// Per-sector values every system in the sector needs.
struct SectorContext {
    id: SectorId,
    faction: Faction,
    names: NamePool,
}

impl<'a> UniverseGenerator<'a> {
    /// Validate `config` and prepare a generator for `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Configuration`] if the configuration is invalid.
    /// No generation work happens before validation succeeds.
    pub fn new<R: ResourceProvider + ?Sized>(
        config: &'a GalaxyConfig,
        seed: u64,
        resources: &R,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        let streams = SeededRandomStream::new(seed, config.path_limits());
        let mut names = resources.system_names().to_vec();
        streams.derive(&[], Purpose::Names)?.shuffle(&mut names);
        Ok(Self {
            config,
            streams,
            names,
        })
    }

    /// The stream factory, for consumers deriving their own per-node streams.
    pub const fn streams(&self) -> &SeededRandomStream {
        &self.streams
    }

    /// Generate the full galaxy.
    ///
    /// # Errors
    ///
    /// Returns the first sector failure in grid order.
    pub fn generate_galaxy(&self) -> Result<Galaxy, WorldError> {
        let sectors = self
            .generate_sectors()
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        let galaxy = Galaxy {
            seed: self.streams.seed(),
            bounds: self.config.bounds(),
            sectors,
        };
        tracing::info!(
            seed = galaxy.seed,
            sectors = galaxy.sectors.len(),
            systems = galaxy.system_count(),
            "Galaxy generated"
        );
        Ok(galaxy)
    }

    /// Generate every sector, keeping failures separate so one infeasible
    /// sector does not discard its siblings. Results are in grid order.
    pub fn generate_sectors(&self) -> Vec<Result<Sector, WorldError>> {
        parallel::map_indices(
            self.config.sector_count(),
            |index| self.generate_sector(SectorId(index)),
            self.config.force_sequential,
        )
    }

    /// Generate one sector and all of its systems.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Configuration`] for an out-of-range sector and
    /// [`WorldError::Generation`] if placement or naming fails.
    pub fn generate_sector(&self, id: SectorId) -> Result<Sector, WorldError> {
        let bounds = self.sector_bounds(id)?;
        let count = self.system_count(id)?;
        let context = self.sector_context(id)?;
        let positions = self.place_systems(id, bounds, count)?;

        let mut systems = Vec::with_capacity(positions.len());
        for (index, position) in (0_u32..).zip(positions) {
            systems.push(self.build_system(&context, index, position)?);
        }

        let coord = self.sector_coord(id);
        tracing::debug!(
            sector = id.into_inner(),
            faction = ?context.faction,
            systems = systems.len(),
            "Sector generated"
        );
        Ok(Sector {
            id,
            coord,
            bounds,
            faction: context.faction,
            systems,
        })
    }

    /// Regenerate a single system from its path.
    ///
    /// Produces a system identical to the one embedded in the full galaxy.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Configuration`] if the sector or index is out of
    /// range, and [`WorldError::Generation`] if placement or naming fails.
    pub fn generate_system(&self, id: SystemId) -> Result<System, WorldError> {
        let bounds = self.sector_bounds(id.sector)?;
        let count = self.system_count(id.sector)?;
        if id.index >= count {
            return Err(WorldError::config(format!(
                "system index {} out of range for sector {} ({count} systems)",
                id.index, id.sector
            )));
        }
        let context = self.sector_context(id.sector)?;
        let upto = id.index.saturating_add(1);
        let position = self
            .place_systems(id.sector, bounds, upto)?
            .pop()
            .ok_or_else(|| WorldError::config(format!("no position for system {id}")))?;
        self.build_system(&context, id.index, position)
    }

    /// Number of systems the sector holds.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Configuration`] for an out-of-range sector.
    pub fn system_count(&self, sector: SectorId) -> Result<u32, WorldError> {
        let mut stream = self.streams.derive(&[sector.into_inner()], Purpose::Layout)?;
        Ok(stream.range_u32(self.config.min_density, self.config.density))
    }

    // -----------------------------------------------------------------------
    // Sector layout
    // -----------------------------------------------------------------------

    fn sector_coord(&self, id: SectorId) -> SectorCoord {
        let index = id.into_inner();
        SectorCoord {
            column: index.checked_rem(self.config.columns).unwrap_or(0),
            row: index.checked_div(self.config.columns).unwrap_or(0),
        }
    }

    fn sector_bounds(&self, id: SectorId) -> Result<Rect, WorldError> {
        if id.into_inner() >= self.config.sector_count() {
            return Err(WorldError::config(format!(
                "sector {id} out of range ({} sectors)",
                self.config.sector_count()
            )));
        }
        let coord = self.sector_coord(id);
        let width = self.config.width / f64::from(self.config.columns);
        let height = self.config.height / f64::from(self.config.rows);
        Ok(Rect::new(
            Point::new(f64::from(coord.column) * width, f64::from(coord.row) * height),
            width,
            height,
        ))
    }

    fn sector_context(&self, id: SectorId) -> Result<SectorContext, WorldError> {
        let path = [id.into_inner()];
        let mut politics = self.streams.derive(&path, Purpose::Politics)?;
        let faction = politics
            .pick_weighted(&self.config.faction_table())
            .ok_or_else(|| WorldError::config("faction_weights must contain a positive weight"))?;
        let mut names_stream = self.streams.derive(&path, Purpose::Names)?;
        let names = NamePool::for_sector(
            GenerationPath::sector(id.into_inner()),
            &self.names,
            id.into_inner(),
            self.config.sector_count(),
            &mut names_stream,
        );
        Ok(SectorContext { id, faction, names })
    }

    /// Place the first `count` systems of a sector by rejection sampling.
    ///
    /// System `i` draws candidates from its own layout stream and accepts the
    /// first one at least `min_system_spacing` from every earlier system.
    fn place_systems(
        &self,
        sector: SectorId,
        bounds: Rect,
        count: u32,
    ) -> Result<Vec<Point>, WorldError> {
        let spacing = self.config.min_system_spacing;
        let mut placed: Vec<Point> = Vec::new();
        for index in 0..count {
            let path = [sector.into_inner(), index];
            let mut stream = self.streams.derive(&path, Purpose::Layout)?;
            let accepted = (0..self.config.placement_retries).find_map(|_| {
                let candidate = Point::new(
                    stream.range_f64(bounds.origin.x, bounds.origin.x + bounds.width),
                    stream.range_f64(bounds.origin.y, bounds.origin.y + bounds.height),
                );
                let clear = placed.iter().all(|other| {
                    let distance = other.distance(candidate);
                    distance >= spacing && distance > 0.0
                });
                clear.then_some(candidate)
            });
            match accepted {
                Some(point) => placed.push(point),
                None => {
                    return Err(WorldError::Generation {
                        path: GenerationPath::system(sector.into_inner(), index),
                        reason: GenerationFailure::SpacingInfeasible {
                            attempts: self.config.placement_retries,
                        },
                    });
                }
            }
        }
        Ok(placed)
    }

    // -----------------------------------------------------------------------
    // Systems, stars, planets
    // -----------------------------------------------------------------------

    fn build_system(
        &self,
        context: &SectorContext,
        index: u32,
        position: Point,
    ) -> Result<System, WorldError> {
        let sector = context.id.into_inner();
        let path = [sector, index];
        let id = SystemId::new(sector, index);
        let name = context
            .names
            .name_at(usize::try_from(index).unwrap_or(usize::MAX))?
            .to_owned();

        let mut politics = self.streams.derive(&path, Purpose::Politics)?;
        let security = initial_security(context.faction, politics.unit());

        let mut star_stream = self.streams.derive(&path, Purpose::Star)?;
        let star = self.build_star(&name, &mut star_stream)?;

        let mut planet_stream = self.streams.derive(&path, Purpose::Planets)?;
        let planet_count =
            planet_stream.range_u32(self.config.min_planets, self.config.max_planets);
        let mut planets = Vec::new();
        for slot in 0..planet_count {
            let mut body = self.streams.derive(&[sector, index, slot], Purpose::Planets)?;
            planets.push(build_planet(
                &self.config.orbits,
                PlanetId { system: id, slot },
                &name,
                position,
                &star,
                &mut body,
            ));
        }

        Ok(System {
            id,
            name,
            position,
            faction: context.faction,
            security,
            star,
            planets,
        })
    }

    fn build_star(&self, name: &str, stream: &mut RandomStream) -> Result<Star, WorldError> {
        let star_type = stream
            .pick_weighted(&self.config.star_table())
            .ok_or_else(|| WorldError::config("star_weights must contain a positive weight"))?;
        Ok(Star {
            name: name.to_owned(),
            star_type,
            luminosity: star_type.luminosity() * stream.range_f64(0.8, 1.2),
            mass: star_type.mass() * stream.range_f64(0.9, 1.1),
        })
    }
}

/// Convenience wrapper: validate, then generate a whole galaxy.
///
/// # Errors
///
/// See [`UniverseGenerator::new`] and [`UniverseGenerator::generate_galaxy`].
pub fn generate_galaxy<R: ResourceProvider + ?Sized>(
    config: &GalaxyConfig,
    seed: u64,
    resources: &R,
) -> Result<Galaxy, WorldError> {
    UniverseGenerator::new(config, seed, resources)?.generate_galaxy()
}

/// Initial security by controlling faction.
fn initial_security(faction: Faction, roll: f64) -> SystemSecurity {
    match faction {
        Faction::Empire => {
            if roll < 0.5 {
                SystemSecurity::High
            } else {
                SystemSecurity::Medium
            }
        }
        Faction::Federation => {
            if roll < 0.4 {
                SystemSecurity::Low
            } else if roll < 0.8 {
                SystemSecurity::Medium
            } else {
                SystemSecurity::High
            }
        }
        Faction::Cartel => {
            if roll < 0.5 {
                SystemSecurity::Medium
            } else {
                SystemSecurity::Anarchy
            }
        }
        Faction::Independent => {
            if roll < 0.5 {
                SystemSecurity::Anarchy
            } else {
                SystemSecurity::Low
            }
        }
    }
}

/// Equilibrium surface temperature for an orbit.
fn surface_temperature(luminosity: f64, orbit_radius: f64) -> f64 {
    EQUILIBRIUM_K_AT_1AU * ALBEDO_FACTOR * luminosity.powf(0.25) / orbit_radius.sqrt()
}

/// Planet type for a surface temperature, given the band policy.
fn classify_planet(orbits: &OrbitConfig, temperature: f64, stream: &mut RandomStream) -> PlanetType {
    if temperature >= orbits.scorched_k {
        PlanetType::Metal
    } else if temperature > orbits.habitable_max_k {
        if stream.chance(HOT_METAL_CHANCE) {
            PlanetType::Metal
        } else {
            PlanetType::Rocky
        }
    } else if temperature >= orbits.habitable_min_k {
        PlanetType::Earth
    } else if temperature > orbits.frost_line_k {
        PlanetType::Rocky
    } else if stream.chance(orbits.gas_giant_chance) {
        PlanetType::GasGiant
    } else {
        PlanetType::Icy
    }
}

/// Mass range in Earth masses by planet type.
const fn mass_range(planet_type: PlanetType) -> (f64, f64) {
    match planet_type {
        PlanetType::Metal => (0.05, 0.8),
        PlanetType::Rocky => (0.05, 1.5),
        PlanetType::Earth => (0.5, 2.0),
        PlanetType::Icy => (0.01, 5.0),
        PlanetType::GasGiant => (15.0, 400.0),
    }
}

fn build_planet(
    orbits: &OrbitConfig,
    id: PlanetId,
    system_name: &str,
    system_position: Point,
    star: &Star,
    stream: &mut RandomStream,
) -> Planet {
    let nominal = orbits.first_orbit
        * orbits.orbit_spacing.powf(f64::from(id.slot))
        * star.luminosity.sqrt();
    let orbit_radius = nominal * stream.range_f64(0.9, 1.1);
    let temperature = surface_temperature(star.luminosity, orbit_radius);
    let planet_type = classify_planet(orbits, temperature, stream);
    let (mass_min, mass_max) = mass_range(planet_type);
    let mass = stream.range_f64(mass_min, mass_max);
    let angle = stream.angle();
    Planet {
        id,
        name: planet_name(system_name, id.slot),
        planet_type,
        orbit_radius,
        temperature,
        position: system_position.offset_polar(orbit_radius * ORBIT_DISPLAY_SCALE, angle),
        mass,
        economy: PlanetEconomy::None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::EmbeddedResources;
    use crate::rng::PathLimits;

    fn orbit_stream() -> RandomStream {
        SeededRandomStream::new(
            3,
            PathLimits {
                sectors: 1,
                systems_per_sector: 1,
                bodies_per_system: 1,
            },
        )
        .derive(&[0, 0, 0], Purpose::Planets)
        .unwrap()
    }

    #[test]
    fn sun_like_star_has_temperate_band_near_one_au() {
        let t = surface_temperature(1.0, 1.0);
        assert!((240.0..=320.0).contains(&t), "temperature {t}");
        assert!(surface_temperature(1.0, 0.2) > 500.0);
        assert!(surface_temperature(1.0, 10.0) < 170.0);
    }

    #[test]
    fn bands_follow_distance_from_star() {
        let orbits = OrbitConfig::default();
        let mut stream = orbit_stream();
        assert_eq!(classify_planet(&orbits, 900.0, &mut stream), PlanetType::Metal);
        assert_eq!(classify_planet(&orbits, 280.0, &mut stream), PlanetType::Earth);
        assert_eq!(classify_planet(&orbits, 200.0, &mut stream), PlanetType::Rocky);
        for _ in 0..50 {
            let hot = classify_planet(&orbits, 400.0, &mut stream);
            assert!(matches!(hot, PlanetType::Rocky | PlanetType::Metal));
            let cold = classify_planet(&orbits, 60.0, &mut stream);
            assert!(matches!(cold, PlanetType::Icy | PlanetType::GasGiant));
        }
    }

    #[test]
    fn initial_security_tables() {
        assert_eq!(initial_security(Faction::Empire, 0.1), SystemSecurity::High);
        assert_eq!(initial_security(Faction::Empire, 0.9), SystemSecurity::Medium);
        assert_eq!(initial_security(Faction::Federation, 0.1), SystemSecurity::Low);
        assert_eq!(initial_security(Faction::Federation, 0.5), SystemSecurity::Medium);
        assert_eq!(initial_security(Faction::Federation, 0.9), SystemSecurity::High);
        assert_eq!(initial_security(Faction::Cartel, 0.9), SystemSecurity::Anarchy);
        assert_eq!(initial_security(Faction::Independent, 0.7), SystemSecurity::Low);
    }

    #[test]
    fn planets_are_ordered_outward() {
        let resources = EmbeddedResources::load().unwrap();
        let config = GalaxyConfig {
            min_planets: 4,
            max_planets: 8,
            ..GalaxyConfig::default()
        };
        let generator = UniverseGenerator::new(&config, 11, &resources).unwrap();
        let sector = generator.generate_sector(SectorId(0)).unwrap();
        for system in &sector.systems {
            assert!(system.planets.len() >= 4);
            for pair in system.planets.windows(2) {
                let [inner, outer] = pair else { continue };
                assert!(inner.id.slot < outer.id.slot);
                assert!(inner.temperature > outer.temperature);
            }
            for planet in &system.planets {
                assert_eq!(planet.economy, PlanetEconomy::None);
                assert!(planet.name.starts_with(&system.name));
            }
        }
    }

    #[test]
    fn out_of_range_sector_is_configuration_error() {
        let resources = EmbeddedResources::load().unwrap();
        let config = GalaxyConfig::default();
        let generator = UniverseGenerator::new(&config, 1, &resources).unwrap();
        assert!(matches!(
            generator.generate_sector(SectorId(99)),
            Err(WorldError::Configuration { .. })
        ));
        assert!(matches!(
            generator.generate_system(SystemId::new(0, config.density)),
            Err(WorldError::Configuration { .. })
        ));
    }

    #[test]
    fn invalid_config_fails_before_generation() {
        let resources = EmbeddedResources::load().unwrap();
        let config = GalaxyConfig {
            density: 0,
            ..GalaxyConfig::default()
        };
        assert!(matches!(
            UniverseGenerator::new(&config, 1, &resources),
            Err(WorldError::Configuration { .. })
        ));
    }
}
