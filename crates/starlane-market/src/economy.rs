//! Planet economy classification and starting market conditions.
//!
//! Classification is a policy table over (star type, planet type, controlling
//! faction). Each economy has a production profile listing what its planets
//! export and import; a system's starting prices and stock are derived from
//! the profiles of its planets plus a small seeded perturbation.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use starlane_types::{
    Commodity, Faction, Galaxy, PlanetEconomy, PlanetType, StarType, System,
};
use starlane_world::{Purpose, SeededRandomStream};

use crate::config::MarketConfig;
use crate::error::MarketError;
use crate::market::{MarketEntry, SystemMarket};

/// What planets of one economy export and import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomyProfile {
    /// Commodities produced in surplus.
    pub produces: &'static [Commodity],
    /// Commodities in demand.
    pub consumes: &'static [Commodity],
}

/// Price multiplier, in percent, for goods the system exports.
const EXPORT_PRICE_PCT: i64 = 80;

/// Price multiplier, in percent, for goods the system imports.
const IMPORT_PRICE_PCT: i64 = 120;

/// Classify a planet.
///
/// Temperate worlds farm, scorched worlds mine, giants refine. Rocky and icy
/// worlds follow the controlling faction, except that rocky worlds around
/// hot stars turn to high technology.
pub const fn classify(star: StarType, planet: PlanetType, faction: Faction) -> PlanetEconomy {
    match planet {
        PlanetType::Earth => PlanetEconomy::Agriculture,
        PlanetType::Metal => PlanetEconomy::Extraction,
        PlanetType::GasGiant => PlanetEconomy::Refinery,
        PlanetType::Rocky => {
            if star.is_hot() {
                PlanetEconomy::HighTech
            } else {
                match faction {
                    Faction::Empire => PlanetEconomy::Military,
                    Faction::Federation => PlanetEconomy::Industrial,
                    Faction::Cartel | Faction::Independent => PlanetEconomy::Extraction,
                }
            }
        }
        PlanetType::Icy => match faction {
            Faction::Federation => PlanetEconomy::HighTech,
            Faction::Empire => PlanetEconomy::Industrial,
            Faction::Cartel | Faction::Independent => PlanetEconomy::None,
        },
    }
}

/// Production profile of an economy.
pub const fn profile(economy: PlanetEconomy) -> EconomyProfile {
    use Commodity::{
        Chemical, ConsumerItem, Food, IndustrialMaterial, LegalDrug, Machinery, Medicine, Metal,
        Mineral, Salvage, Technology, Textile, Waste, Weapon,
    };
    match economy {
        PlanetEconomy::Agriculture => EconomyProfile {
            produces: &[Food, Textile, LegalDrug],
            consumes: &[Machinery, Chemical, ConsumerItem, Technology],
        },
        PlanetEconomy::Extraction => EconomyProfile {
            produces: &[Mineral, Metal, Salvage],
            consumes: &[Food, Machinery, Medicine],
        },
        PlanetEconomy::HighTech => EconomyProfile {
            produces: &[Technology, Medicine],
            consumes: &[Metal, Chemical, Food],
        },
        PlanetEconomy::Industrial => EconomyProfile {
            produces: &[Machinery, IndustrialMaterial, ConsumerItem, Waste],
            consumes: &[Metal, Mineral, Food],
        },
        PlanetEconomy::Military => EconomyProfile {
            produces: &[Weapon],
            consumes: &[Food, Medicine, Technology, Metal],
        },
        PlanetEconomy::Refinery => EconomyProfile {
            produces: &[Chemical, IndustrialMaterial, Waste],
            consumes: &[Mineral, Machinery],
        },
        PlanetEconomy::None => EconomyProfile {
            produces: &[],
            consumes: &[Food],
        },
    }
}

/// Assign an economy to every planet of a system.
pub fn assign_system(system: &mut System) {
    let star = system.star.star_type;
    let faction = system.faction;
    for planet in &mut system.planets {
        planet.economy = classify(star, planet.planet_type, faction);
    }
}

/// Assign an economy to every planet in the galaxy.
pub fn assign_galaxy(galaxy: &mut Galaxy) {
    for system in galaxy.systems_mut() {
        assign_system(system);
    }
}

/// The most common non-`None` economy among a system's planets.
///
/// Ties resolve to the economy that sorts first. A system with no
/// classified planets is [`PlanetEconomy::None`].
pub fn dominant_economy(system: &System) -> PlanetEconomy {
    let mut counts: BTreeMap<PlanetEconomy, u32> = BTreeMap::new();
    for planet in &system.planets {
        if planet.economy != PlanetEconomy::None {
            let count = counts.entry(planet.economy).or_insert(0);
            *count = count.saturating_add(1);
        }
    }
    counts
        .iter()
        .fold(None, |best: Option<(PlanetEconomy, u32)>, (economy, count)| match best {
            Some((_, top)) if top >= *count => best,
            _ => Some((*economy, *count)),
        })
        .map_or(PlanetEconomy::None, |(economy, _)| economy)
}

/// Commodities a system exports and imports, from all its planets.
pub fn system_trade_profile(system: &System) -> (BTreeSet<Commodity>, BTreeSet<Commodity>) {
    let mut exports = BTreeSet::new();
    let mut imports = BTreeSet::new();
    for planet in &system.planets {
        let p = profile(planet.economy);
        exports.extend(p.produces.iter().copied());
        imports.extend(p.consumes.iter().copied());
    }
    if system.planets.is_empty() {
        imports.extend(profile(PlanetEconomy::None).consumes.iter().copied());
    }
    (exports, imports)
}

/// Build a system's starting market.
///
/// Exports start cheap and plentiful, imports dear and scarce. Each price is
/// then perturbed by up to `price_jitter_bp` basis points drawn from the
/// system's economy stream.
///
/// # Errors
///
/// Returns [`MarketError::World`] if the system path is out of range and
/// [`MarketError::ArithmeticOverflow`] on price overflow.
pub fn initial_market(
    system: &System,
    streams: &SeededRandomStream,
    config: &MarketConfig,
) -> Result<SystemMarket, MarketError> {
    let path = [system.id.sector.into_inner(), system.id.index];
    let mut stream = streams.derive(&path, Purpose::Economy)?;
    let (exports, imports) = system_trade_profile(system);
    let base_stock = u64::from(config.starting_stock);
    let jitter = i64::from(config.price_jitter_bp);

    let mut entries = BTreeMap::new();
    for commodity in Commodity::ALL {
        let exported = exports.contains(&commodity);
        let imported = imports.contains(&commodity);
        let (percent, stock) = match (exported, imported) {
            (true, false) => (EXPORT_PRICE_PCT, base_stock.saturating_mul(2)),
            (false, true) => (IMPORT_PRICE_PCT, base_stock / 4),
            _ => (100, base_stock / 2),
        };
        let draw = i64::from(stream.range_u32(0, config.price_jitter_bp.saturating_mul(2)));
        let offset_bp = draw.saturating_sub(jitter);
        let factor = Decimal::new(percent, 2)
            .checked_mul(
                Decimal::ONE
                    .checked_add(Decimal::new(offset_bp, 4))
                    .ok_or(MarketError::ArithmeticOverflow)?,
            )
            .ok_or(MarketError::ArithmeticOverflow)?;
        let price = commodity
            .base_price()
            .checked_mul(factor)
            .ok_or(MarketError::ArithmeticOverflow)?
            .round_dp(2)
            .max(config.min_price);
        let stock_jitter = u64::from(stream.range_u32(0, 20));
        entries.insert(
            commodity,
            MarketEntry {
                price,
                stock: stock.saturating_add(stock_jitter),
                last_volume: 0,
            },
        );
    }

    Ok(SystemMarket::new(
        system.id,
        system.faction,
        entries,
        config.house_treasury,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use starlane_types::{Planet, PlanetId, Point, Star, SystemId, SystemSecurity};
    use starlane_world::PathLimits;

    use super::*;

    fn planet(system: SystemId, slot: u32, planet_type: PlanetType) -> Planet {
        Planet {
            id: PlanetId { system, slot },
            name: format!("P{slot}"),
            planet_type,
            orbit_radius: 1.0,
            temperature: 280.0,
            position: Point::default(),
            mass: 1.0,
            economy: PlanetEconomy::None,
        }
    }

    fn system(types: &[PlanetType], faction: Faction) -> System {
        let id = SystemId::new(0, 0);
        System {
            id,
            name: "Test".to_owned(),
            position: Point::default(),
            faction,
            security: SystemSecurity::Medium,
            star: Star {
                name: "Test".to_owned(),
                star_type: StarType::G,
                luminosity: 1.0,
                mass: 1.0,
            },
            planets: (0_u32..)
                .zip(types)
                .map(|(slot, t)| planet(id, slot, *t))
                .collect(),
        }
    }

    fn streams(seed: u64) -> SeededRandomStream {
        SeededRandomStream::new(
            seed,
            PathLimits {
                sectors: 1,
                systems_per_sector: 1,
                bodies_per_system: 8,
            },
        )
    }

    #[test]
    fn classification_table() {
        assert_eq!(classify(StarType::G, PlanetType::Earth, Faction::Cartel), PlanetEconomy::Agriculture);
        assert_eq!(classify(StarType::M, PlanetType::GasGiant, Faction::Empire), PlanetEconomy::Refinery);
        assert_eq!(classify(StarType::B, PlanetType::Rocky, Faction::Empire), PlanetEconomy::HighTech);
        assert_eq!(classify(StarType::K, PlanetType::Rocky, Faction::Empire), PlanetEconomy::Military);
        assert_eq!(classify(StarType::K, PlanetType::Rocky, Faction::Federation), PlanetEconomy::Industrial);
        assert_eq!(classify(StarType::K, PlanetType::Icy, Faction::Cartel), PlanetEconomy::None);
    }

    #[test]
    fn every_economy_class_is_reachable() {
        let mut seen = BTreeSet::new();
        for star in StarType::ALL {
            for faction in Faction::ALL {
                for planet in [
                    PlanetType::Metal,
                    PlanetType::Rocky,
                    PlanetType::Earth,
                    PlanetType::Icy,
                    PlanetType::GasGiant,
                ] {
                    seen.insert(classify(star, planet, faction));
                }
            }
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn dominant_economy_prefers_majority_then_order() {
        let mut s = system(
            &[PlanetType::Earth, PlanetType::GasGiant, PlanetType::GasGiant],
            Faction::Empire,
        );
        assign_system(&mut s);
        assert_eq!(dominant_economy(&s), PlanetEconomy::Refinery);

        let mut tie = system(&[PlanetType::GasGiant, PlanetType::Earth], Faction::Empire);
        assign_system(&mut tie);
        assert_eq!(dominant_economy(&tie), PlanetEconomy::Agriculture);

        let empty = system(&[], Faction::Empire);
        assert_eq!(dominant_economy(&empty), PlanetEconomy::None);
    }

    #[test]
    fn agricultural_system_exports_food_cheaply() {
        let mut s = system(&[PlanetType::Earth], Faction::Federation);
        assign_system(&mut s);
        let config = MarketConfig {
            price_jitter_bp: 0,
            ..MarketConfig::default()
        };
        let market = initial_market(&s, &streams(1), &config).unwrap();
        assert_eq!(
            market.price(Commodity::Food),
            Commodity::Food.base_price() * Decimal::new(80, 2)
        );
        assert_eq!(
            market.price(Commodity::Machinery),
            Commodity::Machinery.base_price() * Decimal::new(120, 2)
        );
        assert!(market.stock(Commodity::Food) > market.stock(Commodity::Machinery));
    }

    #[test]
    fn starting_market_is_seeded_and_bounded() {
        let mut s = system(&[PlanetType::Rocky, PlanetType::Icy], Faction::Empire);
        assign_system(&mut s);
        let config = MarketConfig::default();
        let a = initial_market(&s, &streams(3), &config).unwrap();
        let b = initial_market(&s, &streams(3), &config).unwrap();
        let c = initial_market(&s, &streams(4), &config).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        for commodity in Commodity::ALL {
            let base = commodity.base_price();
            let price = a.price(commodity);
            assert!(price >= base * Decimal::new(72, 2), "{commodity:?} {price}");
            assert!(price <= base * Decimal::new(132, 2), "{commodity:?} {price}");
        }
    }
}
