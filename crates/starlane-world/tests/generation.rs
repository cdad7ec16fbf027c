//! Integration tests for universe generation: determinism, locality,
//! spacing and failure isolation.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use starlane_types::{OrdPoint, SectorId, SystemId};
use starlane_world::{
    EmbeddedResources, GalaxyConfig, GenerationFailure, ResourceProvider, UniverseGenerator,
    WorldError, generate_galaxy,
};

fn resources() -> EmbeddedResources {
    EmbeddedResources::load().unwrap()
}

fn small_config() -> GalaxyConfig {
    GalaxyConfig {
        columns: 2,
        rows: 2,
        density: 8,
        min_density: 3,
        ..GalaxyConfig::default()
    }
}

#[test]
fn same_seed_yields_identical_galaxy() {
    let resources = resources();
    let config = small_config();
    let a = generate_galaxy(&config, 42, &resources).unwrap();
    let b = generate_galaxy(&config, 42, &resources).unwrap();
    assert_eq!(a, b);
}

#[test]
fn parallel_and_sequential_generation_agree() {
    let resources = resources();
    let parallel = small_config();
    let sequential = GalaxyConfig {
        force_sequential: true,
        ..small_config()
    };
    assert_eq!(
        generate_galaxy(&parallel, 9, &resources).unwrap(),
        generate_galaxy(&sequential, 9, &resources).unwrap()
    );
}

#[test]
fn different_seeds_diverge() {
    let resources = resources();
    let config = small_config();
    let a = generate_galaxy(&config, 1, &resources).unwrap();
    let b = generate_galaxy(&config, 2, &resources).unwrap();
    assert_ne!(a, b);
}

#[test]
fn regenerated_system_matches_embedded_system() {
    let resources = resources();
    let config = small_config();
    let generator = UniverseGenerator::new(&config, 77, &resources).unwrap();
    let galaxy = generator.generate_galaxy().unwrap();
    for system in galaxy.systems() {
        let alone = generator.generate_system(system.id).unwrap();
        assert_eq!(&alone, system);
    }
}

#[test]
fn regenerated_sector_matches_embedded_sector() {
    let resources = resources();
    let config = small_config();
    let generator = UniverseGenerator::new(&config, 5, &resources).unwrap();
    let galaxy = generator.generate_galaxy().unwrap();
    let sector = generator.generate_sector(SectorId(3)).unwrap();
    assert_eq!(galaxy.sector(SectorId(3)), Some(&sector));
}

#[test]
fn sectors_are_unaffected_by_grid_growth() {
    // Adding rows appends sectors; existing sectors keep their contents.
    let resources = resources();
    let narrow = GalaxyConfig {
        rows: 1,
        height: 500.0,
        ..small_config()
    };
    let tall = GalaxyConfig {
        rows: 2,
        height: 1_000.0,
        ..small_config()
    };
    let a = generate_galaxy(&narrow, 13, &resources).unwrap();
    let b = generate_galaxy(&tall, 13, &resources).unwrap();
    for sector in &a.sectors {
        assert_eq!(b.sector(sector.id), Some(sector));
    }
}

#[test]
fn sector_coordinates_unique_and_inside_galaxy() {
    let resources = resources();
    let galaxy = generate_galaxy(&small_config(), 3, &resources).unwrap();
    let mut coords: Vec<_> = galaxy.sectors.iter().map(|s| s.coord).collect();
    coords.sort();
    coords.dedup();
    assert_eq!(coords.len(), galaxy.sectors.len());
    for sector in &galaxy.sectors {
        assert!(galaxy.bounds.contains_rect(&sector.bounds));
        for system in &sector.systems {
            assert!(sector.bounds.contains(system.position));
        }
    }
}

#[test]
fn system_names_unique_within_sector() {
    let resources = resources();
    let galaxy = generate_galaxy(&small_config(), 21, &resources).unwrap();
    for sector in &galaxy.sectors {
        let mut names: Vec<&str> = sector.systems.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}

#[test]
fn infeasible_spacing_reports_failing_path_and_spares_siblings() {
    let resources = resources();
    let config = GalaxyConfig {
        columns: 2,
        rows: 1,
        width: 200.0,
        height: 100.0,
        density: 40,
        min_density: 40,
        min_system_spacing: 60.0,
        placement_retries: 16,
        ..GalaxyConfig::default()
    };
    let generator = UniverseGenerator::new(&config, 8, &resources).unwrap();
    let results = generator.generate_sectors();
    assert_eq!(results.len(), 2);
    for result in results {
        let err = result.unwrap_err();
        let path = err.path().unwrap();
        assert!(matches!(
            err,
            WorldError::Generation {
                reason: GenerationFailure::SpacingInfeasible { attempts: 16 },
                ..
            }
        ));
        assert_eq!(path.components().len(), 2);
    }
    assert!(generator.generate_galaxy().is_err());
}

#[test]
fn name_pool_exhaustion_is_generation_error() {
    let base = resources();
    // One base name plus its eight numbered variants: nine systems at most.
    let tiny = EmbeddedResources::from_parts(
        vec!["Solo".to_owned()],
        base.ships().to_vec(),
        base.agent_templates().to_vec(),
    )
    .unwrap();
    let config = GalaxyConfig {
        columns: 1,
        rows: 1,
        density: 10,
        min_density: 10,
        ..GalaxyConfig::default()
    };
    let err = generate_galaxy(&config, 4, &tiny).unwrap_err();
    assert_eq!(err.path().unwrap().components(), &[0]);
    assert!(matches!(
        err,
        WorldError::Generation {
            reason: GenerationFailure::NamesExhausted { drawn: 9 },
            ..
        }
    ));
    // The failure is isolated to the system that ran out of names.
    let generator = UniverseGenerator::new(&config, 4, &tiny).unwrap();
    let named = generator.generate_system(SystemId::new(0, 8)).unwrap();
    assert!(named.name.starts_with("Solo"));
}

#[test]
fn system_names_unique_across_galaxy() {
    let resources = resources();
    let config = GalaxyConfig {
        columns: 10,
        rows: 4,
        ..GalaxyConfig::default()
    };
    let galaxy = generate_galaxy(&config, 7, &resources).unwrap();
    let mut names: Vec<&str> = galaxy.systems().map(|system| system.name.as_str()).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
    for system in galaxy.systems() {
        assert_eq!(galaxy.system_by_name(&system.name).unwrap().id, system.id);
    }
}

#[test]
fn end_to_end_seed_42_three_sectors_density_five() {
    let resources = resources();
    let config = GalaxyConfig {
        columns: 3,
        rows: 1,
        density: 5,
        ..GalaxyConfig::default()
    };
    let a = generate_galaxy(&config, 42, &resources).unwrap();
    let b = generate_galaxy(&config, 42, &resources).unwrap();
    assert_eq!(a.sectors.len(), 3);
    assert_eq!(a.system_count(), b.system_count());
    assert!(a.system_count() >= 3 && a.system_count() <= 15);
    for system in a.systems() {
        assert_eq!(a.system_at(OrdPoint::new(system.position)).map(|s| s.id), Some(system.id));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn generation_is_deterministic(seed in any::<u64>()) {
        let resources = resources();
        let config = small_config();
        let a = generate_galaxy(&config, seed, &resources).unwrap();
        let b = generate_galaxy(&config, seed, &resources).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn systems_respect_minimum_spacing(seed in any::<u64>(), spacing in 10.0_f64..120.0) {
        let resources = resources();
        let config = GalaxyConfig {
            min_system_spacing: spacing,
            placement_retries: 256,
            ..small_config()
        };
        let galaxy = generate_galaxy(&config, seed, &resources).unwrap();
        for sector in &galaxy.sectors {
            for (i, a) in sector.systems.iter().enumerate() {
                for b in sector.systems.iter().skip(i + 1) {
                    prop_assert!(a.position.distance(b.position) >= spacing);
                }
            }
        }
    }
}
