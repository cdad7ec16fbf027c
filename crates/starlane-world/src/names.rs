//! Per-sector name pools drawn without replacement.
//!
//! The provider's name list is shuffled once per galaxy and dealt out to the
//! sectors like cards, so no two sectors share a base name. Each sector
//! shuffles its own share with its [`Purpose::Names`](crate::rng::Purpose::Names)
//! stream and, once the plain names run out, continues with numbered
//! variants of them (`"Vega II"`). Drawing the `n`th name sequentially and
//! looking it up directly with [`NamePool::name_at`] agree, which lets a
//! single system be regenerated without replaying its siblings' draws.

use crate::error::{GenerationFailure, GenerationPath, WorldError};
use crate::rng::RandomStream;

/// Planet designations by orbital slot; the star takes `A`.
const PLANET_LETTERS: &[u8] = b"BCDEFGHIJKLMNOPQ";

/// Numerals appended to a base name once a sector's plain names are used up.
const NUMERALS: [&str; 8] = ["II", "III", "IV", "V", "VI", "VII", "VIII", "IX"];

/// A shuffled, finite pool of names for one scope.
#[derive(Debug, Clone)]
pub struct NamePool {
    scope: GenerationPath,
    names: Vec<String>,
    cursor: usize,
}

impl NamePool {
    /// Shuffle `names` into a pool for `scope`.
    pub fn new(scope: GenerationPath, names: &[String], stream: &mut RandomStream) -> Self {
        let mut names = names.to_vec();
        stream.shuffle(&mut names);
        Self {
            scope,
            names,
            cursor: 0,
        }
    }

    /// The share of `dealt` belonging to sector `sector` of `sectors`,
    /// followed by its numbered variants.
    ///
    /// `dealt` is the galaxy-wide shuffled list; sector `k` receives every
    /// `sectors`th name starting at `k`. Pools of different sectors are
    /// disjoint as long as `dealt` holds no duplicates.
    pub fn for_sector(
        scope: GenerationPath,
        dealt: &[String],
        sector: u32,
        sectors: u32,
        stream: &mut RandomStream,
    ) -> Self {
        let stride = usize::try_from(sectors).unwrap_or(usize::MAX).max(1);
        let start = usize::try_from(sector).unwrap_or(usize::MAX);
        let mut share: Vec<String> = dealt.iter().skip(start).step_by(stride).cloned().collect();
        stream.shuffle(&mut share);
        let mut variants: Vec<String> = NUMERALS
            .iter()
            .flat_map(|numeral| share.iter().map(move |base| format!("{base} {numeral}")))
            .collect();
        stream.shuffle(&mut variants);
        share.extend(variants);
        Self {
            scope,
            names: share,
            cursor: 0,
        }
    }

    /// Draw the next unused name.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Generation`] with
    /// [`GenerationFailure::NamesExhausted`] once every name has been drawn.
    pub fn next_name(&mut self) -> Result<String, WorldError> {
        let name = self.name_at(self.cursor)?.to_owned();
        self.cursor = self.cursor.saturating_add(1);
        Ok(name)
    }

    /// The name the `index`th draw returns.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Generation`] if `index` is past the end of the pool.
    pub fn name_at(&self, index: usize) -> Result<&str, WorldError> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| WorldError::Generation {
                path: self.scope.clone(),
                reason: GenerationFailure::NamesExhausted {
                    drawn: self.names.len(),
                },
            })
    }

    /// Names not yet drawn.
    pub fn remaining(&self) -> usize {
        self.names.len().saturating_sub(self.cursor)
    }
}

/// Name of the planet in `slot` around `system_name`, e.g. `"Vega C"`.
pub fn planet_name(system_name: &str, slot: u32) -> String {
    let letter = usize::try_from(slot)
        .ok()
        .and_then(|index| PLANET_LETTERS.get(index))
        .map_or('?', |byte| char::from(*byte));
    format!("{system_name} {letter}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::rng::{PathLimits, Purpose, SeededRandomStream};

    fn stream(seed: u64) -> RandomStream {
        SeededRandomStream::new(
            seed,
            PathLimits {
                sectors: 1,
                systems_per_sector: 1,
                bodies_per_system: 1,
            },
        )
        .derive(&[0], Purpose::Names)
        .unwrap()
    }

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Name{i}")).collect()
    }

    #[test]
    fn draws_without_replacement_then_exhausts() {
        let mut pool = NamePool::new(GenerationPath::sector(0), &names(5), &mut stream(1));
        let drawn: BTreeSet<String> = (0..5).map(|_| pool.next_name().unwrap()).collect();
        assert_eq!(drawn.len(), 5);
        assert_eq!(pool.remaining(), 0);
        let err = pool.next_name().unwrap_err();
        assert_eq!(err.path(), Some(&GenerationPath::sector(0)));
        assert!(matches!(
            err,
            WorldError::Generation {
                reason: GenerationFailure::NamesExhausted { drawn: 5 },
                ..
            }
        ));
    }

    #[test]
    fn sequential_draws_match_direct_lookup() {
        let source = names(20);
        let mut pool = NamePool::new(GenerationPath::sector(0), &source, &mut stream(7));
        let direct = NamePool::new(GenerationPath::sector(0), &source, &mut stream(7));
        for index in 0..20 {
            assert_eq!(pool.next_name().unwrap(), direct.name_at(index).unwrap());
        }
    }

    #[test]
    fn shuffle_depends_on_stream() {
        let source = names(50);
        let a = NamePool::new(GenerationPath::sector(0), &source, &mut stream(1));
        let b = NamePool::new(GenerationPath::sector(0), &source, &mut stream(2));
        let first_a: Vec<&str> = (0..10).map(|i| a.name_at(i).unwrap()).collect();
        let first_b: Vec<&str> = (0..10).map(|i| b.name_at(i).unwrap()).collect();
        assert_ne!(first_a, first_b);
    }

    #[test]
    fn sector_shares_are_disjoint() {
        let source = names(10);
        let pools: Vec<NamePool> = (0..3)
            .map(|sector| {
                NamePool::for_sector(
                    GenerationPath::sector(sector),
                    &source,
                    sector,
                    3,
                    &mut stream(u64::from(sector)),
                )
            })
            .collect();
        let mut seen = BTreeSet::new();
        for pool in &pools {
            for index in 0..pool.remaining() {
                assert!(seen.insert(pool.name_at(index).unwrap().to_owned()));
            }
        }
        // Ten base names plus eight numbered variants of each.
        assert_eq!(seen.len(), 90);
    }

    #[test]
    fn plain_names_come_before_variants() {
        let source = names(6);
        let pool = NamePool::for_sector(GenerationPath::sector(1), &source, 1, 2, &mut stream(3));
        assert_eq!(pool.remaining(), 27);
        let plain: BTreeSet<&str> = (0..3).map(|i| pool.name_at(i).unwrap()).collect();
        assert_eq!(plain, BTreeSet::from(["Name1", "Name3", "Name5"]));
        assert!(pool.name_at(3).unwrap().contains(' '));
    }

    #[test]
    fn sector_without_share_is_empty() {
        let source = names(2);
        let mut pool = NamePool::for_sector(GenerationPath::sector(3), &source, 3, 4, &mut stream(1));
        assert!(matches!(
            pool.next_name(),
            Err(WorldError::Generation {
                reason: GenerationFailure::NamesExhausted { drawn: 0 },
                ..
            })
        ));
    }

    #[test]
    fn planet_letters() {
        assert_eq!(planet_name("Vega", 0), "Vega B");
        assert_eq!(planet_name("Vega", 2), "Vega D");
        assert_eq!(planet_name("Vega", 99), "Vega ?");
    }
}
