//! Faction reputation per system.
//!
//! Scores live in a side table keyed by `(SystemId, Faction)` rather than on
//! the systems themselves. Every score is clamped to
//! [`MIN_REPUTATION`]..=[`MAX_REPUTATION`]; a missing entry reads as 0.

use std::collections::BTreeMap;

use starlane_types::{Faction, Standing, SystemId};

/// Lowest reputation score.
pub const MIN_REPUTATION: i32 = -1_000;

/// Highest reputation score.
pub const MAX_REPUTATION: i32 = 1_000;

/// Owner reputation gained per 100 units of legal volume.
const LEGAL_VOLUME_UNIT: u64 = 100;

/// Cap on the owner's per-tick gain from legal volume.
const MAX_VOLUME_GAIN: i32 = 5;

/// Owner reputation lost per illegal trade.
const ILLEGAL_TRADE_LOSS: i32 = 5;

/// Owner reputation lost per rejected order.
const REJECTED_ORDER_LOSS: i32 = 2;

/// Cartel reputation gained per illegal trade.
const CARTEL_GAIN: i32 = 2;

/// Step by which non-neutral scores move back toward 0 each tick.
const DRIFT_STEP: i32 = 5;

/// Trade outcomes of one system during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeTally {
    /// Units traded in legal commodities.
    pub legal_volume: u64,
    /// Trades in commodities the owner outlaws.
    pub illegal_trades: u32,
    /// Orders the book rejected.
    pub rejected_orders: u32,
}

impl TradeTally {
    /// Whether the tick saw any trade activity or rejection.
    pub const fn is_idle(&self) -> bool {
        self.legal_volume == 0 && self.illegal_trades == 0 && self.rejected_orders == 0
    }

    /// Whether the tick had legal trades and nothing illegal or rejected.
    pub const fn is_clean(&self) -> bool {
        self.legal_volume > 0 && self.illegal_trades == 0 && self.rejected_orders == 0
    }
}

/// Reputation scores of every faction in every system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReputationBook {
    scores: BTreeMap<(SystemId, Faction), i32>,
}

impl ReputationBook {
    /// An empty book; every score reads 0.
    pub const fn new() -> Self {
        Self {
            scores: BTreeMap::new(),
        }
    }

    /// Current score of `faction` in `system`.
    pub fn score(&self, system: SystemId, faction: Faction) -> i32 {
        self.scores.get(&(system, faction)).copied().unwrap_or(0)
    }

    /// Label of the current score.
    pub fn standing(&self, system: SystemId, faction: Faction) -> Standing {
        Standing::from_score(self.score(system, faction))
    }

    /// Add `delta`, clamping the result. Returns the new score.
    pub fn adjust(&mut self, system: SystemId, faction: Faction, delta: i32) -> i32 {
        let score = self.scores.entry((system, faction)).or_insert(0);
        *score = score
            .saturating_add(delta)
            .clamp(MIN_REPUTATION, MAX_REPUTATION);
        *score
    }

    /// Every faction's score in `system`, in faction order.
    pub fn for_system(&self, system: SystemId) -> BTreeMap<Faction, i32> {
        Faction::ALL
            .iter()
            .map(|faction| (*faction, self.score(system, *faction)))
            .collect()
    }

    /// Apply one tick's trade outcomes in `system`.
    ///
    /// Returns the change to the owner's score caused by trading, before
    /// drift; a negative value is a falling trend.
    pub fn apply_trades(&mut self, system: SystemId, owner: Faction, tally: TradeTally) -> i32 {
        let volume_gain = i32::try_from(tally.legal_volume / LEGAL_VOLUME_UNIT)
            .unwrap_or(MAX_VOLUME_GAIN)
            .min(MAX_VOLUME_GAIN);
        let illegal = i32::try_from(tally.illegal_trades).unwrap_or(i32::MAX);
        let rejected = i32::try_from(tally.rejected_orders).unwrap_or(i32::MAX);
        let delta = volume_gain
            .saturating_sub(illegal.saturating_mul(ILLEGAL_TRADE_LOSS))
            .saturating_sub(rejected.saturating_mul(REJECTED_ORDER_LOSS));

        let before = self.score(system, owner);
        let after = self.adjust(system, owner, delta);
        if owner != Faction::Cartel && illegal > 0 {
            self.adjust(system, Faction::Cartel, illegal.saturating_mul(CARTEL_GAIN));
        }
        after.saturating_sub(before)
    }

    /// Move every non-neutral score in `system` toward 0.
    pub fn drift(&mut self, system: SystemId) {
        for faction in Faction::ALL {
            let score = self.score(system, faction);
            if Standing::from_score(score) == Standing::Neutral {
                continue;
            }
            let step = DRIFT_STEP.min(score.saturating_abs());
            let delta = if score > 0 { step.saturating_neg() } else { step };
            self.adjust(system, faction, delta);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SYS: SystemId = SystemId::new(0, 0);

    #[test]
    fn scores_default_to_zero_and_clamp() {
        let mut book = ReputationBook::new();
        assert_eq!(book.score(SYS, Faction::Empire), 0);
        assert_eq!(book.adjust(SYS, Faction::Empire, 5_000), MAX_REPUTATION);
        assert_eq!(book.adjust(SYS, Faction::Empire, i32::MIN), MIN_REPUTATION);
        assert_eq!(book.standing(SYS, Faction::Empire), Standing::Hostile);
    }

    #[test]
    fn legal_volume_raises_owner_with_cap() {
        let mut book = ReputationBook::new();
        let tally = TradeTally {
            legal_volume: 250,
            ..TradeTally::default()
        };
        assert_eq!(book.apply_trades(SYS, Faction::Federation, tally), 2);
        let tally = TradeTally {
            legal_volume: 10_000,
            ..TradeTally::default()
        };
        assert_eq!(book.apply_trades(SYS, Faction::Federation, tally), 5);
        assert_eq!(book.score(SYS, Faction::Federation), 7);
    }

    #[test]
    fn illegal_trades_feed_the_cartel() {
        let mut book = ReputationBook::new();
        let tally = TradeTally {
            legal_volume: 0,
            illegal_trades: 3,
            rejected_orders: 2,
        };
        assert_eq!(book.apply_trades(SYS, Faction::Empire, tally), -19);
        assert_eq!(book.score(SYS, Faction::Cartel), 6);
    }

    #[test]
    fn cartel_owner_gets_only_its_own_delta() {
        let mut book = ReputationBook::new();
        let tally = TradeTally {
            illegal_trades: 1,
            ..TradeTally::default()
        };
        assert_eq!(book.apply_trades(SYS, Faction::Cartel, tally), -5);
        assert_eq!(book.score(SYS, Faction::Cartel), -5);
    }

    #[test]
    fn extremes_drift_toward_neutral() {
        let mut book = ReputationBook::new();
        book.adjust(SYS, Faction::Empire, 400);
        book.adjust(SYS, Faction::Cartel, -150);
        book.adjust(SYS, Faction::Federation, 50);
        book.adjust(SYS, Faction::Independent, -100);
        book.drift(SYS);
        assert_eq!(book.score(SYS, Faction::Empire), 395);
        assert_eq!(book.score(SYS, Faction::Cartel), -145);
        assert_eq!(book.score(SYS, Faction::Federation), 50);
        assert_eq!(book.score(SYS, Faction::Independent), -95);
    }

    #[test]
    fn for_system_lists_every_faction() {
        let mut book = ReputationBook::new();
        book.adjust(SYS, Faction::Empire, 12);
        let scores = book.for_system(SYS);
        assert_eq!(scores.len(), Faction::ALL.len());
        assert_eq!(scores[&Faction::Empire], 12);
        assert_eq!(scores[&Faction::Cartel], 0);
    }
}
