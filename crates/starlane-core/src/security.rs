//! Per-system state machine and security level.
//!
//! Both are pure functions of the tick's [`TradeTally`], the owner's
//! reputation and the trade-driven reputation trend, so a replay reproduces
//! every transition exactly.
//!
//! ```text
//! Stable <-> Boom
//!   |  ^
//!   v  |
//! Contested --(below threshold for N ticks)--> Collapsed --(operator)--> Stable
//! ```

use serde::{Deserialize, Serialize};
use starlane_types::{SystemId, SystemSecurity, SystemState};

use crate::config::SecurityConfig;
use crate::reputation::TradeTally;

/// A recorded change of [`SystemState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The system.
    pub system: SystemId,
    /// Tick of the change.
    pub tick: u64,
    /// State before.
    pub from: SystemState,
    /// State after.
    pub to: SystemState,
}

/// Political condition and enforcement of one system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    state: SystemState,
    security_score: u32,
    bad_tick_streak: u32,
    below_threshold_ticks: u32,
}

impl SystemStatus {
    /// A Stable system at the middle of `security`'s band.
    pub const fn new(security: SystemSecurity) -> Self {
        Self {
            state: SystemState::Stable,
            security_score: security.midpoint_score(),
            bad_tick_streak: 0,
            below_threshold_ticks: 0,
        }
    }

    /// Current state.
    pub const fn state(&self) -> SystemState {
        self.state
    }

    /// Current enforcement level.
    pub const fn security(&self) -> SystemSecurity {
        SystemSecurity::from_score(self.security_score)
    }

    /// Raw security score, 0..=[`SystemSecurity::MAX_SCORE`].
    pub const fn security_score(&self) -> u32 {
        self.security_score
    }

    /// Consecutive ticks with illegal trades, rejections or falling
    /// reputation.
    pub const fn bad_tick_streak(&self) -> u32 {
        self.bad_tick_streak
    }

    /// Consecutive Contested ticks with owner reputation below threshold.
    pub const fn below_threshold_ticks(&self) -> u32 {
        self.below_threshold_ticks
    }

    /// Fold one tick's outcome into the status.
    ///
    /// `owner_reputation` is the owner's score after this tick's deltas and
    /// `trend` the trade-driven part of that change. Collapsed systems do
    /// not change.
    pub fn update(
        &mut self,
        system: SystemId,
        tick: u64,
        tally: TradeTally,
        owner_reputation: i32,
        trend: i32,
        config: &SecurityConfig,
    ) -> Option<StateTransition> {
        if self.state == SystemState::Collapsed {
            return None;
        }

        self.security_score = apply_delta(self.security_score, security_delta(tally, trend, config));
        let bad_tick = tally.illegal_trades > 0 || tally.rejected_orders > 0 || trend < 0;
        self.bad_tick_streak = if bad_tick {
            self.bad_tick_streak.saturating_add(1)
        } else {
            0
        };

        let below = owner_reputation < config.contested_threshold;
        let next = match self.state {
            SystemState::Stable | SystemState::Boom => {
                if below || self.bad_tick_streak >= config.bad_tick_limit {
                    self.below_threshold_ticks = u32::from(below);
                    SystemState::Contested
                } else if tally.legal_volume >= config.boom_volume && owner_reputation >= 0 {
                    SystemState::Boom
                } else {
                    SystemState::Stable
                }
            }
            SystemState::Contested if below => {
                self.below_threshold_ticks = self.below_threshold_ticks.saturating_add(1);
                if self.below_threshold_ticks >= config.collapse_after_ticks {
                    SystemState::Collapsed
                } else {
                    SystemState::Contested
                }
            }
            SystemState::Contested => {
                self.below_threshold_ticks = 0;
                if self.bad_tick_streak == 0 {
                    SystemState::Stable
                } else {
                    SystemState::Contested
                }
            }
            SystemState::Collapsed => SystemState::Collapsed,
        };
        self.transition(system, tick, next)
    }

    /// Reopen a collapsed system. Only operator intervention calls this.
    pub fn restore(&mut self, system: SystemId, tick: u64) -> Option<StateTransition> {
        if self.state != SystemState::Collapsed {
            return None;
        }
        self.bad_tick_streak = 0;
        self.below_threshold_ticks = 0;
        self.transition(system, tick, SystemState::Stable)
    }

    fn transition(&mut self, system: SystemId, tick: u64, next: SystemState) -> Option<StateTransition> {
        if next == self.state {
            return None;
        }
        let change = StateTransition {
            system,
            tick,
            from: self.state,
            to: next,
        };
        self.state = next;
        if next == SystemState::Collapsed {
            tracing::warn!(tick, system_id = %system, from = ?change.from, "System collapsed");
        } else {
            tracing::info!(tick, system_id = %system, from = ?change.from, to = ?next, "System state changed");
        }
        Some(change)
    }
}

/// Change in security score for one tick.
///
/// A clean tick (legal trades only) scores +1 and is never penalized; an
/// idle tick scores 0.
pub fn security_delta(tally: TradeTally, trend: i32, config: &SecurityConfig) -> i64 {
    if tally.is_clean() {
        return 1;
    }
    let illegal = i64::from(tally.illegal_trades).saturating_mul(i64::from(config.illegal_trade_penalty));
    let rejected =
        i64::from(tally.rejected_orders).saturating_mul(i64::from(config.rejected_order_penalty));
    let falling = if trend < 0 {
        i64::from(config.reputation_trend_penalty)
    } else {
        0
    };
    0_i64
        .saturating_sub(illegal)
        .saturating_sub(rejected)
        .saturating_sub(falling)
}

fn apply_delta(score: u32, delta: i64) -> u32 {
    let next = i64::from(score)
        .saturating_add(delta)
        .clamp(0, i64::from(SystemSecurity::MAX_SCORE));
    u32::try_from(next).unwrap_or(SystemSecurity::MAX_SCORE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const SYS: SystemId = SystemId::new(0, 0);

    fn clean(volume: u64) -> TradeTally {
        TradeTally {
            legal_volume: volume,
            ..TradeTally::default()
        }
    }

    fn dirty(illegal: u32) -> TradeTally {
        TradeTally {
            legal_volume: 10,
            illegal_trades: illegal,
            rejected_orders: 0,
        }
    }

    #[test]
    fn clean_ticks_raise_security() {
        let config = SecurityConfig::default();
        let mut status = SystemStatus::new(SystemSecurity::Low);
        for tick in 1..=20 {
            assert_eq!(status.update(SYS, tick, clean(10), 0, 0, &config), None);
        }
        assert_eq!(status.security_score(), 57);
        assert_eq!(status.security(), SystemSecurity::Medium);
    }

    #[test]
    fn penalties_sum() {
        let config = SecurityConfig::default();
        let tally = TradeTally {
            legal_volume: 5,
            illegal_trades: 2,
            rejected_orders: 3,
        };
        assert_eq!(security_delta(tally, -1, &config), -8);
        assert_eq!(security_delta(TradeTally::default(), 0, &config), 0);
    }

    #[test]
    fn high_volume_booms_and_quiet_returns_to_stable() {
        let config = SecurityConfig::default();
        let mut status = SystemStatus::new(SystemSecurity::Medium);
        let change = status.update(SYS, 1, clean(config.boom_volume), 0, 0, &config).unwrap();
        assert_eq!(change.to, SystemState::Boom);
        let change = status.update(SYS, 2, clean(1), 0, 0, &config).unwrap();
        assert_eq!((change.from, change.to), (SystemState::Boom, SystemState::Stable));
    }

    #[test]
    fn bad_streak_contests_then_recovers() {
        let config = SecurityConfig::default();
        let mut status = SystemStatus::new(SystemSecurity::High);
        let mut changes = Vec::new();
        for tick in 1..=u64::from(config.bad_tick_limit) {
            changes.extend(status.update(SYS, tick, dirty(1), 0, -5, &config));
        }
        assert_eq!(status.state(), SystemState::Contested);
        assert_eq!(changes.len(), 1);
        assert_eq!(status.below_threshold_ticks(), 0);

        let change = status.update(SYS, 99, clean(10), 0, 0, &config).unwrap();
        assert_eq!(change.to, SystemState::Stable);
    }

    #[test]
    fn low_reputation_collapses_after_limit() {
        let config = SecurityConfig::default();
        let rep = config.contested_threshold - 1;
        let mut status = SystemStatus::new(SystemSecurity::Medium);
        let first = status.update(SYS, 1, TradeTally::default(), rep, 0, &config).unwrap();
        assert_eq!(first.to, SystemState::Contested);
        assert_eq!(status.below_threshold_ticks(), 1);

        let mut collapse = None;
        for tick in 2..=u64::from(config.collapse_after_ticks) {
            collapse = status.update(SYS, tick, TradeTally::default(), rep, 0, &config);
        }
        let collapse = collapse.unwrap();
        assert_eq!(collapse.to, SystemState::Collapsed);
        assert_eq!(collapse.tick, u64::from(config.collapse_after_ticks));

        // Collapsed is terminal until restored.
        assert_eq!(status.update(SYS, 50, clean(500), 900, 5, &config), None);
        assert_eq!(status.state(), SystemState::Collapsed);
        let restored = status.restore(SYS, 51).unwrap();
        assert_eq!(restored.to, SystemState::Stable);
        assert_eq!(status.restore(SYS, 52), None);
    }

    #[test]
    fn recovery_resets_the_collapse_count() {
        let config = SecurityConfig::default();
        let low = config.contested_threshold - 1;
        let mut status = SystemStatus::new(SystemSecurity::Medium);
        status.update(SYS, 1, TradeTally::default(), low, 0, &config);
        status.update(SYS, 2, TradeTally::default(), low, 0, &config);
        status.update(SYS, 3, dirty(1), 0, -5, &config);
        assert_eq!(status.state(), SystemState::Contested);
        assert_eq!(status.below_threshold_ticks(), 0);
    }

    proptest! {
        #[test]
        fn legal_only_ticks_never_lower_security(
            volumes in proptest::collection::vec(0_u64..400, 1..60),
            start in 0_u32..=SystemSecurity::MAX_SCORE,
        ) {
            let config = SecurityConfig::default();
            let mut status = SystemStatus {
                state: SystemState::Stable,
                security_score: start,
                bad_tick_streak: 0,
                below_threshold_ticks: 0,
            };
            let mut level = status.security();
            for (tick, volume) in (1_u64..).zip(volumes) {
                status.update(SYS, tick, clean(volume), 0, 0, &config);
                prop_assert!(status.security() >= level);
                prop_assert!(status.state().is_open());
                level = status.security();
            }
        }
    }
}
