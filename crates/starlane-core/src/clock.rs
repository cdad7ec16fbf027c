//! Simulation clock and time tracking.
//!
//! The clock is the sole sequencing authority of a run. It counts completed
//! ticks and maps them to simulated seconds. All derivations use checked
//! arithmetic; the tick number is the only stored state.

use crate::config::ClockConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid clock configuration (zero tick duration).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Tick counter of a simulation run.
///
/// Tick 0 is the generated state before any trading. The clock advances at
/// the start of each tick, so the first tick to run is tick 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationClock {
    /// Last tick started.
    tick: u64,

    /// Simulated seconds per tick.
    tick_duration_secs: u64,
}

impl SimulationClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the tick duration is zero.
    pub fn new(config: &ClockConfig) -> Result<Self, ClockError> {
        Self::from_parts(0, config.tick_duration_secs)
    }

    /// Create a clock from explicit parameters (useful for testing and
    /// state restoration).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `tick_duration_secs` is 0.
    pub fn from_parts(tick: u64, tick_duration_secs: u64) -> Result<Self, ClockError> {
        if tick_duration_secs == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "tick_duration_secs must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            tick,
            tick_duration_secs,
        })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Return the configured tick duration.
    pub const fn tick_duration_secs(&self) -> u64 {
        self.tick_duration_secs
    }

    /// Simulated seconds elapsed since tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the product does not fit in
    /// a `u64`.
    pub fn elapsed_secs(&self) -> Result<u64, ClockError> {
        self.tick
            .checked_mul(self.tick_duration_secs)
            .ok_or(ClockError::TickOverflow)
    }
}
