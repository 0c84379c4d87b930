//! Runtime settings for a simulation run
//!
//! Fleet size and the state machine thresholds are fixed constants; only the
//! pacing and the random source can be tuned.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use super::types::TICK_PERIOD_MS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Time between ticks
    pub tick_period: Duration,
    /// Stop after this many ticks, or run until shutdown when `None`
    pub max_ticks: Option<u64>,
    /// Seed for reproducible runs, OS entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(TICK_PERIOD_MS),
            max_ticks: None,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Random source for the run, seeded when a seed is configured
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
