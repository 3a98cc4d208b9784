#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic tick source that converts elapsed shell time into discrete
//! movement ticks.

use std::time::Duration;

use courier_core::Command;

/// Configuration parameters required to construct the ticker system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    tick_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided tick cadence.
    #[must_use]
    pub const fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }
}

/// Pure system that accumulates elapsed time and emits tick commands.
///
/// Shells report however much wall-clock or simulated time passed since the
/// previous frame; the ticker translates that into zero or more
/// [`Command::Tick`] values so the world only ever observes whole movement
/// steps. A zero interval disables ticking entirely.
#[derive(Debug)]
pub struct Ticker {
    tick_interval: Duration,
    accumulator: Duration,
}

impl Ticker {
    /// Creates a new ticker system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes elapsed time and emits one tick command per full interval.
    pub fn handle(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.tick_interval.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= self.tick_interval {
            self.accumulator -= self.tick_interval;
            out.push(Command::Tick);
        }
    }
}
