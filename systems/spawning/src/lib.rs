#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that proposes fly placements on grid edges.

use std::time::Duration;

use pond_snap_core::{CellCoord, Command, Event, FlyView, GridSize, Phase};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Bounded number of random edge trials per spawn attempt. Exhausting the
/// trials under high occupancy skips the interval; it is not an error.
const EDGE_TRIALS: usize = 70;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits fly spawn commands.
///
/// The system only proposes placements; the session remains the validator
/// and may reject a proposal that raced with a player move or an earlier
/// spawn in the same batch.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    rng_state: u64,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            rng_state: config.rng_seed,
        }
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// While the session is dead the spawner is suspended and its
    /// accumulator resets, so a restarted driver never observes a burst of
    /// stale spawn attempts.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: Phase,
        grid: GridSize,
        player: CellCoord,
        flies: &FlyView,
        max_flies: u32,
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Active {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.spawn_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts();

        for _ in 0..spawn_attempts {
            if flies.len() >= max_flies as usize {
                continue;
            }
            if let Some(cell) = self.pick_edge_cell(grid, player, flies) {
                out.push(Command::SpawnFly { cell });
            }
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn pick_edge_cell(
        &mut self,
        grid: GridSize,
        player: CellCoord,
        flies: &FlyView,
    ) -> Option<CellCoord> {
        let columns = grid.columns();
        let rows = grid.rows();
        if columns == 0 || rows == 0 {
            return None;
        }

        for _ in 0..EDGE_TRIALS {
            let side = self.advance_rng() % 4;
            let cell = match side {
                0 => CellCoord::new(self.random_index(columns), 0),
                1 => CellCoord::new(columns - 1, self.random_index(rows)),
                2 => CellCoord::new(self.random_index(columns), rows - 1),
                _ => CellCoord::new(0, self.random_index(rows)),
            };

            if cell == player || flies.contains(cell) {
                continue;
            }

            return Some(cell);
        }

        None
    }

    fn random_index(&mut self, bound: u32) -> u32 {
        (self.advance_rng() % u64::from(bound)) as u32
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_spawn_attempts_without_interval() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, 1));
        spawning.accumulator = Duration::from_secs(10);
        assert_eq!(spawning.resolve_spawn_attempts(), 0);
    }

    #[test]
    fn degenerate_grid_yields_no_edge_cell() {
        let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 7));
        let cell = spawning.pick_edge_cell(
            GridSize::new(0, 0),
            CellCoord::new(0, 0),
            &FlyView::default(),
        );
        assert_eq!(cell, None);
    }
}
