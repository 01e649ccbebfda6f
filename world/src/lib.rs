#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Pond Snap.

use std::{collections::BTreeMap, time::Duration};

use log::debug;
use pond_snap_core::{
    AttackMode, CellCoord, Command, DeathCause, Event, FlySnapshot, Phase, SessionConfig,
    SnapOutcome, Step, WELCOME_BANNER,
};

/// Represents the authoritative Pond Snap session state.
///
/// A session is constructed once per run and replaced wholesale on restart;
/// there is no in-place reset. All mutation flows through [`apply`].
#[derive(Debug)]
pub struct Session {
    banner: &'static str,
    config: SessionConfig,
    player: CellCoord,
    flies: FlyRegistry,
    kills: u32,
    elapsed: Duration,
    phase: Phase,
}

impl Session {
    /// Creates a new session with the player at the grid centre.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            player: config.grid.center(),
            flies: FlyRegistry::default(),
            kills: 0,
            elapsed: Duration::ZERO,
            phase: Phase::Active,
            config,
        }
    }

    fn resolve_move(&mut self, step: Step, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Dead {
            return;
        }
        if !step.is_adjacent() {
            debug!("discarding non-adjacent move intent ({}, {})", step.dx(), step.dy());
            return;
        }

        let destination = self.config.grid.clamp_step(self.player, step);
        if destination == self.player {
            return;
        }

        self.player = destination;
        out_events.push(Event::PlayerMoved { cell: destination });

        // Moving into a fly is lethal, never blocked.
        if self.flies.contains(destination) {
            self.die(DeathCause::SteppedOntoFly, out_events);
        }
    }

    fn resolve_snap(&mut self, step: Step, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Dead {
            return;
        }
        if !step.is_adjacent() {
            debug!("discarding non-adjacent snap intent ({}, {})", step.dx(), step.dy());
            return;
        }

        match self.config.attack_mode {
            AttackMode::Directional => self.resolve_snap_direction(step, out_events),
            AttackMode::Cascade => {
                for direction in Step::ALL {
                    self.resolve_snap_direction(direction, out_events);
                }
            }
        }
    }

    fn resolve_snap_direction(&mut self, step: Step, out_events: &mut Vec<Event>) {
        let outcome = match self.config.grid.step_target(self.player, step) {
            None => SnapOutcome::Edge,
            Some(target) => match self.flies.remove(target) {
                Some(fly) => {
                    self.kills = self.kills.saturating_add(1);
                    out_events.push(Event::FlyKilled {
                        fly,
                        at: self.elapsed,
                        kills: self.kills,
                    });
                    SnapOutcome::Hit
                }
                None => SnapOutcome::Miss,
            },
        };

        out_events.push(Event::SnapResolved { step, outcome });
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Dead {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });
    }

    fn place_fly(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if self.phase == Phase::Dead {
            return;
        }
        if !self.config.grid.contains(cell) {
            debug!("rejecting spawn outside the grid at ({}, {})", cell.column(), cell.row());
            return;
        }
        if self.flies.len() >= self.config.max_flies as usize {
            debug!("fly cap reached, skipping spawn");
            return;
        }
        if cell == self.player || self.flies.contains(cell) {
            debug!("rejecting spawn on occupied cell ({}, {})", cell.column(), cell.row());
            return;
        }

        self.flies.insert(cell);
        out_events.push(Event::FlySpawned { cell });
    }

    fn die(&mut self, cause: DeathCause, out_events: &mut Vec<Event>) {
        self.phase = Phase::Dead;
        out_events.push(Event::PlayerDied {
            cause,
            kills: self.kills,
        });
    }
}

/// Applies the provided command to the session, mutating state deterministically.
///
/// Once the session is dead every command is a no-op; callers keep a single
/// ordered event sink so systems observe mutations in the order they landed.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Move { step } => session.resolve_move(step, out_events),
        Command::Snap { step } => session.resolve_snap(step, out_events),
        Command::Tick { dt } => session.advance_clock(dt, out_events),
        Command::SpawnFly { cell } => session.place_fly(cell, out_events),
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use super::Session;
    use pond_snap_core::{CellCoord, FlyView, GridSize, Phase, SessionConfig};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(session: &Session) -> &'static str {
        session.banner
    }

    /// Provides read-only access to the configuration the session was built with.
    #[must_use]
    pub fn config(session: &Session) -> &SessionConfig {
        &session.config
    }

    /// Dimensions of the pond grid.
    #[must_use]
    pub fn grid(session: &Session) -> GridSize {
        session.config.grid
    }

    /// Reports whether the session is still accepting gameplay mutations.
    #[must_use]
    pub fn phase(session: &Session) -> Phase {
        session.phase
    }

    /// Cell the player currently occupies.
    #[must_use]
    pub fn player(session: &Session) -> CellCoord {
        session.player
    }

    /// Number of flies killed so far.
    #[must_use]
    pub fn kills(session: &Session) -> u32 {
        session.kills
    }

    /// Session time accumulated through ticks.
    #[must_use]
    pub fn elapsed(session: &Session) -> Duration {
        session.elapsed
    }

    /// Captures a read-only view of the flies on the pond.
    #[must_use]
    pub fn fly_view(session: &Session) -> FlyView {
        FlyView::from_snapshots(session.flies.snapshots())
    }
}

#[derive(Clone, Copy, Debug)]
struct Fly {
    dying: bool,
}

/// Mapping of occupied cells to flies; a fly's identity is its cell for the
/// whole registry lifetime.
#[derive(Debug, Default)]
struct FlyRegistry {
    flies: BTreeMap<CellCoord, Fly>,
}

impl FlyRegistry {
    fn contains(&self, cell: CellCoord) -> bool {
        self.flies.contains_key(&cell)
    }

    fn len(&self) -> usize {
        self.flies.len()
    }

    fn insert(&mut self, cell: CellCoord) {
        let _ = self.flies.insert(cell, Fly { dying: false });
    }

    fn remove(&mut self, cell: CellCoord) -> Option<FlySnapshot> {
        self.flies.remove(&cell).map(|mut fly| {
            fly.dying = true;
            FlySnapshot {
                cell,
                dying: fly.dying,
            }
        })
    }

    fn snapshots(&self) -> Vec<FlySnapshot> {
        self.flies
            .iter()
            .map(|(cell, fly)| FlySnapshot {
                cell: *cell,
                dying: fly.dying,
            })
            .collect()
    }
}
