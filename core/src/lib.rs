#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pond Snap engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the session executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values for
//! systems and presenters to react to deterministically. Systems consume
//! event streams, query immutable snapshots, and respond exclusively with
//! new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Pond Snap.";

/// Default number of grid columns on the pond.
pub const DEFAULT_GRID_COLUMNS: u32 = 6;
/// Default number of grid rows on the pond.
pub const DEFAULT_GRID_ROWS: u32 = 5;
/// Default cadence at which the spawner attempts to place a fly.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(550);
/// Default cap on concurrently alive flies.
pub const DEFAULT_MAX_FLIES: u32 = 10;
/// Default number of kills inside the reward window that trigger a flash.
pub const DEFAULT_REWARD_KILLS_REQUIRED: u32 = 5;
/// Default trailing window inspected by the reward tracker.
pub const DEFAULT_REWARD_WINDOW: Duration = Duration::from_millis(3_600_000);

/// Describes whether the session is still accepting gameplay mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The player is alive and commands mutate the session.
    Active,
    /// Terminal state; every gameplay command is a no-op.
    Dead,
}

/// Selects how a snap trigger resolves against the surrounding cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackMode {
    /// A snap resolves only the direction carried by the intent.
    Directional,
    /// Any snap trigger resolves all eight directions in order.
    Cascade,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the player slide one cell in the given direction.
    Move {
        /// Direction of the attempted move.
        step: Step,
    },
    /// Requests that the player snap at adjacent cells.
    Snap {
        /// Direction carried by the intent; ignored in cascade mode.
        step: Step,
    },
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of real time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a fly be placed on the provided cell.
    SpawnFly {
        /// Cell chosen by the spawner for the new fly.
        cell: CellCoord,
    },
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player slid onto a new cell.
    PlayerMoved {
        /// Cell the player occupies after the move.
        cell: CellCoord,
    },
    /// Announces that the session entered its terminal state.
    PlayerDied {
        /// What ended the session.
        cause: DeathCause,
        /// Kill count at the moment of death.
        kills: u32,
    },
    /// Confirms that a fly was placed on the pond.
    FlySpawned {
        /// Cell the fly occupies; the cell is also the fly's identity.
        cell: CellCoord,
    },
    /// Confirms that a snap removed a fly from the pond.
    FlyKilled {
        /// Snapshot of the removed fly, marked dying.
        fly: FlySnapshot,
        /// Session time at which the kill landed.
        at: Duration,
        /// Kill count after this kill.
        kills: u32,
    },
    /// Reports the outcome of one resolved snap direction.
    ///
    /// Emitted for every resolved direction regardless of outcome so a
    /// presenter can always draw the snap visual.
    SnapResolved {
        /// Direction the snap resolved toward.
        step: Step,
        /// Result of the resolution.
        outcome: SnapOutcome,
    },
    /// Announces that enough kills landed inside the reward window.
    RewardTriggered {
        /// Kill count at the moment the reward fired.
        kills: u32,
    },
    /// Reports the final score evaluation after the player died.
    FinalScorePosted {
        /// Kill count the session ended with.
        kills: u32,
        /// Whether the session beat the stored high score.
        new_high: bool,
    },
}

/// Result of resolving a single snap direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapOutcome {
    /// The target cell held a fly and the fly was removed.
    Hit,
    /// The target cell was empty.
    Miss,
    /// The target cell lies outside the grid.
    Edge,
}

/// What ended a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// The player slid onto a cell occupied by a fly.
    SteppedOntoFly,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// One of the eight directions a move or snap intent can carry.
///
/// A step is adjacent when neither component magnitude exceeds one and the
/// components are not both zero. Raw gesture data may produce non-adjacent
/// steps; validation happens where intents are consumed, never where they
/// are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    dx: i32,
    dy: i32,
}

impl Step {
    /// The eight adjacent directions in presenter order, starting east and
    /// winding clockwise with rows growing downward.
    pub const ALL: [Self; 8] = [
        Self::new(1, 0),
        Self::new(1, 1),
        Self::new(0, 1),
        Self::new(-1, 1),
        Self::new(-1, 0),
        Self::new(-1, -1),
        Self::new(0, -1),
        Self::new(1, -1),
    ];

    /// Creates a step from raw column and row deltas.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Column delta of the step.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Row delta of the step.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Reports whether the step addresses one of the eight adjacent cells.
    #[must_use]
    pub const fn is_adjacent(&self) -> bool {
        (self.dx != 0 || self.dy != 0) && self.dx.abs() <= 1 && self.dy.abs() <= 1
    }
}

/// Dimensions of the pond grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Cell at the centre of the grid, where the player starts.
    ///
    /// Degenerate grids resolve to cell (0, 0).
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        CellCoord::new(self.columns / 2, self.rows / 2)
    }

    /// Applies a step to a cell, clamping each axis independently into the
    /// grid range. A move blocked by the grid edge therefore resolves to a
    /// destination equal to the origin on that axis.
    #[must_use]
    pub fn clamp_step(&self, cell: CellCoord, step: Step) -> CellCoord {
        CellCoord::new(
            clamp_axis(cell.column(), step.dx(), self.columns),
            clamp_axis(cell.row(), step.dy(), self.rows),
        )
    }

    /// Applies a step to a cell without clamping, yielding `None` when the
    /// target lies outside the grid. Snap targets use this so edge shots
    /// can be reported distinctly from misses.
    #[must_use]
    pub fn step_target(&self, cell: CellCoord, step: Step) -> Option<CellCoord> {
        let column = cell.column().checked_add_signed(step.dx())?;
        let row = cell.row().checked_add_signed(step.dy())?;
        let target = CellCoord::new(column, row);
        self.contains(target).then_some(target)
    }
}

fn clamp_axis(value: u32, delta: i32, bound: u32) -> u32 {
    let max = bound.saturating_sub(1);
    value.saturating_add_signed(delta).min(max)
}

/// Configuration supplied when constructing a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Dimensions of the pond grid.
    pub grid: GridSize,
    /// Cadence at which the spawner attempts to place a fly.
    pub spawn_interval: Duration,
    /// Cap on concurrently alive flies.
    pub max_flies: u32,
    /// Kills required inside the reward window to trigger a flash.
    pub reward_kills_required: u32,
    /// Trailing window inspected by the reward tracker.
    pub reward_window: Duration,
    /// How snap triggers resolve against the surrounding cells.
    pub attack_mode: AttackMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            max_flies: DEFAULT_MAX_FLIES,
            reward_kills_required: DEFAULT_REWARD_KILLS_REQUIRED,
            reward_window: DEFAULT_REWARD_WINDOW,
            attack_mode: AttackMode::Directional,
        }
    }
}

/// Immutable representation of a single fly used for queries and events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlySnapshot {
    /// Cell the fly occupies; also its identity.
    pub cell: CellCoord,
    /// Set once the fly has been removed so a presenter cannot process the
    /// same removal twice.
    pub dying: bool,
}

/// Read-only snapshot describing all flies on the pond.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlyView {
    snapshots: Vec<FlySnapshot>,
}

impl FlyView {
    /// Creates a new fly view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<FlySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.cell);
        Self { snapshots }
    }

    /// Iterator over the captured fly snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &FlySnapshot> {
        self.snapshots.iter()
    }

    /// Number of flies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no flies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Reports whether a fly occupies the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.snapshots
            .binary_search_by_key(&cell, |snapshot| snapshot.cell)
            .is_ok()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<FlySnapshot> {
        self.snapshots
    }
}

/// Failures surfaced by a high-score store implementation.
///
/// The engine treats every persistence failure as non-fatal; the score is
/// still held in memory for the rest of the session.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backing store could not be reached or written.
    #[error("high score store unavailable: {0}")]
    Unavailable(String),
    /// The backing store held data that does not parse as a score.
    #[error("stored high score is malformed: {0}")]
    Malformed(String),
}

/// Port through which the engine loads and persists the high score.
pub trait HighScoreStore {
    /// Loads the stored high score, zero when nothing was stored yet.
    fn load(&mut self) -> Result<u32, PersistenceError>;

    /// Persists a new high score.
    fn save(&mut self, score: u32) -> Result<(), PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::{AttackMode, CellCoord, FlySnapshot, FlyView, GridSize, SessionConfig, Step};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn all_eight_steps_are_adjacent_and_distinct() {
        for (index, step) in Step::ALL.iter().enumerate() {
            assert!(step.is_adjacent(), "step {index} should be adjacent");
        }
        for second in 1..Step::ALL.len() {
            assert!(!Step::ALL[..second].contains(&Step::ALL[second]));
        }
    }

    #[test]
    fn zero_and_long_steps_are_not_adjacent() {
        assert!(!Step::new(0, 0).is_adjacent());
        assert!(!Step::new(2, 0).is_adjacent());
        assert!(!Step::new(0, -2).is_adjacent());
        assert!(!Step::new(1, 2).is_adjacent());
    }

    #[test]
    fn clamp_step_blocks_at_grid_edges() {
        let grid = GridSize::new(6, 5);
        let corner = CellCoord::new(0, 0);
        assert_eq!(grid.clamp_step(corner, Step::new(-1, 0)), corner);
        assert_eq!(grid.clamp_step(corner, Step::new(-1, -1)), corner);

        let far = CellCoord::new(5, 4);
        assert_eq!(grid.clamp_step(far, Step::new(1, 1)), far);
        assert_eq!(
            grid.clamp_step(CellCoord::new(3, 2), Step::new(1, -1)),
            CellCoord::new(4, 1)
        );
    }

    #[test]
    fn step_target_rejects_cells_outside_the_grid() {
        let grid = GridSize::new(6, 5);
        assert_eq!(
            grid.step_target(CellCoord::new(0, 0), Step::new(-1, 0)),
            None
        );
        assert_eq!(
            grid.step_target(CellCoord::new(5, 4), Step::new(0, 1)),
            None
        );
        assert_eq!(
            grid.step_target(CellCoord::new(3, 2), Step::new(1, 0)),
            Some(CellCoord::new(4, 2))
        );
    }

    #[test]
    fn default_configuration_starts_the_player_at_the_centre() {
        let config = SessionConfig::default();
        assert_eq!(config.grid.center(), CellCoord::new(3, 2));
    }

    #[test]
    fn degenerate_grid_clamps_without_panicking() {
        let grid = GridSize::new(0, 0);
        let origin = CellCoord::new(0, 0);
        assert!(!grid.contains(origin));
        assert_eq!(grid.clamp_step(origin, Step::new(1, 1)), origin);
        assert_eq!(grid.step_target(origin, Step::new(1, 0)), None);
    }

    #[test]
    fn fly_view_orders_and_finds_cells() {
        let view = FlyView::from_snapshots(vec![
            FlySnapshot {
                cell: CellCoord::new(4, 1),
                dying: false,
            },
            FlySnapshot {
                cell: CellCoord::new(0, 3),
                dying: false,
            },
        ]);

        assert_eq!(view.len(), 2);
        assert!(view.contains(CellCoord::new(4, 1)));
        assert!(view.contains(CellCoord::new(0, 3)));
        assert!(!view.contains(CellCoord::new(2, 2)));

        let cells: Vec<CellCoord> = view.iter().map(|snapshot| snapshot.cell).collect();
        assert_eq!(cells, vec![CellCoord::new(0, 3), CellCoord::new(4, 1)]);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(3, 2));
    }

    #[test]
    fn attack_mode_round_trips_through_bincode() {
        assert_round_trip(&AttackMode::Cascade);
    }
}
