use std::time::Duration;

use pond_snap_core::{
    CellCoord, Command, Event, FlySnapshot, FlyView, GridSize, Phase, SessionConfig,
};
use pond_snap_system_spawning::{Config, Spawning};
use pond_snap_world::{self as world, query, Session};

fn on_edge(grid: GridSize, cell: CellCoord) -> bool {
    cell.column() == 0
        || cell.row() == 0
        || cell.column() == grid.columns() - 1
        || cell.row() == grid.rows() - 1
}

#[test]
fn emits_one_spawn_per_elapsed_interval() {
    let grid = GridSize::new(6, 5);
    let player = grid.center();
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 0x1234_5678));
    let mut commands = Vec::new();

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(2),
        }],
        Phase::Active,
        grid,
        player,
        &FlyView::default(),
        10,
        &mut commands,
    );

    assert_eq!(commands.len(), 4, "expected one spawn per interval");
    for command in &commands {
        match command {
            Command::SpawnFly { cell } => {
                assert!(on_edge(grid, *cell), "spawn off the edge: {cell:?}");
                assert_ne!(*cell, player, "spawner must avoid the player");
            }
            other => panic!("unexpected command emitted: {other:?}"),
        }
    }
}

#[test]
fn dead_phase_resets_accumulator() {
    let grid = GridSize::new(6, 5);
    let player = grid.center();
    let flies = FlyView::default();
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 0x4d59_5df4));
    let mut commands = Vec::new();

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(400),
        }],
        Phase::Active,
        grid,
        player,
        &flies,
        10,
        &mut commands,
    );
    assert!(commands.is_empty(), "no spawn before a full interval");

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(400),
        }],
        Phase::Dead,
        grid,
        player,
        &flies,
        10,
        &mut commands,
    );
    assert!(commands.is_empty(), "dead sessions never spawn");

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(400),
        }],
        Phase::Active,
        grid,
        player,
        &flies,
        10,
        &mut commands,
    );
    assert!(commands.is_empty(), "accumulator was reset while dead");

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }],
        Phase::Active,
        grid,
        player,
        &flies,
        10,
        &mut commands,
    );
    assert_eq!(commands.len(), 1, "expected spawn after a full interval");
}

#[test]
fn capacity_skips_the_interval() {
    let grid = GridSize::new(6, 5);
    let full = FlyView::from_snapshots(vec![
        FlySnapshot {
            cell: CellCoord::new(0, 0),
            dying: false,
        },
        FlySnapshot {
            cell: CellCoord::new(5, 0),
            dying: false,
        },
    ]);
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 0xfeed));
    let mut commands = Vec::new();

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(600),
        }],
        Phase::Active,
        grid,
        grid.center(),
        &full,
        2,
        &mut commands,
    );

    assert!(commands.is_empty(), "full registry skips the interval");
}

#[test]
fn exhausted_trials_skip_the_interval() {
    // On a 2x1 grid the player blocks one edge cell and a fly the other, so
    // every trial must be rejected.
    let grid = GridSize::new(2, 1);
    let player = grid.center();
    let flies = FlyView::from_snapshots(vec![FlySnapshot {
        cell: CellCoord::new(0, 0),
        dying: false,
    }]);
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 0xbeef));
    let mut commands = Vec::new();

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(500),
        }],
        Phase::Active,
        grid,
        player,
        &flies,
        10,
        &mut commands,
    );

    assert!(commands.is_empty(), "no acceptable edge cell exists");
}

#[test]
fn replay_is_deterministic_and_respects_the_cap() {
    let first = replay(0x4d59_5df4_d0f3_3173);
    let second = replay(0x4d59_5df4_d0f3_3173);
    assert_eq!(first, second, "replay diverged between runs");

    let (commands, fly_count) = first;
    assert!(!commands.is_empty(), "expected spawns during the replay");
    assert!(fly_count <= 4, "session must hold the configured cap");
}

fn replay(seed: u64) -> (Vec<Command>, usize) {
    let config = SessionConfig {
        max_flies: 4,
        ..SessionConfig::default()
    };
    let mut session = Session::new(config);
    let mut spawning = Spawning::new(Config::new(config.spawn_interval, seed));
    let mut log = Vec::new();

    for _ in 0..40 {
        let mut events = Vec::new();
        world::apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );

        let flies = query::fly_view(&session);
        let mut commands = Vec::new();
        spawning.handle(
            &events,
            query::phase(&session),
            query::grid(&session),
            query::player(&session),
            &flies,
            config.max_flies,
            &mut commands,
        );

        for command in commands {
            log.push(command);
            let mut spawn_events = Vec::new();
            world::apply(&mut session, command, &mut spawn_events);
        }
    }

    let grid = query::grid(&session);
    for fly in query::fly_view(&session).iter() {
        assert!(on_edge(grid, fly.cell), "fly off the edge: {:?}", fly.cell);
    }

    (log, query::fly_view(&session).len())
}
