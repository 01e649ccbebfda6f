#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Pond Snap experience.
//!
//! The adapter owns every impure concern: the monotonic clock, the spawner
//! seed, terminal IO and the high-score file. Text commands stand in for
//! pad gestures and flow through the same slide-pad and intent-channel path
//! a pointer-driven presenter would use; each line of input drives exactly
//! one simulation frame.

mod score_transfer;
mod store;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::warn;
use pond_snap_core::{
    AttackMode, Command, DeathCause, Event, GridSize, HighScoreStore, Phase, SessionConfig,
    SnapOutcome, Step, DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_MAX_FLIES,
    DEFAULT_REWARD_KILLS_REQUIRED, DEFAULT_REWARD_WINDOW, DEFAULT_SPAWN_INTERVAL,
};
use pond_snap_system_input::{
    intent_channel, IntentReceiver, IntentSender, SlidePad, SlidePadConfig, DEFAULT_DEAD_ZONE,
};
use pond_snap_system_scoring::{Config as ScoringConfig, Scoring};
use pond_snap_system_spawning::{Config as SpawningConfig, Spawning};
use pond_snap_world::{self as world, query, Session};

use score_transfer::ScoreCode;
use store::FileHighScoreStore;

/// Drag distance in pad units used when a text command stands in for a gesture.
const PAD_DRAG: f32 = 24.0;
/// Re-emit cooldown applied to the move pad, matching the slide gesture feel.
const MOVE_COOLDOWN: Duration = Duration::from_millis(140);

/// Command-line options accepted by the Pond Snap binary.
#[derive(Debug, Parser)]
#[command(name = "pond-snap", about = "Grid arcade: slide, snap flies, chase the flash.")]
struct Args {
    /// Number of grid columns on the pond.
    #[arg(long, default_value_t = DEFAULT_GRID_COLUMNS)]
    columns: u32,

    /// Number of grid rows on the pond.
    #[arg(long, default_value_t = DEFAULT_GRID_ROWS)]
    rows: u32,

    /// Milliseconds between fly spawn attempts.
    #[arg(long, default_value_t = DEFAULT_SPAWN_INTERVAL.as_millis() as u64)]
    spawn_interval_ms: u64,

    /// Cap on concurrently alive flies.
    #[arg(long, default_value_t = DEFAULT_MAX_FLIES)]
    max_flies: u32,

    /// Kills required inside the reward window to trigger a flash.
    #[arg(long, default_value_t = DEFAULT_REWARD_KILLS_REQUIRED)]
    reward_kills: u32,

    /// Width of the reward window in milliseconds.
    #[arg(long, default_value_t = DEFAULT_REWARD_WINDOW.as_millis() as u64)]
    reward_window_ms: u64,

    /// How snap triggers resolve against the surrounding cells.
    #[arg(long, value_enum, default_value_t = AttackModeArg::Directional)]
    attack_mode: AttackModeArg,

    /// Seed for the spawner; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Path of the high-score file.
    #[arg(long, default_value = "pond-snap-high-score.json")]
    high_score_file: PathBuf,

    /// Decode a share code and exit.
    #[arg(long, value_name = "CODE")]
    inspect_code: Option<String>,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            grid: GridSize::new(self.columns, self.rows),
            spawn_interval: Duration::from_millis(self.spawn_interval_ms),
            max_flies: self.max_flies,
            reward_kills_required: self.reward_kills,
            reward_window: Duration::from_millis(self.reward_window_ms),
            attack_mode: self.attack_mode.into(),
        }
    }
}

/// Snap resolution modes selectable from the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum AttackModeArg {
    /// A snap resolves only the direction of the gesture.
    Directional,
    /// Any snap trigger resolves all eight directions.
    Cascade,
}

impl From<AttackModeArg> for AttackMode {
    fn from(value: AttackModeArg) -> Self {
        match value {
            AttackModeArg::Directional => Self::Directional,
            AttackModeArg::Cascade => Self::Cascade,
        }
    }
}

enum Input {
    Move(Step),
    Snap(Step),
    Wait(Duration),
    Quit,
}

/// Entry point for the Pond Snap command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(code) = args.inspect_code.as_deref() {
        return inspect_code(code);
    }

    let config = args.session_config();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut store = FileHighScoreStore::new(args.high_score_file.clone());
    let high_score = match store.load() {
        Ok(score) => score,
        Err(error) => {
            warn!("starting without a stored high score: {error}");
            0
        }
    };

    let mut session = Session::new(config);
    let mut spawning = Spawning::new(SpawningConfig::new(config.spawn_interval, seed));
    let mut scoring = Scoring::new(
        ScoringConfig::new(config.reward_kills_required, config.reward_window),
        high_score,
    );

    let (move_sender, move_intents) = intent_channel();
    let (snap_sender, snap_intents) = intent_channel();
    let mut move_pad = SlidePad::new(SlidePadConfig::new(DEFAULT_DEAD_ZONE, MOVE_COOLDOWN));
    let mut snap_pad = SlidePad::new(SlidePadConfig::default());

    println!("{}", query::welcome_banner(&session));
    println!("High: {}", scoring.high_score());
    println!("Commands: move <dir>, snap <dir>, wait <ms>, quit. Directions: e se s sw w nw n ne.");

    let started = Instant::now();
    let mut consumed = Duration::ZERO;
    let mut clock = Duration::ZERO;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read a command from stdin")?;

        let mut waited = Duration::ZERO;
        match parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(Input::Quit)) => break,
            Ok(Some(Input::Wait(duration))) => waited = duration,
            Ok(Some(Input::Move(step))) => gesture(&mut move_pad, step, clock, &move_sender),
            Ok(Some(Input::Snap(step))) => gesture(&mut snap_pad, step, clock, &snap_sender),
            Err(message) => {
                println!("{message}");
                continue;
            }
        }

        let real = started.elapsed();
        let dt = real.saturating_sub(consumed).saturating_add(waited);
        consumed = real;
        clock = clock.saturating_add(dt);

        let events = run_frame(
            &mut session,
            &mut spawning,
            &mut scoring,
            &mut store,
            &move_intents,
            &snap_intents,
            dt,
        );
        present(&session, &events);

        if query::phase(&session) == Phase::Dead {
            break;
        }
    }

    Ok(())
}

/// Runs one simulation frame: at most one move and one snap intent, a tick,
/// the spawner pass, then the scoring pass over everything the frame emitted.
fn run_frame(
    session: &mut Session,
    spawning: &mut Spawning,
    scoring: &mut Scoring,
    store: &mut FileHighScoreStore,
    move_intents: &IntentReceiver,
    snap_intents: &IntentReceiver,
    dt: Duration,
) -> Vec<Event> {
    let mut events = Vec::new();

    if let Some(step) = move_intents.pop() {
        world::apply(session, Command::Move { step }, &mut events);
    }
    if let Some(step) = snap_intents.pop() {
        world::apply(session, Command::Snap { step }, &mut events);
    }
    world::apply(session, Command::Tick { dt }, &mut events);

    let flies = query::fly_view(session);
    let mut commands = Vec::new();
    spawning.handle(
        &events,
        query::phase(session),
        query::grid(session),
        query::player(session),
        &flies,
        query::config(session).max_flies,
        &mut commands,
    );
    for command in commands {
        world::apply(session, command, &mut events);
    }

    let mut scored = Vec::new();
    scoring.handle(&events, store, &mut scored);
    events.extend(scored);
    events
}

fn present(session: &Session, events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { .. } => {}
            Event::PlayerMoved { cell } => {
                println!("moved to ({}, {})", cell.column(), cell.row());
            }
            Event::FlySpawned { cell } => {
                println!("a fly lands on ({}, {})", cell.column(), cell.row());
            }
            Event::FlyKilled { fly, kills, .. } => {
                println!(
                    "fly eaten on ({}, {}), points: {kills}",
                    fly.cell.column(),
                    fly.cell.row()
                );
            }
            Event::SnapResolved { step, outcome } => {
                let label = match outcome {
                    SnapOutcome::Hit => "HIT",
                    SnapOutcome::Miss => "miss",
                    SnapOutcome::Edge => "edge",
                };
                println!("snap ({}, {}): {label}", step.dx(), step.dy());
            }
            Event::RewardTriggered { kills } => {
                println!("FLASH! {kills} points and a new look");
            }
            Event::PlayerDied { cause, kills } => {
                let reason = match cause {
                    DeathCause::SteppedOntoFly => "stepped onto a fly",
                };
                println!("DEAD: {reason}. Points: {kills}.");
            }
            Event::FinalScorePosted { kills, new_high } => {
                if *new_high {
                    println!("NEW HIGH SCORE: {kills}");
                }
                let config = query::config(session);
                let code = ScoreCode {
                    grid: config.grid,
                    kills: *kills,
                    duration_ms: query::elapsed(session).as_millis() as u64,
                    attack_mode: config.attack_mode,
                };
                println!("share code: {}", code.encode());
            }
        }
    }
}

fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let mut parts = line.split_whitespace();
    let Some(keyword) = parts.next() else {
        return Ok(None);
    };

    let input = match keyword {
        "move" | "mv" => Input::Move(parse_direction(parts.next())?),
        "snap" | "at" => Input::Snap(parse_direction(parts.next())?),
        "wait" => {
            let millis = parts
                .next()
                .and_then(|value| value.parse::<u64>().ok())
                .ok_or_else(|| "wait needs a duration in milliseconds".to_owned())?;
            Input::Wait(Duration::from_millis(millis))
        }
        "quit" | "q" => Input::Quit,
        other => return Err(format!("unknown command: {other}")),
    };

    if parts.next().is_some() {
        return Err(format!("trailing input after {keyword}"));
    }
    Ok(Some(input))
}

fn parse_direction(name: Option<&str>) -> Result<Step, String> {
    let name = name.ok_or_else(|| "expected a direction: e se s sw w nw n ne".to_owned())?;
    let step = match name {
        "e" => Step::new(1, 0),
        "se" => Step::new(1, 1),
        "s" => Step::new(0, 1),
        "sw" => Step::new(-1, 1),
        "w" => Step::new(-1, 0),
        "nw" => Step::new(-1, -1),
        "n" => Step::new(0, -1),
        "ne" => Step::new(1, -1),
        other => return Err(format!("unknown direction: {other}")),
    };
    Ok(step)
}

/// Replays a text command through the slide pad as a synthetic drag so the
/// intent takes the same path a pointer gesture would.
fn gesture(pad: &mut SlidePad, step: Step, now: Duration, intents: &IntentSender) {
    pad.press(
        step.dx() as f32 * PAD_DRAG,
        step.dy() as f32 * PAD_DRAG,
        now,
        intents,
    );
    pad.release();
}

fn inspect_code(code: &str) -> Result<()> {
    let decoded =
        ScoreCode::decode(code).map_err(|error| anyhow::anyhow!("invalid share code: {error}"))?;
    let mode = match decoded.attack_mode {
        AttackMode::Directional => "directional",
        AttackMode::Cascade => "cascade",
    };
    println!(
        "{} points in {:.1}s on a {}x{} pond ({mode} snaps)",
        decoded.kills,
        decoded.duration_ms as f64 / 1_000.0,
        decoded.grid.columns(),
        decoded.grid.rows()
    );
    Ok(())
}
