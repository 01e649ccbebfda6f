#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure scoring system that tracks the reward window and the high score.

use std::time::Duration;

use log::warn;
use pond_snap_core::{Event, HighScoreStore};

/// Configuration parameters required to construct the scoring system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    reward_kills_required: u32,
    reward_window: Duration,
}

impl Config {
    /// Creates a new configuration from the reward threshold and window.
    #[must_use]
    pub const fn new(reward_kills_required: u32, reward_window: Duration) -> Self {
        Self {
            reward_kills_required,
            reward_window,
        }
    }
}

/// Pure system that turns kill events into reward and final-score events.
///
/// Kill timestamps arrive in non-decreasing session time, so pruning the
/// window is always a front trim. The high-score store is injected per
/// `handle` call; persistence failures are logged and otherwise ignored,
/// the in-memory score still stands for the rest of the session.
#[derive(Debug)]
pub struct Scoring {
    reward_kills_required: usize,
    reward_window: Duration,
    kill_times: Vec<Duration>,
    high_score: u32,
}

impl Scoring {
    /// Creates a new scoring system seeded with the stored high score.
    #[must_use]
    pub fn new(config: Config, high_score: u32) -> Self {
        Self {
            reward_kills_required: config.reward_kills_required as usize,
            reward_window: config.reward_window,
            kill_times: Vec::new(),
            high_score,
        }
    }

    /// The best score known to this session, stored or beaten.
    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Reports whether the provided score strictly beats the known high.
    #[must_use]
    pub fn is_new_high_score(&self, kills: u32) -> bool {
        kills > self.high_score
    }

    /// Consumes session events to emit reward and final-score events.
    ///
    /// Every kill evaluates the window independently, so a cascade that
    /// lands several kills in one snap can trigger a reward mid-batch.
    pub fn handle(
        &mut self,
        events: &[Event],
        store: &mut dyn HighScoreStore,
        out: &mut Vec<Event>,
    ) {
        for event in events {
            match event {
                Event::FlyKilled { at, kills, .. } => self.record_kill(*at, *kills, out),
                Event::PlayerDied { kills, .. } => self.post_final_score(*kills, store, out),
                _ => {}
            }
        }
    }

    fn record_kill(&mut self, at: Duration, kills: u32, out: &mut Vec<Event>) {
        self.kill_times.push(at);

        let cutoff = at.saturating_sub(self.reward_window);
        let stale = self.kill_times.partition_point(|time| *time < cutoff);
        let _ = self.kill_times.drain(..stale);

        if self.kill_times.len() >= self.reward_kills_required {
            self.kill_times.clear();
            out.push(Event::RewardTriggered { kills });
        }
    }

    fn post_final_score(
        &mut self,
        kills: u32,
        store: &mut dyn HighScoreStore,
        out: &mut Vec<Event>,
    ) {
        let new_high = self.is_new_high_score(kills);
        if new_high {
            self.high_score = kills;
            if let Err(error) = store.save(kills) {
                warn!("failed to persist high score: {error}");
            }
        }

        out.push(Event::FinalScorePosted { kills, new_high });
    }
}
