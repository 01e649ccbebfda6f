#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input intent queue and the gesture layer that feeds it.
//!
//! Gesture handlers fire asynchronously relative to the simulation tick, so
//! intents cross an explicit channel instead of a shared buffer. Producer
//! and consumer both live on the same logical thread; the channel exists to
//! make the FIFO, single-consumer contract explicit and testable, not to
//! synchronize threads. The tick consumes at most one intent per queue.

use std::{
    f32::consts::TAU,
    sync::mpsc::{self, Receiver, Sender},
    time::Duration,
};

use pond_snap_core::Step;

/// Default drag magnitude in pad units below which no direction registers.
pub const DEFAULT_DEAD_ZONE: f32 = 12.0;

/// Creates the unbounded FIFO channel connecting gesture producers to the
/// single tick consumer.
#[must_use]
pub fn intent_channel() -> (IntentSender, IntentReceiver) {
    let (sender, receiver) = mpsc::channel();
    (IntentSender { sender }, IntentReceiver { receiver })
}

/// Producer half of an intent queue; cloneable so several gesture handlers
/// can feed the same queue.
#[derive(Clone, Debug)]
pub struct IntentSender {
    sender: Sender<Step>,
}

impl IntentSender {
    /// Appends an intent to the queue tail. Never blocks; a push after the
    /// consumer is gone means the session ended and the intent is dropped.
    pub fn push(&self, step: Step) {
        let _ = self.sender.send(step);
    }
}

/// Consumer half of an intent queue, owned by the tick driver.
#[derive(Debug)]
pub struct IntentReceiver {
    receiver: Receiver<Step>,
}

impl IntentReceiver {
    /// Removes and returns the oldest intent, or `None` when the queue is
    /// empty. Never blocks.
    #[must_use]
    pub fn pop(&self) -> Option<Step> {
        self.receiver.try_recv().ok()
    }
}

/// Maps a drag delta to one of the eight directions, or `None` while the
/// drag stays inside the dead zone. The angle snaps to the nearest octant
/// with rows growing downward, matching screen space.
#[must_use]
pub fn direction_from_delta(dx: f32, dy: f32, dead_zone: f32) -> Option<Step> {
    let magnitude = dx.hypot(dy);
    if magnitude < dead_zone {
        return None;
    }

    let angle = dy.atan2(dx);
    let octant = ((8.0 * angle / TAU + 8.0).round() as usize) % 8;
    Some(Step::ALL[octant])
}

/// Configuration for a slide pad binding.
#[derive(Clone, Copy, Debug)]
pub struct SlidePadConfig {
    dead_zone: f32,
    cooldown: Duration,
}

impl SlidePadConfig {
    /// Creates a pad configuration from a dead zone and re-emit cooldown.
    #[must_use]
    pub const fn new(dead_zone: f32, cooldown: Duration) -> Self {
        Self {
            dead_zone,
            cooldown,
        }
    }
}

impl Default for SlidePadConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DEAD_ZONE, Duration::ZERO)
    }
}

/// Tracks one pad's active drag and pushes deduplicated intents.
///
/// A direction is emitted when it differs from the last emitted one and the
/// cooldown has elapsed; pressing the pad force-emits the first direction
/// so a tap registers immediately.
#[derive(Debug)]
pub struct SlidePad {
    config: SlidePadConfig,
    active: bool,
    last_direction: Option<Step>,
    last_emit_at: Option<Duration>,
}

impl SlidePad {
    /// Creates an idle pad with the provided configuration.
    #[must_use]
    pub fn new(config: SlidePadConfig) -> Self {
        Self {
            config,
            active: false,
            last_direction: None,
            last_emit_at: None,
        }
    }

    /// Starts a drag at the provided delta from the pad centre.
    pub fn press(&mut self, dx: f32, dy: f32, now: Duration, intents: &IntentSender) {
        self.active = true;
        self.last_direction = None;
        self.last_emit_at = None;
        self.sample(dx, dy, now, true, intents);
    }

    /// Continues an active drag; ignored while the pad is idle.
    pub fn drag(&mut self, dx: f32, dy: f32, now: Duration, intents: &IntentSender) {
        if !self.active {
            return;
        }
        self.sample(dx, dy, now, false, intents);
    }

    /// Ends the drag so the next press force-emits again.
    pub fn release(&mut self) {
        self.active = false;
        self.last_direction = None;
    }

    fn sample(&mut self, dx: f32, dy: f32, now: Duration, force: bool, intents: &IntentSender) {
        let Some(direction) = direction_from_delta(dx, dy, self.config.dead_zone) else {
            return;
        };

        let cooldown_elapsed = match self.last_emit_at {
            None => true,
            Some(at) => now.saturating_sub(at) >= self.config.cooldown,
        };

        if Some(direction) != self.last_direction && (force || cooldown_elapsed) {
            intents.push(direction);
            self.last_direction = Some(direction);
            self.last_emit_at = Some(now);
        }
    }
}
