use std::time::Duration;

use pond_snap_core::Step;
use pond_snap_system_input::{intent_channel, SlidePad, SlidePadConfig};

const EAST: Step = Step::new(1, 0);
const SOUTH: Step = Step::new(0, 1);

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn press_emits_the_first_direction_immediately() {
    let (sender, receiver) = intent_channel();
    let mut pad = SlidePad::new(SlidePadConfig::new(12.0, ms(140)));

    pad.press(30.0, 0.0, ms(0), &sender);

    assert_eq!(receiver.pop(), Some(EAST));
    assert_eq!(receiver.pop(), None);
}

#[test]
fn repeated_direction_does_not_re_emit() {
    let (sender, receiver) = intent_channel();
    let mut pad = SlidePad::new(SlidePadConfig::default());

    pad.press(30.0, 0.0, ms(0), &sender);
    pad.drag(32.0, 1.0, ms(10), &sender);
    pad.drag(28.0, -2.0, ms(20), &sender);

    assert_eq!(receiver.pop(), Some(EAST));
    assert_eq!(receiver.pop(), None, "holding a direction emits once");
}

#[test]
fn direction_change_emits_after_the_cooldown() {
    let (sender, receiver) = intent_channel();
    let mut pad = SlidePad::new(SlidePadConfig::new(12.0, ms(140)));

    pad.press(30.0, 0.0, ms(0), &sender);
    pad.drag(0.0, 30.0, ms(60), &sender);
    assert_eq!(receiver.pop(), Some(EAST));
    assert_eq!(receiver.pop(), None, "cooldown suppresses the turn");

    pad.drag(0.0, 30.0, ms(150), &sender);
    assert_eq!(receiver.pop(), Some(SOUTH));
}

#[test]
fn drags_inside_the_dead_zone_are_ignored() {
    let (sender, receiver) = intent_channel();
    let mut pad = SlidePad::new(SlidePadConfig::default());

    pad.press(4.0, 3.0, ms(0), &sender);
    pad.drag(6.0, -2.0, ms(10), &sender);

    assert_eq!(receiver.pop(), None);
}

#[test]
fn release_lets_the_next_press_repeat_a_direction() {
    let (sender, receiver) = intent_channel();
    let mut pad = SlidePad::new(SlidePadConfig::new(12.0, ms(140)));

    pad.press(30.0, 0.0, ms(0), &sender);
    pad.release();
    pad.press(30.0, 0.0, ms(20), &sender);

    assert_eq!(receiver.pop(), Some(EAST));
    assert_eq!(receiver.pop(), Some(EAST), "a fresh tap always registers");
}

#[test]
fn idle_pad_ignores_drag_samples() {
    let (sender, receiver) = intent_channel();
    let mut pad = SlidePad::new(SlidePadConfig::default());

    pad.drag(30.0, 0.0, ms(0), &sender);

    assert_eq!(receiver.pop(), None);
}
