//! Edge-latched input state.
//!
//! The frontend feeds raw key transitions in; the simulation asks questions
//! about them. Each action remembers the tick its current state began, so a
//! press stays "fresh" for a buffer window and can be consumed a few ticks
//! late (jump buffering, coyote jumps).

use std::collections::HashMap;

use crate::sim::clock::Tick;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    North,
    East,
    South,
    West,
    Jump,
    Dash,
    DashDown,
    Climb,
    Debug,
}

#[derive(Clone, Copy, Debug)]
struct KeyState {
    pressed: bool,
    since: Tick,
}

#[derive(Default)]
pub struct InputLatch {
    keys: HashMap<Action, KeyState>,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation at tick `now`. Only transitions are stamped;
    /// repeating the same state keeps the original `since` tick, which is
    /// what the freshness queries rely on.
    pub fn put(&mut self, action: Action, pressed: bool, now: Tick) {
        let entry = self.keys.entry(action).or_insert(KeyState {
            pressed: false,
            since: 0,
        });
        if entry.pressed != pressed {
            entry.pressed = pressed;
            entry.since = now;
        }
    }

    /// Is the action currently held?
    pub fn held(&self, action: Action) -> bool {
        self.keys.get(&action).map_or(false, |k| k.pressed)
    }

    /// Held, and the press happened within the last `window` ticks.
    ///
    /// `window` is a raw tick count compared against the stamped observation
    /// tick; unlike `Timer` durations it is not rescaled to the reference
    /// rate. Buffer windows are frame-denominated on purpose.
    pub fn fresh(&self, action: Action, now: Tick, window: u64) -> bool {
        match self.keys.get(&action) {
            Some(k) => k.pressed && now.saturating_sub(k.since) <= window,
            None => false,
        }
    }

    /// Tick at which the current press began, if held.
    pub fn pressed_at(&self, action: Action) -> Option<Tick> {
        self.keys
            .get(&action)
            .filter(|k| k.pressed)
            .map(|k| k.since)
    }

    /// Horizontal axis from the held direction keys: -1, 0, or 1.
    pub fn axis_x(&self) -> f32 {
        let mut x = 0.0;
        if self.held(Action::West) {
            x -= 1.0;
        }
        if self.held(Action::East) {
            x += 1.0;
        }
        x
    }

    /// Vertical axis; north is negative (up).
    pub fn axis_y(&self) -> f32 {
        let mut y = 0.0;
        if self.held(Action::North) {
            y -= 1.0;
        }
        if self.held(Action::South) {
            y += 1.0;
        }
        y
    }
}
