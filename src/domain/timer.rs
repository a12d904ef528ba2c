//! Lightweight deadlines for movement windows.
//!
//! A timer is just a deadline captured against the current tick context; it
//! owns no state machine of its own and costs nothing while dead. Tick
//! deadlines are pre-scaled to the actual frame rate at creation.

use crate::sim::clock::{Tick, TickContext};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Deadline {
    /// Already expired; the default state.
    Never,
    /// Expires once the clock reaches this tick.
    Tick(Tick),
    /// Expires once this much unfrozen time has elapsed.
    Seconds(f64),
}

#[derive(Clone, Copy, Debug)]
pub struct Timer {
    deadline: Deadline,
}

impl Default for Timer {
    fn default() -> Self {
        Self::never()
    }
}

impl Timer {
    /// A timer that was never armed. `alive` is false from the start.
    pub fn never() -> Self {
        Self {
            deadline: Deadline::Never,
        }
    }

    /// Arm for `n` reference-rate ticks from now.
    pub fn ticks(ctx: &TickContext, n: u64) -> Self {
        Self {
            deadline: Deadline::Tick(ctx.now + ctx.scale_ticks(n)),
        }
    }

    /// Arm for `s` seconds of simulated time from now.
    pub fn seconds(ctx: &TickContext, s: f64) -> Self {
        Self {
            deadline: Deadline::Seconds(ctx.elapsed + s),
        }
    }

    pub fn alive(&self, ctx: &TickContext) -> bool {
        match self.deadline {
            Deadline::Never => false,
            Deadline::Tick(t) => ctx.now < t,
            Deadline::Seconds(s) => ctx.elapsed < s,
        }
    }

    pub fn dead(&self, ctx: &TickContext) -> bool {
        !self.alive(ctx)
    }

    /// Kill the timer regardless of its deadline.
    pub fn clear(&mut self) {
        self.deadline = Deadline::Never;
    }
}
