//! Simulation clock.
//!
//! The simulation is authored against a 60 Hz reference rate: every tuning
//! constant expressed "per tick" means "per reference tick". A frame's real
//! `dt` is folded into a `rate_scale` factor so the machine behaves the same
//! at any actual frame rate.

/// Monotonic tick counter.
pub type Tick = u64;

/// The tick rate all per-tick constants are calibrated for.
pub const REFERENCE_RATE: f64 = 60.0;

/// Longest frame the simulation will integrate in one step. Anything above
/// this (debugger pause, window drag) is clamped rather than tunneled
/// through.
const MAX_DT: f64 = 1.0 / 15.0;

/// Immutable per-tick view handed down through the step.
#[derive(Clone, Copy, Debug)]
pub struct TickContext {
    /// Tick ordinal of this step.
    pub now: Tick,
    /// Real seconds covered by this step, post clamp.
    pub dt: f64,
    /// `dt` expressed in reference ticks; 1.0 at exactly 60 Hz.
    pub rate_scale: f64,
    /// Total unfrozen seconds since the clock started.
    pub elapsed: f64,
}

impl TickContext {
    /// Rescale a reference-rate tick count to the current rate, never
    /// rounding an interval down to nothing.
    pub fn scale_ticks(&self, n: u64) -> u64 {
        ((n as f64 / self.rate_scale).round() as u64).max(1)
    }
}

pub struct TickClock {
    ticks: Tick,
    elapsed: f64,
    dt: f64,
    ticks_to_skip: u64,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            elapsed: 0.0,
            dt: 1.0 / REFERENCE_RATE,
            ticks_to_skip: 0,
        }
    }

    /// Advance one frame. The clock keeps running during freeze frames; only
    /// the simulation step is skipped.
    pub fn advance(&mut self, dt: f64) {
        self.dt = dt.min(MAX_DT);
        self.ticks += 1;
        self.elapsed += self.dt;
    }

    /// Freeze the simulation for `n` upcoming frames. Concurrent freezes do
    /// not stack; the longer one wins.
    pub fn freeze(&mut self, n: u64) {
        self.ticks_to_skip = self.ticks_to_skip.max(n);
    }

    /// Consume one pending freeze frame. True while frozen.
    pub fn try_skip(&mut self) -> bool {
        if self.ticks_to_skip > 0 {
            self.ticks_to_skip -= 1;
            true
        } else {
            false
        }
    }

    pub fn now(&self) -> Tick {
        self.ticks
    }

    pub fn context(&self) -> TickContext {
        TickContext {
            now: self.ticks,
            dt: self.dt,
            rate_scale: self.dt * REFERENCE_RATE,
            elapsed: self.elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_and_clamps() {
        let mut c = TickClock::new();
        c.advance(1.0 / 60.0);
        c.advance(5.0); // stalled frame
        let ctx = c.context();
        assert_eq!(ctx.now, 2);
        assert!(ctx.dt <= MAX_DT + 1e-9);
        assert!(ctx.elapsed < 0.2);
    }

    #[test]
    fn rate_scale_is_one_at_reference_rate() {
        let mut c = TickClock::new();
        c.advance(1.0 / 60.0);
        let ctx = c.context();
        assert!((ctx.rate_scale - 1.0).abs() < 1e-9);
        assert_eq!(ctx.scale_ticks(10), 10);
    }

    #[test]
    fn scale_ticks_never_hits_zero() {
        let mut c = TickClock::new();
        c.advance(1.0 / 15.0); // rate_scale = 4
        assert_eq!(c.context().scale_ticks(1), 1);
        assert_eq!(c.context().scale_ticks(12), 3);
    }

    #[test]
    fn freeze_takes_the_longer_request() {
        let mut c = TickClock::new();
        c.freeze(2);
        c.freeze(4);
        let mut frozen = 0;
        while c.try_skip() {
            frozen += 1;
        }
        assert_eq!(frozen, 4);
        assert!(!c.try_skip());
    }
}
