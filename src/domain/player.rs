//! Player movement state machine.
//!
//! One `tick` runs a fixed phase order: grounding, dash entry, jumping, dash
//! physics, then either climbing or walking+gravity, and finally velocity
//! integration against the collision grid. Phase order matters; several
//! mechanics (bunny jumps, dash-cancel jumps) live in the seams between
//! phases.
//!
//! Velocities are in tuning units; integration multiplies by
//! `time_scale * rate_scale`, so all constants read as per-reference-tick
//! quantities.

use crate::config::Tuning;
use crate::domain::collision::CollisionWorld;
use crate::domain::input::{Action, InputLatch};
use crate::domain::timer::Timer;
use crate::domain::vec2::{signum, Vec2};
use crate::sim::clock::{Tick, TickContext};
use crate::sim::event::{JumpKind, SimEvent};

/// Iteration caps for the stepped resolver. Generous; typical frames take a
/// handful of steps.
const MAX_JIGGLE: u32 = 512;
const MAX_HALVINGS: u32 = 32;

#[derive(Clone, Copy, Debug)]
enum DashState {
    None,
    /// Dash consumed, direction still being aimed during the freeze frames.
    Pending { dir: Vec2, down_only: bool },
    Dashing { dir: Vec2, vel: Vec2, timer: Timer },
}

/// Renderer-facing view of the dash lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashPhase {
    None,
    Pending,
    Dashing,
}

pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    facing: f32,
    is_grounded: bool,
    is_climbing: bool,
    ungrounded_at: Option<Tick>,
    last_jump: Option<Tick>,
    last_dash_press: Option<Tick>,
    n_dashes: u32,
    dash: DashState,
    zero_grav: Timer,
    no_control: Timer,
    bounce: Timer,
    dash_cooldown: Timer,
    dash_refresh: Timer,
    // Consecutive fully-blocked ticks per axis.
    blocked_x: u64,
    blocked_y: u64,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            facing: 1.0,
            is_grounded: false,
            is_climbing: false,
            ungrounded_at: None,
            last_jump: None,
            last_dash_press: None,
            n_dashes: 1,
            dash: DashState::None,
            zero_grav: Timer::never(),
            no_control: Timer::never(),
            bounce: Timer::never(),
            dash_cooldown: Timer::never(),
            dash_refresh: Timer::never(),
            blocked_x: 0,
            blocked_y: 0,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    pub fn is_climbing(&self) -> bool {
        self.is_climbing
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.dash, DashState::Dashing { .. })
    }

    pub fn dash_phase(&self) -> DashPhase {
        match self.dash {
            DashState::None => DashPhase::None,
            DashState::Pending { .. } => DashPhase::Pending,
            DashState::Dashing { .. } => DashPhase::Dashing,
        }
    }

    pub fn dash_charges(&self) -> u32 {
        self.n_dashes
    }

    /// -1 facing west, +1 facing east.
    pub fn facing(&self) -> f32 {
        self.facing
    }

    fn size(tuning: &Tuning) -> Vec2 {
        Vec2::new(tuning.movement.player_width, tuning.movement.player_height)
    }

    // ══════════════════════════════════════════════════════════════
    // Tick
    // ══════════════════════════════════════════════════════════════

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        input: &InputLatch,
        cw: &CollisionWorld,
        tuning: &Tuning,
        events: &mut Vec<SimEvent>,
    ) {
        self.do_grounding(ctx, cw, tuning, events);
        self.do_dash(ctx, input, tuning, events);
        let jumped = self.do_jumping(ctx, input, cw, tuning, false, events);
        // The expiry tick still belongs to the dash: the end-dash velocity
        // it sets must survive the tick untouched by walking friction.
        let dash_owned = !matches!(self.dash, DashState::None);
        self.do_dash_physics(ctx, tuning, events);

        if !dash_owned && !jumped {
            if self.is_climbing {
                self.do_climbing(ctx, input, cw, tuning);
            } else {
                self.do_walking(ctx, input, tuning);
                self.do_gravity(ctx, input, tuning);
                self.try_attach_climb(cw, input, tuning);
            }
        }

        self.apply_velocity(ctx, input, cw, tuning, events, true);
    }

    // ══════════════════════════════════════════════════════════════
    // Grounding
    // ══════════════════════════════════════════════════════════════

    fn feet_overlap(&self, cw: &CollisionWorld, tuning: &Tuning) -> bool {
        let size = Self::size(tuning);
        let feet_pos = Vec2::new(self.pos.x, self.pos.y + size.y);
        !cw.free(feet_pos, Vec2::new(size.x, 0.10))
    }

    fn do_grounding(
        &mut self,
        ctx: &TickContext,
        cw: &CollisionWorld,
        tuning: &Tuning,
        events: &mut Vec<SimEvent>,
    ) {
        let gnew = self.feet_overlap(cw, tuning);
        if self.is_grounded != gnew {
            self.is_grounded = gnew;
            if gnew {
                events.push(SimEvent::Landed);
            } else {
                self.ungrounded_at = Some(ctx.now);
            }
        }
        // Ground contact restores the dash charge, but only once the
        // refresh delay from the last dash has passed.
        if self.is_grounded && self.dash_refresh.dead(ctx) {
            self.n_dashes = 1;
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Dashing
    // ══════════════════════════════════════════════════════════════

    /// Record the aimed direction while a dash is pending. Called on frozen
    /// frames too, so aiming works across the freeze.
    pub fn latch_dash_direction(&mut self, input: &InputLatch) {
        if let DashState::Pending { dir, down_only } = &mut self.dash {
            if *down_only {
                *dir = Vec2::new(0.0, 1.0);
                return;
            }
            // Each axis latches independently, so a direction keyed during
            // the freeze refines the aim instead of replacing it.
            let aim = Vec2::new(input.axis_x(), input.axis_y());
            if aim.x != 0.0 {
                dir.x = aim.x;
            }
            if aim.y != 0.0 {
                dir.y = aim.y;
            }
        }
    }

    fn do_dash(
        &mut self,
        ctx: &TickContext,
        input: &InputLatch,
        tuning: &Tuning,
        events: &mut Vec<SimEvent>,
    ) {
        match self.dash {
            DashState::Dashing { .. } => {}
            DashState::Pending { .. } => {
                // First live tick after the freeze: final aim, then launch.
                self.latch_dash_direction(input);
                self.start_dash(ctx, tuning, events);
            }
            DashState::None => {
                let buffer = tuning.movement.input_buffer_ticks;
                let mut press = None;
                let mut down_only = false;
                if input.fresh(Action::Dash, ctx.now, buffer) {
                    press = input.pressed_at(Action::Dash);
                }
                if input.fresh(Action::DashDown, ctx.now, buffer) {
                    if let Some(t) = input.pressed_at(Action::DashDown) {
                        if press.map_or(true, |p| t > p) {
                            press = Some(t);
                            down_only = true;
                        }
                    }
                }
                let Some(t) = press else { return };
                // Each press buys at most one dash.
                if self.last_dash_press.map_or(false, |l| t <= l) {
                    return;
                }
                if self.n_dashes == 0 || self.dash_cooldown.alive(ctx) {
                    return;
                }
                self.n_dashes -= 1;
                self.last_dash_press = Some(t);
                self.dash_cooldown = Timer::ticks(ctx, tuning.dash.cooldown_ticks);
                self.dash_refresh = Timer::ticks(ctx, tuning.dash.refresh_ticks);
                self.dash = DashState::Pending {
                    dir: Vec2::ZERO,
                    down_only,
                };
                self.is_climbing = false;
                self.latch_dash_direction(input);
                tracing::debug!(charges = self.n_dashes, "dash consumed");
                events.push(SimEvent::DashPending {
                    freeze_ticks: tuning.dash.freeze_ticks,
                });
            }
        }
    }

    fn start_dash(&mut self, ctx: &TickContext, tuning: &Tuning, events: &mut Vec<SimEvent>) {
        let DashState::Pending { dir, .. } = self.dash else {
            return;
        };
        let aim = if dir.x == 0.0 && dir.y == 0.0 {
            Vec2::new(self.facing, 0.0)
        } else {
            dir
        };
        let d = aim.normalized();
        let speed = tuning.dash.speed
            * if d.y < 0.0 {
                tuning.dash.up_scale
            } else {
                1.0
            };
        let mut v = d * speed;
        // A dash never slows you down along an axis you were already moving
        // on in the same direction.
        if v.x != 0.0 && signum(self.vel.x) == signum(v.x) && self.vel.x.abs() > v.x.abs() {
            v.x = self.vel.x;
        }
        if v.y != 0.0 && signum(self.vel.y) == signum(v.y) && self.vel.y.abs() > v.y.abs() {
            v.y = self.vel.y;
        }
        if d.x != 0.0 {
            self.facing = signum(d.x);
        }
        self.vel = v;
        self.dash = DashState::Dashing {
            dir: d,
            vel: v,
            timer: Timer::ticks(ctx, tuning.dash.duration_ticks),
        };
        tracing::debug!(dir_x = d.x, dir_y = d.y, "dash start");
        events.push(SimEvent::DashStarted { dir: d });
    }

    fn do_dash_physics(&mut self, ctx: &TickContext, tuning: &Tuning, events: &mut Vec<SimEvent>) {
        if let DashState::Dashing { dir, vel, timer } = self.dash {
            if timer.alive(ctx) {
                // Pin: nothing else touches velocity during the dash.
                self.vel = vel;
            } else {
                self.vel = dir * tuning.dash.end_speed;
                self.dash = DashState::None;
                events.push(SimEvent::DashEnded);
            }
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Jumping
    // ══════════════════════════════════════════════════════════════

    /// Try to fire a jump. Returns true if one fired; the jump then owns the
    /// tick's velocity and the walking/gravity phases are skipped.
    fn do_jumping(
        &mut self,
        ctx: &TickContext,
        input: &InputLatch,
        cw: &CollisionWorld,
        tuning: &Tuning,
        bonus: bool,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        let buffer = tuning.movement.input_buffer_ticks;
        if !input.fresh(Action::Jump, ctx.now, buffer) {
            return false;
        }
        let Some(jt) = input.pressed_at(Action::Jump) else {
            return false;
        };
        // Each press buys at most one jump.
        if self.last_jump.map_or(false, |l| jt <= l) {
            return false;
        }

        let jump = &tuning.jump;
        let mx = input.axis_x();
        let coyote_ok = !self.is_grounded
            && self.ungrounded_at.map_or(false, |u| {
                ctx.now.saturating_sub(u) <= jump.coyote_ticks
                    && self.last_jump.map_or(true, |l| u > l)
            });
        let dash_dir = match self.dash {
            DashState::Dashing { dir, .. } => Some(dir),
            _ => None,
        };

        let kind;
        match dash_dir {
            // Dash-cancel jumps: ground (or coyote ground) jumps taken
            // mid-dash convert the dash into horizontal speed.
            Some(dir) if self.is_grounded || coyote_ok => {
                self.dash = DashState::None;
                events.push(SimEvent::DashEnded);
                if dir.y > 0.0 && dir.x != 0.0 {
                    kind = JumpKind::Hyper;
                    // Holding away from the dash reverses the launch.
                    let side = if mx != 0.0 && mx == -signum(dir.x) {
                        mx
                    } else {
                        signum(dir.x)
                    };
                    self.vel.x = side * jump.hyper_speed;
                    self.vel.y = -jump.liftoff * 0.5;
                } else if dir.y > 0.0 {
                    kind = JumpKind::Super;
                    let side = if mx != 0.0 { mx } else { self.facing };
                    self.vel.x = side * jump.super_speed;
                    self.vel.y = -jump.liftoff;
                } else {
                    kind = JumpKind::Ultra;
                    if mx != 0.0 && signum(self.vel.x) != mx {
                        self.vel.x = mx * self.vel.x.abs();
                    }
                    self.vel.x *= jump.ultra_boost;
                    self.vel.y = -jump.liftoff;
                }
                self.leave_ground(ctx);
            }
            _ if self.is_climbing => {
                kind = JumpKind::Climb;
                self.is_climbing = false;
                self.vel.y = -jump.liftoff;
                if mx != 0.0 && mx == -self.facing {
                    // Jumping away from the wall reverses facing.
                    self.vel.x = -self.facing * jump.wall_jump_speed;
                    self.facing = -self.facing;
                    self.no_control = Timer::ticks(ctx, jump.no_control_ticks);
                }
            }
            _ if self.is_grounded => {
                kind = if bonus {
                    JumpKind::Bunny
                } else {
                    JumpKind::Ground
                };
                self.vel.y = -jump.liftoff;
                self.vel.x *= jump.ultra_boost;
                self.leave_ground(ctx);
            }
            _ if coyote_ok => {
                kind = JumpKind::Coyote;
                self.vel.y = -jump.liftoff;
                self.vel.x *= jump.ultra_boost;
            }
            _ => {
                let Some(side) = self.wall_side(cw, tuning) else {
                    return false;
                };
                let dashing_up = matches!(self.dash, DashState::Dashing { dir, .. } if dir.y < 0.0);
                if dashing_up {
                    kind = JumpKind::WallBounce;
                    self.dash = DashState::None;
                    events.push(SimEvent::DashEnded);
                    self.vel.y = -jump.liftoff * jump.bounce_scale;
                    self.vel.x = -side * tuning.movement.walk_max;
                    self.bounce = Timer::ticks(ctx, jump.no_control_ticks);
                } else if mx == 0.0 {
                    // Extra height, reduced push.
                    kind = JumpKind::NeutralWall;
                    self.vel.y = -jump.liftoff * jump.neutral_scale;
                    self.vel.x = -side * jump.wall_jump_speed * 0.5;
                } else {
                    kind = JumpKind::Wall;
                    self.vel.y = -jump.liftoff;
                    self.vel.x = -side * jump.wall_jump_speed;
                    self.no_control = Timer::ticks(ctx, jump.no_control_ticks);
                }
                // A dash carried into the wall ends here; leaving it live
                // would re-pin velocity right over the jump.
                if matches!(self.dash, DashState::Dashing { .. }) {
                    self.dash = DashState::None;
                    events.push(SimEvent::DashEnded);
                }
                self.is_climbing = false;
                self.facing = -side;
            }
        }

        self.last_jump = Some(ctx.now);
        self.zero_grav = Timer::ticks(ctx, jump.zero_grav_ticks);
        tracing::debug!(?kind, "jump");
        events.push(SimEvent::Jumped { kind });
        true
    }

    fn leave_ground(&mut self, ctx: &TickContext) {
        if self.is_grounded {
            self.is_grounded = false;
            self.ungrounded_at = Some(ctx.now);
        }
    }

    /// Which side has a wall within sense range: -1 west, +1 east. Prefers
    /// the facing side when both qualify.
    fn wall_side(&self, cw: &CollisionWorld, tuning: &Tuning) -> Option<f32> {
        let size = Self::size(tuning);
        let sense = tuning.jump.wall_sense;
        for s in [self.facing, -self.facing] {
            if !cw.free(Vec2::new(self.pos.x + sense * s, self.pos.y), size) {
                return Some(s);
            }
        }
        None
    }

    // ══════════════════════════════════════════════════════════════
    // Climbing
    // ══════════════════════════════════════════════════════════════

    fn holding_wall(&self, cw: &CollisionWorld, tuning: &Tuning) -> bool {
        let size = Self::size(tuning);
        let sense = tuning.jump.wall_sense;
        !cw.free(Vec2::new(self.pos.x + sense * self.facing, self.pos.y), size)
    }

    fn try_attach_climb(&mut self, cw: &CollisionWorld, input: &InputLatch, tuning: &Tuning) {
        if self.is_climbing || !matches!(self.dash, DashState::None) {
            return;
        }
        if input.held(Action::Climb) && self.holding_wall(cw, tuning) {
            self.is_climbing = true;
            self.vel.x = 0.0;
        }
    }

    fn do_climbing(
        &mut self,
        _ctx: &TickContext,
        input: &InputLatch,
        cw: &CollisionWorld,
        tuning: &Tuning,
    ) {
        if !input.held(Action::Climb) || !self.holding_wall(cw, tuning) {
            self.is_climbing = false;
            return;
        }
        self.vel.x = 0.0;
        let my = input.axis_y();
        if my != 0.0 {
            self.vel.y = my * tuning.climb.speed;
        } else {
            // Grip is not perfect; residual speed bleeds off.
            self.vel.y *= tuning.climb.slip;
            if self.vel.y.abs() < 0.05 {
                self.vel.y = 0.0;
            }
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Walking and gravity
    // ══════════════════════════════════════════════════════════════

    fn do_walking(&mut self, ctx: &TickContext, input: &InputLatch, tuning: &Tuning) {
        let m = &tuning.movement;
        let rs = ctx.rate_scale as f32;
        let control = self.no_control.dead(ctx) && self.bounce.dead(ctx);
        let mx = if control { input.axis_x() } else { 0.0 };
        if mx != 0.0 {
            self.facing = mx;
        }

        let accel = m.walk_accel * rs;
        let fric_base = if self.is_grounded {
            m.friction_grounded
        } else {
            m.friction_air
        };
        let fric = fric_base * rs;

        let mut vx = self.vel.x;
        let m_sign = signum(mx);
        let v_sign = signum(vx);

        if mx == 0.0 {
            // Coast: friction toward zero, never past it.
            let vx2 = vx - v_sign * fric;
            vx = if signum(vx2) == v_sign { vx2 } else { 0.0 };
        } else if v_sign != m_sign {
            // Turn around: instant reset to one accel step.
            vx = m_sign * accel;
        } else if vx * v_sign < m.walk_max {
            let vx2 = vx + accel * v_sign;
            vx = if vx2 * v_sign > m.walk_max {
                m.walk_max * v_sign
            } else {
                vx2
            };
        } else {
            // Above top speed: friction erodes toward the cap, not below.
            let vx2 = vx - v_sign * fric;
            vx = if vx2 * v_sign < m.walk_max {
                m.walk_max * v_sign
            } else {
                vx2
            };
        }

        self.vel.x = vx;
    }

    fn do_gravity(&mut self, ctx: &TickContext, input: &InputLatch, tuning: &Tuning) {
        let m = &tuning.movement;
        if self.is_grounded {
            return;
        }
        // Gravity never slows a fall already past the cap.
        if self.vel.y >= m.gravity_max {
            return;
        }
        let mut g = m.gravity_accel;
        if input.held(Action::Jump) {
            if self.zero_grav.alive(ctx) {
                g = 0.0;
            } else {
                g *= 0.5;
            }
        }
        self.vel.y = (self.vel.y + g * ctx.rate_scale as f32).min(m.gravity_max);
    }

    // ══════════════════════════════════════════════════════════════
    // Integration and resolution
    // ══════════════════════════════════════════════════════════════

    fn apply_velocity(
        &mut self,
        ctx: &TickContext,
        input: &InputLatch,
        cw: &CollisionWorld,
        tuning: &Tuning,
        events: &mut Vec<SimEvent>,
        allow_bonus: bool,
    ) {
        let m = &tuning.movement;
        if self.vel.x == 0.0 && self.vel.y == 0.0 {
            return;
        }

        let size = Self::size(tuning);
        let scale = m.time_scale * ctx.rate_scale as f32;
        let delta = Vec2::new(self.vel.x * scale, self.vel.y * scale);
        let target = self.pos + delta;

        if cw.free(target, size) {
            self.pos = target;
            self.blocked_x = 0;
            self.blocked_y = 0;
            return;
        }

        let old = self.pos;
        let eps = m.move_epsilon;

        // Single-axis motion that hit something may just be clipping a
        // corner; nudge perpendicular before giving up speed.
        let corner_done = if delta.y.abs() < eps && delta.x.abs() >= eps {
            let reach = if self.vel.x.abs() > m.walk_max {
                m.corner_nudge_fast
            } else {
                m.corner_nudge
            };
            self.corner_correct(cw, size, target, true, reach)
        } else if delta.x.abs() < eps && delta.y.abs() >= eps {
            let reach = if self.vel.y.abs() > m.walk_max {
                m.corner_nudge_fast
            } else {
                m.corner_nudge
            };
            self.corner_correct(cw, size, target, false, reach)
        } else {
            false
        };

        if !corner_done {
            self.move_xy(cw, size, delta.x, delta.y, eps);

            // If one axis made partial progress and the other was the real
            // obstruction, commit the free axis all the way.
            if self.pos.x != old.x
                && self.pos.x != target.x
                && cw.free(Vec2::new(target.x, self.pos.y), size)
            {
                self.pos.x = target.x;
            } else if self.pos.y != old.y
                && self.pos.y != target.y
                && cw.free(Vec2::new(self.pos.x, target.y), size)
            {
                self.pos.y = target.y;
            }
        }

        // Blocked axes only lose their velocity after a short grace, so a
        // dash carried into a wall can still slip around it.
        if delta.x != 0.0 && self.pos.x == old.x {
            self.blocked_x += 1;
            if self.blocked_x > m.slide_grace_ticks {
                self.vel.x = 0.0;
            }
        } else {
            self.blocked_x = 0;
        }

        let y_short = delta.y != 0.0 && self.pos.y != target.y;
        if delta.y != 0.0 && self.pos.y == old.y {
            self.blocked_y += 1;
            if self.blocked_y > m.slide_grace_ticks {
                self.vel.y = 0.0;
            }
        } else {
            self.blocked_y = 0;
        }

        // Landing resolves inside the same tick: ground immediately and give
        // a buffered jump press its chance, so frame-perfect bunny hops keep
        // their speed.
        if delta.y > 0.0 && y_short && !self.is_grounded {
            self.is_grounded = true;
            events.push(SimEvent::Landed);
            if self.dash_refresh.dead(ctx) {
                self.n_dashes = 1;
            }
            if allow_bonus && self.do_jumping(ctx, input, cw, tuning, true, events) {
                self.apply_velocity(ctx, input, cw, tuning, events, false);
            }
        }
    }

    fn corner_correct(
        &mut self,
        cw: &CollisionWorld,
        size: Vec2,
        target: Vec2,
        horizontal: bool,
        reach: f32,
    ) -> bool {
        const STEPS: i32 = 8;
        for k in 1..=STEPS {
            let off = reach * k as f32 / STEPS as f32;
            for s in [-1.0f32, 1.0] {
                let cand = if horizontal {
                    Vec2::new(target.x, target.y + off * s)
                } else {
                    Vec2::new(target.x + off * s, target.y)
                };
                if cw.free(cand, size) {
                    self.pos = cand;
                    return true;
                }
            }
        }
        false
    }

    /// Stepped diagonal resolver: advance each axis by epsilon while it can,
    /// fall back to single-axis halving when one axis runs out.
    fn move_xy(&mut self, cw: &CollisionWorld, size: Vec2, mut dx: f32, mut dy: f32, eps: f32) {
        for _ in 0..MAX_JIGGLE {
            if dx.abs() < eps {
                self.move_y(cw, size, dy, eps);
                return;
            }
            if dy.abs() < eps {
                self.move_x(cw, size, dx, eps);
                return;
            }
            let sx = signum(dx);
            let sy = signum(dy);
            let mut stuck = true;
            if cw.free(Vec2::new(self.pos.x + eps * sx, self.pos.y), size) {
                self.pos.x += eps * sx;
                dx -= eps * sx;
                stuck = false;
            }
            if cw.free(Vec2::new(self.pos.x, self.pos.y + eps * sy), size) {
                self.pos.y += eps * sy;
                dy -= eps * sy;
                stuck = false;
            }
            if stuck {
                return;
            }
        }
    }

    /// Binary-subdivision advance along x: try each half step, keep what
    /// fits. Converges to contact within epsilon.
    fn move_x(&mut self, cw: &CollisionWorld, size: Vec2, mut dx: f32, eps: f32) {
        for _ in 0..MAX_HALVINGS {
            if dx.abs() < eps {
                return;
            }
            let half = dx * 0.5;
            let next = Vec2::new(self.pos.x + half, self.pos.y);
            if cw.free(next, size) {
                self.pos = next;
            }
            dx = half;
        }
    }

    fn move_y(&mut self, cw: &CollisionWorld, size: Vec2, mut dy: f32, eps: f32) {
        for _ in 0..MAX_HALVINGS {
            if dy.abs() < eps {
                return;
            }
            let half = dy * 0.5;
            let next = Vec2::new(self.pos.x, self.pos.y + half);
            if cw.free(next, size) {
                self.pos = next;
            }
            dy = half;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::autotile;
    use crate::domain::tile::{RawGrid, TileGrid};
    use crate::sim::clock::TickClock;

    struct Rig {
        clock: TickClock,
        input: InputLatch,
        tuning: Tuning,
        grid: TileGrid,
        player: Player,
        events: Vec<SimEvent>,
    }

    impl Rig {
        fn new(rows: &[&str], pos: Vec2) -> Self {
            Rig {
                clock: TickClock::new(),
                input: InputLatch::new(),
                tuning: Tuning::default(),
                grid: autotile::compute(&RawGrid::from_rows(rows)),
                player: Player::new(pos),
                events: Vec::new(),
            }
        }

        fn press(&mut self, a: Action) {
            self.input.put(a, true, self.clock.now());
        }

        fn release(&mut self, a: Action) {
            self.input.put(a, false, self.clock.now());
        }

        fn tick(&mut self) {
            self.clock.advance(1.0 / 60.0);
            let ctx = self.clock.context();
            let cw = CollisionWorld::new(&self.grid);
            self.events.clear();
            self.player
                .tick(&ctx, &self.input, &cw, &self.tuning, &mut self.events);
        }

        fn run(&mut self, n: u32) {
            for _ in 0..n {
                self.tick();
            }
        }

        fn jumped(&self) -> Option<JumpKind> {
            self.events.iter().find_map(|e| match e {
                SimEvent::Jumped { kind } => Some(*kind),
                _ => None,
            })
        }
    }

    fn flat_floor() -> Rig {
        let rows = [
            "............",
            "............",
            "............",
            "############",
        ];
        Rig::new(&rows, Vec2::new(1.0, 2.0))
    }

    fn open_air() -> Rig {
        let rows: Vec<String> = (0..30).map(|_| ".....".to_string()).collect();
        let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        Rig::new(&refs, Vec2::new(2.0, 1.0))
    }

    #[test]
    fn walking_accelerates_and_clamps_at_walk_max() {
        let mut rig = flat_floor();
        rig.press(Action::East);
        rig.run(20);
        assert!(rig.player.is_grounded());
        assert_eq!(rig.player.vel.x, rig.tuning.movement.walk_max);
        assert!(rig.player.pos.x > 1.5);
    }

    #[test]
    fn releasing_input_coasts_to_a_stop() {
        let mut rig = flat_floor();
        rig.press(Action::East);
        rig.run(15);
        rig.release(Action::East);
        rig.run(15);
        assert_eq!(rig.player.vel.x, 0.0);
    }

    #[test]
    fn free_fall_caps_at_gravity_max() {
        let mut rig = open_air();
        rig.run(35);
        assert!(!rig.player.is_grounded());
        assert_eq!(rig.player.vel.y, rig.tuning.movement.gravity_max);
        assert!(rig.player.pos.y > 1.0);
    }

    #[test]
    fn ground_jump_fires_once_per_press() {
        let mut rig = flat_floor();
        rig.run(2);
        rig.press(Action::Jump);
        rig.tick();
        assert_eq!(rig.jumped(), Some(JumpKind::Ground));
        assert!((rig.player.vel.y + rig.tuning.jump.liftoff).abs() < 1e-4);
        // Same press stays buffered but may not fire again.
        let mut more = 0;
        for _ in 0..8 {
            rig.tick();
            if rig.jumped().is_some() {
                more += 1;
            }
        }
        assert_eq!(more, 0);
    }

    #[test]
    fn ground_jump_boosts_carried_speed() {
        let mut rig = flat_floor();
        rig.press(Action::East);
        rig.run(20);
        rig.press(Action::Jump);
        rig.tick();
        assert_eq!(rig.jumped(), Some(JumpKind::Ground));
        let boosted = rig.tuning.movement.walk_max * rig.tuning.jump.ultra_boost;
        assert!((rig.player.vel.x - boosted).abs() < 1e-4);
    }

    #[test]
    fn coyote_jump_works_shortly_after_leaving_a_ledge() {
        let rows = ["........", "........", "##......"];
        let mut rig = Rig::new(&rows, Vec2::new(0.3, 1.0));
        rig.press(Action::East);
        // Walk off the two-tile ledge.
        for _ in 0..60 {
            rig.tick();
            if !rig.player.is_grounded() {
                break;
            }
        }
        assert!(!rig.player.is_grounded());
        rig.press(Action::Jump);
        rig.tick();
        assert_eq!(rig.jumped(), Some(JumpKind::Coyote));
    }

    #[test]
    fn dash_aims_then_pins_velocity_for_its_duration() {
        let mut rig = flat_floor();
        rig.run(2);
        rig.press(Action::East);
        rig.press(Action::Dash);
        rig.tick();
        assert!(matches!(rig.events[..], [SimEvent::DashPending { .. }]));
        rig.tick();
        assert!(rig
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::DashStarted { .. })));
        assert_eq!(rig.player.vel.x, rig.tuning.dash.speed);
        assert_eq!(rig.player.vel.y, 0.0);

        let mut pinned = 0;
        loop {
            rig.tick();
            if rig.events.contains(&SimEvent::DashEnded) {
                break;
            }
            assert_eq!(rig.player.vel.x, rig.tuning.dash.speed);
            pinned += 1;
            assert!(pinned < 60, "dash never ended");
        }
        assert_eq!(rig.player.vel.x, rig.tuning.dash.end_speed);
    }

    #[test]
    fn airborne_dash_does_not_recharge() {
        let mut rig = open_air();
        rig.press(Action::East);
        rig.press(Action::Dash);
        rig.run(2);
        assert!(rig.player.is_dashing());
        assert_eq!(rig.player.dash_charges(), 0);
        rig.release(Action::Dash);
        // Past the cooldown, still airborne: a new press must be refused.
        rig.run(15);
        rig.press(Action::Dash);
        rig.tick();
        assert!(!rig
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::DashPending { .. })));
        assert_eq!(rig.player.dash_charges(), 0);
    }

    #[test]
    fn landing_restores_the_dash_charge() {
        let mut rig = flat_floor();
        rig.run(2);
        rig.press(Action::East);
        rig.press(Action::Dash);
        rig.run(2);
        assert_eq!(rig.player.dash_charges(), 0);
        // Grounded the whole time, so the charge returns once the refresh
        // delay passes.
        rig.run(10);
        assert_eq!(rig.player.dash_charges(), 1);
    }

    #[test]
    fn diagonal_down_dash_jump_is_a_hyper() {
        let mut rig = flat_floor();
        rig.run(2);
        rig.press(Action::East);
        rig.press(Action::South);
        rig.press(Action::Dash);
        rig.run(2); // aim + launch
        assert!(rig.player.is_dashing());
        rig.press(Action::Jump);
        rig.tick();
        assert_eq!(rig.jumped(), Some(JumpKind::Hyper));
        assert_eq!(rig.player.vel.x, rig.tuning.jump.hyper_speed);
        assert!((rig.player.vel.y + rig.tuning.jump.liftoff * 0.5).abs() < 1e-4);
        assert!(!rig.player.is_dashing());
    }

    #[test]
    fn wall_jump_pushes_away_from_the_wall() {
        let rows = [
            "#.........",
            "#.........",
            "#.........",
            "#.........",
            "#.........",
            "#.........",
        ];
        let mut rig = Rig::new(&rows, Vec2::new(1.02, 2.0));
        rig.press(Action::West); // pressing into the wall
        rig.run(3);
        assert!(!rig.player.is_grounded());
        rig.press(Action::Jump);
        rig.tick();
        assert_eq!(rig.jumped(), Some(JumpKind::Wall));
        assert!(rig.player.vel.x > 0.0);
        assert!(rig.player.vel.y < 0.0);
    }

    #[test]
    fn wall_jump_cancels_a_dash_carried_into_the_wall() {
        let rows = [
            "#.......",
            "#.......",
            "#.......",
            "#.......",
            "#.......",
            "#.......",
            "#.......",
            "#.......",
        ];
        let mut rig = Rig::new(&rows, Vec2::new(2.0, 2.0));
        rig.press(Action::West);
        rig.press(Action::Dash);
        rig.run(2); // aim + launch
        assert!(rig.player.is_dashing());
        rig.run(4); // ride the dash into the wall
        rig.press(Action::Jump);
        rig.tick();
        assert_eq!(rig.jumped(), Some(JumpKind::Wall));
        assert!(rig.events.contains(&SimEvent::DashEnded));
        assert!(!rig.player.is_dashing());
        // The jump owns the velocity now, not the dash pin.
        assert_eq!(rig.player.vel.x, rig.tuning.jump.wall_jump_speed);
        assert!(rig.player.vel.y < 0.0);
    }

    #[test]
    fn climb_holds_position_on_a_wall() {
        let rows = [
            "#.........",
            "#.........",
            "#.........",
            "#.........",
            "#.........",
            "#.........",
        ];
        let mut rig = Rig::new(&rows, Vec2::new(1.02, 2.0));
        rig.press(Action::West);
        rig.press(Action::Climb);
        rig.run(4);
        assert!(rig.player.is_climbing());
        let y = rig.player.pos.y;
        rig.run(10);
        // Slip decay converges; the player effectively hangs.
        assert!((rig.player.pos.y - y).abs() < 0.2);
        rig.release(Action::Climb);
        rig.run(20);
        assert!(!rig.player.is_climbing());
        assert!(rig.player.pos.y > y + 0.5, "should fall after letting go");
    }
}
