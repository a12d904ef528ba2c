//! Events the simulation reports back to the frontend each step.
//!
//! These exist so the caller can drive presentation (screen freeze, camera
//! kick, sound) without the simulation knowing anything about it.

use crate::domain::vec2::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimEvent {
    /// A dash was consumed; direction is still being aimed. The frontend is
    /// expected to freeze this many frames.
    DashPending { freeze_ticks: u64 },
    /// Aiming finished; the dash is now live.
    DashStarted { dir: Vec2 },
    DashEnded,
    Jumped { kind: JumpKind },
    /// Transition from airborne to grounded.
    Landed,
}

/// Which jump rule fired. Mostly useful for feedback and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Ground,
    /// Jump granted shortly after walking off a ledge.
    Coyote,
    /// Jump consumed in the same resolution step as the landing.
    Bunny,
    Wall,
    /// Wall jump with no horizontal input held; extra height, less push.
    NeutralWall,
    /// Jump out of an upward dash at a wall.
    WallBounce,
    Climb,
    /// Jump out of a straight-down dash.
    Super,
    /// Jump out of a diagonal-down dash.
    Hyper,
    /// Ground jump during a horizontal dash; keeps boosted speed.
    Ultra,
}
