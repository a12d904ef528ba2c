//! Ascent simulation core.
//!
//! The deterministic half of a tile-based platformer: level loading and
//! autotiling, AABB collision against the solid grid, and a
//! movement state machine with dashes, wall jumps, and climbing. A frontend
//! owns the window, reads raw input into an [`domain::input::InputLatch`],
//! and calls [`sim::step::step`] once per frame; everything it needs to
//! render and react comes back as state reads plus [`sim::event::SimEvent`]s.

pub mod config;
pub mod domain;
pub mod sim;

pub use config::Tuning;
pub use sim::step::step;
pub use sim::world::World;
