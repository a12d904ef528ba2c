//! Simulation shell: the tick clock, level loading, world state, and the
//! per-frame step entry point the frontend drives.

pub mod clock;
pub mod event;
pub mod level;
pub mod step;
pub mod world;
