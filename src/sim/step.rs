//! One simulation step per rendered frame.
//!
//! The clock always advances; freeze frames (dash aim) skip the player tick
//! but still latch the aimed direction, so inputs made during the freeze
//! count.

use crate::domain::collision::CollisionWorld;
use crate::domain::input::InputLatch;
use crate::sim::event::SimEvent;
use crate::sim::world::World;

pub fn step(world: &mut World, input: &InputLatch, dt: f64) -> Vec<SimEvent> {
    world.clock.advance(dt);

    if world.clock.try_skip() {
        world.player.latch_dash_direction(input);
        return Vec::new();
    }

    let ctx = world.clock.context();
    let room = world.room_index();
    let cw = CollisionWorld::new(&world.level.rooms[room].grid);

    let mut events = Vec::new();
    world
        .player
        .tick(&ctx, input, &cw, &world.tuning, &mut events);

    for e in &events {
        if let SimEvent::DashPending { freeze_ticks } = e {
            world.clock.freeze(*freeze_ticks);
        }
    }
    events
}
