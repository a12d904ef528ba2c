//! Top-level simulation state: a loaded level, the clock, and the player.
//!
//! Positions are room-local tile coordinates. Room origins live in a shared
//! world coordinate system, so switching rooms re-bases the player position
//! to keep it continuous across the seam.

use crate::config::Tuning;
use crate::domain::player::Player;
use crate::domain::vec2::Vec2;
use crate::sim::clock::TickClock;
use crate::sim::level::{Level, Room};

pub struct World {
    pub level: Level,
    pub tuning: Tuning,
    pub clock: TickClock,
    pub player: Player,
    room: usize,
}

impl World {
    pub fn new(level: Level, tuning: Tuning) -> Self {
        let start = level.room(0).nearest_spawn(Vec2::ZERO);
        Self {
            level,
            tuning,
            clock: TickClock::new(),
            player: Player::new(start),
            room: 0,
        }
    }

    pub fn room_index(&self) -> usize {
        self.room
    }

    pub fn room(&self) -> &Room {
        self.level.room(self.room)
    }

    /// Switch rooms, re-basing the player so its world position does not
    /// jump across the seam.
    pub fn set_room(&mut self, index: usize) {
        if index == self.room || index >= self.level.rooms.len() {
            return;
        }
        let from = self.level.room(self.room).grid.origin;
        let to = self.level.room(index).grid.origin;
        self.player.pos.x += (from.x - to.x) as f32;
        self.player.pos.y += (from.y - to.y) as f32;
        self.room = index;
    }

    /// Reset the player to the current room's closest respawn point. Motion
    /// state is discarded wholesale; only the clock survives.
    pub fn respawn(&mut self) {
        let at = self.room().nearest_spawn(self.player.pos);
        self.player = Player::new(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{parse_level, ROOM_COUNT};

    fn toy_level() -> Level {
        let mut bytes = Vec::new();
        for i in 0..ROOM_COUNT as i32 {
            bytes.extend(format!("{};{};2;2;", i * 2, 0).into_bytes());
            bytes.extend([0u8; 4]);
        }
        parse_level(&bytes).unwrap()
    }

    #[test]
    fn new_world_spawns_in_room_zero() {
        let w = World::new(toy_level(), Tuning::default());
        assert_eq!(w.room_index(), 0);
        // Closest of the room-0 spawn points to the origin.
        assert_eq!(w.player.pos, Vec2::new(2.0, 16.0));
    }

    #[test]
    fn set_room_rebases_the_player_position() {
        let mut w = World::new(toy_level(), Tuning::default());
        w.player.pos = Vec2::new(5.0, 1.0);
        w.set_room(3); // origin shifts from x=0 to x=6
        assert_eq!(w.room_index(), 3);
        assert_eq!(w.player.pos, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn set_room_ignores_out_of_range_indices() {
        let mut w = World::new(toy_level(), Tuning::default());
        w.set_room(99);
        assert_eq!(w.room_index(), 0);
    }

    #[test]
    fn respawn_discards_motion_state() {
        let mut w = World::new(toy_level(), Tuning::default());
        w.player.pos = Vec2::new(3.0, 15.0);
        w.player.vel = Vec2::new(25.0, -13.0);
        w.respawn();
        assert_eq!(w.player.pos, Vec2::new(2.0, 16.0));
        assert_eq!(w.player.vel, Vec2::ZERO);
    }
}
