//! Level file loading.
//!
//! A level file is 20 rooms back to back, each encoded as
//! `<ox>;<oy>;<w>;<h>;` followed by exactly `w*h` raw tile bytes with no
//! terminator. Integers are ASCII with an optional leading minus; origins
//! can be negative since rooms share one world coordinate system.
//!
//! Tile bytes are tileset ids (0 = air); the autotiler turns each room into
//! its renderable grid at load time.

use std::path::Path;

use thiserror::Error;

use crate::domain::autotile;
use crate::domain::tile::{RawGrid, TileGrid};
use crate::domain::vec2::{IVec2, Vec2};

pub const ROOM_COUNT: usize = 20;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of data in room {room} header")]
    UnexpectedEof { room: usize },
    #[error("bad integer at byte {at}")]
    BadInt { at: usize },
    #[error("room {room} is truncated: wanted {wanted} tile bytes, got {got}")]
    TruncatedRoom {
        room: usize,
        wanted: usize,
        got: usize,
    },
    #[error("level has {found} rooms, expected {ROOM_COUNT}")]
    MissingRooms { found: usize },
}

#[derive(Debug)]
pub struct Room {
    pub grid: TileGrid,
    /// Respawn points in room-local tile coordinates.
    pub spawns: Vec<IVec2>,
}

impl Room {
    /// Respawn point closest to `pos` (room-local tiles). Rooms without
    /// spawn data fall back to the room origin corner.
    pub fn nearest_spawn(&self, pos: Vec2) -> Vec2 {
        self.spawns
            .iter()
            .map(|s| Vec2::new(s.x as f32, s.y as f32))
            .min_by(|a, b| {
                let da = (*a - pos).length();
                let db = (*b - pos).length();
                da.total_cmp(&db)
            })
            .unwrap_or(Vec2::ZERO)
    }
}

#[derive(Debug)]
pub struct Level {
    pub rooms: Vec<Room>,
}

impl Level {
    pub fn room(&self, index: usize) -> &Room {
        &self.rooms[index]
    }
}

// ── Parsing ──

/// Parse an ASCII integer terminated by `;`, consuming the terminator.
fn pop_int(bytes: &[u8], at: &mut usize, room: usize) -> Result<i32, LevelError> {
    let start = *at;
    let mut end = start;
    while end < bytes.len() && bytes[end] != b';' {
        end += 1;
    }
    if end == bytes.len() {
        return Err(LevelError::UnexpectedEof { room });
    }
    let text =
        std::str::from_utf8(&bytes[start..end]).map_err(|_| LevelError::BadInt { at: start })?;
    let n = text
        .parse::<i32>()
        .map_err(|_| LevelError::BadInt { at: start })?;
    *at = end + 1;
    Ok(n)
}

pub fn parse_level(bytes: &[u8]) -> Result<Level, LevelError> {
    let metas = room_metas();
    let mut rooms = Vec::with_capacity(ROOM_COUNT);
    let mut at = 0;

    // Exactly ROOM_COUNT rooms are read; anything after the last tile block
    // (trailing newlines from editors, for instance) is ignored.
    while rooms.len() < ROOM_COUNT && at < bytes.len() {
        let room = rooms.len();
        let ox = pop_int(bytes, &mut at, room)?;
        let oy = pop_int(bytes, &mut at, room)?;
        let w = pop_int(bytes, &mut at, room)?;
        let h = pop_int(bytes, &mut at, room)?;
        if w <= 0 || h <= 0 {
            return Err(LevelError::BadInt { at });
        }

        let wanted = (w * h) as usize;
        let got = bytes.len() - at;
        if got < wanted {
            return Err(LevelError::TruncatedRoom { room, wanted, got });
        }
        let cells = bytes[at..at + wanted].to_vec();
        at += wanted;

        let raw = RawGrid::new(IVec2::new(ox, oy), IVec2::new(w, h), cells);
        rooms.push(Room {
            grid: autotile::compute(&raw),
            spawns: metas.get(room).cloned().unwrap_or_default(),
        });
    }

    if rooms.len() != ROOM_COUNT {
        return Err(LevelError::MissingRooms { found: rooms.len() });
    }
    Ok(Level { rooms })
}

pub fn load_level(path: impl AsRef<Path>) -> Result<Level, LevelError> {
    let bytes = std::fs::read(path)?;
    parse_level(&bytes)
}

// ── Room metadata ──

/// Respawn points per room. Level files carry no spawn data; this table is
/// part of the campaign definition.
fn room_metas() -> Vec<Vec<IVec2>> {
    fn p(x: i32, y: i32) -> IVec2 {
        IVec2::new(x, y)
    }
    vec![
        vec![p(32, 5), p(2, 16)],
        vec![p(34, 13), p(7, 18)],
        vec![p(32, 6), p(6, 19)],
        vec![p(7, 18)],
        vec![p(24, 3), p(8, 19)],
        vec![p(39, 32), p(7, 32)],
        vec![p(5, 19), p(3, 4), p(38, 8)],
        vec![p(1, 8), p(31, 6)],
        vec![p(21, 28)],
        vec![p(0, 7)],
        vec![p(4, 10), p(37, 9)],
        vec![p(28, 10), p(5, 7)],
        vec![p(39, 19), p(7, 6)],
        vec![p(1, 10), p(1, 7), p(36, 8)],
        vec![p(1, 17), p(1, 3), p(33, 3)],
        vec![p(5, 22)],
        vec![p(5, 17), p(37, 4)],
        vec![p(0, 10), p(34, 2)],
        vec![p(8, 14), p(31, 4)],
        vec![p(1, 17), p(5, 0), p(38, 6)],
    ]
}
