//! Tile data: the raw solid/empty grid produced by the level parser and the
//! renderable tile grid produced by the autotiler.
//!
//! Raw cells are one byte each: 0 = empty, n > 0 = solid using tileset n
//! (the level format stores `tileset_index + 1`). The raw grid is transient;
//! only the computed `TileGrid` survives level load, and collision reads
//! solidity back off it (`TileInfo::is_empty`).

use super::vec2::IVec2;

/// One renderable cell: tileset id plus the atlas coordinate within it.
/// Immutable once computed by the autotiler.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TileInfo {
    /// 0 = empty cell; otherwise `tileset_index + 1`.
    pub tileset: u8,
    /// Atlas column within the tileset.
    pub tx: u8,
    /// Atlas row within the tileset.
    pub ty: u8,
}

impl TileInfo {
    pub const EMPTY: TileInfo = TileInfo { tileset: 0, tx: 0, ty: 0 };

    pub fn is_empty(self) -> bool {
        self.tileset == 0
    }

    /// Zero-based tileset index, `None` for empty cells.
    pub fn tileset_index(self) -> Option<usize> {
        if self.tileset == 0 {
            None
        } else {
            Some(self.tileset as usize - 1)
        }
    }
}

/// Raw per-cell solid/empty bytes for one room, as parsed from the level
/// file. Consumed by `autotile::compute`, then discardable.
#[derive(Clone, Debug)]
pub struct RawGrid {
    pub origin: IVec2,
    pub size: IVec2,
    pub cells: Vec<u8>,
}

impl RawGrid {
    pub fn new(origin: IVec2, size: IVec2, cells: Vec<u8>) -> Self {
        debug_assert_eq!(cells.len(), (size.x * size.y) as usize);
        RawGrid { origin, size, cells }
    }

    /// Build a grid from ASCII rows: `' '` / `'.'` = empty, digits `1..=9`
    /// = solid with that tileset byte, anything else = tileset 1.
    /// Fixture helper for tests and tools.
    pub fn from_rows(rows: &[&str]) -> Self {
        let h = rows.len() as i32;
        let w = rows.first().map_or(0, |r| r.len()) as i32;
        let mut cells = Vec::with_capacity((w * h) as usize);
        for row in rows {
            for ch in row.chars() {
                cells.push(match ch {
                    ' ' | '.' => 0,
                    d @ '1'..='9' => d as u8 - b'0',
                    _ => 1,
                });
            }
        }
        RawGrid::new(IVec2::new(0, 0), IVec2::new(w, h), cells)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || x >= self.size.x || y < 0 || y >= self.size.y {
            None
        } else {
            Some(self.cells[(x + y * self.size.x) as usize])
        }
    }

    /// Out-of-bounds counts as solid: there is no escaping the playfield.
    pub fn solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map_or(true, |b| b != 0)
    }
}

/// The renderable tile grid for one room. Owned by the level; the collision
/// and render layers borrow it read-only.
#[derive(Clone, Debug)]
pub struct TileGrid {
    pub origin: IVec2,
    pub size: IVec2,
    cells: Vec<TileInfo>,
}

impl TileGrid {
    pub fn new(origin: IVec2, size: IVec2, cells: Vec<TileInfo>) -> Self {
        debug_assert_eq!(cells.len(), (size.x * size.y) as usize);
        TileGrid { origin, size, cells }
    }

    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    pub fn get(&self, x: i32, y: i32) -> Option<TileInfo> {
        if x < 0 || x >= self.size.x || y < 0 || y >= self.size.y {
            None
        } else {
            Some(self.cells[(x + y * self.size.x) as usize])
        }
    }

    pub fn cells(&self) -> &[TileInfo] {
        &self.cells
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tileset_index_is_one_based() {
        assert_eq!(TileInfo::EMPTY.tileset_index(), None);
        let t = TileInfo { tileset: 3, tx: 0, ty: 0 };
        assert_eq!(t.tileset_index(), Some(2));
        assert!(!t.is_empty());
    }

    #[test]
    fn raw_grid_from_rows() {
        let g = RawGrid::from_rows(&["#2.", "..."]);
        assert_eq!(g.size, IVec2::new(3, 2));
        assert_eq!(g.get(0, 0), Some(1));
        assert_eq!(g.get(1, 0), Some(2));
        assert_eq!(g.get(2, 0), Some(0));
        assert!(!g.solid(2, 0));
    }

    #[test]
    fn raw_grid_out_of_bounds_is_solid() {
        let g = RawGrid::from_rows(&["."]);
        assert!(g.solid(-1, 0));
        assert!(g.solid(0, 1));
        assert!(!g.solid(0, 0));
    }
}
