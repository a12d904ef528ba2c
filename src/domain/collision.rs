//! AABB-vs-tile-grid queries for one room.
//!
//! Coordinates are in tile units; an entity rect that merely touches a cell
//! boundary does not overlap the cell on the far side. Everything outside
//! the room counts as solid, so rooms never leak.

use super::tile::TileGrid;
use super::vec2::{Rect, Vec2};

pub struct CollisionWorld<'a> {
    grid: &'a TileGrid,
}

impl<'a> CollisionWorld<'a> {
    pub fn new(grid: &'a TileGrid) -> Self {
        Self { grid }
    }

    /// Is the cell at local coordinates solid? Out-of-bounds is solid.
    pub fn solid_cell(&self, x: i32, y: i32) -> bool {
        match self.grid.get(x, y) {
            None => true,
            Some(t) => !t.is_empty(),
        }
    }

    /// Does `rect` overlap any solid cell?
    pub fn overlaps(&self, rect: Rect) -> bool {
        // ceil - 1 excludes a rect whose edge exactly touches the next
        // column/row.
        let x0 = rect.left().floor() as i32;
        let x1 = rect.right().ceil() as i32 - 1;
        let y0 = rect.top().floor() as i32;
        let y1 = rect.bottom().ceil() as i32 - 1;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if self.solid_cell(x, y) {
                    return true;
                }
            }
        }
        false
    }

    /// Convenience for a box placed at `pos` with `size`.
    pub fn free(&self, pos: Vec2, size: Vec2) -> bool {
        !self.overlaps(Rect { pos, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::autotile;
    use crate::domain::tile::RawGrid;
    use crate::domain::vec2::Vec2;

    fn world(rows: &[&str]) -> TileGrid {
        autotile::compute(&RawGrid::from_rows(rows))
    }

    #[test]
    fn out_of_bounds_is_solid() {
        let g = world(&["...", "...", "..."]);
        let cw = CollisionWorld::new(&g);
        assert!(cw.solid_cell(-1, 0));
        assert!(cw.solid_cell(0, 3));
        assert!(!cw.solid_cell(1, 1));
    }

    #[test]
    fn rect_touching_boundary_does_not_overlap() {
        let g = world(&["....", "....", "####"]);
        let cw = CollisionWorld::new(&g);
        // Feet exactly on top of the floor row.
        assert!(cw.free(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)));
        // A hair lower and it overlaps.
        assert!(!cw.free(Vec2::new(1.0, 1.001), Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn rect_spanning_cells_checks_all_of_them() {
        let g = world(&["..#.", "....", "...."]);
        let cw = CollisionWorld::new(&g);
        assert!(cw.overlaps(Rect {
            pos: Vec2::new(1.5, 0.2),
            size: Vec2::new(1.0, 0.5),
        }));
        assert!(cw.free(Vec2::new(0.2, 0.2), Vec2::new(1.0, 0.5)));
    }
}
