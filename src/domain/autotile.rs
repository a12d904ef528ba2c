//! Offline autotiling: raw solid/empty grid → renderable tile indices.
//!
//! ## Shape pass
//!
//! Every solid cell gets an 8-slot neighborhood (out-of-bounds counts as
//! solid) which is matched, in declaration order, against a fixed table of
//! ternary rules. First match wins, so the fully-enclosed rule leads and the
//! corner/edge rules below it can use don't-cares freely. The result is an
//! atlas coordinate within the cell's tileset.
//!
//! ## Flavor pass
//!
//! Fill tiles (no bordering air) come in intensity variants, reduced the
//! further the tile sits from air. A distance-like value is refined over
//! exactly two sweeps, then distances 1 and 2 are remapped through
//! `(x + y) % n` for cheap deterministic variety. Deeper cells keep the
//! saturated start value.
//!
//! ## Combination
//!
//! The column is taken from the flavor for edge rules (raw tx == 0); the row
//! is taken from the flavor only for the fully-enclosed rule (raw tx == 5).
//! This asymmetry is a pinned behavioral contract inherited from how the
//! rule table was authored; do not "fix" it.

use super::tile::{RawGrid, TileGrid, TileInfo};

/// Unknown distance / saturated start value for the flavor sweep.
const FLAVOR_FAR: u8 = 14;

// ══════════════════════════════════════════════════════════════
// Rule table
// ══════════════════════════════════════════════════════════════

/// Ternary pattern slot: don't-care, must-be-empty, must-be-solid.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Trit {
    X, // any
    O, // empty
    I, // solid
}

use Trit::{I, O, X};

impl Trit {
    fn accepts(self, solid: bool) -> bool {
        match self {
            Trit::X => true,
            Trit::O => !solid,
            Trit::I => solid,
        }
    }
}

/// One shape rule: an 8-slot pattern over the neighborhood and the atlas
/// coordinate it selects.
struct Rule {
    pat: [Trit; 8],
    tx: u8,
    ty: u8,
}

const fn rule(pat: [Trit; 8], tx: u8, ty: u8) -> Rule {
    Rule { pat, tx, ty }
}

/// Neighborhood offsets, row-major around the cell:
/// NW N NE / W E / SW S SE.
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Atlas column used by the fully-enclosed rule; its row is replaced by the
/// flavor value.
const ENCLOSED_TX: u8 = 5;

#[rustfmt::skip]
static RULES: [Rule; 31] = [
    // Fully enclosed.
    rule([I, I, I,
          I,    I,
          I, I, I], 5, 0),

    // Single open edge.
    rule([X, O, X,
          I,    I,
          X, I, X], 0, 0),
    rule([X, I, X,
          I,    I,
          X, O, X], 0, 1),
    rule([X, I, X,
          O,    I,
          X, I, X], 0, 2),
    rule([X, I, X,
          I,    O,
          X, I, X], 0, 3),

    // Opposite open edges.
    rule([X, O, X,
          I,    I,
          X, O, X], 0, 4),
    rule([X, I, X,
          O,    O,
          X, I, X], 0, 5),

    // Three open edges.
    rule([X, O, X,
          O,    O,
          X, I, X], 0, 6),
    rule([X, I, X,
          O,    O,
          X, O, X], 0, 7),
    rule([X, O, X,
          O,    I,
          X, O, X], 0, 8),
    rule([X, O, X,
          I,    O,
          X, O, X], 0, 9),

    // Free-standing.
    rule([X, O, X,
          O,    O,
          X, O, X], 0, 10),

    // Adjacent open edges (outer corners).
    rule([X, O, X,
          O,    I,
          X, I, X], 0, 11),
    rule([X, O, X,
          I,    O,
          X, I, X], 0, 12),
    rule([X, I, X,
          O,    I,
          X, O, X], 0, 13),
    rule([X, I, X,
          I,    O,
          X, O, X], 0, 14),

    // One open diagonal (inner corners).
    rule([I, I, I,
          I,    I,
          I, I, O], 4, 0),
    rule([I, I, O,
          I,    I,
          I, I, I], 4, 1),
    rule([I, I, I,
          I,    I,
          O, I, I], 4, 2),
    rule([O, I, I,
          I,    I,
          I, I, I], 4, 3),

    // Two open diagonals.
    rule([I, I, O,
          I,    I,
          I, I, O], 4, 4),
    rule([O, I, O,
          I,    I,
          I, I, I], 4, 5),
    rule([O, I, I,
          I,    I,
          O, I, I], 4, 6),
    rule([I, I, I,
          I,    I,
          O, I, O], 4, 7),

    // Three open diagonals.
    rule([O, I, O,
          I,    I,
          I, I, O], 4, 8),
    rule([O, I, O,
          I,    I,
          O, I, I], 4, 9),
    rule([O, I, I,
          I,    I,
          O, I, O], 4, 10),
    rule([I, I, O,
          I,    I,
          O, I, O], 4, 11),

    // Four open diagonals / opposing pairs.
    rule([O, I, O,
          I,    I,
          O, I, O], 4, 12),
    rule([I, I, O,
          I,    I,
          O, I, I], 4, 13),
    rule([O, I, I,
          I,    I,
          I, I, O], 4, 14),
];

fn matches(neighbors: &[bool; 8], pat: &[Trit; 8]) -> bool {
    neighbors.iter().zip(pat).all(|(&s, t)| t.accepts(s))
}

/// Shape-match one cell: `None` for empty cells or (asserted impossible with
/// the current table) an unmatched neighborhood.
fn shape(raw: &RawGrid, x: i32, y: i32) -> Option<(u8, u8)> {
    if !raw.solid(x, y) {
        return None;
    }
    let mut ns = [false; 8];
    for (slot, (ox, oy)) in ns.iter_mut().zip(NEIGHBORS) {
        *slot = raw.solid(x + ox, y + oy);
    }
    RULES
        .iter()
        .find(|r| matches(&ns, &r.pat))
        .map(|r| (r.tx, r.ty))
}

// ══════════════════════════════════════════════════════════════
// Flavor pass
// ══════════════════════════════════════════════════════════════

/// Per-cell flavor values: distance-to-air refined over exactly two sweeps,
/// then remapped for variety. Empty cells are 0.
fn flavor(raw: &RawGrid) -> Vec<u8> {
    let w = raw.size.x;
    let h = raw.size.y;
    let idx = |x: i32, y: i32| (x + y * w) as usize;

    let mut buf: Vec<u8> = raw
        .cells
        .iter()
        .map(|&b| if b == 0 { 0 } else { FLAVOR_FAR })
        .collect();

    for _ in 0..2 {
        let prev = buf.clone();
        for y in 0..h {
            for x in 0..w {
                let a = buf[idx(x, y)];
                if a <= 1 {
                    continue;
                }
                let mut best = FLAVOR_FAR;
                for (ox, oy) in [(0, -1), (-1, 0), (1, 0), (0, 1)] {
                    let (x2, y2) = (x + ox, y + oy);
                    let b = if x2 < 0 || x2 >= w || y2 < 0 || y2 >= h {
                        FLAVOR_FAR
                    } else {
                        prev[idx(x2, y2)]
                    };
                    best = best.min(b);
                }
                let b = best + 1;
                if a > b {
                    buf[idx(x, y)] = b;
                }
            }
        }
    }

    // Pseudo-random variant pick for the two shallowest depths.
    for y in 0..h {
        for x in 0..w {
            let i = idx(x, y);
            match buf[i] {
                1 => buf[i] = ((x + y) % 4) as u8,
                2 => buf[i] = ((x + y) % 10) as u8,
                _ => {}
            }
        }
    }

    buf
}

// ══════════════════════════════════════════════════════════════
// Entry point
// ══════════════════════════════════════════════════════════════

/// Compute the renderable tile grid for one room. Pure and deterministic.
pub fn compute(raw: &RawGrid) -> TileGrid {
    let flv = flavor(raw);
    let w = raw.size.x;
    let h = raw.size.y;
    let mut cells = Vec::with_capacity((w * h) as usize);

    for y in 0..h {
        for x in 0..w {
            let i = (x + y * w) as usize;
            let info = match shape(raw, x, y) {
                None => TileInfo::EMPTY,
                Some((tx, ty)) => {
                    let fl = flv[i];
                    TileInfo {
                        tileset: raw.cells[i],
                        // Pinned asymmetry, see module docs.
                        tx: if tx != 0 { tx } else { fl },
                        ty: if tx != ENCLOSED_TX { ty } else { fl },
                    }
                }
            };
            cells.push(info);
        }
    }

    TileGrid::new(raw.origin, raw.size, cells)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::RawGrid;

    fn tiles(rows: &[&str]) -> TileGrid {
        compute(&RawGrid::from_rows(rows))
    }

    #[test]
    fn empty_cell_yields_no_tile() {
        let g = tiles(&["...", ".#.", "..."]);
        assert!(g.get(0, 0).unwrap().is_empty());
        assert!(!g.get(1, 1).unwrap().is_empty());
    }

    #[test]
    fn all_solid_center_is_fully_enclosed() {
        let g = tiles(&["###", "###", "###"]);
        let c = g.get(1, 1).unwrap();
        assert_eq!(c.tx, 5);
        // No air anywhere (out-of-bounds counts solid), so the distance
        // sweep never refines below the saturated start value.
        assert_eq!(c.ty, FLAVOR_FAR);
    }

    #[test]
    fn enclosed_row_comes_from_two_pass_distance() {
        // 3x3 solid block with an air ring: the center sits at distance 2.
        let g = tiles(&[
            ".....",
            ".###.",
            ".###.",
            ".###.",
            ".....",
        ]);
        let c = g.get(2, 2).unwrap();
        assert_eq!(c.tx, 5);
        assert_eq!(c.ty, ((2 + 2) % 10) as u8);
    }

    #[test]
    fn deep_interior_keeps_saturated_flavor() {
        // 5x5 solid block with an air ring: the center is 3 cells from air,
        // out of reach of the two refinement sweeps.
        let g = tiles(&[
            ".......",
            ".#####.",
            ".#####.",
            ".#####.",
            ".#####.",
            ".#####.",
            ".......",
        ]);
        let c = g.get(3, 3).unwrap();
        assert_eq!(c.tx, 5);
        assert_eq!(c.ty, FLAVOR_FAR);
    }

    #[test]
    fn edge_rule_column_comes_from_flavor() {
        // Top-middle of the block: air above, solid W/E/S -> edge rule
        // (raw 0,0); its column is the distance-1 flavor (x+y) % 4.
        let g = tiles(&[
            ".....",
            ".###.",
            ".###.",
            ".###.",
            ".....",
        ]);
        let c = g.get(2, 1).unwrap();
        assert_eq!(c.tx, ((2 + 1) % 4) as u8);
        assert_eq!(c.ty, 0);
    }

    #[test]
    fn isolated_cell_matches_free_standing_rule() {
        // All four orthogonal neighbors empty: the free-standing rule
        // (raw 0,10) accepts it, column from flavor.
        let g = tiles(&["...", ".#.", "..."]);
        let c = g.get(1, 1).unwrap();
        assert_eq!(c.ty, 10);
        assert_eq!(c.tx, ((1 + 1) % 4) as u8);
        assert_eq!(c.tileset, 1);
    }

    #[test]
    fn tileset_byte_carried_through() {
        let g = tiles(&["222", "222", "222"]);
        assert_eq!(g.get(1, 1).unwrap().tileset, 2);
    }

    #[test]
    fn every_solid_neighborhood_matches_some_rule() {
        // The table must be total over solid cells: exercise all 256
        // orthogonal+diagonal combinations via 3x3 grids.
        for mask in 0u32..256 {
            let mut cells = vec![0u8; 9];
            cells[4] = 1;
            for (bit, (ox, oy)) in NEIGHBORS.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    cells[((1 + ox) + (1 + oy) * 3) as usize] = 1;
                }
            }
            let raw = RawGrid::new(
                crate::domain::vec2::IVec2::new(0, 0),
                crate::domain::vec2::IVec2::new(3, 3),
                cells,
            );
            assert!(
                shape(&raw, 1, 1).is_some(),
                "no rule for neighborhood mask {mask:#010b}"
            );
        }
    }
}
