//! Float vector / rectangle math for the simulation.
//!
//! Coordinates are room-local tile units. +x points right, +y points DOWN
//! (matching tile row order), so gravity is positive y and jumps are
//! negative y.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Sign of a value as -1 / 0 / +1, preserving the float type.
#[inline]
pub fn signum(a: f32) -> f32 {
    if a < 0.0 {
        -1.0
    } else if a > 0.0 {
        1.0
    } else {
        0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit-length copy; the zero vector stays zero.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        self.scale(s)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Integer cell coordinate (grid indices, room origins).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

impl IVec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        IVec2 { x, y }
    }
}

/// Axis-aligned rectangle: top-left corner + size, in tile units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Rect { pos, size }
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signum_basics() {
        assert_eq!(signum(-3.5), -1.0);
        assert_eq!(signum(0.0), 0.0);
        assert_eq!(signum(0.001), 1.0);
    }

    #[test]
    fn normalized_diagonal() {
        let v = Vec2::new(1.0, 1.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn normalized_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    }

    #[test]
    fn rect_edges() {
        let r = Rect::new(Vec2::new(2.0, 3.0), Vec2::new(0.7, 1.0));
        assert_eq!(r.left(), 2.0);
        assert_eq!(r.right(), 2.7);
        assert_eq!(r.top(), 3.0);
        assert_eq!(r.bottom(), 4.0);
    }
}
