//! Collision detection for axis-aligned rectangles
//!
//! Every hit in the game (missile vs enemy, missile vs player, missile vs
//! barricade, enemy vs barricade) goes through [`overlaps`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle, y growing downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Whether `value` lies strictly between `lo` and `hi`
#[inline]
fn strictly_within(value: f32, lo: f32, hi: f32) -> bool {
    value > lo && value < hi
}

/// Edge-based overlap test between two rectangles
///
/// `a` hits `b` when one of `a`'s vertical edges lies strictly inside `b`'s
/// x-span and one of `a`'s horizontal edges lies strictly inside `b`'s
/// y-span. Touching edges never count.
///
/// The test is not symmetric: `b` fully inside `a` is a miss, as is a pair
/// of rectangles with identical spans. Callers always pass the smaller,
/// moving body (missile, enemy) as `a`.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    let x_hit = strictly_within(a.x, b.x, b.right()) || strictly_within(a.right(), b.x, b.right());
    let y_hit =
        strictly_within(a.y, b.y, b.bottom()) || strictly_within(a.bottom(), b.y, b.bottom());
    x_hit && y_hit
}
