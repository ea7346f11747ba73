//! 2D positions and facing.
//!
//! Positions are `glam::Vec2` in world units with +X to the right. Side-view
//! actors only ever face left or right.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Minimum length below which a direction is treated as zero.
pub const DIRECTION_EPSILON: f32 = 0.0001;

/// Horizontal facing of a side-view actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing towards -X.
    Left,
    /// Facing towards +X.
    #[default]
    Right,
}

impl Facing {
    /// Returns -1.0 for left, +1.0 for right.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Returns the opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Facing for a horizontal direction. Zero keeps `fallback`.
    #[must_use]
    pub fn from_direction(dx: f32, fallback: Self) -> Self {
        if dx > 0.0 {
            Self::Right
        } else if dx < 0.0 {
            Self::Left
        } else {
            fallback
        }
    }

    /// Facing that looks from `from` towards `to` along X.
    #[must_use]
    pub fn towards(from: Vec2, to: Vec2, fallback: Self) -> Self {
        Self::from_direction(to.x - from.x, fallback)
    }

    /// Unit vector along this facing.
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.sign(), 0.0)
    }
}

/// Normalized direction from `from` to `to`, or zero when they coincide.
#[must_use]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    if delta.length() < DIRECTION_EPSILON {
        Vec2::ZERO
    } else {
        delta.normalize()
    }
}
