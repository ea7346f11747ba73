//! Actor classification: tags and collision layers.
//!
//! Tags answer "what is this actor" (the player, an enemy). Layers are a
//! bitmask used to filter spatial queries, so a player's swing only looks at
//! enemies and an enemy projectile only looks at the player.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// What kind of actor an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorTag {
    /// The player character.
    Player,
    /// A hostile actor driven by an enemy brain.
    Enemy,
}

impl ActorTag {
    /// The collision layer actors with this tag live on.
    #[must_use]
    pub const fn layer(self) -> LayerMask {
        match self {
            Self::Player => LayerMask::PLAYER,
            Self::Enemy => LayerMask::ENEMY,
        }
    }

    /// The layers this tag's attacks are allowed to hit.
    #[must_use]
    pub const fn hostile_layers(self) -> LayerMask {
        match self {
            Self::Player => LayerMask::ENEMY,
            Self::Enemy => LayerMask::PLAYER,
        }
    }
}

/// Bitmask of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// The player layer.
    pub const PLAYER: Self = Self(1);
    /// The enemy layer.
    pub const ENEMY: Self = Self(1 << 1);
    /// Static level geometry (ground, walls).
    pub const ENVIRONMENT: Self = Self(1 << 2);
    /// Matches every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Checks whether any layer of `other` is set in this mask.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Checks whether this mask is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
