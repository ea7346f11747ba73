//! # Skirmish Gameplay
//!
//! The combat core of a side-scrolling action game.
//!
//! This crate provides the engine-agnostic gameplay layer:
//! - Health with invincibility, hit flash and death
//! - Cooldowns and phase clocks for timed actions
//! - Melee hit resolution and the player's combo attack
//! - Enemy state machine with melee and ranged engagement policies
//! - Projectile lifecycle (travel, hit, fade, removal)
//! - Checkpoints, death zones and level restart
//! - Event bus for presentation and gameplay notifications
//! - Fixed-step simulation driver tying it all together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod ai;
pub mod combat;
pub mod config;
pub mod cooldown;
pub mod engagement;
pub mod events;
pub mod health;
pub mod level;
pub mod melee_combat;
pub mod physics;
pub mod projectile;
pub mod restart;
pub mod simulation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actor::*;
    pub use crate::ai::*;
    pub use crate::combat::*;
    pub use crate::config::*;
    pub use crate::cooldown::*;
    pub use crate::engagement::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::level::*;
    pub use crate::melee_combat::*;
    pub use crate::physics::*;
    pub use crate::projectile::*;
    pub use crate::restart::*;
    pub use crate::simulation::*;
}

pub use prelude::*;
