//! Level restart: snapshots taken at spawn, restored on request.
//!
//! This module provides:
//! - `Restartable`, the capability of an object that can be snapshotted and reset
//! - `RestartSnapshot`, the state an actor is reset to
//! - `RestartCoordinator`, the registry plus the deferred restart timer and
//!   the active checkpoint
//!
//! Restarts never happen mid-tick. A request arms a timer; the simulation
//! polls it at the start of a tick and restores everything at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use skirmish_common::{ActorTag, CheckpointId, EntityId, Facing, Vec2};

use crate::actor::{Actor, World};
use crate::cooldown::Cooldown;
use crate::health::Capabilities;

/// State an object is put back into on restart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestartSnapshot {
    /// Position.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Scale.
    pub scale: Vec2,
    /// Facing.
    pub facing: Facing,
    /// Velocity.
    pub velocity: Vec2,
    /// Active flag.
    pub active: bool,
    /// Movement/collision switches.
    pub capabilities: Capabilities,
    /// Hit points.
    pub health: i32,
}

/// Something the level restart can snapshot and reset.
pub trait Restartable {
    /// Capture current state.
    fn snapshot(&self) -> RestartSnapshot;

    /// Put state back. Applying the same snapshot twice is the same as once.
    fn restore(&mut self, snapshot: &RestartSnapshot);
}

impl Restartable for Actor {
    fn snapshot(&self) -> RestartSnapshot {
        RestartSnapshot {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            facing: self.facing,
            velocity: self.velocity,
            active: self.active,
            capabilities: self.health.capabilities(),
            health: self.health.current(),
        }
    }

    fn restore(&mut self, snapshot: &RestartSnapshot) {
        self.position = snapshot.position;
        self.rotation = snapshot.rotation;
        self.scale = snapshot.scale;
        self.facing = snapshot.facing;
        self.velocity = snapshot.velocity;
        self.knockback = Vec2::ZERO;
        self.active = snapshot.active;
        self.health.on_restart(snapshot.health);
        self.health.set_capabilities(snapshot.capabilities);
    }
}

/// Restart timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    /// Seconds between a restart request and the restore.
    pub restart_delay: f32,
    /// Extra seconds between the player's death and the restart request.
    pub respawn_delay: f32,
    /// Respawn the player at the active checkpoint.
    pub use_checkpoints: bool,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            restart_delay: 1.5,
            respawn_delay: 1.5,
            use_checkpoints: true,
        }
    }
}

/// Snapshot registry and deferred restart.
#[derive(Debug, Clone, Default)]
pub struct RestartCoordinator {
    config: RestartConfig,
    snapshots: BTreeMap<EntityId, RestartSnapshot>,
    pending: Option<Cooldown>,
    checkpoint: Option<(CheckpointId, Vec2)>,
}

impl RestartCoordinator {
    /// Empty coordinator.
    #[must_use]
    pub fn new(config: RestartConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Timing.
    #[must_use]
    pub fn config(&self) -> &RestartConfig {
        &self.config
    }

    /// Record the spawn snapshot. Later calls for the same ID are ignored.
    pub fn register(&mut self, id: EntityId, snapshot: RestartSnapshot) {
        self.snapshots.entry(id).or_insert(snapshot);
    }

    /// Spawn snapshot of an object.
    #[must_use]
    pub fn snapshot_of(&self, id: EntityId) -> Option<&RestartSnapshot> {
        self.snapshots.get(&id)
    }

    /// Number of registered objects.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.snapshots.len()
    }

    /// Arm the restart timer. Ignored if a restart is already pending.
    pub fn request_restart(&mut self, delay: f32) -> bool {
        if self.pending.is_some() {
            debug!("Restart already pending, ignoring request");
            return false;
        }
        info!("Level restart in {delay:.2}s");
        self.pending = Some(Cooldown::armed(delay));
        true
    }

    /// Request a restart after the configured delay.
    pub fn request_default_restart(&mut self) -> bool {
        self.request_restart(self.config.restart_delay)
    }

    /// Delay used after the player dies.
    #[must_use]
    pub fn death_restart_delay(&self) -> f32 {
        self.config.respawn_delay + self.config.restart_delay
    }

    /// Whether a restart is armed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance the timer. Returns true once, when the restore is due.
    pub fn poll(&mut self, dt: f32) -> bool {
        let Some(timer) = self.pending.as_mut() else {
            return false;
        };
        timer.tick(dt);
        if timer.is_ready() {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Make `position` the player's respawn point.
    pub fn set_checkpoint(&mut self, id: CheckpointId, position: Vec2) {
        info!("Checkpoint {} set at ({:.2}, {:.2})", id.raw(), position.x, position.y);
        self.checkpoint = Some((id, position));
    }

    /// Active checkpoint.
    #[must_use]
    pub fn checkpoint(&self) -> Option<(CheckpointId, Vec2)> {
        self.checkpoint
    }

    /// Where the player comes back: the checkpoint if enabled and set,
    /// otherwise its spawn snapshot.
    #[must_use]
    pub fn respawn_position(&self, player: EntityId) -> Option<Vec2> {
        if self.config.use_checkpoints {
            if let Some((_, position)) = self.checkpoint {
                return Some(position);
            }
        }
        self.snapshots.get(&player).map(|s| s.position)
    }

    /// Restore every registered actor still in the world. Entries whose actor
    /// is gone are skipped. Returns how many were restored.
    pub fn restore_all(&self, world: &mut World) -> usize {
        let mut restored = 0;
        for (id, snapshot) in &self.snapshots {
            let Some(actor) = world.get_mut(*id) else {
                debug!("Skipping restore of missing actor {id}");
                continue;
            };
            actor.restore(snapshot);
            if actor.tag == ActorTag::Player {
                if let Some(position) = self.respawn_position(*id) {
                    actor.position = position;
                }
            }
            restored += 1;
        }
        restored
    }
}
