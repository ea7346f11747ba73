//! Level triggers: checkpoints and death zones.

use serde::{Deserialize, Serialize};

use skirmish_common::{CheckpointId, Vec2};

use crate::actor::Actor;
use crate::physics::Aabb;

/// A respawn point the player lights by walking into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// ID.
    pub id: CheckpointId,
    /// Respawn position.
    pub position: Vec2,
    /// Trigger radius.
    pub radius: f32,
    /// Only the first touch counts.
    pub one_time_use: bool,
    activated: bool,
    occupied: bool,
}

impl Checkpoint {
    /// Unlit checkpoint.
    #[must_use]
    pub fn new(id: CheckpointId, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            position,
            radius: radius.max(0.0),
            one_time_use: true,
            activated: false,
            occupied: false,
        }
    }

    /// Allow re-activation every time the player re-enters.
    #[must_use]
    pub fn reusable(mut self) -> Self {
        self.one_time_use = false;
        self
    }

    /// Whether it has ever been activated.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Feed the player's body. Returns true on the tick the player enters
    /// and the checkpoint may (re)activate.
    pub fn update(&mut self, player: &Actor) -> bool {
        let inside = player.is_alive()
            && player.position.distance(self.position) <= self.radius + player.body_radius;
        let entered = inside && !self.occupied;
        self.occupied = inside;

        if !entered || (self.one_time_use && self.activated) {
            return false;
        }
        self.activated = true;
        true
    }
}

/// What a death zone does to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathZoneEffect {
    /// Kill outright.
    InstantKill,
    /// Apply this much damage.
    Damage(i32),
}

/// A region that kills or hurts the player (pits, spikes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathZone {
    /// Region.
    pub bounds: Aabb,
    /// Effect on touch.
    pub effect: DeathZoneEffect,
    /// Request a level restart on touch.
    pub restart_on_touch: bool,
}

impl DeathZone {
    /// Instant-kill zone that restarts the level.
    #[must_use]
    pub fn pit(bounds: Aabb) -> Self {
        Self {
            bounds,
            effect: DeathZoneEffect::InstantKill,
            restart_on_touch: true,
        }
    }

    /// Damaging zone that leaves restart to the death handling.
    #[must_use]
    pub fn hazard(bounds: Aabb, damage: i32) -> Self {
        Self {
            bounds,
            effect: DeathZoneEffect::Damage(damage),
            restart_on_touch: false,
        }
    }

    /// Whether a live actor's body touches the zone.
    #[must_use]
    pub fn touches(&self, actor: &Actor) -> bool {
        actor.is_alive() && self.bounds.intersects_circle(actor.position, actor.body_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthConfig;
    use skirmish_common::ActorTag;

    fn player_at(x: f32) -> Actor {
        Actor::new(ActorTag::Player, Vec2::new(x, 0.0), HealthConfig::player())
    }

    #[test]
    fn test_checkpoint_fires_on_enter_only() {
        let mut cp = Checkpoint::new(CheckpointId::new(1), Vec2::new(5.0, 0.0), 1.0).reusable();
        assert!(!cp.update(&player_at(0.0)));
        assert!(cp.update(&player_at(5.0)));
        assert!(!cp.update(&player_at(5.2)));
        assert!(!cp.update(&player_at(0.0)));
        assert!(cp.update(&player_at(5.0)));
    }

    #[test]
    fn test_one_time_checkpoint() {
        let mut cp = Checkpoint::new(CheckpointId::new(1), Vec2::ZERO, 1.0);
        assert!(cp.update(&player_at(0.0)));
        cp.update(&player_at(10.0));
        assert!(!cp.update(&player_at(0.0)));
        assert!(cp.is_activated());
    }

    #[test]
    fn test_death_zone_touch() {
        let pit = DeathZone::pit(Aabb::new(Vec2::new(-1.0, -5.0), Vec2::new(1.0, -1.0)));
        let mut falling = player_at(0.0);
        falling.position.y = -0.8;
        assert!(pit.touches(&falling));
        falling.health.die();
        assert!(!pit.touches(&falling));
        assert!(!pit.touches(&player_at(3.0)));
    }
}
