//! Melee hit resolution.
//!
//! A strike is a circle in the world: everything hostile inside it takes
//! damage, gets pushed away from the attacker and plays a hurt cue. The
//! resolver reports what it hit so the caller can raise hit feedback and
//! forward health outcomes as events.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use skirmish_common::{direction_to, EntityId, LayerMask, SkirmishError, Vec2};

use crate::actor::World;
use crate::events::{AnimationCue, EffectKind, Presentation, SoundKind};
use crate::health::HealthOutcome;
use crate::physics::SpatialQuery;

/// Errors that can occur during combat.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// Attacker not present in the world.
    #[error("attacker not found: {0}")]
    AttackerNotFound(EntityId),
    /// Strike radius was negative or not finite.
    #[error("invalid strike radius: {0}")]
    InvalidRadius(f32),
}

impl From<CombatError> for SkirmishError {
    fn from(err: CombatError) -> Self {
        match err {
            CombatError::AttackerNotFound(id) => SkirmishError::missing(id, "attacker"),
            CombatError::InvalidRadius(r) => {
                SkirmishError::invalid("strike.radius", format!("{r} is not a usable radius"))
            },
        }
    }
}

/// Result type for combat operations.
pub type CombatResult<T> = Result<T, CombatError>;

/// One melee hit-scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeStrike {
    /// Attacking actor (never hit by its own strike).
    pub attacker: EntityId,
    /// Center of the hit circle.
    pub origin: Vec2,
    /// Radius of the hit circle.
    pub radius: f32,
    /// Damage per target.
    pub damage: i32,
    /// Knockback impulse magnitude.
    pub knockback: f32,
    /// Layers that can be hit.
    pub targets: LayerMask,
}

impl MeleeStrike {
    /// Create a strike with no knockback.
    #[must_use]
    pub fn new(attacker: EntityId, origin: Vec2, radius: f32, damage: i32, targets: LayerMask) -> Self {
        Self {
            attacker,
            origin,
            radius,
            damage,
            knockback: 0.0,
            targets,
        }
    }

    /// Set knockback impulse.
    #[must_use]
    pub fn with_knockback(mut self, knockback: f32) -> Self {
        self.knockback = knockback;
        self
    }
}

/// A single target struck by a melee attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeHit {
    /// Target hit.
    pub target: EntityId,
    /// What the damage did.
    pub outcome: HealthOutcome,
    /// Impulse applied.
    pub knockback: Vec2,
}

/// Everything a strike hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeleeOutcome {
    /// Hits in target ID order.
    pub hits: Vec<MeleeHit>,
}

impl MeleeOutcome {
    /// Whether the strike connected with anything.
    #[must_use]
    pub fn hit_any(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Camera-shake style feedback signal; raised whenever anything was hit.
    #[must_use]
    pub fn feedback(&self) -> bool {
        self.hit_any()
    }

    /// Targets killed by this strike.
    pub fn kills(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.hits
            .iter()
            .filter(|h| h.outcome.is_death())
            .map(|h| h.target)
    }
}

/// Resolve a melee strike against the world.
///
/// Every collidable actor on the strike's target layers inside the circle
/// (except the attacker) takes `damage`, receives an impulse of `knockback`
/// along `normalize(target - attacker)`, and gets a hurt cue and hit effect.
/// A hit sound plays once if anything was hit.
pub fn resolve_melee_attack<P: Presentation + ?Sized>(
    strike: &MeleeStrike,
    world: &mut World,
    presentation: &P,
) -> CombatResult<MeleeOutcome> {
    if !strike.radius.is_finite() || strike.radius < 0.0 {
        return Err(CombatError::InvalidRadius(strike.radius));
    }
    let attacker_pos = world
        .get(strike.attacker)
        .map(|a| a.position)
        .ok_or(CombatError::AttackerNotFound(strike.attacker))?;

    let targets = world.overlap_circle(strike.origin, strike.radius, strike.targets);
    let mut outcome = MeleeOutcome::default();

    for target in targets {
        if target == strike.attacker {
            continue;
        }
        let Some(actor) = world.get_mut(target) else {
            continue;
        };

        let health = actor.health.take_damage(strike.damage);
        let knockback = direction_to(attacker_pos, actor.position) * strike.knockback;
        actor.apply_impulse(knockback);

        presentation.play_animation_cue(target, AnimationCue::Hurt);
        presentation.spawn_visual_effect(EffectKind::HitSpark, actor.position);

        debug!(
            "Strike from {} hit {} for {} ({:?})",
            strike.attacker, target, strike.damage, health
        );
        outcome.hits.push(MeleeHit {
            target,
            outcome: health,
            knockback,
        });
    }

    if outcome.hit_any() {
        presentation.play_sound(SoundKind::MeleeHit);
    }
    Ok(outcome)
}
