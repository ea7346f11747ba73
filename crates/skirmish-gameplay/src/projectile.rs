//! Projectile lifecycle.
//!
//! ```text
//! Traveling ──hit target / hit obstacle / lifetime─▶ FadingOut ──fade done─▶ Removed
//! ```
//!
//! A projectile damages at most one thing: the first accepted contact sets
//! `has_hit`, stops it, and disables collision. Collision stays off for the
//! whole fade whatever started it. Expiry starts the fade early enough that
//! the projectile is gone exactly `lifetime` seconds after spawning.

use serde::{Deserialize, Serialize};
use tracing::debug;

use skirmish_common::{EntityId, LayerMask, Vec2};

use crate::actor::World;
use crate::cooldown::PhaseClock;
use crate::events::{AnimationCue, EffectKind, Presentation};
use crate::health::HealthOutcome;
use crate::physics::{Aabb, SpatialQuery};

/// Tuning shared by all projectiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Seconds from spawn to removal when nothing is hit.
    pub lifetime: f32,
    /// Seconds to fade out.
    pub fade_out_duration: f32,
    /// Collision radius.
    pub radius: f32,
    /// Whether an owner's death fades out its projectiles in flight.
    pub despawn_on_owner_death: bool,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            lifetime: 5.0,
            fade_out_duration: 0.5,
            radius: 0.15,
            despawn_on_owner_death: false,
        }
    }
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectilePhase {
    /// Moving and able to hit.
    Traveling,
    /// Fading out; no collision.
    FadingOut,
    /// Gone.
    Removed,
}

/// Why a projectile stopped traveling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileEnd {
    /// Hit an actor.
    HitTarget(EntityId),
    /// Hit level geometry.
    HitObstacle,
    /// Ran out of lifetime.
    Expired,
    /// Owner died.
    OwnerDied,
}

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Unique ID.
    pub id: EntityId,
    /// Actor that fired it.
    pub owner: EntityId,
    /// Current position.
    pub position: Vec2,
    /// Velocity (units/sec).
    pub velocity: Vec2,
    /// Damage on hit.
    pub damage: i32,
    /// Layers it can hit.
    pub targets: LayerMask,
    /// Collision radius.
    pub radius: f32,
    remaining_lifetime: f32,
    fade_out_duration: f32,
    has_hit: bool,
    clock: PhaseClock<ProjectilePhase>,
    end: Option<ProjectileEnd>,
}

impl Projectile {
    /// Create a traveling projectile.
    #[must_use]
    pub fn spawn(
        owner: EntityId,
        position: Vec2,
        velocity: Vec2,
        damage: i32,
        targets: LayerMask,
        config: &ProjectileConfig,
    ) -> Self {
        Self {
            id: EntityId::new(),
            owner,
            position,
            velocity,
            damage,
            targets,
            radius: config.radius,
            remaining_lifetime: config.lifetime,
            fade_out_duration: config.fade_out_duration.max(0.0),
            has_hit: false,
            clock: PhaseClock::new(ProjectilePhase::Traveling),
            end: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ProjectilePhase {
        self.clock.phase()
    }

    /// Whether a contact has been accepted.
    #[must_use]
    pub fn has_hit(&self) -> bool {
        self.has_hit
    }

    /// Why it stopped traveling, once it has.
    #[must_use]
    pub fn end_reason(&self) -> Option<ProjectileEnd> {
        self.end
    }

    /// Seconds of life left.
    #[must_use]
    pub fn remaining_lifetime(&self) -> f32 {
        self.remaining_lifetime
    }

    /// Whether contacts are accepted.
    #[must_use]
    pub fn collision_enabled(&self) -> bool {
        self.clock.is(ProjectilePhase::Traveling) && !self.has_hit
    }

    /// Whether it has been removed.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.clock.is(ProjectilePhase::Removed)
    }

    /// 1.0 while traveling, falling linearly to 0.0 over the fade.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        match self.clock.phase() {
            ProjectilePhase::Traveling => 1.0,
            ProjectilePhase::FadingOut => 1.0 - self.clock.progress(self.fade_out_duration),
            ProjectilePhase::Removed => 0.0,
        }
    }

    /// Collision box.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.radius, self.radius)
    }

    /// Advance movement, lifetime and fade. Returns true on the tick it is removed.
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.clock.phase() {
            ProjectilePhase::Traveling => {
                self.position += self.velocity * dt;
                self.remaining_lifetime -= dt;
                if self.remaining_lifetime <= self.fade_out_duration {
                    let overshoot = self.fade_out_duration - self.remaining_lifetime.max(0.0);
                    self.begin_fade(ProjectileEnd::Expired);
                    return self.advance_fade(overshoot);
                }
                false
            },
            ProjectilePhase::FadingOut => {
                if !self.has_hit {
                    self.position += self.velocity * dt;
                }
                self.remaining_lifetime -= dt;
                self.advance_fade(dt)
            },
            ProjectilePhase::Removed => false,
        }
    }

    /// Accept a contact. Returns false if it was already spent or fading.
    pub fn register_hit(&mut self, end: ProjectileEnd) -> bool {
        if !self.collision_enabled() {
            return false;
        }
        self.has_hit = true;
        self.velocity = Vec2::ZERO;
        self.begin_fade(end);
        true
    }

    /// Stop traveling without hitting anything.
    pub fn fade_out(&mut self, end: ProjectileEnd) {
        if self.clock.is(ProjectilePhase::Traveling) {
            self.begin_fade(end);
        }
    }

    fn begin_fade(&mut self, end: ProjectileEnd) {
        self.end = Some(end);
        self.clock.enter(ProjectilePhase::FadingOut);
    }

    fn advance_fade(&mut self, dt: f32) -> bool {
        self.clock.advance(dt);
        if self
            .clock
            .try_complete(self.fade_out_duration, ProjectilePhase::Removed)
        {
            return true;
        }
        false
    }
}

/// A projectile connecting with something this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileImpact {
    /// Projectile.
    pub projectile: EntityId,
    /// Who fired it.
    pub owner: EntityId,
    /// Actor hit, `None` for geometry.
    pub target: Option<EntityId>,
    /// Where.
    pub position: Vec2,
    /// What the damage did.
    pub outcome: HealthOutcome,
}

/// Result of one projectile tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectileReport {
    /// Impacts in projectile order.
    pub impacts: Vec<ProjectileImpact>,
    /// Projectiles removed this tick.
    pub removed: Vec<EntityId>,
}

/// Owns every projectile in the level.
#[derive(Debug, Clone, Default)]
pub struct ProjectileSystem {
    config: ProjectileConfig,
    projectiles: Vec<Projectile>,
}

impl ProjectileSystem {
    /// Empty system.
    #[must_use]
    pub fn new(config: ProjectileConfig) -> Self {
        Self {
            config,
            projectiles: Vec::new(),
        }
    }

    /// Tuning.
    #[must_use]
    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    /// Fire a projectile.
    pub fn spawn(
        &mut self,
        owner: EntityId,
        position: Vec2,
        velocity: Vec2,
        damage: i32,
        targets: LayerMask,
    ) -> EntityId {
        let projectile = Projectile::spawn(owner, position, velocity, damage, targets, &self.config);
        let id = projectile.id;
        debug!("Projectile {id} fired by {owner}");
        self.projectiles.push(projectile);
        id
    }

    /// Look up a projectile.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Projectiles in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Whether there are no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Fade out every traveling projectile fired by `owner`. Returns how many.
    pub fn despawn_owned_by(&mut self, owner: EntityId) -> usize {
        let mut count = 0;
        for projectile in &mut self.projectiles {
            if projectile.owner == owner && projectile.phase() == ProjectilePhase::Traveling {
                projectile.fade_out(ProjectileEnd::OwnerDied);
                count += 1;
            }
        }
        count
    }

    /// Drop everything (level restart).
    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    /// Move projectiles, resolve contacts, apply damage, and drop finished ones.
    pub fn tick<P: Presentation + ?Sized>(
        &mut self,
        dt: f32,
        world: &mut World,
        presentation: &P,
    ) -> ProjectileReport {
        let mut report = ProjectileReport::default();

        for projectile in &mut self.projectiles {
            if projectile.advance(dt) {
                report.removed.push(projectile.id);
                continue;
            }
            if !projectile.collision_enabled() {
                continue;
            }

            let owner = projectile.owner;
            let contacts = world.overlap_circle(projectile.position, projectile.radius, projectile.targets);
            let mut impact = None;
            for target in contacts.into_iter().filter(|t| *t != owner) {
                if !projectile.register_hit(ProjectileEnd::HitTarget(target)) {
                    continue;
                }
                let outcome = world
                    .get_mut(target)
                    .map_or(HealthOutcome::Unchanged, |a| a.health.take_damage(projectile.damage));
                presentation.play_animation_cue(target, AnimationCue::Hurt);
                impact = Some((Some(target), outcome));
            }

            if impact.is_none()
                && world.overlaps_obstacle(&projectile.bounds())
                && projectile.register_hit(ProjectileEnd::HitObstacle)
            {
                impact = Some((None, HealthOutcome::Unchanged));
            }

            if let Some((target, outcome)) = impact {
                presentation.spawn_visual_effect(EffectKind::ProjectileImpact, projectile.position);
                report.impacts.push(ProjectileImpact {
                    projectile: projectile.id,
                    owner: projectile.owner,
                    target,
                    position: projectile.position,
                    outcome,
                });
            }
        }

        self.projectiles.retain(|p| !p.is_removed());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::events::NullPresentation;
    use crate::health::HealthConfig;
    use skirmish_common::ActorTag;

    fn test_owner() -> EntityId {
        EntityId::from_raw(1)
    }

    fn shot(config: &ProjectileConfig) -> Projectile {
        Projectile::spawn(
            test_owner(),
            Vec2::ZERO,
            Vec2::new(8.0, 0.0),
            10,
            LayerMask::PLAYER,
            config,
        )
    }

    fn player_at(raw: u64, x: f32) -> Actor {
        Actor::new(ActorTag::Player, Vec2::new(x, 0.0), HealthConfig::player())
            .with_id(EntityId::from_raw(raw))
    }

    #[test]
    fn test_single_hit_guard() {
        let mut p = shot(&ProjectileConfig::default());
        assert!(p.register_hit(ProjectileEnd::HitTarget(EntityId::from_raw(2))));
        assert!(!p.register_hit(ProjectileEnd::HitTarget(EntityId::from_raw(3))));
        assert!(p.has_hit());
        assert_eq!(p.velocity, Vec2::ZERO);
        assert_eq!(p.phase(), ProjectilePhase::FadingOut);
    }

    #[test]
    fn test_expiry_fades_within_lifetime() {
        let config = ProjectileConfig::default();
        let mut p = shot(&config);

        for _ in 0..46 {
            assert!(!p.advance(0.1));
        }
        assert_eq!(p.phase(), ProjectilePhase::FadingOut);
        assert_eq!(p.end_reason(), Some(ProjectileEnd::Expired));
        assert!(!p.collision_enabled());
        assert!(p.opacity() <= 1.0);

        let mut removed = false;
        for _ in 0..6 {
            removed |= p.advance(0.1);
        }
        assert!(removed);
        assert!(p.is_removed());
        assert_eq!(p.opacity(), 0.0);
    }

    #[test]
    fn test_opacity_interpolates() {
        let mut p = shot(&ProjectileConfig::default());
        p.register_hit(ProjectileEnd::HitObstacle);
        assert_eq!(p.opacity(), 1.0);
        p.advance(0.25);
        assert!((p.opacity() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_two_overlapping_targets_take_one_hit() {
        let mut world = World::default();
        world.spawn(player_at(2, 0.5));
        world.spawn(player_at(3, 0.55));

        let mut system = ProjectileSystem::default();
        system.spawn(test_owner(), Vec2::ZERO, Vec2::new(8.0, 0.0), 10, LayerMask::PLAYER);

        let report = system.tick(0.05, &mut world, &NullPresentation);
        assert_eq!(report.impacts.len(), 1);
        assert_eq!(report.impacts[0].target, Some(EntityId::from_raw(2)));

        let damaged: Vec<i32> = world.actors().map(|a| a.health.current()).collect();
        assert_eq!(damaged, vec![90, 100]);

        let again = system.tick(0.05, &mut world, &NullPresentation);
        assert!(again.impacts.is_empty());
    }

    #[test]
    fn test_obstacle_stops_projectile() {
        let mut world = World::default();
        world.add_obstacle(Aabb::new(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0)));
        let mut system = ProjectileSystem::default();
        let id = system.spawn(test_owner(), Vec2::ZERO, Vec2::new(8.0, 0.0), 10, LayerMask::PLAYER);

        system.tick(0.1, &mut world, &NullPresentation);
        let report = system.tick(0.1, &mut world, &NullPresentation);
        assert_eq!(report.impacts.len(), 1);
        assert_eq!(report.impacts[0].target, None);
        assert_eq!(
            system.get(id).and_then(Projectile::end_reason),
            Some(ProjectileEnd::HitObstacle)
        );

        for _ in 0..6 {
            system.tick(0.1, &mut world, &NullPresentation);
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_owner_is_never_hit() {
        let mut world = World::default();
        world.spawn(player_at(1, 0.0));
        let mut system = ProjectileSystem::default();
        system.spawn(test_owner(), Vec2::ZERO, Vec2::new(1.0, 0.0), 10, LayerMask::PLAYER);
        assert!(system.tick(0.01, &mut world, &NullPresentation).impacts.is_empty());
    }

    #[test]
    fn test_despawn_owned_by() {
        let mut system = ProjectileSystem::default();
        system.spawn(test_owner(), Vec2::ZERO, Vec2::X, 10, LayerMask::PLAYER);
        system.spawn(EntityId::from_raw(9), Vec2::ZERO, Vec2::X, 10, LayerMask::PLAYER);
        assert_eq!(system.despawn_owned_by(test_owner()), 1);
        assert_eq!(system.despawn_owned_by(test_owner()), 0);
        assert_eq!(
            system
                .iter()
                .filter(|p| p.end_reason() == Some(ProjectileEnd::OwnerDied))
                .count(),
            1
        );
    }
}
