//! Actors and the world that owns them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use skirmish_common::{ActorTag, EntityId, Facing, LayerMask, Vec2};

use crate::health::{Health, HealthConfig};
use crate::physics::{Aabb, Kinematics, SpatialQuery};

/// Default collision radius of an actor body.
pub const DEFAULT_BODY_RADIUS: f32 = 0.4;

/// A player or enemy in the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique ID.
    pub id: EntityId,
    /// Player or enemy.
    pub tag: ActorTag,
    /// World position (body center).
    pub position: Vec2,
    /// Velocity in world units per second, set by the movement controllers.
    pub velocity: Vec2,
    /// Knockback velocity, integrated on top of `velocity` and bled off by drag.
    #[serde(default)]
    pub knockback: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Visual scale.
    pub scale: Vec2,
    /// Horizontal facing.
    pub facing: Facing,
    /// Radius used by overlap queries.
    pub body_radius: f32,
    /// Inactive actors are skipped by every system.
    pub active: bool,
    /// Hit points.
    pub health: Health,
}

impl Actor {
    /// Create an actor with a fresh ID.
    #[must_use]
    pub fn new(tag: ActorTag, position: Vec2, health: HealthConfig) -> Self {
        Self {
            id: EntityId::new(),
            tag,
            position,
            velocity: Vec2::ZERO,
            knockback: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            facing: Facing::Right,
            body_radius: DEFAULT_BODY_RADIUS,
            active: true,
            health: Health::new(health),
        }
    }

    /// Set the ID (tests and deserialized levels).
    #[must_use]
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Set the initial facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Set the body radius.
    #[must_use]
    pub fn with_body_radius(mut self, radius: f32) -> Self {
        self.body_radius = radius.max(0.0);
        self
    }

    /// Collision layer.
    #[must_use]
    pub fn layer(&self) -> LayerMask {
        self.tag.layer()
    }

    /// Active and not dead.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.active && !self.health.is_dead()
    }

    /// Whether movement systems may drive this actor.
    #[must_use]
    pub fn can_move(&self) -> bool {
        self.active && self.health.capabilities().movement
    }

    /// Whether overlap queries see this actor.
    #[must_use]
    pub fn is_collidable(&self) -> bool {
        self.active && self.health.capabilities().collision
    }

    /// Add an instantaneous push. It decays on its own instead of going
    /// through `velocity`.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.knockback += impulse;
    }

    /// Drop all motion.
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.knockback = Vec2::ZERO;
    }

    /// Distance between body centers.
    #[must_use]
    pub fn distance_to(&self, other: &Actor) -> f32 {
        self.position.distance(other.position)
    }
}

/// Every actor plus the static geometry of one level.
#[derive(Debug, Clone, Default)]
pub struct World {
    actors: BTreeMap<EntityId, Actor>,
    obstacles: Vec<Aabb>,
    kinematics: Kinematics,
}

impl World {
    /// Empty world.
    #[must_use]
    pub fn new(kinematics: Kinematics) -> Self {
        Self {
            actors: BTreeMap::new(),
            obstacles: Vec::new(),
            kinematics,
        }
    }

    /// Insert an actor, returning its ID.
    pub fn spawn(&mut self, actor: Actor) -> EntityId {
        let id = actor.id;
        self.actors.insert(id, actor);
        id
    }

    /// Look up an actor.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Look up an actor mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// All actors in spawn order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// All actors in spawn order, mutably.
    pub fn actors_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.values_mut()
    }

    /// Number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether there are no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Add static geometry.
    pub fn add_obstacle(&mut self, bounds: Aabb) {
        self.obstacles.push(bounds);
    }

    /// Static geometry.
    #[must_use]
    pub fn obstacles(&self) -> &[Aabb] {
        &self.obstacles
    }

    /// Move every mobile actor by its velocity plus knockback.
    pub fn integrate(&mut self, dt: f32) {
        let kinematics = self.kinematics;
        for actor in self.actors.values_mut() {
            if actor.can_move() {
                kinematics.integrate(&mut actor.position, &mut actor.velocity, dt);
                kinematics.integrate(&mut actor.position, &mut actor.knockback, dt);
            }
        }
    }
}

impl SpatialQuery for World {
    fn overlap_circle(&self, center: Vec2, radius: f32, filter: LayerMask) -> Vec<EntityId> {
        self.actors
            .values()
            .filter(|a| a.is_collidable() && a.layer().intersects(filter))
            .filter(|a| a.position.distance(center) <= radius + a.body_radius)
            .map(|a| a.id)
            .collect()
    }

    fn overlaps_obstacle(&self, bounds: &Aabb) -> bool {
        self.obstacles.iter().any(|o| o.overlaps(bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy_at(raw: u64, x: f32) -> Actor {
        Actor::new(ActorTag::Enemy, Vec2::new(x, 0.0), HealthConfig::enemy())
            .with_id(EntityId::from_raw(raw))
    }

    #[test]
    fn test_overlap_filters_by_layer_and_range() {
        let mut world = World::default();
        world.spawn(enemy_at(1, 1.0));
        world.spawn(enemy_at(2, 5.0));
        world.spawn(
            Actor::new(ActorTag::Player, Vec2::ZERO, HealthConfig::player())
                .with_id(EntityId::from_raw(3)),
        );

        let hits = world.overlap_circle(Vec2::ZERO, 1.0, LayerMask::ENEMY);
        assert_eq!(hits, vec![EntityId::from_raw(1)]);

        let all = world.overlap_circle(Vec2::ZERO, 10.0, LayerMask::ALL);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_dead_actors_are_not_collidable() {
        let mut world = World::default();
        let id = world.spawn(enemy_at(1, 0.5));
        if let Some(actor) = world.get_mut(id) {
            actor.health.die();
        }
        assert!(world
            .overlap_circle(Vec2::ZERO, 2.0, LayerMask::ENEMY)
            .is_empty());
    }

    #[test]
    fn test_integrate_skips_frozen_actors() {
        let mut world = World::new(Kinematics { drag: 0.0 });
        let moving = world.spawn(enemy_at(1, 0.0));
        let frozen = world.spawn(enemy_at(2, 0.0));
        for id in [moving, frozen] {
            if let Some(actor) = world.get_mut(id) {
                actor.velocity = Vec2::new(2.0, 0.0);
            }
        }
        if let Some(actor) = world.get_mut(frozen) {
            actor.health.die();
        }

        world.integrate(0.5);
        assert_eq!(world.get(moving).map(|a| a.position.x), Some(1.0));
        assert_eq!(world.get(frozen).map(|a| a.position.x), Some(0.0));
    }

    #[test]
    fn test_knockback_survives_controller_overwrite() {
        let mut world = World::new(Kinematics { drag: 0.0 });
        let id = world.spawn(enemy_at(1, 0.0));
        if let Some(actor) = world.get_mut(id) {
            actor.apply_impulse(Vec2::new(4.0, 0.0));
            actor.velocity.x = 0.0;
        }
        world.integrate(0.5);
        let actor = world.get(id).expect("actor exists");
        assert_eq!(actor.position.x, 2.0);
        assert_eq!(actor.velocity, Vec2::ZERO);

        let mut actor = actor.clone();
        actor.halt();
        assert_eq!(actor.knockback, Vec2::ZERO);
    }

    #[test]
    fn test_obstacle_query() {
        let mut world = World::default();
        world.add_obstacle(Aabb::new(Vec2::new(4.0, -1.0), Vec2::new(5.0, 3.0)));
        assert!(world.overlaps_obstacle(&Aabb::from_center(Vec2::new(4.1, 0.0), 0.2, 0.2)));
        assert!(!world.overlaps_obstacle(&Aabb::from_center(Vec2::ZERO, 0.2, 0.2)));
    }
}
