//! Spatial queries and the minimal kinematic step.
//!
//! The combat core only needs two questions answered by the physics layer:
//! which actors overlap a circle, and whether a box touches level geometry.
//! Anything that answers them can stand in for [`crate::actor::World`].

use serde::{Deserialize, Serialize};

use skirmish_common::{EntityId, LayerMask, Vec2};

/// Axis-aligned bounding box for level geometry and projectile bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb {
    /// Creates a new box from two corners in any order.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box from center and half-extents.
    #[must_use]
    pub fn from_center(center: Vec2, half_width: f32, half_height: f32) -> Self {
        let half = Vec2::new(half_width.abs(), half_height.abs());
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Returns the center of the box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns the width of the box.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Returns the height of the box.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Checks if this box overlaps with another.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Checks if a point lies inside (edges included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Checks if a circle touches this box.
    #[must_use]
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

/// Region queries the combat core relies on.
pub trait SpatialQuery {
    /// Collidable actors on `filter` layers whose body touches the circle.
    /// Results are in ascending ID order.
    fn overlap_circle(&self, center: Vec2, radius: f32, filter: LayerMask) -> Vec<EntityId>;

    /// Whether a box touches static level geometry.
    fn overlaps_obstacle(&self, bounds: &Aabb) -> bool;
}

/// Kinematic step settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kinematics {
    /// Fraction of velocity lost per second.
    pub drag: f32,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self { drag: 4.0 }
    }
}

impl Kinematics {
    /// Integrate one body: move by velocity, then bleed velocity by drag.
    pub fn integrate(&self, position: &mut Vec2, velocity: &mut Vec2, dt: f32) {
        *position += *velocity * dt;
        *velocity *= (1.0 - self.drag * dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(2.0, 2.0));
        let b = Aabb::from_center(Vec2::new(2.5, 1.0), 1.0, 1.0);
        let c = Aabb::from_center(Vec2::new(5.0, 1.0), 1.0, 1.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(b.center(), Vec2::new(2.5, 1.0));
        assert_eq!(b.width(), 2.0);
    }

    #[test]
    fn test_aabb_circle_intersection() {
        let wall = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(11.0, 5.0));
        assert!(wall.intersects_circle(Vec2::new(9.8, 2.0), 0.25));
        assert!(!wall.intersects_circle(Vec2::new(9.0, 2.0), 0.25));
        assert!(wall.contains(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn test_kinematics_drag_never_reverses() {
        let kin = Kinematics { drag: 100.0 };
        let mut pos = Vec2::ZERO;
        let mut vel = Vec2::new(3.0, 0.0);
        kin.integrate(&mut pos, &mut vel, 0.1);
        assert!((pos.x - 0.3).abs() < 1e-6);
        assert_eq!(vel, Vec2::ZERO);
    }
}
