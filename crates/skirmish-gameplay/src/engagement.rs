//! Engagement policies for enemy brains.
//!
//! A policy turns what an enemy perceives (distance to its target, its own
//! health) into an engagement decision, and supplies the speeds and attack it
//! uses while engaged. The state machine in [`crate::ai`] owns the priority
//! rules; policies only classify.
//!
//! - [`RangeGatedPolicy`]: melee brute. Chases inside detection range, swings
//!   inside attack range, runs when hurt.
//! - [`DistanceBandedPolicy`]: ranged shooter. Keeps its target between a
//!   minimum and a retreat distance and fires whenever in range. The bands
//!   widen when health is low.

use std::fmt;

use serde::{Deserialize, Serialize};

use skirmish_common::{SkirmishError, SkirmishResult, Vec2};

use crate::ai::EnemyState;
use crate::health::HealthConfig;

/// What an enemy knows about the world this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    /// Distance to the target, `f32::MAX` when there is none.
    pub distance: f32,
    /// Own `current / max` health.
    pub health_ratio: f32,
    /// Whether the enemy stands outside its patrol bounds.
    pub outside_bounds: bool,
}

impl Perception {
    /// Whether a target is known.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.distance < f32::MAX
    }
}

/// Engagement decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engagement {
    /// Get away from the target.
    Flee,
    /// Close in on the target.
    Chase,
    /// Stand and attack.
    Attack,
    /// Target out of reach; fall back to patrol rules.
    Disengaged,
}

/// What the attack sequence does when it strikes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrikeKind {
    /// Hit-scan circle around the attacker.
    Melee {
        /// Damage per target.
        damage: i32,
        /// Circle radius.
        radius: f32,
    },
    /// Spawn a projectile aimed at the target.
    Ranged {
        /// Projectile damage.
        damage: i32,
        /// Projectile speed.
        speed: f32,
        /// Spawn offset from the body center, for a right-facing enemy.
        muzzle_offset: Vec2,
    },
}

/// Phase durations of an enemy attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyAttackTiming {
    /// Delay before the strike.
    pub windup: f32,
    /// Pause after the strike.
    pub recovery: f32,
    /// Extra wait after recovery before the next attack may start.
    pub cooldown: f32,
}

/// Which policy a brain runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Melee: chase and swing.
    RangeGated,
    /// Ranged: keep distance and shoot.
    DistanceBanded,
}

/// Strategy supplying engagement rules to an enemy brain.
pub trait EngagementPolicy: fmt::Debug + Send + Sync {
    /// Which policy this is.
    fn kind(&self) -> PolicyKind;

    /// Classify the current perception.
    fn classify(&self, perception: &Perception) -> Engagement;

    /// Patrol and return speed.
    fn move_speed(&self) -> f32;

    /// Pause at a patrol bound.
    fn boundary_wait(&self) -> f32;

    /// Speed towards the target while chasing.
    fn chase_speed(&self, perception: &Perception) -> f32;

    /// Speed away from the target while fleeing.
    fn flee_speed(&self, perception: &Perception) -> f32;

    /// Distance beyond which a fleeing enemy gives up and returns.
    fn flee_exit_distance(&self, perception: &Perception) -> f32;

    /// Whether an attack may start from `state`.
    fn can_strike(&self, state: EnemyState, perception: &Perception) -> bool;

    /// What the attack does.
    fn strike(&self) -> StrikeKind;

    /// Attack phase durations.
    fn timing(&self) -> EnemyAttackTiming;

    /// Seconds the enemy stands still after taking a hit. Zero disables it.
    fn hurt_stagger(&self) -> f32;
}

// ============================================================================
// Melee
// ============================================================================

/// Tuning for a melee enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeEnemyConfig {
    /// Health component.
    pub health: HealthConfig,
    /// Patrol, chase and return speed.
    pub move_speed: f32,
    /// Chase starts inside this distance.
    pub detection_range: f32,
    /// Attacks start inside this distance; also the swing radius.
    pub attack_range: f32,
    /// Damage per swing.
    pub attack_damage: i32,
    /// Delay before the swing lands.
    pub attack_windup: f32,
    /// Pause after the swing.
    pub attack_recovery: f32,
    /// Wait after recovery before the next swing.
    pub attack_cooldown: f32,
    /// Health ratio at or below which the enemy flees.
    pub low_health_threshold: f32,
    /// Flee speed; must exceed `move_speed`.
    pub flee_speed: f32,
    /// Flee triggers inside this distance when hurt.
    pub flee_distance: f32,
    /// Fleeing ends beyond `flee_distance * flee_exit_multiplier`.
    pub flee_exit_multiplier: f32,
    /// Pause at a patrol bound.
    pub wait_time: f32,
    /// Stand still this long after taking a hit.
    pub hurt_stagger: f32,
}

impl Default for MeleeEnemyConfig {
    fn default() -> Self {
        Self {
            health: HealthConfig::enemy(),
            move_speed: 3.0,
            detection_range: 5.0,
            attack_range: 1.5,
            attack_damage: 10,
            attack_windup: 0.3,
            attack_recovery: 0.5,
            attack_cooldown: 1.5,
            low_health_threshold: 0.3,
            flee_speed: 4.0,
            flee_distance: 7.0,
            flee_exit_multiplier: 1.5,
            wait_time: 2.0,
            hurt_stagger: 0.0,
        }
    }
}

impl MeleeEnemyConfig {
    /// Reject tuning the state machine cannot run with.
    pub fn validate(&self) -> SkirmishResult<()> {
        validate_health("melee_enemy.health", &self.health)?;
        positive("melee_enemy.move_speed", self.move_speed)?;
        positive("melee_enemy.attack_range", self.attack_range)?;
        non_negative("melee_enemy.attack_windup", self.attack_windup)?;
        non_negative("melee_enemy.attack_recovery", self.attack_recovery)?;
        non_negative("melee_enemy.attack_cooldown", self.attack_cooldown)?;
        non_negative("melee_enemy.wait_time", self.wait_time)?;
        non_negative("melee_enemy.hurt_stagger", self.hurt_stagger)?;
        ratio("melee_enemy.low_health_threshold", self.low_health_threshold)?;
        if self.detection_range <= self.attack_range {
            return Err(SkirmishError::invalid(
                "melee_enemy.detection_range",
                "must exceed attack_range",
            ));
        }
        if self.flee_speed <= self.move_speed {
            return Err(SkirmishError::invalid(
                "melee_enemy.flee_speed",
                "must exceed move_speed",
            ));
        }
        if self.flee_exit_multiplier < 1.0 {
            return Err(SkirmishError::invalid(
                "melee_enemy.flee_exit_multiplier",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Melee policy: chase inside detection range, swing inside attack range,
/// flee when hurt and the target is close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeGatedPolicy {
    config: MeleeEnemyConfig,
}

impl RangeGatedPolicy {
    /// Create from tuning.
    #[must_use]
    pub fn new(config: MeleeEnemyConfig) -> Self {
        Self { config }
    }

    /// Tuning.
    #[must_use]
    pub fn config(&self) -> &MeleeEnemyConfig {
        &self.config
    }
}

impl EngagementPolicy for RangeGatedPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::RangeGated
    }

    fn classify(&self, p: &Perception) -> Engagement {
        let c = &self.config;
        if !p.has_target() {
            Engagement::Disengaged
        } else if p.health_ratio <= c.low_health_threshold && p.distance <= c.flee_distance {
            Engagement::Flee
        } else if p.distance <= c.detection_range && p.distance > c.attack_range {
            Engagement::Chase
        } else if p.distance <= c.attack_range {
            Engagement::Attack
        } else {
            Engagement::Disengaged
        }
    }

    fn move_speed(&self) -> f32 {
        self.config.move_speed
    }

    fn boundary_wait(&self) -> f32 {
        self.config.wait_time
    }

    fn chase_speed(&self, _perception: &Perception) -> f32 {
        self.config.move_speed
    }

    fn flee_speed(&self, _perception: &Perception) -> f32 {
        self.config.flee_speed
    }

    fn flee_exit_distance(&self, _perception: &Perception) -> f32 {
        self.config.flee_distance * self.config.flee_exit_multiplier
    }

    fn can_strike(&self, state: EnemyState, _perception: &Perception) -> bool {
        state == EnemyState::Attacking
    }

    fn strike(&self) -> StrikeKind {
        StrikeKind::Melee {
            damage: self.config.attack_damage,
            radius: self.config.attack_range,
        }
    }

    fn timing(&self) -> EnemyAttackTiming {
        EnemyAttackTiming {
            windup: self.config.attack_windup,
            recovery: self.config.attack_recovery,
            cooldown: self.config.attack_cooldown,
        }
    }

    fn hurt_stagger(&self) -> f32 {
        self.config.hurt_stagger
    }
}

// ============================================================================
// Ranged
// ============================================================================

/// Tuning for a ranged enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedEnemyConfig {
    /// Health component.
    pub health: HealthConfig,
    /// Patrol, approach and return speed.
    pub move_speed: f32,
    /// Engagement starts inside this distance.
    pub detection_range: f32,
    /// Fires inside this distance.
    pub attack_range: f32,
    /// Outer edge of the preferred band.
    pub retreat_distance: f32,
    /// Inner edge of the preferred band.
    pub min_distance: f32,
    /// Health ratio at or below which the bands widen.
    pub low_health_threshold: f32,
    /// Band multiplier while health is low.
    pub low_health_retreat_multiplier: f32,
    /// Flee speed multiplier on `move_speed`.
    pub retreat_speed_multiplier: f32,
    /// Flee speed multiplier on `move_speed` while health is low.
    pub panic_speed_multiplier: f32,
    /// Projectile speed.
    pub projectile_speed: f32,
    /// Projectile damage.
    pub projectile_damage: i32,
    /// Projectile spawn offset, for a right-facing enemy.
    pub muzzle_offset: Vec2,
    /// Seconds from one shot starting to the next being allowed.
    pub attack_cooldown: f32,
    /// Aim time before the shot and pause after it.
    pub attack_animation_time: f32,
    /// Pause at a patrol bound.
    pub wait_time: f32,
    /// Stand still this long after taking a hit.
    pub hurt_stagger: f32,
}

impl Default for RangedEnemyConfig {
    fn default() -> Self {
        Self {
            health: HealthConfig::enemy(),
            move_speed: 2.0,
            detection_range: 10.5,
            attack_range: 7.0,
            retreat_distance: 5.0,
            min_distance: 3.0,
            low_health_threshold: 0.3,
            low_health_retreat_multiplier: 1.5,
            retreat_speed_multiplier: 1.5,
            panic_speed_multiplier: 2.0,
            projectile_speed: 8.0,
            projectile_damage: 10,
            muzzle_offset: Vec2::new(0.5, 0.2),
            attack_cooldown: 2.0,
            attack_animation_time: 0.5,
            wait_time: 2.0,
            hurt_stagger: 0.5,
        }
    }
}

impl RangedEnemyConfig {
    /// Reject tuning the state machine cannot run with.
    pub fn validate(&self) -> SkirmishResult<()> {
        validate_health("ranged_enemy.health", &self.health)?;
        positive("ranged_enemy.move_speed", self.move_speed)?;
        positive("ranged_enemy.projectile_speed", self.projectile_speed)?;
        positive("ranged_enemy.min_distance", self.min_distance)?;
        non_negative("ranged_enemy.attack_cooldown", self.attack_cooldown)?;
        non_negative("ranged_enemy.attack_animation_time", self.attack_animation_time)?;
        non_negative("ranged_enemy.wait_time", self.wait_time)?;
        non_negative("ranged_enemy.hurt_stagger", self.hurt_stagger)?;
        ratio("ranged_enemy.low_health_threshold", self.low_health_threshold)?;
        if self.retreat_distance <= self.min_distance {
            return Err(SkirmishError::invalid(
                "ranged_enemy.retreat_distance",
                "must exceed min_distance",
            ));
        }
        if self.detection_range < self.attack_range {
            return Err(SkirmishError::invalid(
                "ranged_enemy.detection_range",
                "must be at least attack_range",
            ));
        }
        if self.low_health_retreat_multiplier < 1.0 {
            return Err(SkirmishError::invalid(
                "ranged_enemy.low_health_retreat_multiplier",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Ranged policy: hold the target inside a distance band and shoot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceBandedPolicy {
    config: RangedEnemyConfig,
}

impl DistanceBandedPolicy {
    /// Create from tuning.
    #[must_use]
    pub fn new(config: RangedEnemyConfig) -> Self {
        Self { config }
    }

    /// Tuning.
    #[must_use]
    pub fn config(&self) -> &RangedEnemyConfig {
        &self.config
    }

    fn is_low(&self, p: &Perception) -> bool {
        p.health_ratio <= self.config.low_health_threshold
    }

    /// Effective `(min, retreat)` band for this perception.
    #[must_use]
    pub fn band(&self, p: &Perception) -> (f32, f32) {
        let scale = if self.is_low(p) {
            self.config.low_health_retreat_multiplier
        } else {
            1.0
        };
        (
            self.config.min_distance * scale,
            self.config.retreat_distance * scale,
        )
    }
}

impl EngagementPolicy for DistanceBandedPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::DistanceBanded
    }

    fn classify(&self, p: &Perception) -> Engagement {
        let (min, retreat) = self.band(p);
        if !p.has_target() {
            Engagement::Disengaged
        } else if p.distance <= min {
            Engagement::Flee
        } else if p.distance <= retreat {
            Engagement::Attack
        } else if p.distance <= self.config.detection_range {
            Engagement::Chase
        } else {
            Engagement::Disengaged
        }
    }

    fn move_speed(&self) -> f32 {
        self.config.move_speed
    }

    fn boundary_wait(&self) -> f32 {
        self.config.wait_time
    }

    fn chase_speed(&self, _perception: &Perception) -> f32 {
        self.config.move_speed
    }

    fn flee_speed(&self, p: &Perception) -> f32 {
        let multiplier = if self.is_low(p) {
            self.config.panic_speed_multiplier
        } else {
            self.config.retreat_speed_multiplier
        };
        self.config.move_speed * multiplier
    }

    fn flee_exit_distance(&self, p: &Perception) -> f32 {
        self.band(p).0
    }

    fn can_strike(&self, state: EnemyState, p: &Perception) -> bool {
        matches!(state, EnemyState::Chasing | EnemyState::Attacking)
            && p.distance <= self.config.attack_range
    }

    fn strike(&self) -> StrikeKind {
        StrikeKind::Ranged {
            damage: self.config.projectile_damage,
            speed: self.config.projectile_speed,
            muzzle_offset: self.config.muzzle_offset,
        }
    }

    fn timing(&self) -> EnemyAttackTiming {
        let windup = self.config.attack_animation_time;
        let recovery = self.config.attack_animation_time;
        EnemyAttackTiming {
            windup,
            recovery,
            cooldown: (self.config.attack_cooldown - windup - recovery).max(0.0),
        }
    }

    fn hurt_stagger(&self) -> f32 {
        self.config.hurt_stagger
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

pub(crate) fn validate_health(field: &str, health: &HealthConfig) -> SkirmishResult<()> {
    if health.max_health <= 0 {
        return Err(SkirmishError::invalid(
            format!("{field}.max_health"),
            "must be positive",
        ));
    }
    non_negative(&format!("{field}.invincibility_duration"), health.invincibility_duration)?;
    non_negative(&format!("{field}.flash_duration"), health.flash_duration)?;
    if let Some(delay) = health.disable_delay {
        non_negative(&format!("{field}.disable_delay"), delay)?;
    }
    Ok(())
}

pub(crate) fn positive(field: &str, value: f32) -> SkirmishResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SkirmishError::invalid(field, format!("{value} must be positive")))
    }
}

pub(crate) fn non_negative(field: &str, value: f32) -> SkirmishResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SkirmishError::invalid(field, format!("{value} must not be negative")))
    }
}

pub(crate) fn ratio(field: &str, value: f32) -> SkirmishResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SkirmishError::invalid(field, format!("{value} must be within 0..=1")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perceive(distance: f32, health_ratio: f32) -> Perception {
        Perception {
            distance,
            health_ratio,
            outside_bounds: false,
        }
    }

    #[test]
    fn test_melee_classification_bands() {
        let policy = RangeGatedPolicy::default();
        assert_eq!(policy.classify(&perceive(1.0, 1.0)), Engagement::Attack);
        assert_eq!(policy.classify(&perceive(1.5, 1.0)), Engagement::Attack);
        assert_eq!(policy.classify(&perceive(3.0, 1.0)), Engagement::Chase);
        assert_eq!(policy.classify(&perceive(5.0, 1.0)), Engagement::Chase);
        assert_eq!(policy.classify(&perceive(6.0, 1.0)), Engagement::Disengaged);
        assert_eq!(policy.classify(&perceive(f32::MAX, 1.0)), Engagement::Disengaged);
    }

    #[test]
    fn test_melee_flee_wins_when_hurt() {
        let policy = RangeGatedPolicy::default();
        assert_eq!(policy.classify(&perceive(4.0, 0.2)), Engagement::Flee);
        assert_eq!(policy.classify(&perceive(1.0, 0.3)), Engagement::Flee);
        assert_eq!(policy.classify(&perceive(8.0, 0.2)), Engagement::Disengaged);
        assert!((policy.flee_exit_distance(&perceive(0.0, 0.2)) - 10.5).abs() < 1e-6);
    }

    #[test]
    fn test_ranged_bands() {
        let policy = DistanceBandedPolicy::default();
        assert_eq!(policy.classify(&perceive(2.0, 1.0)), Engagement::Flee);
        assert_eq!(policy.classify(&perceive(4.0, 1.0)), Engagement::Attack);
        assert_eq!(policy.classify(&perceive(6.0, 1.0)), Engagement::Chase);
        assert_eq!(policy.classify(&perceive(12.0, 1.0)), Engagement::Disengaged);
    }

    #[test]
    fn test_ranged_bands_widen_when_hurt() {
        let policy = DistanceBandedPolicy::default();
        let hurt = perceive(4.0, 0.2);
        assert_eq!(policy.band(&hurt), (4.5, 7.5));
        assert_eq!(policy.classify(&hurt), Engagement::Flee);
        assert_eq!(policy.flee_speed(&hurt), 4.0);
        assert_eq!(policy.flee_speed(&perceive(1.0, 1.0)), 3.0);
    }

    #[test]
    fn test_ranged_fires_while_approaching() {
        let policy = DistanceBandedPolicy::default();
        assert!(policy.can_strike(EnemyState::Chasing, &perceive(6.5, 1.0)));
        assert!(!policy.can_strike(EnemyState::Chasing, &perceive(8.0, 1.0)));
        assert!(!policy.can_strike(EnemyState::Fleeing, &perceive(2.0, 1.0)));
    }

    #[test]
    fn test_ranged_cooldown_counts_from_shot_start() {
        let timing = DistanceBandedPolicy::default().timing();
        assert!((timing.windup + timing.recovery + timing.cooldown - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_target_disengages_even_when_hurt() {
        let melee = RangeGatedPolicy::new(MeleeEnemyConfig {
            flee_distance: f32::MAX,
            ..MeleeEnemyConfig::default()
        });
        let alone = perceive(f32::MAX, 0.1);
        assert!(!alone.has_target());
        assert_eq!(melee.classify(&alone), Engagement::Disengaged);
        assert_eq!(
            DistanceBandedPolicy::default().classify(&alone),
            Engagement::Disengaged
        );
    }

    #[test]
    fn test_only_ranged_staggers_by_default() {
        assert_eq!(RangeGatedPolicy::default().hurt_stagger(), 0.0);
        assert_eq!(DistanceBandedPolicy::default().hurt_stagger(), 0.5);
    }

    #[test]
    fn test_config_validation() {
        assert!(MeleeEnemyConfig::default().validate().is_ok());
        assert!(RangedEnemyConfig::default().validate().is_ok());

        let slow_flee = MeleeEnemyConfig {
            flee_speed: 2.0,
            ..MeleeEnemyConfig::default()
        };
        assert!(slow_flee.validate().is_err());

        let no_health = MeleeEnemyConfig {
            health: HealthConfig::enemy().with_max_health(0),
            ..MeleeEnemyConfig::default()
        };
        assert!(matches!(
            no_health.validate(),
            Err(SkirmishError::InvalidConfiguration { .. })
        ));

        let inverted = RangedEnemyConfig {
            min_distance: 6.0,
            ..RangedEnemyConfig::default()
        };
        assert!(inverted.validate().is_err());

        let negative_stagger = RangedEnemyConfig {
            hurt_stagger: -0.5,
            ..RangedEnemyConfig::default()
        };
        assert!(negative_stagger.validate().is_err());
    }
}
