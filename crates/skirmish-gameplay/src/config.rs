//! Combat tuning.
//!
//! All numbers the combat core reads come from [`CombatTuning`]. Every field
//! has a default, so a TOML file only needs the values it changes:
//!
//! ```toml
//! [melee_enemy]
//! detection_range = 6.0
//!
//! [projectile]
//! despawn_on_owner_death = true
//! ```
//!
//! Tuning is validated before a simulation is built; a bad value is a hard
//! error rather than something to clamp.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use skirmish_common::{SkirmishError, SkirmishResult};

use crate::engagement::{non_negative, positive, validate_health, MeleeEnemyConfig, RangedEnemyConfig};
use crate::health::HealthConfig;
use crate::melee_combat::PlayerAttackConfig;
use crate::physics::Kinematics;
use crate::projectile::ProjectileConfig;
use crate::restart::RestartConfig;

/// Player tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Health component.
    pub health: HealthConfig,
    /// Walk speed.
    pub move_speed: f32,
    /// Melee attack.
    pub attack: PlayerAttackConfig,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            health: HealthConfig::player(),
            move_speed: 5.0,
            attack: PlayerAttackConfig::default(),
        }
    }
}

impl PlayerTuning {
    /// Reject unusable values.
    pub fn validate(&self) -> SkirmishResult<()> {
        validate_health("player.health", &self.health)?;
        positive("player.move_speed", self.move_speed)?;
        let attack = &self.attack;
        if attack.damage < 0 {
            return Err(SkirmishError::invalid("player.attack.damage", "must not be negative"));
        }
        positive("player.attack.range", attack.range)?;
        non_negative("player.attack.knockback", attack.knockback)?;
        non_negative("player.attack.cooldown", attack.cooldown)?;
        non_negative("player.attack.windup", attack.windup)?;
        non_negative("player.attack.combo_reset_window", attack.combo_reset_window)?;
        if attack.windup > attack.cooldown {
            return Err(SkirmishError::invalid(
                "player.attack.windup",
                "must not exceed cooldown",
            ));
        }
        if attack.max_combo == 0 {
            return Err(SkirmishError::invalid("player.attack.max_combo", "must be at least 1"));
        }
        Ok(())
    }
}

/// Every tunable number of the combat core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Player.
    pub player: PlayerTuning,
    /// Melee enemies.
    pub melee_enemy: MeleeEnemyConfig,
    /// Ranged enemies.
    pub ranged_enemy: RangedEnemyConfig,
    /// Projectiles.
    pub projectile: ProjectileConfig,
    /// Level restart.
    pub restart: RestartConfig,
    /// Kinematic step.
    pub kinematics: Kinematics,
}

impl CombatTuning {
    /// Check every section.
    pub fn validate(&self) -> SkirmishResult<()> {
        self.player.validate()?;
        self.melee_enemy.validate()?;
        self.ranged_enemy.validate()?;

        positive("projectile.lifetime", self.projectile.lifetime)?;
        non_negative("projectile.fade_out_duration", self.projectile.fade_out_duration)?;
        non_negative("projectile.radius", self.projectile.radius)?;
        if self.projectile.fade_out_duration > self.projectile.lifetime {
            return Err(SkirmishError::invalid(
                "projectile.fade_out_duration",
                "must not exceed lifetime",
            ));
        }

        non_negative("restart.restart_delay", self.restart.restart_delay)?;
        non_negative("restart.respawn_delay", self.restart.respawn_delay)?;
        non_negative("kinematics.drag", self.kinematics.drag)?;
        Ok(())
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(contents: &str) -> SkirmishResult<Self> {
        let tuning: Self = toml::from_str(contents)?;
        if let Err(e) = tuning.validate() {
            warn!("Rejected combat tuning: {e}");
            return Err(e);
        }
        Ok(tuning)
    }

    /// Read, parse and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> SkirmishResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let tuning = Self::from_toml_str(&contents)?;
        info!("Loaded combat tuning from {}", path.display());
        Ok(tuning)
    }
}
