//! Health model shared by the player and enemies.
//!
//! This module provides:
//! - Bounded hit points with a one-shot death transition
//! - Post-hit invincibility window and hurt flash timer
//! - Disable-after-death delay
//! - Movement/collision capability flags cleared on death
//! - Restart and full-restore hooks
//!
//! Mutating calls return a [`HealthOutcome`] instead of firing callbacks; the
//! simulation turns outcomes into events.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cooldown::Cooldown;

/// Tuning for a health component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Maximum (and starting) hit points.
    pub max_health: i32,
    /// Seconds of damage immunity after a hit. Zero disables the window.
    pub invincibility_duration: f32,
    /// Seconds the hurt flash stays on after a hit.
    pub flash_duration: f32,
    /// Seconds between death and deactivation. `None` keeps the actor active.
    pub disable_delay: Option<f32>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            invincibility_duration: 0.0,
            flash_duration: 0.1,
            disable_delay: None,
        }
    }
}

impl HealthConfig {
    /// Player defaults: one second of invincibility, stays active on death.
    #[must_use]
    pub fn player() -> Self {
        Self {
            invincibility_duration: 1.0,
            ..Self::default()
        }
    }

    /// Enemy defaults: no invincibility, deactivated one second after death.
    #[must_use]
    pub fn enemy() -> Self {
        Self {
            disable_delay: Some(1.0),
            ..Self::default()
        }
    }

    /// Set maximum health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Set the invincibility window.
    #[must_use]
    pub fn with_invincibility(mut self, seconds: f32) -> Self {
        self.invincibility_duration = seconds;
        self
    }

    /// Set the disable-after-death delay.
    #[must_use]
    pub fn with_disable_delay(mut self, seconds: Option<f32>) -> Self {
        self.disable_delay = seconds;
        self
    }
}

/// Movement and collision switches owned by the health component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    /// Actor may move.
    pub movement: bool,
    /// Actor takes part in overlap queries.
    pub collision: bool,
}

impl Capabilities {
    /// Everything enabled.
    pub const ENABLED: Self = Self {
        movement: true,
        collision: true,
    };

    /// Everything disabled.
    pub const FROZEN: Self = Self {
        movement: false,
        collision: false,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ENABLED
    }
}

/// Result of a health mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthOutcome {
    /// Nothing changed (dead, invincible, or a zero/negative amount).
    Unchanged,
    /// Hit points went down.
    Damaged {
        /// Hit points removed.
        amount: i32,
        /// Hit points left.
        remaining: i32,
    },
    /// Hit points went up.
    Healed {
        /// Hit points added.
        amount: i32,
        /// Hit points now.
        current: i32,
    },
    /// This mutation killed the actor.
    Died {
        /// Hit points removed by the killing blow.
        amount: i32,
    },
}

impl HealthOutcome {
    /// Whether anything changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Whether this outcome is the death transition.
    #[must_use]
    pub fn is_death(&self) -> bool {
        matches!(self, Self::Died { .. })
    }
}

/// Read-only view of a health component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    /// Current hit points.
    pub current: i32,
    /// Maximum hit points.
    pub max: i32,
    /// Seconds of invincibility left.
    pub invincibility_remaining: f32,
    /// Seconds of hurt flash left.
    pub flash_remaining: f32,
    /// Whether the actor is dead.
    pub dead: bool,
}

impl HealthState {
    /// Whether damage is currently ignored because of a recent hit.
    #[must_use]
    pub fn invincible(&self) -> bool {
        self.invincibility_remaining > 0.0
    }
}

/// Hit points of one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    config: HealthConfig,
    current: i32,
    dead: bool,
    invincibility: Cooldown,
    flash: Cooldown,
    disable_timer: Cooldown,
    disable_pending: bool,
    capabilities: Capabilities,
}

impl Health {
    /// Full health from a config. Max health is floored at 1.
    #[must_use]
    pub fn new(config: HealthConfig) -> Self {
        let config = HealthConfig {
            max_health: config.max_health.max(1),
            ..config
        };
        Self {
            current: config.max_health,
            dead: false,
            invincibility: Cooldown::new(config.invincibility_duration),
            flash: Cooldown::new(config.flash_duration),
            disable_timer: Cooldown::new(config.disable_delay.unwrap_or(0.0)),
            disable_pending: false,
            capabilities: Capabilities::ENABLED,
            config,
        }
    }

    /// Current hit points.
    #[must_use]
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub fn max(&self) -> i32 {
        self.config.max_health
    }

    /// Whether the actor is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether the post-hit immunity window is open.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        !self.invincibility.is_ready()
    }

    /// Whether the hurt flash is showing.
    #[must_use]
    pub fn is_flashing(&self) -> bool {
        !self.flash.is_ready()
    }

    /// Current capability flags.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Overwrite capability flags (restart restore).
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    /// `current / max` in `0.0..=1.0`.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        (self.current as f32 / self.config.max_health as f32).clamp(0.0, 1.0)
    }

    /// Whether the ratio is at or below `threshold`.
    #[must_use]
    pub fn is_low(&self, threshold: f32) -> bool {
        self.ratio() <= threshold
    }

    /// Snapshot of the observable state.
    #[must_use]
    pub fn state(&self) -> HealthState {
        HealthState {
            current: self.current,
            max: self.config.max_health,
            invincibility_remaining: self.invincibility.remaining(),
            flash_remaining: self.flash.remaining(),
            dead: self.dead,
        }
    }

    /// Remove hit points. Ignored while dead or invincible.
    pub fn take_damage(&mut self, amount: i32) -> HealthOutcome {
        if amount <= 0 {
            if amount < 0 {
                debug!("Ignoring negative damage amount {amount}");
            }
            return HealthOutcome::Unchanged;
        }
        if self.dead || self.is_invincible() {
            return HealthOutcome::Unchanged;
        }

        let before = self.current;
        self.current = (self.current - amount).max(0);
        let applied = before - self.current;

        self.invincibility.trigger();
        self.flash.trigger();

        if self.current == 0 {
            self.die();
            HealthOutcome::Died { amount: applied }
        } else {
            HealthOutcome::Damaged {
                amount: applied,
                remaining: self.current,
            }
        }
    }

    /// Add hit points up to max. Ignored while dead.
    pub fn heal(&mut self, amount: i32) -> HealthOutcome {
        if amount <= 0 {
            if amount < 0 {
                debug!("Ignoring negative heal amount {amount}");
            }
            return HealthOutcome::Unchanged;
        }
        if self.dead {
            return HealthOutcome::Unchanged;
        }

        let before = self.current;
        self.current = (self.current.saturating_add(amount)).min(self.config.max_health);
        let applied = self.current - before;
        if applied == 0 {
            HealthOutcome::Unchanged
        } else {
            HealthOutcome::Healed {
                amount: applied,
                current: self.current,
            }
        }
    }

    /// Set hit points directly, clamped to `0..=max`. Ignored while dead.
    pub fn set_health(&mut self, value: i32) -> HealthOutcome {
        if self.dead {
            return HealthOutcome::Unchanged;
        }

        let before = self.current;
        self.current = value.clamp(0, self.config.max_health);
        let delta = self.current - before;

        if self.current == 0 {
            self.die();
            HealthOutcome::Died { amount: -delta }
        } else if delta < 0 {
            HealthOutcome::Damaged {
                amount: -delta,
                remaining: self.current,
            }
        } else if delta > 0 {
            HealthOutcome::Healed {
                amount: delta,
                current: self.current,
            }
        } else {
            HealthOutcome::Unchanged
        }
    }

    /// Enter the dead state. Returns false if already dead.
    pub fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.current = 0;
        self.capabilities = Capabilities::FROZEN;
        if let Some(delay) = self.config.disable_delay {
            self.disable_timer.trigger_for(delay);
            self.disable_pending = true;
        }
        true
    }

    /// Revive at full health with capabilities re-enabled.
    pub fn restore_full(&mut self) {
        self.dead = false;
        self.current = self.config.max_health;
        self.disable_pending = false;
        self.disable_timer.reset();
        self.capabilities = Capabilities::ENABLED;
    }

    /// Level restart: clear death and timers, set hit points to `health`.
    pub fn on_restart(&mut self, health: i32) {
        self.dead = false;
        self.current = health.clamp(0, self.config.max_health);
        self.invincibility.reset();
        self.flash.reset();
        self.disable_timer.reset();
        self.disable_pending = false;
        self.capabilities = Capabilities::ENABLED;
    }

    /// Advance timers. Returns true on the single tick the post-death
    /// disable delay elapses.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.invincibility.tick(dt);
        self.flash.tick(dt);

        if self.disable_pending {
            self.disable_timer.tick(dt);
            if self.disable_timer.is_ready() {
                self.disable_pending = false;
                return true;
            }
        }
        false
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_damage_and_death() {
        let mut health = Health::new(HealthConfig::enemy());
        assert_eq!(
            health.take_damage(30),
            HealthOutcome::Damaged {
                amount: 30,
                remaining: 70
            }
        );
        assert_eq!(health.take_damage(500), HealthOutcome::Died { amount: 70 });
        assert!(health.is_dead());
        assert_eq!(health.current(), 0);
        assert_eq!(health.capabilities(), Capabilities::FROZEN);
    }

    #[test]
    fn test_invincibility_gate() {
        let mut health = Health::new(HealthConfig::player());
        assert!(health.take_damage(10).changed());
        assert!(health.is_invincible());
        assert!(health.state().invincible());

        assert_eq!(health.take_damage(10), HealthOutcome::Unchanged);
        assert_eq!(health.current(), 90);

        health.tick(1.0);
        assert!(!health.is_invincible());
        assert!(health.take_damage(10).changed());
        assert_eq!(health.current(), 80);
    }

    #[test]
    fn test_flash_clears_before_invincibility() {
        let mut health = Health::new(HealthConfig::player());
        health.take_damage(5);
        assert!(health.is_flashing());
        health.tick(0.1);
        assert!(!health.is_flashing());
        assert!(health.is_invincible());
    }

    #[test]
    fn test_heal_caps_at_max_and_ignores_dead() {
        let mut health = Health::default();
        health.take_damage(20);
        assert_eq!(
            health.heal(50),
            HealthOutcome::Healed {
                amount: 20,
                current: 100
            }
        );
        assert_eq!(health.heal(5), HealthOutcome::Unchanged);

        health.die();
        assert_eq!(health.heal(50), HealthOutcome::Unchanged);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn test_negative_amounts_are_ignored() {
        let mut health = Health::default();
        assert_eq!(health.take_damage(-10), HealthOutcome::Unchanged);
        assert_eq!(health.heal(-10), HealthOutcome::Unchanged);
        assert_eq!(health.current(), 100);
    }

    #[test]
    fn test_set_health_reports_direction() {
        let mut health = Health::default();
        assert!(matches!(
            health.set_health(40),
            HealthOutcome::Damaged { amount: 60, .. }
        ));
        assert!(matches!(
            health.set_health(250),
            HealthOutcome::Healed { amount: 60, .. }
        ));
        assert_eq!(health.current(), 100);
        assert_eq!(health.set_health(-5), HealthOutcome::Died { amount: 100 });
        assert!(health.is_dead());
    }

    #[test]
    fn test_die_is_idempotent() {
        let mut once = Health::new(HealthConfig::enemy());
        once.die();
        let mut twice = Health::new(HealthConfig::enemy());
        twice.die();
        assert!(!twice.die());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_disable_delay_fires_once() {
        let mut health = Health::new(HealthConfig::enemy());
        health.die();
        assert!(!health.tick(0.5));
        assert!(health.tick(0.5));
        assert!(!health.tick(0.5));
    }

    #[test]
    fn test_player_never_disables() {
        let mut health = Health::new(HealthConfig::player());
        health.die();
        assert!(!health.tick(10.0));
    }

    #[test]
    fn test_restart_clears_death_and_invincibility() {
        let mut health = Health::new(HealthConfig::player());
        health.take_damage(40);
        health.die();

        health.on_restart(100);
        assert!(!health.is_dead());
        assert!(!health.is_invincible());
        assert_eq!(health.current(), 100);
        assert_eq!(health.capabilities(), Capabilities::ENABLED);
        assert!(health.take_damage(10).changed());
    }

    #[test]
    fn test_restore_full() {
        let mut health = Health::new(HealthConfig::enemy());
        health.take_damage(100);
        health.restore_full();
        assert!(!health.is_dead());
        assert_eq!(health.current(), 100);
        assert!(!health.tick(2.0));
    }

    #[test]
    fn test_low_health_ratio() {
        let mut health = Health::default();
        health.set_health(30);
        assert!(health.is_low(0.3));
        health.set_health(31);
        assert!(!health.is_low(0.3));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Damage(i32),
        Heal(i32),
        Set(i32),
        Tick(f32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-50i32..300).prop_map(Op::Damage),
            (-50i32..300).prop_map(Op::Heal),
            (-50i32..300).prop_map(Op::Set),
            (0.0f32..2.0).prop_map(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut health = Health::new(HealthConfig::player());
            for op in ops {
                match op {
                    Op::Damage(n) => { health.take_damage(n); },
                    Op::Heal(n) => { health.heal(n); },
                    Op::Set(n) => { health.set_health(n); },
                    Op::Tick(dt) => { health.tick(dt); },
                }
                prop_assert!(health.current() >= 0);
                prop_assert!(health.current() <= health.max());
                if health.is_dead() {
                    prop_assert_eq!(health.current(), 0);
                }
            }
        }

        #[test]
        fn prop_dead_health_is_frozen(amount in 1i32..500) {
            let mut health = Health::default();
            health.die();
            prop_assert_eq!(health.take_damage(amount), HealthOutcome::Unchanged);
            prop_assert_eq!(health.heal(amount), HealthOutcome::Unchanged);
            prop_assert_eq!(health.set_health(amount), HealthOutcome::Unchanged);
            prop_assert_eq!(health.current(), 0);
        }
    }
}
