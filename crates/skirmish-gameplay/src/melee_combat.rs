//! Player melee attack sequencing.
//!
//! This module provides:
//! - Attack phases (windup, active, recovery) driven by a phase clock
//! - Combo escalation with a reset window
//! - Strike construction from the attacker's position and facing

use serde::{Deserialize, Serialize};

use skirmish_common::{Facing, LayerMask, Vec2};

use crate::actor::Actor;
use crate::combat::MeleeStrike;
use crate::cooldown::PhaseClock;

// ============================================================================
// Attack Phases
// ============================================================================

/// Phase of a melee attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackPhase {
    /// Ready to attack.
    #[default]
    Idle,
    /// Preparing to strike.
    Windup,
    /// Strike resolved; damage window.
    Active,
    /// Recovering after attack.
    Recovery,
}

impl AttackPhase {
    /// Check if attack can deal damage.
    #[must_use]
    pub fn can_damage(&self) -> bool {
        *self == Self::Active
    }

    /// Check if an attack is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        *self != Self::Idle
    }
}

// ============================================================================
// Attack Timing
// ============================================================================

/// Timing configuration for a melee attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackTiming {
    /// Duration of windup phase (seconds).
    pub windup: f32,
    /// Duration of active phase (seconds).
    pub active: f32,
    /// Duration of recovery phase (seconds).
    pub recovery: f32,
}

impl Default for AttackTiming {
    fn default() -> Self {
        Self::from_cooldown(0.5, 0.2)
    }
}

impl AttackTiming {
    /// Create new attack timing.
    #[must_use]
    pub fn new(windup: f32, active: f32, recovery: f32) -> Self {
        Self {
            windup: windup.max(0.0),
            active: active.max(0.0),
            recovery: recovery.max(0.0),
        }
    }

    /// Split a total cooldown into a windup and the recovery that remains.
    /// The strike is instantaneous.
    #[must_use]
    pub fn from_cooldown(cooldown: f32, windup: f32) -> Self {
        let windup = windup.clamp(0.0, cooldown.max(0.0));
        Self::new(windup, 0.0, cooldown - windup)
    }

    /// Get total attack duration.
    #[must_use]
    pub fn total_duration(&self) -> f32 {
        self.windup + self.active + self.recovery
    }
}

// ============================================================================
// Combo System
// ============================================================================

/// Combo counter with a reset window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    /// Current combo step; 0 when no combo is running.
    pub count: u8,
    /// Time since last attack.
    pub timer: f32,
}

impl ComboState {
    /// Create new combo state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update timer. The combo drops once more than `window` seconds pass
    /// without an attack.
    pub fn tick(&mut self, dt: f32, window: f32) {
        self.timer += dt;
        if self.count > 0 && self.timer > window {
            self.reset();
        }
    }

    /// Register an attack, returns the new 1-based step, wrapping after `max`.
    pub fn register_attack(&mut self, max: u8) -> u8 {
        let max = max.max(1);
        self.count = (self.count % max) + 1;
        self.timer = 0.0;
        self.count
    }

    /// Reset combo.
    pub fn reset(&mut self) {
        self.count = 0;
        self.timer = 0.0;
    }
}

// ============================================================================
// Player Attack
// ============================================================================

/// Tuning for the player's melee attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerAttackConfig {
    /// Damage per hit.
    pub damage: i32,
    /// Hit circle radius.
    pub range: f32,
    /// Offset of the hit circle center, for a right-facing player.
    pub attack_offset: Vec2,
    /// Knockback impulse magnitude.
    pub knockback: f32,
    /// Time from press until the next attack is allowed.
    pub cooldown: f32,
    /// Delay between press and strike.
    pub windup: f32,
    /// Steps in a combo before it wraps.
    pub max_combo: u8,
    /// Seconds after the last press before the combo drops.
    pub combo_reset_window: f32,
}

impl Default for PlayerAttackConfig {
    fn default() -> Self {
        Self {
            damage: 20,
            range: 1.2,
            attack_offset: Vec2::new(0.6, 0.0),
            knockback: 3.0,
            cooldown: 0.5,
            windup: 0.2,
            max_combo: 3,
            combo_reset_window: 1.5,
        }
    }
}

impl PlayerAttackConfig {
    /// Phase timing derived from cooldown and windup.
    #[must_use]
    pub fn timing(&self) -> AttackTiming {
        AttackTiming::from_cooldown(self.cooldown, self.windup)
    }
}

/// Player melee controller: combo counter plus one attack in flight at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCombat {
    config: PlayerAttackConfig,
    timing: AttackTiming,
    clock: PhaseClock<AttackPhase>,
    combo: ComboState,
}

impl PlayerCombat {
    /// Create a controller from tuning.
    #[must_use]
    pub fn new(config: PlayerAttackConfig) -> Self {
        Self {
            timing: config.timing(),
            config,
            clock: PhaseClock::new(AttackPhase::Idle),
            combo: ComboState::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> AttackPhase {
        self.clock.phase()
    }

    /// Current combo step (0 when idle long enough).
    #[must_use]
    pub fn combo(&self) -> u8 {
        self.combo.count
    }

    /// Tuning.
    #[must_use]
    pub fn config(&self) -> &PlayerAttackConfig {
        &self.config
    }

    /// Whether a new attack would be accepted.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        !self.clock.phase().is_busy()
    }

    /// Whether an attack in flight pins the player in place.
    #[must_use]
    pub fn locks_movement(&self) -> bool {
        self.clock.phase().is_busy()
    }

    /// Start an attack. Returns the combo step, or `None` if one is in flight.
    pub fn try_attack(&mut self) -> Option<u8> {
        if !self.can_attack() {
            return None;
        }
        let step = self.combo.register_attack(self.config.max_combo);
        self.clock.enter(AttackPhase::Windup);
        Some(step)
    }

    /// Advance time. Returns true on the tick the strike should resolve.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.combo.tick(dt, self.config.combo_reset_window);
        if !self.clock.phase().is_busy() {
            return false;
        }

        self.clock.advance(dt);
        let mut strike = false;
        loop {
            let advanced = match self.clock.phase() {
                AttackPhase::Windup => {
                    let done = self.clock.try_complete(self.timing.windup, AttackPhase::Active);
                    strike |= done;
                    done
                },
                AttackPhase::Active => self
                    .clock
                    .try_complete(self.timing.active, AttackPhase::Recovery),
                AttackPhase::Recovery => self
                    .clock
                    .try_complete(self.timing.recovery, AttackPhase::Idle),
                AttackPhase::Idle => {
                    self.clock.enter(AttackPhase::Idle);
                    false
                },
            };
            if !advanced {
                break;
            }
        }
        strike
    }

    /// Build the strike for `attacker` at its current position and facing.
    #[must_use]
    pub fn strike(&self, attacker: &Actor, targets: LayerMask) -> MeleeStrike {
        let offset = match attacker.facing {
            Facing::Right => self.config.attack_offset,
            Facing::Left => Vec2::new(-self.config.attack_offset.x, self.config.attack_offset.y),
        };
        MeleeStrike::new(
            attacker.id,
            attacker.position + offset,
            self.config.range,
            self.config.damage,
            targets,
        )
        .with_knockback(self.config.knockback)
    }

    /// Abort an attack in flight (death).
    pub fn cancel(&mut self) {
        self.clock.enter(AttackPhase::Idle);
    }

    /// Level restart: no attack in flight, combo cleared.
    pub fn on_restart(&mut self) {
        self.cancel();
        self.combo.reset();
    }
}

impl Default for PlayerCombat {
    fn default() -> Self {
        Self::new(PlayerAttackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthConfig;
    use skirmish_common::{ActorTag, EntityId};

    /// Run an attack to completion in 50 ms steps, returning strike count.
    fn finish_attack(combat: &mut PlayerCombat) -> usize {
        let mut strikes = 0;
        for _ in 0..20 {
            if combat.tick(0.05) {
                strikes += 1;
            }
            if combat.can_attack() {
                break;
            }
        }
        strikes
    }

    #[test]
    fn test_attack_phase_damage() {
        assert!(!AttackPhase::Windup.can_damage());
        assert!(AttackPhase::Active.can_damage());
        assert!(!AttackPhase::Recovery.can_damage());
        assert!(!AttackPhase::Idle.is_busy());
    }

    #[test]
    fn test_attack_timing_from_cooldown() {
        let timing = AttackTiming::from_cooldown(0.5, 0.2);
        assert_eq!(timing.windup, 0.2);
        assert_eq!(timing.active, 0.0);
        assert!((timing.recovery - 0.3).abs() < 1e-6);
        assert!((timing.total_duration() - 0.5).abs() < 1e-6);

        let clamped = AttackTiming::from_cooldown(0.1, 0.2);
        assert_eq!(clamped.windup, 0.1);
        assert_eq!(clamped.recovery, 0.0);
    }

    #[test]
    fn test_combo_escalates_and_resets() {
        let mut combat = PlayerCombat::default();

        assert_eq!(combat.try_attack(), Some(1));
        finish_attack(&mut combat);
        assert_eq!(combat.try_attack(), Some(2));
        finish_attack(&mut combat);
        assert_eq!(combat.try_attack(), Some(3));
        finish_attack(&mut combat);

        // Wait out the reset window
        for _ in 0..40 {
            combat.tick(0.05);
        }
        assert_eq!(combat.combo(), 0);
        assert_eq!(combat.try_attack(), Some(1));
    }

    #[test]
    fn test_combo_wraps_after_max() {
        let mut combo = ComboState::new();
        let steps: Vec<u8> = (0..5).map(|_| combo.register_attack(3)).collect();
        assert_eq!(steps, vec![1, 2, 3, 1, 2]);
    }

    #[test]
    fn test_attack_rejected_while_busy() {
        let mut combat = PlayerCombat::default();
        assert!(combat.try_attack().is_some());
        assert!(combat.locks_movement());
        assert_eq!(combat.try_attack(), None);
        assert_eq!(combat.combo(), 1);
    }

    #[test]
    fn test_single_strike_per_attack() {
        let mut combat = PlayerCombat::default();
        combat.try_attack();
        assert!(!combat.tick(0.1));
        assert_eq!(combat.phase(), AttackPhase::Windup);
        assert!(combat.tick(0.15));
        assert_eq!(combat.phase(), AttackPhase::Recovery);
        assert_eq!(finish_attack(&mut combat), 0);
        assert!(combat.can_attack());
    }

    #[test]
    fn test_large_step_runs_whole_sequence() {
        let mut combat = PlayerCombat::default();
        combat.try_attack();
        assert!(combat.tick(1.0));
        assert!(combat.can_attack());
    }

    #[test]
    fn test_cancel_aborts_strike() {
        let mut combat = PlayerCombat::default();
        combat.try_attack();
        combat.tick(0.1);
        combat.cancel();
        assert!(!combat.tick(0.5));
        assert!(combat.can_attack());
    }

    #[test]
    fn test_strike_follows_facing() {
        let combat = PlayerCombat::default();
        let actor = Actor::new(ActorTag::Player, Vec2::new(2.0, 1.0), HealthConfig::player())
            .with_id(EntityId::from_raw(1))
            .with_facing(Facing::Left);
        let strike = combat.strike(&actor, LayerMask::ENEMY);
        assert_eq!(strike.origin, Vec2::new(1.4, 1.0));
        assert_eq!(strike.damage, 20);
        assert_eq!(strike.knockback, 3.0);
    }

    #[test]
    fn test_restart_clears_combo() {
        let mut combat = PlayerCombat::default();
        combat.try_attack();
        combat.on_restart();
        assert_eq!(combat.combo(), 0);
        assert!(combat.can_attack());
    }
}
