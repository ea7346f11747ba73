//! Combat event consumption for the runner.
//!
//! This module provides:
//! - CombatStats: counters folded from the simulation's event stream
//! - CameraShake: decaying shake driven by melee hit feedback

use skirmish_common::EntityId;
use skirmish_gameplay::GameEvent;
use tracing::{debug, info};

/// Statistics tracked for a run.
#[derive(Debug, Clone, Default)]
pub struct CombatStats {
    /// Melee strikes that connected.
    pub melee_hits: u64,
    /// Projectiles fired.
    pub projectiles_fired: u64,
    /// Total damage dealt to anyone.
    pub damage_dealt: u64,
    /// Damage the player took.
    pub player_damage_taken: u64,
    /// Enemies killed.
    pub kills: u64,
    /// Player deaths.
    pub deaths: u64,
    /// Enemy state changes.
    pub state_changes: u64,
    /// Checkpoints lit.
    pub checkpoints: u64,
    /// Level restarts.
    pub restarts: u64,
}

impl CombatStats {
    /// Creates new empty stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the counters.
    pub fn record(&mut self, event: &GameEvent, player: Option<EntityId>) {
        match event {
            GameEvent::HitFeedback { hits, .. } => self.melee_hits += u64::from(*hits),
            GameEvent::ProjectileSpawned { .. } => self.projectiles_fired += 1,
            GameEvent::ActorDamaged {
                entity_id, damage, ..
            } => {
                let damage = u64::try_from(*damage).unwrap_or(0);
                self.damage_dealt += damage;
                if Some(*entity_id) == player {
                    self.player_damage_taken += damage;
                }
            },
            GameEvent::ActorDied { entity_id, .. } => {
                if Some(*entity_id) == player {
                    self.deaths += 1;
                } else {
                    self.kills += 1;
                }
            },
            GameEvent::StateChanged { .. } => self.state_changes += 1,
            GameEvent::CheckpointActivated { .. } => self.checkpoints += 1,
            GameEvent::LevelRestarted => self.restarts += 1,
            _ => {},
        }
    }

    /// Log a one-line summary.
    pub fn log_summary(&self) {
        info!(
            melee_hits = self.melee_hits,
            projectiles = self.projectiles_fired,
            damage = self.damage_dealt,
            player_damage = self.player_damage_taken,
            kills = self.kills,
            deaths = self.deaths,
            restarts = self.restarts,
            "Run summary"
        );
    }
}

/// Camera shake that decays linearly over its duration.
#[derive(Debug, Clone)]
pub struct CameraShake {
    intensity: f32,
    duration: f32,
    remaining: f32,
    triggered: u64,
}

impl CameraShake {
    /// Create an idle shake.
    #[must_use]
    pub fn new(intensity: f32, duration: f32) -> Self {
        Self {
            intensity: intensity.max(0.0),
            duration: duration.max(0.0),
            remaining: 0.0,
            triggered: 0,
        }
    }

    /// Restart the shake at full strength.
    pub fn trigger(&mut self) {
        self.remaining = self.duration;
        self.triggered += 1;
        debug!("Camera shake ({:.2} for {:.2}s)", self.intensity, self.duration);
    }

    /// Advance time.
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    /// Current shake amplitude.
    #[must_use]
    pub fn amplitude(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        self.intensity * (self.remaining / self.duration)
    }

    /// Whether the camera is shaking.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// How many times the shake fired.
    #[must_use]
    pub fn triggered(&self) -> u64 {
        self.triggered
    }
}
