//! Fixed-step tick driver.
//!
//! [`Simulation`] owns the world, the enemy brains, the player's attack
//! controller, projectiles, level triggers and the restart coordinator, and
//! advances them in a fixed order every tick:
//!
//! 0. a due restart is applied (restarts only happen on tick boundaries)
//! 1. health timers (invincibility, flash, disable-after-death)
//! 2. enemy state evaluation
//! 3. movement: state routines, player input, integration
//! 4. combat: attack sequences, player strike, projectiles
//! 5. deaths, checkpoints and death zones
//!
//! A failure inside one actor's update is logged and isolated; `tick` itself
//! never fails.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use skirmish_common::{
    direction_to, ActorTag, EntityId, Facing, LayerMask, SkirmishError, SkirmishResult, Vec2,
};

use crate::actor::{Actor, World};
use crate::ai::{BrainInput, EnemyBrain, EnemyState, PatrolRoute};
use crate::combat::{resolve_melee_attack, MeleeOutcome, MeleeStrike};
use crate::config::CombatTuning;
use crate::engagement::{DistanceBandedPolicy, EngagementPolicy, RangeGatedPolicy, StrikeKind};
use crate::events::{AnimationCue, EffectKind, EventBus, GameEvent, Presentation, SoundKind};
use crate::health::{HealthConfig, HealthOutcome};
use crate::level::{Checkpoint, DeathZone, DeathZoneEffect};
use crate::melee_combat::PlayerCombat;
use crate::physics::Aabb;
use crate::projectile::ProjectileSystem;
use crate::restart::{RestartCoordinator, Restartable};

/// Player intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Horizontal axis in `-1.0..=1.0`.
    pub move_x: f32,
    /// Attack pressed this tick.
    pub attack: bool,
}

impl PlayerInput {
    /// No input.
    pub const IDLE: Self = Self {
        move_x: 0.0,
        attack: false,
    };

    /// Attack press without movement.
    #[must_use]
    pub fn attack() -> Self {
        Self {
            move_x: 0.0,
            attack: true,
        }
    }

    /// Walk along the axis.
    #[must_use]
    pub fn walk(move_x: f32) -> Self {
        Self {
            move_x,
            attack: false,
        }
    }
}

/// Summary of one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// A melee strike connected this tick (camera shake).
    pub feedback: bool,
    /// Actors that died this tick.
    pub deaths: Vec<EntityId>,
    /// The level was restored at the start of this tick.
    pub restarted: bool,
}

#[derive(Debug)]
struct PlayerSlot {
    id: EntityId,
    combat: PlayerCombat,
    move_speed: f32,
}

/// A health change to report after combat.
#[derive(Debug, Clone, Copy)]
struct Damage {
    target: EntityId,
    source: Option<EntityId>,
    outcome: HealthOutcome,
}

/// The combat core for one level.
#[derive(Debug)]
pub struct Simulation {
    tuning: CombatTuning,
    world: World,
    player: Option<PlayerSlot>,
    brains: BTreeMap<EntityId, EnemyBrain>,
    projectiles: ProjectileSystem,
    restart: RestartCoordinator,
    checkpoints: Vec<Checkpoint>,
    death_zones: Vec<DeathZone>,
    events: EventBus,
    tick: u64,
    elapsed: f32,
}

impl Simulation {
    /// Empty level. Fails if the tuning is invalid.
    pub fn new(tuning: CombatTuning) -> SkirmishResult<Self> {
        tuning.validate()?;
        Ok(Self {
            world: World::new(tuning.kinematics),
            player: None,
            brains: BTreeMap::new(),
            projectiles: ProjectileSystem::new(tuning.projectile.clone()),
            restart: RestartCoordinator::new(tuning.restart.clone()),
            checkpoints: Vec::new(),
            death_zones: Vec::new(),
            events: EventBus::default(),
            tick: 0,
            elapsed: 0.0,
            tuning,
        })
    }

    // === Level setup ===

    /// Spawn the player. A level has at most one.
    pub fn spawn_player(&mut self, position: Vec2) -> SkirmishResult<EntityId> {
        if self.player.is_some() {
            return Err(SkirmishError::invalid("level.player", "a player already exists"));
        }
        let tuning = &self.tuning.player;
        let actor = Actor::new(ActorTag::Player, position, tuning.health.clone());
        let id = actor.id;
        self.player = Some(PlayerSlot {
            id,
            combat: PlayerCombat::new(tuning.attack.clone()),
            move_speed: tuning.move_speed,
        });
        self.register(actor);
        info!("Player {id} spawned at ({:.2}, {:.2})", position.x, position.y);
        Ok(id)
    }

    /// Spawn a melee enemy patrolling `route`.
    pub fn spawn_melee_enemy(&mut self, position: Vec2, route: PatrolRoute) -> SkirmishResult<EntityId> {
        let config = self.tuning.melee_enemy.clone();
        let health = config.health.clone();
        self.spawn_enemy(position, route, health, Box::new(RangeGatedPolicy::new(config)))
    }

    /// Spawn a ranged enemy patrolling `route`.
    pub fn spawn_ranged_enemy(&mut self, position: Vec2, route: PatrolRoute) -> SkirmishResult<EntityId> {
        let config = self.tuning.ranged_enemy.clone();
        let health = config.health.clone();
        self.spawn_enemy(position, route, health, Box::new(DistanceBandedPolicy::new(config)))
    }

    /// Spawn an enemy with any policy.
    pub fn spawn_enemy(
        &mut self,
        position: Vec2,
        route: PatrolRoute,
        health: HealthConfig,
        policy: Box<dyn EngagementPolicy>,
    ) -> SkirmishResult<EntityId> {
        if health.max_health <= 0 {
            return Err(SkirmishError::invalid("enemy.health.max_health", "must be positive"));
        }
        let actor = Actor::new(ActorTag::Enemy, position, health);
        let id = actor.id;
        let kind = policy.kind();
        self.brains.insert(id, EnemyBrain::new(id, route, policy));
        self.register(actor);
        info!("Enemy {id} ({kind:?}) spawned at ({:.2}, {:.2})", position.x, position.y);
        Ok(id)
    }

    /// Add static geometry.
    pub fn add_obstacle(&mut self, bounds: Aabb) {
        self.world.add_obstacle(bounds);
    }

    /// Add a checkpoint.
    pub fn add_checkpoint(&mut self, checkpoint: Checkpoint) {
        self.checkpoints.push(checkpoint);
    }

    /// Add a death zone.
    pub fn add_death_zone(&mut self, zone: DeathZone) {
        self.death_zones.push(zone);
    }

    fn register(&mut self, actor: Actor) {
        self.restart.register(actor.id, actor.snapshot());
        self.events.publish(GameEvent::ActorSpawned { entity_id: actor.id });
        self.world.spawn(actor);
    }

    // === Accessors ===

    /// Tuning in use.
    #[must_use]
    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably (scripted setups and tests).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Look up an actor.
    #[must_use]
    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.world.get(id)
    }

    /// Player ID.
    #[must_use]
    pub fn player_id(&self) -> Option<EntityId> {
        self.player.as_ref().map(|p| p.id)
    }

    /// Player attack controller.
    #[must_use]
    pub fn player_combat(&self) -> Option<&PlayerCombat> {
        self.player.as_ref().map(|p| &p.combat)
    }

    /// Enemy brain.
    #[must_use]
    pub fn brain(&self, id: EntityId) -> Option<&EnemyBrain> {
        self.brains.get(&id)
    }

    /// Enemy state.
    #[must_use]
    pub fn enemy_state(&self, id: EntityId) -> Option<EnemyState> {
        self.brains.get(&id).map(EnemyBrain::state)
    }

    /// Enemy IDs in spawn order.
    pub fn enemies(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.brains.keys().copied()
    }

    /// Projectiles.
    #[must_use]
    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    /// Restart coordinator.
    #[must_use]
    pub fn restart(&self) -> &RestartCoordinator {
        &self.restart
    }

    /// Checkpoints.
    #[must_use]
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Take every pending event.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Ticks run so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds so far.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    // === Level lifecycle ===

    /// Request a level restart after the configured delay.
    pub fn request_restart(&mut self) -> bool {
        let scheduled = self.restart.request_default_restart();
        if scheduled {
            let delay = self.restart.config().restart_delay;
            self.events.publish(GameEvent::RestartScheduled { delay });
        }
        scheduled
    }

    fn schedule_restart(&mut self, delay: f32) -> bool {
        let scheduled = self.restart.request_restart(delay);
        if scheduled {
            self.events.publish(GameEvent::RestartScheduled { delay });
        }
        scheduled
    }

    fn perform_restart(&mut self) {
        let restored = self.restart.restore_all(&mut self.world);
        for brain in self.brains.values_mut() {
            brain.on_restart();
        }
        if let Some(player) = self.player.as_mut() {
            player.combat.on_restart();
        }
        self.projectiles.clear();
        self.events.publish(GameEvent::LevelRestarted);
        info!("Level restarted, {restored} actors restored");
    }

    // === Tick ===

    /// Advance the level by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: &PlayerInput) -> TickReport {
        let dt = dt.max(0.0);
        self.tick += 1;
        self.elapsed += dt;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        if self.restart.poll(dt) {
            self.perform_restart();
            report.restarted = true;
        }

        self.tick_health(dt);
        self.evaluate_states();
        self.apply_movement(dt, input);

        let mut damage = Vec::new();
        self.resolve_combat(dt, &mut damage, &mut report);

        self.report_damage(&damage, &mut report);
        self.update_triggers(&mut report);
        report
    }

    fn tick_health(&mut self, dt: f32) {
        let mut disabled = Vec::new();
        for actor in self.world.actors_mut() {
            if actor.health.tick(dt) {
                actor.active = false;
                disabled.push(actor.id);
            }
        }
        for id in disabled {
            debug!("{id} disabled after death");
            self.events.publish(GameEvent::ActorDisabled { entity_id: id });
        }
    }

    fn player_target(&self) -> Option<Vec2> {
        let id = self.player.as_ref()?.id;
        self.world
            .get(id)
            .filter(|a| a.is_alive())
            .map(|a| a.position)
    }

    fn brain_input(&self, id: EntityId, target: Option<Vec2>) -> Option<BrainInput> {
        let actor = self.world.get(id)?;
        actor.is_alive().then(|| BrainInput {
            position: actor.position,
            facing: actor.facing,
            health_ratio: actor.health.ratio(),
            target,
        })
    }

    fn evaluate_states(&mut self) {
        let target = self.player_target();
        let ids: Vec<EntityId> = self.brains.keys().copied().collect();

        for id in ids {
            let Some(input) = self.brain_input(id, target) else {
                continue;
            };
            let Some(brain) = self.brains.get_mut(&id) else {
                continue;
            };
            if let Some(t) = brain.evaluate(&input) {
                self.events.publish(GameEvent::StateChanged {
                    entity_id: id,
                    from: t.from,
                    to: t.to,
                });
            }
        }
    }

    fn apply_movement(&mut self, dt: f32, input: &PlayerInput) {
        let target = self.player_target();
        let ids: Vec<EntityId> = self.brains.keys().copied().collect();

        for id in ids {
            let Some(perceived) = self.brain_input(id, target) else {
                continue;
            };
            let Some(brain) = self.brains.get_mut(&id) else {
                continue;
            };
            let action = brain.act(&perceived, dt);
            if let Some(t) = action.transition {
                self.events.publish(GameEvent::StateChanged {
                    entity_id: id,
                    from: t.from,
                    to: t.to,
                });
            }
            if action.attack_started {
                self.events
                    .play_animation_cue(id, AnimationCue::Attack { combo: 1 });
            }
            if let Some(actor) = self.world.get_mut(id) {
                if actor.can_move() {
                    actor.velocity.x = action.velocity_x;
                }
                actor.facing = action.facing;
            }
        }

        self.apply_player_input(input);
        self.world.integrate(dt);
    }

    fn apply_player_input(&mut self, input: &PlayerInput) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let Some(actor) = self.world.get_mut(player.id) else {
            return;
        };
        if !actor.is_alive() {
            return;
        }

        if actor.can_move() {
            if player.combat.locks_movement() {
                actor.velocity.x = 0.0;
            } else {
                let axis = input.move_x.clamp(-1.0, 1.0);
                actor.velocity.x = axis * player.move_speed;
                actor.facing = Facing::from_direction(axis, actor.facing);
            }
        }

        if input.attack {
            if let Some(combo) = player.combat.try_attack() {
                debug!("Player attack, combo step {combo}");
                actor.velocity.x = 0.0;
                self.events
                    .play_animation_cue(player.id, AnimationCue::Attack { combo });
                self.events.play_sound(SoundKind::Swing);
            }
        }
    }

    fn resolve_combat(&mut self, dt: f32, damage: &mut Vec<Damage>, report: &mut TickReport) {
        let target = self.player_target();
        let ids: Vec<EntityId> = self.brains.keys().copied().collect();

        for id in ids {
            let Some(strike) = self.brains.get_mut(&id).and_then(|b| b.tick_attack(dt)) else {
                continue;
            };
            let Some(actor) = self.world.get(id).filter(|a| a.is_alive()) else {
                continue;
            };
            let (position, facing) = (actor.position, actor.facing);

            match strike {
                StrikeKind::Melee { damage: amount, radius } => {
                    let strike = MeleeStrike::new(id, position, radius, amount, LayerMask::PLAYER);
                    self.resolve_strike(&strike, damage, report);
                },
                StrikeKind::Ranged {
                    damage: amount,
                    speed,
                    muzzle_offset,
                } => {
                    let muzzle = position + Vec2::new(muzzle_offset.x * facing.sign(), muzzle_offset.y);
                    let direction = match target {
                        Some(t) => direction_to(muzzle, t),
                        None => facing.to_vec2(),
                    };
                    let projectile =
                        self.projectiles
                            .spawn(id, muzzle, direction * speed, amount, LayerMask::PLAYER);
                    self.events.play_animation_cue(id, AnimationCue::Fire);
                    self.events.play_sound(SoundKind::Shoot);
                    self.events.publish(GameEvent::ProjectileSpawned {
                        projectile_id: projectile,
                        owner: id,
                    });
                },
            }
        }

        if let Some(strike) = self.player_strike(dt) {
            self.resolve_strike(&strike, damage, report);
        }

        let projectile_report = self.projectiles.tick(dt, &mut self.world, &self.events);
        for impact in projectile_report.impacts {
            if let Some(target) = impact.target {
                damage.push(Damage {
                    target,
                    source: Some(impact.owner),
                    outcome: impact.outcome,
                });
            }
        }
        for id in projectile_report.removed {
            self.events
                .publish(GameEvent::ProjectileRemoved { projectile_id: id });
        }
    }

    fn player_strike(&mut self, dt: f32) -> Option<MeleeStrike> {
        let player = self.player.as_mut()?;
        if !player.combat.tick(dt) {
            return None;
        }
        let actor = self.world.get(player.id).filter(|a| a.is_alive())?;
        Some(player.combat.strike(actor, ActorTag::Player.hostile_layers()))
    }

    fn resolve_strike(&mut self, strike: &MeleeStrike, damage: &mut Vec<Damage>, report: &mut TickReport) {
        match resolve_melee_attack(strike, &mut self.world, &self.events) {
            Ok(outcome) => self.record_melee(strike.attacker, &outcome, damage, report),
            Err(e) => {
                let err = SkirmishError::from(e);
                if err.is_fatal() {
                    warn!("Melee strike from {} rejected: {err}", strike.attacker);
                } else {
                    debug!("Melee strike from {} skipped: {err}", strike.attacker);
                }
            },
        }
    }

    fn record_melee(
        &self,
        attacker: EntityId,
        outcome: &MeleeOutcome,
        damage: &mut Vec<Damage>,
        report: &mut TickReport,
    ) {
        if !outcome.feedback() {
            return;
        }
        report.feedback = true;
        self.events.publish(GameEvent::HitFeedback {
            attacker,
            hits: outcome.hits.len() as u32,
        });
        damage.extend(outcome.hits.iter().map(|h| Damage {
            target: h.target,
            source: Some(attacker),
            outcome: h.outcome,
        }));
    }

    fn report_damage(&mut self, damage: &[Damage], report: &mut TickReport) {
        for d in damage {
            match d.outcome {
                HealthOutcome::Unchanged => {},
                HealthOutcome::Damaged { amount, remaining } => {
                    if let Some(brain) = self.brains.get_mut(&d.target) {
                        brain.on_hurt();
                    }
                    self.events.publish(GameEvent::ActorDamaged {
                        entity_id: d.target,
                        damage: amount,
                        remaining,
                        source: d.source,
                    });
                },
                HealthOutcome::Healed { amount, .. } => {
                    self.events.publish(GameEvent::ActorHealed {
                        entity_id: d.target,
                        amount,
                    });
                },
                HealthOutcome::Died { amount } => {
                    self.events.publish(GameEvent::ActorDamaged {
                        entity_id: d.target,
                        damage: amount,
                        remaining: 0,
                        source: d.source,
                    });
                    self.handle_death(d.target, d.source, report);
                },
            }
        }
    }

    fn handle_death(&mut self, id: EntityId, source: Option<EntityId>, report: &mut TickReport) {
        let Some(actor) = self.world.get_mut(id) else {
            return;
        };
        actor.halt();
        let (tag, position) = (actor.tag, actor.position);
        report.deaths.push(id);

        self.events.play_animation_cue(id, AnimationCue::Death);
        self.events.spawn_visual_effect(EffectKind::Death, position);
        self.events.play_sound(SoundKind::Death);
        self.events.publish(GameEvent::ActorDied {
            entity_id: id,
            source,
        });
        info!("{tag:?} {id} died");

        match tag {
            ActorTag::Enemy => {
                if let Some(brain) = self.brains.get_mut(&id) {
                    brain.on_death();
                }
                if self.projectiles.config().despawn_on_owner_death {
                    let faded = self.projectiles.despawn_owned_by(id);
                    debug!("Faded {faded} projectiles of {id}");
                }
            },
            ActorTag::Player => {
                if let Some(player) = self.player.as_mut() {
                    player.combat.cancel();
                }
                // Ignored when a death zone already asked for its restart
                let delay = self.restart.death_restart_delay();
                self.schedule_restart(delay);
            },
        }
    }

    fn update_triggers(&mut self, report: &mut TickReport) {
        let Some(player_id) = self.player_id() else {
            return;
        };

        if let Some(player) = self.world.get(player_id) {
            for checkpoint in &mut self.checkpoints {
                if checkpoint.update(player) {
                    self.restart.set_checkpoint(checkpoint.id, checkpoint.position);
                    self.events
                        .spawn_visual_effect(EffectKind::CheckpointActivated, checkpoint.position);
                    self.events.publish(GameEvent::CheckpointActivated {
                        checkpoint_id: checkpoint.id,
                    });
                }
            }
        }

        let touched: Vec<DeathZone> = match self.world.get(player_id) {
            Some(player) => self
                .death_zones
                .iter()
                .filter(|z| z.touches(player))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        for zone in touched {
            if zone.restart_on_touch {
                self.request_restart();
            }
            let outcome = match self.world.get_mut(player_id) {
                Some(player) => match zone.effect {
                    DeathZoneEffect::InstantKill => {
                        if player.health.die() {
                            HealthOutcome::Died { amount: 0 }
                        } else {
                            HealthOutcome::Unchanged
                        }
                    },
                    DeathZoneEffect::Damage(amount) => player.health.take_damage(amount),
                },
                None => HealthOutcome::Unchanged,
            };
            self.report_damage(
                &[Damage {
                    target: player_id,
                    source: None,
                    outcome,
                }],
                report,
            );
        }
    }
}
