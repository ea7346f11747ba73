//! Event bus and presentation service.
//!
//! The combat core never talks to rendering, animation or audio directly. It
//! asks a [`Presentation`] implementation for cues, and it reports gameplay
//! notifications (damage, deaths, state changes) as [`GameEvent`]s. The
//! [`EventBus`] implements `Presentation` by publishing cue events, so a host
//! can drain one channel for everything.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use skirmish_common::{CheckpointId, EntityId, Vec2};

use crate::ai::EnemyState;

/// Animation cues the core may request on an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationCue {
    /// Start of an attack; carries the combo step (1-based, 1 for enemies).
    Attack {
        /// Combo step.
        combo: u8,
    },
    /// Ranged attack release.
    Fire,
    /// Took a hit.
    Hurt,
    /// Died.
    Death,
}

/// Visual effects the core may request at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Melee hit spark.
    HitSpark,
    /// Projectile impact.
    ProjectileImpact,
    /// Death burst.
    Death,
    /// Checkpoint lit.
    CheckpointActivated,
}

/// Sounds the core may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    /// A melee strike connected.
    MeleeHit,
    /// A swing was started.
    Swing,
    /// A projectile was fired.
    Shoot,
    /// An actor died.
    Death,
}

/// Fire-and-forget presentation requests. Nothing is returned, nothing fails.
pub trait Presentation {
    /// Request an animation cue on an actor.
    fn play_animation_cue(&self, actor: EntityId, cue: AnimationCue);
    /// Request a visual effect at a world position.
    fn spawn_visual_effect(&self, kind: EffectKind, position: Vec2);
    /// Request a sound.
    fn play_sound(&self, kind: SoundKind);
}

/// Presentation that discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresentation;

impl Presentation for NullPresentation {
    fn play_animation_cue(&self, _actor: EntityId, _cue: AnimationCue) {}

    fn spawn_visual_effect(&self, _kind: EffectKind, _position: Vec2) {}

    fn play_sound(&self, _kind: SoundKind) {}
}

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Actor spawned
    ActorSpawned {
        /// Entity ID
        entity_id: EntityId,
    },
    /// Actor took damage
    ActorDamaged {
        /// Entity ID
        entity_id: EntityId,
        /// Damage amount
        damage: i32,
        /// Hit points left
        remaining: i32,
        /// Source entity (if any)
        source: Option<EntityId>,
    },
    /// Actor healed
    ActorHealed {
        /// Entity ID
        entity_id: EntityId,
        /// Heal amount
        amount: i32,
    },
    /// Actor died
    ActorDied {
        /// Entity ID
        entity_id: EntityId,
        /// Killer (if any)
        source: Option<EntityId>,
    },
    /// Dead actor deactivated after its delay
    ActorDisabled {
        /// Entity ID
        entity_id: EntityId,
    },
    /// Enemy brain changed state
    StateChanged {
        /// Entity ID
        entity_id: EntityId,
        /// Previous state
        from: EnemyState,
        /// New state
        to: EnemyState,
    },
    /// A melee strike hit at least one target; hosts shake the camera
    HitFeedback {
        /// Attacker
        attacker: EntityId,
        /// Number of targets hit
        hits: u32,
    },
    /// Projectile fired
    ProjectileSpawned {
        /// Projectile ID
        projectile_id: EntityId,
        /// Owner
        owner: EntityId,
    },
    /// Projectile removed after fading out
    ProjectileRemoved {
        /// Projectile ID
        projectile_id: EntityId,
    },
    /// Checkpoint activated
    CheckpointActivated {
        /// Checkpoint ID
        checkpoint_id: CheckpointId,
    },
    /// Restart requested
    RestartScheduled {
        /// Seconds until restore
        delay: f32,
    },
    /// Level restored from snapshots
    LevelRestarted,
    /// Animation cue request
    Animation {
        /// Actor
        entity_id: EntityId,
        /// Cue
        cue: AnimationCue,
    },
    /// Visual effect request
    Effect {
        /// Effect kind
        kind: EffectKind,
        /// World X
        x: f32,
        /// World Y
        y: f32,
    },
    /// Sound request
    Sound {
        /// Sound kind
        kind: SoundKind,
    },
}

impl GameEvent {
    /// Whether this event is a presentation request rather than a gameplay notification.
    #[must_use]
    pub fn is_presentation(&self) -> bool {
        matches!(
            self,
            Self::Animation { .. } | Self::Effect { .. } | Self::Sound { .. }
        )
    }
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Presentation for EventBus {
    fn play_animation_cue(&self, actor: EntityId, cue: AnimationCue) {
        self.publish(GameEvent::Animation {
            entity_id: actor,
            cue,
        });
    }

    fn spawn_visual_effect(&self, kind: EffectKind, position: Vec2) {
        self.publish(GameEvent::Effect {
            kind,
            x: position.x,
            y: position.y,
        });
    }

    fn play_sound(&self, kind: SoundKind) {
        self.publish(GameEvent::Sound { kind });
    }
}
