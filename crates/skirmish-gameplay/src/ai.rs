//! Enemy behavior state machine.
//!
//! Each tick an enemy brain does three things, in this order, driven by the
//! simulation:
//! 1. [`EnemyBrain::evaluate`] picks a state from perception alone
//! 2. [`EnemyBrain::act`] runs the state's movement routine and may start an attack
//! 3. [`EnemyBrain::tick_attack`] advances the attack sequence and reports the strike
//!
//! State selection is a pure function ([`resolve_state`]) of the current state,
//! the policy's engagement decision and whether the enemy is outside its
//! patrol bounds. The brain never touches the world; it returns intents.

use serde::{Deserialize, Serialize};
use tracing::debug;

use skirmish_common::{EntityId, Facing, SkirmishError, SkirmishResult, Vec2};

use crate::cooldown::{Cooldown, PhaseClock};
use crate::engagement::{
    Engagement, EngagementPolicy, EnemyAttackTiming, Perception, PolicyKind, StrikeKind,
};

// ============================================================================
// States
// ============================================================================

/// High-level behavior of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyState {
    /// Walking between patrol bounds.
    #[default]
    Patrolling,
    /// Moving towards the target.
    Chasing,
    /// Standing and attacking.
    Attacking,
    /// Running from the target.
    Fleeing,
    /// Walking back inside the patrol bounds.
    Returning,
}

impl EnemyState {
    /// Whether the enemy is dealing with its target.
    #[must_use]
    pub fn is_engaged(self) -> bool {
        matches!(self, Self::Chasing | Self::Attacking | Self::Fleeing)
    }
}

/// A change of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Previous state.
    pub from: EnemyState,
    /// New state.
    pub to: EnemyState,
}

/// Pick the next state. Rules are checked in priority order and the first
/// match wins:
/// 1. flee engagement → Fleeing
/// 2. outside bounds and not engaged → Returning
/// 3. chase engagement → Chasing
/// 4. attack engagement → Attacking
/// 5. otherwise back to Patrolling, unless already patrolling, outside the
///    bounds, or fleeing (those keep their state)
#[must_use]
pub fn resolve_state(current: EnemyState, engagement: Engagement, outside_bounds: bool) -> EnemyState {
    if engagement == Engagement::Flee {
        return EnemyState::Fleeing;
    }
    if outside_bounds && !current.is_engaged() {
        return EnemyState::Returning;
    }
    match engagement {
        Engagement::Chase => EnemyState::Chasing,
        Engagement::Attack => EnemyState::Attacking,
        Engagement::Flee | Engagement::Disengaged => {
            if current != EnemyState::Patrolling && !outside_bounds && current != EnemyState::Fleeing {
                EnemyState::Patrolling
            } else {
                current
            }
        },
    }
}

// ============================================================================
// Patrol Route
// ============================================================================

/// Horizontal patrol segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolRoute {
    /// Left bound (world X).
    pub left: f32,
    /// Right bound (world X).
    pub right: f32,
}

impl PatrolRoute {
    /// Create a route. Fails if `left > right`.
    pub fn new(left: f32, right: f32) -> SkirmishResult<Self> {
        if !(left.is_finite() && right.is_finite()) || left > right {
            return Err(SkirmishError::invalid(
                "patrol",
                format!("left bound {left} must not exceed right bound {right}"),
            ));
        }
        Ok(Self { left, right })
    }

    /// Route centered on `x`, `half_width` to each side.
    pub fn around(x: f32, half_width: f32) -> SkirmishResult<Self> {
        Self::new(x - half_width.abs(), x + half_width.abs())
    }

    /// Whether `x` is within the bounds.
    #[must_use]
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Bound to head for from `x` when outside: the left bound if left of
    /// the route, otherwise the right bound.
    #[must_use]
    pub fn return_target(&self, x: f32) -> f32 {
        if x < self.left {
            self.left
        } else {
            self.right
        }
    }
}

// ============================================================================
// Attack Sequence
// ============================================================================

/// Phase of an enemy attack sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyAttackPhase {
    /// An attack may start.
    #[default]
    Ready,
    /// Telegraphing the strike.
    Windup,
    /// Strike done, holding still.
    Recovery,
    /// Waiting before the next attack.
    Cooldown,
}

/// Cooperative timed attack: windup, strike, recovery, cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyAttack {
    timing: EnemyAttackTiming,
    clock: PhaseClock<EnemyAttackPhase>,
}

impl EnemyAttack {
    /// Idle attack sequence.
    #[must_use]
    pub fn new(timing: EnemyAttackTiming) -> Self {
        Self {
            timing,
            clock: PhaseClock::new(EnemyAttackPhase::Ready),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> EnemyAttackPhase {
        self.clock.phase()
    }

    /// Whether a new attack may start.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.clock.is(EnemyAttackPhase::Ready)
    }

    /// Whether the attacker must stand still.
    #[must_use]
    pub fn halts_movement(&self) -> bool {
        matches!(
            self.clock.phase(),
            EnemyAttackPhase::Windup | EnemyAttackPhase::Recovery
        )
    }

    /// Begin the windup. Returns false if not ready.
    pub fn start(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.clock.enter(EnemyAttackPhase::Windup);
        true
    }

    /// Advance time. Returns true on the tick the strike lands.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_ready() {
            return false;
        }
        self.clock.advance(dt);
        let mut strike = false;
        loop {
            let advanced = match self.clock.phase() {
                EnemyAttackPhase::Windup => {
                    let done = self
                        .clock
                        .try_complete(self.timing.windup, EnemyAttackPhase::Recovery);
                    strike |= done;
                    done
                },
                EnemyAttackPhase::Recovery => self
                    .clock
                    .try_complete(self.timing.recovery, EnemyAttackPhase::Cooldown),
                EnemyAttackPhase::Cooldown => {
                    let done = self
                        .clock
                        .try_complete(self.timing.cooldown, EnemyAttackPhase::Ready);
                    if done {
                        self.clock.enter(EnemyAttackPhase::Ready);
                    }
                    false
                },
                EnemyAttackPhase::Ready => false,
            };
            if !advanced {
                break;
            }
        }
        strike
    }

    /// Abort and become ready immediately.
    pub fn cancel(&mut self) {
        self.clock.enter(EnemyAttackPhase::Ready);
    }
}

// ============================================================================
// Brain
// ============================================================================

/// What the brain sees of itself and its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrainInput {
    /// Own position.
    pub position: Vec2,
    /// Own facing.
    pub facing: Facing,
    /// Own `current / max` health.
    pub health_ratio: f32,
    /// Target position, if there is a live target.
    pub target: Option<Vec2>,
}

/// Movement intent from [`EnemyBrain::act`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrainAction {
    /// Horizontal velocity to apply.
    pub velocity_x: f32,
    /// Facing to apply.
    pub facing: Facing,
    /// An attack sequence started this tick.
    pub attack_started: bool,
    /// The state routine itself changed state.
    pub transition: Option<StateTransition>,
}

/// State machine plus timed actions for one enemy.
#[derive(Debug)]
pub struct EnemyBrain {
    id: EntityId,
    state: EnemyState,
    route: PatrolRoute,
    policy: Box<dyn EngagementPolicy>,
    boundary_wait: Cooldown,
    stagger: Cooldown,
    attack: EnemyAttack,
}

impl EnemyBrain {
    /// Create a patrolling brain.
    #[must_use]
    pub fn new(id: EntityId, route: PatrolRoute, policy: Box<dyn EngagementPolicy>) -> Self {
        let attack = EnemyAttack::new(policy.timing());
        let boundary_wait = Cooldown::new(policy.boundary_wait());
        let stagger = Cooldown::new(policy.hurt_stagger());
        Self {
            id,
            state: EnemyState::Patrolling,
            route,
            policy,
            boundary_wait,
            stagger,
            attack,
        }
    }

    /// Actor this brain drives.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Patrol route.
    #[must_use]
    pub fn route(&self) -> PatrolRoute {
        self.route
    }

    /// Which policy drives the brain.
    #[must_use]
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// The attack sequence.
    #[must_use]
    pub fn attack(&self) -> &EnemyAttack {
        &self.attack
    }

    /// Whether the brain is pausing at a patrol bound.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        !self.boundary_wait.is_ready()
    }

    /// Whether the brain is frozen by a recent hit.
    #[must_use]
    pub fn is_staggered(&self) -> bool {
        !self.stagger.is_ready()
    }

    /// Build perception from input.
    #[must_use]
    pub fn perceive(&self, input: &BrainInput) -> Perception {
        Perception {
            distance: input
                .target
                .map_or(f32::MAX, |t| input.position.distance(t)),
            health_ratio: input.health_ratio,
            outside_bounds: !self.route.contains(input.position.x),
        }
    }

    /// Re-evaluate the state from perception.
    pub fn evaluate(&mut self, input: &BrainInput) -> Option<StateTransition> {
        let perception = self.perceive(input);
        let engagement = self.policy.classify(&perception);
        let next = resolve_state(self.state, engagement, perception.outside_bounds);
        self.set_state(next)
    }

    /// Run the current state's routine.
    ///
    /// Timed pauses count down here whatever the state, so a boundary wait
    /// interrupted by a chase does not resume later. A staggered brain stands
    /// still and starts nothing; an attack already in flight keeps running.
    pub fn act(&mut self, input: &BrainInput, dt: f32) -> BrainAction {
        self.boundary_wait.tick(dt);
        self.stagger.tick(dt);

        let perception = self.perceive(input);
        let mut action = BrainAction {
            velocity_x: 0.0,
            facing: input.facing,
            attack_started: false,
            transition: None,
        };
        if self.is_staggered() {
            return action;
        }
        let target_facing = |fallback| match input.target {
            Some(t) => Facing::towards(input.position, t, fallback),
            None => fallback,
        };

        match self.state {
            EnemyState::Patrolling => self.patrol(input, &mut action),
            EnemyState::Chasing => {
                action.facing = target_facing(input.facing);
                if input.target.is_some_and(|t| t.x != input.position.x) {
                    action.velocity_x = action.facing.sign() * self.policy.chase_speed(&perception);
                }
                action.attack_started = self.try_start_attack(&perception);
            },
            EnemyState::Attacking => {
                action.facing = target_facing(input.facing);
                action.attack_started = self.try_start_attack(&perception);
            },
            EnemyState::Fleeing => {
                if let Some(target) = input.target {
                    let away = if input.position.x < target.x {
                        Facing::Left
                    } else {
                        Facing::Right
                    };
                    action.facing = away;
                    action.velocity_x = away.sign() * self.policy.flee_speed(&perception);
                }
                if perception.distance > self.policy.flee_exit_distance(&perception) {
                    action.transition = self.set_state(EnemyState::Returning);
                }
            },
            EnemyState::Returning => {
                if perception.outside_bounds {
                    let goal = self.route.return_target(input.position.x);
                    action.facing = Facing::from_direction(goal - input.position.x, input.facing);
                    action.velocity_x = action.facing.sign() * self.policy.move_speed();
                } else {
                    action.transition = self.set_state(EnemyState::Patrolling);
                }
            },
        }

        if self.attack.halts_movement() && self.state != EnemyState::Fleeing {
            action.velocity_x = 0.0;
        }
        action
    }

    /// Advance the attack sequence. Returns what to strike with on the tick
    /// the strike lands.
    pub fn tick_attack(&mut self, dt: f32) -> Option<StrikeKind> {
        self.attack.tick(dt).then(|| self.policy.strike())
    }

    /// Took a hit and survived: stand still for the policy's stagger time.
    pub fn on_hurt(&mut self) {
        if self.stagger.duration() > 0.0 {
            self.stagger.trigger();
            debug!("{} staggered for {:.2}s", self.id, self.stagger.duration());
        }
    }

    /// Death: abort every timed action.
    pub fn on_death(&mut self) {
        self.attack.cancel();
        self.boundary_wait.reset();
        self.stagger.reset();
    }

    /// Level restart: back to patrolling with fresh timers.
    pub fn on_restart(&mut self) {
        self.state = EnemyState::Patrolling;
        self.attack.cancel();
        self.boundary_wait.reset();
        self.stagger.reset();
    }

    fn patrol(&mut self, input: &BrainInput, action: &mut BrainAction) {
        if self.is_waiting() {
            return;
        }
        let x = input.position.x;
        let at_bound = match input.facing {
            Facing::Right => x >= self.route.right,
            Facing::Left => x <= self.route.left,
        };
        if at_bound {
            action.facing = input.facing.flipped();
            self.boundary_wait.trigger();
            debug!("{} reached patrol bound at x={x:.2}, waiting", self.id);
        } else {
            action.velocity_x = input.facing.sign() * self.policy.move_speed();
        }
    }

    fn try_start_attack(&mut self, perception: &Perception) -> bool {
        if self.attack.is_ready() && self.policy.can_strike(self.state, perception) {
            self.attack.start()
        } else {
            false
        }
    }

    fn set_state(&mut self, next: EnemyState) -> Option<StateTransition> {
        if next == self.state {
            return None;
        }
        let transition = StateTransition {
            from: self.state,
            to: next,
        };
        debug!("{} state {:?} -> {:?}", self.id, transition.from, transition.to);
        if next == EnemyState::Fleeing && !self.attack.is_ready() {
            // No strike may land once the enemy runs
            self.attack.cancel();
        }
        self.state = next;
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::{DistanceBandedPolicy, RangeGatedPolicy};

    fn test_entity() -> EntityId {
        EntityId::from_raw(1)
    }

    fn melee_brain() -> EnemyBrain {
        let route = PatrolRoute::new(-5.0, 5.0).expect("valid route");
        EnemyBrain::new(test_entity(), route, Box::new(RangeGatedPolicy::default()))
    }

    fn input(x: f32, target_x: Option<f32>, health_ratio: f32) -> BrainInput {
        BrainInput {
            position: Vec2::new(x, 0.0),
            facing: Facing::Right,
            health_ratio,
            target: target_x.map(|t| Vec2::new(t, 0.0)),
        }
    }

    #[test]
    fn test_priority_flee_beats_everything() {
        for current in [
            EnemyState::Patrolling,
            EnemyState::Chasing,
            EnemyState::Attacking,
            EnemyState::Returning,
        ] {
            assert_eq!(
                resolve_state(current, Engagement::Flee, true),
                EnemyState::Fleeing
            );
        }
    }

    #[test]
    fn test_flee_scenario_with_default_thresholds() {
        let mut brain = melee_brain();
        brain.evaluate(&input(0.0, Some(4.0), 0.2));
        assert_eq!(brain.state(), EnemyState::Fleeing);
    }

    #[test]
    fn test_out_of_range_chaser_returns_to_patrol() {
        let mut brain = melee_brain();
        brain.evaluate(&input(0.0, Some(3.0), 1.0));
        assert_eq!(brain.state(), EnemyState::Chasing);

        let transition = brain.evaluate(&input(0.0, Some(6.0), 1.0));
        assert_eq!(brain.state(), EnemyState::Patrolling);
        assert_eq!(
            transition,
            Some(StateTransition {
                from: EnemyState::Chasing,
                to: EnemyState::Patrolling
            })
        );
    }

    #[test]
    fn test_returning_only_when_not_engaged() {
        assert_eq!(
            resolve_state(EnemyState::Patrolling, Engagement::Disengaged, true),
            EnemyState::Returning
        );
        assert_eq!(
            resolve_state(EnemyState::Chasing, Engagement::Chase, true),
            EnemyState::Chasing
        );
        // A chaser outside its bounds that loses the target keeps chasing
        assert_eq!(
            resolve_state(EnemyState::Chasing, Engagement::Disengaged, true),
            EnemyState::Chasing
        );
        // Fleeing holds until its own routine hands over
        assert_eq!(
            resolve_state(EnemyState::Fleeing, Engagement::Disengaged, false),
            EnemyState::Fleeing
        );
    }

    #[test]
    fn test_missing_target_patrols() {
        let mut brain = melee_brain();
        assert_eq!(brain.evaluate(&input(0.0, None, 1.0)), None);
        assert_eq!(brain.state(), EnemyState::Patrolling);
        let action = brain.act(&input(0.0, None, 1.0), 0.1);
        assert_eq!(action.velocity_x, 3.0);
    }

    #[test]
    fn test_patrol_flips_and_waits_at_bound() {
        let mut brain = melee_brain();
        let action = brain.act(&input(5.0, None, 1.0), 0.1);
        assert_eq!(action.facing, Facing::Left);
        assert_eq!(action.velocity_x, 0.0);
        assert!(brain.is_waiting());

        let waiting = BrainInput {
            facing: Facing::Left,
            ..input(5.0, None, 1.0)
        };
        assert_eq!(brain.act(&waiting, 1.0).velocity_x, 0.0);
        brain.act(&waiting, 1.0);
        assert!(!brain.is_waiting());
        assert_eq!(brain.act(&waiting, 0.1).velocity_x, -3.0);
    }

    #[test]
    fn test_chase_moves_towards_target() {
        let mut brain = melee_brain();
        let seen = input(0.0, Some(-3.0), 1.0);
        brain.evaluate(&seen);
        let action = brain.act(&seen, 0.1);
        assert_eq!(action.facing, Facing::Left);
        assert_eq!(action.velocity_x, -3.0);
        assert!(!action.attack_started);
    }

    #[test]
    fn test_attack_halts_and_strikes_after_windup() {
        let mut brain = melee_brain();
        let close = input(0.0, Some(1.0), 1.0);
        brain.evaluate(&close);
        assert_eq!(brain.state(), EnemyState::Attacking);

        let action = brain.act(&close, 0.1);
        assert!(action.attack_started);
        assert_eq!(action.velocity_x, 0.0);

        assert_eq!(brain.tick_attack(0.2), None);
        assert!(matches!(
            brain.tick_attack(0.15),
            Some(StrikeKind::Melee { damage: 10, .. })
        ));
        assert_eq!(brain.attack().phase(), EnemyAttackPhase::Recovery);

        // Recovery then cooldown must pass before the next swing
        assert!(!brain.act(&close, 0.1).attack_started);
        brain.tick_attack(0.5);
        assert_eq!(brain.attack().phase(), EnemyAttackPhase::Cooldown);
        brain.tick_attack(1.5);
        assert!(brain.attack().is_ready());
        assert!(brain.act(&close, 0.1).attack_started);
    }

    #[test]
    fn test_fleeing_hands_over_to_returning() {
        let mut brain = melee_brain();
        let hurt_close = input(0.0, Some(2.0), 0.1);
        brain.evaluate(&hurt_close);
        let action = brain.act(&hurt_close, 0.1);
        assert_eq!(action.facing, Facing::Left);
        assert_eq!(action.velocity_x, -4.0);

        let far = input(0.0, Some(11.0), 0.1);
        brain.evaluate(&far);
        assert_eq!(brain.state(), EnemyState::Fleeing);
        let action = brain.act(&far, 0.1);
        assert_eq!(
            action.transition.map(|t| t.to),
            Some(EnemyState::Returning)
        );
    }

    #[test]
    fn test_fleeing_aborts_attack_in_flight() {
        let mut brain = melee_brain();
        let close = input(0.0, Some(1.0), 1.0);
        brain.evaluate(&close);
        assert!(brain.act(&close, 0.1).attack_started);
        assert_eq!(brain.tick_attack(0.1), None);
        assert_eq!(brain.attack().phase(), EnemyAttackPhase::Windup);

        let hurt = input(0.0, Some(1.0), 0.1);
        brain.evaluate(&hurt);
        assert_eq!(brain.state(), EnemyState::Fleeing);
        assert!(brain.attack().is_ready());

        let action = brain.act(&hurt, 0.1);
        assert_eq!(action.velocity_x, -4.0);
        assert!(!action.attack_started);
        assert_eq!(brain.tick_attack(0.5), None);
    }

    #[test]
    fn test_boundary_wait_runs_down_during_chase() {
        let mut brain = melee_brain();
        brain.act(&input(5.0, None, 1.0), 0.1);
        assert!(brain.is_waiting());

        let seen = BrainInput {
            facing: Facing::Left,
            ..input(5.0, Some(2.0), 1.0)
        };
        brain.evaluate(&seen);
        assert_eq!(brain.state(), EnemyState::Chasing);
        brain.act(&seen, 2.5);
        assert!(!brain.is_waiting());

        let lost = BrainInput {
            facing: Facing::Left,
            ..input(4.0, None, 1.0)
        };
        brain.evaluate(&lost);
        assert_eq!(brain.state(), EnemyState::Patrolling);
        assert_eq!(brain.act(&lost, 0.1).velocity_x, -3.0);
    }

    #[test]
    fn test_ranged_stagger_freezes_movement_and_attacks() {
        let route = PatrolRoute::around(0.0, 5.0).expect("valid route");
        let mut brain = EnemyBrain::new(
            test_entity(),
            route,
            Box::new(DistanceBandedPolicy::default()),
        );
        let crowded = input(0.0, Some(-1.0), 1.0);
        brain.evaluate(&crowded);
        brain.on_hurt();
        assert!(brain.is_staggered());

        let action = brain.act(&crowded, 0.2);
        assert_eq!(action.velocity_x, 0.0);
        let in_band = input(0.0, Some(4.0), 1.0);
        brain.evaluate(&in_band);
        assert!(!brain.act(&in_band, 0.2).attack_started);

        // 0.5s after the hit the brain acts again
        assert!(brain.act(&in_band, 0.2).attack_started);
        assert!(!brain.is_staggered());
    }

    #[test]
    fn test_melee_ignores_hurt_by_default() {
        let mut brain = melee_brain();
        brain.on_hurt();
        assert!(!brain.is_staggered());
        assert_eq!(brain.act(&input(0.0, None, 1.0), 0.1).velocity_x, 3.0);
    }

    #[test]
    fn test_returning_heads_to_nearest_bound() {
        let mut brain = melee_brain();
        let outside = input(8.0, None, 1.0);
        brain.evaluate(&outside);
        assert_eq!(brain.state(), EnemyState::Returning);
        let action = brain.act(&outside, 0.1);
        assert_eq!(action.facing, Facing::Left);
        assert_eq!(action.velocity_x, -3.0);

        let inside = input(4.0, None, 1.0);
        let action = brain.act(&inside, 0.1);
        assert_eq!(action.transition.map(|t| t.to), Some(EnemyState::Patrolling));
    }

    #[test]
    fn test_death_cancels_attack_and_restart_resets_state() {
        let mut brain = melee_brain();
        let close = input(0.0, Some(1.0), 1.0);
        brain.evaluate(&close);
        brain.act(&close, 0.1);
        brain.on_death();
        assert_eq!(brain.tick_attack(1.0), None);

        brain.on_restart();
        assert_eq!(brain.state(), EnemyState::Patrolling);
        assert!(brain.attack().is_ready());
    }

    #[test]
    fn test_ranged_holds_band_and_shoots() {
        let route = PatrolRoute::around(0.0, 5.0).expect("valid route");
        let mut brain = EnemyBrain::new(
            test_entity(),
            route,
            Box::new(DistanceBandedPolicy::default()),
        );
        assert_eq!(brain.policy_kind(), PolicyKind::DistanceBanded);

        let in_band = input(0.0, Some(4.0), 1.0);
        brain.evaluate(&in_band);
        assert_eq!(brain.state(), EnemyState::Attacking);
        let action = brain.act(&in_band, 0.1);
        assert_eq!(action.velocity_x, 0.0);
        assert!(action.attack_started);
        assert!(matches!(
            brain.tick_attack(0.5),
            Some(StrikeKind::Ranged { damage: 10, .. })
        ));
    }

    #[test]
    fn test_ranged_backs_off_when_crowded() {
        let route = PatrolRoute::around(0.0, 5.0).expect("valid route");
        let mut brain = EnemyBrain::new(
            test_entity(),
            route,
            Box::new(DistanceBandedPolicy::default()),
        );
        let crowded = input(0.0, Some(-1.0), 1.0);
        brain.evaluate(&crowded);
        assert_eq!(brain.state(), EnemyState::Fleeing);
        let action = brain.act(&crowded, 0.1);
        assert_eq!(action.facing, Facing::Right);
        assert_eq!(action.velocity_x, 3.0);
    }

    #[test]
    fn test_invalid_route_rejected() {
        assert!(matches!(
            PatrolRoute::new(3.0, -3.0),
            Err(SkirmishError::InvalidConfiguration { .. })
        ));
    }
}
