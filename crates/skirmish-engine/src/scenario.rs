//! Demo level and scripted player.

use anyhow::Result;
use tracing::info;

use skirmish_common::{CheckpointId, Vec2};
use skirmish_gameplay::{Aabb, Checkpoint, DeathZone, PatrolRoute, PlayerInput, Simulation};

use crate::config::ScriptConfig;

/// Build the demo level: a checkpoint, a melee guard, a ranged guard further
/// out, a crate between them and a pit at the far end.
pub fn build_demo_level(sim: &mut Simulation) -> Result<()> {
    sim.spawn_player(Vec2::new(0.0, 0.0))?;

    sim.add_checkpoint(Checkpoint::new(CheckpointId::new(1), Vec2::new(2.0, 0.0), 0.5));
    sim.spawn_melee_enemy(Vec2::new(8.0, 0.0), PatrolRoute::around(8.0, 3.0)?)?;
    sim.add_obstacle(Aabb::from_center(Vec2::new(13.0, 0.0), 0.5, 0.5));
    sim.spawn_ranged_enemy(Vec2::new(18.0, 0.0), PatrolRoute::around(18.0, 2.0)?)?;
    sim.add_death_zone(DeathZone::pit(Aabb::new(
        Vec2::new(24.0, -2.0),
        Vec2::new(27.0, 2.0),
    )));

    info!(
        "Demo level ready: {} actors, {} obstacles",
        sim.world().len(),
        sim.world().obstacles().len()
    );
    Ok(())
}

/// Produces player input from a script.
#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    script: ScriptConfig,
    walked: f32,
}

impl ScriptedPlayer {
    /// Create a driver for `script`.
    #[must_use]
    pub fn new(script: ScriptConfig) -> Self {
        Self {
            script,
            walked: 0.0,
        }
    }

    /// Input for the next tick: walk for the configured time, then hold
    /// position and swing while anything is close.
    pub fn next_input(&mut self, sim: &Simulation, dt: f32) -> PlayerInput {
        let walking = self.walked < self.script.walk_seconds;
        self.walked += dt;

        let threatened = self.script.auto_attack && enemy_within(sim, 2.0);
        PlayerInput {
            move_x: if walking && !threatened {
                self.script.walk_direction
            } else {
                0.0
            },
            attack: threatened,
        }
    }

    /// Level restart: walk again from the respawn point.
    pub fn on_restart(&mut self) {
        self.walked = 0.0;
    }
}

fn enemy_within(sim: &Simulation, range: f32) -> bool {
    let Some(player) = sim.player_id().and_then(|id| sim.actor(id)) else {
        return false;
    };
    sim.enemies()
        .filter_map(|id| sim.actor(id))
        .any(|enemy| enemy.is_alive() && player.distance_to(enemy) <= range)
}
