//! # Skirmish Engine
//!
//! Headless runner for the Skirmish combat core.
//!
//! This crate ties together:
//! - Config: runner settings and combat tuning from `skirmish.toml`
//! - Scenario: a demo level and a scripted player
//! - Combat events: run statistics and camera shake from hit feedback

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod combat_events;
mod config;
mod scenario;

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skirmish_gameplay::{GameEvent, Simulation};

use crate::combat_events::{CameraShake, CombatStats};
use crate::config::{EngineConfig, LogFormat};
use crate::scenario::{build_demo_level, ScriptedPlayer};

/// Main entry point.
fn main() -> Result<()> {
    let mut config = EngineConfig::load();
    config.validate();

    init_tracing(config.log_format)?;

    info!("Skirmish starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    run(&config)?;

    info!("Skirmish shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("skirmish=info".parse()?);
    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
    }
    Ok(())
}

/// Run the demo level for the configured number of ticks.
fn run(config: &EngineConfig) -> Result<()> {
    let mut sim = Simulation::new(config.tuning.clone())?;
    build_demo_level(&mut sim)?;

    let dt = config.tick_dt();
    let mut script = ScriptedPlayer::new(config.script.clone());
    let mut shake = CameraShake::new(config.camera_shake_intensity, config.camera_shake_duration);
    let mut stats = CombatStats::new();
    let player = sim.player_id();

    info!(
        "Running {} ticks at {} Hz",
        config.total_ticks(),
        config.tick_rate
    );

    for _ in 0..config.total_ticks() {
        let input = script.next_input(&sim, dt);
        let report = sim.tick(dt, &input);

        shake.tick(dt);
        if report.feedback {
            shake.trigger();
        }
        if report.restarted {
            script.on_restart();
        }

        for event in sim.drain_events() {
            stats.record(&event, player);
            if config.log_events && !event.is_presentation() {
                info!(tick = report.tick, "{event:?}");
            } else if matches!(event, GameEvent::LevelRestarted) {
                info!(tick = report.tick, "Level restarted");
            }
        }
    }

    debug!("Camera shook {} times", shake.triggered());
    stats.log_summary();
    info!("Simulated {:.1}s in {} ticks", sim.elapsed(), sim.tick_count());
    Ok(())
}
