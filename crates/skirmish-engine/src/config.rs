//! Runner configuration.
//!
//! Provides the tick rate, run length, logging and scripted-player settings
//! for the headless runner, plus the combat tuning it hands to the
//! simulation. Configuration can be loaded from and saved to a file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use skirmish_gameplay::CombatTuning;

/// Configuration file name.
const CONFIG_FILE: &str = "skirmish.toml";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// How the scripted player behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Horizontal input held for the whole run (-1.0 - 1.0)
    pub walk_direction: f32,
    /// Seconds of walking before the player stops and fights
    pub walk_seconds: f32,
    /// Press attack whenever the controller accepts it
    pub auto_attack: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            walk_direction: 1.0,
            walk_seconds: 1.0,
            auto_attack: true,
        }
    }
}

/// Runner configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Timing ===
    /// Fixed ticks per simulated second
    pub tick_rate: u32,
    /// Simulated seconds to run before exiting
    pub run_seconds: f32,

    // === Logging ===
    /// Log output format
    pub log_format: LogFormat,
    /// Log every gameplay event (otherwise only the summary)
    pub log_events: bool,

    // === Feedback ===
    /// Camera shake strength on a landed melee hit
    pub camera_shake_intensity: f32,
    /// Camera shake length in seconds
    pub camera_shake_duration: f32,

    // === Scripted player ===
    /// Scripted input
    pub script: ScriptConfig,

    // === Combat ===
    /// Combat tuning passed to the simulation
    pub tuning: CombatTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            run_seconds: 20.0,

            log_format: LogFormat::Pretty,
            log_events: false,

            camera_shake_intensity: 1.5,
            camera_shake_duration: 0.1,

            script: ScriptConfig::default(),
            tuning: CombatTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Config path: `SKIRMISH_CONFIG` if set, otherwise the working directory.
    fn config_path() -> PathBuf {
        std::env::var("SKIRMISH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE))
    }

    /// Clamp runner values to sensible ranges.
    ///
    /// Combat tuning is not clamped here; the simulation rejects bad tuning
    /// outright.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(10, 240);
        self.run_seconds = self.run_seconds.clamp(0.0, 3600.0);

        self.camera_shake_intensity = self.camera_shake_intensity.clamp(0.0, 10.0);
        self.camera_shake_duration = self.camera_shake_duration.clamp(0.0, 1.0);

        self.script.walk_direction = self.script.walk_direction.clamp(-1.0, 1.0);
        self.script.walk_seconds = self.script.walk_seconds.max(0.0);
    }

    /// Seconds per tick.
    #[must_use]
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Number of ticks the run lasts.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        (self.run_seconds * self.tick_rate as f32).ceil() as u64
    }
}
