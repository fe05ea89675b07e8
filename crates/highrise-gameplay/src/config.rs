//! Gameplay configuration.
//!
//! Tunables for pools, the player, floor flow and melee, loaded from
//! `highrise.toml`. Missing or broken files fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use highrise_common::Millis;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::combat::{MELEE_DAMAGE, MELEE_RADIUS, MELEE_REACH};
use crate::player::PlayerConfig;
use crate::projectile::{ENEMY_POOL_SIZE, PLAYER_POOL_SIZE};

/// Configuration file name.
pub const CONFIG_FILE: &str = "highrise.toml";

/// Errors from loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the file
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Gameplay configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    // === Pools ===
    /// Player projectile slots
    pub player_pool_size: usize,
    /// Enemy projectile slots
    pub enemy_pool_size: usize,

    // === Player ===
    /// Player movement speed
    pub player_speed: f32,
    /// Lives at the start of a run
    pub starting_lives: u32,
    /// Invincibility after a hit
    pub invincibility_ms: Millis,
    /// Projectile spawn distance ahead of the player
    pub muzzle_offset: f32,

    // === Floor Flow ===
    /// Delay before respawning after a death
    pub respawn_delay_ms: Millis,
    /// Delay before announcing game over
    pub game_over_delay_ms: Millis,
    /// Distance at which the elevator can be used
    pub elevator_radius: f32,
    /// Projectiles are culled this far outside the grid
    pub bounds_margin: f32,
    /// Event bus capacity
    pub event_capacity: usize,

    // === Melee ===
    /// Distance from the player to the swing centre
    pub melee_reach: f32,
    /// Hit zone radius
    pub melee_radius: f32,
    /// Damage per swing
    pub melee_damage: i32,

    // === Simulation ===
    /// Seed for NPC randomness
    pub rng_seed: u64,
    /// Fixed simulation step
    pub tick_ms: Millis,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        let player = PlayerConfig::default();
        Self {
            // Pools
            player_pool_size: PLAYER_POOL_SIZE,
            enemy_pool_size: ENEMY_POOL_SIZE,

            // Player
            player_speed: player.speed,
            starting_lives: player.starting_lives,
            invincibility_ms: player.invincibility_ms,
            muzzle_offset: player.muzzle_offset,

            // Floor flow
            respawn_delay_ms: 1200.0,
            game_over_delay_ms: 800.0,
            elevator_radius: 80.0,
            bounds_margin: 0.0,
            event_capacity: 1024,

            // Melee
            melee_reach: MELEE_REACH,
            melee_radius: MELEE_RADIUS,
            melee_damage: MELEE_DAMAGE,

            // Simulation
            rng_seed: 0x4849_5345,
            tick_ms: 1000.0 / 60.0,
        }
    }
}

impl GameplayConfig {
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

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            },
        }
    }

    /// Load configuration, reporting any failure.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config.sanitized())
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Replaces unusable values with defaults, logging each fix.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.player_pool_size == 0 {
            warn!("player_pool_size must be positive, using {}", defaults.player_pool_size);
            self.player_pool_size = defaults.player_pool_size;
        }
        if self.enemy_pool_size == 0 {
            warn!("enemy_pool_size must be positive, using {}", defaults.enemy_pool_size);
            self.enemy_pool_size = defaults.enemy_pool_size;
        }
        if self.event_capacity == 0 {
            warn!("event_capacity must be positive, using {}", defaults.event_capacity);
            self.event_capacity = defaults.event_capacity;
        }
        if self.tick_ms.is_nan() || self.tick_ms <= 0.0 {
            warn!("tick_ms must be positive, using {:.3}", defaults.tick_ms);
            self.tick_ms = defaults.tick_ms;
        }
        if self.bounds_margin < 0.0 {
            warn!("bounds_margin cannot be negative, using 0");
            self.bounds_margin = 0.0;
        }
        self
    }

    /// Player settings derived from this configuration.
    #[must_use]
    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            speed: self.player_speed,
            starting_lives: self.starting_lives,
            invincibility_ms: self.invincibility_ms,
            muzzle_offset: self.muzzle_offset,
            ..PlayerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_game_constants() {
        let config = GameplayConfig::default();
        assert_eq!(config.player_pool_size, 60);
        assert_eq!(config.enemy_pool_size, 80);
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.melee_damage, 30);
        assert!((config.elevator_radius - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameplayConfig::load_from(dir.path().join("highrise.toml"));
        assert_eq!(config, GameplayConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = GameplayConfig {
            starting_lives: 5,
            rng_seed: 99,
            ..GameplayConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = GameplayConfig::try_load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "starting_lives = 1\nenemy_pool_size = 0\n").unwrap();

        let config = GameplayConfig::load_from(&path);
        assert_eq!(config.starting_lives, 1);
        assert_eq!(config.enemy_pool_size, 80);
        assert_eq!(config.player_pool_size, 60);
    }

    #[test]
    fn test_garbage_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "starting_lives = \"many\"").unwrap();

        assert!(matches!(
            GameplayConfig::try_load_from(&path),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(GameplayConfig::load_from(&path), GameplayConfig::default());
    }

    #[test]
    fn test_player_config_projection() {
        let config = GameplayConfig {
            invincibility_ms: 1000.0,
            ..GameplayConfig::default()
        };
        let player = config.player_config();
        assert!((player.invincibility_ms - 1000.0).abs() < f64::EPSILON);
        assert_eq!(player.max_health, 100);
    }
}
