//! Game tuning loaded from TOML.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! The defaults reproduce the classic browser game: a 360x640 board, a
//! 34x24 bird, 64x512 pipes and 60 frames per second.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "FLAPPY_ARCADE_CONFIG";

const APP_DIR: &str = "flappy-arcade";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed RNG seed for obstacle gaps. Random when unset.
    pub seed: Option<u64>,
    /// Where log output goes; the terminal is owned by the game.
    pub log_file: Option<PathBuf>,
    pub playfield: PlayfieldConfig,
    pub actor: ActorConfig,
    pub obstacles: ObstacleConfig,
    pub physics: PhysicsConfig,
    pub difficulty: DifficultyConfig,
    pub timing: TimingConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 640.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            width: 34.0,
            height: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 512.0,
        }
    }
}

/// Per-frame physics constants. Velocities are in playfield units per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f64,
    /// Vertical velocity set by a flap. Negative is up.
    pub flap_velocity: f64,
    /// Starting horizontal obstacle velocity. Negative is leftward.
    pub initial_velocity_x: f64,
    pub score_per_obstacle: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.4,
            flap_velocity: -6.0,
            initial_velocity_x: -2.0,
            score_per_obstacle: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Number of game overs between speed increases.
    pub threshold: u32,
    /// Added to the obstacle speed magnitude on each increase.
    pub increment: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            threshold: 3,
            increment: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub frames_per_second: u32,
    pub spawn_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 60,
            spawn_interval_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub music_volume: f32,
    pub effects_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            music_volume: 0.2,
            effects_volume: 0.3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            log_file: None,
            playfield: PlayfieldConfig::default(),
            actor: ActorConfig::default(),
            obstacles: ObstacleConfig::default(),
            physics: PhysicsConfig::default(),
            difficulty: DifficultyConfig::default(),
            timing: TimingConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl Config {
    /// Load from [`Config::source_path`], falling back to defaults when
    /// there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::source_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `$FLAPPY_ARCADE_CONFIG` if set, else the user config directory.
    pub fn source_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `~/.config/flappy-arcade/config.toml` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Configured log file, or one under the user cache directory.
    pub fn log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }
        dirs::cache_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(std::env::temp_dir)
            .join("flappy-arcade.log")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("playfield.width", self.playfield.width),
            ("playfield.height", self.playfield.height),
            ("actor.width", self.actor.width),
            ("actor.height", self.actor.height),
            ("obstacles.width", self.obstacles.width),
            ("obstacles.height", self.obstacles.height),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.physics.flap_velocity >= 0.0 {
            return Err(ConfigError::Invalid(
                "physics.flap_velocity must be negative (upward)".into(),
            ));
        }
        if self.physics.initial_velocity_x >= 0.0 {
            return Err(ConfigError::Invalid(
                "physics.initial_velocity_x must be negative (leftward)".into(),
            ));
        }
        if self.physics.score_per_obstacle < 0.0 {
            return Err(ConfigError::Invalid(
                "physics.score_per_obstacle must not be negative".into(),
            ));
        }
        if self.difficulty.threshold == 0 {
            return Err(ConfigError::Invalid(
                "difficulty.threshold must be at least 1".into(),
            ));
        }
        if self.timing.frames_per_second == 0 || self.timing.spawn_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "timing values must be non-zero".into(),
            ));
        }
        for (name, volume) in [
            ("audio.music_volume", self.audio.music_volume),
            ("audio.effects_volume", self.audio.effects_volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within 0.0..=1.0, got {volume}"
                )));
            }
        }
        Ok(())
    }

    /// Where the actor starts and respawns.
    pub fn actor_start(&self) -> (f64, f64) {
        (self.playfield.width / 8.0, self.playfield.height / 2.0)
    }

    /// Vertical opening between an upper and lower obstacle.
    pub fn opening_height(&self) -> f64 {
        self.playfield.height / 4.0
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.timing.frames_per_second as f64)
    }

    pub fn spawn_period(&self) -> Duration {
        Duration::from_millis(self.timing.spawn_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_classic_board() {
        let config = Config::default();
        assert_eq!(config.actor_start(), (45.0, 320.0));
        assert_eq!(config.opening_height(), 160.0);
        assert_eq!(config.spawn_period(), Duration::from_millis(1500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 7\n\n[physics]\ngravity = 0.5").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.physics.gravity, 0.5);
        assert_eq!(config.physics.flap_velocity, -6.0);
        assert_eq!(config.playfield, PlayfieldConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[difficulty]\nthreshold = 0").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[physics\ngravity = ").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn upward_obstacle_speed_is_invalid() {
        let mut config = Config::default();
        config.physics.initial_velocity_x = 1.0;
        assert!(config.validate().is_err());
    }
}
