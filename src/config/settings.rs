//! Runtime game configuration.
//!
//! `GameConfig` gathers every tunable of a session. It starts from a
//! [`GameMode`] preset and can be overridden by a JSON file.

use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::game::*;
use crate::error::ConfigError;

/// Preset selecting health bounds, blast radius and bomb policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic,
    Survival,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameConfig {
    pub mode: GameMode,
    pub max_health: i32,
    pub blast_radius: usize,
    /// When set, a player cannot plant while one of their bombs is still armed.
    pub one_bomb_per_player: bool,
    pub bomb_fuse_ms: u64,
    pub explosion_ms: u64,
    pub enemy_tick_ms: u64,
    pub broadcast_ms: u64,
    pub blink_ms: u64,
    pub render_refresh_ms: u64,
    pub detection_radius: usize,
    pub contact_cooldown_ms: u64,
    pub pickup_heal: i32,
    pub hit_damage: i32,
    pub enemy_workers: usize,
}

/// What a config file may set. Every field left out keeps the preset value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    mode: Option<GameMode>,
    max_health: Option<i32>,
    blast_radius: Option<usize>,
    one_bomb_per_player: Option<bool>,
    bomb_fuse_ms: Option<u64>,
    explosion_ms: Option<u64>,
    enemy_tick_ms: Option<u64>,
    broadcast_ms: Option<u64>,
    blink_ms: Option<u64>,
    render_refresh_ms: Option<u64>,
    detection_radius: Option<usize>,
    contact_cooldown_ms: Option<u64>,
    pickup_heal: Option<i32>,
    hit_damage: Option<i32>,
    enemy_workers: Option<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_mode(GameMode::Classic)
    }
}

impl GameConfig {
    pub fn for_mode(mode: GameMode) -> Self {
        let (max_health, blast_radius, one_bomb_per_player) = match mode {
            GameMode::Classic => (CLASSIC_MAX_HEALTH, CLASSIC_BLAST_RADIUS, true),
            GameMode::Survival => (SURVIVAL_MAX_HEALTH, SURVIVAL_BLAST_RADIUS, false),
        };
        Self {
            mode,
            max_health,
            blast_radius,
            one_bomb_per_player,
            bomb_fuse_ms: BOMB_FUSE_MS,
            explosion_ms: EXPLOSION_DURATION_MS,
            enemy_tick_ms: ENEMY_TICK_MS,
            broadcast_ms: BROADCAST_INTERVAL_MS,
            blink_ms: PICKUP_BLINK_MS,
            render_refresh_ms: RENDER_REFRESH_MS,
            detection_radius: DETECTION_RADIUS,
            contact_cooldown_ms: CONTACT_COOLDOWN_MS,
            pickup_heal: PICKUP_HEAL,
            hit_damage: HIT_DAMAGE,
            enemy_workers: ENEMY_WORKERS,
        }
    }

    /// Parse JSON overrides on top of a preset. A `mode` in the JSON picks
    /// the preset; otherwise `mode` does.
    pub fn from_json_str(text: &str, mode: GameMode) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(text)?;
        let base = Self::for_mode(file.mode.unwrap_or(mode));
        let config = Self {
            mode: base.mode,
            max_health: file.max_health.unwrap_or(base.max_health),
            blast_radius: file.blast_radius.unwrap_or(base.blast_radius),
            one_bomb_per_player: file.one_bomb_per_player.unwrap_or(base.one_bomb_per_player),
            bomb_fuse_ms: file.bomb_fuse_ms.unwrap_or(base.bomb_fuse_ms),
            explosion_ms: file.explosion_ms.unwrap_or(base.explosion_ms),
            enemy_tick_ms: file.enemy_tick_ms.unwrap_or(base.enemy_tick_ms),
            broadcast_ms: file.broadcast_ms.unwrap_or(base.broadcast_ms),
            blink_ms: file.blink_ms.unwrap_or(base.blink_ms),
            render_refresh_ms: file.render_refresh_ms.unwrap_or(base.render_refresh_ms),
            detection_radius: file.detection_radius.unwrap_or(base.detection_radius),
            contact_cooldown_ms: file.contact_cooldown_ms.unwrap_or(base.contact_cooldown_ms),
            pickup_heal: file.pickup_heal.unwrap_or(base.pickup_heal),
            hit_damage: file.hit_damage.unwrap_or(base.hit_damage),
            enemy_workers: file.enemy_workers.unwrap_or(base.enemy_workers),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load overrides from a JSON file on top of the `mode` preset.
    pub fn from_json_file(path: impl AsRef<Path>, mode: GameMode) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text, mode)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_health <= 0 {
            return Err(ConfigError::Invalid("max_health must be positive".into()));
        }
        let cadences = [
            self.enemy_tick_ms,
            self.broadcast_ms,
            self.blink_ms,
            self.render_refresh_ms,
        ];
        if cadences.contains(&0) {
            return Err(ConfigError::Invalid("task intervals must be non-zero".into()));
        }
        Ok(())
    }

    pub fn bomb_fuse(&self) -> Duration {
        Duration::from_millis(self.bomb_fuse_ms)
    }

    pub fn explosion_duration(&self) -> Duration {
        Duration::from_millis(self.explosion_ms)
    }

    pub fn enemy_tick(&self) -> Duration {
        Duration::from_millis(self.enemy_tick_ms)
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_ms)
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_ms)
    }

    pub fn render_refresh(&self) -> Duration {
        Duration::from_millis(self.render_refresh_ms)
    }

    pub fn contact_cooldown(&self) -> Duration {
        Duration::from_millis(self.contact_cooldown_ms)
    }
}
