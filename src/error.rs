//! Error types shared across the crate.
//!
//! Startup failures (map, config) are fatal and bubble up to `main`.
//! Gameplay rejections (`MoveError`, `PlantError`) are ordinary values that the
//! session turns into a status line.

use thiserror::Error;

use crate::game::types::Position;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("cannot read map file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("map is empty")]
    Empty,
    #[error("map has no player spawn")]
    NoPlayer,
    #[error("map has more than one player spawn (second at {0})")]
    MultiplePlayers(Position),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Why a move was refused. None of these are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("entity no longer exists")]
    Stale,
    #[error("target is outside the map")]
    OutOfBounds,
    #[error("target cell is blocked")]
    Blocked,
    #[error("target cell is held by another enemy")]
    Occupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlantError {
    #[error("planter no longer exists")]
    Stale,
    #[error("a bomb is already armed on {0}")]
    CellTaken(Position),
    #[error("a bomb is already ticking")]
    BombOutstanding,
    #[error("the game is over")]
    GameOver,
}

/// Top-level startup error returned by `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("terminal setup failed: {0}")]
    Terminal(#[from] std::io::Error),
}
