/// Main configuration module.
///
/// Re-exports the default constants and the runtime `GameConfig`.
pub mod game;
pub mod settings;

pub use settings::{GameConfig, GameMode};
