/// Game configuration constants.
///
/// This module defines the default gameplay parameters such as the bomb fuse,
/// the task cadences, and the per-mode health and blast bounds.
/// All durations are in milliseconds.
pub const BOMB_FUSE_MS: u64 = 3000; // Delay between planting and detonation.

/// How long an explosion record stays on the grid.
pub const EXPLOSION_DURATION_MS: u64 = 500;

/// Cadence of every enemy behavior task.
pub const ENEMY_TICK_MS: u64 = 500;

/// Interval at which the player position is republished to the enemy mailboxes.
pub const BROADCAST_INTERVAL_MS: u64 = 250;

/// Interval between two pickup color toggles.
pub const PICKUP_BLINK_MS: u64 = 400;

/// Periodic screen refresh, on top of the change-driven redraws.
pub const RENDER_REFRESH_MS: u64 = 100;

/// Manhattan distance under which an enemy starts chasing the player.
pub const DETECTION_RADIUS: usize = 10;

/// Minimum delay between two contact damages.
pub const CONTACT_COOLDOWN_MS: u64 = 2000;

/// Health restored by a consumed pickup.
pub const PICKUP_HEAL: i32 = 1;

/// Damage dealt by an enemy contact or a blast.
pub const HIT_DAMAGE: i32 = 1;

/// Maximum health and blast radius in classic mode.
pub const CLASSIC_MAX_HEALTH: i32 = 3;
pub const CLASSIC_BLAST_RADIUS: usize = 2;

/// Maximum health and blast radius in survival mode.
pub const SURVIVAL_MAX_HEALTH: i32 = 5;
pub const SURVIVAL_BLAST_RADIUS: usize = 5;

/// Number of worker threads hosting the enemy behavior tasks.
pub const ENEMY_WORKERS: usize = 2;

/// Map loaded when no path is given on the command line.
pub const DEFAULT_MAP_PATH: &str = "mapa.txt";
