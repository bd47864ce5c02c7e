//! Bomb and explosion records.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::entities::EntityId;
use crate::game::grid::Grid;
use crate::game::types::{Position, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BombId(pub Uuid);

impl BombId {
    pub fn new() -> Self {
        BombId(Uuid::new_v4())
    }
}

#[derive(Debug, Clone)]
pub struct Bomb {
    pub id: BombId,
    pub owner: EntityId,
    pub pos: Position,
    pub planted_at: Instant,
    pub armed: bool,
}

impl Bomb {
    pub fn new(owner: EntityId, pos: Position, planted_at: Instant) -> Self {
        Self { id: BombId::new(), owner, pos, planted_at, armed: true }
    }

    /// Time left before the fuse runs out, zero once due.
    pub fn remaining(&self, fuse: Duration, now: Instant) -> Duration {
        fuse.saturating_sub(now.saturating_duration_since(self.planted_at))
    }
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub pos: Position,
    pub created_at: Instant,
    pub armed: bool,
}

impl Explosion {
    pub fn is_expired(&self, lifetime: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= lifetime
    }
}

/// Cells hit by a blast centered on `center`.
///
/// Every in-bounds cell within Manhattan distance `radius` is hit unless it
/// is a wall. Walls only protect themselves: cells behind them are still hit.
/// `terrain` resolves what lies under a sprite.
pub fn blast_cells(
    grid: &Grid,
    center: Position,
    radius: usize,
    terrain: impl Fn(Position) -> Option<Tile>,
) -> Vec<Position> {
    let r = radius as isize;
    let mut cells = Vec::new();
    for dy in -r..=r {
        let span = r - dy.abs();
        for dx in -span..=span {
            let Some(pos) = center.offset(dx, dy) else { continue };
            if !grid.in_bounds(pos) {
                continue;
            }
            if terrain(pos).is_some_and(|tile| tile != Tile::Wall) {
                cells.push(pos);
            }
        }
    }
    cells
}
