//! Entity movement system.
//!
//! A move leaves a moving "hole" in the terrain: the mover puts back what
//! it remembered under itself, remembers the terrain of the target, and
//! paints its sprite on the target. Run under the mutation gate.

use log::debug;

use crate::error::MoveError;
use crate::game::entities::EntityId;
use crate::game::state::WorldState;
use crate::game::types::{Position, Role, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub id: EntityId,
    pub role: Role,
    pub from: Position,
    pub to: Position,
    /// The player stepped on a pickup and consumed it.
    pub picked_up: bool,
}

impl WorldState {
    pub fn move_entity(&mut self, id: EntityId, dx: isize, dy: isize) -> Result<MoveReport, MoveError> {
        let (role, from, memo) = {
            let entity = self.registry.get(id).ok_or(MoveError::Stale)?;
            (entity.role, entity.pos, entity.memo)
        };
        if dx == 0 && dy == 0 {
            return Ok(MoveReport { id, role, from, to: from, picked_up: false });
        }

        let to = from
            .offset(dx, dy)
            .filter(|pos| self.grid.in_bounds(*pos))
            .ok_or(MoveError::OutOfBounds)?;
        let terrain = self.terrain_at(to).ok_or(MoveError::OutOfBounds)?;
        if terrain.is_blocking() {
            return Err(MoveError::Blocked);
        }
        if role == Role::Enemy && self.registry.at(to, Some(id)).any(|e| e.role == Role::Enemy) {
            return Err(MoveError::Occupied);
        }

        // Whoever still stands on the source cell keeps it painted.
        let left_behind = self
            .registry
            .at(from, Some(id))
            .next()
            .map_or(memo, |e| e.role.sprite());
        self.grid.set(from, left_behind);

        let picked_up = role == Role::Player && terrain == Tile::Pickup;
        let new_memo = if picked_up {
            self.consume_pickup(to);
            Tile::Empty
        } else {
            terrain
        };

        if let Some(entity) = self.registry.get_mut(id) {
            entity.memo = new_memo;
            entity.pos = to;
        }
        self.grid.set(to, role.sprite());

        debug!("[Movement] {:?} {} moved {} -> {}", role, id, from, to);
        Ok(MoveReport { id, role, from, to, picked_up })
    }

    /// Turn the pickup at `pos` into empty ground, including the memo of
    /// anyone already standing on it.
    fn consume_pickup(&mut self, pos: Position) {
        let standing: Vec<EntityId> = self.registry.at(pos, None).map(|e| e.id).collect();
        for id in standing {
            if let Some(entity) = self.registry.get_mut(id) {
                entity.memo = Tile::Empty;
            }
        }
        self.pickups_left = self.pickups_left.saturating_sub(1);
    }
}
