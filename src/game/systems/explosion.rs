//! Bomb planting, detonation and explosion cleanup.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::PlantError;
use crate::game::entities::{Bomb, BombId, Entity, EntityId, Explosion, blast_cells};
use crate::game::state::WorldState;
use crate::game::types::{Position, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlastReport {
    pub bomb: BombId,
    pub owner: EntityId,
    pub center: Position,
    pub cells: Vec<Position>,
    pub killed: Vec<EntityId>,
    pub player_hit: bool,
}

/// Result of asking a bomb to go off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fuse {
    Blasted(BlastReport),
    /// Not due yet; try again after this long.
    Pending(Duration),
    /// Already detonated or never existed.
    Gone,
}

impl WorldState {
    pub fn plant_bomb(
        &mut self,
        owner: EntityId,
        now: Instant,
        one_per_owner: bool,
    ) -> Result<Bomb, PlantError> {
        let pos = self.registry.get(owner).ok_or(PlantError::Stale)?.pos;
        if self.bombs.iter().any(|b| b.armed && b.pos == pos) {
            self.set_status("A bomb is already here");
            return Err(PlantError::CellTaken(pos));
        }
        if one_per_owner && self.bombs.iter().any(|b| b.armed && b.owner == owner) {
            self.set_status("Wait for your bomb to go off");
            return Err(PlantError::BombOutstanding);
        }
        let bomb = Bomb::new(owner, pos, now);
        self.bombs.push(bomb.clone());
        Ok(bomb)
    }

    pub fn detonate(&mut self, bomb: BombId, now: Instant, fuse: Duration, radius: usize) -> Fuse {
        let Some(index) = self.bombs.iter().position(|b| b.id == bomb && b.armed) else {
            return Fuse::Gone;
        };
        let remaining = self.bombs[index].remaining(fuse, now);
        if !remaining.is_zero() {
            return Fuse::Pending(remaining);
        }
        Fuse::Blasted(self.blast(index, now, radius))
    }

    pub fn sweep_explosions(&mut self, now: Instant, lifetime: Duration) -> usize {
        let before = self.explosions.len();
        self.explosions.retain(|e| !e.is_expired(lifetime, now));
        before - self.explosions.len()
    }

    fn blast(&mut self, index: usize, now: Instant, radius: usize) -> BlastReport {
        let mut bomb = self.bombs.remove(index);
        bomb.armed = false;

        let cells = blast_cells(&self.grid, bomb.pos, radius, |pos| self.terrain_at(pos));
        for &pos in &cells {
            match self.explosions.iter_mut().find(|e| e.pos == pos) {
                Some(explosion) => {
                    explosion.created_at = now;
                    explosion.armed = true;
                }
                None => self.explosions.push(Explosion { pos, created_at: now, armed: true }),
            }
        }

        let victims: Vec<EntityId> = self
            .registry
            .enemies()
            .filter(|e| cells.contains(&e.pos))
            .map(|e| e.id)
            .collect();
        // Last registered first, so earlier entries keep their place while we go.
        let mut killed = Vec::with_capacity(victims.len());
        for id in victims.into_iter().rev() {
            if self.remove_entity(id).is_some() {
                killed.push(id);
            }
        }

        let player_hit = self.player_position().is_some_and(|pos| cells.contains(&pos));
        self.set_status("The bomb exploded!");
        info!(
            "[Explosion] Bomb at {} hit {} cells, {} enemies destroyed, player hit: {}",
            bomb.pos,
            cells.len(),
            killed.len(),
            player_hit
        );

        BlastReport { bomb: bomb.id, owner: bomb.owner, center: bomb.pos, cells, killed, player_hit }
    }

    /// Drop an entity from the registry and repaint the cell it stood on.
    pub(crate) fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.registry.remove(id)?;
        let repaint = self
            .registry
            .at(entity.pos, None)
            .next()
            .map_or(entity.memo, |e| e.role.sprite());
        self.grid.set(entity.pos, repaint);
        if entity.role == Role::Enemy {
            debug!("[Explosion] Enemy {} removed at {}", entity.id, entity.pos);
        }
        Some(entity)
    }
}
