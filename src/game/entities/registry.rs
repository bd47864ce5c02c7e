//! Entity registry with generational identifiers.
//!
//! Entities live in slots. Removing one bumps the slot generation, so an
//! `EntityId` held by a task after the removal simply stops resolving instead
//! of pointing at whatever entity reuses the slot later.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::types::{Position, Role, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub role: Role,
    pub pos: Position,
    /// Terrain under the entity, put back when it leaves the cell.
    pub memo: Tile,
    /// Last action, shown in the status panel. Only enemies write it.
    pub log: String,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Live ids in insertion order. The player is inserted first.
    order: Vec<EntityId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: Role, pos: Position, memo: Tile) -> EntityId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = EntityId { index, generation: slot.generation };
        slot.entity = Some(Entity { id, role, pos, memo, log: String::new() });
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.order.retain(|live| *live != id);
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.get(*id))
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Entity> {
        self.iter().filter(|e| e.role == Role::Enemy)
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies().count()
    }

    /// Every entity standing on `pos`, optionally skipping one of them.
    pub fn at(&self, pos: Position, except: Option<EntityId>) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |e| e.pos == pos && Some(e.id) != except)
    }
}
