//! Enemy decision logic: pursue a nearby player sample, wander otherwise.

use rand::Rng;

use crate::error::MoveError;
use crate::game::entities::EntityId;
use crate::game::state::WorldState;
use crate::game::types::{Direction, Position};

/// Where an enemy task is in its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyPhase {
    Idle,
    SampleReceived,
    Pursuing,
    Wandering,
    Acted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Pursue(Position),
    Wander,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyAction {
    Pursued { target: Position, moved: bool },
    Wandered { direction: Direction, moved: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyTick {
    pub action: EnemyAction,
    pub pos: Position,
    /// The enemy ends the tick on the player's cell.
    pub contact: bool,
}

pub fn choose_behavior(pos: Position, sample: Option<Position>, radius: usize) -> Behavior {
    match sample {
        Some(target) if pos.manhattan(target) <= radius => Behavior::Pursue(target),
        _ => Behavior::Wander,
    }
}

/// One unit step per axis toward `target`. Zero on an axis already aligned.
pub fn pursuit_steps(from: Position, target: Position) -> (isize, isize) {
    let dx = (target.x as isize - from.x as isize).signum();
    let dy = (target.y as isize - from.y as isize).signum();
    (dx, dy)
}

impl WorldState {
    /// Run one behavior tick for enemy `id`. `Err(Stale)` once it is gone.
    pub fn enemy_tick<R: Rng>(
        &mut self,
        id: EntityId,
        sample: Option<Position>,
        radius: usize,
        rng: &mut R,
    ) -> Result<EnemyTick, MoveError> {
        let start = self.position_of(id).ok_or(MoveError::Stale)?;

        let (action, log) = match choose_behavior(start, sample, radius) {
            Behavior::Pursue(target) => {
                let (dx, dy) = pursuit_steps(start, target);
                // Axes move independently; either step may be refused.
                let moved_x = dx != 0 && self.step(id, dx, 0)?;
                let moved_y = dy != 0 && self.step(id, 0, dy)?;
                let moved = moved_x || moved_y;
                let log = if moved {
                    format!("chasing the player toward {target}")
                } else {
                    format!("stuck while chasing toward {target}")
                };
                (EnemyAction::Pursued { target, moved }, log)
            }
            Behavior::Wander => {
                let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
                let (dx, dy) = direction.delta();
                let moved = self.step(id, dx, dy)?;
                let log = if moved {
                    format!("wandering {}", direction.name())
                } else {
                    format!("bumped into something going {}", direction.name())
                };
                (EnemyAction::Wandered { direction, moved }, log)
            }
        };

        let pos = self.position_of(id).ok_or(MoveError::Stale)?;
        let contact = self.player_position() == Some(pos);
        let log = if contact { "attacking the player".to_string() } else { log };
        self.set_log(id, format!("{log} at {pos}"));

        Ok(EnemyTick { action, pos, contact })
    }

    /// Try one move. Refusals are ordinary (`Ok(false)`); only a vanished
    /// entity is an error.
    fn step(&mut self, id: EntityId, dx: isize, dy: isize) -> Result<bool, MoveError> {
        match self.move_entity(id, dx, dy) {
            Ok(_) => Ok(true),
            Err(MoveError::Stale) => Err(MoveError::Stale),
            Err(_) => Ok(false),
        }
    }
}
