//! Shared world context.
//!
//! `WorldState` is the plain data: grid, entity registry, bombs, explosions.
//! `World` wraps it in the mutation gate (a mutex) and adds the few values
//! that are read without the gate: the player position, health, the blink
//! phase and the outcome latch.
//!
//! Every structural write (move, removal, bomb and explosion edits) goes
//! through the gate. `World` methods take and release the gate themselves, so
//! callers never hold it across another call into `World`.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Instant;

use log::{debug, info};
use rand::Rng;

use crate::config::GameConfig;
use crate::error::{MoveError, PlantError};
use crate::game::entities::{Bomb, BombId, EntityId, Explosion, Registry};
use crate::game::grid::{Grid, MapData};
use crate::game::systems::{
    BombView, EnemyTick, EntityView, Fuse, MoveReport, Snapshot, evaluate,
};
use crate::game::types::{Direction, Outcome, Position, Role, Tile};

#[derive(Debug, Clone)]
pub struct WorldState {
    pub(crate) grid: Grid,
    pub(crate) registry: Registry,
    pub(crate) bombs: Vec<Bomb>,
    pub(crate) explosions: Vec<Explosion>,
    pub(crate) player: EntityId,
    pub(crate) pickups_left: usize,
    pub(crate) status: String,
    /// Direction of the last move the player asked for, even a refused one.
    pub(crate) facing: Direction,
    /// Blast damage dealt to the player that the health keeper has not applied yet.
    pub(crate) pending_blast: i32,
}

impl WorldState {
    pub fn from_map(map: MapData) -> Self {
        let mut registry = Registry::new();
        // Spawn cells are empty underneath; the grid already shows the sprites.
        let player = registry.insert(Role::Player, map.player, Tile::Empty);
        for pos in map.enemies {
            registry.insert(Role::Enemy, pos, Tile::Empty);
        }
        let pickups_left = map.grid.count(Tile::Pickup);
        WorldState {
            grid: map.grid,
            registry,
            bombs: Vec::new(),
            explosions: Vec::new(),
            player,
            pickups_left,
            status: String::new(),
            facing: Direction::Right,
            pending_blast: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn player_id(&self) -> EntityId {
        self.player
    }

    pub fn player_position(&self) -> Option<Position> {
        self.registry.get(self.player).map(|p| p.pos)
    }

    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        self.registry.get(id).map(|e| e.pos)
    }

    pub fn enemy_ids(&self) -> Vec<EntityId> {
        self.registry.enemies().map(|e| e.id).collect()
    }

    pub fn enemy_count(&self) -> usize {
        self.registry.enemy_count()
    }

    /// Enemy log lines, aligned with the enemy sublist of the registry.
    pub fn enemy_logs(&self) -> Vec<String> {
        self.registry.enemies().map(|e| e.log.clone()).collect()
    }

    pub fn pickups_left(&self) -> usize {
        self.pickups_left
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Terrain at `pos`, looking under any entity standing there.
    pub fn terrain_at(&self, pos: Position) -> Option<Tile> {
        let tile = self.grid.get(pos)?;
        if !tile.is_sprite() {
            return Some(tile);
        }
        Some(self.registry.at(pos, None).next().map_or(Tile::Empty, |e| e.memo))
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// The cell in front of the player, when it is open ground with no enemy on it.
    pub fn facing_cell(&self) -> Option<Position> {
        let (dx, dy) = self.facing.delta();
        let cell = self.player_position()?.offset(dx, dy)?;
        let open = self.terrain_at(cell).is_some_and(|tile| !tile.is_blocking());
        let enemy_there = self.registry.at(cell, None).any(|e| e.role == Role::Enemy);
        (open && !enemy_there).then_some(cell)
    }

    pub(crate) fn set_log(&mut self, id: EntityId, log: String) {
        if let Some(entity) = self.registry.get_mut(id) {
            entity.log = log;
        }
    }
}

pub struct World {
    gate: Mutex<WorldState>,
    config: GameConfig,
    player: EntityId,
    player_cell: AtomicU64,
    health: AtomicI32,
    outcome: OnceLock<Outcome>,
    pickup_phase: AtomicBool,
}

impl World {
    pub fn new(map: MapData, config: GameConfig) -> Self {
        let state = WorldState::from_map(map);
        let player = state.player_id();
        let player_cell = state.player_position().map_or(0, Position::pack);
        info!(
            "[World] Ready: {}x{} grid, {} enemies, {} pickups, mode {:?}",
            state.grid.width(),
            state.grid.height(),
            state.enemy_count(),
            state.pickups_left,
            config.mode
        );
        World {
            gate: Mutex::new(state),
            health: AtomicI32::new(config.max_health),
            config,
            player,
            player_cell: AtomicU64::new(player_cell),
            outcome: OnceLock::new(),
            pickup_phase: AtomicBool::new(false),
        }
    }

    /// Enter the mutation gate.
    pub fn gate(&self) -> MutexGuard<'_, WorldState> {
        // A panic inside the gate leaves the state consistent enough to keep
        // rendering; there is nothing better to do than carry on.
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_id(&self) -> EntityId {
        self.player
    }

    /// Last published player position. Lock-free, possibly one move behind.
    pub fn player_position(&self) -> Position {
        Position::unpack(self.player_cell.load(Ordering::Acquire))
    }

    pub fn health(&self) -> i32 {
        self.health.load(Ordering::Acquire)
    }

    /// Only the health keeper calls this.
    pub(crate) fn store_health(&self, value: i32) {
        self.commit_health(value, 0);
    }

    /// Publish a new health value, retiring `blast_landed` points of blast
    /// damage that were counted as pending since the detonation.
    pub(crate) fn commit_health(&self, value: i32, blast_landed: i32) {
        let mut state = self.gate();
        self.health.store(value, Ordering::Release);
        state.pending_blast = (state.pending_blast - blast_landed).max(0);
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome.get().copied()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// Evaluate win/loss and latch the first result.
    /// Returns the outcome only to the caller that set the latch.
    ///
    /// Blast damage still on its way to the health keeper already counts, so
    /// a blast that kills the last enemy and the player is a loss whoever
    /// settles first.
    pub fn settle(&self) -> Option<Outcome> {
        if self.is_over() {
            return None;
        }
        let (enemies, health) = {
            let state = self.gate();
            (state.enemy_count(), self.health() - state.pending_blast)
        };
        let outcome = evaluate(enemies, health)?;
        match self.outcome.set(outcome) {
            Ok(()) => {
                info!("[World] Game over: {:?}", outcome);
                Some(outcome)
            }
            Err(_) => None,
        }
    }

    pub fn pickup_phase(&self) -> bool {
        self.pickup_phase.load(Ordering::Relaxed)
    }

    pub fn toggle_pickup_phase(&self) -> bool {
        !self.pickup_phase.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn pickups_left(&self) -> usize {
        self.gate().pickups_left
    }

    pub fn enemy_ids(&self) -> Vec<EntityId> {
        self.gate().enemy_ids()
    }

    pub fn set_status(&self, status: impl Into<String>) {
        self.gate().set_status(status);
    }

    pub fn move_player(&self, direction: Direction) -> Result<MoveReport, MoveError> {
        let (dx, dy) = direction.delta();
        let mut state = self.gate();
        state.facing = direction;
        let report = state.move_entity(self.player, dx, dy)?;
        self.player_cell.store(report.to.pack(), Ordering::Release);
        Ok(report)
    }

    /// Look at the player's own cell and say so on the status line.
    pub fn interact(&self) -> Position {
        let pos = self.player_position();
        self.set_status(format!("Interacting at {pos}"));
        pos
    }

    pub fn plant_bomb(&self, owner: EntityId, now: Instant) -> Result<Bomb, PlantError> {
        if self.is_over() {
            return Err(PlantError::GameOver);
        }
        let mut state = self.gate();
        let bomb = state.plant_bomb(owner, now, self.config.one_bomb_per_player)?;
        state.set_status(format!("Bomb planted at {}", bomb.pos));
        debug!("[World] Bomb {:?} planted at {}", bomb.id, bomb.pos);
        Ok(bomb)
    }

    /// Fire `bomb` if its fuse has run out. A player hit is recorded as
    /// pending damage in the same step, before anyone can settle the game.
    pub fn detonate(&self, bomb: BombId, now: Instant) -> Fuse {
        let mut state = self.gate();
        let fuse = state.detonate(bomb, now, self.config.bomb_fuse(), self.config.blast_radius);
        if matches!(&fuse, Fuse::Blasted(report) if report.player_hit) {
            state.pending_blast += self.config.hit_damage;
        }
        fuse
    }

    pub fn sweep_explosions(&self, now: Instant) -> usize {
        self.gate().sweep_explosions(now, self.config.explosion_duration())
    }

    pub fn enemy_tick<R: Rng>(
        &self,
        id: EntityId,
        sample: Option<Position>,
        rng: &mut R,
    ) -> Result<EnemyTick, MoveError> {
        self.gate()
            .enemy_tick(id, sample, self.config.detection_radius, rng)
    }

    /// Read-consistent copy of everything a renderer needs.
    pub fn snapshot(&self) -> Snapshot {
        let now = Instant::now();
        let fuse = self.config.bomb_fuse();
        let state = self.gate();
        Snapshot {
            grid: state.grid.clone(),
            entities: state
                .registry
                .iter()
                .map(|e| EntityView { id: e.id, role: e.role, pos: e.pos })
                .collect(),
            bombs: state
                .bombs
                .iter()
                .map(|b| BombView {
                    pos: b.pos,
                    remaining_ms: b.remaining(fuse, now).as_millis() as u64,
                })
                .collect(),
            explosions: state.explosions.iter().map(|e| e.pos).collect(),
            enemy_logs: state.enemy_logs(),
            status: state.status.clone(),
            health: self.health(),
            max_health: self.config.max_health,
            outcome: self.outcome(),
            pickup_phase: self.pickup_phase(),
            indicator: state.facing_cell(),
        }
    }
}
