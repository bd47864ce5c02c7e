//! Game session: owns the background tasks and applies player commands.
//!
//! On start it spawns the health keeper, one enemy actor per enemy (spread over
//! worker arbiters), the position broadcaster and the pickup blinker. Player
//! commands are handled one message at a time. Once the outcome latches, only
//! quit is accepted and the enemy, broadcast and blink groups are shut down;
//! bombs already ticking finish on their own.

use std::sync::Arc;
use std::time::Instant;

use actix::prelude::*;
use log::{debug, info, warn};
use tokio::sync::oneshot;

use crate::game::state::World;
use crate::game::types::{Direction, Outcome};
use crate::session::blink::PickupBlinker;
use crate::session::bomb::BombFuse;
use crate::session::enemy::EnemyBrain;
use crate::session::feed::{Broadcaster, PositionFeed};
use crate::session::health::HealthKeeper;
use crate::session::input::InputEvent;
use crate::session::messages::{GameOver, HealthDelta, Hooks, PlayerCommand, Redraw, Shutdown};

pub struct GameSession {
    world: Arc<World>,
    display: Recipient<Redraw>,
    finished: Option<oneshot::Sender<Option<Outcome>>>,
    hooks: Option<Hooks>,
    health: Option<Addr<HealthKeeper>>,
    enemies: Vec<Addr<EnemyBrain>>,
    broadcaster: Option<Addr<Broadcaster>>,
    blinker: Option<Addr<PickupBlinker>>,
    workers: Vec<Arbiter>,
}

impl GameSession {
    /// `finished` receives the outcome (if any) when the player quits.
    pub fn new(
        world: Arc<World>,
        display: Recipient<Redraw>,
        finished: oneshot::Sender<Option<Outcome>>,
    ) -> Self {
        Self {
            world,
            display,
            finished: Some(finished),
            hooks: None,
            health: None,
            enemies: Vec::new(),
            broadcaster: None,
            blinker: None,
            workers: Vec::new(),
        }
    }

    fn spawn_enemies(&mut self, health: &Addr<HealthKeeper>, hooks: &Hooks) -> Vec<Arc<PositionFeed>> {
        let ids = self.world.enemy_ids();
        let workers = self.world.config().enemy_workers.max(1).min(ids.len());
        self.workers = (0..workers).map(|_| Arbiter::new()).collect();

        let mut feeds = Vec::with_capacity(ids.len());
        for (i, id) in ids.into_iter().enumerate() {
            let feed = Arc::new(PositionFeed::new());
            feeds.push(feed.clone());
            let world = self.world.clone();
            let health = health.clone();
            let hooks = hooks.clone();
            let addr = EnemyBrain::start_in_arbiter(&self.workers[i % workers].handle(), move |_| {
                EnemyBrain::new(id, world, feed, health, hooks)
            });
            self.enemies.push(addr);
        }
        feeds
    }

    fn shutdown_background(&mut self) {
        for enemy in self.enemies.drain(..) {
            enemy.do_send(Shutdown);
        }
        if let Some(broadcaster) = self.broadcaster.take() {
            broadcaster.do_send(Shutdown);
        }
        if let Some(blinker) = self.blinker.take() {
            blinker.do_send(Shutdown);
        }
    }

    fn move_player(&mut self, direction: Direction) {
        match self.world.move_player(direction) {
            Ok(report) if report.picked_up => {
                self.world.set_status("Picked up a heart!");
                if let Some(health) = &self.health {
                    health.do_send(HealthDelta::pickup(self.world.config().pickup_heal));
                }
            }
            Ok(report) => {
                self.world.set_status(format!("Moved {} to {}", direction.name(), report.to));
            }
            Err(err) => {
                debug!("[GameSession] Move {} refused: {}", direction.name(), err);
                self.world.set_status(format!("Can't move {}: {}", direction.name(), err));
            }
        }
    }

    fn plant_bomb(&mut self) {
        let bomb = match self.world.plant_bomb(self.world.player_id(), Instant::now()) {
            Ok(bomb) => bomb,
            Err(err) => {
                debug!("[GameSession] Bomb refused: {}", err);
                return;
            }
        };
        if let (Some(health), Some(hooks)) = (&self.health, &self.hooks) {
            BombFuse::new(bomb.id, self.world.clone(), health.clone(), hooks.clone()).start();
        }
    }

    fn finish(&mut self, ctx: &mut Context<Self>) {
        let outcome = self.world.outcome();
        info!("[GameSession] Player quit (outcome: {:?})", outcome);
        self.shutdown_background();
        if let Some(finished) = self.finished.take() {
            let _ = finished.send(outcome);
        }
        ctx.stop();
    }
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let hooks = Hooks {
            redraw: self.display.clone(),
            game_over: ctx.address().recipient(),
        };
        let health = HealthKeeper::new(self.world.clone(), hooks.clone()).start();

        let feeds = self.spawn_enemies(&health, &hooks);
        if !feeds.is_empty() {
            let weak = feeds.iter().map(Arc::downgrade).collect();
            self.broadcaster = Some(Broadcaster::new(self.world.clone(), weak).start());
        }
        // The enemy actors hold the only strong references from here on.
        drop(feeds);

        if self.world.pickups_left() > 0 {
            self.blinker = Some(PickupBlinker::new(self.world.clone(), hooks.clone()).start());
        }

        info!(
            "[GameSession] Started: {} enemies on {} workers",
            self.enemies.len(),
            self.workers.len()
        );
        self.health = Some(health);
        // A map without enemies is won before the first move.
        hooks.settle(&self.world);
        hooks.redraw();
        self.hooks = Some(hooks);
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        for worker in &self.workers {
            worker.stop();
        }
    }
}

impl Handler<PlayerCommand> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: PlayerCommand, ctx: &mut Context<Self>) -> Self::Result {
        match msg.0 {
            InputEvent::Quit => return self.finish(ctx),
            event if self.world.is_over() => {
                warn!("[GameSession] Ignoring {:?}: the game is over", event);
                return;
            }
            InputEvent::Move(direction) => self.move_player(direction),
            InputEvent::PlantBomb => self.plant_bomb(),
            InputEvent::Interact => {
                let pos = self.world.interact();
                debug!("[GameSession] Interact at {}", pos);
            }
        }
        if let Some(hooks) = &self.hooks {
            hooks.settle(&self.world);
            hooks.redraw();
        }
    }
}

impl Handler<GameOver> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: GameOver, _: &mut Context<Self>) -> Self::Result {
        let GameOver(outcome) = msg;
        info!("[GameSession] Game over: {:?}", outcome);
        self.world.set_status(match outcome {
            Outcome::Win => "Every enemy is gone!",
            Outcome::Loss => "You ran out of health.",
        });
        self.shutdown_background();
        self.display.do_send(Redraw);
    }
}
