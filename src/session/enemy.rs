//! Enemy behavior task, one actor per enemy.
//!
//! Every tick the enemy drains its position mailbox, chases or wanders, and
//! requests contact damage when it ends up on the player's cell. The actor
//! stops as soon as its entity id no longer resolves.

use std::sync::Arc;

use actix::prelude::*;
use log::debug;

use crate::game::entities::EntityId;
use crate::game::state::World;
use crate::game::systems::{EnemyAction, EnemyPhase};
use crate::session::feed::PositionFeed;
use crate::session::health::HealthKeeper;
use crate::session::messages::{HealthDelta, Hooks, Shutdown};

pub struct EnemyBrain {
    id: EntityId,
    world: Arc<World>,
    feed: Arc<PositionFeed>,
    health: Addr<HealthKeeper>,
    hooks: Hooks,
    phase: EnemyPhase,
}

impl EnemyBrain {
    pub fn new(
        id: EntityId,
        world: Arc<World>,
        feed: Arc<PositionFeed>,
        health: Addr<HealthKeeper>,
        hooks: Hooks,
    ) -> Self {
        Self { id, world, feed, health, hooks, phase: EnemyPhase::Idle }
    }

    fn tick(&mut self, ctx: &mut Context<Self>) {
        if self.world.is_over() {
            ctx.stop();
            return;
        }

        let sample = self.feed.take();
        self.phase = if sample.is_some() { EnemyPhase::SampleReceived } else { EnemyPhase::Idle };

        let mut rng = rand::rng();
        let tick = match self.world.enemy_tick(self.id, sample, &mut rng) {
            Ok(tick) => tick,
            Err(_) => {
                debug!("[Enemy {}] Entity is gone, stopping", self.id);
                ctx.stop();
                return;
            }
        };

        self.phase = match tick.action {
            EnemyAction::Pursued { .. } => EnemyPhase::Pursuing,
            EnemyAction::Wandered { .. } => EnemyPhase::Wandering,
        };
        debug!("[Enemy {}] {:?}: {:?} now at {}", self.id, self.phase, tick.action, tick.pos);

        if tick.contact {
            self.health.do_send(HealthDelta::contact(self.world.config().hit_damage));
        }
        self.phase = EnemyPhase::Acted;
        self.hooks.redraw();
    }
}

impl Actor for EnemyBrain {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let tick = self.world.config().enemy_tick();
        ctx.run_interval(tick, |act, ctx| act.tick(ctx));
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        debug!("[Enemy {}] Stopped in phase {:?}", self.id, self.phase);
    }
}

impl Handler<Shutdown> for EnemyBrain {
    type Result = ();

    fn handle(&mut self, _: Shutdown, ctx: &mut Context<Self>) -> Self::Result {
        ctx.stop();
    }
}
