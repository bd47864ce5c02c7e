//! Bomb lifecycle task, one actor per planted bomb.
//!
//! Armed on start, fires once when the fuse runs out, keeps the explosion on
//! screen for its lifetime, then stops.

use std::sync::Arc;
use std::time::Instant;

use actix::prelude::*;
use log::{debug, info};

use crate::game::entities::BombId;
use crate::game::state::World;
use crate::game::systems::Fuse;
use crate::session::health::HealthKeeper;
use crate::session::messages::{HealthDelta, Hooks};

pub struct BombFuse {
    bomb: BombId,
    world: Arc<World>,
    health: Addr<HealthKeeper>,
    hooks: Hooks,
}

impl BombFuse {
    pub fn new(bomb: BombId, world: Arc<World>, health: Addr<HealthKeeper>, hooks: Hooks) -> Self {
        Self { bomb, world, health, hooks }
    }

    fn fire(&mut self, ctx: &mut Context<Self>) {
        match self.world.detonate(self.bomb, Instant::now()) {
            Fuse::Pending(rest) => {
                debug!("[Bomb {:?}] Woke {:?} early, rescheduling", self.bomb.0, rest);
                ctx.run_later(rest, |act, ctx| act.fire(ctx));
            }
            Fuse::Gone => {
                debug!("[Bomb {:?}] Already detonated", self.bomb.0);
                ctx.stop();
            }
            Fuse::Blasted(report) => {
                info!(
                    "[Bomb {:?}] Detonated at {}, {} enemies destroyed",
                    self.bomb.0,
                    report.center,
                    report.killed.len()
                );
                if report.player_hit {
                    self.health.do_send(HealthDelta::blast(self.world.config().hit_damage));
                }
                self.hooks.settle(&self.world);
                self.hooks.redraw();

                let lifetime = self.world.config().explosion_duration();
                ctx.run_later(lifetime, |act, ctx| {
                    act.world.sweep_explosions(Instant::now());
                    act.hooks.redraw();
                    ctx.stop();
                });
            }
        }
    }
}

impl Actor for BombFuse {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let fuse = self.world.config().bomb_fuse();
        ctx.run_later(fuse, |act, ctx| act.fire(ctx));
    }
}
