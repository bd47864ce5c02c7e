//! Health keeper: the only writer of the health counter.
//!
//! Deltas arrive through the actor mailbox and are applied one at a time, in
//! arrival order. Contact damage is rate-limited here, measured from the last
//! damage actually applied (contact or blast), so several enemies touching the
//! player in the same window cost a single point.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use log::debug;

use crate::game::health::Health;
use crate::game::state::World;
use crate::session::messages::{DeltaCause, GetHealth, HealthDelta, Hooks};

pub struct HealthKeeper {
    world: Arc<World>,
    hooks: Hooks,
    health: Health,
    cooldown: Duration,
    last_damage: Option<Instant>,
}

impl HealthKeeper {
    pub fn new(world: Arc<World>, hooks: Hooks) -> Self {
        let health = Health::full(world.config().max_health);
        let cooldown = world.config().contact_cooldown();
        world.store_health(health.value());
        Self { world, hooks, health, cooldown, last_damage: None }
    }

    fn in_cooldown(&self, now: Instant) -> bool {
        self.last_damage
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
    }
}

impl Actor for HealthKeeper {
    type Context = Context<Self>;
}

impl Handler<HealthDelta> for HealthKeeper {
    type Result = ();

    fn handle(&mut self, msg: HealthDelta, _: &mut Context<Self>) -> Self::Result {
        let now = Instant::now();
        if msg.cause == DeltaCause::Contact && self.in_cooldown(now) {
            debug!("[Health] Contact damage ignored during cooldown");
            return;
        }
        if msg.amount < 0 {
            self.last_damage = Some(now);
        }

        let before = self.health.value();
        let after = self.health.apply(msg.amount);
        let blast_landed = match msg.cause {
            DeltaCause::Blast => -msg.amount,
            _ => 0,
        };
        self.world.commit_health(after, blast_landed);
        debug!("[Health] {:?} {:+}: {} -> {}", msg.cause, msg.amount, before, after);

        if msg.cause == DeltaCause::Contact {
            self.world.set_status("An enemy hit you!");
        }
        self.hooks.settle(&self.world);
        self.hooks.redraw();
    }
}

impl Handler<GetHealth> for HealthKeeper {
    type Result = i32;

    fn handle(&mut self, _: GetHealth, _: &mut Context<Self>) -> Self::Result {
        self.health.value()
    }
}
