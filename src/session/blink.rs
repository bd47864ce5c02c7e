use std::sync::Arc;

use actix::prelude::*;
use log::debug;

use crate::game::state::World;
use crate::session::messages::{Hooks, Shutdown};

/// Toggles the pickup color until the last pickup is gone.
pub struct PickupBlinker {
    world: Arc<World>,
    hooks: Hooks,
}

impl PickupBlinker {
    pub fn new(world: Arc<World>, hooks: Hooks) -> Self {
        Self { world, hooks }
    }

    fn blink(&mut self, ctx: &mut Context<Self>) {
        if self.world.pickups_left() == 0 {
            debug!("[Blink] No pickup left, stopping");
            ctx.stop();
            return;
        }
        self.world.toggle_pickup_phase();
        self.hooks.redraw();
    }
}

impl Actor for PickupBlinker {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let interval = self.world.config().blink_interval();
        ctx.run_interval(interval, |act, ctx| act.blink(ctx));
    }
}

impl Handler<Shutdown> for PickupBlinker {
    type Result = ();

    fn handle(&mut self, _: Shutdown, ctx: &mut Context<Self>) -> Self::Result {
        ctx.stop();
    }
}
