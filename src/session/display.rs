//! Display actor: turns redraw requests into frames.

use std::sync::Arc;

use actix::prelude::*;

use crate::game::state::World;
use crate::game::systems::RenderSink;
use crate::session::messages::Redraw;

pub struct Display {
    world: Arc<World>,
    sink: Box<dyn RenderSink>,
}

impl Display {
    pub fn new(world: Arc<World>, sink: Box<dyn RenderSink>) -> Self {
        Self { world, sink }
    }

    fn draw(&mut self) {
        let snapshot = self.world.snapshot();
        self.sink.render(&snapshot);
    }
}

impl Actor for Display {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.draw();
        // Keep the status panel fresh even when nothing asks for a redraw.
        let refresh = self.world.config().render_refresh();
        ctx.run_interval(refresh, |act, _| act.draw());
    }
}

impl Handler<Redraw> for Display {
    type Result = ();

    fn handle(&mut self, _: Redraw, _: &mut Context<Self>) -> Self::Result {
        self.draw();
    }
}
