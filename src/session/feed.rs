//! Position feed: player coordinates pushed to every enemy.
//!
//! Each enemy owns a one-slot mailbox. Publishing overwrites whatever is
//! there and never blocks; taking empties the slot. A single broadcaster
//! samples the player position on a fixed interval and fills every mailbox.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use actix::prelude::*;
use log::debug;

use crate::game::state::World;
use crate::game::types::Position;
use crate::session::messages::Shutdown;

const EMPTY: u64 = u64::MAX;

/// Single-slot, latest-value-wins mailbox.
#[derive(Debug)]
pub struct PositionFeed {
    slot: AtomicU64,
}

impl Default for PositionFeed {
    fn default() -> Self {
        Self { slot: AtomicU64::new(EMPTY) }
    }
}

impl PositionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, pos: Position) {
        self.slot.store(pos.pack(), Ordering::Release);
    }

    pub fn take(&self) -> Option<Position> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            word => Some(Position::unpack(word)),
        }
    }
}

pub struct Broadcaster {
    world: Arc<World>,
    feeds: Vec<Weak<PositionFeed>>,
}

impl Broadcaster {
    pub fn new(world: Arc<World>, feeds: Vec<Weak<PositionFeed>>) -> Self {
        Self { world, feeds }
    }

    fn broadcast(&mut self, ctx: &mut Context<Self>) {
        let pos = self.world.player_position();
        // Mailboxes of stopped enemies are dropped with them.
        self.feeds.retain(|feed| match feed.upgrade() {
            Some(feed) => {
                feed.publish(pos);
                true
            }
            None => false,
        });
        if self.feeds.is_empty() {
            debug!("[Broadcaster] No enemy left to feed, stopping");
            ctx.stop();
        }
    }
}

impl Actor for Broadcaster {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let interval = self.world.config().broadcast_interval();
        ctx.run_interval(interval, |act, ctx| act.broadcast(ctx));
    }
}

impl Handler<Shutdown> for Broadcaster {
    type Result = ();

    fn handle(&mut self, _: Shutdown, ctx: &mut Context<Self>) -> Self::Result {
        ctx.stop();
    }
}
