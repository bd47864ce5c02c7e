use actix::prelude::*;

use crate::game::state::World;
use crate::game::types::Outcome;
use crate::session::input::InputEvent;

/// One decoded input event for the player.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct PlayerCommand(pub InputEvent);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaCause {
    Contact,
    Blast,
    Pickup,
}

/// Signed health change, applied in arrival order by the health keeper.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
#[rtype(result = "()")]
pub struct HealthDelta {
    pub amount: i32,
    pub cause: DeltaCause,
}

impl HealthDelta {
    pub fn contact(damage: i32) -> Self {
        Self { amount: -damage, cause: DeltaCause::Contact }
    }

    pub fn blast(damage: i32) -> Self {
        Self { amount: -damage, cause: DeltaCause::Blast }
    }

    pub fn pickup(heal: i32) -> Self {
        Self { amount: heal, cause: DeltaCause::Pickup }
    }
}

#[derive(Message)]
#[rtype(result = "i32")]
pub struct GetHealth;

/// Something visible changed.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct Redraw;

/// Sent once, by whoever sets the outcome latch.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
#[rtype(result = "()")]
pub struct GameOver(pub Outcome);

/// Stop a background task group.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct Shutdown;

/// Where background tasks report redraws and the end of the game.
#[derive(Clone)]
pub struct Hooks {
    pub redraw: Recipient<Redraw>,
    pub game_over: Recipient<GameOver>,
}

impl Hooks {
    pub fn redraw(&self) {
        self.redraw.do_send(Redraw);
    }

    /// Run the win/loss evaluation and report a freshly set latch.
    pub fn settle(&self, world: &World) {
        if let Some(outcome) = world.settle() {
            self.game_over.do_send(GameOver(outcome));
        }
    }
}
