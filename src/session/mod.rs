//! Session layer root module.
//!
//! Every concurrent agent of a game is an actor here:
//! - `server`: the game session, applies player commands and owns the others
//! - `health`: the health keeper, sole writer of the health counter
//! - `enemy`: one behavior actor per enemy
//! - `feed`: per-enemy position mailboxes and their broadcaster
//! - `bomb`: one fuse actor per planted bomb
//! - `blink`: pickup color animation
//! - `display`: turns redraw requests into frames
//! - `input`: keyboard decoding

pub mod messages;
pub mod server;
pub mod health;
pub mod enemy;
pub mod feed;
pub mod bomb;
pub mod blink;
pub mod display;
pub mod input;
