//! Main entry point for the game.
//!
//! Loads the configuration and the map, starts the display and game session
//! actors, and feeds them keyboard input until the player quits.

use std::path::PathBuf;
use std::sync::Arc;

use actix::prelude::*;
use clap::Parser;
use log::{error, info};
use tokio::sync::oneshot;

use crate::config::{GameConfig, GameMode, game::DEFAULT_MAP_PATH};
use crate::error::AppError;
use crate::game::grid::load_map;
use crate::game::state::World;
use crate::game::systems::{TerminalGuard, TerminalRenderer};
use crate::session::display::Display;
use crate::session::input::spawn_reader;
use crate::session::server::GameSession;

pub mod config;
mod error;
mod game;
mod session;

#[derive(Parser, Debug)]
#[command(name = "blast-grid", version, about = "Terminal bomb game on a shared concurrent world")]
struct CliArgs {
    /// Map file to load.
    #[arg(default_value = DEFAULT_MAP_PATH)]
    map: PathBuf,

    /// Preset for health, blast radius and bomb policy.
    #[arg(long, value_enum, default_value_t = GameMode::Classic)]
    mode: GameMode,

    /// JSON file overriding the preset values.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl CliArgs {
    fn game_config(&self) -> Result<GameConfig, AppError> {
        match &self.config {
            Some(path) => Ok(GameConfig::from_json_file(path, self.mode)?),
            None => Ok(GameConfig::for_mode(self.mode)),
        }
    }
}

async fn run() -> Result<(), AppError> {
    let args = CliArgs::parse();
    let config = args.game_config()?;
    let map = load_map(&args.map)?;

    // Raw mode and the alternate screen are restored when this drops.
    let _terminal = TerminalGuard::enter()?;
    let world = Arc::new(World::new(map, config));
    let display = Display::new(world.clone(), Box::new(TerminalRenderer)).start();

    let (finished_tx, finished_rx) = oneshot::channel();
    let session = GameSession::new(world.clone(), display.recipient(), finished_tx).start();
    spawn_reader(session.recipient());

    let outcome = finished_rx.await.unwrap_or(None);
    info!("[Main] Session over, outcome {:?}", outcome);
    System::current().stop();
    Ok(())
}

#[actix::main]
async fn main() {
    // Initialize logger from environment variable (RUST_LOG).
    env_logger::init();

    if let Err(err) = run().await {
        error!("[Main] {}", err);
        eprintln!("blast-grid: {err}");
        std::process::exit(1);
    }
}
