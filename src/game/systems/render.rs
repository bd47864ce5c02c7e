//! Game rendering system (terminal).
//!
//! Renderers receive a [`Snapshot`] taken under the mutation gate and never
//! touch the world themselves.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, MoveToNextLine, Show};
use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use log::warn;
use serde::Serialize;

use crate::game::entities::EntityId;
use crate::game::grid::Grid;
use crate::game::types::{Outcome, Position, Role, Tile};

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub role: Role,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize)]
pub struct BombView {
    pub pos: Position,
    pub remaining_ms: u64,
}

/// Read-consistent copy of the world.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub grid: Grid,
    pub entities: Vec<EntityView>,
    pub bombs: Vec<BombView>,
    pub explosions: Vec<Position>,
    pub enemy_logs: Vec<String>,
    pub status: String,
    pub health: i32,
    pub max_health: i32,
    pub outcome: Option<Outcome>,
    pub pickup_phase: bool,
    /// Free cell the player is facing, if any.
    pub indicator: Option<Position>,
}

impl Snapshot {
    pub fn enemy_count(&self) -> usize {
        self.entities.iter().filter(|e| e.role == Role::Enemy).count()
    }
}

/// Where snapshots end up.
pub trait RenderSink: Send + 'static {
    fn render(&mut self, snapshot: &Snapshot);
}

fn cell_glyph(snapshot: &Snapshot, pos: Position, tile: Tile) -> (char, Color) {
    if tile.is_sprite() {
        return match tile {
            Tile::Enemy => (tile.symbol(), Color::Red),
            _ => (tile.symbol(), Color::White),
        };
    }
    if snapshot.explosions.contains(&pos) {
        return ('*', Color::Yellow);
    }
    if snapshot.bombs.iter().any(|b| b.pos == pos) {
        return ('o', Color::Red);
    }
    if snapshot.indicator == Some(pos) && tile != Tile::Pickup {
        return (FACING_GLYPH, Color::DarkGrey);
    }
    match tile {
        Tile::Wall => (tile.symbol(), Color::DarkGrey),
        Tile::Vegetation => (tile.symbol(), Color::Green),
        Tile::Pickup if snapshot.pickup_phase => (tile.symbol(), Color::White),
        Tile::Pickup => (tile.symbol(), Color::Red),
        _ => (tile.symbol(), Color::Reset),
    }
}

const FACING_GLYPH: char = '·';

/// Queue one full frame on `out` and flush it.
pub fn render_frame<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (y, row) in snapshot.grid.rows().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            let (glyph, color) = cell_glyph(snapshot, Position::new(x, y), *tile);
            queue!(out, PrintStyledContent(glyph.with(color)))?;
        }
        queue!(out, MoveToNextLine(1))?;
    }
    queue!(out, MoveToNextLine(1))?;

    for (i, log) in snapshot.enemy_logs.iter().enumerate() {
        queue!(
            out,
            PrintStyledContent(format!("Enemy {}:", i + 1).dark_grey()),
            Print(" "),
            PrintStyledContent(log.as_str().green()),
            MoveToNextLine(1)
        )?;
    }

    let hearts = "♥".repeat(snapshot.health.max(0) as usize);
    queue!(
        out,
        PrintStyledContent("Health:".dark_grey()),
        Print(" "),
        PrintStyledContent(hearts.red()),
        Print(format!(" ({}/{})", snapshot.health, snapshot.max_health)),
        MoveToNextLine(1)
    )?;
    if !snapshot.status.is_empty() {
        queue!(out, Print(&snapshot.status), MoveToNextLine(1))?;
    }
    let footer = match snapshot.outcome {
        Some(Outcome::Win) => "All enemies destroyed. You win! Press q to quit.",
        Some(Outcome::Loss) => "You died. Game over! Press q to quit.",
        None => "WASD or arrows to move, e to interact, b or space to plant a bomb, q or Esc to quit.",
    };
    queue!(out, Print(footer), MoveToNextLine(1))?;
    out.flush()
}

/// Draws frames on stdout.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl RenderSink for TerminalRenderer {
    fn render(&mut self, snapshot: &Snapshot) {
        let mut stdout = io::stdout().lock();
        if let Err(err) = render_frame(&mut stdout, snapshot) {
            warn!("[Render] Failed to draw frame: {}", err);
        }
    }
}

/// Raw mode plus the alternate screen for as long as it lives.
#[derive(Debug)]
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = execute!(io::stdout(), Show, LeaveAlternateScreen) {
            warn!("[Render] Failed to leave the alternate screen: {}", err);
        }
        if let Err(err) = terminal::disable_raw_mode() {
            warn!("[Render] Failed to restore the terminal: {}", err);
        }
    }
}
