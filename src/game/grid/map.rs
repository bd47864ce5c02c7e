//! Text map loader.
//!
//! One line per row, one character per column. Spawn markers become entity
//! positions; the grid shows their sprite over empty terrain.

use std::path::Path;

use log::info;

use crate::error::MapError;
use crate::game::grid::Grid;
use crate::game::types::{Position, Tile};

/// Everything the world needs from a map file.
#[derive(Debug, Clone)]
pub struct MapData {
    pub grid: Grid,
    pub player: Position,
    pub enemies: Vec<Position>,
}

enum Symbol {
    Terrain(Tile),
    PlayerSpawn,
    EnemySpawn,
}

fn classify(ch: char) -> Symbol {
    match ch {
        '▤' | '#' => Symbol::Terrain(Tile::Wall),
        '♣' | '%' => Symbol::Terrain(Tile::Vegetation),
        '♥' | '+' => Symbol::Terrain(Tile::Pickup),
        '☺' | 'P' => Symbol::PlayerSpawn,
        '☠' | 'E' => Symbol::EnemySpawn,
        _ => Symbol::Terrain(Tile::Empty),
    }
}

pub fn parse_map(text: &str) -> Result<MapData, MapError> {
    let mut rows = Vec::new();
    let mut player = None;
    let mut enemies = Vec::new();

    for (y, line) in text.lines().enumerate() {
        let mut row = Vec::new();
        // Columns are characters, not bytes: the symbols are multi-byte.
        for (x, ch) in line.chars().enumerate() {
            let pos = Position::new(x, y);
            let tile = match classify(ch) {
                Symbol::Terrain(tile) => tile,
                Symbol::PlayerSpawn => {
                    if player.replace(pos).is_some() {
                        return Err(MapError::MultiplePlayers(pos));
                    }
                    Tile::Player
                }
                Symbol::EnemySpawn => {
                    enemies.push(pos);
                    Tile::Enemy
                }
            };
            row.push(tile);
        }
        rows.push(row);
    }

    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    if rows.iter().all(|row| row.is_empty()) {
        return Err(MapError::Empty);
    }
    let player = player.ok_or(MapError::NoPlayer)?;

    Ok(MapData { grid: Grid::from_rows(rows), player, enemies })
}

pub fn load_map(path: impl AsRef<Path>) -> Result<MapData, MapError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| MapError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let map = parse_map(&text)?;
    info!(
        "[Map] Loaded {} ({}x{}, {} enemies)",
        path.display(),
        map.grid.width(),
        map.grid.height(),
        map.enemies.len()
    );
    Ok(map)
}
