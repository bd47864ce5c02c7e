use serde::{Deserialize, Serialize};

use crate::game::types::{Position, Tile};

/// Rectangular grid of tiles, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self { width, height, tiles: vec![tile; width * height] }
    }

    /// Build from rows, padding short rows with `Empty`.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut tiles = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, Tile::Empty);
            tiles.extend(row);
        }
        Self { width, height, tiles }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn get(&self, pos: Position) -> Option<Tile> {
        self.in_bounds(pos).then(|| self.tiles[pos.y * self.width + pos.x])
    }

    /// Write a tile. Out-of-bounds writes are a bug: they panic in debug
    /// builds and are dropped in release.
    pub fn set(&mut self, pos: Position, tile: Tile) {
        debug_assert!(self.in_bounds(pos), "grid write out of bounds at {pos}");
        if self.in_bounds(pos) {
            self.tiles[pos.y * self.width + pos.x] = tile;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width.max(1))
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }
}
