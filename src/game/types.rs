use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Shift by a signed delta. `None` if either coordinate would go negative;
    /// the upper bound is checked by the grid.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Position> {
        Some(Position {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Pack into one word so the position can live in an `AtomicU64`.
    pub(crate) fn pack(self) -> u64 {
        debug_assert!(self.x < u32::MAX as usize && self.y < u32::MAX as usize);
        ((self.x as u64) << 32) | (self.y as u64 & 0xFFFF_FFFF)
    }

    pub(crate) fn unpack(word: u64) -> Position {
        Position {
            x: (word >> 32) as usize,
            y: (word & 0xFFFF_FFFF) as usize,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Content of one grid cell.
///
/// `Wall`, `Vegetation`, `Pickup` and `Empty` are terrain. `Player` and `Enemy`
/// are sprites written by the move protocol on top of the terrain remembered
/// by the standing entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Vegetation,
    Pickup,
    Empty,
    Player,
    Enemy,
}

impl Tile {
    /// Only walls block. Sprites never block: contact is a shared cell.
    pub fn is_blocking(self) -> bool {
        self == Tile::Wall
    }

    pub fn is_sprite(self) -> bool {
        matches!(self, Tile::Player | Tile::Enemy)
    }

    pub fn symbol(self) -> char {
        match self {
            Tile::Wall => '▤',
            Tile::Vegetation => '♣',
            Tile::Pickup => '♥',
            Tile::Empty => ' ',
            Tile::Player => '☺',
            Tile::Enemy => '☠',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Player,
    Enemy,
}

impl Role {
    pub fn sprite(self) -> Tile {
        match self {
            Role::Player => Tile::Player,
            Role::Enemy => Tile::Enemy,
        }
    }
}

/// Terminal state of a game. Latched once, never reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}
