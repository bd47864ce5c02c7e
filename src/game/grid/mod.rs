//! Grid storage and map loading.

pub mod grid;
pub mod map;

pub use grid::Grid;
pub use map::{MapData, load_map};
