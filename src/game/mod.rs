//! Game world: types, grid, entities, and the systems that mutate them.
//!
//! Everything here is synchronous. The actors in `session` drive it.

pub mod types;
pub mod health;
pub mod state;
pub mod entities;
pub mod grid;
pub mod systems;

#[cfg(test)]
mod tests;
