//! Game entities module.
//!
//! This module organizes the entity registry and the bomb/explosion records.

pub mod registry;
pub mod bomb;

pub use registry::*;
pub use bomb::*;
