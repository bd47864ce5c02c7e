pub mod movement;
pub mod enemy;
pub mod explosion;
pub mod rules;
pub mod render;

pub use movement::*;
pub use enemy::*;
pub use explosion::*;
pub use rules::*;
pub use render::*;
