//! The four per-tick stages. Each validates its inputs up front and then runs
//! one independent lane per drone (or per texel, for the bake).

pub mod bake;
pub mod physics;
pub mod render;
pub mod respawn;

pub use bake::bake;
pub use physics::physics;
pub use render::{render, RenderResult};
pub use respawn::respawn;
