//! Component definitions for the ECS ship world.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in the world and the engine.

mod common;
mod items;
mod people;
mod ship;

pub use common::*;
pub use items::*;
pub use people::*;
pub use ship::*;
