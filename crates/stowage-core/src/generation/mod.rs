//! Generation - entity builders and procedural creation of decks and cargo.

mod builders;
mod cargo;
mod ship;

pub use builders::*;
pub use cargo::*;
pub use ship::*;
