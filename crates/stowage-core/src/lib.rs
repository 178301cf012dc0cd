//! Stowage Core - reference host simulation for the stowage logic
//!
//! An ECS ship world where characters haul cargo into lockers that carry
//! storage preferences, and EVA suits are kept topped up.
//!
//! # Architecture
//!
//! The world uses an Entity Component System (ECS) via `hecs`:
//! - **Entities**: Characters, containers, items, suit parts
//! - **Components**: Pure data (Identity, Position, Stack, Storage, ...)
//! - **Host**: [`world::ShipWorld`] answers every query the logic crate asks
//! - **Engine**: [`engine::StowageEngine`] feeds world events to the logic
//!
//! # Example
//!
//! ```rust,no_run
//! use stowage_core::prelude::*;
//! use stowage_logic::categories::CategoryTree;
//! use stowage_logic::config::StowageConfig;
//!
//! let mut engine = StowageEngine::new(StowageConfig::default(), CategoryTree::default());
//! engine
//!     .generate(VesselId(1), &ShipConfig::default(), 12, 42)
//!     .expect("generation failed");
//!
//! loop {
//!     engine.update(1.0 / 60.0);
//! }
//! ```

pub mod components;
pub mod engine;
pub mod error;
pub mod generation;
pub mod persistence;
pub mod world;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::StowageEngine;
    pub use crate::error::{SaveError, WorldError};
    pub use crate::generation::{ItemSpec, ShipConfig};
    pub use crate::world::ShipWorld;
}
