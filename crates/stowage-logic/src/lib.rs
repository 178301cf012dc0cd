//! Pure logic for Stowage: preference-driven hauling, storage allow-lists
//! and EVA suit upkeep.
//!
//! This crate knows nothing about any particular simulation. Items,
//! containers, characters and vessels are reached through the [`host::Host`]
//! trait, so every rule here is unit-testable against an in-memory host and
//! portable to any engine that implements it.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`candidates`] | Storage visibility and candidate filtering on a vessel |
//! | [`categories`] | Category tree, interned ids, membership resolver |
//! | [`config`] | Runtime configuration (logging, search limit, EVA thresholds) |
//! | [`delivery`] | Haul job fulfilment on drop events |
//! | [`effects`] | Interaction effects: container drop, battery and O2 swaps |
//! | [`error`] | Error types |
//! | [`eva`] | Suit consumable helpers, swaps, maintenance planner |
//! | [`hauling`] | Best haul destination and haul planning |
//! | [`host`] | Collaborator trait and condition/stat identifiers |
//! | [`jobs`] | Per-character haul job table |
//! | [`persistence`] | JSON document for storage preferences |
//! | [`prefs`] | Per-container allow-list and matching rule |
//! | [`search`] | `searchitems` definition search |
//! | [`selector`] | Best-fit container selection |
//! | [`store`] | Session-wide preference store |
//! | [`stowage`] | Session service tying the registries together |

pub mod candidates;
pub mod categories;
pub mod config;
pub mod delivery;
pub mod effects;
pub mod error;
pub mod eva;
pub mod hauling;
pub mod host;
pub mod jobs;
pub mod persistence;
pub mod prefs;
pub mod search;
pub mod selector;
pub mod store;
pub mod stowage;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{HostError, StowageError};
pub use stowage::Stowage;
