//! Error types for the ship world and session saves.

use crate::components::VesselId;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("an entity with id {0} already exists")]
    DuplicateId(String),
    #[error("unknown entity {0}")]
    UnknownEntity(String),
    #[error("unknown vessel {0:?}")]
    UnknownVessel(VesselId),
}

/// Errors that can occur during save/load
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Corrupt save: {0}")]
    World(#[from] WorldError),
}
