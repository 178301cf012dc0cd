//! Error types shared across the logic crate.

/// Failure raised by a host collaborator call.
///
/// The delivery path never lets one of these escape to the host: it is
/// caught at the delivery boundary and turned into a job cancellation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("entity {0} no longer exists")]
    MissingEntity(String),
    #[error("entity {0} has no storage")]
    NoStorage(String),
    #[error("move rejected: {0}")]
    Rejected(String),
}

/// Errors returned by construction-time and persistence APIs.
#[derive(Debug, thiserror::Error)]
pub enum StowageError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    #[error("invalid haul job: character={character:?} item={item:?} container={container:?}")]
    InvalidJob {
        character: String,
        item: String,
        container: String,
    },
    #[error("haul job for {character} has non-positive quantity {quantity}")]
    NonPositiveQuantity { character: String, quantity: i64 },
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported document version {found} (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },
}
