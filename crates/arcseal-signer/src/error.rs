use arcseal_crypto::CapsuleError;
use arcseal_swarm::SwarmError;
use arcseal_types::CapsuleId;

/// Errors produced by the signing service.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// A key capsule operation failed.
    #[error(transparent)]
    Capsule(#[from] CapsuleError),

    /// Aggregation over the unit pool failed.
    #[error(transparent)]
    Swarm(#[from] SwarmError),

    /// No capsule with this id is registered.
    #[error("capsule not found: {0}")]
    CapsuleNotFound(CapsuleId),

    /// A capsule with this id is already registered. Registry entries are
    /// never replaced.
    #[error("capsule already registered: {0}")]
    DuplicateCapsule(CapsuleId),

    /// The capsule registry is unusable (poisoned lock).
    #[error("registry error: {0}")]
    Registry(String),

    /// Canonical serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A spawned signing task panicked or was cancelled.
    #[error("task join error: {0}")]
    TaskJoin(String),

    /// Configuration could not be read or failed validation.
    #[error("invalid signer configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SignerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience alias used throughout the signer crate.
pub type SignerResult<T> = std::result::Result<T, SignerError>;
