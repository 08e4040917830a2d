use arcseal_types::UnitId;

/// Errors produced by the unit pool and aggregator.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SwarmError {
    /// Requested pool size is outside `1..=max`.
    #[error("invalid pool size {requested}: must be between 1 and {max}")]
    InvalidPoolSize { requested: usize, max: usize },

    /// Configuration failed validation.
    #[error("invalid swarm configuration: {0}")]
    InvalidConfig(String),

    /// One unit's hashing task failed. The unit is excluded from the
    /// aggregation it belonged to.
    #[error("unit {unit} task failed: {reason}")]
    UnitTaskFailure { unit: UnitId, reason: String },

    /// Fewer units succeeded than the configured quorum.
    #[error("insufficient units: {succeeded} succeeded, quorum is {required}")]
    InsufficientUnits { succeeded: usize, required: usize },
}

/// Convenience alias used throughout the swarm crate.
pub type SwarmResult<T> = std::result::Result<T, SwarmError>;
