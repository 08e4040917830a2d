use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid unit id: {0:?} (expected a single letter A-Z)")]
    InvalidUnitId(String),

    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    #[error("invalid capsule id: {0}")]
    InvalidCapsuleId(String),
}
