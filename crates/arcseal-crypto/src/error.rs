use arcseal_types::CapsuleId;

/// Errors from key capsule operations.
///
/// A signature that is well-formed but does not verify is not an error;
/// verification reports it as `Ok(false)`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CapsuleError {
    /// Signing was attempted before a key pair was generated.
    #[error("capsule {0} has no private key (generate a key pair first)")]
    NoPrivateKey(CapsuleId),

    /// A key pair already exists; capsule keys are write-once.
    #[error("capsule {0} already holds a key pair")]
    AlreadyGenerated(CapsuleId),

    /// The signature buffer cannot possibly hold a signature.
    #[error("malformed signature: expected {expected} bytes, got {actual}")]
    MalformedSignature { expected: usize, actual: usize },

    /// Public key bytes do not decode to a valid key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}
