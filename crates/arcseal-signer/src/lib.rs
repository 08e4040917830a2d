//! Artifact signing service for Arcseal.
//!
//! [`SigningService`] aggregates an artifact's bytes over the unit pool,
//! signs a canonical summary of the aggregate with a fresh single-use key
//! capsule, and keeps the capsule's public half in a [`CapsuleRegistry`] so
//! the artifact can be verified later.
//!
//! # Quick Start
//!
//! ```rust
//! use arcseal_signer::{SignerConfig, SigningService};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let service = SigningService::new(SignerConfig::default()).unwrap();
//! rt.block_on(async {
//!     let signed = service.sign_artifact(b"hello-world", "art-1").await.unwrap();
//!     assert_eq!(signed.aggregate_result.unit_count, 26);
//!     let result = service.verify_artifact(&signed).await.unwrap();
//!     assert!(result.valid);
//! });
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod registry;
pub mod service;

pub use artifact::{
    batch_fingerprint, canonical_summary, BatchResult, SignedArtifact, VerificationFailure,
    VerificationResult, BATCH_FINGERPRINT_LEN,
};
pub use config::SignerConfig;
pub use error::{SignerError, SignerResult};
pub use registry::{CapsuleRegistry, InMemoryCapsuleRegistry};
pub use service::SigningService;
