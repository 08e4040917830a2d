//! Cryptographic primitives for Arcseal.
//!
//! Provides domain-separated BLAKE3 hashing with extendable output and keyed
//! mode, the three-round salted SHA-3 cascade with its amplification pass,
//! and per-artifact key capsules (Ed25519 or secp256k1 ECDSA).
//!
//! All crypto operations wrap established libraries. The only arithmetic
//! defined here is the amplification transform, which no security property
//! depends on.

pub mod capsule;
pub mod cascade;
pub mod error;
pub mod keypair;
pub mod primitive;

pub use capsule::{fingerprint, timestamp_now, CapsulePublicInfo, KeyCapsule, Signature};
pub use cascade::{amplify, AmplifiedOutput, CascadeHasher, CascadeOutput, CascadeRound, CascadeVariant};
pub use error::CapsuleError;
pub use keypair::{KeyAlgorithm, PublicKey, SIGNATURE_LEN};
pub use primitive::{PrimitiveHasher, SystemKey, SYSTEM_CONSTANT};
