//! Foundation types for Arcseal.
//!
//! This crate provides the small value types shared by every other Arcseal
//! crate: digests, unit identifiers, the layer taxonomy, and capsule
//! identifiers.
//!
//! # Key Types
//!
//! - [`Digest`]: Immutable variable-length hash output, hex on the wire
//! - [`UnitId`]: Single-letter (`A`–`Z`) identifier of a hashing unit
//! - [`Layer`]: Layer label with a declared total order
//! - [`CapsuleId`]: UUID v7 identifier of a key capsule

pub mod capsule_id;
pub mod digest;
pub mod error;
pub mod layer;
pub mod unit_id;

pub use capsule_id::CapsuleId;
pub use digest::Digest;
pub use error::TypeError;
pub use layer::Layer;
pub use unit_id::UnitId;
