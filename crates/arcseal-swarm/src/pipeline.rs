use std::time::Instant;

use arcseal_crypto::{CascadeHasher, PrimitiveHasher, SystemKey};

use crate::error::SwarmResult;
use crate::unit::{HashResult, Unit};

/// Length of a unit's primitive digest.
pub const PRIMITIVE_DIGEST_LEN: usize = 32;

/// Length of a unit's final digest.
pub const FINAL_DIGEST_LEN: usize = 64;

/// Per-unit hashing work run by the aggregator.
///
/// Implementations must be pure with respect to `(unit identity, payload)`:
/// the aggregate root is only reproducible if every unit's final digest is.
pub trait UnitPipeline: Send + Sync + 'static {
    /// Hash `payload` through `unit`.
    fn digest(&self, unit: &Unit, payload: &[u8]) -> SwarmResult<HashResult>;
}

/// The standard pipeline: salted primitive hash, amplified cascade, then a
/// keyed fold of all three digests.
#[derive(Debug, Clone)]
pub struct CascadePipeline {
    cascade: CascadeHasher,
    system_key: SystemKey,
}

impl CascadePipeline {
    /// Pipeline for the given system context.
    pub fn new(context: &str) -> Self {
        Self {
            cascade: CascadeHasher::new(context),
            system_key: SystemKey::derive(context),
        }
    }
}

impl UnitPipeline for CascadePipeline {
    fn digest(&self, unit: &Unit, payload: &[u8]) -> SwarmResult<HashResult> {
        let started = Instant::now();

        let primitive = PrimitiveHasher::UNIT.hash_parts(
            &[unit.salt().as_bytes(), payload],
            PRIMITIVE_DIGEST_LEN,
        );
        let cascade = self
            .cascade
            .hash_with_amplification(primitive.as_bytes(), unit.exponent());
        let final_digest = PrimitiveHasher::UNIT.keyed_hash_parts(
            self.system_key.as_bytes(),
            &[
                primitive.as_bytes(),
                cascade.base.final_digest.as_bytes(),
                cascade.amplified.as_bytes(),
            ],
            FINAL_DIGEST_LEN,
        );

        Ok(HashResult {
            unit_id: unit.id(),
            layer: unit.layer(),
            primitive_digest: primitive,
            cascade_digest: cascade.base.final_digest,
            amplified_digest: cascade.amplified,
            final_digest,
            processing_duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitPool;

    #[test]
    fn digest_is_reproducible() {
        let pool = UnitPool::create(3).unwrap();
        let pipeline = CascadePipeline::new("ctx");
        let unit = &pool.units()[1];
        let a = pipeline.digest(unit, b"payload").unwrap();
        let b = pipeline.digest(unit, b"payload").unwrap();
        assert_eq!(a.final_digest, b.final_digest);
        assert_eq!(a.amplified_digest, b.amplified_digest);
        assert_eq!(a.unit_id, unit.id());
    }

    #[test]
    fn digest_lengths() {
        let pool = UnitPool::create(1).unwrap();
        let r = CascadePipeline::new("ctx")
            .digest(&pool.units()[0], b"x")
            .unwrap();
        assert_eq!(r.primitive_digest.len(), PRIMITIVE_DIGEST_LEN);
        assert_eq!(r.cascade_digest.len(), 64);
        assert_eq!(r.amplified_digest.len(), 64);
        assert_eq!(r.final_digest.len(), FINAL_DIGEST_LEN);
    }

    #[test]
    fn units_disagree_on_same_payload() {
        let pool = UnitPool::create(2).unwrap();
        let pipeline = CascadePipeline::new("ctx");
        let a = pipeline.digest(&pool.units()[0], b"same").unwrap();
        let b = pipeline.digest(&pool.units()[1], b"same").unwrap();
        assert_ne!(a.primitive_digest, b.primitive_digest);
        assert_ne!(a.final_digest, b.final_digest);
    }

    #[test]
    fn context_changes_final_digest() {
        let pool = UnitPool::create(1).unwrap();
        let unit = &pool.units()[0];
        let a = CascadePipeline::new("ctx-a").digest(unit, b"p").unwrap();
        let b = CascadePipeline::new("ctx-b").digest(unit, b"p").unwrap();
        assert_eq!(a.primitive_digest, b.primitive_digest);
        assert_ne!(a.final_digest, b.final_digest);
    }
}
