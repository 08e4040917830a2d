use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arcseal_crypto::{PrimitiveHasher, Signature};
use arcseal_swarm::{AggregateResult, LayerRoot};
use arcseal_types::{CapsuleId, Digest};

use crate::error::SignerResult;

const BATCH_HASHER: PrimitiveHasher = PrimitiveHasher::new("arcseal-batch-v1");

/// Length of a batch fingerprint.
pub const BATCH_FINGERPRINT_LEN: usize = 32;

/// An aggregate bound to an artifact id and signed by a single-use capsule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedArtifact {
    pub artifact_id: String,
    pub capsule_uuid: CapsuleId,
    pub capsule_fingerprint: String,
    pub aggregate_result: AggregateResult,
    pub signature: Signature,
}

impl SignedArtifact {
    /// The exact bytes the signature covers.
    pub fn canonical_bytes(&self) -> SignerResult<Vec<u8>> {
        canonical_summary(&self.artifact_id, &self.aggregate_result, self.signature.timestamp)
    }
}

/// Signed summary of an aggregate. Field order is fixed by declaration.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalSummary<'a> {
    artifact_id: &'a str,
    merkle_root: &'a Digest,
    unit_count: usize,
    layer_roots: &'a [LayerRoot],
    timestamp: String,
}

/// Canonical JSON summary of `aggregate` for `artifact_id` at `timestamp`.
///
/// The timestamp is rendered at millisecond precision, so a signature
/// timestamp read back from JSON reproduces the same bytes.
pub fn canonical_summary(
    artifact_id: &str,
    aggregate: &AggregateResult,
    timestamp: DateTime<Utc>,
) -> SignerResult<Vec<u8>> {
    let summary = CanonicalSummary {
        artifact_id,
        merkle_root: &aggregate.merkle_root,
        unit_count: aggregate.unit_count,
        layer_roots: &aggregate.layer_roots,
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    Ok(serde_json::to_vec(&summary)?)
}

/// Why a signed artifact failed verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailure {
    /// The referenced capsule is not in the registry.
    CapsuleNotFound,
    /// The signature names a different capsule than the artifact.
    CapsuleMismatch,
    /// A recorded fingerprint does not match the registered capsule.
    FingerprintMismatch,
    /// The signature buffer has an impossible length.
    MalformedSignature,
    /// The signature does not verify over the canonical summary.
    InvalidSignature,
}

impl VerificationFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CapsuleNotFound => "capsule_not_found",
            Self::CapsuleMismatch => "capsule_mismatch",
            Self::FingerprintMismatch => "fingerprint_mismatch",
            Self::MalformedSignature => "malformed_signature",
            Self::InvalidSignature => "invalid_signature",
        }
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying a [`SignedArtifact`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub reason: Option<VerificationFailure>,
}

impl VerificationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: VerificationFailure) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Artifacts signed together, in input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub batch_id: Uuid,
    /// Hash over every signature's bytes, concatenated in input order.
    pub batch_fingerprint: Digest,
    pub results: Vec<SignedArtifact>,
}

/// Fingerprint of a batch: one hash over the signature bytes of `artifacts`
/// concatenated in the given order.
pub fn batch_fingerprint(artifacts: &[SignedArtifact]) -> Digest {
    let parts: Vec<&[u8]> = artifacts.iter().map(|a| a.signature.bytes.as_slice()).collect();
    BATCH_HASHER.hash_parts(&parts, BATCH_FINGERPRINT_LEN)
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
