use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use arcseal_crypto::{timestamp_now, CapsuleError, KeyCapsule};
use arcseal_swarm::{AggregateResult, ParallelAggregator, UnitPool};

use crate::artifact::{
    batch_fingerprint, canonical_summary, BatchResult, SignedArtifact, VerificationFailure,
    VerificationResult,
};
use crate::config::SignerConfig;
use crate::error::{SignerError, SignerResult};
use crate::registry::{CapsuleRegistry, InMemoryCapsuleRegistry};

/// Signs artifacts with single-use key capsules and verifies them later.
///
/// Every signature comes from a fresh capsule whose public half is kept in
/// the registry and whose private key is dropped as soon as the signature
/// exists. Cloning is cheap and clones share the pool and registry.
#[derive(Clone)]
pub struct SigningService {
    config: SignerConfig,
    pool: UnitPool,
    aggregator: Arc<ParallelAggregator>,
    registry: Arc<dyn CapsuleRegistry>,
}

impl SigningService {
    /// Service with an in-memory registry.
    pub fn new(config: SignerConfig) -> SignerResult<Self> {
        Self::with_registry(config, Arc::new(InMemoryCapsuleRegistry::new()))
    }

    /// Service backed by the given registry.
    pub fn with_registry(config: SignerConfig, registry: Arc<dyn CapsuleRegistry>) -> SignerResult<Self> {
        config.validate()?;
        let pool = UnitPool::from_config(&config.swarm)?;
        let aggregator = ParallelAggregator::new(config.swarm.clone())?;
        Ok(Self {
            config,
            pool,
            aggregator: Arc::new(aggregator),
            registry,
        })
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    pub fn pool(&self) -> &UnitPool {
        &self.pool
    }

    pub fn registry(&self) -> &Arc<dyn CapsuleRegistry> {
        &self.registry
    }

    /// Aggregate `data` over the pool without signing.
    pub async fn flash_sync_hash(&self, data: &[u8]) -> SignerResult<AggregateResult> {
        Ok(self.aggregator.process(data, &self.pool).await?)
    }

    /// Aggregate `data`, sign the canonical summary with a fresh capsule and
    /// register the capsule's public half.
    pub async fn sign_artifact(&self, data: &[u8], artifact_id: &str) -> SignerResult<SignedArtifact> {
        let algorithm = self.config.algorithm;
        let keygen = async {
            tokio::task::spawn_blocking(move || KeyCapsule::generated(algorithm))
                .await
                .map_err(|e| SignerError::TaskJoin(e.to_string()))?
                .map_err(SignerError::from)
        };
        let (capsule, aggregate) = tokio::try_join!(keygen, self.flash_sync_hash(data))?;

        let timestamp = timestamp_now();
        let summary = canonical_summary(artifact_id, &aggregate, timestamp)?;
        let signature = capsule.sign_at(&summary, timestamp)?;
        let info = capsule
            .public_info()
            .cloned()
            .ok_or(CapsuleError::NoPrivateKey(capsule.uuid()))?;
        drop(capsule);

        let signed = SignedArtifact {
            artifact_id: artifact_id.to_string(),
            capsule_uuid: info.uuid,
            capsule_fingerprint: info.fingerprint.clone(),
            aggregate_result: aggregate,
            signature,
        };
        self.registry.insert(info)?;

        info!(
            artifact_id,
            capsule = %signed.capsule_uuid.short_id(),
            root = %signed.aggregate_result.merkle_root.short_hex(),
            units = signed.aggregate_result.unit_count,
            "artifact signed"
        );
        Ok(signed)
    }

    /// Check `signed` against its registered capsule.
    ///
    /// Verification failures are reported in the result; only registry or
    /// serialization faults are errors.
    pub async fn verify_artifact(&self, signed: &SignedArtifact) -> SignerResult<VerificationResult> {
        let Some(info) = self.registry.get(&signed.capsule_uuid)? else {
            debug!(capsule = %signed.capsule_uuid, "verification against unknown capsule");
            return Ok(VerificationResult::invalid(VerificationFailure::CapsuleNotFound));
        };
        if signed.signature.capsule_uuid != info.uuid {
            return Ok(VerificationResult::invalid(VerificationFailure::CapsuleMismatch));
        }
        if signed.capsule_fingerprint != info.fingerprint || signed.signature.fingerprint != info.fingerprint {
            return Ok(VerificationResult::invalid(VerificationFailure::FingerprintMismatch));
        }

        // The summary renders milliseconds only; finer precision would be
        // carried on the wire without being signed.
        if signed.signature.timestamp.timestamp_subsec_nanos() % 1_000_000 != 0 {
            warn!(artifact_id = %signed.artifact_id, "signature timestamp finer than milliseconds");
            return Ok(VerificationResult::invalid(VerificationFailure::InvalidSignature));
        }

        let summary = signed.canonical_bytes()?;
        let result = match info.verify(&summary, &signed.signature.bytes) {
            Ok(true) => VerificationResult::valid(),
            Ok(false) => VerificationResult::invalid(VerificationFailure::InvalidSignature),
            Err(CapsuleError::MalformedSignature { .. }) => {
                VerificationResult::invalid(VerificationFailure::MalformedSignature)
            }
            Err(err) => return Err(err.into()),
        };
        if let Some(reason) = result.reason {
            warn!(artifact_id = %signed.artifact_id, %reason, "artifact failed verification");
        }
        Ok(result)
    }

    /// Sign every `(data, artifact_id)` item concurrently.
    ///
    /// Results keep input order and the batch fingerprint depends on it. The
    /// batch fails as a whole on the first failed item; remaining items are
    /// aborted.
    pub async fn batch_sign(&self, items: Vec<(Vec<u8>, String)>) -> SignerResult<BatchResult> {
        let batch_id = Uuid::now_v7();
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_artifacts));
        let mut tasks = JoinSet::new();
        let total = items.len();

        for (index, (data, artifact_id)) in items.into_iter().enumerate() {
            let service = self.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| SignerError::TaskJoin(e.to_string()))?;
                let signed = service.sign_artifact(&data, &artifact_id).await?;
                Ok::<_, SignerError>((index, signed))
            });
        }

        let mut slots: Vec<Option<SignedArtifact>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            let (index, signed) = joined.map_err(|e| SignerError::TaskJoin(e.to_string()))??;
            slots[index] = Some(signed);
        }
        let results = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| SignerError::TaskJoin("batch item produced no result".into()))?;

        let fingerprint = batch_fingerprint(&results);
        info!(%batch_id, items = results.len(), fingerprint = %fingerprint.short_hex(), "batch signed");
        Ok(BatchResult {
            batch_id,
            batch_fingerprint: fingerprint,
            results,
        })
    }
}

impl std::fmt::Debug for SigningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningService")
            .field("config", &self.config)
            .field("pool_size", &self.pool.len())
            .finish()
    }
}
