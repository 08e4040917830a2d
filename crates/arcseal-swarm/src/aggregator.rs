use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use arcseal_crypto::{PrimitiveHasher, SystemKey};
use arcseal_types::{Digest, Layer};

use crate::config::SwarmConfig;
use crate::error::{SwarmError, SwarmResult};
use crate::pipeline::{CascadePipeline, UnitPipeline};
use crate::unit::{HashResult, UnitPool};

/// Length of each layer root.
pub const LAYER_ROOT_LEN: usize = 32;

/// Length of the aggregate root.
pub const MERKLE_ROOT_LEN: usize = 64;

/// Root digest of one layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRoot {
    pub layer: Layer,
    pub root: Digest,
}

/// Result of aggregating one payload across a unit pool.
///
/// Only `merkle_root`, `layer_roots` and `unit_count` are part of the wire
/// form and of equality; timing and per-unit results are local detail.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub merkle_root: Digest,
    /// Layer roots in fold order. Layers with no successful unit are absent.
    pub layer_roots: Vec<LayerRoot>,
    pub unit_count: usize,
    #[serde(skip)]
    pub total_duration: Duration,
    /// Successful unit results, ascending unit id.
    #[serde(skip)]
    pub unit_results: Vec<HashResult>,
}

impl AggregateResult {
    /// Fold unit results into layer roots and the aggregate root.
    ///
    /// Results may arrive in any order: members are sorted by unit id inside
    /// each layer and layers are folded in their declared order.
    pub fn fold(system_key: &SystemKey, mut results: Vec<HashResult>, total_duration: Duration) -> Self {
        results.sort_by_key(|r| r.unit_id);

        let mut by_layer: BTreeMap<Layer, Vec<&[u8]>> = BTreeMap::new();
        for result in &results {
            by_layer
                .entry(result.layer)
                .or_default()
                .push(result.final_digest.as_bytes());
        }

        let layer_roots: Vec<LayerRoot> = by_layer
            .into_iter()
            .map(|(layer, finals)| {
                let mut parts: Vec<&[u8]> = Vec::with_capacity(finals.len() + 2);
                parts.push(b"layer:");
                parts.push(layer.as_str().as_bytes());
                parts.extend(finals);
                LayerRoot {
                    layer,
                    root: PrimitiveHasher::AGGREGATE.hash_parts(&parts, LAYER_ROOT_LEN),
                }
            })
            .collect();

        let roots: Vec<&[u8]> = layer_roots.iter().map(|l| l.root.as_bytes()).collect();
        let merkle_root =
            PrimitiveHasher::AGGREGATE.keyed_hash_parts(system_key.as_bytes(), &roots, MERKLE_ROOT_LEN);

        Self {
            merkle_root,
            layer_roots,
            unit_count: results.len(),
            total_duration,
            unit_results: results,
        }
    }

    /// Root of `layer`, if any unit of that layer succeeded.
    pub fn layer_root(&self, layer: Layer) -> Option<&Digest> {
        self.layer_roots
            .iter()
            .find(|l| l.layer == layer)
            .map(|l| &l.root)
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.total_duration.as_secs_f64() * 1000.0
    }
}

impl PartialEq for AggregateResult {
    fn eq(&self, other: &Self) -> bool {
        self.merkle_root == other.merkle_root
            && self.layer_roots == other.layer_roots
            && self.unit_count == other.unit_count
    }
}

impl Eq for AggregateResult {}

/// Fans a payload out to every unit of a pool and folds the results.
///
/// Each unit runs on the blocking thread pool, at most
/// `max_parallel_units` at a time. A unit whose task fails is logged and
/// left out; if fewer than the quorum succeed the aggregation fails as a
/// whole. Dropping the future returned by [`process`](Self::process) aborts
/// outstanding unit tasks and yields nothing.
pub struct ParallelAggregator<P = CascadePipeline> {
    pipeline: Arc<P>,
    system_key: SystemKey,
    config: SwarmConfig,
}

impl ParallelAggregator<CascadePipeline> {
    /// Aggregator using the standard cascade pipeline.
    pub fn new(config: SwarmConfig) -> SwarmResult<Self> {
        let pipeline = CascadePipeline::new(&config.system_context);
        Self::with_pipeline(config, pipeline)
    }
}

impl<P: UnitPipeline> ParallelAggregator<P> {
    /// Aggregator using a custom pipeline.
    pub fn with_pipeline(config: SwarmConfig, pipeline: P) -> SwarmResult<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            system_key: SystemKey::derive(&config.system_context),
            config,
        })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Hash `payload` through every unit of `pool` and fold the results.
    pub async fn process(&self, payload: &[u8], pool: &UnitPool) -> SwarmResult<AggregateResult> {
        let started = Instant::now();
        let payload: Arc<[u8]> = Arc::from(payload);
        let permits = Arc::new(Semaphore::new(self.config.max_parallel_units));
        let mut tasks = JoinSet::new();

        for unit in pool.units() {
            let unit = Arc::clone(unit);
            let payload = Arc::clone(&payload);
            let pipeline = Arc::clone(&self.pipeline);
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                let id = unit.id();
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| SwarmError::UnitTaskFailure {
                        unit: id,
                        reason: e.to_string(),
                    })?;
                tokio::task::spawn_blocking(move || -> SwarmResult<HashResult> {
                    let result = pipeline.digest(&unit, &payload)?;
                    unit.record(result.clone());
                    Ok(result)
                })
                .await
                .map_err(|e| SwarmError::UnitTaskFailure {
                    unit: id,
                    reason: e.to_string(),
                })?
            });
        }

        let mut results = Vec::with_capacity(pool.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(err)) => warn!(error = %err, "unit excluded from aggregation"),
                Err(err) => warn!(error = %err, "unit task aborted, excluded from aggregation"),
            }
        }

        let required = self.config.quorum_for(pool.len());
        if results.len() < required {
            warn!(succeeded = results.len(), required, "aggregation below quorum");
            return Err(SwarmError::InsufficientUnits {
                succeeded: results.len(),
                required,
            });
        }
        if results.len() < pool.len() {
            debug!(
                succeeded = results.len(),
                pool = pool.len(),
                "aggregating with reduced unit count"
            );
        }

        let aggregate = AggregateResult::fold(&self.system_key, results, started.elapsed());
        info!(
            root = %aggregate.merkle_root.short_hex(),
            units = aggregate.unit_count,
            layers = aggregate.layer_roots.len(),
            coherence = pool.coherence(&aggregate.unit_results),
            "aggregation complete"
        );
        Ok(aggregate)
    }
}

impl<P> std::fmt::Debug for ParallelAggregator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelAggregator")
            .field("config", &self.config)
            .finish()
    }
}
