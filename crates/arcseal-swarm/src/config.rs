use serde::{Deserialize, Serialize};

use arcseal_crypto::SYSTEM_CONSTANT;
use arcseal_types::UnitId;

use crate::error::{SwarmError, SwarmResult};

/// Configuration for the unit pool and the parallel aggregator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Number of units in the pool (1..=26).
    pub pool_size: usize,
    /// Maximum unit tasks running at once.
    pub max_parallel_units: usize,
    /// Minimum successful units for an aggregation to be valid.
    /// `None` means two thirds of the pool, rounded up.
    pub min_quorum: Option<usize>,
    /// Results retained per unit for inspection. `0` disables history.
    pub history_capacity: usize,
    /// Context string from which unit salts, cascade salts, and the system
    /// key are derived. Pools with different contexts produce unrelated
    /// roots.
    pub system_context: String,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            pool_size: UnitId::MAX_UNITS,
            max_parallel_units: UnitId::MAX_UNITS,
            min_quorum: None,
            history_capacity: 16,
            system_context: SYSTEM_CONSTANT.to_string(),
        }
    }
}

impl SwarmConfig {
    /// Default configuration with a different pool size.
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self {
            pool_size,
            max_parallel_units: pool_size.max(1),
            ..Default::default()
        }
    }

    /// Quorum required for a pool of `pool_len` units.
    ///
    /// An explicit `min_quorum` larger than the pool is capped at the pool
    /// size, so a fully healthy pool always reaches quorum.
    pub fn quorum_for(&self, pool_len: usize) -> usize {
        self.min_quorum
            .unwrap_or_else(|| (2 * pool_len).div_ceil(3))
            .min(pool_len)
            .max(1)
    }

    /// Check the configuration for values that can never work.
    pub fn validate(&self) -> SwarmResult<()> {
        if self.pool_size == 0 || self.pool_size > UnitId::MAX_UNITS {
            return Err(SwarmError::InvalidPoolSize {
                requested: self.pool_size,
                max: UnitId::MAX_UNITS,
            });
        }
        if self.max_parallel_units == 0 {
            return Err(SwarmError::InvalidConfig(
                "max_parallel_units must be at least 1".into(),
            ));
        }
        if let Some(q) = self.min_quorum {
            if q == 0 || q > self.pool_size {
                return Err(SwarmError::InvalidConfig(format!(
                    "min_quorum {q} must be between 1 and pool_size {}",
                    self.pool_size
                )));
            }
        }
        if self.system_context.is_empty() {
            return Err(SwarmError::InvalidConfig(
                "system_context must not be empty".into(),
            ));
        }
        Ok(())
    }
}
