use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use arcseal_crypto::PrimitiveHasher;
use arcseal_types::{Digest, Layer, UnitId};

use crate::config::SwarmConfig;
use crate::error::{SwarmError, SwarmResult};
use crate::matrix::UNIT_MATRIX;

/// Golden ratio in thousandths.
const PHI_MILLI: u64 = 1618;

/// Golden ratio, used for the reported `phi_weight`.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Per-(unit, payload) hashing record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashResult {
    pub unit_id: UnitId,
    pub layer: Layer,
    pub primitive_digest: Digest,
    pub cascade_digest: Digest,
    pub amplified_digest: Digest,
    pub final_digest: Digest,
    pub processing_duration_ms: f64,
}

/// Serializable description of a unit, for audit listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDescriptor {
    pub id: UnitId,
    pub name: String,
    pub layer: Layer,
    pub weight: f64,
    pub phi_weight: f64,
    /// This unit's share of the pool's total phi weight.
    pub phi_share: f64,
    pub exponent: u32,
    pub salt: Digest,
}

/// Serializable summary of a pool: every unit plus the weight total that
/// [`UnitPool::coherence`] normalizes by.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDescriptor {
    pub units: Vec<UnitDescriptor>,
    pub total_phi_weight: f64,
}

/// One member of the hashing pool.
///
/// Identity (id, layer, weight) is fixed at construction, and the salt and
/// amplification exponent are pure functions of it and the system context.
/// The only mutable state is a capped history of past results, which is
/// written after hashing and never read back into it.
#[derive(Debug)]
pub struct Unit {
    id: UnitId,
    name: &'static str,
    layer: Layer,
    weight_milli: u32,
    salt: Digest,
    exponent: u32,
    history_capacity: usize,
    history: Mutex<VecDeque<HashResult>>,
}

impl Unit {
    /// Build the unit at `index` of the default matrix.
    pub fn from_matrix(index: usize, context: &str, history_capacity: usize) -> SwarmResult<Self> {
        let id = UnitId::from_index(index).map_err(|_| SwarmError::InvalidPoolSize {
            requested: index + 1,
            max: UnitId::MAX_UNITS,
        })?;
        let entry = UNIT_MATRIX[index];
        Ok(Self {
            id,
            name: entry.name,
            layer: entry.layer,
            weight_milli: entry.weight_milli,
            salt: derive_salt(id, entry.layer, entry.weight_milli, context),
            exponent: derive_exponent(id, entry.layer, entry.weight_milli),
            history_capacity,
            history: Mutex::new(VecDeque::with_capacity(history_capacity)),
        })
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Positional weight.
    pub fn weight(&self) -> f64 {
        f64::from(self.weight_milli) / 1000.0
    }

    /// Weight scaled by the golden ratio.
    pub fn phi_weight(&self) -> f64 {
        self.weight() * PHI
    }

    /// Salt prepended to every payload this unit hashes.
    pub fn salt(&self) -> &Digest {
        &self.salt
    }

    /// Amplification exponent used by this unit's cascade.
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// Store a result in the capped history, evicting the oldest.
    pub fn record(&self, result: HashResult) {
        if self.history_capacity == 0 {
            return;
        }
        let mut history = self.history.lock().expect("unit history lock poisoned");
        if history.len() == self.history_capacity {
            history.pop_front();
        }
        history.push_back(result);
    }

    /// Most recent result, if any.
    pub fn last_result(&self) -> Option<HashResult> {
        self.history
            .lock()
            .expect("unit history lock poisoned")
            .back()
            .cloned()
    }

    /// Retained results, oldest first.
    pub fn history(&self) -> Vec<HashResult> {
        self.history
            .lock()
            .expect("unit history lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Descriptor of this unit within a pool of total phi weight
    /// `pool_phi_weight`.
    pub fn describe(&self, pool_phi_weight: f64) -> UnitDescriptor {
        let phi_share = if pool_phi_weight > 0.0 {
            self.phi_weight() / pool_phi_weight
        } else {
            0.0
        };
        UnitDescriptor {
            id: self.id,
            name: self.name.to_string(),
            layer: self.layer,
            weight: self.weight(),
            phi_weight: self.phi_weight(),
            phi_share,
            exponent: self.exponent,
            salt: self.salt.clone(),
        }
    }
}

fn derive_salt(id: UnitId, layer: Layer, weight_milli: u32, context: &str) -> Digest {
    let letter = id.letter().to_string();
    let weight = weight_milli.to_string();
    PrimitiveHasher::UNIT.hash_parts(
        &[
            context.as_bytes(),
            b":salt:",
            letter.as_bytes(),
            b":",
            layer.as_str().as_bytes(),
            b":",
            weight.as_bytes(),
        ],
        32,
    )
}

/// `1 + position + 3 * layer_ordinal + floor(phi_weight / 0.1)`.
fn derive_exponent(id: UnitId, layer: Layer, weight_milli: u32) -> u32 {
    let phi_weight_milli = u64::from(weight_milli) * PHI_MILLI / 1000;
    1 + id.index() as u32 + 3 * u32::from(layer.ordinal()) + (phi_weight_milli / 100) as u32
}

/// Fixed-size, indexed pool of units.
#[derive(Debug, Clone)]
pub struct UnitPool {
    units: Vec<Arc<Unit>>,
}

impl UnitPool {
    /// Pool of the first `size` matrix units with default settings.
    pub fn create(size: usize) -> SwarmResult<Self> {
        Self::from_config(&SwarmConfig::with_pool_size(size))
    }

    /// Pool built from a validated configuration.
    pub fn from_config(config: &SwarmConfig) -> SwarmResult<Self> {
        config.validate()?;
        let units = (0..config.pool_size)
            .map(|i| {
                Unit::from_matrix(i, &config.system_context, config.history_capacity).map(Arc::new)
            })
            .collect::<SwarmResult<Vec<_>>>()?;
        debug!(size = units.len(), "unit pool created");
        Ok(Self { units })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units in pool order (ascending id).
    pub fn units(&self) -> &[Arc<Unit>] {
        &self.units
    }

    pub fn get(&self, id: UnitId) -> Option<&Arc<Unit>> {
        self.units.get(id.index())
    }

    /// Distinct layers present in the pool, in fold order.
    pub fn layers(&self) -> Vec<Layer> {
        self.units
            .iter()
            .map(|u| u.layer())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sum of every unit's phi weight.
    pub fn total_phi_weight(&self) -> f64 {
        self.units.iter().map(|u| u.phi_weight()).sum()
    }

    /// Phi-weighted fraction of the pool that produced one of `results`.
    ///
    /// `1.0` when every unit contributed. Heavier units (the quantum layer)
    /// cost more coherence when they drop out. Results from units outside
    /// the pool are ignored and duplicates count once.
    pub fn coherence<'a>(&self, results: impl IntoIterator<Item = &'a HashResult>) -> f64 {
        let total = self.total_phi_weight();
        if total <= 0.0 {
            return 0.0;
        }
        let succeeded: BTreeSet<UnitId> = results.into_iter().map(|r| r.unit_id).collect();
        let contributed: f64 = self
            .units
            .iter()
            .filter(|u| succeeded.contains(&u.id()))
            .map(|u| u.phi_weight())
            .sum();
        contributed / total
    }

    /// Audit listing of every unit.
    pub fn describe(&self) -> PoolDescriptor {
        let total_phi_weight = self.total_phi_weight();
        PoolDescriptor {
            units: self.units.iter().map(|u| u.describe(total_phi_weight)).collect(),
            total_phi_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_for(unit: &Unit, seed: u8) -> HashResult {
        let d = Digest::from_vec(vec![seed; 4]);
        HashResult {
            unit_id: unit.id(),
            layer: unit.layer(),
            primitive_digest: d.clone(),
            cascade_digest: d.clone(),
            amplified_digest: d.clone(),
            final_digest: d,
            processing_duration_ms: 0.0,
        }
    }

    #[test]
    fn default_pool_has_26_units_and_5_layers() {
        let pool = UnitPool::create(26).unwrap();
        assert_eq!(pool.len(), 26);
        assert_eq!(pool.layers(), Layer::ALL.to_vec());
        let letters: String = pool.units().iter().map(|u| u.id().letter()).collect();
        assert_eq!(letters, "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[test]
    fn pool_size_bounds() {
        assert!(matches!(
            UnitPool::create(0),
            Err(SwarmError::InvalidPoolSize { requested: 0, .. })
        ));
        assert!(UnitPool::create(27).is_err());
        assert_eq!(UnitPool::create(1).unwrap().len(), 1);
    }

    #[test]
    fn identity_is_reproducible_across_pools() {
        let a = UnitPool::create(26).unwrap();
        let b = UnitPool::create(26).unwrap();
        assert_eq!(a.describe(), b.describe());
    }

    #[test]
    fn salts_are_unique_and_context_bound() {
        let pool = UnitPool::create(26).unwrap();
        let salts: BTreeSet<String> = pool.units().iter().map(|u| u.salt().to_hex()).collect();
        assert_eq!(salts.len(), 26);

        let other = UnitPool::from_config(&SwarmConfig {
            system_context: "other".into(),
            ..Default::default()
        })
        .unwrap();
        assert_ne!(pool.units()[0].salt(), other.units()[0].salt());
        assert_eq!(pool.units()[0].exponent(), other.units()[0].exponent());
    }

    #[test]
    fn weights_and_phi_weights() {
        let pool = UnitPool::create(26).unwrap();
        let q = pool.get(UnitId::from_letter('Q').unwrap()).unwrap();
        assert_eq!(q.name(), "Quantizer");
        assert_eq!(q.layer(), Layer::Quantum);
        assert!((q.weight() - 1.618).abs() < 1e-12);
        assert!((q.phi_weight() - 1.618 * PHI).abs() < 1e-12);
    }

    #[test]
    fn exponent_derivation() {
        // A: position 0, intelligence (ordinal 2), weight 1.000 -> phi 1.618
        let a = Unit::from_matrix(0, "ctx", 0).unwrap();
        assert_eq!(a.exponent(), 23);
    }

    #[test]
    fn history_is_capped_ring_buffer() {
        let unit = Unit::from_matrix(0, "ctx", 3).unwrap();
        for seed in 0..5u8 {
            unit.record(result_for(&unit, seed));
        }
        let history = unit.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].final_digest.as_bytes(), &[2; 4]);
        assert_eq!(unit.last_result().unwrap().final_digest.as_bytes(), &[4; 4]);
    }

    #[test]
    fn zero_capacity_disables_history() {
        let unit = Unit::from_matrix(0, "ctx", 0).unwrap();
        unit.record(result_for(&unit, 1));
        assert!(unit.last_result().is_none());
    }

    #[test]
    fn descriptor_serializes_camel_case() {
        let pool = UnitPool::create(1).unwrap();
        let json = serde_json::to_value(pool.describe()).unwrap();
        assert_eq!(json["units"][0]["id"], "A");
        assert_eq!(json["units"][0]["name"], "Analyzer");
        assert!(json["units"][0]["phiWeight"].is_number());
        assert_eq!(json["units"][0]["phiShare"], 1.0);
        assert!(json["totalPhiWeight"].is_number());
    }

    #[test]
    fn phi_shares_sum_to_one() {
        let listing = UnitPool::create(26).unwrap().describe();
        let total: f64 = listing.units.iter().map(|u| u.phi_share).sum();
        assert!((total - 1.0).abs() < 1e-9);
        let weights: f64 = listing.units.iter().map(|u| u.phi_weight).sum();
        assert!((weights - listing.total_phi_weight).abs() < 1e-9);
    }

    #[test]
    fn coherence_is_phi_weighted() {
        let pool = UnitPool::create(26).unwrap();
        let all: Vec<HashResult> = pool.units().iter().map(|u| result_for(u, 0)).collect();
        assert!((pool.coherence(&all) - 1.0).abs() < 1e-12);
        assert_eq!(pool.coherence(&[]), 0.0);

        let without = |letter: char| -> Vec<HashResult> {
            all.iter()
                .filter(|r| r.unit_id.letter() != letter)
                .cloned()
                .collect()
        };
        let lost_zenith = pool.coherence(&without('Z'));
        let lost_normalizer = pool.coherence(&without('N'));
        assert!(lost_zenith < lost_normalizer);
        assert!(lost_normalizer < 1.0);

        let z = pool.get(UnitId::from_letter('Z').unwrap()).unwrap();
        let expected = 1.0 - z.phi_weight() / pool.total_phi_weight();
        assert!((lost_zenith - expected).abs() < 1e-12);
    }

    #[test]
    fn coherence_counts_each_unit_once() {
        let pool = UnitPool::create(2).unwrap();
        let a = result_for(&pool.units()[0], 1);
        let twice = vec![a.clone(), a];
        let a_only = pool.units()[0].phi_weight() / pool.total_phi_weight();
        assert!((pool.coherence(&twice) - a_only).abs() < 1e-12);
    }
}
