//! Unit pool and parallel aggregator for Arcseal.
//!
//! A pool holds up to 26 units (`A` to `Z`), each with a fixed layer,
//! weight, salt and amplification exponent. The aggregator hashes a payload
//! through every unit concurrently and folds the per-unit digests into
//! per-layer roots and one 64-byte aggregate root. The fold is sorted, so
//! the root never depends on which unit finished first.
//!
//! # Quick Start
//!
//! ```rust
//! use arcseal_swarm::{ParallelAggregator, SwarmConfig, UnitPool};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let pool = UnitPool::create(26).unwrap();
//! let aggregator = ParallelAggregator::new(SwarmConfig::default()).unwrap();
//! let result = rt.block_on(aggregator.process(b"hello-world", &pool)).unwrap();
//! assert_eq!(result.unit_count, 26);
//! assert_eq!(result.merkle_root.len(), 64);
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod matrix;
pub mod pipeline;
pub mod unit;

pub use aggregator::{AggregateResult, LayerRoot, ParallelAggregator, LAYER_ROOT_LEN, MERKLE_ROOT_LEN};
pub use config::SwarmConfig;
pub use error::{SwarmError, SwarmResult};
pub use matrix::{UnitSpec, UNIT_MATRIX};
pub use pipeline::{CascadePipeline, UnitPipeline, FINAL_DIGEST_LEN, PRIMITIVE_DIGEST_LEN};
pub use unit::{HashResult, PoolDescriptor, Unit, UnitDescriptor, UnitPool, PHI};
