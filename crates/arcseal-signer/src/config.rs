use std::path::Path;

use serde::{Deserialize, Serialize};

use arcseal_crypto::KeyAlgorithm;
use arcseal_swarm::SwarmConfig;

use crate::error::{SignerError, SignerResult};

/// Configuration for the [`SigningService`](crate::SigningService).
///
/// Every field has a default, so a partial TOML document is enough:
///
/// ```toml
/// algorithm = "ecdsa-secp256k1"
/// max_concurrent_artifacts = 4
///
/// [swarm]
/// pool_size = 13
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Unit pool and aggregator settings.
    pub swarm: SwarmConfig,
    /// Algorithm for newly generated capsules.
    pub algorithm: KeyAlgorithm,
    /// Artifacts signed at once by a batch.
    pub max_concurrent_artifacts: usize,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            swarm: SwarmConfig::default(),
            algorithm: KeyAlgorithm::Ed25519,
            max_concurrent_artifacts: 8,
        }
    }
}

impl SignerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> SignerResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| SignerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SignerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| SignerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> SignerResult<()> {
        self.swarm
            .validate()
            .map_err(|e| SignerError::Config(e.to_string()))?;
        if self.max_concurrent_artifacts == 0 {
            return Err(SignerError::Config(
                "max_concurrent_artifacts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = SignerConfig::default();
        assert_eq!(c.algorithm, KeyAlgorithm::Ed25519);
        assert_eq!(c.max_concurrent_artifacts, 8);
        assert_eq!(c.swarm.pool_size, 26);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let c = SignerConfig::from_toml_str(
            r#"
            algorithm = "ecdsa-secp256k1"
            max_concurrent_artifacts = 4

            [swarm]
            pool_size = 13
            min_quorum = 10
            "#,
        )
        .unwrap();
        assert_eq!(c.algorithm, KeyAlgorithm::Secp256k1);
        assert_eq!(c.max_concurrent_artifacts, 4);
        assert_eq!(c.swarm.pool_size, 13);
        assert_eq!(c.swarm.min_quorum, Some(10));
        assert_eq!(c.swarm.history_capacity, 16);
    }

    #[test]
    fn accepts_descriptive_algorithm_names() {
        let c = SignerConfig::from_toml_str(r#"algorithm = "asymmetric-general""#).unwrap();
        assert_eq!(c.algorithm, KeyAlgorithm::Secp256k1);
        let c = SignerConfig::from_toml_str(r#"algorithm = "asymmetric-fast""#).unwrap();
        assert_eq!(c.algorithm, KeyAlgorithm::Ed25519);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(SignerConfig::from_toml_str("").unwrap(), SignerConfig::default());
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            SignerConfig::from_toml_str("max_concurrent_artifacts = 0"),
            Err(SignerError::Config(_))
        ));
        assert!(matches!(
            SignerConfig::from_toml_str("[swarm]\npool_size = 40"),
            Err(SignerError::Config(_))
        ));
        assert!(matches!(
            SignerConfig::from_toml_str(r#"algorithm = "rsa""#),
            Err(SignerError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = SignerConfig::load("/nonexistent/arcseal.toml").unwrap_err();
        assert!(err.to_string().contains("arcseal.toml"));
    }
}
