//! Capsule registry: where verifiers find the public half of a capsule.

use std::collections::HashMap;
use std::sync::RwLock;

use arcseal_crypto::CapsulePublicInfo;
use arcseal_types::CapsuleId;

use crate::error::{SignerError, SignerResult};

/// Storage for the public halves of signing capsules.
///
/// Entries are insert-only: a capsule registered once is never replaced or
/// mutated. Private keys are never stored.
pub trait CapsuleRegistry: Send + Sync {
    /// Register a capsule. Fails with [`SignerError::DuplicateCapsule`] if
    /// the id is already present.
    fn insert(&self, info: CapsulePublicInfo) -> SignerResult<()>;

    /// Look up a capsule by id.
    ///
    /// Returns `Ok(None)` if it was never registered.
    fn get(&self, id: &CapsuleId) -> SignerResult<Option<CapsulePublicInfo>>;

    /// Number of registered capsules.
    fn len(&self) -> SignerResult<usize>;

    fn is_empty(&self) -> SignerResult<bool> {
        Ok(self.len()? == 0)
    }

    fn contains(&self, id: &CapsuleId) -> SignerResult<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// A [`CapsuleRegistry`] held in a `HashMap` behind a `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryCapsuleRegistry {
    capsules: RwLock<HashMap<CapsuleId, CapsulePublicInfo>>,
}

impl InMemoryCapsuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> SignerError {
    SignerError::Registry(format!("lock poisoned: {e}"))
}

impl CapsuleRegistry for InMemoryCapsuleRegistry {
    fn insert(&self, info: CapsulePublicInfo) -> SignerResult<()> {
        let mut capsules = self.capsules.write().map_err(poisoned)?;
        if capsules.contains_key(&info.uuid) {
            return Err(SignerError::DuplicateCapsule(info.uuid));
        }
        capsules.insert(info.uuid, info);
        Ok(())
    }

    fn get(&self, id: &CapsuleId) -> SignerResult<Option<CapsulePublicInfo>> {
        let capsules = self.capsules.read().map_err(poisoned)?;
        Ok(capsules.get(id).cloned())
    }

    fn len(&self) -> SignerResult<usize> {
        Ok(self.capsules.read().map_err(poisoned)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcseal_crypto::{KeyAlgorithm, KeyCapsule};

    fn info() -> CapsulePublicInfo {
        let capsule = KeyCapsule::new();
        capsule.generate(KeyAlgorithm::Ed25519).unwrap()
    }

    #[test]
    fn insert_then_get() {
        let registry = InMemoryCapsuleRegistry::new();
        assert!(registry.is_empty().unwrap());
        let info = info();
        registry.insert(info.clone()).unwrap();
        assert_eq!(registry.get(&info.uuid).unwrap(), Some(info.clone()));
        assert!(registry.contains(&info.uuid).unwrap());
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn unknown_id_is_none() {
        let registry = InMemoryCapsuleRegistry::new();
        assert_eq!(registry.get(&CapsuleId::new()).unwrap(), None);
    }

    #[test]
    fn entries_are_never_replaced() {
        let registry = InMemoryCapsuleRegistry::new();
        let info = info();
        registry.insert(info.clone()).unwrap();
        let err = registry.insert(info.clone()).unwrap_err();
        assert!(matches!(err, SignerError::DuplicateCapsule(id) if id == info.uuid));
        assert_eq!(registry.len().unwrap(), 1);
    }
}
