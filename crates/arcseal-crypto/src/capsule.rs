use std::sync::OnceLock;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use arcseal_types::CapsuleId;

use crate::error::CapsuleError;
use crate::keypair::{KeyAlgorithm, KeyPair, PublicKey};
use crate::primitive::PrimitiveHasher;

/// Bytes of public-key hash shown in a fingerprint.
const FINGERPRINT_BYTES: usize = 16;

/// Current time truncated to millisecond precision.
///
/// Signature timestamps are stored at this precision so they re-serialize to
/// exactly the string that was signed.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Grouped-hex fingerprint of a public key, e.g. `3f9a:0c1e:...`.
///
/// Computed from the public key bytes alone.
pub fn fingerprint(public_key: &PublicKey) -> String {
    let digest = PrimitiveHasher::FINGERPRINT.hash(&public_key.to_bytes(), FINGERPRINT_BYTES);
    digest
        .as_bytes()
        .chunks(2)
        .map(hex::encode)
        .collect::<Vec<_>>()
        .join(":")
}

/// Signature produced by a [`KeyCapsule`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    /// Raw signature bytes, hex on the wire.
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
    pub capsule_uuid: CapsuleId,
    pub fingerprint: String,
    pub timestamp: DateTime<Utc>,
    pub algorithm_tag: String,
}

/// Public, shareable view of a capsule.
///
/// Holds everything needed to verify the capsule's signatures and nothing
/// that allows producing new ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsulePublicInfo {
    pub uuid: CapsuleId,
    pub created_at: DateTime<Utc>,
    pub algorithm: KeyAlgorithm,
    pub public_key: PublicKey,
    pub fingerprint: String,
}

impl CapsulePublicInfo {
    /// Verify `signature` over `data` with this capsule's public key.
    ///
    /// See [`PublicKey::verify`] for the failure semantics.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CapsuleError> {
        self.public_key.verify(data, signature)
    }
}

/// A per-artifact asymmetric key pair.
///
/// The capsule id and creation time exist from construction; the key pair is
/// written exactly once by [`generate`](Self::generate) and never re-derived.
/// Dropping the capsule drops (and zeroizes) the private key.
#[derive(Debug)]
pub struct KeyCapsule {
    uuid: CapsuleId,
    created_at: DateTime<Utc>,
    keys: OnceLock<(KeyPair, CapsulePublicInfo)>,
}

impl KeyCapsule {
    /// A new capsule without key material.
    pub fn new() -> Self {
        Self {
            uuid: CapsuleId::new(),
            created_at: timestamp_now(),
            keys: OnceLock::new(),
        }
    }

    /// Generate the capsule's key pair.
    ///
    /// This is CPU-bound work; async callers should run it on a blocking
    /// thread.
    pub fn generate(&self, algorithm: KeyAlgorithm) -> Result<CapsulePublicInfo, CapsuleError> {
        let pair = KeyPair::generate(algorithm);
        let public_key = pair.public_key();
        let info = CapsulePublicInfo {
            uuid: self.uuid,
            created_at: self.created_at,
            algorithm,
            fingerprint: fingerprint(&public_key),
            public_key,
        };
        self.keys
            .set((pair, info.clone()))
            .map_err(|_| CapsuleError::AlreadyGenerated(self.uuid))?;
        Ok(info)
    }

    /// Convenience constructor: a new capsule with a generated key pair.
    pub fn generated(algorithm: KeyAlgorithm) -> Result<Self, CapsuleError> {
        let capsule = Self::new();
        capsule.generate(algorithm)?;
        Ok(capsule)
    }

    pub fn uuid(&self) -> CapsuleId {
        self.uuid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` once a key pair exists.
    pub fn is_generated(&self) -> bool {
        self.keys.get().is_some()
    }

    /// Public view of the capsule, if a key pair exists.
    pub fn public_info(&self) -> Option<&CapsulePublicInfo> {
        self.keys.get().map(|(_, info)| info)
    }

    /// Sign `data`, stamping the signature with the current time.
    pub fn sign(&self, data: &[u8]) -> Result<Signature, CapsuleError> {
        self.sign_at(data, timestamp_now())
    }

    /// Sign `data`, stamping the signature with `timestamp`.
    ///
    /// Used when the timestamp is itself part of the signed bytes.
    pub fn sign_at(&self, data: &[u8], timestamp: DateTime<Utc>) -> Result<Signature, CapsuleError> {
        let (pair, info) = self
            .keys
            .get()
            .ok_or(CapsuleError::NoPrivateKey(self.uuid))?;
        Ok(Signature {
            bytes: pair.sign(data).to_vec(),
            capsule_uuid: self.uuid,
            fingerprint: info.fingerprint.clone(),
            timestamp,
            algorithm_tag: info.algorithm.tag().to_string(),
        })
    }

    /// Verify `signature` over `data`.
    ///
    /// Returns `Ok(false)` for signatures that do not verify and
    /// [`CapsuleError::MalformedSignature`] only for buffers of impossible
    /// length.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CapsuleError> {
        let info = self
            .public_info()
            .ok_or(CapsuleError::NoPrivateKey(self.uuid))?;
        info.verify(data, signature)
    }
}

impl Default for KeyCapsule {
    fn default() -> Self {
        Self::new()
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
