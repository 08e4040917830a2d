use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CapsuleError;

/// Length of every signature produced by a capsule key pair.
///
/// Ed25519 signatures and fixed-width (`r || s`) secp256k1 ECDSA signatures
/// are both 64 bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Asymmetric algorithm backing a key capsule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    /// Ed25519, the fast default.
    #[default]
    #[serde(rename = "ed25519", alias = "asymmetric-fast")]
    Ed25519,
    /// ECDSA over secp256k1 with RFC 6979 nonces.
    #[serde(rename = "ecdsa-secp256k1", alias = "asymmetric-general")]
    Secp256k1,
}

impl KeyAlgorithm {
    /// Tag recorded in every signature.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::Secp256k1 => "ecdsa-secp256k1",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Private half of a capsule. Both backends zeroize their secret on drop.
pub(crate) enum KeyPair {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
}

impl KeyPair {
    /// Generate a fresh random key pair.
    pub(crate) fn generate(algorithm: KeyAlgorithm) -> Self {
        let mut csprng = rand::thread_rng();
        match algorithm {
            KeyAlgorithm::Ed25519 => Self::Ed25519(ed25519_dalek::SigningKey::generate(&mut csprng)),
            KeyAlgorithm::Secp256k1 => Self::Secp256k1(k256::ecdsa::SigningKey::random(&mut csprng)),
        }
    }

    pub(crate) fn public_key(&self) -> PublicKey {
        match self {
            Self::Ed25519(sk) => PublicKey::Ed25519(sk.verifying_key()),
            Self::Secp256k1(sk) => PublicKey::Secp256k1(sk.verifying_key().clone()),
        }
    }

    pub(crate) fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        match self {
            Self::Ed25519(sk) => {
                use ed25519_dalek::Signer;
                sk.sign(message).to_bytes()
            }
            Self::Secp256k1(sk) => {
                use k256::ecdsa::signature::Signer;
                let sig: k256::ecdsa::Signature = sk.sign(message);
                let mut out = [0u8; SIGNATURE_LEN];
                out.copy_from_slice(&sig.to_bytes());
                out
            }
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair(<redacted>)")
    }
}

/// Public half of a capsule key pair.
#[derive(Clone, PartialEq, Eq)]
pub enum PublicKey {
    Ed25519(ed25519_dalek::VerifyingKey),
    Secp256k1(k256::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// Decode a public key for `algorithm`.
    ///
    /// Ed25519 keys are 32 bytes; secp256k1 keys are SEC1 encoded
    /// (compressed or uncompressed).
    pub fn from_bytes(algorithm: KeyAlgorithm, bytes: &[u8]) -> Result<Self, CapsuleError> {
        match algorithm {
            KeyAlgorithm::Ed25519 => {
                let arr: [u8; 32] = bytes.try_into().map_err(|_| {
                    CapsuleError::InvalidPublicKey(format!(
                        "ed25519 key must be 32 bytes, got {}",
                        bytes.len()
                    ))
                })?;
                ed25519_dalek::VerifyingKey::from_bytes(&arr)
                    .map(Self::Ed25519)
                    .map_err(|e| CapsuleError::InvalidPublicKey(e.to_string()))
            }
            KeyAlgorithm::Secp256k1 => k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                .map(Self::Secp256k1)
                .map_err(|e| CapsuleError::InvalidPublicKey(e.to_string())),
        }
    }

    /// Algorithm of this key.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Ed25519(_) => KeyAlgorithm::Ed25519,
            Self::Secp256k1(_) => KeyAlgorithm::Secp256k1,
        }
    }

    /// Canonical public key bytes (32 bytes for Ed25519, 33-byte compressed
    /// SEC1 point for secp256k1).
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(vk) => vk.to_bytes().to_vec(),
            Self::Secp256k1(vk) => vk.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// Hex-encoded canonical bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify `signature` over `message`.
    ///
    /// Returns `Ok(false)` for any signature that does not verify, including
    /// byte patterns that are not valid signature encodings. Only a buffer of
    /// the wrong length is reported as [`CapsuleError::MalformedSignature`].
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, CapsuleError> {
        let bytes: &[u8; SIGNATURE_LEN] =
            signature
                .try_into()
                .map_err(|_| CapsuleError::MalformedSignature {
                    expected: SIGNATURE_LEN,
                    actual: signature.len(),
                })?;

        let valid = match self {
            Self::Ed25519(vk) => {
                use ed25519_dalek::Verifier;
                let sig = ed25519_dalek::Signature::from_bytes(bytes);
                vk.verify(message, &sig).is_ok()
            }
            Self::Secp256k1(vk) => {
                use k256::ecdsa::signature::Verifier;
                match k256::ecdsa::Signature::from_slice(bytes) {
                    Ok(sig) => vk.verify(message, &sig).is_ok(),
                    Err(_) => false,
                }
            }
        };
        Ok(valid)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}:{})", self.algorithm(), self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
