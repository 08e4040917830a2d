use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Immutable hash output of caller-selected length.
///
/// Digests are produced by the hashers in `arcseal-crypto` and never
/// modified afterwards. They serialize as lowercase hex strings so that the
/// exchange format stays readable and byte-exact.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(Vec<u8>);

impl Digest {
    /// Wrap raw digest bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Digest length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a zero-length digest.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..self.0.len().min(4)])
    }

    /// Parse from a hex string. Upper-case input is accepted.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Number of differing bits between two digests of equal length.
    ///
    /// Returns `None` when the lengths differ.
    pub fn hamming_distance(&self, other: &Digest) -> Option<u32> {
        if self.0.len() != other.0.len() {
            return None;
        }
        Some(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(a, b)| (a ^ b).count_ones())
                .sum(),
        )
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Digest {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}, {} bytes)", self.short_hex(), self.0.len())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hex_is_lowercase() {
        let d = Digest::from_vec(vec![0xAB, 0xCD, 0xEF]);
        assert_eq!(d.to_hex(), "abcdef");
        assert_eq!(format!("{d}"), "abcdef");
    }

    #[test]
    fn upper_case_hex_parses() {
        let d = Digest::from_hex("ABCDEF").unwrap();
        assert_eq!(d.as_bytes(), &[0xab, 0xcd, 0xef]);
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(matches!(
            Digest::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn short_hex_handles_short_digests() {
        assert_eq!(Digest::from_vec(vec![1, 2]).short_hex(), "0102");
        assert_eq!(Digest::from_vec(vec![0; 64]).short_hex().len(), 8);
    }

    #[test]
    fn serializes_as_hex_string() {
        let d = Digest::from_vec(vec![0, 1, 255]);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"0001ff\"");
        let parsed: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn hamming_distance_requires_equal_length() {
        let a = Digest::from_vec(vec![0b1111_0000]);
        let b = Digest::from_vec(vec![0b0000_0000]);
        assert_eq!(a.hamming_distance(&b), Some(4));
        assert_eq!(a.hamming_distance(&Digest::from_vec(vec![0, 0])), None);
    }

    proptest! {
        #[test]
        fn hamming_distance_is_symmetric(
            a in proptest::collection::vec(any::<u8>(), 32),
            b in proptest::collection::vec(any::<u8>(), 32),
        ) {
            let (a, b) = (Digest::from_vec(a), Digest::from_vec(b));
            prop_assert_eq!(a.hamming_distance(&a), Some(0));
            prop_assert_eq!(a.hamming_distance(&b), b.hamming_distance(&a));
        }
    }
}
