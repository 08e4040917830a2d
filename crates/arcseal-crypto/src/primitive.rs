use arcseal_types::Digest;

/// BLAKE3 key-derivation context for turning arbitrary key material into a
/// 32-byte BLAKE3 key.
const KEYED_HASH_CONTEXT: &str = "arcseal 2025-01 primitive keyed-hash v1";

/// BLAKE3 key-derivation context for the system key.
const SYSTEM_KEY_CONTEXT: &str = "arcseal 2025-01 system key v1";

/// Default system context mixed into unit salts, cascade salts, and the
/// system key.
pub const SYSTEM_CONSTANT: &str = "arcseal.epoch1.v3";

/// Domain-separated BLAKE3 hasher with extendable output.
///
/// Every hasher carries a domain tag prepended to each computation, so the
/// same bytes hashed for different purposes never collide. Output length is
/// chosen by the caller; BLAKE3's XOF mode makes it independent of the
/// internal block size.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveHasher {
    domain: &'static str,
}

impl PrimitiveHasher {
    /// General-purpose hasher.
    pub const DEFAULT: Self = Self {
        domain: "arcseal-primitive-v1",
    };
    /// Hasher for per-unit primitive digests.
    pub const UNIT: Self = Self {
        domain: "arcseal-unit-v1",
    };
    /// Hasher for layer roots and the aggregate root.
    pub const AGGREGATE: Self = Self {
        domain: "arcseal-aggregate-v1",
    };
    /// Hasher for public-key fingerprints.
    pub const FINGERPRINT: Self = Self {
        domain: "arcseal-fingerprint-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash `data` to `output_len` bytes.
    pub fn hash(&self, data: &[u8], output_len: usize) -> Digest {
        let mut hasher = blake3::Hasher::new();
        self.absorb(&mut hasher, data);
        Self::squeeze(&hasher, output_len)
    }

    /// Hash `data` under `key` to `output_len` bytes.
    ///
    /// Key material of any length is accepted; it is first reduced to a
    /// BLAKE3 key with the key-derivation mode, then used in keyed mode.
    pub fn keyed_hash(&self, key: &[u8], data: &[u8], output_len: usize) -> Digest {
        let derived = blake3::derive_key(KEYED_HASH_CONTEXT, key);
        let mut hasher = blake3::Hasher::new_keyed(&derived);
        self.absorb(&mut hasher, data);
        Self::squeeze(&hasher, output_len)
    }

    /// Hash the concatenation of `parts` without materializing it.
    pub fn hash_parts(&self, parts: &[&[u8]], output_len: usize) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            hasher.update(part);
        }
        Self::squeeze(&hasher, output_len)
    }

    /// Keyed variant of [`hash_parts`](Self::hash_parts).
    pub fn keyed_hash_parts(&self, key: &[u8], parts: &[&[u8]], output_len: usize) -> Digest {
        let derived = blake3::derive_key(KEYED_HASH_CONTEXT, key);
        let mut hasher = blake3::Hasher::new_keyed(&derived);
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            hasher.update(part);
        }
        Self::squeeze(&hasher, output_len)
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }

    fn absorb(&self, hasher: &mut blake3::Hasher, data: &[u8]) {
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
    }

    fn squeeze(hasher: &blake3::Hasher, output_len: usize) -> Digest {
        let mut out = vec![0u8; output_len];
        hasher.finalize_xof().fill(&mut out);
        Digest::from_vec(out)
    }
}

/// Key bound into unit final digests and the aggregate root.
///
/// Derived deterministically from a system context string so independent
/// deployments configured with the same context produce identical roots.
#[derive(Clone, PartialEq, Eq)]
pub struct SystemKey([u8; 32]);

impl SystemKey {
    /// Derive the system key for a context string.
    pub fn derive(context: &str) -> Self {
        Self(blake3::derive_key(SYSTEM_KEY_CONTEXT, context.as_bytes()))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Default for SystemKey {
    fn default() -> Self {
        Self::derive(SYSTEM_CONSTANT)
    }
}

impl std::fmt::Debug for SystemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SystemKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_is_deterministic() {
        let d1 = PrimitiveHasher::DEFAULT.hash(b"hello world", 64);
        let d2 = PrimitiveHasher::DEFAULT.hash(b"hello world", 64);
        assert_eq!(d1, d2);
    }

    #[test]
    fn output_length_is_caller_selected() {
        for len in [0, 1, 16, 32, 33, 64, 200] {
            assert_eq!(PrimitiveHasher::DEFAULT.hash(b"x", len).len(), len);
        }
    }

    #[test]
    fn shorter_output_is_prefix_of_longer() {
        let short = PrimitiveHasher::DEFAULT.hash(b"xof", 32);
        let long = PrimitiveHasher::DEFAULT.hash(b"xof", 128);
        assert_eq!(short.as_bytes(), &long.as_bytes()[..32]);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let a = PrimitiveHasher::UNIT.hash(b"same", 32);
        let b = PrimitiveHasher::AGGREGATE.hash(b"same", 32);
        assert_ne!(a, b);
    }

    #[test]
    fn keyed_hash_differs_from_unkeyed_and_across_keys() {
        let plain = PrimitiveHasher::DEFAULT.hash(b"data", 32);
        let k1 = PrimitiveHasher::DEFAULT.keyed_hash(b"key-one", b"data", 32);
        let k2 = PrimitiveHasher::DEFAULT.keyed_hash(b"key-two", b"data", 32);
        assert_ne!(plain, k1);
        assert_ne!(k1, k2);
    }

    #[test]
    fn hash_parts_matches_concatenation() {
        let joined = PrimitiveHasher::UNIT.hash(b"abcdef", 48);
        let parts = PrimitiveHasher::UNIT.hash_parts(&[b"ab", b"cd", b"ef"], 48);
        assert_eq!(joined, parts);

        let key = SystemKey::default();
        let joined = PrimitiveHasher::AGGREGATE.keyed_hash(key.as_bytes(), b"abcdef", 64);
        let parts =
            PrimitiveHasher::AGGREGATE.keyed_hash_parts(key.as_bytes(), &[b"abc", b"def"], 64);
        assert_eq!(joined, parts);
    }

    #[test]
    fn avalanche_flips_about_half_the_bits() {
        let mut total_bits = 0u32;
        let mut flipped = 0u32;
        for i in 0u32..64 {
            let a = format!("payload-{i:04}-a");
            let b = format!("payload-{i:04}-b");
            let da = PrimitiveHasher::DEFAULT.hash(a.as_bytes(), 64);
            let db = PrimitiveHasher::DEFAULT.hash(b.as_bytes(), 64);
            flipped += da.hamming_distance(&db).unwrap();
            total_bits += 64 * 8;
        }
        let ratio = f64::from(flipped) / f64::from(total_bits);
        assert!((0.45..0.55).contains(&ratio), "flip ratio {ratio}");
    }

    #[test]
    fn system_key_depends_on_context() {
        assert_eq!(SystemKey::derive("a"), SystemKey::derive("a"));
        assert_ne!(SystemKey::derive("a"), SystemKey::derive("b"));
        assert!(format!("{:?}", SystemKey::default()).contains("redacted"));
    }

    #[test]
    fn known_answers() {
        assert_eq!(
            PrimitiveHasher::DEFAULT.hash(b"hello-world", 32).to_hex(),
            "e3749683b3c4d1a49085795df30879f728665c2bbbb4b33b3e8f0ee19065f22d"
        );
        assert_eq!(
            PrimitiveHasher::DEFAULT.hash(b"hello-world", 64).to_hex(),
            "e3749683b3c4d1a49085795df30879f728665c2bbbb4b33b3e8f0ee19065f22d\
             a77d8c57fc398ab641ce9376c802fd2ff4085308a8537a01471727e8de652b04"
        );
        assert_eq!(
            PrimitiveHasher::DEFAULT
                .keyed_hash(b"key", b"hello-world", 32)
                .to_hex(),
            "404648872a2c45a2fc6169abb297a21e7daf605366a790952216eadd3eb08eea"
        );
        assert_eq!(
            hex::encode(SystemKey::default().as_bytes()),
            "501120f313a610e3e5d39e2c92affaf81304f6e812f537db0fb8f66c00ef14a6"
        );
    }

    proptest! {
        #[test]
        fn hash_is_pure(data in proptest::collection::vec(any::<u8>(), 0..512), len in 1usize..128) {
            prop_assert_eq!(
                PrimitiveHasher::DEFAULT.hash(&data, len),
                PrimitiveHasher::DEFAULT.hash(&data, len)
            );
        }

        #[test]
        fn distinct_inputs_give_distinct_digests(
            a in proptest::collection::vec(any::<u8>(), 1..64),
            b in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(
                PrimitiveHasher::DEFAULT.hash(&a, 32),
                PrimitiveHasher::DEFAULT.hash(&b, 32)
            );
        }
    }
}
