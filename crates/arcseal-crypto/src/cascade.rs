use serde::{Deserialize, Serialize};
use sha3::Digest as _;

use arcseal_types::Digest;

use crate::primitive::{PrimitiveHasher, SYSTEM_CONSTANT};

/// Hash variant used by one cascade round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CascadeVariant {
    #[serde(rename = "sha3-256")]
    Sha3_256,
    #[serde(rename = "sha3-384")]
    Sha3_384,
    #[serde(rename = "sha3-512")]
    Sha3_512,
}

impl CascadeVariant {
    /// Variants in round order.
    pub const ROUNDS: [CascadeVariant; 3] = [
        CascadeVariant::Sha3_256,
        CascadeVariant::Sha3_384,
        CascadeVariant::Sha3_512,
    ];

    /// Wire tag of the variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Sha3_256 => "sha3-256",
            Self::Sha3_384 => "sha3-384",
            Self::Sha3_512 => "sha3-512",
        }
    }

    fn digest(&self, salt: &[u8], input: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha3_256 => sha3::Sha3_256::new()
                .chain_update(salt)
                .chain_update(input)
                .finalize()
                .to_vec(),
            Self::Sha3_384 => sha3::Sha3_384::new()
                .chain_update(salt)
                .chain_update(input)
                .finalize()
                .to_vec(),
            Self::Sha3_512 => sha3::Sha3_512::new()
                .chain_update(salt)
                .chain_update(input)
                .finalize()
                .to_vec(),
        }
    }
}

/// Output of one cascade round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeRound {
    /// 0-based round index.
    pub round: u8,
    /// Variant used for the round.
    pub variant: CascadeVariant,
    /// Round output, which is also the next round's input.
    pub digest: Digest,
}

/// Result of a plain cascade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOutput {
    /// Output of the last round.
    pub final_digest: Digest,
    /// Every round's output, in round order.
    pub intermediates: Vec<CascadeRound>,
}

/// Result of a cascade followed by amplification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplifiedOutput {
    #[serde(flatten)]
    pub base: CascadeOutput,
    /// `base.final_digest` with every byte perturbed.
    pub amplified: Digest,
    pub exponent: u32,
}

/// Three-round salted SHA-3 cascade.
///
/// Round `i` hashes `salt_i || input_i` with the `i`-th variant of
/// [`CascadeVariant::ROUNDS`]; round `i`'s output is round `i + 1`'s input.
/// Salts are derived once from a system context and the round index.
#[derive(Clone, Debug)]
pub struct CascadeHasher {
    salts: [Digest; 3],
}

impl CascadeHasher {
    /// Cascade salted for the given system context.
    pub fn new(context: &str) -> Self {
        let salt = |round: u8| {
            PrimitiveHasher::DEFAULT.hash_parts(
                &[context.as_bytes(), b":cascade-round:", &[round]],
                32,
            )
        };
        Self {
            salts: [salt(0), salt(1), salt(2)],
        }
    }

    /// Salt used by round `round`.
    pub fn salt(&self, round: usize) -> Option<&Digest> {
        self.salts.get(round)
    }

    /// Run the three rounds over `data`.
    pub fn hash(&self, data: &[u8]) -> CascadeOutput {
        let mut intermediates = Vec::with_capacity(CascadeVariant::ROUNDS.len());
        let mut current = data.to_vec();

        for (round, variant) in CascadeVariant::ROUNDS.iter().enumerate() {
            current = variant.digest(self.salts[round].as_bytes(), &current);
            intermediates.push(CascadeRound {
                round: round as u8,
                variant: *variant,
                digest: Digest::from_vec(current.clone()),
            });
        }

        CascadeOutput {
            final_digest: Digest::from_vec(current),
            intermediates,
        }
    }

    /// Run the cascade, then amplify its final digest with `exponent`.
    pub fn hash_with_amplification(&self, data: &[u8], exponent: u32) -> AmplifiedOutput {
        let base = self.hash(data);
        let amplified = amplify(&base.final_digest, exponent);
        AmplifiedOutput {
            base,
            amplified,
            exponent,
        }
    }
}

impl Default for CascadeHasher {
    fn default() -> Self {
        Self::new(SYSTEM_CONSTANT)
    }
}

/// Perturb every byte of `digest` with a golden-ratio sequence.
///
/// Uses the identity `phi^n = F(n) * phi + F(n - 1)`: the integer pair
/// `(F(n), F(n + 1))` stands in for `phi^n`, so the transform is exact
/// integer arithmetic (all Fibonacci values are taken mod 2^64). The
/// multiplier is forced odd and byte `i` is offset by a fold of
/// `F(n + i + 1)`.
pub fn amplify(digest: &Digest, exponent: u32) -> Digest {
    let (f_n, mut next) = fibonacci_pair(u64::from(exponent));
    let multiplier = (f_n as u8) | 1;
    let mut prev = f_n;

    let out = digest
        .as_bytes()
        .iter()
        .map(|byte| {
            let offset = (next ^ (next >> 29)) as u8;
            let (a, b) = (next, prev.wrapping_add(next));
            prev = a;
            next = b;
            byte.wrapping_mul(multiplier).wrapping_add(offset)
        })
        .collect();

    Digest::from_vec(out)
}

/// `(F(n), F(n + 1))` mod 2^64 by fast doubling.
fn fibonacci_pair(n: u64) -> (u64, u64) {
    if n == 0 {
        return (0, 1);
    }
    let (a, b) = fibonacci_pair(n / 2);
    let c = a.wrapping_mul(b.wrapping_mul(2).wrapping_sub(a));
    let d = a.wrapping_mul(a).wrapping_add(b.wrapping_mul(b));
    if n % 2 == 0 {
        (c, d)
    } else {
        (d, c.wrapping_add(d))
    }
}
