//! Sequence Fingerprints
//!
//! SHA-256 digests identifying which country sequence a session played.
//! A cached daily result carries the fingerprint so it can be matched
//! against the puzzle the host regenerates today.

use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type Fingerprint = [u8; 32];

/// Domain separator for sequence fingerprints.
const SEQUENCE_DOMAIN: &[u8] = b"PRIS_EN_FLAG_SEQUENCE_V1";

/// Deterministic hasher with domain separation.
///
/// Order of updates is critical for determinism.
pub struct FingerprintHasher {
    hasher: Sha256,
}

impl FingerprintHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for a played sequence.
    pub fn for_sequence() -> Self {
        Self::new(SEQUENCE_DOMAIN)
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a length-prefixed string, so `["ab","c"]` and `["a","bc"]` differ.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> Fingerprint {
        self.hasher.finalize().into()
    }
}

/// Fingerprint of an ordered code sequence played under a seed string.
pub fn sequence_fingerprint<'a, I>(seed_string: &str, codes: I) -> Fingerprint
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = FingerprintHasher::for_sequence();
    hasher.update_str(seed_string);
    let mut count = 0u32;
    for code in codes {
        hasher.update_str(code);
        count += 1;
    }
    hasher.update_u32(count);
    hasher.finalize()
}

/// Lowercase hex rendering of a fingerprint.
pub fn fingerprint_hex(fingerprint: &Fingerprint) -> String {
    hex::encode(fingerprint)
}
