//! Deterministic Random Number Generation
//!
//! Uses the Mulberry32 algorithm for fast, fully reproducible 32-bit randomness.
//! Given the same seed, produces the identical sequence on every client.
//!
//! Free play draws from an entropy-backed source instead, but goes through the
//! same [`RandomSource`] seam so selection logic never knows which one it has.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Mulberry32 increment (Weyl sequence step).
const MULBERRY_STEP: u32 = 0x6D2B_79F5;

/// A source of 32-bit random words plus the derived helpers the engine needs.
pub trait RandomSource {
    /// Generate the next 32-bit random value.
    fn next_u32(&mut self) -> u32;

    /// Generate a random integer in range [0, max).
    ///
    /// Scales the 32-bit word into the range, equivalent to
    /// `floor(next_f64() * max)` without float rounding.
    #[inline]
    fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }

    /// Generate a random float in range [0, 1).
    #[inline]
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Shuffle a slice in place using Fisher-Yates algorithm.
    fn shuffle<T>(&mut self, slice: &mut [T])
    where
        Self: Sized,
    {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_int((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Select a random element from a slice.
    fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            slice.get(idx)
        }
    }
}

/// Deterministic PRNG using the Mulberry32 algorithm.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG produces the exact same sequence of
/// values on any platform. Daily puzzles and challenge links depend on it.
///
/// # Example
///
/// ```
/// use pris_en_flag::core::rng::{RandomSource, SeededRng};
///
/// let mut rng = SeededRng::new(42);
/// assert_eq!(rng.next_u32(), 2581720956); // Always the same!
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Create a new RNG from a 32-bit seed.
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: u32) {
        self.state = state;
    }
}

impl RandomSource for SeededRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_STEP);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

/// Non-reproducible generator seeded from OS entropy (free play).
#[derive(Debug)]
pub struct EntropyRng {
    inner: StdRng,
}

impl EntropyRng {
    /// Create a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }
}

/// The randomness owned by one quiz session.
///
/// Seeded for daily and challenge sessions, entropy-backed for free play.
#[derive(Debug)]
pub enum SessionRng {
    /// Reproducible stream.
    Seeded(SeededRng),
    /// OS entropy.
    Entropy(EntropyRng),
}

impl SessionRng {
    /// Seeded stream from a 32-bit seed.
    pub fn seeded(seed: u32) -> Self {
        Self::Seeded(SeededRng::new(seed))
    }

    /// Entropy-backed stream.
    pub fn entropy() -> Self {
        Self::Entropy(EntropyRng::new())
    }

    /// Whether this stream reproduces across runs.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }
}

impl RandomSource for SessionRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        match self {
            Self::Seeded(rng) => rng.next_u32(),
            Self::Entropy(rng) => rng.next_u32(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
