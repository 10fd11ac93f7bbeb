//! Core deterministic primitives.
//!
//! Everything a daily puzzle or challenge link must reproduce bit-for-bit
//! lives here, alongside the geometry and time types the game layer uses.

pub mod clock;
pub mod geo;
pub mod hash;
pub mod rng;
pub mod seed;

// Re-export core types
pub use clock::{Clock, ManualClock, Millis, TokioClock};
pub use geo::{haversine_meters, BoundingBox, LatLng};
pub use hash::{fingerprint_hex, sequence_fingerprint, Fingerprint};
pub use rng::{EntropyRng, RandomSource, SeededRng, SessionRng};
pub use seed::{daily_puzzle_date, string_to_seed, ChallengeToken, DailyConfig, SeedError};
