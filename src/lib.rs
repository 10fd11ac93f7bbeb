//! # Pris en Flag Engine
//!
//! Round orchestration for a timed flag-and-map geography quiz.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PRIS EN FLAG ENGINE                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Mulberry32 PRNG + entropy source          │
//! │  ├── seed.rs     - Seed folding, daily date, challenge token │
//! │  ├── geo.rs      - LatLng, bounding boxes, haversine         │
//! │  ├── clock.rs    - Injectable millisecond clock              │
//! │  └── hash.rs     - Sequence fingerprints                     │
//! │                                                              │
//! │  game/           - Quiz logic (no I/O, time passed in)       │
//! │  ├── sequencer.rs- Difficulty-tiered target selection        │
//! │  ├── hit_test.rs - Point-in-polygon click resolution         │
//! │  ├── idle.rs     - Inactivity detection                      │
//! │  ├── hints.rs    - Hint stages and shortlist                 │
//! │  ├── score.rs    - Round scoring and tally                   │
//! │  └── session.rs  - Round orchestrator                        │
//! │                                                              │
//! │  runtime/        - Async driver (tokio)                      │
//! │  └── driver.rs   - Interval tick + command/event channels    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Daily puzzles and challenge links are reproduced on every client:
//! - The seed string folds into a 32-bit seed the same way everywhere
//! - All seeded randomness comes from Mulberry32
//! - Country order is the order the host supplied
//!
//! Given the same seed, country list and continent filter, the session
//! produces the **identical target sequence and shortlists**.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod runtime;

// Re-export commonly used types
pub use crate::core::clock::{Clock, ManualClock, Millis, TokioClock};
pub use crate::core::geo::{BoundingBox, LatLng};
pub use crate::core::rng::{RandomSource, SeededRng};
pub use crate::core::seed::{string_to_seed, ChallengeToken, DailyConfig};
pub use crate::game::session::{QuizConfig, QuizSession, SessionPhase};
pub use crate::game::{GameData, QuizEvent, QuizEventData, SelectionMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rounds per session
pub const ROUND_COUNT: u32 = 10;

/// Countdown per round (30 seconds)
pub const ROUND_DURATION_MS: Millis = 30_000;
