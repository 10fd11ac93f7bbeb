//! Game Logic Module
//!
//! Everything that decides what a round is and how it ends. No I/O, no
//! wall-clock reads: time comes in as an argument.
//!
//! ## Module Structure
//!
//! - `country`: Country data model and validated country set
//! - `dataset`: Countries plus boundary index, shared by sessions
//! - `sequencer`: Seeded, difficulty-tiered target selection
//! - `hit_test`: Point-in-polygon click resolution
//! - `idle`: Inactivity detection
//! - `hints`: Hint stages, shortlist, wrong-area notice
//! - `score`: Round scoring and session tally
//! - `countdown`: Round countdown
//! - `events`: Renderer events
//! - `record`: Daily result record
//! - `session`: Round orchestrator

pub mod countdown;
pub mod country;
pub mod dataset;
pub mod events;
pub mod hints;
pub mod idle;
pub mod record;
pub mod score;
pub mod sequencer;
pub mod session;

// Re-export key types
pub use country::{ContinentFilter, Country, CountryCode, CountrySet, DataError, Difficulty, LocalizedText, RoundTarget};
pub use dataset::GameData;
pub use events::{QuizEvent, QuizEventData};
pub use hints::{HintConfig, HintEngine, HintStage, HintState, Viewport};
pub use hit_test::{BoundaryFeature, BoundaryIndex, Geometry};
pub use idle::{IdleConfig, IdleMonitor};
pub use record::{DailyRecord, RecordError};
pub use score::{score, score_round, RoundOutcome, RoundRecord, ScoreBreakdown, ScoringConfig, SessionScore};
pub use sequencer::{select_codes, select_sequence, SelectionMode, Sequencer};
pub use session::{QuizConfig, QuizSession, SessionError, SessionPhase, TickResult};
