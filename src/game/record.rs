//! Daily Result Record
//!
//! What a finished (or abandoned) daily session hands to the host for
//! persistence. The engine never stores it; it only produces and reads it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hash::{fingerprint_hex, Fingerprint};
use crate::game::score::{RoundRecord, SessionScore};

/// Record encode/decode errors.
#[derive(Debug, Error)]
pub enum RecordError {
    /// JSON (de)serialization failed.
    #[error("daily record json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of one day's puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Puzzle date.
    pub date: NaiveDate,
    /// All rounds were played.
    pub completed: bool,
    /// Total points.
    pub score: u32,
    /// Correct answers.
    pub correct_count: u32,
    /// Per-round recap.
    pub round_history: Vec<RoundRecord>,
    /// Hex SHA-256 of the puzzle's code sequence.
    pub fingerprint: String,
}

impl DailyRecord {
    /// Build from a session tally.
    pub fn from_score(date: NaiveDate, completed: bool, score: &SessionScore, fingerprint: &Fingerprint) -> Self {
        Self {
            date,
            completed,
            score: score.total(),
            correct_count: score.correct_count(),
            round_history: score.history().to_vec(),
            fingerprint: fingerprint_hex(fingerprint),
        }
    }

    /// Whether this record was played on the puzzle with `fingerprint`.
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprint == fingerprint_hex(fingerprint)
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }
}
