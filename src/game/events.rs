//! Quiz Events
//!
//! Semantic events emitted to the renderer. The engine never touches pixels;
//! each event carries the data needed to draw it.
//!
//! Delivery order is emission order: events are numbered as they are emitted
//! and sort by `(at, seq)`. Every state transition emits at most one event.

use serde::{Deserialize, Serialize};

use crate::core::clock::Millis;
use crate::core::geo::{BoundingBox, LatLng};
use crate::game::country::CountryCode;
use crate::game::record::DailyRecord;
use crate::game::score::RoundRecord;

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuizEventData {
    /// A session began.
    SessionStarted {
        /// Session identifier.
        session_id: String,
        /// `free`, `daily` or `challenge`.
        mode: String,
        /// Seed, when reproducible.
        seed: Option<u32>,
        /// Planned round count.
        rounds: u32,
    },

    /// A new round's target is set. Renderer shows the clue.
    TargetSet {
        /// Country to find.
        code: CountryCode,
        /// Its continent.
        continent: String,
        /// Flag asset reference.
        flag: Option<String>,
        /// Planned round count.
        total_rounds: u32,
        /// Round duration.
        duration_ms: Millis,
    },

    /// First hint: dim everything outside the continent.
    ContinentRevealed {
        /// Continent name.
        continent: String,
        /// Countries on it.
        countries: Vec<CountryCode>,
        /// Renderer may auto-zoom.
        focus: bool,
    },

    /// Second hint: highlight the shortlist and open the panel.
    CandidatesRevealed {
        /// Shortlist in display order.
        candidates: Vec<CountryCode>,
        /// Renderer may auto-zoom.
        focus: bool,
    },

    /// A decoy is removed from the shortlist.
    CandidateEliminated {
        /// Decoy removed.
        code: CountryCode,
        /// Candidates still shown.
        remaining: usize,
    },

    /// Player has been looking away from the target for a while.
    WrongArea,

    /// Hints were switched off; clear hint highlighting.
    HintsCleared,

    /// The pending selection changed.
    SelectionPlaced {
        /// Resolved code, `None` for ocean.
        code: Option<CountryCode>,
        /// Marker position.
        point: LatLng,
        /// Picked from the shortlist panel.
        via_panel: bool,
    },

    /// The round was scored.
    RoundResolved {
        /// Recap line.
        record: RoundRecord,
        /// Session total after this round.
        session_total: u32,
    },

    /// Reveal the correct country.
    TargetShown {
        /// Target code.
        code: CountryCode,
        /// Its outline box, if it has geometry.
        bounds: Option<BoundingBox>,
    },

    /// The session is over.
    SessionEnded {
        /// Final points.
        total: u32,
        /// Correct answers.
        correct_count: u32,
        /// Rounds resolved.
        rounds_played: u32,
        /// All planned rounds were played.
        completed: bool,
    },

    /// Daily result ready for persistence.
    DailyRecordReady {
        /// The record.
        record: DailyRecord,
    },
}

/// An event with its position in the stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizEvent {
    /// Engine time of emission.
    pub at: Millis,
    /// Emission counter within the session.
    pub seq: u64,
    /// 1-based round, 0 outside any round.
    pub round: u32,
    /// Payload.
    pub data: QuizEventData,
}

impl QuizEvent {
    /// Create an event.
    pub fn new(at: Millis, seq: u64, round: u32, data: QuizEventData) -> Self {
        Self { at, seq, round, data }
    }

    /// Whether this is a hint display event.
    pub fn is_hint(&self) -> bool {
        matches!(
            self.data,
            QuizEventData::ContinentRevealed { .. }
                | QuizEventData::CandidatesRevealed { .. }
                | QuizEventData::CandidateEliminated { .. }
        )
    }
}

impl PartialEq for QuizEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for QuizEvent {}

impl PartialOrd for QuizEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QuizEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.at.cmp(&other.at).then(self.seq.cmp(&other.seq))
    }
}

/// Numbers events as they are emitted.
#[derive(Debug, Default)]
pub struct EventLog {
    next_seq: u64,
    pending: Vec<QuizEvent>,
}

impl EventLog {
    /// Append an event.
    pub fn emit(&mut self, at: Millis, round: u32, data: QuizEventData) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(QuizEvent::new(at, seq, round, data));
    }

    /// Drain pending events in emission order.
    pub fn take(&mut self) -> Vec<QuizEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Events not yet taken.
    pub fn pending(&self) -> &[QuizEvent] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let a = QuizEvent::new(10, 0, 1, QuizEventData::WrongArea);
        let b = QuizEvent::new(10, 1, 1, QuizEventData::HintsCleared);
        let c = QuizEvent::new(5, 2, 1, QuizEventData::WrongArea);

        // Same time: emission order.
        assert!(a < b);
        // Earlier time first.
        assert!(c < a);
    }

    #[test]
    fn test_log_numbers_and_drains() {
        let mut log = EventLog::default();
        log.emit(0, 0, QuizEventData::WrongArea);
        log.emit(0, 0, QuizEventData::HintsCleared);
        assert_eq!(log.pending().len(), 2);

        let events = log.take();
        assert_eq!(events.iter().map(|e| e.seq).collect::<Vec<_>>(), [0, 1]);
        assert!(log.pending().is_empty());

        log.emit(1, 1, QuizEventData::WrongArea);
        assert_eq!(log.take()[0].seq, 2);
    }

    #[test]
    fn test_serialized_kind_tag() {
        let event = QuizEvent::new(
            0,
            0,
            1,
            QuizEventData::CandidateEliminated {
                code: "DE".into(),
                remaining: 4,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"candidateEliminated\""));
        assert!(event.is_hint());
    }
}
