//! Round Orchestrator
//!
//! Owns one quiz session and every per-round sub-state.
//!
//! ```text
//! Idle -> RoundActive -> RoundResult -> RoundActive ... -> SessionEnd
//! ```
//!
//! Time never flows on its own: every operation takes the current engine time
//! and [`QuizSession::tick`] advances the countdown, the idle check, the hint
//! cadence and the wrong-area check. Resolving a round is one-shot; a second
//! submit or a late expiry is discarded.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::clock::Millis;
use crate::core::geo::{haversine_meters, LatLng};
use crate::core::hash::{sequence_fingerprint, Fingerprint};
use crate::core::rng::SessionRng;
use crate::game::countdown::Countdown;
use crate::game::country::{ContinentFilter, CountryCode, RoundTarget};
use crate::game::dataset::GameData;
use crate::game::events::{EventLog, QuizEvent, QuizEventData};
use crate::game::hints::{HintConfig, HintEngine, HintState, HintStep, Viewport};
use crate::game::idle::{IdleConfig, IdleEvent, IdleMonitor};
use crate::game::record::DailyRecord;
use crate::game::score::{score_round, RoundOutcome, RoundRecord, ScoreBreakdown, ScoringConfig, SessionScore};
use crate::game::sequencer::{SelectionMode, Sequencer};

/// Session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Rounds per session.
    pub round_count: u32,
    /// Countdown per round. The time bonus decays over the same span.
    pub round_duration_ms: Millis,
    /// Idle detection.
    pub idle: IdleConfig,
    /// Hint pacing.
    pub hints: HintConfig,
    /// Score constants.
    pub scoring: ScoringConfig,
    /// Hints on at session start.
    pub hints_enabled: bool,
    /// Language used for names in the round history.
    pub language: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            round_count: crate::ROUND_COUNT,
            round_duration_ms: crate::ROUND_DURATION_MS,
            idle: IdleConfig::default(),
            hints: HintConfig::default(),
            scoring: ScoringConfig::default(),
            hints_enabled: true,
            language: "en".to_owned(),
        }
    }
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Not started.
    Idle,
    /// Countdown running, accepting selections.
    RoundActive,
    /// Round scored, waiting for the next one.
    RoundResult,
    /// Terminal until a new session starts.
    SessionEnd,
}

/// Operations refused by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Selection outside an active round.
    #[error("no round is active (phase {0:?})")]
    RoundNotActive(SessionPhase),

    /// Next round requested from the wrong phase.
    #[error("cannot start a round from phase {0:?}")]
    CannotAdvance(SessionPhase),

    /// Panel pick of an unknown code.
    #[error("unknown country code {0}")]
    UnknownCountry(String),

    /// Panel pick of a code that is not on the revealed shortlist.
    #[error("{0} is not on the shortlist")]
    NotOnShortlist(String),
}

/// The pending answer of the current round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Resolved code, `None` for ocean.
    pub code: Option<CountryCode>,
    /// Marker position.
    pub point: LatLng,
    /// Picked from the shortlist panel.
    pub via_panel: bool,
}

/// What one tick did.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events emitted since the last drain, in order.
    pub events: Vec<QuizEvent>,
    /// The countdown expired and resolved the round this tick.
    pub timed_out: bool,
}

/// One quiz session.
pub struct QuizSession {
    id: Uuid,
    config: QuizConfig,
    data: Arc<GameData>,
    phase: SessionPhase,
    mode: SelectionMode,
    filter: ContinentFilter,
    rng: SessionRng,
    sequencer: Option<Sequencer>,
    /// Fingerprint of the full planned sequence (seeded modes only).
    puzzle_fingerprint: Option<Fingerprint>,
    round: u32,
    target: Option<RoundTarget>,
    selection: Option<Selection>,
    /// One-shot guard for the current round.
    resolved: bool,
    countdown: Countdown,
    idle: IdleMonitor,
    hints: HintEngine,
    hints_enabled: bool,
    viewport: Viewport,
    score: SessionScore,
    daily_record: Option<DailyRecord>,
    events: EventLog,
}

impl QuizSession {
    /// A session over shared game data, in the `Idle` phase.
    pub fn new(data: Arc<GameData>, config: QuizConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            countdown: Countdown::new(config.round_duration_ms),
            idle: IdleMonitor::new(config.idle),
            hints: HintEngine::new(config.hints),
            hints_enabled: config.hints_enabled,
            config,
            data,
            phase: SessionPhase::Idle,
            mode: SelectionMode::FreePlay,
            filter: ContinentFilter::All,
            rng: SessionRng::entropy(),
            sequencer: None,
            puzzle_fingerprint: None,
            round: 0,
            target: None,
            selection: None,
            resolved: false,
            viewport: Viewport::default(),
            score: SessionScore::new(),
            daily_record: None,
            events: EventLog::default(),
        }
    }

    // =========================================================================
    // SESSION LIFECYCLE
    // =========================================================================

    /// Start a new session and its first round.
    ///
    /// Anything still running from a previous session is cancelled first. An
    /// empty country set ends the session immediately.
    pub fn start(&mut self, mode: SelectionMode, filter: ContinentFilter, now: Millis) {
        self.cancel_round_timers(now);

        self.id = Uuid::new_v4();
        self.rng = mode.rng();
        let sequencer = Sequencer::new(&self.data.countries, &filter, &mut self.rng);
        self.puzzle_fingerprint = mode
            .seed_string()
            .map(|seed| self.planned_fingerprint(&seed, &sequencer));
        self.sequencer = Some(sequencer);
        self.mode = mode;
        self.filter = filter;
        self.round = 0;
        self.target = None;
        self.selection = None;
        self.resolved = false;
        self.hints.reset();
        self.score.reset();
        self.daily_record = None;

        info!(
            "Session {} started: mode={} filter={} seed={:?}",
            self.id,
            self.mode.label(),
            self.filter,
            self.mode.seed()
        );
        self.events.emit(
            now,
            0,
            QuizEventData::SessionStarted {
                session_id: self.id.to_string(),
                mode: self.mode.label().to_owned(),
                seed: self.mode.seed(),
                rounds: self.config.round_count,
            },
        );

        self.begin_next_round(now);
    }

    /// Move from a round result to the next round, or end the session after
    /// the last one.
    pub fn next_round(&mut self, now: Millis) -> Result<(), SessionError> {
        if self.phase != SessionPhase::RoundResult {
            return Err(SessionError::CannotAdvance(self.phase));
        }
        self.begin_next_round(now);
        Ok(())
    }

    /// Abandon the session: cancel every timer and end it.
    pub fn leave(&mut self, now: Millis) {
        if matches!(self.phase, SessionPhase::Idle | SessionPhase::SessionEnd) {
            return;
        }
        self.cancel_round_timers(now);
        self.resolved = true;
        self.end_session(now, false);
    }

    fn begin_next_round(&mut self, now: Millis) {
        if self.round >= self.config.round_count {
            self.end_session(now, true);
            return;
        }

        let data = Arc::clone(&self.data);
        let pick = self.sequencer.as_mut().and_then(|s| s.next_pick(&data.countries));
        let Some(pick) = pick else {
            info!("Session {} ran out of countries after {} rounds", self.id, self.round);
            self.end_session(now, true);
            return;
        };
        let country = pick.country;

        // Cancel before arming so nothing leaks across rounds.
        self.cancel_round_timers(now);

        self.round += 1;
        let target = RoundTarget::from(country);
        self.hints
            .set_target(target.clone(), &data.countries, &data.boundaries, &mut self.rng);
        self.selection = None;
        self.resolved = false;
        self.viewport = Viewport::default();

        self.idle.reset(now);
        self.idle.start(now);
        self.countdown.start(now);
        self.phase = SessionPhase::RoundActive;

        debug!("Round {} target {} ({:?})", self.round, target.code, pick.rule);
        self.events.emit(
            now,
            self.round,
            QuizEventData::TargetSet {
                code: target.code.clone(),
                continent: target.continent.clone(),
                flag: country.flag.clone(),
                total_rounds: self.config.round_count,
                duration_ms: self.config.round_duration_ms,
            },
        );
        self.target = Some(target);
    }

    fn end_session(&mut self, now: Millis, completed: bool) {
        self.phase = SessionPhase::SessionEnd;
        self.target = None;
        self.hints.reset();

        info!(
            "Session {} ended: score={} correct={}/{} completed={}",
            self.id,
            self.score.total(),
            self.score.correct_count(),
            self.score.rounds_played(),
            completed
        );
        self.events.emit(
            now,
            self.round,
            QuizEventData::SessionEnded {
                total: self.score.total(),
                correct_count: self.score.correct_count(),
                rounds_played: self.score.rounds_played() as u32,
                completed,
            },
        );

        if let (SelectionMode::Daily { date }, Some(fingerprint)) = (&self.mode, &self.puzzle_fingerprint) {
            let record = DailyRecord::from_score(*date, completed, &self.score, fingerprint);
            self.events.emit(
                now,
                self.round,
                QuizEventData::DailyRecordReady { record: record.clone() },
            );
            self.daily_record = Some(record);
        }
    }

    fn cancel_round_timers(&mut self, now: Millis) {
        self.countdown.stop(now);
        self.idle.stop();
        self.hints.disarm();
    }

    fn planned_fingerprint(&self, seed: &str, sequencer: &Sequencer) -> Fingerprint {
        let mut planned = sequencer.clone();
        let codes: Vec<CountryCode> = (0..self.config.round_count)
            .map_while(|_| planned.next_pick(&self.data.countries))
            .map(|pick| pick.country.code.clone())
            .collect();
        sequence_fingerprint(seed, codes.iter().map(CountryCode::as_str))
    }

    // =========================================================================
    // PLAYER INPUT
    // =========================================================================

    /// A map click. Replaces any pending selection and returns the resolved
    /// code (`None` is an ocean click).
    pub fn select_at(&mut self, point: LatLng, now: Millis) -> Result<Option<CountryCode>, SessionError> {
        self.ensure_round_active()?;
        self.record_activity(now);

        let code = self.data.boundaries.resolve(point).cloned();
        self.place_selection(
            Selection {
                code: code.clone(),
                point,
                via_panel: false,
            },
            now,
        );
        Ok(code)
    }

    /// A pick from the shortlist panel. The marker goes to the country's
    /// outline center.
    pub fn select_from_panel(&mut self, code: &str, now: Millis) -> Result<(), SessionError> {
        self.ensure_round_active()?;
        let country = self
            .data
            .countries
            .get(code)
            .ok_or_else(|| SessionError::UnknownCountry(code.to_owned()))?;
        if !self.hints.state().candidates_revealed || !self.hints.shortlist().contains(code) {
            return Err(SessionError::NotOnShortlist(code.to_owned()));
        }

        let point = self.data.marker_point(code).unwrap_or(LatLng::ZERO);
        let selection = Selection {
            code: Some(country.code.clone()),
            point,
            via_panel: true,
        };
        self.record_activity(now);
        self.place_selection(selection, now);
        Ok(())
    }

    fn place_selection(&mut self, selection: Selection, now: Millis) {
        self.events.emit(
            now,
            self.round,
            QuizEventData::SelectionPlaced {
                code: selection.code.clone(),
                point: selection.point,
                via_panel: selection.via_panel,
            },
        );
        self.selection = Some(selection);
    }

    /// Pointer activity. Ends an idle episode and pauses hint progression.
    pub fn record_activity(&mut self, now: Millis) {
        if self.phase != SessionPhase::RoundActive {
            return;
        }
        if let Some(IdleEvent::BecameActive) = self.idle.record_activity(now) {
            self.hints.on_activity();
        }
    }

    /// The player's current view. `user_adjusted` false means the renderer
    /// may auto-zoom on hints again.
    pub fn update_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Turn hints on or off. Turning them off mid-round clears the display
    /// but keeps what was already revealed for scoring.
    pub fn set_hints_enabled(&mut self, enabled: bool, now: Millis) {
        if self.hints_enabled == enabled {
            return;
        }
        self.hints_enabled = enabled;
        if !enabled {
            self.hints.disarm();
            if self.phase == SessionPhase::RoundActive {
                self.events.emit(now, self.round, QuizEventData::HintsCleared);
            }
        }
        debug!("Hints {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Submit the pending selection. Returns `None` when the round is not
    /// active or was already resolved.
    pub fn submit(&mut self, now: Millis) -> Option<ScoreBreakdown> {
        self.resolve(now, false)
    }

    fn ensure_round_active(&self) -> Result<(), SessionError> {
        if self.phase == SessionPhase::RoundActive && !self.resolved {
            Ok(())
        } else {
            Err(SessionError::RoundNotActive(self.phase))
        }
    }

    // =========================================================================
    // TIME
    // =========================================================================

    /// Advance time-driven state and drain pending events.
    pub fn tick(&mut self, now: Millis) -> TickResult {
        let mut timed_out = false;

        if self.phase == SessionPhase::RoundActive && !self.resolved {
            if self.countdown.is_expired(now) {
                timed_out = self.resolve(now, true).is_some();
            } else {
                self.tick_hints(now);
            }
        }

        TickResult {
            events: self.events.take(),
            timed_out,
        }
    }

    fn tick_hints(&mut self, now: Millis) {
        let became_idle = matches!(self.idle.poll(now), Some(IdleEvent::BecameIdle { .. }));
        if !self.hints_enabled {
            return;
        }

        if became_idle {
            if let Some(step) = self.hints.on_idle(now) {
                self.emit_hint(step, now);
            }
        }
        if let Some(step) = self.hints.poll(now, self.idle.is_idle()) {
            self.emit_hint(step, now);
        }

        let target_bounds = self
            .target
            .as_ref()
            .and_then(|t| self.data.boundaries.bounds(t.code.as_str()));
        if self.hints.check_wrong_area(now, &self.viewport, target_bounds.as_ref()) {
            self.events.emit(now, self.round, QuizEventData::WrongArea);
        }
    }

    fn emit_hint(&mut self, step: HintStep, now: Millis) {
        let focus = !self.viewport.user_adjusted;
        let data = match step {
            HintStep::ContinentRevealed { continent, countries } => QuizEventData::ContinentRevealed {
                continent,
                countries,
                focus,
            },
            HintStep::CandidatesRevealed { candidates } => QuizEventData::CandidatesRevealed { candidates, focus },
            HintStep::CandidateEliminated { code, remaining } => {
                QuizEventData::CandidateEliminated { code, remaining }
            }
        };
        self.events.emit(now, self.round, data);
    }

    fn resolve(&mut self, now: Millis, timed_out: bool) -> Option<ScoreBreakdown> {
        if self.phase != SessionPhase::RoundActive || self.resolved {
            debug!("Stale submission discarded (phase {:?}, round {})", self.phase, self.round);
            return None;
        }
        self.resolved = true;
        self.cancel_round_timers(now);

        let target = self.target.clone()?;
        let target_country = self.data.countries.get(target.code.as_str());
        let selection = self.selection.clone();

        let guessed_code = selection.as_ref().and_then(|s| s.code.clone());
        let is_correct = guessed_code.as_ref() == Some(&target.code);
        let distance = selection
            .as_ref()
            .zip(target_country.and_then(|c| c.capital()))
            .map(|(s, capital)| haversine_meters(s.point, capital));

        let outcome = RoundOutcome {
            is_correct,
            time_elapsed_ms: self.countdown.elapsed(now),
            hint_progress: self.hints.progress(),
            distance_to_capital_m: distance,
            used_shortlist_panel: selection.as_ref().is_some_and(|s| s.via_panel),
        };
        let breakdown = score_round(&self.config.scoring, self.config.round_duration_ms, &outcome);

        let lang = self.config.language.as_str();
        let record = RoundRecord {
            round: self.round,
            target_code: target.code.clone(),
            target_name: self
                .data
                .country_name(target.code.as_str(), lang)
                .unwrap_or(target.code.as_str())
                .to_owned(),
            guessed_name: guessed_code
                .as_ref()
                .and_then(|c| self.data.country_name(c.as_str(), lang))
                .map(str::to_owned),
            guessed_code,
            is_correct,
            score: breakdown,
            timed_out,
        };
        self.score.record(record.clone());
        self.phase = SessionPhase::RoundResult;

        info!(
            "Round {} resolved: target={} correct={} points={} timed_out={}",
            self.round, target.code, is_correct, breakdown.total, timed_out
        );
        self.events.emit(
            now,
            self.round,
            QuizEventData::RoundResolved {
                record,
                session_total: self.score.total(),
            },
        );
        self.events.emit(
            now,
            self.round,
            QuizEventData::TargetShown {
                bounds: self.data.bounds(target.code.as_str()),
                code: target.code,
            },
        );

        Some(breakdown)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Drain pending events without advancing time.
    pub fn take_events(&mut self) -> Vec<QuizEvent> {
        self.events.take()
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Selection mode of the current session.
    pub fn mode(&self) -> &SelectionMode {
        &self.mode
    }

    /// 1-based current round, 0 before the first.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Current target.
    pub fn target(&self) -> Option<&RoundTarget> {
        self.target.as_ref()
    }

    /// Pending selection.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Hints revealed this round.
    pub fn hint_state(&self) -> &HintState {
        self.hints.state()
    }

    /// Hint engine, for shortlist and continent-set queries.
    pub fn hints(&self) -> &HintEngine {
        &self.hints
    }

    /// Whether hints are on.
    pub fn hints_enabled(&self) -> bool {
        self.hints_enabled
    }

    /// Countdown time left.
    pub fn remaining_ms(&self, now: Millis) -> Millis {
        self.countdown.remaining(now)
    }

    /// Whether the idle check is running.
    pub fn idle_monitor_running(&self) -> bool {
        self.idle.is_running()
    }

    /// Whether the countdown is running.
    pub fn countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// Running tally.
    pub fn score(&self) -> &SessionScore {
        &self.score
    }

    /// Fingerprint of the planned sequence, for seeded modes.
    pub fn puzzle_fingerprint(&self) -> Option<&Fingerprint> {
        self.puzzle_fingerprint.as_ref()
    }

    /// Record produced at the end of a daily session.
    pub fn daily_record(&self) -> Option<&DailyRecord> {
        self.daily_record.as_ref()
    }

    /// Configuration in use.
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::BoundingBox;
    use crate::core::seed::ChallengeToken;
    use crate::game::country::{Country, Difficulty};
    use crate::game::hints::HintStage;
    use crate::game::hit_test::BoundaryFeature;
    use chrono::NaiveDate;

    /// Twelve European squares along the equator-ish band, one Asian square.
    fn data() -> Arc<GameData> {
        let mut countries = Vec::new();
        let mut features = Vec::new();
        for i in 0..12 {
            let code = format!("E{i:02}");
            let lng = i as f64 * 10.0;
            let difficulty = Difficulty::from_level((i % 3 + 1) as u8).unwrap();
            countries.push(Country::new(&code, &code, "Europe", difficulty).with_capital(5.0, lng + 5.0));
            features.push(BoundaryFeature::rectangle(&code, lng, 0.0, lng + 10.0, 10.0));
        }
        countries.push(Country::new("JP", "Japan", "Asia", Difficulty::Easy));
        features.push(BoundaryFeature::rectangle("JP", 130.0, 30.0, 140.0, 40.0));
        Arc::new(GameData::new(countries, features).unwrap())
    }

    fn daily() -> SelectionMode {
        SelectionMode::Daily {
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        }
    }

    fn started(mode: SelectionMode) -> QuizSession {
        let mut session = QuizSession::new(data(), QuizConfig::default());
        session.start(mode, ContinentFilter::All, 0);
        session
    }

    fn target_center(session: &QuizSession) -> LatLng {
        let code = session.target().unwrap().code.clone();
        session.data.bounds(code.as_str()).unwrap().center()
    }

    #[test]
    fn test_start_sets_first_round() {
        let mut session = started(daily());
        assert_eq!(session.phase(), SessionPhase::RoundActive);
        assert_eq!(session.round(), 1);
        assert!(session.idle_monitor_running());
        assert!(session.countdown_running());
        assert!(session.puzzle_fingerprint().is_some());

        let events = session.take_events();
        assert!(matches!(events[0].data, QuizEventData::SessionStarted { .. }));
        assert!(matches!(events[1].data, QuizEventData::TargetSet { .. }));
    }

    #[test]
    fn test_correct_click_scores() {
        let mut session = started(daily());
        let point = target_center(&session);
        let code = session.select_at(point, 3000).unwrap();
        assert_eq!(code.as_ref(), Some(&session.target().unwrap().code));

        let breakdown = session.submit(3000).unwrap();
        // 10% of the round used, no hints, click at the capital.
        assert_eq!(breakdown.time_bonus, 900);
        assert_eq!(breakdown.hint_bonus, 500);
        assert_eq!(breakdown.capital_bonus, 200);
        assert_eq!(session.phase(), SessionPhase::RoundResult);
        assert_eq!(session.score().correct_count(), 1);
        assert!(!session.idle_monitor_running());
        assert!(!session.countdown_running());
    }

    #[test]
    fn test_longer_round_stretches_time_bonus() {
        let config = QuizConfig {
            round_duration_ms: 60_000,
            ..QuizConfig::default()
        };
        let mut session = QuizSession::new(data(), config);
        session.start(daily(), ContinentFilter::All, 0);
        let point = target_center(&session);
        session.select_at(point, 30_000).unwrap();
        assert_eq!(session.remaining_ms(30_000), 30_000);

        let breakdown = session.submit(30_000).unwrap();
        assert_eq!(breakdown.time_bonus, 500);
    }

    #[test]
    fn test_ocean_click_is_incorrect() {
        let mut session = started(daily());
        assert_eq!(session.select_at(LatLng::new(-60.0, -150.0), 100).unwrap(), None);
        let breakdown = session.submit(200).unwrap();
        assert_eq!(breakdown.total, 0);
        assert_eq!(session.score().history()[0].guessed_code, None);
    }

    #[test]
    fn test_submit_is_one_shot() {
        let mut session = started(daily());
        assert!(session.submit(1000).is_some());
        assert!(session.submit(1001).is_none());
        // A stray expiry after resolution does nothing.
        let result = session.tick(60_000);
        assert!(!result.timed_out);
        assert_eq!(session.score().rounds_played(), 1);
    }

    #[test]
    fn test_timeout_resolves_once() {
        let mut session = started(daily());
        let result = session.tick(30_000);
        assert!(result.timed_out);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(&e.data, QuizEventData::RoundResolved { record, .. } if record.timed_out)));
        assert!(!session.tick(30_100).timed_out);
        assert!(session.submit(30_200).is_none());
        assert_eq!(session.score().rounds_played(), 1);
    }

    #[test]
    fn test_later_click_replaces_selection() {
        let mut session = started(daily());
        session.select_at(LatLng::new(-60.0, -150.0), 100).unwrap();
        let point = target_center(&session);
        session.select_at(point, 200).unwrap();
        assert!(session.submit(300).unwrap().total > 0);
    }

    #[test]
    fn test_selection_outside_round_rejected() {
        let mut session = QuizSession::new(data(), QuizConfig::default());
        assert_eq!(
            session.select_at(LatLng::ZERO, 0),
            Err(SessionError::RoundNotActive(SessionPhase::Idle))
        );

        session.start(daily(), ContinentFilter::All, 0);
        session.submit(10);
        assert_eq!(
            session.select_at(LatLng::ZERO, 20),
            Err(SessionError::RoundNotActive(SessionPhase::RoundResult))
        );
        assert_eq!(session.next_round(30), Ok(()));
        assert_eq!(session.next_round(40), Err(SessionError::CannotAdvance(SessionPhase::RoundActive)));
    }

    #[test]
    fn test_full_session_ends_with_daily_record() {
        let mut session = started(daily());
        let mut now = 0;
        for _ in 0..10 {
            now += 1000;
            session.submit(now);
            session.next_round(now).unwrap();
        }
        assert_eq!(session.phase(), SessionPhase::SessionEnd);
        assert_eq!(session.score().rounds_played(), 10);

        let record = session.daily_record().unwrap();
        assert!(record.completed);
        assert!(record.matches(session.puzzle_fingerprint().unwrap()));
        assert!(session
            .take_events()
            .iter()
            .any(|e| matches!(e.data, QuizEventData::DailyRecordReady { .. })));
        assert!(session.next_round(now).is_err());
    }

    #[test]
    fn test_same_seed_same_targets() {
        let token = ChallengeToken::parse("abcd1234").unwrap();
        let play = |token: ChallengeToken| {
            let mut session = started(SelectionMode::Challenge { token });
            let mut codes = Vec::new();
            let mut shortlists = Vec::new();
            for i in 0..10 {
                codes.push(session.target().unwrap().code.clone());
                shortlists.push(session.hints().shortlist().candidates().to_vec());
                session.submit(i);
                session.next_round(i).unwrap();
            }
            (codes, shortlists)
        };
        assert_eq!(play(token.clone()), play(token));
    }

    #[test]
    fn test_hints_progress_on_idle() {
        let mut session = started(daily());
        session.take_events();

        let mut hint_events = Vec::new();
        for now in (100..=20_000).step_by(100) {
            hint_events.extend(session.tick(now).events.into_iter().filter(|e| e.is_hint()));
        }
        // Idle at 3000, then every 3000 after: continent, candidates, eliminations.
        assert!(matches!(
            hint_events[0].data,
            QuizEventData::ContinentRevealed { focus: true, .. }
        ));
        assert_eq!(hint_events[0].at, 3000);
        assert!(matches!(hint_events[1].data, QuizEventData::CandidatesRevealed { .. }));
        assert_eq!(hint_events[1].at, 6000);
        assert!(hint_events.windows(2).all(|w| w[1].at - w[0].at >= 3000));
        assert_eq!(session.hint_state().eliminated_count as usize, hint_events.len() - 2);
    }

    #[test]
    fn test_activity_pauses_hints() {
        let mut session = started(daily());
        session.tick(3000);
        assert_eq!(session.hints().stage(), HintStage::Continent);

        session.record_activity(3500);
        for now in (3600..=5900).step_by(100) {
            session.tick(now);
        }
        assert_eq!(session.hints().stage(), HintStage::Continent);
        // Next idle episode starts at 6500 and is past the minimum interval.
        session.tick(6500);
        assert_eq!(session.hints().stage(), HintStage::Candidates);
    }

    #[test]
    fn test_panel_pick() {
        let mut session = started(daily());
        let target = session.target().unwrap().code.clone();
        assert_eq!(
            session.select_from_panel(target.as_str(), 100),
            Err(SessionError::NotOnShortlist(target.to_string()))
        );
        assert!(matches!(
            session.select_from_panel("XX", 100),
            Err(SessionError::UnknownCountry(_))
        ));

        session.tick(3000);
        session.tick(6000);
        assert!(session.hint_state().candidates_revealed);

        session.select_from_panel(target.as_str(), 6500).unwrap();
        let selection = session.selection().unwrap();
        assert!(selection.via_panel);
        assert_eq!(Some(selection.point), session.data.marker_point(target.as_str()));

        let breakdown = session.submit(6500).unwrap();
        assert_eq!(breakdown.capital_bonus, 0);
        assert!(breakdown.panel_penalty > 0);
    }

    #[test]
    fn test_disable_hints_keeps_state() {
        let mut session = started(daily());
        session.tick(3000);
        let before = *session.hint_state();
        session.set_hints_enabled(false, 3100);
        assert!(session
            .take_events()
            .iter()
            .any(|e| matches!(e.data, QuizEventData::HintsCleared)));

        for now in (3200..=20_000).step_by(100) {
            session.tick(now);
        }
        assert_eq!(*session.hint_state(), before);
    }

    #[test]
    fn test_focus_off_after_manual_zoom() {
        let mut session = started(daily());
        session.update_viewport(Viewport {
            bounds: BoundingBox::WORLD,
            user_adjusted: true,
        });
        let events = session.tick(3000).events;
        assert!(events
            .iter()
            .any(|e| matches!(e.data, QuizEventData::ContinentRevealed { focus: false, .. })));
    }

    #[test]
    fn test_wrong_area_notice() {
        let mut session = started(daily());
        session.tick(3000);
        session.update_viewport(Viewport {
            bounds: BoundingBox::new(-120.0, -60.0, -100.0, -40.0),
            user_adjusted: true,
        });
        let mut notices = 0;
        for now in (3100..=5900).step_by(100) {
            notices += session
                .tick(now)
                .events
                .iter()
                .filter(|e| matches!(e.data, QuizEventData::WrongArea))
                .count();
        }
        assert_eq!(notices, 0);
        assert_eq!(
            session
                .tick(6100)
                .events
                .iter()
                .filter(|e| matches!(e.data, QuizEventData::WrongArea))
                .count(),
            1
        );
    }

    #[test]
    fn test_leave_cancels_and_records() {
        let mut session = started(daily());
        session.submit(1000);
        session.next_round(1000).unwrap();
        session.leave(2000);

        assert_eq!(session.phase(), SessionPhase::SessionEnd);
        assert!(!session.idle_monitor_running());
        assert!(!session.countdown_running());
        assert!(!session.hints().is_armed());
        assert!(!session.daily_record().unwrap().completed);
        // Nothing fires afterwards.
        assert!(session.tick(100_000).events.iter().all(|e| !e.is_hint()));
        assert!(session.submit(100_000).is_none());
    }

    #[test]
    fn test_restart_cancels_previous_round() {
        let mut session = started(daily());
        session.tick(3000);
        session.start(SelectionMode::FreePlay, ContinentFilter::All, 4000);
        assert_eq!(session.round(), 1);
        assert_eq!(session.hints().stage(), HintStage::None);
        assert_eq!(session.score().rounds_played(), 0);
        assert!(session.puzzle_fingerprint().is_none());
        // The new round's idle threshold counts from the restart.
        session.tick(6000);
        assert_eq!(session.hints().stage(), HintStage::None);
    }

    #[test]
    fn test_empty_dataset_ends_immediately() {
        let mut session = QuizSession::new(Arc::new(GameData::default()), QuizConfig::default());
        session.start(daily(), ContinentFilter::All, 0);
        assert_eq!(session.phase(), SessionPhase::SessionEnd);
        assert_eq!(session.score().rounds_played(), 0);
    }

    #[test]
    fn test_filter_exhaustion_falls_back() {
        let mut session = QuizSession::new(data(), QuizConfig::default());
        session.start(daily(), ContinentFilter::Only("Asia".into()), 0);
        // The filter admits one country; the rest come from the fallback chain.
        let first = session.target().unwrap().code.clone();
        assert_eq!(first.as_str(), "JP");
        let mut rounds = 1;
        while session.phase() == SessionPhase::RoundActive {
            session.submit(rounds);
            session.next_round(rounds).unwrap();
            rounds += 1;
        }
        assert_eq!(session.score().rounds_played(), 10);
    }
}
