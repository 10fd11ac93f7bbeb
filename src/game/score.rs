//! Score Engine
//!
//! Pure per-round scoring plus the running session tally.
//!
//! A correct answer earns a time bonus (linear over the round), a hint bonus
//! (what is left of the hint budget) and a flat capital bonus for a click near
//! the capital. Answers picked from the shortlist panel have both variable
//! bonuses halved and can never earn the capital bonus.

use serde::{Deserialize, Serialize};

use crate::core::clock::Millis;
use crate::game::country::CountryCode;

/// Scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Time bonus at zero elapsed time.
    pub max_time_bonus: u32,
    /// Hint bonus with no hint shown.
    pub max_hint_bonus: u32,
    /// Flat bonus for clicking near the capital.
    pub capital_bonus: u32,
    /// Capital bonus radius, inclusive.
    pub capital_radius_m: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_time_bonus: 1000,
            max_hint_bonus: 500,
            capital_bonus: 200,
            capital_radius_m: 50_000.0,
        }
    }
}

/// Everything the score depends on. Produced once per round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    /// Selected code equals the target.
    pub is_correct: bool,
    /// Countdown time used.
    pub time_elapsed_ms: Millis,
    /// Hint metric in `[0, 1]`.
    pub hint_progress: f64,
    /// Distance from the selection point to the target's capital.
    /// `None` without a point or a capital.
    pub distance_to_capital_m: Option<f64>,
    /// Answer came from the shortlist panel.
    pub used_shortlist_panel: bool,
}

impl RoundOutcome {
    /// A wrong (or missing) answer.
    pub fn incorrect(time_elapsed_ms: Millis) -> Self {
        Self {
            is_correct: false,
            time_elapsed_ms,
            hint_progress: 0.0,
            distance_to_capital_m: None,
            used_shortlist_panel: false,
        }
    }
}

/// Per-component round score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Speed component.
    pub time_bonus: u32,
    /// Fewer-hints component.
    pub hint_bonus: u32,
    /// Near-capital component.
    pub capital_bonus: u32,
    /// Points halved away by panel use. Informational, not subtracted again.
    ///
    /// Summed per component, so `667 + 400` loses `333 + 200 = 533`. Halving
    /// the combined bonus instead would report 534 on such odd splits.
    pub panel_penalty: u32,
    /// `time_bonus + hint_bonus + capital_bonus`.
    pub total: u32,
}

/// Round half up on a non-negative value.
#[inline]
fn round_half_up(x: f64) -> u32 {
    (x + 0.5).floor().max(0.0) as u32
}

/// Score a round. The time bonus decays to zero over `round_duration_ms`.
pub fn score_round(config: &ScoringConfig, round_duration_ms: Millis, outcome: &RoundOutcome) -> ScoreBreakdown {
    if !outcome.is_correct {
        return ScoreBreakdown::default();
    }

    let duration = round_duration_ms.max(1) as f64;
    let time_ratio = (1.0 - outcome.time_elapsed_ms as f64 / duration).max(0.0);
    let hint_ratio = (1.0 - outcome.hint_progress.clamp(0.0, 1.0)).max(0.0);

    let mut time_bonus = round_half_up(f64::from(config.max_time_bonus) * time_ratio);
    let mut hint_bonus = round_half_up(f64::from(config.max_hint_bonus) * hint_ratio);

    let near_capital = outcome
        .distance_to_capital_m
        .is_some_and(|d| d <= config.capital_radius_m);
    let capital_bonus = if near_capital && !outcome.used_shortlist_panel {
        config.capital_bonus
    } else {
        0
    };

    let mut panel_penalty = 0;
    if outcome.used_shortlist_panel {
        let (full_time, full_hint) = (time_bonus, hint_bonus);
        time_bonus = round_half_up(f64::from(full_time) * 0.5);
        hint_bonus = round_half_up(f64::from(full_hint) * 0.5);
        panel_penalty = (full_time - time_bonus) + (full_hint - hint_bonus);
    }

    ScoreBreakdown {
        time_bonus,
        hint_bonus,
        capital_bonus,
        panel_penalty,
        total: time_bonus + hint_bonus + capital_bonus,
    }
}

/// [`score_round`] with default constants and the standard round length.
pub fn score(
    is_correct: bool,
    time_elapsed_ms: Millis,
    hint_progress: f64,
    distance_to_capital_m: Option<f64>,
    used_shortlist_panel: bool,
) -> ScoreBreakdown {
    score_round(
        &ScoringConfig::default(),
        crate::ROUND_DURATION_MS,
        &RoundOutcome {
            is_correct,
            time_elapsed_ms,
            hint_progress,
            distance_to_capital_m,
            used_shortlist_panel,
        },
    )
}

// =============================================================================
// SESSION TALLY
// =============================================================================

/// One line of the end-of-session recap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    /// 1-based round number.
    pub round: u32,
    /// Target code.
    pub target_code: CountryCode,
    /// Target display name.
    pub target_name: String,
    /// Selected code, `None` for ocean or no selection.
    pub guessed_code: Option<CountryCode>,
    /// Selected display name.
    pub guessed_name: Option<String>,
    /// Whether the answer was right.
    pub is_correct: bool,
    /// Points earned.
    pub score: ScoreBreakdown,
    /// Resolved by countdown expiry rather than an explicit submit.
    pub timed_out: bool,
}

/// Running total, correct count and per-round history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScore {
    total: u32,
    correct_count: u32,
    history: Vec<RoundRecord>,
}

impl SessionScore {
    /// Empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one resolved round.
    pub fn record(&mut self, record: RoundRecord) {
        self.total += record.score.total;
        if record.is_correct {
            self.correct_count += 1;
        }
        self.history.push(record);
    }

    /// Clear for a new session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Points so far.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Correct answers so far.
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    /// Rounds in play order.
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// Rounds resolved.
    pub fn rounds_played(&self) -> usize {
        self.history.len()
    }
}
