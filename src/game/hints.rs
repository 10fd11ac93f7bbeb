//! Hint Progression Engine
//!
//! One-way stage machine per round:
//!
//! ```text
//! None -> Continent -> Candidates -> Eliminating -> Exhausted
//! ```
//!
//! Each step is triggered by an idle episode and then repeats on a fixed
//! cadence while the player stays idle. Activity disarms the repeat but never
//! rolls a stage back. The shortlist is fixed once per round when the target
//! is set; elimination consumes its decoys one at a time and never the target.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::clock::Millis;
use crate::core::geo::BoundingBox;
use crate::core::rng::RandomSource;
use crate::game::country::{CountryCode, CountrySet, RoundTarget};
use crate::game::hit_test::BoundaryIndex;

/// Weight of the continent hint in [`HintState::progress`].
pub const CONTINENT_WEIGHT: f64 = 0.2;
/// Weight of the candidates hint.
pub const CANDIDATES_WEIGHT: f64 = 0.3;
/// Weight of full elimination.
pub const ELIMINATION_WEIGHT: f64 = 0.5;

/// Hint pacing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    /// Minimum time between two hint steps.
    pub min_interval_ms: Millis,
    /// Shortlist size including the target.
    pub max_shortlist: usize,
    /// Continuous time away from the target before a wrong-area notice.
    pub wrong_area_dwell_ms: Millis,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 3000,
            max_shortlist: 10,
            wrong_area_dwell_ms: 3000,
        }
    }
}

// =============================================================================
// HINT STATE
// =============================================================================

/// Stage reached in the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HintStage {
    /// No hint shown.
    None,
    /// Continent revealed.
    Continent,
    /// Shortlist revealed.
    Candidates,
    /// Decoys being removed.
    Eliminating,
    /// Only the target is left.
    Exhausted,
}

/// The kind of the next hint step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    /// Reveal the continent.
    Continent,
    /// Reveal the shortlist.
    Candidates,
    /// Remove one decoy.
    Elimination,
}

/// Hints revealed so far. Monotonic within a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintState {
    /// Continent hint shown.
    pub continent_revealed: bool,
    /// Shortlist shown.
    pub candidates_revealed: bool,
    /// First elimination step taken.
    pub elimination_started: bool,
    /// Decoys removed so far.
    pub eliminated_count: u32,
    /// Shortlist size including the target.
    pub total_candidates: u32,
}

impl HintState {
    /// Empty state for a shortlist of `total_candidates`.
    pub fn new(total_candidates: u32) -> Self {
        Self {
            total_candidates,
            ..Self::default()
        }
    }

    /// Next step to take, `None` once exhausted.
    pub fn next_hint(&self) -> Option<HintKind> {
        if !self.continent_revealed {
            return Some(HintKind::Continent);
        }
        if !self.candidates_revealed {
            return Some(HintKind::Candidates);
        }
        if !self.elimination_started || self.eliminated_count < self.decoy_count() {
            return Some(HintKind::Elimination);
        }
        None
    }

    /// Current stage.
    pub fn stage(&self) -> HintStage {
        if self.elimination_started {
            if self.next_hint().is_none() {
                HintStage::Exhausted
            } else {
                HintStage::Eliminating
            }
        } else if self.candidates_revealed {
            HintStage::Candidates
        } else if self.continent_revealed {
            HintStage::Continent
        } else {
            HintStage::None
        }
    }

    /// Share of hints consumed, in `[0, 1]`.
    ///
    /// A shortlist without decoys adds nothing for elimination.
    pub fn progress(&self) -> f64 {
        let mut progress = 0.0;
        if self.continent_revealed {
            progress += CONTINENT_WEIGHT;
        }
        if self.candidates_revealed {
            progress += CANDIDATES_WEIGHT;
        }
        if self.elimination_started && self.total_candidates > 1 {
            let ratio = f64::from(self.eliminated_count) / f64::from(self.total_candidates - 1);
            progress += ELIMINATION_WEIGHT * ratio;
        }
        progress.clamp(0.0, 1.0)
    }

    fn decoy_count(&self) -> u32 {
        self.total_candidates.saturating_sub(1)
    }
}

// =============================================================================
// SHORTLIST
// =============================================================================

/// The target plus up to `max - 1` same-continent decoys, in shuffled order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortlist {
    target: Option<CountryCode>,
    candidates: Vec<CountryCode>,
    eliminated: Vec<CountryCode>,
}

impl Shortlist {
    /// Draw decoys from `pool` (the target is skipped if present).
    pub fn build<R: RandomSource>(target: &CountryCode, pool: &[CountryCode], max: usize, rng: &mut R) -> Self {
        let mut decoys: Vec<CountryCode> = pool.iter().filter(|c| *c != target).cloned().collect();
        rng.shuffle(&mut decoys);
        decoys.truncate(max.saturating_sub(1));

        let mut candidates = Vec::with_capacity(decoys.len() + 1);
        candidates.push(target.clone());
        candidates.extend(decoys);
        rng.shuffle(&mut candidates);

        Self {
            target: Some(target.clone()),
            candidates,
            eliminated: Vec::new(),
        }
    }

    /// All candidates in display order.
    pub fn candidates(&self) -> &[CountryCode] {
        &self.candidates
    }

    /// Decoys removed so far, in removal order.
    pub fn eliminated(&self) -> &[CountryCode] {
        &self.eliminated
    }

    /// Candidates still shown.
    pub fn remaining(&self) -> impl Iterator<Item = &CountryCode> {
        self.candidates.iter().filter(move |c| !self.eliminated.contains(c))
    }

    /// Whether `code` is on the list.
    pub fn contains(&self, code: &str) -> bool {
        self.candidates.iter().any(|c| c.as_str() == code)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the list is empty (no target set).
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Remove the first remaining decoy in display order.
    pub fn eliminate_next(&mut self) -> Option<CountryCode> {
        let next = self
            .candidates
            .iter()
            .find(|c| Some(*c) != self.target.as_ref() && !self.eliminated.contains(c))
            .cloned()?;
        self.eliminated.push(next.clone());
        Some(next)
    }
}

// =============================================================================
// VIEWPORT / WRONG AREA
// =============================================================================

/// What the player is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Visible region.
    pub bounds: BoundingBox,
    /// Whether the player panned or zoomed by hand since the round began.
    pub user_adjusted: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::WORLD,
            user_adjusted: false,
        }
    }
}

impl Viewport {
    /// Whether `target` is at least partly visible. Unknown bounds count as visible.
    pub fn shows(&self, target: Option<&BoundingBox>) -> bool {
        target.map_or(true, |b| self.bounds.intersects(b))
    }
}

/// Fires once per continuous dwell away from the target.
#[derive(Debug, Clone, Default)]
pub struct WrongAreaDetector {
    dwell_ms: Millis,
    away_since: Option<Millis>,
}

impl WrongAreaDetector {
    /// Detector with the given dwell.
    pub fn new(dwell_ms: Millis) -> Self {
        Self {
            dwell_ms,
            away_since: None,
        }
    }

    /// Forget any dwell in progress.
    pub fn reset(&mut self) {
        self.away_since = None;
    }

    /// Feed one observation. Returns true when a notice is due.
    pub fn observe(&mut self, now: Millis, away: bool) -> bool {
        if !away {
            self.away_since = None;
            return false;
        }
        let since = *self.away_since.get_or_insert(now);
        if now.saturating_sub(since) >= self.dwell_ms {
            // Start a fresh dwell so the notice does not repeat every check.
            self.away_since = Some(now);
            return true;
        }
        false
    }
}

// =============================================================================
// HINT ENGINE
// =============================================================================

/// One hint step, with the data a renderer needs to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintStep {
    /// Highlight the target's continent.
    ContinentRevealed {
        /// Continent name.
        continent: String,
        /// Countries on it that can be highlighted.
        countries: Vec<CountryCode>,
    },
    /// Highlight the shortlist.
    CandidatesRevealed {
        /// Shortlist in display order.
        candidates: Vec<CountryCode>,
    },
    /// Remove one decoy.
    CandidateEliminated {
        /// Decoy removed.
        code: CountryCode,
        /// Candidates left, target included.
        remaining: usize,
    },
}

/// Per-round hint progression.
#[derive(Debug, Clone)]
pub struct HintEngine {
    config: HintConfig,
    target: Option<RoundTarget>,
    continent_set: Vec<CountryCode>,
    shortlist: Shortlist,
    state: HintState,
    last_step_at: Option<Millis>,
    /// Next repeat while idle; `None` when disarmed.
    next_due: Option<Millis>,
    wrong_area: WrongAreaDetector,
}

impl HintEngine {
    /// Engine with no target.
    pub fn new(config: HintConfig) -> Self {
        Self {
            config,
            target: None,
            continent_set: Vec::new(),
            shortlist: Shortlist::default(),
            state: HintState::default(),
            last_step_at: None,
            next_due: None,
            wrong_area: WrongAreaDetector::new(config.wrong_area_dwell_ms),
        }
    }

    /// Drop the target and every per-round value.
    pub fn reset(&mut self) {
        self.target = None;
        self.continent_set.clear();
        self.shortlist = Shortlist::default();
        self.state = HintState::default();
        self.last_step_at = None;
        self.next_due = None;
        self.wrong_area.reset();
    }

    /// Fix the round's target, continent set and shortlist.
    pub fn set_target<R: RandomSource>(
        &mut self,
        target: RoundTarget,
        countries: &CountrySet,
        boundaries: &BoundaryIndex,
        rng: &mut R,
    ) {
        self.reset();

        self.continent_set = countries
            .on_continent(&target.continent)
            .filter(|c| boundaries.contains_code(c.code.as_str()))
            .map(|c| c.code.clone())
            .collect();
        self.shortlist = Shortlist::build(&target.code, &self.continent_set, self.config.max_shortlist, rng);
        self.state = HintState::new(self.shortlist.len() as u32);

        debug!(
            target = %target.code,
            continent = %target.continent,
            shortlist = self.shortlist.len(),
            "hint target set"
        );
        self.target = Some(target);
    }

    /// Idle episode began: take a step if the interval allows and arm the repeat.
    pub fn on_idle(&mut self, now: Millis) -> Option<HintStep> {
        self.target.as_ref()?;
        self.next_due = Some(now + self.config.min_interval_ms);
        self.advance(now)
    }

    /// Periodic check while armed. Steps only when the player is still idle.
    pub fn poll(&mut self, now: Millis, still_idle: bool) -> Option<HintStep> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(now + self.config.min_interval_ms);
        if !still_idle {
            return None;
        }
        self.advance(now)
    }

    /// Player activity: stop repeating, keep everything revealed.
    pub fn on_activity(&mut self) {
        self.disarm();
    }

    /// Cancel the repeat and any wrong-area dwell.
    pub fn disarm(&mut self) {
        self.next_due = None;
        self.wrong_area.reset();
    }

    /// Whether the repeat is armed.
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Advisory check: true once per dwell spent looking away from the target
    /// after the player moved the map by hand while hints are showing.
    pub fn check_wrong_area(&mut self, now: Millis, viewport: &Viewport, target_bounds: Option<&BoundingBox>) -> bool {
        let active = self.target.is_some() && self.state.continent_revealed && viewport.user_adjusted;
        let away = active && !viewport.shows(target_bounds);
        self.wrong_area.observe(now, away)
    }

    fn advance(&mut self, now: Millis) -> Option<HintStep> {
        if let Some(last) = self.last_step_at {
            if now.saturating_sub(last) < self.config.min_interval_ms {
                return None;
            }
        }

        let Some(kind) = self.state.next_hint() else {
            self.next_due = None;
            return None;
        };
        let target = self.target.as_ref()?;

        let step = match kind {
            HintKind::Continent => {
                self.state.continent_revealed = true;
                HintStep::ContinentRevealed {
                    continent: target.continent.clone(),
                    countries: self.continent_set.clone(),
                }
            }
            HintKind::Candidates => {
                self.state.candidates_revealed = true;
                HintStep::CandidatesRevealed {
                    candidates: self.shortlist.candidates().to_vec(),
                }
            }
            HintKind::Elimination => {
                self.state.elimination_started = true;
                let code = self.shortlist.eliminate_next()?;
                self.state.eliminated_count += 1;
                HintStep::CandidateEliminated {
                    code,
                    remaining: self.shortlist.remaining().count(),
                }
            }
        };

        self.last_step_at = Some(now);
        debug!(stage = ?self.state.stage(), progress = self.state.progress(), "hint step");
        Some(step)
    }

    /// Hints revealed so far.
    pub fn state(&self) -> &HintState {
        &self.state
    }

    /// Current stage.
    pub fn stage(&self) -> HintStage {
        self.state.stage()
    }

    /// Hint-progress score metric.
    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    /// This round's shortlist.
    pub fn shortlist(&self) -> &Shortlist {
        &self.shortlist
    }

    /// Highlightable countries on the target's continent.
    pub fn continent_set(&self) -> &[CountryCode] {
        &self.continent_set
    }

    /// Current target.
    pub fn target(&self) -> Option<&RoundTarget> {
        self.target.as_ref()
    }
}
