//! Deterministic Country Sequencer
//!
//! Chooses which countries a session plays, in order. Free play, the daily
//! puzzle and challenge links all run the same algorithm; only the randomness
//! source differs.
//!
//! ## Algorithm
//!
//! 1. Split the country set into the continent-filtered pool and the rest,
//!    both in supplied order.
//! 2. Fisher-Yates shuffle the pool, then the rest, with the session RNG.
//!    These are the only draws; picks themselves consume no randomness.
//! 3. For round `i`, take the first unused pool entry within the round's
//!    difficulty ceiling `[1,1,1,2,2,2,3,3,3,3][i]`.
//! 4. Otherwise relax to the first unused pool entry of any difficulty.
//! 5. Otherwise relax to the first unused entry of the rest.
//! 6. Otherwise the sequence ends early.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::rng::{RandomSource, SessionRng};
use crate::core::seed::{daily_seed_string, string_to_seed, ChallengeToken};
use crate::game::country::{ContinentFilter, Country, CountryCode, CountrySet, Difficulty};

/// Difficulty ceiling per round of a standard 10-round session.
pub const DIFFICULTY_CEILINGS: [Difficulty; 10] = [
    Difficulty::Easy,
    Difficulty::Easy,
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Medium,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Hard,
    Difficulty::Hard,
    Difficulty::Hard,
];

/// Difficulty ceiling for a 0-based round index. Rounds past the table are unrestricted.
#[inline]
pub fn difficulty_ceiling(round_index: usize) -> Difficulty {
    DIFFICULTY_CEILINGS
        .get(round_index)
        .copied()
        .unwrap_or(Difficulty::Hard)
}

// =============================================================================
// SELECTION MODE
// =============================================================================

/// Where a session's randomness comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Unseeded, different every time.
    FreePlay,
    /// Globally shared puzzle for one calendar date.
    Daily {
        /// Puzzle date in the reset timezone.
        date: NaiveDate,
    },
    /// Shareable link.
    Challenge {
        /// Link token.
        token: ChallengeToken,
    },
}

impl SelectionMode {
    /// The string the seed is folded from, if seeded.
    pub fn seed_string(&self) -> Option<String> {
        match self {
            Self::FreePlay => None,
            Self::Daily { date } => Some(daily_seed_string(*date)),
            Self::Challenge { token } => Some(token.as_str().to_owned()),
        }
    }

    /// 32-bit seed, if seeded.
    pub fn seed(&self) -> Option<u32> {
        self.seed_string().map(|s| string_to_seed(&s))
    }

    /// Fresh randomness for a session in this mode.
    pub fn rng(&self) -> SessionRng {
        match self.seed() {
            Some(seed) => SessionRng::seeded(seed),
            None => SessionRng::entropy(),
        }
    }

    /// Whether this is the daily puzzle.
    pub fn is_daily(&self) -> bool {
        matches!(self, Self::Daily { .. })
    }

    /// Short label for logs and events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FreePlay => "free",
            Self::Daily { .. } => "daily",
            Self::Challenge { .. } => "challenge",
        }
    }
}

// =============================================================================
// SEQUENCER
// =============================================================================

/// Which rule produced a pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickRule {
    /// Within the round's difficulty ceiling and the continent filter.
    Tier,
    /// Ceiling relaxed; still inside the continent filter.
    ContinentFallback,
    /// Continent filter dropped as well.
    AnyFallback,
}

/// One selected country.
#[derive(Clone, Copy, Debug)]
pub struct Pick<'a> {
    /// 0-based round index.
    pub round_index: usize,
    /// The chosen country.
    pub country: &'a Country,
    /// Rule that produced it.
    pub rule: PickRule,
}

/// Incremental selector over a shuffled country set.
///
/// Holds indices into the [`CountrySet`] it was built from; pass the same set
/// to [`Sequencer::next_pick`].
#[derive(Clone, Debug)]
pub struct Sequencer {
    /// Continent-filtered indices, shuffled.
    pool: Vec<usize>,
    /// Remaining indices, shuffled.
    rest: Vec<usize>,
    used: BTreeSet<CountryCode>,
    round_index: usize,
}

impl Sequencer {
    /// Shuffle the country set for a new session.
    pub fn new<R: RandomSource>(countries: &CountrySet, filter: &ContinentFilter, rng: &mut R) -> Self {
        let (mut pool, mut rest): (Vec<usize>, Vec<usize>) =
            (0..countries.len()).partition(|&i| filter.matches(&countries.as_slice()[i]));

        rng.shuffle(&mut pool);
        rng.shuffle(&mut rest);

        Self {
            pool,
            rest,
            used: BTreeSet::new(),
            round_index: 0,
        }
    }

    /// Codes already handed out.
    pub fn used(&self) -> &BTreeSet<CountryCode> {
        &self.used
    }

    /// Index of the next round to be picked.
    pub fn round_index(&self) -> usize {
        self.round_index
    }

    /// Pick the next round's country, or `None` when nothing unused remains.
    pub fn next_pick<'a>(&mut self, countries: &'a CountrySet) -> Option<Pick<'a>> {
        let all = countries.as_slice();
        let ceiling = difficulty_ceiling(self.round_index);
        let unused = |i: &&usize| !self.used.contains(all[**i].code.as_str());

        let (index, rule) = if let Some(&i) = self
            .pool
            .iter()
            .filter(unused)
            .find(|&&i| all[i].difficulty <= ceiling)
        {
            (i, PickRule::Tier)
        } else if let Some(&i) = self.pool.iter().find(unused) {
            (i, PickRule::ContinentFallback)
        } else if let Some(&i) = self.rest.iter().find(unused) {
            (i, PickRule::AnyFallback)
        } else {
            debug!(round = self.round_index, "country pool exhausted");
            return None;
        };

        let country = &all[index];
        if rule != PickRule::Tier {
            debug!(
                round = self.round_index,
                code = %country.code,
                ?rule,
                ceiling = ceiling.level(),
                "difficulty ceiling relaxed"
            );
        }

        self.used.insert(country.code.clone());
        let pick = Pick {
            round_index: self.round_index,
            country,
            rule,
        };
        self.round_index += 1;
        Some(pick)
    }
}

/// Select up to `rounds` distinct countries.
///
/// Shorter than `rounds` only when fewer countries exist; empty for an empty set.
pub fn select_sequence<'a, R: RandomSource>(
    countries: &'a CountrySet,
    filter: &ContinentFilter,
    rounds: usize,
    rng: &mut R,
) -> Vec<Pick<'a>> {
    let mut sequencer = Sequencer::new(countries, filter, rng);
    let mut picks = Vec::with_capacity(rounds.min(countries.len()));
    while picks.len() < rounds {
        match sequencer.next_pick(countries) {
            Some(pick) => picks.push(pick),
            None => break,
        }
    }
    picks
}

/// Codes of a seeded sequence: the form daily puzzles and challenge links are compared in.
pub fn select_codes(countries: &CountrySet, filter: &ContinentFilter, rounds: usize, seed: u32) -> Vec<CountryCode> {
    let mut rng = SessionRng::seeded(seed);
    select_sequence(countries, filter, rounds, &mut rng)
        .into_iter()
        .map(|pick| pick.country.code.clone())
        .collect()
}
