//! Property-based tests for selection, hints and scoring.
//!
//! Run with: cargo test --release properties

#![allow(missing_docs)]

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use pris_en_flag::core::rng::SeededRng;
use pris_en_flag::core::seed::{string_to_seed, ChallengeToken};
use pris_en_flag::game::score::score;
use pris_en_flag::game::sequencer::{difficulty_ceiling, select_codes, select_sequence, PickRule};
use pris_en_flag::game::{
    ContinentFilter, HintConfig, HintEngine, QuizConfig, QuizSession, RoundTarget, SelectionMode, SessionPhase,
};

/// `(continent index, difficulty level)` pairs.
fn world_layout(max: usize) -> impl Strategy<Value = Vec<(usize, u8)>> {
    prop::collection::vec((0usize..4, 1u8..=3), 0..max)
}

fn filter_strategy() -> impl Strategy<Value = ContinentFilter> {
    prop_oneof![
        Just(ContinentFilter::All),
        (0usize..4).prop_map(|i| ContinentFilter::Only(common::CONTINENTS[i].to_owned())),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Same seed, same list, same filter: same sequence.
    #[test]
    fn prop_sequence_deterministic(layout in world_layout(60), filter in filter_strategy(), seed in any::<u32>()) {
        let countries = common::country_set(&layout);
        let a = select_codes(&countries, &filter, 10, seed);
        let b = select_codes(&countries, &filter, 10, seed);
        prop_assert_eq!(a, b);
    }

    /// Length is min(rounds, countries) and no code repeats.
    #[test]
    fn prop_sequence_no_duplicates(layout in world_layout(40), filter in filter_strategy(), seed in any::<u32>()) {
        let countries = common::country_set(&layout);
        let codes = select_codes(&countries, &filter, 10, seed);
        prop_assert_eq!(codes.len(), countries.len().min(10));
        let distinct: BTreeSet<_> = codes.iter().collect();
        prop_assert_eq!(distinct.len(), codes.len());
    }

    /// Tier picks respect the ceiling; fallbacks happen only when the tier is
    /// exhausted, and stay in the filter while the filter has anything left.
    #[test]
    fn prop_difficulty_ceiling(layout in world_layout(60), filter in filter_strategy(), seed in any::<u32>()) {
        let countries = common::country_set(&layout);
        let picks = select_sequence(&countries, &filter, 10, &mut SeededRng::new(seed));

        let mut used = BTreeSet::new();
        for (i, pick) in picks.iter().enumerate() {
            let ceiling = difficulty_ceiling(i);
            let in_filter_unused = |max_ok: bool| countries.iter().any(|c| {
                !used.contains(c.code.as_str())
                    && filter.matches(c)
                    && (!max_ok || c.difficulty <= ceiling)
            });
            match pick.rule {
                PickRule::Tier => {
                    prop_assert!(pick.country.difficulty <= ceiling);
                    prop_assert!(filter.matches(pick.country));
                }
                PickRule::ContinentFallback => {
                    prop_assert!(!in_filter_unused(true));
                    prop_assert!(filter.matches(pick.country));
                }
                PickRule::AnyFallback => {
                    prop_assert!(!in_filter_unused(false));
                }
            }
            used.insert(pick.country.code.as_str().to_owned());
        }
    }

    /// Generated challenge tokens survive a trip through a link and keep their seed.
    #[test]
    fn prop_challenge_token_parses(seed in any::<u32>()) {
        let token = ChallengeToken::generate(&mut SeededRng::new(seed));
        let parsed = ChallengeToken::parse(token.as_str()).unwrap();
        prop_assert_eq!(parsed.as_str().len(), 8);
        prop_assert_eq!(parsed.seed(), string_to_seed(token.as_str()));
    }

    /// Correct answers score within [0, 1700]; wrong ones score zero; the
    /// panel halves the variable bonuses.
    #[test]
    fn prop_score_bounds(
        elapsed in 0u64..60_000,
        progress in 0.0f64..=1.0,
        distance in proptest::option::of(0.0f64..200_000.0),
        correct in any::<bool>(),
    ) {
        let plain = score(correct, elapsed, progress, distance, false);
        let panel = score(correct, elapsed, progress, distance, true);

        if !correct {
            prop_assert_eq!(plain.total, 0);
            prop_assert_eq!(panel.total, 0);
        } else {
            prop_assert!(plain.total <= 1700);
            prop_assert_eq!(plain.total, plain.time_bonus + plain.hint_bonus + plain.capital_bonus);
            prop_assert_eq!(panel.capital_bonus, 0);
            prop_assert_eq!(panel.time_bonus, (plain.time_bonus + 1) / 2);
            prop_assert_eq!(panel.hint_bonus, (plain.hint_bonus + 1) / 2);
            prop_assert_eq!(
                panel.panel_penalty,
                (plain.time_bonus - panel.time_bonus) + (plain.hint_bonus - panel.hint_bonus)
            );
        }
    }

    /// Under any interleaving of idle episodes, activity and polls, hint
    /// flags never revert and progress never decreases.
    #[test]
    fn prop_hint_monotonic(
        layout in world_layout(30).prop_filter("non-empty", |s| !s.is_empty()),
        steps in prop::collection::vec((0u8..3, 1u64..4000), 1..80),
        seed in any::<u32>(),
    ) {
        let data = common::game_data(&layout);
        let target = RoundTarget::from(&data.countries.as_slice()[0]);
        let mut engine = HintEngine::new(HintConfig::default());
        engine.set_target(target, &data.countries, &data.boundaries, &mut SeededRng::new(seed));

        let mut now = 0;
        let mut idle = false;
        let mut before = *engine.state();
        for (action, dt) in steps {
            now += dt;
            match action {
                0 => { idle = true; engine.on_idle(now); }
                1 => { idle = false; engine.on_activity(); }
                _ => { engine.poll(now, idle); }
            }
            let after = *engine.state();
            prop_assert!(!before.continent_revealed || after.continent_revealed);
            prop_assert!(!before.candidates_revealed || after.candidates_revealed);
            prop_assert!(!before.elimination_started || after.elimination_started);
            prop_assert!(after.eliminated_count >= before.eliminated_count);
            prop_assert!(after.eliminated_count < after.total_candidates.max(1));
            prop_assert!(after.progress() >= before.progress());
            prop_assert!(engine.shortlist().remaining().any(|c| Some(c) == engine.target().map(|t| &t.code)));
            before = after;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Double submits and late ticks never add history entries.
    #[test]
    fn prop_one_shot_submission(
        layout in world_layout(30),
        extra_submits in 0usize..4,
        late_tick in 0u64..100_000,
        seed in "[a-z0-9]{8}",
    ) {
        let data = Arc::new(common::game_data(&layout));
        let mut session = QuizSession::new(data, QuizConfig::default());
        let token = ChallengeToken::parse(&seed).unwrap();
        session.start(SelectionMode::Challenge { token }, ContinentFilter::All, 0);

        let mut now = 0;
        let mut rounds = 0;
        while session.phase() == SessionPhase::RoundActive {
            now += 1000;
            prop_assert!(session.submit(now).is_some());
            for _ in 0..extra_submits {
                prop_assert!(session.submit(now).is_none());
            }
            prop_assert!(!session.tick(now + late_tick).timed_out);
            rounds += 1;
            prop_assert_eq!(session.score().rounds_played(), rounds);
            session.next_round(now).unwrap();
        }
        prop_assert_eq!(rounds, layout.len().min(10));
    }
}
