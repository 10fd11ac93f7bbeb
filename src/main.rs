//! Pris en Flag Engine demo
//!
//! Plays today's daily puzzle over a synthetic world with a scripted player,
//! then replays it to check that the puzzle reproduces.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pris_en_flag::{
    core::{
        clock::{Clock, ManualClock},
        hash::fingerprint_hex,
        rng::EntropyRng,
        seed::{daily_puzzle_date, ChallengeToken, DailyConfig},
    },
    game::{
        BoundaryFeature, ContinentFilter, Country, CountryCode, Difficulty, GameData, QuizConfig, QuizEventData,
        QuizSession, SelectionMode, SessionPhase,
    },
    LatLng, ROUND_COUNT, ROUND_DURATION_MS, VERSION,
};

/// Tick period of the scripted player.
const TICK_MS: u64 = 100;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("Pris en Flag Engine v{}", VERSION);
    info!("Rounds: {}, round duration: {} ms", ROUND_COUNT, ROUND_DURATION_MS);

    let data = Arc::new(synthetic_world().context("building synthetic world")?);

    let date = daily_puzzle_date(Utc::now(), &DailyConfig::default());
    info!("Daily puzzle date: {}", date);

    let first = play_scripted(Arc::clone(&data), SelectionMode::Daily { date })?;
    let replay = play_scripted(Arc::clone(&data), SelectionMode::Daily { date })?;

    if first.0 != replay.0 || first.1 != replay.1 {
        bail!("daily puzzle did not reproduce");
    }
    info!("Replay matches: fingerprint {} score {}", first.0, first.1);

    let token = ChallengeToken::generate(&mut EntropyRng::new());
    info!("Challenge link token {} (seed {})", token, token.seed());
    let challenge = play_scripted(data, SelectionMode::Challenge { token })?;
    info!("Challenge fingerprint {}", challenge.0);

    Ok(())
}

/// Play one session: idle until the second hint on odd rounds, click the
/// target's center on even rounds, click the ocean otherwise.
///
/// Returns the puzzle fingerprint and final score.
fn play_scripted(data: Arc<GameData>, mode: SelectionMode) -> Result<(String, u32)> {
    let clock = ManualClock::new(0);
    let mut session = QuizSession::new(Arc::clone(&data), QuizConfig::default());
    session.start(mode, ContinentFilter::All, clock.now_ms());

    while session.phase() == SessionPhase::RoundActive {
        let round = session.round();
        let wait = if round % 2 == 1 { 6_500 } else { 1_200 };
        let end = clock.now_ms() + wait;
        while clock.now_ms() < end {
            let result = session.tick(clock.advance(TICK_MS));
            log_events(&result.events);
        }

        let point = match session.target() {
            Some(target) if round % 2 == 0 => data
                .bounds(target.code.as_str())
                .map_or(LatLng::ZERO, |b| b.center()),
            _ => LatLng::new(-45.0, -140.0),
        };
        let picked: Option<CountryCode> = session.select_at(point, clock.now_ms())?;
        info!("Round {} clicked {:?}", round, picked.as_ref().map(CountryCode::as_str));

        session.submit(clock.now_ms());
        log_events(&session.take_events());
        session.next_round(clock.advance(TICK_MS))?;
    }
    log_events(&session.take_events());

    let fingerprint = session
        .puzzle_fingerprint()
        .map(fingerprint_hex)
        .context("seeded session has no fingerprint")?;
    Ok((fingerprint, session.score().total()))
}

fn log_events(events: &[pris_en_flag::QuizEvent]) {
    for event in events {
        match &event.data {
            QuizEventData::TargetSet { code, continent, .. } => {
                info!("[{}] round {} target {} ({})", event.at, event.round, code, continent)
            }
            QuizEventData::ContinentRevealed { continent, countries, .. } => {
                info!("[{}] hint: continent {} ({} countries)", event.at, continent, countries.len())
            }
            QuizEventData::CandidatesRevealed { candidates, .. } => {
                info!("[{}] hint: {} candidates", event.at, candidates.len())
            }
            QuizEventData::RoundResolved { record, session_total } => info!(
                "[{}] round {} {} +{} (total {})",
                event.at,
                record.round,
                if record.is_correct { "correct" } else { "wrong" },
                record.score.total,
                session_total
            ),
            QuizEventData::DailyRecordReady { record } => {
                info!("daily record: {} points, {} correct", record.score, record.correct_count)
            }
            _ => {}
        }
    }
}

/// A grid of rectangular countries over five continents.
fn synthetic_world() -> Result<GameData> {
    let continents = [
        ("Europe", 0.0, 40.0),
        ("Africa", 0.0, -20.0),
        ("Asia", 80.0, 20.0),
        ("Americas", -100.0, 0.0),
        ("Oceania", 130.0, -30.0),
    ];

    let mut countries = Vec::new();
    let mut features = Vec::new();
    for (c, (continent, lng0, lat0)) in continents.iter().enumerate() {
        for i in 0..8 {
            let code = format!("{}{}", (b'A' + c as u8) as char, (b'A' + i as u8) as char);
            let difficulty = Difficulty::from_level(i as u8 % 3 + 1).unwrap_or_default();
            let min_lng = lng0 + f64::from(i % 4) * 6.0;
            let min_lat = lat0 + f64::from(i / 4) * 6.0;

            countries.push(
                Country::new(&code, &format!("Country {code}"), continent, difficulty)
                    .with_capital(min_lat + 3.0, min_lng + 3.0),
            );
            features.push(BoundaryFeature::rectangle(&code, min_lng, min_lat, min_lng + 6.0, min_lat + 6.0));
        }
    }

    Ok(GameData::new(countries, features)?)
}
