//! Selection Seed Derivation
//!
//! Daily puzzles and challenge links both reduce to a string: the puzzle date
//! or an 8-character token. That string is folded into a 32-bit seed with a
//! polynomial rolling hash, and the seed drives a [`SeededRng`].
//!
//! The fold is part of the published contract: changing it reshuffles every
//! past daily puzzle and invalidates every challenge link already shared.
//!
//! [`SeededRng`]: super::rng::SeededRng

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rng::RandomSource;

/// Length of a challenge token.
pub const CHALLENGE_TOKEN_LEN: usize = 8;

/// Alphabet challenge tokens are drawn from.
pub const CHALLENGE_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Fold a seed string into a 32-bit seed.
///
/// `seed = seed * 31 + code_unit` over UTF-16 code units, wrapped to signed
/// 32 bits, then the absolute value.
pub fn string_to_seed(input: &str) -> u32 {
    let hash = input
        .encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(i32::from(unit)));
    hash.unsigned_abs()
}

/// Seed derivation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    /// Token has the wrong length.
    #[error("challenge token must be {expected} characters, got {actual}")]
    TokenLength {
        /// Required length.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// Token contains a character outside `[a-z0-9]`.
    #[error("challenge token contains invalid character {0:?}")]
    TokenCharacter(char),
}

// =============================================================================
// DAILY PUZZLE DATE
// =============================================================================

/// When the daily puzzle rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyConfig {
    /// Timezone the reset hour is expressed in.
    pub timezone: Tz,
    /// Local hour (0-23) at which a new puzzle starts.
    pub reset_hour: u32,
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Paris,
            reset_hour: 9,
        }
    }
}

/// Calendar date of the daily puzzle active at `now`.
///
/// Before the reset hour the previous day's puzzle is still live.
pub fn daily_puzzle_date(now: DateTime<Utc>, config: &DailyConfig) -> NaiveDate {
    let local = now.with_timezone(&config.timezone);
    let date = local.date_naive();
    if local.hour() < config.reset_hour {
        date - Duration::days(1)
    } else {
        date
    }
}

/// Seed string for a daily puzzle date (`YYYY-MM-DD`).
pub fn daily_seed_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// =============================================================================
// CHALLENGE TOKENS
// =============================================================================

/// Opaque 8-character identifier of a shareable challenge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChallengeToken(String);

impl ChallengeToken {
    /// Generate a fresh token from the given randomness.
    pub fn generate<R: RandomSource>(rng: &mut R) -> Self {
        let token = (0..CHALLENGE_TOKEN_LEN)
            .map(|_| {
                let idx = rng.next_int(CHALLENGE_ALPHABET.len() as u32) as usize;
                char::from(CHALLENGE_ALPHABET[idx])
            })
            .collect();
        Self(token)
    }

    /// Validate a token received from a link.
    pub fn parse(input: &str) -> Result<Self, SeedError> {
        let len = input.chars().count();
        if len != CHALLENGE_TOKEN_LEN {
            return Err(SeedError::TokenLength {
                expected: CHALLENGE_TOKEN_LEN,
                actual: len,
            });
        }
        if let Some(bad) = input
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        {
            return Err(SeedError::TokenCharacter(bad));
        }
        Ok(Self(input.to_owned()))
    }

    /// Token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Seed derived from this token.
    pub fn seed(&self) -> u32 {
        string_to_seed(&self.0)
    }
}

impl fmt::Display for ChallengeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChallengeToken {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChallengeToken {
    type Error = SeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChallengeToken> for String {
    fn from(token: ChallengeToken) -> Self {
        token.0
    }
}
