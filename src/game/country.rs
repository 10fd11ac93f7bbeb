//! Country Definitions
//!
//! The read-only country set supplied by the host. Iteration order is the
//! order the host supplied, and selection reproducibility depends on it:
//! two clients with the same seed and the same list produce the same puzzle.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::geo::LatLng;

// =============================================================================
// COUNTRY CODE
// =============================================================================

/// ISO 3166-1 alpha-2 code, the unique key of a country.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Wrap a code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Code text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for CountryCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// LOCALIZED TEXT
// =============================================================================

/// A display name, either a single string or one entry per language tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    /// Same text in every language.
    Plain(String),
    /// Language tag -> text.
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Fallback language when the requested one is missing.
    pub const FALLBACK_LANG: &'static str = "en";

    /// Text for `lang`, falling back to English, then to any entry.
    pub fn resolve(&self, lang: &str) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Localized(entries) => entries
                .get(lang)
                .or_else(|| entries.get(Self::FALLBACK_LANG))
                .or_else(|| entries.values().next())
                .map_or("", String::as_str),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_owned())
    }
}

// =============================================================================
// DIFFICULTY
// =============================================================================

/// Difficulty tier of a country (1 = famous, 3 = obscure).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Difficulty {
    /// Tier 1: major, widely recognised flags.
    Easy = 1,
    /// Tier 2: known but less famous.
    Medium = 2,
    /// Tier 3: everything else. Countries without a rating land here.
    #[default]
    Hard = 3,
}

impl Difficulty {
    /// Numeric tier (1-3).
    #[inline]
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Tier from its number.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Easy),
            2 => Some(Self::Medium),
            3 => Some(Self::Hard),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = DataError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_level(value).ok_or(DataError::InvalidDifficulty(value))
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.level()
    }
}

// =============================================================================
// COUNTRY
// =============================================================================

/// A country as supplied by the dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Unique ISO code.
    pub code: CountryCode,
    /// Display name.
    pub name: LocalizedText,
    /// Continent name, used for filters and hints.
    pub continent: String,
    /// Optional subregion.
    #[serde(default)]
    pub subregion: Option<String>,
    /// Capital as `[lat, lng]`.
    #[serde(default)]
    pub capital_coords: Option<[f64; 2]>,
    /// Flag asset reference, passed through to the renderer.
    #[serde(default)]
    pub flag: Option<String>,
    /// Difficulty tier, 3 when absent.
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Country {
    /// Minimal country, mostly for fixtures.
    pub fn new(code: &str, name: &str, continent: &str, difficulty: Difficulty) -> Self {
        Self {
            code: CountryCode::new(code),
            name: LocalizedText::from(name),
            continent: continent.to_owned(),
            subregion: None,
            capital_coords: None,
            flag: None,
            difficulty,
        }
    }

    /// Builder-style capital.
    pub fn with_capital(mut self, lat: f64, lng: f64) -> Self {
        self.capital_coords = Some([lat, lng]);
        self
    }

    /// Capital as a map point.
    pub fn capital(&self) -> Option<LatLng> {
        self.capital_coords.map(LatLng::from)
    }
}

// =============================================================================
// ROUND TARGET
// =============================================================================

/// The country to find in the current round. Fixed for the round's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTarget {
    /// Target code.
    pub code: CountryCode,
    /// Target continent, what the first hint reveals.
    pub continent: String,
}

impl From<&Country> for RoundTarget {
    fn from(country: &Country) -> Self {
        Self {
            code: country.code.clone(),
            continent: country.continent.clone(),
        }
    }
}

// =============================================================================
// CONTINENT FILTER
// =============================================================================

/// Restricts selection to one continent.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContinentFilter {
    /// Every continent.
    #[default]
    All,
    /// Only the named continent.
    Only(String),
}

impl ContinentFilter {
    /// Parse the `region` value of a link: `"all"` or empty means no filter.
    pub fn from_param(param: &str) -> Self {
        if param.is_empty() || param.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(param.to_owned())
        }
    }

    /// Whether `country` passes the filter.
    #[inline]
    pub fn matches(&self, country: &Country) -> bool {
        match self {
            Self::All => true,
            Self::Only(continent) => country.continent == *continent,
        }
    }
}

impl fmt::Display for ContinentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(continent) => f.write_str(continent),
        }
    }
}

// =============================================================================
// COUNTRY SET
// =============================================================================

/// Dataset validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// Two countries share a code.
    #[error("duplicate country code {0}")]
    DuplicateCode(CountryCode),

    /// A country has an empty code.
    #[error("country code must not be empty")]
    EmptyCode,

    /// Difficulty outside 1..=3.
    #[error("difficulty must be 1, 2 or 3, got {0}")]
    InvalidDifficulty(u8),
}

/// Validated, ordered collection of countries.
#[derive(Clone, Debug, Default)]
pub struct CountrySet {
    countries: Vec<Country>,
    index: BTreeMap<CountryCode, usize>,
}

impl CountrySet {
    /// Validate and index a country list, keeping its order.
    pub fn new(countries: Vec<Country>) -> Result<Self, DataError> {
        let mut index = BTreeMap::new();
        for (i, country) in countries.iter().enumerate() {
            if country.code.as_str().is_empty() {
                return Err(DataError::EmptyCode);
            }
            if index.insert(country.code.clone(), i).is_some() {
                return Err(DataError::DuplicateCode(country.code.clone()));
            }
        }
        Ok(Self { countries, index })
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Countries in supplied order.
    pub fn iter(&self) -> std::slice::Iter<'_, Country> {
        self.countries.iter()
    }

    /// Countries as a slice.
    pub fn as_slice(&self) -> &[Country] {
        &self.countries
    }

    /// Look up by code.
    pub fn get(&self, code: &str) -> Option<&Country> {
        self.index.get(code).map(|&i| &self.countries[i])
    }

    /// Whether a code exists.
    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Countries on one continent, in supplied order.
    pub fn on_continent<'a>(&'a self, continent: &'a str) -> impl Iterator<Item = &'a Country> + 'a {
        self.countries.iter().filter(move |c| c.continent == continent)
    }

    /// Distinct continent names, sorted.
    pub fn continents(&self) -> BTreeSet<&str> {
        self.countries.iter().map(|c| c.continent.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a CountrySet {
    type Item = &'a Country;
    type IntoIter = std::slice::Iter<'a, Country>;

    fn into_iter(self) -> Self::IntoIter {
        self.countries.iter()
    }
}
