//! Game Data
//!
//! Country list plus boundary features, validated once before the first
//! round and shared read-only by every session.

use tracing::{info, warn};

use crate::core::geo::{BoundingBox, LatLng};
use crate::game::country::{Country, CountrySet, DataError};
use crate::game::hit_test::{BoundaryFeature, BoundaryIndex};

/// Everything the engine reads about the world.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    /// Countries in supplied order.
    pub countries: CountrySet,
    /// Boundary geometry.
    pub boundaries: BoundaryIndex,
}

impl GameData {
    /// Validate countries and index boundaries.
    ///
    /// Features for codes missing from the country list are kept (they still
    /// resolve clicks) but logged.
    pub fn new(countries: Vec<Country>, features: Vec<BoundaryFeature>) -> Result<Self, DataError> {
        let countries = CountrySet::new(countries)?;

        let orphans = features
            .iter()
            .filter(|f| !countries.contains(f.code.as_str()))
            .count();
        if orphans > 0 {
            warn!("{} boundary features have no matching country", orphans);
        }

        let boundaries = BoundaryIndex::new(features);
        info!(
            "Game data loaded: {} countries, {} boundary features",
            countries.len(),
            boundaries.len()
        );

        Ok(Self { countries, boundaries })
    }

    /// Display name of `code` in `lang`.
    pub fn country_name(&self, code: &str, lang: &str) -> Option<&str> {
        self.countries.get(code).map(|c| c.name.resolve(lang))
    }

    /// Outline box of a country.
    pub fn bounds(&self, code: &str) -> Option<BoundingBox> {
        self.boundaries.bounds(code)
    }

    /// Where a panel pick puts its marker: the outline box center, else the
    /// capital.
    pub fn marker_point(&self, code: &str) -> Option<LatLng> {
        self.bounds(code)
            .map(|b| b.center())
            .or_else(|| self.countries.get(code).and_then(Country::capital))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::country::Difficulty;

    #[test]
    fn test_marker_point() {
        let data = GameData::new(
            vec![
                Country::new("FR", "France", "Europe", Difficulty::Easy),
                Country::new("MC", "Monaco", "Europe", Difficulty::Hard).with_capital(43.73, 7.42),
            ],
            vec![
                BoundaryFeature::rectangle("FR", -4.0, 42.0, 8.0, 51.0),
                BoundaryFeature::rectangle("ZZ", 0.0, 0.0, 1.0, 1.0),
            ],
        )
        .unwrap();

        assert_eq!(data.marker_point("FR"), Some(LatLng::new(46.5, 2.0)));
        assert_eq!(data.marker_point("MC"), Some(LatLng::new(43.73, 7.42)));
        assert_eq!(data.marker_point("XX"), None);
        assert_eq!(data.country_name("FR", "fr"), Some("France"));
        assert_eq!(data.boundaries.len(), 2);
    }

    #[test]
    fn test_rejects_bad_countries() {
        let err = GameData::new(vec![Country::new("", "?", "Europe", Difficulty::Easy)], vec![]).unwrap_err();
        assert_eq!(err, DataError::EmptyCode);
    }
}
