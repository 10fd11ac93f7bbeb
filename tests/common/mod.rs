//! Shared fixtures for integration tests.

#![allow(dead_code)]

use pris_en_flag::game::{BoundaryFeature, Country, CountrySet, Difficulty, GameData};

/// Continents used by the fixture world.
pub const CONTINENTS: [&str; 4] = ["Europe", "Asia", "Africa", "Americas"];

/// A country list from `(continent index, difficulty level)` pairs, coded `C000`, `C001`...
pub fn countries_from(layout: &[(usize, u8)]) -> Vec<Country> {
    layout.iter()
        .enumerate()
        .map(|(i, &(continent, level))| {
            let code = format!("C{i:03}");
            let difficulty = Difficulty::from_level(level).unwrap_or_default();
            Country::new(&code, &code, CONTINENTS[continent % CONTINENTS.len()], difficulty)
        })
        .collect()
}

/// Validated set from the same layout.
pub fn country_set(layout: &[(usize, u8)]) -> CountrySet {
    CountrySet::new(countries_from(layout)).unwrap()
}

/// Game data where every country is a 1x1 degree square along a row.
pub fn game_data(layout: &[(usize, u8)]) -> GameData {
    let countries = countries_from(layout);
    let features = countries
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let lng = -170.0 + (i % 300) as f64;
            let lat = -60.0 + (i / 300) as f64 * 2.0;
            BoundaryFeature::rectangle(c.code.as_str(), lng, lat, lng + 1.0, lat + 1.0)
        })
        .collect();
    GameData::new(countries, features).unwrap()
}
