//! Geographic Primitives
//!
//! Latitude/longitude points, axis-aligned bounding boxes in degrees, and
//! great-circle distance.
//!
//! Coordinates follow the map convention: `lat` in [-90, 90], `lng` in
//! [-180, 180]. Boundary rings use GeoJSON `[lng, lat]` ordering; see
//! [`LatLng::from_lng_lat`].

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point on the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Origin (Gulf of Guinea).
    pub const ZERO: Self = Self { lat: 0.0, lng: 0.0 };

    /// Create from latitude and longitude.
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create from a GeoJSON `[lng, lat]` position.
    #[inline]
    pub const fn from_lng_lat(position: [f64; 2]) -> Self {
        Self {
            lat: position[1],
            lng: position[0],
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_meters(self, other: LatLng) -> f64 {
        haversine_meters(self, other)
    }
}

impl From<[f64; 2]> for LatLng {
    /// `[lat, lng]`, the order capitals are stored in.
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

/// Haversine distance between two points in meters.
pub fn haversine_meters(a: LatLng, b: LatLng) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_METERS * c
}

/// Axis-aligned bounding box in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge.
    pub min_lng: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lng: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl BoundingBox {
    /// The whole map.
    pub const WORLD: Self = Self {
        min_lng: -180.0,
        min_lat: -90.0,
        max_lng: 180.0,
        max_lat: 90.0,
    };

    /// Create from corners.
    pub const fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    /// Smallest box around GeoJSON `[lng, lat]` positions.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_positions<'a, I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [f64; 2]>,
    {
        positions.into_iter().fold(None, |acc, p| {
            let point = Self::new(p[0], p[1], p[0], p[1]);
            Some(match acc {
                Some(b) => b.union(&point),
                None => point,
            })
        })
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, point: LatLng) -> bool {
        point.lng >= self.min_lng
            && point.lng <= self.max_lng
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }

    /// Whether the two boxes share any area (edges count).
    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lng <= other.max_lng
            && other.min_lng <= self.max_lng
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lng: self.min_lng.min(other.min_lng),
            min_lat: self.min_lat.min(other.min_lat),
            max_lng: self.max_lng.max(other.max_lng),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Center point.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}
