#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic helpers: the configured coverage region, distances from the
//! Toulouse reference point, and coordinate rounding for deduplication.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Toulouse city center (Place du Capitole), the reference point for
/// distance enrichment.
pub const TOULOUSE_CENTER: (f64, f64) = (43.6047, 1.4442);

/// Decimal places kept when bucketing coordinates for duplicate detection.
/// Four decimals is roughly 10 m at this latitude.
pub const DEDUP_COORD_DECIMALS: i32 = 4;

/// A lat/lon bounding region that valid spot coordinates must fall within.
///
/// The deployment default covers roughly 100 km around Toulouse, but the
/// bounds are configuration, not a hardcoded box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Region {
    /// Southern latitude bound (decimal degrees).
    pub min_lat: f64,
    /// Northern latitude bound.
    pub max_lat: f64,
    /// Western longitude bound.
    pub min_lon: f64,
    /// Eastern longitude bound.
    pub max_lon: f64,
}

impl Region {
    /// The Toulouse deployment region (~100 km radius).
    pub const TOULOUSE: Self = Self {
        min_lat: 42.5,
        max_lat: 44.5,
        min_lon: -1.0,
        max_lon: 3.0,
    };

    /// Whether a coordinate pair lies within this region.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Overpass-style bbox string: `south,west,north,east`.
    #[must_use]
    pub fn bbox(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::TOULOUSE
    }
}

/// Great-circle distance between two coordinate pairs, in kilometers.
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);
    Haversine.distance(a, b) / 1000.0
}

/// Distance from the Toulouse reference point, rounded to one decimal km.
#[must_use]
pub fn distance_from_toulouse_km(lat: f64, lon: f64) -> f64 {
    let (ref_lat, ref_lon) = TOULOUSE_CENTER;
    (haversine_km(lat, lon, ref_lat, ref_lon) * 10.0).round() / 10.0
}

/// Rounds a coordinate to the dedup bucketing precision.
#[must_use]
pub fn round_coord(value: f64) -> f64 {
    let factor = 10f64.powi(DEDUP_COORD_DECIMALS);
    (value * factor).round() / factor
}

/// Integer bucket key for a coordinate pair at dedup precision.
///
/// Two spots with the same key are within ~10 m of each other.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn coord_key(lat: f64, lon: f64) -> (i64, i64) {
    let factor = 10f64.powi(DEDUP_COORD_DECIMALS);
    ((lat * factor).round() as i64, (lon * factor).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toulouse_region_contains_center() {
        let (lat, lon) = TOULOUSE_CENTER;
        assert!(Region::TOULOUSE.contains(lat, lon));
    }

    #[test]
    fn region_rejects_out_of_bounds() {
        assert!(!Region::TOULOUSE.contains(48.8566, 2.3522)); // Paris
        assert!(!Region::TOULOUSE.contains(43.6, 5.0));
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_km(43.6, 1.44, 43.6, 1.44).abs() < 1e-9);
    }

    #[test]
    fn haversine_known_distance() {
        // Toulouse -> Albi is roughly 64 km as the crow flies.
        let km = haversine_km(43.6047, 1.4442, 43.9289, 2.1464);
        assert!((55.0..75.0).contains(&km), "got {km}");
    }

    #[test]
    fn nearby_points_share_coord_key() {
        // ~1 m apart: same rounded bucket at 4 decimals.
        assert_eq!(
            coord_key(43.604_70, 1.444_20),
            coord_key(43.604_71, 1.444_21)
        );
    }

    #[test]
    fn distant_points_differ_in_coord_key() {
        assert_ne!(coord_key(43.6047, 1.4442), coord_key(43.6057, 1.4442));
    }

    #[test]
    fn distance_rounds_to_one_decimal() {
        let km = distance_from_toulouse_km(43.7, 1.5);
        assert!((km * 10.0 - (km * 10.0).round()).abs() < 1e-9);
    }

    #[test]
    fn bbox_format() {
        assert_eq!(Region::TOULOUSE.bbox(), "42.5,-1,44.5,3");
    }
}
