#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Name-based geocoding for spots that have no coordinates.
//!
//! A thin Nominatim / OpenStreetMap client plus extraction of place-name
//! candidates from free text. Nominatim's public instance allows at most
//! **1 request per second**; the caller is responsible for pacing.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

pub mod nominatim;

use thiserror::Error;

/// Default Nominatim endpoint.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Known towns and départements around Toulouse whose mention in a text is
/// worth geocoding. Checked lowercase, substring-based.
const PLACE_KEYWORDS: &[&str] = &[
    "toulouse",
    "muret",
    "blagnac",
    "colomiers",
    "tournefeuille",
    "saint-gaudens",
    "albi",
    "montauban",
    "castres",
    "pamiers",
    "foix",
    "mazamet",
    "saint-antonin-noble-val",
    "aspet",
    "ariège",
    "haute-garonne",
    "tarn",
    "aveyron",
];

/// A geocoding result with coordinates and provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The canonical display name returned by the geocoder.
    pub display_name: Option<String>,
    /// Which provider resolved this place.
    pub provider: GeocodingProvider,
}

/// Which geocoding provider resolved a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// Nominatim / OpenStreetMap.
    Nominatim,
}

impl GeocodingProvider {
    /// Short tag stored in spot metadata.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Nominatim => "nominatim",
        }
    }
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Extracts geocodable place-name candidates from a text snippet.
///
/// Candidates keep the keyword order, so better-known places are tried
/// first.
#[must_use]
pub fn place_candidates(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    PLACE_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .map(|keyword| (*keyword).to_string())
        .collect()
}

/// Builds the regional search query for a place candidate.
#[must_use]
pub fn regional_query(place: &str) -> String {
    format!("{place}, Occitanie, France")
}
