#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data source configuration types and the raw record format.
//!
//! Every spot provider (Overpass import, Reddit search, Instagram hashtag
//! capture, tourism site, forum) produces [`RawSpot`] records that the
//! ingestion step validates into [`spot_map_spot_models::Spot`] rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spot_map_spot_models::{Activity, LocationType, SpotMetadata};
use strum_macros::{AsRefStr, Display, EnumString};

/// The family of data provider a source belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    /// OpenStreetMap bulk import via the Overpass API
    Osm,
    /// Reddit subreddit and search-term capture
    Reddit,
    /// Instagram hashtag capture
    Instagram,
    /// Regional tourism and village sites
    Tourism,
    /// Outdoor forums
    Forum,
}

impl SourceKind {
    /// Whether spots from this family go through the relevance filter pass.
    ///
    /// Only the bulk OSM import is scored and pruned; conversational
    /// sources pass through unfiltered.
    #[must_use]
    pub const fn relevance_filtered(self) -> bool {
        matches!(self, Self::Osm)
    }
}

/// A raw, unvalidated record produced by any scraper.
///
/// Only `source` and `raw_text` are required; everything else is
/// best-effort. Validation turns this into a [`spot_map_spot_models::Spot`]
/// or rejects it with a structured error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct RawSpot {
    /// Origin tag (e.g. `osm_waterfalls`, `reddit_toulouse`).
    pub source: String,
    /// Provenance URL, used as the upsert key when present.
    pub source_url: Option<String>,
    /// Free text the spot was extracted from.
    pub raw_text: String,
    /// Best-effort display name.
    pub extracted_name: Option<String>,
    /// Latitude in decimal degrees, if the source provided one.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, if the source provided one.
    pub longitude: Option<f64>,
    /// Location category, if the source already classified the record.
    pub location_type: Option<LocationType>,
    /// Activity tags, if the source already tagged the record.
    pub activities: Vec<Activity>,
    /// Whether the source flagged this as a secret/hidden place.
    pub is_hidden: Option<bool>,
    /// When the record was scraped. Defaults to ingestion time when absent.
    pub scraped_at: Option<DateTime<Utc>>,
    /// Source-specific extras (OSM tags etc.).
    pub metadata: SpotMetadata,
}

/// A record in the source sync log, one row per completed sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    /// Source identifier.
    pub source_id: String,
    /// When the sync completed.
    pub synced_at: DateTime<Utc>,
    /// Records fetched from the provider.
    pub records_fetched: u64,
    /// Records that passed validation and were saved.
    pub records_saved: u64,
    /// Records rejected by validation.
    pub records_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_osm_is_relevance_filtered() {
        assert!(SourceKind::Osm.relevance_filtered());
        assert!(!SourceKind::Reddit.relevance_filtered());
        assert!(!SourceKind::Instagram.relevance_filtered());
        assert!(!SourceKind::Tourism.relevance_filtered());
        assert!(!SourceKind::Forum.relevance_filtered());
    }

    #[test]
    fn raw_spot_deserializes_with_minimal_fields() {
        let raw: RawSpot = serde_json::from_str(
            r#"{"source": "reddit_toulouse", "raw_text": "Superbe cascade secrète"}"#,
        )
        .unwrap();
        assert_eq!(raw.source, "reddit_toulouse");
        assert!(raw.latitude.is_none());
        assert!(raw.activities.is_empty());
        assert!(raw.metadata.is_empty());
    }
}
