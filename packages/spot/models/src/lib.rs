#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spot taxonomy types and the canonical spot record.
//!
//! This crate defines the closed vocabularies (location types, activity
//! tags, relevance tiers) used across the entire spot-map system. All data
//! sources normalize their records into these shared types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category of a discovered location, from a closed vocabulary.
///
/// Stored as lowercase text in the `spots.location_type` column.
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
pub enum LocationType {
    /// Swimming holes, waterfalls, lakes, rivers, gorges
    Water,
    /// Cave entrances and underground systems
    Cave,
    /// Historical ruins and remains
    Ruins,
    /// Panoramic viewpoints and summits
    Viewpoint,
    /// Abandoned buildings and industrial sites
    Urbex,
    /// Forests, mountains, and other natural features
    Natural,
    /// Castles, churches, mills, and other built heritage
    Historic,
    /// Picnic areas, camping, and outdoor recreation sites
    Recreation,
    /// No category could be determined
    Unknown,
}

impl LocationType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Water,
            Self::Cave,
            Self::Ruins,
            Self::Viewpoint,
            Self::Urbex,
            Self::Natural,
            Self::Historic,
            Self::Recreation,
            Self::Unknown,
        ]
    }

    /// Parses a stored text value, falling back to [`Self::Unknown`] for
    /// anything outside the vocabulary (old rows, source-specific strings).
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }
}

/// Activity tag from a closed vocabulary.
///
/// A spot may carry several activities; they are stored comma-joined in the
/// `spots.activities` column.
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
pub enum Activity {
    /// Wild swimming (baignade)
    Swimming,
    /// Hiking and walking (randonnée)
    Hiking,
    /// Rock climbing (escalade)
    Climbing,
    /// Caving (spéléologie)
    Caving,
    /// Mountain biking (VTT)
    MountainBiking,
    /// Kayaking, canoeing, paddling
    Kayaking,
    /// Fishing (pêche)
    Fishing,
    /// Camping and bivouac
    Camping,
    /// Photography and scenic views
    Photography,
    /// Picnics and barbecue
    Picnic,
    /// Wildlife and nature observation
    WildlifeWatching,
    /// Urban exploration
    Urbex,
}

impl Activity {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Swimming,
            Self::Hiking,
            Self::Climbing,
            Self::Caving,
            Self::MountainBiking,
            Self::Kayaking,
            Self::Fishing,
            Self::Camping,
            Self::Photography,
            Self::Picnic,
            Self::WildlifeWatching,
            Self::Urbex,
        ]
    }

    /// Joins a set of activities into the comma-separated storage form.
    ///
    /// The output is sorted and deduplicated so that re-tagging a spot is
    /// idempotent.
    #[must_use]
    pub fn join(activities: &[Self]) -> String {
        let mut sorted: Vec<Self> = activities.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parses a comma/semicolon-separated activities column value.
    ///
    /// Unrecognized entries (free-form text from older rows) are dropped.
    #[must_use]
    pub fn parse_list(raw: &str) -> Vec<Self> {
        let mut activities: Vec<Self> = raw
            .split([',', ';', '|'])
            .filter_map(|part| part.trim().parse().ok())
            .collect();
        activities.sort_unstable();
        activities.dedup();
        activities
    }
}

/// Relevance tier derived from the integer relevance score.
///
/// Only high and medium tier spots survive the bulk-source filter pass.
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
pub enum RelevanceTier {
    /// Score >= 5
    High,
    /// Score 3-4
    Medium,
    /// Score < 3
    Low,
}

impl RelevanceTier {
    /// Categorizes a raw relevance score.
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        if score >= 5 {
            Self::High
        } else if score >= 3 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Whether spots in this tier survive the bulk-source filter pass.
    #[must_use]
    pub const fn survives_filter(self) -> bool {
        !matches!(self, Self::Low)
    }
}

/// Open JSON bag holding source-specific extras on a spot.
///
/// Carries OSM tags, derived scores, and geocoding provenance. Malformed or
/// missing metadata is always treated as an empty object, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotMetadata(pub Map<String, Value>);

impl SpotMetadata {
    /// Metadata key for the derived relevance score.
    pub const RELEVANCE_SCORE: &'static str = "relevance_score";
    /// Metadata key for the derived confidence score.
    pub const CONFIDENCE_SCORE: &'static str = "confidence_score";
    /// Metadata key for the distance-from-Toulouse enrichment.
    pub const DISTANCE_KM: &'static str = "distance_from_toulouse_km";
    /// Metadata key for the OSM tag dictionary.
    pub const OSM_TAGS: &'static str = "osm_tags";
    /// Metadata key recording which geocoder resolved the coordinates.
    pub const GEOCODED_BY: &'static str = "geocoded_by";

    /// Parses a stored metadata column value.
    ///
    /// `None`, empty, or malformed JSON all yield empty metadata.
    #[must_use]
    pub fn from_db(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    /// Serializes the metadata for storage.
    #[must_use]
    pub fn to_db(&self) -> String {
        serde_json::to_string(&Value::Object(self.0.clone())).unwrap_or_else(|_| "{}".to_string())
    }

    /// Returns the OSM tag dictionary, or an empty map when absent or not
    /// an object.
    #[must_use]
    pub fn osm_tags(&self) -> Map<String, Value> {
        match self.0.get(Self::OSM_TAGS) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    /// Looks up a single OSM tag as a string.
    #[must_use]
    pub fn osm_tag(&self, key: &str) -> Option<String> {
        match self.0.get(Self::OSM_TAGS)? {
            Value::Object(map) => map.get(key).and_then(Value::as_str).map(String::from),
            _ => None,
        }
    }

    /// Distance from the Toulouse reference point, in kilometers.
    #[must_use]
    pub fn distance_from_toulouse_km(&self) -> Option<f64> {
        self.0.get(Self::DISTANCE_KM).and_then(Value::as_f64)
    }

    /// Records the distance-from-Toulouse enrichment.
    pub fn set_distance_from_toulouse_km(&mut self, km: f64) {
        if let Some(value) = serde_json::Number::from_f64(km) {
            self.0
                .insert(Self::DISTANCE_KM.to_string(), Value::Number(value));
        }
    }

    /// The stored relevance score, if one has been computed.
    #[must_use]
    pub fn relevance_score(&self) -> Option<i64> {
        self.0.get(Self::RELEVANCE_SCORE).and_then(Value::as_i64)
    }

    /// Writes the derived relevance score and its evaluation timestamp.
    pub fn set_relevance_score(&mut self, score: i32, evaluated_at: DateTime<Utc>) {
        self.0
            .insert(Self::RELEVANCE_SCORE.to_string(), Value::from(score));
        self.0.insert(
            "relevance_evaluated_at".to_string(),
            Value::String(evaluated_at.to_rfc3339()),
        );
    }

    /// The stored confidence score, if one has been computed.
    #[must_use]
    pub fn confidence_score(&self) -> Option<f64> {
        self.0.get(Self::CONFIDENCE_SCORE).and_then(Value::as_f64)
    }

    /// Writes the derived confidence score.
    pub fn set_confidence_score(&mut self, score: f64) {
        if let Some(value) = serde_json::Number::from_f64(score) {
            self.0
                .insert(Self::CONFIDENCE_SCORE.to_string(), Value::Number(value));
        }
    }

    /// Records which geocoding provider filled in the coordinates.
    pub fn set_geocoded_by(&mut self, provider: &str) {
        self.0.insert(
            Self::GEOCODED_BY.to_string(),
            Value::String(provider.to_string()),
        );
    }

    /// Inserts an arbitrary metadata entry.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// Whether this metadata bag has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A row in the `spots` table: one discovered candidate location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    /// Database primary key.
    pub id: i64,
    /// Origin tag (e.g. `osm_waterfalls`, `reddit_toulouse`). Not unique.
    pub source: String,
    /// Provenance URL, unique per record where available.
    pub source_url: Option<String>,
    /// Free text snippet the spot was extracted from (bounded length).
    pub raw_text: Option<String>,
    /// Best-effort display name; may be generic or auto-generated.
    pub extracted_name: Option<String>,
    /// Latitude in decimal degrees (WGS84). Paired with `longitude`.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees (WGS84). Paired with `latitude`.
    pub longitude: Option<f64>,
    /// Categorical location tag.
    pub location_type: LocationType,
    /// Activity tags for this spot.
    pub activities: Vec<Activity>,
    /// Whether the text suggests a secret/hidden place.
    pub is_hidden: bool,
    /// How many times this spot has been mentioned across sources.
    pub mentions_count: i64,
    /// When this record was ingested.
    pub scraped_at: DateTime<Utc>,
    /// Source-specific extras and derived scores.
    pub metadata: SpotMetadata,
}

impl Spot {
    /// Whether both coordinates are present.
    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Returns `(latitude, longitude)` when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_type_roundtrip() {
        for ty in LocationType::all() {
            let text = ty.as_ref();
            assert_eq!(LocationType::parse_lossy(text), *ty);
        }
    }

    #[test]
    fn location_type_lossy_fallback() {
        assert_eq!(
            LocationType::parse_lossy("natural_pool"),
            LocationType::Unknown
        );
    }

    #[test]
    fn activities_join_sorted_deduped() {
        let joined = Activity::join(&[Activity::Hiking, Activity::Swimming, Activity::Hiking]);
        assert_eq!(joined, "swimming, hiking");
    }

    #[test]
    fn activities_parse_list_drops_unknown() {
        let parsed = Activity::parse_list("swimming, escalade, hiking");
        assert_eq!(parsed, vec![Activity::Swimming, Activity::Hiking]);
    }

    #[test]
    fn tier_thresholds() {
        assert_eq!(RelevanceTier::from_score(9), RelevanceTier::High);
        assert_eq!(RelevanceTier::from_score(5), RelevanceTier::High);
        assert_eq!(RelevanceTier::from_score(4), RelevanceTier::Medium);
        assert_eq!(RelevanceTier::from_score(3), RelevanceTier::Medium);
        assert_eq!(RelevanceTier::from_score(2), RelevanceTier::Low);
        assert_eq!(RelevanceTier::from_score(-4), RelevanceTier::Low);
        assert!(!RelevanceTier::Low.survives_filter());
        assert!(RelevanceTier::Medium.survives_filter());
    }

    #[test]
    fn metadata_malformed_is_empty() {
        assert!(SpotMetadata::from_db(Some("not json")).is_empty());
        assert!(SpotMetadata::from_db(Some("[1, 2]")).is_empty());
        assert!(SpotMetadata::from_db(None).is_empty());
    }

    #[test]
    fn metadata_osm_tags_access() {
        let metadata = SpotMetadata::from_db(Some(
            r#"{"osm_tags": {"access": "private", "ele": "612"}}"#,
        ));
        assert_eq!(metadata.osm_tag("access").as_deref(), Some("private"));
        assert_eq!(metadata.osm_tag("ele").as_deref(), Some("612"));
        assert_eq!(metadata.osm_tag("wikipedia"), None);
    }

    #[test]
    fn metadata_score_roundtrip() {
        let mut metadata = SpotMetadata::default();
        metadata.set_relevance_score(7, Utc::now());
        metadata.set_confidence_score(0.8);
        let restored = SpotMetadata::from_db(Some(&metadata.to_db()));
        assert_eq!(restored.relevance_score(), Some(7));
        assert!((restored.confidence_score().unwrap() - 0.8).abs() < f64::EPSILON);
    }
}
