#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Relevance scoring for bulk-imported (OSM) spots.
//!
//! An additive point system over the spot name, its OSM tag dictionary, and
//! the source tag. The total is an unbounded signed integer; categorization
//! into tiers happens afterwards ([`RelevanceTier::from_score`]). Missing or
//! malformed metadata contributes nothing and never fails the computation.

use serde_json::Value;
use spot_map_spot_models::{Spot, SpotMetadata};

pub use spot_map_spot_models::RelevanceTier;

/// Name fragments marking a generic, auto-generated name.
const GENERIC_NAME_KEYWORDS: &[&str] = &["non nommée", "unnamed", "sans nom"];

/// OSM tag keys whose presence marks an interesting feature.
const INTERESTING_TAGS: &[&str] = &["tourism", "leisure", "sport", "historic", "natural"];

/// OSM tag keys marking developed amenities (less secret).
const AMENITY_TAGS: &[&str] = &["parking", "toilets", "picnic_site"];

/// Keywords in the OSM description/name that mark rare or secret features.
/// Each match stacks, uncapped.
const RARITY_KEYWORDS: &[&str] = &[
    "abandoned",
    "disused",
    "ruins",
    "hidden",
    "secret",
    "cache",
    "grotte",
    "souterrain",
];

/// Elevation above which a viewpoint earns a bonus, in meters.
const VIEWPOINT_ELEVATION_M: f64 = 500.0;

/// Computes the relevance score for a spot.
///
/// Pure function of the extracted name, the metadata bag, and the source
/// tag; recomputing on the same inputs always yields the same value.
#[must_use]
pub fn score(spot: &Spot) -> i32 {
    score_record(
        spot.extracted_name.as_deref(),
        &spot.metadata,
        &spot.source,
    )
}

/// Scores a record from its parts. See [`score`].
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn score_record(extracted_name: Option<&str>, metadata: &SpotMetadata, source: &str) -> i32 {
    let mut score = 0i32;
    let osm_tags = metadata.osm_tags();
    let tag = |key: &str| -> Option<String> {
        osm_tags
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let tag_nonempty = |key: &str| tag(key).is_some_and(|v| !v.is_empty());

    // 1. Named vs generic name
    let name = extracted_name.unwrap_or("");
    let name_lower = name.to_lowercase();
    let has_proper_name = !name.is_empty()
        && !GENERIC_NAME_KEYWORDS
            .iter()
            .any(|generic| name_lower.contains(generic));
    if has_proper_name {
        score += 3;
    } else if name_lower.contains("non nommée") {
        score -= 2;
    }

    // 2. Distance bands from the reference point
    if let Some(distance) = metadata.distance_from_toulouse_km() {
        if distance <= 20.0 {
            score += 3;
        } else if distance <= 50.0 {
            score += 2;
        } else if distance <= 100.0 {
            score += 1;
        } else {
            score -= 1;
        }
    }

    // 3. Access restrictions: harder to reach reads as more secret
    match tag("access").as_deref() {
        Some("private" | "no") => score += 2,
        Some("permissive") => score += 1,
        Some("yes" | "public") => score -= 1,
        _ => {}
    }

    // 4. Interesting feature tags
    for key in INTERESTING_TAGS {
        if let Some(value) = tag(key)
            && !value.is_empty()
            && value != "no"
            && value != "none"
        {
            score += 2;
        }
    }

    // 5. Description presence
    if tag_nonempty("description") || tag_nonempty("description:fr") {
        score += 2;
    }

    // 6. Category-specific adjustments keyed off the source tag
    if source.contains("waterfall") {
        score += 2;
    } else if source.contains("cave") {
        score += 2;
    } else if source.contains("ruins") {
        score += 2;
    } else if source.contains("viewpoint") {
        if has_proper_name {
            score += 1;
        } else {
            score -= 1;
        }
    } else if source.contains("spring") {
        if tag("drinking_water").as_deref() == Some("yes") {
            score += 2;
        } else if tag("natural").as_deref() == Some("hot_spring") {
            score += 3;
        } else if name.is_empty() || name_lower.contains("non nommée") {
            score -= 3;
        }
    }

    // 7. Elevation bonus for viewpoints
    if source.contains("viewpoint")
        && let Some(elevation) = tag("ele").and_then(|v| v.parse::<f64>().ok())
        && elevation > VIEWPOINT_ELEVATION_M
    {
        score += 1;
    }

    // 8. External notability
    if tag_nonempty("wikipedia") || tag_nonempty("wikidata") {
        score += 2;
    }

    // 9. Nearby amenities: developed means less secret
    if AMENITY_TAGS.iter().any(|key| osm_tags.contains_key(*key)) {
        score -= 1;
    }

    // 10. Rarity keywords in the OSM description and name, stacking
    let description_text = format!(
        "{} {}",
        tag("description").unwrap_or_default(),
        tag("name").unwrap_or_default()
    )
    .to_lowercase();
    for keyword in RARITY_KEYWORDS {
        if description_text.contains(keyword) {
            score += 2;
        }
    }

    // 11. Difficulty indicators
    if tag("climbing").as_deref() == Some("yes") || osm_tags.contains_key("sac_scale") {
        score += 2;
    }
    if matches!(
        tag("trail_visibility").as_deref(),
        Some("bad" | "horrible" | "no")
    ) {
        score += 2;
    }

    score
}

/// Categorizes a score into its tier.
#[must_use]
pub const fn tier(score: i32) -> RelevanceTier {
    RelevanceTier::from_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_map_spot_models::SpotMetadata;

    fn metadata_with_tags(tags: &str) -> SpotMetadata {
        SpotMetadata::from_db(Some(&format!(r#"{{"osm_tags": {tags}}}"#)))
    }

    #[test]
    fn named_private_waterfall_with_description_scores_high() {
        let metadata = metadata_with_tags(
            r#"{"access": "private", "description": "grotte abandonnée"}"#,
        );
        let score = score_record(Some("Cascade de Salles"), &metadata, "osm_waterfalls");
        // +3 named, +2 private, +2 waterfall, +2 description, +2 "grotte"
        assert!(score >= 9, "got {score}");
        assert_eq!(tier(score), RelevanceTier::High);
    }

    #[test]
    fn scoring_is_deterministic() {
        let metadata = metadata_with_tags(r#"{"access": "permissive", "tourism": "attraction"}"#);
        let first = score_record(Some("Lac de Saint-Ferréol"), &metadata, "osm_swimming_spots");
        for _ in 0..3 {
            assert_eq!(
                score_record(Some("Lac de Saint-Ferréol"), &metadata, "osm_swimming_spots"),
                first
            );
        }
    }

    #[test]
    fn generic_name_is_penalized() {
        let metadata = SpotMetadata::default();
        let named = score_record(Some("Gouffre de Padirac"), &metadata, "osm_caves");
        let generic = score_record(Some("Cascade non nommée"), &metadata, "osm_caves");
        assert_eq!(named - generic, 5); // +3 vs -2
    }

    #[test]
    fn distance_bands() {
        let mut close = SpotMetadata::default();
        close.set_distance_from_toulouse_km(12.0);
        let mut weekend = SpotMetadata::default();
        weekend.set_distance_from_toulouse_km(45.0);
        let mut far = SpotMetadata::default();
        far.set_distance_from_toulouse_km(180.0);

        let base = score_record(Some("X"), &SpotMetadata::default(), "osm_ruins");
        assert_eq!(score_record(Some("X"), &close, "osm_ruins") - base, 3);
        assert_eq!(score_record(Some("X"), &weekend, "osm_ruins") - base, 2);
        assert_eq!(score_record(Some("X"), &far, "osm_ruins") - base, -1);
    }

    #[test]
    fn rarity_keywords_stack_uncapped() {
        let metadata = metadata_with_tags(
            r#"{"description": "abandoned secret cache in a hidden grotte souterrain, ruins disused"}"#,
        );
        let plain = metadata_with_tags(r#"{"description": "nice place"}"#);
        let delta = score_record(Some("X"), &metadata, "other_source")
            - score_record(Some("X"), &plain, "other_source");
        // All eight rarity keywords present: 8 * 2 = 16.
        assert_eq!(delta, 16);
    }

    #[test]
    fn amenities_reduce_score_once() {
        let one = metadata_with_tags(r#"{"parking": "yes"}"#);
        let all = metadata_with_tags(r#"{"parking": "yes", "toilets": "yes", "picnic_site": "yes"}"#);
        let base = score_record(Some("X"), &SpotMetadata::default(), "other");
        assert_eq!(score_record(Some("X"), &one, "other"), base - 1);
        assert_eq!(score_record(Some("X"), &all, "other"), base - 1);
    }

    #[test]
    fn unnamed_spring_penalized_unless_drinkable_or_hot() {
        let plain = SpotMetadata::default();
        let drinkable = metadata_with_tags(r#"{"drinking_water": "yes"}"#);
        let hot = metadata_with_tags(r#"{"natural": "hot_spring"}"#);

        assert_eq!(score_record(None, &plain, "osm_springs"), -3);
        assert_eq!(score_record(None, &drinkable, "osm_springs"), 2);
        // hot_spring also earns the "natural" interesting-tag bonus (+2).
        assert_eq!(score_record(None, &hot, "osm_springs"), 5);
    }

    #[test]
    fn viewpoint_elevation_bonus() {
        let high = metadata_with_tags(r#"{"ele": "612"}"#);
        let low = metadata_with_tags(r#"{"ele": "320"}"#);
        let named_high = score_record(Some("Pic du Midi"), &high, "osm_viewpoints");
        let named_low = score_record(Some("Pic du Midi"), &low, "osm_viewpoints");
        assert_eq!(named_high - named_low, 1);
    }

    #[test]
    fn malformed_metadata_scores_without_error() {
        let metadata = SpotMetadata::from_db(Some("{{{not json"));
        assert_eq!(score_record(Some("Cascade d'Ars"), &metadata, "osm_waterfalls"), 5);
    }
}
