#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule-based text classification for scraped spot mentions.
//!
//! Maps free French/English text to the canonical [`LocationType`] and
//! [`Activity`] vocabularies using keyword membership. Matching is
//! case-insensitive and substring-based with no tokenization, so substring
//! false positives are expected and accepted (e.g. a keyword inside an
//! unrelated longer word).

use spot_map_spot_models::{Activity, LocationType};

/// Ordered category keyword lists for location type inference.
///
/// The first category whose keywords match wins, so text mentioning both a
/// waterfall and a castle is classified as water. The order is fixed and
/// load-bearing.
const TYPE_KEYWORDS: &[(LocationType, &[&str])] = &[
    (
        LocationType::Water,
        &[
            "cascade",
            "waterfall",
            "lac ",
            "lac,",
            "lac.",
            "rivière",
            "baignade",
            "piscine naturelle",
            "plage",
            "gorge",
        ],
    ),
    (
        LocationType::Cave,
        &["grotte", "caverne", "gouffre", "spéléo", "souterrain"],
    ),
    (LocationType::Ruins, &["ruine", "ruins", "vestige"]),
    (
        LocationType::Viewpoint,
        &["point de vue", "panorama", "belvédère", "sommet", "viewpoint"],
    ),
    (
        LocationType::Urbex,
        &["urbex", "abandonné", "abandoned", "friche", "usine", "désaffecté"],
    ),
    (
        LocationType::Natural,
        &["forêt", "bois ", "montagne", "colline", "prairie"],
    ),
    (
        LocationType::Historic,
        &["château", "église", "abbaye", "moulin", "chapelle", "tour médiévale"],
    ),
    (
        LocationType::Recreation,
        &["pique-nique", "camping", "aire de jeux"],
    ),
];

/// Keyword lists for non-exclusive activity tagging.
const ACTIVITY_KEYWORDS: &[(Activity, &[&str])] = &[
    (
        Activity::Swimming,
        &[
            "baignade", "baigner", "nager", "piscine", "plage", "cascade", "lac ", "rivière",
        ],
    ),
    (
        Activity::Hiking,
        &["randonnée", "rando", "marche", "sentier", "trek", "balade"],
    ),
    (Activity::Climbing, &["escalade", "grimpe", "varappe"]),
    (
        Activity::MountainBiking,
        &["vtt", "vélo", "cyclisme", "mountain bike"],
    ),
    (
        Activity::Photography,
        &["photo", "panorama", "sunset", "lever de soleil", "coucher de soleil"],
    ),
    (
        Activity::Picnic,
        &["pique-nique", "picnic", "bbq", "barbecue"],
    ),
    (
        Activity::Urbex,
        &["urbex", "abandonné", "exploration urbaine", "friche"],
    ),
    (
        Activity::Caving,
        &["spéléo", "grotte", "caverne", "gouffre"],
    ),
    (Activity::Fishing, &["pêche", "poisson", "truite"]),
    (
        Activity::Kayaking,
        &["kayak", "canoë", "paddle", "raft"],
    ),
    (Activity::Camping, &["camping", "bivouac", "tente"]),
    (
        Activity::WildlifeWatching,
        &["observer", "oiseaux", "faune", "flore"],
    ),
];

/// Keywords suggesting a secret or hidden place.
const HIDDEN_KEYWORDS: &[&str] = &[
    "secret",
    "caché",
    "cachée",
    "hidden",
    "peu connu",
    "méconnu",
    "confidentiel",
    "discret",
    "insolite",
    "abandonné",
    "abandoned",
    "ruins",
    "ruines",
];

/// Returns `true` if the haystack contains any of the needles.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Infers the location category for a text snippet.
///
/// First matching category wins. Returns [`LocationType::Unknown`] when no
/// keyword matches.
#[must_use]
pub fn infer_location_type(raw_text: &str) -> LocationType {
    let lower = raw_text.to_lowercase();
    for (location_type, keywords) in TYPE_KEYWORDS {
        if contains_any(&lower, keywords) {
            return *location_type;
        }
    }
    LocationType::Unknown
}

/// Infers the set of activity tags mentioned in a text snippet.
///
/// Non-exclusive: a snippet may receive several tags. The result is sorted
/// and deduplicated.
#[must_use]
pub fn infer_activities(raw_text: &str) -> Vec<Activity> {
    let lower = raw_text.to_lowercase();
    let mut activities: Vec<Activity> = ACTIVITY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(activity, _)| *activity)
        .collect();
    activities.sort_unstable();
    activities.dedup();
    activities
}

/// Whether the text reads like a secret/hidden spot mention.
#[must_use]
pub fn is_hidden_spot(raw_text: &str) -> bool {
    contains_any(&raw_text.to_lowercase(), HIDDEN_KEYWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_text_is_water_with_swimming_and_hiking() {
        let text = "Superbe cascade pour la baignade et la randonnée";
        assert_eq!(infer_location_type(text), LocationType::Water);
        assert_eq!(
            infer_activities(text),
            vec![Activity::Swimming, Activity::Hiking]
        );
    }

    #[test]
    fn first_matching_category_wins() {
        // Mentions both water and historic keywords; water is checked first.
        let text = "cascade près du château";
        assert_eq!(infer_location_type(text), LocationType::Water);
    }

    #[test]
    fn unmatched_text_is_unknown() {
        assert_eq!(
            infer_location_type("rien d'intéressant ici"),
            LocationType::Unknown
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(infer_location_type("GROTTE DE NIAUX"), LocationType::Cave);
        assert!(is_hidden_spot("Un spot SECRET au bord du Tarn"));
    }

    #[test]
    fn classification_is_idempotent() {
        let text = "lac abandonné, urbex et baignade sauvage";
        let first_type = infer_location_type(text);
        let first_activities = infer_activities(text);
        assert_eq!(infer_location_type(text), first_type);
        assert_eq!(infer_activities(text), first_activities);
    }

    #[test]
    fn activities_are_non_exclusive() {
        let activities = infer_activities("escalade, spéléo et bivouac dans les gorges");
        assert!(activities.contains(&Activity::Climbing));
        assert!(activities.contains(&Activity::Caving));
        assert!(activities.contains(&Activity::Camping));
    }

    #[test]
    fn hidden_keywords_detected() {
        assert!(is_hidden_spot("un endroit peu connu des locaux"));
        assert!(is_hidden_spot("usine abandonnée près de Muret"));
        assert!(!is_hidden_spot("la place du Capitole"));
    }

    #[test]
    fn substring_false_positives_are_accepted() {
        // "pêche" appears inside "pêcheur" - accepted by design of the
        // substring heuristic.
        assert!(infer_activities("le repaire du pêcheur").contains(&Activity::Fishing));
    }
}
