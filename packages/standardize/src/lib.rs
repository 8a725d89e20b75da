#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standardization: name normalization, record confidence scoring, and
//! duplicate detection/merging policy.
//!
//! Duplicate detection is a pairwise O(n²) comparison, acceptable at the
//! current scale of a few thousand rows. Name similarity is a containment /
//! positional-overlap heuristic, not an edit-distance metric.

use serde::{Deserialize, Serialize};
use spot_map_geo::haversine_km;
use spot_map_spot_models::Spot;
use strum_macros::{AsRefStr, Display, EnumString};

/// Placeholder name for spots whose name could not be determined.
pub const UNKNOWN_NAME: &str = "Spot Inconnu";

/// Distance below which two coordinate pairs count as the same place, in km.
const SAME_LOCATION_KM: f64 = 0.1;

/// Positional character overlap ratio above which two names are similar.
const NAME_OVERLAP_RATIO: f64 = 0.8;

/// Raw text length above which a record earns the description bonus.
const DESCRIPTION_LENGTH: usize = 50;

/// Name prefixes stripped during normalization.
const STRIP_PREFIXES: &[&str] = &["Unknown", "Spot de", "Lieu de", "Site de"];

/// French particles kept lowercase when recapitalizing a name.
const LOWERCASE_PARTICLES: &[&str] = &["de", "du", "des", "la", "le", "les", "d'"];

/// Why two spots were flagged as duplicates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DuplicateReason {
    /// Normalized names are equal.
    ExactName,
    /// Names share containment or high positional character overlap.
    SimilarName,
    /// Coordinates are within ~100 m of each other.
    SameLocation,
}

/// Two spot records judged to refer to the same real-world place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatePair {
    /// ID of the record encountered first.
    pub first_id: i64,
    /// ID of the record encountered second.
    pub second_id: i64,
    /// What triggered the match.
    pub reason: DuplicateReason,
}

/// Normalizes a spot name: collapse whitespace, strip boilerplate prefixes,
/// and recapitalize with French particles lowercase.
///
/// `None` or empty input yields [`UNKNOWN_NAME`].
#[must_use]
pub fn normalize_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return UNKNOWN_NAME.to_string();
    };
    let mut collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return UNKNOWN_NAME.to_string();
    }

    for prefix in STRIP_PREFIXES {
        if let Some(rest) = collapsed.strip_prefix(prefix) {
            collapsed = rest.trim().to_string();
        }
    }
    if collapsed.is_empty() {
        return UNKNOWN_NAME.to_string();
    }

    collapsed
        .split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if LOWERCASE_PARTICLES.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

/// Strips French diacritics for name comparison (é -> e, ç -> c, ...).
#[must_use]
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'À' | 'Â' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Î' | 'Ï' => 'I',
            'Ô' | 'Ö' => 'O',
            'Ù' | 'Û' | 'Ü' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Whether two lowercase names are near-equal.
///
/// True when one contains the other, or when both are longer than five
/// characters and the positions they share carry the same character more
/// than 80% of the longer length. A heuristic, not an edit distance.
#[must_use]
pub fn similar_names(first: &str, second: &str) -> bool {
    let first = fold_accents(first);
    let second = fold_accents(second);

    if first.contains(&second) || second.contains(&first) {
        return true;
    }

    let first_chars: Vec<char> = first.chars().collect();
    let second_chars: Vec<char> = second.chars().collect();
    if first_chars.len() > 5 && second_chars.len() > 5 {
        let common = first_chars
            .iter()
            .zip(&second_chars)
            .filter(|(a, b)| a == b)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let ratio = common as f64 / first_chars.len().max(second_chars.len()) as f64;
        return ratio > NAME_OVERLAP_RATIO;
    }

    false
}

/// Confidence score in `[0, 1]` rating how complete a record is.
///
/// Additive over field presence, capped at 1.0. Deterministic for fixed
/// input. Used standalone as a quality signal and as the winner tie-breaker
/// in merges.
#[must_use]
pub fn confidence(spot: &Spot) -> f64 {
    let mut score = 0.0f64;

    if spot.has_coordinates() {
        score += 0.3;
    }
    if spot
        .extracted_name
        .as_deref()
        .is_some_and(|name| !name.is_empty() && !name.eq_ignore_ascii_case("unknown"))
    {
        score += 0.2;
    }
    if spot
        .raw_text
        .as_deref()
        .is_some_and(|text| text.chars().count() > DESCRIPTION_LENGTH)
    {
        score += 0.2;
    }
    if !spot.activities.is_empty() {
        score += 0.1;
    }
    if spot.is_hidden {
        score += 0.1;
    }
    if spot
        .source_url
        .as_deref()
        .is_some_and(|url| url != "manual_entry")
    {
        score += 0.1;
    }

    score.min(1.0)
}

/// Finds all candidate duplicate pairs among the given spots.
///
/// Pairwise comparison; each unordered pair is reported at most once, with
/// the strongest applicable reason (`exact_name` > `similar_name` >
/// `same_location`). The reported pair does not depend on which of the two
/// records comes first in the input.
#[must_use]
pub fn find_duplicate_pairs(spots: &[Spot]) -> Vec<DuplicatePair> {
    let mut pairs = Vec::new();

    for (i, first) in spots.iter().enumerate() {
        for second in &spots[i + 1..] {
            if let Some(reason) = duplicate_reason(first, second) {
                pairs.push(DuplicatePair {
                    first_id: first.id,
                    second_id: second.id,
                    reason,
                });
            }
        }
    }

    pairs
}

/// The strongest reason two spots count as duplicates, if any.
#[must_use]
pub fn duplicate_reason(first: &Spot, second: &Spot) -> Option<DuplicateReason> {
    if let (Some(name_a), Some(name_b)) = (&first.extracted_name, &second.extracted_name) {
        let norm_a = normalize_name(Some(name_a)).to_lowercase();
        let norm_b = normalize_name(Some(name_b)).to_lowercase();
        if norm_a != UNKNOWN_NAME.to_lowercase() {
            if norm_a == norm_b {
                return Some(DuplicateReason::ExactName);
            }
            if norm_b != UNKNOWN_NAME.to_lowercase() && similar_names(&norm_a, &norm_b) {
                return Some(DuplicateReason::SimilarName);
            }
        }
    }

    if let (Some((lat_a, lon_a)), Some((lat_b, lon_b))) =
        (first.coordinates(), second.coordinates())
        && haversine_km(lat_a, lon_a, lat_b, lon_b) < SAME_LOCATION_KM
    {
        return Some(DuplicateReason::SameLocation);
    }

    None
}

/// Decides which member of a duplicate pair survives a merge.
///
/// The higher-confidence record wins; on a tie the first wins. Returns
/// `(winner, loser)`.
#[must_use]
pub fn pick_winner<'a>(first: &'a Spot, second: &'a Spot) -> (&'a Spot, &'a Spot) {
    if confidence(first) >= confidence(second) {
        (first, second)
    } else {
        (second, first)
    }
}

/// Back-fills any empty field on the winner from the loser.
///
/// Coordinates move as a pair so the lat/lon invariant is preserved.
pub fn backfill(winner: &mut Spot, loser: &Spot) {
    if winner.extracted_name.is_none() {
        winner.extracted_name.clone_from(&loser.extracted_name);
    }
    if winner.source_url.is_none() {
        winner.source_url.clone_from(&loser.source_url);
    }
    if winner.raw_text.is_none() {
        winner.raw_text.clone_from(&loser.raw_text);
    }
    if !winner.has_coordinates() && loser.has_coordinates() {
        winner.latitude = loser.latitude;
        winner.longitude = loser.longitude;
    }
    if winner.activities.is_empty() {
        winner.activities.clone_from(&loser.activities);
    }
    winner.mentions_count += loser.mentions_count;
}
