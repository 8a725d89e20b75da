#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate and name extraction from free text.
//!
//! Coordinates are matched against an ordered list of regex patterns
//! (decimal pairs, DMS with hemisphere letters, French comma decimals,
//! labeled forms); the first match that also falls inside the configured
//! region wins. No NLP, no external lookups.

use std::sync::LazyLock;

use regex::Regex;
use spot_map_geo::Region;

/// Decimal degree pairs, optionally negative: `43.6047, 1.4442`.
static DECIMAL_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+\.\d+)[,\s]+(-?\d+\.\d+)").expect("valid regex")
});

/// Degrees and optional minutes with hemisphere letters:
/// `43°36' N, 1°26' E`.
static DMS_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)°\s*(\d+)?'?\s*([NS])[,\s]+(\d+)°\s*(\d+)?'?\s*([EW])")
        .expect("valid regex")
});

/// Simple degrees with hemisphere letters: `43.6° N, 1.44° E`.
static DEGREE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\.?\d*)°\s*([NS])[,\s]+(\d+\.?\d*)°\s*([EW])").expect("valid regex")
});

/// French decimal comma pairs: `43,6047; 1,4442`.
static COMMA_DECIMAL_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+,\d+)[;\s]+(-?\d+,\d+)").expect("valid regex")
});

/// Labeled short form: `lat: 43.6 lon: 1.44`.
static LABELED_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)lat:?\s*(-?\d+\.?\d*)\s+long?:?\s*(-?\d+\.?\d*)").expect("valid regex")
});

/// Labeled long form: `latitude: 43.6 ... longitude: 1.44`.
static LABELED_LONG_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)latitude[:\s]+(-?\d+\.\d+).*?longitude[:\s]+(-?\d+\.\d+)")
        .expect("valid regex")
});

/// Extracts coordinates from free text, validating against a region.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateExtractor {
    region: Region,
}

impl CoordinateExtractor {
    /// Creates an extractor validating against the given region.
    #[must_use]
    pub const fn new(region: Region) -> Self {
        Self { region }
    }

    /// Returns the first in-region coordinate pair found in the text.
    ///
    /// Patterns are tried in a fixed order; within a pattern, matches are
    /// tried left to right.
    #[must_use]
    pub fn extract(&self, text: &str) -> Option<(f64, f64)> {
        self.extract_decimal(text)
            .or_else(|| self.extract_dms(text))
            .or_else(|| self.extract_degrees(text))
            .or_else(|| self.extract_comma_decimal(text))
            .or_else(|| self.extract_labeled(text))
    }

    /// Returns every distinct in-region coordinate pair found in the text.
    #[must_use]
    pub fn extract_all(&self, text: &str) -> Vec<(f64, f64)> {
        let mut found: Vec<(f64, f64)> = Vec::new();
        let mut push = |pair: (f64, f64)| {
            if !found
                .iter()
                .any(|(lat, lon)| (lat - pair.0).abs() < 1e-9 && (lon - pair.1).abs() < 1e-9)
            {
                found.push(pair);
            }
        };

        for captures in DECIMAL_PAIR.captures_iter(text) {
            if let Some(pair) = self.parse_pair(&captures[1], &captures[2], '.') {
                push(pair);
            }
        }
        for captures in COMMA_DECIMAL_PAIR.captures_iter(text) {
            if let Some(pair) = self.parse_pair(&captures[1], &captures[2], ',') {
                push(pair);
            }
        }
        found
    }

    fn validate(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        self.region.contains(lat, lon).then_some((lat, lon))
    }

    fn parse_pair(&self, lat: &str, lon: &str, decimal_sep: char) -> Option<(f64, f64)> {
        let normalize = |s: &str| s.replace(decimal_sep, ".");
        let lat = normalize(lat).parse::<f64>().ok()?;
        let lon = normalize(lon).parse::<f64>().ok()?;
        self.validate(lat, lon)
    }

    fn extract_decimal(&self, text: &str) -> Option<(f64, f64)> {
        DECIMAL_PAIR
            .captures_iter(text)
            .find_map(|captures| self.parse_pair(&captures[1], &captures[2], '.'))
    }

    fn extract_comma_decimal(&self, text: &str) -> Option<(f64, f64)> {
        COMMA_DECIMAL_PAIR
            .captures_iter(text)
            .find_map(|captures| self.parse_pair(&captures[1], &captures[2], ','))
    }

    fn extract_dms(&self, text: &str) -> Option<(f64, f64)> {
        DMS_PAIR.captures_iter(text).find_map(|captures| {
            let lat_deg = captures[1].parse::<f64>().ok()?;
            let lat_min = captures
                .get(2)
                .map_or(0.0, |m| m.as_str().parse::<f64>().unwrap_or(0.0));
            let mut lat = lat_deg + lat_min / 60.0;
            if &captures[3] == "S" {
                lat = -lat;
            }

            let lon_deg = captures[4].parse::<f64>().ok()?;
            let lon_min = captures
                .get(5)
                .map_or(0.0, |m| m.as_str().parse::<f64>().unwrap_or(0.0));
            let mut lon = lon_deg + lon_min / 60.0;
            if &captures[6] == "W" {
                lon = -lon;
            }

            self.validate(lat, lon)
        })
    }

    fn extract_degrees(&self, text: &str) -> Option<(f64, f64)> {
        DEGREE_PAIR.captures_iter(text).find_map(|captures| {
            let mut lat = captures[1].parse::<f64>().ok()?;
            if &captures[2] == "S" {
                lat = -lat;
            }
            let mut lon = captures[3].parse::<f64>().ok()?;
            if &captures[4] == "W" {
                lon = -lon;
            }
            self.validate(lat, lon)
        })
    }

    fn extract_labeled(&self, text: &str) -> Option<(f64, f64)> {
        let short = LABELED_PAIR
            .captures_iter(text)
            .find_map(|captures| self.parse_pair(&captures[1], &captures[2], '.'));
        if short.is_some() {
            return short;
        }
        LABELED_LONG_PAIR
            .captures_iter(text)
            .find_map(|captures| self.parse_pair(&captures[1], &captures[2], '.'))
    }
}

impl Default for CoordinateExtractor {
    fn default() -> Self {
        Self::new(Region::TOULOUSE)
    }
}

/// Feature words that prefix a place name: `cascade de X`, `lac du Y`, ...
static FEATURE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(cascade|lac|plage|grotte|pont|château|moulin|source|fontaine|gorges?|rivière)\s+(?:de |du |des |d')?([A-ZÀ-Ý][a-zéèêëàâäôöûüç\-]+(?:\s+[A-ZÀ-Ý][a-zéèêëàâäôöûüç\-]+)*)",
    )
    .expect("valid regex")
});

/// Capitalized place mention after a locative preposition.
static LOCATIVE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:à|au|aux|près de|proche de)\s+([A-ZÀ-Ý][a-zéèêëàâäôöûüç\-]+(?:\s+[A-ZÀ-Ý][a-zéèêëàâäôöûüç\-]+)*)",
    )
    .expect("valid regex")
});

/// Extracts a best-effort display name from a raw text snippet.
///
/// Tries feature-word patterns first ("Cascade de X"), then capitalized
/// place mentions, then falls back to a trimmed first sentence. Returns
/// `None` when nothing usable is found.
#[must_use]
pub fn extract_name(raw_text: &str) -> Option<String> {
    if let Some(captures) = FEATURE_NAME.captures(raw_text) {
        let feature = capitalize(&captures[1].to_lowercase());
        let place = &captures[2];
        return Some(match captures[1].to_lowercase().as_str() {
            "gorge" | "gorges" => format!("Gorges de {place}"),
            _ => format!("{feature} de {place}"),
        });
    }

    if let Some(captures) = LOCATIVE_NAME.captures(raw_text) {
        return Some(captures[1].to_string());
    }

    // First sentence, if it looks like a plausible title.
    let first = raw_text.split('.').next().unwrap_or("").trim();
    if first.chars().count() > 10 && first.chars().count() < 100 {
        return Some(first.chars().take(50).collect());
    }

    None
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_decimal_pair() {
        let extractor = CoordinateExtractor::default();
        let (lat, lon) = extractor
            .extract("Le spot est à 43.6047, 1.4442 exactement")
            .unwrap();
        assert!((lat - 43.6047).abs() < 1e-9);
        assert!((lon - 1.4442).abs() < 1e-9);
    }

    #[test]
    fn extracts_french_comma_pair() {
        let extractor = CoordinateExtractor::default();
        let (lat, lon) = extractor.extract("coordonnées 43,6047; 1,4442").unwrap();
        assert!((lat - 43.6047).abs() < 1e-9);
        assert!((lon - 1.4442).abs() < 1e-9);
    }

    #[test]
    fn extracts_dms_pair() {
        let extractor = CoordinateExtractor::default();
        let (lat, lon) = extractor.extract("43°36' N, 1°26' E").unwrap();
        assert!((lat - 43.6).abs() < 1e-6);
        assert!((lon - (1.0 + 26.0 / 60.0)).abs() < 1e-6);
    }

    #[test]
    fn extracts_labeled_pair() {
        let extractor = CoordinateExtractor::default();
        let (lat, lon) = extractor.extract("lat: 43.65 lon: 1.38").unwrap();
        assert!((lat - 43.65).abs() < 1e-9);
        assert!((lon - 1.38).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_region_match_then_accepts_next() {
        let extractor = CoordinateExtractor::default();
        // First pair is Paris (out of region), second is in the Toulouse box.
        let (lat, _) = extractor
            .extract("48.8566, 2.3522 puis 43.6047, 1.4442")
            .unwrap();
        assert!((lat - 43.6047).abs() < 1e-9);
    }

    #[test]
    fn no_coordinates_returns_none() {
        let extractor = CoordinateExtractor::default();
        assert!(extractor.extract("aucune coordonnée ici").is_none());
    }

    #[test]
    fn extract_all_dedupes() {
        let extractor = CoordinateExtractor::default();
        let all = extractor.extract_all("43.6047, 1.4442 et encore 43.6047, 1.4442");
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn name_from_feature_pattern() {
        assert_eq!(
            extract_name("Découverte d'une cascade de Salles magnifique").as_deref(),
            Some("Cascade de Salles")
        );
        assert_eq!(
            extract_name("les gorges de Galamus valent le détour").as_deref(),
            Some("Gorges de Galamus")
        );
    }

    #[test]
    fn name_from_first_sentence_fallback() {
        let name = extract_name("Un endroit sympa au bord de l'eau. Il faut y aller.").unwrap();
        assert!(name.starts_with("Un endroit sympa"));
    }

    #[test]
    fn short_text_yields_no_name() {
        assert!(extract_name("ok").is_none());
    }
}
