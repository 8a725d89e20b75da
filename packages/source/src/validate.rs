//! Raw record validation: turns a [`RawSpot`] into a storable
//! [`Spot`] or rejects it with a structured error.
//!
//! One bad record never aborts a batch — the ingestion step catches the
//! error, logs it, and moves on.

use chrono::Utc;
use spot_map_extract::CoordinateExtractor;
use spot_map_geo::Region;
use spot_map_source_models::RawSpot;
use spot_map_spot_models::Spot;

/// Maximum stored length of the raw text snippet, in characters.
pub const MAX_RAW_TEXT_CHARS: usize = 1000;

/// Maximum length of an extracted name, in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Why a raw record was rejected.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// The `source` field is empty.
    #[error("Missing source tag")]
    MissingSource,

    /// The `raw_text` field is empty.
    #[error("Missing raw text")]
    MissingRawText,

    /// The extracted name exceeds [`MAX_NAME_CHARS`].
    #[error("Name too long: {len} chars (max {MAX_NAME_CHARS})")]
    NameTooLong {
        /// Actual name length.
        len: usize,
    },

    /// The source URL does not look like an HTTP(S) URL.
    #[error("Malformed source URL: {url}")]
    MalformedUrl {
        /// The offending URL.
        url: String,
    },

    /// Exactly one of latitude/longitude was provided.
    #[error("Latitude and longitude must be provided together")]
    UnpairedCoordinates,

    /// Coordinates fall outside the configured region.
    #[error("Coordinates ({lat}, {lon}) outside the configured region")]
    OutOfRegion {
        /// Rejected latitude.
        lat: f64,
        /// Rejected longitude.
        lon: f64,
    },
}

/// Validates a raw record against the configured region.
///
/// Fills classification defaults (location type, activities, hidden flag)
/// from the raw text when the source did not provide them, and attempts
/// coordinate extraction from the text when no coordinates were supplied.
/// The returned spot has `id = 0`; the store assigns the real key on
/// insert.
///
/// # Errors
///
/// Returns [`ValidationError`] when a required field is missing, a bound is
/// exceeded, or the coordinate invariants are violated.
pub fn validate(raw: RawSpot, region: Region) -> Result<Spot, ValidationError> {
    if raw.source.trim().is_empty() {
        return Err(ValidationError::MissingSource);
    }
    if raw.raw_text.trim().is_empty() {
        return Err(ValidationError::MissingRawText);
    }

    if let Some(url) = &raw.source_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        return Err(ValidationError::MalformedUrl { url: url.clone() });
    }

    if let Some(name) = &raw.extracted_name {
        let len = name.chars().count();
        if len > MAX_NAME_CHARS {
            return Err(ValidationError::NameTooLong { len });
        }
    }

    let coordinates = match (raw.latitude, raw.longitude) {
        (Some(lat), Some(lon)) => {
            if !region.contains(lat, lon) {
                return Err(ValidationError::OutOfRegion { lat, lon });
            }
            Some((lat, lon))
        }
        (None, None) => CoordinateExtractor::new(region).extract(&raw.raw_text),
        _ => return Err(ValidationError::UnpairedCoordinates),
    };

    let raw_text: String = raw.raw_text.chars().take(MAX_RAW_TEXT_CHARS).collect();

    let location_type = raw
        .location_type
        .unwrap_or_else(|| spot_map_classify::infer_location_type(&raw_text));
    let activities = if raw.activities.is_empty() {
        spot_map_classify::infer_activities(&raw_text)
    } else {
        raw.activities
    };
    let is_hidden = raw
        .is_hidden
        .unwrap_or_else(|| spot_map_classify::is_hidden_spot(&raw_text));

    Ok(Spot {
        id: 0,
        source: raw.source,
        source_url: raw.source_url,
        raw_text: Some(raw_text),
        extracted_name: raw
            .extracted_name
            .filter(|name| !name.trim().is_empty()),
        latitude: coordinates.map(|(lat, _)| lat),
        longitude: coordinates.map(|(_, lon)| lon),
        location_type,
        activities,
        is_hidden,
        mentions_count: 1,
        scraped_at: raw.scraped_at.unwrap_or_else(Utc::now),
        metadata: raw.metadata,
    })
}
