//! Overpass API (OpenStreetMap) fetcher.
//!
//! Queries one feature category at a time (waterfalls, caves, ...) and maps
//! the returned elements into [`RawSpot`] records. The public Overpass
//! instance expects modest request rates; categories are fetched
//! sequentially.

use serde_json::Value;
use spot_map_source_models::RawSpot;
use spot_map_spot_models::SpotMetadata;

use crate::SourceError;
use crate::source_def::OverpassCategory;

/// Fetches all categories from the Overpass API.
///
/// # Errors
///
/// Returns [`SourceError`] if a request or response parse fails. A failing
/// category aborts the fetch; the caller decides whether to retry.
pub async fn fetch_overpass(
    api_url: &str,
    bbox: &str,
    categories: &[OverpassCategory],
    limit: Option<u64>,
) -> Result<Vec<RawSpot>, SourceError> {
    let client = reqwest::Client::builder()
        .user_agent("spot-map/1.0")
        .build()?;

    let mut spots = Vec::new();

    for category in categories {
        let query = category.query.replace("{bbox}", bbox);
        log::info!("Querying Overpass for category '{}'", category.id);

        let body: Value = client
            .post(api_url)
            .form(&[("data", query.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let category_spots = parse_elements(&body, category);
        log::info!(
            "Category '{}' yielded {} spot(s)",
            category.id,
            category_spots.len()
        );
        spots.extend(category_spots);

        if let Some(limit) = limit
            && u64::try_from(spots.len()).unwrap_or(u64::MAX) >= limit
        {
            spots.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            break;
        }
    }

    Ok(spots)
}

/// Maps an Overpass JSON response into raw spots for one category.
#[must_use]
pub fn parse_elements(body: &Value, category: &OverpassCategory) -> Vec<RawSpot> {
    let Some(elements) = body.get("elements").and_then(Value::as_array) else {
        return Vec::new();
    };

    elements
        .iter()
        .filter_map(|element| parse_element(element, category))
        .collect()
}

fn parse_element(element: &Value, category: &OverpassCategory) -> Option<RawSpot> {
    // Nodes carry lat/lon directly; ways report a center when the query
    // uses `out center`.
    let (lat, lon) = element
        .get("lat")
        .and_then(Value::as_f64)
        .zip(element.get("lon").and_then(Value::as_f64))
        .or_else(|| {
            let center = element.get("center")?;
            center
                .get("lat")
                .and_then(Value::as_f64)
                .zip(center.get("lon").and_then(Value::as_f64))
        })?;

    let empty = serde_json::Map::new();
    let tags = element
        .get("tags")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let tag = |key: &str| tags.get(key).and_then(Value::as_str);

    let name = tag("name").or_else(|| tag("name:fr")).map(str::to_string);

    // Unnamed features are only kept for categories with an auto-name.
    let name = match (name, &category.auto_name_prefix) {
        (Some(name), _) if !name.is_empty() => name,
        (_, Some(prefix)) => format!("{prefix} ({lat:.4}, {lon:.4})"),
        _ => return None,
    };

    let mut description_parts: Vec<String> = Vec::new();
    if let Some(description) = tag("description") {
        description_parts.push(description.to_string());
    }
    if let Some(description) = tag("description:fr") {
        description_parts.push(description.to_string());
    }
    if let Some(access) = tag("access") {
        description_parts.push(format!("Accès: {access}"));
    }
    if let Some(elevation) = tag("ele") {
        description_parts.push(format!("Altitude: {elevation}m"));
    }
    let raw_text = if description_parts.is_empty() {
        format!("Point OSM de type {}", category.id)
    } else {
        description_parts.join(" ")
    };

    let is_hidden = matches!(tag("access"), Some("private" | "permissive" | "no"))
        || tag("description")
            .is_some_and(|d| d.to_lowercase().contains("abandoned"))
        || tag("ruins") == Some("yes");

    let osm_type = element
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("node");
    let osm_id = element.get("id").and_then(Value::as_i64).unwrap_or(0);

    let mut metadata = SpotMetadata::default();
    metadata.insert("osm_id", Value::from(osm_id));
    metadata.insert("osm_type", Value::String(osm_type.to_string()));
    metadata.insert(SpotMetadata::OSM_TAGS, Value::Object(tags.clone()));

    Some(RawSpot {
        source: format!("osm_{}", category.id),
        source_url: Some(format!(
            "https://www.openstreetmap.org/{osm_type}/{osm_id}"
        )),
        raw_text,
        extracted_name: Some(name),
        latitude: Some(lat),
        longitude: Some(lon),
        location_type: Some(category.location_type),
        activities: category.activities.clone(),
        is_hidden: Some(is_hidden),
        scraped_at: None,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_map_spot_models::{Activity, LocationType};

    fn waterfall_category() -> OverpassCategory {
        OverpassCategory {
            id: "waterfalls".to_string(),
            location_type: LocationType::Water,
            activities: vec![Activity::Swimming, Activity::Hiking],
            auto_name_prefix: Some("Cascade non nommée".to_string()),
            query: String::new(),
        }
    }

    #[test]
    fn parses_named_node() {
        let body = serde_json::json!({
            "elements": [{
                "type": "node",
                "id": 123,
                "lat": 43.1,
                "lon": 1.2,
                "tags": {"name": "Cascade d'Ars", "access": "private"}
            }]
        });

        let spots = parse_elements(&body, &waterfall_category());
        assert_eq!(spots.len(), 1);
        let spot = &spots[0];
        assert_eq!(spot.source, "osm_waterfalls");
        assert_eq!(spot.extracted_name.as_deref(), Some("Cascade d'Ars"));
        assert_eq!(
            spot.source_url.as_deref(),
            Some("https://www.openstreetmap.org/node/123")
        );
        assert_eq!(spot.is_hidden, Some(true));
        assert_eq!(spot.metadata.osm_tag("access").as_deref(), Some("private"));
        assert!(spot.raw_text.contains("Accès: private"));
    }

    #[test]
    fn unnamed_feature_gets_auto_name() {
        let body = serde_json::json!({
            "elements": [{
                "type": "node", "id": 5, "lat": 43.1234, "lon": 1.5678, "tags": {}
            }]
        });

        let spots = parse_elements(&body, &waterfall_category());
        assert_eq!(
            spots[0].extracted_name.as_deref(),
            Some("Cascade non nommée (43.1234, 1.5678)")
        );
    }

    #[test]
    fn unnamed_feature_skipped_without_auto_name() {
        let mut category = waterfall_category();
        category.auto_name_prefix = None;

        let body = serde_json::json!({
            "elements": [{
                "type": "node", "id": 5, "lat": 43.1, "lon": 1.5, "tags": {}
            }]
        });
        assert!(parse_elements(&body, &category).is_empty());
    }

    #[test]
    fn way_uses_center_coordinates() {
        let body = serde_json::json!({
            "elements": [{
                "type": "way",
                "id": 77,
                "center": {"lat": 43.3, "lon": 1.1},
                "tags": {"name": "Gorges de la Save"}
            }]
        });

        let spots = parse_elements(&body, &waterfall_category());
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].latitude, Some(43.3));
        assert_eq!(
            spots[0].source_url.as_deref(),
            Some("https://www.openstreetmap.org/way/77")
        );
    }

    #[test]
    fn element_without_coordinates_skipped() {
        let body = serde_json::json!({
            "elements": [{"type": "node", "id": 9, "tags": {"name": "X"}}]
        });
        assert!(parse_elements(&body, &waterfall_category()).is_empty());
    }

    #[test]
    fn empty_body_yields_nothing() {
        assert!(parse_elements(&serde_json::json!({}), &waterfall_category()).is_empty());
    }
}
