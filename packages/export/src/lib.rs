#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Exports of the spot catalog: full JSON dump, flat map payload, CSV for
//! spreadsheets, and GPX waypoints for hiking apps.

pub mod gpx;

use std::path::Path;

use serde::{Deserialize, Serialize};
use spot_map_spot_models::{Activity, Spot, SpotMetadata};

/// Errors from export operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// GPX (XML) serialization failed.
    #[error("GPX error: {0}")]
    Gpx(#[from] quick_xml::Error),
}

/// One entry in the flat JSON array the map front end consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSpot {
    /// Database ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Source tag.
    pub source: String,
    /// Location category.
    pub location_type: String,
    /// Comma-joined activity tags.
    pub activities: String,
    /// Whether the spot is flagged hidden.
    pub is_hidden: bool,
    /// The spot's metadata bag.
    pub metadata: SpotMetadata,
}

/// Builds the map payload: one flat entry per spot with coordinates.
///
/// Spots without coordinates are skipped — the map cannot place them.
#[must_use]
pub fn map_payload(spots: &[Spot]) -> Vec<MapSpot> {
    spots
        .iter()
        .filter_map(|spot| {
            let (lat, lng) = spot.coordinates()?;
            Some(MapSpot {
                id: spot.id,
                name: spot
                    .extracted_name
                    .clone()
                    .unwrap_or_else(|| "Spot".to_string()),
                lat,
                lng,
                source: spot.source.clone(),
                location_type: spot.location_type.as_ref().to_string(),
                activities: Activity::join(&spot.activities),
                is_hidden: spot.is_hidden,
                metadata: spot.metadata.clone(),
            })
        })
        .collect()
}

/// Writes the full catalog as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the write fails.
pub fn write_full_json(path: &Path, spots: &[Spot]) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(spots)?;
    std::fs::write(path, json)?;
    log::info!("Exported {} spot(s) to {path:?}", spots.len());
    Ok(())
}

/// Writes the flat map payload as JSON.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the write fails.
pub fn write_map_json(path: &Path, spots: &[Spot]) -> Result<(), ExportError> {
    let payload = map_payload(spots);
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(path, json)?;
    log::info!(
        "Exported {} mappable spot(s) of {} to {path:?}",
        payload.len(),
        spots.len()
    );
    Ok(())
}

/// Serializes spots to CSV.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization fails.
pub fn to_csv(spots: &[Spot]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "name",
        "latitude",
        "longitude",
        "type",
        "activities",
        "source",
        "is_hidden",
    ])?;

    for spot in spots {
        writer.write_record([
            spot.id.to_string(),
            spot.extracted_name.clone().unwrap_or_default(),
            spot.latitude.map(|v| v.to_string()).unwrap_or_default(),
            spot.longitude.map(|v| v.to_string()).unwrap_or_default(),
            spot.location_type.as_ref().to_string(),
            Activity::join(&spot.activities),
            spot.source.clone(),
            if spot.is_hidden { "1" } else { "0" }.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::other(e.to_string())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes spots to a CSV file.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the write fails.
pub fn write_csv(path: &Path, spots: &[Spot]) -> Result<(), ExportError> {
    std::fs::write(path, to_csv(spots)?)?;
    log::info!("Exported {} spot(s) to {path:?}", spots.len());
    Ok(())
}

/// Writes spots with coordinates as GPX waypoints.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the write fails.
pub fn write_gpx(path: &Path, spots: &[Spot]) -> Result<(), ExportError> {
    let xml = gpx::to_gpx(spots)?;
    std::fs::write(path, xml)?;
    log::info!("Exported GPX waypoints to {path:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use spot_map_spot_models::LocationType;

    fn spot(id: i64, coords: Option<(f64, f64)>) -> Spot {
        Spot {
            id,
            source: "osm_waterfalls".to_string(),
            source_url: None,
            raw_text: None,
            extracted_name: Some("Cascade de Salles".to_string()),
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lon)| lon),
            location_type: LocationType::Water,
            activities: vec![Activity::Swimming, Activity::Hiking],
            is_hidden: true,
            mentions_count: 1,
            scraped_at: Utc::now(),
            metadata: SpotMetadata::default(),
        }
    }

    #[test]
    fn map_payload_skips_spots_without_coordinates() {
        let spots = vec![spot(1, Some((43.6, 1.44))), spot(2, None)];
        let payload = map_payload(&spots);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].id, 1);
        assert_eq!(payload[0].location_type, "water");
        assert_eq!(payload[0].activities, "swimming, hiking");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = to_csv(&[spot(1, Some((43.6, 1.44)))]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,name,latitude,longitude,type,activities,source,is_hidden"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,Cascade de Salles,43.6,1.44,water"));
        assert!(row.ends_with(",1"));
    }

    #[test]
    fn csv_empty_coordinates_are_blank() {
        let csv = to_csv(&[spot(2, None)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",,,"));
    }
}
