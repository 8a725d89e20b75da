//! GPX waypoint serialization for hiking apps.
//!
//! Produces a GPX 1.1 document with one `<wpt>` per spot that has
//! coordinates, carrying a symbol hint derived from the location type.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use spot_map_spot_models::{Activity, LocationType, Spot};

use crate::ExportError;

/// GPX document name.
const GPX_NAME: &str = "Secret Toulouse Spots";

/// GPX document description.
const GPX_DESC: &str = "Hidden outdoor locations discovered near Toulouse";

/// Serializes spots with coordinates into a GPX 1.1 document.
///
/// # Errors
///
/// Returns [`ExportError`] if XML writing fails.
pub fn to_gpx(spots: &[Spot]) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", "spot-map"));
    gpx.push_attribute(("xmlns", "http://www.topografix.com/GPX/1/1"));
    writer.write_event(Event::Start(gpx))?;

    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_text_element(&mut writer, "name", GPX_NAME)?;
    write_text_element(&mut writer, "desc", GPX_DESC)?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    for spot in spots {
        let Some((lat, lon)) = spot.coordinates() else {
            continue;
        };

        let mut wpt = BytesStart::new("wpt");
        wpt.push_attribute(("lat", format!("{lat}").as_str()));
        wpt.push_attribute(("lon", format!("{lon}").as_str()));
        writer.write_event(Event::Start(wpt))?;

        if let Some(name) = &spot.extracted_name {
            write_text_element(&mut writer, "name", name)?;
        }
        let desc = format!(
            "{} - {}",
            spot.location_type.as_ref(),
            Activity::join(&spot.activities)
        );
        write_text_element(&mut writer, "desc", &desc)?;
        write_text_element(&mut writer, "sym", symbol_for(spot))?;

        writer.write_event(Event::End(BytesEnd::new("wpt")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;

    let bytes = writer.into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), ExportError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Waypoint symbol hint for hiking apps, derived from the spot type.
fn symbol_for(spot: &Spot) -> &'static str {
    match spot.location_type {
        LocationType::Water => "Swimming Area",
        LocationType::Cave => "Cave",
        LocationType::Urbex => "Building",
        _ if spot.activities.contains(&Activity::Swimming) => "Swimming Area",
        _ => "Scenic Area",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use spot_map_spot_models::SpotMetadata;

    fn spot(location_type: LocationType, coords: Option<(f64, f64)>) -> Spot {
        Spot {
            id: 1,
            source: "osm_waterfalls".to_string(),
            source_url: None,
            raw_text: None,
            extracted_name: Some("Cascade de Salles".to_string()),
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lon)| lon),
            location_type,
            activities: vec![Activity::Swimming],
            is_hidden: false,
            mentions_count: 1,
            scraped_at: Utc::now(),
            metadata: SpotMetadata::default(),
        }
    }

    #[test]
    fn gpx_contains_waypoint() {
        let xml = to_gpx(&[spot(LocationType::Water, Some((43.6, 1.44)))]).unwrap();
        assert!(xml.contains(r#"<wpt lat="43.6" lon="1.44">"#));
        assert!(xml.contains("<name>Cascade de Salles</name>"));
        assert!(xml.contains("<sym>Swimming Area</sym>"));
        assert!(xml.contains(r#"xmlns="http://www.topografix.com/GPX/1/1""#));
    }

    #[test]
    fn gpx_skips_spots_without_coordinates() {
        let xml = to_gpx(&[spot(LocationType::Water, None)]).unwrap();
        assert!(!xml.contains("<wpt"));
    }

    #[test]
    fn symbols_follow_location_type() {
        assert_eq!(
            symbol_for(&spot(LocationType::Cave, Some((43.6, 1.44)))),
            "Cave"
        );
        assert_eq!(
            symbol_for(&spot(LocationType::Urbex, Some((43.6, 1.44)))),
            "Building"
        );
        assert_eq!(
            symbol_for(&spot(LocationType::Ruins, Some((43.6, 1.44)))),
            "Swimming Area" // swimming activity wins over the fallback
        );
    }
}
